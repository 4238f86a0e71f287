//! Read-only view of the emulated GPU's register file.
//!
//! [GeRegisters] is implemented by the emulator core that owns the actual
//! register words; this crate only ever reads through it. Accessors return
//! decoded values (enums, floats, small arrays) rather than raw register
//! words, so the mapping from hardware encoding to these types lives with
//! the register file, next to the write handlers.

#![allow(missing_docs)]

use num_enum::{IntoPrimitive, TryFromPrimitive};

use bitflags::bitflags;

/// The packed vertex format word, carried verbatim on every draw.
///
/// Field layout follows the hardware word: texcoord/color/normal/position/
/// weight/index component formats in the low bits, weight and morph counts
/// above them, and the through-mode (pre-transformed vertices) flag at
/// bit 23.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VertexFormat(pub u32);

impl VertexFormat {
    pub fn texcoord_format(self) -> u32 {
        self.0 & 0x3
    }

    pub fn color_format(self) -> u32 {
        (self.0 >> 2) & 0x7
    }

    pub fn normal_format(self) -> u32 {
        (self.0 >> 5) & 0x3
    }

    pub fn position_format(self) -> u32 {
        (self.0 >> 7) & 0x3
    }

    pub fn weight_format(self) -> u32 {
        (self.0 >> 9) & 0x3
    }

    pub fn index_format(self) -> u32 {
        (self.0 >> 11) & 0x3
    }

    /// Number of skinning weights per vertex (1..=8) when weights are
    /// present at all.
    pub fn weight_count(self) -> usize {
        ((self.0 >> 14) & 0x7) as usize + 1
    }

    /// Number of morph targets per vertex (1..=8); 1 means no morphing.
    pub fn morph_count(self) -> usize {
        ((self.0 >> 18) & 0x7) as usize + 1
    }

    /// Vertices are pre-transformed screen coordinates; the whole transform
    /// pipeline (matrices, lighting, viewport) is bypassed.
    pub fn is_through(self) -> bool {
        self.0 & (1 << 23) != 0
    }

    /// Number of bone matrices this format consumes (0 when the format has
    /// no weights).
    pub fn bone_count(self) -> usize {
        if self.weight_format() == 0 {
            0
        } else {
            self.weight_count()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum PrimitiveKind {
    Points = 0,
    Lines = 1,
    LineStrip = 2,
    Triangles = 3,
    TriangleStrip = 4,
    TriangleFan = 5,
    Rectangles = 6,
    /// Reserved encoding; used only by the bootstrap dummy draw.
    Invalid = 7,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum FramebufferFormat {
    Rgb565 = 0,
    Rgba5551 = 1,
    Rgba4444 = 2,
    Rgba8888 = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CullMode {
    None,
    Clockwise,
    CounterClockwise,
}

bitflags! {
    /// Which channels a clear-mode draw writes through to memory.
    pub struct ClearFlags: u32 {
        const COLOR = 0x1;
        const ALPHA = 0x2;
        const DEPTH = 0x4;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShadeModel {
    Flat,
    Gouraud,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum TexFunc {
    Modulate = 0,
    Decal = 1,
    Blend = 2,
    Replace = 3,
    Add = 4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum BlendFactor {
    SrcColor = 0,
    OneMinusSrcColor = 1,
    SrcAlpha = 2,
    OneMinusSrcAlpha = 3,
    DstColor = 4,
    OneMinusDstColor = 5,
    DstAlpha = 6,
    OneMinusDstAlpha = 7,
    DoubleSrcAlpha = 8,
    OneMinusDoubleSrcAlpha = 9,
    Fixed = 10,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum BlendOp {
    Add = 0,
    Subtract = 1,
    ReverseSubtract = 2,
    Min = 3,
    Max = 4,
    Abs = 5,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum CompareFunc {
    Never = 0,
    Always = 1,
    Equal = 2,
    NotEqual = 3,
    Less = 4,
    LessOrEqual = 5,
    Greater = 6,
    GreaterOrEqual = 7,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum ColorTestFunc {
    Never = 0,
    Always = 1,
    Equal = 2,
    NotEqual = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum StencilOp {
    Keep = 0,
    Zero = 1,
    Replace = 2,
    Invert = 3,
    Increment = 4,
    Decrement = 5,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum LogicOp {
    Clear = 0,
    And = 1,
    AndReverse = 2,
    Copy = 3,
    AndInverted = 4,
    NoOp = 5,
    Xor = 6,
    Or = 7,
    Nor = 8,
    Equiv = 9,
    Inverted = 10,
    OrReverse = 11,
    CopyInverted = 12,
    OrInverted = 13,
    Nand = 14,
    Set = 15,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum TexFormat {
    Rgb565 = 0,
    Rgba5551 = 1,
    Rgba4444 = 2,
    Rgba8888 = 3,
    Clut4 = 4,
    Clut8 = 5,
    Clut16 = 6,
    Clut32 = 7,
    Dxt1 = 8,
    Dxt3 = 9,
    Dxt5 = 10,
}

impl TexFormat {
    /// True for the indexed formats that sample through the palette.
    pub fn is_indexed(self) -> bool {
        matches!(
            self,
            TexFormat::Clut4 | TexFormat::Clut8 | TexFormat::Clut16 | TexFormat::Clut32
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum ClutFormat {
    Rgb565 = 0,
    Rgba5551 = 1,
    Rgba4444 = 2,
    Rgba8888 = 3,
}

impl ClutFormat {
    /// Size of one palette entry in bytes.
    pub fn entry_size(self) -> usize {
        match self {
            ClutFormat::Rgb565 | ClutFormat::Rgba5551 | ClutFormat::Rgba4444 => 2,
            ClutFormat::Rgba8888 => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum TexFilter {
    Nearest = 0,
    Linear = 1,
    NearestMipmapNearest = 4,
    LinearMipmapNearest = 5,
    NearestMipmapLinear = 6,
    LinearMipmapLinear = 7,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WrapMode {
    Repeat,
    Clamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum LightType {
    Directional = 0,
    Point = 1,
    Spot = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightMode {
    SingleColor,
    SeparateSpecular,
}

/// Point-in-time, read-only view of the emulated GPU's registers.
///
/// The implementor owns the raw register words and the palette buffer; this
/// crate copies values out only when the corresponding category is dirty.
/// There is no history here — remembering what was already captured is the
/// stream's job.
pub trait GeRegisters {
    // Mode predicates.
    fn is_clear_mode(&self) -> bool;
    fn is_through_mode(&self) -> bool;
    fn lighting_enabled(&self) -> bool;
    fn light_enabled(&self, light: usize) -> bool;
    fn blend_enabled(&self) -> bool;
    fn alpha_test_enabled(&self) -> bool;
    fn color_test_enabled(&self) -> bool;
    fn fog_enabled(&self) -> bool;
    fn logic_op_enabled(&self) -> bool;
    fn stencil_test_enabled(&self) -> bool;
    fn depth_test_enabled(&self) -> bool;
    fn texture_enabled(&self) -> bool;

    fn vertex_format(&self) -> VertexFormat;

    // Framebuffer.
    fn color_buf_addr(&self) -> u32;
    fn color_buf_stride(&self) -> u16;
    fn color_buf_format(&self) -> FramebufferFormat;
    fn depth_buf_addr(&self) -> u32;
    fn depth_buf_stride(&self) -> u16;

    // Rasterizer.
    fn scissor_rect(&self) -> [u16; 4];
    fn region_offset(&self) -> [u16; 2];
    fn cull_mode(&self) -> CullMode;
    fn clear_write_flags(&self) -> ClearFlags;

    // Fragment.
    fn shade_model(&self) -> ShadeModel;
    fn tex_func(&self) -> TexFunc;
    fn tex_env_color(&self) -> [u8; 4];
    fn use_texture_alpha(&self) -> bool;
    fn fog_color(&self) -> [u8; 4];
    /// Fog end depth and 1/(end - start), in that order.
    fn fog_params(&self) -> [f32; 2];

    // Blending, alpha test, color test.
    fn blend_src_factor(&self) -> BlendFactor;
    fn blend_dst_factor(&self) -> BlendFactor;
    fn blend_equation(&self) -> BlendOp;
    fn blend_fix_src(&self) -> [u8; 3];
    fn blend_fix_dst(&self) -> [u8; 3];
    fn alpha_test_func(&self) -> CompareFunc;
    fn alpha_test_ref(&self) -> u8;
    fn alpha_test_mask(&self) -> u8;
    fn color_test_func(&self) -> ColorTestFunc;
    fn color_test_ref(&self) -> [u8; 3];
    fn color_test_mask(&self) -> [u8; 3];
    fn color_write_mask(&self) -> [u8; 4];
    fn logic_op(&self) -> LogicOp;

    // Depth/stencil.
    fn depth_func(&self) -> CompareFunc;
    fn depth_write_enabled(&self) -> bool;
    fn stencil_func(&self) -> CompareFunc;
    fn stencil_ref(&self) -> u8;
    fn stencil_mask(&self) -> u8;
    fn stencil_op_fail(&self) -> StencilOp;
    fn stencil_op_zfail(&self) -> StencilOp;
    fn stencil_op_zpass(&self) -> StencilOp;

    // Texture.
    fn texture_addr(&self, level: usize) -> u32;
    fn texture_stride(&self, level: usize) -> u16;
    /// log2 of width and height of level 0.
    fn texture_size_log2(&self) -> [u8; 2];
    fn texture_format(&self) -> TexFormat;
    fn texture_max_level(&self) -> u8;
    fn texture_swizzled(&self) -> bool;

    // Texture coordinate scaling.
    fn tex_scale(&self) -> [f32; 2];
    fn tex_offset(&self) -> [f32; 2];

    // Sampler.
    fn tex_min_filter(&self) -> TexFilter;
    fn tex_mag_filter(&self) -> TexFilter;
    fn tex_wrap_u(&self) -> WrapMode;
    fn tex_wrap_v(&self) -> WrapMode;
    fn tex_lod_bias(&self) -> f32;

    // Palette.
    fn clut_format(&self) -> ClutFormat;
    fn clut_shift(&self) -> u8;
    fn clut_mask(&self) -> u8;
    fn clut_base(&self) -> u8;
    /// The caller-owned palette buffer. Copied into the stream's arena when
    /// the palette category is dirty; staleness tracking is entirely the
    /// dirty tracker's responsibility.
    fn clut_bytes(&self) -> &[u8];

    // Viewport.
    fn viewport_scale(&self) -> [f32; 3];
    fn viewport_center(&self) -> [f32; 3];
    fn depth_range(&self) -> [u16; 2];

    // Matrices. 3x4 matrices are column-major with the translation column
    // last; projection is a full 4x4.
    fn world_matrix(&self) -> [f32; 12];
    fn view_matrix(&self) -> [f32; 12];
    fn tex_matrix(&self) -> [f32; 12];
    fn proj_matrix(&self) -> [f32; 16];
    fn bone_matrix(&self, bone: usize) -> [f32; 12];

    // Lighting, global.
    fn ambient_color(&self) -> [u8; 4];
    fn material_ambient(&self) -> [u8; 4];
    fn material_diffuse(&self) -> [u8; 4];
    fn material_specular(&self) -> [u8; 4];
    fn material_emissive(&self) -> [u8; 4];
    fn specular_power(&self) -> f32;
    fn light_mode(&self) -> LightMode;

    // Lighting, per light.
    fn light_type(&self, light: usize) -> LightType;
    fn light_pos(&self, light: usize) -> [f32; 3];
    fn light_dir(&self, light: usize) -> [f32; 3];
    fn light_attenuation(&self, light: usize) -> [f32; 3];
    /// Spot exponent and cutoff, in that order.
    fn light_spot(&self, light: usize) -> [f32; 2];
    fn light_ambient(&self, light: usize) -> [u8; 4];
    fn light_diffuse(&self, light: usize) -> [u8; 4];
    fn light_specular(&self, light: usize) -> [u8; 4];

    // Morphing.
    fn morph_weights(&self) -> [f32; 8];

    // Block transfer.
    fn transfer_src(&self) -> u32;
    fn transfer_src_stride(&self) -> u16;
    fn transfer_src_pos(&self) -> [u16; 2];
    fn transfer_dst(&self) -> u32;
    fn transfer_dst_stride(&self) -> u16;
    fn transfer_dst_pos(&self) -> [u16; 2];
    fn transfer_size(&self) -> [u16; 2];
    fn transfer_bpp(&self) -> u8;
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn vertex_format_counts() {
        // weight format = 1 (u8 weights), weight count = 5, morph count = 3
        let vtype = (1 << 9) | (4 << 14) | (2 << 18);
        let fmt = VertexFormat(vtype);
        assert_eq!(fmt.weight_format(), 1);
        assert_eq!(fmt.weight_count(), 5);
        assert_eq!(fmt.bone_count(), 5);
        assert_eq!(fmt.morph_count(), 3);
        assert!(!fmt.is_through());
    }

    #[test]
    fn vertex_format_no_weights_means_no_bones() {
        let fmt = VertexFormat(7 << 14);
        assert_eq!(fmt.weight_count(), 8);
        assert_eq!(fmt.bone_count(), 0);
    }

    #[test]
    fn vertex_format_through_bit() {
        assert!(VertexFormat(1 << 23).is_through());
        assert!(!VertexFormat(0).is_through());
    }
}
