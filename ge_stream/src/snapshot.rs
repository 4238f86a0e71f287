//! Immutable per-category state snapshots.
//!
//! One value type per state category, each with a `capture` constructor that
//! copies the relevant registers at the moment a draw is submitted. Snapshots
//! are never mutated after capture; the stream's category tables own them and
//! commands refer to them by index.

#![allow(missing_docs)]

use crate::arena::Arena;
use crate::regs::*;
use crate::StreamError;

/// Render target setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramebufferState {
    pub color_addr: u32,
    pub color_stride: u16,
    pub color_format: FramebufferFormat,
    pub depth_addr: u32,
    pub depth_stride: u16,
}

impl FramebufferState {
    pub fn capture(regs: &impl GeRegisters) -> Self {
        FramebufferState {
            color_addr: regs.color_buf_addr(),
            color_stride: regs.color_buf_stride(),
            color_format: regs.color_buf_format(),
            depth_addr: regs.depth_buf_addr(),
            depth_stride: regs.depth_buf_stride(),
        }
    }
}

/// Scissor, drawing-region offset, culling, and clear-mode write control.
///
/// Relevant to every primitive regardless of the capability mask, which is
/// why this category is never gated. It is also the highest-churn small
/// category, so it is the one the stream deduplicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterizerState {
    pub scissor: [u16; 4],
    pub offset: [u16; 2],
    pub cull: CullMode,
    pub clear_mode: bool,
    pub clear_writes: ClearFlags,
}

impl RasterizerState {
    pub fn capture(regs: &impl GeRegisters) -> Self {
        RasterizerState {
            scissor: regs.scissor_rect(),
            offset: regs.region_offset(),
            cull: regs.cull_mode(),
            clear_mode: regs.is_clear_mode(),
            clear_writes: regs.clear_write_flags(),
        }
    }
}

/// Per-fragment shading inputs that are not blend or test state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FragmentState {
    pub shade: ShadeModel,
    pub tex_func: TexFunc,
    pub tex_env_color: [u8; 4],
    pub use_texture_alpha: bool,
    pub fog_color: [u8; 4],
    pub fog_end: f32,
    pub fog_scale: f32,
}

impl FragmentState {
    pub fn capture(regs: &impl GeRegisters) -> Self {
        let [fog_end, fog_scale] = regs.fog_params();
        FragmentState {
            shade: regs.shade_model(),
            tex_func: regs.tex_func(),
            tex_env_color: regs.tex_env_color(),
            use_texture_alpha: regs.use_texture_alpha(),
            fog_color: regs.fog_color(),
            fog_end,
            fog_scale,
        }
    }
}

/// Blending, alpha test, color test, write masking, and logic op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendState {
    pub src_factor: BlendFactor,
    pub dst_factor: BlendFactor,
    pub equation: BlendOp,
    pub fix_src: [u8; 3],
    pub fix_dst: [u8; 3],
    pub alpha_func: CompareFunc,
    pub alpha_ref: u8,
    pub alpha_mask: u8,
    pub color_func: ColorTestFunc,
    pub color_ref: [u8; 3],
    pub color_mask: [u8; 3],
    pub write_mask: [u8; 4],
    pub logic_op: LogicOp,
}

impl BlendState {
    pub fn capture(regs: &impl GeRegisters) -> Self {
        BlendState {
            src_factor: regs.blend_src_factor(),
            dst_factor: regs.blend_dst_factor(),
            equation: regs.blend_equation(),
            fix_src: regs.blend_fix_src(),
            fix_dst: regs.blend_fix_dst(),
            alpha_func: regs.alpha_test_func(),
            alpha_ref: regs.alpha_test_ref(),
            alpha_mask: regs.alpha_test_mask(),
            color_func: regs.color_test_func(),
            color_ref: regs.color_test_ref(),
            color_mask: regs.color_test_mask(),
            write_mask: regs.color_write_mask(),
            logic_op: regs.logic_op(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthStencilState {
    pub depth_func: CompareFunc,
    pub depth_write: bool,
    pub stencil_func: CompareFunc,
    pub stencil_ref: u8,
    pub stencil_mask: u8,
    pub op_fail: StencilOp,
    pub op_zfail: StencilOp,
    pub op_zpass: StencilOp,
}

impl DepthStencilState {
    pub fn capture(regs: &impl GeRegisters) -> Self {
        DepthStencilState {
            depth_func: regs.depth_func(),
            depth_write: regs.depth_write_enabled(),
            stencil_func: regs.stencil_func(),
            stencil_ref: regs.stencil_ref(),
            stencil_mask: regs.stencil_mask(),
            op_fail: regs.stencil_op_fail(),
            op_zfail: regs.stencil_op_zfail(),
            op_zpass: regs.stencil_op_zpass(),
        }
    }
}

/// Texture image location and layout for all mip levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureState {
    pub addrs: [u32; 8],
    pub strides: [u16; 8],
    pub size_log2: [u8; 2],
    pub format: TexFormat,
    pub max_level: u8,
    pub swizzled: bool,
}

impl TextureState {
    pub fn capture(regs: &impl GeRegisters) -> Self {
        let mut addrs = [0u32; 8];
        let mut strides = [0u16; 8];
        for level in 0..8 {
            addrs[level] = regs.texture_addr(level);
            strides[level] = regs.texture_stride(level);
        }
        TextureState {
            addrs,
            strides,
            size_log2: regs.texture_size_log2(),
            format: regs.texture_format(),
            max_level: regs.texture_max_level(),
            swizzled: regs.texture_swizzled(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TexScaleState {
    pub scale: [f32; 2],
    pub offset: [f32; 2],
}

impl TexScaleState {
    pub fn capture(regs: &impl GeRegisters) -> Self {
        TexScaleState {
            scale: regs.tex_scale(),
            offset: regs.tex_offset(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerState {
    pub min_filter: TexFilter,
    pub mag_filter: TexFilter,
    pub wrap_u: WrapMode,
    pub wrap_v: WrapMode,
    pub lod_bias: f32,
}

impl SamplerState {
    pub fn capture(regs: &impl GeRegisters) -> Self {
        SamplerState {
            min_filter: regs.tex_min_filter(),
            mag_filter: regs.tex_mag_filter(),
            wrap_u: regs.tex_wrap_u(),
            wrap_v: regs.tex_wrap_v(),
            lod_bias: regs.tex_lod_bias(),
        }
    }
}

/// A copy of the color lookup table, stored in the stream's arena.
///
/// `hash` is a crc32 of the copied bytes; backends use it as a cache key so
/// identical palettes uploaded in different cycles can share a GPU-side
/// table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteState {
    pub offset: u32,
    pub len: u32,
    pub format: ClutFormat,
    pub shift: u8,
    pub mask: u8,
    pub base: u8,
    pub hash: u32,
}

impl PaletteState {
    /// Copies the caller's palette bytes into `arena`. Fails only on arena
    /// exhaustion.
    pub fn capture(regs: &impl GeRegisters, arena: &mut Arena) -> Result<Self, StreamError> {
        let bytes = regs.clut_bytes();
        let offset = arena.alloc_from(bytes)?;
        Ok(PaletteState {
            offset,
            len: bytes.len() as u32,
            format: regs.clut_format(),
            shift: regs.clut_shift(),
            mask: regs.clut_mask(),
            base: regs.clut_base(),
            hash: crc32fast::hash(bytes),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    pub scale: [f32; 3],
    pub center: [f32; 3],
    pub depth_range: [u16; 2],
}

impl ViewportState {
    pub fn capture(regs: &impl GeRegisters) -> Self {
        ViewportState {
            scale: regs.viewport_scale(),
            center: regs.viewport_center(),
            depth_range: regs.depth_range(),
        }
    }
}

/// World, view, and texture matrices, captured together.
///
/// The three change together often enough (object changes) that splitting
/// them into separate tables buys little; projection churns independently
/// and gets its own category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldViewTexState {
    pub world: [f32; 12],
    pub view: [f32; 12],
    pub tex: [f32; 12],
}

impl WorldViewTexState {
    pub fn capture(regs: &impl GeRegisters) -> Self {
        WorldViewTexState {
            world: regs.world_matrix(),
            view: regs.view_matrix(),
            tex: regs.tex_matrix(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionState {
    pub matrix: [f32; 16],
}

impl ProjectionState {
    pub fn capture(regs: &impl GeRegisters) -> Self {
        ProjectionState {
            matrix: regs.proj_matrix(),
        }
    }
}

/// Lighting state shared by all four hardware lights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightGlobalState {
    pub ambient: [u8; 4],
    pub material_ambient: [u8; 4],
    pub material_diffuse: [u8; 4],
    pub material_specular: [u8; 4],
    pub material_emissive: [u8; 4],
    pub specular_power: f32,
    pub mode: LightMode,
}

impl LightGlobalState {
    pub fn capture(regs: &impl GeRegisters) -> Self {
        LightGlobalState {
            ambient: regs.ambient_color(),
            material_ambient: regs.material_ambient(),
            material_diffuse: regs.material_diffuse(),
            material_specular: regs.material_specular(),
            material_emissive: regs.material_emissive(),
            specular_power: regs.specular_power(),
            mode: regs.light_mode(),
        }
    }
}

/// One hardware light. All four share a single table; a draw references up
/// to four entries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightState {
    pub kind: LightType,
    pub pos: [f32; 3],
    pub dir: [f32; 3],
    pub attenuation: [f32; 3],
    pub spot_exponent: f32,
    pub spot_cutoff: f32,
    pub ambient: [u8; 4],
    pub diffuse: [u8; 4],
    pub specular: [u8; 4],
}

impl LightState {
    pub fn capture(regs: &impl GeRegisters, light: usize) -> Self {
        let [spot_exponent, spot_cutoff] = regs.light_spot(light);
        LightState {
            kind: regs.light_type(light),
            pos: regs.light_pos(light),
            dir: regs.light_dir(light),
            attenuation: regs.light_attenuation(light),
            spot_exponent,
            spot_cutoff,
            ambient: regs.light_ambient(light),
            diffuse: regs.light_diffuse(light),
            specular: regs.light_specular(light),
        }
    }
}

/// One skinning matrix. The table is shared by all bones; a draw references
/// as many entries as its vertex format has weights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneState {
    pub matrix: [f32; 12],
}

impl BoneState {
    pub fn capture(regs: &impl GeRegisters, bone: usize) -> Self {
        BoneState {
            matrix: regs.bone_matrix(bone),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MorphState {
    pub weights: [f32; 8],
}

impl MorphState {
    pub fn capture(regs: &impl GeRegisters) -> Self {
        MorphState {
            weights: regs.morph_weights(),
        }
    }
}
