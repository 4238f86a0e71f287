//! Derivation of the active-feature mask from the register file.

#![allow(missing_docs)]

use bitflags::bitflags;

use crate::regs::GeRegisters;

bitflags! {
    /// Pipeline features currently in effect.
    ///
    /// Derived purely from the register file by [resolve_capabilities] and
    /// stored on every draw command. The diff engine uses it to decide which
    /// state categories are even meaningful for a draw, so the nesting rules
    /// in [resolve_capabilities] gate what the backend is allowed to read.
    pub struct Capabilities: u32 {
        const TRANSFORM    = 0x0001;
        const LIGHT0       = 0x0002;
        const LIGHT1       = 0x0004;
        const LIGHT2       = 0x0008;
        const LIGHT3       = 0x0010;
        const BONES        = 0x0020;
        const BLEND        = 0x0040;
        const ALPHA_TEST   = 0x0080;
        const COLOR_TEST   = 0x0100;
        const FOG          = 0x0200;
        const LOGIC_OP     = 0x0400;
        const STENCIL_TEST = 0x0800;
        const DEPTH_TEST   = 0x1000;
        const TEXTURE      = 0x2000;
    }
}

impl Capabilities {
    /// The flag for hardware light `light` (0..=3).
    pub fn light(light: usize) -> Capabilities {
        Capabilities::from_bits_truncate(Capabilities::LIGHT0.bits() << light)
    }
}

/// Computes the capability mask for the current register state.
///
/// Transform-dependent features (lights, bones) only exist when the pipeline
/// is not in through mode, and raster/fragment features only exist outside
/// clear mode; fog needs both. The raw enable bits are ignored whenever the
/// enclosing mode masks them, so a later stage never sees, say, a light
/// enable while the transform pipeline is bypassed.
pub fn resolve_capabilities(regs: &impl GeRegisters) -> Capabilities {
    let mut caps = Capabilities::empty();

    let transform = !regs.is_through_mode();
    if transform {
        caps |= Capabilities::TRANSFORM;
        if regs.lighting_enabled() {
            for light in 0..4 {
                if regs.light_enabled(light) {
                    caps |= Capabilities::light(light);
                }
            }
        }
        if regs.vertex_format().bone_count() > 0 {
            caps |= Capabilities::BONES;
        }
    }

    if !regs.is_clear_mode() {
        if regs.blend_enabled() {
            caps |= Capabilities::BLEND;
        }
        if regs.alpha_test_enabled() {
            caps |= Capabilities::ALPHA_TEST;
        }
        if regs.color_test_enabled() {
            caps |= Capabilities::COLOR_TEST;
        }
        if regs.fog_enabled() && transform {
            caps |= Capabilities::FOG;
        }
        if regs.logic_op_enabled() {
            caps |= Capabilities::LOGIC_OP;
        }
        if regs.stencil_test_enabled() {
            caps |= Capabilities::STENCIL_TEST;
        }
        if regs.depth_test_enabled() {
            caps |= Capabilities::DEPTH_TEST;
        }
        if regs.texture_enabled() {
            caps |= Capabilities::TEXTURE;
        }
    }

    caps
}
