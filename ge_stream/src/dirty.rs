//! Per-category change tracking bits.

#![allow(missing_docs)]

use bitflags::bitflags;

bitflags! {
    /// One bit per state category, plus the capabilities-changed bit.
    ///
    /// Used in two roles: as the dirty set the caller passes to each
    /// submission (bits are consumed only for categories actually captured,
    /// and the residual is returned), and as the stream's sticky full mask
    /// (which categories are at capacity). `COMMANDS` only ever appears in
    /// the full mask.
    pub struct DirtyFlags: u32 {
        const FRAMEBUFFER   = 0x0000_0001;
        const RASTERIZER    = 0x0000_0002;
        const FRAGMENT      = 0x0000_0004;
        const BLEND         = 0x0000_0008;
        const DEPTH_STENCIL = 0x0000_0010;
        const TEXTURE       = 0x0000_0020;
        const TEX_SCALE     = 0x0000_0040;
        const SAMPLER       = 0x0000_0080;
        const PALETTE       = 0x0000_0100;
        const VIEWPORT      = 0x0000_0200;
        const MATRICES      = 0x0000_0400;
        const PROJECTION    = 0x0000_0800;
        const LIGHT_GLOBAL  = 0x0000_1000;
        const LIGHT0        = 0x0000_2000;
        const LIGHT1        = 0x0000_4000;
        const LIGHT2        = 0x0000_8000;
        const LIGHT3        = 0x0001_0000;
        const BONES         = 0x0002_0000;
        const MORPH         = 0x0004_0000;
        /// The capability mask must be recomputed.
        const CAPABILITIES  = 0x0008_0000;
        /// Full-mask only: the command list itself is at capacity.
        const COMMANDS      = 0x0010_0000;
    }
}

impl DirtyFlags {
    /// Every category bit plus `CAPABILITIES` — what the caller should pass
    /// on the first submission after a reset.
    pub fn all_state() -> DirtyFlags {
        DirtyFlags::all() - DirtyFlags::COMMANDS
    }

    /// The dirty bit for hardware light `light` (0..=3).
    pub fn light(light: usize) -> DirtyFlags {
        DirtyFlags::from_bits_truncate(DirtyFlags::LIGHT0.bits() << light)
    }
}
