//! Structured dump of a recorded stream, for logging and debugging only.

use core::fmt;

use crate::stream::{Command, GeStream};

impl fmt::Display for GeStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let t = self.tables();
        writeln!(f, "ge stream: {} commands, full = {:?}", self.commands().len(), self.full_mask())?;
        writeln!(
            f,
            "  tables: fb={} rast={} frag={} blend={} ds={} tex={} scale={} samp={} pal={}",
            t.framebuffers.len(),
            t.rasterizers.len(),
            t.fragments.len(),
            t.blends.len(),
            t.depth_stencils.len(),
            t.textures.len(),
            t.tex_scales.len(),
            t.samplers.len(),
            t.palettes.len(),
        )?;
        writeln!(
            f,
            "          vp={} mtx={} proj={} lglob={} light={} bone={} morph={}",
            t.viewports.len(),
            t.matrices.len(),
            t.projections.len(),
            t.light_globals.len(),
            t.lights.len(),
            t.bones.len(),
            t.morphs.len(),
        )?;
        for (i, cmd) in self.commands().iter().enumerate() {
            match cmd {
                Command::Draw(draw) => {
                    writeln!(
                        f,
                        "  [{}] draw {:?} x{} vfmt={:#08x} vtx={:#010x} idx={:#010x} caps={:?}",
                        i,
                        draw.prim,
                        draw.vertex_count,
                        draw.vertex_format.0,
                        draw.vertex_addr,
                        draw.index_addr,
                        draw.caps,
                    )?;
                    writeln!(f, "       state {:?}", draw.state)?;
                }
                Command::Transfer(op) => {
                    writeln!(
                        f,
                        "  [{}] transfer {:#010x}+{:?} -> {:#010x}+{:?} size={:?} bpp={}",
                        i, op.src, op.src_pos, op.dst, op.dst_pos, op.size, op.bpp,
                    )?;
                }
            }
        }
        Ok(())
    }
}
