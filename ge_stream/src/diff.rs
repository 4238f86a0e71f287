//! The diff engine: decides, per category, whether a submitted draw loads a
//! fresh snapshot or inherits its predecessor's index.
//!
//! Per category the rules are:
//!
//! - dirty bit set and gate open: capture a snapshot, record the new index,
//!   consume the bit;
//! - gate closed: inherit the previous index and leave the dirty bit set in
//!   the returned residual, so the write is re-applied if the gate opens
//!   later without another register write;
//! - gate open, bit clear: inherit.
//!
//! The framebuffer, rasterizer, and fragment categories have no gate — their
//! state matters to every primitive. Everything else is gated on the
//! capability mask resolved for this draw.

use crate::caps::{resolve_capabilities, Capabilities};
use crate::dirty::DirtyFlags;
use crate::regs::GeRegisters;
use crate::snapshot::*;
use crate::stream::{CategoryTable, DrawCall, GeStream};
use crate::StreamError;

/// One category step: the reusable load-or-inherit routine.
///
/// `dedup` additionally collapses a snapshot identical to the table's most
/// recent entry back onto that entry's index instead of keeping the
/// duplicate slot.
fn refresh_slot<T, F>(
    table: &mut CategoryTable<T>,
    full: &mut DirtyFlags,
    bit: DirtyFlags,
    dirty: &mut DirtyFlags,
    gate: bool,
    dedup: bool,
    prev: u16,
    load: F,
) -> Result<u16, StreamError>
where
    T: Copy + PartialEq,
    F: FnOnce() -> Result<T, StreamError>,
{
    if !gate || !dirty.contains(bit) {
        // A closed gate deliberately keeps the dirty bit for later calls.
        return Ok(prev);
    }
    if table.is_full() {
        // Capacity was reached earlier in this same submission (multi-entry
        // categories); the write stays pending until the caller resets.
        full.insert(bit);
        return Ok(prev);
    }
    dirty.remove(bit);
    let value = load()?;
    let index = if dedup {
        table.push_dedup(value)
    } else {
        table.push(value)
    }
    .expect("capacity checked above");
    if table.is_full() {
        full.insert(bit);
    }
    Ok(index)
}

impl GeStream {
    /// Fills `cmd`'s capability mask and state indices from the previous
    /// draw and the dirty set, loading snapshots where needed. Returns the
    /// residual dirty set.
    pub(crate) fn refresh_draw_state<R: GeRegisters>(
        &mut self,
        regs: &R,
        cmd: &mut DrawCall,
        dirty: DirtyFlags,
    ) -> Result<DirtyFlags, StreamError> {
        let prev = self.prev_draw();

        // Fast path: an unchanged pipeline inherits everything. This is the
        // common case inside runs of primitives sharing state.
        if dirty.is_empty() {
            cmd.caps = prev.caps;
            cmd.state = prev.state;
            return Ok(DirtyFlags::empty());
        }

        let mut dirty = dirty;
        cmd.caps = if dirty.contains(DirtyFlags::CAPABILITIES) {
            dirty.remove(DirtyFlags::CAPABILITIES);
            resolve_capabilities(regs)
        } else {
            prev.caps
        };
        let caps = cmd.caps;
        let transform = caps.contains(Capabilities::TRANSFORM);
        let textured = caps.contains(Capabilities::TEXTURE);

        let (tables, arena, full) = self.tables_mut();

        cmd.state.framebuffer = refresh_slot(
            &mut tables.framebuffers,
            full,
            DirtyFlags::FRAMEBUFFER,
            &mut dirty,
            true,
            false,
            prev.state.framebuffer,
            || Ok(FramebufferState::capture(regs)),
        )?;
        cmd.state.rasterizer = refresh_slot(
            &mut tables.rasterizers,
            full,
            DirtyFlags::RASTERIZER,
            &mut dirty,
            true,
            true,
            prev.state.rasterizer,
            || Ok(RasterizerState::capture(regs)),
        )?;
        cmd.state.fragment = refresh_slot(
            &mut tables.fragments,
            full,
            DirtyFlags::FRAGMENT,
            &mut dirty,
            true,
            false,
            prev.state.fragment,
            || Ok(FragmentState::capture(regs)),
        )?;
        cmd.state.blend = refresh_slot(
            &mut tables.blends,
            full,
            DirtyFlags::BLEND,
            &mut dirty,
            caps.intersects(
                Capabilities::BLEND | Capabilities::ALPHA_TEST | Capabilities::COLOR_TEST,
            ),
            false,
            prev.state.blend,
            || Ok(BlendState::capture(regs)),
        )?;
        cmd.state.depth_stencil = refresh_slot(
            &mut tables.depth_stencils,
            full,
            DirtyFlags::DEPTH_STENCIL,
            &mut dirty,
            caps.intersects(Capabilities::DEPTH_TEST | Capabilities::STENCIL_TEST),
            false,
            prev.state.depth_stencil,
            || Ok(DepthStencilState::capture(regs)),
        )?;
        cmd.state.texture = refresh_slot(
            &mut tables.textures,
            full,
            DirtyFlags::TEXTURE,
            &mut dirty,
            textured,
            false,
            prev.state.texture,
            || Ok(TextureState::capture(regs)),
        )?;
        cmd.state.tex_scale = refresh_slot(
            &mut tables.tex_scales,
            full,
            DirtyFlags::TEX_SCALE,
            &mut dirty,
            textured,
            false,
            prev.state.tex_scale,
            || Ok(TexScaleState::capture(regs)),
        )?;
        cmd.state.sampler = refresh_slot(
            &mut tables.samplers,
            full,
            DirtyFlags::SAMPLER,
            &mut dirty,
            textured,
            false,
            prev.state.sampler,
            || Ok(SamplerState::capture(regs)),
        )?;
        cmd.state.palette = refresh_slot(
            &mut tables.palettes,
            full,
            DirtyFlags::PALETTE,
            &mut dirty,
            textured,
            false,
            prev.state.palette,
            || PaletteState::capture(regs, arena),
        )?;
        cmd.state.viewport = refresh_slot(
            &mut tables.viewports,
            full,
            DirtyFlags::VIEWPORT,
            &mut dirty,
            transform,
            false,
            prev.state.viewport,
            || Ok(ViewportState::capture(regs)),
        )?;
        cmd.state.matrices = refresh_slot(
            &mut tables.matrices,
            full,
            DirtyFlags::MATRICES,
            &mut dirty,
            transform,
            false,
            prev.state.matrices,
            || Ok(WorldViewTexState::capture(regs)),
        )?;
        cmd.state.projection = refresh_slot(
            &mut tables.projections,
            full,
            DirtyFlags::PROJECTION,
            &mut dirty,
            transform,
            false,
            prev.state.projection,
            || Ok(ProjectionState::capture(regs)),
        )?;
        cmd.state.light_global = refresh_slot(
            &mut tables.light_globals,
            full,
            DirtyFlags::LIGHT_GLOBAL,
            &mut dirty,
            transform,
            false,
            prev.state.light_global,
            || Ok(LightGlobalState::capture(regs)),
        )?;

        cmd.state.lights = prev.state.lights;
        for light in 0..4 {
            cmd.state.lights[light] = refresh_slot(
                &mut tables.lights,
                full,
                DirtyFlags::light(light),
                &mut dirty,
                transform && caps.contains(Capabilities::light(light)),
                false,
                prev.state.lights[light],
                || Ok(LightState::capture(regs, light)),
            )?;
        }

        cmd.state.bones = prev.state.bones;
        refresh_bones(
            &mut tables.bones,
            full,
            &mut dirty,
            transform && caps.contains(Capabilities::BONES),
            regs,
            cmd,
        );

        cmd.state.morph = refresh_slot(
            &mut tables.morphs,
            full,
            DirtyFlags::MORPH,
            &mut dirty,
            transform,
            false,
            prev.state.morph,
            || Ok(MorphState::capture(regs)),
        )?;

        Ok(dirty)
    }
}

/// Bone matrices load as a set: one dirty bit covers however many bones the
/// draw's vertex format uses, so the load is all-or-nothing. If the table
/// cannot hold the whole set the bit stays pending and the full bit gives
/// the caller the usual back-pressure signal.
fn refresh_bones<R: GeRegisters>(
    table: &mut CategoryTable<BoneState>,
    full: &mut DirtyFlags,
    dirty: &mut DirtyFlags,
    gate: bool,
    regs: &R,
    cmd: &mut DrawCall,
) {
    if !gate || !dirty.contains(DirtyFlags::BONES) {
        return;
    }
    let count = cmd.vertex_format.bone_count();
    if table.len() + count > table.capacity() {
        full.insert(DirtyFlags::BONES);
        return;
    }
    dirty.remove(DirtyFlags::BONES);
    for bone in 0..count {
        let index = table
            .push(BoneState::capture(regs, bone))
            .expect("capacity checked above");
        cmd.state.bones[bone] = index;
    }
    if table.is_full() {
        full.insert(DirtyFlags::BONES);
    }
}
