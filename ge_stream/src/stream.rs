//! The recorded command stream and its category tables.

use bytemuck::cast_slice;

use crate::arena::Arena;
use crate::caps::Capabilities;
use crate::dirty::DirtyFlags;
use crate::regs::{GeRegisters, PrimitiveKind, VertexFormat};
use crate::snapshot::*;
use crate::StreamError;

/// Sentinel category index meaning "no entry"; only the bootstrap dummy and
/// categories whose gate has never been open carry it.
pub const INVALID_INDEX: u16 = u16::MAX;

/// Append-only, fixed-capacity snapshot table for one state category.
///
/// Indices handed out are stable until [GeStream::reset]. The only removal
/// is the LIFO pop the dedup path performs on the entry it just appended.
#[derive(Debug)]
pub struct CategoryTable<T> {
    entries: Vec<T>,
    capacity: usize,
}

impl<T: Copy + PartialEq> CategoryTable<T> {
    fn new(capacity: usize) -> Self {
        CategoryTable {
            entries: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no entries have been recorded since the last reset.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True once every slot is taken; the matching full bit will be set on
    /// the stream.
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    /// Fixed capacity chosen at stream construction.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The snapshot at `index`, if live.
    pub fn get(&self, index: u16) -> Option<&T> {
        self.entries.get(index as usize)
    }

    /// All live snapshots, in append order.
    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    pub(crate) fn push(&mut self, value: T) -> Option<u16> {
        if self.is_full() {
            return None;
        }
        self.entries.push(value);
        Some((self.entries.len() - 1) as u16)
    }

    /// Appends unless the value is identical to the most recent entry, in
    /// which case the slot is collapsed and the existing index returned.
    pub(crate) fn push_dedup(&mut self, value: T) -> Option<u16> {
        match self.entries.last() {
            Some(prev) if *prev == value => Some((self.entries.len() - 1) as u16),
            _ => self.push(value),
        }
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Index of each category snapshot a draw uses.
///
/// Every field is always meaningful to read as a value: a category the draw
/// never owned carries its predecessor's index (or [INVALID_INDEX] if the
/// category's gate has been closed since the last reset — the capability
/// mask tells the backend not to look).
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateIndices {
    pub framebuffer: u16,
    pub rasterizer: u16,
    pub fragment: u16,
    pub blend: u16,
    pub depth_stencil: u16,
    pub texture: u16,
    pub tex_scale: u16,
    pub sampler: u16,
    pub palette: u16,
    pub viewport: u16,
    pub matrices: u16,
    pub projection: u16,
    pub light_global: u16,
    pub lights: [u16; 4],
    pub bones: [u16; 8],
    pub morph: u16,
}

#[allow(missing_docs)]
impl StateIndices {
    pub const INVALID: StateIndices = StateIndices {
        framebuffer: INVALID_INDEX,
        rasterizer: INVALID_INDEX,
        fragment: INVALID_INDEX,
        blend: INVALID_INDEX,
        depth_stencil: INVALID_INDEX,
        texture: INVALID_INDEX,
        tex_scale: INVALID_INDEX,
        sampler: INVALID_INDEX,
        palette: INVALID_INDEX,
        viewport: INVALID_INDEX,
        matrices: INVALID_INDEX,
        projection: INVALID_INDEX,
        light_global: INVALID_INDEX,
        lights: [INVALID_INDEX; 4],
        bones: [INVALID_INDEX; 8],
        morph: INVALID_INDEX,
    };
}

/// One recorded draw.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall {
    pub prim: PrimitiveKind,
    pub vertex_count: u16,
    /// Carried inline on every draw; cheap and high-churn, so never
    /// table-deduplicated.
    pub vertex_format: VertexFormat,
    pub vertex_addr: u32,
    pub index_addr: u32,
    pub caps: Capabilities,
    pub state: StateIndices,
}

impl DrawCall {
    /// The synthetic "last draw" installed by [GeStream::reset], against
    /// which the first real submission diffs. Because all of its indices are
    /// the sentinel, the caller must mark every category it intends to use
    /// as dirty on that first submission.
    pub fn bootstrap() -> DrawCall {
        DrawCall {
            prim: PrimitiveKind::Invalid,
            vertex_count: 0,
            vertex_format: VertexFormat(0),
            vertex_addr: 0,
            index_addr: 0,
            caps: Capabilities::empty(),
            state: StateIndices::INVALID,
        }
    }
}

/// A stateless rectangular block copy. References no category table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct TransferOp {
    pub src: u32,
    pub src_stride: u16,
    pub src_pos: [u16; 2],
    pub dst: u32,
    pub dst_stride: u16,
    pub dst_pos: [u16; 2],
    pub size: [u16; 2],
    pub bpp: u8,
}

impl TransferOp {
    fn capture(regs: &impl GeRegisters) -> Self {
        TransferOp {
            src: regs.transfer_src(),
            src_stride: regs.transfer_src_stride(),
            src_pos: regs.transfer_src_pos(),
            dst: regs.transfer_dst(),
            dst_stride: regs.transfer_dst_stride(),
            dst_pos: regs.transfer_dst_pos(),
            size: regs.transfer_size(),
            bpp: regs.transfer_bpp(),
        }
    }
}

/// One recorded command, consumed by the backend in submission order.
#[derive(Debug, Clone, Copy, PartialEq)]
#[allow(missing_docs)]
pub enum Command {
    Draw(DrawCall),
    Transfer(TransferOp),
}

/// Fixed capacities for one stream, chosen at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct StreamLimits {
    pub commands: usize,
    pub framebuffers: usize,
    pub rasterizers: usize,
    pub fragments: usize,
    pub blends: usize,
    pub depth_stencils: usize,
    pub textures: usize,
    pub tex_scales: usize,
    pub samplers: usize,
    pub palettes: usize,
    pub viewports: usize,
    pub matrices: usize,
    pub projections: usize,
    pub light_globals: usize,
    pub lights: usize,
    pub bones: usize,
    pub morphs: usize,
    pub arena_bytes: usize,
}

impl Default for StreamLimits {
    fn default() -> Self {
        StreamLimits {
            commands: 4096,
            framebuffers: 64,
            rasterizers: 256,
            fragments: 256,
            blends: 256,
            depth_stencils: 128,
            textures: 512,
            tex_scales: 512,
            samplers: 256,
            palettes: 64,
            viewports: 64,
            matrices: 1024,
            projections: 128,
            light_globals: 64,
            lights: 256,
            bones: 2048,
            morphs: 256,
            arena_bytes: 64 * 1024,
        }
    }
}

impl StreamLimits {
    /// Every category table capped at `n`; command and arena capacities keep
    /// their defaults. Mostly useful in tests.
    pub fn uniform(n: usize) -> StreamLimits {
        StreamLimits {
            framebuffers: n,
            rasterizers: n,
            fragments: n,
            blends: n,
            depth_stencils: n,
            textures: n,
            tex_scales: n,
            samplers: n,
            palettes: n,
            viewports: n,
            matrices: n,
            projections: n,
            light_globals: n,
            lights: n,
            bones: n,
            morphs: n,
            ..StreamLimits::default()
        }
    }
}

/// All category tables of one stream.
#[derive(Debug)]
#[allow(missing_docs)]
pub struct StateTables {
    pub framebuffers: CategoryTable<FramebufferState>,
    pub rasterizers: CategoryTable<RasterizerState>,
    pub fragments: CategoryTable<FragmentState>,
    pub blends: CategoryTable<BlendState>,
    pub depth_stencils: CategoryTable<DepthStencilState>,
    pub textures: CategoryTable<TextureState>,
    pub tex_scales: CategoryTable<TexScaleState>,
    pub samplers: CategoryTable<SamplerState>,
    pub palettes: CategoryTable<PaletteState>,
    pub viewports: CategoryTable<ViewportState>,
    pub matrices: CategoryTable<WorldViewTexState>,
    pub projections: CategoryTable<ProjectionState>,
    pub light_globals: CategoryTable<LightGlobalState>,
    pub lights: CategoryTable<LightState>,
    pub bones: CategoryTable<BoneState>,
    pub morphs: CategoryTable<MorphState>,
}

impl StateTables {
    fn new(limits: &StreamLimits) -> Self {
        StateTables {
            framebuffers: CategoryTable::new(limits.framebuffers),
            rasterizers: CategoryTable::new(limits.rasterizers),
            fragments: CategoryTable::new(limits.fragments),
            blends: CategoryTable::new(limits.blends),
            depth_stencils: CategoryTable::new(limits.depth_stencils),
            textures: CategoryTable::new(limits.textures),
            tex_scales: CategoryTable::new(limits.tex_scales),
            samplers: CategoryTable::new(limits.samplers),
            palettes: CategoryTable::new(limits.palettes),
            viewports: CategoryTable::new(limits.viewports),
            matrices: CategoryTable::new(limits.matrices),
            projections: CategoryTable::new(limits.projections),
            light_globals: CategoryTable::new(limits.light_globals),
            lights: CategoryTable::new(limits.lights),
            bones: CategoryTable::new(limits.bones),
            morphs: CategoryTable::new(limits.morphs),
        }
    }

    fn clear(&mut self) {
        self.framebuffers.clear();
        self.rasterizers.clear();
        self.fragments.clear();
        self.blends.clear();
        self.depth_stencils.clear();
        self.textures.clear();
        self.tex_scales.clear();
        self.samplers.clear();
        self.palettes.clear();
        self.viewports.clear();
        self.matrices.clear();
        self.projections.clear();
        self.light_globals.clear();
        self.lights.clear();
        self.bones.clear();
        self.morphs.clear();
    }
}

/// The recorder: a fixed-capacity command list plus all category tables.
///
/// Exclusively owned by the interpreting thread; reset once per unit of
/// work (display list or frame) after the backend has walked it.
#[derive(Debug)]
pub struct GeStream {
    commands: Vec<Command>,
    command_capacity: usize,
    tables: StateTables,
    arena: Arena,
    last_draw: DrawCall,
    full: DirtyFlags,
}

impl GeStream {
    /// Allocates a stream with the given capacities. All storage is created
    /// here once; [GeStream::reset] reuses it.
    pub fn new(limits: &StreamLimits) -> Self {
        GeStream {
            commands: Vec::with_capacity(limits.commands),
            command_capacity: limits.commands,
            tables: StateTables::new(limits),
            arena: Arena::new(limits.arena_bytes),
            last_draw: DrawCall::bootstrap(),
            full: DirtyFlags::empty(),
        }
    }

    /// The recorded commands, in submission order.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// The category tables the commands index into.
    pub fn tables(&self) -> &StateTables {
        &self.tables
    }

    pub(crate) fn tables_mut(&mut self) -> (&mut StateTables, &mut Arena, &mut DirtyFlags) {
        (&mut self.tables, &mut self.arena, &mut self.full)
    }

    /// The sticky full mask: which categories (or `COMMANDS`) have hit
    /// capacity since the last reset. Non-empty means further submissions
    /// are rejected until [GeStream::reset].
    pub fn full_mask(&self) -> DirtyFlags {
        self.full
    }

    /// True once any capacity has been reached.
    pub fn is_full(&self) -> bool {
        !self.full.is_empty()
    }

    /// The draw new submissions will diff against.
    pub fn last_draw(&self) -> &DrawCall {
        &self.last_draw
    }

    /// The palette bytes a [PaletteState] refers to.
    pub fn palette_bytes(&self, palette: &PaletteState) -> &[u8] {
        self.arena.bytes(palette.offset, palette.len as usize)
    }

    /// The palette viewed as 16-bit entries, for the 2-byte CLUT formats.
    pub fn palette_entries16(&self, palette: &PaletteState) -> &[u16] {
        let bytes = self.palette_bytes(palette);
        cast_slice(&bytes[..bytes.len() & !1])
    }

    /// Empties the stream for the next unit of work. Counts, the arena
    /// cursor, and the full mask are zeroed; all buffers are kept. A fresh
    /// bootstrap dummy becomes the last draw, so the caller must mark all
    /// categories it uses dirty on the next submission.
    pub fn reset(&mut self) {
        self.commands.clear();
        self.tables.clear();
        self.arena.reset();
        self.full = DirtyFlags::empty();
        self.last_draw = DrawCall::bootstrap();
        log::trace!("ge stream reset");
    }

    /// Records one draw.
    ///
    /// `prim_word` packs the primitive kind in bits 16..19 and the vertex
    /// count in the low 16 bits. The current vertex format is copied inline;
    /// every dirty, currently-gated category is snapshotted per the rules in
    /// the diff engine. Returns the residual dirty set — bits whose gate was
    /// closed — which the caller must carry into its accumulated dirty
    /// state.
    ///
    /// Fails without appending if the stream is already full, if the
    /// primitive encoding is the reserved one, or if the arena cannot hold
    /// the palette copy.
    pub fn submit_draw<R: GeRegisters>(
        &mut self,
        regs: &R,
        dirty: DirtyFlags,
        prim_word: u32,
        vertex_addr: u32,
        index_addr: u32,
    ) -> Result<DirtyFlags, StreamError> {
        if self.is_full() {
            log::warn!("draw dropped, stream full: {:?}", self.full);
            return Err(StreamError::StreamFull(self.full));
        }
        let prim = PrimitiveKind::try_from(((prim_word >> 16) & 0x7) as u8)
            .expect("3-bit primitive field");
        if prim == PrimitiveKind::Invalid {
            return Err(StreamError::InvalidPrimitive(prim_word));
        }

        let mut cmd = DrawCall {
            prim,
            vertex_count: prim_word as u16,
            vertex_format: regs.vertex_format(),
            vertex_addr,
            index_addr,
            caps: Capabilities::empty(),
            state: StateIndices::INVALID,
        };
        let residual = self.refresh_draw_state(regs, &mut cmd, dirty)?;

        self.commands.push(Command::Draw(cmd));
        if self.commands.len() >= self.command_capacity {
            self.full |= DirtyFlags::COMMANDS;
        }
        self.last_draw = cmd;
        Ok(residual)
    }

    /// Records one block transfer. Touches no category table and no dirty
    /// state; only the command-list capacity applies.
    pub fn submit_transfer<R: GeRegisters>(&mut self, regs: &R) -> Result<(), StreamError> {
        if self.is_full() {
            log::warn!("transfer dropped, stream full: {:?}", self.full);
            return Err(StreamError::StreamFull(self.full));
        }
        self.commands.push(Command::Transfer(TransferOp::capture(regs)));
        if self.commands.len() >= self.command_capacity {
            self.full |= DirtyFlags::COMMANDS;
        }
        Ok(())
    }

    pub(crate) fn prev_draw(&self) -> DrawCall {
        self.last_draw
    }
}
