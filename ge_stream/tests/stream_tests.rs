//! End-to-end tests of the recorder against a mock register file.
//!
//! `MockRegs` plays the emulator core: a bag of plain fields the tests
//! mutate between submissions, standing in for register writes. The dirty
//! sets are supplied by hand, exactly the way the external dirty tracker
//! would.

use ge_stream::caps::{resolve_capabilities, Capabilities};
use ge_stream::dirty::DirtyFlags;
use ge_stream::regs::*;
use ge_stream::stream::{Command, GeStream, StreamLimits, INVALID_INDEX};
use ge_stream::StreamError;

#[derive(Debug, Clone)]
struct MockRegs {
    clear_mode: bool,
    through_mode: bool,
    lighting: bool,
    lights_on: [bool; 4],
    blend: bool,
    alpha_test: bool,
    color_test: bool,
    fog: bool,
    logic_op: bool,
    stencil_test: bool,
    depth_test: bool,
    texture: bool,
    vtype: u32,
    scissor: [u16; 4],
    blend_src: BlendFactor,
    clut: Vec<u8>,
}

impl Default for MockRegs {
    fn default() -> Self {
        MockRegs {
            clear_mode: false,
            through_mode: false,
            lighting: false,
            lights_on: [false; 4],
            blend: false,
            alpha_test: false,
            color_test: false,
            fog: false,
            logic_op: false,
            stencil_test: false,
            depth_test: false,
            texture: false,
            vtype: 0,
            scissor: [0, 0, 480, 272],
            blend_src: BlendFactor::SrcAlpha,
            clut: vec![0x11; 32],
        }
    }
}

impl GeRegisters for MockRegs {
    fn is_clear_mode(&self) -> bool {
        self.clear_mode
    }
    fn is_through_mode(&self) -> bool {
        self.through_mode
    }
    fn lighting_enabled(&self) -> bool {
        self.lighting
    }
    fn light_enabled(&self, light: usize) -> bool {
        self.lights_on[light]
    }
    fn blend_enabled(&self) -> bool {
        self.blend
    }
    fn alpha_test_enabled(&self) -> bool {
        self.alpha_test
    }
    fn color_test_enabled(&self) -> bool {
        self.color_test
    }
    fn fog_enabled(&self) -> bool {
        self.fog
    }
    fn logic_op_enabled(&self) -> bool {
        self.logic_op
    }
    fn stencil_test_enabled(&self) -> bool {
        self.stencil_test
    }
    fn depth_test_enabled(&self) -> bool {
        self.depth_test
    }
    fn texture_enabled(&self) -> bool {
        self.texture
    }

    fn vertex_format(&self) -> VertexFormat {
        VertexFormat(self.vtype)
    }

    fn color_buf_addr(&self) -> u32 {
        0x0400_0000
    }
    fn color_buf_stride(&self) -> u16 {
        512
    }
    fn color_buf_format(&self) -> FramebufferFormat {
        FramebufferFormat::Rgba8888
    }
    fn depth_buf_addr(&self) -> u32 {
        0x0440_0000
    }
    fn depth_buf_stride(&self) -> u16 {
        512
    }

    fn scissor_rect(&self) -> [u16; 4] {
        self.scissor
    }
    fn region_offset(&self) -> [u16; 2] {
        [0, 0]
    }
    fn cull_mode(&self) -> CullMode {
        CullMode::Clockwise
    }
    fn clear_write_flags(&self) -> ClearFlags {
        ClearFlags::COLOR | ClearFlags::DEPTH
    }

    fn shade_model(&self) -> ShadeModel {
        ShadeModel::Gouraud
    }
    fn tex_func(&self) -> TexFunc {
        TexFunc::Modulate
    }
    fn tex_env_color(&self) -> [u8; 4] {
        [0, 0, 0, 255]
    }
    fn use_texture_alpha(&self) -> bool {
        true
    }
    fn fog_color(&self) -> [u8; 4] {
        [128, 128, 160, 255]
    }
    fn fog_params(&self) -> [f32; 2] {
        [4096.0, 1.0 / 1024.0]
    }

    fn blend_src_factor(&self) -> BlendFactor {
        self.blend_src
    }
    fn blend_dst_factor(&self) -> BlendFactor {
        BlendFactor::OneMinusSrcAlpha
    }
    fn blend_equation(&self) -> BlendOp {
        BlendOp::Add
    }
    fn blend_fix_src(&self) -> [u8; 3] {
        [255, 255, 255]
    }
    fn blend_fix_dst(&self) -> [u8; 3] {
        [0, 0, 0]
    }
    fn alpha_test_func(&self) -> CompareFunc {
        CompareFunc::Greater
    }
    fn alpha_test_ref(&self) -> u8 {
        0
    }
    fn alpha_test_mask(&self) -> u8 {
        0xFF
    }
    fn color_test_func(&self) -> ColorTestFunc {
        ColorTestFunc::Always
    }
    fn color_test_ref(&self) -> [u8; 3] {
        [0, 0, 0]
    }
    fn color_test_mask(&self) -> [u8; 3] {
        [0xFF, 0xFF, 0xFF]
    }
    fn color_write_mask(&self) -> [u8; 4] {
        [0xFF, 0xFF, 0xFF, 0xFF]
    }
    fn logic_op(&self) -> LogicOp {
        LogicOp::Copy
    }

    fn depth_func(&self) -> CompareFunc {
        CompareFunc::GreaterOrEqual
    }
    fn depth_write_enabled(&self) -> bool {
        true
    }
    fn stencil_func(&self) -> CompareFunc {
        CompareFunc::Always
    }
    fn stencil_ref(&self) -> u8 {
        0
    }
    fn stencil_mask(&self) -> u8 {
        0xFF
    }
    fn stencil_op_fail(&self) -> StencilOp {
        StencilOp::Keep
    }
    fn stencil_op_zfail(&self) -> StencilOp {
        StencilOp::Keep
    }
    fn stencil_op_zpass(&self) -> StencilOp {
        StencilOp::Replace
    }

    fn texture_addr(&self, level: usize) -> u32 {
        0x0410_0000 + (level as u32) * 0x1_0000
    }
    fn texture_stride(&self, _level: usize) -> u16 {
        256
    }
    fn texture_size_log2(&self) -> [u8; 2] {
        [8, 8]
    }
    fn texture_format(&self) -> TexFormat {
        TexFormat::Clut8
    }
    fn texture_max_level(&self) -> u8 {
        0
    }
    fn texture_swizzled(&self) -> bool {
        true
    }

    fn tex_scale(&self) -> [f32; 2] {
        [1.0, 1.0]
    }
    fn tex_offset(&self) -> [f32; 2] {
        [0.0, 0.0]
    }

    fn tex_min_filter(&self) -> TexFilter {
        TexFilter::Linear
    }
    fn tex_mag_filter(&self) -> TexFilter {
        TexFilter::Linear
    }
    fn tex_wrap_u(&self) -> WrapMode {
        WrapMode::Repeat
    }
    fn tex_wrap_v(&self) -> WrapMode {
        WrapMode::Clamp
    }
    fn tex_lod_bias(&self) -> f32 {
        0.0
    }

    fn clut_format(&self) -> ClutFormat {
        ClutFormat::Rgba5551
    }
    fn clut_shift(&self) -> u8 {
        0
    }
    fn clut_mask(&self) -> u8 {
        0xFF
    }
    fn clut_base(&self) -> u8 {
        0
    }
    fn clut_bytes(&self) -> &[u8] {
        &self.clut
    }

    fn viewport_scale(&self) -> [f32; 3] {
        [240.0, -136.0, 32767.5]
    }
    fn viewport_center(&self) -> [f32; 3] {
        [2048.0, 2048.0, 32767.5]
    }
    fn depth_range(&self) -> [u16; 2] {
        [0, 65535]
    }

    fn world_matrix(&self) -> [f32; 12] {
        [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0]
    }
    fn view_matrix(&self) -> [f32; 12] {
        [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0]
    }
    fn tex_matrix(&self) -> [f32; 12] {
        [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0]
    }
    fn proj_matrix(&self) -> [f32; 16] {
        let mut m = [0.0; 16];
        m[0] = 1.0;
        m[5] = 1.0;
        m[10] = 1.0;
        m[15] = 1.0;
        m
    }
    fn bone_matrix(&self, bone: usize) -> [f32; 12] {
        let mut m = [0.0; 12];
        m[0] = bone as f32 + 1.0;
        m
    }

    fn ambient_color(&self) -> [u8; 4] {
        [32, 32, 32, 255]
    }
    fn material_ambient(&self) -> [u8; 4] {
        [255, 255, 255, 255]
    }
    fn material_diffuse(&self) -> [u8; 4] {
        [255, 255, 255, 255]
    }
    fn material_specular(&self) -> [u8; 4] {
        [0, 0, 0, 255]
    }
    fn material_emissive(&self) -> [u8; 4] {
        [0, 0, 0, 0]
    }
    fn specular_power(&self) -> f32 {
        8.0
    }
    fn light_mode(&self) -> LightMode {
        LightMode::SingleColor
    }

    fn light_type(&self, _light: usize) -> LightType {
        LightType::Directional
    }
    fn light_pos(&self, light: usize) -> [f32; 3] {
        [light as f32, 0.0, 1.0]
    }
    fn light_dir(&self, _light: usize) -> [f32; 3] {
        [0.0, 0.0, -1.0]
    }
    fn light_attenuation(&self, _light: usize) -> [f32; 3] {
        [1.0, 0.0, 0.0]
    }
    fn light_spot(&self, _light: usize) -> [f32; 2] {
        [0.0, -1.0]
    }
    fn light_ambient(&self, _light: usize) -> [u8; 4] {
        [0, 0, 0, 255]
    }
    fn light_diffuse(&self, _light: usize) -> [u8; 4] {
        [255, 255, 255, 255]
    }
    fn light_specular(&self, _light: usize) -> [u8; 4] {
        [255, 255, 255, 255]
    }

    fn morph_weights(&self) -> [f32; 8] {
        [1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]
    }

    fn transfer_src(&self) -> u32 {
        0x0420_0000
    }
    fn transfer_src_stride(&self) -> u16 {
        512
    }
    fn transfer_src_pos(&self) -> [u16; 2] {
        [16, 8]
    }
    fn transfer_dst(&self) -> u32 {
        0x0400_0000
    }
    fn transfer_dst_stride(&self) -> u16 {
        512
    }
    fn transfer_dst_pos(&self) -> [u16; 2] {
        [0, 0]
    }
    fn transfer_size(&self) -> [u16; 2] {
        [64, 32]
    }
    fn transfer_bpp(&self) -> u8 {
        4
    }
}

fn prim_word(kind: PrimitiveKind, count: u16) -> u32 {
    ((u8::from(kind) as u32) << 16) | count as u32
}

fn draw(
    stream: &mut GeStream,
    regs: &MockRegs,
    dirty: DirtyFlags,
) -> Result<DirtyFlags, StreamError> {
    stream.submit_draw(
        regs,
        dirty,
        prim_word(PrimitiveKind::TriangleStrip, 4),
        0x0880_0000,
        0,
    )
}

fn last_draw_command(stream: &GeStream) -> ge_stream::stream::DrawCall {
    match stream.commands().last() {
        Some(Command::Draw(draw)) => *draw,
        other => panic!("expected a draw command, got {:?}", other),
    }
}

#[test]
fn empty_dirty_inherits_indices_and_caps() {
    let mut stream = GeStream::new(&StreamLimits::default());
    let mut regs = MockRegs::default();
    regs.blend = true;
    regs.depth_test = true;
    regs.texture = true;
    regs.lighting = true;
    regs.lights_on[0] = true;

    draw(&mut stream, &regs, DirtyFlags::all_state()).unwrap();
    let first = last_draw_command(&stream);

    draw(&mut stream, &regs, DirtyFlags::empty()).unwrap();
    let second = last_draw_command(&stream);

    assert_eq!(second.caps, first.caps);
    assert_eq!(second.state, first.state);
    // No table grew.
    assert_eq!(stream.tables().blends.len(), 1);
    assert_eq!(stream.tables().rasterizers.len(), 1);
}

#[test]
fn first_draw_loads_open_categories_and_returns_closed_ones() {
    let mut stream = GeStream::new(&StreamLimits::default());
    let mut regs = MockRegs::default();
    regs.blend = true;
    regs.depth_test = true;
    regs.texture = true;
    regs.lighting = true;
    regs.lights_on[0] = true;

    let residual = draw(&mut stream, &regs, DirtyFlags::all_state()).unwrap();
    let cmd = last_draw_command(&stream);

    assert!(cmd.caps.contains(Capabilities::TRANSFORM | Capabilities::BLEND));
    assert_eq!(cmd.state.framebuffer, 0);
    assert_eq!(cmd.state.blend, 0);
    assert_eq!(cmd.state.palette, 0);
    assert_eq!(cmd.state.lights[0], 0);
    // Lights 1-3 are disabled: their gates are closed, so the bits stay
    // pending and the indices stay at the bootstrap sentinel.
    assert_eq!(
        residual,
        DirtyFlags::LIGHT1 | DirtyFlags::LIGHT2 | DirtyFlags::LIGHT3 | DirtyFlags::BONES
    );
    assert_eq!(cmd.state.lights[1], INVALID_INDEX);
    assert_eq!(stream.tables().lights.len(), 1);
}

#[test]
fn bounded_growth_sets_sticky_full_until_reset() {
    let mut stream = GeStream::new(&StreamLimits::uniform(3));
    let mut regs = MockRegs::default();

    for i in 0..3 {
        regs.scissor = [i, 0, 480, 272];
        draw(&mut stream, &regs, DirtyFlags::RASTERIZER).unwrap();
    }
    assert!(stream.full_mask().contains(DirtyFlags::RASTERIZER));
    assert!(stream.is_full());

    // Sticky: rejected submissions don't clear it.
    let err = draw(&mut stream, &regs, DirtyFlags::empty()).unwrap_err();
    assert!(matches!(err, StreamError::StreamFull(mask) if mask.contains(DirtyFlags::RASTERIZER)));
    assert_eq!(stream.commands().len(), 3);

    stream.reset();
    assert_eq!(stream.full_mask(), DirtyFlags::empty());
    assert_eq!(stream.commands().len(), 0);
    assert_eq!(stream.tables().rasterizers.len(), 0);
}

#[test]
fn rasterizer_dedup_collapses_identical_snapshots() {
    let mut stream = GeStream::new(&StreamLimits::default());
    let regs = MockRegs::default();

    draw(&mut stream, &regs, DirtyFlags::RASTERIZER).unwrap();
    draw(&mut stream, &regs, DirtyFlags::RASTERIZER).unwrap();

    assert_eq!(stream.tables().rasterizers.len(), 1);
    let commands = stream.commands();
    let (a, b) = match (&commands[0], &commands[1]) {
        (Command::Draw(a), Command::Draw(b)) => (a, b),
        other => panic!("expected two draws, got {:?}", other),
    };
    assert_eq!(a.state.rasterizer, 0);
    assert_eq!(b.state.rasterizer, 0);
}

#[test]
fn closed_gate_keeps_dirty_bit_until_gate_opens() {
    let mut stream = GeStream::new(&StreamLimits::default());
    let mut regs = MockRegs::default();
    // Blend, alpha test, and color test all off: the blend gate is closed.
    let residual = draw(
        &mut stream,
        &regs,
        DirtyFlags::BLEND | DirtyFlags::CAPABILITIES,
    )
    .unwrap();

    assert!(residual.contains(DirtyFlags::BLEND));
    assert_eq!(stream.tables().blends.len(), 0);
    assert_eq!(last_draw_command(&stream).state.blend, INVALID_INDEX);

    // The blend enable is written (capabilities change), but the blend
    // registers themselves are not touched again: the retained bit must
    // still cause a load now that the gate is open.
    regs.blend = true;
    let residual = draw(&mut stream, &regs, residual | DirtyFlags::CAPABILITIES).unwrap();
    assert!(!residual.contains(DirtyFlags::BLEND));
    assert_eq!(stream.tables().blends.len(), 1);
    assert_eq!(last_draw_command(&stream).state.blend, 0);
}

#[test]
fn clear_mode_masks_raster_capabilities() {
    let mut regs = MockRegs::default();
    regs.clear_mode = true;
    regs.blend = true;
    regs.alpha_test = true;
    regs.color_test = true;
    regs.fog = true;
    regs.logic_op = true;
    regs.stencil_test = true;
    regs.depth_test = true;
    regs.texture = true;

    let caps = resolve_capabilities(&regs);
    assert!(caps.contains(Capabilities::TRANSFORM));
    assert!(!caps.intersects(
        Capabilities::BLEND
            | Capabilities::ALPHA_TEST
            | Capabilities::COLOR_TEST
            | Capabilities::FOG
            | Capabilities::LOGIC_OP
            | Capabilities::STENCIL_TEST
            | Capabilities::DEPTH_TEST
            | Capabilities::TEXTURE
    ));
}

#[test]
fn through_mode_masks_transform_capabilities() {
    let mut regs = MockRegs::default();
    regs.through_mode = true;
    regs.lighting = true;
    regs.lights_on = [true; 4];
    regs.fog = true;
    regs.vtype = 1 << 9; // weights present
    regs.blend = true;

    let caps = resolve_capabilities(&regs);
    assert!(!caps.contains(Capabilities::TRANSFORM));
    assert!(!caps.intersects(
        Capabilities::LIGHT0
            | Capabilities::LIGHT1
            | Capabilities::LIGHT2
            | Capabilities::LIGHT3
            | Capabilities::BONES
            | Capabilities::FOG
    ));
    assert!(caps.contains(Capabilities::BLEND));
}

#[test]
fn end_to_end_capacity_two() {
    let mut stream = GeStream::new(&StreamLimits::uniform(2));
    let mut regs = MockRegs::default();
    regs.blend = true;

    // Draw #1: framebuffer, rasterizer, and blend load.
    let residual = draw(
        &mut stream,
        &regs,
        DirtyFlags::FRAMEBUFFER
            | DirtyFlags::RASTERIZER
            | DirtyFlags::BLEND
            | DirtyFlags::CAPABILITIES,
    )
    .unwrap();
    assert_eq!(residual, DirtyFlags::empty());
    assert_eq!(stream.tables().framebuffers.len(), 1);
    assert_eq!(stream.tables().rasterizers.len(), 1);
    assert_eq!(stream.tables().blends.len(), 1);

    // Draw #2: nothing dirty, everything inherited.
    draw(&mut stream, &regs, DirtyFlags::empty()).unwrap();
    let commands = stream.commands();
    let (first, second) = match (&commands[0], &commands[1]) {
        (Command::Draw(a), Command::Draw(b)) => (*a, *b),
        other => panic!("expected draws, got {:?}", other),
    };
    assert_eq!(second.state, first.state);
    assert_eq!(stream.tables().blends.len(), 1);

    // Draw #3: new blend values fill the blend table.
    regs.blend_src = BlendFactor::Fixed;
    draw(&mut stream, &regs, DirtyFlags::BLEND).unwrap();
    assert_eq!(stream.tables().blends.len(), 2);
    assert!(stream.full_mask().contains(DirtyFlags::BLEND));

    // Draw #4: rejected, nothing appended.
    let err = draw(&mut stream, &regs, DirtyFlags::BLEND).unwrap_err();
    assert!(matches!(err, StreamError::StreamFull(_)));
    assert_eq!(stream.commands().len(), 3);
}

#[test]
fn transfers_are_stateless() {
    let mut stream = GeStream::new(&StreamLimits::default());
    let regs = MockRegs::default();

    draw(&mut stream, &regs, DirtyFlags::RASTERIZER).unwrap();
    stream.submit_transfer(&regs).unwrap();

    assert_eq!(stream.commands().len(), 2);
    match &stream.commands()[1] {
        Command::Transfer(op) => {
            assert_eq!(op.src, 0x0420_0000);
            assert_eq!(op.src_pos, [16, 8]);
            assert_eq!(op.dst, 0x0400_0000);
            assert_eq!(op.size, [64, 32]);
            assert_eq!(op.bpp, 4);
        }
        other => panic!("expected a transfer, got {:?}", other),
    }
    // No table was touched.
    assert_eq!(stream.tables().rasterizers.len(), 1);
    assert_eq!(stream.tables().framebuffers.len(), 0);
}

#[test]
fn palette_is_copied_and_hashed() {
    let mut stream = GeStream::new(&StreamLimits::default());
    let mut regs = MockRegs::default();
    regs.texture = true;
    regs.clut = (0..64u8).collect();

    draw(
        &mut stream,
        &regs,
        DirtyFlags::PALETTE | DirtyFlags::CAPABILITIES,
    )
    .unwrap();

    let palette = stream.tables().palettes.get(0).copied().unwrap();
    assert_eq!(stream.palette_bytes(&palette), &regs.clut[..]);
    assert_eq!(palette.hash, crc32fast::hash(&regs.clut));
    assert_eq!(palette.len, 64);
    assert_eq!(stream.palette_entries16(&palette).len(), 32);

    // The caller mutates its buffer and marks the palette dirty again: a
    // second, independent copy is captured.
    regs.clut[0] = 0xFF;
    draw(&mut stream, &regs, DirtyFlags::PALETTE).unwrap();
    assert_eq!(stream.tables().palettes.len(), 2);
    let second = stream.tables().palettes.get(1).copied().unwrap();
    assert_ne!(second.offset, palette.offset);
    assert_ne!(second.hash, palette.hash);
    assert_eq!(stream.palette_bytes(&second)[0], 0xFF);
    // The first copy is untouched.
    assert_eq!(stream.palette_bytes(&palette)[0], 0);
}

#[test]
fn bones_load_as_a_set() {
    let mut stream = GeStream::new(&StreamLimits::default());
    let mut regs = MockRegs::default();
    // weight format u8, 3 weights per vertex
    regs.vtype = (1 << 9) | (2 << 14);

    draw(
        &mut stream,
        &regs,
        DirtyFlags::BONES | DirtyFlags::CAPABILITIES,
    )
    .unwrap();

    let cmd = last_draw_command(&stream);
    assert!(cmd.caps.contains(Capabilities::BONES));
    assert_eq!(stream.tables().bones.len(), 3);
    assert_eq!(cmd.state.bones[..3], [0, 1, 2]);
    assert_eq!(cmd.state.bones[3], INVALID_INDEX);
    assert_eq!(stream.tables().bones.get(1).unwrap().matrix[0], 2.0);
}

#[test]
fn bone_set_that_cannot_fit_stays_pending() {
    let mut limits = StreamLimits::default();
    limits.bones = 2;
    let mut stream = GeStream::new(&limits);
    let mut regs = MockRegs::default();
    regs.vtype = (1 << 9) | (2 << 14); // 3 bones into a 2-entry table

    let residual = draw(
        &mut stream,
        &regs,
        DirtyFlags::BONES | DirtyFlags::CAPABILITIES,
    )
    .unwrap();

    assert!(residual.contains(DirtyFlags::BONES));
    assert_eq!(stream.tables().bones.len(), 0);
    assert!(stream.full_mask().contains(DirtyFlags::BONES));
}

#[test]
fn invalid_primitive_is_rejected() {
    let mut stream = GeStream::new(&StreamLimits::default());
    let regs = MockRegs::default();

    let word = (7 << 16) | 4;
    let err = stream
        .submit_draw(&regs, DirtyFlags::empty(), word, 0, 0)
        .unwrap_err();
    assert_eq!(err, StreamError::InvalidPrimitive(word));
    assert_eq!(stream.commands().len(), 0);
}

#[test]
fn command_capacity_is_back_pressure_too() {
    let mut limits = StreamLimits::default();
    limits.commands = 2;
    let mut stream = GeStream::new(&limits);
    let regs = MockRegs::default();

    draw(&mut stream, &regs, DirtyFlags::empty()).unwrap();
    draw(&mut stream, &regs, DirtyFlags::empty()).unwrap();
    assert!(stream.full_mask().contains(DirtyFlags::COMMANDS));

    let err = draw(&mut stream, &regs, DirtyFlags::empty()).unwrap_err();
    assert!(matches!(err, StreamError::StreamFull(_)));
    assert_eq!(stream.commands().len(), 2);
}

#[test]
fn arena_exhaustion_drops_the_draw() {
    let mut limits = StreamLimits::default();
    limits.arena_bytes = 16;
    let mut stream = GeStream::new(&limits);
    let mut regs = MockRegs::default();
    regs.texture = true;
    regs.clut = vec![0xAB; 1024];

    let err = draw(
        &mut stream,
        &regs,
        DirtyFlags::PALETTE | DirtyFlags::CAPABILITIES,
    )
    .unwrap_err();
    assert!(matches!(err, StreamError::ArenaExhausted { needed: 1024, .. }));
    assert_eq!(stream.commands().len(), 0);
}

#[test]
fn vertex_format_is_carried_inline_every_draw() {
    let mut stream = GeStream::new(&StreamLimits::default());
    let mut regs = MockRegs::default();
    regs.vtype = 0x0000_0197;

    draw(&mut stream, &regs, DirtyFlags::empty()).unwrap();
    regs.vtype = 0x0080_0102;
    draw(&mut stream, &regs, DirtyFlags::empty()).unwrap();

    let commands = stream.commands();
    let (a, b) = match (&commands[0], &commands[1]) {
        (Command::Draw(a), Command::Draw(b)) => (*a, *b),
        other => panic!("expected draws, got {:?}", other),
    };
    // Even with nothing dirty, the format rides on the command itself.
    assert_eq!(a.vertex_format, VertexFormat(0x0000_0197));
    assert_eq!(b.vertex_format, VertexFormat(0x0080_0102));
}
