//! SNES Picture Processing Unit: register file, VRAM/CGRAM/OAM storage,
//! background and sprite fetchers, compositor, and frame timing.
//!
//! The type is generic over [`BusHost`], the small capability trait the rest
//! of the system (CPU clock, open-bus fallback, NMI/frame notification)
//! plugs in through, so the PPU itself never depends on a concrete console
//! type.

mod background;
mod bus_host;
mod compositor;
pub mod constants;
mod memory;
mod registers;
mod sprites;
mod timing;
mod types;

#[cfg(test)]
mod tests;

pub use bus_host::{BusHost, NullBusHost};
pub use types::{BgLayer, BgTile, Bgr555, LayerWindowConfig, Mode7State, Window, WindowLogic, WindowMathMode};

use crate::bus::{AddressInfo, MemoryHandler};
use crate::config::PpuConfig;
use constants::{
    CGRAM_ENTRY_COUNT, HIRES_HEIGHT, HIRES_WIDTH, OAM_HIGH_SIZE, OAM_LOW_SIZE, SCREEN_HEIGHT_OVERSCAN, SCREEN_WIDTH,
    VRAM_WORD_COUNT,
};

/// The full PPU state machine.
///
/// `H` is the bus-host capability object: it supplies the master clock and
/// open-bus fallback value, and receives NMI/frame notifications. Tests and
/// benchmarks can drive a `Ppu<NullBusHost>` standalone.
pub struct Ppu<H: BusHost> {
    host: H,
    config: PpuConfig,

    // --- timing state (§4.7) ---
    scanline: u16,
    dot: u16,
    odd_frame: bool,
    frame_count: u64,
    nmi_flag: bool,
    nmi_scanline: u16,
    vblank_start_scanline: u16,
    base_vblank_end_scanline: u16,
    vblank_end_scanline: u16,
    overscan: bool,
    screen_interlace: bool,
    /// Explicit hi-res request from SETINI bit 3, independent of BG mode 5/6
    /// (which always render hi-res regardless of this flag).
    hi_res_mode: bool,
    /// Whether the previously emitted frame used hi-res/double-width output;
    /// tracked only so a host can detect a mid-stream resolution change.
    prev_output_was_hires: bool,

    // --- display control ---
    forced_blank: bool,
    brightness: u8,
    bg_mode: u8,
    bg_mode_priority: bool,
    bg_large_tiles: [bool; 4],
    mosaic_enable: [bool; 4],
    mosaic_size: u8,

    // --- background layer configuration (§3) ---
    layers: [BgLayer; 4],
    bg_scroll_latch: u8,
    /// Low byte of the previous BG1HOFS write; BG1's horizontal scroll
    /// register sources its low 3 bits from here instead of the shared
    /// scroll latch (§4.2 quirk).
    bg1_hofs_prev_byte: u8,
    mode7_latch: u8,

    // --- Mode 7 ---
    mode7: Mode7State,

    // --- VRAM/CGRAM/OAM storage ---
    vram: Vec<u16>,
    vram_address: u16,
    vram_address_remapping: u8,
    vmain_increment_on_high: bool,
    vmain_increment_amount: u16,
    vram_read_buffer: u16,

    cgram: [u16; CGRAM_ENTRY_COUNT],
    cgram_address: u16,
    cgram_low_buffer: u8,
    cgram_write_high_half: bool,
    cgram_read_high_half: bool,

    oam_low: [u8; OAM_LOW_SIZE],
    oam_high: [u8; OAM_HIGH_SIZE],
    internal_oam_address: u16,
    /// The programmer-visible 9-bit OAMADDR register (0x2102/3), distinct
    /// from `internal_oam_address` (§3): the internal byte address is this
    /// register's value doubled, and is what the OAM-reset quirk on a
    /// forced-blank 0x2100 write (§4.7) reloads from.
    oam_address_reg: u16,
    oam_write_buffer: u8,
    oam_mode: u8,
    oam_priority_rotation: bool,
    obj_interlace: bool,
    oam_base_address: u16,
    oam_address_offset: u16,

    // --- sprite pixel arrays, rebuilt once per visible scanline ---
    sprite_colors: [u8; SCREEN_WIDTH],
    sprite_priority: [u8; SCREEN_WIDTH],
    sprite_palette: [u8; SCREEN_WIDTH],
    time_over: bool,
    range_over: bool,

    // --- windows (§4.6) ---
    windows: [Window; 2],
    layer_windows: [LayerWindowConfig; 6],
    /// TMW (0x212E): per-layer bit, whether the main screen honors this
    /// layer's window mask at all (bit 4 = sprites, color-math layer 5 is
    /// always evaluated directly from `layer_windows[5]`).
    main_window_mask: u8,
    /// TSW (0x212F): same, for the sub screen.
    sub_window_mask: u8,

    // --- color math (§4.5) ---
    main_screen_enable: u8,
    sub_screen_enable: u8,
    color_math_enable: u8,
    color_math_subtract: bool,
    color_math_half: bool,
    color_math_add_subscreen: bool,
    color_math_clip_mode: WindowMathMode,
    color_math_prevent_mode: WindowMathMode,
    direct_color_mode: bool,
    fixed_color: Bgr555,

    // --- open bus / latched status ---
    ppu1_open_bus: u8,
    ppu2_open_bus: u8,
    h_latch: u16,
    v_latch: u16,
    h_latch_toggle: bool,
    v_latch_toggle: bool,
    /// STAT78 bit 6: set whenever the H/V counters are latched (software
    /// latch via 0x2137, or a satisfied external location-latch request).
    latched: bool,
    /// Pending external location-latch request (super-scope, §4.7): armed
    /// by [`Ppu::request_location_latch`], consumed once the running
    /// scanline/dot passes the requested target.
    latch_request: Option<(u16, u16)>,

    // --- output ---
    frame_buffer: Vec<Bgr555>,
}

impl<H: BusHost> Ppu<H> {
    pub fn new(host: H, config: PpuConfig) -> Self {
        let mut ppu = Ppu {
            host,
            config,
            scanline: 0,
            dot: 0,
            odd_frame: false,
            frame_count: 0,
            nmi_flag: false,
            nmi_scanline: 0,
            vblank_start_scanline: 225,
            base_vblank_end_scanline: 0,
            vblank_end_scanline: 0,
            overscan: false,
            screen_interlace: false,
            hi_res_mode: false,
            prev_output_was_hires: false,
            forced_blank: true,
            brightness: 0,
            bg_mode: 0,
            bg_mode_priority: false,
            bg_large_tiles: [false; 4],
            mosaic_enable: [false; 4],
            mosaic_size: 0,
            layers: [BgLayer::default(); 4],
            bg_scroll_latch: 0,
            bg1_hofs_prev_byte: 0,
            mode7_latch: 0,
            mode7: Mode7State::default(),
            vram: vec![0; VRAM_WORD_COUNT],
            vram_address: 0,
            vram_address_remapping: 0,
            vmain_increment_on_high: true,
            vmain_increment_amount: 1,
            vram_read_buffer: 0,
            cgram: [0; CGRAM_ENTRY_COUNT],
            cgram_address: 0,
            cgram_low_buffer: 0,
            cgram_write_high_half: false,
            cgram_read_high_half: false,
            oam_low: [0; OAM_LOW_SIZE],
            oam_high: [0; OAM_HIGH_SIZE],
            internal_oam_address: 0,
            oam_address_reg: 0,
            oam_write_buffer: 0,
            oam_mode: 0,
            oam_priority_rotation: false,
            obj_interlace: false,
            oam_base_address: 0,
            oam_address_offset: 0x1000,
            sprite_colors: [0; SCREEN_WIDTH],
            sprite_priority: [0; SCREEN_WIDTH],
            sprite_palette: [0; SCREEN_WIDTH],
            time_over: false,
            range_over: false,
            windows: [Window::default(); 2],
            layer_windows: [LayerWindowConfig::default(); 6],
            main_window_mask: 0,
            sub_window_mask: 0,
            main_screen_enable: 0,
            sub_screen_enable: 0,
            color_math_enable: 0,
            color_math_subtract: false,
            color_math_half: false,
            color_math_add_subscreen: false,
            color_math_clip_mode: WindowMathMode::default(),
            color_math_prevent_mode: WindowMathMode::default(),
            direct_color_mode: false,
            fixed_color: Bgr555::BLACK,
            ppu1_open_bus: 0,
            ppu2_open_bus: 0,
            h_latch: 0,
            v_latch: 0,
            h_latch_toggle: false,
            v_latch_toggle: false,
            latched: false,
            latch_request: None,
            frame_buffer: vec![Bgr555::BLACK; HIRES_WIDTH * HIRES_HEIGHT],
        };
        ppu.recompute_timing_constants();
        ppu
    }

    /// Reinitialize all state to its post-power-on values (§4.7).
    pub fn power_on(&mut self) {
        self.vram.iter_mut().for_each(|w| *w = 0);
        self.cgram = [0; CGRAM_ENTRY_COUNT];
        self.oam_low = [0; OAM_LOW_SIZE];
        self.oam_high = [0; OAM_HIGH_SIZE];
        self.reset();
    }

    /// Reset register state without clearing VRAM/CGRAM/OAM contents (§4.7).
    pub fn reset(&mut self) {
        self.scanline = 0;
        self.dot = 0;
        self.odd_frame = false;
        self.frame_count = 0;
        self.nmi_flag = false;
        self.forced_blank = true;
        self.brightness = 0;
        self.bg_mode = 0;
        self.bg_mode_priority = false;
        self.bg_large_tiles = [false; 4];
        self.mosaic_enable = [false; 4];
        self.mosaic_size = 0;
        self.layers = [BgLayer::default(); 4];
        self.bg_scroll_latch = 0;
        self.bg1_hofs_prev_byte = 0;
        self.mode7_latch = 0;
        self.mode7 = Mode7State::default();
        self.vram_address = 0;
        self.vram_address_remapping = 0;
        self.vmain_increment_on_high = true;
        self.vmain_increment_amount = 1;
        self.vram_read_buffer = 0;
        self.cgram_address = 0;
        self.cgram_write_high_half = false;
        self.cgram_read_high_half = false;
        self.internal_oam_address = 0;
        self.oam_address_reg = 0;
        self.oam_mode = 0;
        self.oam_priority_rotation = false;
        self.obj_interlace = false;
        self.oam_base_address = 0;
        self.oam_address_offset = 0x1000;
        self.sprite_colors = [0; SCREEN_WIDTH];
        self.sprite_priority = [0; SCREEN_WIDTH];
        self.sprite_palette = [0; SCREEN_WIDTH];
        self.time_over = false;
        self.range_over = false;
        self.windows = [Window::default(); 2];
        self.layer_windows = [LayerWindowConfig::default(); 6];
        self.main_window_mask = 0;
        self.sub_window_mask = 0;
        self.main_screen_enable = 0;
        self.sub_screen_enable = 0;
        self.color_math_enable = 0;
        self.color_math_subtract = false;
        self.color_math_half = false;
        self.color_math_add_subscreen = false;
        self.color_math_clip_mode = WindowMathMode::default();
        self.color_math_prevent_mode = WindowMathMode::default();
        self.direct_color_mode = false;
        self.fixed_color = Bgr555::BLACK;
        self.ppu1_open_bus = 0;
        self.ppu2_open_bus = 0;
        self.h_latch = 0;
        self.v_latch = 0;
        self.h_latch_toggle = false;
        self.v_latch_toggle = false;
        self.latched = false;
        self.latch_request = None;
        self.overscan = false;
        self.screen_interlace = false;
        self.hi_res_mode = false;
        self.prev_output_was_hires = false;
        self.frame_buffer.iter_mut().for_each(|p| *p = Bgr555::BLACK);
        self.recompute_timing_constants();
    }

    /// Render the scanline that just completed into the frame buffer. Called
    /// from the timing module at the last dot of every visible scanline.
    ///
    /// The output buffer is always `HIRES_WIDTH` (512) wide: a hi-res
    /// scanline (SETINI bit 3, or BG mode 5/6) interleaves the sub-screen
    /// pixel into the even column and the main-screen pixel into the odd
    /// column; a normal-res scanline duplicates the main-screen pixel into
    /// both. Interlaced frames alternate which of the two buffer rows a
    /// scanline lands in by odd-frame parity; a non-interlaced frame writes
    /// the same content to both rows so `frame_buffer()` always presents a
    /// full `HIRES_HEIGHT`-tall image regardless of the current mode.
    fn render_current_scanline(&mut self) {
        self.evaluate_and_fetch_sprites();
        let hi_res = self.hi_res_mode || self.bg_mode == 5 || self.bg_mode == 6;
        let main_row = self.composite_scanline();
        let sub_row = if hi_res { Some(self.composite_subscreen_scanline()) } else { None };

        let y = self.scanline as usize;
        if y >= SCREEN_HEIGHT_OVERSCAN {
            self.prev_output_was_hires = hi_res;
            return;
        }

        let fields: &[usize] = if self.screen_interlace {
            if self.odd_frame { &[1] } else { &[0] }
        } else {
            &[0, 1]
        };

        for &field in fields {
            let base = (y * 2 + field) * HIRES_WIDTH;
            for col in 0..SCREEN_WIDTH {
                let (even, odd) = match &sub_row {
                    Some(sub) => (sub[col], main_row[col]),
                    None => (main_row[col], main_row[col]),
                };
                self.frame_buffer[base + col * 2] = even;
                self.frame_buffer[base + col * 2 + 1] = odd;
            }
        }
        self.prev_output_was_hires = hi_res;
    }

    /// Borrow the most recently rendered frame, one BGR555 pixel per cell,
    /// row-major, always `HIRES_WIDTH` (512) pixels wide by `HIRES_HEIGHT`
    /// (478) pixels tall (§4.5/GLOSSARY). Non-hi-res/non-interlace content
    /// is simply duplicated across the extra columns/rows so callers never
    /// need to branch on the current display mode.
    pub fn frame_buffer(&self) -> &[Bgr555] {
        &self.frame_buffer
    }

    /// Arm an external location-latch request (§4.7), as issued by a
    /// super-scope-style light gun. Once the running scanline/dot passes
    /// `(x, y)`, the H/V counters are captured and the STAT78 latched flag
    /// is set, exactly as if 0x2137 had been read at that position.
    pub fn request_location_latch(&mut self, x: u16, y: u16) {
        self.latch_request = Some((x, y));
    }

    /// Check a pending `request_location_latch` target against the current
    /// scanline/dot and capture the counters once the target has passed.
    /// Called on every dot advance and whenever 0x213C/D/F are read, so a
    /// late poll still observes a latch that happened earlier mid-scanline.
    pub(crate) fn process_location_latch_request(&mut self) {
        if let Some((x, y)) = self.latch_request {
            let scanline = self.get_real_scanline();
            let dot = self.dot;
            if scanline > y || (scanline == y && dot >= x) {
                self.latch_request = None;
                self.h_latch = x;
                self.v_latch = y;
                self.latched = true;
            }
        }
    }

    pub fn config(&self) -> &PpuConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

impl<H: BusHost + Default> Default for Ppu<H> {
    fn default() -> Self {
        Ppu::new(H::default(), PpuConfig::default())
    }
}

/// Registers a PPU instance answers at 0x2100-0x213F, plus the CPU-side
/// open-bus register window (0x2134-0x2139 reads, 0x2180-class WRAM access
/// are handled by other handlers entirely outside this crate's scope).
impl<H: BusHost> MemoryHandler for Ppu<H> {
    fn read(&mut self, addr: u32) -> u8 {
        self.register_read(addr)
    }

    fn write(&mut self, addr: u32, value: u8) {
        self.register_write(addr, value);
    }

    fn peek(&self, addr: u32) -> u8 {
        self.register_peek(addr)
    }

    fn peek_block(&self, addr: u32, dest: &mut [u8]) {
        for (i, slot) in dest.iter_mut().enumerate() {
            *slot = self.register_peek(addr.wrapping_add(i as u32));
        }
    }

    fn get_absolute_address(&self, _addr: u32) -> AddressInfo {
        AddressInfo::none()
    }
}
