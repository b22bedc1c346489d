//! Small value types shared across the register file, fetcher, and
//! compositor.

/// Per-layer background configuration (§3).
#[derive(Debug, Clone, Copy, Default)]
pub struct BgLayer {
    /// VRAM word offset of the tilemap base (10-bit).
    pub tilemap_addr: u16,
    /// VRAM word offset of the CHR base (12-bit).
    pub chr_addr: u16,
    /// Horizontal scroll (10-bit).
    pub h_scroll: u16,
    /// Vertical scroll (10-bit).
    pub v_scroll: u16,
    pub double_width: bool,
    pub double_height: bool,
}

/// One fetched tile column's worth of background data for a scanline.
#[derive(Debug, Clone, Copy, Default)]
pub struct BgTile {
    pub tilemap_data: u16,
    pub chr_data: [u16; 4],
    pub v_scroll: u16,
}

/// Mode 7 affine transform and scroll state (§3).
#[derive(Debug, Clone, Copy, Default)]
pub struct Mode7State {
    pub matrix_a: i16,
    pub matrix_b: i16,
    pub matrix_c: i16,
    pub matrix_d: i16,
    pub center_x: i16,
    pub center_y: i16,
    pub h_scroll: i16,
    pub v_scroll: i16,
    pub horizontal_mirror: bool,
    pub vertical_mirror: bool,
    pub large_map: bool,
    pub fill_with_tile0: bool,
    pub ext_bg_enabled: bool,
    /// Scroll values latched at the start of each scanline's render (the
    /// hardware keeps the scroll fixed for the whole line even if the
    /// programmer writes a new value mid-scanline).
    pub h_scroll_latch: i16,
    pub v_scroll_latch: i16,
}

/// One rectangular window instance (§3/§4.6).
#[derive(Debug, Clone, Copy, Default)]
pub struct Window {
    pub left: u8,
    pub right: u8,
}

impl Window {
    pub fn contains(&self, x: u16) -> bool {
        x >= self.left as u16 && x <= self.right as u16
    }
}

/// Two-bit window combination logic selector (§4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowLogic {
    #[default]
    Or,
    And,
    Xor,
    Xnor,
}

impl WindowLogic {
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x3 {
            0 => WindowLogic::Or,
            1 => WindowLogic::And,
            2 => WindowLogic::Xor,
            _ => WindowLogic::Xnor,
        }
    }

    pub fn combine(self, a: bool, b: bool) -> bool {
        match self {
            WindowLogic::Or => a || b,
            WindowLogic::And => a && b,
            WindowLogic::Xor => a ^ b,
            WindowLogic::Xnor => !(a ^ b),
        }
    }
}

/// Per-layer window settings: whether each of the two windows applies, with
/// what inversion, and (when both apply) which logic combines them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayerWindowConfig {
    pub window_enabled: [bool; 2],
    pub window_inverted: [bool; 2],
    pub logic: WindowLogic,
}

impl LayerWindowConfig {
    /// Evaluate whether column `x` is "inside" this layer's combined window
    /// region, given the two window rectangles.
    pub fn is_inside(&self, x: u16, windows: &[Window; 2]) -> bool {
        let active: Vec<bool> = (0..2)
            .filter(|&i| self.window_enabled[i])
            .map(|i| windows[i].contains(x) ^ self.window_inverted[i])
            .collect();

        match active.len() {
            0 => false,
            1 => active[0],
            _ => self.logic.combine(active[0], active[1]),
        }
    }
}

/// The four color-math clip/prevent window modes (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowMathMode {
    #[default]
    Never,
    OutsideWindow,
    InsideWindow,
    Always,
}

impl WindowMathMode {
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x3 {
            0 => WindowMathMode::Never,
            1 => WindowMathMode::OutsideWindow,
            2 => WindowMathMode::InsideWindow,
            _ => WindowMathMode::Always,
        }
    }

    /// Whether the mode applies, given the color-window's combined
    /// "is inside" verdict for this column.
    pub fn applies(self, inside_color_window: bool) -> bool {
        match self {
            WindowMathMode::Never => false,
            WindowMathMode::OutsideWindow => !inside_color_window,
            WindowMathMode::InsideWindow => inside_color_window,
            WindowMathMode::Always => true,
        }
    }
}

/// A decoded BGR555 color, channels in 0..=31.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bgr555 {
    pub b: u8,
    pub g: u8,
    pub r: u8,
}

impl Bgr555 {
    pub fn from_word(word: u16) -> Self {
        Bgr555 {
            r: (word & 0x1F) as u8,
            g: ((word >> 5) & 0x1F) as u8,
            b: ((word >> 10) & 0x1F) as u8,
        }
    }

    pub fn to_word(self) -> u16 {
        (self.r as u16 & 0x1F) | ((self.g as u16 & 0x1F) << 5) | ((self.b as u16 & 0x1F) << 10)
    }

    pub const BLACK: Bgr555 = Bgr555 { r: 0, g: 0, b: 0 };
}
