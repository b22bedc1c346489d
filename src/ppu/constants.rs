//! Hardware-mandated sizes and lookup tables for the PPU core.

/// VRAM size in 16-bit words (32 KiB).
pub const VRAM_WORD_COUNT: usize = 0x8000;
/// CGRAM size in 15-bit color entries.
pub const CGRAM_ENTRY_COUNT: usize = 256;
/// OAM low-table size in bytes (128 sprites * 4 bytes).
pub const OAM_LOW_SIZE: usize = 512;
/// OAM high-table size in bytes (2 bits/sprite, packed).
pub const OAM_HIGH_SIZE: usize = 32;

/// Visible main-screen width before hi-res doubling.
pub const SCREEN_WIDTH: usize = 256;
/// Visible main-screen height (NTSC, non-overscan).
pub const SCREEN_HEIGHT: usize = 224;
/// Overscan main-screen height.
pub const SCREEN_HEIGHT_OVERSCAN: usize = 239;

/// Hi-res/interlace output width: two columns are emitted per source dot
/// whenever hi-res (explicit SETINI flag or BG mode 5/6) is active (§4.5).
pub const HIRES_WIDTH: usize = 512;
/// Hi-res/interlace output height: the overscan line count doubled, so an
/// interlaced field can occupy odd and even rows independently (§4.5/GLOSSARY).
pub const HIRES_HEIGHT: usize = SCREEN_HEIGHT_OVERSCAN * 2;

/// Number of sprites evaluated for visibility, per scanline.
pub const MAX_SPRITES_PER_SCANLINE: usize = 32;
/// Number of sprite tiles fetched (rows), per scanline, before time-over.
pub const MAX_SPRITE_TILES_PER_SCANLINE: usize = 34;
/// Number of OAM sprite descriptors.
pub const OAM_SPRITE_COUNT: usize = 128;

/// Sprite width/height in 8-pixel tile units, indexed `[oam_mode][size_toggle][axis]`
/// where `axis` 0 = x, 1 = y. Grounded on the `_oamSizes` table in the
/// original renderer: each OAM mode selects between a "small" and "large"
/// sprite footprint.
pub const OAM_SIZES: [[[u8; 2]; 2]; 8] = [
    [[1, 1], [2, 2]], // mode 0: 8x8 / 16x16
    [[1, 1], [4, 4]], // mode 1: 8x8 / 32x32
    [[1, 1], [8, 8]], // mode 2: 8x8 / 64x64
    [[2, 2], [4, 4]], // mode 3: 16x16 / 32x32
    [[2, 2], [8, 8]], // mode 4: 16x16 / 64x64
    [[4, 4], [8, 8]], // mode 5: 32x32 / 64x64
    [[2, 4], [4, 8]], // mode 6: 16x32 / 32x64
    [[2, 4], [4, 4]], // mode 7: 16x32 / 32x32
];

/// PPU1 (5C77) chip version, reported in the low nibble of STAT77 (0x213E).
pub const PPU_CHIP_VERSION: u8 = 0x01;
/// PPU2 (5C78) chip version, reported in the low two bits of STAT78 (0x213F).
pub const PPU2_CHIP_VERSION: u8 = 0x03;

/// First PPU register address.
pub const REG_BASE: u16 = 0x2100;
/// Last PPU register address (inclusive).
pub const REG_END: u16 = 0x213F;
