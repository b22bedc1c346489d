//! Hardware register quirks that don't fit naturally alongside the
//! straightforward register tests (§4.2).

use super::test_ppu;
use crate::bus::MemoryHandler;

#[test]
fn bg1_hofs_low_bits_come_from_its_own_previous_write_not_the_shared_latch() {
    let mut ppu = test_ppu();

    // First BG1HOFS write seeds the "previous write" byte (0x12) and, since
    // the shared latch starts at 0, its own low 3 bits come from that same
    // write.
    ppu.write(0x210D, 0x12);
    assert_eq!(ppu.layers[0].h_scroll & 0x3FF, 0x12 << 8 & 0x3FF);

    // Now poison the shared scroll latch via an unrelated scroll register
    // (BG2HOFS) without touching BG1HOFS's own previous-write byte.
    ppu.write(0x210F, 0xFF);

    // A second BG1HOFS write must take its high bits from the shared latch
    // (now 0xFF) but its low 3 bits from the *first* BG1HOFS write (0x12),
    // not from the intervening BG2HOFS write.
    ppu.write(0x210D, 0x34);
    let expected = (((0x34u16) << 8) | (0xFFu16 & !0x07) | (0x12u16 & 0x07)) & 0x3FF;
    assert_eq!(ppu.layers[0].h_scroll, expected);
}

#[test]
fn bg1_vofs_uses_the_shared_latch_with_no_special_casing() {
    let mut ppu = test_ppu();
    ppu.write(0x210E, 0xAB);
    let expected = ((0xABu16) << 8) & 0x3FF;
    assert_eq!(ppu.layers[0].v_scroll, expected);
}

#[test]
fn cgwsel_math_enable_window_uses_reversed_bit_ordering() {
    use crate::ppu::types::WindowMathMode;
    let mut ppu = test_ppu();

    // Bits 5-4 = 00 means "always enabled", the opposite polarity of the
    // Never/Outside/Inside/Always ordering used by the clip-to-black field
    // in bits 7-6.
    ppu.write(0x2130, 0b0000_0000);
    assert_eq!(ppu.color_math_prevent_mode, WindowMathMode::Always);

    ppu.write(0x2130, 0b0011_0000);
    assert_eq!(ppu.color_math_prevent_mode, WindowMathMode::Never);

    ppu.write(0x2130, 0b1100_0000);
    assert_eq!(ppu.color_math_clip_mode, WindowMathMode::Always);
}

#[test]
fn tmw_tsw_gate_windowing_independently_of_main_sub_screen_enable() {
    let mut ppu = test_ppu();
    ppu.write(0x212E, 0x01); // TMW: BG1 window mask applies on main screen
    ppu.write(0x212F, 0x00); // TSW: no layer window-gated on sub screen
    assert_eq!(ppu.main_window_mask, 0x01);
    assert_eq!(ppu.sub_window_mask, 0x00);
}

#[test]
fn software_latch_sets_stat78_latched_bit_until_cleared_by_io_port() {
    let mut ppu = test_ppu();
    assert_eq!(ppu.read(0x213F) & 0x40, 0, "latched bit clear before any read");

    ppu.read(0x2137);
    assert_eq!(ppu.read(0x213F) & 0x40, 0x40, "SLHV read should set the latched bit");

    // Reading STAT78 with the I/O port's bit 7 high (NullBusHost's default)
    // clears the latch and both OPHCT/OPVCT toggles.
    assert_eq!(ppu.read(0x213F) & 0x40, 0, "STAT78 read clears the latched bit");
}

#[test]
fn ophct_opvct_toggle_independently_between_low_and_high_byte_reads() {
    let mut ppu = test_ppu();
    ppu.host_mut().h_clock = 0x123;
    ppu.read(0x2137);

    let ophct_low = ppu.read(0x213C);
    let ophct_high = ppu.read(0x213C);
    assert_eq!(ophct_low, 0x23);
    assert_eq!(ophct_high & 0x01, 0x01, "OPHCT high byte is 9-bit: bit 0 carries h_latch bit 8");

    // OPVCT has its own toggle, independent of OPHCT's: a third OPHCT read
    // would flip back to the low byte, but OPVCT's first read still returns
    // its own low byte regardless of how many times OPHCT was read.
    let opvct_low = ppu.read(0x213D);
    assert_eq!(opvct_low, 0, "scanline 0 -> v_latch low byte is 0");
}

#[test]
fn external_location_latch_request_fires_once_the_target_dot_passes() {
    let mut ppu = test_ppu();
    ppu.request_location_latch(100, 0);

    // Stepping to dot 50 on scanline 0 must not satisfy a target of dot 100.
    for _ in 0..50 {
        ppu.step();
    }
    assert_eq!(ppu.read(0x213F) & 0x40, 0, "latch target not yet reached");

    for _ in 0..60 {
        ppu.step();
    }
    assert_eq!(ppu.read(0x213F) & 0x40, 0x40, "latch target passed, should be latched");
}

#[test]
fn window_nibble_bit_order_is_invert_then_enable_per_window() {
    let mut ppu = test_ppu();
    // BG1 in the low nibble of 0x2123: bit0=W1 invert, bit1=W1 enable,
    // bit2=W2 invert, bit3=W2 enable. 0b1010 sets bit1 and bit3 only, so
    // both windows are enabled, neither inverted.
    ppu.write(0x2123, 0b0000_1010);
    assert!(ppu.layer_windows[0].window_enabled[0]);
    assert!(!ppu.layer_windows[0].window_inverted[0]);
    assert!(ppu.layer_windows[0].window_enabled[1]);
    assert!(!ppu.layer_windows[0].window_inverted[1]);
}
