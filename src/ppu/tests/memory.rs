use super::test_ppu;
use crate::ppu::constants::VRAM_WORD_COUNT;

#[test]
fn vram_write_blocked_outside_forced_blank_and_vblank() {
    let mut ppu = test_ppu();
    ppu.forced_blank = false;
    ppu.scanline = 10; // well before vblank_start_scanline
    ppu.vram_address = 0;
    ppu.write_vram_byte(false, 0xAB);
    assert_eq!(ppu.vram[0], 0, "write should be dropped outside forced blank/vblank");
}

#[test]
fn vram_write_allowed_during_forced_blank() {
    let mut ppu = test_ppu();
    ppu.forced_blank = true;
    ppu.vram_address = 5;
    ppu.write_vram_byte(false, 0x34);
    ppu.write_vram_byte(true, 0x12);
    assert_eq!(ppu.vram[5], 0x1234);
}

#[test]
fn vram_address_increments_on_configured_half() {
    let mut ppu = test_ppu();
    ppu.forced_blank = true;
    ppu.vmain_increment_on_high = true;
    ppu.vmain_increment_amount = 1;
    ppu.vram_address = 0;
    ppu.write_vram_byte(false, 0);
    assert_eq!(ppu.vram_address, 0, "low-byte write should not increment when increment-on-high is set");
    ppu.write_vram_byte(true, 0);
    assert_eq!(ppu.vram_address, 1);
}

#[test]
fn vram_address_wraps_modulo_vram_size() {
    let mut ppu = test_ppu();
    ppu.forced_blank = true;
    ppu.vmain_increment_amount = 1;
    ppu.vram_address = (VRAM_WORD_COUNT - 1) as u16;
    ppu.write_vram_byte(true, 0);
    assert_eq!(ppu.vram_address as usize, VRAM_WORD_COUNT);
    let wrapped = ppu.vram_peek_word(ppu.vram_address);
    let _ = wrapped; // just exercising the modulo path, value is whatever was there
}

#[test]
fn cgram_write_pairs_low_then_high_and_forces_bit15_low() {
    let mut ppu = test_ppu();
    ppu.cgram_address = 3;
    ppu.write_cgram_byte(0xFF); // low byte buffered
    ppu.write_cgram_byte(0xFF); // high byte commits, bit 15 forced to 0
    assert_eq!(ppu.cgram[3], 0x7FFF);
    assert_eq!(ppu.cgram_address, 4, "address advances only after the high byte commits");
}

#[test]
fn oam_low_table_write_pairs_bytes() {
    let mut ppu = test_ppu();
    ppu.internal_oam_address = 0;
    ppu.write_oam_byte(0x11); // X low byte, buffered
    ppu.write_oam_byte(0x22); // Y byte, commits both
    assert_eq!(ppu.oam_low[0], 0x11);
    assert_eq!(ppu.oam_low[1], 0x22);
    assert_eq!(ppu.internal_oam_address, 2);
}

#[test]
fn oam_high_table_write_is_direct() {
    let mut ppu = test_ppu();
    ppu.internal_oam_address = 512; // first byte of the high table
    ppu.write_oam_byte(0xAA);
    assert_eq!(ppu.oam_high[0], 0xAA);
    assert_eq!(ppu.internal_oam_address, 513);
}

#[test]
fn oam_internal_address_wraps_at_1024() {
    let mut ppu = test_ppu();
    ppu.internal_oam_address = 0x3FF;
    ppu.write_oam_byte(0);
    assert_eq!(ppu.internal_oam_address, 0);
}

#[test]
fn vram_remapping_mode_zero_is_identity() {
    let ppu = test_ppu();
    assert_eq!(ppu.vram_address_remapping, 0);
    // identity mode: remapped address equals raw address for any value
    let mut ppu = ppu;
    ppu.vram_address = 0x1234;
    assert_eq!(ppu.remapped_vram_address(), 0x1234);
}
