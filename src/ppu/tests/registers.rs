use super::test_ppu;
use crate::bus::MemoryHandler;
use crate::ppu::BusHost;

#[test]
fn inidisp_sets_forced_blank_and_brightness() {
    let mut ppu = test_ppu();
    ppu.write(0x2100, 0x8A);
    assert!(ppu.forced_blank);
    assert_eq!(ppu.brightness, 0x0A);
}

#[test]
fn bgmode_sets_mode_and_large_tile_flags() {
    let mut ppu = test_ppu();
    ppu.write(0x2105, 0b1011_0001);
    assert_eq!(ppu.bg_mode, 1);
    assert!(ppu.bg_mode_priority);
    assert!(ppu.bg_large_tiles[0]);
    assert!(ppu.bg_large_tiles[1]);
    assert!(!ppu.bg_large_tiles[2]);
}

#[test]
fn bg_tilemap_registers_set_double_width_and_height() {
    let mut ppu = test_ppu();
    ppu.write(0x2107, 0b0000_0011); // BG1SC: double width + double height
    assert!(ppu.layers[0].double_width);
    assert!(ppu.layers[0].double_height);
}

#[test]
fn chr_base_registers_split_nibbles_across_two_layers() {
    let mut ppu = test_ppu();
    ppu.write(0x210B, 0x21); // BG1 chr = 1*0x1000, BG2 chr = 2*0x1000
    assert_eq!(ppu.layers[0].chr_addr, 0x1000);
    assert_eq!(ppu.layers[1].chr_addr, 0x2000);
}

#[test]
fn oamdata_write_goes_through_the_oam_byte_pairing_path() {
    let mut ppu = test_ppu();
    ppu.write(0x2102, 0x00);
    ppu.write(0x2103, 0x00);
    ppu.write(0x2104, 0x10);
    ppu.write(0x2104, 0x20);
    assert_eq!(ppu.oam_low[0], 0x10);
    assert_eq!(ppu.oam_low[1], 0x20);
}

#[test]
fn oamaddr_register_is_a_word_address_doubled_into_the_internal_byte_address() {
    let mut ppu = test_ppu();
    // Register value 0x100 (OAMADDH bit0 set, OAMADDL=0) selects the first
    // byte of the high table: internal byte address 0x100 << 1 = 0x200.
    ppu.write(0x2102, 0x00);
    ppu.write(0x2103, 0x01);
    assert_eq!(ppu.internal_oam_address, 0x200);
}

#[test]
fn inidisp_write_on_first_vblank_line_during_forced_blank_resets_oam_address() {
    let mut ppu = test_ppu();
    ppu.write(0x2102, 0x08); // OAMADDR word address 8 -> internal byte 16
    assert_eq!(ppu.internal_oam_address, 16);

    // Advance the internal OAM address away from the register copy, as a
    // game would while reading/writing OAM data.
    ppu.internal_oam_address = 40;

    ppu.forced_blank = true;
    ppu.scanline = ppu.nmi_scanline;
    ppu.write(0x2100, 0x80); // still forced blank: triggers the OAM reset

    assert_eq!(ppu.internal_oam_address, 16, "OAM address reset reloads from the OAMADDR register copy");
}

#[test]
fn cgadd_resets_the_write_byte_toggle() {
    let mut ppu = test_ppu();
    ppu.write(0x2122, 0xFF); // low byte buffered, toggle now expects high
    ppu.write(0x2121, 7); // CGADD: resets toggle and sets address
    assert_eq!(ppu.cgram_address, 7);
    assert!(!ppu.cgram_write_high_half);
}

#[test]
fn tm_and_ts_mask_to_five_bits() {
    let mut ppu = test_ppu();
    ppu.write(0x212C, 0xFF);
    ppu.write(0x212D, 0xFF);
    assert_eq!(ppu.main_screen_enable, 0x1F);
    assert_eq!(ppu.sub_screen_enable, 0x1F);
}

#[test]
fn cgadsub_sets_math_enable_half_and_subtract() {
    let mut ppu = test_ppu();
    ppu.write(0x2131, 0b1100_0101); // subtract + half + BG1,BG3 enabled
    assert!(ppu.color_math_subtract);
    assert!(ppu.color_math_half);
    assert_eq!(ppu.color_math_enable, 0b0000_0101);
}

#[test]
fn stat77_reports_range_and_time_over_flags() {
    let mut ppu = test_ppu();
    ppu.time_over = true;
    ppu.range_over = true;
    let status = ppu.read(0x213E);
    assert_eq!(status & 0x80, 0x80);
    assert_eq!(status & 0x40, 0x40);
}

#[test]
fn unimplemented_register_reads_fall_back_to_open_bus() {
    let mut ppu = test_ppu();
    assert_eq!(ppu.read(0x2180), ppu.host().open_bus());
}

#[test]
fn setini_updates_overscan_and_recomputes_timing() {
    let mut ppu = test_ppu();
    ppu.write(0x2133, 0x04); // overscan bit
    assert!(ppu.overscan);
    assert_eq!(ppu.vblank_start_scanline, 240);
}
