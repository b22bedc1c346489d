//! Register file: the 0x2100-0x213F I/O window (§4.2/§6).
//!
//! Write-only registers return open bus on read; read-only registers ignore
//! writes. Latched register pairs (BG scroll, Mode 7 matrix, VRAM/CGRAM
//! read-back, H/V counters) use the two half-register toggle pattern
//! documented in §3.

use super::Ppu;
use crate::ppu::bus_host::BusHost;
use crate::ppu::constants::{PPU2_CHIP_VERSION, PPU_CHIP_VERSION};

const VMAIN_INCREMENTS: [u16; 4] = [1, 32, 128, 128];

impl<H: BusHost> Ppu<H> {
    pub(crate) fn register_write(&mut self, addr: u32, value: u8) {
        self.ppu1_open_bus = value;
        self.ppu2_open_bus = value;

        match addr & 0xFF {
            0x00 => {
                // Writing INIDISP on the first vblank/NMI scanline while
                // forced blank is (still) active reloads the internal OAM
                // address from the OAMADDR register copy (§4.7 OAM address
                // reset quirk).
                if self.forced_blank && self.scanline == self.nmi_scanline {
                    self.internal_oam_address = (self.oam_address_reg << 1) & 0x3FF;
                }
                self.forced_blank = value & 0x80 != 0;
                self.brightness = value & 0x0F;
            }
            0x01 => {
                self.oam_base_address = (value as u16 & 0x07) * 0x2000;
                let name_select = (value >> 3) & 0x03;
                self.oam_address_offset = 0x1000 * (name_select as u16 + 1);
                self.oam_mode = (value >> 5) & 0x07;
            }
            0x02 => {
                self.oam_address_reg = (self.oam_address_reg & 0x100) | value as u16;
                self.internal_oam_address = (self.oam_address_reg << 1) & 0x3FF;
            }
            0x03 => {
                self.oam_address_reg = (self.oam_address_reg & 0x00FF) | ((value as u16 & 0x01) << 8);
                self.internal_oam_address = (self.oam_address_reg << 1) & 0x3FF;
                self.oam_priority_rotation = value & 0x80 != 0;
            }
            0x04 => self.write_oam_byte(value),
            0x05 => {
                self.bg_mode = value & 0x07;
                self.bg_mode_priority = value & 0x08 != 0;
                for i in 0..4 {
                    self.bg_large_tiles[i] = value & (0x10 << i) != 0;
                }
            }
            0x06 => {
                self.mosaic_size = (value >> 4) & 0x0F;
                for i in 0..4 {
                    self.mosaic_enable[i] = value & (1 << i) != 0;
                }
            }
            0x07..=0x0A => {
                let layer = (addr & 0xFF) as usize - 0x07;
                self.layers[layer].tilemap_addr = ((value as u16) >> 2) << 10;
                self.layers[layer].double_width = value & 0x01 != 0;
                self.layers[layer].double_height = value & 0x02 != 0;
            }
            0x0B => {
                self.layers[0].chr_addr = (value as u16 & 0x0F) * 0x1000;
                self.layers[1].chr_addr = ((value as u16 >> 4) & 0x0F) * 0x1000;
            }
            0x0C => {
                self.layers[2].chr_addr = (value as u16 & 0x0F) * 0x1000;
                self.layers[3].chr_addr = ((value as u16 >> 4) & 0x0F) * 0x1000;
            }
            0x0D => {
                // BG1HOFS also feeds the Mode 7 H scroll latch pool.
                let prev_hv = self.mode7_latch;
                self.mode7.h_scroll = (((value as u16) << 8) | prev_hv as u16) as i16 & 0x1FFF;
                self.mode7_latch = value;

                // BG1's horizontal scroll has a hardware quirk: its low 3
                // bits come from the *previous BG1HOFS write*, not the
                // shared BG scroll latch, while the rest of the value comes
                // from the shared latch like every other scroll register.
                let prev_hv_latch = self.bg_scroll_latch;
                let prev_h = self.bg1_hofs_prev_byte;
                self.layers[0].h_scroll =
                    (((value as u16) << 8) | (prev_hv_latch as u16 & !0x07) | (prev_h as u16 & 0x07)) & 0x3FF;
                self.bg1_hofs_prev_byte = value;
                self.bg_scroll_latch = value;
            }
            0x0E => {
                let prev_hv = self.mode7_latch;
                self.mode7.v_scroll = (((value as u16) << 8) | prev_hv as u16) as i16 & 0x1FFF;
                self.mode7_latch = value;

                let prev_v = self.bg_scroll_latch;
                self.layers[0].v_scroll = (((value as u16) << 8) | prev_v as u16) & 0x3FF;
                self.bg_scroll_latch = value;
            }
            0x0F..=0x14 => {
                let reg = (addr & 0xFF) as usize - 0x0F;
                let layer = 1 + reg / 2;
                let is_h = reg % 2 == 0;
                let prev = self.bg_scroll_latch;
                if is_h {
                    self.layers[layer].h_scroll = (((value as u16) << 8) | prev as u16) & 0x3FF;
                } else {
                    self.layers[layer].v_scroll = (((value as u16) << 8) | prev as u16) & 0x3FF;
                }
                self.bg_scroll_latch = value;
            }
            0x15 => {
                self.vram_address_remapping = (value >> 2) & 0x03;
                self.vmain_increment_on_high = value & 0x80 != 0;
                self.vmain_increment_amount = VMAIN_INCREMENTS[(value & 0x03) as usize];
            }
            0x16 => {
                self.vram_address = (self.vram_address & 0xFF00) | value as u16;
                self.refresh_vram_read_buffer();
            }
            0x17 => {
                self.vram_address = (self.vram_address & 0x00FF) | ((value as u16) << 8);
                self.refresh_vram_read_buffer();
            }
            0x18 => self.write_vram_byte(false, value),
            0x19 => self.write_vram_byte(true, value),
            0x1A => {
                self.mode7.horizontal_mirror = value & 0x01 != 0;
                self.mode7.vertical_mirror = value & 0x02 != 0;
                self.mode7.large_map = value & 0x40 != 0;
                self.mode7.fill_with_tile0 = value & 0x80 != 0;
            }
            0x1B => self.write_mode7_matrix(value, |m| &mut m.matrix_a),
            0x1C => self.write_mode7_matrix(value, |m| &mut m.matrix_b),
            0x1D => self.write_mode7_matrix(value, |m| &mut m.matrix_c),
            0x1E => self.write_mode7_matrix(value, |m| &mut m.matrix_d),
            0x1F => self.write_mode7_center(value, true),
            0x20 => self.write_mode7_center(value, false),
            0x21 => {
                self.cgram_address = value as u16;
                self.cgram_write_high_half = false;
            }
            0x22 => self.write_cgram_byte(value),
            0x23..=0x25 => {
                let bits = value;
                let (lo, hi) = match addr & 0xFF {
                    0x23 => (0usize, 1usize),
                    0x24 => (2, 3),
                    _ => (4, 5),
                };
                self.set_layer_window(lo, bits & 0x0F);
                self.set_layer_window(hi, (bits >> 4) & 0x0F);
            }
            0x26 => self.windows[0].left = value,
            0x27 => self.windows[0].right = value,
            0x28 => self.windows[1].left = value,
            0x29 => self.windows[1].right = value,
            0x2A => {
                for i in 0..4 {
                    self.layer_windows[i].logic = crate::ppu::types::WindowLogic::from_bits((value >> (i * 2)) as u8);
                }
            }
            0x2B => {
                self.layer_windows[4].logic = crate::ppu::types::WindowLogic::from_bits(value);
                self.layer_windows[5].logic = crate::ppu::types::WindowLogic::from_bits(value >> 2);
            }
            0x2C => self.main_screen_enable = value & 0x1F,
            0x2D => self.sub_screen_enable = value & 0x1F,
            0x2E => self.main_window_mask = value & 0x1F,
            0x2F => self.sub_window_mask = value & 0x1F,
            0x30 => {
                use crate::ppu::types::WindowMathMode;
                self.direct_color_mode = value & 0x01 != 0;
                self.color_math_add_subscreen = value & 0x02 != 0;
                // Bits 5-4 select when color math is *enabled*; hardware
                // orders this field Always/Inside/Outside/Never, the
                // reverse of the Never/Outside/Inside/Always ordering used
                // for the clip-to-black field below, so it needs its own
                // mapping rather than `WindowMathMode::from_bits`.
                self.color_math_prevent_mode = match (value >> 4) & 0x03 {
                    0 => WindowMathMode::Always,
                    1 => WindowMathMode::InsideWindow,
                    2 => WindowMathMode::OutsideWindow,
                    _ => WindowMathMode::Never,
                };
                self.color_math_clip_mode = WindowMathMode::from_bits(value >> 6);
            }
            0x31 => {
                self.color_math_enable = value & 0x3F;
                self.color_math_half = value & 0x40 != 0;
                self.color_math_subtract = value & 0x80 != 0;
            }
            0x32 => {
                let intensity = value & 0x1F;
                if value & 0x80 != 0 {
                    self.fixed_color.r = intensity;
                }
                if value & 0x40 != 0 {
                    self.fixed_color.g = intensity;
                }
                if value & 0x20 != 0 {
                    self.fixed_color.b = intensity;
                }
            }
            0x33 => {
                self.screen_interlace = value & 0x01 != 0;
                self.obj_interlace = value & 0x02 != 0;
                self.overscan = value & 0x04 != 0;
                self.hi_res_mode = value & 0x08 != 0;
                self.mode7.ext_bg_enabled = value & 0x40 != 0;
                self.recompute_timing_constants();
            }
            other => {
                log::debug!("unimplemented PPU register write: addr=0x21{:02X} value=0x{:02X}", other, value);
            }
        }
    }

    fn write_mode7_matrix(&mut self, value: u8, field: impl Fn(&mut crate::ppu::types::Mode7State) -> &mut i16) {
        let prev = self.mode7_latch;
        *field(&mut self.mode7) = (((value as u16) << 8) | prev as u16) as i16;
        self.mode7_latch = value;
    }

    fn write_mode7_center(&mut self, value: u8, is_x: bool) {
        let prev = self.mode7_latch;
        let latched = (((value as u16) << 8) | prev as u16) as i16 & 0x1FFF;
        if is_x {
            self.mode7.center_x = latched;
        } else {
            self.mode7.center_y = latched;
        }
        self.mode7_latch = value;
    }

    fn set_layer_window(&mut self, layer: usize, nibble: u8) {
        self.layer_windows[layer].window_inverted[0] = nibble & 0x01 != 0;
        self.layer_windows[layer].window_enabled[0] = nibble & 0x02 != 0;
        self.layer_windows[layer].window_inverted[1] = nibble & 0x04 != 0;
        self.layer_windows[layer].window_enabled[1] = nibble & 0x08 != 0;
    }

    pub(crate) fn register_read(&mut self, addr: u32) -> u8 {
        match addr & 0xFF {
            0x34..=0x36 => self.mode7_multiply_byte((addr & 0xFF) as u8 - 0x34),
            0x37 => {
                // SLHV: latch on read, but only when the CPU-side I/O port's
                // bit 7 is set (§6). Returns PPU2 open bus either way.
                if self.host.io_port_bit7() {
                    self.h_latch = self.host.get_h_clock();
                    self.v_latch = self.scanline;
                    self.latched = true;
                }
                self.ppu2_open_bus
            }
            0x38 => {
                let value = self.read_oam_byte_at(self.internal_oam_address);
                self.internal_oam_address = (self.internal_oam_address + 1) & 0x3FF;
                self.ppu1_open_bus = value;
                value
            }
            0x39 => {
                let value = (self.vram_read_buffer & 0xFF) as u8;
                if !self.vmain_increment_on_high {
                    self.vram_address = self.vram_address.wrapping_add(self.vmain_increment_amount);
                    self.refresh_vram_read_buffer();
                }
                self.ppu1_open_bus = value;
                value
            }
            0x3A => {
                let value = (self.vram_read_buffer >> 8) as u8;
                if self.vmain_increment_on_high {
                    self.vram_address = self.vram_address.wrapping_add(self.vmain_increment_amount);
                    self.refresh_vram_read_buffer();
                }
                self.ppu1_open_bus = value;
                value
            }
            0x3B => {
                let value = self.read_cgram_byte();
                self.ppu2_open_bus = value;
                value
            }
            0x3C => {
                // OPHCT: only 9 bits wide; the high byte's low bit is the
                // MSB, the rest is PPU2 open bus.
                self.process_location_latch_request();
                let value = if self.h_latch_toggle {
                    ((self.h_latch >> 8) as u8 & 0x01) | (self.ppu2_open_bus & 0xFE)
                } else {
                    (self.h_latch & 0xFF) as u8
                };
                self.ppu2_open_bus = value;
                self.h_latch_toggle = !self.h_latch_toggle;
                value
            }
            0x3D => {
                // OPVCT: same 9-bit toggle shape as OPHCT, over v_latch.
                self.process_location_latch_request();
                let value = if self.v_latch_toggle {
                    ((self.v_latch >> 8) as u8 & 0x01) | (self.ppu2_open_bus & 0xFE)
                } else {
                    (self.v_latch & 0xFF) as u8
                };
                self.ppu2_open_bus = value;
                self.v_latch_toggle = !self.v_latch_toggle;
                value
            }
            0x3E => {
                let value = PPU_CHIP_VERSION
                    | (if self.time_over { 0x80 } else { 0 })
                    | (if self.range_over { 0x40 } else { 0 })
                    | (self.ppu1_open_bus & 0x10);
                self.ppu1_open_bus = value;
                value
            }
            0x3F => {
                // STAT78: processing a pending location-latch request here
                // (in addition to on every dot) matches the source's own
                // `ProcessLocationLatchRequest` call at this register.
                self.process_location_latch_request();
                let region_bit = if matches!(self.config.region, crate::config::Region::Pal) { 0x10 } else { 0 };
                let value = (if self.odd_frame { 0x80 } else { 0 })
                    | (if self.latched { 0x40 } else { 0 })
                    | (self.ppu2_open_bus & 0x20)
                    | region_bit
                    | PPU2_CHIP_VERSION;
                if self.host.io_port_bit7() {
                    self.latched = false;
                    self.h_latch_toggle = false;
                    self.v_latch_toggle = false;
                }
                self.ppu2_open_bus = value;
                value
            }
            other => {
                log::debug!("unimplemented PPU register read: addr=0x21{:02X}", other);
                self.host.open_bus()
            }
        }
    }

    fn mode7_multiply_byte(&self, byte_index: u8) -> u8 {
        let product = (self.mode7.matrix_a as i32).wrapping_mul((self.mode7.matrix_b >> 8) as i8 as i32);
        ((product >> (byte_index * 8)) & 0xFF) as u8
    }

    /// Side-effect-free register read, used by debugger/tooling `peek`
    /// paths; returns the same value `register_read` would without
    /// consuming byte-pair toggles, latch state, or auto-increment.
    pub(crate) fn register_peek(&self, addr: u32) -> u8 {
        match addr & 0xFF {
            0x38 => self.read_oam_byte_at(self.internal_oam_address),
            0x39 => (self.vram_read_buffer & 0xFF) as u8,
            0x3A => (self.vram_read_buffer >> 8) as u8,
            0x3B => (self.cgram_word(self.cgram_address as u8) & 0xFF) as u8,
            0x3E => {
                (PPU_CHIP_VERSION & 0x0F)
                    | (if self.time_over { 0x80 } else { 0 })
                    | (if self.range_over { 0x40 } else { 0 })
            }
            _ => self.host.open_bus(),
        }
    }
}
