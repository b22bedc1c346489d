//! VRAM, CGRAM, and OAM access helpers.
//!
//! These are the primitives the register file (writes to 0x2118/9, 0x2122,
//! 0x2104) and the background/sprite fetchers both build on. Address
//! clamping and the CGRAM/OAM invariants from §3 live here rather than being
//! re-derived at each call site.

use super::Ppu;
use crate::ppu::bus_host::BusHost;
use crate::ppu::constants::{CGRAM_ENTRY_COUNT, OAM_HIGH_SIZE, OAM_LOW_SIZE, VRAM_WORD_COUNT};

impl<H: BusHost> Ppu<H> {
    /// Raw VRAM word read, address wrapped modulo VRAM size. No side
    /// effects (no read-buffer latching) — used by the background/sprite
    /// fetchers and the Mode 7 sampler.
    pub(crate) fn vram_peek_word(&self, word_addr: u16) -> u16 {
        self.vram[word_addr as usize % VRAM_WORD_COUNT]
    }

    /// Low byte of a VRAM word, matching the "tile index" half of a
    /// background/Mode-7 tile entry.
    pub(crate) fn vram_peek_low(&self, word_addr: u16) -> u8 {
        (self.vram_peek_word(word_addr) & 0xFF) as u8
    }

    /// High byte of a VRAM word.
    pub(crate) fn vram_peek_high(&self, word_addr: u16) -> u8 {
        (self.vram_peek_word(word_addr) >> 8) as u8
    }

    /// Write the low or high byte of the current VRAM address (per VMAIN's
    /// increment-on-high flag) and apply the address increment. Per §3,
    /// writes during active display (not forced-blank, not in vblank) are
    /// dropped, but the address still increments — this method always
    /// performs the increment and only gates the memory mutation.
    pub(crate) fn write_vram_byte(&mut self, high_byte: bool, value: u8) {
        let allowed = self.rendering_write_allowed();
        let addr = self.remapped_vram_address() as usize % VRAM_WORD_COUNT;

        if allowed {
            let word = &mut self.vram[addr];
            if high_byte {
                *word = (*word & 0x00FF) | ((value as u16) << 8);
            } else {
                *word = (*word & 0xFF00) | value as u16;
            }
        } else {
            log::trace!(
                "VRAM write dropped during active display: word_addr=0x{:04X} scanline={}",
                addr,
                self.scanline
            );
        }

        let increments_here = high_byte == self.vmain_increment_on_high;
        if increments_here {
            self.vram_address = self.vram_address.wrapping_add(self.vmain_increment_amount);
        }
    }

    /// True when a VRAM mutation is allowed to take effect: forced blank is
    /// active, or the PPU is currently in vertical blank.
    pub(crate) fn rendering_write_allowed(&self) -> bool {
        self.forced_blank || self.scanline >= self.vblank_start_scanline
    }

    /// Apply VMAIN's address-remapping mode to the raw VRAM address,
    /// matching the four hardware remap patterns used to de-interleave
    /// tilemap/CHR data for certain bit depths.
    pub(crate) fn remapped_vram_address(&self) -> u16 {
        match self.vram_address_remapping {
            0 => self.vram_address,
            1 => {
                (self.vram_address & 0xFF00) | ((self.vram_address & 0x00E0) >> 5) | ((self.vram_address & 0x001F) << 3)
            }
            2 => {
                (self.vram_address & 0xFE00) | ((self.vram_address & 0x01C0) >> 6) | ((self.vram_address & 0x003F) << 3)
            }
            _ => {
                (self.vram_address & 0xFC00) | ((self.vram_address & 0x0380) >> 7) | ((self.vram_address & 0x007F) << 3)
            }
        }
    }

    /// Refill the VRAM read buffer from the current address, as happens on
    /// a write to VMADDL/H (0x2116/7).
    pub(crate) fn refresh_vram_read_buffer(&mut self) {
        let addr = self.remapped_vram_address() as usize % VRAM_WORD_COUNT;
        self.vram_read_buffer = self.vram[addr];
    }

    /// CGRAM word read by palette index (0..255).
    pub(crate) fn cgram_word(&self, index: u8) -> u16 {
        self.cgram[index as usize % CGRAM_ENTRY_COUNT]
    }

    /// Byte-paired CGRAM write through the 0x2121/0x2122 register pair. The
    /// first (low) byte is buffered; the second (high) byte commits the
    /// word with bit 15 forced to zero (§3 invariant 3) and advances the
    /// CGRAM address.
    pub(crate) fn write_cgram_byte(&mut self, value: u8) {
        if self.cgram_write_high_half {
            let index = self.cgram_address as usize % CGRAM_ENTRY_COUNT;
            let word = ((value as u16 & 0x7F) << 8) | self.cgram_low_buffer as u16;
            self.cgram[index] = word;
            self.cgram_address = self.cgram_address.wrapping_add(1);
        } else {
            self.cgram_low_buffer = value;
        }
        self.cgram_write_high_half = !self.cgram_write_high_half;
    }

    /// Byte read-back of the CGRAM word at the current address, low byte
    /// first then high byte (high byte's top bit is overlaid with PPU2 open
    /// bus per §6).
    pub(crate) fn read_cgram_byte(&mut self) -> u8 {
        let word = self.cgram_word(self.cgram_address as u8);
        let value = if self.cgram_read_high_half {
            self.cgram_address = self.cgram_address.wrapping_add(1);
            ((word >> 8) as u8 & 0x7F) | (self.ppu2_open_bus & 0x80)
        } else {
            (word & 0xFF) as u8
        };
        self.cgram_read_high_half = !self.cgram_read_high_half;
        value
    }

    /// Byte-paired OAM low-table write through 0x2104, or a direct
    /// high-table write when the internal address has advanced past the low
    /// table. The internal 10-bit address wraps at 0x3FF (§3 invariant).
    pub(crate) fn write_oam_byte(&mut self, value: u8) {
        let addr = self.internal_oam_address;
        if (addr as usize) < OAM_LOW_SIZE {
            if addr & 1 == 0 {
                self.oam_write_buffer = value;
            } else {
                let base = (addr - 1) as usize;
                self.oam_low[base] = self.oam_write_buffer;
                self.oam_low[base + 1] = value;
            }
        } else {
            let index = (addr as usize - OAM_LOW_SIZE) % OAM_HIGH_SIZE;
            self.oam_high[index] = value;
        }
        self.internal_oam_address = (addr + 1) & 0x3FF;
    }

    /// Read-back of the OAM byte at the current internal address. Reading
    /// does not advance the address (matches 0x2138 behavior, driven by the
    /// register file incrementing separately after the high byte of a pair).
    pub(crate) fn read_oam_byte_at(&self, addr: u16) -> u8 {
        if (addr as usize) < OAM_LOW_SIZE {
            self.oam_low[addr as usize]
        } else {
            let index = (addr as usize - OAM_LOW_SIZE) % OAM_HIGH_SIZE;
            self.oam_high[index]
        }
    }
}
