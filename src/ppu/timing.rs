//! Frame timing controller (§4.7).
//!
//! Drives the scanline/dot state machine, the vblank/NMI scanline
//! boundaries, the odd-frame short-line rule, and the overclock extra-
//! scanline policy. The renderer itself dispatches once per scanline (§9
//! design notes); this module owns the bookkeeping that decides *which*
//! scanline is current and when a frame has completed.

use super::Ppu;
use crate::ppu::bus_host::BusHost;

/// Master-clock length of an ordinary scanline.
const SCANLINE_DOTS: u16 = 1364;
/// Master-clock length of the short scanline 240 in odd, non-interlace
/// frames.
const SHORT_SCANLINE_DOTS: u16 = 1360;

impl<H: BusHost> Ppu<H> {
    /// Recompute `vblank_start_scanline`, `nmi_scanline`,
    /// `base_vblank_end_scanline`, and `vblank_end_scanline` from the
    /// current overscan flag and overclock configuration. Called at power-on
    /// and at the start of every frame, per §4.7.
    pub(crate) fn recompute_timing_constants(&mut self) {
        self.vblank_start_scanline = if self.overscan { 240 } else { 225 };
        self.nmi_scanline = self.vblank_start_scanline + self.config.overclock_scanlines_before_nmi;

        let base = self.config.region.base_scanline_count() - 1;
        self.base_vblank_end_scanline = base;
        self.vblank_end_scanline = base + self.config.overclock_scanlines_after_nmi;
    }

    /// Advance the PPU by a single master-clock dot. Background/sprite
    /// fetch and compositing happen once per scanline, at the scanline's
    /// last dot, rather than incrementally per dot — see the Open Questions
    /// resolution in SPEC_FULL.md §9: the renderer is correct under any
    /// monotonic dot-to-scanline mapping that preserves scanline length, and
    /// this crate trades per-dot batching for a single dispatch per
    /// scanline.
    pub fn step(&mut self) {
        let scanline_length = self.current_scanline_length();

        self.dot += 1;
        self.process_location_latch_request();
        if self.dot >= scanline_length {
            self.dot = 0;
            self.end_of_scanline();
        }
    }

    fn current_scanline_length(&self) -> u16 {
        let is_short_line = self.scanline == 240 && self.odd_frame && !self.screen_interlace;
        if is_short_line {
            SHORT_SCANLINE_DOTS
        } else {
            SCANLINE_DOTS
        }
    }

    /// Housekeeping run when a scanline completes: render the scanline that
    /// just finished (if visible), advance the scanline counter, and handle
    /// the vblank/NMI/frame-end transitions.
    fn end_of_scanline(&mut self) {
        if self.scanline < self.vblank_start_scanline {
            self.render_current_scanline();
        }

        self.scanline += 1;

        if self.scanline == self.nmi_scanline {
            self.nmi_flag = true;
            self.host.notify_nmi();
        }

        if self.scanline > self.vblank_end_scanline {
            self.scanline = 0;
            self.odd_frame = !self.odd_frame;
            self.nmi_flag = false;
            self.frame_count += 1;
            self.time_over = false;
            self.range_over = false;
            self.recompute_timing_constants();
            self.host.notify_frame();
        }
    }

    /// Whether the PPU clock is currently within the vblank window (used to
    /// gate VRAM/CGRAM writes alongside forced blank, and to drive the
    /// overclock APU-disable policy).
    pub fn in_vblank(&self) -> bool {
        self.scanline >= self.vblank_start_scanline
    }

    /// Whether game code's APU access should be held disabled: true only
    /// while the PPU is within a synthetic overclock-extended scanline
    /// range, never during the hardware-accurate vblank window.
    pub fn apu_disabled_for_overclock(&self) -> bool {
        let before_nmi_extension_active = self.config.overclock_scanlines_before_nmi > 0
            && self.scanline >= (self.vblank_start_scanline)
            && self.scanline < self.nmi_scanline;
        let after_nmi_extension_active = self.config.overclock_scanlines_after_nmi > 0
            && self.scanline > self.base_vblank_end_scanline
            && self.scanline <= self.vblank_end_scanline;
        before_nmi_extension_active || after_nmi_extension_active
    }

    /// Scanline number with the overclock extension subtracted back out, so
    /// external consumers driven off this clock see a contiguous count.
    pub fn get_real_scanline(&self) -> u16 {
        if self.scanline >= self.nmi_scanline {
            self.scanline - self.config.overclock_scanlines_before_nmi
        } else {
            self.scanline
        }
    }

    /// Last scanline of the current frame, with the overclock extension
    /// subtracted back out.
    pub fn get_last_scanline(&self) -> u16 {
        self.base_vblank_end_scanline
    }

    pub fn scanline(&self) -> u16 {
        self.scanline
    }

    pub fn dot(&self) -> u16 {
        self.dot
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn odd_frame(&self) -> bool {
        self.odd_frame
    }

    pub fn nmi_pending(&self) -> bool {
        self.nmi_flag
    }
}
