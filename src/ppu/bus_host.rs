//! The PPU's view of its driver.
//!
//! The original engine has the PPU hold a raw back-pointer to the memory
//! manager (for the H-clock and master-clock counters) and to the console
//! (for NMI delivery and frame-done notification) — a cyclic object graph
//! that does not translate cleanly into Rust ownership. Per the design notes
//! this becomes an explicit capability trait: the PPU is generic over
//! `H: BusHost` and never stores a reference back to its caller, only calls
//! out through this trait when it needs driver state or wants to raise an
//! event.

/// Capabilities the PPU needs from whatever drives its clock.
pub trait BusHost {
    /// Current horizontal position in master clocks (0..1364).
    fn get_h_clock(&self) -> u16;

    /// Current master clock counter, free-running.
    fn get_master_clock(&self) -> u64;

    /// The last byte driven on the open bus outside the PPU's own register
    /// range (used as a fallback for reads the PPU itself cannot supply).
    fn open_bus(&self) -> u8;

    /// Called once per frame, when the compositor has finished writing the
    /// output buffer for that frame.
    fn notify_frame(&mut self);

    /// Called when the PPU's internal NMI flag transitions 0 -> 1, so the
    /// host can assert the interrupt line on the CPU if NMI is enabled.
    fn notify_nmi(&mut self);

    /// Bit 7 of the CPU-side WRIO register (0x4201), which gates both the
    /// software H/V counter latch (0x2137 read) and the latch-clear side
    /// effect of reading 0x213F (§4.7/§6). Hosts that don't model WRIO can
    /// leave this at the default `true`, matching an always-high I/O port.
    fn io_port_bit7(&self) -> bool {
        true
    }
}

/// A minimal [`BusHost`] with no external clock or CPU to notify, useful for
/// driving the PPU directly via [`crate::ppu::Ppu::step`] in tests and
/// benchmarks, or for embedding the PPU without a full system around it.
#[derive(Debug, Default, Clone)]
pub struct NullBusHost {
    pub h_clock: u16,
    pub master_clock: u64,
    pub frame_notifications: u64,
    pub nmi_notifications: u64,
}

impl BusHost for NullBusHost {
    fn get_h_clock(&self) -> u16 {
        self.h_clock
    }

    fn get_master_clock(&self) -> u64 {
        self.master_clock
    }

    fn open_bus(&self) -> u8 {
        0
    }

    fn notify_frame(&mut self) {
        self.frame_notifications += 1;
    }

    fn notify_nmi(&mut self) {
        self.nmi_notifications += 1;
    }
}
