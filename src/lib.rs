//! SNES PPU rendering pipeline and memory-mapping fabric.
//!
//! This crate implements the Picture Processing Unit's register file, VRAM/
//! CGRAM/OAM storage, background and sprite fetch, compositor, and frame
//! timing, plus the page-table memory-mapping fabric a host console wires
//! ROM, RAM, and register windows into. It does not include a CPU, APU,
//! cartridge loader, or host shell — see [`ppu::Ppu`] and [`bus::PageTable`]
//! for the two load-bearing public types.

pub mod bus;
pub mod config;
pub mod error;
pub mod ppu;

pub use bus::{AddressInfo, HandlerRef, MemoryHandler, PageTable, SnesMemoryType};
pub use config::{PpuConfig, Region};
pub use error::{PageTableError, PpuFatalError};
pub use ppu::{BgLayer, Bgr555, BusHost, NullBusHost, Ppu, Window, WindowLogic, WindowMathMode};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ppu_and_page_table_construct_and_link() {
        let ppu = Ppu::new(NullBusHost::default(), PpuConfig::default());
        let mut table = PageTable::new();
        let handler: HandlerRef = std::rc::Rc::new(std::cell::RefCell::new(ppu));
        table
            .register_handler_range(0x00, 0x3F, 0x2000, 0x2FFF, handler)
            .expect("register PPU register window");

        let read = table.read(0x002100);
        assert_eq!(read, 0); // open bus before any write
    }
}
