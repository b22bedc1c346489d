mod memory;
mod quirks;
mod registers;
mod timing;

use crate::config::PpuConfig;
use crate::ppu::bus_host::NullBusHost;
use crate::ppu::Ppu;

pub(crate) fn test_ppu() -> Ppu<NullBusHost> {
    Ppu::new(NullBusHost::default(), PpuConfig::default())
}
