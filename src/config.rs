// PPU configuration
//
// The PPU core owns very few user-tunable knobs — almost everything about
// its behavior is dictated by the hardware register file (§6) rather than
// by configuration. This module covers the handful that are not: the
// overclock extension counts and video region that a host exposes as
// settings.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

/// Default configuration file path.
const CONFIG_FILE: &str = "ppu_config.toml";

/// Video region. Changes the base scanline count the frame timing
/// controller cycles through (§4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Region {
    Ntsc,
    Pal,
}

impl Region {
    /// Base scanline count per frame before overclock extension, for the
    /// even (non-short) frame.
    pub fn base_scanline_count(self) -> u16 {
        match self {
            Region::Ntsc => 262,
            Region::Pal => 312,
        }
    }
}

/// User-tunable PPU configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PpuConfig {
    /// Video region, affects base scanline counts.
    pub region: Region,

    /// Extra scanlines inserted before the NMI scanline, via overclock.
    pub overclock_scanlines_before_nmi: u16,

    /// Extra scanlines inserted after the NMI scanline, via overclock.
    pub overclock_scanlines_after_nmi: u16,
}

impl Default for PpuConfig {
    fn default() -> Self {
        PpuConfig {
            region: Region::Ntsc,
            overclock_scanlines_before_nmi: 0,
            overclock_scanlines_after_nmi: 0,
        }
    }
}

impl PpuConfig {
    /// Load configuration from file or create default.
    ///
    /// If the configuration file doesn't exist, creates a default
    /// configuration and tries to save it to the file.
    ///
    /// # Returns
    ///
    /// The loaded or default configuration.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|_| {
            let config = Self::default();
            let _ = config.save();
            config
        })
    }

    /// Load configuration from the default file path.
    pub fn load() -> Result<Self, io::Error> {
        Self::load_from(CONFIG_FILE)
    }

    /// Load configuration from an explicit path.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, io::Error> {
        let contents = fs::read_to_string(path)?;
        toml::from_str(&contents).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Save configuration to the default file path.
    pub fn save(&self) -> Result<(), io::Error> {
        self.save_to(CONFIG_FILE)
    }

    /// Save configuration to an explicit path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), io::Error> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, contents)
    }
}
