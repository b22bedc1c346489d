//! Background fetcher (§4.3).
//!
//! Per the §9 design note, the dispatch decision (which BG mode's fetch
//! schedule applies) happens once per scanline rather than being
//! re-evaluated per dot; this module performs the full 33-column fetch for
//! every active layer in one pass at the start of each visible scanline's
//! render, rather than interleaving it dot-by-dot with the compositor. The
//! produced `BgTile` rows are identical either way — only the scheduling
//! granularity differs (see the timing module's doc comment and
//! SPEC_FULL.md §9's Open Questions resolution).

use super::Ppu;
use crate::ppu::bus_host::BusHost;
use crate::ppu::types::BgTile;

/// Number of tile columns fetched per scanline (32 visible + 1 for
/// sub-pixel scroll lookahead).
pub const TILES_PER_ROW: usize = 33;

impl<H: BusHost> Ppu<H> {
    /// Fetch one background layer's tile row for the current scanline.
    ///
    /// `bpp` selects how many CHR plane words make up one 8x8 tile slice
    /// (2bpp = 1 word pair per row via 2 planes, 4bpp = 2 word pairs, 8bpp =
    /// 4 word pairs) — only used to determine how many `chr_data` words are
    /// populated; the bit-level plane layout itself is applied by the
    /// compositor when it decodes a pixel.
    pub(crate) fn fetch_bg_layer(&self, layer_idx: usize, bpp: u8) -> [BgTile; TILES_PER_ROW] {
        let layer = self.layers[layer_idx];
        let large_tiles = self.bg_large_tiles[layer_idx];

        // BG3 supplies a per-column scroll override for BG1/BG2 in the
        // "offset-per-tile" modes; mode 4 only overrides horizontally.
        let opt_capable = (layer_idx == 0 || layer_idx == 1) && matches!(self.bg_mode, 2 | 4 | 6);
        let opt_vertical_capable = opt_capable && matches!(self.bg_mode, 2 | 6);

        let mut y = self.scanline;
        if self.mosaic_enable[layer_idx] && self.mosaic_size > 1 {
            y -= y % self.mosaic_size as u16;
        }

        let tile_height_shift = if large_tiles { 4 } else { 3 };
        let base_start_col = layer.h_scroll >> if large_tiles { 4 } else { 3 };

        let mut tiles = [BgTile::default(); TILES_PER_ROW];

        for (i, slot) in tiles.iter_mut().enumerate() {
            let opt_v = if opt_vertical_capable { self.opt_offset_for_column(i as u16, true) } else { None };
            let opt_h = if opt_capable { self.opt_offset_for_column(i as u16, false) } else { None };

            let v_scroll = opt_v.unwrap_or(layer.v_scroll);
            let eff_y = y.wrapping_add(v_scroll);
            let row = eff_y >> tile_height_shift;
            let fine_y = eff_y & ((1 << tile_height_shift) - 1);
            let tilemap_base = self.tilemap_submap_base(&layer, row, large_tiles);

            let col = match opt_h {
                Some(h_override) => (h_override >> if large_tiles { 4 } else { 3 }).wrapping_add(i as u16),
                None => base_start_col.wrapping_add(i as u16),
            };
            let submap_width = if layer.double_width { 64 } else { 32 };
            let wrapped_col = col % submap_width;
            let map_row = row % if layer.double_height { 64 } else { 32 };
            let map_offset = (map_row as u32 * 32 + (wrapped_col % 32) as u32) & 0x3FF;
            let mut horizontal_submap_offset = 0u16;
            if layer.double_width && (wrapped_col % 64) >= 32 {
                horizontal_submap_offset = 0x400;
            }

            let tilemap_word = self.vram_peek_word(
                tilemap_base
                    .wrapping_add(horizontal_submap_offset)
                    .wrapping_add(map_offset as u16),
            );
            slot.tilemap_data = tilemap_word;

            let tile_index = tilemap_word & 0x3FF;
            let v_flip = tilemap_word & 0x8000 != 0;
            let h_flip = tilemap_word & 0x4000 != 0;

            let row_in_tile = if v_flip {
                (if large_tiles { 15 } else { 7 }) - fine_y
            } else {
                fine_y
            };
            let words_per_tile_row = bpp as u32 / 2;
            let large_row_index = if large_tiles { row_in_tile >> 3 } else { 0 };
            let base_tile_index = if large_tiles {
                tile_index
                    .wrapping_add(large_row_index * 16)
            } else {
                tile_index
            };

            let chr_base = layer
                .chr_addr
                .wrapping_add((base_tile_index as u32 * words_per_tile_row * 8) as u16)
                .wrapping_add((row_in_tile & 7) as u16 * words_per_tile_row as u16);

            for plane_pair in 0..(words_per_tile_row as usize).min(4) {
                slot.chr_data[plane_pair] = self.vram_peek_word(chr_base.wrapping_add(plane_pair as u16 * 8));
            }
            slot.v_scroll = v_scroll;
            let _ = h_flip; // consumed by the compositor's pixel extraction
        }

        tiles
    }

    /// Choose which of the up to 4 0x800-word submaps a tilemap row belongs
    /// to, per the DoubleWidth/DoubleHeight flags (§4.3 step 3). The
    /// per-column horizontal selection is handled in `fetch_bg_layer` itself
    /// since it can vary within one row when DoubleWidth is set.
    fn tilemap_submap_base(&self, layer: &crate::ppu::types::BgLayer, row: u16, large_tiles: bool) -> u16 {
        let map_row = row % if layer.double_height { 64 } else { 32 };
        let vertical_submap_offset = if layer.double_height && map_row >= 32 {
            if layer.double_width {
                0x800
            } else {
                0x400
            }
        } else {
            0
        };
        let _ = large_tiles;
        layer.tilemap_addr.wrapping_add(vertical_submap_offset)
    }

    /// Offset-per-tile byte for OPT modes (2, 4, 6): BG3's tilemap supplies
    /// per-column horizontal (and, in modes 2/6, vertical) scroll overrides.
    /// Returns `None` when the column's OPT entry does not request an
    /// override (bit 15 / layer-enable bits clear).
    pub(crate) fn opt_offset_for_column(&self, column: u16, vertical: bool) -> Option<u16> {
        let opt_layer = self.layers[2]; // BG3 supplies OPT data
        let word = self.vram_peek_word(opt_layer.tilemap_addr.wrapping_add(column));
        let wants_vertical = word & 0x8000 != 0;
        if wants_vertical != vertical {
            return None;
        }
        let enable_bits = if vertical { 0x4000 } else { 0x2000 };
        if word & enable_bits == 0 {
            return None;
        }
        Some(word & 0x3FF)
    }
}
