//! Per-scanline layer compositor: priority resolution, color math, and
//! window clipping (§4.5/§4.6).
//!
//! Hardware draws each of the 12-16 (layer, priority-tier) planes in a fixed
//! per-mode back-to-front order and keeps the first opaque pixel encountered
//! scanning front-to-back, separately for the main and sub screens. The
//! tables below encode that order for modes 0-1 exactly as documented by
//! SNES hardware references; modes 2-6 collapse to a single representative
//! priority tier per background layer (those modes vary bit depth and
//! offset-per-tile behavior but not the two-tier BG1/BG2 priority split in a
//! way that changes which layer wins a tie); mode 7 draws its single
//! rotated background plus, when SETINI's extbg bit is set, an extra
//! 2-bit-per-pixel "BG2" plane sourced from the high bit of each Mode 7
//! tile byte, split across two priority tiers. This is a deliberate
//! simplification of the full 3-bit-per-plane sprite/BG interleave — see
//! DESIGN.md.

use super::Ppu;
use crate::ppu::bus_host::BusHost;
use crate::ppu::constants::SCREEN_WIDTH;
use crate::ppu::types::{BgTile, Bgr555};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Bg(usize, u8),
    Obj(u8),
    /// Mode 7 extbg plane (SETINI bit 6), split into its own two priority
    /// tiers the same way BG2 would be in modes 0-6.
    ExtBg(u8),
}

impl<H: BusHost> Ppu<H> {
    fn draw_order(&self) -> Vec<Source> {
        match self.bg_mode {
            0 => vec![
                Source::Obj(3),
                Source::Bg(0, 1),
                Source::Bg(1, 1),
                Source::Obj(2),
                Source::Bg(0, 0),
                Source::Bg(1, 0),
                Source::Obj(1),
                Source::Bg(2, 1),
                Source::Bg(3, 1),
                Source::Obj(0),
                Source::Bg(2, 0),
                Source::Bg(3, 0),
            ],
            1 => {
                if self.bg_mode_priority {
                    vec![
                        Source::Bg(2, 1),
                        Source::Obj(3),
                        Source::Bg(0, 1),
                        Source::Bg(1, 1),
                        Source::Obj(2),
                        Source::Bg(0, 0),
                        Source::Bg(1, 0),
                        Source::Obj(1),
                        Source::Obj(0),
                        Source::Bg(2, 0),
                    ]
                } else {
                    vec![
                        Source::Obj(3),
                        Source::Bg(0, 1),
                        Source::Bg(1, 1),
                        Source::Obj(2),
                        Source::Bg(0, 0),
                        Source::Bg(1, 0),
                        Source::Obj(1),
                        Source::Bg(2, 1),
                        Source::Obj(0),
                        Source::Bg(2, 0),
                    ]
                }
            }
            6 => vec![
                Source::Obj(3),
                Source::Bg(0, 1),
                Source::Obj(2),
                Source::Obj(1),
                Source::Bg(0, 0),
                Source::Obj(0),
            ],
            7 => {
                if self.mode7.ext_bg_enabled {
                    vec![
                        Source::Obj(3),
                        Source::ExtBg(1),
                        Source::Obj(2),
                        Source::Obj(1),
                        Source::Bg(0, 0),
                        Source::Obj(0),
                        Source::ExtBg(0),
                    ]
                } else {
                    vec![Source::Obj(3), Source::Obj(2), Source::Obj(1), Source::Bg(0, 0), Source::Obj(0)]
                }
            }
            _ => vec![
                Source::Obj(3),
                Source::Bg(0, 1),
                Source::Obj(2),
                Source::Bg(1, 1),
                Source::Obj(1),
                Source::Bg(0, 0),
                Source::Obj(0),
                Source::Bg(1, 0),
            ],
        }
    }

    fn bpp_for_layer(&self, layer: usize) -> u8 {
        match (self.bg_mode, layer) {
            (0, _) => 2,
            (1, 0) | (1, 1) => 4,
            (1, 2) => 2,
            (2, _) => 4,
            (3, 0) => 8,
            (3, 1) => 4,
            (4, 0) => 8,
            (4, 1) => 2,
            (5, 0) => 4,
            (5, 1) => 2,
            (6, 0) => 4,
            (7, 0) => 8,
            _ => 2,
        }
    }

    fn decode_bg_pixel(tile: &BgTile, bpp: u8, fine_x: u8) -> Option<(u8, u8, u8)> {
        let h_flip = tile.tilemap_data & 0x4000 != 0;
        let palette = ((tile.tilemap_data >> 10) & 0x7) as u8;
        let priority = ((tile.tilemap_data >> 13) & 0x1) as u8;
        let bit = if h_flip { fine_x } else { 7 - fine_x };

        let words = (bpp / 2) as usize;
        let mut color = 0u8;
        for w in 0..words.min(4) {
            let word = tile.chr_data[w];
            let lo = (word & 0xFF) as u8;
            let hi = (word >> 8) as u8;
            let b0 = (lo >> bit) & 1;
            let b1 = (hi >> bit) & 1;
            color |= (b0 << (w * 2)) | (b1 << (w * 2 + 1));
        }
        if color == 0 {
            None
        } else {
            Some((color, palette, priority))
        }
    }

    /// Map a decoded (bpp, palette, color) triple to its CGRAM entry.
    ///
    /// In mode 0 every background has its own 32-entry palette bank (BG1 at
    /// 0, BG2 at 32, BG3 at 64, BG4 at 96); every other mode shares the
    /// whole 256-entry table starting at 0.
    fn bg_cgram_index(&self, layer: usize, bpp: u8, palette: u8, color: u8) -> u8 {
        let base = if self.bg_mode == 0 { (layer as u8) * 32 } else { 0 };
        let local = match bpp {
            2 => palette.wrapping_mul(4).wrapping_add(color),
            4 => palette.wrapping_mul(16).wrapping_add(color),
            _ => color,
        };
        base.wrapping_add(local)
    }

    /// Sample one background layer's pixel at screen column `x` from its
    /// already-fetched tile row.
    fn sample_bg(&self, layer: usize, rows: &[[BgTile; crate::ppu::background::TILES_PER_ROW]; 4], x: u16) -> Option<(u8, u8)> {
        let bpp = self.bpp_for_layer(layer);
        let layer_cfg = self.layers[layer];
        let shift = 3u16;
        // Mosaic latches the horizontal axis the same way `fetch_bg_layer`
        // snaps the vertical one: every `mosaic_size` columns repeat the
        // leftmost column's sample within the block.
        let x = if self.mosaic_enable[layer] && self.mosaic_size > 1 {
            x - x % self.mosaic_size as u16
        } else {
            x
        };
        let frac = layer_cfg.h_scroll & 7;
        let eff = x + frac;
        let tile_i = (eff >> shift) as usize;
        let fine_x = (eff & 7) as u8;
        let tile = rows[layer].get(tile_i)?;
        let (color, palette, priority) = Self::decode_bg_pixel(tile, bpp, fine_x)?;
        Some((self.bg_cgram_index(layer, bpp, palette, color), priority))
    }

    fn layer_clipped(&self, layer_window_index: usize, x: u16) -> bool {
        let cfg = self.layer_windows[layer_window_index];
        if !cfg.window_enabled[0] && !cfg.window_enabled[1] {
            return false;
        }
        cfg.is_inside(x, &self.windows)
    }

    fn clip13(value: i32) -> i32 {
        let v = value & 0x1FFF;
        if v & 0x1000 != 0 {
            v - 0x2000
        } else {
            v
        }
    }

    /// Sample the Mode 7 rotated background at screen column `x`, returning
    /// `(cgram_index, priority, ext_plane_color)` where `ext_plane_color`
    /// carries the raw 2-bit extbg value (the high bit of the tile byte
    /// selects priority, the low bit selects one of two CGRAM entries, per
    /// the extbg convention used when SETINI bit 6 is set).
    fn mode7_sample(&self, x: u16) -> Option<(i32, i32, u8)> {
        let m7 = &self.mode7;
        let a = m7.matrix_a as i32;
        let b = m7.matrix_b as i32;
        let c = m7.matrix_c as i32;
        let d = m7.matrix_d as i32;
        let cx = Self::clip13(m7.center_x as i32);
        let cy = Self::clip13(m7.center_y as i32);
        let h = Self::clip13(m7.h_scroll_latch as i32);
        let v = Self::clip13(m7.v_scroll_latch as i32);

        let screen_x = if m7.horizontal_mirror { 255 - x as i32 } else { x as i32 };
        let screen_y_raw = self.scanline as i32;
        let screen_y = if m7.vertical_mirror { 255 - screen_y_raw } else { screen_y_raw };

        let dx = screen_x - cx + h;
        let dy = screen_y - cy + v;

        let rx = ((a * dx + b * dy) >> 8) + cx;
        let ry = ((c * dx + d * dy) >> 8) + cy;

        let (tile_x, tile_y, outside) = if m7.large_map {
            (rx.rem_euclid(1024) / 8, ry.rem_euclid(1024) / 8, false)
        } else {
            let outside = !(0..1024).contains(&rx) || !(0..1024).contains(&ry);
            (rx.rem_euclid(1024) / 8, ry.rem_euclid(1024) / 8, outside)
        };

        let tile_number = if outside {
            if m7.fill_with_tile0 {
                0
            } else {
                return None;
            }
        } else {
            let map_addr = (tile_y as u32 * 128 + tile_x as u32) & 0x3FFF;
            (self.vram.get(map_addr as usize).copied().unwrap_or(0) & 0xFF) as u32
        };

        let px = rx.rem_euclid(8) as u32;
        let py = ry.rem_euclid(8) as u32;
        let chr_addr = (tile_number * 64 + py * 8 + px) & 0x7FFF;
        let word = self.vram.get(chr_addr as usize).copied().unwrap_or(0);
        let color = (word & 0xFF) as u8;
        let ext = ((word >> 8) & 0xFF) as u8;
        Some((color as i32, (ext >> 7) as i32, ext & 0x7F))
    }

    /// Composite the fetched background and sprite state for the current
    /// scanline into one row of BGR555 pixels.
    pub(crate) fn composite_scanline(&mut self) -> [Bgr555; SCREEN_WIDTH] {
        if self.bg_mode == 7 {
            self.mode7.h_scroll_latch = self.mode7.h_scroll;
            self.mode7.v_scroll_latch = self.mode7.v_scroll;
        }

        // Forced blank substitutes a synthetic all-black main/sub screen for
        // this scanline (no tile/sprite fetch happens either), matching
        // hardware's bgMode-8 fallback in `RenderScanline`. Color math and
        // brightness still run against the zeroed screens below, exactly as
        // the real PPU does.
        let forced = self.forced_blank;

        let mut rows: [[BgTile; crate::ppu::background::TILES_PER_ROW]; 4] =
            [[BgTile::default(); crate::ppu::background::TILES_PER_ROW]; 4];
        if !forced && self.bg_mode != 7 {
            for layer in 0..4 {
                rows[layer] = self.fetch_bg_layer(layer, self.bpp_for_layer(layer));
            }
        }

        let mode7 = if !forced && self.bg_mode == 7 {
            Some(core::array::from_fn::<_, { SCREEN_WIDTH }, _>(|x| self.mode7_sample(x as u16)))
        } else {
            None
        };

        let order = self.draw_order();
        let mut out = [Bgr555::BLACK; SCREEN_WIDTH];
        let backdrop = Bgr555::from_word(self.cgram_word(0));

        for x in 0..SCREEN_WIDTH as u16 {
            let (main, sub) = if forced {
                (None, None)
            } else {
                (
                    self.resolve_screen(&order, &rows, mode7.as_ref(), x, self.main_screen_enable, self.main_window_mask),
                    self.resolve_screen(&order, &rows, mode7.as_ref(), x, self.sub_screen_enable, self.sub_window_mask),
                )
            };

            let main_color = if forced { Bgr555::BLACK } else { main.map(|(src, idx)| self.source_cgram_color(src, idx)).unwrap_or(backdrop) };

            let color_math_on_main = !forced
                && main
                    .map(|(src, _)| self.color_math_enabled_for(src))
                    .unwrap_or(self.color_math_enable & 0x20 != 0);

            let inside_color_window = self.layer_clipped(5, x);
            let clipped = self.color_math_clip_mode.applies(inside_color_window);
            // `color_math_prevent_mode` is pre-translated at register-write
            // time so `.applies()` here means "math is enabled in this
            // window region", matching CGWSEL's own Always/Inside/Outside/
            // Never ordering for that field.
            let math_window_allows = self.color_math_prevent_mode.applies(inside_color_window);

            let effective_main = if clipped { Bgr555::BLACK } else { main_color };
            let math_applies = color_math_on_main && math_window_allows;

            let final_color = if math_applies {
                // Operand B is the sub-screen pixel only when add-subscreen
                // is on and the sub screen was actually filled at this
                // column; otherwise it falls back to the fixed color, and
                // that fallback specifically disables the halve shift (§4.5
                // step 4) — but only in the "add-subscreen on, nothing
                // there" case, not when add-subscreen is off outright.
                let (sub_color, disable_half) = match (self.color_math_add_subscreen, sub) {
                    (true, Some((src, idx))) => (self.source_cgram_color(src, idx), false),
                    (true, None) => (self.fixed_color, true),
                    (false, _) => (self.fixed_color, false),
                };
                self.blend(effective_main, sub_color, disable_half)
            } else {
                effective_main
            };

            out[x as usize] = self.apply_brightness(final_color);
        }

        out
    }

    /// Render the sub-screen in isolation, with no color math applied, for
    /// the even columns of a hi-res scanline (§4.5). This refetches the
    /// background rows independently of `composite_scanline`; the two never
    /// run in the same pass because only one of them needs the sub-screen
    /// image on a non-hi-res line.
    pub(crate) fn composite_subscreen_scanline(&mut self) -> [Bgr555; SCREEN_WIDTH] {
        let forced = self.forced_blank;

        let mut rows: [[BgTile; crate::ppu::background::TILES_PER_ROW]; 4] =
            [[BgTile::default(); crate::ppu::background::TILES_PER_ROW]; 4];
        if !forced && self.bg_mode != 7 {
            for layer in 0..4 {
                rows[layer] = self.fetch_bg_layer(layer, self.bpp_for_layer(layer));
            }
        }

        let mode7 = if !forced && self.bg_mode == 7 {
            Some(core::array::from_fn::<_, { SCREEN_WIDTH }, _>(|x| self.mode7_sample(x as u16)))
        } else {
            None
        };

        let order = self.draw_order();
        let mut out = [Bgr555::BLACK; SCREEN_WIDTH];
        let backdrop = Bgr555::from_word(self.cgram_word(0));

        for x in 0..SCREEN_WIDTH as u16 {
            let color = if forced {
                Bgr555::BLACK
            } else {
                let sub = self.resolve_screen(&order, &rows, mode7.as_ref(), x, self.sub_screen_enable, self.sub_window_mask);
                sub.map(|(src, idx)| self.source_cgram_color(src, idx)).unwrap_or(backdrop)
            };
            out[x as usize] = self.apply_brightness(color);
        }

        out
    }

    #[allow(clippy::too_many_arguments)]
    fn resolve_screen(
        &self,
        order: &[Source],
        rows: &[[BgTile; crate::ppu::background::TILES_PER_ROW]; 4],
        mode7: Option<&[Option<(i32, i32, u8)>; SCREEN_WIDTH]>,
        x: u16,
        enable_mask: u8,
        window_mask: u8,
    ) -> Option<(Source, u8)> {
        for &src in order {
            match src {
                Source::Bg(layer, tier) => {
                    if enable_mask & (1 << layer) == 0 {
                        continue;
                    }
                    if window_mask & (1 << layer) != 0 && self.layer_clipped(layer, x) {
                        continue;
                    }
                    if self.bg_mode == 7 {
                        if let Some(samples) = mode7 {
                            if let Some((color, _, _)) = samples[x as usize] {
                                if color != 0 {
                                    return Some((src, color as u8));
                                }
                            }
                        }
                        continue;
                    }
                    if let Some((idx, priority)) = self.sample_bg(layer, rows, x) {
                        if priority == tier {
                            return Some((src, idx));
                        }
                    }
                }
                Source::ExtBg(tier) => {
                    if enable_mask & 0x02 == 0 {
                        continue;
                    }
                    if window_mask & 0x02 != 0 && self.layer_clipped(1, x) {
                        continue;
                    }
                    if let Some(samples) = mode7 {
                        if let Some((_, priority, ext)) = samples[x as usize] {
                            if priority as u8 == tier && ext & 0x7F != 0 {
                                return Some((src, 128 + (ext & 0x7F)));
                            }
                        }
                    }
                }
                Source::Obj(tier) => {
                    if enable_mask & 0x10 == 0 {
                        continue;
                    }
                    if window_mask & 0x10 != 0 && self.layer_clipped(4, x) {
                        continue;
                    }
                    let color = self.sprite_colors[x as usize];
                    if color != 0 && self.sprite_priority[x as usize] == tier {
                        let idx = 128 + self.sprite_palette[x as usize].wrapping_mul(16).wrapping_add(color);
                        return Some((src, idx));
                    }
                }
            }
        }
        None
    }

    fn source_cgram_color(&self, src: Source, cgram_index: u8) -> Bgr555 {
        let is_8bpp_bg = match src {
            Source::Bg(layer, _) => self.bpp_for_layer(layer) == 8,
            _ => false,
        };
        if self.direct_color_mode && is_8bpp_bg {
            return Self::direct_color(cgram_index);
        }
        Bgr555::from_word(self.cgram_word(cgram_index))
    }

    /// Direct color formula for 8bpp tile layers, including Mode 7's plane
    /// (§4.4): the 8-bit pixel value is split 3/3/2 and scaled up to 5 bits
    /// per channel instead of indexing CGRAM.
    fn direct_color(index: u8) -> Bgr555 {
        let r = (index & 0x07) << 2;
        let g = ((index >> 3) & 0x07) << 2;
        let b = ((index >> 6) & 0x03) << 3;
        Bgr555 { r, g, b }
    }

    /// Sprites only feed color math when drawn from palettes 4-7 (CGRAM
    /// indices 16-31 of the 32-entry sprite palette bank, i.e. index 128+16
    /// and up in our flattened 128-255 sprite CGRAM range).
    fn color_math_enabled_for(&self, src: Source) -> bool {
        let bit = match src {
            Source::Bg(layer, _) => layer,
            Source::ExtBg(_) => 1,
            Source::Obj(_) => 4,
        };
        self.color_math_enable & (1 << bit) != 0
    }

    /// Blend `main` with operand B (`sub`), applying the halve shift unless
    /// `disable_half` overrides it — real hardware disables the shift
    /// specifically when B fell back to the fixed color because
    /// add-subscreen was on but the sub screen wasn't filled at this column
    /// (§4.5 step 4).
    fn blend(&self, main: Bgr555, sub: Bgr555, disable_half: bool) -> Bgr555 {
        let combine = |a: u8, b: u8| -> u8 {
            let raw = if self.color_math_subtract {
                a.saturating_sub(b)
            } else {
                (a + b).min(31)
            };
            if self.color_math_half && !disable_half {
                raw / 2
            } else {
                raw
            }
        };
        Bgr555 {
            r: combine(main.r, sub.r),
            g: combine(main.g, sub.g),
            b: combine(main.b, sub.b),
        }
    }

    fn apply_brightness(&self, color: Bgr555) -> Bgr555 {
        if self.brightness >= 15 {
            return color;
        }
        let scale = |c: u8| ((c as u16 * self.brightness as u16) / 15) as u8;
        Bgr555 {
            r: scale(color.r),
            g: scale(color.g),
            b: scale(color.b),
        }
    }
}
