use crate::machine::bus::LY_ADDR;
use crate::machine::GameBoyBus;
use crate::{SCREEN_HEIGHT, SCREEN_WIDTH};

use super::{
    Lcd, Lcdc, BGP_ADDR, OBP0_ADDR, OBP1_ADDR, SCX_ADDR, SCY_ADDR, WX_ADDR, WY_ADDR,
};

const OAM_START: u16 = 0xFE00;
const OAM_ENTRIES: u16 = 40;
const MAX_SPRITES_PER_LINE: usize = 10;

/// Shade (0..=3) a palette register assigns to a 2-bit color index.
fn shade(palette: u8, index: u8) -> u8 {
    (palette >> (index * 2)) & 0x03
}

/// Color index of column `bit` (7 = leftmost) from a tile row's bitplanes.
fn color_index(low: u8, high: u8, bit: u8) -> u8 {
    (((high >> bit) & 1) << 1) | ((low >> bit) & 1)
}

struct Sprite {
    y: i16,
    x: i16,
    tile: u8,
    attrs: u8,
}

impl Sprite {
    fn read(bus: &GameBoyBus, index: u16) -> Self {
        let addr = OAM_START + index * 4;
        Sprite {
            y: i16::from(bus.raw_read(addr)) - 16,
            x: i16::from(bus.raw_read(addr + 1)) - 8,
            tile: bus.raw_read(addr + 2),
            attrs: bus.raw_read(addr + 3),
        }
    }

    fn behind_background(&self) -> bool {
        self.attrs & 0x80 != 0
    }

    fn y_flip(&self) -> bool {
        self.attrs & 0x40 != 0
    }

    fn x_flip(&self) -> bool {
        self.attrs & 0x20 != 0
    }

    fn palette_addr(&self) -> u16 {
        if self.attrs & 0x10 != 0 {
            OBP1_ADDR
        } else {
            OBP0_ADDR
        }
    }
}

impl Lcd {
    /// Rasterize the line in LY into the framebuffer.
    pub(super) fn draw_scanline(&mut self, bus: &GameBoyBus) {
        let line = bus.raw_read(LY_ADDR);
        if usize::from(line) >= SCREEN_HEIGHT {
            return;
        }

        let lcdc = Self::lcdc(bus);
        let mut bg_shades = [shade(bus.raw_read(BGP_ADDR), 0); SCREEN_WIDTH];
        if lcdc.contains(Lcdc::BG_ENABLE) {
            self.draw_tiles(bus, lcdc, line, &mut bg_shades);
        }
        if lcdc.contains(Lcdc::OBJ_ENABLE) {
            self.draw_sprites(bus, lcdc, line, &bg_shades);
        }
    }

    fn put(&mut self, x: usize, line: u8, shade: u8) {
        self.framebuffer[usize::from(line) * SCREEN_WIDTH + x] = self.palette[usize::from(shade)];
    }

    /// Background and window layer.
    fn draw_tiles(
        &mut self,
        bus: &GameBoyBus,
        lcdc: Lcdc,
        line: u8,
        bg_shades: &mut [u8; SCREEN_WIDTH],
    ) {
        let scy = bus.raw_read(SCY_ADDR);
        let scx = bus.raw_read(SCX_ADDR);
        let bgp = bus.raw_read(BGP_ADDR);
        let wy = bus.raw_read(WY_ADDR);
        let window_x = i16::from(bus.raw_read(WX_ADDR)) - 7;

        let bg_map: u16 = if lcdc.contains(Lcdc::BG_MAP_HIGH) { 0x9C00 } else { 0x9800 };
        let window_map: u16 = if lcdc.contains(Lcdc::WINDOW_MAP_HIGH) { 0x9C00 } else { 0x9800 };
        let window_on_line = lcdc.contains(Lcdc::WINDOW_ENABLE) && line >= wy;

        for x in 0..SCREEN_WIDTH {
            let (map, map_x, map_y) = if window_on_line && x as i16 >= window_x {
                (window_map, (x as i16 - window_x) as u8, line - wy)
            } else {
                (bg_map, (x as u8).wrapping_add(scx), line.wrapping_add(scy))
            };

            let tile_index = u16::from(map_y / 8) * 32 + u16::from(map_x / 8);
            let tile = bus.raw_read(map + tile_index);
            let row_addr = tile_row_addr(lcdc, tile, map_y % 8);

            let low = bus.raw_read(row_addr);
            let high = bus.raw_read(row_addr + 1);
            let index = color_index(low, high, 7 - map_x % 8);

            let s = shade(bgp, index);
            bg_shades[x] = s;
            self.put(x, line, s);
        }
    }

    /// Sprite layer.
    ///
    /// OAM is walked in memory order and at most ten sprites on the line are
    /// drawn. A 160-entry claim array records which columns a sprite has
    /// already painted; later sprites skip claimed columns, so earlier OAM
    /// entries win overlaps regardless of x position.
    fn draw_sprites(&mut self, bus: &GameBoyBus, lcdc: Lcdc, line: u8, bg_shades: &[u8; SCREEN_WIDTH]) {
        let height: i16 = if lcdc.contains(Lcdc::OBJ_TALL) { 16 } else { 8 };
        let bg_color0 = shade(bus.raw_read(BGP_ADDR), 0);
        let line_i = i16::from(line);

        let mut claimed = [false; SCREEN_WIDTH];
        let mut drawn = 0;

        for index in 0..OAM_ENTRIES {
            if drawn == MAX_SPRITES_PER_LINE {
                break;
            }

            let sprite = Sprite::read(bus, index);
            if line_i < sprite.y || line_i >= sprite.y + height {
                continue;
            }
            drawn += 1;

            let mut row = line_i - sprite.y;
            if sprite.y_flip() {
                row = height - row - 1;
            }
            let tile = if height == 16 { sprite.tile & 0xFE } else { sprite.tile };
            let row_addr = 0x8000 + u16::from(tile) * 16 + row as u16 * 2;
            let low = bus.raw_read(row_addr);
            let high = bus.raw_read(row_addr + 1);
            let obp = bus.raw_read(sprite.palette_addr());

            for px in 0..8i16 {
                let x = sprite.x + px;
                if x >= SCREEN_WIDTH as i16 {
                    break;
                }
                if x < 0 {
                    continue;
                }
                let x = x as usize;

                if claimed[x] {
                    continue;
                }
                if sprite.behind_background() && bg_shades[x] != bg_color0 {
                    continue;
                }

                let bit = if sprite.x_flip() { px as u8 } else { 7 - px as u8 };
                let index = color_index(low, high, bit);
                if index == 0 {
                    continue;
                }

                self.put(x, line, shade(obp, index));
                claimed[x] = true;
            }
        }
    }
}

/// Address of row `row` of `tile`, honoring the signed 0x9000-based
/// addressing mode when LCDC bit 4 is clear.
fn tile_row_addr(lcdc: Lcdc, tile: u8, row: u8) -> u16 {
    let base = if lcdc.contains(Lcdc::TILE_DATA_LOW) {
        0x8000u16.wrapping_add(u16::from(tile) * 16)
    } else {
        0x9000u16.wrapping_add_signed(i16::from(tile as i8) * 16)
    };
    base + u16::from(row) * 2
}
