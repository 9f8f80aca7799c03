use crate::config::{GbConfig, CYCLES_PER_SCANLINE};
use crate::cpu::Interrupt;
use crate::{SCREEN_HEIGHT, SCREEN_WIDTH};

use super::bus::LY_ADDR;
use super::GameBoyBus;

mod render;

pub const LCDC_ADDR: u16 = 0xFF40;
pub const STAT_ADDR: u16 = 0xFF41;
pub const SCY_ADDR: u16 = 0xFF42;
pub const SCX_ADDR: u16 = 0xFF43;
pub const LYC_ADDR: u16 = 0xFF45;
pub const BGP_ADDR: u16 = 0xFF47;
pub const OBP0_ADDR: u16 = 0xFF48;
pub const OBP1_ADDR: u16 = 0xFF49;
pub const WY_ADDR: u16 = 0xFF4A;
pub const WX_ADDR: u16 = 0xFF4B;

/// End of OAM scan within a scanline.
const MODE2_END: u32 = 80;
/// End of pixel transfer within a scanline.
const MODE3_END: u32 = MODE2_END + 172;
/// First V-blank line.
const VBLANK_LINE: u8 = 144;
const LAST_LINE: u8 = 153;

bitflags::bitflags! {
    /// LCD control register (FF40).
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Lcdc: u8 {
        const BG_ENABLE     = 1 << 0;
        const OBJ_ENABLE    = 1 << 1;
        const OBJ_TALL      = 1 << 2;
        const BG_MAP_HIGH   = 1 << 3;
        const TILE_DATA_LOW = 1 << 4;
        const WINDOW_ENABLE = 1 << 5;
        const WINDOW_MAP_HIGH = 1 << 6;
        const LCD_ENABLE    = 1 << 7;
    }
}

bitflags::bitflags! {
    /// LCD status register (FF41), excluding the two mode bits.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Stat: u8 {
        const COINCIDENCE = 1 << 2;
        const HBLANK_INT  = 1 << 3;
        const VBLANK_INT  = 1 << 4;
        const OAM_INT     = 1 << 5;
        const LYC_INT     = 1 << 6;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LcdMode {
    HBlank = 0,
    VBlank = 1,
    OamScan = 2,
    Transfer = 3,
}

impl LcdMode {
    pub fn from_stat(stat: u8) -> Self {
        match stat & 0x03 {
            0 => LcdMode::HBlank,
            1 => LcdMode::VBlank,
            2 => LcdMode::OamScan,
            _ => LcdMode::Transfer,
        }
    }

    /// STAT enable bit for the interrupt raised on entering this mode.
    fn interrupt_source(self) -> Option<Stat> {
        match self {
            LcdMode::HBlank => Some(Stat::HBLANK_INT),
            LcdMode::VBlank => Some(Stat::VBLANK_INT),
            LcdMode::OamScan => Some(Stat::OAM_INT),
            LcdMode::Transfer => None,
        }
    }
}

/// LCD controller: scanline/mode state machine plus the framebuffer.
///
/// Registers live in bus memory and are touched only through raw access.
/// Each `update` first derives the mode from the position inside the
/// current scanline, then advances the position; a scanline is rasterized
/// once, on the transition from pixel transfer into H-blank.
pub struct Lcd {
    counter: u32,
    frame_ready: bool,
    framebuffer: Vec<u32>,
    palette: [u32; 4],
}

impl Lcd {
    pub fn new(config: &GbConfig) -> Self {
        let palette = config.palette_argb();
        Self {
            counter: 0,
            frame_ready: false,
            framebuffer: vec![palette[0]; SCREEN_WIDTH * SCREEN_HEIGHT],
            palette,
        }
    }

    pub fn update(&mut self, cycles: u32, bus: &mut GameBoyBus) {
        self.set_status(bus);

        if !Self::lcdc(bus).contains(Lcdc::LCD_ENABLE) {
            return;
        }

        self.counter += cycles;
        if self.counter < CYCLES_PER_SCANLINE {
            return;
        }
        self.counter -= CYCLES_PER_SCANLINE;

        let mut line = bus.raw_read(LY_ADDR).wrapping_add(1);
        if line > LAST_LINE {
            line = 0;
        }

        let mut stat = Stat::from_bits_retain(bus.raw_read(STAT_ADDR));
        if line == bus.raw_read(LYC_ADDR) {
            stat.insert(Stat::COINCIDENCE);
            if stat.contains(Stat::LYC_INT) {
                bus.request_interrupt(Interrupt::STAT);
            }
        } else {
            stat.remove(Stat::COINCIDENCE);
        }
        bus.raw_write(STAT_ADDR, stat.bits());

        if line == VBLANK_LINE {
            self.frame_ready = true;
            bus.request_interrupt(Interrupt::VBLANK);
        }

        bus.raw_write(LY_ADDR, line);
    }

    fn lcdc(bus: &GameBoyBus) -> Lcdc {
        Lcdc::from_bits_retain(bus.raw_read(LCDC_ADDR))
    }

    fn set_status(&mut self, bus: &mut GameBoyBus) {
        let stat = bus.raw_read(STAT_ADDR);

        if !Self::lcdc(bus).contains(Lcdc::LCD_ENABLE) {
            let stat = (stat & !0x03 & !Stat::COINCIDENCE.bits()) | LcdMode::VBlank as u8;
            bus.raw_write(STAT_ADDR, stat);
            bus.raw_write(LY_ADDR, 0);
            self.counter = 0;
            return;
        }

        let prev = LcdMode::from_stat(stat);
        let mode = if bus.raw_read(LY_ADDR) >= VBLANK_LINE {
            LcdMode::VBlank
        } else if self.counter < MODE2_END {
            LcdMode::OamScan
        } else if self.counter < MODE3_END {
            LcdMode::Transfer
        } else {
            if prev == LcdMode::Transfer {
                self.draw_scanline(bus);
            }
            LcdMode::HBlank
        };

        let stat = (stat & !0x03) | mode as u8;
        let enabled = mode
            .interrupt_source()
            .is_some_and(|source| Stat::from_bits_retain(stat).contains(source));
        if enabled && mode != prev {
            bus.request_interrupt(Interrupt::STAT);
        }
        bus.raw_write(STAT_ADDR, stat);
    }

    pub fn mode(bus: &GameBoyBus) -> LcdMode {
        LcdMode::from_stat(bus.raw_read(STAT_ADDR))
    }

    /// Color at (x, y) as ARGB; 0 outside the screen.
    pub fn pixel(&self, x: usize, y: usize) -> u32 {
        if x >= SCREEN_WIDTH || y >= SCREEN_HEIGHT {
            return 0;
        }
        self.framebuffer[y * SCREEN_WIDTH + x]
    }

    pub fn framebuffer(&self) -> &[u32] {
        &self.framebuffer
    }

    /// Returns `true` once per completed frame.
    pub fn take_frame_ready(&mut self) -> bool {
        std::mem::take(&mut self.frame_ready)
    }
}
