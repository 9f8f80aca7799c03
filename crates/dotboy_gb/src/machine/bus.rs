use crate::cpu::{Bus, Interrupt, IF_ADDR};

use super::audio::{Mixer, AUDIO_END, AUDIO_START};
use super::cartridge::Cartridge;
use super::joypad::{Joypad, JOYP_ADDR};
use super::serial::{Serial, SB_ADDR, SC_ADDR};
use super::timer::DIV_ADDR;
use super::MEMORY_SIZE;

mod dma;
mod init;

pub use dma::DMA_ADDR;

/// Scanline register; CPU writes reset it.
pub(crate) const LY_ADDR: u16 = 0xFF44;

/// Direction of one bus access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

/// Address router for the DMG memory map.
///
/// Everything that is not claimed by a device falls through to a flat
/// 64 KiB array, which also holds VRAM, WRAM, OAM, HRAM and the video,
/// timer and interrupt registers. Routing order, first match wins:
///
/// 1. cartridge ROM (0000-7FFF) and external RAM (A000-BFFF)
/// 2. joypad (FF00)
/// 3. OAM DMA trigger (FF46)
/// 4. writes to DIV (FF04) or LY (FF44), which zero the register
/// 5. sound registers and wave RAM (FF10-FF3F)
/// 6. serial (FF01-FF02)
/// 7. echo RAM (E000-FDFF), mirrored onto C000-DDFF
pub struct GameBoyBus {
    pub(crate) memory: [u8; MEMORY_SIZE],
    pub(crate) cartridge: Cartridge,
    pub(crate) joypad: Joypad,
    pub(crate) serial: Serial,
    pub(crate) mixer: Mixer,
}

impl GameBoyBus {
    /// Build the bus and apply the post-boot register state.
    pub fn new(cartridge: Cartridge, mixer: Mixer) -> Self {
        let mut bus = Self {
            memory: [0; MEMORY_SIZE],
            cartridge,
            joypad: Joypad::default(),
            serial: Serial::default(),
            mixer,
        };
        bus.apply_post_boot_io();
        bus
    }

    /// Routed access, used by the CPU and by DMA.
    pub fn access(&mut self, addr: u16, data: &mut u8, access: Access) {
        match (addr, access) {
            (0x0000..=0x7FFF | 0xA000..=0xBFFF, Access::Read) => *data = self.cartridge.read(addr),
            (0x0000..=0x7FFF | 0xA000..=0xBFFF, Access::Write) => self.cartridge.write(addr, *data),

            (JOYP_ADDR, Access::Read) => *data = self.joypad.read(),
            (JOYP_ADDR, Access::Write) => self.joypad.write(*data),

            (DMA_ADDR, Access::Read) => *data = self.memory[DMA_ADDR as usize],
            (DMA_ADDR, Access::Write) => self.oam_dma(*data),

            (DIV_ADDR | LY_ADDR, Access::Write) => self.memory[addr as usize] = 0,

            (AUDIO_START..=AUDIO_END, Access::Read) => *data = self.mixer.read(addr),
            (AUDIO_START..=AUDIO_END, Access::Write) => self.mixer.write(addr, *data),

            (SB_ADDR | SC_ADDR, Access::Read) => *data = self.serial.read(addr),
            (SB_ADDR | SC_ADDR, Access::Write) => {
                if self.serial.write(addr, *data) {
                    self.request_interrupt(Interrupt::SERIAL);
                }
            }

            (0xE000..=0xFDFF, _) => self.raw_access(addr - 0x2000, data, access),

            _ => self.raw_access(addr, data, access),
        }
    }

    /// Flat-memory access with no device side effects, for the hardware
    /// update logic (timers, LCD, interrupt flags).
    pub fn raw_access(&mut self, addr: u16, data: &mut u8, access: Access) {
        match access {
            Access::Read => *data = self.memory[addr as usize],
            Access::Write => self.memory[addr as usize] = *data,
        }
    }

    #[inline]
    pub fn raw_read(&self, addr: u16) -> u8 {
        self.memory[addr as usize]
    }

    #[inline]
    pub fn raw_write(&mut self, addr: u16, value: u8) {
        self.memory[addr as usize] = value;
    }

    /// OR an interrupt source into IF without going through routing.
    pub fn request_interrupt(&mut self, source: Interrupt) {
        let iflag = self.raw_read(IF_ADDR);
        self.raw_write(IF_ADDR, iflag | source.bits());
    }

    pub fn cartridge(&self) -> &Cartridge {
        &self.cartridge
    }

    pub fn joypad_mut(&mut self) -> &mut Joypad {
        &mut self.joypad
    }

    pub fn serial_output(&self) -> &[u8] {
        &self.serial.output
    }
}

impl Bus for GameBoyBus {
    fn read8(&mut self, addr: u16) -> u8 {
        let mut data = 0;
        self.access(addr, &mut data, Access::Read);
        data
    }

    fn write8(&mut self, addr: u16, value: u8) {
        let mut data = value;
        self.access(addr, &mut data, Access::Write);
    }
}
