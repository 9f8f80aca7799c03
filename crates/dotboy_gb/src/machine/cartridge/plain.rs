use super::{banked_rom_read, ExternalRam};

/// ROM-only cartridge (types 0x00, 0x08, 0x09).
///
/// 32 KiB of fixed ROM; when present, external RAM sits unbanked at
/// A000-BFFF and is always accessible.
pub struct PlainCartridge {
    rom: Vec<u8>,
    pub(crate) ram: ExternalRam,
}

impl PlainCartridge {
    pub(crate) fn new(rom: Vec<u8>, ram: ExternalRam) -> Self {
        Self { rom, ram }
    }

    pub(crate) fn read(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x3FFF => banked_rom_read(&self.rom, 0, addr),
            0x4000..=0x7FFF => banked_rom_read(&self.rom, 1, addr),
            0xA000..=0xBFFF => self.ram.read(0, addr),
            _ => 0xFF,
        }
    }

    pub(crate) fn write(&mut self, addr: u16, value: u8) {
        if let 0xA000..=0xBFFF = addr {
            self.ram.write(0, addr, value);
        }
    }
}
