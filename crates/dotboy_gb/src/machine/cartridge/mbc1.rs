use super::{banked_rom_read, ExternalRam};

/// MBC1 banking controller (types 0x01-0x03).
///
/// 0x2000-0x3FFF selects the low five ROM bank bits, with a request for
/// bank 0 mapped to bank 1. The two-bit secondary register at
/// 0x4000-0x5FFF is either the upper ROM bank bits (ROM banking mode) or
/// the RAM bank (RAM banking mode); 0x6000-0x7FFF picks the mode.
pub struct Mbc1Cartridge {
    rom: Vec<u8>,
    pub(crate) ram: ExternalRam,
    rom_bank_low5: u8,
    secondary: u8,
    ram_banking_mode: bool,
    ram_enable: bool,
}

impl Mbc1Cartridge {
    pub(crate) fn new(rom: Vec<u8>, ram: ExternalRam) -> Self {
        Self {
            rom,
            ram,
            rom_bank_low5: 1,
            secondary: 0,
            ram_banking_mode: false,
            ram_enable: false,
        }
    }

    /// Bank mapped at 0x4000-0x7FFF.
    pub(crate) fn rom_bank(&self) -> usize {
        let high = if self.ram_banking_mode { 0 } else { self.secondary };
        ((high as usize) << 5) | self.rom_bank_low5 as usize
    }

    pub(crate) fn ram_bank(&self) -> usize {
        if self.ram_banking_mode {
            self.secondary as usize
        } else {
            0
        }
    }

    fn ram_accessible(&self) -> bool {
        self.ram_enable && self.ram.is_present()
    }

    pub(crate) fn read(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x3FFF => banked_rom_read(&self.rom, 0, addr),
            0x4000..=0x7FFF => banked_rom_read(&self.rom, self.rom_bank(), addr),
            0xA000..=0xBFFF if self.ram_accessible() => self.ram.read(self.ram_bank(), addr),
            _ => 0xFF,
        }
    }

    pub(crate) fn write(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=0x1FFF => {
                self.ram_enable = (value & 0x0F) == 0x0A;
            }
            0x2000..=0x3FFF => {
                self.rom_bank_low5 = match value & 0x1F {
                    0 => 1,
                    bank => bank,
                };
                log::debug!("MBC1 ROM bank -> {}", self.rom_bank());
            }
            0x4000..=0x5FFF => {
                self.secondary = value & 0x03;
            }
            0x6000..=0x7FFF => {
                self.ram_banking_mode = value != 0;
            }
            0xA000..=0xBFFF if self.ram_accessible() => {
                let bank = self.ram_bank();
                self.ram.write(bank, addr, value);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cart(banks: usize, ram_size: usize) -> Mbc1Cartridge {
        let mut rom = vec![0u8; banks * 0x4000];
        for bank in 0..banks {
            rom[bank * 0x4000] = bank as u8;
        }
        Mbc1Cartridge::new(rom, ExternalRam::new(ram_size, false, None))
    }

    #[test]
    fn bank_zero_request_selects_bank_one() {
        let mut c = cart(8, 0);
        c.write(0x2000, 0x00);
        assert_eq!(c.read(0x4000), 1);
        c.write(0x2000, 0x20);
        assert_eq!(c.read(0x4000), 1, "only the low five bits are used");
        c.write(0x2000, 0x05);
        assert_eq!(c.read(0x4000), 5);
    }

    #[test]
    fn mode_select_moves_secondary_register() {
        let mut c = cart(128, 0x8000);
        c.write(0x0000, 0x0A);
        c.write(0x2000, 0x02);
        c.write(0x4000, 0x01);

        // ROM banking mode: secondary bits become ROM bank bits 5-6.
        assert_eq!(c.rom_bank(), 0x22);
        assert_eq!(c.read(0x4000), 0x22);
        assert_eq!(c.ram_bank(), 0);

        // RAM banking mode: secondary bits select the RAM bank instead.
        c.write(0x6000, 0x01);
        assert_eq!(c.rom_bank(), 0x02);
        assert_eq!(c.ram_bank(), 1);
        c.write(0xA000, 0x5A);
        assert_eq!(c.ram.bytes[0x2000], 0x5A);

        c.write(0x6000, 0x00);
        assert_eq!(c.rom_bank(), 0x22);
        assert_eq!(c.read(0xA000), 0x00, "bank 0 was never written");
    }

    #[test]
    fn ram_requires_enable_latch() {
        let mut c = cart(4, 0x2000);
        c.write(0xA123, 0x42);
        assert_eq!(c.read(0xA123), 0xFF);
        c.write(0x1FFF, 0x3A);
        c.write(0xA123, 0x42);
        assert_eq!(c.read(0xA123), 0x42);
        c.write(0x0000, 0x00);
        assert_eq!(c.read(0xA123), 0xFF);
        assert_eq!(c.ram.bytes[0x123], 0x42);
    }

    #[test]
    fn rom_bank_wraps_to_image_size() {
        let mut c = cart(4, 0);
        c.write(0x2000, 0x06);
        assert_eq!(c.read(0x4000), 2);
    }
}
