use super::{banked_rom_read, ExternalRam};

/// Number of clock-counter registers (seconds, minutes, hours, day low,
/// day high/flags) reachable through bank selects 0x08-0x0C.
pub(crate) const RTC_REGISTER_COUNT: usize = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mbc3Select {
    Ram(usize),
    Rtc(usize),
    None,
}

/// MBC3 banking controller (types 0x0F-0x13).
///
/// The clock registers are plain storage: latching (0x6000-0x7FFF) is
/// accepted and ignored, and the counters never advance on their own.
pub struct Mbc3Cartridge {
    rom: Vec<u8>,
    pub(crate) ram: ExternalRam,
    has_timer: bool,
    rom_bank: u8,
    bank_select: u8,
    ram_rtc_enable: bool,
    pub(crate) rtc: [u8; RTC_REGISTER_COUNT],
}

impl Mbc3Cartridge {
    pub(crate) fn new(rom: Vec<u8>, ram: ExternalRam, has_timer: bool) -> Self {
        Self {
            rom,
            ram,
            has_timer,
            rom_bank: 1,
            bank_select: 0,
            ram_rtc_enable: false,
            rtc: [0; RTC_REGISTER_COUNT],
        }
    }

    fn select(&self) -> Mbc3Select {
        match self.bank_select {
            bank @ 0x00..=0x03 if self.ram.is_present() => Mbc3Select::Ram(bank as usize),
            reg @ 0x08.. if self.has_timer => {
                let index = (reg - 0x08) as usize;
                if index < RTC_REGISTER_COUNT {
                    Mbc3Select::Rtc(index)
                } else {
                    Mbc3Select::None
                }
            }
            _ => Mbc3Select::None,
        }
    }

    pub(crate) fn read(&self, addr: u16) -> u8 {
        match addr {
            0x0000..=0x3FFF => banked_rom_read(&self.rom, 0, addr),
            0x4000..=0x7FFF => banked_rom_read(&self.rom, self.rom_bank as usize, addr),
            0xA000..=0xBFFF if self.ram_rtc_enable => match self.select() {
                Mbc3Select::Ram(bank) => self.ram.read(bank, addr),
                Mbc3Select::Rtc(index) => self.rtc[index],
                Mbc3Select::None => 0xFF,
            },
            _ => 0xFF,
        }
    }

    pub(crate) fn write(&mut self, addr: u16, value: u8) {
        match addr {
            0x0000..=0x1FFF => {
                self.ram_rtc_enable = (value & 0x0F) == 0x0A;
            }
            0x2000..=0x3FFF => {
                self.rom_bank = match value & 0x7F {
                    0 => 1,
                    bank => bank,
                };
                log::debug!("MBC3 ROM bank -> {}", self.rom_bank);
            }
            0x4000..=0x5FFF => {
                self.bank_select = value;
            }
            0x6000..=0x7FFF => {}
            0xA000..=0xBFFF if self.ram_rtc_enable => match self.select() {
                Mbc3Select::Ram(bank) => self.ram.write(bank, addr, value),
                Mbc3Select::Rtc(index) => self.rtc[index] = value,
                Mbc3Select::None => {}
            },
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cart(has_timer: bool) -> Mbc3Cartridge {
        let mut rom = vec![0u8; 0x80 * 0x4000];
        for bank in 0..0x80 {
            rom[bank * 0x4000 + 1] = bank as u8;
        }
        Mbc3Cartridge::new(rom, ExternalRam::new(0x8000, false, None), has_timer)
    }

    #[test]
    fn seven_bit_rom_bank() {
        let mut c = cart(false);
        assert_eq!(c.read(0x4001), 1);
        c.write(0x2000, 0x00);
        assert_eq!(c.read(0x4001), 1);
        c.write(0x3FFF, 0x7F);
        assert_eq!(c.read(0x4001), 0x7F);
        c.write(0x2000, 0xC3);
        assert_eq!(c.read(0x4001), 0x43);
    }

    #[test]
    fn rtc_select_routes_to_clock_registers() {
        let mut c = cart(true);
        c.write(0x0000, 0x0A);

        c.write(0x4000, 0x02);
        c.write(0xA000, 0x11);

        c.write(0x4000, 0x08);
        c.write(0xA000, 0x3B);
        c.write(0x4000, 0x0C);
        c.write(0xBFFF, 0xC1);
        assert_eq!(c.rtc, [0x3B, 0, 0, 0, 0xC1]);
        assert_eq!(c.read(0xA000), 0xC1);

        // RAM bank 2 was not touched by the clock writes.
        assert_eq!(c.ram.bytes[2 * 0x2000], 0x11);
        assert!(c.ram.bytes[..0x2000].iter().all(|&b| b == 0));

        c.write(0x4000, 0x02);
        assert_eq!(c.read(0xA000), 0x11);

        // Latch writes are accepted and change nothing.
        c.write(0x6000, 0x00);
        c.write(0x6000, 0x01);
        assert_eq!(c.rtc[0], 0x3B);
    }

    #[test]
    fn rtc_select_without_timer_is_unmapped() {
        let mut c = cart(false);
        c.write(0x0000, 0x0A);
        c.write(0x4000, 0x08);
        c.write(0xA000, 0x55);
        assert_eq!(c.read(0xA000), 0xFF);
        assert_eq!(c.rtc, [0; RTC_REGISTER_COUNT]);
        assert!(c.ram.bytes.iter().all(|&b| b == 0));
    }

    #[test]
    fn disabled_latch_blocks_ram_and_clock() {
        let mut c = cart(true);
        c.write(0x4000, 0x08);
        c.write(0xA000, 0x12);
        assert_eq!(c.read(0xA000), 0xFF);
        assert_eq!(c.rtc[0], 0);
    }
}
