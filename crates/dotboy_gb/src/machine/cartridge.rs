use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};

mod mbc1;
mod mbc3;
mod plain;
mod save;

pub(crate) use mbc1::Mbc1Cartridge;
pub(crate) use mbc3::Mbc3Cartridge;
pub(crate) use plain::PlainCartridge;
pub(crate) use save::ExternalRam;

/// Size of one switchable ROM bank.
pub(crate) const ROM_BANK_SIZE: usize = 0x4000;
/// Size of one switchable external RAM bank.
pub(crate) const RAM_BANK_SIZE: usize = 0x2000;

const HEADER_END: usize = 0x150;
const TITLE_RANGE: std::ops::Range<usize> = 0x134..0x144;
const TYPE_ADDR: usize = 0x147;
const RAM_SIZE_ADDR: usize = 0x149;

bitflags::bitflags! {
    /// Hardware present on the cartridge besides the mapper itself.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct CartFeatures: u8 {
        const RAM     = 1 << 0;
        const BATTERY = 1 << 1;
        const TIMER   = 1 << 2;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MapperKind {
    Plain,
    Mbc1,
    Mbc3,
}

/// Decoded cartridge header fields the core cares about.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CartridgeHeader {
    pub title: String,
    pub cart_type: u8,
    pub mapper: MapperKind,
    pub features: CartFeatures,
    /// External RAM size in bytes; zero when the cartridge has none.
    pub ram_size: usize,
}

impl CartridgeHeader {
    pub fn parse(rom: &[u8]) -> anyhow::Result<Self> {
        if rom.len() < HEADER_END {
            bail!(
                "ROM image is {} bytes, too short to hold a cartridge header",
                rom.len()
            );
        }

        let cart_type = rom[TYPE_ADDR];
        let (mapper, features) = match cart_type {
            0x00 => (MapperKind::Plain, CartFeatures::empty()),
            0x08 => (MapperKind::Plain, CartFeatures::RAM),
            0x09 => (MapperKind::Plain, CartFeatures::RAM | CartFeatures::BATTERY),
            0x01 => (MapperKind::Mbc1, CartFeatures::empty()),
            0x02 => (MapperKind::Mbc1, CartFeatures::RAM),
            0x03 => (MapperKind::Mbc1, CartFeatures::RAM | CartFeatures::BATTERY),
            0x0F => (MapperKind::Mbc3, CartFeatures::TIMER | CartFeatures::BATTERY),
            0x10 => (MapperKind::Mbc3, CartFeatures::all()),
            0x11 => (MapperKind::Mbc3, CartFeatures::empty()),
            0x12 => (MapperKind::Mbc3, CartFeatures::RAM),
            0x13 => (MapperKind::Mbc3, CartFeatures::RAM | CartFeatures::BATTERY),
            other => bail!("unsupported cartridge type {other:#04x}"),
        };

        let ram_size = if features.contains(CartFeatures::RAM) {
            ram_size_from_code(rom[RAM_SIZE_ADDR])
        } else {
            0
        };

        let title = rom[TITLE_RANGE]
            .iter()
            .take_while(|&&b| b != 0)
            .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '?' })
            .collect::<String>()
            .trim_end()
            .to_string();

        Ok(Self {
            title,
            cart_type,
            mapper,
            features,
            ram_size,
        })
    }
}

fn ram_size_from_code(code: u8) -> usize {
    match code {
        0x00 => 0,
        0x01 => 0x800,
        0x02 => 0x2000,
        0x03 => 0x8000,
        0x04 => 0x20000,
        0x05 => 0x10000,
        other => {
            log::warn!("unknown cartridge RAM size code {other:#04x}, assuming none");
            0
        }
    }
}

/// Cartridge with its banking controller.
///
/// The bus routes 0000-7FFF and A000-BFFF here. ROM and RAM buffers are
/// owned by the mapper variant.
pub enum Cartridge {
    Plain(PlainCartridge),
    Mbc1(Mbc1Cartridge),
    Mbc3(Mbc3Cartridge),
}

impl Cartridge {
    /// Build a cartridge from a ROM image already in memory.
    ///
    /// With a battery and a `save_path`, external RAM is seeded from that
    /// file when its size matches.
    pub fn from_rom(rom: Vec<u8>, save_path: Option<PathBuf>) -> anyhow::Result<Self> {
        let header = CartridgeHeader::parse(&rom)?;
        log::info!(
            "cartridge \"{}\": type {:#04x} ({:?}), {} KiB ROM, {} bytes RAM, features {:?}",
            header.title,
            header.cart_type,
            header.mapper,
            rom.len() / 1024,
            header.ram_size,
            header.features
        );

        let ram = ExternalRam::new(
            header.ram_size,
            header.features.contains(CartFeatures::BATTERY),
            save_path,
        );

        Ok(match header.mapper {
            MapperKind::Plain => Cartridge::Plain(PlainCartridge::new(rom, ram)),
            MapperKind::Mbc1 => Cartridge::Mbc1(Mbc1Cartridge::new(rom, ram)),
            MapperKind::Mbc3 => Cartridge::Mbc3(Mbc3Cartridge::new(
                rom,
                ram,
                header.features.contains(CartFeatures::TIMER),
            )),
        })
    }

    /// Read a ROM file from disk and build the cartridge.
    pub fn from_file(
        path: impl AsRef<Path>,
        save_path: Option<PathBuf>,
    ) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let rom = fs::read(path)
            .with_context(|| format!("failed to read ROM file {}", path.display()))?;
        Self::from_rom(rom, save_path)
            .with_context(|| format!("failed to load cartridge {}", path.display()))
    }

    pub fn read(&self, addr: u16) -> u8 {
        match self {
            Cartridge::Plain(m) => m.read(addr),
            Cartridge::Mbc1(m) => m.read(addr),
            Cartridge::Mbc3(m) => m.read(addr),
        }
    }

    pub fn write(&mut self, addr: u16, value: u8) {
        match self {
            Cartridge::Plain(m) => m.write(addr, value),
            Cartridge::Mbc1(m) => m.write(addr, value),
            Cartridge::Mbc3(m) => m.write(addr, value),
        }
    }

    pub fn kind(&self) -> MapperKind {
        match self {
            Cartridge::Plain(_) => MapperKind::Plain,
            Cartridge::Mbc1(_) => MapperKind::Mbc1,
            Cartridge::Mbc3(_) => MapperKind::Mbc3,
        }
    }

    fn ram(&self) -> &ExternalRam {
        match self {
            Cartridge::Plain(m) => &m.ram,
            Cartridge::Mbc1(m) => &m.ram,
            Cartridge::Mbc3(m) => &m.ram,
        }
    }

    /// External RAM contents, all banks.
    pub fn ram_bytes(&self) -> &[u8] {
        &self.ram().bytes
    }

    /// Write battery-backed RAM to the save file, if there is one.
    pub fn save(&self) -> anyhow::Result<()> {
        self.ram().save()
    }
}

/// Resolve a ROM read through a bank number, wrapping past the image end.
pub(crate) fn banked_rom_read(rom: &[u8], bank: usize, addr: u16) -> u8 {
    let banks = (rom.len() / ROM_BANK_SIZE).max(1);
    let index = (bank % banks) * ROM_BANK_SIZE + (addr as usize & (ROM_BANK_SIZE - 1));
    rom.get(index).copied().unwrap_or(0xFF)
}
