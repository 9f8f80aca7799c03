use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::Context;

use super::RAM_BANK_SIZE;

/// External cartridge RAM plus its optional battery-backed save file.
pub(crate) struct ExternalRam {
    pub(crate) bytes: Vec<u8>,
    battery: bool,
    save_path: Option<PathBuf>,
}

impl ExternalRam {
    pub(crate) fn new(size: usize, battery: bool, save_path: Option<PathBuf>) -> Self {
        let mut ram = Self {
            bytes: vec![0; size],
            battery,
            save_path,
        };
        ram.load();
        ram
    }

    pub(crate) fn is_present(&self) -> bool {
        !self.bytes.is_empty()
    }

    /// Number of 8 KiB banks; a 2 KiB chip still counts as one.
    pub(crate) fn bank_count(&self) -> usize {
        self.bytes.len().div_ceil(RAM_BANK_SIZE).max(1)
    }

    /// Read from the window at A000-BFFF using `bank`; out-of-range reads
    /// give 0xFF.
    pub(crate) fn read(&self, bank: usize, addr: u16) -> u8 {
        match self.index(bank, addr) {
            Some(i) => self.bytes[i],
            None => 0xFF,
        }
    }

    pub(crate) fn write(&mut self, bank: usize, addr: u16, value: u8) {
        if let Some(i) = self.index(bank, addr) {
            self.bytes[i] = value;
        }
    }

    fn index(&self, bank: usize, addr: u16) -> Option<usize> {
        if !self.is_present() {
            return None;
        }
        let offset = (addr as usize).wrapping_sub(0xA000) & (RAM_BANK_SIZE - 1);
        let index = (bank % self.bank_count()) * RAM_BANK_SIZE + offset;
        (index < self.bytes.len()).then_some(index)
    }

    fn load(&mut self) {
        if !self.battery {
            return;
        }
        let Some(path) = self.save_path.as_ref() else {
            return;
        };

        match fs::read(path) {
            Ok(data) if data.len() == self.bytes.len() => {
                self.bytes.copy_from_slice(&data);
                log::info!("loaded save file {}", path.display());
            }
            Ok(data) => {
                log::warn!(
                    "invalid save data in {}: {} bytes, expected {}",
                    path.display(),
                    data.len(),
                    self.bytes.len()
                );
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                log::warn!("no save file found at {}", path.display());
            }
            Err(err) => {
                log::warn!("failed to read save file {}: {err}", path.display());
            }
        }
    }

    pub(crate) fn save(&self) -> anyhow::Result<()> {
        if !self.battery || !self.is_present() {
            return Ok(());
        }
        let Some(path) = self.save_path.as_ref() else {
            log::debug!("battery RAM present but no save path configured");
            return Ok(());
        };

        fs::write(path, &self.bytes)
            .with_context(|| format!("failed to write save file {}", path.display()))?;
        log::info!("wrote {} bytes to {}", self.bytes.len(), path.display());
        Ok(())
    }
}
