use super::{Cpu, Registers};

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    /// A CPU in the state the boot ROM hands over to the cartridge.
    pub fn new() -> Self {
        Self {
            regs: Registers::POST_BOOT,
            // Pan Docs: IME is clear at 0x0100; software enables it with
            // EI or RETI.
            ime: false,
            halted: false,
            ime_enable_pending: false,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
