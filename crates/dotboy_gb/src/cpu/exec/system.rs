use crate::cpu::{Bus, Cpu, Interrupt};

impl Cpu {
    /// HALT.
    ///
    /// With IME clear and an interrupt already pending the CPU does not
    /// halt at all; otherwise it idles until `step` sees a pending request.
    pub(super) fn exec_halt<B: Bus>(&mut self, bus: &mut B) -> u32 {
        if self.ime || Interrupt::pending(bus).is_empty() {
            self.halted = true;
        }
        4
    }

    /// STOP is accepted and otherwise ignored; its padding byte is consumed.
    pub(super) fn exec_stop<B: Bus>(&mut self, bus: &mut B) -> u32 {
        let _padding = self.fetch8(bus);
        4
    }

    pub(super) fn exec_di(&mut self) -> u32 {
        self.ime = false;
        self.ime_enable_pending = false;
        4
    }

    pub(super) fn exec_ei(&mut self) -> u32 {
        self.ime_enable_pending = true;
        4
    }

    /// Opcode slots with no instruction behind them run as NOPs.
    pub(super) fn exec_unused(&mut self, opcode: u8) -> u32 {
        log::trace!(
            "unused opcode {opcode:#04x} at PC={:#06x}, treated as NOP",
            self.regs.pc.wrapping_sub(1)
        );
        4
    }
}
