mod alu;
mod bus;
mod cb;
mod exec;
mod helpers;
mod init;
mod interrupts;
mod operand;
mod regs;

pub use bus::Bus;
pub use interrupts::{Interrupt, IE_ADDR, IF_ADDR};
pub use regs::{Flag, Registers};

/// LR35902 interpreter.
///
/// The CPU holds no reference to the bus; every entry point borrows it for
/// the duration of one call, so the orchestrator can hand the same bus to
/// the video and audio units between instructions.
#[derive(Clone, Debug)]
pub struct Cpu {
    pub regs: Registers,
    pub ime: bool,
    pub halted: bool,
    /// Set by EI; IME is raised once the following instruction completes.
    ime_enable_pending: bool,
}

impl Cpu {
    /// Execute one instruction, or idle while halted, and return the number
    /// of master-clock cycles consumed.
    ///
    /// Interrupts are checked before the fetch. A dispatch replaces the
    /// instruction for this step and costs 20 cycles. A halted step only
    /// polls for pending interrupts and always costs 4, even when it wakes
    /// and dispatches.
    pub fn step<B: Bus>(&mut self, bus: &mut B) -> u32 {
        if self.halted {
            // Clears HALT as soon as anything is pending, even with IME off.
            self.service_interrupts(bus);
            return 4;
        }

        if let Some(cycles) = self.service_interrupts(bus) {
            return cycles;
        }

        let enable_after = self.ime_enable_pending;
        let opcode = self.fetch8(bus);
        let cycles = self.exec_opcode(bus, opcode);

        if enable_after && self.ime_enable_pending {
            self.ime_enable_pending = false;
            self.ime = true;
        }

        cycles
    }
}
