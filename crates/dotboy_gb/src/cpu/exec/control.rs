use crate::cpu::operand::COND_TABLE;
use crate::cpu::{Bus, Cpu};

impl Cpu {
    #[inline]
    fn cond_bits(&self, opcode: u8) -> bool {
        self.condition(COND_TABLE[((opcode >> 3) & 0x03) as usize])
    }

    pub(super) fn exec_jr_cc<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> u32 {
        debug_assert!(matches!(opcode, 0x20 | 0x28 | 0x30 | 0x38));
        let taken = self.cond_bits(opcode);
        self.jump_relative(bus, taken)
    }

    pub(super) fn exec_jp_cc<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> u32 {
        debug_assert!(matches!(opcode, 0xC2 | 0xCA | 0xD2 | 0xDA));
        let taken = self.cond_bits(opcode);
        self.jump_absolute(bus, taken)
    }

    pub(super) fn exec_jp_hl(&mut self) -> u32 {
        self.regs.pc = self.regs.hl();
        4
    }

    pub(super) fn exec_call_cc<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> u32 {
        debug_assert!(matches!(opcode, 0xC4 | 0xCC | 0xD4 | 0xDC));
        let taken = self.cond_bits(opcode);
        self.call(bus, taken)
    }

    pub(super) fn exec_ret_cc<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> u32 {
        debug_assert!(matches!(opcode, 0xC0 | 0xC8 | 0xD0 | 0xD8));
        let taken = self.cond_bits(opcode);
        self.ret_if(bus, taken)
    }

    pub(super) fn exec_ret<B: Bus>(&mut self, bus: &mut B) -> u32 {
        self.regs.pc = self.pop16(bus);
        16
    }

    /// RETI re-enables interrupts without the EI delay.
    pub(super) fn exec_reti<B: Bus>(&mut self, bus: &mut B) -> u32 {
        self.regs.pc = self.pop16(bus);
        self.ime = true;
        16
    }

    pub(super) fn exec_rst<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> u32 {
        debug_assert!(opcode & 0xC7 == 0xC7);
        let ret = self.regs.pc;
        self.push16(bus, ret);
        self.regs.pc = u16::from(opcode & 0x38);
        16
    }
}
