use crate::cpu::operand::R16_STACK_TABLE;
use crate::cpu::{Bus, Cpu};

impl Cpu {
    pub(super) fn exec_push<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> u32 {
        debug_assert!(matches!(opcode, 0xC5 | 0xD5 | 0xE5 | 0xF5));

        let value = self.read_r16(R16_STACK_TABLE[(opcode >> 4) as usize & 0x03]);
        self.push16(bus, value);
        16
    }

    /// `POP AF` drops the low nibble of F like every other write to it.
    pub(super) fn exec_pop<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> u32 {
        debug_assert!(matches!(opcode, 0xC1 | 0xD1 | 0xE1 | 0xF1));

        let value = self.pop16(bus);
        self.write_r16(R16_STACK_TABLE[(opcode >> 4) as usize & 0x03], value);
        12
    }
}
