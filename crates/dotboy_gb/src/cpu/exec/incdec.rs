use crate::cpu::operand::{R16_TABLE, R8};
use crate::cpu::{Bus, Cpu};

impl Cpu {
    pub(super) fn exec_inc_r<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> u32 {
        debug_assert!(opcode & 0xC7 == 0x04, "unexpected INC r opcode {opcode:#04x}");

        let reg = R8::from_bits(opcode >> 3);
        let value = self.read_r8(bus, reg);
        let result = self.alu_inc8(value);
        self.write_r8(bus, reg, result);

        if reg.is_memory() {
            12
        } else {
            4
        }
    }

    pub(super) fn exec_dec_r<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> u32 {
        debug_assert!(opcode & 0xC7 == 0x05, "unexpected DEC r opcode {opcode:#04x}");

        let reg = R8::from_bits(opcode >> 3);
        let value = self.read_r8(bus, reg);
        let result = self.alu_dec8(value);
        self.write_r8(bus, reg, result);

        if reg.is_memory() {
            12
        } else {
            4
        }
    }

    /// 16-bit INC/DEC touch no flags.
    pub(super) fn exec_inc_rr(&mut self, opcode: u8) -> u32 {
        let reg = R16_TABLE[(opcode >> 4) as usize & 0x03];
        let value = self.read_r16(reg).wrapping_add(1);
        self.write_r16(reg, value);
        8
    }

    pub(super) fn exec_dec_rr(&mut self, opcode: u8) -> u32 {
        let reg = R16_TABLE[(opcode >> 4) as usize & 0x03];
        let value = self.read_r16(reg).wrapping_sub(1);
        self.write_r16(reg, value);
        8
    }
}
