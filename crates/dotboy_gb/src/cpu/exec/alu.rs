use crate::cpu::alu::{ShiftOp, ALU_TABLE};
use crate::cpu::operand::{R16_TABLE, R8};
use crate::cpu::{Bus, Cpu, Flag};

impl Cpu {
    /// ADD/ADC/SUB/SBC/AND/XOR/OR/CP with a register or `(HL)` operand.
    pub(super) fn exec_alu_r<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> u32 {
        debug_assert!((0x80..=0xBF).contains(&opcode));

        let op = ALU_TABLE[((opcode >> 3) & 0x07) as usize];
        let src = R8::from_bits(opcode);
        let value = self.read_r8(bus, src);
        self.alu(op, value);

        if src.is_memory() {
            8
        } else {
            4
        }
    }

    pub(super) fn exec_alu_d8<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> u32 {
        debug_assert!(opcode & 0xC7 == 0xC6);

        let op = ALU_TABLE[((opcode >> 3) & 0x07) as usize];
        let value = self.fetch8(bus);
        self.alu(op, value);
        8
    }

    /// RLCA / RRCA / RLA / RRA. Unlike their CB twins these always clear Z.
    pub(super) fn exec_rotate_a(&mut self, opcode: u8) -> u32 {
        let op = match opcode {
            0x07 => ShiftOp::Rlc,
            0x0F => ShiftOp::Rrc,
            0x17 => ShiftOp::Rl,
            _ => ShiftOp::Rr,
        };
        self.regs.a = self.alu_shift(op, self.regs.a);
        self.set_flag(Flag::Z, false);
        4
    }

    pub(super) fn exec_add_hl_rr(&mut self, opcode: u8) -> u32 {
        debug_assert!(matches!(opcode, 0x09 | 0x19 | 0x29 | 0x39));

        let value = self.read_r16(R16_TABLE[(opcode >> 4) as usize & 0x03]);
        self.alu_add_hl(value);
        8
    }

    pub(super) fn exec_add_sp_e8<B: Bus>(&mut self, bus: &mut B) -> u32 {
        let offset = self.fetch8(bus);
        self.regs.sp = self.alu_sp_offset(offset);
        16
    }

    pub(super) fn exec_daa(&mut self) -> u32 {
        self.alu_daa();
        4
    }

    pub(super) fn exec_cpl(&mut self) -> u32 {
        self.regs.a = !self.regs.a;
        self.set_flag(Flag::N, true);
        self.set_flag(Flag::H, true);
        4
    }

    pub(super) fn exec_scf(&mut self) -> u32 {
        self.set_flag(Flag::N, false);
        self.set_flag(Flag::H, false);
        self.set_flag(Flag::C, true);
        4
    }

    pub(super) fn exec_ccf(&mut self) -> u32 {
        let carry = self.get_flag(Flag::C);
        self.set_flag(Flag::N, false);
        self.set_flag(Flag::H, false);
        self.set_flag(Flag::C, !carry);
        4
    }
}
