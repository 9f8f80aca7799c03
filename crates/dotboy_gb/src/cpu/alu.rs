use super::{Cpu, Flag};

/// Accumulator operation selected by bits 5..3 of the 0x80–0xBF block and
/// of the `op A,d8` immediates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum AluOp {
    Add,
    Adc,
    Sub,
    Sbc,
    And,
    Xor,
    Or,
    Cp,
}

pub(super) const ALU_TABLE: [AluOp; 8] = [
    AluOp::Add,
    AluOp::Adc,
    AluOp::Sub,
    AluOp::Sbc,
    AluOp::And,
    AluOp::Xor,
    AluOp::Or,
    AluOp::Cp,
];

/// Shift/rotate selected by bits 5..3 of the first quarter of the CB table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum ShiftOp {
    Rlc,
    Rrc,
    Rl,
    Rr,
    Sla,
    Sra,
    Swap,
    Srl,
}

pub(super) const SHIFT_TABLE: [ShiftOp; 8] = [
    ShiftOp::Rlc,
    ShiftOp::Rrc,
    ShiftOp::Rl,
    ShiftOp::Rr,
    ShiftOp::Sla,
    ShiftOp::Sra,
    ShiftOp::Swap,
    ShiftOp::Srl,
];

impl Cpu {
    pub(super) fn alu(&mut self, op: AluOp, value: u8) {
        match op {
            AluOp::Add => self.alu_add(value, 0),
            AluOp::Adc => {
                let carry = self.carry_bit();
                self.alu_add(value, carry)
            }
            AluOp::Sub => self.regs.a = self.alu_sub(value, 0),
            AluOp::Sbc => {
                let carry = self.carry_bit();
                self.regs.a = self.alu_sub(value, carry)
            }
            AluOp::And => {
                self.regs.a &= value;
                self.set_flags(self.regs.a == 0, false, true, false);
            }
            AluOp::Xor => {
                self.regs.a ^= value;
                self.set_flags(self.regs.a == 0, false, false, false);
            }
            AluOp::Or => {
                self.regs.a |= value;
                self.set_flags(self.regs.a == 0, false, false, false);
            }
            // CP is SUB with the result thrown away.
            AluOp::Cp => {
                self.alu_sub(value, 0);
            }
        }
    }

    /// `A <- A + value + carry_in`.
    ///
    /// Half-carry is the carry out of bit 3, carry the carry out of bit 7,
    /// both including the carry-in.
    fn alu_add(&mut self, value: u8, carry_in: u8) {
        let a = self.regs.a;
        let sum = u16::from(a) + u16::from(value) + u16::from(carry_in);
        let half = (a & 0x0F) + (value & 0x0F) + carry_in > 0x0F;
        let result = sum as u8;
        self.regs.a = result;
        self.set_flags(result == 0, false, half, sum > 0xFF);
    }

    /// Compute `A - value - carry_in`, set flags and return the difference
    /// without storing it.
    fn alu_sub(&mut self, value: u8, carry_in: u8) -> u8 {
        let a = self.regs.a;
        let diff = i16::from(a) - i16::from(value) - i16::from(carry_in);
        let half = i16::from(a & 0x0F) - i16::from(value & 0x0F) - i16::from(carry_in) < 0;
        let result = diff as u8;
        self.set_flags(result == 0, true, half, diff < 0);
        result
    }

    /// Decimal-adjust A after a BCD add or subtract.
    ///
    /// After an addition a correction of 0x06 applies when H is set or the
    /// low digit exceeds 9, and 0x60 when C is set or A exceeds 0x99 (which
    /// also sets C). After a subtraction only H and C select the
    /// corrections. N is preserved, H is always cleared.
    pub(super) fn alu_daa(&mut self) {
        let subtract = self.get_flag(Flag::N);
        let mut correction = 0u8;
        let mut carry = self.get_flag(Flag::C);

        if self.get_flag(Flag::H) || (!subtract && self.regs.a & 0x0F > 0x09) {
            correction |= 0x06;
        }
        if carry || (!subtract && self.regs.a > 0x99) {
            correction |= 0x60;
            carry = true;
        }

        self.regs.a = if subtract {
            self.regs.a.wrapping_sub(correction)
        } else {
            self.regs.a.wrapping_add(correction)
        };

        self.set_flags(self.regs.a == 0, subtract, false, carry);
    }

    /// INC on an 8-bit value. C is left alone.
    pub(super) fn alu_inc8(&mut self, value: u8) -> u8 {
        let result = value.wrapping_add(1);
        self.set_flag(Flag::Z, result == 0);
        self.set_flag(Flag::N, false);
        self.set_flag(Flag::H, value & 0x0F == 0x0F);
        result
    }

    /// DEC on an 8-bit value. C is left alone.
    pub(super) fn alu_dec8(&mut self, value: u8) -> u8 {
        let result = value.wrapping_sub(1);
        self.set_flag(Flag::Z, result == 0);
        self.set_flag(Flag::N, true);
        self.set_flag(Flag::H, value & 0x0F == 0x00);
        result
    }

    /// `ADD HL,rr`: H from bit 11, C from bit 15, Z untouched.
    pub(super) fn alu_add_hl(&mut self, value: u16) {
        let hl = self.regs.hl();
        let half = (hl & 0x0FFF) + (value & 0x0FFF) > 0x0FFF;
        let (result, carry) = hl.overflowing_add(value);
        self.set_flag(Flag::N, false);
        self.set_flag(Flag::H, half);
        self.set_flag(Flag::C, carry);
        self.regs.set_hl(result);
    }

    /// `SP + e8` as used by `ADD SP,e8` and `LD HL,SP+e8`.
    ///
    /// Flags come from the unsigned addition of the low byte of SP and the
    /// raw offset byte; Z and N are cleared.
    pub(super) fn alu_sp_offset(&mut self, offset: u8) -> u16 {
        let sp = self.regs.sp;
        let low = sp as u8;
        let half = (low & 0x0F) + (offset & 0x0F) > 0x0F;
        let carry = u16::from(low) + u16::from(offset) > 0xFF;
        self.set_flags(false, false, half, carry);
        sp.wrapping_add(offset as i8 as u16)
    }

    /// Shared shifter for the CB table and the four accumulator rotates.
    ///
    /// Sets Z from the result; the unprefixed `RLCA/RRCA/RLA/RRA` callers
    /// clear it afterwards.
    pub(super) fn alu_shift(&mut self, op: ShiftOp, value: u8) -> u8 {
        let carry_in = self.get_flag(Flag::C);
        let (result, carry) = match op {
            ShiftOp::Rlc => (value.rotate_left(1), value & 0x80 != 0),
            ShiftOp::Rrc => (value.rotate_right(1), value & 0x01 != 0),
            ShiftOp::Rl => ((value << 1) | u8::from(carry_in), value & 0x80 != 0),
            ShiftOp::Rr => ((value >> 1) | (u8::from(carry_in) << 7), value & 0x01 != 0),
            ShiftOp::Sla => (value << 1, value & 0x80 != 0),
            ShiftOp::Sra => ((value >> 1) | (value & 0x80), value & 0x01 != 0),
            ShiftOp::Swap => (value.rotate_left(4), false),
            ShiftOp::Srl => (value >> 1, value & 0x01 != 0),
        };
        self.set_flags(result == 0, false, false, carry);
        result
    }
}
