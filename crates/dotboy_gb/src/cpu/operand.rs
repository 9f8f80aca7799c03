//! Operand tables for the bit-pattern decoded opcode groups.
//!
//! Most of the instruction set encodes its operands in fixed bit fields of
//! the opcode byte (`xx yyy zzz`). Rather than spelling every opcode out,
//! the executors extract the field and index one of these tables.

use super::{Bus, Cpu, Flag};

/// 8-bit operand selected by a 3-bit field (`yyy` or `zzz`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum R8 {
    B,
    C,
    D,
    E,
    H,
    L,
    /// The byte at the address held in HL.
    HlInd,
    A,
}

pub(super) const R8_TABLE: [R8; 8] = [R8::B, R8::C, R8::D, R8::E, R8::H, R8::L, R8::HlInd, R8::A];

impl R8 {
    #[inline]
    pub(super) fn from_bits(bits: u8) -> R8 {
        R8_TABLE[(bits & 0x07) as usize]
    }

    #[inline]
    pub(super) fn is_memory(self) -> bool {
        self == R8::HlInd
    }
}

/// 16-bit register pair selected by a 2-bit field (`pp`).
///
/// `Sp` and `Af` share the same encoding; which one an opcode means depends
/// on the group (stack operations use AF, everything else SP).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum R16 {
    Bc,
    De,
    Hl,
    Sp,
    Af,
}

pub(super) const R16_TABLE: [R16; 4] = [R16::Bc, R16::De, R16::Hl, R16::Sp];
pub(super) const R16_STACK_TABLE: [R16; 4] = [R16::Bc, R16::De, R16::Hl, R16::Af];

/// Branch condition selected by a 2-bit field (`cc`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Cond {
    Nz,
    Z,
    Nc,
    C,
}

pub(super) const COND_TABLE: [Cond; 4] = [Cond::Nz, Cond::Z, Cond::Nc, Cond::C];

impl Cpu {
    #[inline]
    pub(super) fn read_r8<B: Bus>(&mut self, bus: &mut B, reg: R8) -> u8 {
        match reg {
            R8::B => self.regs.b,
            R8::C => self.regs.c,
            R8::D => self.regs.d,
            R8::E => self.regs.e,
            R8::H => self.regs.h,
            R8::L => self.regs.l,
            R8::HlInd => bus.read8(self.regs.hl()),
            R8::A => self.regs.a,
        }
    }

    #[inline]
    pub(super) fn write_r8<B: Bus>(&mut self, bus: &mut B, reg: R8, value: u8) {
        match reg {
            R8::B => self.regs.b = value,
            R8::C => self.regs.c = value,
            R8::D => self.regs.d = value,
            R8::E => self.regs.e = value,
            R8::H => self.regs.h = value,
            R8::L => self.regs.l = value,
            R8::HlInd => bus.write8(self.regs.hl(), value),
            R8::A => self.regs.a = value,
        }
    }

    #[inline]
    pub(super) fn read_r16(&self, reg: R16) -> u16 {
        match reg {
            R16::Bc => self.regs.bc(),
            R16::De => self.regs.de(),
            R16::Hl => self.regs.hl(),
            R16::Sp => self.regs.sp,
            R16::Af => self.regs.af(),
        }
    }

    #[inline]
    pub(super) fn write_r16(&mut self, reg: R16, value: u16) {
        match reg {
            R16::Bc => self.regs.set_bc(value),
            R16::De => self.regs.set_de(value),
            R16::Hl => self.regs.set_hl(value),
            R16::Sp => self.regs.sp = value,
            R16::Af => self.regs.set_af(value),
        }
    }

    #[inline]
    pub(super) fn condition(&self, cond: Cond) -> bool {
        match cond {
            Cond::Nz => !self.get_flag(Flag::Z),
            Cond::Z => self.get_flag(Flag::Z),
            Cond::Nc => !self.get_flag(Flag::C),
            Cond::C => self.get_flag(Flag::C),
        }
    }
}
