mod alu;
mod control;
mod incdec;
mod ld;
mod stack;
mod system;

use super::{Bus, Cpu};

impl Cpu {
    /// Decode and execute one unprefixed opcode, returning its cycle cost.
    ///
    /// The two dense blocks (register loads 0x40–0x7F and accumulator
    /// arithmetic 0x80–0xBF) decode their operands from the opcode bits;
    /// every other opcode is listed explicitly.
    pub(super) fn exec_opcode<B: Bus>(&mut self, bus: &mut B, opcode: u8) -> u32 {
        match opcode {
            // HALT sits in the middle of the load block.
            0x76 => self.exec_halt(bus),
            0x40..=0x7F => self.exec_ld_r_r(bus, opcode),
            0x80..=0xBF => self.exec_alu_r(bus, opcode),

            0x00 => 4,
            // STOP
            0x10 => self.exec_stop(bus),
            0xCB => self.exec_cb(bus),

            // LD rr,d16
            0x01 | 0x11 | 0x21 | 0x31 => self.exec_ld_rr_d16(bus, opcode),
            // LD (BC),A / LD (DE),A / LD (HL+),A / LD (HL-),A
            0x02 | 0x12 | 0x22 | 0x32 => self.exec_ld_ind_a(bus, opcode),
            // LD A,(BC) / LD A,(DE) / LD A,(HL+) / LD A,(HL-)
            0x0A | 0x1A | 0x2A | 0x3A => self.exec_ld_a_ind(bus, opcode),
            // LD r,d8
            0x06 | 0x0E | 0x16 | 0x1E | 0x26 | 0x2E | 0x36 | 0x3E => self.exec_ld_r_d8(bus, opcode),
            // LD (a16),SP
            0x08 => self.exec_ld_a16_sp(bus),
            // LDH (a8),A / LDH A,(a8)
            0xE0 | 0xF0 => self.exec_ldh_a8(bus, opcode),
            // LD (C),A / LD A,(C)
            0xE2 | 0xF2 => self.exec_ldh_c(bus, opcode),
            // LD (a16),A / LD A,(a16)
            0xEA | 0xFA => self.exec_ld_a16_a(bus, opcode),
            // LD HL,SP+e8
            0xF8 => self.exec_ld_hl_sp_e8(bus),
            // LD SP,HL
            0xF9 => self.exec_ld_sp_hl(),

            // INC rr / DEC rr
            0x03 | 0x13 | 0x23 | 0x33 => self.exec_inc_rr(opcode),
            0x0B | 0x1B | 0x2B | 0x3B => self.exec_dec_rr(opcode),
            // INC r / DEC r
            0x04 | 0x0C | 0x14 | 0x1C | 0x24 | 0x2C | 0x34 | 0x3C => self.exec_inc_r(bus, opcode),
            0x05 | 0x0D | 0x15 | 0x1D | 0x25 | 0x2D | 0x35 | 0x3D => self.exec_dec_r(bus, opcode),

            // RLCA / RRCA / RLA / RRA
            0x07 | 0x0F | 0x17 | 0x1F => self.exec_rotate_a(opcode),
            // ADD HL,rr
            0x09 | 0x19 | 0x29 | 0x39 => self.exec_add_hl_rr(opcode),
            // op A,d8
            0xC6 | 0xCE | 0xD6 | 0xDE | 0xE6 | 0xEE | 0xF6 | 0xFE => self.exec_alu_d8(bus, opcode),
            // ADD SP,e8
            0xE8 => self.exec_add_sp_e8(bus),
            0x27 => self.exec_daa(),
            0x2F => self.exec_cpl(),
            0x37 => self.exec_scf(),
            0x3F => self.exec_ccf(),

            // JR e8 / JR cc,e8
            0x18 => self.jump_relative(bus, true),
            0x20 | 0x28 | 0x30 | 0x38 => self.exec_jr_cc(bus, opcode),
            // JP a16 / JP cc,a16 / JP HL
            0xC3 => self.jump_absolute(bus, true),
            0xC2 | 0xCA | 0xD2 | 0xDA => self.exec_jp_cc(bus, opcode),
            0xE9 => self.exec_jp_hl(),
            // CALL a16 / CALL cc,a16
            0xCD => self.call(bus, true),
            0xC4 | 0xCC | 0xD4 | 0xDC => self.exec_call_cc(bus, opcode),
            // RET / RET cc / RETI
            0xC9 => self.exec_ret(bus),
            0xC0 | 0xC8 | 0xD0 | 0xD8 => self.exec_ret_cc(bus, opcode),
            0xD9 => self.exec_reti(bus),
            // RST n
            0xC7 | 0xCF | 0xD7 | 0xDF | 0xE7 | 0xEF | 0xF7 | 0xFF => self.exec_rst(bus, opcode),

            // PUSH rr / POP rr
            0xC5 | 0xD5 | 0xE5 | 0xF5 => self.exec_push(bus, opcode),
            0xC1 | 0xD1 | 0xE1 | 0xF1 => self.exec_pop(bus, opcode),

            // DI / EI
            0xF3 => self.exec_di(),
            0xFB => self.exec_ei(),

            // Unused slots: D3 DB DD E3 E4 EB EC ED F4 FC FD.
            _ => self.exec_unused(opcode),
        }
    }
}
