use super::alu::SHIFT_TABLE;
use super::operand::R8;
use super::{Bus, Cpu, Flag};

impl Cpu {
    /// Execute the instruction following a 0xCB prefix.
    ///
    /// The second byte decodes as `xx bbb rrr`: `xx` picks the group
    /// (shift/rotate, BIT, RES, SET), `bbb` the shift kind or bit index and
    /// `rrr` the target operand. Register forms cost 8 cycles, `(HL)` forms
    /// 16, except `BIT n,(HL)` which does not write back and costs 12.
    pub(super) fn exec_cb<B: Bus>(&mut self, bus: &mut B) -> u32 {
        let op = self.fetch8(bus);
        let group = op >> 6;
        let bit = (op >> 3) & 0x07;
        let target = R8::from_bits(op);
        let value = self.read_r8(bus, target);

        let result = match group {
            0 => self.alu_shift(SHIFT_TABLE[bit as usize], value),
            1 => {
                self.set_flag(Flag::Z, value & (1 << bit) == 0);
                self.set_flag(Flag::N, false);
                self.set_flag(Flag::H, true);
                return if target.is_memory() { 12 } else { 8 };
            }
            2 => value & !(1 << bit),
            _ => value | (1 << bit),
        };

        self.write_r8(bus, target, result);
        if target.is_memory() {
            16
        } else {
            8
        }
    }
}
