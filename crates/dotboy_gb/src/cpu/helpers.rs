use super::{Bus, Cpu};

impl Cpu {
    #[inline]
    pub(super) fn fetch8<B: Bus>(&mut self, bus: &mut B) -> u8 {
        let value = bus.read8(self.regs.pc);
        self.regs.pc = self.regs.pc.wrapping_add(1);
        value
    }

    #[inline]
    pub(super) fn fetch16<B: Bus>(&mut self, bus: &mut B) -> u16 {
        let lo = self.fetch8(bus);
        let hi = self.fetch8(bus);
        u16::from_le_bytes([lo, hi])
    }

    /// Push high byte first so that memory[SP] holds the low byte.
    #[inline]
    pub(super) fn push16<B: Bus>(&mut self, bus: &mut B, value: u16) {
        let [lo, hi] = value.to_le_bytes();
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write8(self.regs.sp, hi);
        self.regs.sp = self.regs.sp.wrapping_sub(1);
        bus.write8(self.regs.sp, lo);
    }

    #[inline]
    pub(super) fn pop16<B: Bus>(&mut self, bus: &mut B) -> u16 {
        let value = bus.read16(self.regs.sp);
        self.regs.sp = self.regs.sp.wrapping_add(2);
        value
    }

    /// `JR cc,e8` / `JR e8`: 12 cycles taken, 8 not taken.
    pub(super) fn jump_relative<B: Bus>(&mut self, bus: &mut B, taken: bool) -> u32 {
        let offset = self.fetch8(bus) as i8;
        if !taken {
            return 8;
        }
        self.regs.pc = self.regs.pc.wrapping_add(offset as u16);
        12
    }

    /// `JP cc,a16`: 16 cycles taken, 12 not taken.
    pub(super) fn jump_absolute<B: Bus>(&mut self, bus: &mut B, taken: bool) -> u32 {
        let target = self.fetch16(bus);
        if !taken {
            return 12;
        }
        self.regs.pc = target;
        16
    }

    /// `CALL cc,a16`: 24 cycles taken, 12 not taken.
    pub(super) fn call<B: Bus>(&mut self, bus: &mut B, taken: bool) -> u32 {
        let target = self.fetch16(bus);
        if !taken {
            return 12;
        }
        let ret = self.regs.pc;
        self.push16(bus, ret);
        self.regs.pc = target;
        24
    }

    /// `RET cc`: 20 cycles taken, 8 not taken.
    pub(super) fn ret_if<B: Bus>(&mut self, bus: &mut B, taken: bool) -> u32 {
        if !taken {
            return 8;
        }
        self.regs.pc = self.pop16(bus);
        20
    }
}
