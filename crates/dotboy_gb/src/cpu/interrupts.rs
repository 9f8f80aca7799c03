use super::{Bus, Cpu};

/// Interrupt request register (IF).
pub const IF_ADDR: u16 = 0xFF0F;
/// Interrupt enable register (IE).
pub const IE_ADDR: u16 = 0xFFFF;

bitflags::bitflags! {
    /// The five interrupt sources, as laid out in IE and IF.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Interrupt: u8 {
        const VBLANK = 1 << 0;
        const STAT   = 1 << 1;
        const TIMER  = 1 << 2;
        const SERIAL = 1 << 3;
        const JOYPAD = 1 << 4;
    }
}

impl Interrupt {
    /// Sources in service order, highest priority first.
    pub const PRIORITY: [Interrupt; 5] = [
        Interrupt::VBLANK,
        Interrupt::STAT,
        Interrupt::TIMER,
        Interrupt::SERIAL,
        Interrupt::JOYPAD,
    ];

    /// Handler address; for a set of several sources, the one that would be
    /// serviced first.
    pub fn vector(self) -> u16 {
        let index = self.bits().trailing_zeros().min(4) as u16;
        0x40 + index * 8
    }

    /// Sources both requested and enabled.
    pub fn pending<B: Bus + ?Sized>(bus: &mut B) -> Interrupt {
        let ie = bus.read8(IE_ADDR);
        let iflag = bus.read8(IF_ADDR);
        Interrupt::from_bits_truncate(ie & iflag)
    }

    /// OR this source into IF.
    pub fn request<B: Bus + ?Sized>(self, bus: &mut B) {
        let iflag = bus.read8(IF_ADDR);
        bus.write8(IF_ADDR, iflag | self.bits());
    }
}

impl Cpu {
    /// Check IE & IF and dispatch the highest-priority pending interrupt.
    ///
    /// Any pending source wakes a halted CPU, even with IME clear. With IME
    /// set the CPU clears IME, pushes PC, clears only the selected IF bit and
    /// jumps to its vector; that costs 20 cycles and is reported as
    /// `Some(20)`.
    pub(super) fn service_interrupts<B: Bus>(&mut self, bus: &mut B) -> Option<u32> {
        let pending = Interrupt::pending(bus);
        if pending.is_empty() {
            return None;
        }

        self.halted = false;
        if !self.ime {
            return None;
        }

        let source = Interrupt::PRIORITY
            .into_iter()
            .find(|source| pending.contains(*source))?;

        self.ime = false;
        self.ime_enable_pending = false;
        let pc = self.regs.pc;
        self.push16(bus, pc);

        let iflag = bus.read8(IF_ADDR);
        bus.write8(IF_ADDR, iflag & !source.bits());
        self.regs.pc = source.vector();

        log::debug!(
            "interrupt {:?}: PC {:#06x} -> {:#06x}, SP={:#06x}",
            source,
            pc,
            self.regs.pc,
            self.regs.sp
        );

        Some(20)
    }
}
