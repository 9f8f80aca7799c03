use super::channel::{amplitude, ChannelClocks, ChannelCore, Envelope};

/// Noise channel (channel 4).
///
/// A 15-bit LFSR, optionally narrowed to 7 bits, is clocked at the rate
/// given by NR43 (offset 3): `divisor << shift` master cycles, where a
/// divisor code of 0 counts as 8 and any other code as `code * 16`.
#[derive(Clone, Debug)]
pub(crate) struct NoiseChannel {
    pub(crate) core: ChannelCore,
    pub(crate) envelope: Envelope,
    lfsr: u16,
    lfsr_timer: u64,
}

impl NoiseChannel {
    pub(crate) fn new(clocks: ChannelClocks) -> Self {
        Self {
            core: ChannelCore::new(clocks),
            envelope: Envelope::default(),
            lfsr: 0x7FFF,
            lfsr_timer: 0,
        }
    }

    pub(crate) fn write(&mut self, offset: usize, value: u8) {
        self.core.write(offset, value);
        if offset == 2 {
            self.envelope.configure(value, self.core.clocks.envelope_step);
        }
    }

    fn shift(&self) -> u8 {
        self.core.regs[3] >> 4
    }

    fn width7(&self) -> bool {
        self.core.regs[3] & 0x08 != 0
    }

    pub(crate) fn lfsr_period(&self) -> u64 {
        let base = match self.core.regs[3] & 0x07 {
            0 => 8,
            code => u64::from(code) * 16,
        };
        base << self.shift()
    }

    pub(crate) fn update(&mut self, ticks: u64) {
        if self.core.take_trigger() {
            self.envelope.restart();
            self.lfsr = 0x7FFF;
            self.lfsr_timer = 0;
        }

        let next = self.core.counter + ticks;
        self.core.clock_length(next);

        if self.core.crossed(next, self.envelope.period) {
            self.envelope.step(self.core.regs[2]);
        }

        // Shift values 14 and 15 stop the clock.
        if self.core.enabled && self.shift() < 14 {
            let period = self.lfsr_period();
            self.lfsr_timer += ticks;
            while self.lfsr_timer >= period {
                self.lfsr_timer -= period;
                self.clock_lfsr();
            }
        }

        self.core.counter = next;
    }

    fn clock_lfsr(&mut self) {
        let bit = (self.lfsr ^ (self.lfsr >> 1)) & 1;
        self.lfsr = (self.lfsr >> 1) | (bit << 14);
        if self.width7() {
            self.lfsr = (self.lfsr & !0x40) | (bit << 6);
        }
    }

    pub(crate) fn sample(&self) -> i16 {
        if !self.core.enabled {
            return 0;
        }
        amplitude(self.lfsr & 1 == 0, self.envelope.volume)
    }
}
