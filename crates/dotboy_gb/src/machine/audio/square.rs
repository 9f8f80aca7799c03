use super::channel::{amplitude, ChannelClocks, ChannelCore, Envelope};

/// Duty waveforms, one bit per eighth of a period, indexed by NRx1[7:6].
const DUTY_PATTERNS: [u8; 4] = [0x01, 0x81, 0x87, 0x7E];

/// Frequency sweep (channel 1 only), configured from NR10.
#[derive(Clone, Debug, Default)]
pub(crate) struct Sweep {
    period: u64,
    shift: u8,
}

/// Square-wave channel; channel 1 carries a sweep unit, channel 2 does not.
#[derive(Clone, Debug)]
pub(crate) struct SquareChannel {
    pub(crate) core: ChannelCore,
    pub(crate) envelope: Envelope,
    sweep: Option<Sweep>,
}

impl SquareChannel {
    pub(crate) fn new(clocks: ChannelClocks, with_sweep: bool) -> Self {
        Self {
            core: ChannelCore::new(clocks),
            envelope: Envelope::default(),
            sweep: with_sweep.then(Sweep::default),
        }
    }

    pub(crate) fn write(&mut self, offset: usize, value: u8) {
        self.core.write(offset, value);
        match offset {
            0 => {
                if let Some(sweep) = self.sweep.as_mut() {
                    sweep.period = self.core.clocks.sweep_step * u64::from((value >> 4) & 0x07);
                    sweep.shift = value & 0x07;
                }
            }
            2 => self.envelope.configure(value, self.core.clocks.envelope_step),
            _ => {}
        }
    }

    pub(crate) fn update(&mut self, ticks: u64) {
        if self.core.take_trigger() {
            self.envelope.restart();
        }

        let next = self.core.counter + ticks;
        self.core.clock_length(next);

        if self.core.crossed(next, self.envelope.period) {
            self.envelope.step(self.core.regs[2]);
        }

        let sweep_due = self
            .sweep
            .as_ref()
            .is_some_and(|sweep| self.core.crossed(next, sweep.period));
        if sweep_due {
            self.apply_sweep();
        }

        self.core.counter = next;
    }

    /// Shift-based frequency step. Leaving the 11-bit range disables the
    /// channel and saturates the register.
    fn apply_sweep(&mut self) {
        let Some(shift) = self.sweep.as_ref().map(|s| s.shift) else {
            return;
        };
        let freq = i32::from(self.core.frequency_reg());
        let delta = freq >> shift;

        let mut next = if self.core.regs[0] & 0x08 != 0 {
            freq - delta
        } else {
            freq + delta
        };
        if next < 0 {
            next = 0;
            self.core.enabled = false;
        } else if next >= 2048 {
            next = 2047;
            self.core.enabled = false;
        }

        self.core.set_frequency_reg(next as u16);
    }

    /// Tone frequency in Hz.
    pub(crate) fn frequency(&self) -> u64 {
        131_072 / (2048 - u64::from(self.core.frequency_reg()))
    }

    fn duty_high(&self) -> bool {
        let period = self.core.clocks.clock_speed / self.frequency();
        let eighth = (period / 8).max(1);
        let phase = (self.core.counter / eighth) % 8;
        let pattern = DUTY_PATTERNS[usize::from(self.core.regs[1] >> 6)];
        pattern & (1 << phase) != 0
    }

    pub(crate) fn sample(&self) -> i16 {
        if !self.core.enabled {
            return 0;
        }
        amplitude(self.duty_high(), self.envelope.volume)
    }
}
