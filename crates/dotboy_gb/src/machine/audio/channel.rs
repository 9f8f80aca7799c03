use crate::config::GbConfig;

/// Peak amplitude of one channel at full volume.
pub(crate) const MAX_AMPLITUDE: i32 = 4000;

/// Clock-derived periods shared by every channel, in master cycles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ChannelClocks {
    pub(crate) clock_speed: u64,
    pub(crate) length_period: u64,
    pub(crate) envelope_step: u64,
    pub(crate) sweep_step: u64,
}

impl ChannelClocks {
    pub(crate) fn new(config: &GbConfig) -> Self {
        Self {
            clock_speed: u64::from(config.clock_speed),
            length_period: config.length_period(),
            envelope_step: config.envelope_step(),
            sweep_step: config.sweep_step(),
        }
    }
}

/// State every tone channel carries: its five registers, the running
/// cycle counter and the length counter.
///
/// Register offsets are relative to the channel base: 0 sweep (or unused),
/// 1 duty/length, 2 envelope, 3 frequency low, 4 frequency high/control.
#[derive(Clone, Debug)]
pub(crate) struct ChannelCore {
    pub(crate) regs: [u8; 5],
    pub(crate) clocks: ChannelClocks,
    pub(crate) counter: u64,
    pub(crate) length: u8,
    pub(crate) length_enabled: bool,
    pub(crate) trigger: bool,
    pub(crate) enabled: bool,
}

impl ChannelCore {
    pub(crate) fn new(clocks: ChannelClocks) -> Self {
        Self {
            regs: [0; 5],
            clocks,
            counter: 0,
            length: 0,
            length_enabled: false,
            trigger: false,
            enabled: false,
        }
    }

    pub(crate) fn write(&mut self, offset: usize, value: u8) {
        self.regs[offset] = value;
        match offset {
            1 => self.length = 64 - (value & 0x3F),
            2 if !self.dac_enabled() => self.enabled = false,
            4 => {
                self.trigger = value & 0x80 != 0;
                self.length_enabled = value & 0x40 != 0;
            }
            _ => {}
        }
    }

    /// Consume a pending trigger. Returns `true` when one was handled so the
    /// channel can reset its own state as well.
    pub(crate) fn take_trigger(&mut self) -> bool {
        if !self.trigger {
            return false;
        }
        self.trigger = false;
        self.enabled = self.dac_enabled();
        if self.length == 0 {
            self.length = 64;
        }
        self.counter = 0;
        true
    }

    /// Volume and envelope bits all clear switch the DAC off, which keeps
    /// the channel silent and disabled.
    pub(crate) fn dac_enabled(&self) -> bool {
        self.regs[2] & 0xF8 != 0
    }

    /// Whether moving the counter to `next` crosses a multiple of `period`.
    /// A zero period never fires.
    pub(crate) fn crossed(&self, next: u64, period: u64) -> bool {
        period != 0 && self.counter / period < next / period
    }

    pub(crate) fn clock_length(&mut self, next: u64) {
        if self.length_enabled && self.length > 0 && self.crossed(next, self.clocks.length_period) {
            self.length -= 1;
            if self.length == 0 {
                self.enabled = false;
            }
        }
    }

    /// 11-bit frequency from registers 3 and 4.
    pub(crate) fn frequency_reg(&self) -> u16 {
        (u16::from(self.regs[4] & 0x07) << 8) | u16::from(self.regs[3])
    }

    /// Store a new 11-bit frequency without re-triggering the channel.
    pub(crate) fn set_frequency_reg(&mut self, freq: u16) {
        self.regs[3] = (freq & 0xFF) as u8;
        self.regs[4] = (self.regs[4] & 0xF8) | ((freq >> 8) as u8 & 0x07);
    }
}

/// Volume envelope driven by register 2.
#[derive(Clone, Debug, Default)]
pub(crate) struct Envelope {
    pub(crate) volume: u8,
    start_volume: u8,
    pub(crate) period: u64,
}

impl Envelope {
    pub(crate) fn configure(&mut self, nrx2: u8, step: u64) {
        self.period = step * u64::from(nrx2 & 0x07);
        self.start_volume = nrx2 >> 4;
    }

    pub(crate) fn restart(&mut self) {
        self.volume = self.start_volume;
    }

    /// One envelope step; bit 3 of NRx2 selects the direction.
    pub(crate) fn step(&mut self, nrx2: u8) {
        if nrx2 & 0x08 != 0 {
            if self.volume < 15 {
                self.volume += 1;
            }
        } else if self.volume > 0 {
            self.volume -= 1;
        }
    }
}

/// Scale a full-swing sample to the current volume, inverted for the low
/// half of the waveform.
pub(crate) fn amplitude(high: bool, volume: u8) -> i16 {
    let amp = if high { MAX_AMPLITUDE } else { -MAX_AMPLITUDE };
    (amp * i32::from(volume) / 16) as i16
}
