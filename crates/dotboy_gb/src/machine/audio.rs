use std::thread;
use std::time::Duration;

use crate::config::GbConfig;

mod channel;
mod noise;
mod sink;
mod square;
mod wave;

use channel::ChannelClocks;
use noise::NoiseChannel;
use square::SquareChannel;
use wave::WaveChannel;

pub use sink::{AudioSink, NullSink, VecSink};

/// First address of the sound register window.
pub const AUDIO_START: u16 = 0xFF10;
/// Last address of the sound register window (end of wave RAM).
pub const AUDIO_END: u16 = 0xFF3F;

const NR50: u16 = 0xFF24;
const NR51: u16 = 0xFF25;
const NR52: u16 = 0xFF26;
const WAVE_RAM_START: u16 = 0xFF30;

/// Bits that always read back as 1, for FF10..=FF26.
const READ_MASKS: [u8; 23] = [
    0x80, 0x3F, 0x00, 0xFF, 0xBF, // NR10-NR14
    0xFF, 0x3F, 0x00, 0xFF, 0xBF, // NR20-NR24
    0x7F, 0xFF, 0x9F, 0xFF, 0xBF, // NR30-NR34
    0xFF, 0xFF, 0x00, 0x00, 0xBF, // NR40-NR44
    0x00, 0x00, 0x70, // NR50-NR52
];

/// One of the four sound generators.
#[derive(Clone, Debug)]
pub(crate) enum AudioChannel {
    Square(SquareChannel),
    Wave(WaveChannel),
    Noise(NoiseChannel),
}

impl AudioChannel {
    fn update(&mut self, ticks: u64) {
        match self {
            AudioChannel::Square(ch) => ch.update(ticks),
            AudioChannel::Wave(ch) => ch.update(ticks),
            AudioChannel::Noise(ch) => ch.update(ticks),
        }
    }

    fn sample(&self) -> i16 {
        match self {
            AudioChannel::Square(ch) => ch.sample(),
            AudioChannel::Wave(ch) => ch.sample(),
            AudioChannel::Noise(ch) => ch.sample(),
        }
    }

    fn read(&self, offset: usize) -> u8 {
        match self {
            AudioChannel::Square(ch) => ch.core.regs[offset],
            AudioChannel::Wave(ch) => ch.regs[offset],
            AudioChannel::Noise(ch) => ch.core.regs[offset],
        }
    }

    fn write(&mut self, offset: usize, value: u8) {
        match self {
            AudioChannel::Square(ch) => ch.write(offset, value),
            AudioChannel::Wave(ch) => ch.write(offset, value),
            AudioChannel::Noise(ch) => ch.write(offset, value),
        }
    }

    pub(crate) fn is_enabled(&self) -> bool {
        match self {
            AudioChannel::Square(ch) => ch.core.enabled,
            AudioChannel::Wave(_) => false,
            AudioChannel::Noise(ch) => ch.core.enabled,
        }
    }

    fn disable(&mut self) {
        match self {
            AudioChannel::Square(ch) => ch.core.enabled = false,
            AudioChannel::Wave(_) => {}
            AudioChannel::Noise(ch) => ch.core.enabled = false,
        }
    }
}

/// Sound unit: four channels, the master control registers at FF24-FF26,
/// wave RAM, and the output buffer.
///
/// `update` is fed the cycle count of every instruction. Each time the
/// running cycle count crosses a sample boundary one stereo frame is mixed;
/// a full buffer is handed to the sink once its backlog has drained below
/// two buffers' worth of bytes.
pub struct Mixer {
    channels: [AudioChannel; 4],
    control: [u8; 3],
    wave_ram: [u8; 16],
    ticks: u64,
    clock_speed: u64,
    sample_rate: u64,
    buffer: Vec<i16>,
    buffer_len: usize,
    sink: Box<dyn AudioSink>,
}

impl Mixer {
    pub fn new(config: &GbConfig, sink: Box<dyn AudioSink>) -> Self {
        let clocks = ChannelClocks::new(config);
        // Stereo frames are written in pairs.
        let buffer_len = config.audio_buffer_len.max(2) & !1;
        let mut mixer = Self {
            channels: [
                AudioChannel::Square(SquareChannel::new(clocks, true)),
                AudioChannel::Square(SquareChannel::new(clocks, false)),
                AudioChannel::Wave(WaveChannel::default()),
                AudioChannel::Noise(NoiseChannel::new(clocks)),
            ],
            control: [0; 3],
            wave_ram: [0; 16],
            ticks: 0,
            clock_speed: u64::from(config.clock_speed.max(1)),
            sample_rate: u64::from(config.sample_rate),
            buffer: Vec::with_capacity(buffer_len),
            buffer_len,
            sink,
        };
        mixer.clear_registers();
        mixer
    }

    pub fn read(&self, addr: u16) -> u8 {
        match addr {
            AUDIO_START..=0xFF23 => {
                let (index, offset) = Self::channel_slot(addr);
                self.channels[index].read(offset) | Self::read_mask(addr)
            }
            NR50 | NR51 => self.control[(addr - NR50) as usize],
            NR52 => {
                let status = self
                    .channels
                    .iter()
                    .enumerate()
                    .filter(|(_, ch)| ch.is_enabled())
                    .fold(0u8, |acc, (i, _)| acc | (1 << i));
                (self.control[2] & 0x80) | status | Self::read_mask(addr)
            }
            WAVE_RAM_START..=AUDIO_END => self.wave_ram[(addr - WAVE_RAM_START) as usize],
            _ => 0xFF,
        }
    }

    pub fn write(&mut self, addr: u16, value: u8) {
        match addr {
            AUDIO_START..=0xFF23 => {
                let (index, offset) = Self::channel_slot(addr);
                self.channels[index].write(offset, value);
            }
            NR50 | NR51 => self.control[(addr - NR50) as usize] = value,
            NR52 => {
                self.control[2] = value & 0x80;
                if value & 0x80 == 0 {
                    log::debug!("sound powered off");
                    self.clear_registers();
                    self.channels.iter_mut().for_each(AudioChannel::disable);
                }
            }
            WAVE_RAM_START..=AUDIO_END => {
                self.wave_ram[(addr - WAVE_RAM_START) as usize] = value;
            }
            _ => {}
        }
    }

    fn channel_slot(addr: u16) -> (usize, usize) {
        let rel = (addr - AUDIO_START) as usize;
        (rel / 5, rel % 5)
    }

    fn read_mask(addr: u16) -> u8 {
        READ_MASKS[(addr - AUDIO_START) as usize]
    }

    /// Zero FF10..=FF25 through the normal write path.
    fn clear_registers(&mut self) {
        for addr in AUDIO_START..NR52 {
            self.write(addr, 0);
        }
    }

    pub(crate) fn channel(&self, index: usize) -> &AudioChannel {
        &self.channels[index]
    }

    pub fn update(&mut self, ticks: u32) {
        let ticks = u64::from(ticks);
        let next = self.ticks + ticks;

        for ch in self.channels.iter_mut() {
            ch.update(ticks);
        }

        if self.ticks * self.sample_rate / self.clock_speed
            < next * self.sample_rate / self.clock_speed
        {
            self.push_frame();
        }

        self.ticks = next;
    }

    /// Mix the current output of all channels into one stereo frame.
    pub(crate) fn mix(&self) -> (i16, i16) {
        let nr50 = self.control[0];
        let nr51 = self.control[1];
        if self.control[2] & 0x80 == 0 {
            return (0, 0);
        }

        let mut left = 0i32;
        let mut right = 0i32;
        for (i, ch) in self.channels.iter().enumerate() {
            let sample = i32::from(ch.sample());
            if nr51 & (1 << i) != 0 {
                left += sample;
            }
            if nr51 & (1 << (4 + i)) != 0 {
                right += sample;
            }
        }

        let left = left * i32::from((nr50 >> 4) & 0x07) / 8;
        let right = right * i32::from(nr50 & 0x07) / 8;
        (clamp_i16(left), clamp_i16(right))
    }

    fn push_frame(&mut self) {
        let (left, right) = self.mix();
        self.buffer.push(left);
        self.buffer.push(right);

        if self.buffer.len() >= self.buffer_len {
            self.flush();
        }
    }

    fn flush(&mut self) {
        let threshold = self.buffer_len * 2 * std::mem::size_of::<i16>();
        while self.sink.queued_bytes() >= threshold {
            thread::sleep(Duration::from_millis(1));
        }
        self.sink.queue(&self.buffer);
        self.buffer.clear();
    }
}

fn clamp_i16(value: i32) -> i16 {
    value.clamp(i32::from(i16::MIN), i32::from(i16::MAX)) as i16
}
