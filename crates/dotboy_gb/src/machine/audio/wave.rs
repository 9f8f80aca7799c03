/// Wave channel (channel 3). Registers are stored and read back; no sound
/// is produced.
#[derive(Clone, Debug, Default)]
pub(crate) struct WaveChannel {
    pub(crate) regs: [u8; 5],
}

impl WaveChannel {
    pub(crate) fn write(&mut self, offset: usize, value: u8) {
        self.regs[offset] = value;
    }

    pub(crate) fn update(&mut self, _ticks: u64) {}

    pub(crate) fn sample(&self) -> i16 {
        0
    }
}
