use dotboy_common::Color;
use typed_builder::TypedBuilder;

/// Master clock of the DMG in Hz.
pub const DMG_CLOCK_SPEED: u32 = 4_194_304;

/// Cycles in one scanline (OAM scan + pixel transfer + H-blank).
pub const CYCLES_PER_SCANLINE: u32 = 456;

/// Scanlines per frame, including the ten V-blank lines.
pub const SCANLINES_PER_FRAME: u32 = 154;

/// Immutable machine configuration.
///
/// A single table is built once and handed by reference to every component
/// that needs clock-derived constants or palette literals:
///
/// ```
/// use dotboy_gb::GbConfig;
///
/// let config = GbConfig::builder().sample_rate(48_000).build();
/// assert_eq!(config.clock_speed, 4_194_304);
/// assert_eq!(config.cycles_per_frame(), 70_224);
/// ```
#[derive(Clone, Debug, TypedBuilder)]
pub struct GbConfig {
    #[builder(default = DMG_CLOCK_SPEED)]
    pub clock_speed: u32,
    #[builder(default = 44_100)]
    pub sample_rate: u32,
    /// Number of `i16` values (interleaved left/right) handed to the audio
    /// sink at once.
    #[builder(default = 768)]
    pub audio_buffer_len: usize,
    /// Shades for color indices 0..=3 after palette mapping.
    #[builder(default = [Color::WHITE, Color::LIGHT_GRAY, Color::DARK_GRAY, Color::BLACK])]
    pub palette: [Color; 4],
    #[builder(default = 256)]
    pub length_clock_hz: u32,
    #[builder(default = 64)]
    pub envelope_clock_hz: u32,
    #[builder(default = 128)]
    pub sweep_clock_hz: u32,
}

impl Default for GbConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl GbConfig {
    pub fn cycles_per_frame(&self) -> u32 {
        CYCLES_PER_SCANLINE * SCANLINES_PER_FRAME
    }

    /// Master cycles between two length-counter steps.
    pub fn length_period(&self) -> u64 {
        u64::from(self.clock_speed / self.length_clock_hz.max(1))
    }

    /// Master cycles per envelope step unit; multiplied by NRx2's period.
    pub fn envelope_step(&self) -> u64 {
        u64::from(self.clock_speed / self.envelope_clock_hz.max(1))
    }

    /// Master cycles per sweep step unit; multiplied by NR10's period.
    pub fn sweep_step(&self) -> u64 {
        u64::from(self.clock_speed / self.sweep_clock_hz.max(1))
    }

    pub(crate) fn palette_argb(&self) -> [u32; 4] {
        self.palette.map(|c| c.to_argb())
    }
}
