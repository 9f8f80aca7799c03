pub mod audio;
mod bus;
pub mod cartridge;
mod gameboy;
pub mod joypad;
pub mod lcd;
mod serial;
mod timer;

pub use bus::{Access, GameBoyBus, DMA_ADDR};
pub use gameboy::GameBoy;

/// Total addressable memory for the Game Boy (64 KiB).
///
/// Backs every region no device claims: VRAM, WRAM, OAM, HRAM and the
/// video, timer and interrupt registers.
const MEMORY_SIZE: usize = 0x10000;

#[cfg(test)]
mod tests;
