/// Host keyboard keys a frontend can report to an emulator core.
///
/// Only the keys bound by the default DMG joypad mapping are listed.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Z,
    X,
    Return,
    RShift,
}
