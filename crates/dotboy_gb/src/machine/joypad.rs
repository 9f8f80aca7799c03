use dotboy_common::Key;

/// Joypad register (P1).
pub const JOYP_ADDR: u16 = 0xFF00;

const SELECT_DIRECTIONS: u8 = 1 << 4;
const SELECT_BUTTONS: u8 = 1 << 5;

/// The eight DMG inputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Button {
    Up,
    Down,
    Left,
    Right,
    A,
    B,
    Start,
    Select,
}

impl Button {
    pub const ALL: [Button; 8] = [
        Button::Up,
        Button::Down,
        Button::Left,
        Button::Right,
        Button::A,
        Button::B,
        Button::Start,
        Button::Select,
    ];

    fn is_direction(self) -> bool {
        matches!(self, Button::Up | Button::Down | Button::Left | Button::Right)
    }

    /// Host key bound to this button.
    pub fn default_key(self) -> Key {
        match self {
            Button::Up => Key::Up,
            Button::Down => Key::Down,
            Button::Left => Key::Left,
            Button::Right => Key::Right,
            Button::A => Key::X,
            Button::B => Key::Z,
            Button::Start => Key::Return,
            Button::Select => Key::RShift,
        }
    }

    pub fn from_key(key: Key) -> Option<Button> {
        Button::ALL.into_iter().find(|b| b.default_key() == key)
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Input latch behind FF00.
///
/// The register's upper nibble holds the group select bits written by the
/// CPU; the lower nibble is rebuilt from the held buttons whenever either
/// changes, active low. With the direction group selected, opposite
/// directions are mutually exclusive (up wins over down, left over right).
#[derive(Clone, Debug)]
pub struct Joypad {
    reg: u8,
    held: [bool; 8],
    state_changed: bool,
}

impl Default for Joypad {
    fn default() -> Self {
        Self {
            reg: 0xFF,
            held: [false; 8],
            state_changed: false,
        }
    }
}

impl Joypad {
    pub fn read(&self) -> u8 {
        self.reg
    }

    pub fn write(&mut self, value: u8) {
        self.reg = (value & 0xF0) | (self.reg & 0x0F);
        self.refresh();
    }

    pub fn is_held(&self, button: Button) -> bool {
        self.held[button.index()]
    }

    /// Replace the held-button state from a host keyboard snapshot.
    pub fn poll(&mut self, snapshot: impl Fn(Key) -> bool) {
        let mut next = [false; 8];
        for button in Button::ALL {
            next[button.index()] = snapshot(button.default_key());
        }
        self.apply(next);
    }

    /// Press or release a single button, leaving the rest untouched.
    pub fn set_button(&mut self, button: Button, pressed: bool) {
        let mut next = self.held;
        next[button.index()] = pressed;
        self.apply(next);
    }

    /// Whether a newly pressed button in the selected group was seen since
    /// the last call. Only this call clears the flag.
    pub fn take_state_changed(&mut self) -> bool {
        std::mem::take(&mut self.state_changed)
    }

    fn apply(&mut self, next: [bool; 8]) {
        let directions = self.reg & SELECT_DIRECTIONS == 0;
        let buttons = self.reg & SELECT_BUTTONS == 0;
        if directions || buttons {
            self.state_changed |= Button::ALL.into_iter().any(|b| {
                let in_group = if directions {
                    b.is_direction()
                } else {
                    !b.is_direction()
                };
                in_group && next[b.index()] && !self.held[b.index()]
            });
        }
        self.held = next;
        self.refresh();
    }

    fn refresh(&mut self) {
        let mut reg = self.reg | 0x0F;
        if reg & SELECT_DIRECTIONS == 0 {
            if self.is_held(Button::Up) {
                reg &= !(1 << 2);
            } else if self.is_held(Button::Down) {
                reg &= !(1 << 3);
            }
            if self.is_held(Button::Left) {
                reg &= !(1 << 1);
            } else if self.is_held(Button::Right) {
                reg &= !(1 << 0);
            }
        } else if reg & SELECT_BUTTONS == 0 {
            if self.is_held(Button::A) {
                reg &= !(1 << 0);
            }
            if self.is_held(Button::B) {
                reg &= !(1 << 1);
            }
            if self.is_held(Button::Select) {
                reg &= !(1 << 2);
            }
            if self.is_held(Button::Start) {
                reg &= !(1 << 3);
            }
        }
        self.reg = reg;
    }
}
