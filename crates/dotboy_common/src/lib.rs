pub mod key;

pub use key::Key;

/// An RGBA color value.
///
/// The emulator core renders into 32-bit ARGB words; `to_argb` packs a
/// color into that layout.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::new_rgb(0x00, 0x00, 0x00);
    pub const WHITE: Color = Color::new_rgb(0xFF, 0xFF, 0xFF);

    /// The two intermediate shades of the DMG LCD.
    pub const LIGHT_GRAY: Color = Color::new_rgb(0xAA, 0xAA, 0xAA);
    pub const DARK_GRAY: Color = Color::new_rgb(0x55, 0x55, 0x55);

    #[inline]
    pub const fn new_rgb(r: u8, g: u8, b: u8) -> Color {
        Color { r, g, b, a: 0xff }
    }

    #[inline]
    pub const fn new_rgba(r: u8, g: u8, b: u8, a: u8) -> Color {
        Color { r, g, b, a }
    }

    /// Unpack a `0xAARRGGBB` word.
    #[inline]
    pub const fn from_argb(argb: u32) -> Color {
        let [a, r, g, b] = argb.to_be_bytes();
        Color { r, g, b, a }
    }

    #[inline]
    pub const fn rgb(&self) -> (u8, u8, u8) {
        (self.r, self.g, self.b)
    }

    /// Pack into a `0xAARRGGBB` word.
    #[inline]
    pub const fn to_argb(&self) -> u32 {
        u32::from_be_bytes([self.a, self.r, self.g, self.b])
    }
}

#[cfg(test)]
mod tests {
    use super::Color;

    #[test]
    fn dmg_shades_pack_to_argb() {
        assert_eq!(Color::WHITE.to_argb(), 0xFFFF_FFFF);
        assert_eq!(Color::LIGHT_GRAY.to_argb(), 0xFFAA_AAAA);
        assert_eq!(Color::DARK_GRAY.to_argb(), 0xFF55_5555);
        assert_eq!(Color::BLACK.to_argb(), 0xFF00_0000);
    }

    #[test]
    fn argb_unpacks_channels() {
        let c = Color::from_argb(0x8012_3456);
        assert_eq!(c, Color::new_rgba(0x12, 0x34, 0x56, 0x80));
        assert_eq!(c.rgb(), (0x12, 0x34, 0x56));
    }
}
