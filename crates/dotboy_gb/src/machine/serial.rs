/// Serial transfer data (SB).
pub const SB_ADDR: u16 = 0xFF01;
/// Serial transfer control (SC).
pub const SC_ADDR: u16 = 0xFF02;

/// Serial port with no link partner.
///
/// Only transfers on the internal clock are modelled: writing SC with the
/// start and clock bits set (0x81) completes immediately, appending SB to
/// `output` and clearing the start bit. Test ROMs print through this.
#[derive(Clone, Debug, Default)]
pub(crate) struct Serial {
    pub(crate) sb: u8,
    pub(crate) sc: u8,
    pub(crate) output: Vec<u8>,
}

impl Serial {
    pub(crate) fn read(&self, addr: u16) -> u8 {
        match addr {
            SB_ADDR => self.sb,
            _ => self.sc | 0x7E,
        }
    }

    /// Returns `true` when the write completed a transfer, in which case
    /// the caller raises the serial interrupt.
    pub(crate) fn write(&mut self, addr: u16, value: u8) -> bool {
        if addr == SB_ADDR {
            self.sb = value;
            return false;
        }

        self.sc = value;
        if (self.sc & 0x81) == 0x81 {
            self.output.push(self.sb);
            self.sc &= !0x80;
            return true;
        }
        false
    }
}
