use super::{Access, GameBoyBus};

/// OAM DMA trigger register.
pub const DMA_ADDR: u16 = 0xFF46;

const OAM_START: u16 = 0xFE00;
const OAM_LEN: u16 = 0xA0;

impl GameBoyBus {
    /// Copy 160 bytes from `value * 0x100` into OAM.
    ///
    /// The transfer completes at once; both sides go through normal routing
    /// so the source may be cartridge ROM or RAM.
    pub(super) fn oam_dma(&mut self, value: u8) {
        let base = u16::from(value) << 8;
        for i in 0..OAM_LEN {
            let mut byte = 0;
            self.access(base.wrapping_add(i), &mut byte, Access::Read);
            self.access(OAM_START + i, &mut byte, Access::Write);
        }
        self.memory[DMA_ADDR as usize] = value;
        log::debug!("OAM DMA from {base:#06x}");
    }
}
