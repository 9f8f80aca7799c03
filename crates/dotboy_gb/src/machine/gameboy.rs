use dotboy_common::Key;

use crate::config::GbConfig;
use crate::cpu::{Cpu, Interrupt};

use super::audio::{AudioSink, Mixer};
use super::cartridge::Cartridge;
use super::joypad::Button;
use super::lcd::{Lcd, Lcdc, LCDC_ADDR};
use super::timer::{Timer, DIV_ADDR, TAC_ADDR, TIMA_ADDR, TMA_ADDR};
use super::GameBoyBus;

/// High-level Game Boy machine.
///
/// Owns the CPU, the bus (and through it every memory-mapped device), the
/// LCD and the master cycle counter. One `step` executes one instruction
/// and then feeds its cycle count to the timers, the LCD and the mixer, in
/// that order.
pub struct GameBoy {
    pub cpu: Cpu,
    pub(crate) bus: GameBoyBus,
    pub(crate) lcd: Lcd,
    counter: u64,
    cycles_per_frame: u64,
}

impl GameBoy {
    pub fn new(cartridge: Cartridge, config: &GbConfig, sink: Box<dyn AudioSink>) -> Self {
        let mixer = Mixer::new(config, sink);
        Self {
            cpu: Cpu::new(),
            bus: GameBoyBus::new(cartridge, mixer),
            lcd: Lcd::new(config),
            counter: 0,
            cycles_per_frame: u64::from(config.cycles_per_frame()),
        }
    }

    /// Execute one instruction (or interrupt dispatch, or halted idle) and
    /// update the hardware. Returns the cycles consumed.
    pub fn step(&mut self) -> u32 {
        let cycles = self.cpu.step(&mut self.bus);
        self.update_hardware(cycles);
        cycles
    }

    fn update_hardware(&mut self, cycles: u32) {
        self.update_timers(cycles);
        self.lcd.update(cycles, &mut self.bus);
        self.bus.mixer.update(cycles);
        if self.bus.joypad.take_state_changed() {
            self.bus.request_interrupt(Interrupt::JOYPAD);
        }
        self.counter += u64::from(cycles);
    }

    fn update_timers(&mut self, cycles: u32) {
        let prev = self.counter;
        let curr = prev + u64::from(cycles);

        let out = Timer::update(
            prev,
            curr,
            self.bus.raw_read(DIV_ADDR),
            self.bus.raw_read(TIMA_ADDR),
            self.bus.raw_read(TMA_ADDR),
            self.bus.raw_read(TAC_ADDR),
        );

        if let Some(div) = out.div {
            self.bus.raw_write(DIV_ADDR, div);
        }
        if let Some(tima) = out.tima {
            self.bus.raw_write(TIMA_ADDR, tima);
        }
        if out.overflow {
            self.bus.request_interrupt(Interrupt::TIMER);
        }
    }

    /// Run until the LCD finishes a frame and consume its ready flag.
    ///
    /// With the display switched off no frame ever completes; the call then
    /// returns `false` after one frame's worth of cycles.
    pub fn step_frame(&mut self) -> bool {
        let start = self.counter;
        loop {
            self.step();
            if self.lcd.take_frame_ready() {
                return true;
            }
            let elapsed = self.counter - start;
            if elapsed >= 2 * self.cycles_per_frame
                || (elapsed >= self.cycles_per_frame && !self.lcd_enabled())
            {
                return false;
            }
        }
    }

    /// Run whole instructions until at least `cycles` have elapsed.
    pub fn run_cycles(&mut self, cycles: u64) {
        let target = self.counter + cycles;
        while self.counter < target {
            self.step();
        }
    }

    fn lcd_enabled(&self) -> bool {
        Lcdc::from_bits_retain(self.bus.raw_read(LCDC_ADDR)).contains(Lcdc::LCD_ENABLE)
    }

    /// Master cycles elapsed since power-on.
    pub fn cycles(&self) -> u64 {
        self.counter
    }

    /// Returns `true` once per completed frame.
    pub fn take_frame_ready(&mut self) -> bool {
        self.lcd.take_frame_ready()
    }

    /// 160x144 ARGB pixels, row-major.
    pub fn framebuffer(&self) -> &[u32] {
        self.lcd.framebuffer()
    }

    pub fn pixel(&self, x: usize, y: usize) -> u32 {
        self.lcd.pixel(x, y)
    }

    /// Press or release the button bound to `key`. Unbound keys are
    /// ignored.
    pub fn set_key(&mut self, key: Key, pressed: bool) {
        if let Some(button) = Button::from_key(key) {
            self.bus.joypad.set_button(button, pressed);
        }
    }

    pub fn set_button(&mut self, button: Button, pressed: bool) {
        self.bus.joypad.set_button(button, pressed);
    }

    /// Refresh every button from a host keyboard snapshot.
    pub fn poll_keys(&mut self, snapshot: impl Fn(Key) -> bool) {
        self.bus.joypad.poll(snapshot);
    }

    /// Bytes sent over the serial port so far.
    pub fn serial_output(&self) -> &[u8] {
        self.bus.serial_output()
    }

    pub fn bus(&self) -> &GameBoyBus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut GameBoyBus {
        &mut self.bus
    }

    /// Persist battery-backed cartridge RAM.
    pub fn close(&mut self) -> anyhow::Result<()> {
        self.bus.cartridge.save()
    }
}
