use once_cell::sync::OnceCell;

use super::audio::{Mixer, NullSink, VecSink};
use super::bus::LY_ADDR;
use super::cartridge::{Cartridge, MapperKind};
use super::joypad::{Button, JOYP_ADDR};
use super::lcd::{
    Lcd, LcdMode, BGP_ADDR, LCDC_ADDR, LYC_ADDR, OBP0_ADDR, OBP1_ADDR, SCX_ADDR, STAT_ADDR,
    WX_ADDR, WY_ADDR,
};
use super::timer::DIV_ADDR;
use super::{GameBoy, GameBoyBus, DMA_ADDR};
use crate::config::GbConfig;
use crate::cpu::{Bus, IE_ADDR, IF_ADDR};
use crate::SCREEN_WIDTH;
use dotboy_common::{Color, Key};

const WHITE: u32 = Color::WHITE.to_argb();
const LIGHT_GRAY: u32 = Color::LIGHT_GRAY.to_argb();
const DARK_GRAY: u32 = Color::DARK_GRAY.to_argb();
const BLACK: u32 = Color::BLACK.to_argb();

/// `jr -2`: spin in place.
const SPIN: [u8; 2] = [0x18, 0xFE];

/// 32 KiB image with a valid header whose entry point jumps to `program`
/// at 0x0150.
fn rom_with_program(cart_type: u8, ram_code: u8, program: &[u8]) -> Vec<u8> {
    let mut rom = vec![0u8; 0x8000];
    rom[0x100..0x104].copy_from_slice(&[0x00, 0xC3, 0x50, 0x01]);
    rom[0x134..0x134 + 6].copy_from_slice(b"DOTBOY");
    rom[0x147] = cart_type;
    rom[0x149] = ram_code;
    rom[0x150..0x150 + program.len()].copy_from_slice(program);
    rom
}

fn machine_with_rom(rom: Vec<u8>) -> GameBoy {
    let cartridge = Cartridge::from_rom(rom, None).expect("test ROM header is valid");
    GameBoy::new(cartridge, &GbConfig::default(), Box::new(NullSink))
}

fn machine(program: &[u8]) -> GameBoy {
    machine_with_rom(rom_with_program(0x00, 0x00, program))
}

fn test_bus() -> GameBoyBus {
    let cartridge =
        Cartridge::from_rom(rom_with_program(0x00, 0x00, &SPIN), None).expect("valid header");
    GameBoyBus::new(cartridge, Mixer::new(&GbConfig::default(), Box::new(NullSink)))
}

#[test]
fn program_writes_byte_sequence_to_wram() {
    let program = [
        0x21, 0x00, 0xC0, // ld hl, 0xC000
        0x06, 0x08, // ld b, 8
        0x3E, 0x01, // ld a, 1
        0x22, // loop: ld (hl+), a
        0x3C, // inc a
        0x05, // dec b
        0x20, 0xFB, // jr nz, loop
        0x18, 0xFE, // jr -2
    ];

    let mut first = machine(&program);
    let mut second = machine(&program);
    for _ in 0..200 {
        first.step();
        second.step();
    }

    let wram = &first.bus().memory[0xC000..0xC008];
    assert_eq!(wram, &[1, 2, 3, 4, 5, 6, 7, 8]);
    assert_eq!(first.bus().memory[0xC008], 0);

    assert_eq!(first.cycles(), second.cycles());
    assert_eq!(first.cpu.regs.pc, second.cpu.regs.pc);
    assert_eq!(first.bus().memory[..], second.bus().memory[..]);
}

#[test]
fn serial_program_output_and_interrupt() {
    let program = [
        0x3E, b'O', 0xE0, 0x01, // ld a, 'O'; ldh (SB), a
        0x3E, 0x81, 0xE0, 0x02, // ld a, 0x81; ldh (SC), a
        0x3E, b'K', 0xE0, 0x01, // ld a, 'K'; ldh (SB), a
        0x3E, 0x81, 0xE0, 0x02, // ld a, 0x81; ldh (SC), a
        0x18, 0xFE,
    ];
    let mut gb = machine(&program);
    for _ in 0..50 {
        gb.step();
    }

    assert_eq!(gb.serial_output(), b"OK");
    assert_ne!(gb.bus().raw_read(IF_ADDR) & 0x08, 0);
    // Start bit clears once the byte is out.
    assert_eq!(gb.bus_mut().read8(0xFF02) & 0x80, 0);
}

#[test]
fn timer_overflow_dispatches_handler() {
    let program = [
        0x3E, 0x05, 0xE0, 0x07, // TAC: enabled, 16 cycles
        0x3E, 0xF0, 0xE0, 0x05, // TIMA = 0xF0
        0x3E, 0x04, 0xE0, 0xFF, // IE = TIMER
        0xFB, // ei
        0x18, 0xFE,
    ];
    let mut rom = rom_with_program(0x00, 0x00, &program);
    // Timer vector: ld a, 0x42; ld (0xC100), a; reti
    rom[0x50..0x56].copy_from_slice(&[0x3E, 0x42, 0xEA, 0x00, 0xC1, 0xD9]);
    let mut gb = machine_with_rom(rom);

    let mut dispatched = false;
    for _ in 0..400 {
        gb.step();
        if gb.bus().raw_read(0xC100) == 0x42 {
            dispatched = true;
            break;
        }
    }

    assert!(dispatched, "timer handler never ran");
    // Dispatch acknowledged the request and masked further interrupts.
    assert_eq!(gb.bus().raw_read(IF_ADDR) & 0x04, 0);
    assert!(!gb.cpu.ime);
}

#[test]
fn div_tracks_master_counter_and_write_resets() {
    let mut gb = machine(&SPIN);
    gb.run_cycles(256 * 10);
    assert_eq!(u64::from(gb.bus().raw_read(DIV_ADDR)), gb.cycles() / 256);

    gb.bus_mut().write8(DIV_ADDR, 0x5A);
    assert_eq!(gb.bus_mut().read8(DIV_ADDR), 0);

    let before = gb.cycles();
    gb.run_cycles(256);
    let crossings = gb.cycles() / 256 - before / 256;
    assert_eq!(u64::from(gb.bus().raw_read(DIV_ADDR)), crossings);
}

#[test]
fn ly_write_resets_to_zero() {
    let mut bus = test_bus();
    bus.raw_write(LY_ADDR, 77);
    bus.write8(LY_ADDR, 0x33);
    assert_eq!(bus.read8(LY_ADDR), 0);
}

#[test]
fn oam_dma_copies_page() {
    let mut bus = test_bus();
    for i in 0..0xA0u16 {
        bus.write8(0xC000 + i, i as u8 ^ 0x5A);
    }
    bus.write8(DMA_ADDR, 0xC0);

    for i in 0..0xA0u16 {
        assert_eq!(bus.read8(0xFE00 + i), i as u8 ^ 0x5A);
    }
    assert_eq!(bus.read8(DMA_ADDR), 0xC0);

    // ROM is a valid source too.
    bus.write8(DMA_ADDR, 0x01);
    assert_eq!(bus.read8(0xFE00), 0x00);
    assert_eq!(bus.read8(0xFE01), 0xC3);
    assert_eq!(bus.read8(0xFE34), b'D');
}

#[test]
fn echo_ram_mirrors_wram() {
    let mut bus = test_bus();
    bus.write8(0xE123, 0x99);
    assert_eq!(bus.read8(0xC123), 0x99);
    bus.write8(0xDDFF, 0x11);
    assert_eq!(bus.read8(0xFDFF), 0x11);
}

#[test]
fn rom_writes_do_not_modify_rom() {
    let mut bus = test_bus();
    bus.write8(0x0150, 0x00);
    assert_eq!(bus.read8(0x0150), SPIN[0]);
    // No external RAM on this cartridge.
    assert_eq!(bus.read8(0xA000), 0xFF);
}

#[test]
fn joypad_press_raises_interrupt() {
    let mut gb = machine(&SPIN);
    gb.bus_mut().write8(JOYP_ADDR, 0x10);
    gb.set_key(Key::X, true);
    gb.step();

    assert_ne!(gb.bus().raw_read(IF_ADDR) & 0x10, 0);
    assert_eq!(gb.bus_mut().read8(JOYP_ADDR) & 0x0F, 0x0E);

    gb.bus_mut().write8(IF_ADDR, 0);
    gb.set_button(Button::A, false);
    gb.step();
    assert_eq!(gb.bus().raw_read(IF_ADDR) & 0x10, 0);
    assert_eq!(gb.bus_mut().read8(JOYP_ADDR) & 0x0F, 0x0F);
}

#[test]
fn press_survives_later_input_before_step() {
    let mut gb = machine(&SPIN);
    gb.bus_mut().write8(JOYP_ADDR, 0x10);
    gb.set_button(Button::A, true);
    // Up is outside the selected group and must not clear the pending press.
    gb.set_button(Button::Up, true);
    gb.step();
    assert_ne!(gb.bus().raw_read(IF_ADDR) & 0x10, 0);
}

#[test]
fn polled_keys_map_to_directions() {
    let mut gb = machine(&SPIN);
    gb.bus_mut().write8(JOYP_ADDR, 0x20);
    gb.poll_keys(|key| matches!(key, Key::Left | Key::Down));
    assert_eq!(gb.bus_mut().read8(JOYP_ADDR) & 0x0F, 0b0101);
}

#[test]
fn audio_status_after_power_on() {
    let mut gb = machine(&SPIN);
    gb.step();
    // Only square 1 has its DAC powered after boot.
    assert_eq!(gb.bus_mut().read8(0xFF26), 0xF1);

    gb.bus_mut().write8(0xFF26, 0x00);
    assert_eq!(gb.bus_mut().read8(0xFF26), 0x70);
    assert_eq!(gb.bus_mut().read8(0xFF12), 0x00);
}

#[test]
fn audio_samples_reach_sink() {
    let sink = VecSink::new();
    let cartridge =
        Cartridge::from_rom(rom_with_program(0x00, 0x00, &SPIN), None).expect("valid header");
    let mut gb = GameBoy::new(cartridge, &GbConfig::default(), Box::new(sink.clone()));

    gb.run_cycles(u64::from(GbConfig::default().cycles_per_frame()) * 2);
    // Two frames is roughly 1470 stereo frames at 44.1 kHz; the sink only
    // receives whole 768-value buffers.
    assert!(sink.len() >= 768);
    assert_eq!(sink.len() % 768, 0);
    assert!(sink.samples().iter().any(|&s| s != 0));
}

/// Step the LCD in four-cycle slices and record, for every line, the
/// distinct STAT modes seen in order.
#[test]
fn lcd_frame_walks_all_lines_and_modes() {
    let mut bus = test_bus();
    let mut lcd = Lcd::new(&GbConfig::default());

    let mut lines: Vec<u8> = Vec::new();
    let mut modes: Vec<Vec<LcdMode>> = vec![Vec::new(); 154];
    for _ in 0..(70224 / 4 - 1) {
        lcd.update(4, &mut bus);
        let ly = bus.raw_read(LY_ADDR);
        let mode = Lcd::mode(&bus);
        if lines.last() != Some(&ly) {
            lines.push(ly);
        }
        let seen = &mut modes[usize::from(ly)];
        if seen.last() != Some(&mode) {
            seen.push(mode);
        }
    }

    assert_eq!(lines, (0..=153).collect::<Vec<u8>>());

    // The mode is derived before cycles are added, so a fresh line first
    // shows the mode the previous line ended in.
    use LcdMode::*;
    assert_eq!(modes[0], [OamScan, Transfer, HBlank]);
    for line in 1..144 {
        assert_eq!(modes[line], [HBlank, OamScan, Transfer, HBlank], "line {line}");
    }
    assert_eq!(modes[144], [HBlank, VBlank]);
    for line in 145..154 {
        assert_eq!(modes[line], [VBlank], "line {line}");
    }

    assert!(lcd.take_frame_ready());
    assert!(!lcd.take_frame_ready());
    assert_ne!(bus.raw_read(IF_ADDR) & 0x01, 0);

    lcd.update(4, &mut bus);
    assert_eq!(bus.raw_read(LY_ADDR), 0);
}

#[test]
fn lyc_coincidence_requests_stat() {
    let mut bus = test_bus();
    let mut lcd = Lcd::new(&GbConfig::default());
    bus.raw_write(LYC_ADDR, 5);
    bus.raw_write(STAT_ADDR, 0x40);

    while bus.raw_read(LY_ADDR) != 5 {
        assert_eq!(bus.raw_read(IF_ADDR) & 0x02, 0);
        lcd.update(4, &mut bus);
    }

    assert_ne!(bus.raw_read(STAT_ADDR) & 0x04, 0);
    assert_ne!(bus.raw_read(IF_ADDR) & 0x02, 0);

    while bus.raw_read(LY_ADDR) == 5 {
        lcd.update(4, &mut bus);
    }
    assert_eq!(bus.raw_read(STAT_ADDR) & 0x04, 0);
}

#[test]
fn hblank_stat_interrupt_fires_on_entry() {
    let mut bus = test_bus();
    let mut lcd = Lcd::new(&GbConfig::default());
    bus.raw_write(STAT_ADDR, 0x08);

    for _ in 0..(252 / 4) {
        lcd.update(4, &mut bus);
    }
    assert_eq!(bus.raw_read(IF_ADDR) & 0x02, 0);
    lcd.update(4, &mut bus);
    assert_eq!(Lcd::mode(&bus), LcdMode::HBlank);
    assert_ne!(bus.raw_read(IF_ADDR) & 0x02, 0);
}

#[test]
fn disabled_lcd_holds_line_zero() {
    let mut bus = test_bus();
    let mut lcd = Lcd::new(&GbConfig::default());
    bus.raw_write(LCDC_ADDR, 0x11);
    bus.raw_write(LY_ADDR, 77);
    bus.raw_write(STAT_ADDR, 0x04 | 0x02);

    for _ in 0..1000 {
        lcd.update(4, &mut bus);
    }

    assert_eq!(bus.raw_read(LY_ADDR), 0);
    assert_eq!(Lcd::mode(&bus), LcdMode::VBlank);
    assert_eq!(bus.raw_read(STAT_ADDR) & 0x04, 0);
    assert!(!lcd.take_frame_ready());
}

#[test]
fn step_frame_reports_completed_frames() {
    let mut gb = machine(&SPIN);
    assert!(gb.step_frame());
    let first = gb.cycles();
    assert!(first >= 144 * 456 && first < 144 * 456 + 24);

    assert!(gb.step_frame());
    assert!(gb.cycles() - first >= 70224 - 24);
    assert!(!gb.take_frame_ready());
    assert_eq!(gb.framebuffer().len(), 160 * 144);
}

#[test]
fn step_frame_with_lcd_off_returns_after_a_frame() {
    let mut gb = machine(&SPIN);
    gb.bus_mut().write8(LCDC_ADDR, 0x00);
    assert!(!gb.step_frame());
    assert!(gb.cycles() >= 70224);
}

/// Run the LCD across line 0 and return the rasterized row.
fn render_first_line(setup: impl FnOnce(&mut GameBoyBus)) -> Vec<u32> {
    let mut bus = test_bus();
    bus.raw_write(BGP_ADDR, 0xE4);
    bus.raw_write(OBP0_ADDR, 0xE4);
    setup(&mut bus);

    let mut lcd = Lcd::new(&GbConfig::default());
    while bus.raw_read(LY_ADDR) == 0 {
        lcd.update(4, &mut bus);
    }
    lcd.framebuffer()[..SCREEN_WIDTH].to_vec()
}

fn put_tile_row(bus: &mut GameBoyBus, tile: u16, row: u16, low: u8, high: u8) {
    let addr = 0x8000 + tile * 16 + row * 2;
    bus.raw_write(addr, low);
    bus.raw_write(addr + 1, high);
}

fn put_sprite(bus: &mut GameBoyBus, index: u16, y: u8, x: u8, tile: u8, attrs: u8) {
    let addr = 0xFE00 + index * 4;
    for (i, value) in [y, x, tile, attrs].into_iter().enumerate() {
        bus.raw_write(addr + i as u16, value);
    }
}

#[test]
fn background_honors_scroll() {
    let row = render_first_line(|bus| {
        put_tile_row(bus, 1, 0, 0xFF, 0x00);
        bus.raw_write(0x9800, 1);
        bus.raw_write(SCX_ADDR, 4);
    });

    assert!(row[..4].iter().all(|&p| p == LIGHT_GRAY));
    assert!(row[4..].iter().all(|&p| p == WHITE));
}

#[test]
fn window_overrides_background() {
    let row = render_first_line(|bus| {
        bus.raw_write(LCDC_ADDR, 0x91 | 0x20 | 0x40);
        put_tile_row(bus, 2, 0, 0x00, 0xFF);
        bus.raw_write(0x9C00, 2);
        bus.raw_write(WY_ADDR, 0);
        bus.raw_write(WX_ADDR, 80 + 7);
    });

    assert_eq!(row[79], WHITE);
    assert!(row[80..88].iter().all(|&p| p == DARK_GRAY));
    assert_eq!(row[88], WHITE);
}

#[test]
fn earlier_sprite_wins_overlap() {
    let row = render_first_line(|bus| {
        bus.raw_write(LCDC_ADDR, 0x93);
        bus.raw_write(OBP1_ADDR, 0x54);
        put_tile_row(bus, 3, 0, 0xFF, 0xFF);
        put_sprite(bus, 0, 16, 8 + 20, 3, 0x00);
        put_sprite(bus, 1, 16, 8 + 16, 3, 0x10);
    });

    assert_eq!(row[15], WHITE);
    assert!(row[16..20].iter().all(|&p| p == LIGHT_GRAY));
    assert!(row[20..28].iter().all(|&p| p == BLACK));
    assert_eq!(row[28], WHITE);
}

#[test]
fn sprite_behind_background_shows_over_color_zero_only() {
    let row = render_first_line(|bus| {
        bus.raw_write(LCDC_ADDR, 0x93);
        put_tile_row(bus, 1, 0, 0xFF, 0x00);
        bus.raw_write(0x9800, 1);
        put_tile_row(bus, 3, 0, 0xFF, 0xFF);
        put_sprite(bus, 0, 16, 8 + 4, 3, 0x80);
    });

    assert!(row[..8].iter().all(|&p| p == LIGHT_GRAY));
    assert!(row[8..12].iter().all(|&p| p == BLACK));
    assert_eq!(row[12], WHITE);
}

#[test]
fn at_most_ten_sprites_per_line() {
    let row = render_first_line(|bus| {
        bus.raw_write(LCDC_ADDR, 0x93);
        put_tile_row(bus, 3, 0, 0xFF, 0xFF);
        for i in 0..11u16 {
            put_sprite(bus, i, 16, 8 + i as u8 * 8, 3, 0x00);
        }
    });

    assert!(row[..80].iter().all(|&p| p == BLACK));
    assert!(row[80..88].iter().all(|&p| p == WHITE));
}

#[test]
fn tall_sprite_uses_odd_tile_for_lower_half() {
    let row = render_first_line(|bus| {
        bus.raw_write(LCDC_ADDR, 0x97);
        put_tile_row(bus, 4, 0, 0xFF, 0xFF);
        put_tile_row(bus, 5, 0, 0xFF, 0x00);
        // Sprite starts eight lines above the screen, so line 0 is its
        // ninth row: row 0 of the second tile.
        put_sprite(bus, 0, 8, 8, 5, 0x00);
    });

    assert!(row[..8].iter().all(|&p| p == LIGHT_GRAY));
    assert_eq!(row[8], WHITE);
}

#[test]
fn rejects_unknown_cartridge_type() {
    let err = Cartridge::from_rom(rom_with_program(0x19, 0x00, &SPIN), None)
        .err()
        .expect("MBC5 is not supported");
    assert!(format!("{err:#}").contains("unsupported cartridge type 0x19"));

    assert!(Cartridge::from_rom(vec![0; 0x100], None).is_err());
}

#[test]
fn missing_rom_file_reports_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("absent.gb");
    let err = Cartridge::from_file(&path, None).err().expect("file is missing");
    assert!(format!("{err:#}").contains("absent.gb"));
}

#[test]
fn battery_ram_survives_reload() {
    let dir = tempfile::tempdir().expect("tempdir");
    let save = dir.path().join("game.sav");
    let rom = rom_with_program(0x03, 0x02, &SPIN);

    let cartridge = Cartridge::from_rom(rom.clone(), Some(save.clone())).expect("valid header");
    assert_eq!(cartridge.kind(), MapperKind::Mbc1);
    let mut gb = GameBoy::new(cartridge, &GbConfig::default(), Box::new(NullSink));
    gb.bus_mut().write8(0x0000, 0x0A);
    gb.bus_mut().write8(0xA000, 0x5A);
    gb.bus_mut().write8(0xBFFF, 0xA5);
    gb.close().expect("save written");

    let written = std::fs::read(&save).expect("save file exists");
    assert_eq!(written.len(), 0x2000);

    let reloaded = Cartridge::from_rom(rom, Some(save)).expect("valid header");
    assert_eq!(reloaded.ram_bytes()[0], 0x5A);
    assert_eq!(reloaded.ram_bytes()[0x1FFF], 0xA5);
}

#[test]
fn mismatched_save_is_ignored() {
    let dir = tempfile::tempdir().expect("tempdir");
    let save = dir.path().join("game.sav");
    std::fs::write(&save, [0x77; 100]).expect("write save");

    let cartridge = Cartridge::from_rom(rom_with_program(0x03, 0x02, &SPIN), Some(save))
        .expect("valid header");
    assert_eq!(cartridge.ram_bytes().len(), 0x2000);
    assert!(cartridge.ram_bytes().iter().all(|&b| b == 0));
}

#[test]
fn cartridge_without_battery_writes_no_save() {
    let dir = tempfile::tempdir().expect("tempdir");
    let save = dir.path().join("game.sav");
    let cartridge = Cartridge::from_rom(rom_with_program(0x02, 0x02, &SPIN), Some(save.clone()))
        .expect("valid header");
    let mut gb = GameBoy::new(cartridge, &GbConfig::default(), Box::new(NullSink));
    gb.bus_mut().write8(0x0000, 0x0A);
    gb.bus_mut().write8(0xA000, 0x5A);
    gb.close().expect("nothing to save");
    assert!(!save.exists());
}

#[test]
fn mbc3_clock_registers_through_bus() {
    let mut gb = machine_with_rom(rom_with_program(0x10, 0x03, &SPIN));
    let bus = gb.bus_mut();
    bus.write8(0x0000, 0x0A);
    bus.write8(0x4000, 0x08);
    bus.write8(0xA000, 42);
    bus.write8(0x4000, 0x00);
    bus.write8(0xA000, 7);

    bus.write8(0x4000, 0x08);
    assert_eq!(bus.read8(0xA000), 42);
    bus.write8(0x4000, 0x00);
    assert_eq!(bus.read8(0xA000), 7);
}

#[test]
fn interrupt_enable_register_is_plain_memory() {
    let mut bus = test_bus();
    bus.write8(IE_ADDR, 0x1F);
    assert_eq!(bus.read8(IE_ADDR), 0x1F);
}

static CPU_INSTRS_ROM: OnceCell<Option<Vec<u8>>> = OnceCell::new();

const CPU_SERIAL_EXPECT: &[u8] = b"cpu_instrs\n\n\
01:ok  02:ok  03:ok  04:ok  05:ok  06:ok  07:ok  08:ok  09:ok  10:ok  11:ok  \n\
\nPassed all tests\n";

fn load_cpu_instrs_rom() -> Option<&'static [u8]> {
    CPU_INSTRS_ROM
        .get_or_init(|| {
            use std::path::PathBuf;

            let candidates = [
                PathBuf::from("assets/roms/gb_tests/blargg/cpu_instrs.gb"),
                PathBuf::from(env!("CARGO_MANIFEST_DIR"))
                    .join("../../assets/roms/gb_tests/blargg/cpu_instrs.gb"),
            ];
            candidates.iter().find_map(|path| std::fs::read(path).ok())
        })
        .as_deref()
}

#[test]
#[ignore]
fn blargg_cpu_instrs_serial_output() {
    let Some(rom) = load_cpu_instrs_rom() else {
        eprintln!("cpu_instrs.gb not found under assets/roms/gb_tests/blargg; skipping");
        return;
    };
    let mut gb = machine_with_rom(rom.to_vec());

    for _ in 0..4000 {
        gb.step_frame();
        let out = gb.serial_output();
        if out.ends_with(b"Passed all tests\n") || out.windows(6).any(|w| w == b"Failed") {
            break;
        }
    }

    assert_eq!(
        String::from_utf8_lossy(gb.serial_output()),
        String::from_utf8_lossy(CPU_SERIAL_EXPECT)
    );
}
