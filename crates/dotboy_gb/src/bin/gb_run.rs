use std::path::PathBuf;

use dotboy_gb::machine::audio::NullSink;
use dotboy_gb::machine::cartridge::Cartridge;
use dotboy_gb::{GameBoy, GbConfig, SCREEN_HEIGHT, SCREEN_WIDTH};

const USAGE: &str = "Usage: gb_run <rom_path> [save_path] [frames] [out_rgb24_path]";

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let rom_path: PathBuf = args.next().map(PathBuf::from).unwrap_or_else(|| {
        eprintln!("{USAGE}");
        std::process::exit(2);
    });
    let save_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| rom_path.with_extension("sav"));
    let frames: u32 = match args.next() {
        Some(arg) => arg.parse().unwrap_or_else(|_| {
            eprintln!("Invalid frames '{arg}'; expected an integer.");
            std::process::exit(2);
        }),
        None => 600,
    };
    let out_path = args.next().map(PathBuf::from);

    let cartridge = Cartridge::from_file(&rom_path, Some(save_path)).unwrap_or_else(|err| {
        eprintln!("{err:#}");
        std::process::exit(1);
    });

    let config = GbConfig::default();
    let mut gb = GameBoy::new(cartridge, &config, Box::new(NullSink));

    let mut completed = 0u32;
    for _ in 0..frames {
        if gb.step_frame() {
            completed += 1;
        }
    }
    log::info!(
        "ran {frames} frame slots ({completed} displayed), {} cycles",
        gb.cycles()
    );

    if let Some(out_path) = out_path {
        let mut buffer = Vec::with_capacity(SCREEN_WIDTH * SCREEN_HEIGHT * 3);
        for &argb in gb.framebuffer() {
            let [_, r, g, b] = argb.to_be_bytes();
            buffer.extend_from_slice(&[r, g, b]);
        }
        std::fs::write(&out_path, &buffer).unwrap_or_else(|err| {
            eprintln!("Failed to write '{}': {err}", out_path.display());
            std::process::exit(1);
        });
        println!(
            "Wrote {} bytes ({}x{} rgb24) after {} frames to '{}'",
            buffer.len(),
            SCREEN_WIDTH,
            SCREEN_HEIGHT,
            frames,
            out_path.display()
        );
    }

    let serial = gb.serial_output();
    if !serial.is_empty() {
        println!("{}", String::from_utf8_lossy(serial));
    }

    if let Err(err) = gb.close() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}
