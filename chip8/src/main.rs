use std::error::Error;
use std::fs;

use log::info;

use chip8_core::Config;

mod host;
mod keymap;
mod run;

const USAGE: &str = "usage: chip8 <rom> [cycles-per-second]";

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let rom_path = args.next().ok_or(USAGE)?;
    let mut config = Config::default();
    if let Some(hz) = args.next() {
        let hz: u32 = hz.parse().map_err(|_| USAGE)?;
        config = config.with_cycle_frequency(hz);
    }

    let rom = fs::read(&rom_path)?;
    info!("read {} ({} bytes)", rom_path, rom.len());
    run::run(rom, config)
}
