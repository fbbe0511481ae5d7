use std::error::Error;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{error, info, warn};
use sdl2::event::Event;

use chip8_core::{Config, Machine, RunState};
use display::Display;

use crate::host::SdlHost;
use crate::keymap::{control, keymap, Control};

/// How often the window is redrawn.
const FRAME_TIME: Duration = Duration::from_micros(16_667);

/// Cycle rate change per press of `+` or `-`.
const CYCLE_STEP: u32 = 100;

pub fn run(rom: Vec<u8>, config: Config) -> Result<(), Box<dyn Error>> {
    let host = Arc::new(SdlHost::default());
    let mut machine = Machine::new(config, host.clone());

    // Get SDL2 context
    let sdl: sdl2::Sdl = sdl2::init()?;
    let mut display: Display = Display::new(&sdl, "Emu-8")?;
    let mut events = sdl.event_pump()?;
    let _audio = match host.open_audio(&sdl) {
        Ok(device) => Some(device),
        Err(e) => {
            warn!("no audio: {}", e);
            None
        }
    };

    info!("F5/F9 save and load {}", machine.config().state_path.display());
    machine.reset(&rom)?;
    let mut title = String::new();

    'event: loop {
        let frame_start = Instant::now();

        for event in events.poll_iter() {
            match event {
                Event::Quit { .. } => break 'event,
                Event::KeyDown {
                    keycode: Some(key),
                    repeat: false,
                    ..
                } => match (keymap(key), control(key)) {
                    (Some(kc), _) => host.press(kc),
                    (_, Some(Control::Quit)) => break 'event,
                    (_, Some(action)) => handle(&mut machine, &rom, action),
                    _ => continue,
                },
                Event::KeyUp {
                    keycode: Some(key), ..
                } => {
                    if let Some(kc) = keymap(key) {
                        host.release(kc);
                    }
                }
                _ => continue,
            };
        }

        display.render(&machine.frame_buffer())?;

        let status = format!(
            "Emu-8 [{:?} @ {}Hz]",
            machine.run_state(),
            machine.cycle_frequency()
        );
        if status != title {
            display.set_title(&status)?;
            title = status;
        }

        let elapsed = frame_start.elapsed();
        if FRAME_TIME > elapsed {
            std::thread::sleep(FRAME_TIME - elapsed);
        }
    }

    machine.stop()?;
    Ok(())
}

/// Applies a control key. Failures are logged; the window stays open.
fn handle(machine: &mut Machine, rom: &[u8], action: Control) {
    let result = match action {
        Control::TogglePause => {
            match machine.run_state() {
                RunState::Running => machine.pause(),
                RunState::Paused => machine.unpause(),
                RunState::Stopped => info!("machine is stopped; reset to run again"),
            }
            Ok(())
        }
        Control::Save => machine.save_state(),
        Control::Load => {
            let resume = machine.run_state() == RunState::Running;
            machine.pause();
            let result = machine.load_state();
            if resume {
                machine.unpause();
            }
            result
        }
        Control::Reset => machine.reset(rom),
        Control::Faster => {
            machine.set_cycle_frequency(machine.cycle_frequency().saturating_add(CYCLE_STEP));
            Ok(())
        }
        Control::Slower => {
            let hz = machine.cycle_frequency().saturating_sub(CYCLE_STEP).max(CYCLE_STEP);
            machine.set_cycle_frequency(hz);
            Ok(())
        }
        Control::Quit => Ok(()),
    };
    if let Err(e) = result {
        error!("{:?} failed: {}", action, e);
    }
}
