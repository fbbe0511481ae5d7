use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::mem;
use std::sync::mpsc::{channel, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{error, info, warn};

use crate::clock::{run_interpreter, run_timer, Command};
use crate::config::Config;
use crate::cpu::Cpu;
use crate::error::{Fault, MachineError, Result};
use crate::host::Host;
use crate::shared::{RunState, Shared};
use crate::snapshot::Snapshot;
use crate::state::{FrameBuffer, State};

/// The two threads behind a live run.
struct Run {
    commands: Sender<Command>,
    interpreter: JoinHandle<State>,
    timer: JoinHandle<()>,
}

/// # Machine
/// The control surface: owns the interpreter and timer threads and everything shared with them.
///
/// While a run is alive the `State` belongs to the interpreter thread; requests that need it
/// go over a channel. Between runs the `State` is parked here.
pub struct Machine {
    config: Config,
    host: Arc<dyn Host>,
    shared: Arc<Shared>,
    run: Option<Run>,
    parked: State,
    /// A fault from a joined run that no `stop` or `reset` has reported yet.
    unreported: Option<Fault>,
}

impl Machine {
    pub fn new(config: Config, host: Arc<dyn Host>) -> Self {
        let shared = Arc::new(Shared::new(config.cycle_frequency));
        Machine {
            config,
            host,
            shared,
            run: None,
            parked: State::new(),
            unreported: None,
        }
    }

    /// Ends any current run, loads `rom` into a fresh machine and starts running it.
    /// An oversized ROM is rejected before anything is touched.
    pub fn reset(&mut self, rom: &[u8]) -> Result<()> {
        let state = State::with_rom(rom)?;
        if let Err(e) = self.halt() {
            warn!("discarding previous run: {}", e);
        }
        if let Some(fault) = self.unreported.take() {
            error!("previous run ended with: {}", fault);
        }

        self.parked = state;
        self.shared.reset();
        info!("loaded {} byte ROM", rom.len());
        self.start()
    }

    /// Starts the clocks from wherever the machine was left. Does nothing if a run is alive.
    pub fn start(&mut self) -> Result<()> {
        if self.run.is_some() {
            if self.shared.run_state() != RunState::Stopped {
                return Ok(());
            }
            self.halt()?;
        }

        self.shared.clear_fault();
        self.shared.set_run_state(RunState::Running);

        let (commands, receiver) = channel();
        let cpu = Cpu::new(
            mem::take(&mut self.parked),
            self.shared.clone(),
            self.host.clone(),
        );
        let batch_frequency = self.config.batch_frequency;
        let interpreter = thread::Builder::new()
            .name("chip8-interpreter".to_string())
            .spawn(move || run_interpreter(cpu, receiver, batch_frequency));
        let interpreter = match interpreter {
            Ok(handle) => handle,
            Err(e) => {
                self.shared.set_run_state(RunState::Stopped);
                return Err(e.into());
            }
        };

        let shared = self.shared.clone();
        let host = self.host.clone();
        let timer = thread::Builder::new()
            .name("chip8-timer".to_string())
            .spawn(move || run_timer(shared, host));
        let timer = match timer {
            Ok(handle) => handle,
            Err(e) => {
                self.shared.set_run_state(RunState::Stopped);
                if let Ok(state) = interpreter.join() {
                    self.parked = state;
                }
                return Err(e.into());
            }
        };

        self.run = Some(Run {
            commands,
            interpreter,
            timer,
        });
        self.sync_tone();
        info!("running at {}Hz", self.shared.cycle_frequency());
        Ok(())
    }

    /// Running -> Paused. Both clocks hold still until `unpause`.
    pub fn pause(&self) {
        if self.shared.run_state() == RunState::Running {
            self.shared.set_run_state(RunState::Paused);
            info!("paused");
        }
    }

    /// Paused -> Running.
    pub fn unpause(&self) {
        if self.shared.run_state() == RunState::Paused {
            self.shared.set_run_state(RunState::Running);
            info!("unpaused");
        }
    }

    /// Stops the run and joins both threads.
    /// Returns the fault that ended the run, if one did and it hasn't been reported yet.
    pub fn stop(&mut self) -> Result<()> {
        self.halt()?;
        match self.unreported.take() {
            Some(fault) => Err(fault.into()),
            None => Ok(()),
        }
    }

    /// Sets `Stopped`, wakes both clocks and joins them, parking the interpreter's state.
    fn halt(&mut self) -> Result<()> {
        self.shared.set_run_state(RunState::Stopped);
        let run = match self.run.take() {
            Some(run) => run,
            None => return Ok(()),
        };
        drop(run.commands);

        let interpreter = run.interpreter.join();
        if run.timer.join().is_err() {
            warn!("timer thread panicked");
        }
        match interpreter {
            Ok(state) => self.parked = state,
            Err(_) => {
                error!("interpreter thread panicked, state lost");
                self.parked = State::new();
                return Err(MachineError::Disconnected);
            }
        }

        if let Some(fault) = self.shared.fault() {
            self.unreported = Some(fault);
        }
        info!("stopped");
        Ok(())
    }

    /// A consistent copy of the whole machine, taken between instructions.
    pub fn snapshot(&mut self) -> Result<Snapshot> {
        if let Some(run) = &self.run {
            let (reply, answer) = channel();
            if run.commands.send(Command::Snapshot(reply)).is_ok() {
                self.shared.notify();
                if let Ok(snapshot) = answer.recv() {
                    return Ok(snapshot);
                }
            }
            // the interpreter ended on its own; collect its state
            self.halt()?;
        }
        Ok(Snapshot::capture(&self.parked, &self.shared))
    }

    /// Overwrites the whole machine. Refused with `Busy` while running.
    pub fn restore(&mut self, snapshot: Snapshot) -> Result<()> {
        if self.shared.run_state() == RunState::Running {
            return Err(MachineError::Busy);
        }
        if let Some(run) = &self.run {
            let (done, finished) = channel();
            let command = Command::Restore(Box::new(snapshot.clone()), done);
            if run.commands.send(command).is_ok() {
                self.shared.notify();
                if finished.recv().is_ok() {
                    self.sync_tone();
                    return Ok(());
                }
            }
            self.halt()?;
        }
        snapshot.apply(&mut self.parked, &self.shared);
        self.sync_tone();
        Ok(())
    }

    /// Brings the host's tone in line with the sound timer.
    /// Without a run there is no timer clock to end a tone, so it stays off.
    fn sync_tone(&self) {
        if self.run.is_some() && self.shared.sound_timer() > 0 {
            self.host.start_tone();
        } else {
            self.host.stop_tone();
        }
    }

    /// Writes a snapshot to the configured state file.
    pub fn save_state(&mut self) -> Result<()> {
        let snapshot = self.snapshot()?;
        let mut writer = BufWriter::new(File::create(&self.config.state_path)?);
        snapshot.write_to(&mut writer)?;
        writer.flush()?;
        info!("saved state to {}", self.config.state_path.display());
        Ok(())
    }

    /// Restores the snapshot in the configured state file. Refused with `Busy` while running.
    pub fn load_state(&mut self) -> Result<()> {
        if self.shared.run_state() == RunState::Running {
            return Err(MachineError::Busy);
        }
        let mut reader = BufReader::new(File::open(&self.config.state_path)?);
        let snapshot = Snapshot::read_from(&mut reader)?;
        self.restore(snapshot)?;
        info!("loaded state from {}", self.config.state_path.display());
        Ok(())
    }

    pub fn frame_buffer(&self) -> FrameBuffer {
        self.shared.frame_buffer()
    }

    /// Takes effect at the next batch.
    pub fn set_cycle_frequency(&self, hz: u32) {
        self.shared.set_cycle_frequency(hz);
        info!("cycle frequency {}Hz", self.shared.cycle_frequency());
    }

    pub fn cycle_frequency(&self) -> u32 {
        self.shared.cycle_frequency()
    }

    pub fn run_state(&self) -> RunState {
        self.shared.run_state()
    }

    /// The fault that ended the most recent run, if any.
    pub fn last_fault(&self) -> Option<Fault> {
        self.shared.fault()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl Drop for Machine {
    fn drop(&mut self) {
        if let Err(e) = self.halt() {
            error!("{}", e);
        }
    }
}
