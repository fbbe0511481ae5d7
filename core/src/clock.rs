use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, error, info};

use crate::config::cycles_per_batch;
use crate::constants::TIMER_FREQUENCY;
use crate::cpu::{Cpu, Flow};
use crate::host::Host;
use crate::shared::{RunState, Shared};
use crate::snapshot::Snapshot;
use crate::state::State;

/// Longest a paused clock sleeps before looking at the run state again.
const IDLE_WAIT: Duration = Duration::from_millis(50);

/// Requests that need the interpreter-owned `State`, answered between instructions.
pub enum Command {
    Snapshot(Sender<Snapshot>),
    Restore(Box<Snapshot>, Sender<()>),
}

/// The instruction clock.
///
/// Runs batches of `cycle_frequency / batch_frequency` instructions and sleeps off whatever is
/// left of each `1 / batch_frequency` second slot. A batch that overruns its slot is not
/// made up for. Returns the state once the run state is `Stopped` or an instruction faults;
/// a fault is recorded in `Shared`.
pub fn run_interpreter(mut cpu: Cpu, commands: Receiver<Command>, batch_frequency: u32) -> State {
    let batch_frequency = batch_frequency.max(1);
    let batch_period = Duration::from_secs(1) / batch_frequency;
    info!("interpreter started at {:#05X}", cpu.state.pc);

    loop {
        service(&mut cpu, &commands);

        match cpu.shared.run_state() {
            RunState::Stopped => break,
            RunState::Paused => {
                cpu.shared.park(IDLE_WAIT);
                continue;
            }
            RunState::Running => {}
        }

        let started = Instant::now();
        let cycles = cycles_per_batch(cpu.shared.cycle_frequency(), batch_frequency);
        for _ in 0..cycles {
            match cpu.step() {
                Ok(Flow::Continue) => {}
                // the rest of the slot is spent waiting; FX0A runs again next batch
                Ok(Flow::AwaitingKey) => break,
                Err(fault) => {
                    error!("{}", fault);
                    cpu.shared.fail(fault);
                    return cpu.into_state();
                }
            }
        }

        let elapsed = started.elapsed();
        if elapsed > batch_period {
            debug!(
                "batch of {} took {:?}, {:?} over",
                cycles,
                elapsed,
                elapsed - batch_period
            );
        }
        wait_until(&cpu.shared, started + batch_period);
    }

    info!("interpreter stopped at {:#05X}", cpu.state.pc);
    cpu.into_state()
}

/// Sleeps on the condition variable until `deadline`, or until the machine leaves `Running`.
fn wait_until(shared: &Shared, deadline: Instant) {
    loop {
        let now = Instant::now();
        if now >= deadline || !shared.is_running() {
            return;
        }
        shared.park(deadline - now);
    }
}

fn service(cpu: &mut Cpu, commands: &Receiver<Command>) {
    loop {
        match commands.try_recv() {
            Ok(Command::Snapshot(reply)) => {
                let _ = reply.send(Snapshot::capture(&cpu.state, &cpu.shared));
            }
            Ok(Command::Restore(snapshot, done)) => {
                snapshot.apply(&mut cpu.state, &cpu.shared);
                debug!("state restored, pc {:#05X}", cpu.state.pc);
                let _ = done.send(());
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return,
        }
    }
}

/// The 60Hz timer clock.
///
/// Ticks are scheduled against deadlines so sleep jitter doesn't accumulate. While paused the
/// timers hold their values. Returns once the run state is `Stopped`.
pub fn run_timer(shared: Arc<Shared>, host: Arc<dyn Host>) {
    let period = Duration::from_secs(1) / TIMER_FREQUENCY;
    let mut deadline = Instant::now() + period;

    loop {
        match shared.run_state() {
            RunState::Stopped => break,
            RunState::Paused => {
                shared.park(IDLE_WAIT);
                deadline = Instant::now() + period;
                continue;
            }
            RunState::Running => {}
        }

        let now = Instant::now();
        if now < deadline {
            shared.park(deadline - now);
            continue;
        }

        if shared.tick_timers() {
            host.stop_tone();
        }
        deadline += period;
        if deadline < now {
            deadline = now + period;
        }
    }

    host.stop_tone();
}
