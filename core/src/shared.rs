use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::constants::{CYCLE_FREQUENCY, DISPLAY_SIZE};
use crate::error::Fault;
use crate::state::FrameBuffer;

/// Lifecycle of a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Stopped,
    Running,
    Paused,
}

/// Fields read or written by more than one thread.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SharedState {
    pub run_state: RunState,
    pub delay_timer: u8,
    pub sound_timer: u8,
    pub frame_buffer: FrameBuffer,
    pub cycle_frequency: u32,
    /// What ended the most recent run, if it didn't end by request.
    pub fault: Option<Fault>,
}

impl SharedState {
    fn new(cycle_frequency: u32) -> Self {
        SharedState {
            run_state: RunState::Stopped,
            delay_timer: 0,
            sound_timer: 0,
            frame_buffer: [0; DISPLAY_SIZE],
            cycle_frequency,
            fault: None,
        }
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new(CYCLE_FREQUENCY)
    }
}

/// # Shared
/// One lock around the cross-thread fields plus a condition variable the clocks park on.
///
/// Each accessor holds the lock for that access only, so two calls are never atomic together;
/// use `snapshot` when a consistent view of several fields is needed.
#[derive(Debug, Default)]
pub struct Shared {
    inner: Mutex<SharedState>,
    signal: Condvar,
}

impl Shared {
    pub fn new(cycle_frequency: u32) -> Self {
        Shared {
            inner: Mutex::new(SharedState::new(cycle_frequency)),
            signal: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SharedState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copies every shared field out under a single acquisition.
    pub fn snapshot(&self) -> SharedState {
        *self.lock()
    }

    pub fn run_state(&self) -> RunState {
        self.lock().run_state
    }

    pub fn is_running(&self) -> bool {
        self.run_state() == RunState::Running
    }

    /// Changes the run state and wakes every clock parked in `park`.
    pub fn set_run_state(&self, run_state: RunState) {
        self.lock().run_state = run_state;
        self.signal.notify_all();
    }

    /// Stops the run because of `fault`, keeping the fault for `fault()`.
    pub fn fail(&self, fault: Fault) {
        {
            let mut shared = self.lock();
            shared.run_state = RunState::Stopped;
            shared.fault = Some(fault);
        }
        self.signal.notify_all();
    }

    pub fn fault(&self) -> Option<Fault> {
        self.lock().fault
    }

    pub fn clear_fault(&self) {
        self.lock().fault = None;
    }

    /// Wakes parked clocks without changing anything, e.g. to service a command.
    pub fn notify(&self) {
        self.signal.notify_all();
    }

    /// Blocks the calling thread for at most `timeout`, returning early on any notification.
    pub fn park(&self, timeout: Duration) {
        let guard = self.lock();
        let _ = self
            .signal
            .wait_timeout(guard, timeout)
            .unwrap_or_else(PoisonError::into_inner);
    }

    pub fn delay_timer(&self) -> u8 {
        self.lock().delay_timer
    }

    pub fn set_delay_timer(&self, value: u8) {
        self.lock().delay_timer = value;
    }

    pub fn sound_timer(&self) -> u8 {
        self.lock().sound_timer
    }

    pub fn set_sound_timer(&self, value: u8) {
        self.lock().sound_timer = value;
    }

    pub fn cycle_frequency(&self) -> u32 {
        self.lock().cycle_frequency
    }

    pub fn set_cycle_frequency(&self, hz: u32) {
        self.lock().cycle_frequency = hz.max(1);
    }

    /// A copy of the current frame.
    pub fn frame_buffer(&self) -> FrameBuffer {
        self.lock().frame_buffer
    }

    /// Runs `f` against the frame buffer with the lock held for the whole call.
    pub fn with_frame_buffer<R>(&self, f: impl FnOnce(&mut FrameBuffer) -> R) -> R {
        f(&mut self.lock().frame_buffer)
    }

    /// Advances the 60Hz timers by one tick.
    /// Returns true when the sound timer reached zero on this tick.
    pub fn tick_timers(&self) -> bool {
        let mut shared = self.lock();
        if shared.delay_timer > 0 {
            shared.delay_timer -= 1;
        }
        if shared.sound_timer > 0 {
            shared.sound_timer -= 1;
            return shared.sound_timer == 0;
        }
        false
    }

    /// Overwrites the machine-visible fields; run state and cycle rate are left alone.
    pub fn restore(&self, delay_timer: u8, sound_timer: u8, frame_buffer: &FrameBuffer) {
        let mut shared = self.lock();
        shared.delay_timer = delay_timer;
        shared.sound_timer = sound_timer;
        shared.frame_buffer = *frame_buffer;
    }

    /// Zeroes timers and frame buffer for a fresh run.
    pub fn reset(&self) {
        self.restore(0, 0, &[0; DISPLAY_SIZE]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_timer_decays_to_zero_and_stays() {
        let shared = Shared::default();
        shared.set_delay_timer(5);
        for _ in 0..5 {
            shared.tick_timers();
        }
        assert_eq!(shared.delay_timer(), 0);
        for _ in 0..3 {
            shared.tick_timers();
        }
        assert_eq!(shared.delay_timer(), 0);
    }

    #[test]
    fn test_sound_timer_reports_zero_exactly_once() {
        for n in 1..=10u8 {
            let shared = Shared::default();
            shared.set_sound_timer(n);
            let stops: Vec<usize> = (1..=usize::from(n) + 5)
                .filter(|_| shared.tick_timers())
                .collect();
            assert_eq!(stops, vec![usize::from(n)]);
        }
    }

    #[test]
    fn test_idle_sound_timer_never_reports() {
        let shared = Shared::default();
        assert!(!shared.tick_timers());
        assert_eq!(shared.sound_timer(), 0);
    }

    #[test]
    fn test_timers_tick_independently() {
        let shared = Shared::default();
        shared.set_delay_timer(1);
        shared.set_sound_timer(3);
        shared.tick_timers();
        assert_eq!((shared.delay_timer(), shared.sound_timer()), (0, 2));
    }

    #[test]
    fn test_reset_clears_machine_fields_only() {
        let shared = Shared::new(900);
        shared.set_run_state(RunState::Paused);
        shared.set_delay_timer(7);
        shared.with_frame_buffer(|frame| frame[10] = 1);
        shared.reset();

        let snapshot = shared.snapshot();
        assert_eq!(snapshot.delay_timer, 0);
        assert!(snapshot.frame_buffer.iter().all(|&p| p == 0));
        assert_eq!(snapshot.run_state, RunState::Paused);
        assert_eq!(snapshot.cycle_frequency, 900);
    }

    #[test]
    fn test_fail_stops_and_records() {
        let shared = Shared::default();
        shared.set_run_state(RunState::Running);
        shared.fail(Fault::StackOverflow { pc: 0x204 });
        assert_eq!(shared.run_state(), RunState::Stopped);
        assert_eq!(shared.fault(), Some(Fault::StackOverflow { pc: 0x204 }));
        shared.clear_fault();
        assert_eq!(shared.fault(), None);
    }

    #[test]
    fn test_park_times_out() {
        let shared = Shared::default();
        let start = std::time::Instant::now();
        shared.park(Duration::from_millis(5));
        assert!(start.elapsed() < Duration::from_secs(5));
    }
}
