use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};
use std::sync::Arc;

use sdl2::audio::{AudioCallback, AudioDevice, AudioSpecDesired};

use chip8_core::Host;

const TONE_HZ: f32 = 440.0;
const VOLUME: f32 = 0.25;

/// # SdlHost
/// Keypad and speaker state written by the SDL event loop and read by the machine's threads.
///
/// Held keys are a 16 bit mask; when several are down the lowest one is reported.
#[derive(Debug, Default)]
pub struct SdlHost {
    keys: AtomicU16,
    tone: Arc<AtomicBool>,
}

impl SdlHost {
    pub fn press(&self, key: u8) {
        self.keys.fetch_or(1 << key, Ordering::SeqCst);
    }

    pub fn release(&self, key: u8) {
        self.keys.fetch_and(!(1 << key), Ordering::SeqCst);
    }

    /// Opens a square wave playback device gated by the tone flag.
    /// The device must be kept alive on the SDL thread for as long as sound is wanted.
    pub fn open_audio(&self, sdl: &sdl2::Sdl) -> Result<AudioDevice<SquareWave>, String> {
        let audio = sdl.audio()?;
        let desired = AudioSpecDesired {
            freq: Some(44_100),
            channels: Some(1),
            samples: None,
        };
        let tone = self.tone.clone();
        let device = audio.open_playback(None, &desired, |spec| SquareWave {
            phase_inc: TONE_HZ / spec.freq as f32,
            phase: 0.0,
            tone,
        })?;
        device.resume();
        Ok(device)
    }
}

impl Host for SdlHost {
    fn key(&self) -> Option<u8> {
        match self.keys.load(Ordering::SeqCst) {
            0 => None,
            keys => Some(keys.trailing_zeros() as u8),
        }
    }

    fn start_tone(&self) {
        self.tone.store(true, Ordering::SeqCst);
    }

    fn stop_tone(&self) {
        self.tone.store(false, Ordering::SeqCst);
    }
}

pub struct SquareWave {
    phase_inc: f32,
    phase: f32,
    tone: Arc<AtomicBool>,
}

impl AudioCallback for SquareWave {
    type Channel = f32;

    fn callback(&mut self, out: &mut [f32]) {
        let on = self.tone.load(Ordering::Relaxed);
        for sample in out.iter_mut() {
            *sample = match (on, self.phase <= 0.5) {
                (false, _) => 0.0,
                (true, true) => VOLUME,
                (true, false) => -VOLUME,
            };
            self.phase = (self.phase + self.phase_inc) % 1.0;
        }
    }
}
