/// # Host
/// Capabilities the interpreter borrows from whatever is embedding it.
///
/// The interpreter thread calls `key` and `start_tone`; the timer thread calls `stop_tone`,
/// so implementations must be shareable across threads.
pub trait Host: Send + Sync {
    /// The key currently held on the hex keypad, if any.
    /// Values outside `0x0..=0xF` are treated as no key.
    fn key(&self) -> Option<u8>;

    /// The sound timer was loaded with a nonzero value.
    fn start_tone(&self);

    /// The sound timer ran down to zero.
    fn stop_tone(&self);
}

/// A host with no keypad and no speaker.
#[derive(Clone, Copy, Debug, Default)]
pub struct Headless;

impl Host for Headless {
    fn key(&self) -> Option<u8> {
        None
    }

    fn start_tone(&self) {}

    fn stop_tone(&self) {}
}
