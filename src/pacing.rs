use std::thread;
use std::time::Duration;

pub const DEFAULT_DELAY_MS: u64 = 500;

/// Decides how long the pipeline waits between upstream requests.
pub trait Pacer {
    fn pause(&self);
}

impl<T: Pacer + ?Sized> Pacer for &T {
    fn pause(&self) {
        (**self).pause()
    }
}

/// Sleeps the same amount after every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDelay {
    delay: Duration,
}

impl FixedDelay {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for FixedDelay {
    fn default() -> Self {
        Self::from_millis(DEFAULT_DELAY_MS)
    }
}

impl Pacer for FixedDelay {
    fn pause(&self) {
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
    }
}
