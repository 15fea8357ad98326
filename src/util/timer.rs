use serde::{Deserialize, Serialize};

/// One-shot countdown driven by simulation ticks.
///
/// Used for cosmetic delays (tank shrink before removal, score popup) that
/// must never block a tick. Restarting an armed countdown replaces it.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Countdown {
    remaining: Option<f32>,
}

impl Countdown {
    pub const fn idle() -> Self {
        Self { remaining: None }
    }

    /// Arm (or re-arm) the countdown
    pub fn start(&mut self, duration: f32) {
        self.remaining = Some(duration.max(0.0));
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.remaining.is_some()
    }

    pub fn remaining(&self) -> Option<f32> {
        self.remaining
    }

    /// Advance by `dt`. Returns true exactly once, on the tick the countdown expires.
    pub fn tick(&mut self, dt: f32) -> bool {
        match self.remaining {
            Some(left) => {
                let left = left - dt;
                if left <= 0.0 {
                    self.remaining = None;
                    true
                } else {
                    self.remaining = Some(left);
                    false
                }
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_never_fires() {
        let mut timer = Countdown::idle();
        assert!(!timer.tick(100.0));
        assert!(!timer.is_running());
    }

    #[test]
    fn test_fires_once() {
        let mut timer = Countdown::idle();
        timer.start(1.0);
        assert!(!timer.tick(0.6));
        assert!(timer.tick(0.6));
        assert!(!timer.tick(0.6));
    }

    #[test]
    fn test_restart_replaces_remaining() {
        let mut timer = Countdown::idle();
        timer.start(1.0);
        timer.tick(0.9);
        timer.start(1.0);
        assert!(!timer.tick(0.5));
        assert_eq!(timer.remaining(), Some(0.5));
    }

    #[test]
    fn test_zero_duration_fires_on_next_tick() {
        let mut timer = Countdown::idle();
        timer.start(0.0);
        assert!(timer.tick(0.0));
    }
}
