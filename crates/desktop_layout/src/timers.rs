//! Cancellable deadline timers driven by an external millisecond clock.
//!
//! A [`Timer`] does not schedule anything by itself. Its owner polls it with the current time and
//! gets back how many times it fired. Timers live inside the interaction session that needs them,
//! so leaving a state drops (and thereby cancels) its timers.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timer {
    deadline_ms: u64,
    interval_ms: Option<u64>,
    active: bool,
}

impl Timer {
    /// Fires once, `delay_ms` after `now_ms`.
    pub fn one_shot(now_ms: u64, delay_ms: u64) -> Self {
        Self {
            deadline_ms: now_ms.saturating_add(delay_ms),
            interval_ms: None,
            active: true,
        }
    }

    /// Fires every `interval_ms`, first at `now_ms + interval_ms`.
    pub fn repeating(now_ms: u64, interval_ms: u64) -> Self {
        let interval_ms = interval_ms.max(1);
        Self {
            deadline_ms: now_ms.saturating_add(interval_ms),
            interval_ms: Some(interval_ms),
            active: true,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Next time the timer fires, if it is still armed.
    pub fn deadline_ms(&self) -> Option<u64> {
        self.active.then_some(self.deadline_ms)
    }

    pub fn cancel(&mut self) {
        self.active = false;
    }

    /// Returns how many times the timer fired up to and including `now_ms`.
    pub fn poll(&mut self, now_ms: u64) -> u32 {
        if !self.active || now_ms < self.deadline_ms {
            return 0;
        }
        match self.interval_ms {
            None => {
                self.active = false;
                1
            }
            Some(interval) => {
                let fires = (now_ms - self.deadline_ms) / interval + 1;
                self.deadline_ms = self.deadline_ms.saturating_add(fires * interval);
                u32::try_from(fires).unwrap_or(u32::MAX)
            }
        }
    }
}
