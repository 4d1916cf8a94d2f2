use std::time::Duration;

/// Single-shot timeout that can be suspended. Time spent paused does not
/// count towards expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    duration_ns: u64,
    consumed_ns: u64,
    running_since: Option<u64>,
}

impl Countdown {
    pub fn start(now_ns: u64, duration: Duration) -> Self {
        Self {
            duration_ns: duration.as_nanos() as u64,
            consumed_ns: 0,
            running_since: Some(now_ns),
        }
    }

    pub fn pause(&mut self, now_ns: u64) {
        if let Some(since) = self.running_since.take() {
            self.consumed_ns += now_ns.saturating_sub(since);
        }
    }

    pub fn resume(&mut self, now_ns: u64) {
        if self.running_since.is_none() {
            self.running_since = Some(now_ns);
        }
    }

    pub fn is_paused(&self) -> bool {
        self.running_since.is_none()
    }

    fn consumed(&self, now_ns: u64) -> u64 {
        self.consumed_ns
            + self
                .running_since
                .map_or(0, |since| now_ns.saturating_sub(since))
    }

    pub fn remaining(&self, now_ns: u64) -> Duration {
        Duration::from_nanos(self.duration_ns.saturating_sub(self.consumed(now_ns)))
    }

    pub fn is_expired(&self, now_ns: u64) -> bool {
        self.consumed(now_ns) >= self.duration_ns
    }
}

/// Accumulates running time across pauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stopwatch {
    accumulated_ns: u64,
    running_since: Option<u64>,
}

impl Stopwatch {
    pub fn started(now_ns: u64) -> Self {
        Self {
            accumulated_ns: 0,
            running_since: Some(now_ns),
        }
    }

    pub fn pause(&mut self, now_ns: u64) {
        if let Some(since) = self.running_since.take() {
            self.accumulated_ns += now_ns.saturating_sub(since);
        }
    }

    pub fn resume(&mut self, now_ns: u64) {
        if self.running_since.is_none() {
            self.running_since = Some(now_ns);
        }
    }

    pub fn elapsed(&self, now_ns: u64) -> Duration {
        let running = self
            .running_since
            .map_or(0, |since| now_ns.saturating_sub(since));
        Duration::from_nanos(self.accumulated_ns + running)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: u64 = 1_000_000;

    #[test]
    fn countdown_expires_after_duration() {
        let c = Countdown::start(0, Duration::from_millis(500));
        assert!(!c.is_expired(499 * MS));
        assert!(c.is_expired(500 * MS));
    }

    #[test]
    fn paused_countdown_does_not_expire() {
        let mut c = Countdown::start(0, Duration::from_millis(500));
        c.pause(200 * MS);
        assert!(!c.is_expired(10_000 * MS));
        assert_eq!(c.remaining(10_000 * MS), Duration::from_millis(300));
        c.resume(10_000 * MS);
        assert!(!c.is_expired(10_299 * MS));
        assert!(c.is_expired(10_300 * MS));
    }

    #[test]
    fn stopwatch_excludes_paused_time() {
        let mut s = Stopwatch::started(0);
        s.pause(1_000 * MS);
        s.resume(5_000 * MS);
        assert_eq!(s.elapsed(5_500 * MS), Duration::from_millis(1_500));
    }

    #[test]
    fn double_pause_is_harmless() {
        let mut s = Stopwatch::started(0);
        s.pause(10 * MS);
        s.pause(20 * MS);
        s.resume(30 * MS);
        s.resume(40 * MS);
        assert_eq!(s.elapsed(50 * MS), Duration::from_millis(30));
    }
}
