use std::time::{Duration, Instant};

/// The mutable state of a tracker, guarded by the tracker's async mutex.
///
/// Everything here is mutated synchronously while the guard is held; there is
/// no await point between reading and writing a field, so an increment is
/// either fully applied or not applied at all when the surrounding task is
/// cancelled.
pub(crate) struct TrackerState {
    pub(crate) current: u64,
    pub(crate) total: u64,
    /// `None` means no frame has been rendered yet for this run.
    pub(crate) last_draw: Option<Instant>,
    pub(crate) finished: bool,
    /// Set by the first update of a run.
    pub(crate) started: Option<Instant>,
    pub(crate) rate: RateEstimate,
}

impl TrackerState {
    pub(crate) fn new(total: u64) -> Self {
        Self {
            current: 0,
            total,
            last_draw: None,
            finished: false,
            started: None,
            rate: RateEstimate::default(),
        }
    }

    /// Applies a clamped increment. Returns `true` when this call moved
    /// `current` up to `total` (the arrival frame must never be throttled
    /// away; later clamped calls at `total` get no such exemption).
    pub(crate) fn advance(&mut self, delta: u64) -> bool {
        let before = self.current;
        self.current = self.current.saturating_add(delta).min(self.total);
        before < self.total && self.current == self.total
    }

    /// Whether the throttle permits a redraw at `now`.
    pub(crate) fn throttle_allows(&self, now: Instant, minimum_interval: Duration) -> bool {
        match self.last_draw {
            None => true,
            Some(at) => now.duration_since(at) >= minimum_interval,
        }
    }

    /// Records a draw at `now` and returns the frame to render.
    ///
    /// The timestamp is stamped under the same guard as the throttle check,
    /// so two interleaved updates cannot both pass the check for a window
    /// one of them just consumed.
    pub(crate) fn stamp(&mut self, now: Instant) -> Frame {
        self.last_draw = Some(now);
        self.rate.record(self.current, now);
        self.snapshot(now)
    }

    /// A read-only snapshot at `now`; does not count as a draw.
    pub(crate) fn snapshot(&self, now: Instant) -> Frame {
        Frame {
            current: self.current,
            total: self.total,
            elapsed: self.started.map(|at| now.duration_since(at)),
            per_sec: self.rate.per_sec(),
            finished: self.finished,
        }
    }

    /// Reinitializes for a fresh run with the given target count.
    pub(crate) fn reinit(&mut self, total: u64) {
        self.current = 0;
        self.total = total;
        self.last_draw = None;
        self.finished = false;
        self.started = None;
        self.rate = RateEstimate::default();
    }
}

/// One rendered snapshot of progress state.
///
/// Plain owned data, so rendering needs no access to the tracker's lock.
#[derive(Clone, Copy, Debug)]
pub struct Frame {
    current: u64,
    total: u64,
    elapsed: Option<Duration>,
    per_sec: f64,
    finished: bool,
}

impl Frame {
    /// Returns the current position.
    pub fn position(&self) -> u64 {
        self.current
    }

    /// Returns the target count.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Returns the completion as a float in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        (self.current as f64 / self.total as f64).clamp(0.0, 1.0)
    }

    /// Returns the completion percentage (0.0 to 100.0).
    pub fn percent(&self) -> f64 {
        self.fraction() * 100.0
    }

    /// Time since the first update of the run, if any update has happened.
    pub fn elapsed(&self) -> Option<Duration> {
        self.elapsed
    }

    /// Recent throughput in steps per second.
    pub fn per_sec(&self) -> f64 {
        self.per_sec
    }

    /// Whether the run was finished when the frame was taken.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Estimated time remaining, extrapolated from the recent rate.
    ///
    /// `None` if nothing has happened yet, the rate is unknown, or the run
    /// is already finished.
    pub fn eta(&self) -> Option<Duration> {
        if self.current == 0 || self.finished || self.per_sec <= 0.0 {
            return None;
        }
        let remaining = self.total.saturating_sub(self.current);
        Some(Duration::from_secs_f64(remaining as f64 / self.per_sec))
    }

    #[cfg(test)]
    pub(crate) fn for_test(
        current: u64,
        total: u64,
        elapsed: Option<Duration>,
        per_sec: f64,
        finished: bool,
    ) -> Self {
        Self {
            current,
            total,
            elapsed,
            per_sec,
            finished,
        }
    }
}

/// Interval-based throughput estimator.
///
/// Each recorded draw measures steps-per-second over the stretch since the
/// previous draw, so the figure tracks recent speed rather than the lifetime
/// average.
#[derive(Default)]
pub(crate) struct RateEstimate {
    last_at: Option<Instant>,
    last_current: u64,
    per_sec: f64,
}

impl RateEstimate {
    pub(crate) fn record(&mut self, current: u64, now: Instant) {
        if let Some(at) = self.last_at {
            let secs = now.duration_since(at).as_secs_f64();
            if secs > 0.0 {
                self.per_sec = current.saturating_sub(self.last_current) as f64 / secs;
            }
        }
        self.last_at = Some(now);
        self.last_current = current;
    }

    pub(crate) fn per_sec(&self) -> f64 {
        self.per_sec
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_clamps_at_total() {
        let mut state = TrackerState::new(5);
        assert!(!state.advance(3));
        assert!(state.advance(10));
        assert_eq!(state.current, 5);

        // Already at total: clamped and not reported as an arrival.
        assert!(!state.advance(1));
        assert_eq!(state.current, 5);
    }

    #[test]
    fn throttle_first_draw_always_allowed() {
        let state = TrackerState::new(10);
        assert!(state.throttle_allows(Instant::now(), Duration::from_secs(3600)));
    }

    #[test]
    fn throttle_respects_interval() {
        let mut state = TrackerState::new(10);
        let t0 = Instant::now();
        state.stamp(t0);
        let interval = Duration::from_millis(100);
        assert!(!state.throttle_allows(t0 + Duration::from_millis(10), interval));
        assert!(state.throttle_allows(t0 + Duration::from_millis(100), interval));
    }

    #[allow(clippy::float_cmp)]
    #[test]
    fn fraction_and_percent() {
        let frame = Frame::for_test(1, 4, None, 0.0, false);
        assert_eq!(frame.fraction(), 0.25);
        assert_eq!(frame.percent(), 25.0);
    }

    #[test]
    fn eta_boundaries() {
        // No progress yet.
        assert!(Frame::for_test(0, 10, None, 0.0, false).eta().is_none());
        // Finished runs have nothing remaining.
        assert!(Frame::for_test(10, 10, None, 5.0, true).eta().is_none());
        // Steady rate extrapolates linearly.
        let eta = Frame::for_test(5, 10, None, 5.0, false).eta().unwrap();
        assert_eq!(eta, Duration::from_secs(1));
    }

    #[test]
    fn rate_tracks_recent_interval() {
        let mut rate = RateEstimate::default();
        let t0 = Instant::now();
        rate.record(0, t0);
        rate.record(50, t0 + Duration::from_secs(1));
        assert!((rate.per_sec() - 50.0).abs() < 1e-9);

        // A slower second interval replaces, not averages, the estimate.
        rate.record(60, t0 + Duration::from_secs(3));
        assert!((rate.per_sec() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn reinit_restores_sentinels() {
        let mut state = TrackerState::new(3);
        state.advance(3);
        state.finished = true;
        state.started = Some(Instant::now());
        state.stamp(Instant::now());

        state.reinit(7);
        assert_eq!(state.current, 0);
        assert_eq!(state.total, 7);
        assert!(state.last_draw.is_none());
        assert!(!state.finished);
        assert!(state.started.is_none());
    }
}
