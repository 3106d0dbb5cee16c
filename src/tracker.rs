use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, trace};
use tokio::sync::Mutex;

use crate::draw_target::DrawTarget;
use crate::error::{ProgressError, ProgressResult};
use crate::state::{Frame, TrackerState};
use crate::style::TrackerStyle;

/// Default minimum wall-clock time between redraws.
const DEFAULT_MINIMUM_INTERVAL: Duration = Duration::from_millis(100);

/// A progress tracker for concurrent async tasks.
///
/// The tracker is an [`Arc`] around its internal state: cloning it just
/// increments the refcount, so one tracker can be handed to any number of
/// concurrent tasks. Updates are serialized by an async mutex, which means
/// interleaved callers can neither lose an increment nor sneak a redraw
/// through a throttle window another caller just consumed. The actual write
/// to the output surface happens after the lock is released, on a snapshot
/// of the state.
///
/// ```no_run
/// # async fn run() -> Result<(), taskline::ProgressError> {
/// use taskline::ProgressTracker;
///
/// let tracker = ProgressTracker::new(1000)?;
/// let mut tasks = tokio::task::JoinSet::new();
/// for _ in 0..1000 {
///     let tracker = tracker.clone();
///     tasks.spawn(async move { tracker.update().await });
/// }
/// while let Some(res) = tasks.join_next().await {
///     res.unwrap()?;
/// }
/// tracker.finish().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ProgressTracker {
    shared: Arc<Shared>,
}

struct Shared {
    state: Mutex<TrackerState>,
    target: DrawTarget,
    style: TrackerStyle,
    leave: bool,
    minimum_interval: Duration,
}

impl fmt::Debug for ProgressTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgressTracker").finish()
    }
}

impl ProgressTracker {
    /// Creates a tracker with the given target count and default settings,
    /// drawing to stderr.
    ///
    /// Fails with [`ProgressError::ZeroTotal`] when `total` is zero.
    pub fn new(total: u64) -> ProgressResult<ProgressTracker> {
        TrackerBuilder::new(total).build()
    }

    /// Creates a tracker with the given target count and draw target.
    pub fn with_draw_target(total: u64, target: DrawTarget) -> ProgressResult<ProgressTracker> {
        TrackerBuilder::new(total).draw_target(target).build()
    }

    /// Starts building a tracker with non-default settings.
    pub fn builder(total: u64) -> TrackerBuilder {
        TrackerBuilder::new(total)
    }

    /// Advances progress by one.
    ///
    /// See [`update_by`](ProgressTracker::update_by).
    pub async fn update(&self) -> ProgressResult<()> {
        self.update_by(1).await
    }

    /// Advances progress by `progress` and redraws if the throttle allows.
    ///
    /// The increment is clamped so the position never exceeds the total;
    /// overshoot from racing callers is expected and not an error. Negative
    /// increments fail with [`ProgressError::NegativeProgress`]. A frame is
    /// drawn when no frame has been drawn yet, when `minimum_interval` has
    /// passed since the last one, or when this call brings the position up
    /// to the total. After [`finish`](ProgressTracker::finish) this is a
    /// no-op.
    ///
    /// May suspend while another task holds the update lock.
    pub async fn update_by(&self, progress: i64) -> ProgressResult<()> {
        if progress < 0 {
            return Err(ProgressError::NegativeProgress(progress));
        }
        let frame = {
            let mut state = self.shared.state.lock().await;
            if state.finished {
                return Ok(());
            }
            let now = Instant::now();
            if state.started.is_none() {
                state.started = Some(now);
            }
            let reached_total = state.advance(progress as u64);
            if reached_total || state.throttle_allows(now, self.shared.minimum_interval) {
                Some(state.stamp(now))
            } else {
                None
            }
        };
        match frame {
            Some(frame) => Ok(self.shared.target.render(&self.shared.style, &frame)?),
            None => Ok(()),
        }
    }

    /// Redraws the current state unconditionally, bypassing the throttle.
    pub async fn draw(&self) -> ProgressResult<()> {
        let frame = {
            let mut state = self.shared.state.lock().await;
            state.stamp(Instant::now())
        };
        self.shared.target.render(&self.shared.style, &frame)?;
        Ok(())
    }

    /// Finishes the run.
    ///
    /// Forces the position to the total and draws one final frame
    /// regardless of throttling, so the 100% frame is never dropped. With
    /// `leave` disabled the rendered output is then removed; otherwise the
    /// final frame stays visible and the terminal cursor moves to a fresh
    /// line. Calling `finish` again is a no-op.
    pub async fn finish(&self) -> ProgressResult<()> {
        let frame = {
            let mut state = self.shared.state.lock().await;
            if state.finished {
                return Ok(());
            }
            let now = Instant::now();
            state.current = state.total;
            state.finished = true;
            state.stamp(now)
        };
        trace!("drawing final frame at {}/{}", frame.position(), frame.total());
        self.shared.target.render(&self.shared.style, &frame)?;
        if self.shared.leave {
            self.shared.target.leave()?;
        } else {
            self.shared.target.clear()?;
        }
        Ok(())
    }

    /// Resets the tracker for a fresh run with the same total.
    ///
    /// Counters, the finished flag, and all timers go back to their initial
    /// values; the next update draws immediately. Must not be called while
    /// updates from the previous run are still in flight — the tracker
    /// cannot tell a late old increment from an early new one.
    pub async fn reset(&self) {
        let mut state = self.shared.state.lock().await;
        let total = state.total;
        state.reinit(total);
    }

    /// Resets the tracker for a fresh run with a new total.
    ///
    /// Fails with [`ProgressError::ZeroTotal`] when `total` is zero, in
    /// which case nothing is changed.
    pub async fn reset_with_total(&self, total: u64) -> ProgressResult<()> {
        if total == 0 {
            return Err(ProgressError::ZeroTotal);
        }
        let mut state = self.shared.state.lock().await;
        state.reinit(total);
        Ok(())
    }

    /// Returns the current position.
    pub async fn position(&self) -> u64 {
        self.shared.state.lock().await.current
    }

    /// Returns the target count.
    pub async fn total(&self) -> u64 {
        self.shared.state.lock().await.total
    }

    /// Indicates whether the tracker finished.
    pub async fn is_finished(&self) -> bool {
        self.shared.state.lock().await.finished
    }

    /// Takes a read-only snapshot of the current state.
    ///
    /// Does not draw and does not count as a draw for the throttle.
    pub async fn snapshot(&self) -> Frame {
        self.shared.state.lock().await.snapshot(Instant::now())
    }
}

/// Builder for trackers with non-default configuration.
///
/// ```no_run
/// # fn run() -> Result<(), taskline::ProgressError> {
/// use std::time::Duration;
/// use taskline::ProgressTracker;
///
/// let tracker = ProgressTracker::builder(500)
///     .prefix("fetch")
///     .suffix("pages")
///     .leave(false)
///     .minimum_interval(Duration::from_millis(250))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct TrackerBuilder {
    total: u64,
    style: TrackerStyle,
    leave: bool,
    minimum_interval: Duration,
    target: Option<DrawTarget>,
}

impl TrackerBuilder {
    /// Starts a builder for a tracker with the given target count.
    pub fn new(total: u64) -> TrackerBuilder {
        TrackerBuilder {
            total,
            style: TrackerStyle::default(),
            leave: true,
            minimum_interval: DEFAULT_MINIMUM_INTERVAL,
            target: None,
        }
    }

    /// Sets the text shown before the bar.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.style = self.style.prefix(prefix);
        self
    }

    /// Sets the text shown after the statistics.
    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.style = self.style.suffix(suffix);
        self
    }

    /// Sets the fill character for the bar.
    pub fn fill(mut self, fill: char) -> Self {
        self.style = self.style.fill(fill);
        self
    }

    /// Replaces the whole display style.
    pub fn style(mut self, style: TrackerStyle) -> Self {
        self.style = style;
        self
    }

    /// Whether the final frame stays visible after the run (default true).
    pub fn leave(mut self, leave: bool) -> Self {
        self.leave = leave;
        self
    }

    /// Sets the minimum wall-clock time between redraws (default 100 ms).
    pub fn minimum_interval(mut self, minimum_interval: Duration) -> Self {
        self.minimum_interval = minimum_interval;
        self
    }

    /// Sets the draw target (default: stderr).
    pub fn draw_target(mut self, target: DrawTarget) -> Self {
        self.target = Some(target);
        self
    }

    /// Builds the tracker.
    ///
    /// Fails with [`ProgressError::ZeroTotal`] when the total is zero.
    pub fn build(self) -> ProgressResult<ProgressTracker> {
        if self.total == 0 {
            return Err(ProgressError::ZeroTotal);
        }
        let target = self.target.unwrap_or_else(DrawTarget::stderr);
        debug!(
            "tracker created: total={}, target={}, minimum_interval={:?}",
            self.total,
            target.kind_name(),
            self.minimum_interval
        );
        Ok(ProgressTracker {
            shared: Arc::new(Shared {
                state: Mutex::new(TrackerState::new(self.total)),
                target,
                style: self.style,
                leave: self.leave,
                minimum_interval: self.minimum_interval,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hidden(total: u64) -> ProgressTracker {
        ProgressTracker::with_draw_target(total, DrawTarget::hidden()).unwrap()
    }

    #[test]
    fn zero_total_is_rejected() {
        assert!(matches!(
            ProgressTracker::new(0),
            Err(ProgressError::ZeroTotal)
        ));
        assert!(matches!(
            TrackerBuilder::new(0).build(),
            Err(ProgressError::ZeroTotal)
        ));
    }

    #[tokio::test]
    async fn negative_progress_is_rejected() {
        let tracker = hidden(10);
        assert!(matches!(
            tracker.update_by(-1).await,
            Err(ProgressError::NegativeProgress(-1))
        ));
        // The failed call must not have touched the counter.
        assert_eq!(tracker.position().await, 0);
    }

    #[tokio::test]
    async fn overshoot_is_clamped() {
        let tracker = hidden(3);
        tracker.update_by(2).await.unwrap();
        tracker.update_by(5).await.unwrap();
        assert_eq!(tracker.position().await, 3);
    }

    #[tokio::test]
    async fn update_after_finish_is_a_noop() {
        let tracker = hidden(5);
        tracker.update().await.unwrap();
        tracker.finish().await.unwrap();
        assert_eq!(tracker.position().await, 5);

        tracker.update().await.unwrap();
        assert_eq!(tracker.position().await, 5);
        assert!(tracker.is_finished().await);
    }

    #[tokio::test]
    async fn finish_is_idempotent() {
        let tracker = hidden(2);
        tracker.finish().await.unwrap();
        tracker.finish().await.unwrap();
        assert!(tracker.is_finished().await);
        assert_eq!(tracker.position().await, 2);
    }

    #[tokio::test]
    async fn reset_reopens_the_run() {
        let tracker = hidden(4);
        tracker.update_by(4).await.unwrap();
        tracker.finish().await.unwrap();

        tracker.reset().await;
        assert_eq!(tracker.position().await, 0);
        assert!(!tracker.is_finished().await);

        tracker.update().await.unwrap();
        assert_eq!(tracker.position().await, 1);
    }

    #[tokio::test]
    async fn reset_with_total_validates() {
        let tracker = hidden(4);
        tracker.update_by(2).await.unwrap();
        assert!(matches!(
            tracker.reset_with_total(0).await,
            Err(ProgressError::ZeroTotal)
        ));
        // A rejected reset leaves the run untouched.
        assert_eq!(tracker.position().await, 2);
        assert_eq!(tracker.total().await, 4);

        tracker.reset_with_total(9).await.unwrap();
        assert_eq!(tracker.total().await, 9);
        assert_eq!(tracker.position().await, 0);
    }

    #[tokio::test]
    async fn snapshot_reflects_state() {
        let tracker = hidden(8);
        tracker.update_by(2).await.unwrap();
        let frame = tracker.snapshot().await;
        assert_eq!(frame.position(), 2);
        assert_eq!(frame.total(), 8);
        assert!(!frame.is_finished());
    }
}
