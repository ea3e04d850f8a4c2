//! Frame-driven animation scheduler.
//!
//! The scheduler is a small `Idle -> Running -> Idle` state machine. The host
//! owns the frame pump: it calls [`AnimationScheduler::start`] to begin a run,
//! then feeds each display frame back through [`AnimationScheduler::on_frame`]
//! with the [`FrameRequest`] it was handed. Every request carries the run's
//! cancellation token, so a request still queued in the host after the run
//! was cancelled (or the scheduler dropped) is inert and can never reach
//! `draw` or `finish`.

use std::time::{Duration, Instant};

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::easing::EasingFunction;

/// Callbacks driven by the scheduler.
pub trait Animate {
    /// Value produced by each drawn frame.
    type Frame;

    /// Render the animation at eased `progress` in `[0, 1]`.
    fn draw(&mut self, progress: f64) -> Option<Self::Frame>;

    /// Called exactly once when a run completes, with the last draw result.
    fn finish(&mut self, _last: Option<Self::Frame>) {}
}

/// Adapter turning a pair of closures into an [`Animate`] implementation.
pub struct FnAnimation<D, E> {
    draw: D,
    end: E,
}

impl<T, D> FnAnimation<D, fn(Option<T>)>
where
    D: FnMut(f64) -> Option<T>,
{
    /// Animation with a draw callback and no end callback.
    pub fn new(draw: D) -> Self {
        Self {
            draw,
            end: |_| {},
        }
    }
}

impl<D, E> FnAnimation<D, E> {
    /// Replace the end callback.
    pub fn on_end<E2>(self, end: E2) -> FnAnimation<D, E2> {
        FnAnimation {
            draw: self.draw,
            end,
        }
    }
}

impl<T, D, E> Animate for FnAnimation<D, E>
where
    D: FnMut(f64) -> Option<T>,
    E: FnMut(Option<T>),
{
    type Frame = T;

    fn draw(&mut self, progress: f64) -> Option<T> {
        (self.draw)(progress)
    }

    fn finish(&mut self, last: Option<T>) {
        (self.end)(last)
    }
}

/// A pending "call me on the next frame" request handed to the host.
#[derive(Debug, Clone)]
pub struct FrameRequest {
    token: CancellationToken,
}

impl FrameRequest {
    /// Whether the run this request belongs to has ended or been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Result of feeding one frame to the scheduler.
#[derive(Debug)]
pub enum FrameOutcome {
    /// The run continues; hand this request back on the next frame.
    Continue(FrameRequest),
    /// The run completed on this frame and `finish` was called.
    Finished,
    /// The request belonged to a cancelled or completed run; nothing was drawn.
    Stale,
}

/// How [`drive`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveOutcome {
    /// The run reached full progress.
    Finished,
    /// The run was cancelled before completing.
    Cancelled,
    /// A run was already active, so nothing was started.
    AlreadyRunning,
}

#[derive(Debug)]
enum Phase {
    Idle,
    Running {
        started_at: Option<Instant>,
        token: CancellationToken,
    },
}

/// Generic single-threaded animation driver.
pub struct AnimationScheduler<A: Animate> {
    duration: Duration,
    easing: EasingFunction,
    animation: A,
    phase: Phase,
}

impl<A: Animate> AnimationScheduler<A> {
    /// Scheduler for runs of fixed `duration`.
    pub fn new(duration: Duration, easing: EasingFunction, animation: A) -> Self {
        Self {
            duration,
            easing,
            animation,
            phase: Phase::Idle,
        }
    }

    /// Run duration.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Whether a run is active.
    pub fn is_running(&self) -> bool {
        matches!(self.phase, Phase::Running { .. })
    }

    /// The driven animation.
    pub fn animation(&self) -> &A {
        &self.animation
    }

    /// Mutable access to the driven animation.
    pub fn animation_mut(&mut self) -> &mut A {
        &mut self.animation
    }

    /// Begin a run.
    ///
    /// Returns `None` and changes nothing while a run is already active;
    /// repeated starts are ignored, not queued.
    pub fn start(&mut self) -> Option<FrameRequest> {
        if self.is_running() {
            log::debug!("[animation] start ignored, run already active");
            return None;
        }

        let token = CancellationToken::new();
        self.phase = Phase::Running {
            started_at: None,
            token: token.clone(),
        };
        Some(FrameRequest { token })
    }

    /// Advance the run by one display frame at time `now`.
    ///
    /// The first frame of a run records the start time. Each frame draws at
    /// the eased elapsed fraction; once the fraction reaches 1 the run calls
    /// `finish` with that frame's draw result and returns to idle.
    pub fn on_frame(&mut self, request: FrameRequest, now: Instant) -> FrameOutcome {
        if request.is_cancelled() {
            return FrameOutcome::Stale;
        }

        let fraction = match &mut self.phase {
            Phase::Running { started_at, .. } => {
                let start = *started_at.get_or_insert(now);
                elapsed_fraction(now.saturating_duration_since(start), self.duration)
            }
            Phase::Idle => return FrameOutcome::Stale,
        };

        let frame = self.animation.draw(self.easing.evaluate(fraction));

        if fraction < 1.0 {
            return FrameOutcome::Continue(request);
        }

        // Invalidate the token so copies of this request left in the host are inert.
        request.token.cancel();
        self.phase = Phase::Idle;
        self.animation.finish(frame);
        FrameOutcome::Finished
    }

    /// Abort the active run.
    ///
    /// Any frame request still held by the host becomes stale, so neither
    /// `draw` nor `finish` runs again for this run. Returns whether a run was
    /// active.
    pub fn cancel(&mut self) -> bool {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Running { token, .. } => {
                token.cancel();
                log::debug!("[animation] run cancelled");
                true
            }
            Phase::Idle => false,
        }
    }
}

impl<A: Animate> Drop for AnimationScheduler<A> {
    fn drop(&mut self) {
        let _ = self.cancel();
    }
}

/// Fraction of `duration` covered by `elapsed`, capped at 1.
fn elapsed_fraction(elapsed: Duration, duration: Duration) -> f64 {
    if duration.is_zero() {
        1.0
    } else {
        (elapsed.as_nanos() as f64 / duration.as_nanos() as f64).min(1.0)
    }
}

/// Drive one run from a fixed-rate frame clock until it finishes or
/// `shutdown` fires.
pub async fn drive<A: Animate>(
    scheduler: &mut AnimationScheduler<A>,
    frame_interval: Duration,
    shutdown: &CancellationToken,
) -> DriveOutcome {
    let Some(request) = scheduler.start() else {
        return DriveOutcome::AlreadyRunning;
    };
    drive_request(scheduler, request, frame_interval, shutdown).await
}

/// Feed frames for an already-started run.
pub async fn drive_request<A: Animate>(
    scheduler: &mut AnimationScheduler<A>,
    mut request: FrameRequest,
    frame_interval: Duration,
    shutdown: &CancellationToken,
) -> DriveOutcome {
    let mut ticker = tokio::time::interval(frame_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                let _ = scheduler.cancel();
                return DriveOutcome::Cancelled;
            }
            tick = ticker.tick() => {
                if shutdown.is_cancelled() {
                    let _ = scheduler.cancel();
                    return DriveOutcome::Cancelled;
                }
                match scheduler.on_frame(request, tick.into_std()) {
                    FrameOutcome::Continue(next) => request = next,
                    FrameOutcome::Finished => return DriveOutcome::Finished,
                    FrameOutcome::Stale => return DriveOutcome::Cancelled,
                }
            }
        }
    }
}
