//! Reviewer roulette.
//!
//! Spins a vertical stack of cards several laps and decelerates toward a
//! randomly chosen target. The stack holds `count_targets` selectable cards
//! followed by wrap-around duplicates, `count_items` cards in total.

use std::time::{Duration, Instant};

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::easing::EasingFunction;
use super::scheduler::{Animate, AnimationScheduler, FrameOutcome, FrameRequest};

/// Default number of full laps before landing.
pub const DEFAULT_LAPS: u32 = 3;

/// Default spin duration in milliseconds.
pub const DEFAULT_DURATION_MS: u64 = 3000;

/// Vertical gap between cards, in pixels.
pub const CARD_GAP_PX: f64 = 8.0;

/// Roulette tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouletteConfig {
    /// Spin duration in milliseconds.
    pub duration_ms: u64,

    /// Full laps before landing on the target.
    pub laps: u32,
}

impl Default for RouletteConfig {
    fn default() -> Self {
        Self {
            duration_ms: DEFAULT_DURATION_MS,
            laps: DEFAULT_LAPS,
        }
    }
}

/// Why a spin could not start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SpinError {
    #[error("the card stack is empty")]
    NoItems,
    #[error("there are no candidates to pick from")]
    NoTargets,
    #[error("a spin is already in progress")]
    AlreadySpinning,
}

/// Where the roulette writes its visual state.
pub trait StackView {
    /// Translate the stack along its axis by `percent` of its height.
    fn set_offset_percent(&mut self, percent: f64);

    /// Apply a freshly measured card height.
    fn set_item_height(&mut self, _height_px: f64) {}
}

/// Per-spin animation state.
#[derive(Debug)]
pub struct Spin<V> {
    view: V,
    count_targets: usize,
    count_items: usize,
    target_index: usize,
    full_distance: f64,
    lap: u32,
    previous_position: f64,
}

impl<V: StackView> Spin<V> {
    /// Fraction of the stack covered by one lap over the selectable cards.
    fn lap_distance(&self) -> f64 {
        self.count_targets as f64 / self.count_items as f64
    }
}

impl<V: StackView> Animate for Spin<V> {
    type Frame = f64;

    fn draw(&mut self, progress: f64) -> Option<f64> {
        let lap_distance = self.lap_distance();
        let distance_laps_completed = lap_distance * f64::from(self.lap);
        let distance_to_go = self.full_distance * progress;
        let mut position = distance_to_go - distance_laps_completed + self.previous_position;

        if position >= lap_distance {
            self.lap += 1;
            position = 0.0;
        }

        self.view.set_offset_percent(-position * 100.0);
        Some(position)
    }

    fn finish(&mut self, last: Option<f64>) {
        if let Some(position) = last {
            self.previous_position = position;
        }
        self.lap = 0;
        log::debug!(
            "[roulette] landed on target {} at position {:.4}",
            self.target_index,
            self.previous_position
        );
    }
}

/// Random reviewer picker with a spinning card stack.
pub struct Roulette<V: StackView, R: Rng> {
    scheduler: AnimationScheduler<Spin<V>>,
    rng: R,
    laps: u32,
}

impl<V: StackView, R: Rng> Roulette<V, R> {
    /// Roulette over `count_targets` candidates rendered as `count_items` cards.
    pub fn new(
        config: RouletteConfig,
        count_targets: usize,
        count_items: usize,
        view: V,
        rng: R,
    ) -> Self {
        let spin = Spin {
            view,
            count_targets,
            count_items,
            target_index: 0,
            full_distance: 0.0,
            lap: 0,
            previous_position: 0.0,
        };
        Self {
            scheduler: AnimationScheduler::new(
                Duration::from_millis(config.duration_ms),
                EasingFunction::DEFAULT,
                spin,
            ),
            rng,
            laps: config.laps,
        }
    }

    /// Roulette in the default layout: one wrap-around duplicate card after
    /// the candidates.
    pub fn with_wraparound(config: RouletteConfig, count_targets: usize, view: V, rng: R) -> Self {
        Self::new(config, count_targets, count_targets + 1, view, rng)
    }

    /// Pick a new target and start spinning toward it.
    pub fn spin(&mut self) -> Result<FrameRequest, SpinError> {
        if self.scheduler.is_running() {
            return Err(SpinError::AlreadySpinning);
        }

        let laps = self.laps;
        let spin = self.scheduler.animation_mut();
        if spin.count_items == 0 {
            return Err(SpinError::NoItems);
        }
        if spin.count_targets == 0 {
            return Err(SpinError::NoTargets);
        }

        let target_index = self.rng.gen_range(0..spin.count_targets);
        let count_items = spin.count_items as f64;
        spin.target_index = target_index;
        spin.full_distance = (target_index as f64 + count_items * f64::from(laps)) / count_items;
        log::debug!(
            "[roulette] spinning to target {} of {}",
            target_index,
            spin.count_targets
        );

        self.scheduler.start().ok_or(SpinError::AlreadySpinning)
    }

    /// Feed one display frame to the active spin.
    pub fn on_frame(&mut self, request: FrameRequest, now: Instant) -> FrameOutcome {
        self.scheduler.on_frame(request, now)
    }

    /// Abort the active spin without landing.
    pub fn cancel(&mut self) -> bool {
        self.scheduler.cancel()
    }

    /// Whether a spin is in progress.
    pub fn is_spinning(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Index of the most recently chosen target.
    pub fn target_index(&self) -> usize {
        self.scheduler.animation().target_index
    }

    /// Position the previous spin ended at.
    pub fn resting_position(&self) -> f64 {
        self.scheduler.animation().previous_position
    }

    /// Number of rendered cards.
    pub fn count_items(&self) -> usize {
        self.scheduler.animation().count_items
    }

    /// The view the roulette draws into.
    pub fn view(&self) -> &V {
        &self.scheduler.animation().view
    }

    /// Underlying scheduler, for hosts that pump frames themselves.
    pub fn scheduler_mut(&mut self) -> &mut AnimationScheduler<Spin<V>> {
        &mut self.scheduler
    }

    /// Update candidate and card counts.
    ///
    /// When the card count changes the layout is re-measured from the
    /// stack's total scroll height and the stack snaps back to the top.
    pub fn set_counts(&mut self, count_targets: usize, count_items: usize, stack_height_px: f64) {
        let spin = self.scheduler.animation_mut();
        spin.count_targets = count_targets;
        if spin.count_items == count_items {
            return;
        }

        spin.count_items = count_items;
        if count_items > 0 {
            let height = stack_height_px / count_items as f64 - CARD_GAP_PX;
            spin.view.set_item_height(height);
        }
        spin.view.set_offset_percent(0.0);
        spin.previous_position = 0.0;
    }
}
