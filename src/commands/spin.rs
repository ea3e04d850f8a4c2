//! Terminal roulette.
//!
//! Renders the card stack as a single rolling line: whichever card sits at
//! the top of the viewport is printed in place as the stack moves.

use crate::animation::roulette::{Roulette, RouletteConfig, StackView};
use crate::animation::scheduler::{drive_request, DriveOutcome};
use crate::error::AppError;
use crate::models::user::User;
use rand::Rng;
use std::io::Write;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub const NO_REVIEWERS_MESSAGE: &str = "Please configure a repository and user first.";

/// Card stack drawn as one line of text.
pub struct TerminalStack<W: Write> {
    cards: Vec<String>,
    out: W,
    offset_percent: f64,
    shown: Option<usize>,
}

impl<W: Write> TerminalStack<W> {
    pub fn new(cards: Vec<String>, out: W) -> Self {
        Self {
            cards,
            out,
            offset_percent: 0.0,
            shown: None,
        }
    }

    /// Index of the card at the top of the viewport.
    pub fn top_index(&self) -> Option<usize> {
        if self.cards.is_empty() {
            return None;
        }
        let count = self.cards.len();
        let position = -self.offset_percent / 100.0;
        let index = (position * count as f64).round().max(0.0) as usize;
        Some(index.min(count - 1))
    }

    /// Label of the card at the top of the viewport.
    pub fn top_card(&self) -> Option<&str> {
        self.top_index().map(|index| self.cards[index].as_str())
    }

    /// Consume the view, returning its writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn render(&mut self) {
        let index = self.top_index();
        if index == self.shown {
            return;
        }
        self.shown = index;

        if let Some(index) = index {
            let result = write!(self.out, "\r  > {:<32}", self.cards[index])
                .and_then(|()| self.out.flush());
            if let Err(e) = result {
                log::debug!("[spin] render failed: {}", e);
            }
        }
    }
}

impl<W: Write> StackView for TerminalStack<W> {
    fn set_offset_percent(&mut self, percent: f64) {
        self.offset_percent = percent;
        self.render();
    }
}

/// Card labels for `reviewers`: each login once, then the first again so the
/// stack wraps around seamlessly.
pub fn card_stack(reviewers: &[&User]) -> Vec<String> {
    let mut cards: Vec<String> = reviewers.iter().map(|user| user.login.clone()).collect();
    if let Some(first) = cards.first().cloned() {
        cards.push(first);
    }
    cards
}

/// Spin over `reviewers`, rendering into `out`.
///
/// Returns the picked reviewer, or `None` when `shutdown` fires first.
pub async fn run_spin<R: Rng, W: Write>(
    reviewers: &[&User],
    config: RouletteConfig,
    frame_interval: Duration,
    shutdown: &CancellationToken,
    rng: R,
    out: W,
) -> Result<Option<User>, AppError> {
    if reviewers.is_empty() {
        return Err(AppError::type_error(NO_REVIEWERS_MESSAGE));
    }

    let view = TerminalStack::new(card_stack(reviewers), out);
    let mut roulette = Roulette::with_wraparound(config, reviewers.len(), view, rng);
    let request = roulette
        .spin()
        .map_err(|e| AppError::unknown("Failed to start the roulette").with_cause(e))?;

    let outcome = drive_request(roulette.scheduler_mut(), request, frame_interval, shutdown).await;
    log::debug!("[spin] run ended: {:?}", outcome);

    match outcome {
        DriveOutcome::Finished => Ok(reviewers
            .get(roulette.target_index())
            .map(|user| (*user).clone())),
        DriveOutcome::Cancelled | DriveOutcome::AlreadyRunning => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn user(id: i64, login: &str) -> User {
        User {
            id,
            login: login.to_string(),
            avatar_url: "x".to_string(),
        }
    }

    fn config() -> RouletteConfig {
        RouletteConfig {
            duration_ms: 200,
            laps: 2,
        }
    }

    #[test]
    fn test_card_stack_wraps_first_reviewer() {
        let (dave, erin) = (user(2, "dave"), user(3, "erin"));
        assert_eq!(card_stack(&[&dave, &erin]), vec!["dave", "erin", "dave"]);
        assert!(card_stack(&[]).is_empty());
    }

    #[test]
    fn test_terminal_stack_tracks_top_card() {
        let cards = vec!["a".to_string(), "b".to_string(), "c".to_string(), "a".to_string()];
        let mut view = TerminalStack::new(cards, Vec::new());
        assert_eq!(view.top_card(), Some("a"));

        view.set_offset_percent(-25.0);
        assert_eq!(view.top_card(), Some("b"));
        view.set_offset_percent(-49.0);
        assert_eq!(view.top_card(), Some("c"));
        view.set_offset_percent(-50.0);
        // Unchanged card is not redrawn.
        let text = String::from_utf8(view.into_inner()).unwrap();
        assert_eq!(text.matches('>').count(), 2);
        assert!(text.contains("> b"));
        assert!(text.contains("> c"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_spin_picks_a_reviewer() {
        let reviewers = [user(2, "dave"), user(3, "erin"), user(4, "frank")];
        let refs: Vec<&User> = reviewers.iter().collect();
        let shutdown = CancellationToken::new();
        let mut out = Vec::new();

        let picked = run_spin(
            &refs,
            config(),
            Duration::from_millis(16),
            &shutdown,
            StdRng::seed_from_u64(7),
            &mut out,
        )
        .await
        .unwrap()
        .unwrap();

        assert!(reviewers.contains(&picked));
        assert!(!out.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_spin_cancelled_by_shutdown() {
        let dave = user(2, "dave");
        let shutdown = CancellationToken::new();
        shutdown.cancel();

        let picked = run_spin(
            &[&dave],
            config(),
            Duration::from_millis(16),
            &shutdown,
            StdRng::seed_from_u64(1),
            Vec::new(),
        )
        .await
        .unwrap();

        assert!(picked.is_none());
    }

    #[tokio::test]
    async fn test_spin_without_reviewers_does_not_start() {
        let err = run_spin(
            &[],
            config(),
            Duration::from_millis(16),
            &CancellationToken::new(),
            StdRng::seed_from_u64(1),
            Vec::new(),
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind, ErrorKind::TypeError);
        assert_eq!(err.user_message(), NO_REVIEWERS_MESSAGE);
    }
}
