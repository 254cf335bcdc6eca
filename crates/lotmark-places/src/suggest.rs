//! Suggestion provider: debounced, latest-wins autocomplete over the
//! provider's prediction endpoint.
//!
//! Each input field owns one [`SuggestSession`]. A submission advances a
//! generation counter, sleeps the debounce interval, and drops itself the
//! moment a newer submission exists — checked once after the sleep and once
//! more when the network reply lands, so a slow early query can never
//! overwrite a fast later one. The transport offers no true cancellation;
//! superseded work is discarded on arrival instead.
//!
//! State machine per field:
//! `Idle → Debouncing → Querying → {Ready | Empty | Failed}`, with
//! [`SuggestSession::collapse`] folding the terminal states back to `Idle`
//! (the Escape / click-outside path — the field's text is caller-owned and
//! untouched).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::client::PlacesClient;
use crate::error::PlacesError;
use crate::guard::ServiceGuard;
use crate::types::{LocationKind, Suggestion};

/// Minimum trimmed input length before any query is issued.
const MIN_INPUT_LEN: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestState {
    Idle,
    Debouncing,
    Querying,
    Ready,
    Empty,
    Failed,
}

/// Per-field suggestion configuration.
#[derive(Debug, Clone)]
pub struct SuggestConfig {
    pub kind: LocationKind,
    /// Restrict results to one country (the stricter picker mode).
    pub country_restriction: Option<String>,
    pub debounce: Duration,
}

impl SuggestConfig {
    #[must_use]
    pub fn new(kind: LocationKind) -> Self {
        Self {
            kind,
            country_restriction: None,
            debounce: Duration::from_millis(300),
        }
    }

    #[must_use]
    pub fn with_country(mut self, code: impl Into<String>) -> Self {
        self.country_restriction = Some(code.into());
        self
    }

    #[must_use]
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }
}

/// A debounced autocomplete session for one input field.
pub struct SuggestSession {
    client: Arc<PlacesClient>,
    guard: Arc<ServiceGuard>,
    config: SuggestConfig,
    generation: AtomicU64,
    state: Mutex<SuggestState>,
}

impl SuggestSession {
    #[must_use]
    pub fn new(client: Arc<PlacesClient>, guard: Arc<ServiceGuard>, config: SuggestConfig) -> Self {
        Self {
            client,
            guard,
            config,
            generation: AtomicU64::new(0),
            state: Mutex::new(SuggestState::Idle),
        }
    }

    #[must_use]
    pub fn state(&self) -> SuggestState {
        *self.state.lock().expect("state lock poisoned")
    }

    /// Escape / click-outside: fold any settled state back to `Idle`.
    pub fn collapse(&self) {
        self.set_state(SuggestState::Idle);
    }

    /// Submits the field's current text.
    ///
    /// Returns `None` when a newer submission superseded this one (the
    /// result must not be applied), `Some(Ok(vec![]))` for inputs below the
    /// minimum length (no network traffic) and for zero-result queries, and
    /// `Some(Err(_))` for transport, provider, or availability failures.
    /// Failures are surfaced once; there is no automatic retry.
    pub async fn submit(&self, text: &str) -> Option<Result<Vec<Suggestion>, PlacesError>> {
        // Every keystroke advances the generation, so a pending query is
        // superseded even when the newer input is too short to query.
        let my_generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let trimmed = text.trim().to_string();
        if trimmed.chars().count() < MIN_INPUT_LEN {
            self.set_state(SuggestState::Idle);
            return Some(Ok(Vec::new()));
        }

        self.set_state(SuggestState::Debouncing);
        tokio::time::sleep(self.config.debounce).await;
        if self.is_superseded(my_generation) {
            return None;
        }

        if let Err(err) = self.guard.check() {
            self.set_state(SuggestState::Failed);
            return Some(Err(err));
        }

        self.set_state(SuggestState::Querying);
        let outcome = self
            .client
            .autocomplete(
                &trimmed,
                self.config.kind,
                self.config.country_restriction.as_deref(),
            )
            .await;

        // Stale replies are dropped on arrival.
        if self.is_superseded(my_generation) {
            return None;
        }

        match outcome {
            Ok(predictions) => {
                let suggestions: Vec<Suggestion> = predictions
                    .into_iter()
                    .take(self.config.kind.result_cap())
                    .map(Suggestion::from)
                    .collect();
                self.set_state(if suggestions.is_empty() {
                    SuggestState::Empty
                } else {
                    SuggestState::Ready
                });
                Some(Ok(suggestions))
            }
            Err(err) => {
                tracing::warn!(error = %err, "suggestion query failed");
                self.set_state(SuggestState::Failed);
                Some(Err(err))
            }
        }
    }

    fn is_superseded(&self, my_generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) != my_generation
    }

    fn set_state(&self, next: SuggestState) {
        *self.state.lock().expect("state lock poisoned") = next;
    }
}

/// Bounded keyboard cursor over the current suggestion list.
///
/// Movement clamps at both ends — no wraparound, for every picker variant.
/// `None` means nothing is highlighted; the first Down selects the first
/// entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionCursor {
    len: usize,
    index: Option<usize>,
}

impl SelectionCursor {
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self { len, index: None }
    }

    #[must_use]
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn move_down(&mut self) {
        if self.len == 0 {
            return;
        }
        self.index = Some(match self.index {
            None => 0,
            Some(i) => (i + 1).min(self.len - 1),
        });
    }

    pub fn move_up(&mut self) {
        if let Some(i) = self.index {
            self.index = Some(i.saturating_sub(1));
        }
    }

    /// Enter: the highlighted suggestion, if any.
    #[must_use]
    pub fn commit<'a>(&self, items: &'a [Suggestion]) -> Option<&'a Suggestion> {
        self.index.and_then(|i| items.get(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suggestion(desc: &str) -> Suggestion {
        Suggestion {
            description: desc.to_string(),
            place_id: format!("pl-{desc}"),
            main_text: desc.to_string(),
            secondary_text: None,
            kinds: vec![],
        }
    }

    #[test]
    fn cursor_starts_unselected_and_down_selects_first() {
        let mut cursor = SelectionCursor::new(3);
        assert_eq!(cursor.index(), None);
        cursor.move_down();
        assert_eq!(cursor.index(), Some(0));
    }

    #[test]
    fn cursor_clamps_at_bottom() {
        let mut cursor = SelectionCursor::new(2);
        for _ in 0..5 {
            cursor.move_down();
        }
        assert_eq!(cursor.index(), Some(1));
    }

    #[test]
    fn cursor_clamps_at_top() {
        let mut cursor = SelectionCursor::new(2);
        cursor.move_down();
        cursor.move_down();
        for _ in 0..5 {
            cursor.move_up();
        }
        assert_eq!(cursor.index(), Some(0));
    }

    #[test]
    fn cursor_up_without_selection_keeps_none() {
        let mut cursor = SelectionCursor::new(3);
        cursor.move_up();
        assert_eq!(cursor.index(), None);
    }

    #[test]
    fn cursor_over_empty_list_never_selects() {
        let mut cursor = SelectionCursor::new(0);
        cursor.move_down();
        assert_eq!(cursor.index(), None);
    }

    #[test]
    fn commit_returns_highlighted_suggestion() {
        let items = vec![suggestion("a"), suggestion("b")];
        let mut cursor = SelectionCursor::new(items.len());
        assert!(cursor.commit(&items).is_none());
        cursor.move_down();
        cursor.move_down();
        assert_eq!(cursor.commit(&items).unwrap().description, "b");
    }
}
