//! Workflow orchestrator — drives the remix session state machine and the
//! saved-posts list, independent of transport.
//!
//! Session flow: Idle → Generating → Ready, with each variant card moving
//! Unsaved → Saving → Saved (one-way) or Unsaved → Hidden (soft delete).
//! Card mutations are full-state replacements guarded by the session lock.

use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::models::content::SavedRemixRow;
use crate::remix::{RemixOutcome, VariantResult};

pub mod handlers;
pub mod share;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("content cannot be empty")]
    EmptyContent,

    #[error("a generation is already in flight")]
    GenerationInFlight,

    #[error("no variant at index {0}")]
    UnknownVariant(usize),

    #[error("variant cannot be saved: {0}")]
    NotSavable(&'static str),

    #[error("only unsaved variants can be hidden")]
    NotHidable,
}

/// Session phase. Generation is mutually exclusive: a new batch cannot start
/// while one is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Generating,
    Ready,
}

/// Per-card lifecycle. `Saved` is terminal (no un-save); `Hidden` is
/// reversible only by regenerating the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CardState {
    Unsaved,
    Saving,
    Saved,
    Hidden,
}

/// View model for one generated variant. Hidden cards keep their data; the
/// view filters on `state`.
#[derive(Debug, Clone, Serialize)]
pub struct VariantCard {
    pub style: String,
    pub content: String,
    pub metadata: serde_json::Value,
    pub error: bool,
    pub state: CardState,
}

impl VariantCard {
    /// Builds a card from a remix result. Error outcomes render the message
    /// as the card body with an error flag, so they appear inline alongside
    /// their siblings instead of replacing the batch.
    pub fn from_result(result: VariantResult) -> Self {
        let style = result.style;
        match result.outcome {
            RemixOutcome::Ok { content, metadata } => VariantCard {
                style,
                content,
                metadata: serde_json::to_value(metadata).unwrap_or_else(|_| json!({})),
                error: false,
                state: CardState::Unsaved,
            },
            RemixOutcome::Err { kind, message } => VariantCard {
                content: format!("Error generating {style}: {message}"),
                style,
                metadata: json!({ "error": true, "kind": kind }),
                error: true,
                state: CardState::Unsaved,
            },
        }
    }
}

/// The "saved posts" sidebar state, refreshed on first fetch and after every
/// successful save. `available` is false when the store is not configured.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SavedList {
    pub available: bool,
    pub posts: Vec<SavedRemixRow>,
}

/// Outcome of the save guard: either the card was already saved (no
/// persistence call must be issued) or the caller may proceed with the
/// captured snapshot.
#[derive(Debug, Clone)]
pub enum SaveTicket {
    AlreadySaved,
    Proceed {
        original_text: String,
        style: String,
        content: String,
        metadata: serde_json::Value,
    },
}

/// The remix session state machine.
#[derive(Debug)]
pub struct Workflow {
    phase: Phase,
    /// Source text of the batch currently on screen. Committed only when a
    /// batch completes, so saves always pair a card with the text it was
    /// generated from.
    input: String,
    /// Source text of an in-flight generation; promoted to `input` on
    /// completion, discarded on abort.
    staged_input: String,
    cards: Vec<VariantCard>,
    saved_posts: SavedList,
}

impl Workflow {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            input: String::new(),
            staged_input: String::new(),
            cards: Vec::new(),
            saved_posts: SavedList::default(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn cards(&self) -> &[VariantCard] {
        &self.cards
    }

    pub fn saved_posts(&self) -> &SavedList {
        &self.saved_posts
    }

    pub fn set_saved_posts(&mut self, list: SavedList) {
        self.saved_posts = list;
    }

    /// Enters the generating phase. Rejected for blank input and while a
    /// batch is already in flight (re-trigger is disabled, not cancelled).
    pub fn begin_generation(&mut self, content: &str) -> Result<(), WorkflowError> {
        if self.phase == Phase::Generating {
            return Err(WorkflowError::GenerationInFlight);
        }
        if content.trim().is_empty() {
            return Err(WorkflowError::EmptyContent);
        }
        self.staged_input = content.to_string();
        self.phase = Phase::Generating;
        Ok(())
    }

    /// Replaces the card list with the new batch, one card per result, in
    /// result order, and commits the staged input as the batch's source text.
    pub fn complete_generation(&mut self, results: Vec<VariantResult>) {
        self.input = std::mem::take(&mut self.staged_input);
        self.cards = results.into_iter().map(VariantCard::from_result).collect();
        self.phase = Phase::Ready;
    }

    /// Leaves the generating phase after a fatal generation error, keeping
    /// whatever batch was on screen before. The staged input is discarded —
    /// the on-screen cards still belong to the previously committed text.
    pub fn abort_generation(&mut self) {
        self.staged_input.clear();
        self.phase = if self.cards.is_empty() {
            Phase::Idle
        } else {
            Phase::Ready
        };
    }

    /// Checks the save guard and marks the card as saving. An already-saved
    /// (or currently saving) card yields `AlreadySaved` without touching
    /// anything — no second persistence call is issued.
    pub fn begin_save(&mut self, index: usize) -> Result<SaveTicket, WorkflowError> {
        let input = self.input.clone();
        let card = self
            .cards
            .get_mut(index)
            .ok_or(WorkflowError::UnknownVariant(index))?;

        match card.state {
            CardState::Saved | CardState::Saving => Ok(SaveTicket::AlreadySaved),
            CardState::Hidden => Err(WorkflowError::NotSavable("variant is hidden")),
            CardState::Unsaved if card.error => {
                Err(WorkflowError::NotSavable("variant is an error placeholder"))
            }
            CardState::Unsaved => {
                card.state = CardState::Saving;
                Ok(SaveTicket::Proceed {
                    original_text: input,
                    style: card.style.clone(),
                    content: card.content.clone(),
                    metadata: card.metadata.clone(),
                })
            }
        }
    }

    /// Completes a save. Success is terminal; failure returns the card to
    /// `Unsaved` so the user can retry manually.
    pub fn finish_save(&mut self, index: usize, success: bool) {
        if let Some(card) = self.cards.get_mut(index) {
            if card.state == CardState::Saving {
                card.state = if success {
                    CardState::Saved
                } else {
                    CardState::Unsaved
                };
            }
        }
    }

    /// Soft delete: hides the card without dropping its data. One-way; only
    /// regenerating the batch brings it back.
    pub fn hide(&mut self, index: usize) -> Result<(), WorkflowError> {
        let card = self
            .cards
            .get_mut(index)
            .ok_or(WorkflowError::UnknownVariant(index))?;

        match card.state {
            CardState::Unsaved => {
                card.state = CardState::Hidden;
                Ok(())
            }
            CardState::Hidden => Ok(()),
            _ => Err(WorkflowError::NotHidable),
        }
    }
}

impl Default for Workflow {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remix::{RemixErrorKind, VariantMetadata};

    fn ok_result(style: &str, content: &str) -> VariantResult {
        VariantResult {
            style: style.to_string(),
            outcome: RemixOutcome::Ok {
                content: content.to_string(),
                metadata: VariantMetadata {
                    model: "gpt-4o-mini".to_string(),
                    total_tokens: Some(42),
                    original_length: 24,
                },
            },
        }
    }

    fn err_result(style: &str, message: &str) -> VariantResult {
        VariantResult {
            style: style.to_string(),
            outcome: RemixOutcome::Err {
                kind: RemixErrorKind::Api,
                message: message.to_string(),
            },
        }
    }

    fn ready_workflow(results: Vec<VariantResult>) -> Workflow {
        let mut wf = Workflow::new();
        wf.begin_generation("Our Q3 revenue grew 40%.").unwrap();
        wf.complete_generation(results);
        wf
    }

    /// The view-side filter: the HTTP layer returns every card so indices
    /// stay stable, and hidden cards are dropped at render time.
    fn visible(wf: &Workflow) -> Vec<&VariantCard> {
        wf.cards()
            .iter()
            .filter(|c| c.state != CardState::Hidden)
            .collect()
    }

    #[test]
    fn test_generation_requires_non_empty_input() {
        let mut wf = Workflow::new();
        assert_eq!(wf.begin_generation("   "), Err(WorkflowError::EmptyContent));
        assert_eq!(wf.phase(), Phase::Idle);
    }

    #[test]
    fn test_retrigger_is_rejected_while_generating() {
        let mut wf = Workflow::new();
        wf.begin_generation("some text").unwrap();
        assert_eq!(wf.phase(), Phase::Generating);
        assert_eq!(
            wf.begin_generation("other text"),
            Err(WorkflowError::GenerationInFlight)
        );
    }

    #[test]
    fn test_batch_yields_one_card_per_style_in_input_order() {
        let wf = ready_workflow(vec![
            ok_result("storytelling", "Once upon a quarter..."),
            err_result("tips", "provider returned 500"),
            ok_result("question", "What would you do?"),
        ]);

        assert_eq!(wf.phase(), Phase::Ready);
        let cards = wf.cards();
        assert_eq!(cards.len(), 3);
        assert_eq!(cards[0].style, "storytelling");
        assert_eq!(cards[1].style, "tips");
        assert_eq!(cards[2].style, "question");
    }

    #[test]
    fn test_error_result_becomes_inline_error_card() {
        let wf = ready_workflow(vec![
            ok_result("storytelling", "Once upon a quarter..."),
            err_result("tips", "provider returned 500"),
        ]);

        let card = &wf.cards()[1];
        assert!(card.error);
        assert_eq!(card.content, "Error generating tips: provider returned 500");
        assert_eq!(card.metadata["error"], true);
        // The sibling is untouched.
        assert!(!wf.cards()[0].error);
    }

    #[test]
    fn test_save_is_at_most_once_per_card() {
        let mut wf = ready_workflow(vec![ok_result("storytelling", "A post.")]);

        let first = wf.begin_save(0).unwrap();
        assert!(matches!(first, SaveTicket::Proceed { .. }));

        // Second request while saving: no-op ticket, no state change.
        assert!(matches!(wf.begin_save(0).unwrap(), SaveTicket::AlreadySaved));

        wf.finish_save(0, true);
        assert_eq!(wf.cards()[0].state, CardState::Saved);

        // And again once saved.
        assert!(matches!(wf.begin_save(0).unwrap(), SaveTicket::AlreadySaved));
    }

    #[test]
    fn test_save_ticket_carries_original_input_text() {
        let mut wf = ready_workflow(vec![ok_result("storytelling", "A post.")]);
        match wf.begin_save(0).unwrap() {
            SaveTicket::Proceed {
                original_text,
                style,
                content,
                ..
            } => {
                assert_eq!(original_text, "Our Q3 revenue grew 40%.");
                assert_eq!(style, "storytelling");
                assert_eq!(content, "A post.");
            }
            SaveTicket::AlreadySaved => panic!("expected Proceed"),
        }
    }

    #[test]
    fn test_failed_save_returns_card_to_unsaved() {
        let mut wf = ready_workflow(vec![ok_result("tips", "1. Do things.")]);
        wf.begin_save(0).unwrap();
        wf.finish_save(0, false);
        assert_eq!(wf.cards()[0].state, CardState::Unsaved);
        // Retry is allowed after a failure.
        assert!(matches!(wf.begin_save(0).unwrap(), SaveTicket::Proceed { .. }));
    }

    #[test]
    fn test_error_card_cannot_be_saved() {
        let mut wf = ready_workflow(vec![err_result("tips", "boom")]);
        assert!(matches!(
            wf.begin_save(0),
            Err(WorkflowError::NotSavable(_))
        ));
    }

    #[test]
    fn test_hide_removes_from_visible_without_touching_siblings() {
        let mut wf = ready_workflow(vec![
            ok_result("storytelling", "a"),
            ok_result("tips", "b"),
            ok_result("question", "c"),
        ]);

        wf.hide(1).unwrap();

        let visible = visible(&wf);
        assert_eq!(visible.len(), 2);
        assert_eq!(visible[0].style, "storytelling");
        assert_eq!(visible[1].style, "question");
        assert_eq!(visible[0].state, CardState::Unsaved);
        assert_eq!(visible[1].state, CardState::Unsaved);

        // The hidden card keeps its data.
        assert_eq!(wf.cards()[1].content, "b");
        assert_eq!(wf.cards()[1].state, CardState::Hidden);
    }

    #[test]
    fn test_hide_is_one_way_and_rejects_saved_cards() {
        let mut wf = ready_workflow(vec![ok_result("tips", "b")]);
        wf.hide(0).unwrap();
        // Hiding again is a no-op, not an error.
        assert_eq!(wf.hide(0), Ok(()));

        let mut wf = ready_workflow(vec![ok_result("tips", "b")]);
        wf.begin_save(0).unwrap();
        wf.finish_save(0, true);
        assert_eq!(wf.hide(0), Err(WorkflowError::NotHidable));
    }

    #[test]
    fn test_hidden_card_cannot_be_saved() {
        let mut wf = ready_workflow(vec![ok_result("tips", "b")]);
        wf.hide(0).unwrap();
        assert!(matches!(
            wf.begin_save(0),
            Err(WorkflowError::NotSavable(_))
        ));
    }

    #[test]
    fn test_unknown_index_is_reported() {
        let mut wf = ready_workflow(vec![ok_result("tips", "b")]);
        assert!(matches!(
            wf.begin_save(5),
            Err(WorkflowError::UnknownVariant(5))
        ));
        assert_eq!(wf.hide(5), Err(WorkflowError::UnknownVariant(5)));
    }

    #[test]
    fn test_save_after_aborted_generation_keeps_original_pairing() {
        // A fatally failed re-generation must not re-associate the on-screen
        // cards with the new input text.
        let mut wf = Workflow::new();
        wf.begin_generation("TEXT ONE").unwrap();
        wf.complete_generation(vec![ok_result("tips", "A post from text one.")]);

        wf.begin_generation("TEXT TWO").unwrap();
        wf.abort_generation();
        assert_eq!(wf.phase(), Phase::Ready);

        match wf.begin_save(0).unwrap() {
            SaveTicket::Proceed { original_text, .. } => {
                assert_eq!(original_text, "TEXT ONE");
            }
            SaveTicket::AlreadySaved => panic!("expected Proceed"),
        }
    }

    #[test]
    fn test_save_during_in_flight_generation_uses_committed_input() {
        let mut wf = Workflow::new();
        wf.begin_generation("TEXT ONE").unwrap();
        wf.complete_generation(vec![ok_result("tips", "A post from text one.")]);

        // A new generation is in flight; the old batch is still on screen.
        wf.begin_generation("TEXT TWO").unwrap();

        match wf.begin_save(0).unwrap() {
            SaveTicket::Proceed { original_text, .. } => {
                assert_eq!(original_text, "TEXT ONE");
            }
            SaveTicket::AlreadySaved => panic!("expected Proceed"),
        }

        // Completion still commits the new input for the new batch.
        wf.finish_save(0, true);
        wf.complete_generation(vec![ok_result("question", "A post from text two.")]);
        match wf.begin_save(0).unwrap() {
            SaveTicket::Proceed { original_text, .. } => {
                assert_eq!(original_text, "TEXT TWO");
            }
            SaveTicket::AlreadySaved => panic!("expected Proceed"),
        }
    }

    #[test]
    fn test_abort_returns_to_previous_phase() {
        let mut wf = Workflow::new();
        wf.begin_generation("text").unwrap();
        wf.abort_generation();
        assert_eq!(wf.phase(), Phase::Idle);

        let mut wf = ready_workflow(vec![ok_result("tips", "b")]);
        wf.begin_generation("more text").unwrap();
        wf.abort_generation();
        assert_eq!(wf.phase(), Phase::Ready);
        assert_eq!(wf.cards().len(), 1);
    }
}
