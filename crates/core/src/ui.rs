//! Secondary UI state of the search form: submission error flag and the
//! collapsible options panel.
//!
//! Every transition is a pure function of the previous state returning
//! `None` when nothing changes, so callers never write redundant updates.

use tracing::debug;

/// UI flags owned by one form instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiState {
    pub error_submitted: bool,
    pub panel_collapsed: bool,
    /// True only between a toggle and its matching animation-end signal.
    pub panel_animating: bool,
    /// Off until the first toggle so the initial render never animates.
    pub animation_enabled: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            error_submitted: false,
            panel_collapsed: true,
            panel_animating: false,
            animation_enabled: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEvent {
    /// Options panel toggle pressed.
    Toggle,
    /// Collapse/expand animation finished.
    AnimationEnd,
    /// Submission rejected by query validation.
    SubmitRejected,
    /// Query text edited.
    QueryEdited,
    /// Location changed.
    Navigated,
}

impl UiState {
    /// The state after `event`, or `None` if the event changes nothing.
    pub fn transition(&self, event: UiEvent) -> Option<UiState> {
        let next = match event {
            // Single-flight: toggles during an animation are dropped
            UiEvent::Toggle if self.panel_animating => return None,
            UiEvent::Toggle => UiState {
                panel_collapsed: !self.panel_collapsed,
                panel_animating: true,
                animation_enabled: true,
                ..*self
            },
            UiEvent::AnimationEnd => UiState {
                panel_animating: false,
                ..*self
            },
            UiEvent::SubmitRejected => UiState {
                error_submitted: true,
                ..*self
            },
            UiEvent::QueryEdited => UiState {
                error_submitted: false,
                ..*self
            },
            UiEvent::Navigated => UiState::default(),
        };
        (next != *self).then_some(next)
    }

    /// Apply `event` in place. Returns whether the state changed.
    pub fn apply(&mut self, event: UiEvent) -> bool {
        match self.transition(event) {
            Some(next) => {
                debug!(?event, from = ?self, to = ?next, "UI state transition");
                *self = next;
                true
            }
            None => false,
        }
    }
}
