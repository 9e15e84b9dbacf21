//! The search form: one mounted instance owning its resolved options, UI
//! state, history subscription, and preference sync.
//!
//! State lives behind a single lock. Background work (the preference load,
//! history callbacks) holds only a weak reference and checks the mounted
//! flag, so nothing is applied after teardown.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::QueryError;
use crate::location::Location;
use crate::navigation::{History, LocationListener, Subscription};
use crate::options::{DefaultUsedSet, OptionValue, SearchOptions};
use crate::preferences::{PreferenceStore, PreferenceSync};
use crate::query::{build_search_url, validate_query_text, QueryDescriptor, MAX_QUERY_LENGTH};
use crate::resolver::OptionsResolver;
use crate::ui::{UiEvent, UiState};

// ---------------------------------------------------------------------------
// Query text owner
// ---------------------------------------------------------------------------

/// The context that owns the query text. The form reads it on submit,
/// forwards edits to it, and asks it to clear on navigation to the root.
pub trait QueryOwner: Send + Sync {
    fn query(&self) -> String;
    fn set_query(&self, text: &str);
    fn clear_query(&self);
}

/// Query text shared between the form and whatever renders it.
#[derive(Clone, Default)]
pub struct SharedQuery(Arc<Mutex<String>>);

impl SharedQuery {
    pub fn new(text: &str) -> Self {
        Self(Arc::new(Mutex::new(text.to_string())))
    }
}

impl QueryOwner for SharedQuery {
    fn query(&self) -> String {
        self.0.lock().clone()
    }

    fn set_query(&self, text: &str) {
        *self.0.lock() = text.to_string();
    }

    fn clear_query(&self) {
        self.0.lock().clear();
    }
}

// ---------------------------------------------------------------------------
// Props handed to the rendering layer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryInputProps {
    pub value: String,
    pub max_length: usize,
    pub error_submitted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionsInputProps {
    pub options: SearchOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CollapsibleProps {
    pub collapsed: bool,
    pub animate: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToggleProps {
    pub collapsed: bool,
}

// ---------------------------------------------------------------------------
// Form
// ---------------------------------------------------------------------------

struct FormState {
    resolver: OptionsResolver,
    ui: UiState,
    mounted: bool,
}

pub struct SearchForm {
    state: Arc<Mutex<FormState>>,
    history: Arc<dyn History>,
    owner: Arc<dyn QueryOwner>,
    sync: PreferenceSync,
    subscription: Option<Subscription>,
    preference_load: Option<JoinHandle<()>>,
}

impl SearchForm {
    /// Mount a form at the history's current location.
    ///
    /// Resolves options from the location, subscribes to location changes,
    /// and starts the one-time preference load if any option is still on its
    /// default. The load runs in the background on the current tokio runtime.
    pub fn mount(
        history: Arc<dyn History>,
        store: Arc<dyn PreferenceStore>,
        owner: Arc<dyn QueryOwner>,
    ) -> Self {
        let location = history.location();
        let resolver = OptionsResolver::from_location(&location);
        let needs_preferences = !resolver.default_used().is_empty();
        debug!(
            location = %location,
            default_used = ?resolver.default_used(),
            "Mounting search form"
        );

        let state = Arc::new(Mutex::new(FormState {
            resolver,
            ui: UiState::default(),
            mounted: true,
        }));

        let subscription = Some(history.listen(navigation_listener(&state, &owner)));

        let sync = PreferenceSync::new(store);
        let preference_load = if needs_preferences {
            let weak = Arc::downgrade(&state);
            sync.load(move |loaded| {
                let Some(state) = weak.upgrade() else {
                    return;
                };
                let mut s = state.lock();
                if !s.mounted {
                    debug!("Form unmounted before preferences loaded, ignoring");
                    return;
                }
                s.resolver.apply_loaded(&loaded);
            })
        } else {
            None
        };

        Self {
            state,
            history,
            owner,
            sync,
            subscription,
            preference_load,
        }
    }

    /// Release the history subscription and stop accepting updates. In-flight
    /// loads and saves keep running but their results are not applied.
    pub fn unmount(&mut self) {
        let was_mounted = std::mem::replace(&mut self.state.lock().mounted, false);
        self.subscription.take();
        if was_mounted {
            debug!("Unmounted search form");
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.state.lock().mounted
    }

    /// Handle of the preference load started at mount, if one was started
    /// and has not been taken yet.
    pub fn take_preference_load(&mut self) -> Option<JoinHandle<()>> {
        self.preference_load.take()
    }

    pub fn options(&self) -> SearchOptions {
        *self.state.lock().resolver.options()
    }

    pub fn default_used(&self) -> DefaultUsedSet {
        self.state.lock().resolver.default_used().clone()
    }

    pub fn ui_state(&self) -> UiState {
        self.state.lock().ui
    }

    // -- event handlers ------------------------------------------------------

    /// An option control changed. Returns whether the value was accepted (a
    /// change to the current value is ignored and not persisted).
    pub fn on_option_change(&self, value: OptionValue) -> bool {
        let changed = {
            let mut s = self.state.lock();
            s.mounted && s.resolver.apply_change(value)
        };
        if changed {
            self.sync.save(value);
        }
        changed
    }

    /// The query input changed.
    pub fn on_query_change(&self, text: &str) {
        if !self.is_mounted() {
            return;
        }
        self.owner.set_query(text);
        self.apply_ui(UiEvent::QueryEdited);
    }

    /// Validate the query and navigate to its canonical URL (page 1).
    ///
    /// On a validation error the error flag is raised and no navigation
    /// happens. An unmounted form refuses without touching any state.
    /// Returns the URL pushed.
    pub fn submit(&self) -> Result<String, QueryError> {
        let text = self.owner.query();
        let url = {
            let mut s = self.state.lock();
            if !s.mounted {
                return Err(QueryError::Unmounted);
            }
            if let Err(e) = validate_query_text(&text) {
                s.ui.apply(UiEvent::SubmitRejected);
                debug!(error = %e, "Rejected search submission");
                return Err(e);
            }
            build_search_url(&QueryDescriptor {
                text,
                page: 1,
                options: *s.resolver.options(),
            })
        };
        // Pushing runs the navigation listener, which takes the state lock
        info!(url = %url, "Submitting search");
        self.history.push(&url);
        Ok(url)
    }

    /// The options panel toggle was pressed. Returns whether it took effect.
    pub fn on_toggle(&self) -> bool {
        self.apply_ui(UiEvent::Toggle)
    }

    pub fn on_animation_end(&self) {
        self.apply_ui(UiEvent::AnimationEnd);
    }

    fn apply_ui(&self, event: UiEvent) -> bool {
        let mut s = self.state.lock();
        s.mounted && s.ui.apply(event)
    }

    // -- props ---------------------------------------------------------------

    pub fn query_input_props(&self) -> QueryInputProps {
        QueryInputProps {
            value: self.owner.query(),
            max_length: MAX_QUERY_LENGTH,
            error_submitted: self.state.lock().ui.error_submitted,
        }
    }

    pub fn options_input_props(&self) -> OptionsInputProps {
        OptionsInputProps {
            options: self.options(),
        }
    }

    pub fn collapsible_props(&self) -> CollapsibleProps {
        let ui = self.ui_state();
        CollapsibleProps {
            collapsed: ui.panel_collapsed,
            animate: ui.animation_enabled,
        }
    }

    pub fn toggle_props(&self) -> ToggleProps {
        ToggleProps {
            collapsed: self.ui_state().panel_collapsed,
        }
    }
}

impl Drop for SearchForm {
    fn drop(&mut self) {
        self.unmount();
    }
}

fn navigation_listener(
    state: &Arc<Mutex<FormState>>,
    owner: &Arc<dyn QueryOwner>,
) -> LocationListener {
    let weak = Arc::downgrade(state);
    let owner = Arc::clone(owner);
    Arc::new(move |location: &Location| {
        let Some(state) = weak.upgrade() else {
            return;
        };
        {
            let mut s = state.lock();
            if !s.mounted {
                return;
            }
            s.ui.apply(UiEvent::Navigated);
        }
        if location.is_root() {
            debug!("Navigated to root, clearing query");
            owner.clear_query();
        }
    })
}
