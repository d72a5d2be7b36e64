//! Observable owner of the current design.
//!
//! The store is created once per session and passed to whatever needs it;
//! there is no global instance. Controls and previews subscribe to it and
//! receive a notification after every mutation that actually changed the
//! design.
//!
//! A control that commits its own edit passes its [`EchoToken`], and the
//! store skips that subscriber when notifying. This keeps a control's local
//! value from being overwritten by the echo of its own change while still
//! letting edits from elsewhere (a preset, another control) flow back in.
//!
//! ```
//! use folco_composer::{ParameterStore, VisualParameters};
//!
//! let mut store = ParameterStore::new(VisualParameters::default());
//! let slider = store.subscribe(|_params| { /* refresh the slider */ });
//! let preview = store.subscribe(|_params| { /* redraw the preview */ });
//!
//! // The slider commits; only the preview is notified.
//! store.commit(slider, |p| p.set_overlay_opacity(0.8));
//! # let _ = preview;
//! ```

use crate::color::Preset;
use crate::params::VisualParameters;

/// Identifies a subscriber and marks the changes it originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EchoToken(u64);

type Listener = Box<dyn FnMut(&VisualParameters)>;

/// Owns the session's [`VisualParameters`] and notifies subscribers of changes.
pub struct ParameterStore {
    params: VisualParameters,
    listeners: Vec<(EchoToken, Listener)>,
    next_token: u64,
    revision: u64,
}

impl ParameterStore {
    pub fn new(params: VisualParameters) -> Self {
        Self {
            params,
            listeners: Vec::new(),
            next_token: 0,
            revision: 0,
        }
    }

    /// The current design.
    pub fn params(&self) -> &VisualParameters {
        &self.params
    }

    /// Incremented on every mutation that changed the design.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Registers a listener and returns its token.
    pub fn subscribe(&mut self, listener: impl FnMut(&VisualParameters) + 'static) -> EchoToken {
        let token = EchoToken(self.next_token);
        self.next_token += 1;
        self.listeners.push((token, Box::new(listener)));
        token
    }

    /// Removes a listener. Returns false if the token was not subscribed.
    pub fn unsubscribe(&mut self, token: EchoToken) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(t, _)| *t != token);
        self.listeners.len() != before
    }

    /// Applies an edit that did not come from a subscriber; everyone is notified.
    pub fn update(&mut self, edit: impl FnOnce(&mut VisualParameters)) -> bool {
        self.mutate(None, edit)
    }

    /// Applies an edit on behalf of `origin`; every subscriber except
    /// `origin` is notified.
    pub fn commit(&mut self, origin: EchoToken, edit: impl FnOnce(&mut VisualParameters)) -> bool {
        self.mutate(Some(origin), edit)
    }

    /// Overwrites the folder colors with a preset.
    pub fn apply_preset(&mut self, preset: &Preset) -> bool {
        self.update(|p| p.apply_preset(preset))
    }

    /// Replaces the whole design, e.g. after loading a profile.
    pub fn replace(&mut self, params: VisualParameters) -> bool {
        self.update(|p| *p = params)
    }

    fn mutate(&mut self, origin: Option<EchoToken>, edit: impl FnOnce(&mut VisualParameters)) -> bool {
        let before = self.params.clone();
        edit(&mut self.params);
        if self.params == before {
            return false;
        }

        self.revision += 1;
        log::debug!("design changed (revision {})", self.revision);

        for (token, listener) in &mut self.listeners {
            if Some(*token) != origin {
                listener(&self.params);
            }
        }
        true
    }
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new(VisualParameters::default())
    }
}

// ============================================================================
// Tests
// ============================================================================
