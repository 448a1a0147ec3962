use serde::{Deserialize, Serialize};

use crate::domain::LoadState;

/// A named event dispatched on an element, modelled on the DOM `CustomEvent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomEvent {
    pub name: String,
    pub bubbles: bool,
    pub cancelable: bool,
    pub detail: serde_json::Value,
}

impl CustomEvent {
    pub fn new(name: impl Into<String>, detail: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            bubbles: false,
            cancelable: false,
            detail,
        }
    }

    pub fn bubbling(mut self) -> Self {
        self.bubbles = true;
        self
    }

    /// Builds the bubbling, non-cancelable state-change notification.
    pub fn state_changed(name: impl Into<String>, new_state: LoadState) -> Self {
        let detail = serde_json::to_value(StateChangeDetail { new_state })
            .unwrap_or(serde_json::Value::Null);
        Self::new(name, detail).bubbling()
    }

    /// Decodes the detail of a state-change event, if it is one.
    pub fn state_change(&self) -> Option<StateChangeDetail> {
        serde_json::from_value(self.detail.clone()).ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateChangeDetail {
    pub new_state: LoadState,
}
