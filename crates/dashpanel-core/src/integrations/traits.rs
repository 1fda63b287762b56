use super::types::Integration;

/// Callbacks an integration row hands its user actions to.
///
/// The row never talks to the backend about its own lifecycle; the owning
/// list decides what enabling, disabling and removal mean.
pub trait IntegrationRowHandler {
    /// Removal confirmed.
    fn on_remove(&mut self);

    /// Enable switch flipped; `enabled` is the requested new state.
    fn on_toggle_enabled(&mut self, enabled: bool);

    /// Disable confirmed for an integration that must be uninstalled
    /// upstream first.
    fn on_disable(&mut self, integration: &Integration);
}

/// A user action captured by [`IntentRecorder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowIntent {
    Remove,
    ToggleEnabled(bool),
    Disable {
        integration_id: String,
        provider_key: String,
    },
}

/// Handler that records intents so async callers can act on them after
/// the synchronous callback returns.
#[derive(Debug, Default)]
pub struct IntentRecorder {
    pub intents: Vec<RowIntent>,
}

impl IntentRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&mut self) -> Vec<RowIntent> {
        std::mem::take(&mut self.intents)
    }
}

impl IntegrationRowHandler for IntentRecorder {
    fn on_remove(&mut self) {
        self.intents.push(RowIntent::Remove);
    }

    fn on_toggle_enabled(&mut self, enabled: bool) {
        self.intents.push(RowIntent::ToggleEnabled(enabled));
    }

    fn on_disable(&mut self, integration: &Integration) {
        self.intents.push(RowIntent::Disable {
            integration_id: integration.id.clone(),
            provider_key: integration.provider.key.clone(),
        });
    }
}
