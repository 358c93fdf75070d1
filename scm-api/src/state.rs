use scm_core::gateway::DescriptionEnhancer;
use scm_core::repository::SettingsRepository;
use scm_dispatch::DispatchService;
use scm_store::{ChangeSender, SharedMessaging};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub dispatch: Arc<DispatchService>,
    pub enhancer: Arc<dyn DescriptionEnhancer>,
    pub settings: Arc<dyn SettingsRepository>,
    /// Live messaging settings, shared with the WhatsApp client.
    pub messaging: SharedMessaging,
    pub changes: ChangeSender,
    /// `memory` or `postgres`.
    pub store_kind: &'static str,
}
