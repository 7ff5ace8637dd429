//! Application context handed to the game at startup.

use crate::definitions::{ConfigError, Definitions};
use crate::settings::GameSettings;
use crate::transport::{OfflineTransport, Transport};
use std::sync::Arc;

/// Everything the game needs from its host, constructed once per process.
pub struct AppContext {
    pub definitions: Arc<Definitions>,
    pub settings: GameSettings,
    pub transport: Box<dyn Transport>,
}

impl AppContext {
    pub fn new(
        definitions: Arc<Definitions>,
        settings: GameSettings,
        transport: Box<dyn Transport>,
    ) -> Result<Self, ConfigError> {
        settings.validate()?;
        definitions.require_map(&settings.default_map)?;
        Ok(Self {
            definitions,
            settings,
            transport,
        })
    }

    /// Built-in definitions, default settings and no peer.
    pub fn offline() -> Result<Self, ConfigError> {
        Self::new(
            Arc::new(Definitions::builtin()?),
            GameSettings::default(),
            Box::new(OfflineTransport),
        )
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("maps", &self.definitions.map_names().collect::<Vec<_>>())
            .field("settings", &self.settings)
            .field("connected", &self.transport.is_connected())
            .finish()
    }
}
