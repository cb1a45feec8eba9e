use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;
use tracing::warn;

use crate::Error;
use crate::Result;

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct AppSettings {
    /// Name the host reports for this process in its running-process list.
    ///
    /// Structured mode resolves foreground/background state by this name; an empty name never
    /// matches, so threshold-driven collection stays idle.
    #[serde(default)]
    pub process_name: String,
}

impl AppSettings {
    pub(super) fn validate(&self) -> Result<()> {
        if self.process_name.chars().any(char::is_control) {
            return Err(Error::Settings(ConfigError::Message(
                "process_name must not contain control characters".into(),
            )));
        }
        if self.process_name.is_empty() {
            warn!("process_name is empty, structured leak watching will never act");
        }
        Ok(())
    }
}
