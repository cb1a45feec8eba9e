use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use serde::Deserialize;
use serde::Serialize;

use crate::AppState;
use crate::Result;

/// Host-reported process state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessState {
    Create,
    Foreground,
    Active,
    Background,
    Destroy,
}

impl ProcessState {
    /// Maps the host's numeric state code
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(ProcessState::Create),
            1 => Some(ProcessState::Foreground),
            2 => Some(ProcessState::Active),
            3 => Some(ProcessState::Background),
            4 => Some(ProcessState::Destroy),
            _ => None,
        }
    }

    pub fn app_state(&self) -> AppState {
        match self {
            ProcessState::Foreground => AppState::Foreground,
            ProcessState::Background => AppState::Background,
            _ => AppState::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessInfo {
    pub process_name: String,
    pub state: ProcessState,
}

/// Running-process query provided by the host
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ProcessStateSource: Send + Sync {
    async fn running_processes(&self) -> Result<Vec<ProcessInfo>>;
}

/// State of the first process named `process_name`, [`AppState::Unknown`] when absent
pub fn resolve_app_state(
    processes: &[ProcessInfo],
    process_name: &str,
) -> AppState {
    processes
        .iter()
        .find(|p| !process_name.is_empty() && p.process_name == process_name)
        .map_or(AppState::Unknown, |p| p.state.app_state())
}
