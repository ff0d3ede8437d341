//! Session lifecycle status.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a weighing session.
///
/// `InProgress` is the initial state, `Completed` is terminal. There is no
/// cancelled or failed state in the current contract; the only transition is
/// `InProgress -> Completed`, performed exactly once via a compare-and-set
/// at the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    InProgress,
    Completed,
}

impl SessionStatus {
    /// Returns the wire name (`in_progress` / `completed`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
