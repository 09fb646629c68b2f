//! Dispatch phases

use std::fmt;

use serde::{Deserialize, Serialize};

/// Phase of a single dispatch.
///
/// `Idle -> PreHook -> Sending -> PostHook -> Done`, or `Failed` from any phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DispatchPhase {
    /// Not started.
    #[default]
    Idle,
    /// Running the pre-request hook.
    PreHook,
    /// Waiting on the protocol sender.
    Sending,
    /// Running extraction, script and set-environment.
    PostHook,
    /// Finished with a response.
    Done,
    /// Aborted with an error.
    Failed,
}

impl DispatchPhase {
    /// Returns true for `Done` and `Failed`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Returns the phase as a static string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::PreHook => "pre_hook",
            Self::Sending => "sending",
            Self::PostHook => "post_hook",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for DispatchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
