//! In-memory lifecycle state of one controller instance.
//!
//! Durable state (which generation exists, which is active) lives in the
//! store. This only tracks what this instance is doing right now and whether
//! it was told to skip waiting.

use serde::{Deserialize, Serialize};

use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    Parsed,
    Installing,
    /// Installed and waiting to be activated.
    Installed,
    Activating,
    Activated,
}

#[derive(Debug)]
pub(crate) struct Lifecycle {
    pub(crate) state: LifecycleState,
    pub(crate) skip_waiting: bool,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self { state: LifecycleState::Parsed, skip_waiting: false }
    }
}

impl Lifecycle {
    fn ensure_idle(&self) -> Result<(), Error> {
        match self.state {
            LifecycleState::Installing | LifecycleState::Activating => {
                Err(Error::InvalidInput(format!("controller is busy ({:?})", self.state).to_lowercase()))
            }
            _ => Ok(()),
        }
    }

    /// Enter `Installing`, returning the state to restore if install fails.
    pub(crate) fn begin_install(&mut self) -> Result<LifecycleState, Error> {
        self.ensure_idle()?;
        let previous = self.state;
        self.state = LifecycleState::Installing;
        Ok(previous)
    }

    /// Install always asks to skip the wait for old pages to unload.
    pub(crate) fn install_succeeded(&mut self) {
        self.state = LifecycleState::Installed;
        self.skip_waiting = true;
    }

    /// Enter `Activating`, returning the state to restore if activation fails.
    pub(crate) fn begin_activate(&mut self) -> Result<LifecycleState, Error> {
        self.ensure_idle()?;
        let previous = self.state;
        self.state = LifecycleState::Activating;
        Ok(previous)
    }

    pub(crate) fn activate_succeeded(&mut self) {
        self.state = LifecycleState::Activated;
    }

    /// Record a skip-waiting request. True if an installed generation is waiting.
    pub(crate) fn request_skip_waiting(&mut self) -> bool {
        self.skip_waiting = true;
        self.state == LifecycleState::Installed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_then_activate() {
        let mut lifecycle = Lifecycle::default();
        assert_eq!(lifecycle.begin_install().unwrap(), LifecycleState::Parsed);
        lifecycle.install_succeeded();
        assert_eq!(lifecycle.state, LifecycleState::Installed);
        assert!(lifecycle.skip_waiting);

        assert_eq!(lifecycle.begin_activate().unwrap(), LifecycleState::Installed);
        lifecycle.activate_succeeded();
        assert_eq!(lifecycle.state, LifecycleState::Activated);
    }

    #[test]
    fn test_busy_rejects_overlap() {
        let mut lifecycle = Lifecycle::default();
        lifecycle.begin_install().unwrap();
        assert!(lifecycle.begin_install().is_err());
        assert!(lifecycle.begin_activate().is_err());
    }

    #[test]
    fn test_skip_waiting_only_promotes_waiting_install() {
        let mut lifecycle = Lifecycle::default();
        assert!(!lifecycle.request_skip_waiting());
        assert!(lifecycle.skip_waiting);

        lifecycle.begin_install().unwrap();
        lifecycle.install_succeeded();
        assert!(lifecycle.request_skip_waiting());

        lifecycle.begin_activate().unwrap();
        lifecycle.activate_succeeded();
        assert!(!lifecycle.request_skip_waiting());
    }
}
