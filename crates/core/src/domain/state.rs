// Probe lifecycle state

use crate::domain::error::{DomainError, Result};

/// Supervisor state (single-use: Idle -> Running -> terminal)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeState {
    Idle,
    Running,
    /// Stopped by the private-address policy
    Aborted,
    Completed,
    /// Launch failure, read failure or non-zero exit
    CompletedWithProcessError,
}

impl std::fmt::Display for ProbeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProbeState::Idle => write!(f, "IDLE"),
            ProbeState::Running => write!(f, "RUNNING"),
            ProbeState::Aborted => write!(f, "ABORTED"),
            ProbeState::Completed => write!(f, "COMPLETED"),
            ProbeState::CompletedWithProcessError => write!(f, "COMPLETED_WITH_PROCESS_ERROR"),
        }
    }
}

impl ProbeState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProbeState::Aborted | ProbeState::Completed | ProbeState::CompletedWithProcessError
        )
    }

    /// Idle -> Running
    pub fn start(&mut self) -> Result<()> {
        self.transition(ProbeState::Idle, ProbeState::Running)
    }

    /// Running -> Aborted
    pub fn abort(&mut self) -> Result<()> {
        self.transition(ProbeState::Running, ProbeState::Aborted)
    }

    /// Running -> Completed
    pub fn complete(&mut self) -> Result<()> {
        self.transition(ProbeState::Running, ProbeState::Completed)
    }

    /// Running -> CompletedWithProcessError
    pub fn fail(&mut self) -> Result<()> {
        self.transition(ProbeState::Running, ProbeState::CompletedWithProcessError)
    }

    fn transition(&mut self, expected: ProbeState, next: ProbeState) -> Result<()> {
        if *self != expected {
            return Err(DomainError::InvalidStateTransition {
                from: self.to_string(),
                to: next.to_string(),
            });
        }
        *self = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let mut state = ProbeState::Idle;
        assert!(state.start().is_ok());
        assert_eq!(state, ProbeState::Running);
        assert!(state.complete().is_ok());
        assert_eq!(state, ProbeState::Completed);
        assert!(state.is_terminal());
    }

    #[test]
    fn test_terminal_states_are_final() {
        for terminal in [
            ProbeState::Aborted,
            ProbeState::Completed,
            ProbeState::CompletedWithProcessError,
        ] {
            let mut state = terminal;
            assert!(state.start().is_err());
            assert!(state.abort().is_err());
            assert!(state.complete().is_err());
            assert!(state.fail().is_err());
            assert_eq!(state, terminal);
        }
    }

    #[test]
    fn test_cannot_finish_before_start() {
        let mut state = ProbeState::Idle;
        let err = state.abort().unwrap_err();

        assert_eq!(
            err,
            DomainError::InvalidStateTransition {
                from: "IDLE".to_string(),
                to: "ABORTED".to_string(),
            }
        );
    }
}
