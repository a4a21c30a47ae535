//! Architectural CPU state model primitives.

/// Architectural register file types and storage model.
pub mod registers;

use crate::HaltCause;
pub use registers::{ArchitecturalState, Register, GENERAL_REGISTER_COUNT, REGISTER_NAMES};

/// Execution-state machine for the instruction cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum RunState {
    /// Ready to execute the next instruction.
    #[default]
    Running,
    /// Terminal: the cause is latched and no further cycle makes progress.
    Halted(HaltCause),
}

impl RunState {
    /// Returns the latched halt cause, if halted.
    #[must_use]
    pub const fn halt_cause(self) -> Option<HaltCause> {
        match self {
            Self::Halted(cause) => Some(cause),
            Self::Running => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RunState;
    use crate::HaltCause;

    #[test]
    fn run_state_default_is_running() {
        assert_eq!(RunState::default(), RunState::Running);
    }

    #[test]
    fn halt_cause_accessor_reports_only_halted_variant() {
        assert_eq!(RunState::Running.halt_cause(), None);
        assert_eq!(
            RunState::Halted(HaltCause::ZeroWord).halt_cause(),
            Some(HaltCause::ZeroWord)
        );
    }
}
