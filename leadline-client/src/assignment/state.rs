//! Assignment state machine
//!
//! ```text
//! Idle --Confirm--> Submitting
//! Submitting --ServerAccepted--> Succeeded
//! Submitting --ServerRejected(Permission) [admin]--> PermissionDenied
//! Submitting --ServerRejected(_)--> Failed
//! PermissionDenied --ConfirmRequest--> RequestingReassignment
//! PermissionDenied --Cancel--> Idle
//! RequestingReassignment --RequestAccepted--> RequestSent
//! RequestingReassignment --ServerRejected(_)--> Failed
//! Succeeded | RequestSent | Failed --Dismiss--> Idle
//! Submitting --Abandon--> Idle
//! RequestingReassignment --Abandon--> PermissionDenied
//! ```
//!
//! `Abandon` is raised when the caller drops a request before it settles.

use std::fmt;

use shared::models::Role;
use thiserror::Error;

use crate::error::ErrorKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignState {
    Idle,
    Submitting,
    Succeeded,
    /// Lead was assigned by a super admin; an admin may ask for reassignment
    PermissionDenied,
    RequestingReassignment,
    RequestSent,
    Failed,
}

impl AssignState {
    pub fn name(&self) -> &'static str {
        match self {
            AssignState::Idle => "idle",
            AssignState::Submitting => "submitting",
            AssignState::Succeeded => "succeeded",
            AssignState::PermissionDenied => "permission_denied",
            AssignState::RequestingReassignment => "requesting_reassignment",
            AssignState::RequestSent => "request_sent",
            AssignState::Failed => "failed",
        }
    }

    /// A request is on the wire
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            AssignState::Submitting | AssignState::RequestingReassignment
        )
    }
}

impl fmt::Display for AssignState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignEvent {
    Confirm,
    ServerAccepted,
    ServerRejected(ErrorKind),
    ConfirmRequest,
    RequestAccepted,
    Cancel,
    Dismiss,
    Abandon,
}

impl AssignEvent {
    pub fn name(&self) -> &'static str {
        match self {
            AssignEvent::Confirm => "confirm",
            AssignEvent::ServerAccepted => "server_accepted",
            AssignEvent::ServerRejected(_) => "server_rejected",
            AssignEvent::ConfirmRequest => "confirm_request",
            AssignEvent::RequestAccepted => "request_accepted",
            AssignEvent::Cancel => "cancel",
            AssignEvent::Dismiss => "dismiss",
            AssignEvent::Abandon => "abandon",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid assignment transition: {event} in state {from}")]
pub struct TransitionError {
    pub from: AssignState,
    pub event: &'static str,
}

/// Pure transition table for one assignment dialog
#[derive(Debug, Clone)]
pub struct AssignmentMachine {
    role: Role,
    state: AssignState,
}

impl AssignmentMachine {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            state: AssignState::Idle,
        }
    }

    pub fn state(&self) -> AssignState {
        self.state
    }

    pub fn role(&self) -> Role {
        self.role
    }

    /// Compute the next state without applying it
    pub fn next(&self, event: AssignEvent) -> Result<AssignState, TransitionError> {
        use AssignEvent as E;
        use AssignState as S;

        let next = match (self.state, event) {
            (S::Idle, E::Confirm) => S::Submitting,
            (S::Submitting, E::ServerAccepted) => S::Succeeded,
            (S::Submitting, E::ServerRejected(ErrorKind::Permission)) if self.role == Role::Admin => {
                S::PermissionDenied
            }
            (S::Submitting, E::ServerRejected(_)) => S::Failed,
            (S::PermissionDenied, E::ConfirmRequest) => S::RequestingReassignment,
            (S::PermissionDenied, E::Cancel) => S::Idle,
            (S::RequestingReassignment, E::RequestAccepted) => S::RequestSent,
            (S::RequestingReassignment, E::ServerRejected(_)) => S::Failed,
            (S::Succeeded | S::RequestSent | S::Failed, E::Dismiss) => S::Idle,
            (S::Submitting, E::Abandon) => S::Idle,
            (S::RequestingReassignment, E::Abandon) => S::PermissionDenied,
            (from, event) => {
                return Err(TransitionError {
                    from,
                    event: event.name(),
                });
            }
        };
        Ok(next)
    }

    /// Apply an event; on error the state is unchanged
    pub fn handle(&mut self, event: AssignEvent) -> Result<AssignState, TransitionError> {
        self.state = self.next(event)?;
        Ok(self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(role: Role, events: &[AssignEvent]) -> Result<AssignState, TransitionError> {
        let mut machine = AssignmentMachine::new(role);
        let mut state = machine.state();
        for event in events {
            state = machine.handle(*event)?;
        }
        Ok(state)
    }

    #[test]
    fn test_happy_path() {
        let state = run(
            Role::Admin,
            &[AssignEvent::Confirm, AssignEvent::ServerAccepted],
        );
        assert_eq!(state, Ok(AssignState::Succeeded));
    }

    #[test]
    fn test_admin_reassignment_branch() {
        let state = run(
            Role::Admin,
            &[
                AssignEvent::Confirm,
                AssignEvent::ServerRejected(ErrorKind::Permission),
                AssignEvent::ConfirmRequest,
                AssignEvent::RequestAccepted,
            ],
        );
        assert_eq!(state, Ok(AssignState::RequestSent));
    }

    #[test]
    fn test_super_admin_never_denied() {
        let state = run(
            Role::SuperAdmin,
            &[
                AssignEvent::Confirm,
                AssignEvent::ServerRejected(ErrorKind::Permission),
            ],
        );
        assert_eq!(state, Ok(AssignState::Failed));
    }

    #[test]
    fn test_other_rejections_fail() {
        for kind in [ErrorKind::Network, ErrorKind::Auth, ErrorKind::Validation] {
            let state = run(
                Role::Admin,
                &[AssignEvent::Confirm, AssignEvent::ServerRejected(kind)],
            );
            assert_eq!(state, Ok(AssignState::Failed));
        }
    }

    #[test]
    fn test_cancel_and_dismiss_return_to_idle() {
        let state = run(
            Role::Admin,
            &[
                AssignEvent::Confirm,
                AssignEvent::ServerRejected(ErrorKind::Permission),
                AssignEvent::Cancel,
            ],
        );
        assert_eq!(state, Ok(AssignState::Idle));

        let state = run(
            Role::Admin,
            &[
                AssignEvent::Confirm,
                AssignEvent::ServerRejected(ErrorKind::Network),
                AssignEvent::Dismiss,
                AssignEvent::Confirm,
            ],
        );
        assert_eq!(state, Ok(AssignState::Submitting));
    }

    #[test]
    fn test_abandon_returns_from_busy_states() {
        let state = run(Role::Admin, &[AssignEvent::Confirm, AssignEvent::Abandon]);
        assert_eq!(state, Ok(AssignState::Idle));

        let state = run(
            Role::Admin,
            &[
                AssignEvent::Confirm,
                AssignEvent::ServerRejected(ErrorKind::Permission),
                AssignEvent::ConfirmRequest,
                AssignEvent::Abandon,
            ],
        );
        assert_eq!(state, Ok(AssignState::PermissionDenied));

        assert!(run(Role::Admin, &[AssignEvent::Abandon]).is_err());
    }

    #[test]
    fn test_invalid_transition_leaves_state() {
        let mut machine = AssignmentMachine::new(Role::Admin);
        machine.handle(AssignEvent::Confirm).unwrap();

        let err = machine.handle(AssignEvent::Confirm).unwrap_err();
        assert_eq!(err.from, AssignState::Submitting);
        assert_eq!(err.event, "confirm");
        assert_eq!(machine.state(), AssignState::Submitting);

        assert!(machine.handle(AssignEvent::Cancel).is_err());
        assert!(AssignmentMachine::new(Role::Admin)
            .handle(AssignEvent::Dismiss)
            .is_err());
    }

    #[test]
    fn test_reassignment_rejection_fails() {
        let state = run(
            Role::Admin,
            &[
                AssignEvent::Confirm,
                AssignEvent::ServerRejected(ErrorKind::Permission),
                AssignEvent::ConfirmRequest,
                AssignEvent::ServerRejected(ErrorKind::Permission),
            ],
        );
        assert_eq!(state, Ok(AssignState::Failed));
    }
}
