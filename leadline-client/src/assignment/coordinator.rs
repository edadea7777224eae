//! Drives the assignment state machine against the backend

use chrono::Utc;
use thiserror::Error;
use tracing::{info, warn};

use shared::models::{Assignment, LeadId, UserId, UserSummary};

use super::state::{AssignEvent, AssignState, AssignmentMachine, TransitionError};
use crate::client::{HttpClient, LeadApi, NetworkHttpClient};
use crate::error::{ClientError, ClientResult};
use crate::leads::{LeadAction, LeadStore, PatchOutcome, Ticket};

/// Local refusal to run an assignment step
///
/// Server rejections are not errors here: they move the machine to
/// `Failed` or `PermissionDenied` and are kept in [`AssignmentCoordinator::last_error`].
#[derive(Debug, Error)]
pub enum AssignError {
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Client(#[from] ClientError),
}

#[derive(Debug, Clone)]
struct Target {
    lead_id: LeadId,
    assignees: Vec<UserSummary>,
}

impl Target {
    fn assignee_ids(&self) -> Vec<UserId> {
        self.assignees.iter().map(|u| u.id).collect()
    }
}

pub struct AssignmentCoordinator<H: HttpClient = NetworkHttpClient> {
    api: LeadApi<H>,
    store: LeadStore,
    machine: AssignmentMachine,
    target: Option<Target>,
    last_error: Option<ClientError>,
}

/// Busy state held across a request
///
/// Dropped unsettled (the request future was cancelled), it abandons the
/// request so the machine leaves its busy state.
struct InFlight<'a> {
    machine: &'a mut AssignmentMachine,
    lead_id: LeadId,
    settled: bool,
}

impl<'a> InFlight<'a> {
    fn start(
        machine: &'a mut AssignmentMachine,
        event: AssignEvent,
        lead_id: LeadId,
    ) -> Result<Self, TransitionError> {
        machine.handle(event)?;
        Ok(Self {
            machine,
            lead_id,
            settled: false,
        })
    }

    fn settle(mut self, event: AssignEvent) -> Result<AssignState, TransitionError> {
        self.settled = true;
        self.machine.handle(event)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        match self.machine.handle(AssignEvent::Abandon) {
            Ok(state) => warn!(lead_id = self.lead_id, %state, "assignment request abandoned"),
            Err(e) => warn!(lead_id = self.lead_id, error = %e, "abandon failed"),
        }
    }
}

/// Applied if any lead changed, otherwise Superseded over Stale
fn merge_outcomes(a: PatchOutcome, b: PatchOutcome) -> PatchOutcome {
    use PatchOutcome::*;
    match (a, b) {
        (Applied, _) | (_, Applied) => Applied,
        (Superseded, _) | (_, Superseded) => Superseded,
        _ => Stale,
    }
}

fn require_assignees(assignees: &[UserSummary]) -> ClientResult<()> {
    if assignees.is_empty() {
        return Err(ClientError::Validation("select at least one user".into()));
    }
    Ok(())
}

impl<H: HttpClient> AssignmentCoordinator<H> {
    /// The session must carry a user whose role may assign; the role also
    /// decides the permission branch
    pub fn new(api: LeadApi<H>, store: LeadStore) -> ClientResult<Self> {
        let role = api.session().role().ok_or(ClientError::Unauthorized)?;
        if !role.can_assign() {
            return Err(ClientError::Forbidden(format!("{role} cannot assign leads")));
        }
        Ok(Self {
            api,
            store,
            machine: AssignmentMachine::new(role),
            target: None,
            last_error: None,
        })
    }

    pub fn state(&self) -> AssignState {
        self.machine.state()
    }

    /// Server error behind the current `Failed` or `PermissionDenied` state
    pub fn last_error(&self) -> Option<&ClientError> {
        self.last_error.as_ref()
    }

    pub fn target_lead(&self) -> Option<LeadId> {
        self.target.as_ref().map(|t| t.lead_id)
    }

    /// Assign `assignees` to one lead
    ///
    /// On success the store gets the new assignee list stamped with the
    /// session user as assigner. Dropping the future before the server
    /// answers returns the machine to `Idle`.
    pub async fn assign(
        &mut self,
        lead_id: LeadId,
        assignees: Vec<UserSummary>,
    ) -> Result<AssignState, AssignError> {
        require_assignees(&assignees)?;
        let actor = self.api.session().actor()?;

        let target = Target { lead_id, assignees };
        let ids = target.assignee_ids();
        let flight = InFlight::start(&mut self.machine, AssignEvent::Confirm, lead_id)?;
        self.last_error = None;

        let ticket = self.store.begin(lead_id);
        match self.api.assign(lead_id, &ids).await {
            Ok(()) => {
                let assignment = Assignment {
                    lead_id,
                    assignees: target.assignees.clone(),
                    assigned_by: actor,
                    assigned_at: Utc::now(),
                };
                let outcome = self
                    .store
                    .commit(ticket, LeadAction::Assigned(vec![assignment]));
                info!(lead_id, assignees = ?ids, ?outcome, "lead assigned");
                self.target = Some(target);
                Ok(flight.settle(AssignEvent::ServerAccepted)?)
            }
            Err(e) => {
                self.store.release(ticket);
                let state = flight.settle(AssignEvent::ServerRejected(e.kind()))?;
                if state == AssignState::PermissionDenied {
                    warn!(lead_id, "lead assigned by a super admin, reassignment request available");
                } else {
                    warn!(lead_id, error = %e, "assignment failed");
                }
                self.target = Some(target);
                self.last_error = Some(e);
                Ok(state)
            }
        }
    }

    /// Ask a super admin to reassign the lead from the denied attempt
    ///
    /// Dropping the future before the server answers returns the machine to
    /// `PermissionDenied`.
    pub async fn request_reassignment(&mut self) -> Result<AssignState, AssignError> {
        let target = match (self.machine.state(), &self.target) {
            (AssignState::PermissionDenied, Some(target)) => target.clone(),
            _ => {
                return Err(TransitionError {
                    from: self.machine.state(),
                    event: AssignEvent::ConfirmRequest.name(),
                }
                .into());
            }
        };
        let flight = InFlight::start(
            &mut self.machine,
            AssignEvent::ConfirmRequest,
            target.lead_id,
        )?;

        match self
            .api
            .request_reassignment(target.lead_id, &target.assignee_ids())
            .await
        {
            Ok(()) => {
                info!(lead_id = target.lead_id, "reassignment requested");
                self.last_error = None;
                Ok(flight.settle(AssignEvent::RequestAccepted)?)
            }
            Err(e) => {
                warn!(lead_id = target.lead_id, error = %e, "reassignment request failed");
                let state = flight.settle(AssignEvent::ServerRejected(e.kind()))?;
                self.last_error = Some(e);
                Ok(state)
            }
        }
    }

    /// Abandon the denied attempt
    pub fn cancel(&mut self) -> Result<AssignState, TransitionError> {
        let state = self.machine.handle(AssignEvent::Cancel)?;
        self.target = None;
        self.last_error = None;
        Ok(state)
    }

    /// Acknowledge a finished attempt and return to `Idle`
    pub fn dismiss(&mut self) -> Result<AssignState, TransitionError> {
        let state = self.machine.handle(AssignEvent::Dismiss)?;
        self.target = None;
        self.last_error = None;
        Ok(state)
    }

    /// Assign the same users to several leads in one call
    ///
    /// Empty selections fail locally without a request. Every listed lead
    /// takes a ticket before the call, so a newer single assignment for one
    /// of them still wins. On success each lead still in the store is
    /// patched; on failure nothing is.
    pub async fn bulk_assign(
        &self,
        lead_ids: &[LeadId],
        assignees: Vec<UserSummary>,
    ) -> ClientResult<PatchOutcome> {
        if lead_ids.is_empty() {
            return Err(ClientError::Validation("select at least one lead".into()));
        }
        require_assignees(&assignees)?;
        let actor = self.api.session().actor()?;

        let ids: Vec<UserId> = assignees.iter().map(|u| u.id).collect();
        let tickets: Vec<Ticket> = lead_ids.iter().map(|&id| self.store.begin(id)).collect();
        if let Err(e) = self.api.bulk_assign(lead_ids, &ids).await {
            for ticket in tickets {
                self.store.release(ticket);
            }
            return Err(e);
        }

        let at = Utc::now();
        let outcome = tickets
            .into_iter()
            .map(|ticket| {
                let assignment = Assignment {
                    lead_id: ticket.lead_id(),
                    assignees: assignees.clone(),
                    assigned_by: actor.clone(),
                    assigned_at: at,
                };
                self.store
                    .commit(ticket, LeadAction::Assigned(vec![assignment]))
            })
            .fold(PatchOutcome::Stale, merge_outcomes);
        info!(leads = lead_ids.len(), assignees = ?ids, ?outcome, "bulk assignment applied");
        Ok(outcome)
    }
}
