//! In-memory lead store
//!
//! Every write is a [`LeadAction`] run through one reducer. Mutations that
//! follow a server call are ordered per lead with [`Ticket`]s: a response is
//! dropped once a request issued after it has been applied for that lead.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use shared::models::{Assignment, Lead, LeadId, LeadPatch};

/// Store mutation
#[derive(Debug, Clone)]
pub enum LeadAction {
    /// Full fetch result; replaces the contents
    Loaded(Vec<Lead>),
    /// Newly created lead, shown first
    Created(Lead),
    /// Server-confirmed partial update
    Patched { id: LeadId, patch: LeadPatch },
    /// Server-confirmed assignments (single or bulk)
    Assigned(Vec<Assignment>),
    Removed(LeadId),
    Cleared,
}

impl LeadAction {
    fn name(&self) -> &'static str {
        match self {
            LeadAction::Loaded(_) => "loaded",
            LeadAction::Created(_) => "created",
            LeadAction::Patched { .. } => "patched",
            LeadAction::Assigned(_) => "assigned",
            LeadAction::Removed(_) => "removed",
            LeadAction::Cleared => "cleared",
        }
    }
}

/// Result of applying a server-confirmed mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    Applied,
    /// The lead is no longer in the store
    Stale,
    /// A newer request for the same lead was applied first, or the ticket was
    /// already released; this response was discarded
    Superseded,
}

/// Position of one request in a lead's mutation order
///
/// Settled by [`LeadStore::commit`] or [`LeadStore::release`]. Dropping an
/// unsettled ticket releases it, so a cancelled request never stays in
/// flight.
#[derive(Debug)]
#[must_use = "commit or release the ticket"]
pub struct Ticket {
    lead_id: LeadId,
    seq: u64,
    state: Arc<Mutex<StoreState>>,
    settled: bool,
}

impl Ticket {
    pub fn lead_id(&self) -> LeadId {
        self.lead_id
    }
}

impl Drop for Ticket {
    fn drop(&mut self) {
        if !self.settled {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            state.settle(self.lead_id, self.seq);
            debug!(lead_id = self.lead_id, "ticket dropped before its response");
        }
    }
}

#[derive(Debug, Default)]
struct StoreState {
    leads: Vec<Lead>,
    /// Tickets issued and not yet committed or released
    in_flight: HashMap<LeadId, BTreeSet<u64>>,
    /// Newest ticket applied per lead
    applied: HashMap<LeadId, u64>,
    next_seq: u64,
}

impl StoreState {
    /// Take a ticket out of flight
    fn settle(&mut self, lead_id: LeadId, seq: u64) {
        if let Some(seqs) = self.in_flight.get_mut(&lead_id) {
            seqs.remove(&seq);
            if seqs.is_empty() {
                self.in_flight.remove(&lead_id);
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LeadStore {
    inner: Arc<Mutex<StoreState>>,
}

impl LeadStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, StoreState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Apply an action immediately
    pub fn dispatch(&self, action: LeadAction) -> PatchOutcome {
        let name = action.name();
        let outcome = reduce(&mut self.state().leads, action);
        if outcome == PatchOutcome::Stale {
            debug!(action = name, "lead action referenced no stored lead");
        }
        outcome
    }

    /// Issue the next ticket for `lead_id`
    pub fn begin(&self, lead_id: LeadId) -> Ticket {
        let mut state = self.state();
        state.next_seq += 1;
        let seq = state.next_seq;
        state.in_flight.entry(lead_id).or_default().insert(seq);
        Ticket {
            lead_id,
            seq,
            state: self.inner.clone(),
            settled: false,
        }
    }

    /// Apply `action` unless a newer ticket for the lead was applied first
    pub fn commit(&self, mut ticket: Ticket, action: LeadAction) -> PatchOutcome {
        ticket.settled = true;
        let name = action.name();
        let mut state = self.state();
        state.settle(ticket.lead_id, ticket.seq);
        let newer_applied = state
            .applied
            .get(&ticket.lead_id)
            .is_some_and(|&seq| seq > ticket.seq);
        if newer_applied {
            debug!(
                lead_id = ticket.lead_id,
                action = name,
                "discarding superseded response"
            );
            return PatchOutcome::Superseded;
        }

        let outcome = reduce(&mut state.leads, action);
        match outcome {
            PatchOutcome::Applied => {
                state.applied.insert(ticket.lead_id, ticket.seq);
            }
            PatchOutcome::Stale => {
                debug!(lead_id = ticket.lead_id, action = name, "lead no longer in store");
            }
            PatchOutcome::Superseded => {}
        }
        outcome
    }

    /// Give up a ticket whose request failed
    ///
    /// Earlier requests for the same lead can still commit.
    pub fn release(&self, mut ticket: Ticket) {
        ticket.settled = true;
        self.state().settle(ticket.lead_id, ticket.seq);
    }

    /// Number of requests in flight for `lead_id`
    pub fn pending(&self, lead_id: LeadId) -> usize {
        self.state().in_flight.get(&lead_id).map_or(0, |s| s.len())
    }

    pub fn snapshot(&self) -> Vec<Lead> {
        self.state().leads.clone()
    }

    /// Read the leads in place without cloning them
    pub fn with_leads<R>(&self, f: impl FnOnce(&[Lead]) -> R) -> R {
        f(&self.state().leads)
    }

    pub fn get(&self, id: LeadId) -> Option<Lead> {
        self.state().leads.iter().find(|l| l.id == id).cloned()
    }

    pub fn contains(&self, id: LeadId) -> bool {
        self.state().leads.iter().any(|l| l.id == id)
    }

    pub fn len(&self) -> usize {
        self.state().leads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state().leads.is_empty()
    }
}

fn reduce(leads: &mut Vec<Lead>, action: LeadAction) -> PatchOutcome {
    match action {
        LeadAction::Loaded(fetched) => {
            *leads = fetched;
            PatchOutcome::Applied
        }
        LeadAction::Created(lead) => {
            leads.retain(|l| l.id != lead.id);
            leads.insert(0, lead);
            PatchOutcome::Applied
        }
        LeadAction::Patched { id, patch } => match leads.iter_mut().find(|l| l.id == id) {
            Some(lead) => {
                patch.apply_to(lead);
                PatchOutcome::Applied
            }
            None => PatchOutcome::Stale,
        },
        LeadAction::Assigned(assignments) => {
            let mut applied = false;
            for assignment in assignments {
                if let Some(lead) = leads.iter_mut().find(|l| l.id == assignment.lead_id) {
                    lead.assigned_by = vec![assignment.assigned_by.clone(); assignment.assignees.len()];
                    lead.assignees = assignment.assignees;
                    lead.assigned_at = Some(assignment.assigned_at);
                    applied = true;
                }
            }
            if applied {
                PatchOutcome::Applied
            } else {
                PatchOutcome::Stale
            }
        }
        LeadAction::Removed(id) => {
            let before = leads.len();
            leads.retain(|l| l.id != id);
            if leads.len() < before {
                PatchOutcome::Applied
            } else {
                PatchOutcome::Stale
            }
        }
        LeadAction::Cleared => {
            leads.clear();
            PatchOutcome::Applied
        }
    }
}
