//! Lead operations: server call first, store update after confirmation

use chrono::Utc;
use tracing::{debug, info};
use validator::Validate;

use shared::models::{Lead, LeadId, LeadPatch, LeadStatus, NewLead};

use super::LeadScope;
use super::store::{LeadAction, LeadStore, PatchOutcome};
use crate::client::{HttpClient, LeadApi, NetworkHttpClient};
use crate::error::{ClientError, ClientResult};

pub struct LeadService<H: HttpClient = NetworkHttpClient> {
    api: LeadApi<H>,
    store: LeadStore,
}

impl<H: HttpClient> Clone for LeadService<H> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            store: self.store.clone(),
        }
    }
}

impl<H: HttpClient> LeadService<H> {
    pub fn new(api: LeadApi<H>, store: LeadStore) -> Self {
        Self { api, store }
    }

    pub fn store(&self) -> &LeadStore {
        &self.store
    }

    pub fn api(&self) -> &LeadApi<H> {
        &self.api
    }

    /// Fetch leads for `scope`, replacing the store contents
    pub async fn load(&self, scope: LeadScope) -> ClientResult<usize> {
        let leads = self.api.leads(scope).await?;
        let count = leads.len();
        self.store.dispatch(LeadAction::Loaded(leads));
        debug!(?scope, count, "leads loaded");
        Ok(count)
    }

    /// Fetch the leads the current user's role may see
    pub async fn load_for_session(&self) -> ClientResult<usize> {
        let role = self
            .api
            .session()
            .role()
            .ok_or(ClientError::Unauthorized)?;
        self.load(LeadScope::for_role(role)).await
    }

    /// Server-confirmed partial update
    ///
    /// Status-only patches use the status endpoint. Closing a lead stamps
    /// `closed_at`/`closed_by` from the session user.
    pub async fn patch(&self, id: LeadId, mut patch: LeadPatch) -> ClientResult<PatchOutcome> {
        if patch.is_empty() {
            return Err(ClientError::Validation("nothing to update".into()));
        }
        if patch.status == Some(LeadStatus::Closed) {
            if let Some(user) = self.api.session().user() {
                patch.closed = Some((Utc::now(), user.summary()));
            }
        }

        let ticket = self.store.begin(id);
        let result = match patch.status {
            Some(status) if patch.is_status_only() => self.api.update_status(id, status).await,
            _ => self.api.update_lead(id, &patch).await,
        };
        if let Err(e) = result {
            self.store.release(ticket);
            return Err(e);
        }

        Ok(self.store.commit(ticket, LeadAction::Patched { id, patch }))
    }

    pub async fn set_status(&self, id: LeadId, status: LeadStatus) -> ClientResult<PatchOutcome> {
        self.patch(id, LeadPatch::status(status)).await
    }

    pub async fn remove(&self, id: LeadId) -> ClientResult<PatchOutcome> {
        let ticket = self.store.begin(id);
        if let Err(e) = self.api.delete_lead(id).await {
            self.store.release(ticket);
            return Err(e);
        }
        let outcome = self.store.commit(ticket, LeadAction::Removed(id));
        info!(lead_id = id, ?outcome, "lead deleted");
        Ok(outcome)
    }

    /// Validate locally, create on the server and show the result first
    pub async fn create(&self, lead: NewLead) -> ClientResult<Lead> {
        lead.validate()?;
        let created = self.api.create_lead(&lead).await?;
        info!(lead_id = created.id, "lead created");
        self.store.dispatch(LeadAction::Created(created.clone()));
        Ok(created)
    }
}
