//! Typed lead backend API
//!
//! Every authenticated call reads the bearer token from the [`Session`]. A
//! missing token fails locally; a 401 from the server clears the session.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use tracing::{info, warn};

use shared::client::{
    AssignRequest, BulkAssignRequest, CommentCreate, CommentUpdate, LoginRequest, LoginResponse,
    StatusUpdate,
};
use shared::models::{
    AnalyticsSummary, Comment, CommentId, Lead, LeadId, LeadPatch, LeadStatus, NewLead, User,
    UserId,
};

use super::http::{HttpClient, NetworkHttpClient};
use crate::error::{ClientError, ClientResult};
use crate::leads::LeadScope;
use crate::session::Session;

pub struct LeadApi<H: HttpClient = NetworkHttpClient> {
    http: Arc<H>,
    session: Session,
}

impl<H: HttpClient> Clone for LeadApi<H> {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
            session: self.session.clone(),
        }
    }
}

impl<H: HttpClient> LeadApi<H> {
    pub fn new(http: H, session: Session) -> Self {
        Self {
            http: Arc::new(http),
            session,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Clear the session when the server rejects the token
    fn guard<T>(&self, result: ClientResult<T>) -> ClientResult<T> {
        if let Err(ClientError::Unauthorized) = &result {
            if self.session.is_authenticated() {
                warn!("server rejected the session token, clearing session");
            }
            self.session.clear();
        }
        result
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let token = self.session.require_token()?;
        let result = self.http.get(path, Some(&token)).await;
        self.guard(result)
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let token = self.session.require_token()?;
        let result = self.http.post(path, Some(&token), body).await;
        self.guard(result)
    }

    async fn patch<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let token = self.session.require_token()?;
        let result = self.http.patch(path, Some(&token), body).await;
        self.guard(result)
    }

    async fn delete<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let token = self.session.require_token()?;
        let result = self.http.delete(path, Some(&token)).await;
        self.guard(result)
    }

    // ========== Auth API ==========

    /// Login with email and password; fills the session on success
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<User> {
        let req = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let resp: LoginResponse = self.http.post("/auth/login", None, &req).await?;
        if resp.token.is_empty() {
            return Err(ClientError::InvalidResponse("Missing login token".into()));
        }
        info!(user_id = resp.user.id, role = %resp.user.role, "logged in");
        self.session.set_login(resp.token, resp.user.clone());
        Ok(resp.user)
    }

    /// Refresh the current user from the server
    pub async fn me(&self) -> ClientResult<User> {
        let user: User = self.get("/auth/me").await?;
        self.session.set_user(user.clone());
        Ok(user)
    }

    /// Drop the local session (token issuance lives on the backend)
    pub fn logout(&self) {
        self.session.clear();
    }

    // ========== Lead API ==========

    pub async fn leads(&self, scope: LeadScope) -> ClientResult<Vec<Lead>> {
        self.get(scope.path()).await
    }

    pub async fn create_lead(&self, lead: &NewLead) -> ClientResult<Lead> {
        self.post("/leads", lead).await
    }

    pub async fn update_lead(&self, id: LeadId, patch: &LeadPatch) -> ClientResult<()> {
        let _: IgnoredAny = self.patch(&format!("/leads/{id}"), patch).await?;
        Ok(())
    }

    pub async fn update_status(&self, id: LeadId, status: LeadStatus) -> ClientResult<()> {
        let _: IgnoredAny = self
            .patch(&format!("/leads/{id}/status"), &StatusUpdate { status })
            .await?;
        Ok(())
    }

    pub async fn delete_lead(&self, id: LeadId) -> ClientResult<()> {
        let _: IgnoredAny = self.delete(&format!("/leads/{id}")).await?;
        Ok(())
    }

    pub async fn users(&self) -> ClientResult<Vec<User>> {
        self.get("/users").await
    }

    // ========== Assignment API ==========

    pub async fn assign(&self, lead_id: LeadId, assignee_ids: &[UserId]) -> ClientResult<()> {
        let body = AssignRequest {
            assignee_ids: assignee_ids.to_vec(),
        };
        let _: IgnoredAny = self
            .post(&format!("/assigns/{lead_id}/assign"), &body)
            .await?;
        Ok(())
    }

    pub async fn request_reassignment(
        &self,
        lead_id: LeadId,
        assignee_ids: &[UserId],
    ) -> ClientResult<()> {
        let body = AssignRequest {
            assignee_ids: assignee_ids.to_vec(),
        };
        let _: IgnoredAny = self
            .post(&format!("/assigns/{lead_id}/reassign-request"), &body)
            .await?;
        Ok(())
    }

    pub async fn bulk_assign(&self, lead_ids: &[LeadId], assignee_ids: &[UserId]) -> ClientResult<()> {
        let body = BulkAssignRequest {
            lead_ids: lead_ids.to_vec(),
            assignee_ids: assignee_ids.to_vec(),
        };
        let _: IgnoredAny = self.post("/assigns/bulk-assign", &body).await?;
        Ok(())
    }

    // ========== Comment API ==========

    pub async fn comments(&self, lead_id: LeadId) -> ClientResult<Vec<Comment>> {
        self.get(&format!("/comments/{lead_id}")).await
    }

    pub async fn post_comment(&self, lead_id: LeadId, body: &CommentCreate) -> ClientResult<Comment> {
        self.post(&format!("/comments/{lead_id}"), body).await
    }

    pub async fn edit_comment(
        &self,
        lead_id: LeadId,
        comment_id: CommentId,
        content: &str,
    ) -> ClientResult<Comment> {
        let body = CommentUpdate {
            content: content.to_string(),
        };
        self.patch(&format!("/comments/{lead_id}/{comment_id}"), &body)
            .await
    }

    pub async fn delete_comment(&self, lead_id: LeadId, comment_id: CommentId) -> ClientResult<()> {
        let _: IgnoredAny = self
            .delete(&format!("/comments/{lead_id}/{comment_id}"))
            .await?;
        Ok(())
    }

    // ========== Analytics API ==========

    /// Precomputed statistics for `[from, to]`
    pub async fn analytics(&self, from: NaiveDate, to: NaiveDate) -> ClientResult<AnalyticsSummary> {
        if from > to {
            return Err(ClientError::Validation(
                "analytics range start is after its end".into(),
            ));
        }
        let path = format!(
            "/analytics?from={}&to={}",
            from.format("%Y-%m-%d"),
            to.format("%Y-%m-%d")
        );
        self.get(&path).await
    }
}

impl LeadApi<NetworkHttpClient> {
    /// Network API from configuration; a configured token seeds the session
    pub fn from_config(config: &crate::ClientConfig) -> ClientResult<Self> {
        let http = NetworkHttpClient::new(config)?;
        let session = match &config.token {
            Some(token) => Session::with_token(token.clone()),
            None => Session::new(),
        };
        Ok(Self::new(http, session))
    }
}
