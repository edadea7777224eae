// leadline-client/tests/common/mod.rs
// Scripted HTTP transport and fixtures shared by the integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use leadline_client::models::{Lead, LeadStatus, Priority, Role, User, UserSummary};
use leadline_client::{ClientError, ClientResult, HttpClient, LeadApi, Session};

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: &'static str,
    pub path: String,
    pub token: Option<String>,
    pub body: Option<Value>,
}

struct Scripted {
    delay: Option<Duration>,
    result: ClientResult<Value>,
}

/// Replies with queued results in call order and records every call
#[derive(Clone, Default)]
pub struct MockHttp {
    calls: Arc<Mutex<Vec<Call>>>,
    replies: Arc<Mutex<VecDeque<Scripted>>>,
}

impl MockHttp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(&self, value: Value) -> &Self {
        self.queue(None, Ok(value))
    }

    pub fn reply_after(&self, delay: Duration, value: Value) -> &Self {
        self.queue(Some(delay), Ok(value))
    }

    pub fn fail(&self, error: ClientError) -> &Self {
        self.queue(None, Err(error))
    }

    fn queue(&self, delay: Option<Duration>, result: ClientResult<Value>) -> &Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(Scripted { delay, result });
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .map(|c| format!("{} {}", c.method, c.path))
            .collect()
    }

    async fn respond<T: DeserializeOwned>(
        &self,
        method: &'static str,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> ClientResult<T> {
        self.calls.lock().unwrap().push(Call {
            method,
            path: path.to_string(),
            token: token.map(str::to_string),
            body,
        });
        let scripted = self.replies.lock().unwrap().pop_front();
        let Some(scripted) = scripted else {
            return Err(ClientError::InvalidResponse(format!(
                "no scripted reply for {method} {path}"
            )));
        };
        if let Some(delay) = scripted.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(serde_json::from_value(scripted.result?)?)
    }
}

#[async_trait]
impl HttpClient for MockHttp {
    async fn get<T: DeserializeOwned>(&self, path: &str, token: Option<&str>) -> ClientResult<T> {
        self.respond("GET", path, token, None).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        token: Option<&str>,
        body: &B,
    ) -> ClientResult<T> {
        let body = serde_json::to_value(body)?;
        self.respond("POST", path, token, Some(body)).await
    }

    async fn patch<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        token: Option<&str>,
        body: &B,
    ) -> ClientResult<T> {
        let body = serde_json::to_value(body)?;
        self.respond("PATCH", path, token, Some(body)).await
    }

    async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
    ) -> ClientResult<T> {
        self.respond("DELETE", path, token, None).await
    }
}

// ========== Fixtures ==========

pub fn user(id: i64, name: &str, role: Role) -> User {
    User {
        id,
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        role,
        avatar: None,
    }
}

pub fn summary(id: i64, name: &str) -> UserSummary {
    UserSummary {
        id,
        name: name.to_string(),
    }
}

pub fn lead(id: i64, assignees: Vec<UserSummary>) -> Lead {
    let created = Utc.with_ymd_and_hms(2026, 10, 1, 9, 0, 0).unwrap();
    Lead {
        id,
        title: "Website".into(),
        customer_name: format!("Customer {id}"),
        phone: format!("98765{id:05}"),
        email: format!("c{id}@example.com"),
        status: LeadStatus::New,
        priority: Priority::Medium,
        due_date: None,
        description: None,
        state: None,
        district: None,
        location: None,
        created_at: created,
        updated_at: created,
        closed_at: None,
        closed_by: None,
        assignees,
        assigned_by: Vec::new(),
        assigned_at: None,
    }
}

pub fn lead_json(id: i64, assignees: Vec<UserSummary>) -> Value {
    serde_json::to_value(lead(id, assignees)).unwrap()
}

/// API handle for a logged-in user, plus the mock behind it
pub fn api_as(user: User) -> (LeadApi<MockHttp>, MockHttp) {
    let http = MockHttp::new();
    let session = Session::authenticated("test-token", user);
    (LeadApi::new(http.clone(), session), http)
}
