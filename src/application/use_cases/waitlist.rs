use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    entities::waitlist_entry::{WaitlistEntry, WaitlistStats},
};

/// A validated, normalized join request ready for the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWaitlistEntry {
    pub email: String,
    pub full_name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub external_user_id: Option<String>,
    pub metadata: serde_json::Value,
}

/// Raw join request as received from a client.
#[derive(Debug, Clone, Default)]
pub struct JoinRequest {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub external_user_id: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

impl JoinRequest {
    /// Presence checks and normalization. Email is trimmed and lowercased,
    /// names are trimmed, blank optionals are dropped.
    pub fn validate(self) -> AppResult<NewWaitlistEntry> {
        let email = non_blank(self.email).map(|e| e.to_lowercase());
        let full_name = non_blank(self.full_name);
        let (Some(email), Some(full_name)) = (email, full_name) else {
            return Err(AppError::InvalidInput(
                "Email and full name are required".into(),
            ));
        };

        let metadata = match self.metadata {
            None | Some(serde_json::Value::Null) => serde_json::json!({}),
            Some(value) => value,
        };

        Ok(NewWaitlistEntry {
            email,
            full_name,
            first_name: non_blank(self.first_name),
            last_name: non_blank(self.last_name),
            external_user_id: non_blank(self.external_user_id),
            metadata,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Result of a join attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum JoinOutcome {
    Joined(WaitlistEntry),
    AlreadyOnWaitlist,
}

#[async_trait]
pub trait WaitlistRepo: Send + Sync {
    /// Fails with `AppError::DuplicateEmail` when the email is already stored.
    async fn insert(&self, entry: &NewWaitlistEntry) -> AppResult<WaitlistEntry>;
    /// Newest first.
    async fn list_all(&self) -> AppResult<Vec<WaitlistEntry>>;
    /// Unapproved entries, oldest first.
    async fn list_pending(&self) -> AppResult<Vec<WaitlistEntry>>;
    async fn approve(&self, id: Uuid) -> AppResult<Option<WaitlistEntry>>;
    /// Only writes when the entry has no external id yet or already has this
    /// one; `None` when no row qualifies.
    async fn set_external_user_id(
        &self,
        id: Uuid,
        external_user_id: &str,
    ) -> AppResult<Option<WaitlistEntry>>;
    async fn get_by_email(&self, email: &str) -> AppResult<Option<WaitlistEntry>>;
    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<WaitlistEntry>>;
    async fn stats(&self) -> AppResult<WaitlistStats>;
    async fn delete(&self, id: Uuid) -> AppResult<Option<WaitlistEntry>>;
}

#[derive(Clone)]
pub struct WaitlistUseCases {
    repo: Arc<dyn WaitlistRepo>,
}

impl WaitlistUseCases {
    pub fn new(repo: Arc<dyn WaitlistRepo>) -> Self {
        Self { repo }
    }

    #[instrument(skip(self, request))]
    pub async fn add(&self, request: JoinRequest) -> AppResult<JoinOutcome> {
        let entry = request.validate()?;
        match self.repo.insert(&entry).await {
            Ok(saved) => {
                tracing::info!(entry_id = %saved.id, "Joined waitlist");
                Ok(JoinOutcome::Joined(saved))
            }
            Err(AppError::DuplicateEmail) => Ok(JoinOutcome::AlreadyOnWaitlist),
            Err(err) => Err(err),
        }
    }

    #[instrument(skip(self))]
    pub async fn list_all(&self) -> AppResult<Vec<WaitlistEntry>> {
        self.repo.list_all().await
    }

    #[instrument(skip(self))]
    pub async fn list_pending(&self) -> AppResult<Vec<WaitlistEntry>> {
        self.repo.list_pending().await
    }

    #[instrument(skip(self))]
    pub async fn approve(&self, id: Uuid) -> AppResult<Option<WaitlistEntry>> {
        let approved = self.repo.approve(id).await?;
        if approved.is_some() {
            tracing::info!(entry_id = %id, "Approved waitlist entry");
        }
        Ok(approved)
    }

    /// Fails with `AppError::AlreadyLinked` when the entry belongs to a
    /// different external id.
    #[instrument(skip(self))]
    pub async fn link_identity(
        &self,
        id: Uuid,
        external_user_id: &str,
    ) -> AppResult<Option<WaitlistEntry>> {
        let Some(entry) = self.repo.get_by_id(id).await? else {
            return Ok(None);
        };
        match entry.external_user_id.as_deref() {
            Some(current) if current == external_user_id => return Ok(Some(entry)),
            Some(_) => {
                tracing::warn!(entry_id = %id, "Refused to relink waitlist entry");
                return Err(AppError::AlreadyLinked);
            }
            None => {}
        }

        match self.repo.set_external_user_id(id, external_user_id).await? {
            Some(linked) => Ok(Some(linked)),
            // Linked or deleted concurrently.
            None => match self.repo.get_by_id(id).await? {
                Some(_) => Err(AppError::AlreadyLinked),
                None => Ok(None),
            },
        }
    }

    #[instrument(skip(self))]
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<WaitlistEntry>> {
        self.repo.get_by_email(&normalize_email(email)).await
    }

    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<WaitlistEntry>> {
        self.repo.get_by_id(id).await
    }

    #[instrument(skip(self))]
    pub async fn stats(&self) -> AppResult<WaitlistStats> {
        self.repo.stats().await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> AppResult<Option<WaitlistEntry>> {
        self.repo.delete(id).await
    }
}
