use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, types::Json};
use std::str::FromStr;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    entities::waitlist_entry::{WaitlistEntry, WaitlistStats, WaitlistStatus},
    use_cases::waitlist::{NewWaitlistEntry, WaitlistRepo},
};

const COLUMNS: &str = "id, email, full_name, first_name, last_name, waitlisted_at, approved, \
     approved_at, external_user_id, metadata, status, created_at, updated_at";

// Waitlist entry as stored in the db.
#[derive(FromRow, Debug)]
struct WaitlistEntryDb {
    id: Uuid,
    email: String,
    full_name: String,
    first_name: Option<String>,
    last_name: Option<String>,
    waitlisted_at: DateTime<Utc>,
    approved: bool,
    approved_at: Option<DateTime<Utc>>,
    external_user_id: Option<String>,
    metadata: Json<serde_json::Value>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<WaitlistEntryDb> for WaitlistEntry {
    type Error = AppError;

    fn try_from(row: WaitlistEntryDb) -> AppResult<Self> {
        let status = WaitlistStatus::from_str(&row.status).map_err(|_| {
            tracing::error!(entry_id = %row.id, status = %row.status, "Unknown waitlist status");
            AppError::Database("Database operation failed".into())
        })?;

        Ok(WaitlistEntry {
            id: row.id,
            email: row.email,
            full_name: row.full_name,
            first_name: row.first_name,
            last_name: row.last_name,
            waitlisted_at: row.waitlisted_at,
            approved: row.approved,
            approved_at: row.approved_at,
            external_user_id: row.external_user_id,
            metadata: row.metadata.0,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct WaitlistStatsDb {
    total: i64,
    pending: i64,
    approved: i64,
}

fn into_entries(rows: Vec<WaitlistEntryDb>) -> AppResult<Vec<WaitlistEntry>> {
    rows.into_iter().map(WaitlistEntry::try_from).collect()
}

fn into_entry(row: Option<WaitlistEntryDb>) -> AppResult<Option<WaitlistEntry>> {
    row.map(WaitlistEntry::try_from).transpose()
}

#[async_trait]
impl WaitlistRepo for PostgresPersistence {
    async fn insert(&self, entry: &NewWaitlistEntry) -> AppResult<WaitlistEntry> {
        let row = sqlx::query_as::<_, WaitlistEntryDb>(&format!(
            r#"INSERT INTO waitlist_entries
                   (id, email, full_name, first_name, last_name, external_user_id, metadata, status)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               RETURNING {COLUMNS}"#
        ))
        .bind(Uuid::new_v4())
        .bind(&entry.email)
        .bind(&entry.full_name)
        .bind(&entry.first_name)
        .bind(&entry.last_name)
        .bind(&entry.external_user_id)
        .bind(Json(&entry.metadata))
        .bind(WaitlistStatus::Pending.to_string())
        .fetch_one(self.pool())
        .await?;

        row.try_into()
    }

    async fn list_all(&self) -> AppResult<Vec<WaitlistEntry>> {
        let rows = sqlx::query_as::<_, WaitlistEntryDb>(&format!(
            "SELECT {COLUMNS} FROM waitlist_entries ORDER BY waitlisted_at DESC, id DESC"
        ))
        .fetch_all(self.pool())
        .await?;

        into_entries(rows)
    }

    async fn list_pending(&self) -> AppResult<Vec<WaitlistEntry>> {
        let rows = sqlx::query_as::<_, WaitlistEntryDb>(&format!(
            "SELECT {COLUMNS} FROM waitlist_entries WHERE approved = FALSE ORDER BY waitlisted_at ASC, id ASC"
        ))
        .fetch_all(self.pool())
        .await?;

        into_entries(rows)
    }

    async fn approve(&self, id: Uuid) -> AppResult<Option<WaitlistEntry>> {
        let row = sqlx::query_as::<_, WaitlistEntryDb>(&format!(
            r#"UPDATE waitlist_entries
               SET approved = TRUE, approved_at = now(), status = $2, updated_at = now()
               WHERE id = $1
               RETURNING {COLUMNS}"#
        ))
        .bind(id)
        .bind(WaitlistStatus::Approved.to_string())
        .fetch_optional(self.pool())
        .await?;

        into_entry(row)
    }

    async fn set_external_user_id(
        &self,
        id: Uuid,
        external_user_id: &str,
    ) -> AppResult<Option<WaitlistEntry>> {
        let row = sqlx::query_as::<_, WaitlistEntryDb>(&format!(
            r#"UPDATE waitlist_entries
               SET external_user_id = $2, updated_at = now()
               WHERE id = $1 AND (external_user_id IS NULL OR external_user_id = $2)
               RETURNING {COLUMNS}"#
        ))
        .bind(id)
        .bind(external_user_id)
        .fetch_optional(self.pool())
        .await?;

        into_entry(row)
    }

    async fn get_by_email(&self, email: &str) -> AppResult<Option<WaitlistEntry>> {
        let row = sqlx::query_as::<_, WaitlistEntryDb>(&format!(
            "SELECT {COLUMNS} FROM waitlist_entries WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool())
        .await?;

        into_entry(row)
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<WaitlistEntry>> {
        let row = sqlx::query_as::<_, WaitlistEntryDb>(&format!(
            "SELECT {COLUMNS} FROM waitlist_entries WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        into_entry(row)
    }

    async fn stats(&self) -> AppResult<WaitlistStats> {
        let row = sqlx::query_as::<_, WaitlistStatsDb>(
            r#"SELECT COUNT(*) AS total,
                      COUNT(*) FILTER (WHERE approved = FALSE) AS pending,
                      COUNT(*) FILTER (WHERE approved = TRUE) AS approved
               FROM waitlist_entries"#,
        )
        .fetch_one(self.pool())
        .await?;

        Ok(WaitlistStats {
            total: row.total,
            pending: row.pending,
            approved: row.approved,
        })
    }

    async fn delete(&self, id: Uuid) -> AppResult<Option<WaitlistEntry>> {
        let row = sqlx::query_as::<_, WaitlistEntryDb>(&format!(
            "DELETE FROM waitlist_entries WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        into_entry(row)
    }
}
