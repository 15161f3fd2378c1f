/// Author record persistence
use crate::{
    authors::{AuthorRecord, MAX_AUTHOR_NAMES},
    error::{ApiError, ApiResult},
    names,
};
use chrono::Utc;
use sqlx::{Row, SqlitePool};

/// Author record manager service
pub struct AuthorManager {
    db: SqlitePool,
}

impl AuthorManager {
    /// Create a new author manager
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Create an author record.
    ///
    /// Every raw name passes through the formatter independently; empty
    /// names are dropped rather than stored. Record and names commit in a
    /// single transaction.
    pub async fn create(&self, raw_names: &[String]) -> ApiResult<i64> {
        let formatted = Self::format_names(raw_names)?;

        let mut tx = self.db.begin().await.map_err(ApiError::Database)?;

        let result = sqlx::query("INSERT INTO author_record (created_at) VALUES (?1)")
            .bind(Utc::now())
            .execute(&mut *tx)
            .await
            .map_err(|e| ApiError::Persistence {
                message: "Failed to save authors".to_string(),
                cause: e.to_string(),
            })?;

        let author_id = result.last_insert_rowid();
        Self::insert_names(&mut tx, author_id, &formatted).await?;

        tx.commit().await.map_err(ApiError::Database)?;

        tracing::info!("Author record created, id: {}", author_id);
        Ok(author_id)
    }

    /// Get an author record by id
    pub async fn get(&self, id: i64) -> ApiResult<AuthorRecord> {
        let exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM author_record WHERE id = ?1")
            .bind(id)
            .fetch_one(&self.db)
            .await
            .map_err(ApiError::Database)?;

        if exists == 0 {
            return Err(ApiError::NotFound(format!(
                "Author record {} not found",
                id
            )));
        }

        let names: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM author_name WHERE author_id = ?1 ORDER BY position",
        )
        .bind(id)
        .fetch_all(&self.db)
        .await
        .map_err(ApiError::Database)?;

        Ok(AuthorRecord { id, names })
    }

    /// List all author records
    pub async fn list(&self) -> ApiResult<Vec<AuthorRecord>> {
        let rows = sqlx::query(
            "SELECT ar.id, an.name
             FROM author_record ar
             LEFT JOIN author_name an ON an.author_id = ar.id
             ORDER BY ar.id, an.position",
        )
        .fetch_all(&self.db)
        .await
        .map_err(ApiError::Database)?;

        let mut records: Vec<AuthorRecord> = Vec::new();
        for row in rows {
            let id: i64 = row.get("id");
            let name: Option<String> = row.get("name");

            if records.last().map(|r| r.id) != Some(id) {
                records.push(AuthorRecord { id, names: vec![] });
            }
            if let Some(name) = name {
                if let Some(record) = records.last_mut() {
                    record.names.push(name);
                }
            }
        }

        Ok(records)
    }

    /// Replace the names of an existing author record.
    ///
    /// Incoming names are re-formatted; already-normalized values pass
    /// through unchanged. The record must still exist at commit time.
    pub async fn update(&self, id: i64, raw_names: &[String]) -> ApiResult<AuthorRecord> {
        let formatted = Self::format_names(raw_names)?;

        let mut tx = self.db.begin().await.map_err(ApiError::Database)?;

        let exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM author_record WHERE id = ?1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await
            .map_err(ApiError::Database)?;

        if exists == 0 {
            return Err(ApiError::NotFound(format!(
                "Author record {} does not exist",
                id
            )));
        }

        sqlx::query("DELETE FROM author_name WHERE author_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(ApiError::Database)?;

        Self::insert_names(&mut tx, id, &formatted).await?;

        tx.commit().await.map_err(ApiError::Database)?;

        tracing::info!("Author record updated, id: {}", id);
        Ok(AuthorRecord {
            id,
            names: formatted,
        })
    }

    /// Format the raw names, dropping empties and enforcing the cap
    fn format_names(raw_names: &[String]) -> ApiResult<Vec<String>> {
        if raw_names.len() > MAX_AUTHOR_NAMES {
            return Err(ApiError::Validation(format!(
                "At most {} author names are allowed",
                MAX_AUTHOR_NAMES
            )));
        }

        Ok(raw_names
            .iter()
            .filter_map(|raw| names::format_author_name(Some(raw)))
            .collect())
    }

    async fn insert_names(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        author_id: i64,
        formatted: &[String],
    ) -> ApiResult<()> {
        for (position, name) in formatted.iter().enumerate() {
            sqlx::query(
                "INSERT INTO author_name (author_id, position, name) VALUES (?1, ?2, ?3)",
            )
            .bind(author_id)
            .bind(position as i64)
            .bind(name)
            .execute(&mut **tx)
            .await
            .map_err(|e| ApiError::Persistence {
                message: "Failed to save authors".to_string(),
                cause: e.to_string(),
            })?;
        }

        Ok(())
    }
}
