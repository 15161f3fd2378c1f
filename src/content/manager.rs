/// Content paragraph persistence
use crate::{
    content::{ContentParagraph, ContentParagraphUpsert, NewContentParagraph},
    error::{ApiError, ApiResult},
};
use sqlx::SqlitePool;

/// Content paragraph manager service
pub struct ContentManager {
    db: SqlitePool,
}

impl ContentManager {
    /// Create a new content manager
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// List all paragraphs
    pub async fn list(&self) -> ApiResult<Vec<ContentParagraph>> {
        sqlx::query_as::<_, ContentParagraph>(
            "SELECT id, reference_id, page_number, body FROM content_paragraph ORDER BY id",
        )
        .fetch_all(&self.db)
        .await
        .map_err(ApiError::Database)
    }

    /// List the paragraphs of one reference entry
    pub async fn list_by_reference(&self, reference_id: i64) -> ApiResult<Vec<ContentParagraph>> {
        let paragraphs = sqlx::query_as::<_, ContentParagraph>(
            "SELECT id, reference_id, page_number, body
             FROM content_paragraph WHERE reference_id = ?1 ORDER BY id",
        )
        .bind(reference_id)
        .fetch_all(&self.db)
        .await
        .map_err(ApiError::Database)?;

        if paragraphs.is_empty() {
            return Err(ApiError::NotFound(format!(
                "No content found for reference {}",
                reference_id
            )));
        }

        Ok(paragraphs)
    }

    /// Create a paragraph
    pub async fn create(&self, new: &NewContentParagraph) -> ApiResult<ContentParagraph> {
        let result = sqlx::query(
            "INSERT INTO content_paragraph (reference_id, page_number, body)
             VALUES (?1, ?2, ?3)",
        )
        .bind(new.reference_id)
        .bind(new.page_number)
        .bind(&new.body)
        .execute(&self.db)
        .await
        .map_err(ApiError::Database)?;

        Ok(ContentParagraph {
            id: result.last_insert_rowid(),
            reference_id: new.reference_id,
            page_number: new.page_number,
            body: new.body.clone(),
        })
    }

    /// Update a paragraph; the row must still exist
    pub async fn update(&self, paragraph: &ContentParagraph) -> ApiResult<()> {
        let result = sqlx::query(
            "UPDATE content_paragraph SET reference_id = ?1, page_number = ?2, body = ?3
             WHERE id = ?4",
        )
        .bind(paragraph.reference_id)
        .bind(paragraph.page_number)
        .bind(&paragraph.body)
        .bind(paragraph.id)
        .execute(&self.db)
        .await
        .map_err(ApiError::Database)?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(format!(
                "Content {} not found",
                paragraph.id
            )));
        }

        Ok(())
    }

    /// Delete a paragraph
    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        let result = sqlx::query("DELETE FROM content_paragraph WHERE id = ?1")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(ApiError::Database)?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound(format!("Content {} not found", id)));
        }

        Ok(())
    }

    /// Bulk upsert of paragraphs in one transaction.
    ///
    /// Items with a positive id update existing rows; a single missing
    /// target aborts the whole batch and no row changes. Items without an
    /// id are inserted.
    pub async fn update_by_reference(&self, paragraphs: &[ContentParagraphUpsert]) -> ApiResult<()> {
        if paragraphs.is_empty() {
            return Err(ApiError::Validation(
                "No content provided to update".to_string(),
            ));
        }

        let mut tx = self.db.begin().await.map_err(ApiError::Database)?;

        for paragraph in paragraphs {
            if paragraph.id > 0 {
                let result = sqlx::query(
                    "UPDATE content_paragraph SET reference_id = ?1, page_number = ?2, body = ?3
                     WHERE id = ?4",
                )
                .bind(paragraph.reference_id)
                .bind(paragraph.page_number)
                .bind(&paragraph.body)
                .bind(paragraph.id)
                .execute(&mut *tx)
                .await
                .map_err(ApiError::Database)?;

                if result.rows_affected() == 0 {
                    // Abort the whole batch; dropping the transaction rolls back
                    return Err(ApiError::NotFound(
                        "One or more content items were not found".to_string(),
                    ));
                }
            } else {
                sqlx::query(
                    "INSERT INTO content_paragraph (reference_id, page_number, body)
                     VALUES (?1, ?2, ?3)",
                )
                .bind(paragraph.reference_id)
                .bind(paragraph.page_number)
                .bind(&paragraph.body)
                .execute(&mut *tx)
                .await
                .map_err(ApiError::Database)?;
            }
        }

        tx.commit().await.map_err(ApiError::Database)?;

        tracing::info!("Bulk content update applied ({} items)", paragraphs.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use sqlx::SqlitePool;

    async fn seed_reference(pool: &SqlitePool) -> i64 {
        sqlx::query(
            "INSERT INTO user (username, email, password_hash, role, active, created_at)
             VALUES ('ana', 'ana@example.com', 'hash', 'User', TRUE, '2024-01-01T00:00:00Z')",
        )
        .execute(pool)
        .await
        .unwrap();

        sqlx::query("INSERT INTO author_record (created_at) VALUES ('2024-01-01T00:00:00Z')")
            .execute(pool)
            .await
            .unwrap();

        let result = sqlx::query(
            "INSERT INTO reference_entry (title, year, place, source, format, user_id, author_record_id)
             VALUES ('Title', 2020, NULL, NULL, 'APA', 1, 1)",
        )
        .execute(pool)
        .await
        .unwrap();

        result.last_insert_rowid()
    }

    fn upsert(id: i64, reference_id: i64, page: i64, body: &str) -> ContentParagraphUpsert {
        ContentParagraphUpsert {
            id,
            reference_id,
            page_number: page,
            body: body.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_list_by_reference() {
        let pool = db::test_pool().await;
        let reference_id = seed_reference(&pool).await;
        let manager = ContentManager::new(pool);

        manager
            .create(&NewContentParagraph {
                reference_id,
                page_number: 3,
                body: "First paragraph".to_string(),
            })
            .await
            .unwrap();

        let paragraphs = manager.list_by_reference(reference_id).await.unwrap();
        assert_eq!(paragraphs.len(), 1);
        assert_eq!(paragraphs[0].page_number, 3);
    }

    #[tokio::test]
    async fn test_list_by_reference_empty_is_not_found() {
        let pool = db::test_pool().await;
        let reference_id = seed_reference(&pool).await;
        let manager = ContentManager::new(pool);

        let err = manager.list_by_reference(reference_id).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_missing_row() {
        let pool = db::test_pool().await;
        let reference_id = seed_reference(&pool).await;
        let manager = ContentManager::new(pool);

        let err = manager
            .update(&ContentParagraph {
                id: 999,
                reference_id,
                page_number: 1,
                body: "x".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_bulk_update_aborts_whole_batch_on_missing_id() {
        let pool = db::test_pool().await;
        let reference_id = seed_reference(&pool).await;
        let manager = ContentManager::new(pool);

        let first = manager
            .create(&NewContentParagraph {
                reference_id,
                page_number: 1,
                body: "Original".to_string(),
            })
            .await
            .unwrap();

        let batch = vec![
            upsert(first.id, reference_id, 1, "Changed"),
            upsert(999, reference_id, 2, "Ghost"),
        ];

        let err = manager.update_by_reference(&batch).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));

        // The valid item must not have been applied either
        let paragraphs = manager.list_by_reference(reference_id).await.unwrap();
        assert_eq!(paragraphs.len(), 1);
        assert_eq!(paragraphs[0].body, "Original");
    }

    #[tokio::test]
    async fn test_bulk_update_mixes_updates_and_inserts() {
        let pool = db::test_pool().await;
        let reference_id = seed_reference(&pool).await;
        let manager = ContentManager::new(pool);

        let first = manager
            .create(&NewContentParagraph {
                reference_id,
                page_number: 1,
                body: "Original".to_string(),
            })
            .await
            .unwrap();

        let batch = vec![
            upsert(first.id, reference_id, 1, "Changed"),
            upsert(0, reference_id, 2, "Brand new"),
        ];

        manager.update_by_reference(&batch).await.unwrap();

        let paragraphs = manager.list_by_reference(reference_id).await.unwrap();
        assert_eq!(paragraphs.len(), 2);
        assert_eq!(paragraphs[0].body, "Changed");
        assert_eq!(paragraphs[1].body, "Brand new");
    }

    #[tokio::test]
    async fn test_bulk_update_rejects_empty_batch() {
        let pool = db::test_pool().await;
        let manager = ContentManager::new(pool);

        let err = manager.update_by_reference(&[]).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
