/// Reference entry persistence and format policy application
use crate::{
    citation::{self, CitationFormat},
    content::ContentParagraph,
    error::{ApiError, ApiResult},
    names,
    references::{
        CreateReferenceRequest, ReferenceEntry, ReferenceRow, UpdateReferenceRequest,
        UserReferenceView, MAX_FIELD_LEN,
    },
};
use sqlx::{Row, SqlitePool};
use std::collections::HashMap;

/// Reference entry manager service
pub struct ReferenceManager {
    db: SqlitePool,
}

impl ReferenceManager {
    /// Create a new reference manager
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// List all entries, each with its paragraphs
    pub async fn list(&self) -> ApiResult<Vec<ReferenceEntry>> {
        let rows = sqlx::query_as::<_, ReferenceRow>(
            "SELECT id, title, year, place, source, format, user_id, author_record_id
             FROM reference_entry ORDER BY id",
        )
        .fetch_all(&self.db)
        .await
        .map_err(ApiError::Database)?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            let paragraphs = self.paragraphs_of(row.id).await?;
            entries.push(Self::with_paragraphs(row, paragraphs));
        }

        Ok(entries)
    }

    /// Get one entry with its paragraphs
    pub async fn get(&self, id: i64) -> ApiResult<ReferenceEntry> {
        let row = self.get_row(id).await?;
        let paragraphs = self.paragraphs_of(id).await?;
        Ok(Self::with_paragraphs(row, paragraphs))
    }

    /// Project a user's entries for display: authors joined into a single
    /// comma-separated string, place suppressed for APA, newest year first
    pub async fn list_by_user(&self, user_id: i64) -> ApiResult<Vec<UserReferenceView>> {
        let rows = sqlx::query_as::<_, ReferenceRow>(
            "SELECT id, title, year, place, source, format, user_id, author_record_id
             FROM reference_entry WHERE user_id = ?1 ORDER BY year DESC",
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .map_err(ApiError::Database)?;

        // One scoped lookup for all author records this user references;
        // DISTINCT folds records shared by several entries
        let name_rows = sqlx::query(
            "SELECT DISTINCT an.author_id, an.position, an.name
             FROM author_name an
             JOIN reference_entry re ON re.author_record_id = an.author_id
             WHERE re.user_id = ?1
             ORDER BY an.author_id, an.position",
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .map_err(ApiError::Database)?;

        let mut author_names: HashMap<i64, Vec<String>> = HashMap::new();
        for name_row in name_rows {
            let author_id: i64 = name_row.get("author_id");
            author_names
                .entry(author_id)
                .or_default()
                .push(name_row.get("name"));
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let authors = author_names
                    .get(&row.author_record_id)
                    .map(|list| names::display_name_list(list))
                    .unwrap_or_default();
                UserReferenceView {
                    id: row.id,
                    author_record_id: row.author_record_id,
                    authors,
                    title: row.title,
                    year: row.year,
                    place: citation::place_on_display(&row.format, row.place),
                    source: row.source,
                    format: row.format,
                }
            })
            .collect())
    }

    /// Create a new entry. The referenced user and author record must
    /// exist; the citation format decides whether the place is kept.
    pub async fn create(&self, req: CreateReferenceRequest) -> ApiResult<i64> {
        if req.title.trim().is_empty() || req.author_record_id <= 0 {
            return Err(ApiError::Validation(
                "A title and a valid author record id are required".to_string(),
            ));
        }

        Self::check_field_lengths(&req.title, &req.place, &req.source)?;

        let user_exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user WHERE id = ?1")
            .bind(req.user_id)
            .fetch_one(&self.db)
            .await
            .map_err(ApiError::Database)?;
        if user_exists == 0 {
            return Err(ApiError::NotFound("The user does not exist".to_string()));
        }

        let author_exists: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM author_record WHERE id = ?1")
                .bind(req.author_record_id)
                .fetch_one(&self.db)
                .await
                .map_err(ApiError::Database)?;
        if author_exists == 0 {
            return Err(ApiError::NotFound(
                "The author record does not exist".to_string(),
            ));
        }

        let place = citation::place_on_create(&req.format, req.place);

        let result = sqlx::query(
            "INSERT INTO reference_entry (title, year, place, source, format, user_id, author_record_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&req.title)
        .bind(req.year)
        .bind(&place)
        .bind(&req.source)
        .bind(&req.format)
        .bind(req.user_id)
        .bind(req.author_record_id)
        .execute(&self.db)
        .await
        .map_err(|e| ApiError::Persistence {
            message: "Failed to save the reference".to_string(),
            cause: e.to_string(),
        })?;

        let id = result.last_insert_rowid();
        tracing::info!("Reference saved, id: {}", id);
        Ok(id)
    }

    /// Replace the basic fields of an entry, leaving foreign keys and
    /// paragraphs untouched. Place survives only under a Chicago tag.
    pub async fn update(&self, id: i64, req: UpdateReferenceRequest) -> ApiResult<()> {
        Self::check_field_lengths(&req.title, &req.place, &req.source)?;

        // Row-presence check before the write
        self.get_row(id).await?;

        let place = citation::place_on_update(&req.format, req.place);

        sqlx::query(
            "UPDATE reference_entry SET title = ?1, year = ?2, place = ?3, source = ?4, format = ?5
             WHERE id = ?6",
        )
        .bind(&req.title)
        .bind(req.year)
        .bind(&place)
        .bind(&req.source)
        .bind(&req.format)
        .bind(id)
        .execute(&self.db)
        .await
        .map_err(|e| ApiError::Persistence {
            message: "Failed to update the reference".to_string(),
            cause: e.to_string(),
        })?;

        tracing::info!("Reference updated, id: {}", id);
        Ok(())
    }

    /// Delete an entry, its paragraphs, and its author record atomically.
    /// Either all three deletions commit or none does.
    pub async fn delete(&self, id: i64) -> ApiResult<()> {
        let row = self.get_row(id).await?;

        let mut tx = self.db.begin().await.map_err(ApiError::Database)?;

        sqlx::query("DELETE FROM content_paragraph WHERE reference_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| ApiError::Persistence {
                message: "Failed to delete the reference".to_string(),
                cause: e.to_string(),
            })?;

        sqlx::query("DELETE FROM reference_entry WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| ApiError::Persistence {
                message: "Failed to delete the reference".to_string(),
                cause: e.to_string(),
            })?;

        // The associated author record goes with the entry
        sqlx::query("DELETE FROM author_record WHERE id = ?1")
            .bind(row.author_record_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| ApiError::Persistence {
                message: "Failed to delete the reference".to_string(),
                cause: e.to_string(),
            })?;

        tx.commit().await.map_err(ApiError::Database)?;

        tracing::info!("Reference deleted, id: {}", id);
        Ok(())
    }

    /// Switch an entry between APA and Chicago. Unknown tags are rejected
    /// here, unlike on the create/update paths.
    pub async fn change_format(
        &self,
        id: i64,
        format_tag: &str,
        place: Option<String>,
    ) -> ApiResult<()> {
        let format = CitationFormat::parse(format_tag)?;

        self.get_row(id).await?;

        let place = format.apply_place(place);

        sqlx::query("UPDATE reference_entry SET format = ?1, place = ?2 WHERE id = ?3")
            .bind(format.as_str())
            .bind(&place)
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(|e| ApiError::Persistence {
                message: "Failed to change the format".to_string(),
                cause: e.to_string(),
            })?;

        tracing::info!("Reference {} format changed to {}", id, format.as_str());
        Ok(())
    }

    async fn get_row(&self, id: i64) -> ApiResult<ReferenceRow> {
        sqlx::query_as::<_, ReferenceRow>(
            "SELECT id, title, year, place, source, format, user_id, author_record_id
             FROM reference_entry WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(ApiError::Database)?
        .ok_or_else(|| ApiError::NotFound("Reference not found".to_string()))
    }

    async fn paragraphs_of(&self, reference_id: i64) -> ApiResult<Vec<ContentParagraph>> {
        sqlx::query_as::<_, ContentParagraph>(
            "SELECT id, reference_id, page_number, body
             FROM content_paragraph WHERE reference_id = ?1 ORDER BY id",
        )
        .bind(reference_id)
        .fetch_all(&self.db)
        .await
        .map_err(ApiError::Database)
    }

    fn check_field_lengths(
        title: &str,
        place: &Option<String>,
        source: &Option<String>,
    ) -> ApiResult<()> {
        if title.chars().count() > MAX_FIELD_LEN {
            return Err(ApiError::Validation("Title too long".to_string()));
        }
        if let Some(place) = place {
            if place.chars().count() > MAX_FIELD_LEN {
                return Err(ApiError::Validation("Place too long".to_string()));
            }
        }
        if let Some(source) = source {
            if source.chars().count() > MAX_FIELD_LEN {
                return Err(ApiError::Validation("Source too long".to_string()));
            }
        }
        Ok(())
    }

    fn with_paragraphs(row: ReferenceRow, paragraphs: Vec<ContentParagraph>) -> ReferenceEntry {
        ReferenceEntry {
            id: row.id,
            title: row.title,
            year: row.year,
            place: row.place,
            source: row.source,
            format: row.format,
            user_id: row.user_id,
            author_record_id: row.author_record_id,
            paragraphs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ContentManager, NewContentParagraph};
    use crate::db;

    struct Fixture {
        references: ReferenceManager,
        content: ContentManager,
        pool: SqlitePool,
        user_id: i64,
    }

    async fn fixture() -> Fixture {
        let pool = db::test_pool().await;

        let user = sqlx::query(
            "INSERT INTO user (username, email, password_hash, role, active, created_at)
             VALUES ('ana', 'ana@example.com', 'hash', 'User', TRUE, '2024-01-01T00:00:00Z')",
        )
        .execute(&pool)
        .await
        .unwrap();

        Fixture {
            references: ReferenceManager::new(pool.clone()),
            content: ContentManager::new(pool.clone()),
            user_id: user.last_insert_rowid(),
            pool,
        }
    }

    async fn seed_author(pool: &SqlitePool, names: &[&str]) -> i64 {
        let result =
            sqlx::query("INSERT INTO author_record (created_at) VALUES ('2024-01-01T00:00:00Z')")
                .execute(pool)
                .await
                .unwrap();
        let id = result.last_insert_rowid();

        for (position, name) in names.iter().enumerate() {
            sqlx::query("INSERT INTO author_name (author_id, position, name) VALUES (?1, ?2, ?3)")
                .bind(id)
                .bind(position as i64)
                .bind(name)
                .execute(pool)
                .await
                .unwrap();
        }

        id
    }

    fn create_req(
        fx: &Fixture,
        author_record_id: i64,
        format: &str,
        year: i64,
        place: Option<&str>,
    ) -> CreateReferenceRequest {
        CreateReferenceRequest {
            title: "La ciudad y los perros".to_string(),
            year,
            place: place.map(|s| s.to_string()),
            source: Some("Editorial".to_string()),
            format: format.to_string(),
            user_id: fx.user_id,
            author_record_id,
        }
    }

    #[tokio::test]
    async fn test_create_apa_discards_place() {
        let fx = fixture().await;
        let author_id = seed_author(&fx.pool, &["Pérez|Juan"]).await;

        let id = fx
            .references
            .create(create_req(&fx, author_id, "apa", 2020, Some("Madrid")))
            .await
            .unwrap();

        let entry = fx.references.get(id).await.unwrap();
        assert_eq!(entry.place, None);
    }

    #[tokio::test]
    async fn test_create_chicago_preserves_place() {
        let fx = fixture().await;
        let author_id = seed_author(&fx.pool, &["Pérez|Juan"]).await;

        let id = fx
            .references
            .create(create_req(&fx, author_id, "Chicago", 2020, Some("Madrid")))
            .await
            .unwrap();

        let entry = fx.references.get(id).await.unwrap();
        assert_eq!(entry.place, Some("Madrid".to_string()));
    }

    #[tokio::test]
    async fn test_create_requires_existing_user_and_authors() {
        let fx = fixture().await;
        let author_id = seed_author(&fx.pool, &["Pérez|Juan"]).await;

        let mut req = create_req(&fx, author_id, "APA", 2020, None);
        req.user_id = 999;
        assert!(matches!(
            fx.references.create(req).await.unwrap_err(),
            ApiError::NotFound(_)
        ));

        let req = create_req(&fx, 999, "APA", 2020, None);
        assert!(matches!(
            fx.references.create(req).await.unwrap_err(),
            ApiError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_create_requires_title() {
        let fx = fixture().await;
        let author_id = seed_author(&fx.pool, &["Pérez|Juan"]).await;

        let mut req = create_req(&fx, author_id, "APA", 2020, None);
        req.title = "  ".to_string();
        assert!(matches!(
            fx.references.create(req).await.unwrap_err(),
            ApiError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn test_update_keeps_place_only_for_chicago() {
        let fx = fixture().await;
        let author_id = seed_author(&fx.pool, &["Pérez|Juan"]).await;
        let id = fx
            .references
            .create(create_req(&fx, author_id, "Chicago", 2020, Some("Madrid")))
            .await
            .unwrap();

        fx.references
            .update(
                id,
                UpdateReferenceRequest {
                    title: "Nueva edición".to_string(),
                    year: 2021,
                    place: Some("Lima".to_string()),
                    source: None,
                    format: "APA".to_string(),
                },
            )
            .await
            .unwrap();

        let entry = fx.references.get(id).await.unwrap();
        assert_eq!(entry.title, "Nueva edición");
        assert_eq!(entry.year, 2021);
        assert_eq!(entry.place, None);
        // Foreign keys untouched
        assert_eq!(entry.user_id, fx.user_id);
        assert_eq!(entry.author_record_id, author_id);
    }

    #[tokio::test]
    async fn test_list_by_user_projection() {
        let fx = fixture().await;
        let apa_author = seed_author(&fx.pool, &["Pérez|Juan", "Lopez|Maria"]).await;
        let chicago_author = seed_author(&fx.pool, &["Soto|Luis"]).await;

        fx.references
            .create(create_req(&fx, apa_author, "APA", 2019, Some("Madrid")))
            .await
            .unwrap();
        fx.references
            .create(create_req(&fx, chicago_author, "Chicago", 2022, Some("Lima")))
            .await
            .unwrap();

        let views = fx.references.list_by_user(fx.user_id).await.unwrap();
        assert_eq!(views.len(), 2);

        // Newest year first
        assert_eq!(views[0].year, 2022);
        assert_eq!(views[1].year, 2019);

        // Chicago shows its place, APA never does
        assert_eq!(views[0].place, Some("Lima".to_string()));
        assert_eq!(views[1].place, None);

        assert_eq!(views[0].authors, "Soto|Luis");
        assert_eq!(views[1].authors, "Pérez|Juan, Lopez|Maria");
    }

    #[tokio::test]
    async fn test_list_by_user_with_shared_author_record() {
        let fx = fixture().await;
        let author_id = seed_author(&fx.pool, &["Pérez|Juan", "Lopez|Maria"]).await;

        fx.references
            .create(create_req(&fx, author_id, "Chicago", 2020, Some("Lima")))
            .await
            .unwrap();
        fx.references
            .create(create_req(&fx, author_id, "Chicago", 2021, Some("Lima")))
            .await
            .unwrap();

        let views = fx.references.list_by_user(fx.user_id).await.unwrap();
        assert_eq!(views.len(), 2);

        // Sharing one author record must not duplicate names in the
        // display string
        for view in &views {
            assert_eq!(view.authors, "Pérez|Juan, Lopez|Maria");
        }
    }

    #[tokio::test]
    async fn test_delete_cascades_paragraphs_and_author_record() {
        let fx = fixture().await;
        let author_id = seed_author(&fx.pool, &["Pérez|Juan"]).await;
        let id = fx
            .references
            .create(create_req(&fx, author_id, "APA", 2020, None))
            .await
            .unwrap();

        fx.content
            .create(&NewContentParagraph {
                reference_id: id,
                page_number: 1,
                body: "Paragraph".to_string(),
            })
            .await
            .unwrap();

        fx.references.delete(id).await.unwrap();

        assert!(matches!(
            fx.references.get(id).await.unwrap_err(),
            ApiError::NotFound(_)
        ));

        let paragraphs: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM content_paragraph WHERE reference_id = ?1")
                .bind(id)
                .fetch_one(&fx.pool)
                .await
                .unwrap();
        assert_eq!(paragraphs, 0);

        let authors: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM author_record WHERE id = ?1")
                .bind(author_id)
                .fetch_one(&fx.pool)
                .await
                .unwrap();
        assert_eq!(authors, 0);
    }

    #[tokio::test]
    async fn test_delete_rolls_back_when_author_record_still_referenced() {
        let fx = fixture().await;
        let author_id = seed_author(&fx.pool, &["Pérez|Juan"]).await;

        let first = fx
            .references
            .create(create_req(&fx, author_id, "APA", 2020, None))
            .await
            .unwrap();
        let second = fx
            .references
            .create(create_req(&fx, author_id, "APA", 2021, None))
            .await
            .unwrap();

        // Deleting the first entry tries to delete the shared author
        // record, which the second entry still references
        let err = fx.references.delete(first).await.unwrap_err();
        assert!(matches!(err, ApiError::Persistence { .. }));

        // Nothing committed: the first entry is still there
        assert!(fx.references.get(first).await.is_ok());
        assert!(fx.references.get(second).await.is_ok());
    }

    #[tokio::test]
    async fn test_change_format_strict_and_mutates_only_format_and_place() {
        let fx = fixture().await;
        let author_id = seed_author(&fx.pool, &["Pérez|Juan"]).await;
        let id = fx
            .references
            .create(create_req(&fx, author_id, "APA", 2020, None))
            .await
            .unwrap();

        assert!(matches!(
            fx.references
                .change_format(id, "MLA", None)
                .await
                .unwrap_err(),
            ApiError::Validation(_)
        ));

        fx.references
            .change_format(id, "chicago", Some("Lima".to_string()))
            .await
            .unwrap();

        let entry = fx.references.get(id).await.unwrap();
        assert_eq!(entry.format, "Chicago");
        assert_eq!(entry.place, Some("Lima".to_string()));
        assert_eq!(entry.title, "La ciudad y los perros");

        fx.references.change_format(id, "APA", None).await.unwrap();
        let entry = fx.references.get(id).await.unwrap();
        assert_eq!(entry.format, "APA");
        assert_eq!(entry.place, None);
    }

    #[tokio::test]
    async fn test_change_format_missing_entry() {
        let fx = fixture().await;
        assert!(matches!(
            fx.references
                .change_format(999, "APA", None)
                .await
                .unwrap_err(),
            ApiError::NotFound(_)
        ));
    }
}
