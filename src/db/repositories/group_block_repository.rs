use crate::db::models::{GroupBlock, GroupBlockStatus, NewGroupBlock};
use sqlx::{Error, PgPool, Postgres, QueryBuilder, Transaction};
use uuid::Uuid;

pub struct GroupBlockRepository;

impl GroupBlockRepository {
    pub async fn insert(
        tx: &mut Transaction<'_, Postgres>,
        org_id: Uuid,
        data: &NewGroupBlock,
    ) -> Result<GroupBlock, Error> {
        sqlx::query_as::<_, GroupBlock>(
            r#"
            INSERT INTO group_blocks
                (id, org_id, name, status, start_date, end_date, company, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(org_id)
        .bind(&data.name)
        .bind(data.status.unwrap_or(GroupBlockStatus::Planned))
        .bind(data.start_date)
        .bind(data.end_date)
        .bind(&data.company)
        .bind(&data.notes)
        .fetch_one(&mut **tx)
        .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        org_id: Uuid,
        id: Uuid,
    ) -> Result<Option<GroupBlock>, Error> {
        sqlx::query_as::<_, GroupBlock>(
            "SELECT * FROM group_blocks WHERE org_id = $1 AND id = $2",
        )
        .bind(org_id)
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn list(
        pool: &PgPool,
        org_id: Uuid,
        q: Option<&str>,
        status: Option<GroupBlockStatus>,
    ) -> Result<Vec<GroupBlock>, Error> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT * FROM group_blocks WHERE org_id = ");
        builder.push_bind(org_id);

        if let Some(status) = status {
            builder.push(" AND status = ").push_bind(status);
        }
        if let Some(q) = q.filter(|q| !q.trim().is_empty()) {
            builder
                .push(" AND name ILIKE ")
                .push_bind(format!("%{}%", q.trim()));
        }
        builder.push(" ORDER BY created_at DESC");

        builder.build_query_as::<GroupBlock>().fetch_all(pool).await
    }

    /// The block's status is informational only; changing it never touches
    /// member reservations.
    pub async fn set_status(
        tx: &mut Transaction<'_, Postgres>,
        org_id: Uuid,
        id: Uuid,
        status: GroupBlockStatus,
    ) -> Result<Option<GroupBlock>, Error> {
        sqlx::query_as::<_, GroupBlock>(
            r#"
            UPDATE group_blocks
            SET status = $3, updated_at = now()
            WHERE org_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(org_id)
        .bind(id)
        .bind(status)
        .fetch_optional(&mut **tx)
        .await
    }
}
