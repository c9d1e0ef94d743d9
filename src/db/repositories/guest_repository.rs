use crate::db::models::{CaptureKind, Guest, GuestCapture, NewGuest};
use sqlx::{Error, PgPool, Postgres, Transaction};
use uuid::Uuid;

pub struct GuestRepository;

impl GuestRepository {
    pub async fn insert(
        tx: &mut Transaction<'_, Postgres>,
        reservation_id: Uuid,
        data: &NewGuest,
    ) -> Result<Guest, Error> {
        sqlx::query_as::<_, Guest>(
            r#"
            INSERT INTO guests
                (id, reservation_id, name, mobile, email, nationality, gender,
                 age, address, id_type, id_number, relation, is_main)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(reservation_id)
        .bind(&data.name)
        .bind(&data.mobile)
        .bind(&data.email)
        .bind(&data.nationality)
        .bind(&data.gender)
        .bind(data.age)
        .bind(&data.address)
        .bind(&data.id_type)
        .bind(&data.id_number)
        .bind(data.relation.as_deref().unwrap_or("Main"))
        .bind(data.main)
        .fetch_one(&mut **tx)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Guest>, Error> {
        sqlx::query_as::<_, Guest>("SELECT * FROM guests WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_for_reservation(
        pool: &PgPool,
        reservation_id: Uuid,
    ) -> Result<Vec<Guest>, Error> {
        sqlx::query_as::<_, Guest>(
            "SELECT * FROM guests WHERE reservation_id = $1 ORDER BY is_main DESC, created_at",
        )
        .bind(reservation_id)
        .fetch_all(pool)
        .await
    }

    pub async fn list_for_reservation_tx(
        tx: &mut Transaction<'_, Postgres>,
        reservation_id: Uuid,
    ) -> Result<Vec<Guest>, Error> {
        sqlx::query_as::<_, Guest>(
            "SELECT * FROM guests WHERE reservation_id = $1 ORDER BY is_main DESC, created_at",
        )
        .bind(reservation_id)
        .fetch_all(&mut **tx)
        .await
    }

    /// Retake semantics: the previous reference for `(guest_id, kind)` is
    /// read under lock and replaced in the same transaction, so old and new
    /// refs are never both addressable. Returns the replaced ref, if any,
    /// so the caller can unlink the orphaned file after commit.
    pub async fn upsert_capture(
        tx: &mut Transaction<'_, Postgres>,
        guest_id: Uuid,
        kind: CaptureKind,
        image_ref: &str,
    ) -> Result<(GuestCapture, Option<String>), Error> {
        let previous: Option<String> = sqlx::query_scalar(
            "SELECT image_ref FROM guest_captures WHERE guest_id = $1 AND kind = $2 FOR UPDATE",
        )
        .bind(guest_id)
        .bind(kind)
        .fetch_optional(&mut **tx)
        .await?;

        let capture = sqlx::query_as::<_, GuestCapture>(
            r#"
            INSERT INTO guest_captures (id, guest_id, kind, image_ref, captured_at)
            VALUES ($1, $2, $3, $4, now())
            ON CONFLICT (guest_id, kind)
            DO UPDATE SET image_ref = EXCLUDED.image_ref, captured_at = now()
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(guest_id)
        .bind(kind)
        .bind(image_ref)
        .fetch_one(&mut **tx)
        .await?;

        Ok((capture, previous))
    }

    pub async fn captures_for_reservation(
        pool: &PgPool,
        reservation_id: Uuid,
    ) -> Result<Vec<GuestCapture>, Error> {
        sqlx::query_as::<_, GuestCapture>(
            r#"
            SELECT gc.* FROM guest_captures gc
            JOIN guests g ON g.id = gc.guest_id
            WHERE g.reservation_id = $1
            ORDER BY gc.captured_at
            "#,
        )
        .bind(reservation_id)
        .fetch_all(pool)
        .await
    }
}
