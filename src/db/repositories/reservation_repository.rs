use crate::db::models::{NewReservation, Reservation, ReservationStatus};
use sqlx::{Error, PgPool, Postgres, QueryBuilder, Transaction};
use time::Date;
use uuid::Uuid;

/// Filters accepted by the reservation listing.
#[derive(Debug, Default)]
pub struct ReservationFilter {
    pub status: Option<ReservationStatus>,
    pub from: Option<Date>,
    pub to: Option<Date>,
    pub q: Option<String>,
}

pub struct ReservationRepository;

impl ReservationRepository {
    pub async fn insert(
        tx: &mut Transaction<'_, Postgres>,
        code: &str,
        data: &NewReservation,
    ) -> Result<Reservation, Error> {
        sqlx::query_as::<_, Reservation>(
            r#"
            INSERT INTO reservations
                (id, org_id, code, guest_name, guest_contact, channel, status,
                 check_in, check_out, adults, children, notes, currency,
                 group_block_id, prearrival_token)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(data.org_id)
        .bind(code)
        .bind(&data.guest_name)
        .bind(&data.guest_contact)
        .bind(data.channel)
        .bind(data.status)
        .bind(data.check_in)
        .bind(data.check_out)
        .bind(data.adults)
        .bind(data.children)
        .bind(&data.notes)
        .bind(&data.currency)
        .bind(data.group_block_id)
        .bind(data.prearrival_token)
        .fetch_one(&mut **tx)
        .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        org_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Reservation>, Error> {
        sqlx::query_as::<_, Reservation>(
            "SELECT * FROM reservations WHERE org_id = $1 AND id = $2",
        )
        .bind(org_id)
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Locks the reservation row for the duration of the transaction so a
    /// concurrent transition cannot interleave with this one.
    pub async fn lock_by_id(
        tx: &mut Transaction<'_, Postgres>,
        org_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Reservation>, Error> {
        sqlx::query_as::<_, Reservation>(
            "SELECT * FROM reservations WHERE org_id = $1 AND id = $2 FOR UPDATE",
        )
        .bind(org_id)
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
    }

    pub async fn list(
        pool: &PgPool,
        org_id: Uuid,
        filter: &ReservationFilter,
        page: i64,
        page_size: i64,
    ) -> Result<Vec<Reservation>, Error> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT * FROM reservations WHERE org_id = ");
        builder.push_bind(org_id);

        if let Some(status) = filter.status {
            builder.push(" AND status = ").push_bind(status);
        }
        if let Some(from) = filter.from {
            builder.push(" AND check_out > ").push_bind(from);
        }
        if let Some(to) = filter.to {
            builder.push(" AND check_in <= ").push_bind(to);
        }
        if let Some(q) = filter.q.as_deref().filter(|q| !q.trim().is_empty()) {
            let pattern = format!("%{}%", q.trim());
            builder
                .push(" AND (code ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR guest_name ILIKE ")
                .push_bind(pattern)
                .push(")");
        }

        builder
            .push(" ORDER BY check_in DESC, code DESC LIMIT ")
            .push_bind(page_size)
            .push(" OFFSET ")
            .push_bind((page.max(1) - 1) * page_size);

        builder.build_query_as::<Reservation>().fetch_all(pool).await
    }

    /// Reservations whose `[check_in, check_out)` intersects the half-open
    /// day range `[start, end)`. Feeds the calendar projection.
    pub async fn list_intersecting(
        pool: &PgPool,
        org_id: Uuid,
        start: Date,
        end: Date,
    ) -> Result<Vec<Reservation>, Error> {
        sqlx::query_as::<_, Reservation>(
            r#"
            SELECT * FROM reservations
            WHERE org_id = $1 AND check_in < $2 AND check_out > $3
            ORDER BY check_in, code
            "#,
        )
        .bind(org_id)
        .bind(end)
        .bind(start)
        .fetch_all(pool)
        .await
    }

    pub async fn list_for_group(
        pool: &PgPool,
        org_id: Uuid,
        group_block_id: Uuid,
    ) -> Result<Vec<Reservation>, Error> {
        sqlx::query_as::<_, Reservation>(
            r#"
            SELECT * FROM reservations
            WHERE org_id = $1 AND group_block_id = $2
            ORDER BY check_in, code
            "#,
        )
        .bind(org_id)
        .bind(group_block_id)
        .fetch_all(pool)
        .await
    }

    pub async fn set_status(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        status: ReservationStatus,
    ) -> Result<Reservation, Error> {
        sqlx::query_as::<_, Reservation>(
            "UPDATE reservations SET status = $2, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_one(&mut **tx)
        .await
    }

    pub async fn stamp_checked_in(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> Result<Reservation, Error> {
        sqlx::query_as::<_, Reservation>(
            r#"
            UPDATE reservations
            SET status = 'in_house', checked_in_at = now(), updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_one(&mut **tx)
        .await
    }

    /// Check-out is a timestamp, not a status change. Returns None when the
    /// stay was already checked out.
    pub async fn stamp_checked_out(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> Result<Option<Reservation>, Error> {
        sqlx::query_as::<_, Reservation>(
            r#"
            UPDATE reservations
            SET checked_out_at = now(), updated_at = now()
            WHERE id = $1 AND checked_out_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
    }

    pub async fn update_notes(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        notes: Option<&str>,
    ) -> Result<Reservation, Error> {
        sqlx::query_as::<_, Reservation>(
            "UPDATE reservations SET notes = $2, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(notes)
        .fetch_one(&mut **tx)
        .await
    }

    pub async fn adjust_balance(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        delta: i64,
    ) -> Result<(), Error> {
        sqlx::query(
            "UPDATE reservations SET balance_due = balance_due + $2, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(delta)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Marks every stale pre-arrival reservation as a no-show. Running the
    /// sweep twice leaves the dataset unchanged: already-transitioned rows
    /// no longer match the status predicate.
    pub async fn sweep_no_shows(
        tx: &mut Transaction<'_, Postgres>,
        org_id: Uuid,
        today: Date,
    ) -> Result<Vec<Reservation>, Error> {
        sqlx::query_as::<_, Reservation>(
            r#"
            UPDATE reservations
            SET status = 'no_show', updated_at = now()
            WHERE org_id = $1
              AND status IN ('tentative', 'confirmed', 'guaranteed')
              AND check_in < $2
              AND checked_in_at IS NULL
            RETURNING *
            "#,
        )
        .bind(org_id)
        .bind(today)
        .fetch_all(&mut **tx)
        .await
    }
}
