use crate::db::models::{ActivityEvent, ChargeLine, NewChargeLine, NewPayment, Payment};
use sqlx::{Error, PgPool, Postgres, Transaction};
use uuid::Uuid;

/// Append-only charge, payment and activity records. No update or delete
/// surface exists on purpose.
pub struct LedgerRepository;

impl LedgerRepository {
    pub async fn insert_charge(
        tx: &mut Transaction<'_, Postgres>,
        reservation_id: Uuid,
        data: &NewChargeLine,
    ) -> Result<ChargeLine, Error> {
        sqlx::query_as::<_, ChargeLine>(
            r#"
            INSERT INTO charge_lines
                (id, reservation_id, charge_date, code, description, amount, currency)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(reservation_id)
        .bind(data.charge_date)
        .bind(&data.code)
        .bind(&data.description)
        .bind(data.amount)
        .bind(&data.currency)
        .fetch_one(&mut **tx)
        .await
    }

    pub async fn insert_payment(
        tx: &mut Transaction<'_, Postgres>,
        reservation_id: Uuid,
        data: &NewPayment,
    ) -> Result<Payment, Error> {
        sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (id, reservation_id, amount, currency, note)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(reservation_id)
        .bind(data.amount)
        .bind(&data.currency)
        .bind(&data.note)
        .fetch_one(&mut **tx)
        .await
    }

    pub async fn insert_event(
        tx: &mut Transaction<'_, Postgres>,
        reservation_id: Uuid,
        event_code: &str,
        note: Option<&str>,
    ) -> Result<ActivityEvent, Error> {
        sqlx::query_as::<_, ActivityEvent>(
            r#"
            INSERT INTO activity_events (id, reservation_id, event_code, note)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(reservation_id)
        .bind(event_code)
        .bind(note)
        .fetch_one(&mut **tx)
        .await
    }

    pub async fn list_charges(
        pool: &PgPool,
        reservation_id: Uuid,
    ) -> Result<Vec<ChargeLine>, Error> {
        sqlx::query_as::<_, ChargeLine>(
            "SELECT * FROM charge_lines WHERE reservation_id = $1 ORDER BY charge_date, created_at",
        )
        .bind(reservation_id)
        .fetch_all(pool)
        .await
    }

    pub async fn list_payments(
        pool: &PgPool,
        reservation_id: Uuid,
    ) -> Result<Vec<Payment>, Error> {
        sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE reservation_id = $1 ORDER BY created_at",
        )
        .bind(reservation_id)
        .fetch_all(pool)
        .await
    }

    pub async fn list_events(
        pool: &PgPool,
        reservation_id: Uuid,
    ) -> Result<Vec<ActivityEvent>, Error> {
        sqlx::query_as::<_, ActivityEvent>(
            "SELECT * FROM activity_events WHERE reservation_id = $1 ORDER BY created_at",
        )
        .bind(reservation_id)
        .fetch_all(pool)
        .await
    }
}
