use crate::db::models::{NewRoomStay, RoomStay, RoomStayBooking};
use sqlx::{Error, PgPool, Postgres, Transaction};
use uuid::Uuid;

pub struct RoomStayRepository;

impl RoomStayRepository {
    /// Serializes allocators racing for the same room. A plain row lock is
    /// not enough when the room has no stays yet (nothing to lock), so the
    /// conflict check takes a transaction-scoped advisory lock on the room
    /// key before reading.
    pub async fn lock_room(
        tx: &mut Transaction<'_, Postgres>,
        room_id: &str,
    ) -> Result<(), Error> {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(room_id)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Every stay booked on this room whose parent reservation is still
    /// live, locked for the duration of the transaction.
    pub async fn bookings_for_room(
        tx: &mut Transaction<'_, Postgres>,
        room_id: &str,
    ) -> Result<Vec<RoomStayBooking>, Error> {
        sqlx::query_as::<_, RoomStayBooking>(
            r#"
            SELECT rs.reservation_id,
                   r.code AS reservation_code,
                   r.status,
                   rs.check_in,
                   rs.check_out
            FROM room_stays rs
            JOIN reservations r ON r.id = rs.reservation_id
            WHERE rs.room_id = $1
              AND r.status NOT IN ('cancelled', 'no_show')
            FOR UPDATE OF rs
            "#,
        )
        .bind(room_id)
        .fetch_all(&mut **tx)
        .await
    }

    pub async fn insert(
        tx: &mut Transaction<'_, Postgres>,
        reservation_id: Uuid,
        data: &NewRoomStay,
    ) -> Result<RoomStay, Error> {
        sqlx::query_as::<_, RoomStay>(
            r#"
            INSERT INTO room_stays
                (id, reservation_id, room_id, room_type, rate_plan,
                 check_in, check_out, adults, children)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(reservation_id)
        .bind(&data.room_id)
        .bind(&data.room_type)
        .bind(&data.rate_plan)
        .bind(data.check_in)
        .bind(data.check_out)
        .bind(data.adults)
        .bind(data.children)
        .fetch_one(&mut **tx)
        .await
    }

    pub async fn list_for_reservation(
        pool: &PgPool,
        reservation_id: Uuid,
    ) -> Result<Vec<RoomStay>, Error> {
        sqlx::query_as::<_, RoomStay>(
            "SELECT * FROM room_stays WHERE reservation_id = $1 ORDER BY created_at",
        )
        .bind(reservation_id)
        .fetch_all(pool)
        .await
    }
}
