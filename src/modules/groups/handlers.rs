use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::app_state::AppState;
use crate::db::{
    GroupBlock, GroupBlockRepository, GroupBlockStatus, NewGroupBlock, Reservation,
    ReservationRepository,
};
use crate::error::AppResult;
use crate::extract::OrgId;
use crate::modules::reservations::{validate_stay_range, ReservationError};

#[derive(Debug, Deserialize)]
pub struct GroupListQuery {
    pub q: Option<String>,
    pub status: Option<GroupBlockStatus>,
}

#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: GroupBlockStatus,
}

pub async fn list_groups(
    State(state): State<AppState>,
    OrgId(org_id): OrgId,
    Query(query): Query<GroupListQuery>,
) -> AppResult<Json<Vec<GroupBlock>>> {
    let blocks =
        GroupBlockRepository::list(&state.db, org_id, query.q.as_deref(), query.status).await?;
    Ok(Json(blocks))
}

pub async fn create_group(
    State(state): State<AppState>,
    OrgId(org_id): OrgId,
    Json(payload): Json<NewGroupBlock>,
) -> AppResult<(StatusCode, Json<GroupBlock>)> {
    payload.validate().map_err(ReservationError::from)?;
    if let (Some(start), Some(end)) = (payload.start_date, payload.end_date) {
        validate_stay_range(start, end)?;
    }

    let mut tx = state.db.begin().await?;
    let block = GroupBlockRepository::insert(&mut tx, org_id, &payload).await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(block)))
}

/// Updating a block's status is purely informational; member reservations
/// are never touched.
pub async fn set_group_status(
    State(state): State<AppState>,
    OrgId(org_id): OrgId,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetStatusRequest>,
) -> AppResult<Json<GroupBlock>> {
    let mut tx = state.db.begin().await?;
    let block = GroupBlockRepository::set_status(&mut tx, org_id, id, payload.status)
        .await?
        .ok_or(ReservationError::NotFound("Group block"))?;
    tx.commit().await?;

    Ok(Json(block))
}

/// Read-side join: members reference the block by id, nothing cascades.
pub async fn group_reservations(
    State(state): State<AppState>,
    OrgId(org_id): OrgId,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<Reservation>>> {
    GroupBlockRepository::find_by_id(&state.db, org_id, id)
        .await?
        .ok_or(ReservationError::NotFound("Group block"))?;

    let members = ReservationRepository::list_for_group(&state.db, org_id, id).await?;
    Ok(Json(members))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{ReservationChannel, ReservationStatus};
    use crate::modules::reservations::capture::GateStatus;
    use crate::modules::reservations::lifecycle::{self, ReservationAction, TransitionPolicy};
    use time::macros::date;
    use time::OffsetDateTime;

    #[test]
    fn cancelling_a_block_never_touches_member_lifecycle() {
        let block = GroupBlock {
            id: Uuid::now_v7(),
            org_id: Uuid::now_v7(),
            name: "Rao wedding".to_string(),
            status: GroupBlockStatus::Cancelled,
            start_date: None,
            end_date: None,
            company: None,
            notes: None,
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        };
        let member = Reservation {
            id: Uuid::now_v7(),
            org_id: block.org_id,
            code: "RSV-20250601-ABCDEF".to_string(),
            guest_name: "Asha Rao".to_string(),
            guest_contact: Some("555-0101".to_string()),
            channel: ReservationChannel::Direct,
            status: ReservationStatus::Confirmed,
            check_in: date!(2025 - 06 - 01),
            check_out: date!(2025 - 06 - 03),
            adults: 1,
            children: 0,
            notes: None,
            balance_due: 0,
            currency: "USD".to_string(),
            group_block_id: Some(block.id),
            prearrival_token: None,
            checked_in_at: None,
            checked_out_at: None,
            created_at: OffsetDateTime::now_utc(),
            updated_at: OffsetDateTime::now_utc(),
        };

        // Member transitions consult the member's own status only; the
        // block's status is not an input to the state machine, so a member
        // of a cancelled block still checks in.
        let gate = GateStatus {
            expected_guests: 1,
            captured_count: 1,
            satisfied: true,
        };
        let policy = TransitionPolicy {
            allow_capture_override: false,
        };
        let outcome = lifecycle::apply(
            member.status,
            ReservationAction::CheckIn {
                override_capture: false,
            },
            &gate,
            &policy,
        )
        .unwrap();
        assert_eq!(outcome.new_status, ReservationStatus::InHouse);
        assert_eq!(member.status, ReservationStatus::Confirmed);
        assert_eq!(block.status, GroupBlockStatus::Cancelled);
    }
}
