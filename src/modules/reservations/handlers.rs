use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::calendar::{self, MonthCalendar};
use super::capture;
use super::dto::*;
use super::error::{validate_stay_range, ReservationError};
use super::lifecycle::{self, ReservationAction, Stamp, TransitionPolicy};
use super::{allocator, PAGE_SIZE};
use crate::app_state::AppState;
use crate::config;
use crate::db::{
    GuestRepository, LedgerRepository, NewChargeLine, NewGuest, NewPayment, NewReservation,
    NewRoomStay, Reservation, ReservationFilter, ReservationRepository, ReservationStatus,
    RoomStay, RoomStayRepository,
};
use crate::error::{AppError, AppResult};
use crate::extract::OrgId;
use crate::media;

/// Human-readable reservation code, unique per organization.
fn generate_code(check_in: time::Date) -> String {
    let raw = Uuid::now_v7().simple().to_string();
    let suffix = raw[raw.len() - 6..].to_uppercase();
    format!(
        "RSV-{:04}{:02}{:02}-{}",
        check_in.year(),
        u8::from(check_in.month()),
        check_in.day(),
        suffix
    )
}

fn current_policy() -> TransitionPolicy {
    TransitionPolicy {
        allow_capture_override: config::get().policy.allow_capture_override,
    }
}

pub async fn list_reservations(
    State(state): State<AppState>,
    OrgId(org_id): OrgId,
    Query(query): Query<ReservationListQuery>,
) -> AppResult<Json<ReservationListResponse>> {
    let filter = ReservationFilter {
        status: query.status,
        from: query.from,
        to: query.to,
        q: query.q,
    };
    let page = query.page.unwrap_or(1).max(1);
    let items = ReservationRepository::list(&state.db, org_id, &filter, page, PAGE_SIZE).await?;
    Ok(Json(ReservationListResponse {
        page,
        page_size: PAGE_SIZE,
        items,
    }))
}

pub async fn create_reservation(
    State(state): State<AppState>,
    OrgId(org_id): OrgId,
    Json(payload): Json<CreateReservationRequest>,
) -> AppResult<(StatusCode, Json<ReservationDetail>)> {
    payload.validate().map_err(ReservationError::from)?;
    validate_stay_range(payload.check_in, payload.check_out)?;
    for room in &payload.rooms {
        validate_stay_range(room.check_in, room.check_out)?;
    }

    let status = match payload.status {
        None => ReservationStatus::Confirmed,
        Some(s @ (ReservationStatus::Confirmed | ReservationStatus::Tentative)) => s,
        Some(other) => {
            return Err(ReservationError::Validation(format!(
                "A staff-created reservation must start as tentative or confirmed, not '{}'",
                other.as_str()
            ))
            .into())
        }
    };

    let main_guest = resolve_main_guest(&state, &payload).await?;

    let new_reservation = NewReservation {
        org_id,
        guest_name: main_guest.name.clone(),
        guest_contact: main_guest.mobile.clone().or_else(|| main_guest.email.clone()),
        channel: payload.channel,
        status,
        check_in: payload.check_in,
        check_out: payload.check_out,
        adults: payload.adults,
        children: payload.children,
        notes: payload.notes.clone(),
        currency: payload.currency.clone().unwrap_or_else(|| "USD".to_string()),
        group_block_id: payload.group_block_id,
        prearrival_token: None,
    };

    // Capture images are written to disk before the transaction commits;
    // on rollback they are unlinked again so a failed create leaves nothing.
    let mut stored_refs: Vec<String> = Vec::new();
    match create_in_tx(&state, &payload, &new_reservation, &main_guest, &mut stored_refs).await {
        Ok(id) => {
            let detail = load_detail(&state, org_id, id).await?;
            info!(reservation = %detail.reservation.code, "Reservation created");
            Ok((StatusCode::CREATED, Json(detail)))
        }
        Err(err) => {
            for reference in &stored_refs {
                media::remove_capture(reference).await;
            }
            Err(err)
        }
    }
}

async fn resolve_main_guest(
    state: &AppState,
    payload: &CreateReservationRequest,
) -> AppResult<NewGuest> {
    match payload.guest_mode {
        GuestMode::New => {
            let name = payload
                .guest_name
                .clone()
                .filter(|n| !n.trim().is_empty())
                .ok_or_else(|| {
                    ReservationError::Validation(
                        "guest_name is required when guest_mode is 'new'".to_string(),
                    )
                })?;
            Ok(NewGuest {
                name,
                mobile: payload.guest_mobile.clone(),
                email: payload.guest_email.clone(),
                nationality: None,
                gender: None,
                age: None,
                address: None,
                id_type: None,
                id_number: None,
                relation: Some("Main".to_string()),
                main: true,
            })
        }
        GuestMode::Existing => {
            let guest_id = payload.existing_guest_id.ok_or_else(|| {
                ReservationError::Validation(
                    "existing_guest_id is required when guest_mode is 'existing'".to_string(),
                )
            })?;
            let guest = GuestRepository::find_by_id(&state.db, guest_id)
                .await?
                .ok_or(ReservationError::NotFound("Guest"))?;
            Ok(NewGuest {
                name: guest.name,
                mobile: guest.mobile,
                email: guest.email,
                nationality: guest.nationality,
                gender: guest.gender,
                age: guest.age,
                address: guest.address,
                id_type: guest.id_type,
                id_number: guest.id_number,
                relation: Some("Main".to_string()),
                main: true,
            })
        }
    }
}

async fn create_in_tx(
    state: &AppState,
    payload: &CreateReservationRequest,
    new_reservation: &NewReservation,
    main_guest: &NewGuest,
    stored_refs: &mut Vec<String>,
) -> AppResult<Uuid> {
    let mut tx = state.db.begin().await?;

    let code = generate_code(new_reservation.check_in);
    let reservation = ReservationRepository::insert(&mut tx, &code, new_reservation).await?;

    // Rooms are claimed in a stable order so two concurrent multi-room
    // creates cannot deadlock on each other's advisory locks.
    let mut rooms: Vec<&NewRoomStay> = payload.rooms.iter().collect();
    rooms.sort_by(|a, b| a.room_id.cmp(&b.room_id));
    for room in rooms {
        RoomStayRepository::lock_room(&mut tx, &room.room_id).await?;
        let existing = RoomStayRepository::bookings_for_room(&mut tx, &room.room_id).await?;
        allocator::find_conflict(
            &room.room_id,
            reservation.id,
            room.check_in,
            room.check_out,
            &existing,
        )?;
        RoomStayRepository::insert(&mut tx, reservation.id, room).await?;
    }

    let main = GuestRepository::insert(&mut tx, reservation.id, main_guest).await?;
    for extra in &payload.extra_guests {
        let extra = NewGuest {
            main: false,
            ..extra.clone()
        };
        GuestRepository::insert(&mut tx, reservation.id, &extra).await?;
    }

    let inline_captures = [
        (crate::db::CaptureKind::Face, &payload.bio_face_data),
        (crate::db::CaptureKind::IdFront, &payload.bio_id_front_data),
        (crate::db::CaptureKind::IdBack, &payload.bio_id_back_data),
    ];
    for (kind, data) in inline_captures {
        let Some(data) = data else { continue };
        let bytes = media::decode_image(data)?;
        let reference = media::store_capture(main.id, kind, &bytes)
            .await
            .map_err(|e| {
                AppError::InternalServerError(format!("Failed to store capture image: {e}"))
            })?;
        stored_refs.push(reference.clone());
        GuestRepository::upsert_capture(&mut tx, main.id, kind, &reference).await?;
    }

    LedgerRepository::insert_event(&mut tx, reservation.id, "created", Some(&code)).await?;
    tx.commit().await?;
    Ok(reservation.id)
}

async fn load_detail(state: &AppState, org_id: Uuid, id: Uuid) -> AppResult<ReservationDetail> {
    let reservation = ReservationRepository::find_by_id(&state.db, org_id, id)
        .await?
        .ok_or(ReservationError::NotFound("Reservation"))?;

    let rooms = RoomStayRepository::list_for_reservation(&state.db, id).await?;
    let guests = GuestRepository::list_for_reservation(&state.db, id).await?;
    let captures = GuestRepository::captures_for_reservation(&state.db, id).await?;
    let charges = LedgerRepository::list_charges(&state.db, id).await?;
    let payments = LedgerRepository::list_payments(&state.db, id).await?;
    let activity = LedgerRepository::list_events(&state.db, id).await?;

    let capture_gate = capture::evaluate(reservation.adults, reservation.children, &guests);
    let mut presence = capture::presence_by_guest(&captures);
    let guests = guests
        .into_iter()
        .map(|guest| {
            let captures = presence.remove(&guest.id).unwrap_or_default();
            GuestView { guest, captures }
        })
        .collect();

    Ok(ReservationDetail {
        reservation,
        rooms,
        guests,
        capture_gate,
        charges,
        payments,
        activity,
    })
}

pub async fn get_reservation(
    State(state): State<AppState>,
    OrgId(org_id): OrgId,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ReservationDetail>> {
    Ok(Json(load_detail(&state, org_id, id).await?))
}

/// Shared transition path: lock the row, evaluate the gate, apply the state
/// machine, persist the outcome and its activity trail in one transaction.
async fn run_transition(
    state: &AppState,
    org_id: Uuid,
    id: Uuid,
    action: ReservationAction,
) -> AppResult<Reservation> {
    let mut tx = state.db.begin().await?;

    let reservation = ReservationRepository::lock_by_id(&mut tx, org_id, id)
        .await?
        .ok_or(ReservationError::NotFound("Reservation"))?;

    let guests = GuestRepository::list_for_reservation_tx(&mut tx, reservation.id).await?;
    let gate = capture::evaluate(reservation.adults, reservation.children, &guests);

    let outcome = lifecycle::apply(reservation.status, action, &gate, &current_policy())?;

    let updated = match outcome.stamp {
        Stamp::CheckedIn => ReservationRepository::stamp_checked_in(&mut tx, reservation.id).await?,
        Stamp::CheckedOut => ReservationRepository::stamp_checked_out(&mut tx, reservation.id)
            .await?
            .ok_or(ReservationError::InvalidTransition {
                from: reservation.status,
                action: "check out",
            })?,
        Stamp::None => {
            ReservationRepository::set_status(&mut tx, reservation.id, outcome.new_status).await?
        }
    };

    if outcome.capture_overridden {
        LedgerRepository::insert_event(
            &mut tx,
            reservation.id,
            "capture_override",
            Some(&format!(
                "{} of {} guests on file at check-in",
                gate.captured_count, gate.expected_guests
            )),
        )
        .await?;
    }
    LedgerRepository::insert_event(&mut tx, reservation.id, outcome.event_code, None).await?;

    tx.commit().await?;
    info!(
        reservation = %updated.code,
        status = updated.status.as_str(),
        event = outcome.event_code,
        "Reservation transition applied"
    );
    Ok(updated)
}

pub async fn confirm_reservation(
    State(state): State<AppState>,
    OrgId(org_id): OrgId,
    Path(id): Path<Uuid>,
) -> AppResult<Json<TransitionResponse>> {
    let reservation = run_transition(&state, org_id, id, ReservationAction::Confirm).await?;
    let message = format!("Reservation {} confirmed.", reservation.code);
    Ok(Json(TransitionResponse {
        reservation,
        message,
    }))
}

pub async fn guarantee_reservation(
    State(state): State<AppState>,
    OrgId(org_id): OrgId,
    Path(id): Path<Uuid>,
) -> AppResult<Json<TransitionResponse>> {
    let reservation = run_transition(&state, org_id, id, ReservationAction::Guarantee).await?;
    let message = format!("Reservation {} guaranteed.", reservation.code);
    Ok(Json(TransitionResponse {
        reservation,
        message,
    }))
}

pub async fn check_in_reservation(
    State(state): State<AppState>,
    OrgId(org_id): OrgId,
    Path(id): Path<Uuid>,
    Json(payload): Json<CheckInRequest>,
) -> AppResult<Json<TransitionResponse>> {
    let override_capture = payload.override_capture;
    let reservation = run_transition(
        &state,
        org_id,
        id,
        ReservationAction::CheckIn { override_capture },
    )
    .await?;
    let message = format!("Reservation {} checked in.", reservation.code);
    Ok(Json(TransitionResponse {
        reservation,
        message,
    }))
}

pub async fn check_out_reservation(
    State(state): State<AppState>,
    OrgId(org_id): OrgId,
    Path(id): Path<Uuid>,
) -> AppResult<Json<TransitionResponse>> {
    let reservation = run_transition(&state, org_id, id, ReservationAction::CheckOut).await?;
    let message = format!("Reservation {} checked out.", reservation.code);
    Ok(Json(TransitionResponse {
        reservation,
        message,
    }))
}

pub async fn cancel_reservation(
    State(state): State<AppState>,
    OrgId(org_id): OrgId,
    Path(id): Path<Uuid>,
) -> AppResult<Json<TransitionResponse>> {
    let reservation = run_transition(&state, org_id, id, ReservationAction::Cancel).await?;
    let message = format!(
        "Reservation {} cancelled. Cancellation is final; rebooking requires a new reservation.",
        reservation.code
    );
    Ok(Json(TransitionResponse {
        reservation,
        message,
    }))
}

pub async fn mark_no_show(
    State(state): State<AppState>,
    OrgId(org_id): OrgId,
    Path(id): Path<Uuid>,
) -> AppResult<Json<TransitionResponse>> {
    let reservation = run_transition(&state, org_id, id, ReservationAction::MarkNoShow).await?;
    let message = format!(
        "Reservation {} marked as no-show. This is final; rebooking requires a new reservation.",
        reservation.code
    );
    Ok(Json(TransitionResponse {
        reservation,
        message,
    }))
}

pub async fn attach_room(
    State(state): State<AppState>,
    OrgId(org_id): OrgId,
    Path(id): Path<Uuid>,
    Json(payload): Json<NewRoomStay>,
) -> AppResult<(StatusCode, Json<RoomStay>)> {
    payload.validate().map_err(ReservationError::from)?;
    validate_stay_range(payload.check_in, payload.check_out)?;

    let mut tx = state.db.begin().await?;
    let reservation = ReservationRepository::lock_by_id(&mut tx, org_id, id)
        .await?
        .ok_or(ReservationError::NotFound("Reservation"))?;
    if reservation.status.is_terminal() {
        return Err(ReservationError::InvalidTransition {
            from: reservation.status,
            action: "attach a room to",
        }
        .into());
    }

    RoomStayRepository::lock_room(&mut tx, &payload.room_id).await?;
    let existing = RoomStayRepository::bookings_for_room(&mut tx, &payload.room_id).await?;
    allocator::find_conflict(
        &payload.room_id,
        reservation.id,
        payload.check_in,
        payload.check_out,
        &existing,
    )?;

    let stay = RoomStayRepository::insert(&mut tx, reservation.id, &payload).await?;
    LedgerRepository::insert_event(&mut tx, reservation.id, "room_attached", Some(&payload.room_id))
        .await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(stay)))
}

pub async fn add_guest(
    State(state): State<AppState>,
    OrgId(org_id): OrgId,
    Path(id): Path<Uuid>,
    Json(payload): Json<NewGuest>,
) -> AppResult<(StatusCode, Json<serde_json::Value>)> {
    payload.validate().map_err(ReservationError::from)?;

    let mut tx = state.db.begin().await?;
    let reservation = ReservationRepository::lock_by_id(&mut tx, org_id, id)
        .await?
        .ok_or(ReservationError::NotFound("Reservation"))?;
    if reservation.status.is_terminal() {
        return Err(ReservationError::InvalidTransition {
            from: reservation.status,
            action: "add a guest to",
        }
        .into());
    }

    let existing = GuestRepository::list_for_reservation_tx(&mut tx, reservation.id).await?;
    if payload.main && existing.iter().any(|g| g.is_main) {
        return Err(
            ReservationError::Validation("Reservation already has a main guest".to_string()).into(),
        );
    }

    let guest = GuestRepository::insert(&mut tx, reservation.id, &payload).await?;
    LedgerRepository::insert_event(&mut tx, reservation.id, "guest_added", Some(&guest.name))
        .await?;
    tx.commit().await?;

    let mut guests = existing;
    guests.push(guest.clone());
    let gate = capture::evaluate(reservation.adults, reservation.children, &guests);

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "guest": guest, "capture_gate": gate })),
    ))
}

pub async fn upload_capture(
    State(state): State<AppState>,
    OrgId(org_id): OrgId,
    Path((id, guest_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<CaptureUploadRequest>,
) -> AppResult<Json<crate::db::GuestCapture>> {
    payload.validate().map_err(ReservationError::from)?;
    let bytes = media::decode_image(&payload.data)?;

    let mut tx = state.db.begin().await?;
    let reservation = ReservationRepository::lock_by_id(&mut tx, org_id, id)
        .await?
        .ok_or(ReservationError::NotFound("Reservation"))?;
    let guests = GuestRepository::list_for_reservation_tx(&mut tx, reservation.id).await?;
    if !guests.iter().any(|g| g.id == guest_id) {
        return Err(ReservationError::NotFound("Guest").into());
    }

    let reference = media::store_capture(guest_id, payload.kind, &bytes)
        .await
        .map_err(|e| AppError::InternalServerError(format!("Failed to store capture image: {e}")))?;

    match commit_capture(tx, reservation.id, guest_id, payload.kind, &reference).await {
        Ok((capture, previous)) => {
            // The new ref is committed; the superseded file is now
            // unreachable and can be unlinked.
            if let Some(previous) = previous {
                media::remove_capture(&previous).await;
            }
            Ok(Json(capture))
        }
        Err(err) => {
            media::remove_capture(&reference).await;
            Err(err.into())
        }
    }
}

async fn commit_capture(
    mut tx: sqlx::Transaction<'_, sqlx::Postgres>,
    reservation_id: Uuid,
    guest_id: Uuid,
    kind: crate::db::CaptureKind,
    reference: &str,
) -> Result<(crate::db::GuestCapture, Option<String>), sqlx::Error> {
    let (capture, previous) =
        GuestRepository::upsert_capture(&mut tx, guest_id, kind, reference).await?;
    LedgerRepository::insert_event(&mut tx, reservation_id, "capture_taken", Some(kind.as_str()))
        .await?;
    tx.commit().await?;
    Ok((capture, previous))
}

pub async fn post_charge(
    State(state): State<AppState>,
    OrgId(org_id): OrgId,
    Path(id): Path<Uuid>,
    Json(payload): Json<NewChargeLine>,
) -> AppResult<(StatusCode, Json<crate::db::ChargeLine>)> {
    payload.validate().map_err(ReservationError::from)?;

    let mut tx = state.db.begin().await?;
    let reservation = ReservationRepository::lock_by_id(&mut tx, org_id, id)
        .await?
        .ok_or(ReservationError::NotFound("Reservation"))?;

    let charge = LedgerRepository::insert_charge(&mut tx, reservation.id, &payload).await?;
    ReservationRepository::adjust_balance(&mut tx, reservation.id, payload.amount).await?;
    LedgerRepository::insert_event(&mut tx, reservation.id, "charge_posted", Some(&payload.code))
        .await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(charge)))
}

pub async fn post_payment(
    State(state): State<AppState>,
    OrgId(org_id): OrgId,
    Path(id): Path<Uuid>,
    Json(payload): Json<NewPayment>,
) -> AppResult<(StatusCode, Json<crate::db::Payment>)> {
    payload.validate().map_err(ReservationError::from)?;

    let mut tx = state.db.begin().await?;
    let reservation = ReservationRepository::lock_by_id(&mut tx, org_id, id)
        .await?
        .ok_or(ReservationError::NotFound("Reservation"))?;

    let payment = LedgerRepository::insert_payment(&mut tx, reservation.id, &payload).await?;
    ReservationRepository::adjust_balance(&mut tx, reservation.id, -payload.amount).await?;
    LedgerRepository::insert_event(&mut tx, reservation.id, "payment_posted", None).await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(payment)))
}

pub async fn update_notes(
    State(state): State<AppState>,
    OrgId(org_id): OrgId,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateNotesRequest>,
) -> AppResult<Json<Reservation>> {
    payload.validate().map_err(ReservationError::from)?;

    let mut tx = state.db.begin().await?;
    let reservation = ReservationRepository::lock_by_id(&mut tx, org_id, id)
        .await?
        .ok_or(ReservationError::NotFound("Reservation"))?;

    let updated =
        ReservationRepository::update_notes(&mut tx, reservation.id, payload.notes.as_deref())
            .await?;
    LedgerRepository::insert_event(&mut tx, reservation.id, "notes_updated", None).await?;
    tx.commit().await?;

    Ok(Json(updated))
}

pub async fn calendar_view(
    State(state): State<AppState>,
    OrgId(org_id): OrgId,
    Query(query): Query<CalendarQuery>,
) -> AppResult<Json<MonthCalendar>> {
    let (year, month) = calendar::parse_ym(&query.ym)?;
    let (start, end) = calendar::month_bounds(year, month)?;

    let reservations =
        ReservationRepository::list_intersecting(&state.db, org_id, start, end).await?;
    let projection = calendar::project(year, month, &reservations, query.status)?;
    Ok(Json(projection))
}

pub async fn send_prearrival(
    State(state): State<AppState>,
    OrgId(org_id): OrgId,
    Json(payload): Json<PrearrivalRequest>,
) -> AppResult<(StatusCode, Json<PrearrivalResponse>)> {
    payload.validate().map_err(ReservationError::from)?;
    validate_stay_range(payload.check_in, payload.check_out)?;

    let token = Uuid::now_v7();
    let new_reservation = NewReservation {
        org_id,
        guest_name: payload.guest_name.clone(),
        guest_contact: Some(payload.guest_email.clone()),
        channel: payload.channel.unwrap_or(crate::db::ReservationChannel::Direct),
        status: ReservationStatus::PendingConfirmation,
        check_in: payload.check_in,
        check_out: payload.check_out,
        adults: payload.adults,
        children: payload.children,
        notes: None,
        currency: "USD".to_string(),
        group_block_id: None,
        prearrival_token: Some(token),
    };

    let mut tx = state.db.begin().await?;
    let code = generate_code(payload.check_in);
    let reservation = ReservationRepository::insert(&mut tx, &code, &new_reservation).await?;
    LedgerRepository::insert_event(&mut tx, reservation.id, "prearrival_sent", Some(&code)).await?;
    tx.commit().await?;

    let config = config::get();
    let link = format!("{}/prearrival/{}", config.app.public_url, token);
    let email_subject = format!("{}: complete your stay details ({})", config.app.name, code);
    let email_body = format!(
        "Dear {},\n\nYour stay from {} to {} is on hold under reservation {}.\n\
         Please complete your details before arrival:\n\n{}\n\n\
         We look forward to welcoming you.",
        payload.guest_name, payload.check_in, payload.check_out, code, link
    );

    Ok((
        StatusCode::CREATED,
        Json(PrearrivalResponse {
            reservation,
            link,
            email_subject,
            email_body,
        }),
    ))
}

/// Marks stale pre-arrival reservations as no-shows. Safe to run on a
/// schedule or by hand: a second run over the same data changes nothing.
pub async fn no_show_sweep(
    State(state): State<AppState>,
    OrgId(org_id): OrgId,
) -> AppResult<Json<SweepResponse>> {
    let today = OffsetDateTime::now_utc().date();

    let mut tx = state.db.begin().await?;
    let swept = ReservationRepository::sweep_no_shows(&mut tx, org_id, today).await?;
    for reservation in &swept {
        LedgerRepository::insert_event(
            &mut tx,
            reservation.id,
            "no_show",
            Some("automatic sweep"),
        )
        .await?;
    }
    tx.commit().await?;

    let codes: Vec<String> = swept.iter().map(|r| r.code.clone()).collect();
    if !codes.is_empty() {
        info!(count = codes.len(), "No-show sweep transitioned reservations");
    }
    Ok(Json(SweepResponse {
        transitioned: codes.len(),
        codes,
    }))
}
