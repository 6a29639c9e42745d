// Viewing request lifecycle: custom time proposals and slot bookings

use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use chrono::NaiveDate;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::AsyncConnection;
use serde::Deserialize;
use serde_json::{json, Value};
use std::str::FromStr;
use uuid::Uuid;

use crate::app::AppState;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::property::{Property, PropertyAvailability, PropertyStats};
use crate::models::user::Role;
use crate::models::viewing::{
    book_availability_slot, release_availability_slot, NewViewingRequest, ViewingRequest,
    ViewingStatus,
};
use crate::utils::api_error::{ApiError, ApiResult};
use crate::utils::messages;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateViewingRequestBody {
    pub property_id: Uuid,
    /// Set when booking a published availability slot
    pub availability_id: Option<Uuid>,
    /// Custom proposal fields, required when no slot is given
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub end_time: Option<String>,
    pub agent_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub property_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

// POST /api/viewing-requests
//
// Two creation paths. Booking a published slot claims it atomically and the
// request starts at PENDING_SELLER_APPROVAL (SCHEDULED when an agent or admin
// books it). A custom time proposal starts at PENDING and waits for the
// seller to accept or reject.
pub async fn create_viewing_request(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Json(payload): Json<CreateViewingRequestBody>,
) -> ApiResult<Json<Value>> {
    let mut conn = state.diesel_pool.get().await?;

    let property = Property::find_by_id(&mut conn, payload.property_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(messages::PROPERTY_NOT_FOUND.to_string()))?;

    let request = if let Some(slot_id) = payload.availability_id {
        let slot = PropertyAvailability::find_by_id(&mut conn, slot_id)
            .await?
            .filter(|s| s.property_id == property.id)
            .ok_or_else(|| ApiError::Validation(messages::SLOT_TAKEN.to_string()))?;

        let trusted = auth_user.is_admin() || auth_user.role() == Some(Role::Agent);
        let initial_status = if trusted {
            ViewingStatus::Scheduled
        } else {
            ViewingStatus::PendingSellerApproval
        };

        let buyer_id = auth_user.user_id;
        let agent_id = payload.agent_id;
        let property_id = property.id;

        conn.transaction::<ViewingRequest, ApiError, _>(|conn| {
            async move {
                if !book_availability_slot(conn, slot.id).await? {
                    return Err(ApiError::Validation(messages::SLOT_TAKEN.to_string()));
                }

                let request = ViewingRequest::insert(
                    conn,
                    &NewViewingRequest {
                        property_id,
                        buyer_id,
                        agent_id,
                        date: slot.date,
                        time: slot.start_time.clone(),
                        end_time: slot.end_time.clone(),
                        status: initial_status.as_str().to_string(),
                    },
                )
                .await?;

                PropertyStats::increment_viewings(conn, property_id).await?;

                Ok(request)
            }
            .scope_boxed()
        })
        .await?
    } else {
        let (date, time, end_time) =
            match (payload.date, payload.time.clone(), payload.end_time.clone()) {
                (Some(d), Some(t), Some(e)) => (d, t, e),
                _ => {
                    return Err(ApiError::Validation(
                        "Date, time and endTime are required".to_string(),
                    ))
                },
            };

        ViewingRequest::insert(
            &mut conn,
            &NewViewingRequest {
                property_id: property.id,
                buyer_id: auth_user.user_id,
                agent_id: payload.agent_id,
                date,
                time,
                end_time,
                status: ViewingStatus::Pending.as_str().to_string(),
            },
        )
        .await?
    };

    drop(conn);

    let scheduled = request.status == ViewingStatus::Scheduled.as_str();
    let (title, kind) = if scheduled {
        (messages::VIEWING_SCHEDULED_TITLE, "APPOINTMENT_SCHEDULED")
    } else {
        (messages::VIEWING_REQUEST_TITLE, "APPOINTMENT_REQUEST")
    };

    state
        .notifier
        .notify(
            property.user_id,
            title,
            &format!(
                "Νέο αίτημα προβολής για το ακίνητο \"{}\" στις {} {}",
                property.title, request.date, request.time
            ),
            kind,
            Some(property.id),
            Some(json!({ "viewingRequestId": request.id, "shouldOpenModal": false })),
        )
        .await;

    Ok(Json(json!({ "success": true, "viewingRequest": request })))
}

// GET /api/viewing-requests
//
// Role-scoped listing. Buyers see their own requests, sellers see requests
// against their listings, admins see everything.
pub async fn list_viewing_requests(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Value>> {
    let mut conn = state.diesel_pool.get().await?;

    let mut requests = if auth_user.is_admin() {
        ViewingRequest::list_all(&mut conn).await?
    } else {
        let own_properties = Property::list_for_owner(&mut conn, auth_user.user_id).await?;
        let property_ids: Vec<Uuid> = own_properties.iter().map(|p| p.id).collect();

        let mut requests = ViewingRequest::list_for_buyer(&mut conn, auth_user.user_id).await?;
        let for_listings = ViewingRequest::list_for_properties(&mut conn, &property_ids).await?;
        for request in for_listings {
            if !requests.iter().any(|r| r.id == request.id) {
                requests.push(request);
            }
        }
        requests
    };

    if let Some(status) = &query.status {
        let wanted = status.to_uppercase();
        requests.retain(|r| r.status == wanted);
    }
    if let Some(property_id) = query.property_id {
        requests.retain(|r| r.property_id == property_id);
    }

    Ok(Json(json!({ "viewingRequests": requests })))
}

// GET /api/viewing-requests/:id
pub async fn get_viewing_request(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(request_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let mut conn = state.diesel_pool.get().await?;

    let request = ViewingRequest::find_by_id(&mut conn, request_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(messages::VIEWING_NOT_FOUND.to_string()))?;

    authorize_participant(&mut conn, &auth_user, &request).await?;

    Ok(Json(json!({ "viewingRequest": request })))
}

// PATCH /api/viewing-requests/:id/status
//
// Transitions follow the status machine. A buyer may only cancel their own
// request; accepting, rejecting and scheduling belong to the seller or an
// admin.
pub async fn update_viewing_status(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(request_id): Path<Uuid>,
    Json(payload): Json<StatusRequest>,
) -> ApiResult<Json<Value>> {
    let target = ViewingStatus::from_str(&payload.status)
        .map_err(|_| ApiError::Validation(ViewingStatus::invalid_status_message()))?;

    let mut conn = state.diesel_pool.get().await?;

    let request = ViewingRequest::find_by_id(&mut conn, request_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(messages::VIEWING_NOT_FOUND.to_string()))?;

    let property = Property::find_by_id(&mut conn, request.property_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(messages::PROPERTY_NOT_FOUND.to_string()))?;

    let is_seller = property.user_id == auth_user.user_id;
    let is_buyer = request.buyer_id == auth_user.user_id;

    let allowed = if auth_user.is_admin() || is_seller {
        true
    } else {
        is_buyer && target == ViewingStatus::Cancelled
    };
    if !allowed {
        return Err(ApiError::Forbidden(messages::FORBIDDEN.to_string()));
    }

    let current =
        ViewingStatus::from_str(&request.status).map_err(|_| ApiError::Internal)?;

    if !current.can_transition_to(target) {
        return Err(ApiError::Validation(format!(
            "Cannot change status from {} to {}",
            current, target
        )));
    }

    let updated = ViewingRequest::set_status(&mut conn, request.id, target).await?;

    // A rejected or cancelled slot booking puts the slot back on the market
    if matches!(target, ViewingStatus::Rejected | ViewingStatus::Cancelled)
        && matches!(
            current,
            ViewingStatus::PendingSellerApproval | ViewingStatus::Scheduled
        )
    {
        release_matching_slot(&mut conn, &updated).await?;
    }

    drop(conn);

    match target {
        ViewingStatus::Accepted => {
            state
                .notifier
                .notify(
                    updated.buyer_id,
                    messages::VIEWING_ACCEPTED_TITLE,
                    &format!(
                        "Το αίτημα προβολής για το ακίνητο \"{}\" εγκρίθηκε",
                        property.title
                    ),
                    "APPOINTMENT_ACCEPTED",
                    Some(property.id),
                    Some(json!({ "viewingRequestId": updated.id, "shouldOpenModal": false })),
                )
                .await;
        },
        ViewingStatus::Rejected => {
            state
                .notifier
                .notify(
                    updated.buyer_id,
                    messages::VIEWING_REJECTED_TITLE,
                    &format!(
                        "Το αίτημα προβολής για το ακίνητο \"{}\" απορρίφθηκε",
                        property.title
                    ),
                    "APPOINTMENT_REJECTED",
                    Some(property.id),
                    Some(json!({ "viewingRequestId": updated.id, "shouldOpenModal": false })),
                )
                .await;
        },
        ViewingStatus::Scheduled => {
            state
                .notifier
                .notify(
                    updated.buyer_id,
                    messages::VIEWING_SCHEDULED_TITLE,
                    &format!(
                        "Η προβολή για το ακίνητο \"{}\" προγραμματίστηκε για {} {}",
                        property.title, updated.date, updated.time
                    ),
                    "APPOINTMENT_SCHEDULED",
                    Some(property.id),
                    Some(json!({ "viewingRequestId": updated.id, "shouldOpenModal": false })),
                )
                .await;
        },
        _ => {},
    }

    Ok(Json(json!({ "success": true, "viewingRequest": updated })))
}

// DELETE /api/viewing-requests/:id
pub async fn delete_viewing_request(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(request_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let mut conn = state.diesel_pool.get().await?;

    let request = ViewingRequest::find_by_id(&mut conn, request_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(messages::VIEWING_NOT_FOUND.to_string()))?;

    if request.buyer_id != auth_user.user_id && !auth_user.is_admin() {
        return Err(ApiError::Forbidden(messages::FORBIDDEN.to_string()));
    }

    if matches!(
        ViewingStatus::from_str(&request.status),
        Ok(ViewingStatus::PendingSellerApproval) | Ok(ViewingStatus::Scheduled)
    ) {
        release_matching_slot(&mut conn, &request).await?;
    }

    ViewingRequest::delete(&mut conn, request.id).await?;

    Ok(Json(json!({ "success": true })))
}

async fn authorize_participant(
    conn: &mut diesel_async::AsyncPgConnection,
    auth_user: &AuthenticatedUser,
    request: &ViewingRequest,
) -> Result<(), ApiError> {
    if auth_user.is_admin() || request.buyer_id == auth_user.user_id {
        return Ok(());
    }

    let property = Property::find_by_id(conn, request.property_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(messages::PROPERTY_NOT_FOUND.to_string()))?;

    if property.user_id == auth_user.user_id {
        Ok(())
    } else {
        Err(ApiError::Forbidden(messages::FORBIDDEN.to_string()))
    }
}

// Viewing requests do not keep the slot id, so the slot is matched back by
// date and time window.
async fn release_matching_slot(
    conn: &mut diesel_async::AsyncPgConnection,
    request: &ViewingRequest,
) -> Result<(), ApiError> {
    let slots = PropertyAvailability::list_for_property(conn, request.property_id).await?;

    if let Some(slot) = slots.iter().find(|s| {
        s.date == request.date && s.start_time == request.time && s.end_time == request.end_time
    }) {
        release_availability_slot(conn, slot.id).await?;
    }

    Ok(())
}
