// Property catalog handlers

use axum::{
    extract::{Path, State},
    response::Json,
};
use chrono::Utc;
use diesel_async::AsyncPgConnection;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::middleware::auth::AuthenticatedUser;
use crate::middleware::auth_middleware::MaybeUser;
use crate::models::engagement::{Favorite, Inquiry, NewInquiry};
use crate::models::property::{
    can_view_property, AvailabilitySlotRequest, CreatePropertyRequest, NewProperty,
    NewPropertyAvailability, Property, PropertyAvailability, PropertyStats, UpdateProperty,
    UpdatePropertyRequest, ViewerRelation, STATUS_PENDING, STATUS_UNAVAILABLE,
};
use crate::models::connection::BuyerAgentConnection;
use crate::models::user::Role;
use crate::utils::api_error::{ApiError, ApiResult};
use crate::utils::messages;

/// Resolve what the requester is to this property before applying the
/// visibility rule.
async fn viewer_relation(
    conn: &mut AsyncPgConnection,
    viewer: &AuthenticatedUser,
    property: &Property,
) -> Result<ViewerRelation, diesel::result::Error> {
    let is_owner = property.user_id == viewer.user_id;
    let is_admin = viewer.is_admin();

    // Owner and admin short-circuit; no need to hit favorites/connections
    if is_owner || is_admin {
        return Ok(ViewerRelation {
            is_owner,
            is_admin,
            ..Default::default()
        });
    }

    let has_favorite = Favorite::exists(conn, viewer.user_id, property.id).await?;
    let connected =
        BuyerAgentConnection::exists_for_user_and_property(conn, viewer.user_id, property.id)
            .await?;

    let is_agent = matches!(viewer.role(), Some(Role::Agent));

    Ok(ViewerRelation {
        is_owner: false,
        is_admin: false,
        has_favorite,
        is_connected_agent: connected && is_agent,
        is_connected_buyer: connected && !is_agent,
    })
}

/// Load a property and enforce the visibility rule, rendering the deny case
/// as 404.
pub(crate) async fn load_visible_property(
    conn: &mut AsyncPgConnection,
    property_id: Uuid,
    viewer: Option<&AuthenticatedUser>,
) -> Result<Property, ApiError> {
    let property = Property::find_by_id(conn, property_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(messages::PROPERTY_NOT_FOUND.to_string()))?;

    let relation = match viewer {
        Some(user) => Some(viewer_relation(conn, user, &property).await?),
        None => None,
    };

    if !can_view_property(&property.status, relation) {
        return Err(ApiError::NotFound(messages::PROPERTY_NOT_FOUND.to_string()));
    }

    Ok(property)
}

// GET /api/properties
pub async fn list_properties(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
) -> ApiResult<Json<Value>> {
    let mut conn = state.diesel_pool.get().await?;

    let mut properties = Property::list_visible(&mut conn).await?;

    // A requester's own unavailable listings stay visible to them
    if let Some(user) = &viewer {
        let own = Property::list_for_owner(&mut conn, user.user_id).await?;
        for property in own {
            if property.status == STATUS_UNAVAILABLE {
                properties.push(property);
            }
        }
    }

    Ok(Json(json!({ "properties": properties })))
}

// GET /api/properties/:id
pub async fn get_property(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Path(property_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let mut conn = state.diesel_pool.get().await?;

    let property = load_visible_property(&mut conn, property_id, viewer.as_ref()).await?;

    // View counting is best-effort and never fails the read
    if let Err(e) = PropertyStats::record_view(&mut conn, property.id).await {
        warn!(property_id = %property.id, "Failed to record view: {}", e);
    }

    let stats = PropertyStats::find_for_property(&mut conn, property.id).await?;

    Ok(Json(json!({ "property": property, "stats": stats })))
}

// POST /api/properties
pub async fn create_property(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Json(payload): Json<CreatePropertyRequest>,
) -> ApiResult<Json<Value>> {
    payload.validate()?;

    let mut conn = state.diesel_pool.get().await?;

    let record = NewProperty {
        user_id: auth_user.user_id,
        title: payload.title,
        short_description: payload.short_description,
        full_description: payload.full_description,
        price: payload.price,
        property_type: payload.property_type,
        street: payload.street,
        street_number: payload.street_number,
        city: payload.city,
        state: payload.state,
        bedrooms: payload.bedrooms,
        bathrooms: payload.bathrooms,
        area: payload.area,
        status: STATUS_PENDING.to_string(),
        images: json!(payload.images),
    };

    let property = Property::insert(&mut conn, &record).await?;

    Ok(Json(json!({ "success": true, "property": property })))
}

// PATCH /api/properties/:id
pub async fn update_property(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(property_id): Path<Uuid>,
    Json(payload): Json<UpdatePropertyRequest>,
) -> ApiResult<Json<Value>> {
    let mut conn = state.diesel_pool.get().await?;

    let property = Property::find_by_id(&mut conn, property_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(messages::PROPERTY_NOT_FOUND.to_string()))?;

    if property.user_id != auth_user.user_id && !auth_user.is_admin() {
        return Err(ApiError::Forbidden(messages::FORBIDDEN.to_string()));
    }

    // Status changes are an admin concern
    let status = if auth_user.is_admin() {
        payload.status
    } else {
        None
    };

    let changes = UpdateProperty {
        title: payload.title,
        short_description: payload.short_description.map(Some),
        full_description: payload.full_description.map(Some),
        price: payload.price,
        property_type: payload.property_type,
        street: payload.street.map(Some),
        street_number: payload.street_number.map(Some),
        city: payload.city.map(Some),
        state: payload.state.map(Some),
        bedrooms: payload.bedrooms.map(Some),
        bathrooms: payload.bathrooms.map(Some),
        area: payload.area.map(Some),
        status,
        is_verified: None,
        removal_requested: None,
        images: payload.images.map(|imgs| json!(imgs)),
        updated_at: Utc::now(),
    };

    let property = Property::update(&mut conn, property_id, &changes).await?;

    Ok(Json(json!({ "success": true, "property": property })))
}

// DELETE /api/properties/:id
// FK cascades take the listing's leads, slots, stats, and favorites with it.
pub async fn delete_property(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(property_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let mut conn = state.diesel_pool.get().await?;

    let property = Property::find_by_id(&mut conn, property_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(messages::PROPERTY_NOT_FOUND.to_string()))?;

    if property.user_id != auth_user.user_id && !auth_user.is_admin() {
        return Err(ApiError::Forbidden(messages::FORBIDDEN.to_string()));
    }

    Property::delete(&mut conn, property_id).await?;

    Ok(Json(json!({ "success": true })))
}

// POST /api/properties/:id/favorite
pub async fn toggle_favorite(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(property_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let mut conn = state.diesel_pool.get().await?;

    let property = load_visible_property(&mut conn, property_id, Some(&auth_user)).await?;

    let favorited = Favorite::toggle(&mut conn, auth_user.user_id, property.id).await?;

    Ok(Json(json!({ "success": true, "favorited": favorited })))
}

// GET /api/properties/:id/availability
pub async fn list_availability(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Path(property_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let mut conn = state.diesel_pool.get().await?;

    let property = load_visible_property(&mut conn, property_id, viewer.as_ref()).await?;
    let slots = PropertyAvailability::list_for_property(&mut conn, property.id).await?;

    Ok(Json(json!({ "availability": slots })))
}

// POST /api/properties/:id/availability
pub async fn add_availability(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(property_id): Path<Uuid>,
    Json(payload): Json<AvailabilitySlotRequest>,
) -> ApiResult<Json<Value>> {
    payload.validate()?;

    let mut conn = state.diesel_pool.get().await?;

    let property = Property::find_by_id(&mut conn, property_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(messages::PROPERTY_NOT_FOUND.to_string()))?;

    if property.user_id != auth_user.user_id && !auth_user.is_admin() {
        return Err(ApiError::Forbidden(messages::FORBIDDEN.to_string()));
    }

    let slot = PropertyAvailability::insert(
        &mut conn,
        &NewPropertyAvailability {
            property_id,
            date: payload.date,
            start_time: payload.start_time,
            end_time: payload.end_time,
            is_available: true,
        },
    )
    .await?;

    Ok(Json(json!({ "success": true, "slot": slot })))
}

// DELETE /api/properties/:id/availability/:slot_id
pub async fn delete_availability(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path((property_id, slot_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<Value>> {
    let mut conn = state.diesel_pool.get().await?;

    let property = Property::find_by_id(&mut conn, property_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(messages::PROPERTY_NOT_FOUND.to_string()))?;

    if property.user_id != auth_user.user_id && !auth_user.is_admin() {
        return Err(ApiError::Forbidden(messages::FORBIDDEN.to_string()));
    }

    let deleted = PropertyAvailability::delete_for_property(&mut conn, slot_id, property_id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("Η διαθεσιμότητα δεν βρέθηκε".to_string()));
    }

    Ok(Json(json!({ "success": true })))
}

#[derive(Debug, Deserialize, Validate)]
pub struct InquiryRequest {
    #[validate(length(min = 1, message = "Message is required"))]
    pub message: String,
}

// POST /api/properties/:id/inquiries
pub async fn create_inquiry(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(property_id): Path<Uuid>,
    Json(payload): Json<InquiryRequest>,
) -> ApiResult<Json<Value>> {
    payload.validate()?;

    let mut conn = state.diesel_pool.get().await?;

    let property = load_visible_property(&mut conn, property_id, Some(&auth_user)).await?;

    let inquiry = Inquiry::insert(
        &mut conn,
        &NewInquiry {
            user_id: auth_user.user_id,
            property_id: property.id,
            message: payload.message,
        },
    )
    .await?;

    drop(conn);

    state
        .notifier
        .notify(
            property.user_id,
            messages::INQUIRY_TITLE,
            &format!(
                "Νέο ερώτημα για το ακίνητο \"{}\" από τον χρήστη {}",
                property.title, auth_user.email
            ),
            "INQUIRY",
            Some(property.id),
            Some(json!({ "inquiryId": inquiry.id, "recipient": "seller" })),
        )
        .await;

    Ok(Json(json!({ "success": true, "inquiry": inquiry })))
}

// POST /api/properties/:id/request-removal
pub async fn request_removal(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(property_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let mut conn = state.diesel_pool.get().await?;

    let property = Property::find_by_id(&mut conn, property_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(messages::PROPERTY_NOT_FOUND.to_string()))?;

    if property.user_id != auth_user.user_id {
        return Err(ApiError::Forbidden(messages::FORBIDDEN.to_string()));
    }

    let property = Property::set_removal_requested(&mut conn, property_id).await?;

    drop(conn);

    state
        .notifier
        .notify_admins(
            messages::REMOVAL_REQUEST_TITLE,
            &format!(
                "Ο πωλητής ζήτησε την αφαίρεση του ακινήτου \"{}\"",
                property.title
            ),
            "REMOVAL_REQUEST",
            Some(property.id),
            Some(json!({ "recipient": "admin" })),
        )
        .await;

    Ok(Json(json!({ "success": true, "property": property })))
}
