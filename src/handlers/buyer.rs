// Buyer-facing handlers: interest lifecycle and favorites

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::app::AppState;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::lead::PropertyLead;
use crate::models::property::Property;
use crate::models::transaction::Transaction;
use crate::models::user::{User, UserError};
use crate::utils::api_error::{ApiError, ApiResult};
use crate::utils::messages;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpressInterestRequest {
    pub property_id: Uuid,
}

// POST /api/buyer/interested-properties
pub async fn express_interest(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Json(payload): Json<ExpressInterestRequest>,
) -> ApiResult<Json<Value>> {
    let mut conn = state.diesel_pool.get().await?;

    let property = Property::find_by_id(&mut conn, payload.property_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(messages::PROPERTY_NOT_FOUND.to_string()))?;

    if property.user_id == auth_user.user_id {
        return Err(ApiError::Validation(
            messages::OWN_PROPERTY_INTEREST.to_string(),
        ));
    }

    let buyer_name = match User::find_by_id(&mut conn, auth_user.user_id).await {
        Ok(user) => user.name,
        Err(UserError::NotFound) => messages::UNKNOWN_BUYER.to_string(),
        Err(UserError::Database(e)) => return Err(e.into()),
    };

    drop(conn);

    let outcome = state
        .lifecycle
        .express_interest(auth_user.user_id, &property)
        .await?;

    state
        .notifier
        .notify(
            auth_user.user_id,
            messages::INTEREST_TITLE,
            messages::INTEREST_REGISTERED,
            "INTERESTED",
            Some(property.id),
            Some(json!({ "leadId": outcome.lead.id, "shouldOpenModal": false })),
        )
        .await;

    if let Some(agent_id) = outcome.transaction.agent_id {
        state
            .notifier
            .notify(
                agent_id,
                messages::NEW_INTEREST_TITLE,
                &format!(
                    "Ο χρήστης {} εκδήλωσε ενδιαφέρον για το ακίνητο \"{}\"",
                    buyer_name, property.title
                ),
                "INTERESTED",
                Some(property.id),
                Some(json!({
                    "leadId": outcome.lead.id,
                    "transactionId": outcome.transaction.id,
                    "shouldOpenModal": false
                })),
            )
            .await;
    }

    Ok(Json(json!({
        "success": true,
        "lead": outcome.lead,
        "transaction": outcome.transaction,
    })))
}

// DELETE /api/buyer/interested-properties/:property_id
pub async fn cancel_interest(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(property_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let mut conn = state.diesel_pool.get().await?;

    let property = Property::find_by_id(&mut conn, property_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(messages::PROPERTY_NOT_FOUND.to_string()))?;

    let buyer_name = match User::find_by_id(&mut conn, auth_user.user_id).await {
        Ok(user) => user.name,
        Err(UserError::NotFound) => messages::UNKNOWN_BUYER.to_string(),
        Err(UserError::Database(e)) => return Err(e.into()),
    };

    drop(conn);

    let outcome = state
        .lifecycle
        .cancel_interest(auth_user.user_id, property_id)
        .await?;

    if let Some(transaction) = &outcome.transaction {
        if let Some(agent_id) = transaction.agent_id {
            state
                .notifier
                .notify(
                    agent_id,
                    messages::CANCEL_INTEREST_TITLE,
                    &format!(
                        "Ο αγοραστής {} ακύρωσε το ενδιαφέρον του για το ακίνητο \"{}\"",
                        buyer_name, property.title
                    ),
                    "CANCELLED",
                    Some(property_id),
                    Some(json!({
                        "leadId": outcome.lead.id,
                        "transactionId": transaction.id,
                        "shouldOpenModal": false
                    })),
                )
                .await;
        }
    }

    state
        .notifier
        .notify(
            auth_user.user_id,
            messages::CANCEL_INTEREST_TITLE,
            messages::INTEREST_CANCELLED_OK,
            "CANCELLED",
            Some(property_id),
            Some(json!({ "leadId": outcome.lead.id, "shouldOpenModal": false })),
        )
        .await;

    Ok(Json(json!({
        "success": true,
        "message": messages::INTEREST_CANCELLED_OK,
    })))
}

// PATCH /api/buyer/interested-properties/:property_id/restore
// Restoration is the same restore-or-create path as expressing interest.
pub async fn restore_interest(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(property_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let mut conn = state.diesel_pool.get().await?;

    let property = Property::find_by_id(&mut conn, property_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(messages::PROPERTY_NOT_FOUND.to_string()))?;

    if property.user_id == auth_user.user_id {
        return Err(ApiError::Validation(
            messages::OWN_PROPERTY_INTEREST.to_string(),
        ));
    }

    drop(conn);

    let outcome = state
        .lifecycle
        .express_interest(auth_user.user_id, &property)
        .await?;

    Ok(Json(json!({
        "success": true,
        "restored": outcome.restored,
        "lead": outcome.lead,
        "transaction": outcome.transaction,
    })))
}

// GET /api/buyer/interested-properties
pub async fn list_interested_properties(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> ApiResult<Json<Value>> {
    let mut conn = state.diesel_pool.get().await?;

    let leads = PropertyLead::list_active_for_buyer(&mut conn, auth_user.user_id).await?;

    let property_ids: Vec<Uuid> = leads.iter().map(|l| l.property_id).collect();
    let properties = Property::list_by_ids(&mut conn, &property_ids).await?;

    let mut entries = Vec::with_capacity(leads.len());
    for lead in &leads {
        let property = properties.iter().find(|p| p.id == lead.property_id);

        let transaction =
            Transaction::find_active_for_pair(&mut conn, lead.property_id, auth_user.user_id)
                .await?;

        let view = match &transaction {
            Some(txn) => {
                let latest = Transaction::latest_progress(&mut conn, txn.id).await?;
                Some(json!({
                    "id": txn.id,
                    "status": txn.status,
                    "stage": txn.display_stage(latest.as_ref()),
                    "createdAt": txn.created_at,
                    "updatedAt": txn.updated_at,
                }))
            },
            None => None,
        };

        entries.push(json!({
            "lead": lead,
            "property": property,
            "transaction": view,
        }));
    }

    Ok(Json(json!({ "interestedProperties": entries })))
}

// GET /api/buyer/interest-status/:property_id
pub async fn interest_status(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(property_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let mut conn = state.diesel_pool.get().await?;

    let lead = PropertyLead::find_latest_for_pair(&mut conn, property_id, auth_user.user_id).await?;

    Ok(Json(json!({
        "hasExpressedInterest": lead.is_some(),
        "interestCancelled": lead.map_or(false, |l| l.interest_cancelled),
    })))
}

// GET /api/buyer/favorite-properties
pub async fn list_favorite_properties(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> ApiResult<Json<Value>> {
    use crate::models::engagement::Favorite;

    let mut conn = state.diesel_pool.get().await?;

    let ids = Favorite::list_property_ids_for_user(&mut conn, auth_user.user_id).await?;
    let properties = Property::list_by_ids(&mut conn, &ids).await?;

    Ok(Json(json!({ "properties": properties })))
}
