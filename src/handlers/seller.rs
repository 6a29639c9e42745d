// Seller-facing read views

use axum::{extract::State, response::Json};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::app::AppState;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::lead::PropertyLead;
use crate::models::property::Property;
use crate::models::transaction::Transaction;
use crate::models::user::{User, UserError, UserProfile};
use crate::utils::api_error::ApiResult;

// GET /api/seller/leads
// Each lead carries its buyer, its transaction, and the display stage.
pub async fn list_leads(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> ApiResult<Json<Value>> {
    let mut conn = state.diesel_pool.get().await?;

    let properties = Property::list_for_owner(&mut conn, auth_user.user_id).await?;
    let property_ids: Vec<Uuid> = properties.iter().map(|p| p.id).collect();

    let leads = PropertyLead::list_for_properties(&mut conn, &property_ids).await?;

    let mut entries = Vec::with_capacity(leads.len());
    for lead in &leads {
        let property = properties.iter().find(|p| p.id == lead.property_id);

        let buyer = match User::find_by_id(&mut conn, lead.buyer_id).await {
            Ok(user) => Some(UserProfile::from(&user)),
            Err(UserError::NotFound) => None,
            Err(UserError::Database(e)) => return Err(e.into()),
        };

        let transaction = match lead.transaction_id {
            Some(txn_id) => Transaction::find_by_id(&mut conn, txn_id).await?,
            None => {
                Transaction::find_active_for_pair(&mut conn, lead.property_id, lead.buyer_id)
                    .await?
            },
        };

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
            "property": property.map(|p| json!({ "id": p.id, "title": p.title, "status": p.status })),
            "buyer": buyer,
            "transaction": view,
        }));
    }

    Ok(Json(json!({ "leads": entries })))
}

// GET /api/seller/properties
pub async fn list_properties(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> ApiResult<Json<Value>> {
    let mut conn = state.diesel_pool.get().await?;

    let properties = Property::list_for_owner(&mut conn, auth_user.user_id).await?;

    Ok(Json(json!({ "properties": properties })))
}
