// Agent-facing read views

use axum::{extract::State, response::Json};
use serde_json::{json, Value};

use crate::app::AppState;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::connection::{BuyerAgentConnection, CONNECTION_CONFIRMED};
use crate::models::property::{can_view_property, Property, ViewerRelation};
use crate::models::transaction::Transaction;
use crate::models::user::{User, UserError, UserProfile};
use crate::utils::api_error::ApiResult;

// GET /api/agent/clients
// Confirmed connections with buyer, property, transaction, and display stage.
pub async fn list_clients(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> ApiResult<Json<Value>> {
    let mut conn = state.diesel_pool.get().await?;

    let connections = BuyerAgentConnection::list_for_agent(&mut conn, auth_user.user_id).await?;

    let mut entries = Vec::new();
    for connection in connections
        .iter()
        .filter(|c| c.status == CONNECTION_CONFIRMED)
    {
        let buyer = match User::find_by_id(&mut conn, connection.buyer_id).await {
            Ok(user) => Some(UserProfile::from(&user)),
            Err(UserError::NotFound) => None,
            Err(UserError::Database(e)) => return Err(e.into()),
        };

        let property = Property::find_by_id(&mut conn, connection.property_id).await?;

        let transaction = Transaction::find_active_for_pair(
            &mut conn,
            connection.property_id,
            connection.buyer_id,
        )
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
            "connection": connection,
            "buyer": buyer,
            "property": property.map(|p| json!({ "id": p.id, "title": p.title, "status": p.status })),
            "transaction": view,
        }));
    }

    Ok(Json(json!({ "clients": entries })))
}

// GET /api/agent/properties
// Catalog as the agent sees it: public listings plus unavailable ones the
// agent is connected to.
pub async fn list_properties(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> ApiResult<Json<Value>> {
    let mut conn = state.diesel_pool.get().await?;

    let mut properties = Property::list_visible(&mut conn).await?;

    let connections = BuyerAgentConnection::list_for_agent(&mut conn, auth_user.user_id).await?;
    for connection in &connections {
        if properties.iter().any(|p| p.id == connection.property_id) {
            continue;
        }

        if let Some(property) = Property::find_by_id(&mut conn, connection.property_id).await? {
            let relation = ViewerRelation {
                is_connected_agent: true,
                ..Default::default()
            };
            if can_view_property(&property.status, Some(relation)) {
                properties.push(property);
            }
        }
    }

    Ok(Json(json!({ "properties": properties })))
}
