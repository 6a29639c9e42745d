// Admin transaction endpoints, including the stage-update route

use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::str::FromStr;
use uuid::Uuid;

use crate::app::AppState;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::lead::PropertyLead;
use crate::models::property::Property;
use crate::models::transaction::{
    NewTransactionProgress, Stage, Transaction, STATUS_CANCELLED,
};
use crate::models::user::{User, UserError};
use crate::utils::api_error::{ApiError, ApiResult};
use crate::utils::messages;

fn require_admin(auth_user: &AuthenticatedUser) -> Result<(), ApiError> {
    if auth_user.is_admin() {
        Ok(())
    } else {
        Err(ApiError::Forbidden(messages::FORBIDDEN.to_string()))
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub cancelled: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct StageRequest {
    pub stage: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterestCancelledRequest {
    pub interest_cancelled: bool,
}

#[derive(Debug, Deserialize)]
pub struct ProgressRequest {
    pub stage: String,
    pub notes: Option<String>,
}

// GET /api/admin/transactions
// Transactions merged with leads that never produced one, each with its
// display stage.
pub async fn list_transactions(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Value>> {
    require_admin(&auth_user)?;

    let include_cancelled = query.cancelled.unwrap_or(false);

    let mut conn = state.diesel_pool.get().await?;

    let transactions = Transaction::list(&mut conn, include_cancelled).await?;

    let mut entries = Vec::with_capacity(transactions.len());
    for txn in &transactions {
        let latest = Transaction::latest_progress(&mut conn, txn.id).await?;
        entries.push(json!({
            "id": txn.id,
            "propertyId": txn.property_id,
            "buyerId": txn.buyer_id,
            "sellerId": txn.seller_id,
            "agentId": txn.agent_id,
            "status": txn.status,
            "stage": txn.display_stage(latest.as_ref()),
            "interestCancelled": txn.interest_cancelled,
            "leadId": txn.lead_id,
            "createdAt": txn.created_at,
            "updatedAt": txn.updated_at,
            "source": "transaction",
        }));
    }

    // Leads with no transaction yet still show up, stage defaulting to the
    // lead status
    let leads = PropertyLead::list_unlinked(&mut conn, include_cancelled).await?;

    for lead in &leads {
        entries.push(json!({
            "id": lead.id,
            "propertyId": lead.property_id,
            "buyerId": lead.buyer_id,
            "agentId": lead.agent_id,
            "status": lead.status,
            "stage": lead.status,
            "interestCancelled": lead.interest_cancelled,
            "createdAt": lead.created_at,
            "updatedAt": lead.updated_at,
            "source": "lead",
        }));
    }

    Ok(Json(json!({ "transactions": entries })))
}

// GET /api/admin/transactions/:id
pub async fn get_transaction(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(txn_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    require_admin(&auth_user)?;

    let mut conn = state.diesel_pool.get().await?;

    let txn = Transaction::find_by_id(&mut conn, txn_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Transaction not found".to_string()))?;

    let latest = Transaction::latest_progress(&mut conn, txn.id).await?;
    let history = Transaction::progress_history(&mut conn, txn.id).await?;

    Ok(Json(json!({
        "transaction": txn,
        "stage": txn.display_stage(latest.as_ref()),
        "progress": history,
    })))
}

// PATCH /api/admin/transactions/:id
pub async fn update_interest_cancelled(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(txn_id): Path<Uuid>,
    Json(payload): Json<InterestCancelledRequest>,
) -> ApiResult<Json<Value>> {
    require_admin(&auth_user)?;

    let mut conn = state.diesel_pool.get().await?;

    Transaction::find_by_id(&mut conn, txn_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Transaction not found".to_string()))?;

    let txn =
        Transaction::set_interest_cancelled(&mut conn, txn_id, payload.interest_cancelled).await?;

    Ok(Json(json!({ "success": true, "transaction": txn })))
}

// PUT /api/admin/transactions/:id/stage
// The reference id may be a transaction, a lead, or a connection; leads and
// connections are promoted to transactions on the fly. Any stage may be set
// from any other stage.
pub async fn update_stage(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(reference_id): Path<Uuid>,
    Json(payload): Json<StageRequest>,
) -> ApiResult<Json<Value>> {
    require_admin(&auth_user)?;

    let stage = Stage::from_str(&payload.stage)
        .map_err(|_| ApiError::Validation(Stage::invalid_stage_message().to_string()))?;

    let resolved = state
        .lifecycle
        .set_stage(reference_id, stage, auth_user.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Transaction not found".to_string()))?;

    let transaction = resolved.transaction;

    state
        .notifier
        .notify(
            transaction.buyer_id,
            "Transaction Stage Updated",
            &format!("Transaction stage updated to {}", stage),
            "STAGE_UPDATE",
            Some(transaction.property_id),
            Some(json!({
                "leadId": transaction.lead_id,
                "transactionId": transaction.id,
                "stage": stage.as_str(),
                "shouldOpenModal": true
            })),
        )
        .await;

    if let Some(agent_id) = transaction.agent_id {
        let mut conn = state.diesel_pool.get().await?;

        let buyer_name = match User::find_by_id(&mut conn, transaction.buyer_id).await {
            Ok(user) => user.name,
            Err(UserError::NotFound) => messages::UNKNOWN_BUYER.to_string(),
            Err(UserError::Database(e)) => return Err(e.into()),
        };

        let property_title = Property::find_by_id(&mut conn, transaction.property_id)
            .await?
            .map(|p| p.title)
            .unwrap_or_else(|| messages::UNKNOWN_PROPERTY.to_string());

        drop(conn);

        let stage_greek = messages::stage_in_greek(stage.as_str());

        state
            .notifier
            .notify(
                agent_id,
                messages::AGENT_STAGE_UPDATE_TITLE,
                &format!(
                    "Η συναλλαγή με τον {} για το ακίνητο \"{}\" ενημερώθηκε σε: {}",
                    buyer_name, property_title, stage_greek
                ),
                "AGENT_STAGE_UPDATE",
                Some(transaction.property_id),
                Some(json!({
                    "leadId": transaction.lead_id,
                    "transactionId": transaction.id,
                    "stage": stage.as_str(),
                    "stageInGreek": stage_greek,
                    "buyerId": transaction.buyer_id,
                    "buyerName": buyer_name,
                    "propertyTitle": property_title,
                    "recipient": "agent",
                    "shouldOpenModal": true
                })),
            )
            .await;
    }

    Ok(Json(json!(transaction)))
}

// GET /api/admin/transactions/:id/progress
pub async fn get_progress(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(txn_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    require_admin(&auth_user)?;

    let mut conn = state.diesel_pool.get().await?;

    let history = Transaction::progress_history(&mut conn, txn_id).await?;

    Ok(Json(json!({ "progress": history })))
}

// POST /api/admin/transactions/:id/progress
pub async fn create_progress(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(txn_id): Path<Uuid>,
    Json(payload): Json<ProgressRequest>,
) -> ApiResult<Json<Value>> {
    require_admin(&auth_user)?;

    let stage = Stage::from_str(&payload.stage)
        .map_err(|_| ApiError::Validation(Stage::invalid_stage_message().to_string()))?;

    let mut conn = state.diesel_pool.get().await?;

    let txn = Transaction::find_by_id(&mut conn, txn_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Transaction not found".to_string()))?;

    if txn.status == STATUS_CANCELLED {
        return Err(ApiError::Validation(
            "Cannot add progress to a cancelled transaction".to_string(),
        ));
    }

    let progress = Transaction::append_progress(
        &mut conn,
        &NewTransactionProgress {
            transaction_id: txn.id,
            stage: stage.as_str().to_string(),
            notes: payload.notes,
            created_by_id: auth_user.user_id,
        },
    )
    .await?;

    Ok(Json(json!({ "success": true, "progress": progress })))
}
