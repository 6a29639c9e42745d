// Support ticketing handlers

use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::support::{
    CreateMessageRequest, CreateTicketRequest, NewSupportMessage, NewSupportTicket,
    SupportMessage, SupportTicket, TICKET_CLOSED, TICKET_IN_PROGRESS, TICKET_OPEN,
};
use crate::utils::api_error::{ApiError, ApiResult};
use crate::utils::messages;

const TICKET_NOT_FOUND: &str = "Το αίτημα υποστήριξης δεν βρέθηκε";

fn is_valid_ticket_status(status: &str) -> bool {
    matches!(status, TICKET_OPEN | TICKET_IN_PROGRESS | TICKET_CLOSED)
}

async fn load_ticket_for(
    conn: &mut diesel_async::AsyncPgConnection,
    auth_user: &AuthenticatedUser,
    ticket_id: Uuid,
) -> Result<SupportTicket, ApiError> {
    let ticket = SupportTicket::find_by_id(conn, ticket_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(TICKET_NOT_FOUND.to_string()))?;

    if ticket.user_id != auth_user.user_id
        && ticket.created_by_id != auth_user.user_id
        && !auth_user.is_admin()
    {
        return Err(ApiError::Forbidden(messages::FORBIDDEN.to_string()));
    }

    Ok(ticket)
}

// GET /api/support/tickets
pub async fn list_tickets(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> ApiResult<Json<Value>> {
    let mut conn = state.diesel_pool.get().await?;

    let tickets = if auth_user.is_admin() {
        SupportTicket::list_all(&mut conn).await?
    } else {
        SupportTicket::list_for_user(&mut conn, auth_user.user_id).await?
    };

    Ok(Json(json!({ "tickets": tickets })))
}

// POST /api/support/tickets
// Admins may open a ticket on another user's behalf via userId.
pub async fn create_ticket(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Json(payload): Json<CreateTicketRequest>,
) -> ApiResult<Json<Value>> {
    payload.validate()?;

    let subject_user = match payload.user_id {
        Some(target) if target != auth_user.user_id => {
            if !auth_user.is_admin() {
                return Err(ApiError::Forbidden(messages::FORBIDDEN.to_string()));
            }
            target
        },
        _ => auth_user.user_id,
    };

    let mut conn = state.diesel_pool.get().await?;

    let ticket = SupportTicket::insert(
        &mut conn,
        &NewSupportTicket {
            user_id: subject_user,
            created_by_id: auth_user.user_id,
            subject: payload.subject.clone(),
            category: payload.category.clone(),
            priority: payload.priority.clone().unwrap_or_else(|| "NORMAL".to_string()),
            status: TICKET_OPEN.to_string(),
        },
    )
    .await?;

    let message = match &payload.message {
        Some(body) if !body.is_empty() => Some(
            SupportMessage::insert(
                &mut conn,
                &NewSupportMessage {
                    ticket_id: ticket.id,
                    sender_id: auth_user.user_id,
                    body: body.clone(),
                    metadata: None,
                },
            )
            .await?,
        ),
        _ => None,
    };

    drop(conn);

    if !auth_user.is_admin() {
        state
            .notifier
            .notify_admins(
                messages::SUPPORT_TICKET_TITLE,
                &ticket.subject,
                "SUPPORT_TICKET",
                None,
                Some(json!({ "ticketId": ticket.id })),
            )
            .await;
    }

    Ok(Json(json!({ "success": true, "ticket": ticket, "message": message })))
}

// GET /api/support/tickets/:id
pub async fn get_ticket(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(ticket_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let mut conn = state.diesel_pool.get().await?;

    let ticket = load_ticket_for(&mut conn, &auth_user, ticket_id).await?;
    let thread = SupportMessage::list_for_ticket(&mut conn, ticket.id).await?;

    Ok(Json(json!({ "ticket": ticket, "messages": thread })))
}

#[derive(Debug, Deserialize)]
pub struct TicketStatusRequest {
    pub status: String,
}

// PATCH /api/support/tickets/:id/status
pub async fn update_ticket_status(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(ticket_id): Path<Uuid>,
    Json(payload): Json<TicketStatusRequest>,
) -> ApiResult<Json<Value>> {
    if !auth_user.is_admin() {
        return Err(ApiError::Forbidden(messages::FORBIDDEN.to_string()));
    }

    let status = payload.status.to_uppercase();
    if !is_valid_ticket_status(&status) {
        return Err(ApiError::Validation(format!(
            "Invalid ticket status. Must be one of: {}, {}, {}",
            TICKET_OPEN, TICKET_IN_PROGRESS, TICKET_CLOSED
        )));
    }

    let mut conn = state.diesel_pool.get().await?;

    SupportTicket::find_by_id(&mut conn, ticket_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(TICKET_NOT_FOUND.to_string()))?;

    let ticket = SupportTicket::set_status(&mut conn, ticket_id, &status).await?;

    Ok(Json(json!({ "success": true, "ticket": ticket })))
}

// GET /api/support/tickets/:id/messages
pub async fn list_messages(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Path(ticket_id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let mut conn = state.diesel_pool.get().await?;

    let ticket = load_ticket_for(&mut conn, &auth_user, ticket_id).await?;
    let thread = SupportMessage::list_for_ticket(&mut conn, ticket.id).await?;

    Ok(Json(json!({ "messages": thread })))
}

// POST /api/support/messages
pub async fn create_message(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Json(payload): Json<CreateMessageRequest>,
) -> ApiResult<Json<Value>> {
    payload.validate()?;

    let mut conn = state.diesel_pool.get().await?;

    let ticket = load_ticket_for(&mut conn, &auth_user, payload.ticket_id).await?;

    if ticket.status == TICKET_CLOSED {
        return Err(ApiError::Validation(
            "Cannot reply to a closed ticket".to_string(),
        ));
    }

    let message = SupportMessage::insert(
        &mut conn,
        &NewSupportMessage {
            ticket_id: ticket.id,
            sender_id: auth_user.user_id,
            body: payload.body.clone(),
            metadata: payload.metadata.clone(),
        },
    )
    .await?;

    // A reply from staff moves an open ticket along
    if auth_user.is_admin() && ticket.status == TICKET_OPEN {
        SupportTicket::set_status(&mut conn, ticket.id, TICKET_IN_PROGRESS).await?;
    }

    drop(conn);

    // The other side of the thread hears about the reply
    if auth_user.is_admin() {
        state
            .notifier
            .notify(
                ticket.user_id,
                messages::SUPPORT_REPLY_TITLE,
                &ticket.subject,
                "SUPPORT_REPLY",
                None,
                Some(json!({ "ticketId": ticket.id })),
            )
            .await;
    } else {
        state
            .notifier
            .notify_admins(
                messages::SUPPORT_REPLY_TITLE,
                &ticket.subject,
                "SUPPORT_REPLY",
                None,
                Some(json!({ "ticketId": ticket.id })),
            )
            .await;
    }

    Ok(Json(json!({ "success": true, "message": message })))
}
