// Buyer-agent connection handlers, including the OTP confirmation flow

use axum::{
    extract::{Query, State},
    response::Json,
};
use chrono::Utc;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::app::AppState;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::connection::{
    BuyerAgentConnection, NewBuyerAgentConnection, CONNECTION_CONFIRMED, CONNECTION_PENDING,
};
use crate::models::lead::{NewPropertyLead, PropertyLead, LEAD_STATUS_PENDING};
use crate::models::property::{Property, PropertyStats};
use crate::models::transaction::{NewTransaction, Stage, Transaction, STATUS_PRE_DEPOSIT};
use crate::models::user::{User, UserError};
use crate::services::otp;
use crate::utils::api_error::{ApiError, ApiResult};
use crate::utils::messages;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectRequest {
    pub agent_id: Uuid,
    pub property_id: Uuid,
    pub buyer_name: Option<String>,
    pub buyer_email: Option<String>,
    pub buyer_phone: Option<String>,
    pub otp_method: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequest {
    pub buyer_id: Uuid,
    pub agent_id: Uuid,
    pub property_id: Uuid,
    pub otp_code: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckQuery {
    pub agent_id: Uuid,
    pub property_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateConnectionRequest {
    pub connection_id: Uuid,
    pub interest_cancelled: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteConnectionRequest {
    pub connection_id: Uuid,
}

/// Lead plus transaction creation shared by both confirmation paths.
/// Runs inside the caller's database transaction.
async fn establish_lead_and_transaction(
    conn: &mut AsyncPgConnection,
    connection: &BuyerAgentConnection,
    note: &str,
) -> Result<(PropertyLead, Transaction), ApiError> {
    let property = Property::find_by_id(conn, connection.property_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(messages::PROPERTY_NOT_FOUND.to_string()))?;

    let lead = match PropertyLead::find_active_for_pair(
        conn,
        connection.property_id,
        connection.buyer_id,
    )
    .await?
    {
        Some(existing) => existing,
        None => {
            PropertyLead::insert(
                conn,
                &NewPropertyLead {
                    property_id: connection.property_id,
                    buyer_id: connection.buyer_id,
                    agent_id: Some(connection.agent_id),
                    status: LEAD_STATUS_PENDING.to_string(),
                    interest_cancelled: false,
                    notes: Some(note.to_string()),
                },
            )
            .await?
        },
    };

    let transaction = match Transaction::find_active_for_pair(
        conn,
        connection.property_id,
        connection.buyer_id,
    )
    .await?
    {
        Some(existing) => existing,
        None => {
            Transaction::insert(
                conn,
                &NewTransaction {
                    property_id: connection.property_id,
                    buyer_id: connection.buyer_id,
                    seller_id: Some(property.user_id),
                    agent_id: Some(connection.agent_id),
                    status: STATUS_PRE_DEPOSIT.to_string(),
                    stage: Stage::Pending.as_str().to_string(),
                    interest_cancelled: false,
                    lead_id: Some(lead.id),
                },
            )
            .await?
        },
    };

    let lead = PropertyLead::link_transaction(conn, lead.id, transaction.id).await?;

    Ok((lead, transaction))
}

// POST /api/buyer-agent/connect
pub async fn connect(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Json(payload): Json<ConnectRequest>,
) -> ApiResult<Json<Value>> {
    let agent_initiated = payload.buyer_email.is_some() || payload.buyer_name.is_some();

    if agent_initiated {
        connect_agent_initiated(state, auth_user, payload).await
    } else {
        connect_self_serve(state, auth_user, payload).await
    }
}

/// Authenticated buyer connects directly: the connection is confirmed
/// immediately, no one-time code.
async fn connect_self_serve(
    state: AppState,
    auth_user: AuthenticatedUser,
    payload: ConnectRequest,
) -> ApiResult<Json<Value>> {
    let buyer_id = auth_user.user_id;
    let agent_id = payload.agent_id;
    let property_id = payload.property_id;

    let mut conn = state.diesel_pool.get().await?;

    let property = Property::find_by_id(&mut conn, property_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(messages::PROPERTY_NOT_FOUND.to_string()))?;

    if property.user_id == buyer_id {
        return Err(ApiError::Validation(
            messages::OWN_PROPERTY_INTEREST.to_string(),
        ));
    }

    if BuyerAgentConnection::find_for_triple(&mut conn, buyer_id, agent_id, property_id)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict(messages::CONNECTION_EXISTS.to_string()));
    }

    let (connection, lead, transaction) = conn
        .transaction::<(BuyerAgentConnection, PropertyLead, Transaction), ApiError, _>(|conn| {
            async move {
                let connection = BuyerAgentConnection::insert(
                    conn,
                    &NewBuyerAgentConnection {
                        buyer_id,
                        agent_id,
                        property_id,
                        status: CONNECTION_CONFIRMED.to_string(),
                        otp_code: None,
                        otp_expires: None,
                        interest_cancelled: false,
                    },
                )
                .await?;

                let (lead, transaction) = establish_lead_and_transaction(
                    conn,
                    &connection,
                    "Connection established directly by buyer.",
                )
                .await?;

                Ok((connection, lead, transaction))
            }
            .scope_boxed()
        })
        .await?;

    let buyer = match User::find_by_id(&mut conn, buyer_id).await {
        Ok(user) => user,
        Err(UserError::NotFound) => return Err(ApiError::Internal),
        Err(UserError::Database(e)) => return Err(e.into()),
    };

    drop(conn);

    let meta = json!({
        "leadId": lead.id,
        "transactionId": transaction.id,
        "buyerId": buyer_id,
        "agentId": agent_id,
        "buyerName": buyer.name,
        "buyerEmail": buyer.email,
        "shouldOpenModal": true
    });

    state
        .notifier
        .notify(
            property.user_id,
            messages::NEW_INTEREST_TITLE,
            &format!(
                "Ο {} ({}) συνδέθηκε με μεσίτη και ενδιαφέρεται για το ακίνητό σας \"{}\".",
                buyer.name, buyer.email, property.title
            ),
            "PROPERTY_INTEREST",
            Some(property_id),
            Some(merge_recipient(&meta, "seller")),
        )
        .await;

    state
        .notifier
        .notify(
            agent_id,
            messages::AGENT_CONNECTION_TITLE,
            &format!(
                "Ο χρήστης {} αποδέχθηκε να συνδεθεί μαζί σας για το ακίνητο \"{}\".",
                buyer.name, property.title
            ),
            "AGENT_CLIENT_CONNECTION",
            Some(property_id),
            Some(merge_recipient(&meta, "agent")),
        )
        .await;

    Ok(Json(json!({ "success": true, "connection": connection })))
}

/// Agent adds a prospect: find-or-create the buyer record, create a pending
/// connection, and dispatch a one-time code. Dispatch failure fails the call.
async fn connect_agent_initiated(
    state: AppState,
    _auth_user: AuthenticatedUser,
    payload: ConnectRequest,
) -> ApiResult<Json<Value>> {
    let (buyer_name, buyer_email) = match (&payload.buyer_name, &payload.buyer_email) {
        (Some(name), Some(email)) => (name.clone(), email.clone()),
        _ => {
            return Err(ApiError::Validation(
                "Missing required fields for new lead".to_string(),
            ));
        },
    };

    let mut conn = state.diesel_pool.get().await?;

    let buyer = User::find_or_create_prospect(
        &mut conn,
        &buyer_name,
        &buyer_email,
        payload.buyer_phone.as_deref(),
    )
    .await
    .map_err(|e| ApiError::Database(e.to_string()))?;

    let property = Property::find_by_id(&mut conn, payload.property_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(messages::PROPERTY_NOT_FOUND.to_string()))?;

    if property.user_id == buyer.id {
        return Err(ApiError::Validation(
            messages::OWN_PROPERTY_INTEREST.to_string(),
        ));
    }

    if BuyerAgentConnection::find_for_triple(
        &mut conn,
        buyer.id,
        payload.agent_id,
        payload.property_id,
    )
    .await?
    .is_some()
    {
        return Err(ApiError::Conflict(messages::CONNECTION_EXISTS.to_string()));
    }

    let code = otp::generate_code();
    let expires = otp::expiry_from(Utc::now());

    let connection = BuyerAgentConnection::insert(
        &mut conn,
        &NewBuyerAgentConnection {
            buyer_id: buyer.id,
            agent_id: payload.agent_id,
            property_id: payload.property_id,
            status: CONNECTION_PENDING.to_string(),
            otp_code: Some(code.clone()),
            otp_expires: Some(expires),
            interest_cancelled: false,
        },
    )
    .await?;

    let agent_name = match User::find_by_id(&mut conn, payload.agent_id).await {
        Ok(agent) => agent.name,
        Err(UserError::NotFound) => "".to_string(),
        Err(UserError::Database(e)) => return Err(e.into()),
    };

    drop(conn);

    match payload.otp_method.as_deref() {
        Some("sms") => {
            let phone = payload.buyer_phone.as_deref().ok_or_else(|| {
                ApiError::Validation("Phone number required for SMS delivery".to_string())
            })?;
            state
                .sms_sender
                .send_otp(phone, &code)
                .await
                .map_err(|e| ApiError::Database(e.to_string()))?;
        },
        _ => {
            state
                .email_sender
                .send_otp(&buyer_email, &agent_name, &code)
                .await
                .map_err(|e| ApiError::Database(e.to_string()))?;
        },
    }

    Ok(Json(json!({
        "connectionId": connection.id,
        "buyerId": buyer.id,
        "agentId": payload.agent_id,
        "propertyId": payload.property_id,
    })))
}

// POST /api/buyer-agent/verify-otp
pub async fn verify_otp(
    State(state): State<AppState>,
    _auth_user: AuthenticatedUser,
    Json(payload): Json<VerifyOtpRequest>,
) -> ApiResult<Json<Value>> {
    let mut conn = state.diesel_pool.get().await?;

    let connection = BuyerAgentConnection::find_for_triple(
        &mut conn,
        payload.buyer_id,
        payload.agent_id,
        payload.property_id,
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Η σύνδεση δεν βρέθηκε".to_string()))?;

    match otp::check_code(
        connection.otp_code.as_deref(),
        connection.otp_expires,
        &payload.otp_code,
        Utc::now(),
    ) {
        otp::OtpCheck::Expired => {
            return Err(ApiError::Validation(otp::OTP_EXPIRED.to_string()));
        },
        otp::OtpCheck::Mismatch => {
            return Err(ApiError::Validation(otp::OTP_INVALID.to_string()));
        },
        otp::OtpCheck::Valid => {},
    }

    let connection_id = connection.id;
    let property_id = connection.property_id;

    let (confirmed, lead, transaction) = conn
        .transaction::<(BuyerAgentConnection, PropertyLead, Transaction), ApiError, _>(|conn| {
            async move {
                let confirmed = BuyerAgentConnection::confirm(conn, connection_id).await?;

                let (lead, transaction) = establish_lead_and_transaction(
                    conn,
                    &confirmed,
                    "Initial connection established",
                )
                .await?;

                PropertyStats::adjust_interested(conn, property_id, 1).await?;

                Ok((confirmed, lead, transaction))
            }
            .scope_boxed()
        })
        .await?;

    let buyer = match User::find_by_id(&mut conn, confirmed.buyer_id).await {
        Ok(user) => user,
        Err(UserError::NotFound) => return Err(ApiError::Internal),
        Err(UserError::Database(e)) => return Err(e.into()),
    };

    let property = Property::find_by_id(&mut conn, property_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(messages::PROPERTY_NOT_FOUND.to_string()))?;

    drop(conn);

    let meta = json!({
        "leadId": lead.id,
        "transactionId": transaction.id,
        "buyerId": confirmed.buyer_id,
        "agentId": confirmed.agent_id,
        "buyerName": buyer.name,
        "buyerEmail": buyer.email,
        "shouldOpenModal": true
    });

    state
        .notifier
        .notify(
            property.user_id,
            messages::NEW_INTEREST_TITLE,
            &format!(
                "Ο μεσίτης πρόσθεσε τον {} ({}) ως ενδιαφερόμενο για το ακίνητό σας \"{}\".",
                buyer.name, buyer.email, property.title
            ),
            "PROPERTY_INTEREST",
            Some(property_id),
            Some(merge_recipient(&meta, "seller")),
        )
        .await;

    state
        .notifier
        .notify(
            confirmed.agent_id,
            messages::AGENT_LEAD_ADDED_TITLE,
            &format!(
                "Προσθέσατε επιτυχώς τον {} ({}) ως ενδιαφερόμενο για το ακίνητο \"{}\".",
                buyer.name, buyer.email, property.title
            ),
            "AGENT_LEAD_ADDED",
            Some(property_id),
            Some(merge_recipient(&meta, "agent")),
        )
        .await;

    state
        .notifier
        .notify(
            confirmed.buyer_id,
            messages::BUYER_CONNECTED_TITLE,
            messages::BUYER_CONNECTED_BODY,
            "INTERESTED",
            Some(property_id),
            Some(json!({
                "leadId": lead.id,
                "transactionId": transaction.id,
                "shouldOpenModal": false
            })),
        )
        .await;

    Ok(Json(json!({
        "message": "OTP verified successfully",
        "connection": confirmed,
        "lead": lead,
        "transaction": transaction,
    })))
}

// GET /api/buyer-agent/check
pub async fn check_connection(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Query(query): Query<CheckQuery>,
) -> ApiResult<Json<Value>> {
    let mut conn = state.diesel_pool.get().await?;

    let connection = BuyerAgentConnection::find_for_triple(
        &mut conn,
        auth_user.user_id,
        query.agent_id,
        query.property_id,
    )
    .await?;

    Ok(Json(json!({
        "connected": connection
            .as_ref()
            .map(|c| c.status == CONNECTION_CONFIRMED)
            .unwrap_or(false),
        "connection": connection,
    })))
}

// GET /api/buyer-agent/connections
pub async fn list_connections(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> ApiResult<Json<Value>> {
    use crate::models::user::Role;

    let mut conn = state.diesel_pool.get().await?;

    let connections = match auth_user.role() {
        Some(Role::Agent) => {
            BuyerAgentConnection::list_for_agent(&mut conn, auth_user.user_id).await?
        },
        _ => BuyerAgentConnection::list_for_buyer(&mut conn, auth_user.user_id).await?,
    };

    Ok(Json(json!({ "connections": connections })))
}

// PATCH /api/buyer-agent/connections
pub async fn update_connection(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Json(payload): Json<UpdateConnectionRequest>,
) -> ApiResult<Json<Value>> {
    let mut conn = state.diesel_pool.get().await?;

    let connection = BuyerAgentConnection::find_by_id(&mut conn, payload.connection_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Η σύνδεση δεν βρέθηκε".to_string()))?;

    let is_participant = connection.buyer_id == auth_user.user_id
        || connection.agent_id == auth_user.user_id;
    if !is_participant && !auth_user.is_admin() {
        return Err(ApiError::Forbidden(messages::FORBIDDEN.to_string()));
    }

    BuyerAgentConnection::set_interest_cancelled_for_pair(
        &mut conn,
        connection.buyer_id,
        connection.property_id,
        payload.interest_cancelled,
    )
    .await?;

    let updated = BuyerAgentConnection::find_by_id(&mut conn, payload.connection_id).await?;

    Ok(Json(json!({ "success": true, "connection": updated })))
}

// DELETE /api/buyer-agent/connections
pub async fn delete_connection(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
    Json(payload): Json<DeleteConnectionRequest>,
) -> ApiResult<Json<Value>> {
    let mut conn = state.diesel_pool.get().await?;

    let connection = BuyerAgentConnection::find_by_id(&mut conn, payload.connection_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Η σύνδεση δεν βρέθηκε".to_string()))?;

    let is_participant = connection.buyer_id == auth_user.user_id
        || connection.agent_id == auth_user.user_id;
    if !is_participant && !auth_user.is_admin() {
        return Err(ApiError::Forbidden(messages::FORBIDDEN.to_string()));
    }

    BuyerAgentConnection::delete(&mut conn, connection.id).await?;

    Ok(Json(json!({ "success": true })))
}

fn merge_recipient(meta: &Value, recipient: &str) -> Value {
    let mut merged = meta.clone();
    if let Value::Object(map) = &mut merged {
        map.insert("recipient".to_string(), json!(recipient));
    }
    merged
}
