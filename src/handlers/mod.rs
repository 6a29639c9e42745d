// HTTP handlers and route tables

pub mod admin_transactions;
pub mod agent;
pub mod auth;
pub mod buyer;
pub mod buyer_agent;
pub mod notifications;
pub mod properties;
pub mod seller;
pub mod support;
pub mod viewing_requests;

use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, patch, post, put};
use axum::Router;

use crate::app::AppState;
use crate::middleware::{auth_middleware, optional_auth_middleware};

/// `/api/auth`
pub fn auth_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/me", get(auth::me))
        .route_layer(from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .merge(protected)
}

/// `/api/properties`. Reads run with optional authentication so the
/// unavailable-listing rule can account for who is asking.
pub fn property_routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/", get(properties::list_properties))
        .route("/{property_id}", get(properties::get_property))
        .route(
            "/{property_id}/availability",
            get(properties::list_availability),
        )
        .route_layer(from_fn_with_state(state.clone(), optional_auth_middleware));

    let protected = Router::new()
        .route("/", post(properties::create_property))
        .route(
            "/{property_id}",
            patch(properties::update_property).delete(properties::delete_property),
        )
        .route("/{property_id}/favorite", post(properties::toggle_favorite))
        .route(
            "/{property_id}/availability",
            post(properties::add_availability),
        )
        .route(
            "/{property_id}/availability/{slot_id}",
            delete(properties::delete_availability),
        )
        .route("/{property_id}/inquiries", post(properties::create_inquiry))
        .route(
            "/{property_id}/request-removal",
            post(properties::request_removal),
        )
        .route_layer(from_fn_with_state(state, auth_middleware));

    public.merge(protected)
}

/// `/api/buyer`
pub fn buyer_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/interested-properties",
            get(buyer::list_interested_properties).post(buyer::express_interest),
        )
        .route(
            "/interested-properties/{property_id}",
            delete(buyer::cancel_interest),
        )
        .route(
            "/interested-properties/{property_id}/restore",
            patch(buyer::restore_interest),
        )
        .route("/interest-status/{property_id}", get(buyer::interest_status))
        .route("/favorite-properties", get(buyer::list_favorite_properties))
        .route_layer(from_fn_with_state(state, auth_middleware))
}

/// `/api/buyer-agent`
pub fn buyer_agent_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/connect", post(buyer_agent::connect))
        .route("/verify-otp", post(buyer_agent::verify_otp))
        .route("/check", get(buyer_agent::check_connection))
        .route(
            "/connections",
            get(buyer_agent::list_connections)
                .patch(buyer_agent::update_connection)
                .delete(buyer_agent::delete_connection),
        )
        .route_layer(from_fn_with_state(state, auth_middleware))
}

/// `/api/seller`
pub fn seller_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/leads", get(seller::list_leads))
        .route("/properties", get(seller::list_properties))
        .route_layer(from_fn_with_state(state, auth_middleware))
}

/// `/api/agent`
pub fn agent_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/clients", get(agent::list_clients))
        .route("/properties", get(agent::list_properties))
        .route_layer(from_fn_with_state(state, auth_middleware))
}

/// `/api/admin/transactions`
pub fn admin_transaction_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(admin_transactions::list_transactions))
        .route(
            "/{transaction_id}",
            get(admin_transactions::get_transaction)
                .patch(admin_transactions::update_interest_cancelled),
        )
        .route(
            "/{transaction_id}/stage",
            put(admin_transactions::update_stage),
        )
        .route(
            "/{transaction_id}/progress",
            get(admin_transactions::get_progress).post(admin_transactions::create_progress),
        )
        .route_layer(from_fn_with_state(state, auth_middleware))
}

/// `/api/viewing-requests`
pub fn viewing_request_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(viewing_requests::list_viewing_requests)
                .post(viewing_requests::create_viewing_request),
        )
        .route(
            "/{request_id}",
            get(viewing_requests::get_viewing_request)
                .delete(viewing_requests::delete_viewing_request),
        )
        .route(
            "/{request_id}/status",
            patch(viewing_requests::update_viewing_status),
        )
        .route_layer(from_fn_with_state(state, auth_middleware))
}

/// `/api/notifications`
pub fn notification_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(notifications::list_notifications))
        .route("/read", put(notifications::mark_read))
        .route(
            "/{notification_id}",
            delete(notifications::delete_notification),
        )
        .route_layer(from_fn_with_state(state, auth_middleware))
}

/// `/api/support`
pub fn support_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/tickets",
            get(support::list_tickets).post(support::create_ticket),
        )
        .route("/tickets/{ticket_id}", get(support::get_ticket))
        .route(
            "/tickets/{ticket_id}/status",
            patch(support::update_ticket_status),
        )
        .route("/tickets/{ticket_id}/messages", get(support::list_messages))
        .route("/messages", post(support::create_message))
        .route_layer(from_fn_with_state(state, auth_middleware))
}
