// Authentication handlers: register, login, current user

use axum::{extract::State, response::Json};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde_json::{json, Value};
use validator::Validate;

use crate::app::AppState;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::auth::{AuthResponse, LoginRequest, RegisterRequest};
use crate::models::user::{NewUser, Role, User, UserError, UserProfile};
use crate::utils::api_error::{ApiError, ApiResult};
use crate::utils::password::{hash_password, verify_password};

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<Json<AuthResponse>> {
    payload.validate()?;

    let role = match payload.role.as_deref() {
        Some(r) => r
            .parse::<Role>()
            .map_err(|_| ApiError::Validation(format!("Invalid role: {}", r)))?,
        None => Role::Buyer,
    };

    let mut conn = state.diesel_pool.get().await?;

    match User::find_by_email(&mut conn, &payload.email).await {
        Ok(_) => {
            return Err(ApiError::Conflict(
                "Ο λογαριασμός με αυτό το email υπάρχει ήδη".to_string(),
            ));
        },
        Err(UserError::NotFound) => {},
        Err(UserError::Database(e)) => return Err(e.into()),
    }

    let password_hash =
        hash_password(&payload.password).map_err(|e| ApiError::Database(e.to_string()))?;

    let new_user = NewUser {
        email: payload.email.trim().to_lowercase(),
        password_hash,
        name: payload.name.trim().to_string(),
        role: role.as_str().to_string(),
        phone: payload.phone,
        company_name: payload.company_name,
        license_number: payload.license_number,
    };

    let user: User = diesel::insert_into(crate::schema::users::table)
        .values(&new_user)
        .get_result(&mut conn)
        .await?;

    let token = state
        .jwt_service
        .generate_token(&user)
        .map_err(|_| ApiError::Internal)?;

    Ok(Json(AuthResponse {
        token,
        user: UserProfile::from(&user),
    }))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    payload.validate()?;

    let mut conn = state.diesel_pool.get().await?;

    let user = match User::find_by_email(&mut conn, &payload.email).await {
        Ok(user) => user,
        Err(UserError::NotFound) => {
            return Err(ApiError::Unauthorized(
                "Λάθος email ή κωδικός πρόσβασης".to_string(),
            ));
        },
        Err(UserError::Database(e)) => return Err(e.into()),
    };

    let valid = verify_password(&payload.password, &user.password_hash)
        .map_err(|e| ApiError::Database(e.to_string()))?;

    if !valid {
        return Err(ApiError::Unauthorized(
            "Λάθος email ή κωδικός πρόσβασης".to_string(),
        ));
    }

    let token = state
        .jwt_service
        .generate_token(&user)
        .map_err(|_| ApiError::Internal)?;

    Ok(Json(AuthResponse {
        token,
        user: UserProfile::from(&user),
    }))
}

pub async fn me(
    State(state): State<AppState>,
    auth_user: AuthenticatedUser,
) -> ApiResult<Json<Value>> {
    let mut conn = state.diesel_pool.get().await?;

    let user = match User::find_by_id(&mut conn, auth_user.user_id).await {
        Ok(user) => user,
        Err(UserError::NotFound) => {
            return Err(ApiError::NotFound("Ο χρήστης δεν βρέθηκε".to_string()));
        },
        Err(UserError::Database(e)) => return Err(e.into()),
    };

    Ok(Json(json!({ "user": UserProfile::from(&user) })))
}
