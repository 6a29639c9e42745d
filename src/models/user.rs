// User database model

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::schema::users;

/// Marketplace role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Role {
    Buyer,
    Seller,
    Agent,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Buyer => "BUYER",
            Role::Seller => "SELLER",
            Role::Agent => "AGENT",
            Role::Admin => "ADMIN",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "BUYER" => Ok(Role::Buyer),
            "SELLER" => Ok(Role::Seller),
            "AGENT" => Ok(Role::Agent),
            "ADMIN" => Ok(Role::Admin),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

/// User database model - queryable from database
#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub role: String,
    pub phone: Option<String>,
    pub company_name: Option<String>,
    pub license_number: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New user for insertion
#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: String,
    pub phone: Option<String>,
    pub company_name: Option<String>,
    pub license_number: Option<String>,
}

/// Public profile projection (no password hash)
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: String,
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role.clone(),
            phone: user.phone.clone(),
            company_name: user.company_name.clone(),
        }
    }
}

/// Errors for user operations
#[derive(thiserror::Error, Debug)]
pub enum UserError {
    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("User not found")]
    NotFound,
}

impl User {
    /// Find user by ID
    pub async fn find_by_id(
        conn: &mut AsyncPgConnection,
        user_id: Uuid,
    ) -> Result<Self, UserError> {
        use crate::schema::users::dsl::*;

        users
            .filter(id.eq(user_id))
            .first::<User>(conn)
            .await
            .map_err(|e| match e {
                diesel::result::Error::NotFound => UserError::NotFound,
                _ => UserError::Database(e),
            })
    }

    /// Find user by email (case-insensitive)
    pub async fn find_by_email(
        conn: &mut AsyncPgConnection,
        email_str: &str,
    ) -> Result<Self, UserError> {
        use crate::schema::users::dsl::*;
        use diesel::PgTextExpressionMethods;

        users
            .filter(email.ilike(email_str))
            .first::<User>(conn)
            .await
            .map_err(|e| match e {
                diesel::result::Error::NotFound => UserError::NotFound,
                _ => UserError::Database(e),
            })
    }

    /// Find an existing user by email or create a prospect record with a
    /// placeholder password (agent-initiated connection flow)
    pub async fn find_or_create_prospect(
        conn: &mut AsyncPgConnection,
        prospect_name: &str,
        prospect_email: &str,
        prospect_phone: Option<&str>,
    ) -> Result<Self, UserError> {
        use crate::schema::users::dsl::*;

        match Self::find_by_email(conn, prospect_email).await {
            Ok(user) => Ok(user),
            Err(UserError::NotFound) => {
                let placeholder = format!("lead-{}", Utc::now().timestamp_millis());
                let new_user = NewUser {
                    email: prospect_email.to_string(),
                    password_hash: placeholder,
                    name: prospect_name.to_string(),
                    role: Role::Buyer.as_str().to_string(),
                    phone: prospect_phone.map(|p| p.to_string()),
                    company_name: None,
                    license_number: None,
                };

                diesel::insert_into(users)
                    .values(&new_user)
                    .get_result::<User>(conn)
                    .await
                    .map_err(UserError::Database)
            },
            Err(e) => Err(e),
        }
    }

    /// All admin user ids, for broadcast notifications
    pub async fn admin_ids(conn: &mut AsyncPgConnection) -> Result<Vec<Uuid>, UserError> {
        use crate::schema::users::dsl::*;

        users
            .filter(role.eq(Role::Admin.as_str()))
            .select(id)
            .load::<Uuid>(conn)
            .await
            .map_err(UserError::Database)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [Role::Buyer, Role::Seller, Role::Agent, Role::Admin] {
            assert_eq!(Role::from_str(role.as_str()).unwrap(), role);
        }
    }

    #[test]
    fn test_role_parse_is_case_insensitive() {
        assert_eq!(Role::from_str("admin").unwrap(), Role::Admin);
        assert_eq!(Role::from_str("Buyer").unwrap(), Role::Buyer);
    }

    #[test]
    fn test_role_parse_rejects_unknown() {
        assert!(Role::from_str("SUPERUSER").is_err());
    }
}
