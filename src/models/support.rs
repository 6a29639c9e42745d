// Support ticketing models

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::schema::{support_messages, support_tickets};

pub const TICKET_OPEN: &str = "OPEN";
pub const TICKET_IN_PROGRESS: &str = "IN_PROGRESS";
pub const TICKET_CLOSED: &str = "CLOSED";

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = support_tickets)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SupportTicket {
    pub id: Uuid,
    pub user_id: Uuid,
    pub created_by_id: Uuid,
    pub subject: String,
    pub category: String,
    pub priority: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = support_tickets)]
pub struct NewSupportTicket {
    pub user_id: Uuid,
    pub created_by_id: Uuid,
    pub subject: String,
    pub category: String,
    pub priority: String,
    pub status: String,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = support_messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SupportMessage {
    pub id: Uuid,
    pub ticket_id: Uuid,
    pub sender_id: Uuid,
    pub body: String,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = support_messages)]
pub struct NewSupportMessage {
    pub ticket_id: Uuid,
    pub sender_id: Uuid,
    pub body: String,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketRequest {
    #[validate(length(min = 1, max = 255, message = "Subject is required"))]
    pub subject: String,

    #[validate(length(min = 1, max = 50, message = "Category is required"))]
    pub category: String,

    pub priority: Option<String>,

    /// Admins may open a ticket on another user's behalf
    pub user_id: Option<Uuid>,

    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMessageRequest {
    pub ticket_id: Uuid,

    #[validate(length(min = 1, message = "Message body is required"))]
    pub body: String,

    pub metadata: Option<serde_json::Value>,
}

impl SupportTicket {
    pub async fn find_by_id(
        conn: &mut AsyncPgConnection,
        ticket_id: Uuid,
    ) -> Result<Option<Self>, diesel::result::Error> {
        use crate::schema::support_tickets::dsl::*;

        support_tickets
            .filter(id.eq(ticket_id))
            .first::<SupportTicket>(conn)
            .await
            .optional()
    }

    pub async fn list_for_user(
        conn: &mut AsyncPgConnection,
        user: Uuid,
    ) -> Result<Vec<Self>, diesel::result::Error> {
        use crate::schema::support_tickets::dsl::*;

        support_tickets
            .filter(user_id.eq(user))
            .order(created_at.desc())
            .load::<SupportTicket>(conn)
            .await
    }

    pub async fn list_all(
        conn: &mut AsyncPgConnection,
    ) -> Result<Vec<Self>, diesel::result::Error> {
        use crate::schema::support_tickets::dsl::*;

        support_tickets
            .order(created_at.desc())
            .load::<SupportTicket>(conn)
            .await
    }

    pub async fn insert(
        conn: &mut AsyncPgConnection,
        record: &NewSupportTicket,
    ) -> Result<Self, diesel::result::Error> {
        diesel::insert_into(support_tickets::table)
            .values(record)
            .get_result::<SupportTicket>(conn)
            .await
    }

    pub async fn set_status(
        conn: &mut AsyncPgConnection,
        ticket_id: Uuid,
        new_status: &str,
    ) -> Result<Self, diesel::result::Error> {
        use crate::schema::support_tickets::dsl::*;

        diesel::update(support_tickets.filter(id.eq(ticket_id)))
            .set((status.eq(new_status), updated_at.eq(diesel::dsl::now)))
            .get_result::<SupportTicket>(conn)
            .await
    }
}

impl SupportMessage {
    pub async fn insert(
        conn: &mut AsyncPgConnection,
        record: &NewSupportMessage,
    ) -> Result<Self, diesel::result::Error> {
        diesel::insert_into(support_messages::table)
            .values(record)
            .get_result::<SupportMessage>(conn)
            .await
    }

    pub async fn list_for_ticket(
        conn: &mut AsyncPgConnection,
        ticket: Uuid,
    ) -> Result<Vec<Self>, diesel::result::Error> {
        use crate::schema::support_messages::dsl::*;

        support_messages
            .filter(ticket_id.eq(ticket))
            .order(created_at.asc())
            .load::<SupportMessage>(conn)
            .await
    }
}
