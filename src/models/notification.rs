// Notification models
// User-facing notification rows plus the per-transaction audit messages
// written when a buyer cancels or restores an interest.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::Serialize;
use uuid::Uuid;

use crate::schema::{notifications, transaction_notifications};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub notification_type: String,
    pub property_id: Option<Uuid>,
    pub metadata: Option<serde_json::Value>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = notifications)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    pub notification_type: String,
    pub property_id: Option<Uuid>,
    pub metadata: Option<serde_json::Value>,
}

impl Notification {
    pub async fn insert(
        conn: &mut AsyncPgConnection,
        record: &NewNotification,
    ) -> Result<Self, diesel::result::Error> {
        diesel::insert_into(notifications::table)
            .values(record)
            .get_result::<Notification>(conn)
            .await
    }

    pub async fn list_for_user(
        conn: &mut AsyncPgConnection,
        user: Uuid,
    ) -> Result<Vec<Self>, diesel::result::Error> {
        use crate::schema::notifications::dsl::*;

        notifications
            .filter(user_id.eq(user))
            .order(created_at.desc())
            .load::<Notification>(conn)
            .await
    }

    /// Mark the given ids read, scoped to the recipient. Returns the number
    /// of rows actually updated.
    pub async fn mark_read(
        conn: &mut AsyncPgConnection,
        user: Uuid,
        ids: &[Uuid],
    ) -> Result<usize, diesel::result::Error> {
        use crate::schema::notifications::dsl::*;

        diesel::update(
            notifications
                .filter(user_id.eq(user))
                .filter(id.eq_any(ids)),
        )
        .set(is_read.eq(true))
        .execute(conn)
        .await
    }

    pub async fn mark_all_read(
        conn: &mut AsyncPgConnection,
        user: Uuid,
    ) -> Result<usize, diesel::result::Error> {
        use crate::schema::notifications::dsl::*;

        diesel::update(notifications.filter(user_id.eq(user)))
            .set(is_read.eq(true))
            .execute(conn)
            .await
    }

    /// Delete only if owned by the recipient
    pub async fn delete_for_user(
        conn: &mut AsyncPgConnection,
        user: Uuid,
        notification_id: Uuid,
    ) -> Result<usize, diesel::result::Error> {
        use crate::schema::notifications::dsl::*;

        diesel::delete(
            notifications
                .filter(id.eq(notification_id))
                .filter(user_id.eq(user)),
        )
        .execute(conn)
        .await
    }
}

/// Audit message attached to a transaction (cancel/restore trail)
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = transaction_notifications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TransactionNotification {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub kind: String,
    pub message: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = transaction_notifications)]
pub struct NewTransactionNotification {
    pub transaction_id: Uuid,
    pub kind: String,
    pub message: String,
    pub status: String,
}

impl TransactionNotification {
    pub async fn insert(
        conn: &mut AsyncPgConnection,
        record: &NewTransactionNotification,
    ) -> Result<Self, diesel::result::Error> {
        diesel::insert_into(transaction_notifications::table)
            .values(record)
            .get_result::<TransactionNotification>(conn)
            .await
    }

    pub async fn list_for_transaction(
        conn: &mut AsyncPgConnection,
        txn_id: Uuid,
    ) -> Result<Vec<Self>, diesel::result::Error> {
        use crate::schema::transaction_notifications::dsl::*;

        transaction_notifications
            .filter(transaction_id.eq(txn_id))
            .order(created_at.desc())
            .load::<TransactionNotification>(conn)
            .await
    }
}
