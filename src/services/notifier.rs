// Notification fan-out
// One row per affected party, created best-effort after the primary state
// change commits. A failed insert is logged and swallowed, never propagated.

use tracing::warn;
use uuid::Uuid;

use crate::db::DieselPool;
use crate::models::notification::{NewNotification, Notification};
use crate::models::user::User;

#[derive(Clone)]
pub struct Notifier {
    pool: DieselPool,
}

impl Notifier {
    pub fn new(pool: DieselPool) -> Self {
        Self { pool }
    }

    /// Create a single notification row. Best-effort.
    pub async fn notify(
        &self,
        user_id: Uuid,
        title: &str,
        message: &str,
        notification_type: &str,
        property_id: Option<Uuid>,
        metadata: Option<serde_json::Value>,
    ) {
        let record = NewNotification {
            user_id,
            title: title.to_string(),
            message: message.to_string(),
            notification_type: notification_type.to_string(),
            property_id,
            metadata,
        };

        if let Err(e) = self.insert(&record).await {
            warn!(
                user_id = %user_id,
                notification_type = %record.notification_type,
                "Failed to create notification: {}",
                e
            );
        }
    }

    /// One row per admin user
    pub async fn notify_admins(
        &self,
        title: &str,
        message: &str,
        notification_type: &str,
        property_id: Option<Uuid>,
        metadata: Option<serde_json::Value>,
    ) {
        let admin_ids = match self.pool.get().await {
            Ok(mut conn) => match User::admin_ids(&mut conn).await {
                Ok(ids) => ids,
                Err(e) => {
                    warn!("Failed to load admin ids for broadcast: {}", e);
                    return;
                },
            },
            Err(e) => {
                warn!("Failed to get connection for admin broadcast: {}", e);
                return;
            },
        };

        for admin_id in admin_ids {
            self.notify(
                admin_id,
                title,
                message,
                notification_type,
                property_id,
                metadata.clone(),
            )
            .await;
        }
    }

    async fn insert(&self, record: &NewNotification) -> Result<(), String> {
        let mut conn = self.pool.get().await.map_err(|e| e.to_string())?;
        Notification::insert(&mut conn, record)
            .await
            .map_err(|e| e.to_string())?;
        Ok(())
    }
}
