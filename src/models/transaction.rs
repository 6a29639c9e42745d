// Transaction lifecycle models
// The transaction row is the authoritative record of one buyer's progress
// toward one property; progress rows are an append-only stage log.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::schema::{transaction_progress, transactions};

/// Transaction status literals
pub const STATUS_INTERESTED: &str = "INTERESTED";
pub const STATUS_PRE_DEPOSIT: &str = "PRE_DEPOSIT";
pub const STATUS_CANCELLED: &str = "CANCELLED";

/// The six lifecycle stages. Stored upper-case; parsed case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Pending,
    MeetingScheduled,
    DepositPaid,
    FinalSigning,
    Completed,
    Cancelled,
}

impl Stage {
    pub const ALL: [Stage; 6] = [
        Stage::Pending,
        Stage::MeetingScheduled,
        Stage::DepositPaid,
        Stage::FinalSigning,
        Stage::Completed,
        Stage::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Pending => "PENDING",
            Stage::MeetingScheduled => "MEETING_SCHEDULED",
            Stage::DepositPaid => "DEPOSIT_PAID",
            Stage::FinalSigning => "FINAL_SIGNING",
            Stage::Completed => "COMPLETED",
            Stage::Cancelled => "CANCELLED",
        }
    }

    /// 400 body for an unrecognized stage literal
    pub fn invalid_stage_message() -> &'static str {
        "Invalid transaction stage. Must be one of: PENDING, MEETING_SCHEDULED, \
         DEPOSIT_PAID, FINAL_SIGNING, COMPLETED, CANCELLED"
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PENDING" => Ok(Stage::Pending),
            "MEETING_SCHEDULED" => Ok(Stage::MeetingScheduled),
            "DEPOSIT_PAID" => Ok(Stage::DepositPaid),
            "FINAL_SIGNING" => Ok(Stage::FinalSigning),
            "COMPLETED" => Ok(Stage::Completed),
            "CANCELLED" => Ok(Stage::Cancelled),
            _ => Err(()),
        }
    }
}

/// Stage to show in read endpoints. Every read path (buyer, seller, agent,
/// admin) goes through here so a cancelled-then-restored transaction renders
/// the same everywhere:
/// - `INTERESTED` with no progress, or with a trailing `CANCELLED` progress
///   row left behind by a cancellation, displays as `PENDING`.
/// - Otherwise the stored stage wins, falling back to the latest progress
///   row. An admin stage advance on an interest-only transaction therefore
///   stays visible.
pub fn effective_stage<'a>(
    status: &str,
    stored_stage: &'a str,
    latest_progress: Option<&'a str>,
) -> &'a str {
    let interest_reset = status == STATUS_INTERESTED
        && latest_progress.map_or(true, |p| p == Stage::Cancelled.as_str());
    if interest_reset {
        return Stage::Pending.as_str();
    }

    if !stored_stage.is_empty() {
        return stored_stage;
    }

    latest_progress.unwrap_or(Stage::Pending.as_str())
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = transactions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Transaction {
    pub id: Uuid,
    pub property_id: Uuid,
    pub buyer_id: Uuid,
    pub seller_id: Option<Uuid>,
    pub agent_id: Option<Uuid>,
    pub status: String,
    pub stage: String,
    pub interest_cancelled: bool,
    pub lead_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = transactions)]
pub struct NewTransaction {
    pub property_id: Uuid,
    pub buyer_id: Uuid,
    pub seller_id: Option<Uuid>,
    pub agent_id: Option<Uuid>,
    pub status: String,
    pub stage: String,
    pub interest_cancelled: bool,
    pub lead_id: Option<Uuid>,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = transaction_progress)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TransactionProgress {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub stage: String,
    pub notes: Option<String>,
    pub created_by_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = transaction_progress)]
pub struct NewTransactionProgress {
    pub transaction_id: Uuid,
    pub stage: String,
    pub notes: Option<String>,
    pub created_by_id: Uuid,
}

impl Transaction {
    pub async fn find_by_id(
        conn: &mut AsyncPgConnection,
        txn_id: Uuid,
    ) -> Result<Option<Self>, diesel::result::Error> {
        use crate::schema::transactions::dsl::*;

        transactions
            .filter(id.eq(txn_id))
            .first::<Transaction>(conn)
            .await
            .optional()
    }

    /// Most recent transaction for a buyer-property pair, cancelled or not.
    /// Restoration prefers this row over inserting a duplicate.
    pub async fn find_latest_for_pair(
        conn: &mut AsyncPgConnection,
        property: Uuid,
        buyer: Uuid,
    ) -> Result<Option<Self>, diesel::result::Error> {
        use crate::schema::transactions::dsl::*;

        transactions
            .filter(property_id.eq(property))
            .filter(buyer_id.eq(buyer))
            .order(created_at.desc())
            .first::<Transaction>(conn)
            .await
            .optional()
    }

    pub async fn find_active_for_pair(
        conn: &mut AsyncPgConnection,
        property: Uuid,
        buyer: Uuid,
    ) -> Result<Option<Self>, diesel::result::Error> {
        use crate::schema::transactions::dsl::*;

        transactions
            .filter(property_id.eq(property))
            .filter(buyer_id.eq(buyer))
            .filter(status.ne(STATUS_CANCELLED))
            .order(created_at.desc())
            .first::<Transaction>(conn)
            .await
            .optional()
    }

    pub async fn list(
        conn: &mut AsyncPgConnection,
        include_cancelled: bool,
    ) -> Result<Vec<Self>, diesel::result::Error> {
        use crate::schema::transactions::dsl::*;

        let query = transactions.order(created_at.desc()).into_boxed();
        let query = if include_cancelled {
            query
        } else {
            query.filter(status.ne(STATUS_CANCELLED))
        };

        query.load::<Transaction>(conn).await
    }

    pub async fn list_for_buyer(
        conn: &mut AsyncPgConnection,
        buyer: Uuid,
    ) -> Result<Vec<Self>, diesel::result::Error> {
        use crate::schema::transactions::dsl::*;

        transactions
            .filter(buyer_id.eq(buyer))
            .order(created_at.desc())
            .load::<Transaction>(conn)
            .await
    }

    pub async fn insert(
        conn: &mut AsyncPgConnection,
        record: &NewTransaction,
    ) -> Result<Self, diesel::result::Error> {
        diesel::insert_into(transactions::table)
            .values(record)
            .get_result::<Transaction>(conn)
            .await
    }

    /// Reopen a cancelled row: active status, stage back to PENDING, and
    /// fresh agent/lead back-references.
    pub async fn restore(
        conn: &mut AsyncPgConnection,
        txn_id: Uuid,
        agent: Option<Uuid>,
        lead: Uuid,
    ) -> Result<Self, diesel::result::Error> {
        use crate::schema::transactions::dsl::*;

        diesel::update(transactions.filter(id.eq(txn_id)))
            .set((
                status.eq(STATUS_INTERESTED),
                stage.eq(Stage::Pending.as_str()),
                interest_cancelled.eq(false),
                agent_id.eq(agent),
                lead_id.eq(lead),
                updated_at.eq(diesel::dsl::now),
            ))
            .get_result::<Transaction>(conn)
            .await
    }

    pub async fn cancel(
        conn: &mut AsyncPgConnection,
        txn_id: Uuid,
    ) -> Result<Self, diesel::result::Error> {
        use crate::schema::transactions::dsl::*;

        diesel::update(transactions.filter(id.eq(txn_id)))
            .set((
                status.eq(STATUS_CANCELLED),
                stage.eq(Stage::Cancelled.as_str()),
                interest_cancelled.eq(true),
                updated_at.eq(diesel::dsl::now),
            ))
            .get_result::<Transaction>(conn)
            .await
    }

    pub async fn set_stage(
        conn: &mut AsyncPgConnection,
        txn_id: Uuid,
        new_stage: Stage,
    ) -> Result<Self, diesel::result::Error> {
        use crate::schema::transactions::dsl::*;

        diesel::update(transactions.filter(id.eq(txn_id)))
            .set((
                stage.eq(new_stage.as_str()),
                updated_at.eq(diesel::dsl::now),
            ))
            .get_result::<Transaction>(conn)
            .await
    }

    pub async fn set_interest_cancelled(
        conn: &mut AsyncPgConnection,
        txn_id: Uuid,
        cancelled: bool,
    ) -> Result<Self, diesel::result::Error> {
        use crate::schema::transactions::dsl::*;

        diesel::update(transactions.filter(id.eq(txn_id)))
            .set((
                interest_cancelled.eq(cancelled),
                updated_at.eq(diesel::dsl::now),
            ))
            .get_result::<Transaction>(conn)
            .await
    }

    /// Latest progress row, if any
    pub async fn latest_progress(
        conn: &mut AsyncPgConnection,
        txn_id: Uuid,
    ) -> Result<Option<TransactionProgress>, diesel::result::Error> {
        use crate::schema::transaction_progress::dsl::*;

        transaction_progress
            .filter(transaction_id.eq(txn_id))
            .order(created_at.desc())
            .first::<TransactionProgress>(conn)
            .await
            .optional()
    }

    pub async fn progress_history(
        conn: &mut AsyncPgConnection,
        txn_id: Uuid,
    ) -> Result<Vec<TransactionProgress>, diesel::result::Error> {
        use crate::schema::transaction_progress::dsl::*;

        transaction_progress
            .filter(transaction_id.eq(txn_id))
            .order(created_at.desc())
            .load::<TransactionProgress>(conn)
            .await
    }

    pub async fn append_progress(
        conn: &mut AsyncPgConnection,
        record: &NewTransactionProgress,
    ) -> Result<TransactionProgress, diesel::result::Error> {
        diesel::insert_into(transaction_progress::table)
            .values(record)
            .get_result::<TransactionProgress>(conn)
            .await
    }

    /// Display stage for this row given its latest progress entry
    pub fn display_stage(&self, latest_progress: Option<&TransactionProgress>) -> String {
        effective_stage(
            &self.status,
            &self.stage,
            latest_progress.map(|p| p.stage.as_str()),
        )
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_round_trip() {
        for stage in Stage::ALL {
            assert_eq!(Stage::from_str(stage.as_str()).unwrap(), stage);
        }
    }

    #[test]
    fn test_stage_parse_is_case_insensitive() {
        assert_eq!(Stage::from_str("deposit_paid").unwrap(), Stage::DepositPaid);
        assert_eq!(
            Stage::from_str("Meeting_Scheduled").unwrap(),
            Stage::MeetingScheduled
        );
    }

    #[test]
    fn test_stage_parse_rejects_unknown() {
        assert!(Stage::from_str("FOO").is_err());
        assert!(Stage::from_str("").is_err());
    }

    #[test]
    fn test_invalid_stage_message_lists_all_stages() {
        let msg = Stage::invalid_stage_message();
        assert_eq!(
            msg,
            "Invalid transaction stage. Must be one of: PENDING, MEETING_SCHEDULED, \
             DEPOSIT_PAID, FINAL_SIGNING, COMPLETED, CANCELLED"
        );
        for stage in Stage::ALL {
            assert!(msg.contains(stage.as_str()));
        }
    }

    #[test]
    fn test_interested_with_cancelled_progress_displays_pending() {
        assert_eq!(
            effective_stage(STATUS_INTERESTED, "CANCELLED", Some("CANCELLED")),
            "PENDING"
        );
    }

    #[test]
    fn test_interested_without_progress_displays_pending() {
        assert_eq!(effective_stage(STATUS_INTERESTED, "PENDING", None), "PENDING");
    }

    #[test]
    fn test_interested_resets_only_after_cancellation() {
        // A trailing CANCELLED row or an empty history resets the display
        for stored in ["MEETING_SCHEDULED", "DEPOSIT_PAID", ""] {
            assert_eq!(
                effective_stage(STATUS_INTERESTED, stored, Some("CANCELLED")),
                "PENDING"
            );
            assert_eq!(effective_stage(STATUS_INTERESTED, stored, None), "PENDING");
        }
    }

    #[test]
    fn test_interested_keeps_an_advanced_stage_visible() {
        // An admin stage update does not touch status, so an interest-only
        // transaction can carry real progress; it must not render as PENDING
        assert_eq!(
            effective_stage(STATUS_INTERESTED, "DEPOSIT_PAID", Some("DEPOSIT_PAID")),
            "DEPOSIT_PAID"
        );
        assert_eq!(
            effective_stage(STATUS_INTERESTED, "", Some("MEETING_SCHEDULED")),
            "MEETING_SCHEDULED"
        );
    }

    #[test]
    fn test_progressed_status_uses_stored_stage() {
        assert_eq!(
            effective_stage(STATUS_PRE_DEPOSIT, "DEPOSIT_PAID", Some("MEETING_SCHEDULED")),
            "DEPOSIT_PAID"
        );
        assert_eq!(
            effective_stage(STATUS_CANCELLED, "CANCELLED", Some("FINAL_SIGNING")),
            "CANCELLED"
        );
    }

    #[test]
    fn test_empty_stored_stage_falls_back_to_progress() {
        assert_eq!(
            effective_stage(STATUS_PRE_DEPOSIT, "", Some("MEETING_SCHEDULED")),
            "MEETING_SCHEDULED"
        );
        assert_eq!(effective_stage(STATUS_PRE_DEPOSIT, "", None), "PENDING");
    }

    #[test]
    fn test_display_stage_matches_effective_stage() {
        let txn = Transaction {
            id: Uuid::new_v4(),
            property_id: Uuid::new_v4(),
            buyer_id: Uuid::new_v4(),
            seller_id: None,
            agent_id: None,
            status: STATUS_INTERESTED.to_string(),
            stage: "CANCELLED".to_string(),
            interest_cancelled: false,
            lead_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(txn.display_stage(None), "PENDING");
    }
}
