// Viewing request model and appointment status machine

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::schema::viewing_requests;

/// Appointment statuses. `Pending` is a buyer's custom time proposal,
/// `PendingSellerApproval`/`Scheduled` cover booking against a published
/// availability slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewingStatus {
    Pending,
    PendingSellerApproval,
    Scheduled,
    Accepted,
    Rejected,
    Cancelled,
    Completed,
}

impl ViewingStatus {
    pub const ALL: [ViewingStatus; 7] = [
        ViewingStatus::Pending,
        ViewingStatus::PendingSellerApproval,
        ViewingStatus::Scheduled,
        ViewingStatus::Accepted,
        ViewingStatus::Rejected,
        ViewingStatus::Cancelled,
        ViewingStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewingStatus::Pending => "PENDING",
            ViewingStatus::PendingSellerApproval => "PENDING_SELLER_APPROVAL",
            ViewingStatus::Scheduled => "SCHEDULED",
            ViewingStatus::Accepted => "ACCEPTED",
            ViewingStatus::Rejected => "REJECTED",
            ViewingStatus::Cancelled => "CANCELLED",
            ViewingStatus::Completed => "COMPLETED",
        }
    }

    /// Whether `self -> target` is an allowed status change:
    /// a pending proposal is accepted or rejected, a slot booking awaiting
    /// the seller becomes scheduled, an accepted viewing completes, and any
    /// state can be cancelled.
    pub fn can_transition_to(&self, target: ViewingStatus) -> bool {
        if target == ViewingStatus::Cancelled {
            return true;
        }

        matches!(
            (self, target),
            (ViewingStatus::Pending, ViewingStatus::Accepted)
                | (ViewingStatus::Pending, ViewingStatus::Rejected)
                | (ViewingStatus::PendingSellerApproval, ViewingStatus::Scheduled)
                | (ViewingStatus::Accepted, ViewingStatus::Completed)
        )
    }

    pub fn invalid_status_message() -> String {
        let names: Vec<&str> = Self::ALL.iter().map(|s| s.as_str()).collect();
        format!("Invalid status. Must be one of: {}", names.join(", "))
    }
}

impl fmt::Display for ViewingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewingStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PENDING" => Ok(ViewingStatus::Pending),
            "PENDING_SELLER_APPROVAL" => Ok(ViewingStatus::PendingSellerApproval),
            "SCHEDULED" => Ok(ViewingStatus::Scheduled),
            "ACCEPTED" => Ok(ViewingStatus::Accepted),
            "REJECTED" => Ok(ViewingStatus::Rejected),
            "CANCELLED" => Ok(ViewingStatus::Cancelled),
            "COMPLETED" => Ok(ViewingStatus::Completed),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = viewing_requests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ViewingRequest {
    pub id: Uuid,
    pub property_id: Uuid,
    pub buyer_id: Uuid,
    pub agent_id: Option<Uuid>,
    pub date: NaiveDate,
    pub time: String,
    pub end_time: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = viewing_requests)]
pub struct NewViewingRequest {
    pub property_id: Uuid,
    pub buyer_id: Uuid,
    pub agent_id: Option<Uuid>,
    pub date: NaiveDate,
    pub time: String,
    pub end_time: String,
    pub status: String,
}

impl ViewingRequest {
    pub async fn find_by_id(
        conn: &mut AsyncPgConnection,
        request_id: Uuid,
    ) -> Result<Option<Self>, diesel::result::Error> {
        use crate::schema::viewing_requests::dsl::*;

        viewing_requests
            .filter(id.eq(request_id))
            .first::<ViewingRequest>(conn)
            .await
            .optional()
    }

    pub async fn list_for_buyer(
        conn: &mut AsyncPgConnection,
        buyer: Uuid,
    ) -> Result<Vec<Self>, diesel::result::Error> {
        use crate::schema::viewing_requests::dsl::*;

        viewing_requests
            .filter(buyer_id.eq(buyer))
            .order(date.desc())
            .load::<ViewingRequest>(conn)
            .await
    }

    pub async fn list_for_properties(
        conn: &mut AsyncPgConnection,
        props: &[Uuid],
    ) -> Result<Vec<Self>, diesel::result::Error> {
        use crate::schema::viewing_requests::dsl::*;

        viewing_requests
            .filter(property_id.eq_any(props))
            .order(date.desc())
            .load::<ViewingRequest>(conn)
            .await
    }

    pub async fn list_all(
        conn: &mut AsyncPgConnection,
    ) -> Result<Vec<Self>, diesel::result::Error> {
        use crate::schema::viewing_requests::dsl::*;

        viewing_requests
            .order(date.desc())
            .load::<ViewingRequest>(conn)
            .await
    }

    pub async fn insert(
        conn: &mut AsyncPgConnection,
        record: &NewViewingRequest,
    ) -> Result<Self, diesel::result::Error> {
        diesel::insert_into(viewing_requests::table)
            .values(record)
            .get_result::<ViewingRequest>(conn)
            .await
    }

    pub async fn set_status(
        conn: &mut AsyncPgConnection,
        request_id: Uuid,
        new_status: ViewingStatus,
    ) -> Result<Self, diesel::result::Error> {
        use crate::schema::viewing_requests::dsl::*;

        diesel::update(viewing_requests.filter(id.eq(request_id)))
            .set((
                status.eq(new_status.as_str()),
                updated_at.eq(diesel::dsl::now),
            ))
            .get_result::<ViewingRequest>(conn)
            .await
    }

    pub async fn delete(
        conn: &mut AsyncPgConnection,
        request_id: Uuid,
    ) -> Result<usize, diesel::result::Error> {
        use crate::schema::viewing_requests::dsl::*;

        diesel::delete(viewing_requests.filter(id.eq(request_id)))
            .execute(conn)
            .await
    }
}

/// Claim a published availability slot. The conditional update is the
/// double-booking guard: whoever flips `is_available` first wins, the loser
/// sees zero affected rows.
pub async fn book_availability_slot(
    conn: &mut AsyncPgConnection,
    slot_id: Uuid,
) -> Result<bool, diesel::result::Error> {
    use crate::schema::property_availability::dsl::*;

    let affected = diesel::update(
        property_availability
            .filter(id.eq(slot_id))
            .filter(is_available.eq(true)),
    )
    .set(is_available.eq(false))
    .execute(conn)
    .await?;

    Ok(affected == 1)
}

/// Release a slot when its viewing is rejected or cancelled
pub async fn release_availability_slot(
    conn: &mut AsyncPgConnection,
    slot_id: Uuid,
) -> Result<bool, diesel::result::Error> {
    use crate::schema::property_availability::dsl::*;

    let affected = diesel::update(
        property_availability
            .filter(id.eq(slot_id))
            .filter(is_available.eq(false)),
    )
    .set(is_available.eq(true))
    .execute(conn)
    .await?;

    Ok(affected == 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in ViewingStatus::ALL {
            assert_eq!(ViewingStatus::from_str(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn test_status_parse_is_case_insensitive() {
        assert_eq!(
            ViewingStatus::from_str("pending_seller_approval").unwrap(),
            ViewingStatus::PendingSellerApproval
        );
    }

    #[test]
    fn test_any_status_may_cancel() {
        for status in ViewingStatus::ALL {
            assert!(status.can_transition_to(ViewingStatus::Cancelled));
        }
    }

    #[test]
    fn test_pending_resolves_to_accept_or_reject() {
        assert!(ViewingStatus::Pending.can_transition_to(ViewingStatus::Accepted));
        assert!(ViewingStatus::Pending.can_transition_to(ViewingStatus::Rejected));
        assert!(!ViewingStatus::Pending.can_transition_to(ViewingStatus::Completed));
        assert!(!ViewingStatus::Pending.can_transition_to(ViewingStatus::Scheduled));
    }

    #[test]
    fn test_slot_booking_path() {
        assert!(
            ViewingStatus::PendingSellerApproval.can_transition_to(ViewingStatus::Scheduled)
        );
        assert!(
            !ViewingStatus::PendingSellerApproval.can_transition_to(ViewingStatus::Accepted)
        );
    }

    #[test]
    fn test_only_accepted_completes() {
        assert!(ViewingStatus::Accepted.can_transition_to(ViewingStatus::Completed));
        for status in ViewingStatus::ALL {
            if status != ViewingStatus::Accepted {
                assert!(!status.can_transition_to(ViewingStatus::Completed));
            }
        }
    }

    #[test]
    fn test_terminal_states_only_cancel() {
        for terminal in [
            ViewingStatus::Rejected,
            ViewingStatus::Completed,
            ViewingStatus::Cancelled,
        ] {
            for target in ViewingStatus::ALL {
                if target != ViewingStatus::Cancelled {
                    assert!(!terminal.can_transition_to(target));
                }
            }
        }
    }
}
