// Property lead model
// A lead is a buyer's declared interest in a property. Cancellation is a
// soft flag; re-expressing interest restores the existing row.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::Serialize;
use uuid::Uuid;

use crate::schema::property_leads;

pub const LEAD_STATUS_PENDING: &str = "PENDING";
pub const LEAD_STATUS_CANCELLED: &str = "CANCELLED";

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = property_leads)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PropertyLead {
    pub id: Uuid,
    pub property_id: Uuid,
    pub buyer_id: Uuid,
    pub agent_id: Option<Uuid>,
    pub status: String,
    pub interest_cancelled: bool,
    pub transaction_id: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = property_leads)]
pub struct NewPropertyLead {
    pub property_id: Uuid,
    pub buyer_id: Uuid,
    pub agent_id: Option<Uuid>,
    pub status: String,
    pub interest_cancelled: bool,
    pub notes: Option<String>,
}

impl PropertyLead {
    pub async fn find_by_id(
        conn: &mut AsyncPgConnection,
        lead_id: Uuid,
    ) -> Result<Option<Self>, diesel::result::Error> {
        use crate::schema::property_leads::dsl::*;

        property_leads
            .filter(id.eq(lead_id))
            .first::<PropertyLead>(conn)
            .await
            .optional()
    }

    /// Active (non-cancelled) lead for a buyer-property pair. The partial
    /// unique index guarantees at most one exists.
    pub async fn find_active_for_pair(
        conn: &mut AsyncPgConnection,
        property: Uuid,
        buyer: Uuid,
    ) -> Result<Option<Self>, diesel::result::Error> {
        use crate::schema::property_leads::dsl::*;

        property_leads
            .filter(property_id.eq(property))
            .filter(buyer_id.eq(buyer))
            .filter(interest_cancelled.eq(false))
            .first::<PropertyLead>(conn)
            .await
            .optional()
    }

    /// Most recent lead for a pair regardless of cancellation state, used by
    /// the restore path.
    pub async fn find_latest_for_pair(
        conn: &mut AsyncPgConnection,
        property: Uuid,
        buyer: Uuid,
    ) -> Result<Option<Self>, diesel::result::Error> {
        use crate::schema::property_leads::dsl::*;

        property_leads
            .filter(property_id.eq(property))
            .filter(buyer_id.eq(buyer))
            .order(created_at.desc())
            .first::<PropertyLead>(conn)
            .await
            .optional()
    }

    pub async fn list_active_for_buyer(
        conn: &mut AsyncPgConnection,
        buyer: Uuid,
    ) -> Result<Vec<Self>, diesel::result::Error> {
        use crate::schema::property_leads::dsl::*;

        property_leads
            .filter(buyer_id.eq(buyer))
            .filter(interest_cancelled.eq(false))
            .order(created_at.desc())
            .load::<PropertyLead>(conn)
            .await
    }

    pub async fn list_for_properties(
        conn: &mut AsyncPgConnection,
        props: &[Uuid],
    ) -> Result<Vec<Self>, diesel::result::Error> {
        use crate::schema::property_leads::dsl::*;

        property_leads
            .filter(property_id.eq_any(props))
            .filter(interest_cancelled.eq(false))
            .order(created_at.desc())
            .load::<PropertyLead>(conn)
            .await
    }

    /// Leads that never produced a transaction, for the admin overview
    pub async fn list_unlinked(
        conn: &mut AsyncPgConnection,
        include_cancelled: bool,
    ) -> Result<Vec<Self>, diesel::result::Error> {
        use crate::schema::property_leads::dsl::*;

        let mut query = property_leads
            .filter(transaction_id.is_null())
            .into_boxed();

        if !include_cancelled {
            query = query.filter(interest_cancelled.eq(false));
        }

        query
            .order(created_at.desc())
            .load::<PropertyLead>(conn)
            .await
    }

    pub async fn insert(
        conn: &mut AsyncPgConnection,
        record: &NewPropertyLead,
    ) -> Result<Self, diesel::result::Error> {
        diesel::insert_into(property_leads::table)
            .values(record)
            .get_result::<PropertyLead>(conn)
            .await
    }

    /// Flip a cancelled lead back to an active pending one
    pub async fn restore(
        conn: &mut AsyncPgConnection,
        lead_id: Uuid,
    ) -> Result<Self, diesel::result::Error> {
        use crate::schema::property_leads::dsl::*;

        diesel::update(property_leads.filter(id.eq(lead_id)))
            .set((
                interest_cancelled.eq(false),
                status.eq(LEAD_STATUS_PENDING),
                updated_at.eq(diesel::dsl::now),
            ))
            .get_result::<PropertyLead>(conn)
            .await
    }

    pub async fn cancel(
        conn: &mut AsyncPgConnection,
        lead_id: Uuid,
    ) -> Result<Self, diesel::result::Error> {
        use crate::schema::property_leads::dsl::*;

        diesel::update(property_leads.filter(id.eq(lead_id)))
            .set((
                interest_cancelled.eq(true),
                status.eq(LEAD_STATUS_CANCELLED),
                updated_at.eq(diesel::dsl::now),
            ))
            .get_result::<PropertyLead>(conn)
            .await
    }

    pub async fn link_transaction(
        conn: &mut AsyncPgConnection,
        lead_id: Uuid,
        txn_id: Uuid,
    ) -> Result<Self, diesel::result::Error> {
        use crate::schema::property_leads::dsl::*;

        diesel::update(property_leads.filter(id.eq(lead_id)))
            .set((transaction_id.eq(txn_id), updated_at.eq(diesel::dsl::now)))
            .get_result::<PropertyLead>(conn)
            .await
    }
}
