// Buyer-agent connection model
// A connection ties a buyer, an agent, and a property. Agent-initiated
// connections start PENDING behind a one-time code; self-serve connections
// are created CONFIRMED.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::Serialize;
use uuid::Uuid;

use crate::schema::buyer_agent_connections;

pub const CONNECTION_PENDING: &str = "PENDING";
pub const CONNECTION_CONFIRMED: &str = "CONFIRMED";

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = buyer_agent_connections)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct BuyerAgentConnection {
    pub id: Uuid,
    pub buyer_id: Uuid,
    pub agent_id: Uuid,
    pub property_id: Uuid,
    pub status: String,
    #[serde(skip_serializing)]
    pub otp_code: Option<String>,
    pub otp_expires: Option<DateTime<Utc>>,
    pub interest_cancelled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = buyer_agent_connections)]
pub struct NewBuyerAgentConnection {
    pub buyer_id: Uuid,
    pub agent_id: Uuid,
    pub property_id: Uuid,
    pub status: String,
    pub otp_code: Option<String>,
    pub otp_expires: Option<DateTime<Utc>>,
    pub interest_cancelled: bool,
}

impl BuyerAgentConnection {
    pub async fn find_by_id(
        conn: &mut AsyncPgConnection,
        connection_id: Uuid,
    ) -> Result<Option<Self>, diesel::result::Error> {
        use crate::schema::buyer_agent_connections::dsl::*;

        buyer_agent_connections
            .filter(id.eq(connection_id))
            .first::<BuyerAgentConnection>(conn)
            .await
            .optional()
    }

    /// Existing connection for the exact buyer-agent-property triple,
    /// used as the duplicate guard.
    pub async fn find_for_triple(
        conn: &mut AsyncPgConnection,
        buyer: Uuid,
        agent: Uuid,
        property: Uuid,
    ) -> Result<Option<Self>, diesel::result::Error> {
        use crate::schema::buyer_agent_connections::dsl::*;

        buyer_agent_connections
            .filter(buyer_id.eq(buyer))
            .filter(agent_id.eq(agent))
            .filter(property_id.eq(property))
            .first::<BuyerAgentConnection>(conn)
            .await
            .optional()
    }

    /// Any connection linking this user (as buyer or agent) to the property.
    /// Drives the unavailable-listing visibility check.
    pub async fn exists_for_user_and_property(
        conn: &mut AsyncPgConnection,
        user: Uuid,
        property: Uuid,
    ) -> Result<bool, diesel::result::Error> {
        use crate::schema::buyer_agent_connections::dsl::*;
        use diesel::dsl::count_star;

        let n: i64 = buyer_agent_connections
            .filter(property_id.eq(property))
            .filter(buyer_id.eq(user).or(agent_id.eq(user)))
            .select(count_star())
            .first(conn)
            .await?;

        Ok(n > 0)
    }

    pub async fn list_for_agent(
        conn: &mut AsyncPgConnection,
        agent: Uuid,
    ) -> Result<Vec<Self>, diesel::result::Error> {
        use crate::schema::buyer_agent_connections::dsl::*;

        buyer_agent_connections
            .filter(agent_id.eq(agent))
            .order(created_at.desc())
            .load::<BuyerAgentConnection>(conn)
            .await
    }

    pub async fn list_for_buyer(
        conn: &mut AsyncPgConnection,
        buyer: Uuid,
    ) -> Result<Vec<Self>, diesel::result::Error> {
        use crate::schema::buyer_agent_connections::dsl::*;

        buyer_agent_connections
            .filter(buyer_id.eq(buyer))
            .order(created_at.desc())
            .load::<BuyerAgentConnection>(conn)
            .await
    }

    pub async fn list_for_pair(
        conn: &mut AsyncPgConnection,
        buyer: Uuid,
        property: Uuid,
    ) -> Result<Vec<Self>, diesel::result::Error> {
        use crate::schema::buyer_agent_connections::dsl::*;

        buyer_agent_connections
            .filter(buyer_id.eq(buyer))
            .filter(property_id.eq(property))
            .load::<BuyerAgentConnection>(conn)
            .await
    }

    pub async fn insert(
        conn: &mut AsyncPgConnection,
        record: &NewBuyerAgentConnection,
    ) -> Result<Self, diesel::result::Error> {
        diesel::insert_into(buyer_agent_connections::table)
            .values(record)
            .get_result::<BuyerAgentConnection>(conn)
            .await
    }

    /// Transition to CONFIRMED and clear the one-time code so a second
    /// verification attempt cannot reuse it.
    pub async fn confirm(
        conn: &mut AsyncPgConnection,
        connection_id: Uuid,
    ) -> Result<Self, diesel::result::Error> {
        use crate::schema::buyer_agent_connections::dsl::*;

        diesel::update(buyer_agent_connections.filter(id.eq(connection_id)))
            .set((
                status.eq(CONNECTION_CONFIRMED),
                otp_code.eq(None::<String>),
                otp_expires.eq(None::<DateTime<Utc>>),
                updated_at.eq(diesel::dsl::now),
            ))
            .get_result::<BuyerAgentConnection>(conn)
            .await
    }

    /// Propagate the buyer's interest cancellation (or restoration) to every
    /// connection covering the pair.
    pub async fn set_interest_cancelled_for_pair(
        conn: &mut AsyncPgConnection,
        buyer: Uuid,
        property: Uuid,
        cancelled: bool,
    ) -> Result<usize, diesel::result::Error> {
        use crate::schema::buyer_agent_connections::dsl::*;

        diesel::update(
            buyer_agent_connections
                .filter(buyer_id.eq(buyer))
                .filter(property_id.eq(property)),
        )
        .set((
            interest_cancelled.eq(cancelled),
            updated_at.eq(diesel::dsl::now),
        ))
        .execute(conn)
        .await
    }

    pub async fn delete(
        conn: &mut AsyncPgConnection,
        connection_id: Uuid,
    ) -> Result<usize, diesel::result::Error> {
        use crate::schema::buyer_agent_connections::dsl::*;

        diesel::delete(buyer_agent_connections.filter(id.eq(connection_id)))
            .execute(conn)
            .await
    }
}
