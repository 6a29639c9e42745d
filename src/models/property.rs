// Property catalog models and the listing visibility rule

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::schema::{properties, property_availability, property_stats};

/// Listing status literals. Lower-case values are kept as-is because the
/// frontend filters on them verbatim.
pub const STATUS_PENDING: &str = "pending";
pub const STATUS_APPROVED: &str = "approved";
pub const STATUS_REJECTED: &str = "rejected";
pub const STATUS_UNAVAILABLE: &str = "unavailable";
pub const STATUS_INFO_REQUESTED: &str = "info_requested";

/// Property model representing a database record
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize)]
#[diesel(table_name = properties)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Property {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub short_description: Option<String>,
    pub full_description: Option<String>,
    pub price: i64,
    pub property_type: String,
    pub street: Option<String>,
    pub street_number: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub area: Option<i32>,
    pub status: String,
    pub is_verified: bool,
    pub removal_requested: bool,
    pub images: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = properties)]
pub struct NewProperty {
    pub user_id: Uuid,
    pub title: String,
    pub short_description: Option<String>,
    pub full_description: Option<String>,
    pub price: i64,
    pub property_type: String,
    pub street: Option<String>,
    pub street_number: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub area: Option<i32>,
    pub status: String,
    pub images: serde_json::Value,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = properties)]
pub struct UpdateProperty {
    pub title: Option<String>,
    pub short_description: Option<Option<String>>,
    pub full_description: Option<Option<String>>,
    pub price: Option<i64>,
    pub property_type: Option<String>,
    pub street: Option<Option<String>>,
    pub street_number: Option<Option<String>>,
    pub city: Option<Option<String>>,
    pub state: Option<Option<String>>,
    pub bedrooms: Option<Option<i32>>,
    pub bathrooms: Option<Option<i32>>,
    pub area: Option<Option<i32>>,
    pub status: Option<String>,
    pub is_verified: Option<bool>,
    pub removal_requested: Option<bool>,
    pub images: Option<serde_json::Value>,
    pub updated_at: DateTime<Utc>,
}

/// Per-property engagement counters
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = property_stats)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PropertyStats {
    pub id: Uuid,
    pub property_id: Uuid,
    pub views: i32,
    pub interested_count: i32,
    pub viewing_count: i32,
    pub last_viewed: Option<DateTime<Utc>>,
}

/// Seller-published viewing slot
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = property_availability)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PropertyAvailability {
    pub id: Uuid,
    pub property_id: Uuid,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub is_available: bool,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = property_availability)]
pub struct NewPropertyAvailability {
    pub property_id: Uuid,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub is_available: bool,
}

impl Property {
    pub async fn find_by_id(
        conn: &mut AsyncPgConnection,
        prop_id: Uuid,
    ) -> Result<Option<Self>, diesel::result::Error> {
        use crate::schema::properties::dsl::*;

        properties
            .filter(id.eq(prop_id))
            .first::<Property>(conn)
            .await
            .optional()
    }

    /// Catalog listing. Unavailable rows are excluded up front; a requester's
    /// own unavailable listings are merged back in by the handler.
    pub async fn list_visible(
        conn: &mut AsyncPgConnection,
    ) -> Result<Vec<Self>, diesel::result::Error> {
        use crate::schema::properties::dsl::*;

        properties
            .filter(status.ne(STATUS_UNAVAILABLE))
            .order(created_at.desc())
            .load::<Property>(conn)
            .await
    }

    pub async fn list_for_owner(
        conn: &mut AsyncPgConnection,
        owner: Uuid,
    ) -> Result<Vec<Self>, diesel::result::Error> {
        use crate::schema::properties::dsl::*;

        properties
            .filter(user_id.eq(owner))
            .order(created_at.desc())
            .load::<Property>(conn)
            .await
    }

    pub async fn list_by_ids(
        conn: &mut AsyncPgConnection,
        ids: &[Uuid],
    ) -> Result<Vec<Self>, diesel::result::Error> {
        use crate::schema::properties::dsl::*;

        properties
            .filter(id.eq_any(ids))
            .load::<Property>(conn)
            .await
    }

    pub async fn insert(
        conn: &mut AsyncPgConnection,
        record: &NewProperty,
    ) -> Result<Self, diesel::result::Error> {
        diesel::insert_into(properties::table)
            .values(record)
            .get_result::<Property>(conn)
            .await
    }

    pub async fn update(
        conn: &mut AsyncPgConnection,
        prop_id: Uuid,
        changes: &UpdateProperty,
    ) -> Result<Self, diesel::result::Error> {
        use crate::schema::properties::dsl::*;

        diesel::update(properties.filter(id.eq(prop_id)))
            .set(changes)
            .get_result::<Property>(conn)
            .await
    }

    pub async fn delete(
        conn: &mut AsyncPgConnection,
        prop_id: Uuid,
    ) -> Result<usize, diesel::result::Error> {
        use crate::schema::properties::dsl::*;

        diesel::delete(properties.filter(id.eq(prop_id)))
            .execute(conn)
            .await
    }

    pub async fn set_removal_requested(
        conn: &mut AsyncPgConnection,
        prop_id: Uuid,
    ) -> Result<Self, diesel::result::Error> {
        use crate::schema::properties::dsl::*;

        diesel::update(properties.filter(id.eq(prop_id)))
            .set((
                removal_requested.eq(true),
                updated_at.eq(diesel::dsl::now),
            ))
            .get_result::<Property>(conn)
            .await
    }
}

impl PropertyStats {
    pub async fn find_for_property(
        conn: &mut AsyncPgConnection,
        prop_id: Uuid,
    ) -> Result<Option<Self>, diesel::result::Error> {
        use crate::schema::property_stats::dsl::*;

        property_stats
            .filter(property_id.eq(prop_id))
            .first::<PropertyStats>(conn)
            .await
            .optional()
    }

    /// Upsert-style view bump: insert a fresh counter row on first view,
    /// increment afterwards.
    pub async fn record_view(
        conn: &mut AsyncPgConnection,
        prop_id: Uuid,
    ) -> Result<(), diesel::result::Error> {
        use crate::schema::property_stats::dsl::*;

        diesel::insert_into(property_stats)
            .values((property_id.eq(prop_id), views.eq(1), last_viewed.eq(diesel::dsl::now)))
            .on_conflict(property_id)
            .do_update()
            .set((views.eq(views + 1), last_viewed.eq(diesel::dsl::now)))
            .execute(conn)
            .await?;

        Ok(())
    }

    pub async fn adjust_interested(
        conn: &mut AsyncPgConnection,
        prop_id: Uuid,
        delta: i32,
    ) -> Result<(), diesel::result::Error> {
        use crate::schema::property_stats::dsl::*;

        diesel::insert_into(property_stats)
            .values((property_id.eq(prop_id), interested_count.eq(delta.max(0))))
            .on_conflict(property_id)
            .do_update()
            .set(interested_count.eq(interested_count + delta))
            .execute(conn)
            .await?;

        Ok(())
    }

    pub async fn increment_viewings(
        conn: &mut AsyncPgConnection,
        prop_id: Uuid,
    ) -> Result<(), diesel::result::Error> {
        use crate::schema::property_stats::dsl::*;

        diesel::insert_into(property_stats)
            .values((property_id.eq(prop_id), viewing_count.eq(1)))
            .on_conflict(property_id)
            .do_update()
            .set(viewing_count.eq(viewing_count + 1))
            .execute(conn)
            .await?;

        Ok(())
    }
}

impl PropertyAvailability {
    pub async fn find_by_id(
        conn: &mut AsyncPgConnection,
        slot_id: Uuid,
    ) -> Result<Option<Self>, diesel::result::Error> {
        use crate::schema::property_availability::dsl::*;

        property_availability
            .filter(id.eq(slot_id))
            .first::<PropertyAvailability>(conn)
            .await
            .optional()
    }

    pub async fn list_for_property(
        conn: &mut AsyncPgConnection,
        prop_id: Uuid,
    ) -> Result<Vec<Self>, diesel::result::Error> {
        use crate::schema::property_availability::dsl::*;

        property_availability
            .filter(property_id.eq(prop_id))
            .order((date.asc(), start_time.asc()))
            .load::<PropertyAvailability>(conn)
            .await
    }

    pub async fn insert(
        conn: &mut AsyncPgConnection,
        record: &NewPropertyAvailability,
    ) -> Result<Self, diesel::result::Error> {
        diesel::insert_into(property_availability::table)
            .values(record)
            .get_result::<PropertyAvailability>(conn)
            .await
    }

    pub async fn delete_for_property(
        conn: &mut AsyncPgConnection,
        slot_id: Uuid,
        prop_id: Uuid,
    ) -> Result<usize, diesel::result::Error> {
        use crate::schema::property_availability::dsl::*;

        diesel::delete(
            property_availability
                .filter(id.eq(slot_id))
                .filter(property_id.eq(prop_id)),
        )
        .execute(conn)
        .await
    }
}

// =============================================================================
// REQUEST DTOs
// =============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePropertyRequest {
    #[validate(length(min = 1, max = 255, message = "Title is required"))]
    pub title: String,

    pub short_description: Option<String>,
    pub full_description: Option<String>,

    #[validate(range(min = 0, message = "Price must be non-negative"))]
    pub price: i64,

    #[validate(length(min = 1, max = 50, message = "Property type is required"))]
    pub property_type: String,

    pub street: Option<String>,
    pub street_number: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub area: Option<i32>,

    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePropertyRequest {
    pub title: Option<String>,
    pub short_description: Option<String>,
    pub full_description: Option<String>,
    pub price: Option<i64>,
    pub property_type: Option<String>,
    pub street: Option<String>,
    pub street_number: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<i32>,
    pub area: Option<i32>,
    pub status: Option<String>,
    pub images: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilitySlotRequest {
    pub date: NaiveDate,

    #[validate(length(min = 1, max = 10))]
    pub start_time: String,

    #[validate(length(min = 1, max = 10))]
    pub end_time: String,
}

// =============================================================================
// VISIBILITY RULE
// =============================================================================

/// What the requester is to a given property, resolved from the database
/// before the rule is applied.
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewerRelation {
    pub is_owner: bool,
    pub is_admin: bool,
    pub has_favorite: bool,
    pub is_connected_agent: bool,
    pub is_connected_buyer: bool,
}

impl ViewerRelation {
    fn is_privileged(&self) -> bool {
        self.is_owner
            || self.is_admin
            || self.has_favorite
            || self.is_connected_agent
            || self.is_connected_buyer
    }
}

/// Whether a property may be shown to the requester. Unavailable listings are
/// hidden unless the viewer is the owner, an admin, a favoriter, or either
/// side of a buyer-agent connection to the property. The deny case renders as
/// 404, never 403, so unauthenticated callers cannot confirm existence.
pub fn can_view_property(status: &str, viewer: Option<ViewerRelation>) -> bool {
    if status != STATUS_UNAVAILABLE {
        return true;
    }

    match viewer {
        Some(relation) => relation.is_privileged(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_unavailable_is_public() {
        for status in [STATUS_PENDING, STATUS_APPROVED, STATUS_REJECTED, STATUS_INFO_REQUESTED] {
            assert!(can_view_property(status, None));
            assert!(can_view_property(status, Some(ViewerRelation::default())));
        }
    }

    #[test]
    fn test_unavailable_hidden_from_anonymous() {
        assert!(!can_view_property(STATUS_UNAVAILABLE, None));
    }

    #[test]
    fn test_unavailable_hidden_from_unrelated_user() {
        assert!(!can_view_property(
            STATUS_UNAVAILABLE,
            Some(ViewerRelation::default())
        ));
    }

    #[test]
    fn test_unavailable_visible_to_privileged_viewers() {
        let cases = [
            ViewerRelation { is_owner: true, ..Default::default() },
            ViewerRelation { is_admin: true, ..Default::default() },
            ViewerRelation { has_favorite: true, ..Default::default() },
            ViewerRelation { is_connected_agent: true, ..Default::default() },
            ViewerRelation { is_connected_buyer: true, ..Default::default() },
        ];

        for relation in cases {
            assert!(can_view_property(STATUS_UNAVAILABLE, Some(relation)));
        }
    }
}
