// Favorites and inquiries, the simple per-property engagement records

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::Serialize;
use uuid::Uuid;

use crate::schema::{favorites, inquiries};

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = favorites)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Favorite {
    pub id: Uuid,
    pub user_id: Uuid,
    pub property_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = favorites)]
pub struct NewFavorite {
    pub user_id: Uuid,
    pub property_id: Uuid,
}

impl Favorite {
    pub async fn exists(
        conn: &mut AsyncPgConnection,
        user: Uuid,
        property: Uuid,
    ) -> Result<bool, diesel::result::Error> {
        use crate::schema::favorites::dsl::*;
        use diesel::dsl::count_star;

        let n: i64 = favorites
            .filter(user_id.eq(user))
            .filter(property_id.eq(property))
            .select(count_star())
            .first(conn)
            .await?;

        Ok(n > 0)
    }

    pub async fn list_property_ids_for_user(
        conn: &mut AsyncPgConnection,
        user: Uuid,
    ) -> Result<Vec<Uuid>, diesel::result::Error> {
        use crate::schema::favorites::dsl::*;

        favorites
            .filter(user_id.eq(user))
            .order(created_at.desc())
            .select(property_id)
            .load::<Uuid>(conn)
            .await
    }

    /// Add or remove the favorite. Returns true when the property is now
    /// favorited.
    pub async fn toggle(
        conn: &mut AsyncPgConnection,
        user: Uuid,
        property: Uuid,
    ) -> Result<bool, diesel::result::Error> {
        use crate::schema::favorites::dsl::*;

        let removed = diesel::delete(
            favorites
                .filter(user_id.eq(user))
                .filter(property_id.eq(property)),
        )
        .execute(conn)
        .await?;

        if removed > 0 {
            return Ok(false);
        }

        diesel::insert_into(favorites)
            .values(&NewFavorite {
                user_id: user,
                property_id: property,
            })
            .execute(conn)
            .await?;

        Ok(true)
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = inquiries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Inquiry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub property_id: Uuid,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = inquiries)]
pub struct NewInquiry {
    pub user_id: Uuid,
    pub property_id: Uuid,
    pub message: String,
}

impl Inquiry {
    pub async fn insert(
        conn: &mut AsyncPgConnection,
        record: &NewInquiry,
    ) -> Result<Self, diesel::result::Error> {
        diesel::insert_into(inquiries::table)
            .values(record)
            .get_result::<Inquiry>(conn)
            .await
    }

    pub async fn list_for_property(
        conn: &mut AsyncPgConnection,
        property: Uuid,
    ) -> Result<Vec<Self>, diesel::result::Error> {
        use crate::schema::inquiries::dsl::*;

        inquiries
            .filter(property_id.eq(property))
            .order(created_at.desc())
            .load::<Inquiry>(conn)
            .await
    }
}
