//! Postgres implementations of the store traits.
//!
//! Every query runs through [`bounded`], so a stalled connection surfaces as
//! `StoreError::Timeout` rather than a hung request.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::time::Duration;

use super::timeout::bounded;
use super::{
    BaseCategoryStore, BaseDishStore, BaseMemberStore, BasePermissionStore, BaseTokenStore,
    StoreError,
};
use crate::common::auth::Permissions;
use crate::common::filters::{Filters, Page};
use crate::common::{CategoryId, DishId, MemberId};
use crate::domains::auth::{TokenRecord, TokenScope};
use crate::domains::category::{Category, NewCategory};
use crate::domains::dish::{Dish, DishFilter, NewDish};
use crate::domains::member::{Member, NewMember};

#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
    timeout: Duration,
}

impl PostgresStore {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }
}

// =============================================================================
// Members
// =============================================================================

#[async_trait]
impl BaseMemberStore for PostgresStore {
    async fn insert(&self, member: NewMember) -> Result<Member, StoreError> {
        bounded(
            "members.insert",
            self.timeout,
            sqlx::query_as::<_, Member>(
                r#"
                INSERT INTO members (name, email, password_hash, activated)
                VALUES ($1, $2, $3, $4)
                RETURNING id, created_at, name, email, password_hash, activated, version
                "#,
            )
            .bind(&member.name)
            .bind(&member.email)
            .bind(&member.password_hash)
            .bind(member.activated)
            .fetch_one(&self.pool),
        )
        .await
    }

    async fn find_by_email(&self, email: &str) -> Result<Member, StoreError> {
        bounded(
            "members.find_by_email",
            self.timeout,
            sqlx::query_as::<_, Member>(
                r#"
                SELECT id, created_at, name, email, password_hash, activated, version
                FROM members
                WHERE email = $1
                "#,
            )
            .bind(email)
            .fetch_one(&self.pool),
        )
        .await
    }

    async fn find_for_token(
        &self,
        scope: TokenScope,
        token_hash: &[u8],
        now: DateTime<Utc>,
    ) -> Result<Member, StoreError> {
        bounded(
            "members.find_for_token",
            self.timeout,
            sqlx::query_as::<_, Member>(
                r#"
                SELECT m.id, m.created_at, m.name, m.email, m.password_hash, m.activated, m.version
                FROM members m
                INNER JOIN tokens t ON t.member_id = m.id
                WHERE t.hash = $1
                  AND t.scope = $2
                  AND t.expiry > $3
                "#,
            )
            .bind(token_hash)
            .bind(scope.as_str())
            .bind(now)
            .fetch_one(&self.pool),
        )
        .await
    }

    async fn update(&self, member: &mut Member) -> Result<(), StoreError> {
        let new_version = bounded(
            "members.update",
            self.timeout,
            sqlx::query_scalar::<_, i32>(
                r#"
                UPDATE members
                SET name = $1, email = $2, password_hash = $3, activated = $4, version = version + 1
                WHERE id = $5 AND version = $6
                RETURNING version
                "#,
            )
            .bind(&member.name)
            .bind(&member.email)
            .bind(&member.password_hash)
            .bind(member.activated)
            .bind(member.id)
            .bind(member.version)
            .fetch_optional(&self.pool),
        )
        .await?;

        match new_version {
            Some(version) => {
                member.version = version;
                Ok(())
            }
            None => Err(StoreError::EditConflict),
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        bounded(
            "ping",
            self.timeout,
            sqlx::query("SELECT 1").execute(&self.pool),
        )
        .await
        .map(|_| ())
    }
}

// =============================================================================
// Tokens
// =============================================================================

#[async_trait]
impl BaseTokenStore for PostgresStore {
    async fn insert(&self, token: &TokenRecord) -> Result<(), StoreError> {
        bounded(
            "tokens.insert",
            self.timeout,
            sqlx::query(
                r#"
                INSERT INTO tokens (hash, member_id, expiry, scope)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(&token.hash)
            .bind(token.member_id)
            .bind(token.expiry)
            .bind(token.scope.as_str())
            .execute(&self.pool),
        )
        .await
        .map(|_| ())
    }

    async fn delete_all_for_member(
        &self,
        scope: TokenScope,
        member_id: MemberId,
    ) -> Result<u64, StoreError> {
        let result = bounded(
            "tokens.delete_all_for_member",
            self.timeout,
            sqlx::query("DELETE FROM tokens WHERE scope = $1 AND member_id = $2")
                .bind(scope.as_str())
                .bind(member_id)
                .execute(&self.pool),
        )
        .await?;
        Ok(result.rows_affected())
    }
}

// =============================================================================
// Permissions
// =============================================================================

#[async_trait]
impl BasePermissionStore for PostgresStore {
    async fn all_for_member(&self, member_id: MemberId) -> Result<Permissions, StoreError> {
        let codes = bounded(
            "permissions.all_for_member",
            self.timeout,
            sqlx::query_scalar::<_, String>(
                r#"
                SELECT p.code
                FROM permissions p
                INNER JOIN members_permissions mp ON mp.permission_id = p.id
                WHERE mp.member_id = $1
                ORDER BY p.code
                "#,
            )
            .bind(member_id)
            .fetch_all(&self.pool),
        )
        .await?;
        Ok(Permissions::new(codes))
    }

    async fn add_for_member(&self, member_id: MemberId, codes: &[&str]) -> Result<(), StoreError> {
        bounded(
            "permissions.add_for_member",
            self.timeout,
            sqlx::query(
                r#"
                INSERT INTO members_permissions (member_id, permission_id)
                SELECT $1, p.id FROM permissions p WHERE p.code = ANY($2)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(member_id)
            .bind(codes)
            .execute(&self.pool),
        )
        .await
        .map(|_| ())
    }
}

// =============================================================================
// Categories
// =============================================================================

#[derive(sqlx::FromRow)]
struct CategoryPageRow {
    total_records: i64,
    #[sqlx(flatten)]
    category: Category,
}

#[async_trait]
impl BaseCategoryStore for PostgresStore {
    async fn insert(&self, category: NewCategory) -> Result<Category, StoreError> {
        bounded(
            "categories.insert",
            self.timeout,
            sqlx::query_as::<_, Category>(
                r#"
                INSERT INTO categories (name, description)
                VALUES ($1, $2)
                RETURNING id, created_at, updated_at, name, description
                "#,
            )
            .bind(&category.name)
            .bind(&category.description)
            .fetch_one(&self.pool),
        )
        .await
    }

    async fn find(&self, id: CategoryId) -> Result<Category, StoreError> {
        bounded(
            "categories.find",
            self.timeout,
            sqlx::query_as::<_, Category>(
                r#"
                SELECT id, created_at, updated_at, name, description
                FROM categories
                WHERE id = $1
                "#,
            )
            .bind(id)
            .fetch_one(&self.pool),
        )
        .await
    }

    async fn list(&self, name: &str, filters: &Filters) -> Result<Page<Category>, StoreError> {
        // The ORDER BY text comes from a safelisted `Sort`, never from the request.
        let sql = format!(
            r#"
            SELECT count(*) OVER() AS total_records, id, created_at, updated_at, name, description
            FROM categories
            WHERE ($1 = '' OR name ILIKE '%' || $1 || '%')
            {}
            LIMIT $2 OFFSET $3
            "#,
            filters.sort().order_by_clause()
        );

        let rows = bounded(
            "categories.list",
            self.timeout,
            sqlx::query_as::<_, CategoryPageRow>(&sql)
                .bind(name)
                .bind(filters.limit())
                .bind(filters.offset())
                .fetch_all(&self.pool),
        )
        .await?;

        let Some(total_records) = rows.first().map(|row| row.total_records) else {
            return Ok(Page::empty());
        };
        let records = rows.into_iter().map(|row| row.category).collect();
        Ok(Page::new(records, total_records, filters))
    }

    async fn update(&self, category: &mut Category) -> Result<(), StoreError> {
        category.updated_at = bounded(
            "categories.update",
            self.timeout,
            sqlx::query_scalar::<_, DateTime<Utc>>(
                r#"
                UPDATE categories
                SET name = $1, description = $2, updated_at = now()
                WHERE id = $3
                RETURNING updated_at
                "#,
            )
            .bind(&category.name)
            .bind(&category.description)
            .bind(category.id)
            .fetch_one(&self.pool),
        )
        .await?;
        Ok(())
    }

    async fn delete(&self, id: CategoryId) -> Result<(), StoreError> {
        let result = bounded(
            "categories.delete",
            self.timeout,
            sqlx::query("DELETE FROM categories WHERE id = $1")
                .bind(id)
                .execute(&self.pool),
        )
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

// =============================================================================
// Dishes
// =============================================================================

#[derive(sqlx::FromRow)]
struct DishPageRow {
    total_records: i64,
    #[sqlx(flatten)]
    dish: Dish,
}

#[async_trait]
impl BaseDishStore for PostgresStore {
    async fn insert(&self, dish: NewDish) -> Result<Dish, StoreError> {
        bounded(
            "dishes.insert",
            self.timeout,
            sqlx::query_as::<_, Dish>(
                r#"
                INSERT INTO dishes (name, description, price)
                VALUES ($1, $2, $3)
                RETURNING id, created_at, updated_at, name, description, price
                "#,
            )
            .bind(&dish.name)
            .bind(&dish.description)
            .bind(dish.price)
            .fetch_one(&self.pool),
        )
        .await
    }

    async fn find(&self, id: DishId) -> Result<Dish, StoreError> {
        bounded(
            "dishes.find",
            self.timeout,
            sqlx::query_as::<_, Dish>(
                r#"
                SELECT id, created_at, updated_at, name, description, price
                FROM dishes
                WHERE id = $1
                "#,
            )
            .bind(id)
            .fetch_one(&self.pool),
        )
        .await
    }

    async fn list(&self, filter: &DishFilter, filters: &Filters) -> Result<Page<Dish>, StoreError> {
        // ORDER BY text comes from a safelisted `Sort`.
        let sql = format!(
            r#"
            SELECT count(*) OVER() AS total_records,
                   id, created_at, updated_at, name, description, price
            FROM dishes
            WHERE ($1 = '' OR lower(name) = lower($1))
              AND ($2::double precision IS NULL OR price >= $2)
            {}
            LIMIT $3 OFFSET $4
            "#,
            filters.sort().order_by_clause()
        );

        let rows = bounded(
            "dishes.list",
            self.timeout,
            sqlx::query_as::<_, DishPageRow>(&sql)
                .bind(&filter.name)
                .bind(filter.min_price)
                .bind(filters.limit())
                .bind(filters.offset())
                .fetch_all(&self.pool),
        )
        .await?;

        let Some(total_records) = rows.first().map(|row| row.total_records) else {
            return Ok(Page::empty());
        };
        let records = rows.into_iter().map(|row| row.dish).collect();
        Ok(Page::new(records, total_records, filters))
    }

    async fn update(&self, dish: &mut Dish) -> Result<(), StoreError> {
        dish.updated_at = bounded(
            "dishes.update",
            self.timeout,
            sqlx::query_scalar::<_, DateTime<Utc>>(
                r#"
                UPDATE dishes
                SET name = $1, description = $2, price = $3, updated_at = now()
                WHERE id = $4
                RETURNING updated_at
                "#,
            )
            .bind(&dish.name)
            .bind(&dish.description)
            .bind(dish.price)
            .bind(dish.id)
            .fetch_one(&self.pool),
        )
        .await?;
        Ok(())
    }

    async fn delete(&self, id: DishId) -> Result<(), StoreError> {
        let result = bounded(
            "dishes.delete",
            self.timeout,
            sqlx::query("DELETE FROM dishes WHERE id = $1")
                .bind(id)
                .execute(&self.pool),
        )
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
