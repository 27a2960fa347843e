//! Item repository for database operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use stockroom_core::{ItemId, Price, Quantity};

use super::store::ItemStore;
use super::{RepositoryError, conflict_on_unique};
use crate::models::item::{Item, ItemFields};

const ITEM_COLUMNS: &str = "id, name, description, quantity, price, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct ItemRow {
    id: Uuid,
    name: String,
    description: String,
    quantity: i32,
    price: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ItemRow> for Item {
    type Error = RepositoryError;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        let quantity = Quantity::new(i64::from(row.quantity)).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid quantity in database: {e}"))
        })?;
        let price = Price::new(row.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price in database: {e}"))
        })?;

        Ok(Self {
            id: ItemId::new(row.id),
            name: row.name,
            description: row.description,
            quantity,
            price,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn name_conflict(_constraint: &str) -> &'static str {
    "name"
}

/// `PostgreSQL`-backed [`ItemStore`].
#[derive(Clone)]
pub struct PgItemRepository {
    pool: PgPool,
}

impl PgItemRepository {
    /// Create a new item repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ItemStore for PgItemRepository {
    async fn list(&self) -> Result<Vec<Item>, RepositoryError> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM stockroom.items ORDER BY created_at, id");
        let rows: Vec<ItemRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;

        rows.into_iter().map(Item::try_from).collect()
    }

    async fn get(&self, id: ItemId) -> Result<Option<Item>, RepositoryError> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM stockroom.items WHERE id = $1");
        let row: Option<ItemRow> = sqlx::query_as(&sql)
            .bind(id.into_inner())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Item::try_from).transpose()
    }

    async fn exists_by_name(&self, name: &str) -> Result<bool, RepositoryError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM stockroom.items WHERE name = $1)")
                .bind(name)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn create(&self, fields: &ItemFields) -> Result<Item, RepositoryError> {
        let sql = format!(
            r"
            INSERT INTO stockroom.items (id, name, description, quantity, price)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {ITEM_COLUMNS}
            "
        );
        let row: ItemRow = sqlx::query_as(&sql)
            .bind(ItemId::generate().into_inner())
            .bind(&fields.name)
            .bind(&fields.description)
            .bind(fields.quantity.get())
            .bind(fields.price.amount())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, name_conflict))?;

        row.try_into()
    }

    async fn update(&self, id: ItemId, fields: &ItemFields) -> Result<Item, RepositoryError> {
        let sql = format!(
            r"
            UPDATE stockroom.items
            SET name = $2, description = $3, quantity = $4, price = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING {ITEM_COLUMNS}
            "
        );
        let row: Option<ItemRow> = sqlx::query_as(&sql)
            .bind(id.into_inner())
            .bind(&fields.name)
            .bind(&fields.description)
            .bind(fields.quantity.get())
            .bind(fields.price.amount())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, name_conflict))?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    async fn delete(&self, id: ItemId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM stockroom.items WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
