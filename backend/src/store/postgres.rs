//! PostgreSQL store built on sqlx

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::{
    DateRange, MovementType, NewMovement, NewProduct, NewUser, Product, ProductAttributes,
    ProductUpdate, Role, StockMovement, User,
};
use sqlx::{types::Json, FromRow, PgPool};

use super::InventoryStore;
use crate::error::{AppError, AppResult};

const PRODUCT_COLUMNS: &str = "id, sku, name, category, attributes, min_stock, current_stock";
const MOVEMENT_COLUMNS: &str =
    r#"id, product_id, "type" AS movement_type, quantity, reason, "timestamp", user_id"#;

/// SQLSTATE for numeric_value_out_of_range
const NUMERIC_OUT_OF_RANGE: &str = "22003";

/// Store backed by a PostgreSQL connection pool
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// Row for product queries
#[derive(Debug, FromRow)]
struct ProductRow {
    id: i32,
    sku: String,
    name: String,
    category: String,
    attributes: Json<ProductAttributes>,
    min_stock: i32,
    current_stock: i32,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            sku: row.sku,
            name: row.name,
            category: row.category,
            attributes: row.attributes.0,
            min_stock: row.min_stock,
            current_stock: row.current_stock,
        }
    }
}

/// Row for ledger queries
#[derive(Debug, FromRow)]
struct MovementRow {
    id: i32,
    product_id: i32,
    movement_type: String,
    quantity: i32,
    reason: String,
    timestamp: DateTime<Utc>,
    user_id: i32,
}

impl TryFrom<MovementRow> for StockMovement {
    type Error = AppError;

    fn try_from(row: MovementRow) -> Result<Self, Self::Error> {
        let movement_type = row
            .movement_type
            .parse::<MovementType>()
            .map_err(|e| AppError::Internal(e.to_string()))?;

        Ok(StockMovement {
            id: row.id,
            product_id: row.product_id,
            movement_type,
            quantity: row.quantity,
            reason: row.reason,
            timestamp: row.timestamp,
            user_id: row.user_id,
        })
    }
}

/// Row for user queries
#[derive(Debug, FromRow)]
struct UserRow {
    id: i32,
    username: String,
    password: String,
    role: String,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            username: row.username,
            password: row.password,
            role: row.role.parse::<Role>().map_err(AppError::Internal)?,
        })
    }
}

fn into_movements(rows: Vec<MovementRow>) -> AppResult<Vec<StockMovement>> {
    rows.into_iter().map(StockMovement::try_from).collect()
}

/// Translate constraint violations into client errors
fn map_write_error(err: sqlx::Error, unique_field: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return AppError::DuplicateEntry(unique_field.to_string());
        }
        if db_err.code().as_deref() == Some(NUMERIC_OUT_OF_RANGE) {
            return AppError::validation("quantity", "Resulting stock is out of range");
        }
    }
    AppError::DatabaseError(err)
}

#[async_trait]
impl InventoryStore for PgStore {
    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }

    async fn count_users(&self) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.db)
            .await?;
        Ok(count)
    }

    async fn find_user_by_id(&self, id: i32) -> AppResult<Option<User>> {
        sqlx::query_as::<_, UserRow>("SELECT id, username, password, role FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password, role FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?
        .map(User::try_from)
        .transpose()
    }

    async fn create_user(&self, user: NewUser) -> AppResult<User> {
        let mut tx = self.db.begin().await?;

        // Concurrent first sign-ups must not both see an empty table
        sqlx::query("LOCK TABLE users IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;

        let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&mut *tx)
            .await?;
        let role = Role::for_new_user(existing);

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (username, password, role)
            VALUES ($1, $2, $3)
            RETURNING id, username, password, role
            "#,
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(role.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, "username"))?;

        tx.commit().await?;

        User::try_from(row)
    }

    async fn list_products(&self) -> AppResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products ORDER BY id",
            PRODUCT_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn find_product(&self, id: i32) -> AppResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE id = $1",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Product::from))
    }

    async fn create_product(&self, product: NewProduct) -> AppResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            INSERT INTO products (sku, name, category, attributes, min_stock, current_stock)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(&product.sku)
        .bind(&product.name)
        .bind(&product.category)
        .bind(Json(&product.attributes))
        .bind(product.min_stock)
        .bind(product.current_stock)
        .fetch_one(&self.db)
        .await
        .map_err(|e| map_write_error(e, "sku"))?;

        Ok(row.into())
    }

    async fn update_product(&self, id: i32, update: ProductUpdate) -> AppResult<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            UPDATE products
            SET name = COALESCE($2, name),
                category = COALESCE($3, category),
                attributes = COALESCE($4, attributes),
                min_stock = COALESCE($5, min_stock)
            WHERE id = $1
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .bind(&update.name)
        .bind(&update.category)
        .bind(update.attributes.as_ref().map(Json))
        .bind(update.min_stock)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Product::from))
    }

    async fn delete_product(&self, id: i32) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn apply_movement(&self, movement: NewMovement) -> AppResult<StockMovement> {
        let delta = movement.signed_delta();
        let mut tx = self.db.begin().await?;

        // The row lock taken here serialises concurrent movements on the
        // product until commit; the increment reads the committed balance.
        let new_stock = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE products
            SET current_stock = current_stock + $1
            WHERE id = $2
            RETURNING current_stock
            "#,
        )
        .bind(delta)
        .bind(movement.product_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, "product"))?;

        if new_stock.is_none() {
            // Dropping the transaction rolls it back
            return Err(AppError::ProductNotFound(movement.product_id));
        }

        let row = sqlx::query_as::<_, MovementRow>(&format!(
            r#"
            INSERT INTO stock_movements (product_id, "type", quantity, reason, user_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            MOVEMENT_COLUMNS
        ))
        .bind(movement.product_id)
        .bind(movement.movement_type.as_str())
        .bind(movement.quantity)
        .bind(&movement.reason)
        .bind(movement.user_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        StockMovement::try_from(row)
    }

    async fn list_movements(&self, product_id: Option<i32>) -> AppResult<Vec<StockMovement>> {
        let rows = sqlx::query_as::<_, MovementRow>(&format!(
            r#"
            SELECT {}
            FROM stock_movements
            WHERE ($1::INTEGER IS NULL OR product_id = $1)
            ORDER BY "timestamp" DESC, id DESC
            "#,
            MOVEMENT_COLUMNS
        ))
        .bind(product_id)
        .fetch_all(&self.db)
        .await?;

        into_movements(rows)
    }

    async fn list_movements_between(&self, range: DateRange) -> AppResult<Vec<StockMovement>> {
        let rows = sqlx::query_as::<_, MovementRow>(&format!(
            r#"
            SELECT {}
            FROM stock_movements
            WHERE ($1::TIMESTAMPTZ IS NULL OR "timestamp" >= $1)
              AND ($2::TIMESTAMPTZ IS NULL OR "timestamp" <= $2)
            ORDER BY "timestamp" DESC, id DESC
            "#,
            MOVEMENT_COLUMNS
        ))
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.db)
        .await?;

        into_movements(rows)
    }
}
