//! `PostgreSQL` order repository.
//!
//! Pages are keyset queries: the sort column (and direction) is chosen at
//! runtime, so queries are assembled with `QueryBuilder` from a fixed set of
//! column expressions. No user input is ever pushed as SQL text; sort values
//! and ids are always bound.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use orders_dashboard_core::{
    Order, OrderId, OrderItems, OrderStatus, OrderSummary, SeekPosition, SortColumn,
    SortDirection, SortOrder, SortValue,
};

use super::{OrderStore, RepositoryError};

const SUMMARY_COLUMNS: &str = "SELECT id, customer_name, order_amount, status, created_at FROM orders";

/// Database row for the list projection.
#[derive(Debug, sqlx::FromRow)]
struct OrderSummaryRow {
    id: OrderId,
    customer_name: String,
    order_amount: Decimal,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderSummaryRow> for OrderSummary {
    type Error = RepositoryError;

    fn try_from(row: OrderSummaryRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<OrderStatus>().map_err(|e| {
            RepositoryError::DataCorruption(format!("order {}: {e}", row.id))
        })?;

        Ok(Self {
            id: row.id,
            customer_name: row.customer_name,
            order_amount: row.order_amount,
            status,
            created_at: row.created_at,
        })
    }
}

/// SQL expression a column sorts and compares by.
///
/// Text columns use the "C" collation so the database orders them by bytes.
const fn column_expr(column: SortColumn) -> &'static str {
    match column {
        SortColumn::Id => "id",
        SortColumn::CustomerName => "customer_name COLLATE \"C\"",
        SortColumn::OrderAmount => "order_amount",
        SortColumn::Status => "status COLLATE \"C\"",
        SortColumn::CreatedAt => "created_at",
    }
}

const fn direction_sql(direction: SortDirection) -> &'static str {
    match direction {
        SortDirection::Asc => "ASC",
        SortDirection::Desc => "DESC",
    }
}

/// Comparison that selects rows after the seek value on the primary column.
const fn after_op(direction: SortDirection) -> &'static str {
    match direction {
        SortDirection::Asc => " > ",
        SortDirection::Desc => " < ",
    }
}

fn push_value(builder: &mut QueryBuilder<'_, Postgres>, value: &SortValue) {
    match value {
        SortValue::Id(id) => builder.push_bind(*id),
        SortValue::Text(text) => builder.push_bind(text.clone()),
        SortValue::Amount(amount) => builder.push_bind(*amount),
        SortValue::Timestamp(at) => builder.push_bind(*at),
    };
}

/// Append the keyset predicate for rows strictly after `seek`.
fn push_seek(builder: &mut QueryBuilder<'_, Postgres>, sort: SortOrder, seek: &SeekPosition) {
    let column = column_expr(sort.column);
    let op = after_op(sort.direction);

    if sort.column == SortColumn::Id {
        // The tie-break is the primary column itself.
        builder.push(" WHERE id").push(op).push_bind(seek.id);
        return;
    }

    builder.push(" WHERE (").push(column).push(op);
    push_value(builder, &seek.key);
    builder.push(" OR (").push(column).push(" = ");
    push_value(builder, &seek.key);
    builder.push(" AND id > ").push_bind(seek.id).push("))");
}

/// Build the page query for `sort`, optionally seeking past `seek`.
fn page_query(
    sort: SortOrder,
    seek: Option<&SeekPosition>,
    take: u32,
) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(SUMMARY_COLUMNS);

    if let Some(seek) = seek {
        push_seek(&mut builder, sort, seek);
    }

    builder
        .push(" ORDER BY ")
        .push(column_expr(sort.column))
        .push(" ")
        .push(direction_sql(sort.direction));
    if sort.column != SortColumn::Id {
        builder.push(", id ASC");
    }
    builder.push(" LIMIT ").push_bind(i64::from(take));

    builder
}

/// Repository for the `orders` table.
#[derive(Debug, Clone)]
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Insert a batch of orders in one statement.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    #[instrument(skip(self, orders), fields(batch = orders.len()))]
    pub async fn insert_batch(&self, orders: &[Order]) -> Result<u64, RepositoryError> {
        if orders.is_empty() {
            return Ok(0);
        }

        let mut builder = QueryBuilder::<Postgres>::new(
            "INSERT INTO orders (id, customer_name, order_amount, status, items, created_at) ",
        );
        builder.push_values(orders, |mut row, order| {
            row.push_bind(order.id)
                .push_bind(order.customer_name.clone())
                .push_bind(order.order_amount)
                .push_bind(order.status.as_str())
                .push_bind(Json::<OrderItems>(order.items.clone()))
                .push_bind(order.created_at);
        });

        let result = builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    /// Delete every order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    #[instrument(skip(self))]
    pub async fn delete_all(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM orders")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    #[instrument(skip(self, seek), fields(sort_by = %sort.column, direction = %sort.direction))]
    async fn fetch_page(
        &self,
        sort: SortOrder,
        seek: Option<&SeekPosition>,
        take: u32,
    ) -> Result<Vec<OrderSummary>, RepositoryError> {
        let mut query = page_query(sort, seek, take);
        let rows = query
            .build_query_as::<OrderSummaryRow>()
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(OrderSummary::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn count(&self) -> Result<u64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        u64::try_from(count)
            .map_err(|_| RepositoryError::DataCorruption(format!("negative row count: {count}")))
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn seek(key: SortValue) -> SeekPosition {
        SeekPosition {
            key,
            id: OrderId::new(uuid::Uuid::from_u128(9)),
        }
    }

    #[test]
    fn test_first_page_query() {
        let builder = page_query(SortOrder::default(), None, 51);
        let sql = builder.sql();

        assert_eq!(
            sql,
            "SELECT id, customer_name, order_amount, status, created_at FROM orders \
             ORDER BY created_at DESC, id ASC LIMIT $1"
        );
    }

    #[test]
    fn test_seek_query_desc() {
        let at = Utc
            .with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
            .single()
            .expect("valid timestamp");
        let builder = page_query(
            SortOrder::default(),
            Some(&seek(SortValue::Timestamp(at))),
            11,
        );
        let sql = builder.sql();

        assert!(sql.contains(
            "WHERE (created_at < $1 OR (created_at = $2 AND id > $3)) \
             ORDER BY created_at DESC, id ASC LIMIT $4"
        ));
    }

    #[test]
    fn test_seek_query_text_uses_byte_collation() {
        let sort = SortOrder::new(SortColumn::CustomerName, SortDirection::Asc);
        let builder = page_query(sort, Some(&seek(SortValue::Text("M".to_string()))), 11);
        let sql = builder.sql();

        assert!(sql.contains("WHERE (customer_name COLLATE \"C\" > $1"));
        assert!(sql.contains("ORDER BY customer_name COLLATE \"C\" ASC, id ASC"));
    }

    #[test]
    fn test_seek_query_on_id_column() {
        let sort = SortOrder::new(SortColumn::Id, SortDirection::Desc);
        let position = seek(SortValue::Id(OrderId::new(uuid::Uuid::from_u128(9))));
        let builder = page_query(sort, Some(&position), 11);
        let sql = builder.sql();

        assert!(sql.ends_with("WHERE id < $1 ORDER BY id DESC LIMIT $2"));
    }

    #[test]
    fn test_row_with_unknown_status_is_corruption() {
        let row = OrderSummaryRow {
            id: OrderId::generate(),
            customer_name: "Edsger Dijkstra".to_string(),
            order_amount: Decimal::ONE,
            status: "shipped".to_string(),
            created_at: Utc::now(),
        };

        let err = OrderSummary::try_from(row).expect_err("unknown status");
        assert!(matches!(err, RepositoryError::DataCorruption(_)));
    }
}
