use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use quote_core::db::check_requested_number;
use quote_core::{
    LineItem, LineItemId, NewQuote, Quote, QuoteFilter, QuoteRepository, QuoteStatus, QuoteType,
    RepositoryError, UnitOfMeasure, format_quote_number,
};
use sqlx::{QueryBuilder, Row, Sqlite, sqlite::SqlitePool};
use tracing::{debug, info};

use crate::decimal::{decimal_to_text, get_decimal};

const QUOTE_COLUMNS: &str =
    "SELECT id, quote_number, customer_name, quote_type, status, total, date_sent, created_at
     FROM quotes";

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .with_context(|| format!("Failed to connect to database: {}", database_url))?;
        Ok(Self { pool })
    }

    pub async fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    /// Load and execute all SQL seed files from the specified directory.
    /// Files are executed in alphabetical order by filename.
    pub async fn run_seeds(
        &self,
        seeds_dir: &Path,
    ) -> Result<()> {
        let mut entries: Vec<_> = std::fs::read_dir(seeds_dir)
            .with_context(|| format!("Failed to read seeds directory '{}'", seeds_dir.display()))?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "sql"))
            .collect();

        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let path = entry.path();
            let sql = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read seed file '{}'", path.display()))?;

            sqlx::raw_sql(&sql)
                .execute(&self.pool)
                .await
                .with_context(|| format!("Failed to execute seed file '{}'", path.display()))?;
            info!(file = %path.display(), "seed file applied");
        }

        Ok(())
    }

    /// Number of stored quotes, used to decide whether a database is fresh.
    pub async fn count_quotes(&self) -> Result<i64, RepositoryError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM quotes")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn db_err(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Database(e.to_string())
}

fn row_to_quote(row: &sqlx::sqlite::SqliteRow) -> Result<Quote, RepositoryError> {
    let quote_type: String = row.try_get("quote_type").map_err(db_err)?;
    let status: String = row.try_get("status").map_err(db_err)?;

    Ok(Quote {
        id: row.try_get("id").map_err(db_err)?,
        quote_number: row
            .try_get::<Option<String>, _>("quote_number")
            .map_err(db_err)?
            .unwrap_or_default(),
        customer_name: row.try_get("customer_name").map_err(db_err)?,
        quote_type: QuoteType::parse(&quote_type)
            .ok_or_else(|| RepositoryError::Database(format!("Invalid quote type: {}", quote_type)))?,
        status: QuoteStatus::parse(&status)
            .ok_or_else(|| RepositoryError::Database(format!("Invalid status: {}", status)))?,
        total: get_decimal(row, "total")?,
        date_sent: row
            .try_get::<Option<NaiveDate>, _>("date_sent")
            .map_err(|e| RepositoryError::Database(format!("Failed to get date_sent: {}", e)))?,
        created_at: row
            .try_get::<NaiveDate, _>("created_at")
            .map_err(|e| RepositoryError::Database(format!("Failed to get created_at: {}", e)))?,
    })
}

fn row_to_line_item(row: &sqlx::sqlite::SqliteRow) -> Result<LineItem, RepositoryError> {
    let unit: String = row.try_get("unit_of_measure").map_err(db_err)?;
    let item_id: i64 = row.try_get("item_id").map_err(db_err)?;
    let quantity: i64 = row.try_get("quantity").map_err(db_err)?;

    Ok(LineItem {
        id: LineItemId(
            u64::try_from(item_id)
                .map_err(|_| RepositoryError::Database(format!("Invalid item id: {}", item_id)))?,
        ),
        sku: row.try_get("sku").map_err(db_err)?,
        description: row.try_get("description").map_err(db_err)?,
        unit_of_measure: UnitOfMeasure::parse(&unit)
            .ok_or_else(|| RepositoryError::Database(format!("Invalid unit of measure: {}", unit)))?,
        quantity: u32::try_from(quantity)
            .map_err(|_| RepositoryError::Database(format!("Invalid quantity: {}", quantity)))?,
        unit_price: get_decimal(row, "unit_price")?,
        discount: get_decimal(row, "discount")?,
        apply_tax: row.try_get("apply_tax").map_err(db_err)?,
    })
}

#[async_trait]
impl QuoteRepository for SqliteRepository {
    async fn list(
        &self,
        filter: &QuoteFilter,
    ) -> Result<Vec<Quote>, RepositoryError> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(QUOTE_COLUMNS);

        if !filter.statuses.is_empty() {
            query.push(" WHERE status IN (");
            let mut separated = query.separated(", ");
            for status in &filter.statuses {
                separated.push_bind(status.as_str());
            }
            separated.push_unseparated(")");
        }
        query.push(" ORDER BY created_at DESC, id DESC");

        let rows = query.build().fetch_all(&self.pool).await.map_err(db_err)?;

        rows.iter().map(row_to_quote).collect()
    }

    async fn get(
        &self,
        id: i64,
    ) -> Result<Quote, RepositoryError> {
        let row = sqlx::query(&format!("{} WHERE id = ?", QUOTE_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .ok_or(RepositoryError::NotFound)?;

        row_to_quote(&row)
    }

    async fn create(
        &self,
        quote: NewQuote,
    ) -> Result<Quote, RepositoryError> {
        check_requested_number(&quote)?;
        let today = Utc::now().date_naive();
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let result = sqlx::query(
            "INSERT INTO quotes (
                quote_number, customer_name, quote_type, status,
                tax_rate_percent, subtotal, tax_amount, total, date_sent, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, NULL, ?)",
        )
        .bind(quote.quote_number.as_deref())
        .bind(&quote.customer_name)
        .bind(quote.quote_type.as_str())
        .bind(quote.status.as_str())
        .bind(decimal_to_text(quote.tax_rate_percent))
        .bind(decimal_to_text(quote.totals.subtotal))
        .bind(decimal_to_text(quote.totals.tax_amount))
        .bind(decimal_to_text(quote.totals.total))
        .bind(today)
        .execute(&mut *tx)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepositoryError::DuplicateQuoteNumber(
                    quote.quote_number.clone().unwrap_or_default(),
                )
            }
            _ => db_err(e),
        })?;

        let id = result.last_insert_rowid();

        if quote.quote_number.is_none() {
            sqlx::query("UPDATE quotes SET quote_number = ? WHERE id = ?")
                .bind(format_quote_number(id))
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(db_err)?;
        }

        for (position, item) in quote.items.iter().enumerate() {
            let item_id = i64::try_from(item.id.0)
                .map_err(|_| RepositoryError::Database(format!("Item id too large: {}", item.id)))?;

            sqlx::query(
                "INSERT INTO quote_items (
                    quote_id, position, item_id, sku, description, unit_of_measure,
                    quantity, unit_price, discount, apply_tax
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(id)
            .bind(position as i64)
            .bind(item_id)
            .bind(&item.sku)
            .bind(&item.description)
            .bind(item.unit_of_measure.as_str())
            .bind(i64::from(item.quantity))
            .bind(decimal_to_text(item.unit_price))
            .bind(decimal_to_text(item.discount))
            .bind(item.apply_tax)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }

        tx.commit().await.map_err(db_err)?;
        debug!(id, items = quote.items.len(), "quote stored");

        self.get(id).await
    }

    async fn update(
        &self,
        quote: &Quote,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE quotes SET
                quote_number = ?, customer_name = ?, quote_type = ?, status = ?,
                total = ?, date_sent = ?, created_at = ?
             WHERE id = ?",
        )
        .bind(&quote.quote_number)
        .bind(&quote.customer_name)
        .bind(quote.quote_type.as_str())
        .bind(quote.status.as_str())
        .bind(decimal_to_text(quote.total))
        .bind(quote.date_sent)
        .bind(quote.created_at)
        .bind(quote.id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn delete(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        sqlx::query("DELETE FROM quote_items WHERE quote_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        let result = sqlx::query("DELETE FROM quotes WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn list_items(
        &self,
        quote_id: i64,
    ) -> Result<Vec<LineItem>, RepositoryError> {
        // Distinguish "no such quote" from "quote without items".
        self.get(quote_id).await?;

        let rows = sqlx::query(
            "SELECT item_id, sku, description, unit_of_measure, quantity,
                    unit_price, discount, apply_tax
             FROM quote_items WHERE quote_id = ? ORDER BY position",
        )
        .bind(quote_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(row_to_line_item).collect()
    }
}
