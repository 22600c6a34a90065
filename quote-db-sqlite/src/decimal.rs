use quote_core::RepositoryError;
use rust_decimal::Decimal;
use sqlx::{Row, TypeInfo, ValueRef};

/// Get a decimal value from a row.
///
/// Money is written as TEXT, but hand-edited rows may hold INTEGER or REAL
/// values, so those are accepted too.
pub fn get_decimal(
    row: &sqlx::sqlite::SqliteRow,
    column: &str,
) -> Result<Decimal, RepositoryError> {
    let value_ref = row
        .try_get_raw(column)
        .map_err(|e| RepositoryError::Database(format!("Column '{}' not found: {}", column, e)))?;

    let type_info = value_ref.type_info();
    let type_name = type_info.name();

    match type_name {
        "TEXT" => {
            let val: String = row.try_get(column).map_err(|e| {
                RepositoryError::Database(format!("Failed to get TEXT from '{}': {}", column, e))
            })?;
            val.trim().parse::<Decimal>().map_err(|e| {
                RepositoryError::Database(format!(
                    "Invalid decimal '{}' in column '{}': {}",
                    val, column, e
                ))
            })
        }
        "INTEGER" => {
            let val: i64 = row.try_get(column).map_err(|e| {
                RepositoryError::Database(format!(
                    "Failed to get INTEGER from '{}': {}",
                    column, e
                ))
            })?;
            Ok(Decimal::from(val))
        }
        "REAL" => {
            let val: f64 = row.try_get(column).map_err(|e| {
                RepositoryError::Database(format!("Failed to get REAL from '{}': {}", column, e))
            })?;
            Decimal::try_from(val).map_err(|e| {
                RepositoryError::Database(format!("Failed to convert {} to Decimal: {}", val, e))
            })
        }
        "NULL" => Ok(Decimal::ZERO),
        _ => Err(RepositoryError::Database(format!(
            "Unexpected type '{}' for column '{}'",
            type_name, column
        ))),
    }
}

/// Convert a Decimal to the exact TEXT form stored in SQLite.
pub fn decimal_to_text(d: Decimal) -> String {
    d.normalize().to_string()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use sqlx::sqlite::SqlitePoolOptions;

    use super::*;

    async fn setup_test_db() -> sqlx::sqlite::SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");
        sqlx::query(
            "CREATE TABLE test_decimals (
                id INTEGER PRIMARY KEY,
                value
            )",
        )
        .execute(&pool)
        .await
        .expect("Failed to create test table");
        pool
    }

    async fn read_back(sql_value: &str) -> Result<Decimal, RepositoryError> {
        let pool = setup_test_db().await;
        sqlx::query(&format!(
            "INSERT INTO test_decimals (id, value) VALUES (1, {})",
            sql_value
        ))
        .execute(&pool)
        .await
        .expect("Failed to insert test data");

        let row = sqlx::query("SELECT value FROM test_decimals WHERE id = 1")
            .fetch_one(&pool)
            .await
            .expect("Failed to fetch row");

        get_decimal(&row, "value")
    }

    #[tokio::test]
    async fn test_get_decimal_from_text() {
        assert_eq!(read_back("'1234.5675'").await, Ok(dec!(1234.5675)));
    }

    #[tokio::test]
    async fn test_get_decimal_from_negative_text() {
        assert_eq!(read_back("'-15.00'").await, Ok(dec!(-15)));
    }

    #[tokio::test]
    async fn test_get_decimal_from_integer() {
        assert_eq!(read_back("12345").await, Ok(dec!(12345)));
    }

    #[tokio::test]
    async fn test_get_decimal_from_real() {
        assert_eq!(read_back("0.25").await, Ok(dec!(0.25)));
    }

    #[tokio::test]
    async fn test_get_decimal_null_is_zero() {
        assert_eq!(read_back("NULL").await, Ok(Decimal::ZERO));
    }

    #[tokio::test]
    async fn test_get_decimal_rejects_garbage_text() {
        let result = read_back("'twelve'").await;

        assert!(matches!(result, Err(RepositoryError::Database(msg)) if msg.contains("twelve")));
    }

    #[test]
    fn test_decimal_to_text_is_exact() {
        assert_eq!(decimal_to_text(dec!(21.1894)), "21.1894");
        assert_eq!(decimal_to_text(dec!(412.00)), "412");
    }
}
