//! SQLite output adapter: every ticker's results in one `market_data` table.
//!
//! Rows are keyed by `(Ticker, Date)`; a rerun replaces the previous row.
//! Indicator columns depend on the indicator configuration, so any column
//! the table lacks is added before insertion. Undefined values are NULL.

use crate::domain::error::SignalforgeError;
use crate::domain::pipeline::TickerRun;
use crate::ports::config_port::ConfigPort;
use crate::ports::sink_port::SinkPort;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::Value;
use rusqlite::{Transaction, TransactionBehavior};
use std::collections::HashSet;
use std::time::Duration;
use tracing::info;

pub const TABLE: &str = "market_data";

const BUSY_TIMEOUT: Duration = Duration::from_secs(30);

pub struct SqliteSink {
    pool: Pool<SqliteConnectionManager>,
}

fn pool_error(e: r2d2::Error) -> SignalforgeError {
    SignalforgeError::Database {
        reason: e.to_string(),
    }
}

fn query_error(e: rusqlite::Error) -> SignalforgeError {
    SignalforgeError::DatabaseQuery {
        reason: e.to_string(),
    }
}

fn quoted(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

impl SqliteSink {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, SignalforgeError> {
        let db_path = config
            .get_string("sqlite", "path")
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| SignalforgeError::ConfigMissing {
                section: "sqlite".into(),
                key: "path".into(),
            })?;

        let pool_size = u32::try_from(config.get_int("sqlite", "pool_size", 4))
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| SignalforgeError::ConfigInvalid {
                section: "sqlite".into(),
                key: "pool_size".into(),
                reason: "pool_size must be a positive integer".into(),
            })?;

        let manager = SqliteConnectionManager::file(db_path.trim())
            .with_init(|conn| conn.busy_timeout(BUSY_TIMEOUT));
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(pool_error)?;

        Ok(Self { pool })
    }

    pub fn in_memory() -> Result<Self, SignalforgeError> {
        // every pooled connection to :memory: is its own database
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(pool_error)?;

        Ok(Self { pool })
    }

    pub fn initialize_schema(&self) -> Result<(), SignalforgeError> {
        let conn = self.pool.get().map_err(pool_error)?;
        conn.execute_batch(&create_table_sql()).map_err(query_error)
    }
}

fn create_table_sql() -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {TABLE} (
            \"Ticker\" TEXT NOT NULL,
            \"Date\" TEXT NOT NULL,
            \"Strategy\" TEXT NOT NULL,
            \"Buy\" INTEGER NOT NULL,
            \"Sell\" INTEGER NOT NULL,
            \"Position\" REAL NOT NULL,
            PRIMARY KEY (\"Ticker\", \"Date\")
        );
        CREATE INDEX IF NOT EXISTS idx_{TABLE}_date ON {TABLE}(\"Date\");"
    )
}

/// Add a REAL column for every name the table does not have yet.
fn ensure_columns(tx: &Transaction, names: &[String]) -> Result<(), SignalforgeError> {
    let existing: HashSet<String> = {
        let mut stmt = tx
            .prepare(&format!("PRAGMA table_info({TABLE})"))
            .map_err(query_error)?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(1))
            .map_err(query_error)?;
        rows.collect::<Result<_, _>>().map_err(query_error)?
    };

    for name in names.iter().filter(|n| !existing.contains(*n)) {
        tx.execute_batch(&format!(
            "ALTER TABLE {TABLE} ADD COLUMN {} REAL",
            quoted(name)
        ))
        .map_err(query_error)?;
    }
    Ok(())
}

impl SinkPort for SqliteSink {
    fn write(&self, run: &TickerRun) -> Result<(), SignalforgeError> {
        let frame = &run.frame;
        let indicator_names: Vec<String> = frame
            .column_names()
            .iter()
            .map(|c| c.to_string())
            .collect();

        let mut columns: Vec<String> = vec!["Ticker".into(), "Date".into(), "Strategy".into()];
        columns.extend(indicator_names.iter().cloned());
        columns.extend(["Buy".into(), "Sell".into(), "Position".into()]);

        let sql = format!(
            "INSERT OR REPLACE INTO {TABLE} ({}) VALUES ({})",
            columns
                .iter()
                .map(|c| quoted(c))
                .collect::<Vec<_>>()
                .join(", "),
            (1..=columns.len())
                .map(|i| format!("?{i}"))
                .collect::<Vec<_>>()
                .join(", ")
        );

        let mut conn = self.pool.get().map_err(pool_error)?;
        // IMMEDIATE holds the write lock from the schema check to commit
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(query_error)?;
        tx.execute_batch(&create_table_sql()).map_err(query_error)?;
        ensure_columns(&tx, &indicator_names)?;

        {
            let mut stmt = tx.prepare(&sql).map_err(query_error)?;
            let ticker = run.ticker().to_string();
            let strategy = run.strategy.name().to_string();

            for (i, date) in frame.dates().iter().enumerate() {
                let mut row: Vec<Value> = Vec::with_capacity(columns.len());
                row.push(Value::Text(ticker.clone()));
                row.push(Value::Text(date.format("%Y-%m-%d").to_string()));
                row.push(Value::Text(strategy.clone()));
                row.extend(frame.columns().map(|(_, values)| {
                    if values[i].is_nan() {
                        Value::Null
                    } else {
                        Value::Real(values[i])
                    }
                }));
                row.push(Value::Integer(i64::from(run.signals.buy[i])));
                row.push(Value::Integer(i64::from(run.signals.sell[i])));
                row.push(Value::Real(run.positions[i]));

                stmt.execute(rusqlite::params_from_iter(row))
                    .map_err(query_error)?;
            }
        }

        tx.commit().map_err(query_error)?;

        info!(
            ticker = run.ticker(),
            table = TABLE,
            rows = frame.len(),
            "wrote results to sqlite"
        );
        Ok(())
    }
}
