//! Snapshot Store
//!
//! SQLite-backed source of items, trades and exchange rates. The ingestion
//! layer writes here; the engine reads one snapshot at a time.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;
use tracing::{debug, warn};

use skinledger_core::{
    ActiveListing, FxRate, Item, LedgerError, LedgerResult, Platform, Trade, TradeStatus,
    TradeType,
};

use crate::snapshot::{Snapshot, SnapshotSource};

/// Snapshot store using SQLite
pub struct SnapshotStore {
    conn: Mutex<Connection>,
}

impl SnapshotStore {
    /// Open (or create) the database at `db_path`
    ///
    /// Creates the database file and tables if they don't exist.
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self, SnapshotStoreError> {
        if let Some(parent) = db_path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                SnapshotStoreError::Io(format!("Failed to create database directory: {}", e))
            })?;
        }

        let conn = Connection::open(db_path).map_err(SnapshotStoreError::Database)?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;

        Ok(store)
    }

    /// Create an in-memory store (useful for testing)
    pub fn new_in_memory() -> Result<Self, SnapshotStoreError> {
        let conn = Connection::open_in_memory().map_err(SnapshotStoreError::Database)?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;

        Ok(store)
    }

    fn init_schema(&self) -> Result<(), SnapshotStoreError> {
        let conn = self.conn.lock().map_err(|_| SnapshotStoreError::LockError)?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS items (
                id TEXT PRIMARY KEY,
                external_id TEXT NOT NULL,
                platform TEXT NOT NULL,
                name TEXT NOT NULL,
                wear TEXT,
                float_value REAL,
                asset_id TEXT,
                image_url TEXT,
                listing_price TEXT,
                listed_at INTEGER
            );

            CREATE INDEX IF NOT EXISTS idx_items_asset
            ON items(asset_id);

            CREATE TABLE IF NOT EXISTS trades (
                id TEXT PRIMARY KEY,
                item_id TEXT NOT NULL,
                type TEXT NOT NULL,
                status TEXT NOT NULL,
                buy_price TEXT,
                sell_price TEXT,
                commission TEXT,
                platform TEXT NOT NULL,
                traded_at INTEGER,
                trade_unlock_at INTEGER,
                hidden INTEGER NOT NULL DEFAULT 0
            );

            CREATE INDEX IF NOT EXISTS idx_trades_traded_at
            ON trades(traded_at);

            CREATE TABLE IF NOT EXISTS fx_rates (
                pair TEXT NOT NULL,
                rate TEXT NOT NULL,
                fetched_at INTEGER NOT NULL,
                PRIMARY KEY (pair, fetched_at)
            );
            "#,
        )
        .map_err(SnapshotStoreError::Database)?;

        Ok(())
    }

    /// Store a single item, replacing any row with the same id
    pub fn store_item(&self, item: &Item) -> Result<(), SnapshotStoreError> {
        let conn = self.conn.lock().map_err(|_| SnapshotStoreError::LockError)?;
        insert_item(&conn, item)?;
        Ok(())
    }

    /// Store multiple items in one transaction
    pub fn store_items(&self, items: &[Item]) -> Result<usize, SnapshotStoreError> {
        let mut conn = self.conn.lock().map_err(|_| SnapshotStoreError::LockError)?;
        let tx = conn.transaction()?;
        for item in items {
            insert_item(&tx, item)?;
        }
        tx.commit()?;
        Ok(items.len())
    }

    /// Store a single trade, replacing any row with the same id
    pub fn store_trade(&self, trade: &Trade) -> Result<(), SnapshotStoreError> {
        let conn = self.conn.lock().map_err(|_| SnapshotStoreError::LockError)?;
        insert_trade(&conn, trade)?;
        Ok(())
    }

    /// Store multiple trades in one transaction
    pub fn store_trades(&self, trades: &[Trade]) -> Result<usize, SnapshotStoreError> {
        let mut conn = self.conn.lock().map_err(|_| SnapshotStoreError::LockError)?;
        let tx = conn.transaction()?;
        for trade in trades {
            insert_trade(&tx, trade)?;
        }
        tx.commit()?;
        Ok(trades.len())
    }

    /// Record an exchange rate observation
    pub fn store_fx_rate(&self, rate: &FxRate) -> Result<(), SnapshotStoreError> {
        let conn = self.conn.lock().map_err(|_| SnapshotStoreError::LockError)?;
        conn.execute(
            "INSERT OR REPLACE INTO fx_rates (pair, rate, fetched_at) VALUES (?1, ?2, ?3)",
            params![rate.pair, rate.rate.to_string(), rate.fetched_at.timestamp_millis()],
        )?;
        Ok(())
    }

    /// Read items, trades and the latest rate per pair
    ///
    /// Three queries in total. Rows that cannot be decoded are logged and
    /// left out.
    pub fn read_snapshot(&self) -> Result<Snapshot, SnapshotStoreError> {
        let conn = self.conn.lock().map_err(|_| SnapshotStoreError::LockError)?;

        let items = read_rows(
            &conn,
            r#"
            SELECT id, external_id, platform, name, wear, float_value, asset_id, image_url,
                   listing_price, listed_at
            FROM items
            ORDER BY rowid ASC
            "#,
            "item",
            decode_item,
        )?;

        let trades = read_rows(
            &conn,
            r#"
            SELECT id, item_id, type, status, buy_price, sell_price, commission, platform,
                   traded_at, trade_unlock_at, hidden
            FROM trades
            ORDER BY traded_at ASC, id ASC
            "#,
            "trade",
            decode_trade,
        )?;

        let fx_rates = read_rows(
            &conn,
            r#"
            SELECT f.pair, f.rate, f.fetched_at
            FROM fx_rates f
            WHERE f.fetched_at = (SELECT MAX(fetched_at) FROM fx_rates WHERE pair = f.pair)
            "#,
            "fx rate",
            decode_fx_rate,
        )?;

        debug!(
            "[SnapshotStore] Loaded {} items, {} trades, {} fx rates",
            items.len(),
            trades.len(),
            fx_rates.len()
        );

        Ok(Snapshot::new(items, trades, fx_rates))
    }
}

impl SnapshotSource for SnapshotStore {
    fn load_snapshot(&self) -> LedgerResult<Snapshot> {
        Ok(self.read_snapshot()?)
    }
}

fn insert_item(conn: &Connection, item: &Item) -> Result<(), SnapshotStoreError> {
    conn.execute(
        r#"
        INSERT OR REPLACE INTO items
            (id, external_id, platform, name, wear, float_value, asset_id, image_url,
             listing_price, listed_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
        params![
            item.id,
            item.external_id,
            item.platform.as_str(),
            item.name,
            item.wear,
            item.float_value,
            item.asset_id,
            item.image_url,
            item.active_listing.as_ref().map(|l| l.price.to_string()),
            item.active_listing
                .as_ref()
                .and_then(|l| l.listed_at)
                .map(|t| t.timestamp_millis()),
        ],
    )?;
    Ok(())
}

fn insert_trade(conn: &Connection, trade: &Trade) -> Result<(), SnapshotStoreError> {
    conn.execute(
        r#"
        INSERT OR REPLACE INTO trades
            (id, item_id, type, status, buy_price, sell_price, commission, platform,
             traded_at, trade_unlock_at, hidden)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        "#,
        params![
            trade.id,
            trade.item_id,
            trade.trade_type.as_str(),
            trade.status.as_str(),
            trade.buy_price.map(|p| p.to_string()),
            trade.sell_price.map(|p| p.to_string()),
            trade.commission.map(|c| c.to_string()),
            trade.platform.as_str(),
            trade.traded_at.map(|t| t.timestamp_millis()),
            trade.trade_unlock_at.map(|t| t.timestamp_millis()),
            trade.hidden,
        ],
    )?;
    Ok(())
}

/// Run `sql` and decode every row, skipping the ones that fail
fn read_rows<T, F>(
    conn: &Connection,
    sql: &str,
    kind: &str,
    decode: F,
) -> Result<Vec<T>, SnapshotStoreError>
where
    F: Fn(&Row<'_>) -> Result<T, String>,
{
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query([])?;

    let mut decoded = Vec::new();
    let mut skipped = 0usize;
    while let Some(row) = rows.next()? {
        match decode(row) {
            Ok(value) => decoded.push(value),
            Err(e) => {
                skipped += 1;
                warn!("[SnapshotStore] Skipping {} row: {}", kind, e);
            }
        }
    }

    if skipped > 0 {
        warn!("[SnapshotStore] {} {} rows could not be decoded", skipped, kind);
    }

    Ok(decoded)
}

fn column<T: rusqlite::types::FromSql>(row: &Row<'_>, idx: usize) -> Result<T, String> {
    row.get(idx).map_err(|e| format!("column {}: {}", idx, e))
}

fn parse_decimal(raw: Option<String>) -> Result<Option<Decimal>, String> {
    raw.map(|s| Decimal::from_str(s.trim()).map_err(|e| format!("bad decimal {:?}: {}", s, e)))
        .transpose()
}

fn parse_millis(raw: Option<i64>) -> Result<Option<DateTime<Utc>>, String> {
    raw.map(|ms| {
        DateTime::from_timestamp_millis(ms).ok_or_else(|| format!("bad timestamp {}", ms))
    })
    .transpose()
}

fn decode_item(row: &Row<'_>) -> Result<Item, String> {
    let id: String = column(row, 0)?;
    let platform: String = column(row, 2)?;
    let platform = Platform::from_str(&platform).map_err(|e| format!("item {}: {}", id, e))?;

    let listing_price = parse_decimal(column(row, 8)?).map_err(|e| format!("item {}: {}", id, e))?;
    let listed_at = parse_millis(column(row, 9)?).map_err(|e| format!("item {}: {}", id, e))?;

    Ok(Item {
        external_id: column(row, 1)?,
        platform,
        name: column(row, 3)?,
        wear: column(row, 4)?,
        float_value: column(row, 5)?,
        asset_id: column(row, 6)?,
        image_url: column(row, 7)?,
        active_listing: listing_price.map(|price| ActiveListing { price, listed_at }),
        id,
    })
}

fn decode_trade(row: &Row<'_>) -> Result<Trade, String> {
    let id: String = column(row, 0)?;
    let tagged = |e: String| format!("trade {}: {}", id, e);

    let trade_type: String = column(row, 2)?;
    let status: String = column(row, 3)?;
    let platform: String = column(row, 7)?;

    Ok(Trade {
        item_id: column(row, 1)?,
        trade_type: TradeType::from_str(&trade_type).map_err(tagged)?,
        status: TradeStatus::from_str(&status).map_err(tagged)?,
        buy_price: parse_decimal(column(row, 4)?).map_err(tagged)?,
        sell_price: parse_decimal(column(row, 5)?).map_err(tagged)?,
        commission: parse_decimal(column(row, 6)?).map_err(tagged)?,
        platform: Platform::from_str(&platform).map_err(tagged)?,
        traded_at: parse_millis(column(row, 8)?).map_err(tagged)?,
        trade_unlock_at: parse_millis(column(row, 9)?).map_err(tagged)?,
        hidden: column(row, 10)?,
        id: id.clone(),
    })
}

fn decode_fx_rate(row: &Row<'_>) -> Result<FxRate, String> {
    let pair: String = column(row, 0)?;
    let raw: String = column(row, 1)?;
    let rate = Decimal::from_str(raw.trim())
        .map_err(|e| format!("{} rate {:?}: {}", pair, raw, e))?;
    let fetched_at = parse_millis(Some(column(row, 2)?))?
        .ok_or_else(|| format!("{} has no fetch time", pair))?;

    Ok(FxRate::new(pair, rate, fetched_at))
}

/// Errors that can occur during snapshot store operations
#[derive(Debug, thiserror::Error)]
pub enum SnapshotStoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Failed to acquire lock")]
    LockError,
}

impl From<SnapshotStoreError> for LedgerError {
    fn from(e: SnapshotStoreError) -> Self {
        LedgerError::storage(e.to_string())
    }
}
