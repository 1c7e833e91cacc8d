use crate::db::connection::Database;
use crate::errors::PersistResult;
use crate::scraper::Listing;
use rusqlite::{params, Connection};

const CREATE_ADS: &str = r#"
    CREATE TABLE IF NOT EXISTS ads (
        id                 INTEGER PRIMARY KEY AUTOINCREMENT,
        title              TEXT,
        url                TEXT UNIQUE,
        price              TEXT,
        description        TEXT,
        address            TEXT,
        published_date     TEXT,
        view_count         TEXT,
        seller_name        TEXT,
        seller_profile_url TEXT,
        phone              TEXT,
        collected_at       TEXT DEFAULT (datetime('now','localtime'))
    )
"#;

/// A row read back from `ads`, with the store-assigned columns.
#[cfg(test)]
#[derive(Debug)]
pub struct StoredAd {
    pub id: i64,
    pub listing: Listing,
    pub collected_at: chrono::NaiveDateTime,
}

/// Result of one batch insert, both counts taken on the same connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertSummary {
    pub inserted: usize,
    pub total: usize,
}

pub fn ensure_schema(conn: &Connection) -> PersistResult<()> {
    conn.execute_batch(CREATE_ADS)?;
    Ok(())
}

/// Insert every listing whose url is not stored yet. Known urls are skipped
/// silently; `inserted` counts only the new rows.
pub fn insert_ads(db: &Database, listings: &[Listing]) -> PersistResult<InsertSummary> {
    db.with_conn(|conn| {
        ensure_schema(conn)?;

        let tx = conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO ads (
                    title, url, price, description, address,
                    published_date, view_count, seller_name, seller_profile_url, phone
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                ON CONFLICT(url) DO NOTHING
                "#,
            )?;

            for ad in listings {
                inserted += stmt.execute(params![
                    ad.title,
                    ad.url,
                    ad.price,
                    ad.description,
                    ad.address,
                    ad.published_date,
                    ad.view_count,
                    ad.seller_name,
                    ad.seller_profile_url,
                    ad.phone
                ])?;
            }
        }
        tx.commit()?;

        let total = count_rows(conn)?;
        Ok(InsertSummary { inserted, total })
    })
}

fn count_rows(conn: &Connection) -> PersistResult<usize> {
    let n: i64 = conn.query_row("SELECT COUNT(*) FROM ads", [], |row| row.get(0))?;
    Ok(n as usize)
}

#[cfg(test)]
pub fn count_ads(db: &Database) -> PersistResult<usize> {
    db.with_conn(|conn| {
        ensure_schema(conn)?;
        count_rows(conn)
    })
}

#[cfg(test)]
pub fn get_ads(db: &Database) -> PersistResult<Vec<StoredAd>> {
    db.with_conn(|conn| {
        ensure_schema(conn)?;
        let mut stmt = conn.prepare(
            r#"
            SELECT
                id,                 -- 0
                title,              -- 1
                url,                -- 2
                price,              -- 3
                description,        -- 4
                address,            -- 5
                published_date,     -- 6
                view_count,         -- 7
                seller_name,        -- 8
                seller_profile_url, -- 9
                phone,              -- 10
                collected_at        -- 11
            FROM ads
            ORDER BY id
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(StoredAd {
                id: row.get(0)?,
                listing: Listing {
                    title: row.get(1)?,
                    url: row.get(2)?,
                    price: row.get(3)?,
                    description: row.get(4)?,
                    address: row.get(5)?,
                    published_date: row.get(6)?,
                    view_count: row.get(7)?,
                    seller_name: row.get(8)?,
                    seller_profile_url: row.get(9)?,
                    phone: row.get(10)?,
                },
                collected_at: row.get(11)?,
            })
        })?;

        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    })
}
