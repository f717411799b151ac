use std::path::Path;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use rusqlite::{Connection, Row, params};
use tracing::{debug, info};

use crate::model::{Bout, BoutId, BoutResult, Competitor, CompetitorId};

/// SQLite-backed bout store. This is the persistence edge of the system;
/// the engines themselves only ever see the in-memory snapshots loaded
/// from here.
pub fn open_db(path: &Path) -> Result<Connection> {
    // parent() yields an empty path for a bare file name; nothing to create.
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create db directory {}", parent.display()))?;
    }
    let conn =
        Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        CREATE TABLE IF NOT EXISTS competitors (
            competitor_id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            total_bouts INTEGER NOT NULL DEFAULT 0,
            wins INTEGER NOT NULL DEFAULT 0,
            losses INTEGER NOT NULL DEFAULT 0,
            draws INTEGER NOT NULL DEFAULT 0,
            win_percentage REAL NOT NULL DEFAULT 0,
            ko_tko_wins INTEGER NOT NULL DEFAULT 0,
            submission_wins INTEGER NOT NULL DEFAULT 0,
            decision_wins INTEGER NOT NULL DEFAULT 0,
            avg_bout_duration_secs REAL NOT NULL DEFAULT 0,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_competitors_name ON competitors(name);

        CREATE TABLE IF NOT EXISTS bouts (
            bout_id INTEGER PRIMARY KEY AUTOINCREMENT,
            first_id INTEGER NOT NULL REFERENCES competitors(competitor_id),
            second_id INTEGER NOT NULL REFERENCES competitors(competitor_id),
            date TEXT NOT NULL,
            result TEXT NULL,
            finish_method TEXT NULL,
            finish_round INTEGER NULL,
            duration_secs REAL NULL,
            first_odds REAL NULL,
            second_odds REAL NULL,
            first_sig_strikes INTEGER NULL,
            second_sig_strikes INTEGER NULL,
            first_takedowns INTEGER NULL,
            second_takedowns INTEGER NULL,
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_bouts_date ON bouts(date);
        CREATE INDEX IF NOT EXISTS idx_bouts_pair ON bouts(first_id, second_id);
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

/// First reference by name creates the competitor with empty aggregates.
/// Lookup is case-insensitive.
pub fn get_or_create_competitor(conn: &Connection, name: &str) -> Result<Competitor> {
    if let Some(existing) = competitor_by_name(conn, name)? {
        return Ok(existing);
    }
    conn.execute(
        "INSERT INTO competitors(name, updated_at) VALUES (?1, ?2)",
        params![name, Utc::now().to_rfc3339()],
    )
    .with_context(|| format!("insert competitor {name}"))?;
    let id = conn.last_insert_rowid() as CompetitorId;
    debug!(id, name, "created competitor");
    Ok(Competitor::new(id, name))
}

pub fn competitor_by_name(conn: &Connection, name: &str) -> Result<Option<Competitor>> {
    let mut stmt = conn
        .prepare(&format!(
            "{COMPETITOR_SELECT} WHERE LOWER(name) = LOWER(?1)"
        ))
        .context("prepare competitor-by-name query")?;
    let mut rows = stmt
        .query_map(params![name], row_to_competitor)
        .context("query competitor by name")?;
    rows.next().transpose().context("decode competitor row")
}

pub fn competitor_by_id(conn: &Connection, id: CompetitorId) -> Result<Option<Competitor>> {
    let mut stmt = conn
        .prepare(&format!("{COMPETITOR_SELECT} WHERE competitor_id = ?1"))
        .context("prepare competitor-by-id query")?;
    let mut rows = stmt
        .query_map(params![id as i64], row_to_competitor)
        .context("query competitor by id")?;
    rows.next().transpose().context("decode competitor row")
}

pub fn all_competitors(conn: &Connection) -> Result<Vec<Competitor>> {
    let mut stmt = conn
        .prepare(&format!("{COMPETITOR_SELECT} ORDER BY competitor_id ASC"))
        .context("prepare all-competitors query")?;
    let rows = stmt
        .query_map([], row_to_competitor)
        .context("query all competitors")?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("decode competitor row")?);
    }
    Ok(out)
}

/// Write back one competitor's recomputed aggregates. A single UPDATE, so
/// the swap is all-or-nothing per competitor; readers never observe a
/// half-recomputed row.
pub fn save_aggregates(conn: &Connection, competitor: &Competitor) -> Result<()> {
    conn.execute(
        r#"
        UPDATE competitors SET
            total_bouts = ?1,
            wins = ?2,
            losses = ?3,
            draws = ?4,
            win_percentage = ?5,
            ko_tko_wins = ?6,
            submission_wins = ?7,
            decision_wins = ?8,
            avg_bout_duration_secs = ?9,
            updated_at = ?10
        WHERE competitor_id = ?11
        "#,
        params![
            competitor.total_bouts as i64,
            competitor.wins as i64,
            competitor.losses as i64,
            competitor.draws as i64,
            competitor.win_percentage,
            competitor.ko_tko_wins as i64,
            competitor.submission_wins as i64,
            competitor.decision_wins as i64,
            competitor.avg_bout_duration_secs,
            Utc::now().to_rfc3339(),
            competitor.id as i64,
        ],
    )
    .with_context(|| format!("save aggregates for competitor {}", competitor.id))?;
    Ok(())
}

/// Insert a bout record; the store assigns the id. The `id` field of the
/// passed bout is ignored.
pub fn insert_bout(conn: &Connection, bout: &Bout) -> Result<BoutId> {
    conn.execute(
        r#"
        INSERT INTO bouts (
            first_id, second_id, date, result, finish_method, finish_round,
            duration_secs, first_odds, second_odds,
            first_sig_strikes, second_sig_strikes,
            first_takedowns, second_takedowns, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
        "#,
        params![
            bout.first_id as i64,
            bout.second_id as i64,
            bout.date.to_string(),
            bout.result.map(result_to_str),
            bout.finish_method,
            bout.finish_round,
            bout.duration_secs,
            bout.first_odds,
            bout.second_odds,
            bout.first_sig_strikes,
            bout.second_sig_strikes,
            bout.first_takedowns,
            bout.second_takedowns,
            Utc::now().to_rfc3339(),
        ],
    )
    .context("insert bout")?;
    Ok(conn.last_insert_rowid() as BoutId)
}

/// All bouts in insertion order. Deduplication precedence depends on this
/// ordering, so it is rowid, not date.
pub fn load_bouts_import_order(conn: &Connection) -> Result<Vec<Bout>> {
    load_bouts_where(conn, "ORDER BY bout_id ASC", [])
}

pub fn load_bouts_by_date(conn: &Connection) -> Result<Vec<Bout>> {
    load_bouts_where(conn, "ORDER BY date ASC, bout_id ASC", [])
}

/// Most recent bouts carrying both corners' odds: the candidate set for
/// value detection.
pub fn bouts_with_odds(conn: &Connection, limit: usize) -> Result<Vec<Bout>> {
    load_bouts_where(
        conn,
        "WHERE first_odds IS NOT NULL AND second_odds IS NOT NULL \
         ORDER BY date DESC, bout_id DESC LIMIT ?1",
        params![limit as i64],
    )
}

fn load_bouts_where(
    conn: &Connection,
    tail: &str,
    bind: impl rusqlite::Params,
) -> Result<Vec<Bout>> {
    let sql = format!("{BOUT_SELECT} {tail}");
    let mut stmt = conn.prepare(&sql).context("prepare bout query")?;
    let rows = stmt.query_map(bind, row_to_bout).context("query bouts")?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("decode bout row")?);
    }
    debug!(count = out.len(), "loaded bouts");
    Ok(out)
}

/// Delete duplicate bout records flagged by the deduplication engine.
pub fn retire_bouts(conn: &mut Connection, ids: &[BoutId]) -> Result<usize> {
    if ids.is_empty() {
        return Ok(0);
    }
    let tx = conn.transaction().context("begin retire transaction")?;
    let mut deleted = 0usize;
    {
        let mut stmt = tx
            .prepare("DELETE FROM bouts WHERE bout_id = ?1")
            .context("prepare retire statement")?;
        for id in ids {
            deleted += stmt
                .execute(params![*id as i64])
                .with_context(|| format!("retire bout {id}"))?;
        }
    }
    tx.commit().context("commit retire transaction")?;
    info!(deleted, "retired duplicate bouts");
    Ok(deleted)
}

const COMPETITOR_SELECT: &str = r#"
    SELECT
        competitor_id, name, total_bouts, wins, losses, draws,
        win_percentage, ko_tko_wins, submission_wins, decision_wins,
        avg_bout_duration_secs
    FROM competitors
"#;

const BOUT_SELECT: &str = r#"
    SELECT
        bout_id, first_id, second_id, date, result, finish_method,
        finish_round, duration_secs, first_odds, second_odds,
        first_sig_strikes, second_sig_strikes,
        first_takedowns, second_takedowns
    FROM bouts
"#;

fn row_to_competitor(row: &Row<'_>) -> rusqlite::Result<Competitor> {
    Ok(Competitor {
        id: row.get::<_, u32>(0)?,
        name: row.get(1)?,
        total_bouts: row.get(2)?,
        wins: row.get(3)?,
        losses: row.get(4)?,
        draws: row.get(5)?,
        win_percentage: row.get(6)?,
        ko_tko_wins: row.get(7)?,
        submission_wins: row.get(8)?,
        decision_wins: row.get(9)?,
        avg_bout_duration_secs: row.get(10)?,
    })
}

fn row_to_bout(row: &Row<'_>) -> rusqlite::Result<Bout> {
    let raw_date: String = row.get(3)?;
    let date = raw_date.parse::<NaiveDate>().map_err(|err| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(err))
    })?;
    let result = row
        .get::<_, Option<String>>(4)?
        .as_deref()
        .and_then(parse_result);
    Ok(Bout {
        id: row.get::<_, u64>(0)?,
        first_id: row.get::<_, u32>(1)?,
        second_id: row.get::<_, u32>(2)?,
        date,
        result,
        finish_method: row.get(5)?,
        finish_round: row.get(6)?,
        duration_secs: row.get(7)?,
        first_odds: row.get(8)?,
        second_odds: row.get(9)?,
        first_sig_strikes: row.get(10)?,
        second_sig_strikes: row.get(11)?,
        first_takedowns: row.get(12)?,
        second_takedowns: row.get(13)?,
    })
}

fn result_to_str(result: BoutResult) -> &'static str {
    match result {
        BoutResult::FirstCorner => "first",
        BoutResult::SecondCorner => "second",
        BoutResult::Draw => "draw",
    }
}

fn parse_result(raw: &str) -> Option<BoutResult> {
    match raw {
        "first" => Some(BoutResult::FirstCorner),
        "second" => Some(BoutResult::SecondCorner),
        "draw" => Some(BoutResult::Draw),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mem_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    fn bout(first: CompetitorId, second: CompetitorId, date: &str) -> Bout {
        Bout {
            id: 0,
            first_id: first,
            second_id: second,
            date: date.parse().unwrap(),
            result: Some(BoutResult::FirstCorner),
            finish_method: Some("KO".to_string()),
            finish_round: Some(1),
            duration_secs: Some(187.0),
            first_odds: Some(-150.0),
            second_odds: Some(130.0),
            first_sig_strikes: Some(44),
            second_sig_strikes: Some(19),
            first_takedowns: Some(2),
            second_takedowns: Some(0),
        }
    }

    #[test]
    fn competitor_lookup_is_case_insensitive() {
        let conn = mem_db();
        let created = get_or_create_competitor(&conn, "Jon Jones").unwrap();
        let again = get_or_create_competitor(&conn, "jon jones").unwrap();
        assert_eq!(created.id, again.id);
        assert!(competitor_by_name(&conn, "JON JONES").unwrap().is_some());
        assert!(competitor_by_name(&conn, "nobody").unwrap().is_none());

        let by_id = competitor_by_id(&conn, created.id).unwrap().unwrap();
        assert_eq!(by_id.name, "Jon Jones");
        assert!(competitor_by_id(&conn, 9999).unwrap().is_none());
    }

    #[test]
    fn bout_round_trips_through_sqlite() {
        let conn = mem_db();
        let a = get_or_create_competitor(&conn, "A").unwrap();
        let b = get_or_create_competitor(&conn, "B").unwrap();
        let id = insert_bout(&conn, &bout(a.id, b.id, "2024-03-09")).unwrap();

        let loaded = load_bouts_import_order(&conn).unwrap();
        assert_eq!(loaded.len(), 1);
        let got = &loaded[0];
        assert_eq!(got.id, id);
        assert_eq!(got.date.to_string(), "2024-03-09");
        assert_eq!(got.result, Some(BoutResult::FirstCorner));
        assert_eq!(got.finish_method.as_deref(), Some("KO"));
        assert_eq!(got.first_odds, Some(-150.0));
        assert_eq!(got.second_takedowns, Some(0));
    }

    #[test]
    fn open_db_creates_missing_parent_directories() {
        let root = std::env::temp_dir().join(format!("fightbook-store-{}", std::process::id()));
        let path = root.join("nested").join("bouts.sqlite");
        let conn = open_db(&path).unwrap();
        let a = get_or_create_competitor(&conn, "A").unwrap();
        assert_eq!(competitor_by_id(&conn, a.id).unwrap().unwrap().name, "A");
        drop(conn);
        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn bouts_with_odds_respects_bound_limit() {
        let conn = mem_db();
        let a = get_or_create_competitor(&conn, "A").unwrap();
        let b = get_or_create_competitor(&conn, "B").unwrap();
        insert_bout(&conn, &bout(a.id, b.id, "2024-01-01")).unwrap();
        let mid = insert_bout(&conn, &bout(a.id, b.id, "2024-02-01")).unwrap();
        let newest = insert_bout(&conn, &bout(a.id, b.id, "2024-03-01")).unwrap();
        let mut unpriced = bout(a.id, b.id, "2024-04-01");
        unpriced.first_odds = None;
        unpriced.second_odds = None;
        insert_bout(&conn, &unpriced).unwrap();

        let candidates = bouts_with_odds(&conn, 2).unwrap();
        assert_eq!(
            candidates.iter().map(|b| b.id).collect::<Vec<_>>(),
            vec![newest, mid]
        );
    }

    #[test]
    fn import_order_is_rowid_not_date() {
        let conn = mem_db();
        let a = get_or_create_competitor(&conn, "A").unwrap();
        let b = get_or_create_competitor(&conn, "B").unwrap();
        let c = get_or_create_competitor(&conn, "C").unwrap();
        let late = insert_bout(&conn, &bout(a.id, b.id, "2024-06-01")).unwrap();
        let early = insert_bout(&conn, &bout(a.id, c.id, "2023-01-01")).unwrap();

        let import = load_bouts_import_order(&conn).unwrap();
        assert_eq!(import.iter().map(|b| b.id).collect::<Vec<_>>(), vec![late, early]);

        let by_date = load_bouts_by_date(&conn).unwrap();
        assert_eq!(by_date.iter().map(|b| b.id).collect::<Vec<_>>(), vec![early, late]);
    }

    #[test]
    fn retire_deletes_only_flagged_rows() {
        let mut conn = mem_db();
        let a = get_or_create_competitor(&conn, "A").unwrap();
        let b = get_or_create_competitor(&conn, "B").unwrap();
        let keep = insert_bout(&conn, &bout(a.id, b.id, "2024-03-09")).unwrap();
        let dup = insert_bout(&conn, &bout(a.id, b.id, "2024-03-09")).unwrap();

        let deleted = retire_bouts(&mut conn, &[dup]).unwrap();
        assert_eq!(deleted, 1);
        let left = load_bouts_import_order(&conn).unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id, keep);
    }
}
