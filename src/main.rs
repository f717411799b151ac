use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use rayon::prelude::*;
use tracing_subscriber::EnvFilter;

use fightbook::error::CoreError;
use fightbook::model::{Bout, Competitor, Corner};
use fightbook::{aggregate, dedupe, matchup, store, value};

const DEFAULT_DB_FILE: &str = "fightbook.sqlite";
const DEFAULT_MIN_VALUE_PCT: f64 = 5.0;
const DEFAULT_LIMIT: usize = 10;
const DEFAULT_CANDIDATES: usize = 50;

struct Options {
    db_path: PathBuf,
    min_value_pct: f64,
    limit: usize,
    candidates: usize,
    predict: Option<(String, String)>,
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let opts = parse_options()?;
    let mut conn = store::open_db(&opts.db_path)?;

    // Refresh the canonical bout set and every competitor's aggregates
    // before answering anything.
    let all_bouts = store::load_bouts_import_order(&conn)?;
    let outcome = dedupe::dedupe_bouts(&all_bouts);
    if !outcome.duplicates.is_empty() {
        store::retire_bouts(&mut conn, &outcome.duplicates)?;
    }
    let canonical = outcome.canonical;

    let competitors = store::all_competitors(&conn)?;
    let updated: Vec<Competitor> = competitors
        .par_iter()
        .map(|c| aggregate::recompute(c, &canonical))
        .collect();
    for competitor in &updated {
        store::save_aggregates(&conn, competitor)?;
    }

    // In JSON mode the report is the whole of stdout.
    if !opts.json {
        println!(
            "Snapshot: {} canonical bouts ({} duplicates retired), {} competitors",
            canonical.len(),
            outcome.duplicates.len(),
            updated.len()
        );
    }

    match &opts.predict {
        Some((first_name, second_name)) => {
            print_prediction(&conn, first_name, second_name, &canonical, opts.json)
        }
        None => print_value_scan(&conn, &updated, &canonical, &opts),
    }
}

fn print_prediction(
    conn: &rusqlite::Connection,
    first_name: &str,
    second_name: &str,
    canonical: &[Bout],
    json: bool,
) -> Result<()> {
    let first = store::competitor_by_name(conn, first_name)?
        .ok_or_else(|| CoreError::NotFound(format!("competitor '{first_name}'")))?;
    let second = store::competitor_by_name(conn, second_name)?
        .ok_or_else(|| CoreError::NotFound(format!("competitor '{second_name}'")))?;

    let h2h = matchup::head_to_head(&first, &second, canonical);
    if json {
        println!("{}", serde_json::to_string_pretty(&h2h)?);
        return Ok(());
    }
    let p = &h2h.prediction;

    println!();
    println!("{} vs {}", first.name, second.name);
    println!(
        "Records: {}-{}-{} vs {}-{}-{}",
        first.wins, first.losses, first.draws, second.wins, second.losses, second.draws
    );
    if !h2h.previous_matchups.is_empty() {
        println!("Previous meetings: {}", h2h.previous_matchups.len());
    }
    for adv in &h2h.first_advantages {
        println!("  [{}] {}", first.name, adv);
    }
    for adv in &h2h.second_advantages {
        println!("  [{}] {}", second.name, adv);
    }

    let winner_name = match p.predicted_winner {
        Corner::First => &p.first_name,
        Corner::Second => &p.second_name,
    };
    println!();
    println!(
        "Predicted winner: {winner_name} ({} corner)",
        p.predicted_winner.label()
    );
    println!(
        "Win probability: {:.1}% / {:.1}%",
        p.first_win_probability * 100.0,
        p.second_win_probability * 100.0
    );
    println!("Confidence: {:.1}", p.confidence_score);
    println!("Predicted method: {}", p.predicted_method.label());
    for factor in &p.key_factors {
        println!("  - {factor}");
    }
    println!("Recommendation: {}", p.betting_recommendation);
    Ok(())
}

fn print_value_scan(
    conn: &rusqlite::Connection,
    competitors: &[Competitor],
    canonical: &[Bout],
    opts: &Options,
) -> Result<()> {
    let candidates = store::bouts_with_odds(conn, opts.candidates)?;
    let by_id: HashMap<_, _> = competitors.iter().map(|c| (c.id, c.clone())).collect();
    let opportunities = value::find_value(
        &candidates,
        &by_id,
        canonical,
        opts.min_value_pct,
        opts.limit,
    );

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&opportunities)?);
        return Ok(());
    }

    println!();
    if opportunities.is_empty() {
        println!(
            "No value found among {} candidate bouts (min {:.1}%)",
            candidates.len(),
            opts.min_value_pct
        );
        return Ok(());
    }

    println!(
        "Value opportunities (min {:.1}%, top {}):",
        opts.min_value_pct, opts.limit
    );
    for opp in &opportunities {
        let side_name = match opp.recommended {
            Corner::First => &opp.first_name,
            Corner::Second => &opp.second_name,
        };
        println!(
            "  {} | {} vs {} | bet {} ({} corner) at {:+.0} | model {:.1}% | value {:.1}%",
            opp.date,
            opp.first_name,
            opp.second_name,
            side_name,
            opp.recommended.label(),
            opp.odds,
            opp.predicted_probability * 100.0,
            opp.value_percentage
        );
    }
    Ok(())
}

fn parse_options() -> Result<Options> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let mut opts = Options {
        db_path: default_db_path(),
        min_value_pct: DEFAULT_MIN_VALUE_PCT,
        limit: DEFAULT_LIMIT,
        candidates: DEFAULT_CANDIDATES,
        predict: None,
        json: false,
    };

    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "--db" => {
                let next = args
                    .get(idx + 1)
                    .ok_or_else(|| anyhow!("--db requires a path"))?;
                opts.db_path = PathBuf::from(next);
                idx += 2;
            }
            "--min-value" => {
                let next = args
                    .get(idx + 1)
                    .ok_or_else(|| anyhow!("--min-value requires a number"))?;
                opts.min_value_pct = next.parse().context("parse --min-value")?;
                idx += 2;
            }
            "--limit" => {
                let next = args
                    .get(idx + 1)
                    .ok_or_else(|| anyhow!("--limit requires a number"))?;
                opts.limit = next.parse().context("parse --limit")?;
                idx += 2;
            }
            "--candidates" => {
                let next = args
                    .get(idx + 1)
                    .ok_or_else(|| anyhow!("--candidates requires a number"))?;
                opts.candidates = next.parse().context("parse --candidates")?;
                idx += 2;
            }
            "--json" => {
                opts.json = true;
                idx += 1;
            }
            "--predict" => {
                let first = args
                    .get(idx + 1)
                    .ok_or_else(|| anyhow!("--predict requires two names"))?;
                let second = args
                    .get(idx + 2)
                    .ok_or_else(|| anyhow!("--predict requires two names"))?;
                opts.predict = Some((first.clone(), second.clone()));
                idx += 3;
            }
            other if other.starts_with("--db=") => {
                opts.db_path = PathBuf::from(other.trim_start_matches("--db="));
                idx += 1;
            }
            other => {
                return Err(anyhow!("unknown argument: {other}"));
            }
        }
    }
    Ok(opts)
}

fn default_db_path() -> PathBuf {
    if let Ok(path) = std::env::var("FIGHTBOOK_DB")
        && !path.trim().is_empty()
    {
        return PathBuf::from(path);
    }
    PathBuf::from(DEFAULT_DB_FILE)
}
