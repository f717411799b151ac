use std::collections::HashMap;

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Serialize;

use crate::features;
use crate::model::{Bout, BoutId, Competitor, CompetitorId, Corner};
use crate::odds::odds_to_probability;
use crate::predict::{self, Prediction};

/// A bout where the modeled win probability of one corner beats the
/// market-implied probability by at least the requested margin.
#[derive(Debug, Clone, Serialize)]
pub struct Opportunity {
    pub bout_id: BoutId,
    pub first_name: String,
    pub second_name: String,
    pub date: NaiveDate,
    pub recommended: Corner,
    pub odds: f64,
    pub predicted_probability: f64,
    pub value_percentage: f64,
}

/// Scan candidate bouts for betting value and rank the hits.
///
/// Only bouts carrying both corners' odds are scored; bouts referencing a
/// competitor missing from the snapshot are skipped. Selection per bout is
/// mutually exclusive and order-dependent: the first corner is checked
/// before the second and a bout never yields two opportunities. Scoring
/// runs in parallel; the final sort is the single synchronization point,
/// so concurrent execution order never shows in the output.
pub fn find_value(
    candidates: &[Bout],
    competitors: &HashMap<CompetitorId, Competitor>,
    canonical: &[Bout],
    min_value_pct: f64,
    limit: usize,
) -> Vec<Opportunity> {
    let mut opportunities: Vec<Opportunity> = candidates
        .par_iter()
        .filter_map(|bout| evaluate_bout(bout, competitors, canonical, min_value_pct))
        .collect();

    opportunities.sort_by(|a, b| b.value_percentage.total_cmp(&a.value_percentage));
    opportunities.truncate(limit);
    opportunities
}

fn evaluate_bout(
    bout: &Bout,
    competitors: &HashMap<CompetitorId, Competitor>,
    canonical: &[Bout],
    min_value_pct: f64,
) -> Option<Opportunity> {
    let first_odds = bout.odds_for(Corner::First)?;
    let second_odds = bout.odds_for(Corner::Second)?;
    let first = competitors.get(&bout.first_id)?;
    let second = competitors.get(&bout.second_id)?;

    let features = features::extract(first, second, canonical);
    let prediction = predict::score_matchup(&features, first, second);

    let first_value = prediction.first_win_probability - odds_to_probability(first_odds);
    let second_value = prediction.second_win_probability - odds_to_probability(second_odds);

    if first_value * 100.0 >= min_value_pct {
        Some(opportunity(
            bout,
            &prediction,
            Corner::First,
            first_odds,
            first_value,
        ))
    } else if second_value * 100.0 >= min_value_pct {
        Some(opportunity(
            bout,
            &prediction,
            Corner::Second,
            second_odds,
            second_value,
        ))
    } else {
        None
    }
}

fn opportunity(
    bout: &Bout,
    prediction: &Prediction,
    corner: Corner,
    odds: f64,
    value: f64,
) -> Opportunity {
    let predicted_probability = match corner {
        Corner::First => prediction.first_win_probability,
        Corner::Second => prediction.second_win_probability,
    };
    Opportunity {
        bout_id: bout.id,
        first_name: prediction.first_name.clone(),
        second_name: prediction.second_name.clone(),
        date: bout.date,
        recommended: corner,
        odds,
        predicted_probability,
        value_percentage: value * 100.0,
    }
}
