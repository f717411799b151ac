use serde::Serialize;

use crate::features::FeatureVector;
use crate::model::{Competitor, Corner, FinishCategory};

const NEUTRAL_SCORE: f64 = 50.0;

// Maximum swing each feature can contribute, in score points.
const WIN_PCT_WEIGHT: f64 = 15.0;
const FORM_WEIGHT: f64 = 10.0;
const EXPERIENCE_WEIGHT: f64 = 5.0;
const FINISH_WEIGHT: f64 = 8.0;

// Experience differential saturates beyond this many bouts.
const EXPERIENCE_CAP: f64 = 10.0;

// Materiality thresholds for key-factor strings. Fixed, not configurable.
const WIN_PCT_FACTOR_MIN: f64 = 10.0;
const FORM_FACTOR_MIN: f64 = 0.2;
const EXPERIENCE_FACTOR_MIN: f64 = 5.0;
const FINISH_FACTOR_MIN: f64 = 50.0;

#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub first_name: String,
    pub second_name: String,
    pub predicted_winner: Corner,
    pub first_win_probability: f64,
    pub second_win_probability: f64,
    pub confidence_score: f64,
    pub predicted_method: FinishCategory,
    pub key_factors: Vec<String>,
    pub betting_recommendation: String,
}

/// Deterministic weighted-sum matchup model.
///
/// Both sides start at 50 and every feature impact is added to the first
/// side and mirrored on the second, so the score sum stays at 100 and the
/// individual scores stay positive under the bounded weights above. That
/// makes the probability normalization total: no zero denominator to guard.
pub fn score_matchup(
    features: &FeatureVector,
    first: &Competitor,
    second: &Competitor,
) -> Prediction {
    let win_pct_impact = (features.win_percentage_diff / 100.0) * WIN_PCT_WEIGHT;

    let form_diff = features.first.recent_form - features.second.recent_form;
    let form_impact = form_diff * FORM_WEIGHT;

    let experience_impact = (features.experience_diff.clamp(-EXPERIENCE_CAP, EXPERIENCE_CAP)
        / EXPERIENCE_CAP)
        * EXPERIENCE_WEIGHT;

    let first_finish_rate = features.first.ko_rate + features.first.sub_rate;
    let second_finish_rate = features.second.ko_rate + features.second.sub_rate;
    let finish_impact = ((first_finish_rate - second_finish_rate) / 100.0) * FINISH_WEIGHT;

    let swing = win_pct_impact + form_impact + experience_impact + finish_impact;
    let first_score = NEUTRAL_SCORE + swing;
    let second_score = NEUTRAL_SCORE - swing;

    let total = first_score + second_score;
    let first_prob = first_score / total;
    let second_prob = second_score / total;
    let confidence = (first_prob - second_prob).abs() * 100.0;

    let predicted_winner = if first_prob > second_prob {
        Corner::First
    } else {
        Corner::Second
    };
    let winner_name = match predicted_winner {
        Corner::First => &first.name,
        Corner::Second => &second.name,
    };

    let key_factors = key_factors(
        features,
        first,
        second,
        form_diff,
        first_finish_rate,
        second_finish_rate,
    );

    Prediction {
        first_name: first.name.clone(),
        second_name: second.name.clone(),
        predicted_winner,
        first_win_probability: first_prob,
        second_win_probability: second_prob,
        confidence_score: confidence,
        // Method call looks only at the first corner's finishing history.
        predicted_method: dominant_method(first),
        key_factors,
        betting_recommendation: betting_recommendation(winner_name, confidence),
    }
}

/// Most common win method of a single competitor: knockout family if it
/// leads outright, else submission if it beats decision, else decision.
pub fn dominant_method(competitor: &Competitor) -> FinishCategory {
    if competitor.ko_tko_wins > competitor.submission_wins
        && competitor.ko_tko_wins > competitor.decision_wins
    {
        FinishCategory::Knockout
    } else if competitor.submission_wins > competitor.decision_wins {
        FinishCategory::Submission
    } else {
        FinishCategory::Decision
    }
}

fn key_factors(
    features: &FeatureVector,
    first: &Competitor,
    second: &Competitor,
    form_diff: f64,
    first_finish_rate: f64,
    second_finish_rate: f64,
) -> Vec<String> {
    let mut factors = Vec::new();

    if features.win_percentage_diff.abs() > WIN_PCT_FACTOR_MIN {
        if features.win_percentage_diff > 0.0 {
            factors.push(format!(
                "{} has superior win rate (+{:.1}%)",
                first.name, features.win_percentage_diff
            ));
        } else {
            factors.push(format!(
                "{} has superior win rate (+{:.1}%)",
                second.name,
                features.win_percentage_diff.abs()
            ));
        }
    }

    if form_diff.abs() > FORM_FACTOR_MIN {
        let name = if form_diff > 0.0 {
            &first.name
        } else {
            &second.name
        };
        factors.push(format!("{name} in better recent form"));
    }

    if features.experience_diff.abs() > EXPERIENCE_FACTOR_MIN {
        let name = if features.experience_diff > 0.0 {
            &first.name
        } else {
            &second.name
        };
        factors.push(format!("{name} has more experience"));
    }

    if first_finish_rate > FINISH_FACTOR_MIN || second_finish_rate > FINISH_FACTOR_MIN {
        if first_finish_rate > second_finish_rate {
            factors.push(format!(
                "{} has higher finish rate ({:.1}%)",
                first.name, first_finish_rate
            ));
        } else {
            factors.push(format!(
                "{} has higher finish rate ({:.1}%)",
                second.name, second_finish_rate
            ));
        }
    }

    factors
}

fn betting_recommendation(winner_name: &str, confidence: f64) -> String {
    if confidence < 10.0 {
        "Too close to call - avoid betting".to_string()
    } else if confidence < 20.0 {
        "Low confidence - small bet only".to_string()
    } else if confidence < 30.0 {
        "Moderate confidence - reasonable bet".to_string()
    } else {
        format!("High confidence - strong bet on {winner_name}")
    }
}
