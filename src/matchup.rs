use serde::Serialize;

use crate::features;
use crate::model::{Bout, Competitor};
use crate::predict::{self, Prediction};

#[derive(Debug, Clone, Serialize)]
pub struct HeadToHead {
    pub first: Competitor,
    pub second: Competitor,
    pub previous_matchups: Vec<Bout>,
    pub first_advantages: Vec<String>,
    pub second_advantages: Vec<String>,
    pub prediction: Prediction,
}

/// Side-by-side comparison of two competitors over the same snapshot:
/// their shared history (newest first), plain-language advantages per side
/// and the model's call on the matchup.
pub fn head_to_head(first: &Competitor, second: &Competitor, canonical: &[Bout]) -> HeadToHead {
    let mut previous: Vec<Bout> = canonical
        .iter()
        .filter(|b| b.involves(first.id) && b.involves(second.id))
        .cloned()
        .collect();
    previous.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));

    let (first_advantages, second_advantages) = advantages(first, second);

    let features = features::extract(first, second, canonical);
    let prediction = predict::score_matchup(&features, first, second);

    HeadToHead {
        first: first.clone(),
        second: second.clone(),
        previous_matchups: previous,
        first_advantages,
        second_advantages,
        prediction,
    }
}

fn advantages(first: &Competitor, second: &Competitor) -> (Vec<String>, Vec<String>) {
    let mut first_adv = Vec::new();
    let mut second_adv = Vec::new();

    if first.win_percentage > second.win_percentage {
        let diff = first.win_percentage - second.win_percentage;
        first_adv.push(format!("Higher win percentage (+{diff:.1}%)"));
    } else {
        let diff = second.win_percentage - first.win_percentage;
        second_adv.push(format!("Higher win percentage (+{diff:.1}%)"));
    }

    if first.ko_tko_wins > second.ko_tko_wins {
        first_adv.push(format!(
            "More knockout power ({} KO/TKO wins)",
            first.ko_tko_wins
        ));
    } else if second.ko_tko_wins > first.ko_tko_wins {
        second_adv.push(format!(
            "More knockout power ({} KO/TKO wins)",
            second.ko_tko_wins
        ));
    }

    if first.submission_wins > second.submission_wins {
        first_adv.push(format!(
            "Superior grappling ({} submission wins)",
            first.submission_wins
        ));
    } else if second.submission_wins > first.submission_wins {
        second_adv.push(format!(
            "Superior grappling ({} submission wins)",
            second.submission_wins
        ));
    }

    if first.total_bouts > second.total_bouts {
        first_adv.push(format!("More experience ({} bouts)", first.total_bouts));
    } else if second.total_bouts > first.total_bouts {
        second_adv.push(format!("More experience ({} bouts)", second.total_bouts));
    }

    (first_adv, second_adv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BoutResult;

    fn competitor(id: u32, name: &str, total: u32, wins: u32, ko: u32, sub: u32) -> Competitor {
        Competitor {
            total_bouts: total,
            wins,
            losses: total - wins,
            win_percentage: if total > 0 {
                wins as f64 / total as f64 * 100.0
            } else {
                0.0
            },
            ko_tko_wins: ko,
            submission_wins: sub,
            ..Competitor::new(id, name)
        }
    }

    fn shared_bout(id: u64, first: u32, second: u32, date: &str) -> Bout {
        Bout {
            id,
            first_id: first,
            second_id: second,
            date: date.parse().unwrap(),
            result: Some(BoutResult::FirstCorner),
            finish_method: Some("Decision".to_string()),
            finish_round: Some(3),
            duration_secs: Some(900.0),
            first_odds: None,
            second_odds: None,
            first_sig_strikes: None,
            second_sig_strikes: None,
            first_takedowns: None,
            second_takedowns: None,
        }
    }

    #[test]
    fn shared_history_is_newest_first() {
        let a = competitor(1, "A", 12, 8, 3, 2);
        let b = competitor(2, "B", 10, 5, 4, 0);
        let canonical = vec![
            shared_bout(1, 1, 2, "2021-07-10"),
            shared_bout(2, 1, 3, "2022-01-01"),
            shared_bout(3, 2, 1, "2023-04-08"),
        ];
        let h2h = head_to_head(&a, &b, &canonical);
        assert_eq!(
            h2h.previous_matchups.iter().map(|b| b.id).collect::<Vec<_>>(),
            vec![3, 1]
        );
    }

    #[test]
    fn advantages_split_between_sides() {
        let a = competitor(1, "A", 12, 8, 3, 2);
        let b = competitor(2, "B", 10, 5, 4, 0);
        let h2h = head_to_head(&a, &b, &[]);
        assert!(h2h
            .first_advantages
            .iter()
            .any(|s| s.contains("win percentage")));
        assert!(h2h.first_advantages.iter().any(|s| s.contains("grappling")));
        assert!(h2h.first_advantages.iter().any(|s| s.contains("experience")));
        assert!(h2h
            .second_advantages
            .iter()
            .any(|s| s.contains("knockout power")));
        assert!((h2h.prediction.first_win_probability
            + h2h.prediction.second_win_probability
            - 1.0)
            .abs()
            < 1e-12);
    }
}
