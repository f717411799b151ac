use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub type CompetitorId = u32;
pub type BoutId = u64;

/// Side of a bout. "First"/"second" rather than red/blue so the data model
/// carries no presentation bias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Corner {
    First,
    Second,
}

impl Corner {
    pub fn label(self) -> &'static str {
        match self {
            Corner::First => "first",
            Corner::Second => "second",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoutResult {
    FirstCorner,
    SecondCorner,
    Draw,
}

impl BoutResult {
    pub fn winning_corner(self) -> Option<Corner> {
        match self {
            BoutResult::FirstCorner => Some(Corner::First),
            BoutResult::SecondCorner => Some(Corner::Second),
            BoutResult::Draw => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinishCategory {
    Knockout,
    Submission,
    Decision,
}

impl FinishCategory {
    pub fn label(self) -> &'static str {
        match self {
            FinishCategory::Knockout => "KO/TKO",
            FinishCategory::Submission => "Submission",
            FinishCategory::Decision => "Decision",
        }
    }
}

/// Competitor identity plus derived career aggregates. Every field below
/// `name` is a pure function of the canonical bout set and is replaced
/// wholesale by `aggregate::recompute`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Competitor {
    pub id: CompetitorId,
    pub name: String,
    pub total_bouts: u32,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub win_percentage: f64,
    pub ko_tko_wins: u32,
    pub submission_wins: u32,
    pub decision_wins: u32,
    pub avg_bout_duration_secs: f64,
}

impl Competitor {
    pub fn new(id: CompetitorId, name: impl Into<String>) -> Self {
        Competitor {
            id,
            name: name.into(),
            ..Competitor::default()
        }
    }
}

/// Immutable bout fact. `result == None` means the outcome is unknown or
/// the bout has not happened yet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bout {
    pub id: BoutId,
    pub first_id: CompetitorId,
    pub second_id: CompetitorId,
    pub date: NaiveDate,
    pub result: Option<BoutResult>,
    pub finish_method: Option<String>,
    pub finish_round: Option<u32>,
    pub duration_secs: Option<f64>,
    pub first_odds: Option<f64>,
    pub second_odds: Option<f64>,
    pub first_sig_strikes: Option<u32>,
    pub second_sig_strikes: Option<u32>,
    pub first_takedowns: Option<u32>,
    pub second_takedowns: Option<u32>,
}

/// Unordered competitor pair plus date. At most one bout per key survives
/// deduplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoutKey {
    pub pair: (CompetitorId, CompetitorId),
    pub date: NaiveDate,
}

impl Bout {
    pub fn canonical_key(&self) -> BoutKey {
        let pair = if self.first_id <= self.second_id {
            (self.first_id, self.second_id)
        } else {
            (self.second_id, self.first_id)
        };
        BoutKey {
            pair,
            date: self.date,
        }
    }

    pub fn involves(&self, id: CompetitorId) -> bool {
        self.first_id == id || self.second_id == id
    }

    pub fn corner_of(&self, id: CompetitorId) -> Option<Corner> {
        if self.first_id == id {
            Some(Corner::First)
        } else if self.second_id == id {
            Some(Corner::Second)
        } else {
            None
        }
    }

    pub fn odds_for(&self, corner: Corner) -> Option<f64> {
        match corner {
            Corner::First => self.first_odds,
            Corner::Second => self.second_odds,
        }
    }

    /// True when `id` fought in this bout and its corner took the win.
    pub fn won_by(&self, id: CompetitorId) -> bool {
        let Some(corner) = self.corner_of(id) else {
            return false;
        };
        self.result.and_then(BoutResult::winning_corner) == Some(corner)
    }
}
