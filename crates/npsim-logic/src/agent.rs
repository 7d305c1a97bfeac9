//! Agent: one simulated user and its per-step transition rule.
//!
//! Each step an agent's satisfaction drifts by one draw from {-1, 0, +1},
//! clamped to [0, 10]. NPS, comment and sentiment are then re-derived from
//! the new satisfaction alone; the previous NPS never feeds back.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Lowest satisfaction an agent can hold.
pub const MIN_SATISFACTION: u8 = 0;
/// Highest satisfaction an agent can hold.
pub const MAX_SATISFACTION: u8 = 10;

/// Every NPS value the transition rule can produce.
pub const NPS_VALUES: [u8; 5] = [2, 4, 6, 8, 10];

pub const POSITIVE_COMMENT: &str = "Great service!";
pub const NEUTRAL_COMMENT: &str = "I'm okay with the current state.";
pub const NEGATIVE_COMMENT: &str = "I'm not satisfied with the recent changes.";

/// Sentiment label attached to an agent's latest comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub fn all() -> &'static [Sentiment] {
        &[Sentiment::Positive, Sentiment::Neutral, Sentiment::Negative]
    }

    pub fn label(self) -> &'static str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Neutral => "Neutral",
            Sentiment::Negative => "Negative",
        }
    }
}

/// NPS value for a satisfaction level.
///
/// ≥9 → 10, 7–8 → 8, 5–6 → 6, 3–4 → 4, ≤2 → 2.
pub fn nps_bucket(satisfaction: u8) -> u8 {
    match satisfaction {
        9..=u8::MAX => 10,
        7..=8 => 8,
        5..=6 => 6,
        3..=4 => 4,
        _ => 2,
    }
}

/// Comment text and sentiment for a satisfaction level.
pub fn comment_for(satisfaction: u8) -> (&'static str, Sentiment) {
    match satisfaction {
        8..=u8::MAX => (POSITIVE_COMMENT, Sentiment::Positive),
        5..=7 => (NEUTRAL_COMMENT, Sentiment::Neutral),
        _ => (NEGATIVE_COMMENT, Sentiment::Negative),
    }
}

/// Draw one satisfaction fluctuation uniformly from {-1, 0, +1}.
pub fn draw_fluctuation(rng: &mut impl Rng) -> i8 {
    rng.gen_range(-1..=1)
}

/// One simulated user.
///
/// Group and persona are indices into the run's
/// [`PersonaCatalog`](crate::personas::PersonaCatalog); the agent refers to
/// catalog entries, it does not own them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Agent {
    pub id: usize,
    pub group: usize,
    pub persona: usize,
    satisfaction: u8,
    nps: u8,
    comment: &'static str,
    sentiment: Sentiment,
}

impl Agent {
    /// Create an agent. Satisfaction above 10 is clamped.
    pub fn new(id: usize, group: usize, persona: usize, satisfaction: u8, nps: u8) -> Self {
        Self {
            id,
            group,
            persona,
            satisfaction: satisfaction.min(MAX_SATISFACTION),
            nps,
            comment: "",
            sentiment: Sentiment::Neutral,
        }
    }

    pub fn satisfaction(&self) -> u8 {
        self.satisfaction
    }

    pub fn nps(&self) -> u8 {
        self.nps
    }

    /// Latest comment; empty until the first step.
    pub fn comment(&self) -> &'static str {
        self.comment
    }

    pub fn sentiment(&self) -> Sentiment {
        self.sentiment
    }

    /// Advance one step, consuming exactly one draw from `rng`.
    pub fn step(&mut self, rng: &mut impl Rng) {
        let delta = draw_fluctuation(rng);
        self.apply_fluctuation(delta);
    }

    /// Apply an already drawn fluctuation, then re-derive NPS and comment.
    pub fn apply_fluctuation(&mut self, delta: i8) {
        let next = (self.satisfaction as i16 + delta as i16)
            .clamp(MIN_SATISFACTION as i16, MAX_SATISFACTION as i16);
        self.satisfaction = next as u8;
        self.nps = nps_bucket(self.satisfaction);
        let (comment, sentiment) = comment_for(self.satisfaction);
        self.comment = comment;
        self.sentiment = sentiment;
    }
}
