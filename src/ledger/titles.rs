//! Superlative titles.
//!
//! Six titles, each held by every player tied for the extreme value of one
//! statistic. Computed in two passes: reduce to the extreme, then collect
//! everyone equal to it. The board is always rebuilt from scratch.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::PlayerStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Title {
    King,
    Jester,
    Fool,
    Addict,
    Coward,
    Capitalist,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Extreme {
    Max,
    Min,
}

impl Title {
    pub const ALL: &'static [Title] = &[
        Title::King,
        Title::Jester,
        Title::Fool,
        Title::Addict,
        Title::Coward,
        Title::Capitalist,
    ];

    /// Plural heading, e.g. "Kings (most wins)".
    pub fn heading(&self) -> &'static str {
        match self {
            Title::King => "Kings (most wins)",
            Title::Jester => "Jesters (most losses)",
            Title::Fool => "Fools (biggest loss)",
            Title::Addict => "Addicts (most bets)",
            Title::Coward => "Cowards (least bets)",
            Title::Capitalist => "Capitalists (top PnL)",
        }
    }

    fn metric(&self, p: &PlayerStats) -> f64 {
        match self {
            Title::King => p.total_wins as f64,
            Title::Jester => p.total_losses as f64,
            Title::Fool => p.greatest_loss,
            Title::Addict | Title::Coward => p.bet_count as f64,
            Title::Capitalist => p.cumulative_pnl,
        }
    }

    fn extreme(&self) -> Extreme {
        match self {
            Title::Fool | Title::Coward => Extreme::Min,
            _ => Extreme::Max,
        }
    }
}

impl fmt::Display for Title {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Title::King => write!(f, "king"),
            Title::Jester => write!(f, "jester"),
            Title::Fool => write!(f, "fool"),
            Title::Addict => write!(f, "addict"),
            Title::Coward => write!(f, "coward"),
            Title::Capitalist => write!(f, "capitalist"),
        }
    }
}

/// A player holding a title, by id and the name shown for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleHolder {
    pub id: String,
    pub display_name: String,
}

impl From<&PlayerStats> for TitleHolder {
    fn from(p: &PlayerStats) -> Self {
        Self {
            id: p.id.clone(),
            display_name: p.display_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TitleBoard {
    pub kings: Vec<TitleHolder>,
    pub jesters: Vec<TitleHolder>,
    pub fools: Vec<TitleHolder>,
    pub addicts: Vec<TitleHolder>,
    pub cowards: Vec<TitleHolder>,
    pub capitalists: Vec<TitleHolder>,
}

impl TitleBoard {
    /// Build the board for a snapshot of players. Empty input gives an
    /// empty board.
    pub fn recompute(players: &[PlayerStats]) -> Self {
        Self {
            kings: ties(players, Title::King),
            jesters: ties(players, Title::Jester),
            fools: ties(players, Title::Fool),
            addicts: ties(players, Title::Addict),
            cowards: ties(players, Title::Coward),
            capitalists: ties(players, Title::Capitalist),
        }
    }

    pub fn holders(&self, title: Title) -> &[TitleHolder] {
        match title {
            Title::King => &self.kings,
            Title::Jester => &self.jesters,
            Title::Fool => &self.fools,
            Title::Addict => &self.addicts,
            Title::Coward => &self.cowards,
            Title::Capitalist => &self.capitalists,
        }
    }

    /// Titles currently held by one player.
    pub fn titles_of(&self, player_id: &str) -> Vec<Title> {
        Title::ALL
            .iter()
            .copied()
            .filter(|t| self.holders(*t).iter().any(|h| h.id == player_id))
            .collect()
    }
}

fn ties(players: &[PlayerStats], title: Title) -> Vec<TitleHolder> {
    let values = players.iter().map(|p| title.metric(p));
    let best = match title.extreme() {
        Extreme::Max => values.reduce(f64::max),
        Extreme::Min => values.reduce(f64::min),
    };
    let Some(best) = best else {
        return Vec::new();
    };
    players
        .iter()
        .filter(|p| title.metric(p) == best)
        .map(TitleHolder::from)
        .collect()
}

impl fmt::Display for TitleBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Titles (ties allowed):")?;
        for title in Title::ALL {
            let holders = self.holders(*title);
            let names = if holders.is_empty() {
                "None".to_string()
            } else {
                holders
                    .iter()
                    .map(|h| h.display_name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            };
            writeln!(f, "  {}: {names}", title.heading())?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
