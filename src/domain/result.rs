//! Innings scores and the final match result.

use super::{MatchId, Overs, UserId};
use serde::{Deserialize, Serialize};

/// Wickets available to a batting side.
pub const MAX_WICKETS: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InningsScore {
    pub batting_user: UserId,
    pub runs: u32,
    pub wickets: u32,
    pub balls: u32,
}

impl InningsScore {
    pub fn overs(&self) -> Overs {
        Overs::from_balls(self.balls)
    }
}

impl std::fmt::Display for InningsScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{} ({} ov)", self.runs, self.wickets, self.overs())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Margin {
    Runs(u32),
    Wickets(u32),
    Tie,
}

impl Margin {
    pub fn description(&self) -> String {
        match self {
            Margin::Runs(1) => "won by 1 run".to_string(),
            Margin::Runs(n) => format!("won by {} runs", n),
            Margin::Wickets(1) => "won by 1 wicket".to_string(),
            Margin::Wickets(n) => format!("won by {} wickets", n),
            Margin::Tie => "match tied".to_string(),
        }
    }
}

/// Computed once at match end. `winner` is `None` only for a tie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub match_id: MatchId,
    pub winner: Option<UserId>,
    pub margin: Margin,
    pub target: u32,
    pub first_innings: InningsScore,
    pub second_innings: InningsScore,
}

impl MatchResult {
    /// Decide the winner from two completed innings.
    pub fn decide(match_id: MatchId, first: InningsScore, second: InningsScore) -> Self {
        let target = first.runs + 1;
        let (winner, margin) = if second.runs >= target {
            (
                Some(second.batting_user.clone()),
                Margin::Wickets(MAX_WICKETS.saturating_sub(second.wickets)),
            )
        } else if second.runs + 1 == target {
            (None, Margin::Tie)
        } else {
            (
                Some(first.batting_user.clone()),
                Margin::Runs(target - 1 - second.runs),
            )
        };

        MatchResult {
            match_id,
            winner,
            margin,
            target,
            first_innings: first,
            second_innings: second,
        }
    }

    pub fn loser(&self) -> Option<&UserId> {
        let winner = self.winner.as_ref()?;
        if *winner == self.first_innings.batting_user {
            Some(&self.second_innings.batting_user)
        } else {
            Some(&self.first_innings.batting_user)
        }
    }

    pub fn is_tie(&self) -> bool {
        matches!(self.margin, Margin::Tie)
    }

    pub fn participants(&self) -> [&UserId; 2] {
        [
            &self.first_innings.batting_user,
            &self.second_innings.batting_user,
        ]
    }

    pub fn summary_line(&self) -> String {
        match &self.winner {
            Some(winner) => format!("{} {}", winner, self.margin.description()),
            None => format!(
                "Match tied at {} runs",
                self.first_innings.runs
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(user: &str, runs: u32, wickets: u32, balls: u32) -> InningsScore {
        InningsScore {
            batting_user: UserId::new(user),
            runs,
            wickets,
            balls,
        }
    }

    #[test]
    fn test_chasing_side_wins_by_wickets() {
        let result = MatchResult::decide(
            MatchId::new("m1"),
            score("alice", 13, 1, 6),
            score("bob", 15, 2, 5),
        );
        assert_eq!(result.target, 14);
        assert_eq!(result.winner, Some(UserId::new("bob")));
        assert_eq!(result.margin, Margin::Wickets(8));
        assert_eq!(result.loser(), Some(&UserId::new("alice")));
    }

    #[test]
    fn test_defending_side_wins_by_runs() {
        let result = MatchResult::decide(
            MatchId::new("m1"),
            score("alice", 13, 1, 6),
            score("bob", 10, 10, 5),
        );
        assert_eq!(result.winner, Some(UserId::new("alice")));
        assert_eq!(result.margin, Margin::Runs(3));
        assert_eq!(result.margin.description(), "won by 3 runs");
    }

    #[test]
    fn test_level_scores_tie() {
        let result = MatchResult::decide(
            MatchId::new("m1"),
            score("alice", 13, 1, 6),
            score("bob", 13, 4, 6),
        );
        assert!(result.is_tie());
        assert_eq!(result.winner, None);
        assert_eq!(result.loser(), None);
    }

    #[test]
    fn test_score_display() {
        assert_eq!(score("a", 45, 3, 27).to_string(), "45/3 (4.3 ov)");
    }
}
