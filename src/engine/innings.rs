//! Innings state and its ball-by-ball transitions.
//!
//! `InningsState` knows nothing about prompts or timeouts. The coordinator
//! asks it who may be picked, feeds it the picks and the resolved outcome,
//! and checks `end_reason` before every ball.

use crate::domain::{
    InningsScore, LineupError, Outcome, PlayerId, UserId, BALLS_PER_OVER, MAX_WICKETS,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InningsEnd {
    AllOut,
    OversComplete,
    TargetReached,
    Forfeited,
}

impl InningsEnd {
    pub fn label(&self) -> &'static str {
        match self {
            InningsEnd::AllOut => "all out",
            InningsEnd::OversComplete => "overs complete",
            InningsEnd::TargetReached => "target reached",
            InningsEnd::Forfeited => "forfeited",
        }
    }
}

/// Everything fixed at the start of an innings.
#[derive(Debug, Clone)]
pub struct InningsSetup {
    pub number: u8,
    pub batting_user: UserId,
    pub bowling_user: UserId,
    pub batting_xi: Vec<PlayerId>,
    pub bowling_xi: Vec<PlayerId>,
    pub max_balls: u32,
    /// Second innings only: first-innings runs + 1.
    pub target: Option<u32>,
}

/// State change produced by one ball.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChange {
    pub runs: u32,
    pub dismissed: Option<PlayerId>,
    pub strike_swapped: bool,
    pub over_completed: bool,
}

#[derive(Debug, Clone)]
pub struct InningsState {
    pub number: u8,
    pub batting_user: UserId,
    pub bowling_user: UserId,
    batting_xi: Vec<PlayerId>,
    bowling_xi: Vec<PlayerId>,
    striker: Option<PlayerId>,
    non_striker: Option<PlayerId>,
    bowler: Option<PlayerId>,
    last_over_bowler: Option<PlayerId>,
    dismissed: HashSet<PlayerId>,
    runs: u32,
    wickets: u32,
    balls: u32,
    max_balls: u32,
    target: Option<u32>,
    awaiting_batsman: bool,
    swap_on_arrival: bool,
    forfeited: bool,
}

impl InningsState {
    pub fn new(setup: InningsSetup) -> Self {
        Self {
            number: setup.number,
            batting_user: setup.batting_user,
            bowling_user: setup.bowling_user,
            batting_xi: setup.batting_xi,
            bowling_xi: setup.bowling_xi,
            striker: None,
            non_striker: None,
            bowler: None,
            last_over_bowler: None,
            dismissed: HashSet::new(),
            runs: 0,
            wickets: 0,
            balls: 0,
            max_balls: setup.max_balls,
            target: setup.target,
            awaiting_batsman: false,
            swap_on_arrival: false,
            forfeited: false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.striker.is_some() || self.non_striker.is_some() || self.awaiting_batsman
    }

    /// Put the two openers in. Striker first.
    pub fn open(&mut self, striker: PlayerId, non_striker: PlayerId) -> Result<(), LineupError> {
        if self.is_open() {
            return Err(LineupError::OutOfSequence("openers already chosen"));
        }
        if striker == non_striker {
            return Err(LineupError::Duplicate(striker));
        }
        for id in [&striker, &non_striker] {
            if !self.batting_xi.contains(id) {
                return Err(LineupError::NotEligible(id.clone()));
            }
        }
        self.striker = Some(striker);
        self.non_striker = Some(non_striker);
        Ok(())
    }

    /// Batsmen who are neither out nor at the crease.
    pub fn available_batsmen(&self) -> Vec<PlayerId> {
        self.batting_xi
            .iter()
            .filter(|id| {
                !self.dismissed.contains(*id)
                    && self.striker.as_ref() != Some(*id)
                    && self.non_striker.as_ref() != Some(*id)
            })
            .cloned()
            .collect()
    }

    pub fn awaiting_batsman(&self) -> bool {
        self.awaiting_batsman
    }

    /// Send in the replacement for the last dismissed batsman.
    pub fn bring_in(&mut self, id: PlayerId) -> Result<(), LineupError> {
        if !self.awaiting_batsman {
            return Err(LineupError::OutOfSequence("no vacancy at the crease"));
        }
        if !self.available_batsmen().contains(&id) {
            return Err(LineupError::NotEligible(id));
        }
        if self.swap_on_arrival {
            self.striker = self.non_striker.take();
            self.non_striker = Some(id);
        } else {
            self.striker = Some(id);
        }
        self.awaiting_batsman = false;
        self.swap_on_arrival = false;
        Ok(())
    }

    /// Zero-based index of the over the next ball belongs to.
    pub fn current_over(&self) -> u32 {
        self.balls / BALLS_PER_OVER
    }

    pub fn ball_in_over(&self) -> u32 {
        self.balls % BALLS_PER_OVER
    }

    pub fn needs_bowler(&self) -> bool {
        self.bowler.is_none()
    }

    /// Bowlers allowed for the coming over. The previous over's bowler sits out.
    pub fn bowler_candidates(&self) -> Vec<PlayerId> {
        let candidates: Vec<PlayerId> = self
            .bowling_xi
            .iter()
            .filter(|id| self.last_over_bowler.as_ref() != Some(*id))
            .cloned()
            .collect();
        if candidates.is_empty() {
            self.bowling_xi.clone()
        } else {
            candidates
        }
    }

    pub fn set_bowler(&mut self, id: PlayerId) -> Result<(), LineupError> {
        if self.bowler.is_some() {
            return Err(LineupError::OutOfSequence("over already has a bowler"));
        }
        if !self.bowler_candidates().contains(&id) {
            if self.last_over_bowler.as_ref() == Some(&id) {
                return Err(LineupError::ConsecutiveOvers(id));
            }
            return Err(LineupError::NotEligible(id));
        }
        self.bowler = Some(id);
        Ok(())
    }

    /// Apply a resolved outcome. Requires both batsmen and a bowler in place.
    pub fn apply(&mut self, outcome: Outcome) -> Result<StateChange, LineupError> {
        if self.end_reason().is_some() {
            return Err(LineupError::OutOfSequence("innings is over"));
        }
        let (Some(striker), Some(_), Some(bowler)) =
            (self.striker.clone(), self.non_striker.as_ref(), self.bowler.clone())
        else {
            return Err(LineupError::OutOfSequence("ball bowled before selections"));
        };

        self.balls += 1;
        let over_completed = self.balls % BALLS_PER_OVER == 0;
        let mut strike_swapped = false;
        let mut dismissed = None;

        if outcome.is_wicket() {
            self.wickets += 1;
            self.dismissed.insert(striker.clone());
            self.striker = None;
            self.awaiting_batsman = true;
            self.swap_on_arrival = over_completed;
            dismissed = Some(striker);
        } else {
            self.runs += outcome.runs();
            if outcome.swaps_strike() {
                self.swap_strike();
                strike_swapped = true;
            }
            if over_completed {
                self.swap_strike();
                strike_swapped = !strike_swapped;
            }
        }

        if over_completed {
            self.last_over_bowler = Some(bowler);
            self.bowler = None;
        }

        Ok(StateChange {
            runs: outcome.runs(),
            dismissed,
            strike_swapped,
            over_completed,
        })
    }

    /// Close the innings after the batting side walked away. The card
    /// records the side as all out.
    pub fn mark_forfeited(&mut self) {
        self.forfeited = true;
        self.wickets = MAX_WICKETS;
    }

    /// Terminal condition, if reached.
    pub fn end_reason(&self) -> Option<InningsEnd> {
        if self.forfeited {
            return Some(InningsEnd::Forfeited);
        }
        if let Some(target) = self.target {
            if self.runs >= target {
                return Some(InningsEnd::TargetReached);
            }
        }
        if self.wickets >= MAX_WICKETS
            || (self.awaiting_batsman && self.available_batsmen().is_empty())
        {
            return Some(InningsEnd::AllOut);
        }
        if self.balls >= self.max_balls {
            return Some(InningsEnd::OversComplete);
        }
        None
    }

    fn swap_strike(&mut self) {
        std::mem::swap(&mut self.striker, &mut self.non_striker);
    }

    pub fn striker(&self) -> Option<&PlayerId> {
        self.striker.as_ref()
    }

    pub fn non_striker(&self) -> Option<&PlayerId> {
        self.non_striker.as_ref()
    }

    pub fn bowler(&self) -> Option<&PlayerId> {
        self.bowler.as_ref()
    }

    pub fn last_over_bowler(&self) -> Option<&PlayerId> {
        self.last_over_bowler.as_ref()
    }

    pub fn runs(&self) -> u32 {
        self.runs
    }

    pub fn wickets(&self) -> u32 {
        self.wickets
    }

    pub fn balls(&self) -> u32 {
        self.balls
    }

    pub fn max_balls(&self) -> u32 {
        self.max_balls
    }

    pub fn target(&self) -> Option<u32> {
        self.target
    }

    pub fn balls_remaining(&self) -> u32 {
        self.max_balls.saturating_sub(self.balls)
    }

    pub fn runs_needed(&self) -> Option<u32> {
        self.target.map(|t| t.saturating_sub(self.runs))
    }

    pub fn current_run_rate(&self) -> f64 {
        if self.balls == 0 {
            return 0.0;
        }
        f64::from(self.runs) * f64::from(BALLS_PER_OVER) / f64::from(self.balls)
    }

    /// Runs per over still required. `None` without a target or with no balls left.
    pub fn required_run_rate(&self) -> Option<f64> {
        let needed = self.runs_needed()?;
        let remaining = self.balls_remaining();
        if remaining == 0 {
            return None;
        }
        Some(f64::from(needed) * f64::from(BALLS_PER_OVER) / f64::from(remaining))
    }

    pub fn score(&self) -> InningsScore {
        InningsScore {
            batting_user: self.batting_user.clone(),
            runs: self.runs,
            wickets: self.wickets,
            balls: self.balls,
        }
    }
}
