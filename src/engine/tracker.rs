//! Statistics Tracker: per-innings aggregation of ball outcomes.
//!
//! Pure bookkeeping with no I/O. One tracker lives for one innings.

use crate::domain::{
    BatsmanFigures, BowlerFigures, DismissalKind, Milestone, Outcome, PlayerId, ShotType,
    BALLS_PER_OVER,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Timeline window shown in live snapshots.
pub const RECENT_BALLS: usize = 12;

const ANGLE_JITTER: i32 = 15;

/// Wagon-wheel sample for a scoring shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShotPlacement {
    pub angle: i32,
    pub runs: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallOfWicket {
    pub wicket: u32,
    pub batsman: PlayerId,
    pub bowler: PlayerId,
    pub kind: DismissalKind,
    pub team_runs: u32,
    pub team_balls: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partnership {
    pub runs: u32,
    pub balls: u32,
}

/// What a single `record_ball` call changed beyond the figures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BallEffects {
    /// Newly crossed milestone for the striker, if any.
    pub milestone: Option<Milestone>,
    /// Runs of the over this ball completed.
    pub completed_over: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct StatsTracker {
    batting: HashMap<PlayerId, BatsmanFigures>,
    bowling: HashMap<PlayerId, BowlerFigures>,
    batting_order: Vec<PlayerId>,
    bowling_order: Vec<PlayerId>,
    dismissals: HashMap<PlayerId, FallOfWicket>,
    fall_of_wickets: Vec<FallOfWicket>,
    timeline: Vec<Outcome>,
    runs_per_over: Vec<u32>,
    current_over_runs: u32,
    current_over_balls: u32,
    placements: Vec<ShotPlacement>,
    partnership: Partnership,
    total_runs: u32,
    total_balls: u32,
    total_wickets: u32,
}

impl StatsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure a batsman has a (possibly empty) card entry.
    pub fn register_batsman(&mut self, id: &PlayerId) {
        if !self.batting.contains_key(id) {
            self.batting.insert(id.clone(), BatsmanFigures::default());
            self.batting_order.push(id.clone());
        }
    }

    pub fn register_bowler(&mut self, id: &PlayerId) {
        if !self.bowling.contains_key(id) {
            self.bowling.insert(id.clone(), BowlerFigures::default());
            self.bowling_order.push(id.clone());
        }
    }

    /// Record one legal ball. Wickets consume a ball like any other outcome.
    pub fn record_ball(
        &mut self,
        striker: &PlayerId,
        bowler: &PlayerId,
        outcome: Outcome,
        shot: ShotType,
    ) -> BallEffects {
        self.register_batsman(striker);
        self.register_bowler(bowler);

        let runs = outcome.runs();
        if let Some(batsman) = self.batting.get_mut(striker) {
            batsman.balls_faced += 1;
            batsman.runs += runs;
            match outcome {
                Outcome::Dot => batsman.dots += 1,
                Outcome::Four => batsman.fours += 1,
                Outcome::Six => batsman.sixes += 1,
                _ => {}
            }
        }
        if let Some(figures) = self.bowling.get_mut(bowler) {
            figures.balls_bowled += 1;
            figures.runs_conceded += runs;
            if outcome.is_wicket() {
                figures.wickets += 1;
            }
        }

        self.total_balls += 1;
        self.total_runs += runs;
        self.timeline.push(outcome);
        self.current_over_runs += runs;
        self.current_over_balls += 1;

        if outcome.is_wicket() {
            self.total_wickets += 1;
            self.partnership = Partnership::default();
        } else {
            self.partnership.runs += runs;
            self.partnership.balls += 1;
        }

        if runs > 0 {
            let angle = Self::placement_angle(shot, self.placements.len());
            self.placements.push(ShotPlacement { angle, runs });
        }

        let milestone = if runs > 0 {
            self.check_milestone(striker)
        } else {
            None
        };

        let completed_over = if self.current_over_balls == BALLS_PER_OVER {
            let over_runs = self.current_over_runs;
            self.runs_per_over.push(over_runs);
            self.current_over_runs = 0;
            self.current_over_balls = 0;
            Some(over_runs)
        } else {
            None
        };

        BallEffects {
            milestone,
            completed_over,
        }
    }

    /// Mark any newly crossed thresholds and return the highest one.
    ///
    /// Calling this again without new runs returns `None`.
    pub fn check_milestone(&mut self, batsman: &PlayerId) -> Option<Milestone> {
        let figures = self.batting.get_mut(batsman)?;
        let mut crossed = None;
        for milestone in Milestone::ALL {
            if figures.runs >= milestone.threshold()
                && figures.milestones_reached.insert(milestone)
            {
                crossed = Some(milestone);
            }
        }
        crossed
    }

    /// Attach dismissal details to the most recent wicket.
    pub fn record_dismissal(&mut self, batsman: &PlayerId, bowler: &PlayerId, kind: DismissalKind) {
        let fall = FallOfWicket {
            wicket: self.total_wickets,
            batsman: batsman.clone(),
            bowler: bowler.clone(),
            kind,
            team_runs: self.total_runs,
            team_balls: self.total_balls,
        };
        self.dismissals.insert(batsman.clone(), fall.clone());
        self.fall_of_wickets.push(fall);
    }

    pub fn batting_figures(&self, id: &PlayerId) -> Option<&BatsmanFigures> {
        self.batting.get(id)
    }

    pub fn bowling_figures(&self, id: &PlayerId) -> Option<&BowlerFigures> {
        self.bowling.get(id)
    }

    pub fn dismissal_of(&self, id: &PlayerId) -> Option<&FallOfWicket> {
        self.dismissals.get(id)
    }

    /// Batsmen in the order they came to the crease.
    pub fn batting_order(&self) -> &[PlayerId] {
        &self.batting_order
    }

    pub fn bowling_order(&self) -> &[PlayerId] {
        &self.bowling_order
    }

    pub fn fall_of_wickets(&self) -> &[FallOfWicket] {
        &self.fall_of_wickets
    }

    pub fn timeline(&self) -> Vec<&'static str> {
        self.timeline.iter().map(Outcome::symbol).collect()
    }

    /// The last `RECENT_BALLS` symbols, oldest first.
    pub fn recent_balls(&self) -> Vec<&'static str> {
        let start = self.timeline.len().saturating_sub(RECENT_BALLS);
        self.timeline[start..].iter().map(Outcome::symbol).collect()
    }

    /// Totals of completed overs.
    pub fn runs_per_over(&self) -> &[u32] {
        &self.runs_per_over
    }

    /// Completed overs plus the partial over in progress, if any.
    pub fn over_totals(&self) -> Vec<u32> {
        let mut totals = self.runs_per_over.clone();
        if self.current_over_balls > 0 {
            totals.push(self.current_over_runs);
        }
        totals
    }

    pub fn shot_placements(&self) -> &[ShotPlacement] {
        &self.placements
    }

    pub fn partnership(&self) -> Partnership {
        self.partnership
    }

    pub fn total_runs(&self) -> u32 {
        self.total_runs
    }

    pub fn total_balls(&self) -> u32 {
        self.total_balls
    }

    pub fn total_wickets(&self) -> u32 {
        self.total_wickets
    }

    fn base_angle(shot: ShotType) -> i32 {
        match shot {
            ShotType::Drive | ShotType::Defend | ShotType::Leave => 0,
            ShotType::Loft => 30,
            ShotType::Flick => 45,
            ShotType::Sweep => 60,
            ShotType::Pull => 90,
            ShotType::Cut => 120,
        }
    }

    // Deterministic spread of ±15° so repeated shots do not stack on one ray.
    fn placement_angle(shot: ShotType, index: usize) -> i32 {
        let spread = (index as i32 * 7) % (2 * ANGLE_JITTER + 1);
        Self::base_angle(shot) + spread - ANGLE_JITTER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> PlayerId {
        PlayerId::new(s)
    }

    #[test]
    fn test_over_rolls_after_six_balls_including_wickets() {
        let mut tracker = StatsTracker::new();
        let outcomes = [
            Outcome::Four,
            Outcome::One,
            Outcome::Six,
            Outcome::Wicket,
            Outcome::Dot,
            Outcome::Two,
        ];
        let mut completed = None;
        for outcome in outcomes {
            completed = tracker
                .record_ball(&id("a"), &id("x"), outcome, ShotType::Drive)
                .completed_over;
        }
        assert_eq!(completed, Some(13));
        assert_eq!(tracker.runs_per_over(), &[13]);
        assert_eq!(tracker.total_runs(), 13);
        assert_eq!(tracker.total_wickets(), 1);
        assert_eq!(tracker.timeline(), vec!["4", "1", "6", "W", "•", "2"]);
        assert!(tracker.over_totals() == vec![13]);
    }

    #[test]
    fn test_partial_over_in_totals() {
        let mut tracker = StatsTracker::new();
        tracker.record_ball(&id("a"), &id("x"), Outcome::Two, ShotType::Cut);
        assert!(tracker.runs_per_over().is_empty());
        assert_eq!(tracker.over_totals(), vec![2]);
    }

    #[test]
    fn test_milestone_fires_once_per_threshold() {
        let mut tracker = StatsTracker::new();
        let mut fired = Vec::new();
        for _ in 0..9 {
            if let Some(m) = tracker
                .record_ball(&id("a"), &id("x"), Outcome::Six, ShotType::Loft)
                .milestone
            {
                fired.push(m);
            }
        }
        // 54 runs: fifty once
        assert_eq!(fired, vec![Milestone::Fifty]);
        assert_eq!(tracker.check_milestone(&id("a")), None);

        for _ in 0..8 {
            if let Some(m) = tracker
                .record_ball(&id("a"), &id("x"), Outcome::Six, ShotType::Loft)
                .milestone
            {
                fired.push(m);
            }
        }
        assert_eq!(fired, vec![Milestone::Fifty, Milestone::Century]);
    }

    #[test]
    fn test_partnership_resets_on_wicket() {
        let mut tracker = StatsTracker::new();
        tracker.record_ball(&id("a"), &id("x"), Outcome::Four, ShotType::Drive);
        tracker.record_ball(&id("b"), &id("x"), Outcome::One, ShotType::Flick);
        assert_eq!(tracker.partnership(), Partnership { runs: 5, balls: 2 });
        tracker.record_ball(&id("a"), &id("x"), Outcome::Wicket, ShotType::Loft);
        tracker.record_dismissal(&id("a"), &id("x"), DismissalKind::Caught);
        assert_eq!(tracker.partnership(), Partnership::default());
        let fall = tracker.dismissal_of(&id("a")).unwrap();
        assert_eq!(fall.wicket, 1);
        assert_eq!(fall.team_runs, 5);
        assert_eq!(tracker.bowling_figures(&id("x")).unwrap().wickets, 1);
    }

    #[test]
    fn test_placements_only_for_scoring_shots_within_jitter() {
        let mut tracker = StatsTracker::new();
        tracker.record_ball(&id("a"), &id("x"), Outcome::Dot, ShotType::Defend);
        for _ in 0..20 {
            tracker.record_ball(&id("a"), &id("x"), Outcome::Four, ShotType::Cut);
        }
        assert_eq!(tracker.shot_placements().len(), 20);
        for placement in tracker.shot_placements() {
            assert!((105..=135).contains(&placement.angle));
            assert_eq!(placement.runs, 4);
        }
    }

    #[test]
    fn test_recent_balls_window() {
        let mut tracker = StatsTracker::new();
        for _ in 0..15 {
            tracker.record_ball(&id("a"), &id("x"), Outcome::Dot, ShotType::Leave);
        }
        assert_eq!(tracker.recent_balls().len(), RECENT_BALLS);
        assert_eq!(tracker.batting_figures(&id("a")).unwrap().dots, 15);
    }
}
