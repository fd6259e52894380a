//! Read-only views for the presentation layer.
//!
//! Players missing from the store are left out of every card rather than
//! failing the snapshot.

use super::innings::{InningsEnd, InningsState};
use super::tracker::{FallOfWicket, Partnership, ShotPlacement, StatsTracker};
use crate::domain::{
    BatsmanFigures, BowlerFigures, Delivery, DismissalKind, InningsScore, Outcome, PlayerId,
    ShotType, UserId,
};
use crate::roster::PlayerStore;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatsmanLine {
    pub id: PlayerId,
    pub name: String,
    pub runs: u32,
    pub balls: u32,
    pub fours: u32,
    pub sixes: u32,
    pub strike_rate: f64,
}

impl BatsmanLine {
    fn build(store: &dyn PlayerStore, id: &PlayerId, figures: Option<&BatsmanFigures>) -> Option<Self> {
        let player = store.by_id(id)?;
        let figures = figures.cloned().unwrap_or_default();
        Some(Self {
            id: id.clone(),
            name: player.name,
            runs: figures.runs,
            balls: figures.balls_faced,
            fours: figures.fours,
            sixes: figures.sixes,
            strike_rate: round1(figures.strike_rate()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BowlerLine {
    pub id: PlayerId,
    pub name: String,
    pub overs: String,
    pub runs: u32,
    pub wickets: u32,
    pub economy: f64,
}

impl BowlerLine {
    fn build(store: &dyn PlayerStore, id: &PlayerId, figures: Option<&BowlerFigures>) -> Option<Self> {
        let player = store.by_id(id)?;
        let figures = figures.cloned().unwrap_or_default();
        Some(Self {
            id: id.clone(),
            name: player.name,
            overs: figures.overs().to_string(),
            runs: figures.runs_conceded,
            wickets: figures.wickets,
            economy: round2(figures.economy()),
        })
    }
}

/// Snapshot emitted after every non-wicket ball.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveSnapshot {
    pub innings: u8,
    pub batting_label: String,
    pub runs: u32,
    pub wickets: u32,
    pub overs: String,
    pub striker: Option<BatsmanLine>,
    pub non_striker: Option<BatsmanLine>,
    pub bowler: Option<BowlerLine>,
    pub recent_balls: Vec<String>,
    pub partnership: Partnership,
    pub current_run_rate: f64,
    pub target: Option<u32>,
    pub required_run_rate: Option<f64>,
    pub need: Option<String>,
    pub commentary: Option<String>,
}

impl LiveSnapshot {
    pub fn capture(
        state: &InningsState,
        tracker: &StatsTracker,
        store: &dyn PlayerStore,
        batting_label: &str,
        bowler: Option<&PlayerId>,
        commentary: Option<String>,
    ) -> Self {
        let batsman = |id: Option<&PlayerId>| {
            id.and_then(|id| BatsmanLine::build(store, id, tracker.batting_figures(id)))
        };
        let need = match (state.runs_needed(), state.target()) {
            (Some(needed), Some(_)) if needed > 0 => Some(format!(
                "Need {} from {} balls",
                needed,
                state.balls_remaining()
            )),
            _ => None,
        };

        Self {
            innings: state.number,
            batting_label: batting_label.to_string(),
            runs: state.runs(),
            wickets: state.wickets(),
            overs: crate::domain::Overs::from_balls(state.balls()).to_string(),
            striker: batsman(state.striker()),
            non_striker: batsman(state.non_striker()),
            bowler: bowler
                .and_then(|id| BowlerLine::build(store, id, tracker.bowling_figures(id))),
            recent_balls: tracker.recent_balls().into_iter().map(String::from).collect(),
            partnership: tracker.partnership(),
            current_run_rate: round2(state.current_run_rate()),
            target: state.target(),
            required_run_rate: state.required_run_rate().map(round2),
            need,
            commentary,
        }
    }
}

/// Dedicated card emitted in place of the live snapshot after a wicket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WicketCard {
    pub batsman: Option<BatsmanLine>,
    pub bowler_name: String,
    pub kind: DismissalKind,
    pub score: String,
    pub fall: Option<FallOfWicket>,
    pub commentary: Option<String>,
}

impl WicketCard {
    pub fn capture(
        state: &InningsState,
        tracker: &StatsTracker,
        store: &dyn PlayerStore,
        batsman: &PlayerId,
        bowler: &PlayerId,
        kind: DismissalKind,
        commentary: Option<String>,
    ) -> Self {
        Self {
            batsman: BatsmanLine::build(store, batsman, tracker.batting_figures(batsman)),
            bowler_name: store.name_of(bowler),
            kind,
            score: format!("{}/{}", state.runs(), state.wickets()),
            fall: tracker.dismissal_of(batsman).cloned(),
            commentary,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattingCardEntry {
    #[serde(flatten)]
    pub line: BatsmanLine,
    /// `None` while not out.
    pub dismissal: Option<String>,
}

/// Full scorecard emitted when an innings ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InningsSummary {
    pub number: u8,
    pub batting_user: UserId,
    pub bowling_user: UserId,
    pub batting_label: String,
    pub score: InningsScore,
    pub end: InningsEnd,
    pub batting_card: Vec<BattingCardEntry>,
    pub bowling_card: Vec<BowlerLine>,
    pub runs_per_over: Vec<u32>,
    pub shot_placements: Vec<ShotPlacement>,
    pub fall_of_wickets: Vec<FallOfWicket>,
    pub timeline: Vec<String>,
}

impl InningsSummary {
    pub fn build(
        state: &InningsState,
        tracker: &StatsTracker,
        store: &dyn PlayerStore,
        batting_label: &str,
        end: InningsEnd,
    ) -> Self {
        let batting_card = tracker
            .batting_order()
            .iter()
            .filter_map(|id| {
                let line = BatsmanLine::build(store, id, tracker.batting_figures(id))?;
                let dismissal = tracker
                    .dismissal_of(id)
                    .map(|fall| fall.kind.scorecard(&store.name_of(&fall.bowler)));
                Some(BattingCardEntry { line, dismissal })
            })
            .collect();
        let bowling_card = tracker
            .bowling_order()
            .iter()
            .filter_map(|id| BowlerLine::build(store, id, tracker.bowling_figures(id)))
            .collect();

        Self {
            number: state.number,
            batting_user: state.batting_user.clone(),
            bowling_user: state.bowling_user.clone(),
            batting_label: batting_label.to_string(),
            score: state.score(),
            end,
            batting_card,
            bowling_card,
            runs_per_over: tracker.over_totals(),
            shot_placements: tracker.shot_placements().to_vec(),
            fall_of_wickets: tracker.fall_of_wickets().to_vec(),
            timeline: tracker.timeline().into_iter().map(String::from).collect(),
        }
    }
}

/// One line of ball commentary. Hard mode hides the delivery.
#[allow(clippy::too_many_arguments)]
pub fn ball_commentary(
    bowler: &str,
    batsman: &str,
    delivery: &Delivery,
    reveal_delivery: bool,
    speed_kmph: u16,
    shot: ShotType,
    outcome: Outcome,
    dismissal: Option<DismissalKind>,
) -> String {
    let delivery = if reveal_delivery {
        delivery.to_string()
    } else {
        "Mystery ball".to_string()
    };
    let result = match (outcome, dismissal) {
        (Outcome::Wicket, Some(kind)) => format!("OUT! {}", kind.label()),
        (Outcome::Wicket, None) => "OUT!".to_string(),
        (Outcome::Dot, _) => "no run".to_string(),
        (Outcome::One, _) => "1 run".to_string(),
        (Outcome::Four, _) => "FOUR!".to_string(),
        (Outcome::Six, _) => "SIX!".to_string(),
        (other, _) => format!("{} runs", other.runs()),
    };
    format!(
        "{} to {}, {} at {} km/h, {}: {}",
        bowler,
        batsman,
        delivery,
        speed_kmph,
        shot.label().to_ascii_lowercase(),
        result
    )
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
