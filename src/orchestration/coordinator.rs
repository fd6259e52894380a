//! Interaction Coordinator: the per-ball decision protocol.
//!
//! Each ball walks `AwaitingBowler -> AwaitingDelivery -> AwaitingShot ->
//! Resolved`. Prompts are the only suspension points; resolution,
//! bookkeeping and state transitions run to completion before the next prompt.

use crate::domain::{
    BallRecord, BowlerSpecialty, CoinFace, Delivery, DismissalKind, Length, LineupError,
    MatchConfig, MatchId, PaceType, PlayerId, ShotType, SpinDelivery, TossChoice, UserId,
};
use crate::engine::{
    ball_commentary, InningsState, LiveSnapshot, OutcomeResolver, RandomSource, StatsTracker,
    WicketCard,
};
use crate::interaction::{
    ChoiceGateway, ChoiceOption, DecisionError, DecisionStage, MatchEvent, MatchIo, Prompt,
};
use crate::roster::PlayerStore;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;

/// Wait windows for prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptTimeouts {
    /// Toss, bowler, delivery, shot and new-batsman prompts.
    pub decision: Duration,
    /// Shared by both opening-batsman prompts.
    pub lineup: Duration,
}

impl Default for PromptTimeouts {
    fn default() -> Self {
        Self {
            decision: Duration::from_secs(60),
            lineup: Duration::from_secs(120),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BallPhase {
    AwaitingBowler,
    AwaitingDelivery,
    AwaitingShot,
    Resolved,
    InningsComplete,
    Forfeited,
}

/// The actor who let a prompt expire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stall {
    pub actor: UserId,
    pub stage: DecisionStage,
}

/// Why a match stopped before a result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Interrupt {
    #[error("{} stalled at the {} prompt", .0.actor, .0.stage)]
    Forfeit(Stall),
    #[error("match cancelled")]
    Cancelled,
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<DecisionError> for Interrupt {
    fn from(err: DecisionError) -> Self {
        match err {
            DecisionError::Timeout { actor, stage } => Interrupt::Forfeit(Stall { actor, stage }),
            // A closed response stream means the router went away.
            DecisionError::Cancelled | DecisionError::Disconnected => Interrupt::Cancelled,
        }
    }
}

impl From<LineupError> for Interrupt {
    fn from(err: LineupError) -> Self {
        Interrupt::Internal(err.to_string())
    }
}

/// Who bats first after the toss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TossOutcome {
    pub winner: UserId,
    pub decision: TossChoice,
    pub batting_first: UserId,
    pub bowling_first: UserId,
}

/// Live state for one innings: transitions plus running figures.
#[derive(Debug, Clone)]
pub struct Innings {
    pub state: InningsState,
    pub tracker: StatsTracker,
    pub label: String,
}

impl Innings {
    pub fn new(state: InningsState, label: impl Into<String>) -> Self {
        Self {
            state,
            tracker: StatsTracker::new(),
            label: label.into(),
        }
    }
}

pub struct InteractionCoordinator {
    gateway: ChoiceGateway,
    config: MatchConfig,
    store: Arc<dyn PlayerStore>,
    rng: Box<dyn RandomSource>,
    resolver: OutcomeResolver,
    timeouts: PromptTimeouts,
    phase: BallPhase,
}

impl InteractionCoordinator {
    pub fn new(
        match_id: MatchId,
        config: MatchConfig,
        store: Arc<dyn PlayerStore>,
        io: MatchIo,
        rng: Box<dyn RandomSource>,
        timeouts: PromptTimeouts,
    ) -> Self {
        Self {
            gateway: ChoiceGateway::new(match_id, io),
            config,
            store,
            rng,
            resolver: OutcomeResolver::new(),
            timeouts,
            phase: BallPhase::AwaitingBowler,
        }
    }

    pub fn match_id(&self) -> &MatchId {
        self.gateway.match_id()
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn store(&self) -> &dyn PlayerStore {
        self.store.as_ref()
    }

    pub fn phase(&self) -> BallPhase {
        self.phase
    }

    pub async fn emit(&self, event: MatchEvent) {
        self.gateway.emit(event).await;
    }

    /// Fair toss. `caller` calls heads or tails; the winner picks bat or bowl.
    pub async fn toss(&mut self, caller: &UserId, other: &UserId) -> Result<TossOutcome, Interrupt> {
        let call: CoinFace = parse_key(
            &self
                .ask(
                    DecisionStage::TossCall,
                    caller,
                    "Call the toss".to_string(),
                    vec![
                        ChoiceOption::new("heads", "Heads"),
                        ChoiceOption::new("tails", "Tails"),
                    ],
                    self.decision_deadline(),
                )
                .await?,
        )?;
        let landed = CoinFace::from_flip(self.rng.coin_flip());
        let (winner, loser) = if call == landed {
            (caller.clone(), other.clone())
        } else {
            (other.clone(), caller.clone())
        };

        let decision: TossChoice = parse_key(
            &self
                .ask(
                    DecisionStage::TossDecision,
                    &winner,
                    format!("{} won the toss: bat or bowl first?", winner),
                    vec![
                        ChoiceOption::new("bat", "Bat first"),
                        ChoiceOption::new("bowl", "Bowl first"),
                    ],
                    self.decision_deadline(),
                )
                .await?,
        )?;
        let (batting_first, bowling_first) = match decision {
            TossChoice::Bat => (winner.clone(), loser),
            TossChoice::Bowl => (loser, winner.clone()),
        };

        tracing::info!(
            match_id = %self.match_id(),
            winner = %winner,
            decision = decision.key(),
            "toss decided"
        );
        self.emit(MatchEvent::TossResult {
            caller: caller.clone(),
            call,
            landed,
            winner: winner.clone(),
            decision,
        })
        .await;

        Ok(TossOutcome {
            winner,
            decision,
            batting_first,
            bowling_first,
        })
    }

    /// Two distinct openers, both picked inside one lineup window.
    pub async fn select_openers(&mut self, innings: &mut Innings) -> Result<(), Interrupt> {
        let actor = innings.state.batting_user.clone();
        let deadline = Instant::now() + self.timeouts.lineup;

        let available = innings.state.available_batsmen();
        let striker = PlayerId::new(
            self.ask(
                DecisionStage::Opener,
                &actor,
                format!("{}: choose your opening striker", innings.label),
                self.player_options(&available),
                deadline,
            )
            .await?,
        );
        let remaining: Vec<PlayerId> = available.into_iter().filter(|id| *id != striker).collect();
        let non_striker = PlayerId::new(
            self.ask(
                DecisionStage::Opener,
                &actor,
                format!("{}: choose the non-striker", innings.label),
                self.player_options(&remaining),
                deadline,
            )
            .await?,
        );

        innings.state.open(striker.clone(), non_striker.clone())?;
        innings.tracker.register_batsman(&striker);
        innings.tracker.register_batsman(&non_striker);
        Ok(())
    }

    /// Replacement after a wicket, chosen from batsmen not yet out.
    pub async fn select_new_batsman(&mut self, innings: &mut Innings) -> Result<(), Interrupt> {
        let actor = innings.state.batting_user.clone();
        let available = innings.state.available_batsmen();
        let pick = PlayerId::new(
            self.ask(
                DecisionStage::NewBatsman,
                &actor,
                format!(
                    "{} are {}/{}: send in the next batsman",
                    innings.label,
                    innings.state.runs(),
                    innings.state.wickets()
                ),
                self.player_options(&available),
                self.decision_deadline(),
            )
            .await?,
        );
        innings.state.bring_in(pick.clone())?;
        innings.tracker.register_batsman(&pick);
        Ok(())
    }

    /// Run one ball through the full protocol.
    pub async fn play_ball(&mut self, innings: &mut Innings) -> Result<BallPhase, Interrupt> {
        let played = self.play_ball_inner(innings).await;
        self.phase = match &played {
            Ok(phase) => *phase,
            Err(Interrupt::Forfeit(_)) => BallPhase::Forfeited,
            Err(_) => self.phase,
        };
        played
    }

    async fn play_ball_inner(&mut self, innings: &mut Innings) -> Result<BallPhase, Interrupt> {
        let batting_user = innings.state.batting_user.clone();
        let bowling_user = innings.state.bowling_user.clone();

        if innings.state.needs_bowler() {
            self.phase = BallPhase::AwaitingBowler;
            let candidates = innings.state.bowler_candidates();
            let options = self.bowler_options(&candidates, &innings.tracker);
            let pick = PlayerId::new(
                self.ask(
                    DecisionStage::Bowler,
                    &bowling_user,
                    format!("Over {}: choose your bowler", innings.state.current_over() + 1),
                    options,
                    self.decision_deadline(),
                )
                .await?,
            );
            innings.state.set_bowler(pick.clone())?;
            innings.tracker.register_bowler(&pick);
        }
        let bowler = innings
            .state
            .bowler()
            .cloned()
            .ok_or_else(|| Interrupt::Internal("no bowler after selection".to_string()))?;

        self.phase = BallPhase::AwaitingDelivery;
        let delivery = self.choose_delivery(&bowling_user, &bowler).await?;

        self.phase = BallPhase::AwaitingShot;
        let striker = innings
            .state
            .striker()
            .cloned()
            .ok_or_else(|| Interrupt::Internal("no striker at the crease".to_string()))?;
        let reveal = self.config.difficulty.reveals_delivery();
        let bowler_name = self.store.name_of(&bowler);
        let striker_name = self.store.name_of(&striker);
        let title = if reveal {
            format!("{} bowls a {} to {}: choose your shot", bowler_name, delivery, striker_name)
        } else {
            format!("Mystery ball to {}: choose your shot", striker_name)
        };
        let shot: ShotType = parse_key(
            &self
                .ask(
                    DecisionStage::Shot,
                    &batting_user,
                    title,
                    ShotType::ALL
                        .iter()
                        .map(|s| ChoiceOption::new(s.key(), s.label()))
                        .collect(),
                    self.decision_deadline(),
                )
                .await?,
        )?;

        let resolution = self.resolver.resolve(shot, &delivery, self.rng.as_mut());
        let outcome = resolution.outcome;
        let over = innings.state.current_over();
        let ball_in_over = innings.state.ball_in_over() + 1;

        let effects = innings.tracker.record_ball(&striker, &bowler, outcome, shot);
        let dismissal = outcome
            .is_wicket()
            .then(|| resolution.dismissal.unwrap_or(DismissalKind::Bowled));
        if let Some(kind) = dismissal {
            innings.tracker.record_dismissal(&striker, &bowler, kind);
        }
        let change = innings.state.apply(outcome)?;

        let record = BallRecord {
            innings: innings.state.number,
            over,
            ball_in_over: u8::try_from(ball_in_over).unwrap_or(u8::MAX),
            striker: striker.clone(),
            bowler: bowler.clone(),
            shot,
            delivery: reveal.then_some(delivery),
            speed_kmph: resolution.speed_kmph,
            outcome,
            dismissal,
        };
        tracing::debug!(
            match_id = %self.match_id(),
            innings = innings.state.number,
            over = over + 1,
            ball = ball_in_over,
            outcome = outcome.symbol(),
            "ball resolved"
        );
        self.emit(MatchEvent::BallResult(record)).await;

        let commentary = ball_commentary(
            &bowler_name,
            &striker_name,
            &delivery,
            reveal,
            resolution.speed_kmph,
            shot,
            outcome,
            dismissal,
        );

        match (change.dismissed.as_ref(), dismissal) {
            (Some(out), Some(kind)) => {
                let card = WicketCard::capture(
                    &innings.state,
                    &innings.tracker,
                    self.store.as_ref(),
                    out,
                    &bowler,
                    kind,
                    Some(commentary),
                );
                self.emit(MatchEvent::Wicket(Box::new(card))).await;
            }
            _ => {
                if let Some(milestone) = effects.milestone {
                    let figures = innings.tracker.batting_figures(&striker).cloned().unwrap_or_default();
                    self.emit(MatchEvent::Milestone {
                        batsman: striker.clone(),
                        name: striker_name.clone(),
                        milestone,
                        runs: figures.runs,
                        balls: figures.balls_faced,
                    })
                    .await;
                }
                let snapshot = LiveSnapshot::capture(
                    &innings.state,
                    &innings.tracker,
                    self.store.as_ref(),
                    &innings.label,
                    Some(&bowler),
                    Some(commentary),
                );
                self.emit(MatchEvent::Live(Box::new(snapshot))).await;
            }
        }

        if let Some(runs) = effects.completed_over {
            self.emit(MatchEvent::OverCompleted {
                over: over + 1,
                runs,
                bowler: bowler.clone(),
            })
            .await;
        }

        Ok(if innings.state.end_reason().is_some() {
            BallPhase::InningsComplete
        } else {
            BallPhase::Resolved
        })
    }

    async fn choose_delivery(
        &mut self,
        actor: &UserId,
        bowler: &PlayerId,
    ) -> Result<Delivery, Interrupt> {
        let specialty = match self.store.by_id(bowler) {
            Some(player) => player.specialty(),
            None => {
                tracing::warn!(match_id = %self.match_id(), player = %bowler, "bowler missing from store");
                BowlerSpecialty::Fast
            }
        };
        let name = self.store.name_of(bowler);

        match specialty {
            BowlerSpecialty::Fast => {
                let pace: PaceType = parse_key(
                    &self
                        .ask(
                            DecisionStage::PaceType,
                            actor,
                            format!("{}: choose pace and movement", name),
                            PaceType::ALL
                                .iter()
                                .map(|p| ChoiceOption::new(p.key(), p.label()))
                                .collect(),
                            self.decision_deadline(),
                        )
                        .await?,
                )?;
                let length: Length = parse_key(
                    &self
                        .ask(
                            DecisionStage::Length,
                            actor,
                            format!("{}: choose the length", name),
                            Length::ALL
                                .iter()
                                .map(|l| ChoiceOption::new(l.key(), l.label()))
                                .collect(),
                            self.decision_deadline(),
                        )
                        .await?,
                )?;
                Ok(Delivery::Pace { pace, length })
            }
            spin => {
                let delivery: SpinDelivery = parse_key(
                    &self
                        .ask(
                            DecisionStage::SpinDelivery,
                            actor,
                            format!("{}: choose your delivery", name),
                            SpinDelivery::menu(spin)
                                .iter()
                                .map(|d| ChoiceOption::new(d.key(), d.label()))
                                .collect(),
                            self.decision_deadline(),
                        )
                        .await?,
                )?;
                Ok(Delivery::Spin { delivery })
            }
        }
    }

    async fn ask(
        &mut self,
        stage: DecisionStage,
        actor: &UserId,
        title: String,
        options: Vec<ChoiceOption>,
        deadline: Instant,
    ) -> Result<String, Interrupt> {
        let prompt = Prompt {
            stage,
            actor: actor.clone(),
            title,
            options,
            window_secs: 0,
        };
        Ok(self.gateway.await_choice(prompt, deadline).await?)
    }

    fn decision_deadline(&self) -> Instant {
        Instant::now() + self.timeouts.decision
    }

    /// Known players become options; unknown ids are left out. If none are
    /// known the raw ids are offered so the match can still proceed.
    fn player_options(&self, ids: &[PlayerId]) -> Vec<ChoiceOption> {
        let options: Vec<ChoiceOption> = ids
            .iter()
            .filter_map(|id| {
                let player = self.store.by_id(id)?;
                Some(
                    ChoiceOption::new(id.as_str(), player.name.clone()).with_detail(format!(
                        "{} · OVR {:.1}",
                        player.role.as_str(),
                        player.overall()
                    )),
                )
            })
            .collect();
        if options.is_empty() {
            return ids
                .iter()
                .map(|id| ChoiceOption::new(id.as_str(), id.as_str()))
                .collect();
        }
        if options.len() < ids.len() {
            tracing::warn!(
                match_id = %self.match_id(),
                skipped = ids.len() - options.len(),
                "players missing from store left out of prompt"
            );
        }
        options
    }

    fn bowler_options(&self, ids: &[PlayerId], tracker: &StatsTracker) -> Vec<ChoiceOption> {
        self.player_options(ids)
            .into_iter()
            .map(|option| {
                let id = PlayerId::new(option.key.clone());
                match tracker.bowling_figures(&id) {
                    Some(f) if f.balls_bowled > 0 => option.with_detail(format!(
                        "{} ov, {} runs, {} wkts",
                        f.overs(),
                        f.runs_conceded,
                        f.wickets
                    )),
                    _ => option,
                }
            })
            .collect()
    }
}

fn parse_key<T: FromStr<Err = String>>(key: &str) -> Result<T, Interrupt> {
    key.parse::<T>().map_err(Interrupt::Internal)
}
