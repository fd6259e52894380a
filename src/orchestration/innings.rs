//! Innings State Machine runner.

use super::coordinator::{Innings, InteractionCoordinator, Interrupt};
use crate::engine::{InningsEnd, InningsSetup, InningsState, InningsSummary};
use crate::interaction::MatchEvent;

pub struct InningsMachine;

impl InningsMachine {
    /// Play one innings to a terminal condition and emit its summary.
    ///
    /// A batting-side stall closes the innings as forfeited and all out
    /// (summary still emitted) before the interrupt is passed up.
    pub async fn run(
        coordinator: &mut InteractionCoordinator,
        setup: InningsSetup,
        label: String,
    ) -> Result<InningsSummary, Interrupt> {
        coordinator
            .emit(MatchEvent::InningsStarted {
                number: setup.number,
                batting_user: setup.batting_user.clone(),
                bowling_user: setup.bowling_user.clone(),
                batting_label: label.clone(),
                target: setup.target,
            })
            .await;
        tracing::info!(
            match_id = %coordinator.match_id(),
            innings = setup.number,
            batting = %setup.batting_user,
            target = ?setup.target,
            "innings started"
        );

        let mut innings = Innings::new(InningsState::new(setup), label);
        let end = match Self::drive(coordinator, &mut innings).await {
            Ok(end) => end,
            Err(Interrupt::Forfeit(stall)) if stall.actor == innings.state.batting_user => {
                innings.state.mark_forfeited();
                Self::complete(coordinator, &innings, InningsEnd::Forfeited).await;
                return Err(Interrupt::Forfeit(stall));
            }
            Err(other) => return Err(other),
        };

        Ok(Self::complete(coordinator, &innings, end).await)
    }

    async fn drive(
        coordinator: &mut InteractionCoordinator,
        innings: &mut Innings,
    ) -> Result<InningsEnd, Interrupt> {
        coordinator.select_openers(innings).await?;
        loop {
            if let Some(end) = innings.state.end_reason() {
                return Ok(end);
            }
            if innings.state.awaiting_batsman() {
                coordinator.select_new_batsman(innings).await?;
                continue;
            }
            coordinator.play_ball(innings).await?;
        }
    }

    async fn complete(
        coordinator: &InteractionCoordinator,
        innings: &Innings,
        end: InningsEnd,
    ) -> InningsSummary {
        let summary = InningsSummary::build(
            &innings.state,
            &innings.tracker,
            coordinator.store(),
            &innings.label,
            end,
        );
        tracing::info!(
            match_id = %coordinator.match_id(),
            innings = summary.number,
            score = %summary.score,
            end = end.label(),
            "innings complete"
        );
        coordinator
            .emit(MatchEvent::InningsComplete(Box::new(summary.clone())))
            .await;
        summary
    }
}
