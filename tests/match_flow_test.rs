use cricket_arena::domain::{
    BallRecord, ChannelId, Difficulty, Margin, MatchConfig, MatchId, Outcome, PlayerId, PlayingXi, ShotType,
    UserId,
};
use cricket_arena::engine::{InningsEnd, InningsSummary, OutcomeResolver, SequenceRandom};
use cricket_arena::interaction::{
    AutoPilot, DecisionStage, EventFeed, MatchEvent, MatchIo, ResponseStream, ScriptedResponses,
};
use cricket_arena::ledger::{InMemoryLedger, Ledger};
use cricket_arena::orchestration::{
    MatchOrchestrator, MatchOutcome, MatchRegistry, MatchSetup, PromptTimeouts, RegistryError,
    RewardSchedule, Settler, StartMatch,
};
use cricket_arena::records::{InMemoryRecords, MatchRecordStore};
use cricket_arena::roster::{
    ensure_playable, InMemoryPlayerStore, PlayerStore, StaticRosters, FALLBACK_AWAY_XI,
    FALLBACK_HOME_XI,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

const ALICE: &str = "alice";
const BOB: &str = "bob";

struct Harness {
    store: Arc<dyn PlayerStore>,
    ledger: Arc<InMemoryLedger>,
    records: Arc<InMemoryRecords>,
    feed: Arc<EventFeed>,
    settler: Settler,
    orchestrator: MatchOrchestrator,
}

impl Harness {
    async fn new(balances: &[(&str, i64)]) -> Self {
        let store: Arc<dyn PlayerStore> = Arc::new(InMemoryPlayerStore::builtin());
        let ledger = Arc::new(
            InMemoryLedger::with_balances(
                balances
                    .iter()
                    .map(|(user, coins)| (UserId::new(*user), *coins)),
            )
            .await,
        );
        let records = Arc::new(InMemoryRecords::new());
        let settler = Settler::new(ledger.clone(), records.clone(), RewardSchedule::default());
        let orchestrator =
            MatchOrchestrator::new(store.clone(), settler.clone(), PromptTimeouts::default());
        Self {
            store,
            ledger,
            records,
            feed: Arc::new(EventFeed::new()),
            settler,
            orchestrator,
        }
    }

    fn setup(&self, match_id: &str, overs: u32) -> MatchSetup {
        MatchSetup {
            match_id: MatchId::new(match_id),
            config: MatchConfig::with_defaults(overs, Difficulty::Easy).unwrap(),
            creator: UserId::new(ALICE),
            opponent: UserId::new(BOB),
            creator_xi: xi(self.store.as_ref(), &FALLBACK_HOME_XI),
            opponent_xi: xi(self.store.as_ref(), &FALLBACK_AWAY_XI),
            creator_label: "Alice XI".to_string(),
            opponent_label: "Bob XI".to_string(),
        }
    }

    async fn play(
        &self,
        setup: MatchSetup,
        responses: Box<dyn ResponseStream>,
        rolls: Vec<u32>,
    ) -> (MatchOutcome, Vec<MatchEvent>) {
        let (_cancel_tx, cancel_rx) = watch::channel(false);
        let match_id = setup.match_id.clone();
        let io = MatchIo::new(responses, self.feed.clone(), cancel_rx);
        let outcome = self
            .orchestrator
            .play_match(setup, io, Box::new(SequenceRandom::new(rolls)))
            .await;
        (outcome, self.feed.all(&match_id).await)
    }
}

fn xi(store: &dyn PlayerStore, fallback: &[&str]) -> PlayingXi {
    ensure_playable(store, None, fallback).unwrap()
}

/// Random draws that make each ball of `shot` land on the given outcome:
/// speed, outcome roll, and a dismissal draw after wickets.
fn rolls_for(shot: ShotType, outcomes: &[Outcome]) -> Vec<u32> {
    let mut rolls = Vec::new();
    for outcome in outcomes {
        rolls.push(0);
        rolls.push(OutcomeResolver::roll_for(shot, *outcome).expect("outcome reachable for shot"));
        if outcome.is_wicket() {
            rolls.push(0);
        }
    }
    rolls
}

/// Toss draw of 0 lands heads. The opponent calls heads first and bats.
fn script(innings: &[&[Outcome]]) -> Vec<u32> {
    let mut rolls = vec![0];
    for outcomes in innings {
        rolls.extend(rolls_for(ShotType::Drive, outcomes));
    }
    rolls
}

fn summaries(events: &[MatchEvent]) -> Vec<&InningsSummary> {
    events
        .iter()
        .filter_map(|e| match e {
            MatchEvent::InningsComplete(summary) => Some(summary.as_ref()),
            _ => None,
        })
        .collect()
}

fn ball_results(events: &[MatchEvent]) -> impl Iterator<Item = &BallRecord> {
    events.iter().filter_map(|e| match e {
        MatchEvent::BallResult(record) => Some(record),
        _ => None,
    })
}

fn prompts_for(events: &[MatchEvent], stage: DecisionStage) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, MatchEvent::Prompt(p) if p.stage == stage))
        .count()
}

#[tokio::test]
async fn test_chasing_side_wins_and_is_paid() {
    use Outcome::*;
    let harness = Harness::new(&[]).await;
    let rolls = script(&[
        &[Four, One, Dot, Two, Four, One],
        &[Four, Four, Four, One],
    ]);
    let (outcome, events) = harness
        .play(harness.setup("chase", 1), Box::new(AutoPilot::new()), rolls)
        .await;

    let MatchOutcome::Completed { result, settlement } = &outcome else {
        panic!("expected completed match, got {:?}", outcome);
    };
    assert_eq!(result.first_innings.batting_user, UserId::new(BOB));
    assert_eq!(result.first_innings.runs, 12);
    assert_eq!(result.target, 13);
    assert_eq!(result.second_innings.runs, 13);
    assert_eq!(result.second_innings.balls, 4);
    assert_eq!(result.winner, Some(UserId::new(ALICE)));
    assert_eq!(result.margin, Margin::Wickets(10));
    assert!(settlement.is_some());

    assert_eq!(harness.ledger.balance(&UserId::new(ALICE)).await.unwrap(), 5000);
    assert_eq!(harness.ledger.balance(&UserId::new(BOB)).await.unwrap(), 1000);
    assert_eq!(harness.records.len().await, 1);

    let cards = summaries(&events);
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0].end, InningsEnd::OversComplete);
    assert_eq!(cards[0].runs_per_over, vec![12]);
    assert_eq!(cards[1].end, InningsEnd::TargetReached);
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, MatchEvent::BallResult(_)))
            .count(),
        10
    );
    assert!(ball_results(&events).all(|b| b.delivery.is_some()));
    assert!(matches!(events.first(), Some(MatchEvent::Prompt(p)) if p.stage == DecisionStage::TossCall));
    assert!(matches!(events.last(), Some(MatchEvent::Finished(_))));
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, MatchEvent::Finished(_)))
            .count(),
        1
    );
}

#[tokio::test]
async fn test_hard_mode_ball_results_hide_delivery() {
    use Outcome::*;
    let harness = Harness::new(&[]).await;
    let mut setup = harness.setup("hidden", 1);
    setup.config = MatchConfig::with_defaults(1, Difficulty::Hard).unwrap();
    let rolls = script(&[
        &[Four, One, Dot, Two, Four, One],
        &[Four, Four, Four, One],
    ]);
    let (outcome, events) = harness
        .play(setup, Box::new(AutoPilot::new()), rolls)
        .await;

    assert_eq!(outcome.status(), "completed");
    assert_eq!(ball_results(&events).count(), 10);
    assert!(ball_results(&events).all(|b| b.delivery.is_none()));
    let json = serde_json::to_string(&events).unwrap();
    assert!(!json.contains(r#""kind":"pace""#));
}

#[tokio::test]
async fn test_all_out_innings_rotates_bowlers_and_batsmen() {
    let harness = Harness::new(&[]).await;
    let rolls = script(&[&[Outcome::Wicket; 10], &[Outcome::One]]);
    let (outcome, events) = harness
        .play(harness.setup("collapse", 2), Box::new(AutoPilot::new()), rolls)
        .await;

    let MatchOutcome::Completed { result, .. } = &outcome else {
        panic!("expected completed match, got {:?}", outcome);
    };
    assert_eq!(result.first_innings.runs, 0);
    assert_eq!(result.first_innings.wickets, 10);
    assert_eq!(result.first_innings.balls, 10);
    assert_eq!(result.target, 1);
    assert_eq!(result.winner, Some(UserId::new(ALICE)));

    let cards = summaries(&events);
    assert_eq!(cards[0].end, InningsEnd::AllOut);
    assert_eq!(cards[0].fall_of_wickets.len(), 10);
    assert_eq!(cards[0].batting_card.len(), 11);

    // Nine replacements: the tenth wicket ends the innings.
    assert_eq!(
        events
            .iter()
            .take_while(|e| !matches!(e, MatchEvent::InningsComplete(_)))
            .filter(|e| matches!(e, MatchEvent::Prompt(p) if p.stage == DecisionStage::NewBatsman))
            .count(),
        9
    );

    let bowlers: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            MatchEvent::BallResult(ball) if ball.innings == 1 => Some(ball.bowler.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(bowlers.len(), 10);
    assert_ne!(bowlers[5], bowlers[6]);
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, MatchEvent::Wicket(_)))
            .count(),
        10
    );
}

#[tokio::test]
async fn test_tie_pays_participation_to_both() {
    use Outcome::*;
    let harness = Harness::new(&[]).await;
    let rolls = script(&[
        &[Four, Two, Dot, Dot, Dot, Dot],
        &[Two, Two, One, One, Dot, Dot],
    ]);
    let (outcome, _events) = harness
        .play(harness.setup("tie", 1), Box::new(AutoPilot::new()), rolls)
        .await;

    let MatchOutcome::Completed { result, settlement } = &outcome else {
        panic!("expected completed match, got {:?}", outcome);
    };
    assert_eq!(result.winner, None);
    assert_eq!(result.margin, Margin::Tie);
    assert_eq!(settlement.as_ref().map(|s| s.credits.len()), Some(2));
    for user in [ALICE, BOB] {
        assert_eq!(harness.ledger.balance(&UserId::new(user)).await.unwrap(), 1000);
        let record = harness.records.user_record(&UserId::new(user)).await.unwrap();
        assert_eq!(record.ties, 1);
    }
}

#[tokio::test(start_paused = true)]
async fn test_batting_stall_forfeits_with_single_penalty() {
    let harness = Harness::new(&[(ALICE, 10_000), (BOB, 300)]).await;
    let pilot = AutoPilot::new().stall_on(DecisionStage::Shot, UserId::new(BOB));
    let (outcome, events) = harness
        .play(harness.setup("stall", 2), Box::new(pilot), vec![0])
        .await;

    let MatchOutcome::Forfeited {
        forfeited_by,
        stage,
        penalty,
    } = &outcome
    else {
        panic!("expected forfeit, got {:?}", outcome);
    };
    assert_eq!(forfeited_by, &UserId::new(BOB));
    assert_eq!(*stage, DecisionStage::Shot);
    let receipt = penalty.as_ref().and_then(|p| p.receipt).unwrap();
    assert_eq!(receipt.requested, 500);
    assert_eq!(receipt.debited, 300);

    assert_eq!(harness.ledger.balance(&UserId::new(BOB)).await.unwrap(), 0);
    assert_eq!(harness.ledger.balance(&UserId::new(ALICE)).await.unwrap(), 10_000);
    assert_eq!(harness.records.len().await, 0);

    let cards = summaries(&events);
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].end, InningsEnd::Forfeited);
    assert_eq!(cards[0].score.wickets, 10);
    assert!(matches!(events.last(), Some(MatchEvent::Finished(_))));

    let again = harness
        .settler
        .penalize(&MatchId::new("stall"), &UserId::new(BOB))
        .await
        .unwrap();
    assert!(again.already_settled);
    assert_eq!(harness.ledger.journal(&UserId::new(BOB), 10).await.unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_bowling_stall_forfeits_without_innings_summary() {
    let harness = Harness::new(&[(ALICE, 2_000)]).await;
    let pilot = AutoPilot::new().stall_on(DecisionStage::Bowler, UserId::new(ALICE));
    let started = tokio::time::Instant::now();
    let (outcome, events) = harness
        .play(harness.setup("idle-bowler", 2), Box::new(pilot), vec![0])
        .await;

    assert!(matches!(
        &outcome,
        MatchOutcome::Forfeited { forfeited_by, stage: DecisionStage::Bowler, .. }
            if *forfeited_by == UserId::new(ALICE)
    ));
    assert_eq!(started.elapsed(), Duration::from_secs(60));
    assert!(summaries(&events).is_empty());
    assert_eq!(prompts_for(&events, DecisionStage::Opener), 2);
    assert_eq!(harness.ledger.balance(&UserId::new(ALICE)).await.unwrap(), 1_500);
}

/// Alice bowls first and goes silent at `stage`; returns the match events.
async fn play_delivery_stall(
    match_id: &str,
    pilot: AutoPilot,
    stage: DecisionStage,
) -> Vec<MatchEvent> {
    let harness = Harness::new(&[(ALICE, 2_000)]).await;
    let (outcome, events) = harness
        .play(harness.setup(match_id, 2), Box::new(pilot), vec![0])
        .await;

    let MatchOutcome::Forfeited {
        forfeited_by,
        stage: stalled_at,
        penalty,
    } = &outcome
    else {
        panic!("expected forfeit, got {:?}", outcome);
    };
    assert_eq!(forfeited_by, &UserId::new(ALICE));
    assert_eq!(*stalled_at, stage);
    assert_eq!(penalty.as_ref().and_then(|p| p.receipt).map(|r| r.debited), Some(500));

    assert_eq!(harness.ledger.balance(&UserId::new(ALICE)).await.unwrap(), 1_500);
    assert_eq!(harness.ledger.journal(&UserId::new(ALICE), 10).await.unwrap().len(), 1);
    assert_eq!(harness.records.len().await, 0);
    assert!(summaries(&events).is_empty());
    assert_eq!(prompts_for(&events, DecisionStage::Shot), 0);
    events
}

#[tokio::test(start_paused = true)]
async fn test_pace_type_stall_forfeits() {
    let pilot = AutoPilot::new().stall_on(DecisionStage::PaceType, UserId::new(ALICE));
    let events = play_delivery_stall("idle-pace", pilot, DecisionStage::PaceType).await;
    assert_eq!(prompts_for(&events, DecisionStage::PaceType), 1);
    assert_eq!(prompts_for(&events, DecisionStage::Length), 0);
}

#[tokio::test(start_paused = true)]
async fn test_length_stall_forfeits() {
    let pilot = AutoPilot::new().stall_on(DecisionStage::Length, UserId::new(ALICE));
    let events = play_delivery_stall("idle-length", pilot, DecisionStage::Length).await;
    assert_eq!(prompts_for(&events, DecisionStage::PaceType), 1);
    assert_eq!(prompts_for(&events, DecisionStage::Length), 1);
}

#[tokio::test(start_paused = true)]
async fn test_spin_delivery_stall_forfeits() {
    // Ashwin gets the off-spin menu instead of pace and length.
    let pilot = AutoPilot::new()
        .with_bowlers(vec![PlayerId::new("bowl_0002")])
        .stall_on(DecisionStage::SpinDelivery, UserId::new(ALICE));
    let events = play_delivery_stall("idle-spin", pilot, DecisionStage::SpinDelivery).await;
    assert_eq!(prompts_for(&events, DecisionStage::SpinDelivery), 1);
    assert_eq!(prompts_for(&events, DecisionStage::PaceType), 0);
    let spin_prompt = events.iter().find_map(|e| match e {
        MatchEvent::Prompt(p) if p.stage == DecisionStage::SpinDelivery => Some(p),
        _ => None,
    });
    assert!(spin_prompt
        .unwrap()
        .options
        .iter()
        .any(|o| o.key == "doosra"));
}

#[tokio::test]
async fn test_cancel_before_first_response() {
    let harness = Harness::new(&[]).await;
    let (cancel_tx, cancel_rx) = watch::channel(false);
    let setup = harness.setup("cancelled", 2);
    let io = MatchIo::new(
        Box::new(ScriptedResponses::default()),
        harness.feed.clone(),
        cancel_rx,
    );
    let play = harness
        .orchestrator
        .play_match(setup, io, Box::new(SequenceRandom::new(vec![0])));
    let cancel = async {
        tokio::task::yield_now().await;
        cancel_tx.send(true).unwrap();
    };
    let (outcome, ()) = tokio::join!(play, cancel);

    assert_eq!(outcome, MatchOutcome::Cancelled);
    assert_eq!(harness.records.len().await, 0);
    assert_eq!(harness.ledger.balance(&UserId::new(BOB)).await.unwrap(), 0);
}

fn registry(harness: Harness) -> (MatchRegistry, Arc<InMemoryLedger>) {
    let ledger = harness.ledger.clone();
    let registry = MatchRegistry::new(
        Arc::new(harness.orchestrator),
        Arc::new(StaticRosters::new()),
        ledger.clone(),
        harness.feed,
        50_000,
    );
    (registry, ledger)
}

fn start_request(channel: &str) -> StartMatch {
    StartMatch {
        channel_id: ChannelId::new(channel),
        creator: UserId::new(ALICE),
        opponent: UserId::new(BOB),
        overs: 2,
        difficulty: Difficulty::Hard,
        seed: Some(7),
    }
}

#[tokio::test]
async fn test_registry_one_match_per_channel_and_creator_only_cancel() {
    let (registry, ledger) = registry(Harness::new(&[]).await);
    let match_id = registry.start(start_request("general")).await.unwrap();
    assert!(registry.is_active(&match_id).await);
    assert_eq!(ledger.balance(&UserId::new(BOB)).await.unwrap(), 50_000);

    let busy = registry.start(start_request("general")).await;
    assert!(matches!(busy, Err(RegistryError::ChannelBusy(_))));

    let refused = registry.cancel(&match_id, &UserId::new(BOB)).await;
    assert!(matches!(refused, Err(RegistryError::NotCreator)));

    registry.cancel(&match_id, &UserId::new(ALICE)).await.unwrap();
    let outcome = registry
        .wait_for_outcome(&match_id, Duration::from_secs(5))
        .await
        .expect("match should finish after cancel");
    assert_eq!(outcome, MatchOutcome::Cancelled);
    assert!(!registry.is_active(&match_id).await);
    assert_eq!(registry.active_in(&ChannelId::new("general")).await, None);

    let events = registry.events(&match_id, 0).await.unwrap();
    assert!(matches!(
        events.last().map(|e| &e.event),
        Some(MatchEvent::Finished(_))
    ));

    // Channel is free again.
    let next = registry.start(start_request("general")).await.unwrap();
    assert_ne!(next, match_id);
    registry.cancel(&next, &UserId::new(ALICE)).await.unwrap();
}

#[tokio::test]
async fn test_registry_rejects_invalid_requests() {
    let (registry, _ledger) = registry(Harness::new(&[]).await);

    let mut same_user = start_request("c1");
    same_user.opponent = UserId::new(ALICE);
    assert!(matches!(
        registry.start(same_user).await,
        Err(RegistryError::Invalid(_))
    ));

    let mut too_long = start_request("c1");
    too_long.overs = 51;
    assert!(matches!(
        registry.start(too_long).await,
        Err(RegistryError::Invalid(_))
    ));

    let mut zero = start_request("c1");
    zero.overs = 0;
    assert!(registry.start(zero).await.is_err());

    // Rejected requests do not hold the channel.
    assert_eq!(registry.active_in(&ChannelId::new("c1")).await, None);
    assert!(matches!(
        registry
            .respond(
                &MatchId::new("missing"),
                cricket_arena::interaction::ActorResponse::new(UserId::new(ALICE), "heads")
            )
            .await,
        Err(RegistryError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_registry_autopilot_match_completes() {
    let (registry, ledger) = registry(Harness::new(&[]).await);
    let match_id = registry
        .start_with(
            start_request("demo"),
            Some(Box::new(AutoPilot::new().with_shots(vec![
                ShotType::Loft,
                ShotType::Drive,
                ShotType::Defend,
            ]))),
        )
        .await
        .unwrap();

    let outcome = registry
        .wait_for_outcome(&match_id, Duration::from_secs(10))
        .await
        .expect("autopilot match should finish");
    let MatchOutcome::Completed { result, settlement } = outcome else {
        panic!("expected completed match");
    };
    assert!(settlement.is_some());
    let alice = ledger.balance(&UserId::new(ALICE)).await.unwrap();
    let bob = ledger.balance(&UserId::new(BOB)).await.unwrap();
    match &result.winner {
        Some(_) => assert_eq!(alice + bob, 100_000 + 6_000),
        None => assert_eq!(alice + bob, 100_000 + 2_000),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_registry_runs_matches_on_worker_threads() {
    let (registry, ledger) = registry(Harness::new(&[]).await);
    let mut ids = Vec::new();
    for channel in ["north", "south"] {
        let id = registry
            .start_with(start_request(channel), Some(Box::new(AutoPilot::new())))
            .await
            .unwrap();
        ids.push(id);
    }

    for id in &ids {
        let outcome = registry
            .wait_for_outcome(id, Duration::from_secs(10))
            .await
            .expect("match should finish");
        assert_eq!(outcome.status(), "completed");
    }
    assert_eq!(registry.active_count().await, 0);
    let total = ledger.balance(&UserId::new(ALICE)).await.unwrap()
        + ledger.balance(&UserId::new(BOB)).await.unwrap();
    assert!(total >= 100_000 + 2_000);
}

#[tokio::test]
async fn test_registry_evicts_oldest_finished_match() {
    let (registry, _ledger) = registry(Harness::new(&[]).await);
    let registry = registry.with_retention(1);

    let first = registry.start(start_request("c1")).await.unwrap();
    registry.cancel(&first, &UserId::new(ALICE)).await.unwrap();
    registry
        .wait_for_outcome(&first, Duration::from_secs(5))
        .await
        .expect("first match should finish");

    let second = registry.start(start_request("c2")).await.unwrap();
    registry.cancel(&second, &UserId::new(ALICE)).await.unwrap();
    registry
        .wait_for_outcome(&second, Duration::from_secs(5))
        .await
        .expect("second match should finish");

    let evicted = tokio::time::timeout(Duration::from_secs(5), async {
        while registry.events(&first, 0).await.is_some() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    assert!(evicted.is_ok(), "event log of the first match was kept");
    assert_eq!(registry.outcome(&first).await, None);
    assert_eq!(registry.finished_count().await, 1);
    assert_eq!(registry.outcome(&second).await, Some(MatchOutcome::Cancelled));
    assert!(registry.events(&second, 0).await.is_some());
}
