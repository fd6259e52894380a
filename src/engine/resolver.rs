//! Outcome Resolver: shot type to a weighted outcome draw.
//!
//! The table is fixed and keyed by shot only. The delivery is carried on the
//! ball record for display but does not move the weights. Every row sums to
//! 100 and is drawn with one `next_below(100)` roll.

use super::rng::RandomSource;
use crate::domain::{Delivery, DismissalKind, Outcome, ShotType};

pub const ROLL_RANGE: u32 = 100;
pub const MIN_SPEED_KMPH: u16 = 130;
pub const MAX_SPEED_KMPH: u16 = 155;

const DEFEND: &[(Outcome, u32)] = &[(Outcome::Dot, 70), (Outcome::One, 25), (Outcome::Wicket, 5)];
const DRIVE: &[(Outcome, u32)] = &[
    (Outcome::Four, 30),
    (Outcome::Two, 25),
    (Outcome::One, 20),
    (Outcome::Dot, 15),
    (Outcome::Wicket, 10),
];
const LOFT: &[(Outcome, u32)] = &[
    (Outcome::Six, 25),
    (Outcome::Four, 20),
    (Outcome::One, 15),
    (Outcome::Wicket, 40),
];
const SWEEP: &[(Outcome, u32)] = &[
    (Outcome::Four, 30),
    (Outcome::Two, 25),
    (Outcome::One, 20),
    (Outcome::Wicket, 25),
];
const CUT: &[(Outcome, u32)] = &[
    (Outcome::Four, 35),
    (Outcome::Two, 20),
    (Outcome::One, 25),
    (Outcome::Dot, 10),
    (Outcome::Wicket, 10),
];
const LEAVE: &[(Outcome, u32)] = &[(Outcome::Dot, 95), (Outcome::Wicket, 5)];
const PULL: &[(Outcome, u32)] = &[
    (Outcome::Six, 20),
    (Outcome::Four, 30),
    (Outcome::One, 20),
    (Outcome::Wicket, 30),
];
const FLICK: &[(Outcome, u32)] = &[
    (Outcome::Two, 30),
    (Outcome::One, 40),
    (Outcome::Four, 15),
    (Outcome::Wicket, 15),
];

/// One resolved delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub outcome: Outcome,
    pub speed_kmph: u16,
    pub dismissal: Option<DismissalKind>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OutcomeResolver;

impl OutcomeResolver {
    pub fn new() -> Self {
        Self
    }

    /// Weight row for a shot, in draw order.
    pub fn weights(shot: ShotType) -> &'static [(Outcome, u32)] {
        match shot {
            ShotType::Defend => DEFEND,
            ShotType::Drive => DRIVE,
            ShotType::Loft => LOFT,
            ShotType::Sweep => SWEEP,
            ShotType::Cut => CUT,
            ShotType::Leave => LEAVE,
            ShotType::Pull => PULL,
            ShotType::Flick => FLICK,
        }
    }

    /// Map a roll in `[0, 100)` to an outcome.
    pub fn outcome_for_roll(shot: ShotType, roll: u32) -> Outcome {
        let mut upper = 0;
        for (outcome, weight) in Self::weights(shot) {
            upper += weight;
            if roll < upper {
                return *outcome;
            }
        }
        Outcome::Dot
    }

    /// Smallest roll producing `outcome` for `shot`, if the shot can produce it.
    pub fn roll_for(shot: ShotType, outcome: Outcome) -> Option<u32> {
        let mut lower = 0;
        for (candidate, weight) in Self::weights(shot) {
            if *candidate == outcome {
                return Some(lower);
            }
            lower += weight;
        }
        None
    }

    /// Resolve one ball. Draw order: speed, outcome roll, dismissal kind on a wicket.
    pub fn resolve(
        &self,
        shot: ShotType,
        _delivery: &Delivery,
        rng: &mut dyn RandomSource,
    ) -> Resolution {
        let speed_kmph = Self::bowl_speed(rng);
        let outcome = Self::outcome_for_roll(shot, rng.next_below(ROLL_RANGE));
        let dismissal = outcome.is_wicket().then(|| Self::dismissal(rng));
        Resolution {
            outcome,
            speed_kmph,
            dismissal,
        }
    }

    fn bowl_speed(rng: &mut dyn RandomSource) -> u16 {
        let span = u32::from(MAX_SPEED_KMPH - MIN_SPEED_KMPH) + 1;
        // next_below(span) < 26, so the cast is lossless.
        MIN_SPEED_KMPH + rng.next_below(span) as u16
    }

    fn dismissal(rng: &mut dyn RandomSource) -> DismissalKind {
        let idx = rng.next_below(DismissalKind::ALL.len() as u32) as usize;
        DismissalKind::ALL
            .get(idx)
            .copied()
            .unwrap_or(DismissalKind::Bowled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Length, PaceType};
    use crate::engine::rng::SequenceRandom;

    fn delivery() -> Delivery {
        Delivery::Pace {
            pace: PaceType::Quick,
            length: Length::GoodLength,
        }
    }

    #[test]
    fn test_every_row_sums_to_one_hundred() {
        for shot in ShotType::ALL {
            let total: u32 = OutcomeResolver::weights(shot).iter().map(|(_, w)| w).sum();
            assert_eq!(total, ROLL_RANGE, "{:?}", shot);
        }
    }

    #[test]
    fn test_defend_boundaries() {
        assert_eq!(OutcomeResolver::outcome_for_roll(ShotType::Defend, 0), Outcome::Dot);
        assert_eq!(OutcomeResolver::outcome_for_roll(ShotType::Defend, 69), Outcome::Dot);
        assert_eq!(OutcomeResolver::outcome_for_roll(ShotType::Defend, 70), Outcome::One);
        assert_eq!(OutcomeResolver::outcome_for_roll(ShotType::Defend, 95), Outcome::Wicket);
    }

    #[test]
    fn test_roll_for_inverts_table() {
        for shot in ShotType::ALL {
            for (outcome, _) in OutcomeResolver::weights(shot) {
                let roll = OutcomeResolver::roll_for(shot, *outcome).unwrap();
                assert_eq!(OutcomeResolver::outcome_for_roll(shot, roll), *outcome);
            }
        }
        assert_eq!(OutcomeResolver::roll_for(ShotType::Leave, Outcome::Six), None);
    }

    #[test]
    fn test_resolve_draw_order() {
        // speed 10 -> 140 km/h, roll 0 with loft -> six, no dismissal draw
        let mut rng = SequenceRandom::new([10, 0]);
        let res = OutcomeResolver::new().resolve(ShotType::Loft, &delivery(), &mut rng);
        assert_eq!(res.outcome, Outcome::Six);
        assert_eq!(res.speed_kmph, 140);
        assert_eq!(res.dismissal, None);
    }

    #[test]
    fn test_resolve_wicket_draws_dismissal() {
        // roll 99 with loft -> wicket, dismissal index 3 -> stumped
        let mut rng = SequenceRandom::new([25, 99, 3]);
        let res = OutcomeResolver::new().resolve(ShotType::Loft, &delivery(), &mut rng);
        assert_eq!(res.outcome, Outcome::Wicket);
        assert_eq!(res.speed_kmph, MAX_SPEED_KMPH);
        assert_eq!(res.dismissal, Some(DismissalKind::Stumped));
        assert_eq!(rng.remaining(), 0);
    }
}
