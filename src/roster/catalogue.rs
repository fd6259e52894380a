//! Built-in player catalogue and the fallback XIs.

use crate::domain::{BowlingStyle, Player, PlayerId, Role};

pub const FALLBACK_HOME_XI: [&str; 11] = [
    "bat_0001", "bat_0002", "bat_0003", "bat_0004", "bowl_0001", "bowl_0002", "bowl_0003",
    "ar_0001", "ar_0002", "wk_0001", "wk_0002",
];

pub const FALLBACK_AWAY_XI: [&str; 11] = [
    "bat_0005", "bat_0006", "bat_0007", "bat_0008", "bowl_0004", "bowl_0005", "bowl_0006",
    "ar_0003", "ar_0004", "wk_0003", "wk_0004",
];

type Entry = (
    &'static str,
    &'static str,
    Role,
    u8,
    u8,
    &'static str,
    Option<BowlingStyle>,
);

const CATALOGUE: &[Entry] = &[
    ("bat_0001", "Virat Kohli", Role::Batsman, 92, 20, "IND", None),
    ("bat_0002", "Rohit Sharma", Role::Batsman, 88, 15, "IND", None),
    ("bat_0003", "Steve Smith", Role::Batsman, 90, 25, "AUS", Some(BowlingStyle::Spin)),
    ("bat_0004", "Kane Williamson", Role::Batsman, 89, 20, "NZ", Some(BowlingStyle::Spin)),
    ("bat_0005", "Joe Root", Role::Batsman, 90, 30, "ENG", Some(BowlingStyle::Spin)),
    ("bat_0006", "Babar Azam", Role::Batsman, 89, 10, "PAK", None),
    ("bat_0007", "David Warner", Role::Batsman, 85, 10, "AUS", None),
    ("bat_0008", "Shubman Gill", Role::Batsman, 84, 10, "IND", None),
    ("bowl_0001", "Jasprit Bumrah", Role::Bowler, 20, 94, "IND", Some(BowlingStyle::Pace)),
    ("bowl_0002", "Ravichandran Ashwin", Role::Bowler, 45, 88, "IND", Some(BowlingStyle::Spin)),
    ("bowl_0003", "Kuldeep Yadav", Role::Bowler, 20, 84, "IND", Some(BowlingStyle::Spin)),
    ("bowl_0004", "Pat Cummins", Role::Bowler, 40, 91, "AUS", Some(BowlingStyle::Pace)),
    ("bowl_0005", "Rashid Khan", Role::Bowler, 45, 90, "AFG", Some(BowlingStyle::Spin)),
    ("bowl_0006", "Nathan Lyon", Role::Bowler, 25, 85, "AUS", Some(BowlingStyle::Spin)),
    ("ar_0001", "Ravindra Jadeja", Role::AllRounder, 75, 84, "IND", Some(BowlingStyle::Spin)),
    ("ar_0002", "Hardik Pandya", Role::AllRounder, 78, 72, "IND", Some(BowlingStyle::Pace)),
    ("ar_0003", "Ben Stokes", Role::AllRounder, 82, 78, "ENG", Some(BowlingStyle::Pace)),
    ("ar_0004", "Moeen Ali", Role::AllRounder, 72, 70, "ENG", Some(BowlingStyle::Spin)),
    ("wk_0001", "Rishabh Pant", Role::WicketKeeper, 84, 5, "IND", None),
    ("wk_0002", "KL Rahul", Role::WicketKeeper, 83, 5, "IND", None),
    ("wk_0003", "Jos Buttler", Role::WicketKeeper, 86, 5, "ENG", None),
    ("wk_0004", "Quinton de Kock", Role::WicketKeeper, 85, 5, "SA", None),
];

pub fn builtin_players() -> Vec<Player> {
    CATALOGUE
        .iter()
        .map(|(id, name, role, batting, bowling, country, style)| Player {
            id: PlayerId::new(*id),
            name: (*name).to_string(),
            role: *role,
            batting: *batting,
            bowling: *bowling,
            country: (*country).to_string(),
            bowling_style: *style,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BowlerSpecialty;
    use std::collections::HashMap;

    #[test]
    fn test_fallback_xis_are_in_catalogue() {
        let players: HashMap<String, Player> = builtin_players()
            .into_iter()
            .map(|p| (p.id.0.clone(), p))
            .collect();
        for id in FALLBACK_HOME_XI.iter().chain(FALLBACK_AWAY_XI.iter()) {
            assert!(players.contains_key(*id), "missing {}", id);
        }
    }

    #[test]
    fn test_catalogue_specialties() {
        let players: HashMap<String, Player> = builtin_players()
            .into_iter()
            .map(|p| (p.id.0.clone(), p))
            .collect();
        assert_eq!(players["bowl_0001"].specialty(), BowlerSpecialty::Fast);
        assert_eq!(players["bowl_0002"].specialty(), BowlerSpecialty::OffSpin);
        assert_eq!(players["bowl_0003"].specialty(), BowlerSpecialty::LegSpin);
        assert_eq!(players["bowl_0005"].specialty(), BowlerSpecialty::LegSpin);
        assert_eq!(players["ar_0004"].specialty(), BowlerSpecialty::OffSpin);
    }
}
