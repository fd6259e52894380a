//! CSV player catalogue loader.
//!
//! Expected header: `id,name,role,batting,bowling,country,bowling_style`.
//! `bowling_style` may be empty.

use super::RosterError;
use crate::domain::{BowlingStyle, Player, PlayerId, Role};
use std::path::Path;

#[derive(Debug, serde::Deserialize)]
struct PlayerRow {
    id: String,
    name: String,
    role: String,
    batting: u8,
    bowling: u8,
    country: String,
    bowling_style: Option<String>,
}

pub fn parse_players_csv(bytes: &[u8]) -> Result<Vec<Player>, RosterError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let mut players = Vec::new();
    for record in reader.deserialize::<PlayerRow>() {
        let row = record.map_err(|e| RosterError::Csv(e.to_string()))?;
        let role = row
            .role
            .parse::<Role>()
            .map_err(|e| RosterError::Csv(format!("{}: {}", row.id, e)))?;
        let bowling_style = match row.bowling_style.as_deref() {
            None | Some("") => None,
            Some(s) => Some(
                s.parse::<BowlingStyle>()
                    .map_err(|e| RosterError::Csv(format!("{}: {}", row.id, e)))?,
            ),
        };
        if row.batting > 100 || row.bowling > 100 {
            return Err(RosterError::Csv(format!("{}: rating above 100", row.id)));
        }

        players.push(Player {
            id: PlayerId::new(row.id),
            name: row.name,
            role,
            batting: row.batting,
            bowling: row.bowling,
            country: row.country,
            bowling_style,
        });
    }

    Ok(players)
}

pub fn load_players_csv(path: impl AsRef<Path>) -> Result<Vec<Player>, RosterError> {
    let bytes = std::fs::read(path)?;
    parse_players_csv(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_rows() {
        let csv = b"id,name,role,batting,bowling,country,bowling_style\n\
            bat_0101,Shai Hope,batsman,80,10,WI,\n\
            bowl_0101,Adil Rashid,bowler,35,82,ENG,spin\n";
        let players = parse_players_csv(csv).unwrap();
        assert_eq!(players.len(), 2);
        assert_eq!(players[0].bowling_style, None);
        assert_eq!(players[1].role, Role::Bowler);
        assert_eq!(players[1].bowling_style, Some(BowlingStyle::Spin));
    }

    #[test]
    fn test_parse_rejects_bad_role() {
        let csv = b"id,name,role,batting,bowling,country,bowling_style\n\
            x_1,Someone,captain,50,50,IND,\n";
        let err = parse_players_csv(csv).unwrap_err();
        assert!(matches!(err, RosterError::Csv(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("players.csv");
        std::fs::write(
            &path,
            "id,name,role,batting,bowling,country,bowling_style\nwk_0101,Tom Latham,wicket_keeper,78,5,NZ,\n",
        )
        .unwrap();
        let players = load_players_csv(&path).unwrap();
        assert_eq!(players[0].role, Role::WicketKeeper);
    }
}
