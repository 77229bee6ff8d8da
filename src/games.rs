//! Closed game and vibe vocabularies plus the per-game rank whitelists.
//!
//! Adding a game or reshuffling a rank ladder is a data change in this
//! file; nothing else in the crate names an individual game.

use crate::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Game {
    Valorant,
    Csgo,
    Apex,
    Lol,
}

impl Game {
    pub const ALL: [Game; 4] = [Game::Valorant, Game::Csgo, Game::Apex, Game::Lol];

    pub fn as_str(self) -> &'static str {
        match self {
            Game::Valorant => "valorant",
            Game::Csgo => "csgo",
            Game::Apex => "apex",
            Game::Lol => "lol",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Game::Valorant => "Valorant",
            Game::Csgo => "CS:GO",
            Game::Apex => "Apex Legends",
            Game::Lol => "League of Legends",
        }
    }

    pub fn parse(value: &str) -> Result<Game, AppError> {
        match value {
            "valorant" => Ok(Game::Valorant),
            "csgo" => Ok(Game::Csgo),
            "apex" => Ok(Game::Apex),
            "lol" => Ok(Game::Lol),
            other => Err(AppError::InvalidGame(other.to_owned())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vibe {
    Serious,
    Chill,
    Competitive,
    Casual,
    Tryhard,
}

impl Vibe {
    pub fn as_str(self) -> &'static str {
        match self {
            Vibe::Serious => "serious",
            Vibe::Chill => "chill",
            Vibe::Competitive => "competitive",
            Vibe::Casual => "casual",
            Vibe::Tryhard => "tryhard",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Vibe::Serious => "Serious",
            Vibe::Chill => "Chill",
            Vibe::Competitive => "Competitive",
            Vibe::Casual => "Casual",
            Vibe::Tryhard => "Tryhard",
        }
    }

    pub fn parse(value: &str) -> Result<Vibe, AppError> {
        match value {
            "serious" => Ok(Vibe::Serious),
            "chill" => Ok(Vibe::Chill),
            "competitive" => Ok(Vibe::Competitive),
            "casual" => Ok(Vibe::Casual),
            "tryhard" => Ok(Vibe::Tryhard),
            other => Err(AppError::Validation(format!("unknown vibe '{other}'"))),
        }
    }
}

pub const VALORANT_RANKS: &[(&str, &str)] = &[
    ("iron1", "Iron 1"),
    ("iron2", "Iron 2"),
    ("iron3", "Iron 3"),
    ("bronze1", "Bronze 1"),
    ("bronze2", "Bronze 2"),
    ("bronze3", "Bronze 3"),
    ("silver1", "Silver 1"),
    ("silver2", "Silver 2"),
    ("silver3", "Silver 3"),
    ("gold1", "Gold 1"),
    ("gold2", "Gold 2"),
    ("gold3", "Gold 3"),
    ("platinum1", "Platinum 1"),
    ("platinum2", "Platinum 2"),
    ("platinum3", "Platinum 3"),
    ("diamond1", "Diamond 1"),
    ("diamond2", "Diamond 2"),
    ("diamond3", "Diamond 3"),
    ("ascendant1", "Ascendant 1"),
    ("ascendant2", "Ascendant 2"),
    ("ascendant3", "Ascendant 3"),
    ("immortal1", "Immortal 1"),
    ("immortal2", "Immortal 2"),
    ("immortal3", "Immortal 3"),
    ("radiant", "Radiant"),
    ("unranked", "Unranked"),
];

pub const CSGO_RANKS: &[(&str, &str)] = &[
    ("0-1k", "0-1k Rating"),
    ("1k-5k", "1k-5k Rating"),
    ("5k-10k", "5k-10k Rating"),
    ("10k-15k", "10k-15k Rating"),
    ("15k-20k", "15k-20k Rating"),
    ("20k+", "20k+ Rating"),
    ("unranked", "Unranked"),
];

pub const APEX_RANKS: &[(&str, &str)] = &[
    ("rookie", "Rookie"),
    ("bronze", "Bronze"),
    ("silver", "Silver"),
    ("gold", "Gold"),
    ("platinum", "Platinum"),
    ("diamond", "Diamond"),
    ("master", "Master"),
    ("predator", "Predator"),
    ("unranked", "Unranked"),
];

pub const LOL_RANKS: &[(&str, &str)] = &[
    ("iron", "Iron"),
    ("bronze", "Bronze"),
    ("silver", "Silver"),
    ("gold", "Gold"),
    ("platinum", "Platinum"),
    ("diamond", "Diamond"),
    ("master", "Master"),
    ("grandmaster", "Grandmaster"),
    ("challenger", "Challenger"),
    ("unranked", "Unranked"),
];

/// The (value, label) rank whitelist for a game.
pub fn ranks_for(game: Game) -> &'static [(&'static str, &'static str)] {
    match game {
        Game::Valorant => VALORANT_RANKS,
        Game::Csgo => CSGO_RANKS,
        Game::Apex => APEX_RANKS,
        Game::Lol => LOL_RANKS,
    }
}

/// A rank is only valid if it appears in its game's whitelist verbatim.
pub fn validate_rank(game: Game, rank: &str) -> Result<(), AppError> {
    if ranks_for(game).iter().any(|(value, _)| *value == rank) {
        Ok(())
    } else {
        Err(AppError::InvalidRank {
            game: game.as_str().to_owned(),
            rank: rank.to_owned(),
        })
    }
}

/// Capitalizes a stored rank value for display ("gold1" -> "Gold1").
pub fn title_case(rank: &str) -> String {
    let mut chars = rank.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
