//! Game catalog.
//!
//! The service hosts gomoku; chess is declared in the catalog but has no
//! playable implementation yet.

pub mod gomoku;

use serde::{Deserialize, Serialize};

/// The games the service knows about.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GameKind {
    /// 20x20 five-in-a-row.
    Gomoku,
    /// Placeholder entry; no rules implemented.
    Chess,
}

/// Catalog entry describing one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameInfo {
    /// Which game this entry describes.
    pub kind: GameKind,
    /// URL-friendly identifier.
    pub slug: String,
    /// Human-readable name.
    pub name: String,
    /// Short description shown in lobby listings.
    pub description: String,
    /// Whether rooms can actually be played for this game.
    pub playable: bool,
}

/// Returns the catalog of known games.
pub fn catalog() -> Vec<GameInfo> {
    vec![
        GameInfo {
            kind: GameKind::Gomoku,
            slug: "gomoku".to_string(),
            name: "Gomoku 20x20".to_string(),
            description: "Online five-in-a-row for two players, with per-room scores and chat."
                .to_string(),
            playable: true,
        },
        GameInfo {
            kind: GameKind::Chess,
            slug: "chess".to_string(),
            name: "Chess".to_string(),
            description: "Not yet available.".to_string(),
            playable: false,
        },
    ]
}
