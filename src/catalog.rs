//! Game Catalogue
//!
//! The fixed list of games featured on the hub, with URL-safe slugs used
//! as anchors for each community section.

use serde::Serialize;

/// Featured games, in display order
const FEATURED: &[&str] = &[
    "Fortnite",
    "League of Legends",
    "Call of Duty",
    "Minecraft",
    "Valorant",
    "CS2",
    "Apex Legends",
    "GTA V",
    "Roblox",
];

/// A featured game
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Game {
    /// Display name
    pub name: String,
    /// Anchor slug derived from the name
    pub slug: String,
}

impl Game {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let slug = slugify(&name);
        Self { name, slug }
    }

    /// Short call-to-action shown under the game name
    pub fn blurb(&self) -> String {
        format!(
            "Join the {} community & chat with our AI for tips.",
            self.name
        )
    }
}

/// All featured games in display order
pub fn games() -> Vec<Game> {
    FEATURED.iter().map(|name| Game::new(*name)).collect()
}

/// Lowercase the name and collapse each whitespace run into a single `-`
pub fn slugify(name: &str) -> String {
    name.split_whitespace()
        .map(|part| part.to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_games_order() {
        let games = games();
        assert_eq!(games.len(), 9);
        assert_eq!(games[0].name, "Fortnite");
        assert_eq!(games[8].name, "Roblox");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("League of Legends"), "league-of-legends");
        assert_eq!(slugify("GTA  V"), "gta-v");
        assert_eq!(slugify("CS2"), "cs2");
    }

    #[test]
    fn test_blurb() {
        let game = Game::new("Minecraft");
        assert_eq!(
            game.blurb(),
            "Join the Minecraft community & chat with our AI for tips."
        );
    }
}
