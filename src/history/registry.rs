//! Player name registry
//!
//! Maps player ids to display names. Seeded from configuration and grown
//! lazily with placeholder names; entries are never removed.

use std::collections::HashMap;

/// Display-name lookup for player ids
#[derive(Debug, Clone, Default)]
pub struct PlayerRegistry {
    names: HashMap<String, String>,
}

impl PlayerRegistry {
    /// Create a registry seeded with known names
    pub fn new(seed: HashMap<String, String>) -> Self {
        Self { names: seed }
    }

    /// Placeholder name for an id nobody has named
    pub fn placeholder(player_id: &str) -> String {
        format!("Player_{}", player_id)
    }

    /// Make sure `player_id` has a name, inserting a placeholder if needed.
    ///
    /// Returns `true` if the id was new.
    pub fn observe(&mut self, player_id: &str) -> bool {
        if self.names.contains_key(player_id) {
            return false;
        }
        self.names
            .insert(player_id.to_string(), Self::placeholder(player_id));
        true
    }

    /// Display name for a player, falling back to the placeholder
    pub fn display_name(&self, player_id: &str) -> String {
        self.names
            .get(player_id)
            .cloned()
            .unwrap_or_else(|| Self::placeholder(player_id))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> PlayerRegistry {
        let mut seed = HashMap::new();
        seed.insert("114514".to_string(), "Veteran".to_string());
        PlayerRegistry::new(seed)
    }

    #[test]
    fn test_seeded_name() {
        let registry = seeded();
        assert_eq!(registry.display_name("114514"), "Veteran");
    }

    #[test]
    fn test_observe_adds_placeholder_once() {
        let mut registry = seeded();

        assert!(registry.observe("42"));
        assert!(!registry.observe("42"));
        assert!(!registry.observe("114514"));
        assert_eq!(registry.display_name("42"), "Player_42");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_unknown_name_falls_back() {
        let registry = PlayerRegistry::default();
        assert_eq!(registry.display_name("7"), "Player_7");
        assert!(registry.is_empty());
    }
}
