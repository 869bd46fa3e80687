use crate::game::GameRecord;

/// Ordered games for the rotation. Priority entries always come first; the
/// cursor points at the next entry to present.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<GameRecord>,
    cursor: usize,
    // Latest priority set as fetched, which may include games the catalog
    // does not hold.
    priority_games: Vec<GameRecord>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[GameRecord] {
        &self.entries
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current(&self) -> Option<&GameRecord> {
        self.entries.get(self.cursor)
    }

    pub fn get(&self, id: &str) -> Option<&GameRecord> {
        self.entries.iter().find(|g| g.id == id)
    }

    pub fn priority_games(&self) -> &[GameRecord] {
        &self.priority_games
    }

    pub fn priority_count(&self) -> usize {
        self.entries.iter().take_while(|g| g.is_priority).count()
    }

    pub fn has_priority(&self) -> bool {
        self.entries.first().is_some_and(|g| g.is_priority)
    }

    pub fn replace(&mut self, priority: Vec<GameRecord>, others: Vec<GameRecord>) {
        let mut entries: Vec<GameRecord> = priority
            .into_iter()
            .chain(others)
            .filter(|g| !g.is_final())
            .collect();
        // Stable, so feed order survives inside each partition.
        entries.sort_by_key(|g| !g.is_priority);
        self.priority_games = entries.iter().filter(|g| g.is_priority).cloned().collect();
        self.entries = entries;
        self.cursor = 0;
    }

    pub fn patch(&mut self, new_priority: Vec<GameRecord>) -> usize {
        let mut updated = 0;
        for slot in self.entries.iter_mut().filter(|g| g.is_priority) {
            let Some(fresh) = new_priority
                .iter()
                .find(|g| g.id == slot.id && g.is_priority && !g.is_final())
            else {
                continue;
            };
            *slot = fresh.clone();
            updated += 1;
        }
        self.priority_games = new_priority;
        updated
    }

    pub fn reset_cursor(&mut self) {
        self.cursor = 0;
    }

    pub fn advance(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        self.cursor = (self.cursor + 1) % self.entries.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameState;

    fn game(id: &str, priority: bool) -> GameRecord {
        GameRecord {
            id: id.to_string(),
            league_name: "MLB".to_string(),
            league_key: "mlb".to_string(),
            away_abbrev: "HOU".to_string(),
            home_abbrev: "SEA".to_string(),
            away_score: "0".to_string(),
            home_score: "0".to_string(),
            status_text: "Top 1st".to_string(),
            state: GameState::Live,
            is_priority: priority,
            away_full_name: "Houston Astros".to_string(),
            home_full_name: "Seattle Mariners".to_string(),
        }
    }

    #[test]
    fn replace_orders_priority_first_and_resets_cursor() {
        let mut catalog = Catalog::new();
        catalog.replace(vec![game("a", true)], vec![game("b", false)]);
        catalog.advance();
        assert_eq!(catalog.cursor(), 1);

        catalog.replace(
            vec![game("p1", true), game("p2", true)],
            vec![game("n1", false), game("x", true)],
        );
        let ids: Vec<&str> = catalog.entries().iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, ["p1", "p2", "x", "n1"]);
        assert_eq!(catalog.cursor(), 0);
        assert_eq!(catalog.priority_count(), 3);
    }

    #[test]
    fn replace_drops_final_games() {
        let mut catalog = Catalog::new();
        let mut done = game("done", true);
        done.state = GameState::Final;
        catalog.replace(vec![done], vec![game("n", false)]);
        assert_eq!(catalog.len(), 1);
        assert!(catalog.get("done").is_none());
        assert!(!catalog.has_priority());
    }

    #[test]
    fn patch_keeps_positions_and_cursor() {
        let mut catalog = Catalog::new();
        catalog.replace(
            vec![game("p1", true), game("p2", true)],
            vec![game("n1", false)],
        );
        catalog.advance();
        catalog.advance();

        let mut fresh = game("p2", true);
        fresh.away_score = "5".to_string();
        let updated = catalog.patch(vec![fresh]);

        assert_eq!(updated, 1);
        assert_eq!(catalog.cursor(), 2);
        assert_eq!(catalog.entries()[1].away_score, "5");
        assert_eq!(catalog.entries()[0].away_score, "0");
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.priority_games().len(), 1);
    }

    #[test]
    fn patch_never_adds_unknown_games() {
        let mut catalog = Catalog::new();
        catalog.replace(vec![game("p1", true)], Vec::new());
        let updated = catalog.patch(vec![game("new", true)]);
        assert_eq!(updated, 0);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.priority_games()[0].id, "new");
    }

    #[test]
    fn patch_ignores_final_replacement() {
        let mut catalog = Catalog::new();
        catalog.replace(vec![game("p1", true)], Vec::new());
        let mut done = game("p1", true);
        done.state = GameState::Final;
        done.away_score = "9".to_string();
        assert_eq!(catalog.patch(vec![done]), 0);
        assert_eq!(catalog.entries()[0].away_score, "0");
        assert!(!catalog.entries()[0].is_final());
    }

    #[test]
    fn advance_on_empty_is_noop() {
        let mut catalog = Catalog::new();
        catalog.advance();
        assert_eq!(catalog.cursor(), 0);
        assert!(catalog.current().is_none());
    }
}
