use std::collections::HashMap;

use crate::game::GameRecord;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriorityTable {
    // league key -> lowercased identifiers
    leagues: HashMap<String, Vec<String>>,
}

impl PriorityTable {
    pub fn new<L, I, S>(entries: L) -> Self
    where
        L: IntoIterator<Item = (String, I)>,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut leagues: HashMap<String, Vec<String>> = HashMap::new();
        for (league, names) in entries {
            let slot = leagues.entry(league.trim().to_string()).or_default();
            for name in names {
                let name = name.as_ref().trim().to_lowercase();
                if !name.is_empty() && !slot.contains(&name) {
                    slot.push(name);
                }
            }
        }
        Self { leagues }
    }

    pub fn is_empty(&self) -> bool {
        self.leagues.values().all(Vec::is_empty)
    }

    pub fn has_league(&self, league_key: &str) -> bool {
        self.leagues
            .get(league_key)
            .is_some_and(|names| !names.is_empty())
    }

    pub fn league_count(&self) -> usize {
        self.leagues.len()
    }

    fn identifiers(&self, league_key: &str) -> &[String] {
        self.leagues
            .get(league_key)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

pub fn classify(full_name: &str, league_key: &str, table: &PriorityTable) -> bool {
    let identifiers = table.identifiers(league_key);
    if identifiers.is_empty() {
        return false;
    }
    let name = full_name.to_lowercase();
    identifiers.iter().any(|id| name.contains(id.as_str()))
}

pub fn is_priority_game(record: &GameRecord, table: &PriorityTable) -> bool {
    classify(&record.away_full_name, &record.league_key, table)
        || classify(&record.home_full_name, &record.league_key, table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PriorityTable {
        PriorityTable::new([
            ("mlb".to_string(), vec!["Houston Astros", "Astros", "HOU"]),
            ("college-football".to_string(), vec!["Razorbacks"]),
        ])
    }

    #[test]
    fn matches_case_insensitive_substring() {
        let t = table();
        assert!(classify("Houston Astros", "mlb", &t));
        assert!(classify("HOUSTON ASTROS", "mlb", &t));
        assert!(classify("Arkansas Razorbacks", "college-football", &t));
    }

    #[test]
    fn league_must_be_configured() {
        let t = table();
        assert!(!classify("Houston Astros", "nfl", &t));
        assert!(!classify("Texas Rangers", "mlb", &t));
    }

    #[test]
    fn short_identifier_matches_any_name_containing_it() {
        let t = table();
        // "HOU" is a substring of every Houston team name.
        assert!(classify("Houston Texans", "mlb", &t));
        assert!(classify("Cougars of Houston", "mlb", &t));
    }

    #[test]
    fn empty_table_never_matches() {
        let t = PriorityTable::default();
        assert!(t.is_empty());
        assert!(!classify("Houston Astros", "mlb", &t));
    }

    #[test]
    fn blank_identifiers_are_ignored() {
        let t = PriorityTable::new([("mlb".to_string(), vec!["  ", ""])]);
        assert!(!t.has_league("mlb"));
        assert!(!classify("Anyone", "mlb", &t));
    }
}
