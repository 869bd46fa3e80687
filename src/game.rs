use std::fmt;

pub const ABBREV_MAX_CHARS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Scheduled,
    Live,
    Final,
}

impl GameState {
    pub fn from_feed(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("in") => GameState::Live,
            Some("post") => GameState::Final,
            _ => GameState::Scheduled,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Away,
    Home,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRecord {
    pub id: String,
    pub league_name: String,
    pub league_key: String,
    pub away_abbrev: String,
    pub home_abbrev: String,
    pub away_score: String,
    pub home_score: String,
    pub status_text: String,
    pub state: GameState,
    pub is_priority: bool,
    pub away_full_name: String,
    pub home_full_name: String,
}

impl GameRecord {
    pub fn signature(&self) -> ScoreSignature {
        ScoreSignature::new(&self.away_score, &self.home_score)
    }

    pub fn score_line(&self) -> ScoreLine {
        ScoreLine::parse(&self.away_score, &self.home_score)
    }

    pub fn is_final(&self) -> bool {
        self.state == GameState::Final
    }

    pub fn matchup(&self) -> String {
        format!("{} @ {}", self.away_abbrev, self.home_abbrev)
    }

    pub fn status_display(&self, max_chars: usize) -> String {
        self.status_text.chars().take(max_chars).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScoreSignature(String);

impl ScoreSignature {
    pub fn new(away: &str, home: &str) -> Self {
        Self(format!("{away}-{home}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScoreSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreLine {
    pub away: Option<u32>,
    pub home: Option<u32>,
}

impl ScoreLine {
    pub fn parse(away: &str, home: &str) -> Self {
        Self {
            away: away.trim().parse::<u32>().ok(),
            home: home.trim().parse::<u32>().ok(),
        }
    }

    /// Side currently ahead. Ties and unparseable scores have no leader.
    pub fn leader(&self) -> Option<Side> {
        let (Some(away), Some(home)) = (self.away, self.home) else {
            return None;
        };
        match away.cmp(&home) {
            std::cmp::Ordering::Greater => Some(Side::Away),
            std::cmp::Ordering::Less => Some(Side::Home),
            std::cmp::Ordering::Equal => None,
        }
    }
}

pub fn truncate_abbrev(raw: &str) -> String {
    raw.trim().chars().take(ABBREV_MAX_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leader_follows_numeric_scores() {
        assert_eq!(ScoreLine::parse("3", "2").leader(), Some(Side::Away));
        assert_eq!(ScoreLine::parse("10", "9").leader(), Some(Side::Away));
        assert_eq!(ScoreLine::parse("0", "1").leader(), Some(Side::Home));
        assert_eq!(ScoreLine::parse("4", "4").leader(), None);
    }

    #[test]
    fn placeholder_scores_have_no_leader() {
        assert_eq!(ScoreLine::parse("-", "3").leader(), None);
        assert_eq!(ScoreLine::parse("", "").leader(), None);
    }

    #[test]
    fn signature_keeps_placeholder_text() {
        assert_eq!(ScoreSignature::new("-", "0").as_str(), "--0");
        assert_eq!(ScoreSignature::new("3", "2").to_string(), "3-2");
    }

    #[test]
    fn feed_state_mapping() {
        assert_eq!(GameState::from_feed(Some("in")), GameState::Live);
        assert_eq!(GameState::from_feed(Some("post")), GameState::Final);
        assert_eq!(GameState::from_feed(Some("pre")), GameState::Scheduled);
        assert_eq!(GameState::from_feed(None), GameState::Scheduled);
    }

    #[test]
    fn abbrev_is_capped() {
        assert_eq!(truncate_abbrev("HOUSTON"), "HOUS");
        assert_eq!(truncate_abbrev(" ARK "), "ARK");
    }
}
