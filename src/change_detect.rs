use std::collections::{HashMap, HashSet};

use crate::game::{GameRecord, ScoreSignature};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreChange {
    pub id: String,
    pub matchup: String,
    pub previous: ScoreSignature,
    pub current: ScoreSignature,
}

#[derive(Debug, Clone, Default)]
pub struct ChangeDetector {
    last_seen: HashMap<String, ScoreSignature>,
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.last_seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_seen.is_empty()
    }

    pub fn last_signature(&self, id: &str) -> Option<&ScoreSignature> {
        self.last_seen.get(id)
    }

    pub fn observe(&mut self, records: &[GameRecord]) -> bool {
        !self.observe_changes(records).is_empty()
    }

    pub fn observe_changes(&mut self, records: &[GameRecord]) -> Vec<ScoreChange> {
        let mut changes = Vec::new();
        for record in records {
            let current = record.signature();
            if let Some(previous) = self.last_seen.insert(record.id.clone(), current.clone())
                && previous != current
            {
                changes.push(ScoreChange {
                    id: record.id.clone(),
                    matchup: record.matchup(),
                    previous,
                    current,
                });
            }
        }
        changes
    }

    pub fn retain_only(&mut self, keep: &HashSet<&str>) -> usize {
        let before = self.last_seen.len();
        self.last_seen.retain(|id, _| keep.contains(id.as_str()));
        before - self.last_seen.len()
    }
}
