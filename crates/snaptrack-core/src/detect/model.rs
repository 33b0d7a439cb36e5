//! Typed result model for a detection pass

use serde::{Deserialize, Serialize};

use crate::model::{EntityKey, EntityState};

/// One dirty entity found by a detection pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityChange {
    /// Identity of the dirty entity
    pub key: EntityKey,
    /// Entity state after the pass (`Added` or `Modified`)
    pub state: EntityState,
    /// Properties whose current value differs from its snapshot, in name
    /// order (empty for `Added` entities that were not further mutated)
    pub modified_properties: Vec<String>,
}

/// Outcome of one detection pass over a tracking context
///
/// The report is deterministic: entries are in entity key order regardless
/// of attach order, and repeating the pass without intervening mutation
/// produces an equal report.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DetectionReport {
    /// Entities in `Added` or `Modified` state after the pass, key order
    pub entries: Vec<EntityChange>,
    /// Entities scheduled for deletion, key order (their values are not
    /// compared; the pending delete itself is the change)
    pub pending_deletes: Vec<EntityKey>,
}

impl DetectionReport {
    /// True when nothing needs saving
    pub fn is_clean(&self) -> bool {
        self.entries.is_empty() && self.pending_deletes.is_empty()
    }

    /// Number of entities that will produce a write on save
    pub fn dirty_count(&self) -> usize {
        self.entries.len() + self.pending_deletes.len()
    }

    /// Look up the change entry for a key
    pub fn entry(&self, key: &EntityKey) -> Option<&EntityChange> {
        self.entries.iter().find(|e| &e.key == key)
    }

    /// Whether the key appears anywhere in the dirty set
    pub fn is_dirty(&self, key: &EntityKey) -> bool {
        self.entry(key).is_some() || self.pending_deletes.contains(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_report_is_clean() {
        let report = DetectionReport::default();
        assert!(report.is_clean());
        assert_eq!(report.dirty_count(), 0);
    }

    #[test]
    fn test_dirty_lookup() {
        let key = EntityKey::new("customer", "1");
        let deleted = EntityKey::new("customer", "2");
        let report = DetectionReport {
            entries: vec![EntityChange {
                key: key.clone(),
                state: EntityState::Modified,
                modified_properties: vec!["address".to_string()],
            }],
            pending_deletes: vec![deleted.clone()],
        };

        assert!(report.is_dirty(&key));
        assert!(report.is_dirty(&deleted));
        assert!(!report.is_dirty(&EntityKey::new("customer", "3")));
        assert_eq!(report.dirty_count(), 2);
        assert_eq!(
            report.entry(&key).unwrap().modified_properties,
            vec!["address".to_string()]
        );
    }

    #[test]
    fn test_report_round_trips_through_json() {
        let report = DetectionReport {
            entries: vec![EntityChange {
                key: EntityKey::new("customer", "1"),
                state: EntityState::Modified,
                modified_properties: vec!["address".to_string()],
            }],
            pending_deletes: vec![],
        };

        let json = serde_json::to_string(&report).unwrap();
        let reparsed: DetectionReport = serde_json::from_str(&json).unwrap();
        assert_eq!(reparsed, report);
    }
}
