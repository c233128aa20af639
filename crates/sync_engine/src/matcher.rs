//! Shared-event matching.

use std::collections::{BTreeMap, BTreeSet};

use contracts::{CanonicalEvent, EventCode, SyncError};
use tracing::debug;

/// Distinct codes present in both streams.
///
/// An empty intersection is fatal: nothing can anchor the mapping.
pub fn shared_codes(
    primary: &[CanonicalEvent],
    secondary: &[CanonicalEvent],
) -> Result<BTreeSet<EventCode>, SyncError> {
    let primary_codes: BTreeSet<_> = primary.iter().map(|e| e.code).collect();
    let secondary_codes: BTreeSet<_> = secondary.iter().map(|e| e.code).collect();
    let shared: BTreeSet<_> = primary_codes
        .intersection(&secondary_codes)
        .copied()
        .collect();

    debug!(
        primary_types = primary_codes.len(),
        secondary_types = secondary_codes.len(),
        shared_types = shared.len(),
        "event vocabularies intersected"
    );

    if shared.is_empty() {
        return Err(SyncError::NoSharedEvents);
    }
    Ok(shared)
}

/// Occurrence counts of one code in both streams
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CodeCount {
    pub primary: usize,
    pub secondary: usize,
}

impl CodeCount {
    pub fn is_shared(&self) -> bool {
        self.primary > 0 && self.secondary > 0
    }

    /// Same number of occurrences in both streams
    pub fn is_balanced(&self) -> bool {
        self.primary == self.secondary
    }
}

/// Per-code occurrence counts, used to pick anchor events
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventInventory {
    pub counts: BTreeMap<EventCode, CodeCount>,
}

impl EventInventory {
    pub fn build(primary: &[CanonicalEvent], secondary: &[CanonicalEvent]) -> Self {
        let mut counts: BTreeMap<EventCode, CodeCount> = BTreeMap::new();
        for event in primary {
            counts.entry(event.code).or_default().primary += 1;
        }
        for event in secondary {
            counts.entry(event.code).or_default().secondary += 1;
        }
        Self { counts }
    }

    /// Codes present in both streams
    pub fn shared(&self) -> impl Iterator<Item = (&EventCode, &CodeCount)> {
        self.counts.iter().filter(|(_, c)| c.is_shared())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events(list: &[(i64, usize)]) -> Vec<CanonicalEvent> {
        list.iter()
            .map(|&(code, sample)| CanonicalEvent {
                code: EventCode(code),
                sample,
            })
            .collect()
    }

    #[test]
    fn test_shared_codes_intersection() {
        let primary = events(&[(1, 0), (2, 5), (3, 9), (2, 12)]);
        let secondary = events(&[(2, 4), (3, 8), (4, 10)]);
        let shared = shared_codes(&primary, &secondary).unwrap();
        assert_eq!(
            shared.into_iter().collect::<Vec<_>>(),
            vec![EventCode(2), EventCode(3)]
        );
    }

    #[test]
    fn test_no_shared_codes() {
        let primary = events(&[(1, 0)]);
        let secondary = events(&[(2, 0)]);
        assert!(matches!(
            shared_codes(&primary, &secondary),
            Err(SyncError::NoSharedEvents)
        ));
    }

    #[test]
    fn test_inventory_counts() {
        let primary = events(&[(1, 0), (2, 5), (2, 12)]);
        let secondary = events(&[(2, 4), (2, 9), (7, 1)]);
        let inventory = EventInventory::build(&primary, &secondary);
        assert_eq!(
            inventory.counts[&EventCode(2)],
            CodeCount {
                primary: 2,
                secondary: 2
            }
        );
        assert!(!inventory.counts[&EventCode(1)].is_shared());
        assert_eq!(inventory.shared().count(), 1);
    }
}
