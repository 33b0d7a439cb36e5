//! Change detection engine
//!
//! The core entry point is [`detect_changes`], which walks every tracked
//! entity's current property values against the stored snapshots and
//! produces a [`DetectionReport`].

use crate::comparer::ComparerRegistry;
use crate::context::TrackingContext;
use crate::detect::model::{DetectionReport, EntityChange};
use crate::errors::{Result, TrackError};
use crate::model::EntityState;

/// Compare every tracked entity against its snapshots and mark the dirty ones
///
/// For each entity not in `Deleted` state, each property's current value is
/// compared to its snapshot using the registered comparer (built-in value
/// equality for scalars). A difference marks the property modified and moves
/// an `Unchanged` entity to `Modified` (`Added` keeps precedence).
///
/// Properties of the live object graph are read directly; there is no
/// wrapping or proxying. That makes this pass mutation-detecting rather than
/// assignment-detecting: a field mutated through a `&mut` borrow and a
/// whole-value reassignment both surface the same way, as `current !=
/// snapshot`. Where the entity came from (fresh attach, reload, earlier
/// save) plays no part in the comparison.
///
/// The pass is idempotent - repeating it without intervening mutation yields
/// an equal report - and has no side effects on property values. A property
/// once marked modified stays marked until a save rebases the snapshots;
/// detection never "un-dirties" state (`Modified -> Unchanged` is reserved
/// for saves).
///
/// # Errors
///
/// - `ComparerMissing` - a complex property's type has no registered
///   comparer. Fatal for the whole pass: silently skipping the property
///   would report "no change" for a value that may well be dirty, and its
///   mutation would be lost on save.
/// - `SnapshotMissing` - a tracked entity has no stored snapshot (internal
///   inconsistency; cannot happen through the public context API).
pub fn detect_changes(
    registry: &ComparerRegistry,
    context: &mut TrackingContext,
) -> Result<DetectionReport> {
    let TrackingContext {
        entities,
        snapshots,
    } = context;

    let mut entries: Vec<EntityChange> = Vec::new();
    let mut pending_deletes = Vec::new();

    for (key, entity) in entities.iter_mut() {
        if entity.state() == EntityState::Deleted {
            pending_deletes.push(key.clone());
            continue;
        }
        if !entity.state().in_detection_scope() {
            continue;
        }

        let snapshot = snapshots
            .snapshot(key)
            .ok_or_else(|| TrackError::SnapshotMissing {
                key: key.to_string(),
            })?;

        let mut changed_properties = Vec::new();
        for (name, current) in entity.properties() {
            let differs = match snapshot.get(name) {
                Some(original) => !registry.values_equal(current, original)?,
                // Property populated after attach; there is no original
                None => true,
            };
            if differs {
                changed_properties.push(name.to_string());
            }
        }

        for name in &changed_properties {
            entity.mark_property_modified(name);
        }
        if !changed_properties.is_empty() && entity.state() == EntityState::Unchanged {
            entity.transition_to(EntityState::Modified)?;
        }

        if entity.state().is_dirty() {
            entries.push(EntityChange {
                key: key.clone(),
                state: entity.state(),
                modified_properties: entity
                    .modified_properties()
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            });
        }
    }

    Ok(DetectionReport {
        entries,
        pending_deletes,
    })
}
