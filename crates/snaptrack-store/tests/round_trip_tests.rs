mod common;

use common::{customer_key, new_customer, new_session, Address};
use snaptrack_core::EntityState;

// ===== ROUND TRIP TESTS =====

#[test]
fn test_add_save_reload_preserves_content() {
    let mut session = new_session();
    let key = customer_key("c1");

    let customer = new_customer(&session, "c1", "Street");
    session.add(customer).unwrap();
    session.save_changes().unwrap();

    session.detach(&key).unwrap();
    let reloaded = session.find("customer", "c1").unwrap();

    assert_eq!(reloaded.scalar("name").unwrap().as_text(), Some("Customer"));
    assert_eq!(
        reloaded.complex::<Address>("address").unwrap().street,
        "Street"
    );
    assert_eq!(reloaded.state(), EntityState::Unchanged);
}

#[test]
fn test_save_clean_context_writes_nothing() {
    let mut session = new_session();

    let customer = new_customer(&session, "c1", "Street");
    session.add(customer).unwrap();
    session.save_changes().unwrap();

    let second = session.save_changes().unwrap();
    assert!(second.is_empty());
}

#[test]
fn test_multiple_entities_saved_in_key_order() {
    let mut session = new_session();

    for id in ["b", "a", "c"] {
        let customer = new_customer(&session, id, "Street");
        session.add(customer).unwrap();
    }
    let report = session.save_changes().unwrap();

    assert_eq!(
        report.saved,
        vec![customer_key("a"), customer_key("b"), customer_key("c")]
    );
    assert_eq!(session.backend().len(), 3);
}

// ===== SAVE FAILURE TESTS =====

#[test]
fn test_failed_save_keeps_dirty_set_intact() {
    let mut session = new_session();
    let key = customer_key("c1");

    let customer = new_customer(&session, "c1", "Street");
    session.add(customer).unwrap();
    session.save_changes().unwrap();

    session
        .entity_mut(&key)
        .unwrap()
        .complex_mut::<Address>("address")
        .unwrap()
        .street = "Updated".to_string();

    session.backend_mut().fail_next_save();
    let result = session.save_changes();
    assert!(result.is_err());

    // Snapshot was not refreshed: the entity is still dirty and the stored
    // row still holds the pre-mutation street
    assert_eq!(session.entity(&key).unwrap().state(), EntityState::Modified);
    let row = session.backend().row(&key).unwrap();
    assert_eq!(row.get("address").unwrap()["street"], "Street");

    // Retry succeeds and cleans the entity
    let report = session.save_changes().unwrap();
    assert_eq!(report.saved, vec![key.clone()]);
    assert_eq!(session.entity(&key).unwrap().state(), EntityState::Unchanged);
    let row = session.backend().row(&key).unwrap();
    assert_eq!(row.get("address").unwrap()["street"], "Updated");
}

#[test]
fn test_partial_save_failure_leaves_later_entities_dirty() {
    let mut session = new_session();

    for id in ["a", "b"] {
        let customer = new_customer(&session, id, "Street");
        session.add(customer).unwrap();
    }
    session.save_changes().unwrap();

    for id in ["a", "b"] {
        session
            .entity_mut(&customer_key(id))
            .unwrap()
            .complex_mut::<Address>("address")
            .unwrap()
            .street = "Updated".to_string();
    }

    // First write (entity "a", key order) fails; the pass aborts
    session.backend_mut().fail_next_save();
    assert!(session.save_changes().is_err());

    assert_eq!(
        session.entity(&customer_key("a")).unwrap().state(),
        EntityState::Modified
    );
    assert_eq!(
        session.entity(&customer_key("b")).unwrap().state(),
        EntityState::Modified
    );

    // Retry writes both
    let report = session.save_changes().unwrap();
    assert_eq!(report.saved, vec![customer_key("a"), customer_key("b")]);
}
