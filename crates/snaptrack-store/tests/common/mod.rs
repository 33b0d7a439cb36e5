use serde::{Deserialize, Serialize};
use snaptrack_core::{EntityKey, EntityModel, EntityState, PropertyDescriptor, TrackedEntity};
use snaptrack_store::{MemoryBackend, Session};

/// Complex property type persisted as JSON across the suites
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
}

impl Address {
    #[allow(dead_code)]
    pub fn new(street: &str) -> Self {
        Self {
            street: street.to_string(),
        }
    }
}

/// Session over a fresh in-memory backend with the customer model mapped
///
/// Mirrors static model configuration: the Address comparer and codec are
/// registered once, before any tracking.
#[allow(dead_code)]
pub fn new_session() -> Session<MemoryBackend> {
    let mut session = Session::new(MemoryBackend::new());
    session.register_json_type::<Address>().unwrap();
    session
        .register_model(
            EntityModel::new(
                "customer",
                vec![
                    PropertyDescriptor::scalar("name"),
                    PropertyDescriptor::complex::<Address>("address"),
                ],
            )
            .unwrap(),
        )
        .unwrap();
    session
}

/// Build a customer entity with a name and address
#[allow(dead_code)]
pub fn new_customer(session: &Session<MemoryBackend>, id: &str, street: &str) -> TrackedEntity {
    let mut entity = session.new_entity("customer", id).unwrap();
    entity.put_scalar("name", "Customer").unwrap();
    entity.put_complex("address", Address::new(street)).unwrap();
    entity
}

/// Build a customer entity with only a scalar name
#[allow(dead_code)]
pub fn new_plain_customer(session: &Session<MemoryBackend>, id: &str) -> TrackedEntity {
    let mut entity = session.new_entity("customer", id).unwrap();
    entity.put_scalar("name", "Customer").unwrap();
    entity
}

/// Key for a customer id
#[allow(dead_code)]
pub fn customer_key(id: &str) -> EntityKey {
    EntityKey::new("customer", id)
}

/// Run a detection pass and assert the entity came out Modified
#[allow(dead_code)]
pub fn assert_modified(session: &mut Session<MemoryBackend>, key: &EntityKey) {
    let report = session.detect_changes().unwrap();
    assert_eq!(
        report.entry(key).map(|e| e.state),
        Some(EntityState::Modified),
        "Entity state"
    );
}

/// Assert the address property is flagged modified
#[allow(dead_code)]
pub fn assert_address_modified(session: &Session<MemoryBackend>, key: &EntityKey) {
    assert!(
        session.entry(key).unwrap().is_modified("address"),
        "Address is modified"
    );
}
