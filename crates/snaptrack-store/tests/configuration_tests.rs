mod common;

use common::{new_customer, new_session, Address};
use serde::{Deserialize, Serialize};
use snaptrack_core::{EntityModel, PropertyDescriptor};
use snaptrack_store::{MemoryBackend, Session, StoreError};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Profile {
    bio: String,
}

// ===== EAGER MODEL VALIDATION TESTS =====

#[test]
fn test_register_model_requires_comparer_and_codec() {
    let mut session = Session::new(MemoryBackend::new());

    let model = EntityModel::new(
        "customer",
        vec![PropertyDescriptor::complex::<Address>("address")],
    )
    .unwrap();

    // Nothing registered: the comparer hole surfaces first
    let err = session.register_model(model.clone()).unwrap_err();
    assert_eq!(err.code(), "ERR_COMPARER_MISSING");

    // Comparer alone is not enough; the codec hole surfaces next
    session
        .register_comparer(snaptrack_core::ValueComparer::of::<Address>())
        .unwrap();
    let err = session.register_model(model.clone()).unwrap_err();
    assert_eq!(err.code(), "ERR_CODEC_MISSING");

    // Both halves present: registration succeeds
    session
        .register_codec(snaptrack_store::JsonCodec::of::<Address>())
        .unwrap();
    session.register_model(model).unwrap();
}

#[test]
fn test_register_json_type_rejects_double_registration() {
    let mut session = Session::new(MemoryBackend::new());
    session.register_json_type::<Profile>().unwrap();

    let result = session.register_json_type::<Profile>();
    assert!(matches!(
        result,
        Err(StoreError::Track(
            snaptrack_core::TrackError::ComparerAlreadyRegistered { .. }
        ))
    ));
}

#[test]
fn test_scalar_only_model_needs_no_registration() {
    let mut session = Session::new(MemoryBackend::new());
    let model = EntityModel::new("note", vec![PropertyDescriptor::scalar("body")]).unwrap();
    session.register_model(model).unwrap();

    let mut note = session.new_entity("note", "n1").unwrap();
    note.put_scalar("body", "text").unwrap();
    session.add(note).unwrap();
    session.save_changes().unwrap();
}

// ===== GENERATED ID TESTS =====

#[test]
fn test_generated_ids_track_independently() {
    let mut session = new_session();

    let first_id = Uuid::now_v7().to_string();
    let second_id = Uuid::now_v7().to_string();
    session
        .add(new_customer(&session, &first_id, "Street"))
        .unwrap();
    session
        .add(new_customer(&session, &second_id, "Other"))
        .unwrap();

    let report = session.save_changes().unwrap();
    assert_eq!(report.saved.len(), 2);
    assert_eq!(session.backend().len(), 2);
}
