//! Concurrent declaration registration.
//!
//! Front ends visit declarations on several threads; the same entity and member may be
//! registered by any of them, and the registry must hand out one shared instance.

use std::{sync::Arc, thread};

use blocklayout::prelude::*;

const THREADS: usize = 8;

#[test]
fn concurrent_registration_converges() {
    let domain = Arc::new(Domain::new("Concurrent"));

    let handles: Vec<_> = (0..THREADS)
        .map(|worker| {
            let domain = Arc::clone(&domain);
            thread::spawn(move || {
                for index in 0..32u32 {
                    let entity = domain.get_or_create("Concurrent", &format!("Entity{index}"));
                    entity.set_id(index + 1).unwrap();
                    entity.set_layout(LayoutMethod::Linear).unwrap();
                    entity
                        .add_member(Member::new("id", 1, ScalarType::Int64))
                        .unwrap();
                    entity
                        .add_member(Member::new("label", 2, MemberType::String).nullable())
                        .unwrap();
                    if worker % 2 == 0 && index > 0 {
                        let base =
                            domain.get_or_create("Concurrent", &format!("Entity{}", index - 1));
                        entity.set_base(&base).unwrap();
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(domain.len(), 32);
    for entity in domain.entities() {
        assert_eq!(entity.member_count(), 2);
    }

    let result = layout_domain(&domain, &LayoutConfig::default()).unwrap();
    let errors: Vec<_> = result.diagnostics().errors();
    // heights above 15 are expected for the deep end of the chain, nothing else
    assert!(errors
        .iter()
        .all(|d| d.code == DiagnosticCode::InvalidClassHeight));
    assert_eq!(
        result.get("Concurrent.Entity14").unwrap().class_height,
        Some(15)
    );
    assert_eq!(result.get("Concurrent.Entity14").unwrap().block_length, 64);
}

#[test]
fn concurrent_handles_share_one_instance() {
    let domain = Arc::new(Domain::new("Concurrent"));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let domain = Arc::clone(&domain);
            thread::spawn(move || domain.get_or_create("Concurrent", "Shared"))
        })
        .collect();

    let entities: Vec<EntityRc> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(entities.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    assert_eq!(domain.len(), 1);
}

#[test]
fn conflicting_redeclarations_are_rejected() {
    let domain = Domain::new("Concurrent");
    let entity = domain.get_or_create("Concurrent", "Point");
    entity.set_layout(LayoutMethod::Linear).unwrap();
    entity
        .add_member(Member::new("x", 1, ScalarType::Double))
        .unwrap();

    let conflict = entity.add_member(Member::new("x", 1, ScalarType::Single));
    assert!(matches!(conflict, Err(Error::DeclarationConflict { .. })));

    let conflict = entity.set_layout(LayoutMethod::Explicit);
    assert!(matches!(conflict, Err(Error::DeclarationConflict { .. })));

    let stored = entity.member("x").unwrap();
    assert_eq!(stored.ty, MemberType::Scalar(ScalarType::Double));
    assert_eq!(entity.layout_method(), LayoutMethod::Linear);
}

#[test]
fn concurrent_conflicts_keep_the_first_declaration() {
    let domain = Arc::new(Domain::new("Concurrent"));
    let entity = domain.get_or_create("Concurrent", "Race");

    let handles: Vec<_> = [ScalarType::Int32, ScalarType::Int64]
        .into_iter()
        .cycle()
        .take(THREADS)
        .map(|scalar| {
            let entity = Arc::clone(&entity);
            thread::spawn(move || entity.add_member(Member::new("value", 1, scalar)).is_ok())
        })
        .collect();

    let accepted = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();

    let winner = entity.member("value").unwrap();
    let expected = if winner.ty == MemberType::Scalar(ScalarType::Int32) {
        THREADS / 2
    } else {
        THREADS - THREADS / 2
    };
    assert_eq!(accepted, expected);
    assert_eq!(entity.member_count(), 1);
}
