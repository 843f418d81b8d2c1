//! Comprehensive tests for the abstract contract model

use super::*;
use crate::condition::{Postcondition, Precondition};

fn nonneg() -> Precondition<(), (i64,)> {
    Precondition::new("n >= 0", |_, (n,)| *n >= 0)
}

fn doubled() -> Postcondition<(), (i64,), i64> {
    Postcondition::new("result == n * 2", |_, (n,), result| *result == *n * 2)
}

// ===== Construction Tests =====

#[test]
fn test_empty_contract() {
    let contract: AbstractContract<(), (i64,), i64> =
        AbstractContract::new(Vec::new(), Vec::new(), Vec::new());

    assert!(contract.pre().is_empty());
    assert!(contract.post().is_empty());
    assert!(contract.exception().is_empty());
    assert!(!contract.has_conditions());
    assert_eq!(contract.condition_count(), 0);
    assert!(!contract.is_unconstrained());
}

#[test]
fn test_new_records_declaration_site() {
    let contract: AbstractContract<(), (i64,), i64> =
        AbstractContract::new(vec![nonneg()], Vec::new(), Vec::new());

    assert!(!contract.location().is_internal());
    assert!(contract.location().file().ends_with("contract_tests.rs"));
}

#[test]
fn test_builder_keeps_declaration_order() {
    let first = Precondition::<(), (i64,)>::new("first", |_, _| true);
    let second = Precondition::<(), (i64,)>::new("second", |_, _| true);

    let contract: AbstractContract<(), (i64,), i64> = AbstractContract::builder()
        .pre(first.clone())
        .pre(second.clone())
        .post(doubled())
        .build();

    assert_eq!(contract.pre().len(), 2);
    assert_eq!(contract.pre()[0], first);
    assert_eq!(contract.pre()[1], second);
    assert_eq!(contract.post().len(), 1);
    assert!(contract.has_conditions());
    assert_eq!(contract.condition_count(), 3);
}

#[test]
fn test_builder_records_build_site() {
    let contract: AbstractContract<(), (i64,), i64> = AbstractContract::builder().build();
    assert!(contract.location().file().ends_with("contract_tests.rs"));
}

// ===== Identity Tests =====

#[test]
fn test_contract_identity_is_per_declaration() {
    let one: AbstractContract<(), (i64,), i64> =
        AbstractContract::new(vec![nonneg()], Vec::new(), Vec::new());
    let other: AbstractContract<(), (i64,), i64> =
        AbstractContract::new(vec![nonneg()], Vec::new(), Vec::new());

    assert_ne!(one.id(), other.id());
    assert_ne!(one, other);
}

#[test]
fn test_clone_shares_identity_and_frozen_sequences() {
    let contract: AbstractContract<(), (i64,), i64> =
        AbstractContract::new(vec![nonneg()], vec![doubled()], Vec::new());
    let clone = contract.clone();

    assert_eq!(contract, clone);
    assert_eq!(contract.id(), clone.id());
    assert!(std::ptr::eq(
        contract.pre().as_ptr(),
        clone.pre().as_ptr()
    ));
    assert!(std::ptr::eq(
        contract.post().as_ptr(),
        clone.post().as_ptr()
    ));
}

#[test]
fn test_conditions_are_moved_in_and_frozen() {
    let conditions = vec![nonneg(), nonneg()];
    let contract: AbstractContract<(), (i64,), i64> =
        AbstractContract::new(conditions, Vec::new(), Vec::new());

    // The vector was consumed; the only view onto the conditions is the
    // frozen slice, which has no mutation API.
    assert_eq!(contract.pre().len(), 2);
    assert!(contract.pre()[0].holds(&(), &(1,)));
}

// ===== Unconstrained Root Contract Tests =====

#[test]
fn test_unconstrained_contract_shape() {
    let root = AbstractContract::<(), (i64,), i64>::unconstrained();

    assert!(root.is_unconstrained());
    assert!(root.location().is_internal());
    assert_eq!(root.pre().len(), 1);
    assert_eq!(root.pre()[0].name(), FALSUM);
    assert!(root.post().is_empty());
    assert!(root.exception().is_empty());
}

#[test]
fn test_unconstrained_precondition_always_fails() {
    let root = AbstractContract::<(), (i64,), i64>::unconstrained();
    assert!(!root.pre()[0].holds(&(), &(0,)));
    assert!(!root.pre()[0].holds(&(), &(i64::MAX,)));
}

#[test]
fn test_unconstrained_contracts_are_distinct_values() {
    let one = AbstractContract::<(), (i64,), i64>::unconstrained();
    let other = AbstractContract::<(), (i64,), i64>::unconstrained();
    assert_ne!(one, other);
    assert!(one.is_unconstrained() && other.is_unconstrained());
}

// ===== Debug Tests =====

#[test]
fn test_contract_debug_lists_conditions() {
    let contract: AbstractContract<(), (i64,), i64> =
        AbstractContract::new(vec![nonneg()], Vec::new(), Vec::new());
    let rendered = format!("{contract:?}");
    assert!(rendered.contains("AbstractContract"));
    assert!(rendered.contains("n >= 0"));
}
