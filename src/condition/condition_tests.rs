//! Comprehensive tests for the condition model

use super::*;

// ===== ContractKind Tests =====

#[test]
fn test_kind_labels() {
    assert_eq!(ContractKind::Precondition.label(), "precondition");
    assert_eq!(ContractKind::Postcondition.label(), "postcondition");
    assert_eq!(ContractKind::ExceptionCondition.label(), "exception condition");
}

#[test]
fn test_kind_violation_names() {
    assert_eq!(
        ContractKind::Precondition.violation_name(),
        "PreconditionViolation"
    );
    assert_eq!(
        ContractKind::Postcondition.violation_name(),
        "PostconditionViolation"
    );
    assert_eq!(
        ContractKind::ExceptionCondition.violation_name(),
        "ExceptionConditionViolation"
    );
}

#[test]
fn test_kind_display_is_label() {
    assert_eq!(ContractKind::Postcondition.to_string(), "postcondition");
}

#[test]
fn test_kind_serialization() {
    let json = serde_json::to_string(&ContractKind::Precondition).unwrap();
    assert_eq!(json, "\"Precondition\"");

    let kind: ContractKind = serde_json::from_str("\"ExceptionCondition\"").unwrap();
    assert_eq!(kind, ContractKind::ExceptionCondition);
}

// ===== ConditionId Tests =====

#[test]
fn test_condition_ids_are_unique() {
    let first = Precondition::<(), (i64,)>::new("a", |_, _| true);
    let second = Precondition::<(), (i64,)>::new("a", |_, _| true);
    assert_ne!(first.id(), second.id());
}

#[test]
fn test_condition_id_display() {
    let condition = Precondition::<(), (i64,)>::new("a", |_, _| true);
    assert!(condition.id().to_string().starts_with('#'));
}

// ===== Precondition Tests =====

#[test]
fn test_precondition_holds() {
    let nonneg = Precondition::<(), (i64,)>::new("n >= 0", |_, (n,)| *n >= 0);
    assert!(nonneg.holds(&(), &(0,)));
    assert!(nonneg.holds(&(), &(41,)));
    assert!(!nonneg.holds(&(), &(-1,)));
}

#[test]
fn test_precondition_name_is_normalized() {
    let condition = Precondition::<(), ()>::new("n\n    >= 0", |_, _| true);
    assert_eq!(condition.name(), "n >= 0");
}

#[test]
fn test_precondition_equality_is_identity() {
    let condition = Precondition::<(), ()>::new("true", |_, _| true);
    let twin = Precondition::<(), ()>::new("true", |_, _| true);
    assert_eq!(condition, condition.clone());
    assert_ne!(condition, twin);
}

#[test]
fn test_precondition_clone_shares_identity() {
    let condition = Precondition::<(), ()>::new("true", |_, _| true);
    let clone = condition.clone();
    assert_eq!(condition.id(), clone.id());
    assert_eq!(condition.name(), clone.name());
}

#[test]
fn test_anonymous_precondition_names_after_predicate_type() {
    let condition = Precondition::<(), ()>::anonymous(|_, _| true);
    assert!(!condition.name().is_empty());
    assert!(condition.name().contains("closure"));
}

#[test]
fn test_precondition_debug_shows_name() {
    let condition = Precondition::<(), ()>::new("n >= 0", |_, _| true);
    let rendered = format!("{condition:?}");
    assert!(rendered.contains("Precondition"));
    assert!(rendered.contains("n >= 0"));
}

// ===== Postcondition Tests =====

#[test]
fn test_postcondition_sees_result() {
    let incremented =
        Postcondition::<(), (i64,), i64>::new("result == n + 1", |_, (n,), result| {
            *result == *n + 1
        });
    assert!(incremented.holds(&(), &(1,), &2));
    assert!(!incremented.holds(&(), &(1,), &3));
}

#[test]
fn test_postcondition_equality_is_identity() {
    let condition = Postcondition::<(), (), ()>::new("true", |_, _, _| true);
    assert_eq!(condition, condition.clone());
}

// ===== ExceptionCondition Tests =====

#[test]
fn test_exception_condition_identity_and_name() {
    let condition = ExceptionCondition::<(), (i64,), i64>::new("error is documented", |_, _, _, _| true);
    assert_eq!(condition.name(), "error is documented");
    assert_eq!(condition, condition.clone());

    let twin = ExceptionCondition::<(), (i64,), i64>::new("error is documented", |_, _, _, _| true);
    assert_ne!(condition, twin);
}

// ===== Macro Tests =====

#[test]
fn test_precondition_macro_names_by_source() {
    let condition = precondition!(|_s: &(), (n,): &(i64,)| *n >= 0);
    assert!(condition.name().contains(">= 0"));
    assert!(condition.holds(&(), &(1,)));
    assert!(!condition.holds(&(), &(-1,)));
}

#[test]
fn test_precondition_macro_with_explicit_name() {
    let condition = precondition!("nonneg", |_s: &(), (n,): &(i64,)| *n >= 0);
    assert_eq!(condition.name(), "nonneg");
}

#[test]
fn test_postcondition_macro_names_by_source() {
    let condition =
        postcondition!(|_s: &(), (n,): &(i64,), result: &i64| *result == *n * 2);
    assert!(condition.name().contains("* 2"));
    assert!(condition.holds(&(), &(2,), &4));
}

#[test]
fn test_exception_condition_macro_with_explicit_name() {
    type Retry<'c> = crate::runtime::Recall<'c, (), (i64,), i64>;
    let condition = exception_condition!(
        "documented",
        |_s: &(), _args: &(i64,), error: &anyhow::Error, _recall: &Retry| {
            error.to_string().contains("boom")
        }
    );
    assert_eq!(condition.name(), "documented");
}
