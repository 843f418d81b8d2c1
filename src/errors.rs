//! The contract error taxonomy.
//!
//! Everything the verification engine can raise is a [`ContractError`]:
//! a [`ContractViolation`] (a declared condition evaluated to `false` for a
//! specific call), an [`AbstractError`] (an abstract contract function was
//! executed), or a [`ConditionMetaError`] (a condition itself panicked, which
//! is a bug in the contract, not in the code under contract).
//!
//! Errors travel through the ordinary `anyhow::Error` channel of a contract
//! function call; [`ContractError::of`] is the downcast that classifies an
//! error coming out of a call. The verification engine uses the same downcast
//! to recognize a violation raised by a *nested* contract function and
//! re-raise it unchanged, so the deepest diagnostic always wins.
//!
//! All diagnostic text — the message, the concise value representations, and
//! the stitched stack — is rendered eagerly when the error is constructed, so
//! the cost is only paid on the failure path and the error stays meaningful
//! even after the offending values have gone out of scope elsewhere.

use std::any::Any;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::condition::{ConditionId, ContractKind};
use crate::location::{compose_stack, Location, Stack};

/// Base error for everything the contract machinery can raise.
#[derive(Debug, Error)]
pub enum ContractError {
    /// A declared condition evaluated to `false` for a specific call.
    #[error(transparent)]
    Violation(#[from] ContractViolation),

    /// An abstract contract function — a placeholder with no real
    /// implementation — was executed.
    #[error(transparent)]
    Abstract(#[from] AbstractError),

    /// A condition panicked while being evaluated.
    #[error(transparent)]
    Meta(#[from] ConditionMetaError),
}

impl ContractError {
    /// Classify an error raised by a contract function call.
    pub fn of(error: &anyhow::Error) -> Option<&ContractError> {
        error.downcast_ref::<ContractError>()
    }

    /// Whether `error` originates from contract verification, as opposed to
    /// being an application error passed through unchanged.
    pub fn is_contract_error(error: &anyhow::Error) -> bool {
        error.is::<ContractError>()
    }

    pub fn violation(&self) -> Option<&ContractViolation> {
        match self {
            ContractError::Violation(violation) => Some(violation),
            _ => None,
        }
    }

    /// The user-facing trace: error name, message, then the first frame
    /// outside the library onward.
    pub fn stack(&self) -> String {
        match self {
            ContractError::Violation(violation) => violation.stack(),
            ContractError::Abstract(abstract_error) => abstract_error.stack(),
            ContractError::Meta(meta) => meta.stack(),
        }
    }
}

/// A failed condition, observed for one specific call of a contract function.
///
/// The variant is the blame assignment: a precondition blames the caller, a
/// postcondition blames the implementation, an exception condition blames the
/// implementation for raising an undocumented error.
#[derive(Debug, Error)]
pub enum ContractViolation {
    #[error("precondition violated: {0}")]
    Precondition(ViolationDetail),

    #[error("postcondition violated: {0}")]
    Postcondition(ViolationDetail),

    #[error("exception condition violated: {0}")]
    ExceptionCondition(ViolationDetail),
}

impl ContractViolation {
    pub(crate) fn from_detail(detail: ViolationDetail) -> Self {
        match detail.kind {
            ContractKind::Precondition => ContractViolation::Precondition(detail),
            ContractKind::Postcondition => ContractViolation::Postcondition(detail),
            ContractKind::ExceptionCondition => ContractViolation::ExceptionCondition(detail),
        }
    }

    pub fn detail(&self) -> &ViolationDetail {
        match self {
            ContractViolation::Precondition(detail)
            | ContractViolation::Postcondition(detail)
            | ContractViolation::ExceptionCondition(detail) => detail,
        }
    }

    pub fn kind(&self) -> ContractKind {
        self.detail().kind
    }

    /// Name of the condition that failed.
    pub fn condition(&self) -> &str {
        self.detail().condition()
    }

    pub fn condition_id(&self) -> ConditionId {
        self.detail().condition_id
    }

    /// Self-contained description of the failing call.
    pub fn message(&self) -> &str {
        self.detail().message()
    }

    /// The argument record of the failing call, if `A` is its actual type.
    pub fn args<A: 'static>(&self) -> Option<&A> {
        self.detail().args()
    }

    pub fn subject<S: 'static>(&self) -> Option<&S> {
        self.detail().subject()
    }

    pub fn result<R: 'static>(&self) -> Option<&R> {
        self.detail().result()
    }

    pub fn error(&self) -> Option<&anyhow::Error> {
        self.detail().error()
    }

    pub fn stack(&self) -> String {
        self.detail().stack()
    }

    pub fn report(&self) -> ViolationReport {
        self.detail().report()
    }
}

/// Everything captured about one violation.
///
/// The detail owns a snapshot of the call — subject, argument record, and the
/// result or raised error — so the violation stays accurate even if the
/// caller later mutates or drops its own values. It holds the *identity* of
/// the contract function and condition (names, ids, locations), not the
/// values themselves.
pub struct ViolationDetail {
    pub(crate) kind: ContractKind,
    pub(crate) condition: String,
    pub(crate) condition_id: ConditionId,
    pub(crate) condition_index: usize,
    pub(crate) function: String,
    pub(crate) contract_location: Location,
    pub(crate) location: Location,
    pub(crate) subject_repr: String,
    pub(crate) args_repr: String,
    pub(crate) result_repr: Option<String>,
    pub(crate) error_repr: Option<String>,
    pub(crate) message: String,
    pub(crate) subject: Box<dyn Any + Send + Sync>,
    pub(crate) args: Box<dyn Any + Send + Sync>,
    pub(crate) result: Option<Box<dyn Any + Send + Sync>>,
    pub(crate) error: Option<anyhow::Error>,
    pub(crate) raw_stack: Stack,
}

impl ViolationDetail {
    pub fn kind(&self) -> ContractKind {
        self.kind
    }

    pub fn condition(&self) -> &str {
        &self.condition
    }

    pub fn condition_id(&self) -> ConditionId {
        self.condition_id
    }

    /// Position of the failing condition in its declared sequence.
    pub fn condition_index(&self) -> usize {
        self.condition_index
    }

    /// Display name of the contract function that was executing.
    pub fn function(&self) -> &str {
        &self.function
    }

    /// Where the contract was declared.
    pub fn contract_location(&self) -> Location {
        self.contract_location
    }

    /// Where the implementation was bound to the contract.
    pub fn location(&self) -> Location {
        self.location
    }

    pub fn subject_repr(&self) -> &str {
        &self.subject_repr
    }

    pub fn args_repr(&self) -> &str {
        &self.args_repr
    }

    pub fn result_repr(&self) -> Option<&str> {
        self.result_repr.as_deref()
    }

    pub fn error_repr(&self) -> Option<&str> {
        self.error_repr.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Typed read-back of the subject snapshot.
    pub fn subject<S: 'static>(&self) -> Option<&S> {
        self.subject.downcast_ref::<S>()
    }

    /// Typed read-back of the argument record snapshot.
    pub fn args<A: 'static>(&self) -> Option<&A> {
        self.args.downcast_ref::<A>()
    }

    /// The returned value, for postcondition violations.
    pub fn result<R: 'static>(&self) -> Option<&R> {
        self.result.as_ref()?.downcast_ref::<R>()
    }

    /// The raised error, for exception condition violations.
    pub fn error(&self) -> Option<&anyhow::Error> {
        self.error.as_ref()
    }

    /// The raw stack captured when the violation was constructed.
    pub fn raw_stack(&self) -> &Stack {
        &self.raw_stack
    }

    /// The user-facing trace: violation name, message, then the first frame
    /// outside the library onward.
    pub fn stack(&self) -> String {
        compose_stack(self.kind.violation_name(), &self.message, &self.raw_stack)
    }

    pub fn report(&self) -> ViolationReport {
        ViolationReport {
            violation: self.kind.violation_name(),
            kind: self.kind,
            condition: self.condition.clone(),
            condition_index: self.condition_index,
            function: self.function.clone(),
            message: self.message.clone(),
            contract_location: self.contract_location,
            location: self.location,
            stack: self.stack(),
        }
    }
}

impl fmt::Display for ViolationDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl fmt::Debug for ViolationDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViolationDetail")
            .field("kind", &self.kind)
            .field("condition", &self.condition)
            .field("condition_id", &self.condition_id)
            .field("condition_index", &self.condition_index)
            .field("function", &self.function)
            .field("contract_location", &self.contract_location)
            .field("location", &self.location)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

/// Raised when an abstract contract function — the placeholder produced by
/// [`AbstractContract::abstract_implementation`](crate::contract::AbstractContract) —
/// is executed. At that level no concrete implementation or call record
/// exists to report on, only the contract's declaration site.
#[derive(Debug, Error)]
#[error("an abstract contract function cannot be executed (contract declared at {contract_location})")]
pub struct AbstractError {
    contract_location: Location,
    raw_stack: Stack,
}

impl AbstractError {
    pub(crate) fn new(contract_location: Location) -> Self {
        AbstractError {
            contract_location,
            raw_stack: Stack::capture(),
        }
    }

    pub fn contract_location(&self) -> Location {
        self.contract_location
    }

    pub fn raw_stack(&self) -> &Stack {
        &self.raw_stack
    }

    pub fn stack(&self) -> String {
        compose_stack("AbstractError", &self.to_string(), &self.raw_stack)
    }
}

/// A condition panicked while being evaluated.
///
/// This is not a violation: nothing is known about whether the condition
/// holds. It is a bug in the contract itself, reported with the panic text so
/// the contract author can reproduce it.
#[derive(Debug, Error)]
#[error("{kind} `{condition}` of `{function}` panicked during evaluation: {panic}")]
pub struct ConditionMetaError {
    kind: ContractKind,
    condition: String,
    condition_id: ConditionId,
    function: String,
    panic: String,
    location: Location,
    raw_stack: Stack,
}

impl ConditionMetaError {
    pub(crate) fn new(
        kind: ContractKind,
        condition: &str,
        condition_id: ConditionId,
        function: &str,
        panic: String,
        location: Location,
    ) -> Self {
        ConditionMetaError {
            kind,
            condition: condition.to_owned(),
            condition_id,
            function: function.to_owned(),
            panic,
            location,
            raw_stack: Stack::capture(),
        }
    }

    pub fn kind(&self) -> ContractKind {
        self.kind
    }

    pub fn condition(&self) -> &str {
        &self.condition
    }

    pub fn condition_id(&self) -> ConditionId {
        self.condition_id
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    /// The panic payload rendered as text.
    pub fn panic_text(&self) -> &str {
        &self.panic
    }

    /// Where the implementation was bound to the contract.
    pub fn location(&self) -> Location {
        self.location
    }

    pub fn stack(&self) -> String {
        compose_stack("ConditionMetaError", &self.to_string(), &self.raw_stack)
    }
}

/// Flat, serializable record of a violation for structured log pipelines.
#[derive(Debug, Clone, Serialize)]
pub struct ViolationReport {
    pub violation: &'static str,
    pub kind: ContractKind,
    pub condition: String,
    pub condition_index: usize,
    pub function: String,
    pub message: String,
    pub contract_location: Location,
    pub location: Location,
    pub stack: String,
}

impl ViolationReport {
    /// JSON rendering; a flat record of strings and integers cannot fail to
    /// serialize.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}
