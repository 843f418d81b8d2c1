//! The condition model: named predicates over contract function calls.
//!
//! A condition is a pure predicate evaluated against one call of a contract
//! function. Preconditions see the subject and the argument record;
//! postconditions additionally see the returned value; exception conditions
//! additionally see the raised error and a re-invocation of the contract
//! function bound to the original subject.
//!
//! Condition identity matters: violations name the condition that failed and
//! equality is by identity, not by predicate behavior. Every condition gets a
//! process-unique [`ConditionId`] at construction.
//!
//! Conditions are trusted to be pure. They must not panic; a panicking
//! condition is an internal tooling error and is reported as a
//! [`ConditionMetaError`](crate::errors::ConditionMetaError), never as a
//! violation.

use std::borrow::Cow;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::diagnostics;
use crate::runtime::Recall;

/// Marker for values that can flow through verification and be snapshotted
/// into a violation: subjects, argument records, and results.
pub trait ContractValue: fmt::Debug + Send + Sync + 'static {}

impl<T: fmt::Debug + Send + Sync + 'static> ContractValue for T {}

/// Which clause of a contract a condition belongs to.
///
/// Each kind has different blame semantics: a failed precondition blames the
/// caller, a failed postcondition blames the implementation, and a failed
/// exception condition means the implementation raised something the contract
/// does not document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContractKind {
    /// Checked before the implementation runs; failure indicates the caller
    /// violated the function's requirements.
    Precondition,

    /// Checked after the implementation returns `Ok`; failure indicates the
    /// implementation is incorrect.
    Postcondition,

    /// Checked after the implementation returns `Err`; failure indicates the
    /// implementation raised an undocumented error.
    ExceptionCondition,
}

impl ContractKind {
    /// Human label used inside messages.
    pub fn label(self) -> &'static str {
        match self {
            ContractKind::Precondition => "precondition",
            ContractKind::Postcondition => "postcondition",
            ContractKind::ExceptionCondition => "exception condition",
        }
    }

    /// The violation type name used as the first token of a rendered stack.
    pub fn violation_name(self) -> &'static str {
        match self {
            ContractKind::Precondition => "PreconditionViolation",
            ContractKind::Postcondition => "PostconditionViolation",
            ContractKind::ExceptionCondition => "ExceptionConditionViolation",
        }
    }
}

impl fmt::Display for ContractKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

static NEXT_CONDITION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ConditionId(u64);

impl ConditionId {
    fn next() -> Self {
        ConditionId(NEXT_CONDITION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ConditionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A named predicate over the subject and argument record of a call.
pub struct Precondition<S, A> {
    id: ConditionId,
    name: Cow<'static, str>,
    predicate: Arc<dyn Fn(&S, &A) -> bool + Send + Sync>,
}

impl<S, A> Precondition<S, A> {
    pub fn new<F>(name: impl Into<Cow<'static, str>>, predicate: F) -> Self
    where
        F: Fn(&S, &A) -> bool + Send + Sync + 'static,
    {
        Precondition {
            id: ConditionId::next(),
            name: diagnostics::normalize_name(name.into()),
            predicate: Arc::new(predicate),
        }
    }

    /// A condition without a given name, named after a shortened rendering of
    /// the predicate's type path.
    pub fn anonymous<F>(predicate: F) -> Self
    where
        F: Fn(&S, &A) -> bool + Send + Sync + 'static,
    {
        Self::new(diagnostics::short_type_name::<F>(), predicate)
    }

    pub fn id(&self) -> ConditionId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Evaluate the predicate for one call.
    pub fn holds(&self, subject: &S, args: &A) -> bool {
        (self.predicate)(subject, args)
    }
}

impl<S, A> Clone for Precondition<S, A> {
    fn clone(&self) -> Self {
        Precondition {
            id: self.id,
            name: self.name.clone(),
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<S, A> PartialEq for Precondition<S, A> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<S, A> Eq for Precondition<S, A> {}

impl<S, A> fmt::Debug for Precondition<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Precondition")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// A named predicate that additionally sees the value the implementation
/// returned.
pub struct Postcondition<S, A, R> {
    id: ConditionId,
    name: Cow<'static, str>,
    predicate: Arc<dyn Fn(&S, &A, &R) -> bool + Send + Sync>,
}

impl<S, A, R> Postcondition<S, A, R> {
    pub fn new<F>(name: impl Into<Cow<'static, str>>, predicate: F) -> Self
    where
        F: Fn(&S, &A, &R) -> bool + Send + Sync + 'static,
    {
        Postcondition {
            id: ConditionId::next(),
            name: diagnostics::normalize_name(name.into()),
            predicate: Arc::new(predicate),
        }
    }

    pub fn anonymous<F>(predicate: F) -> Self
    where
        F: Fn(&S, &A, &R) -> bool + Send + Sync + 'static,
    {
        Self::new(diagnostics::short_type_name::<F>(), predicate)
    }

    pub fn id(&self) -> ConditionId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn holds(&self, subject: &S, args: &A, result: &R) -> bool {
        (self.predicate)(subject, args, result)
    }
}

impl<S, A, R> Clone for Postcondition<S, A, R> {
    fn clone(&self) -> Self {
        Postcondition {
            id: self.id,
            name: self.name.clone(),
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<S, A, R> PartialEq for Postcondition<S, A, R> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<S, A, R> Eq for Postcondition<S, A, R> {}

impl<S, A, R> fmt::Debug for Postcondition<S, A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Postcondition")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// A named predicate over a call whose implementation raised an error.
///
/// Besides the subject, argument record, and the raised error, the predicate
/// receives a [`Recall`] of the contract function bound to the original
/// subject, so it can for example re-invoke the function with different
/// arguments to check consistency. The recall is guaranteed to be callable;
/// no identity or equality guarantee is made about it.
pub struct ExceptionCondition<S, A, R> {
    id: ConditionId,
    name: Cow<'static, str>,
    #[allow(clippy::type_complexity)]
    predicate: Arc<dyn Fn(&S, &A, &anyhow::Error, &Recall<'_, S, A, R>) -> bool + Send + Sync>,
}

impl<S, A, R> ExceptionCondition<S, A, R> {
    pub fn new<F>(name: impl Into<Cow<'static, str>>, predicate: F) -> Self
    where
        F: Fn(&S, &A, &anyhow::Error, &Recall<'_, S, A, R>) -> bool + Send + Sync + 'static,
    {
        ExceptionCondition {
            id: ConditionId::next(),
            name: diagnostics::normalize_name(name.into()),
            predicate: Arc::new(predicate),
        }
    }

    pub fn anonymous<F>(predicate: F) -> Self
    where
        F: Fn(&S, &A, &anyhow::Error, &Recall<'_, S, A, R>) -> bool + Send + Sync + 'static,
    {
        Self::new(diagnostics::short_type_name::<F>(), predicate)
    }

    pub fn id(&self) -> ConditionId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn holds(
        &self,
        subject: &S,
        args: &A,
        error: &anyhow::Error,
        recall: &Recall<'_, S, A, R>,
    ) -> bool {
        (self.predicate)(subject, args, error, recall)
    }
}

impl<S, A, R> Clone for ExceptionCondition<S, A, R> {
    fn clone(&self) -> Self {
        ExceptionCondition {
            id: self.id,
            name: self.name.clone(),
            predicate: Arc::clone(&self.predicate),
        }
    }
}

impl<S, A, R> PartialEq for ExceptionCondition<S, A, R> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<S, A, R> Eq for ExceptionCondition<S, A, R> {}

impl<S, A, R> fmt::Debug for ExceptionCondition<S, A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExceptionCondition")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Build a [`Precondition`] named after the source text of its predicate.
///
/// `precondition!("name", |s, a| …)` names the condition explicitly instead.
#[macro_export]
macro_rules! precondition {
    ($name:literal, $predicate:expr) => {
        $crate::condition::Precondition::new($name, $predicate)
    };
    ($predicate:expr) => {
        $crate::condition::Precondition::new(stringify!($predicate), $predicate)
    };
}

/// Build a [`Postcondition`] named after the source text of its predicate.
#[macro_export]
macro_rules! postcondition {
    ($name:literal, $predicate:expr) => {
        $crate::condition::Postcondition::new($name, $predicate)
    };
    ($predicate:expr) => {
        $crate::condition::Postcondition::new(stringify!($predicate), $predicate)
    };
}

/// Build an [`ExceptionCondition`] named after the source text of its
/// predicate.
#[macro_export]
macro_rules! exception_condition {
    ($name:literal, $predicate:expr) => {
        $crate::condition::ExceptionCondition::new($name, $predicate)
    };
    ($predicate:expr) => {
        $crate::condition::ExceptionCondition::new(stringify!($predicate), $predicate)
    };
}

#[cfg(test)]
mod condition_tests;
