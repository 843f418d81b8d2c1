//! Contract function construction and the per-call verification engine.
//!
//! [`AbstractContract::implementation`] binds a raw implementation to a
//! contract, producing a [`ContractFunction`]: a callable stamped with the
//! contract it enforces, the implementation it wraps, and the source location
//! where the binding happened. All three stamps are read-only by
//! construction.
//!
//! Every call of a contract function runs the verification protocol:
//!
//! 1. Preconditions, in order, against the subject and argument record. The
//!    first failure raises a precondition violation; the implementation never
//!    runs.
//! 2. The implementation, with the original subject and arguments.
//! 3. On `Ok`: postconditions, in order, which additionally see the result.
//!    The first failure raises a postcondition violation; otherwise the
//!    result is returned.
//! 4. On `Err`: if the error is itself a contract error from a nested
//!    contract function it is re-raised unchanged. Otherwise exception
//!    conditions run, in order, seeing the error and a [`Recall`] bound to
//!    the original subject. The first failure raises an exception condition
//!    violation; otherwise the original error is re-raised unchanged, so
//!    contracts are transparent to the errors they document.
//!
//! Each invocation owns its argument record and snapshots everything a
//! violation needs at the moment of failure; nothing is shared between
//! calls, so re-entrant and recursive calls nest on the ordinary call stack.

use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{debug, trace};

use crate::condition::{ConditionId, ContractKind, ContractValue};
use crate::contract::AbstractContract;
use crate::diagnostics;
use crate::errors::{
    AbstractError, ConditionMetaError, ContractError, ContractViolation, ViolationDetail,
};
use crate::location::{Location, Stack};

/// Display name of a contract function bound without an explicit name.
pub const ANONYMOUS_FUNCTION: &str = "<contract function>";

/// Display name of the placeholder produced by
/// [`AbstractContract::abstract_implementation`].
pub const ABSTRACT_FUNCTION: &str = "<abstract contract function>";

impl<S, A, R> AbstractContract<S, A, R>
where
    S: ContractValue + Clone,
    A: ContractValue,
    R: ContractValue,
{
    /// Bind a raw implementation to this contract, producing the enforcing
    /// contract function. The caller's source location is recorded as the
    /// binding site.
    #[track_caller]
    pub fn implementation<F>(&self, implementation: F) -> ContractFunction<S, A, R>
    where
        F: Fn(&S, &A) -> anyhow::Result<R> + Send + Sync + 'static,
    {
        self.bind(Cow::Borrowed(ANONYMOUS_FUNCTION), implementation, Location::call_site())
    }

    /// Bind a raw implementation under a display name used in diagnostics.
    #[track_caller]
    pub fn implementation_named<F>(
        &self,
        name: impl Into<Cow<'static, str>>,
        implementation: F,
    ) -> ContractFunction<S, A, R>
    where
        F: Fn(&S, &A) -> anyhow::Result<R> + Send + Sync + 'static,
    {
        self.bind(name.into(), implementation, Location::call_site())
    }

    /// A placeholder contract function with no real implementation: every
    /// call that passes the preconditions raises [`AbstractError`].
    #[track_caller]
    pub fn abstract_implementation(&self) -> ContractFunction<S, A, R> {
        let contract_location = self.location();
        self.bind(
            Cow::Borrowed(ABSTRACT_FUNCTION),
            move |_subject: &S, _args: &A| -> anyhow::Result<R> {
                Err(anyhow::Error::new(ContractError::Abstract(
                    AbstractError::new(contract_location),
                )))
            },
            Location::call_site(),
        )
    }

    fn bind<F>(
        &self,
        name: Cow<'static, str>,
        implementation: F,
        location: Location,
    ) -> ContractFunction<S, A, R>
    where
        F: Fn(&S, &A) -> anyhow::Result<R> + Send + Sync + 'static,
    {
        trace!(contract = %self.id(), function = %name, "binding implementation");
        ContractFunction {
            contract: self.clone(),
            implementation: Arc::new(implementation),
            location,
            name,
        }
    }
}

impl<S, A, R> AbstractContract<S, A, R> {
    /// Whether `function` is a contract function enforcing this contract.
    /// Identity is by [`ContractId`](crate::contract::ContractId), so clones
    /// of the same contract all match.
    pub fn implemented_by(&self, function: &ContractFunction<S, A, R>) -> bool {
        function.contract().id() == self.id()
    }
}

/// The enforcing wrapper around a raw implementation.
///
/// Created once by [`AbstractContract::implementation`], immutable
/// thereafter, invoked arbitrarily many times through [`call`](Self::call).
/// Cloning shares the contract and the implementation.
pub struct ContractFunction<S, A, R> {
    pub(crate) contract: AbstractContract<S, A, R>,
    #[allow(clippy::type_complexity)]
    pub(crate) implementation: Arc<dyn Fn(&S, &A) -> anyhow::Result<R> + Send + Sync>,
    pub(crate) location: Location,
    pub(crate) name: Cow<'static, str>,
}

impl<S, A, R> ContractFunction<S, A, R> {
    /// The contract this function enforces.
    pub fn contract(&self) -> &AbstractContract<S, A, R> {
        &self.contract
    }

    /// The raw implementation the contract function wraps.
    pub fn implementation(&self) -> &(dyn Fn(&S, &A) -> anyhow::Result<R> + Send + Sync) {
        self.implementation.as_ref()
    }

    /// Where the implementation was bound to the contract.
    pub fn location(&self) -> Location {
        self.location
    }

    /// Display name used in diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<S, A, R> ContractFunction<S, A, R>
where
    S: ContractValue + Clone,
    A: ContractValue,
    R: ContractValue,
{
    /// Invoke the wrapped implementation under full verification.
    ///
    /// Violations, [`AbstractError`], and [`ConditionMetaError`] are raised
    /// as [`ContractError`] through the returned `anyhow::Error`; every other
    /// error is the implementation's own, passed through unchanged.
    pub fn call(&self, subject: &S, args: A) -> anyhow::Result<R> {
        trace!(function = %self.name, "verifying preconditions");
        for (index, condition) in self.contract.pre().iter().enumerate() {
            let holds = self.checked(ContractKind::Precondition, condition.name(), condition.id(), || {
                condition.holds(subject, &args)
            })?;
            if !holds {
                return Err(self.violation(
                    ContractKind::Precondition,
                    index,
                    condition.name(),
                    condition.id(),
                    subject,
                    args,
                    None,
                    None,
                ));
            }
        }

        match (self.implementation)(subject, &args) {
            Ok(result) => {
                trace!(function = %self.name, "verifying postconditions");
                for (index, condition) in self.contract.post().iter().enumerate() {
                    let holds =
                        self.checked(ContractKind::Postcondition, condition.name(), condition.id(), || {
                            condition.holds(subject, &args, &result)
                        })?;
                    if !holds {
                        return Err(self.violation(
                            ContractKind::Postcondition,
                            index,
                            condition.name(),
                            condition.id(),
                            subject,
                            args,
                            Some(result),
                            None,
                        ));
                    }
                }
                Ok(result)
            }
            Err(error) => {
                if ContractError::is_contract_error(&error) {
                    trace!(function = %self.name, "re-raising nested contract error unchanged");
                    return Err(error);
                }
                trace!(function = %self.name, "verifying exception conditions");
                let recall = Recall {
                    function: self,
                    subject,
                };
                for (index, condition) in self.contract.exception().iter().enumerate() {
                    let holds = self.checked(
                        ContractKind::ExceptionCondition,
                        condition.name(),
                        condition.id(),
                        || condition.holds(subject, &args, &error, &recall),
                    )?;
                    if !holds {
                        return Err(self.violation(
                            ContractKind::ExceptionCondition,
                            index,
                            condition.name(),
                            condition.id(),
                            subject,
                            args,
                            None,
                            Some(error),
                        ));
                    }
                }
                Err(error)
            }
        }
    }

    /// Invoke the wrapped implementation directly, without verification.
    pub fn call_unchecked(&self, subject: &S, args: A) -> anyhow::Result<R> {
        (self.implementation)(subject, &args)
    }

    /// Evaluate one condition, converting a panic inside the predicate into a
    /// [`ConditionMetaError`].
    fn checked<T>(
        &self,
        kind: ContractKind,
        condition: &str,
        condition_id: ConditionId,
        predicate: impl FnOnce() -> T,
    ) -> anyhow::Result<T> {
        match catch_unwind(AssertUnwindSafe(predicate)) {
            Ok(value) => Ok(value),
            Err(payload) => {
                let panic = panic_text(payload);
                debug!(
                    function = %self.name,
                    condition = condition,
                    panic = %panic,
                    "condition panicked during evaluation"
                );
                Err(anyhow::Error::new(ContractError::Meta(
                    ConditionMetaError::new(
                        kind,
                        condition,
                        condition_id,
                        &self.name,
                        panic,
                        self.location,
                    ),
                )))
            }
        }
    }

    /// Construct a violation for the first failing condition of a call. All
    /// diagnostic text is rendered here, eagerly, and the call's values are
    /// moved into the violation as its own snapshot.
    #[allow(clippy::too_many_arguments)]
    fn violation(
        &self,
        kind: ContractKind,
        condition_index: usize,
        condition: &str,
        condition_id: ConditionId,
        subject: &S,
        args: A,
        result: Option<R>,
        error: Option<anyhow::Error>,
    ) -> anyhow::Error {
        let subject_repr = diagnostics::concise(subject);
        let args_repr = diagnostics::concise(&args);
        let result_repr = result.as_ref().map(|result| diagnostics::concise(result));
        let error_repr = error
            .as_ref()
            .map(|error| diagnostics::concise_str(&error.to_string()));
        let mut message = format!(
            "`{condition}` failed when `{}` was called on {subject_repr} with arguments {args_repr}",
            self.name,
        );
        if let Some(repr) = &result_repr {
            message.push_str(&format!(", which returned {repr}"));
        }
        if let Some(repr) = &error_repr {
            message.push_str(&format!(", which raised {repr}"));
        }
        debug!(
            kind = %kind,
            function = %self.name,
            condition = condition,
            message = %message,
            "contract violation"
        );
        let detail = ViolationDetail {
            kind,
            condition: condition.to_owned(),
            condition_id,
            condition_index,
            function: self.name.clone().into_owned(),
            contract_location: self.contract.location(),
            location: self.location,
            subject_repr,
            args_repr,
            result_repr,
            error_repr,
            message,
            subject: Box::new(subject.clone()),
            args: Box::new(args),
            result: result.map(|result| Box::new(result) as Box<dyn Any + Send + Sync>),
            error,
            raw_stack: Stack::capture(),
        };
        anyhow::Error::new(ContractError::Violation(ContractViolation::from_detail(
            detail,
        )))
    }
}

impl<S, A, R> Clone for ContractFunction<S, A, R> {
    fn clone(&self) -> Self {
        ContractFunction {
            contract: self.contract.clone(),
            implementation: Arc::clone(&self.implementation),
            location: self.location,
            name: self.name.clone(),
        }
    }
}

impl<S, A, R> fmt::Debug for ContractFunction<S, A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractFunction")
            .field("name", &self.name)
            .field("contract", &self.contract.id())
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

/// Re-invocation of the contract function under verification, bound to the
/// original subject of the failing call. Handed to exception conditions so
/// they can, for example, re-invoke the function with different arguments to
/// check consistency.
pub struct Recall<'c, S, A, R> {
    function: &'c ContractFunction<S, A, R>,
    subject: &'c S,
}

impl<'c, S, A, R> Recall<'c, S, A, R>
where
    S: ContractValue + Clone,
    A: ContractValue,
    R: ContractValue,
{
    /// Call the contract function again, with the original subject and the
    /// given arguments, under full verification.
    pub fn invoke(&self, args: A) -> anyhow::Result<R> {
        self.function.call(self.subject, args)
    }

    /// The contract function being re-invoked.
    pub fn function(&self) -> &ContractFunction<S, A, R> {
        self.function
    }

    /// The subject the re-invocation is bound to.
    pub fn subject(&self) -> &S {
        self.subject
    }
}

impl<'c, S, A, R> fmt::Debug for Recall<'c, S, A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Recall({})", self.function.name)
    }
}

fn panic_text(payload: Box<dyn Any + Send>) -> String {
    if let Some(text) = payload.downcast_ref::<&'static str>() {
        (*text).to_owned()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "<opaque panic payload>".to_owned()
    }
}
