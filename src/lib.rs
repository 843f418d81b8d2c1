//! Pacta — runtime design-by-contract for Rust functions.
//!
//! This crate lets a caller wrap a function implementation with declared
//! preconditions, postconditions, and exception conditions, producing a
//! *contract function* that enforces those conditions on every call and
//! reports failures as structured, debuggable errors with stack traces that
//! start at the offending call site rather than inside the library.
//!
//! # Contract Semantics
//!
//! ## Preconditions
//! - Evaluated before the implementation runs, in declaration order
//! - The first failing precondition raises a precondition violation and the
//!   implementation is never invoked
//! - Failed preconditions indicate a bug in the calling code
//!
//! ## Postconditions
//! - Evaluated after the implementation returns `Ok`, in declaration order
//! - Receive the returned value in addition to the call's subject and
//!   arguments
//! - Failed postconditions indicate a bug in the implementation
//!
//! ## Exception conditions
//! - Evaluated when the implementation returns `Err`, in declaration order
//! - Receive the raised error and a [`Recall`](runtime::Recall) of the
//!   contract function bound to the original subject
//! - When every exception condition holds (or none are declared), the
//!   original error propagates unchanged — contracts are transparent to the
//!   errors they document
//! - A violation raised by a *nested* contract function is always re-raised
//!   as-is, never re-interpreted by an enclosing contract
//!
//! # Example
//!
//! ```
//! use pacta::{precondition, postcondition, AbstractContract, ContractError, ContractKind};
//!
//! let contract = AbstractContract::<(), (i64,), i64>::builder()
//!     .pre(precondition!(|_s: &(), (n,): &(i64,)| *n >= 0))
//!     .post(postcondition!(|_s: &(), (n,): &(i64,), result: &i64| *result == *n * 2))
//!     .build();
//!
//! let double = contract.implementation(|_s, (n,)| Ok(*n * 2));
//! assert_eq!(double.call(&(), (4,)).unwrap(), 8);
//!
//! let err = double.call(&(), (-1,)).unwrap_err();
//! let violation = ContractError::of(&err).and_then(ContractError::violation).unwrap();
//! assert_eq!(violation.kind(), ContractKind::Precondition);
//! ```
//!
//! Contract expressions must be pure: conditions are trusted not to mutate
//! state and may be re-evaluated freely. The library does not verify purity.

pub mod condition;
pub mod contract;
pub mod diagnostics;
pub mod errors;
pub mod location;
pub mod runtime;

pub use condition::{
    ConditionId, ContractKind, ContractValue, ExceptionCondition, Postcondition, Precondition,
};
pub use contract::{AbstractContract, ContractBuilder, ContractId};
pub use errors::{
    AbstractError, ConditionMetaError, ContractError, ContractViolation, ViolationDetail,
    ViolationReport,
};
pub use location::{Location, Stack};
pub use runtime::{ContractFunction, Recall};

#[cfg(test)]
mod tests;
