//! The immutable contract model.
//!
//! An [`AbstractContract`] is the declared behavioral specification of a
//! function: three frozen, ordered sequences of conditions — preconditions,
//! postconditions, exception conditions — plus the source location where the
//! contract was declared. It is a pure value: construction takes the
//! condition vectors by move and freezes them behind `Arc<[…]>`, so nothing
//! can mutate a contract after it is built, and no caller can retroactively
//! change one by holding on to the vectors it was built from.
//!
//! Condition order is evaluation order. Order never affects *whether* a call
//! satisfies a contract — all conditions must hold — but it is externally
//! visible through short-circuiting: verification stops at the first failing
//! condition.
//!
//! A contract is a cheap handle: cloning shares the frozen sequences.
//! Identity is by [`ContractId`], assigned once at construction and shared by
//! all clones.
//!
//! # The unconstrained root contract
//!
//! [`AbstractContract::unconstrained`] is the top of the conceptual contract
//! hierarchy: a contract with a single always-failing precondition, declared
//! at [`Location::INTERNAL`]. It is a safe default — any contract function
//! bound to it refuses every call — and a placeholder marker for "no real
//! contract here yet".

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;

use crate::condition::{ExceptionCondition, Postcondition, Precondition};
use crate::location::Location;

static NEXT_CONTRACT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a contract, shared by all of its clones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ContractId(u64);

impl ContractId {
    fn next() -> Self {
        ContractId(NEXT_CONTRACT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "contract#{}", self.0)
    }
}

/// Name of the always-failing precondition of the unconstrained root
/// contract.
pub const FALSUM: &str = "falsum";

/// A declared set of preconditions, postconditions, and exception conditions
/// for a function with subject `S`, argument record `A`, and return type `R`.
pub struct AbstractContract<S, A, R> {
    id: ContractId,
    pre: Arc<[Precondition<S, A>]>,
    post: Arc<[Postcondition<S, A, R>]>,
    exception: Arc<[ExceptionCondition<S, A, R>]>,
    location: Location,
    root: bool,
}

impl<S, A, R> AbstractContract<S, A, R> {
    /// Declare a contract from its condition sequences.
    ///
    /// The vectors are moved in and frozen; the declaration site of the
    /// caller is recorded as the contract's location.
    #[track_caller]
    pub fn new(
        pre: Vec<Precondition<S, A>>,
        post: Vec<Postcondition<S, A, R>>,
        exception: Vec<ExceptionCondition<S, A, R>>,
    ) -> Self {
        Self::assemble(pre, post, exception, Location::call_site(), false)
    }

    pub fn builder() -> ContractBuilder<S, A, R> {
        ContractBuilder::new()
    }

    fn assemble(
        pre: Vec<Precondition<S, A>>,
        post: Vec<Postcondition<S, A, R>>,
        exception: Vec<ExceptionCondition<S, A, R>>,
        location: Location,
        root: bool,
    ) -> Self {
        AbstractContract {
            id: ContractId::next(),
            pre: pre.into(),
            post: post.into(),
            exception: exception.into(),
            location,
            root,
        }
    }

    pub fn id(&self) -> ContractId {
        self.id
    }

    /// Preconditions, in evaluation order. The slice is frozen; there is no
    /// way to add, remove, or reorder conditions on a built contract.
    pub fn pre(&self) -> &[Precondition<S, A>] {
        &self.pre
    }

    /// Postconditions, in evaluation order.
    pub fn post(&self) -> &[Postcondition<S, A, R>] {
        &self.post
    }

    /// Exception conditions, in evaluation order.
    pub fn exception(&self) -> &[ExceptionCondition<S, A, R>] {
        &self.exception
    }

    /// Where the contract was declared, or [`Location::INTERNAL`] for the
    /// unconstrained root contract.
    pub fn location(&self) -> Location {
        self.location
    }

    pub fn is_unconstrained(&self) -> bool {
        self.root
    }

    pub fn has_conditions(&self) -> bool {
        !self.pre.is_empty() || !self.post.is_empty() || !self.exception.is_empty()
    }

    pub fn condition_count(&self) -> usize {
        self.pre.len() + self.post.len() + self.exception.len()
    }
}

impl<S, A, R> AbstractContract<S, A, R>
where
    S: 'static,
    A: 'static,
    R: 'static,
{
    /// The root of the contract hierarchy: a single precondition that always
    /// fails, so every call through it is refused until a real contract
    /// replaces it.
    pub fn unconstrained() -> Self {
        Self::assemble(
            vec![Precondition::new(FALSUM, |_: &S, _: &A| false)],
            Vec::new(),
            Vec::new(),
            Location::INTERNAL,
            true,
        )
    }
}

impl<S, A, R> Clone for AbstractContract<S, A, R> {
    fn clone(&self) -> Self {
        AbstractContract {
            id: self.id,
            pre: Arc::clone(&self.pre),
            post: Arc::clone(&self.post),
            exception: Arc::clone(&self.exception),
            location: self.location,
            root: self.root,
        }
    }
}

impl<S, A, R> PartialEq for AbstractContract<S, A, R> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<S, A, R> Eq for AbstractContract<S, A, R> {}

impl<S, A, R> fmt::Debug for AbstractContract<S, A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AbstractContract")
            .field("id", &self.id)
            .field("pre", &self.pre)
            .field("post", &self.post)
            .field("exception", &self.exception)
            .field("location", &self.location)
            .field("root", &self.root)
            .finish()
    }
}

/// Builder for an [`AbstractContract`].
pub struct ContractBuilder<S, A, R> {
    pre: Vec<Precondition<S, A>>,
    post: Vec<Postcondition<S, A, R>>,
    exception: Vec<ExceptionCondition<S, A, R>>,
}

impl<S, A, R> ContractBuilder<S, A, R> {
    pub fn new() -> Self {
        ContractBuilder {
            pre: Vec::new(),
            post: Vec::new(),
            exception: Vec::new(),
        }
    }

    /// Append a precondition.
    pub fn pre(mut self, condition: Precondition<S, A>) -> Self {
        self.pre.push(condition);
        self
    }

    /// Append a postcondition.
    pub fn post(mut self, condition: Postcondition<S, A, R>) -> Self {
        self.post.push(condition);
        self
    }

    /// Append an exception condition.
    pub fn exception(mut self, condition: ExceptionCondition<S, A, R>) -> Self {
        self.exception.push(condition);
        self
    }

    /// Freeze the conditions into a contract, recording the caller's source
    /// location as the declaration site.
    #[track_caller]
    pub fn build(self) -> AbstractContract<S, A, R> {
        AbstractContract::assemble(
            self.pre,
            self.post,
            self.exception,
            Location::call_site(),
            false,
        )
    }
}

impl<S, A, R> Default for ContractBuilder<S, A, R> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod contract_tests;
