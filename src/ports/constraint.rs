use std::future::Future;
use std::marker::PhantomData;

use async_trait::async_trait;
use futures_util::future::BoxFuture;

use crate::domain::DomainError;

/// Port for caller-supplied inclusion rules.
///
/// A constraint decides whether a candidate may be shown. Evaluation may be
/// asynchronous; an `Err` is treated by the evaluator as a rejection.
#[async_trait]
pub trait Constraint<C>: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Whether `candidate` passes this rule.
    async fn accepts(&self, candidate: &C) -> Result<bool, DomainError>;
}

/// Constraint backed by a synchronous closure.
pub struct FnConstraint<C, F> {
    name: String,
    predicate: F,
    _candidate: PhantomData<fn(&C)>,
}

impl<C, F> FnConstraint<C, F>
where
    F: Fn(&C) -> Result<bool, DomainError> + Send + Sync + 'static,
{
    pub fn new(name: impl Into<String>, predicate: F) -> Self {
        Self {
            name: name.into(),
            predicate,
            _candidate: PhantomData,
        }
    }
}

#[async_trait]
impl<C, F> Constraint<C> for FnConstraint<C, F>
where
    C: Send + Sync + 'static,
    F: Fn(&C) -> Result<bool, DomainError> + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn accepts(&self, candidate: &C) -> Result<bool, DomainError> {
        (self.predicate)(candidate)
    }
}

/// Constraint backed by a closure returning a future.
///
/// The closure receives an owned clone of the candidate so the future does not
/// borrow from the evaluator.
pub struct AsyncFnConstraint<C> {
    name: String,
    predicate: BoxedPredicate<C>,
}

type BoxedPredicate<C> =
    Box<dyn Fn(C) -> BoxFuture<'static, Result<bool, DomainError>> + Send + Sync>;

impl<C> AsyncFnConstraint<C>
where
    C: Clone + Send + Sync + 'static,
{
    pub fn new<F, Fut>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(C) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<bool, DomainError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            predicate: Box::new(move |candidate| Box::pin(predicate(candidate))),
        }
    }
}

#[async_trait]
impl<C> Constraint<C> for AsyncFnConstraint<C>
where
    C: Clone + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn accepts(&self, candidate: &C) -> Result<bool, DomainError> {
        (self.predicate)(candidate.clone()).await
    }
}
