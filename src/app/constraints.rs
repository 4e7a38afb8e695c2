use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::future::join_all;
use futures_util::FutureExt;
use tracing::warn;

use crate::ports::Constraint;

/// Ordered set of inclusion rules evaluated as a conjunction.
///
/// An empty set accepts everything. A rule that errors (or panics) rejects
/// the candidate it was evaluating and nothing else.
pub struct ConstraintSet<C> {
    constraints: Vec<Arc<dyn Constraint<C>>>,
}

impl<C> Clone for ConstraintSet<C> {
    fn clone(&self) -> Self {
        Self {
            constraints: self.constraints.clone(),
        }
    }
}

impl<C: Send + Sync> Default for ConstraintSet<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Send + Sync> ConstraintSet<C> {
    pub fn new() -> Self {
        Self {
            constraints: Vec::new(),
        }
    }

    /// Append a rule; rules run in insertion order.
    pub fn with(mut self, constraint: impl Constraint<C> + 'static) -> Self {
        self.push(Arc::new(constraint));
        self
    }

    pub fn push(&mut self, constraint: Arc<dyn Constraint<C>>) {
        self.constraints.push(constraint);
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Whether every rule accepts `candidate`. Stops at the first rejection.
    pub async fn evaluate(&self, candidate: &C) -> bool {
        for constraint in &self.constraints {
            let verdict = AssertUnwindSafe(constraint.accepts(candidate))
                .catch_unwind()
                .await;
            match verdict {
                Ok(Ok(true)) => {}
                Ok(Ok(false)) => return false,
                Ok(Err(e)) => {
                    warn!(constraint = constraint.name(), error = %e, "Constraint failed, rejecting candidate");
                    return false;
                }
                Err(_) => {
                    warn!(constraint = constraint.name(), "Constraint panicked, rejecting candidate");
                    return false;
                }
            }
        }
        true
    }

    /// The accepted subset of `items`, in their original order.
    pub async fn filter<'a>(&self, items: &'a [C]) -> Vec<&'a C> {
        if self.constraints.is_empty() {
            return items.iter().collect();
        }
        let verdicts = join_all(items.iter().map(|item| self.evaluate(item))).await;
        items
            .iter()
            .zip(verdicts)
            .filter_map(|(item, accepted)| accepted.then_some(item))
            .collect()
    }

    /// Owned variant of [`ConstraintSet::filter`].
    pub async fn filter_owned(&self, items: Vec<C>) -> Vec<C> {
        if self.constraints.is_empty() {
            return items;
        }
        let verdicts = join_all(items.iter().map(|item| self.evaluate(item))).await;
        items
            .into_iter()
            .zip(verdicts)
            .filter_map(|(item, accepted)| accepted.then_some(item))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::domain::{DomainError, Port};
    use crate::ports::{AsyncFnConstraint, FnConstraint};

    fn ports() -> Vec<Port> {
        vec![
            Port::new("serial", "COM1"),
            Port::new("network", "10.0.0.2"),
            Port::new("serial", "COM2"),
        ]
    }

    #[tokio::test]
    async fn test_empty_set_accepts_everything() {
        let set = ConstraintSet::<Port>::new();
        let items = ports();
        assert!(set.evaluate(&items[0]).await);
        assert_eq!(set.filter(&items).await.len(), 3);
    }

    #[tokio::test]
    async fn test_filter_keeps_order() {
        let set = ConstraintSet::new().with(FnConstraint::new("serial-only", |p: &Port| {
            Ok(p.protocol == "serial")
        }));
        let items = ports();
        let accepted: Vec<&str> = set
            .filter(&items)
            .await
            .iter()
            .map(|p| p.address.as_str())
            .collect();
        assert_eq!(accepted, ["COM1", "COM2"]);
    }

    #[tokio::test]
    async fn test_short_circuits_on_rejection() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let set = ConstraintSet::new()
            .with(FnConstraint::new("reject", |_: &Port| Ok(false)))
            .with(FnConstraint::new("count", move |_: &Port| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(true)
            }));

        assert!(!set.evaluate(&Port::new("serial", "COM1")).await);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_error_rejects_only_that_candidate() {
        let set = ConstraintSet::new().with(FnConstraint::new("flaky", |p: &Port| {
            if p.address == "COM1" {
                Err(DomainError::Constraint {
                    name: "flaky".to_string(),
                    message: "lookup failed".to_string(),
                })
            } else {
                Ok(true)
            }
        }));

        let filtered = set.filter_owned(ports()).await;
        let addresses: Vec<&str> = filtered.iter().map(|p| p.address.as_str()).collect();
        assert_eq!(addresses, ["10.0.0.2", "COM2"]);
    }

    #[tokio::test]
    async fn test_panicking_constraint_rejects() {
        let set = ConstraintSet::new().with(FnConstraint::new("boom", |p: &Port| {
            if p.protocol == "network" {
                panic!("unexpected protocol");
            }
            Ok(true)
        }));
        let filtered = set.filter_owned(ports()).await;
        assert_eq!(filtered.len(), 2);
    }

    #[tokio::test]
    async fn test_async_constraint() {
        let set = ConstraintSet::new().with(AsyncFnConstraint::new("slow", |p: Port| async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            Ok::<_, DomainError>(p.address != "COM2")
        }));
        let filtered = set.filter_owned(ports()).await;
        let addresses: Vec<&str> = filtered.iter().map(|p| p.address.as_str()).collect();
        assert_eq!(addresses, ["COM1", "10.0.0.2"]);
    }
}
