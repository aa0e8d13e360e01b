//! One-shot state for catalog mutations.

use std::future::Future;

use tokio::sync::watch;

use crate::application::repos::CatalogError;

#[derive(Debug, Clone, PartialEq)]
pub enum MutationState<T> {
    Idle,
    Pending,
    Success(T),
    Error(CatalogError),
}

impl<T> MutationState<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, MutationState::Pending)
    }
}

/// Tracks the latest run of a mutation for observers such as an open dialog.
///
/// State is not keyed or cached: each `run` overwrites the previous outcome.
pub struct Mutation<T> {
    state: watch::Sender<MutationState<T>>,
}

impl<T: Clone> Mutation<T> {
    pub fn new() -> Self {
        let (state, _) = watch::channel(MutationState::Idle);
        Self { state }
    }

    pub fn subscribe(&self) -> watch::Receiver<MutationState<T>> {
        self.state.subscribe()
    }

    pub fn state(&self) -> MutationState<T> {
        self.state.borrow().clone()
    }

    pub async fn run<F>(&self, action: F) -> Result<T, CatalogError>
    where
        F: Future<Output = Result<T, CatalogError>>,
    {
        self.state.send_replace(MutationState::Pending);
        let result = action.await;
        self.state.send_replace(match &result {
            Ok(value) => MutationState::Success(value.clone()),
            Err(error) => MutationState::Error(error.clone()),
        });
        result
    }

    pub fn reset(&self) {
        self.state.send_replace(MutationState::Idle);
    }
}

impl<T: Clone> Default for Mutation<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::repos::{CatalogOperation, CatalogTarget};

    #[tokio::test]
    async fn run_reports_pending_then_success() {
        let mutation: Mutation<u64> = Mutation::new();
        let mut updates = mutation.subscribe();
        assert_eq!(mutation.state(), MutationState::Idle);

        let (tx, rx) = tokio::sync::oneshot::channel::<u64>();
        let run = mutation.run(async move { Ok(rx.await.unwrap_or_default()) });
        let observe = async {
            updates.changed().await.expect("state changes");
            let seen = updates.borrow_and_update().clone();
            let _ = tx.send(5);
            seen
        };

        let (result, seen) = tokio::join!(run, observe);
        assert_eq!(seen, MutationState::Pending);
        assert_eq!(result, Ok(5));
        assert_eq!(mutation.state(), MutationState::Success(5));
    }

    #[tokio::test]
    async fn failure_is_kept_until_reset() {
        let mutation: Mutation<u64> = Mutation::new();
        let error = CatalogError::not_found(CatalogOperation::Update, CatalogTarget::Product(3));

        let result = mutation.run(async { Err(error.clone()) }).await;
        assert_eq!(result, Err(error.clone()));
        assert_eq!(mutation.state(), MutationState::Error(error));

        mutation.reset();
        assert_eq!(mutation.state(), MutationState::Idle);
    }
}
