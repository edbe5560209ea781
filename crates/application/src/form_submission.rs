//! Submitting-flag discipline around an awaited form action.

use std::future::Future;

use crate::ErrorStateStore;

/// Raises the submitting flag for its lifetime.
///
/// The flag is lowered on drop, so it is released when the action returns,
/// fails, panics or is cancelled.
struct LoadingGuard<'a> {
    store: &'a mut ErrorStateStore,
}

impl<'a> LoadingGuard<'a> {
    fn acquire(store: &'a mut ErrorStateStore) -> Self {
        store.set_loading(true);
        Self { store }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.store.set_loading(false);
    }
}

/// Runs a form action with the store's submitting flag held.
pub async fn run_submission<Fut>(store: &mut ErrorStateStore, action: Fut) -> Fut::Output
where
    Fut: Future,
{
    let _guard = LoadingGuard::acquire(store);
    action.await
}
