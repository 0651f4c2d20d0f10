//! Background work with results marshalled back onto a single UI loop.
//!
//! Widgets (here: the `S` state) are only ever touched by [`UiLoop`]. Workers
//! compute a value and post a completion callback; they never mutate `S`.

use std::future::Future;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

/// A unit of work to run on the UI loop.
pub type UiTask<S> = Box<dyn FnOnce(&mut S) + Send + 'static>;

/// Receiving half, owned by whoever owns the UI state.
pub struct UiLoop<S> {
    rx: UnboundedReceiver<UiTask<S>>,
}

/// Sending half. Cheap to clone and safe to move into workers.
pub struct UiHandle<S> {
    tx: UnboundedSender<UiTask<S>>,
}

impl<S> Clone for UiHandle<S> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<S> std::fmt::Debug for UiHandle<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UiHandle")
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

/// Create a connected loop/handle pair.
pub fn ui_loop<S>() -> (UiLoop<S>, UiHandle<S>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (UiLoop { rx }, UiHandle { tx })
}

impl<S> UiLoop<S> {
    /// Apply everything already queued, without waiting. Returns how many ran.
    pub fn run_pending(&mut self, state: &mut S) -> usize {
        let mut ran = 0;
        while let Ok(task) = self.rx.try_recv() {
            task(state);
            ran += 1;
        }
        ran
    }

    /// Wait for the next callback and apply it. `false` once every handle is gone.
    pub async fn run_next(&mut self, state: &mut S) -> bool {
        match self.rx.recv().await {
            Some(task) => {
                task(state);
                true
            }
            None => false,
        }
    }
}

impl<S: 'static> UiHandle<S> {
    /// Queue `f` for the UI loop. `false` if the loop has been dropped.
    pub fn post(&self, f: impl FnOnce(&mut S) + Send + 'static) -> bool {
        self.tx.send(Box::new(f)).is_ok()
    }

    /// Run `task` on the runtime's worker threads, then schedule
    /// `on_complete(state, output)` on the UI loop.
    ///
    /// `task` must fold its own failures into `T`. There is no cancellation;
    /// callers that care about ordering compare generations in `on_complete`.
    pub fn run_in_background<T, Fut, C>(&self, task: Fut, on_complete: C) -> JoinHandle<()>
    where
        T: Send + 'static,
        Fut: Future<Output = T> + Send + 'static,
        C: FnOnce(&mut S, T) + Send + 'static,
    {
        let handle = self.clone();
        tokio::spawn(async move {
            let output = task.await;
            if !handle.post(move |state| on_complete(state, output)) {
                tracing::debug!("UI loop closed; dropping background result");
            }
        })
    }
}
