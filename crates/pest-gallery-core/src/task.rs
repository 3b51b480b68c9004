//! Owned background tasks that are aborted when their owner goes away.

use log::debug;
use std::future::Future;
use tokio::task::JoinHandle;

/// Handle to a spawned flow. Dropping it cancels the flow, so a dialog that
/// closes mid-request never applies a late result.
#[derive(Debug)]
pub struct FlowTask {
    name: &'static str,
    handle: JoinHandle<()>,
}

impl FlowTask {
    pub fn spawn<F>(name: &'static str, future: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        debug!("spawning flow task (name={})", name);
        Self {
            name,
            handle: tokio::spawn(future),
        }
    }
}

impl Drop for FlowTask {
    fn drop(&mut self) {
        if !self.handle.is_finished() {
            debug!("aborting flow task (name={})", self.name);
            self.handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn dropping_the_task_cancels_it() {
        let applied = Arc::new(AtomicBool::new(false));
        let (release, wait) = oneshot::channel::<()>();
        let flag = Arc::clone(&applied);
        let task = FlowTask::spawn("test", async move {
            let _ = wait.await;
            flag.store(true, Ordering::SeqCst);
        });

        drop(task);
        let _ = release.send(());
        tokio::task::yield_now().await;

        assert!(!applied.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn finished_task_keeps_its_result_after_drop() {
        let (done_tx, done_rx) = oneshot::channel();
        let task = FlowTask::spawn("quick", async move {
            let _ = done_tx.send(7);
        });
        let value = done_rx.await.expect("ran");
        drop(task);
        assert_eq!(value, 7);
    }
}
