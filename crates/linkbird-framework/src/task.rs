//! Detached handler tasks.
//!
//! Handler work never runs on the stream loop. Each unit of work is spawned
//! as its own tokio task and left to finish or time out on its own; nothing
//! cancels it when newer events arrive or the stream closes.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tokio::task::JoinHandle;
use tracing::error;

/// Spawns `fut` as a detached task.
///
/// A panic inside the task is caught and logged here, so one broken handler
/// cannot take anything else down. The returned handle may be awaited by
/// callers that care about completion; dropping it detaches the task.
pub fn spawn_detached<F>(task: &'static str, fut: F) -> JoinHandle<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(panic) = AssertUnwindSafe(fut).catch_unwind().await {
            error!(task, panic = panic_message(panic.as_ref()), "Handler task panicked");
        }
    })
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(msg) = panic.downcast_ref::<&'static str>() {
        msg
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg
    } else {
        "<non-string panic payload>"
    }
}
