use std::cell::RefCell;
use std::future::Future;

use futures::executor::LocalSpawner;
use futures::task::{LocalSpawnExt, SpawnError};

thread_local! {
    static SPAWNER: RefCell<Option<LocalSpawner>> = const { RefCell::new(None) };
}

#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("no runtime task queue is installed on this thread")]
    NoRuntime,
    #[error("task queue rejected the task: {0}")]
    Spawn(#[from] SpawnError),
}

pub(crate) fn install_spawner(spawner: LocalSpawner) {
    SPAWNER.with(|s| {
        if s.borrow_mut().replace(spawner).is_some() {
            log::warn!("replacing the task queue of another runtime on this thread");
        }
    });
}

pub(crate) fn uninstall_spawner() {
    SPAWNER.with(|s| s.borrow_mut().take());
}

/// Queues a future on the runtime's local task queue. It makes progress when
/// the host calls `Runtime::run_until_stalled` (or `settle`).
pub fn spawn_local(fut: impl Future<Output = ()> + 'static) -> Result<(), TaskError> {
    let spawner = SPAWNER
        .with(|s| s.borrow().clone())
        .ok_or(TaskError::NoRuntime)?;
    spawner.spawn_local(fut)?;
    Ok(())
}
