//! worker 进程管理模块

pub mod channel;
pub mod process;

pub use channel::ResultChannel;
pub use process::{ExecutableLauncher, WorkerHandle, WorkerLauncher, WorkerPool};
