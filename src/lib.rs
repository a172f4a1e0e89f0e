//! 多进程工作量证明搜索协调器
//!
//! 在所有可用 CPU 核心上并行启动外部 worker 进程 (例如 `sha1-pow`)，
//! 取最先输出的一行作为解，随后强制终止全部 worker。

pub mod api;
pub mod config;
pub mod digest;
pub mod error;
pub mod worker;

pub use api::{SearchRequest, SearchResponse, Solution, find_proof_of_work, search};
pub use config::{RaceConfig, SearchDescriptor, WorkerCommand, detect_worker_count};
pub use digest::DigestAlgorithm;
pub use error::RaceError;
pub use worker::{ExecutableLauncher, ResultChannel, WorkerHandle, WorkerLauncher, WorkerPool};
