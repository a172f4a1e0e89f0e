//! 协调器错误类型

use thiserror::Error;

/// 竞速过程中可对外暴露的错误
///
/// 单个 worker 启动失败、终止已退出的进程等情况都在内部吸收，不在此列。
#[derive(Error, Debug)]
pub enum RaceError {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("environment error: {0}")]
    Environment(String),

    #[error("all workers exited without producing a solution")]
    NoSolution,

    #[error("result channel I/O failed: {0}")]
    Io(#[from] std::io::Error),
}
