//! 搜索描述与竞速配置

use std::path::PathBuf;
use std::time::Duration;

use crate::error::RaceError;

/// 默认的 worker 可执行文件 (与本程序放在同一目录下)
pub const DEFAULT_WORKER_PROGRAM: &str = "./sha1-pow";

/// 等待任意 worker 退出时的默认轮询间隔
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// 搜索描述 (每个 worker 接收完全相同的参数)
///
/// 除了"两个字段都非空"之外不做任何校验，
/// 格式是否合法由 worker 自己判断。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchDescriptor {
    prefix: String,
    difficulty: String,
}

impl SearchDescriptor {
    pub fn new(prefix: impl Into<String>, difficulty: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            difficulty: difficulty.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn difficulty(&self) -> &str {
        &self.difficulty
    }

    /// 校验前缀与难度均已提供
    pub fn validate(&self) -> Result<(), RaceError> {
        if self.prefix.is_empty() {
            return Err(RaceError::InvalidArgument("prefix is missing"));
        }
        if self.difficulty.is_empty() {
            return Err(RaceError::InvalidArgument("difficulty is missing"));
        }
        Ok(())
    }
}

/// worker 可执行文件及其前置参数
///
/// 实际调用形式: `program [args...] <prefix> <difficulty>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl WorkerCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl Default for WorkerCommand {
    fn default() -> Self {
        Self::new(DEFAULT_WORKER_PROGRAM)
    }
}

/// 竞速配置
///
/// worker 数量由调用方注入，协调器内部不再探测 CPU 拓扑。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RaceConfig {
    /// 启动的 worker 进程数 (必须大于 0)
    pub worker_count: usize,
    /// 等待任意 worker 退出的轮询间隔
    pub poll_interval: Duration,
}

impl RaceConfig {
    pub fn new(worker_count: usize) -> Self {
        Self {
            worker_count,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// 以当前机器可用的处理单元数构建配置
    pub fn from_environment() -> Result<Self, RaceError> {
        detect_worker_count().map(Self::new)
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), RaceError> {
        if self.worker_count == 0 {
            return Err(RaceError::Environment(
                "worker count must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// 探测可用处理单元数
///
/// 探测失败直接报错，不会悄悄回退到 1。
pub fn detect_worker_count() -> Result<usize, RaceError> {
    let count = std::thread::available_parallelism()
        .map_err(|e| RaceError::Environment(format!("can't get number of CPU cores: {e}")))?;
    Ok(count.get())
}
