//! 对外提供的 Rust 调用接口

use std::fmt;
use std::time::{Duration, Instant};

use anyhow::Context;
use log::{debug, info};

use crate::config::{DEFAULT_POLL_INTERVAL, RaceConfig, SearchDescriptor, WorkerCommand};
use crate::error::RaceError;
use crate::worker::{ExecutableLauncher, ResultChannel, WorkerLauncher, WorkerPool};

/// 获胜 worker 输出的后缀
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution(String);

impl Solution {
    pub fn new(suffix: impl Into<String>) -> Self {
        Self(suffix.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 前缀 + 后缀 组成的完整字符串
    pub fn full_string(&self, descriptor: &SearchDescriptor) -> String {
        format!("{}{}", descriptor.prefix(), self.0)
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 并行启动 `config.worker_count` 个 worker，返回最先输出的一行
///
/// 1. 校验参数 (失败时不启动任何进程)
/// 2. 所有 worker 的标准输出共享同一条管道，标准错误被丢弃
/// 3. 等待任意一个 worker 退出，再阻塞读取一行 (没有超时)
/// 4. 无条件强制终止全部 worker
///
/// 一个 worker 都没启动成功时，本函数永远不会返回。
pub fn find_proof_of_work<L>(
    descriptor: &SearchDescriptor,
    config: &RaceConfig,
    launcher: &L,
) -> Result<Solution, RaceError>
where
    L: WorkerLauncher + ?Sized,
{
    descriptor.validate()?;
    config.validate()?;

    let mut channel = ResultChannel::new()?;
    let mut pool = WorkerPool::new();
    pool.spawn_all(launcher, descriptor, config.worker_count, || {
        channel.worker_stdout()
    });
    channel.close_writer();
    debug!("Worker pids: {:?}", pool.ids());

    pool.wait_any(config.poll_interval);
    let line = channel.read_solution_line();
    pool.terminate_all();

    let solution = Solution::new(line?);
    debug!("Solution received: {}", solution);
    Ok(solution)
}

#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub descriptor: SearchDescriptor,
    pub worker: WorkerCommand,
    /// None 表示使用可用处理单元数
    pub workers: Option<usize>,
    pub poll_interval: Duration,
}

impl SearchRequest {
    pub fn new(descriptor: SearchDescriptor) -> Self {
        Self {
            descriptor,
            worker: WorkerCommand::default(),
            workers: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    fn race_config(&self) -> Result<RaceConfig, RaceError> {
        let config = match self.workers {
            Some(count) => RaceConfig::new(count),
            None => RaceConfig::from_environment()?,
        };
        Ok(config.with_poll_interval(self.poll_interval))
    }
}

#[derive(Debug, Clone)]
pub struct SearchResponse {
    pub solution: Solution,
    /// 请求启动的 worker 数
    pub workers: usize,
    pub elapsed: Duration,
}

impl SearchResponse {
    pub fn full_string(&self, descriptor: &SearchDescriptor) -> String {
        self.solution.full_string(descriptor)
    }
}

/// 使用外部可执行文件运行一次完整搜索
pub fn search(request: SearchRequest) -> anyhow::Result<SearchResponse> {
    request.descriptor.validate()?;
    let config = request.race_config()?;

    info!(
        "Racing {} worker(s) of {}",
        config.worker_count,
        request.worker.program.display()
    );

    let launcher = ExecutableLauncher::new(request.worker.clone());
    let start_time = Instant::now();
    let solution = find_proof_of_work(&request.descriptor, &config, &launcher)
        .with_context(|| format!("search with {} failed", request.worker.program.display()))?;
    let elapsed = start_time.elapsed();

    info!("Solution found in {:.2}s", elapsed.as_secs_f64());
    Ok(SearchResponse {
        solution,
        workers: config.worker_count,
        elapsed,
    })
}
