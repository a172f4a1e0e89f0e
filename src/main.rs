//! 多进程工作量证明搜索 - 主程序
//!
//! 使用方式:
//!   cargo run -- <PREFIX> <DIFFICULTY>
//!   cargo run -- <PREFIX> <DIFFICULTY> --worker ./sha1-pow --workers 8
//!
//! 标准输出只打印解 (便于管道处理)，其余信息写到标准错误。

use clap::Parser;
use log::info;
use std::path::PathBuf;
use std::time::Duration;

use pow_race::{DigestAlgorithm, SearchDescriptor, SearchRequest, WorkerCommand, search};

#[derive(clap::ValueEnum, Debug, Clone, Copy)]
enum DigestArg {
    Sha1,
    Sha256,
}

impl From<DigestArg> for DigestAlgorithm {
    fn from(value: DigestArg) -> Self {
        match value {
            DigestArg::Sha1 => DigestAlgorithm::Sha1,
            DigestArg::Sha256 => DigestAlgorithm::Sha256,
        }
    }
}

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "pow-race")]
#[command(about = "在所有 CPU 核心上并行运行工作量证明 worker，返回最先找到的解")]
#[command(version = "0.1.0")]
struct Args {
    /// 前缀 (原样传给 worker)
    prefix: String,

    /// 难度 (原样传给 worker)
    difficulty: String,

    /// worker 可执行文件路径
    #[arg(long, default_value = pow_race::config::DEFAULT_WORKER_PROGRAM)]
    worker: PathBuf,

    /// worker 进程数 (默认为可用 CPU 核心数)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    workers: Option<u32>,

    /// 传给 worker 的前置参数 (可重复，位于 prefix/difficulty 之前)
    #[arg(long = "worker-arg", allow_hyphen_values = true)]
    worker_args: Vec<String>,

    /// 等待 worker 退出的轮询间隔 (毫秒)
    #[arg(long, default_value = "50", value_parser = clap::value_parser!(u64).range(1..))]
    poll_interval: u64,

    /// 展示用摘要算法
    #[arg(long, value_enum, default_value = "sha1")]
    digest: DigestArg,
}

fn build_request(args: &Args) -> SearchRequest {
    let mut request = SearchRequest::new(SearchDescriptor::new(
        args.prefix.clone(),
        args.difficulty.clone(),
    ));
    request.worker = args
        .worker_args
        .iter()
        .fold(WorkerCommand::new(args.worker.clone()), |command, arg| {
            command.arg(arg.clone())
        });
    request.workers = args.workers.map(|n| n as usize);
    request.poll_interval = Duration::from_millis(args.poll_interval);
    request
}

/// 主函数
fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    info!("参数: {:?}", args);

    let request = build_request(&args);
    let descriptor = request.descriptor.clone();
    let response = search(request)?;

    info!(
        "{} 个 worker 竞速，耗时 {:.2} 秒",
        response.workers,
        response.elapsed.as_secs_f64()
    );

    let full = response.full_string(&descriptor);
    let digest: DigestAlgorithm = args.digest.into();

    println!("{}", response.solution);
    eprintln!("Full string: {}", full);
    eprintln!("{} digest: {}", digest.label(), digest.hex_digest(full.as_bytes()));

    Ok(())
}
