//! worker 进程的启动、等待与强制终止

use std::io;
use std::process::{Child, Command, Stdio};
use std::thread::sleep;
use std::time::Duration;

use log::{debug, info, warn};

use crate::config::{SearchDescriptor, WorkerCommand};

/// 启动单个 worker 进程
///
/// `stdout` 是结果通道写端的副本，实现必须把它接到子进程的标准输出上，
/// 并丢弃子进程的标准错误。
pub trait WorkerLauncher {
    fn launch(
        &self,
        index: usize,
        descriptor: &SearchDescriptor,
        stdout: Stdio,
    ) -> io::Result<Child>;
}

/// 启动外部 worker 可执行文件: `program [args...] <prefix> <difficulty>`
#[derive(Debug, Clone)]
pub struct ExecutableLauncher {
    command: WorkerCommand,
}

impl ExecutableLauncher {
    pub fn new(command: WorkerCommand) -> Self {
        Self { command }
    }
}

impl WorkerLauncher for ExecutableLauncher {
    fn launch(
        &self,
        _index: usize,
        descriptor: &SearchDescriptor,
        stdout: Stdio,
    ) -> io::Result<Child> {
        // Command 在此处被丢弃，避免写端副本残留在协调器进程中
        Command::new(&self.command.program)
            .args(&self.command.args)
            .arg(descriptor.prefix())
            .arg(descriptor.difficulty())
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(Stdio::null())
            .spawn()
    }
}

/// 已启动的 worker 进程
pub struct WorkerHandle {
    /// 启动顺序
    index: usize,
    child: Child,
    exited: bool,
}

impl WorkerHandle {
    pub fn new(index: usize, child: Child) -> Self {
        Self {
            index,
            child,
            exited: false,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// 非阻塞检查进程是否已退出
    ///
    /// 无法再等待的子进程 (例如 SIGCHLD 被忽略时已由内核回收) 视为已退出。
    pub fn has_exited(&mut self) -> bool {
        if self.exited {
            return true;
        }
        match self.child.try_wait() {
            Ok(Some(status)) => {
                debug!("Worker #{} (pid {}) exited: {}", self.index, self.id(), status);
                self.exited = true;
                true
            }
            Ok(None) => false,
            Err(e) => {
                debug!("Worker #{} (pid {}) try_wait failed: {}", self.index, self.id(), e);
                self.exited = true;
                true
            }
        }
    }

    /// 强制终止 (Unix 下为 SIGKILL) 并回收进程
    ///
    /// 进程已经退出导致的失败属于正常竞态，直接吸收。
    pub fn terminate(&mut self) {
        if let Err(e) = self.child.kill() {
            debug!("Worker #{} (pid {}) kill ignored: {}", self.index, self.id(), e);
        }
        match self.child.wait() {
            Ok(_) => self.exited = true,
            Err(e) => debug!("Worker #{} (pid {}) reap ignored: {}", self.index, self.id(), e),
        }
    }
}

/// 单次搜索拥有的全部 worker
///
/// 启动顺序 -> 进程句柄；析构时会终止所有仍在运行的 worker，
/// 任何句柄都不会活过一次搜索调用。
#[derive(Default)]
pub struct WorkerPool {
    workers: Vec<WorkerHandle>,
}

impl WorkerPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// 依次启动 `count` 个 worker
    ///
    /// 单个 worker 启动失败只记录警告，搜索以剩余 worker 继续。
    pub fn spawn_all<L, F>(
        &mut self,
        launcher: &L,
        descriptor: &SearchDescriptor,
        count: usize,
        mut stdout: F,
    ) where
        L: WorkerLauncher + ?Sized,
        F: FnMut() -> io::Result<Stdio>,
    {
        for index in 0..count {
            let spawned = stdout().and_then(|out| launcher.launch(index, descriptor, out));
            match spawned {
                Ok(child) => {
                    debug!("Worker #{} started (pid {})", index, child.id());
                    self.workers.push(WorkerHandle::new(index, child));
                }
                Err(e) => warn!("Worker #{} failed to start: {}", index, e),
            }
        }
        info!("Launched {}/{} worker(s)", self.workers.len(), count);
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// 进程号列表 (按启动顺序)
    pub fn ids(&self) -> Vec<u32> {
        self.workers.iter().map(WorkerHandle::id).collect()
    }

    /// 阻塞直到至少一个 worker 退出
    ///
    /// 不关心是哪一个退出。池为空时永远不会返回。
    pub fn wait_any(&mut self, poll_interval: Duration) {
        loop {
            if let Some(pos) = self.workers.iter_mut().position(|w| w.has_exited()) {
                debug!("Worker #{} exited first", self.workers[pos].index());
                return;
            }
            sleep(poll_interval);
        }
    }

    /// 终止并回收所有 worker
    pub fn terminate_all(&mut self) {
        if self.workers.is_empty() {
            return;
        }
        debug!("Terminating {} worker(s)", self.workers.len());
        for worker in &mut self.workers {
            worker.terminate();
        }
        self.workers.clear();
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.terminate_all();
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Child {
        Command::new("/bin/sh")
            .arg("-c")
            .arg(script)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .unwrap()
    }

    /// 测试: 终止已经退出并被回收的进程不会出错
    #[test]
    fn test_terminate_already_exited() {
        let mut child = sh("exit 0");
        child.wait().unwrap();

        let mut handle = WorkerHandle::new(0, child);
        handle.terminate();
        handle.terminate();
        assert!(handle.has_exited());
    }

    #[test]
    fn test_terminate_exited_but_not_reaped() {
        let mut handle = WorkerHandle::new(0, sh("exit 3"));
        sleep(Duration::from_millis(100));
        handle.terminate();
        assert!(handle.has_exited());
    }

    #[test]
    fn test_terminate_running() {
        let mut handle = WorkerHandle::new(0, sh("exec sleep 1000"));
        assert!(!handle.has_exited());
        handle.terminate();
        assert!(handle.has_exited());
    }

    #[test]
    fn test_wait_any_returns_on_first_exit() {
        let mut pool = WorkerPool::new();
        pool.workers.push(WorkerHandle::new(0, sh("exec sleep 1000")));
        pool.workers.push(WorkerHandle::new(1, sh("sleep 0.1")));
        pool.workers.push(WorkerHandle::new(2, sh("exec sleep 1000")));

        pool.wait_any(Duration::from_millis(10));
        assert!(pool.workers[1].has_exited());
        assert!(!pool.workers[0].has_exited());

        pool.terminate_all();
        assert!(pool.is_empty());
    }

    struct FailingLauncher;

    impl WorkerLauncher for FailingLauncher {
        fn launch(&self, _: usize, _: &SearchDescriptor, _: Stdio) -> io::Result<Child> {
            Err(io::Error::new(io::ErrorKind::NotFound, "no such worker"))
        }
    }

    #[test]
    fn test_spawn_failures_are_skipped() {
        let mut pool = WorkerPool::new();
        let descriptor = SearchDescriptor::new("abc", "4");
        pool.spawn_all(&FailingLauncher, &descriptor, 3, || Ok(Stdio::null()));
        assert!(pool.is_empty());
    }
}
