//! 测试公共模块
//!
//! 提供 `/bin/sh` 脚本实现的模拟 worker 以及进程存活检查

#![allow(dead_code)]

use std::io;
use std::process::{Child, Command, Stdio};
use std::sync::Mutex;

use pow_race::{SearchDescriptor, WorkerLauncher};

/// 一直挂起直到被杀死的 worker
pub const HANG: &str = "exec sleep 1000";

/// 延迟 `delay` 秒后输出 `solution` 并退出
pub fn winner(solution: &str, delay: &str) -> String {
    format!("sleep {delay}; echo {solution}")
}

/// 按启动顺序为每个 worker 指定脚本; `None` 表示模拟启动失败
pub struct ScriptedLauncher {
    scripts: Vec<Option<String>>,
    pids: Mutex<Vec<u32>>,
    attempts: Mutex<usize>,
}

impl ScriptedLauncher {
    pub fn new(scripts: Vec<Option<String>>) -> Self {
        Self {
            scripts,
            pids: Mutex::new(Vec::new()),
            attempts: Mutex::new(0),
        }
    }

    /// 只有 `position` 处的 worker 会输出解，其余一直挂起
    pub fn single_winner(count: usize, position: usize, solution: &str) -> Self {
        let scripts = (0..count)
            .map(|i| {
                if i == position {
                    Some(winner(solution, "0.2"))
                } else {
                    Some(HANG.to_string())
                }
            })
            .collect();
        Self::new(scripts)
    }

    pub fn pids(&self) -> Vec<u32> {
        self.pids.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

impl WorkerLauncher for ScriptedLauncher {
    fn launch(
        &self,
        index: usize,
        descriptor: &SearchDescriptor,
        stdout: Stdio,
    ) -> io::Result<Child> {
        *self.attempts.lock().unwrap() += 1;

        let script = self
            .scripts
            .get(index)
            .cloned()
            .flatten()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "mock worker missing"))?;

        // $0 = mock-worker, $1 = prefix, $2 = difficulty
        let child = Command::new("/bin/sh")
            .arg("-c")
            .arg(script)
            .arg("mock-worker")
            .arg(descriptor.prefix())
            .arg(descriptor.difficulty())
            .stdout(stdout)
            .stderr(Stdio::null())
            .spawn()?;
        self.pids.lock().unwrap().push(child.id());
        Ok(child)
    }
}

/// 进程是否仍然存在 (包括未回收的僵尸进程)
pub fn is_alive(pid: u32) -> bool {
    unsafe { libc::kill(pid as libc::pid_t, 0) == 0 }
}

pub fn assert_all_terminated(pids: &[u32]) {
    for pid in pids {
        assert!(!is_alive(*pid), "worker pid {} is still alive", pid);
    }
}
