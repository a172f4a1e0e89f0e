//! 结果通道: 所有 worker 共享写端，协调器独占读端

use std::io::{self, BufRead, BufReader, PipeReader, PipeWriter};
use std::process::Stdio;

use log::debug;

use crate::error::RaceError;

/// 单条匿名管道
///
/// 写端会被复制到每个 worker 的标准输出，协调器只读取第一行。
pub struct ResultChannel {
    reader: BufReader<PipeReader>,
    writer: Option<PipeWriter>,
}

impl ResultChannel {
    /// 创建新的结果通道
    pub fn new() -> io::Result<Self> {
        let (reader, writer) = io::pipe()?;
        Ok(Self {
            reader: BufReader::new(reader),
            writer: Some(writer),
        })
    }

    /// 为一个 worker 复制写端，用作其标准输出
    pub fn worker_stdout(&self) -> io::Result<Stdio> {
        match &self.writer {
            Some(writer) => Ok(writer.try_clone()?.into()),
            None => Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "result channel write end already closed",
            )),
        }
    }

    /// 关闭协调器持有的写端
    ///
    /// 之后读端只会在所有 worker 都退出后看到 EOF。
    pub fn close_writer(&mut self) {
        if self.writer.take().is_some() {
            debug!("Coordinator write end closed");
        }
    }

    /// 阻塞读取一行 (没有超时)
    ///
    /// 去掉行尾的换行符，空行原样作为解返回；EOF 视为没有解。
    pub fn read_solution_line(&mut self) -> Result<String, RaceError> {
        let mut line = String::new();
        let read = self.reader.read_line(&mut line)?;
        if read == 0 {
            return Err(RaceError::NoSolution);
        }

        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}
