//! 测试辅助工具
//!
//! 可共享的输出缓冲区、可控制节奏的输入源、预置的终端构造函数。

#![allow(dead_code)]

use intern_core::terminal::{OutputMode, Terminal};
use std::io::{self, BufReader, Read, Write};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};

/// 可克隆的内存输出
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }

    pub fn lines(&self) -> Vec<String> {
        self.text().lines().map(str::to_string).collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// 由测试逐块喂数据的输入源，`Feeder` 被丢弃时输入结束
pub struct ChannelInput {
    chunks: Receiver<Vec<u8>>,
    pending: Vec<u8>,
}

pub struct Feeder(Sender<Vec<u8>>);

impl Feeder {
    pub fn send(&self, text: &str) {
        self.0.send(text.as_bytes().to_vec()).unwrap();
    }
}

pub fn channel_input() -> (Feeder, BufReader<ChannelInput>) {
    let (tx, rx) = mpsc::channel();
    let input = ChannelInput {
        chunks: rx,
        pending: Vec::new(),
    };
    (Feeder(tx), BufReader::new(input))
}

impl Read for ChannelInput {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pending.is_empty() {
            match self.chunks.recv() {
                Ok(chunk) => self.pending = chunk,
                Err(_) => return Ok(0),
            }
        }
        let n = buf.len().min(self.pending.len());
        buf[..n].copy_from_slice(&self.pending[..n]);
        self.pending.drain(..n);
        Ok(n)
    }
}

/// 输入固定的终端，返回 (终端, 标准输出, 错误输出)
pub fn scripted_terminal(input: &str, mode: OutputMode) -> (Terminal, SharedBuffer, SharedBuffer) {
    let out = SharedBuffer::default();
    let err = SharedBuffer::default();
    let terminal = Terminal::builder()
        .input(io::Cursor::new(input.as_bytes().to_vec()))
        .output(out.clone())
        .errors(err.clone())
        .mode(mode)
        .build()
        .unwrap();
    (terminal, out, err)
}

/// 输入由 `Feeder` 控制的终端
pub fn fed_terminal(mode: OutputMode) -> (Terminal, Feeder, SharedBuffer) {
    let (feeder, input) = channel_input();
    let out = SharedBuffer::default();
    let terminal = Terminal::builder()
        .input(input)
        .output(out.clone())
        .errors(out.clone())
        .mode(mode)
        .build()
        .unwrap();
    (terminal, feeder, out)
}
