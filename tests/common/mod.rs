//! 测试辅助工具
//!
//! 提供端到端测试的辅助函数

#![allow(dead_code)]

use intern::{Intern, OutputMode, Terminal};
use std::io::{self, Cursor, Write};
use std::sync::{Arc, Mutex};

/// 可克隆的内存输出
#[derive(Clone, Default)]
pub struct Transcript(Arc<Mutex<Vec<u8>>>);

impl Transcript {
    pub fn lines(&self) -> Vec<String> {
        let bytes = self.0.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }
}

impl Write for Transcript {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// 协议模式的终端，输入固定
///
/// # Example
/// ```ignore
/// let (terminal, transcript) = protocol_terminal(&Intern::silent(), "line\n");
/// ```
pub fn protocol_terminal(intern: &Intern, input: &str) -> (Arc<Terminal>, Transcript) {
    let transcript = Transcript::default();
    let terminal = intern
        .terminal_builder()
        .input(Cursor::new(input.as_bytes().to_vec()))
        .output(transcript.clone())
        .errors(transcript.clone())
        .mode(OutputMode::Protocol)
        .build()
        .unwrap();
    (Arc::new(terminal), transcript)
}
