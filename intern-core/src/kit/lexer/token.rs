//! Token 类型

use std::fmt;
use std::sync::Arc;

/// Token 类别：产生它的模块（注册序号 + 名称）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TokenKind {
    index: usize,
    name: Arc<str>,
}

impl TokenKind {
    pub(crate) fn new(index: usize, name: Arc<str>) -> Self {
        Self { index, name }
    }

    /// 模块名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 注册序号（越小优先级越高）
    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// 一次扫描产生的 token，借用被扫描的输入
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    /// 匹配到的原始文本
    pub lexeme: &'a str,
    /// 起始字节偏移
    pub start: usize,
    /// 结束字节偏移（不含）
    pub end: usize,
}

impl<'a> Token<'a> {
    /// 是否由指定模块产生
    pub fn is(&self, module: &str) -> bool {
        self.kind.name() == module
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})@{}..{}", self.kind, self.lexeme, self.start, self.end)
    }
}
