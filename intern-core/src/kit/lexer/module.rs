//! TokenModule 契约
//!
//! 任何想参与词法分析的组件只需提供一个唯一名称和一个正则片段，
//! 不与 Tokenizer 内部产生其他耦合。

use std::sync::Arc;

/// 词法模块：贡献一个具名的正则片段
pub trait TokenModule {
    /// 模块名称（同一个 Tokenizer 内唯一，同时作为 token 的类别）
    fn name(&self) -> &str;

    /// 正则片段（regex crate 语法，不需要自己加锚点）
    fn pattern(&self) -> &str;
}

/// 最简单的模块实现：名称 + 片段
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PatternModule {
    name: String,
    pattern: String,
}

impl PatternModule {
    pub fn new(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
        }
    }
}

impl TokenModule for PatternModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn pattern(&self) -> &str {
        &self.pattern
    }
}

impl<M: TokenModule + ?Sized> TokenModule for &M {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn pattern(&self) -> &str {
        (**self).pattern()
    }
}

impl<M: TokenModule + ?Sized> TokenModule for Box<M> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn pattern(&self) -> &str {
        (**self).pattern()
    }
}

impl<M: TokenModule + ?Sized> TokenModule for Arc<M> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn pattern(&self) -> &str {
        (**self).pattern()
    }
}
