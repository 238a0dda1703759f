//! 组合式词法分析器
//!
//! 设计目标：
//! - 可组合：任何组件实现 `TokenModule` 即可贡献一类 token
//! - 确定性：最长匹配优先，长度相同按注册顺序
//! - 只读共享：第一次扫描后冻结，可在多个线程中并发扫描

pub mod builder;
pub mod error;
pub mod module;
pub mod token;
pub mod tokenizer;

pub use builder::{
    identifier_module, integer_module, keyword_module, keywords_module, literal_module,
    quoted_string_module, whitespace_module,
};
pub use error::TokenizerError;
pub use module::{PatternModule, TokenModule};
pub use token::{Token, TokenKind};
pub use tokenizer::{Scan, Tokenizer};
