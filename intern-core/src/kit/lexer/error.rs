//! Tokenizer 错误类型
//!
//! 注册阶段的错误属于编程错误（重复名称、冻结后注册、非法模式），
//! 扫描阶段的错误属于输入错误，带有出错位置，调用方可以就地恢复。

/// 词法分析器错误
#[derive(Debug, thiserror::Error)]
pub enum TokenizerError {
    /// 模块名称为空
    #[error("token module name must not be empty")]
    EmptyName,

    /// 同名模块已注册
    #[error("token module '{name}' is already registered")]
    Duplicate { name: String },

    /// 第一次扫描之后不允许再注册
    #[error("cannot register token module '{name}': tokenizer is frozen")]
    Frozen { name: String },

    /// 模块的正则片段无法编译
    #[error("invalid pattern for token module '{name}': {source}")]
    InvalidPattern {
        name: String,
        #[source]
        source: regex::Error,
    },

    /// 片段无法构建最长匹配自动机
    #[error("cannot build longest-match automaton for token module '{name}': {source}")]
    Automaton {
        name: String,
        #[source]
        source: regex_automata::hybrid::BuildError,
    },

    /// 组合扫描器构建失败（通常是规模超限）
    #[error("failed to build composite scanner: {0}")]
    Build(#[source] regex::Error),

    /// 没有任何模块能匹配当前位置
    #[error("unrecognized input {found:?} at offset {offset} ({line}:{column})")]
    UnrecognizedInput {
        /// 字节偏移
        offset: usize,
        /// 出错位置的字符
        found: char,
        /// 行号（1-based）
        line: usize,
        /// 列号（1-based，按字符计）
        column: usize,
    },
}

impl TokenizerError {
    /// 在 `input` 的 `offset` 处构造输入错误
    pub(crate) fn unrecognized(input: &str, offset: usize) -> Self {
        let before = &input[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let column = before[line_start..].chars().count() + 1;
        let found = input[offset..].chars().next().unwrap_or('\0');
        TokenizerError::UnrecognizedInput {
            offset,
            found,
            line,
            column,
        }
    }

    /// 是否是输入错误（可恢复）
    pub fn is_input_error(&self) -> bool {
        matches!(self, TokenizerError::UnrecognizedInput { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrecognized_position() {
        let err = TokenizerError::unrecognized("ab\ncd#e", 5);
        match err {
            TokenizerError::UnrecognizedInput {
                offset,
                found,
                line,
                column,
            } => {
                assert_eq!(offset, 5);
                assert_eq!(found, '#');
                assert_eq!(line, 2);
                assert_eq!(column, 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unrecognized_counts_chars_not_bytes() {
        let err = TokenizerError::unrecognized("äö?", 4);
        assert!(matches!(
            err,
            TokenizerError::UnrecognizedInput { found: '?', column: 3, .. }
        ));
    }

    #[test]
    fn test_display() {
        let err = TokenizerError::Duplicate {
            name: "a".to_string(),
        };
        assert_eq!(err.to_string(), "token module 'a' is already registered");
        assert!(!err.is_input_error());

        let err = TokenizerError::unrecognized("x", 0);
        assert!(err.to_string().contains("offset 0"));
        assert!(err.is_input_error());
    }
}
