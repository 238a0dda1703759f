//! 常用词法模块构造函数
//!
//! 字面量会经过 `regex::escape`，调用方不需要关心转义。
//! 关键字与标识符重叠时长度相同，先注册的获胜，所以关键字应当先于标识符注册。

use super::module::PatternModule;

/// 单个关键字
pub fn keyword_module(name: &str, keyword: &str) -> PatternModule {
    PatternModule::new(name, regex::escape(keyword))
}

/// 一组关键字共用一个类别
///
/// 长的关键字排在前面，`in` 不会截断 `int`。
pub fn keywords_module(name: &str, keywords: &[&str]) -> PatternModule {
    let mut keywords = keywords.to_vec();
    keywords.sort_by(|a, b| b.len().cmp(&a.len()));
    let alternatives: Vec<String> = keywords.iter().map(|k| regex::escape(k)).collect();
    PatternModule::new(name, alternatives.join("|"))
}

/// 任意字面文本（运算符、分隔符）
pub fn literal_module(name: &str, text: &str) -> PatternModule {
    PatternModule::new(name, regex::escape(text))
}

/// 十进制整数，可带负号
pub fn integer_module(name: &str) -> PatternModule {
    PatternModule::new(name, "-?[0-9]+")
}

/// 标识符：字母或下划线开头
pub fn identifier_module(name: &str) -> PatternModule {
    PatternModule::new(name, "[A-Za-z_][A-Za-z0-9_]*")
}

/// 空白（含换行）
pub fn whitespace_module(name: &str) -> PatternModule {
    PatternModule::new(name, r"[ \t\r\n]+")
}

/// 双引号字符串，支持反斜杠转义
pub fn quoted_string_module(name: &str) -> PatternModule {
    PatternModule::new(name, r#""(?:[^"\\]|\\.)*""#)
}
