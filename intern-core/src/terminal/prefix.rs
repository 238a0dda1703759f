//! 输出行前缀

use std::fmt;

/// 行类别
///
/// 协议模式下每一行都以对应的标签开头，后跟一个空格和内容。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Prefix {
    Info,
    Input,
    Output,
    Error,
    Crash,
}

impl Prefix {
    pub const ALL: [Prefix; 5] = [
        Prefix::Info,
        Prefix::Input,
        Prefix::Output,
        Prefix::Error,
        Prefix::Crash,
    ];

    /// 协议标签
    pub const fn tag(self) -> &'static str {
        match self {
            Prefix::Info => "info:",
            Prefix::Input => "input:",
            Prefix::Output => "output:",
            Prefix::Error => "error:",
            Prefix::Crash => "crash:",
        }
    }

    /// 普通模式下写往错误输出时使用的标记
    pub const fn plain_label(self) -> Option<&'static str> {
        match self {
            Prefix::Error => Some("Error"),
            Prefix::Crash => Some("Crash"),
            Prefix::Info | Prefix::Input | Prefix::Output => None,
        }
    }

    /// 从标签解析（用于回放协议记录）
    pub fn from_tag(tag: &str) -> Option<Self> {
        Prefix::ALL.into_iter().find(|prefix| prefix.tag() == tag)
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_are_distinct() {
        let mut tags: Vec<_> = Prefix::ALL.iter().map(|p| p.tag()).collect();
        tags.sort_unstable();
        tags.dedup();
        assert_eq!(tags.len(), Prefix::ALL.len());
    }

    #[test]
    fn test_from_tag_round_trip() {
        assert_eq!(Prefix::from_tag("crash:"), Some(Prefix::Crash));
        assert_eq!(Prefix::from_tag("CRASH:"), None);
        assert_eq!(Prefix::Output.to_string(), "output:");
    }

    #[test]
    fn test_plain_labels() {
        assert_eq!(Prefix::Error.plain_label(), Some("Error"));
        assert_eq!(Prefix::Output.plain_label(), None);
    }
}
