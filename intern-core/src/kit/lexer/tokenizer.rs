//! 组合式 Tokenizer
//!
//! 所有模块的片段在第一次扫描时编译成一个 `RegexSet`，之后冻结并只读共享。
//! 每个位置上：
//! 1. `RegexSet` 一次性给出所有能匹配的模块
//! 2. 每个候选模块用最长匹配语义的惰性 DFA 量出长度（`a|ab` 在 `ab` 上是 2，不是 1）
//! 3. 选择最长匹配，长度相同则选择先注册的模块
//!
//! # 示例
//!
//! ```
//! use intern_core::kit::lexer::{PatternModule, Tokenizer};
//!
//! let tokenizer = Tokenizer::new();
//! tokenizer.register(&PatternModule::new("a", "x+")).unwrap();
//! tokenizer.register(&PatternModule::new("b", "y+")).unwrap();
//!
//! let tokens = tokenizer.tokenize("xxxyy").unwrap();
//! assert_eq!(tokens[0].lexeme, "xxx");
//! assert!(tokens[1].is("b"));
//! ```

use super::error::TokenizerError;
use super::module::TokenModule;
use super::token::{Token, TokenKind};
use intern_log::{debug, trace, warn, Logger};
use intern_sync::ScopedLock;
use once_cell::sync::OnceCell;
use regex::{Regex, RegexSet, RegexSetBuilder};
use regex_automata::hybrid::dfa::{Cache, DFA};
use regex_automata::{Anchored, Input, MatchKind};
use std::iter::FusedIterator;
use std::sync::Arc;

/// 组合式词法分析器
pub struct Tokenizer {
    registry: ScopedLock<Registry>,
    /// 冻结后的组合扫描器（只构建一次）
    compiled: OnceCell<CompiledScanner>,
    /// 组合 `RegexSet` 的编译体积上限（`None` 使用 regex 默认值）
    size_limit: Option<usize>,
    logger: Arc<Logger>,
}

#[derive(Default)]
struct Registry {
    modules: Vec<RegisteredModule>,
    /// 组合扫描器构建成功后置位，之后拒绝注册
    frozen: bool,
}

struct RegisteredModule {
    name: Arc<str>,
    pattern: String,
    /// 单独编译的锚定版本，惰性 DFA 放弃时用它量长度
    anchored: Regex,
    /// 最长匹配语义的惰性 DFA
    automaton: DFA,
}

struct CompiledScanner {
    set: RegexSet,
    matchers: Vec<Regex>,
    automata: Vec<DFA>,
    kinds: Vec<TokenKind>,
}

fn anchor(pattern: &str) -> String {
    format!("^(?:{pattern})")
}

/// `MatchKind::All` 让 DFA 一直走到死状态，锚定搜索报告的就是最长前缀
fn longest_match_automaton(pattern: &str) -> Result<DFA, regex_automata::hybrid::BuildError> {
    DFA::builder()
        .configure(
            DFA::config()
                .match_kind(MatchKind::All)
                .unicode_word_boundary(true),
        )
        .build(pattern)
}

impl CompiledScanner {
    fn build(modules: &[RegisteredModule], size_limit: Option<usize>) -> Result<Self, TokenizerError> {
        let mut builder = RegexSetBuilder::new(modules.iter().map(|m| anchor(&m.pattern)));
        if let Some(bytes) = size_limit {
            builder.size_limit(bytes);
        }
        let set: RegexSet = builder.build().map_err(TokenizerError::Build)?;
        Ok(Self {
            set,
            matchers: modules.iter().map(|m| m.anchored.clone()).collect(),
            automata: modules.iter().map(|m| m.automaton.clone()).collect(),
            kinds: modules
                .iter()
                .enumerate()
                .map(|(index, m)| TokenKind::new(index, Arc::clone(&m.name)))
                .collect(),
        })
    }

    fn caches(&self) -> Vec<Cache> {
        self.automata.iter().map(DFA::create_cache).collect()
    }

    /// 模块 `index` 在 `rest` 开头能匹配的最长长度
    fn measure(&self, index: usize, cache: &mut Cache, rest: &str) -> Option<usize> {
        let input = Input::new(rest).anchored(Anchored::Yes);
        match self.automata[index].try_search_fwd(cache, &input) {
            Ok(found) => found
                .map(|m| m.offset())
                .filter(|&len| rest.is_char_boundary(len)),
            // 惰性 DFA 放弃（例如 Unicode 单词边界遇到非 ASCII 字节）
            Err(_) => self.matchers[index].find(rest).map(|m| m.end()),
        }
    }

    /// 在 `rest` 开头选出最佳匹配，返回 (模块序号, 匹配长度)
    fn longest_match(&self, caches: &mut [Cache], rest: &str) -> Option<(usize, usize)> {
        let mut best: Option<(usize, usize)> = None;
        // SetMatches 按序号升序迭代，只有严格更长才替换，所以并列时先注册者胜
        for index in self.set.matches(rest).iter() {
            let len = match self.measure(index, &mut caches[index], rest) {
                Some(len) => len,
                None => continue,
            };
            // 空匹配不能推进扫描位置
            if len == 0 {
                continue;
            }
            match best {
                Some((_, best_len)) if best_len >= len => {}
                _ => best = Some((index, len)),
            }
        }
        best
    }
}

impl Tokenizer {
    /// 创建空的 Tokenizer（noop logger）
    pub fn new() -> Self {
        Self::with_logger(Logger::noop())
    }

    pub fn with_logger(logger: Arc<Logger>) -> Self {
        Self {
            registry: ScopedLock::new(Registry::default()),
            compiled: OnceCell::new(),
            size_limit: None,
            logger,
        }
    }

    /// 限制组合 `RegexSet` 的编译体积，超出时冻结失败并返回 [`TokenizerError::Build`]
    pub fn with_size_limit(mut self, bytes: usize) -> Self {
        self.size_limit = Some(bytes);
        self
    }

    /// 按顺序注册一组模块，遇到第一个错误即停止
    pub fn with_modules<I, M>(modules: I) -> Result<Self, TokenizerError>
    where
        I: IntoIterator<Item = M>,
        M: TokenModule,
    {
        let tokenizer = Self::new();
        for module in modules {
            tokenizer.register(&module)?;
        }
        Ok(tokenizer)
    }

    /// 注册模块
    ///
    /// 失败时模块列表保持不变。
    pub fn register<M: TokenModule + ?Sized>(&self, module: &M) -> Result<(), TokenizerError> {
        let name = module.name();
        if name.is_empty() {
            return Err(TokenizerError::EmptyName);
        }

        // 先在锁外校验片段，编译失败立即报告
        let anchored =
            Regex::new(&anchor(module.pattern())).map_err(|source| TokenizerError::InvalidPattern {
                name: name.to_string(),
                source,
            })?;
        let automaton =
            longest_match_automaton(module.pattern()).map_err(|source| TokenizerError::Automaton {
                name: name.to_string(),
                source,
            })?;

        let mut registry = self.registry.acquire();
        if registry.frozen {
            warn!(self.logger, "Rejected module '{}': tokenizer is frozen", name);
            return Err(TokenizerError::Frozen {
                name: name.to_string(),
            });
        }
        if registry.modules.iter().any(|m| &*m.name == name) {
            return Err(TokenizerError::Duplicate {
                name: name.to_string(),
            });
        }

        registry.modules.push(RegisteredModule {
            name: Arc::from(name),
            pattern: module.pattern().to_string(),
            anchored,
            automaton,
        });
        debug!(
            self.logger,
            "Registered module '{}' with pattern {:?} (priority {})",
            name,
            module.pattern(),
            registry.modules.len() - 1
        );
        Ok(())
    }

    /// 显式冻结（通常由第一次 `scan` 隐式完成）
    pub fn freeze(&self) -> Result<(), TokenizerError> {
        self.compiled().map(|_| ())
    }

    pub fn is_frozen(&self) -> bool {
        self.compiled.get().is_some() || self.registry.acquire().frozen
    }

    /// 已注册模块名称（按优先级）
    pub fn module_names(&self) -> Vec<String> {
        self.registry
            .acquire()
            .modules
            .iter()
            .map(|m| m.name.to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.registry.acquire().modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn compiled(&self) -> Result<&CompiledScanner, TokenizerError> {
        self.compiled.get_or_try_init(|| {
            let mut registry = self.registry.acquire();
            debug!(
                self.logger,
                "Freezing tokenizer with {} module(s)",
                registry.modules.len()
            );
            // 构建失败时不冻结，注册表保持可用
            let scanner = CompiledScanner::build(&registry.modules, self.size_limit)
                .inspect_err(|err| warn!(self.logger, "Freeze failed: {}", err))?;
            registry.frozen = true;
            Ok(scanner)
        })
    }

    /// 惰性扫描 `input`
    ///
    /// 每次调用都从头开始。迭代器在第一个无法识别的位置产出一次错误后结束。
    pub fn scan<'a>(&self, input: &'a str) -> Result<Scan<'_, 'a>, TokenizerError> {
        let scanner = self.compiled()?;
        trace!(self.logger, "Scanning {} byte(s)", input.len());
        Ok(Scan {
            caches: scanner.caches(),
            scanner,
            logger: &self.logger,
            input,
            offset: 0,
            done: false,
        })
    }

    /// 扫描并收集全部 token
    pub fn tokenize<'a>(&self, input: &'a str) -> Result<Vec<Token<'a>>, TokenizerError> {
        self.scan(input)?.collect()
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Tokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tokenizer")
            .field("modules", &self.module_names())
            .field("frozen", &self.is_frozen())
            .finish()
    }
}

/// 一次扫描的惰性 token 序列
pub struct Scan<'t, 'a> {
    scanner: &'t CompiledScanner,
    /// 每个模块一份 DFA 缓存，扫描之间互不共享
    caches: Vec<Cache>,
    logger: &'t Logger,
    input: &'a str,
    offset: usize,
    done: bool,
}

impl<'a> Scan<'_, 'a> {
    /// 当前扫描位置（字节偏移）
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// 尚未扫描的输入
    pub fn remaining(&self) -> &'a str {
        &self.input[self.offset..]
    }
}

impl<'a> Iterator for Scan<'_, 'a> {
    type Item = Result<Token<'a>, TokenizerError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.offset >= self.input.len() {
            self.done = true;
            return None;
        }

        let rest = &self.input[self.offset..];
        match self.scanner.longest_match(&mut self.caches, rest) {
            Some((index, len)) => {
                let start = self.offset;
                self.offset += len;
                let token = Token {
                    kind: self.scanner.kinds[index].clone(),
                    lexeme: &rest[..len],
                    start,
                    end: self.offset,
                };
                trace!(self.logger, "Produced token {}", token);
                Some(Ok(token))
            }
            None => {
                self.done = true;
                let err = TokenizerError::unrecognized(self.input, self.offset);
                debug!(self.logger, "Scan stopped: {}", err);
                Some(Err(err))
            }
        }
    }
}

impl FusedIterator for Scan<'_, '_> {}
