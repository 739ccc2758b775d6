//! Content-based routing for text messages.
//!
//! The [`FilterChain`] sits under the `TEXT` routing key. When a text message
//! arrives, each filter's pattern is tried against the content in
//! registration order; the first match handles the message, and the chain's
//! own default handles everything else.
//!
//! # Patterns
//!
//! - a keyword list `["签到", "hi"]` compiles to `^\s*(签到|hi)\s*$`, with
//!   each keyword escaped so it matches literally;
//! - a string `"help"` is used as written;
//! - a compiled [`Regex`] is used unchanged.
//!
//! Every pattern must match at the start of the content: `"help"` routes
//! `"help me"` but not `"i need help"`. Nothing pins the end, so add `$` to
//! require a whole-content match.

use std::sync::Arc;

use regex::Regex;
use serde_json::Value;
use tracing::trace;

use crate::error::FilterError;
use crate::handler::{BoxedHandler, HandlerResult, noop};
use crate::request::Request;

/// Pattern input accepted by text filters.
#[derive(Debug, Clone)]
pub enum FilterPattern {
    /// Whole-content match against any of these literal keywords, ignoring
    /// surrounding whitespace.
    Keywords(Vec<String>),
    /// A free-form regular expression, matched at the start of the content.
    Raw(String),
    /// An already compiled expression.
    Compiled(Regex),
}

impl FilterPattern {
    pub fn keywords<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Keywords(keywords.into_iter().map(Into::into).collect())
    }

    pub fn raw(pattern: impl Into<String>) -> Self {
        Self::Raw(pattern.into())
    }

    /// Compiles the pattern into a matcher.
    pub fn compile(self) -> Result<Regex, FilterError> {
        match self {
            Self::Keywords(keywords) => {
                if keywords.is_empty() {
                    return Err(FilterError::EmptyKeywords);
                }
                let alternation = keywords
                    .iter()
                    .map(|k| regex::escape(k))
                    .collect::<Vec<_>>()
                    .join("|");
                compile(&format!(r"^\s*({alternation})\s*$"))
            }
            Self::Raw(pattern) => compile(&pattern),
            Self::Compiled(regex) => Ok(regex),
        }
    }
}

fn compile(pattern: &str) -> Result<Regex, FilterError> {
    Regex::new(pattern).map_err(|source| FilterError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

impl From<Regex> for FilterPattern {
    fn from(regex: Regex) -> Self {
        Self::Compiled(regex)
    }
}

impl From<&str> for FilterPattern {
    fn from(pattern: &str) -> Self {
        Self::raw(pattern)
    }
}

impl From<String> for FilterPattern {
    fn from(pattern: String) -> Self {
        Self::Raw(pattern)
    }
}

impl From<Vec<String>> for FilterPattern {
    fn from(keywords: Vec<String>) -> Self {
        Self::Keywords(keywords)
    }
}

impl From<Vec<&str>> for FilterPattern {
    fn from(keywords: Vec<&str>) -> Self {
        Self::keywords(keywords)
    }
}

impl<const N: usize> From<[&str; N]> for FilterPattern {
    fn from(keywords: [&str; N]) -> Self {
        Self::keywords(keywords)
    }
}

/// Patterns read from configuration: a string is a raw pattern, an array of
/// strings is a keyword list. Anything else is rejected.
impl TryFrom<Value> for FilterPattern {
    type Error = FilterError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(pattern) => Ok(Self::Raw(pattern)),
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s),
                    other => Err(FilterError::UnsupportedPattern(json_kind(&other))),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Keywords),
            other => Err(FilterError::UnsupportedPattern(json_kind(&other))),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// A compiled pattern bound to its handler.
#[derive(Clone)]
pub struct FilterEntry {
    matcher: Regex,
    handler: BoxedHandler,
}

impl FilterEntry {
    pub fn matcher(&self) -> &Regex {
        &self.matcher
    }

    /// Returns `true` if the pattern matches at the start of `content`.
    ///
    /// The leftmost match starts at 0 whenever any match does.
    pub fn matches(&self, content: &str) -> bool {
        self.matcher.find(content).is_some_and(|m| m.start() == 0)
    }
}

/// Ordered text filters with a chain-wide default handler.
#[derive(Clone)]
pub struct FilterChain {
    entries: Vec<FilterEntry>,
    default: BoxedHandler,
}

impl Default for FilterChain {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterChain {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            default: noop(),
        }
    }

    /// Compiles `pattern` and appends it to the chain.
    pub fn push(
        &mut self,
        pattern: impl Into<FilterPattern>,
        handler: BoxedHandler,
    ) -> Result<(), FilterError> {
        let matcher = pattern.into().compile()?;
        self.entries.push(FilterEntry { matcher, handler });
        Ok(())
    }

    /// Replaces the handler used when no filter matches.
    pub fn set_default(&mut self, handler: BoxedHandler) {
        self.default = handler;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[FilterEntry] {
        &self.entries
    }

    /// Returns the handler for `content`: the first matching filter's
    /// handler, or the chain default.
    pub fn select(&self, content: &str) -> &BoxedHandler {
        for (index, entry) in self.entries.iter().enumerate() {
            if entry.matches(content) {
                trace!(index, pattern = %entry.matcher(), "Text filter matched");
                return &entry.handler;
            }
        }

        trace!("No text filter matched, using filter default");
        &self.default
    }

    /// Routes the request by its text content and runs the selected handler.
    pub async fn dispatch(&self, req: Arc<Request>) -> HandlerResult {
        let handler = Arc::clone(self.select(req.content()));
        handler(req).await
    }
}

impl std::fmt::Debug for FilterChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterChain")
            .field(
                "patterns",
                &self
                    .entries
                    .iter()
                    .map(|e| e.matcher().as_str())
                    .collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::into_handler;
    use serde_json::json;
    use weixin_core::{Context, Message, Reply};

    fn reply_with(text: &'static str) -> BoxedHandler {
        into_handler(move || async move { text })
    }

    fn run(chain: &FilterChain, content: &str) -> Option<Reply> {
        let req = Arc::new(Request::new(
            Message::text(content),
            Arc::new(Context::default()),
        ));
        tokio_test::block_on(chain.dispatch(req)).unwrap()
    }

    fn chain() -> FilterChain {
        let mut chain = FilterChain::new();
        chain.push(["签到", "report"], reply_with("h1")).unwrap();
        chain.push("^help.*", reply_with("h2")).unwrap();
        chain.set_default(reply_with("default"));
        chain
    }

    #[test]
    fn test_keyword_and_raw_routing() {
        let chain = chain();
        assert_eq!(run(&chain, "签到"), Some(Reply::text("h1")));
        assert_eq!(run(&chain, "  report \n"), Some(Reply::text("h1")));
        assert_eq!(run(&chain, "helpme"), Some(Reply::text("h2")));
        assert_eq!(run(&chain, "xyz"), Some(Reply::text("default")));
    }

    #[test]
    fn test_keywords_match_whole_content_only() {
        let chain = chain();
        assert_eq!(run(&chain, "签到啦"), Some(Reply::text("default")));
        assert_eq!(run(&chain, "my report"), Some(Reply::text("default")));
    }

    #[test]
    fn test_raw_pattern_matches_from_start() {
        let mut chain = FilterChain::new();
        chain.push("help", reply_with("h")).unwrap();
        chain.set_default(reply_with("default"));

        assert_eq!(run(&chain, "help"), Some(Reply::text("h")));
        assert_eq!(run(&chain, "help me"), Some(Reply::text("h")));
        assert_eq!(run(&chain, "i need help"), Some(Reply::text("default")));
    }

    #[test]
    fn test_alternation_matches_from_start() {
        let mut chain = FilterChain::new();
        chain.push("today|weather", reply_with("w")).unwrap();
        chain.set_default(reply_with("default"));

        assert_eq!(run(&chain, "weather today"), Some(Reply::text("w")));
        assert_eq!(run(&chain, "the weather"), Some(Reply::text("default")));
    }

    #[test]
    fn test_compiled_pattern_matches_from_start() {
        let mut chain = FilterChain::new();
        chain
            .push(Regex::new("(?i)hello").unwrap(), reply_with("hi"))
            .unwrap();

        assert_eq!(run(&chain, "HELLO there"), Some(Reply::text("hi")));
        assert_eq!(run(&chain, "oh hello"), None);
        assert!(chain.entries()[0].matches("Hello"));
    }

    #[test]
    fn test_keywords_are_literal() {
        let mut chain = FilterChain::new();
        chain.push(["a.b", "1+1"], reply_with("lit")).unwrap();
        assert_eq!(run(&chain, "a.b"), Some(Reply::text("lit")));
        assert_eq!(run(&chain, "1+1"), Some(Reply::text("lit")));
        assert_eq!(run(&chain, "axb"), None);
    }

    #[test]
    fn test_first_match_wins() {
        let mut chain = FilterChain::new();
        chain.push("^a", reply_with("first")).unwrap();
        chain.push("^ab", reply_with("second")).unwrap();
        assert_eq!(run(&chain, "abc"), Some(Reply::text("first")));
    }

    #[test]
    fn test_missing_content_goes_to_default() {
        let chain = chain();
        let req = Arc::new(Request::new(
            Message::of_type("text"),
            Arc::new(Context::default()),
        ));
        let reply = tokio_test::block_on(chain.dispatch(req)).unwrap();
        assert_eq!(reply, Some(Reply::text("default")));
    }

    #[test]
    fn test_compiled_pattern_is_used_unchanged() {
        let regex = Regex::new("(?i)^HELLO$").unwrap();
        let compiled = FilterPattern::from(regex).compile().unwrap();
        assert_eq!(compiled.as_str(), "(?i)^HELLO$");
    }

    #[test]
    fn test_invalid_patterns_are_configuration_errors() {
        assert!(matches!(
            FilterPattern::raw("(unclosed").compile(),
            Err(FilterError::InvalidPattern { .. })
        ));
        assert!(matches!(
            FilterPattern::keywords(Vec::<String>::new()).compile(),
            Err(FilterError::EmptyKeywords)
        ));
    }

    #[test]
    fn test_patterns_from_json() {
        assert!(matches!(
            FilterPattern::try_from(json!(["a", "b"])),
            Ok(FilterPattern::Keywords(k)) if k == ["a", "b"]
        ));
        assert!(matches!(
            FilterPattern::try_from(json!("^x")),
            Ok(FilterPattern::Raw(p)) if p == "^x"
        ));
        assert!(matches!(
            FilterPattern::try_from(json!(42)),
            Err(FilterError::UnsupportedPattern("a number"))
        ));
        assert!(matches!(
            FilterPattern::try_from(json!(["a", 1])),
            Err(FilterError::UnsupportedPattern("a number"))
        ));
    }
}
