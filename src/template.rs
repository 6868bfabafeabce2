//! Template Expander
//!
//! Expands `{token}` patterns such as `{company}@{year}` into the full cross
//! product of token values.
//!
//! The pattern is split into literal text and token slots once. Token kinds
//! are then processed one at a time in a fixed order (identity, word,
//! temporal, symbolic, derived); each step fills every slot of that kind in
//! every partial result with each of its values. Filled values are never
//! scanned again, so a value containing `{word}` stays as it is. A token with no
//! values in the current context stays in the output literally, and so does
//! any `{name}` outside the vocabulary (reported as a warning).

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

use crate::leet;
use crate::locale::LocaleData;
use crate::variation::{title_case, VariationGenerator};

/// Matches anything that looks like a token.
static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{[a-zA-Z0-9_]+\}").unwrap());

const TEMPLATE_SEPARATORS: &[&str] = &["", "_", "-", ".", "@", "#", "$"];
const TEMPLATE_NUMBERS: &[&str] = &["1", "12", "123", "1234", "12345", "123456", "0", "01", "007"];
const TEMPLATE_SPECIALS: &[&str] = &["!", "@", "#", "$", "%", "&", "*", "?"];
const KEYBOARD_WALKS: &[&str] = &["qwe", "asd", "zxc", "qaz", "wsx", "edc"];

// =============================================================================
// TOKEN VOCABULARY
// =============================================================================

/// A recognized template token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Company,
    Word,
    Year,
    Day,
    Month,
    MonthNum,
    MonthShort,
    Season,
    Weekday,
    Date,
    Sep,
    Num,
    Special,
    Leet,
    Reverse,
    Keyboard,
}

impl TokenKind {
    /// Every token, in expansion order.
    pub const ALL: [TokenKind; 16] = [
        TokenKind::Company,
        TokenKind::Word,
        TokenKind::Year,
        TokenKind::Day,
        TokenKind::Month,
        TokenKind::MonthNum,
        TokenKind::MonthShort,
        TokenKind::Season,
        TokenKind::Weekday,
        TokenKind::Date,
        TokenKind::Sep,
        TokenKind::Num,
        TokenKind::Special,
        TokenKind::Leet,
        TokenKind::Reverse,
        TokenKind::Keyboard,
    ];

    /// The brace-delimited placeholder, e.g. `{month_num}`.
    pub fn placeholder(self) -> &'static str {
        match self {
            TokenKind::Company => "{company}",
            TokenKind::Word => "{word}",
            TokenKind::Year => "{year}",
            TokenKind::Day => "{day}",
            TokenKind::Month => "{month}",
            TokenKind::MonthNum => "{month_num}",
            TokenKind::MonthShort => "{month_short}",
            TokenKind::Season => "{season}",
            TokenKind::Weekday => "{weekday}",
            TokenKind::Date => "{date}",
            TokenKind::Sep => "{sep}",
            TokenKind::Num => "{num}",
            TokenKind::Special => "{special}",
            TokenKind::Leet => "{leet}",
            TokenKind::Reverse => "{reverse}",
            TokenKind::Keyboard => "{keyboard}",
        }
    }

    /// Look up a placeholder (braces included).
    pub fn from_placeholder(placeholder: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.placeholder() == placeholder)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.placeholder())
    }
}

/// `{name}` substrings of `pattern` that are not in the vocabulary, in order
/// of first appearance.
pub fn unknown_tokens(pattern: &str) -> Vec<String> {
    let mut unknown: Vec<String> = Vec::new();
    for m in TOKEN_RE.find_iter(pattern) {
        let token = m.as_str();
        if TokenKind::from_placeholder(token).is_none() && !unknown.iter().any(|u| u == token) {
            unknown.push(token.to_string());
        }
    }
    unknown
}

// =============================================================================
// CONTEXT
// =============================================================================

/// Seed data available to templates. Built once per run.
#[derive(Debug, Clone, Default)]
pub struct ExpansionContext {
    /// Organization name, if any
    pub identity: Option<String>,
    /// Common words, in caller order
    pub common_words: Vec<String>,
    /// Years of the configured range
    pub years: Vec<i32>,
    /// Season, month and weekday lists
    pub locale: LocaleData,
}

impl ExpansionContext {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = Some(identity.into());
        self
    }

    pub fn with_words(mut self, words: Vec<String>) -> Self {
        self.common_words = words;
        self
    }

    pub fn with_years(mut self, years: Vec<i32>) -> Self {
        self.years = years;
        self
    }

    pub fn with_locale(mut self, locale: LocaleData) -> Self {
        self.locale = locale;
        self
    }

    /// Non-empty identity, trimmed.
    pub fn identity(&self) -> Option<&str> {
        self.identity
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Identity followed by the common words.
    fn base_words(&self) -> Vec<&str> {
        self.identity()
            .into_iter()
            .chain(self.common_words.iter().map(String::as_str))
            .filter(|w| !w.trim().is_empty())
            .collect()
    }
}

// =============================================================================
// EXPANSION
// =============================================================================

/// Result of expanding one pattern
#[derive(Debug, Clone)]
pub struct ExpansionResult {
    /// The pattern that was expanded
    pub pattern: String,
    /// Every substitution of the pattern
    pub candidates: Vec<String>,
    /// Out-of-vocabulary tokens left in place
    pub unknown_tokens: Vec<String>,
    /// Known tokens present in the pattern that had no values
    pub skipped_tokens: Vec<TokenKind>,
}

/// Expands patterns against one context
pub struct TemplateExpander {
    context: ExpansionContext,
    variations: VariationGenerator,
}

impl TemplateExpander {
    pub fn new(context: ExpansionContext) -> Self {
        let variations = VariationGenerator::new(context.years.clone());
        Self {
            context,
            variations,
        }
    }

    pub fn context(&self) -> &ExpansionContext {
        &self.context
    }

    /// Expand a pattern to its full cross product of token values.
    pub fn expand(&self, pattern: &str) -> ExpansionResult {
        let unknown = unknown_tokens(pattern);
        for token in &unknown {
            tracing::warn!(pattern = %pattern, token = %token, "Unknown template token left literal");
        }

        let pieces = split_pattern(pattern);
        let mut results = vec![pieces.clone()];
        let mut skipped = Vec::new();

        for kind in TokenKind::ALL {
            if !pieces.contains(&Piece::Slot(kind)) {
                continue;
            }

            let values = self.values(kind);
            if values.is_empty() {
                tracing::debug!(pattern = %pattern, token = %kind, "No values for token, leaving literal");
                skipped.push(kind);
                continue;
            }

            let mut next = Vec::with_capacity(results.len() * values.len());
            for partial in &results {
                for value in &values {
                    next.push(
                        partial
                            .iter()
                            .map(|piece| match piece {
                                Piece::Slot(k) if *k == kind => Piece::Text(value.clone()),
                                other => other.clone(),
                            })
                            .collect(),
                    );
                }
            }
            results = next;
        }

        ExpansionResult {
            pattern: pattern.to_string(),
            candidates: results.iter().map(|pieces| render(pieces)).collect(),
            unknown_tokens: unknown,
            skipped_tokens: skipped,
        }
    }

    /// Expand several patterns, concatenating their candidates.
    pub fn expand_all<S: AsRef<str>>(&self, patterns: &[S]) -> Vec<String> {
        patterns
            .iter()
            .flat_map(|p| self.expand(p.as_ref()).candidates)
            .collect()
    }

    /// Values a token can take in this context. Empty means "skip".
    pub fn values(&self, kind: TokenKind) -> Vec<String> {
        let ctx = &self.context;
        match kind {
            TokenKind::Company => ctx
                .identity()
                .map(|id| self.variations.identity_variations(id))
                .unwrap_or_default(),
            TokenKind::Word => ctx
                .common_words
                .iter()
                .filter(|w| !w.trim().is_empty())
                .flat_map(|w| [w.clone(), title_case(w), w.to_uppercase()])
                .collect(),
            TokenKind::Year => ctx
                .years
                .iter()
                .flat_map(|y| [y.to_string(), format!("{:02}", y % 100)])
                .collect(),
            TokenKind::Day => (1..=31).map(|d| format!("{:02}", d)).collect(),
            TokenKind::Month => with_title(ctx.locale.months()),
            TokenKind::MonthNum => (1..=12).map(|m| format!("{:02}", m)).collect(),
            TokenKind::MonthShort => with_title(ctx.locale.months_short()),
            TokenKind::Season => with_title(ctx.locale.seasons()),
            TokenKind::Weekday => with_title(ctx.locale.weekdays()),
            TokenKind::Date => ctx
                .years
                .iter()
                .flat_map(|y| {
                    let short = format!("{:02}", y % 100);
                    [
                        format!("0101{}", y),
                        format!("0101{}", short),
                        format!("{}0101", y),
                        format!("{}0101", short),
                    ]
                })
                .collect(),
            TokenKind::Sep => to_owned(TEMPLATE_SEPARATORS),
            TokenKind::Num => to_owned(TEMPLATE_NUMBERS),
            TokenKind::Special => to_owned(TEMPLATE_SPECIALS),
            TokenKind::Leet => leet::expand_all(ctx.base_words()),
            TokenKind::Reverse => ctx
                .base_words()
                .into_iter()
                .flat_map(|w| {
                    let reversed: String = w.chars().rev().collect();
                    let titled = title_case(&reversed);
                    [reversed, titled]
                })
                .collect(),
            TokenKind::Keyboard => to_owned(KEYBOARD_WALKS),
        }
    }
}

/// A run of literal text or an unfilled token slot.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Text(String),
    Slot(TokenKind),
}

/// Split a pattern into text and slots. Unknown tokens stay text.
fn split_pattern(pattern: &str) -> Vec<Piece> {
    let mut pieces = Vec::new();
    let mut last = 0;
    for m in TOKEN_RE.find_iter(pattern) {
        if let Some(kind) = TokenKind::from_placeholder(m.as_str()) {
            if m.start() > last {
                pieces.push(Piece::Text(pattern[last..m.start()].to_string()));
            }
            pieces.push(Piece::Slot(kind));
            last = m.end();
        }
    }
    if last < pattern.len() || pieces.is_empty() {
        pieces.push(Piece::Text(pattern[last..].to_string()));
    }
    pieces
}

/// Join pieces back into a string; slots with no values print as tokens.
fn render(pieces: &[Piece]) -> String {
    pieces
        .iter()
        .map(|piece| match piece {
            Piece::Text(text) => text.as_str(),
            Piece::Slot(kind) => kind.placeholder(),
        })
        .collect()
}

fn with_title(list: Option<&[String]>) -> Vec<String> {
    list.unwrap_or_default()
        .iter()
        .flat_map(|item| [item.clone(), title_case(item)])
        .collect()
}

fn to_owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
