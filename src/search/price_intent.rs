//! Natural-language price constraints embedded in free-text queries
//!
//! Two phrase shapes are recognized, case-insensitively:
//!
//! ```text
//! CueThenAmount:  <cue> [currency] <number> [currency]     "under rs 5,000 inr"
//! AmountThenCue:  <number> [currency] <trailing cue>       "5000 rupees or less"
//! ```
//!
//! The query is tokenized first and the shapes are matched over tokens, so
//! cue words only match whole words and the currency stripping applied to
//! the residual keyword is a separate step.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::str::FromStr;

/// Leading cues for [`PhraseShape::CueThenAmount`]
const LEADING_CUES: &[&[&str]] = &[
    &["under"],
    &["below"],
    &["less", "than"],
    &["within"],
    &["cheaper", "than"],
    &["upto"],
    &["up", "to"],
    &["maximum"],
    &["max"],
    &["<"],
];

/// Trailing cues for [`PhraseShape::AmountThenCue`]
const TRAILING_CUES: &[&[&str]] = &[&["or", "less"], &["and", "below"], &["maximum"], &["max"]];

const CURRENCY_MARKERS: &[&str] = &["rs", "rs.", "inr", "rupee", "rupees"];

static CURRENCY_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:rs\b\.?|inr\b|rupees?\b)").expect("currency pattern is valid")
});

/// Price constraint and residual keyword extracted from one raw query
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PriceIntent {
    /// Inclusive maximum price, if the query carried one
    pub ceiling: Option<Decimal>,

    /// Remaining keyword text; `None` means "match everything"
    pub keyword: Option<String>,
}

impl PriceIntent {
    pub fn has_ceiling(&self) -> bool {
        self.ceiling.is_some()
    }

    pub fn keyword(&self) -> Option<&str> {
        self.keyword.as_deref()
    }
}

/// Which of the two phrase shapes matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhraseShape {
    CueThenAmount,
    AmountThenCue,
}

/// A recognized price phrase inside the raw query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricePhrase {
    pub shape: PhraseShape,

    /// Byte range of the whole phrase in the raw query
    pub span: Range<usize>,

    /// Amount with thousands separators removed
    pub amount: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Word,
    Number,
    Symbol,
}

#[derive(Debug, Clone, Copy)]
struct Token<'a> {
    kind: TokenKind,
    text: &'a str,
    start: usize,
    end: usize,
}

impl Token<'_> {
    fn is(&self, expected: &str) -> bool {
        self.kind != TokenKind::Number && self.text.eq_ignore_ascii_case(expected)
    }

    fn is_currency(&self) -> bool {
        self.kind == TokenKind::Word && CURRENCY_MARKERS.iter().any(|marker| self.is(marker))
    }
}

/// Splits the input into words, digit/comma runs and single symbols.
///
/// Every non-whitespace character belongs to exactly one token, so two
/// consecutive tokens are only ever separated by whitespace. A `.` directly
/// after `rs` is folded into the word to form the `rs.` marker.
fn tokenize(input: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if c.is_whitespace() {
            continue;
        }

        let mut end = start + c.len_utf8();
        let kind = if c.is_alphabetic() {
            while let Some(&(idx, next)) = chars.peek() {
                if !next.is_alphabetic() {
                    break;
                }
                end = idx + next.len_utf8();
                chars.next();
            }
            if input[start..end].eq_ignore_ascii_case("rs") {
                if let Some(&(idx, '.')) = chars.peek() {
                    end = idx + 1;
                    chars.next();
                }
            }
            TokenKind::Word
        } else if c.is_ascii_digit() || c == ',' {
            while let Some(&(idx, next)) = chars.peek() {
                if !(next.is_ascii_digit() || next == ',') {
                    break;
                }
                end = idx + 1;
                chars.next();
            }
            if input[start..end].bytes().any(|b| b.is_ascii_digit()) {
                TokenKind::Number
            } else {
                TokenKind::Symbol
            }
        } else {
            TokenKind::Symbol
        };

        tokens.push(Token {
            kind,
            text: &input[start..end],
            start,
            end,
        });
    }

    tokens
}

/// Parses a digit/comma run, dropping the separators
fn parse_amount(text: &str) -> Option<Decimal> {
    let digits: String = text.chars().filter(|c| *c != ',').collect();
    Decimal::from_str(&digits).ok()
}

/// Removes standalone currency tokens (`rs`, `rs.`, `inr`, `rupee`,
/// `rupees`) and collapses the remaining whitespace.
pub fn strip_currency_tokens(text: &str) -> String {
    CURRENCY_TOKEN
        .replace_all(text, " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Extracts an optional price ceiling and the residual keyword from raw
/// query text. Never fails: text without a recognizable phrase becomes a
/// plain keyword.
#[derive(Debug, Clone, Copy, Default)]
pub struct PriceIntentParser;

impl PriceIntentParser {
    pub fn new() -> Self {
        Self
    }

    pub fn parse(&self, raw: &str) -> PriceIntent {
        let Some(phrase) = self.find_phrase(raw) else {
            let trimmed = raw.trim();
            return PriceIntent {
                ceiling: None,
                keyword: (!trimmed.is_empty()).then(|| trimmed.to_string()),
            };
        };

        let residual = format!("{} {}", &raw[..phrase.span.start], &raw[phrase.span.end..]);
        let keyword = strip_currency_tokens(&residual);

        PriceIntent {
            ceiling: Some(phrase.amount),
            keyword: (!keyword.is_empty()).then_some(keyword),
        }
    }

    /// Finds the first price phrase in `raw`, scanning left to right.
    pub fn find_phrase(&self, raw: &str) -> Option<PricePhrase> {
        let tokens = tokenize(raw);

        (0..tokens.len()).find_map(|i| {
            let (shape, last, amount) = match_cue_then_amount(&tokens, i)
                .map(|(last, amount)| (PhraseShape::CueThenAmount, last, amount))
                .or_else(|| {
                    match_amount_then_cue(&tokens, i)
                        .map(|(last, amount)| (PhraseShape::AmountThenCue, last, amount))
                })?;

            Some(PricePhrase {
                shape,
                span: tokens[i].start..tokens[last].end,
                amount,
            })
        })
    }
}

/// Matches one of `cues` at `at`, returning the index after it
fn match_cue(tokens: &[Token<'_>], at: usize, cues: &[&[&str]]) -> Option<usize> {
    cues.iter().find_map(|cue| {
        let window = tokens.get(at..at + cue.len())?;
        window
            .iter()
            .zip(cue.iter())
            .all(|(token, word)| token.is(word))
            .then_some(at + cue.len())
    })
}

fn skip_currency(tokens: &[Token<'_>], at: usize) -> usize {
    match tokens.get(at) {
        Some(token) if token.is_currency() => at + 1,
        _ => at,
    }
}

fn amount_at(tokens: &[Token<'_>], at: usize) -> Option<Decimal> {
    tokens
        .get(at)
        .filter(|token| token.kind == TokenKind::Number)
        .and_then(|token| parse_amount(token.text))
}

/// `under [rs] 5000 [rupees]`; returns the index of the last phrase token
fn match_cue_then_amount(tokens: &[Token<'_>], at: usize) -> Option<(usize, Decimal)> {
    let next = match_cue(tokens, at, LEADING_CUES)?;
    let number_at = skip_currency(tokens, next);
    let amount = amount_at(tokens, number_at)?;
    let end = skip_currency(tokens, number_at + 1);
    Some((end - 1, amount))
}

/// `5000 [rupees] or less`; returns the index of the last phrase token
fn match_amount_then_cue(tokens: &[Token<'_>], at: usize) -> Option<(usize, Decimal)> {
    let amount = amount_at(tokens, at)?;
    let cue_at = skip_currency(tokens, at + 1);
    let end = match_cue(tokens, cue_at, TRAILING_CUES)?;
    Some((end - 1, amount))
}
