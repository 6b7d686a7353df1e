//! Case-insensitive extended glob matching for module scopes and
//! change queries.
//!
//! Supports the full ksh-style surface: `*`, `?`, bracket classes
//! (`[a-z]`, `[!x]`), backslash escapes, and the extended operators
//! `?(a|b)`, `*(a|b)`, `+(a|b)`, `@(a|b)`, `!(a|b)`. No registry crate
//! covers the extended operators (`globset` treats `(`, `)`, and `|`
//! as literals; `regex` has no way to express `!(…)` without
//! lookaround), so the pattern engine lives here.

use crate::store::StoreError;

/// A compiled pattern. Matching folds case on both sides.
#[derive(Debug, Clone)]
pub(crate) struct GlobMatcher {
    tokens: Vec<Token>,
}

impl GlobMatcher {
    pub(crate) fn is_match(&self, text: &str) -> bool {
        let folded: Vec<char> = text.chars().map(fold).collect();
        match_tokens(&self.tokens, &folded)
    }
}

/// Compile a pattern for scope resolution and change queries.
///
/// There is no path separator concept: `*` and the repetition
/// operators cross `;` freely, so a query pattern runs against the
/// composite key as one flat string.
pub(crate) fn compile(pattern: &str) -> Result<GlobMatcher, StoreError> {
    let mut parser = Parser {
        chars: pattern.chars().peekable(),
    };
    let tokens = parser.parse_tokens().map_err(|message| StoreError::Pattern {
        pattern: pattern.to_string(),
        message,
    })?;
    Ok(GlobMatcher { tokens })
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Literal(char),
    /// `?`
    AnyChar,
    /// `*`
    AnyRun,
    /// `[...]`, `[!...]`
    Class { negated: bool, items: Vec<ClassItem> },
    /// `?(a|b)`, `*(a|b)`, `+(a|b)`, `@(a|b)`, `!(a|b)`
    Group { op: GroupOp, branches: Vec<Vec<Token>> },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum GroupOp {
    ZeroOrOne,
    ZeroOrMore,
    OneOrMore,
    Exactly,
    Not,
}

#[derive(Debug, Clone, PartialEq)]
enum ClassItem {
    Char(char),
    Range(char, char),
}

/// Simple one-to-one case fold, applied to pattern literals and input
/// text alike.
fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

struct Parser<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
}

impl Parser<'_> {
    fn parse_tokens(&mut self) -> Result<Vec<Token>, String> {
        let mut tokens = Vec::new();
        while let Some(c) = self.chars.next() {
            tokens.push(self.token_from(c)?);
        }
        Ok(tokens)
    }

    fn token_from(&mut self, c: char) -> Result<Token, String> {
        match c {
            // An extended operator is a marker character directly
            // followed by `(`; otherwise `?`, `*`, `!`, `+`, `@` keep
            // their plain meaning (literal or wildcard).
            '?' | '*' | '+' | '@' | '!' if self.chars.peek() == Some(&'(') => {
                self.chars.next();
                let op = match c {
                    '?' => GroupOp::ZeroOrOne,
                    '*' => GroupOp::ZeroOrMore,
                    '+' => GroupOp::OneOrMore,
                    '@' => GroupOp::Exactly,
                    _ => GroupOp::Not,
                };
                Ok(Token::Group {
                    op,
                    branches: self.parse_branches()?,
                })
            }
            '?' => Ok(Token::AnyChar),
            '*' => Ok(Token::AnyRun),
            '[' => self.parse_class(),
            '\\' => match self.chars.next() {
                Some(escaped) => Ok(Token::Literal(fold(escaped))),
                None => Err("trailing backslash".into()),
            },
            other => Ok(Token::Literal(fold(other))),
        }
    }

    /// Parse `a|b|c)` after the opening `x(` has been consumed.
    /// `|` and `)` only have meaning inside a group.
    fn parse_branches(&mut self) -> Result<Vec<Vec<Token>>, String> {
        let mut branches = vec![Vec::new()];
        loop {
            match self.chars.next() {
                None => return Err("unterminated group".into()),
                Some(')') => return Ok(branches),
                Some('|') => branches.push(Vec::new()),
                Some(c) => {
                    let token = self.token_from(c)?;
                    branches
                        .last_mut()
                        .expect("branch list is never empty")
                        .push(token);
                }
            }
        }
    }

    /// Parse `...]` after the opening `[` has been consumed. A leading
    /// `!` or `^` negates; `]` as the first member is a literal.
    fn parse_class(&mut self) -> Result<Token, String> {
        let negated = matches!(self.chars.peek(), Some('!') | Some('^'));
        if negated {
            self.chars.next();
        }

        let mut items = Vec::new();
        let mut first = true;
        loop {
            let c = match self.chars.next() {
                None => return Err("unterminated bracket class".into()),
                Some(c) => c,
            };
            if c == ']' && !first {
                return Ok(Token::Class { negated, items });
            }
            first = false;

            // `a-z` forms a range unless the `-` is last in the class.
            if self.chars.peek() == Some(&'-') {
                let mut ahead = self.chars.clone();
                ahead.next();
                if !matches!(ahead.peek(), None | Some(']')) {
                    self.chars.next();
                    let end = self.chars.next().expect("peeked range end");
                    items.push(ClassItem::Range(fold(c), fold(end)));
                    continue;
                }
            }
            items.push(ClassItem::Char(fold(c)));
        }
    }
}

fn match_tokens(tokens: &[Token], text: &[char]) -> bool {
    let Some((token, rest)) = tokens.split_first() else {
        return text.is_empty();
    };
    match token {
        Token::Literal(c) => text.first() == Some(c) && match_tokens(rest, &text[1..]),
        Token::AnyChar => !text.is_empty() && match_tokens(rest, &text[1..]),
        Token::AnyRun => (0..=text.len()).any(|i| match_tokens(rest, &text[i..])),
        Token::Class { negated, items } => match text.first() {
            Some(&c) => (class_contains(items, c) != *negated) && match_tokens(rest, &text[1..]),
            None => false,
        },
        Token::Group { op, branches } => match_group(*op, branches, rest, text),
    }
}

fn class_contains(items: &[ClassItem], c: char) -> bool {
    items.iter().any(|item| match item {
        ClassItem::Char(x) => *x == c,
        ClassItem::Range(lo, hi) => (*lo..=*hi).contains(&c),
    })
}

/// Whether any branch matches the whole of `text`.
fn branch_matches(branches: &[Vec<Token>], text: &[char]) -> bool {
    branches.iter().any(|branch| match_tokens(branch, text))
}

fn match_group(op: GroupOp, branches: &[Vec<Token>], rest: &[Token], text: &[char]) -> bool {
    match op {
        GroupOp::Exactly => (0..=text.len())
            .any(|i| branch_matches(branches, &text[..i]) && match_tokens(rest, &text[i..])),
        GroupOp::ZeroOrOne => {
            match_tokens(rest, text)
                || (1..=text.len())
                    .any(|i| branch_matches(branches, &text[..i]) && match_tokens(rest, &text[i..]))
        }
        GroupOp::ZeroOrMore => match_repeat(branches, rest, text, true),
        GroupOp::OneOrMore => match_repeat(branches, rest, text, false),
        // `!(p)` matches any span no branch matches, with the rest of
        // the pattern picking up after it.
        GroupOp::Not => (0..=text.len())
            .any(|i| !branch_matches(branches, &text[..i]) && match_tokens(rest, &text[i..])),
    }
}

/// Repetition for `*(…)` / `+(…)`. Each occurrence must consume at
/// least one character, so empty-matching branches cannot loop.
fn match_repeat(branches: &[Vec<Token>], rest: &[Token], text: &[char], allow_zero: bool) -> bool {
    if allow_zero && match_tokens(rest, text) {
        return true;
    }
    (1..=text.len()).any(|i| {
        branch_matches(branches, &text[..i]) && match_repeat(branches, rest, &text[i..], true)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(pattern: &str, text: &str) -> bool {
        compile(pattern).unwrap().is_match(text)
    }

    #[test]
    fn match_is_case_insensitive() {
        assert!(matches("web*", "webapp"));
        assert!(matches("web*", "WebUI"));
        assert!(!matches("web*", "api"));
    }

    #[test]
    fn question_mark_matches_one_char() {
        assert!(matches("mod?", "mod7"));
        assert!(!matches("mod?", "mod"));
        assert!(!matches("mod?", "mod77"));
    }

    #[test]
    fn bracket_classes() {
        assert!(matches("mod[0-9]", "mod7"));
        assert!(!matches("mod[0-9]", "modx"));
        assert!(matches("mod[!0-9]", "modx"));
        assert!(matches("[a-c]pi", "Api"));
        // `]` as the first member is a literal.
        assert!(matches("[]x]", "]"));
        assert!(matches("[]x]", "x"));
    }

    #[test]
    fn extended_alternation() {
        assert!(matches("@(core|api)", "core"));
        assert!(matches("@(core|api)", "API"));
        assert!(!matches("@(core|api)", "web"));
        assert!(!matches("@(core|api)", "coreapi"));
    }

    #[test]
    fn extended_repetition() {
        // `*(core)`: zero or more concatenated occurrences — the shape
        // the bootstrap directive emits.
        assert!(matches("*(core)", "core"));
        assert!(matches("*(core)", ""));
        assert!(matches("*(core)", "corecore"));
        assert!(!matches("*(core)", "corex"));

        assert!(matches("+(ab)", "abab"));
        assert!(!matches("+(ab)", ""));

        assert!(matches("?(dev-)core", "core"));
        assert!(matches("?(dev-)core", "dev-core"));
        assert!(!matches("?(dev-)core", "dev-dev-core"));
    }

    #[test]
    fn extended_negation() {
        assert!(!matches("!(core)", "core"));
        assert!(matches("!(core)", "api"));
        assert!(matches("!(core)", "corex"));
        assert!(matches("!(core*)", "api"));
        assert!(!matches("!(core*)", "core;!;note"));
    }

    #[test]
    fn groups_nest() {
        assert!(matches("@(web@(app|ui)|api)", "webapp"));
        assert!(matches("@(web@(app|ui)|api)", "webui"));
        assert!(matches("@(web@(app|ui)|api)", "api"));
        assert!(!matches("@(web@(app|ui)|api)", "web"));
    }

    #[test]
    fn plain_marker_chars_are_literals() {
        // Without a following `(`, `!`, `+`, and `@` mean themselves —
        // composite keys contain them.
        assert!(matches("*;!;*", "core;!;Crash on startup"));
        assert!(matches("core;+;*", "core;+;Faster boot"));
        assert!(matches("a@b", "a@b"));
    }

    #[test]
    fn star_crosses_the_key_delimiter() {
        assert!(matches("core*", "core;!;Crash on startup"));
    }

    #[test]
    fn backslash_escapes() {
        assert!(matches(r"\*", "*"));
        assert!(!matches(r"\*", "x"));
        assert!(matches(r"\[ok\]", "[ok]"));
    }

    #[test]
    fn invalid_patterns_are_errors() {
        for pattern in ["[", "[a-", "@(open", "*(a|", "trailing\\"] {
            let err = compile(pattern).unwrap_err();
            assert!(matches!(err, StoreError::Pattern { .. }), "{}", pattern);
        }
    }
}
