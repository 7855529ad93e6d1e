//! Excitement patterns and the scorer.

/// Minimum length of a run of identical characters that counts as excitement.
pub const MIN_REPEAT_RUN: usize = 3;

/// One entry in the ordered pattern list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExcitementPattern {
    /// A literal substring, removed wherever it occurs.
    Literal(&'static str),
    /// Any character (line terminators excepted) repeated at least
    /// `min_run` times in a row. Each maximal run is removed whole.
    RepeatedRun { min_run: usize },
}

/// Patterns applied to every message body, in this order.
pub const EXCITEMENT_PATTERNS: &[ExcitementPattern] = &[
    ExcitementPattern::Literal("!"),
    ExcitementPattern::Literal("！"),
    ExcitementPattern::Literal("っ"),
    ExcitementPattern::Literal("ッ"),
    ExcitementPattern::Literal("ぉ"),
    ExcitementPattern::Literal("ォ"),
    ExcitementPattern::Literal("〜"),
    ExcitementPattern::RepeatedRun {
        min_run: MIN_REPEAT_RUN,
    },
];

impl ExcitementPattern {
    /// Remove every non-overlapping occurrence in a single left-to-right pass.
    pub fn strip(&self, text: &str) -> String {
        match *self {
            ExcitementPattern::Literal(needle) => text.replace(needle, ""),
            ExcitementPattern::RepeatedRun { min_run } => strip_runs(text, min_run),
        }
    }
}

fn is_line_terminator(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{0085}' | '\u{2028}' | '\u{2029}')
}

fn strip_runs(text: &str, min_run: usize) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        let mut run = 1;
        while chars.peek() == Some(&c) {
            chars.next();
            run += 1;
        }

        if run < min_run || is_line_terminator(c) {
            out.extend(std::iter::repeat(c).take(run));
        }
    }

    out
}

/// Apply `patterns` in order, each to the output of the previous one.
pub fn strip_patterns(body: &str, patterns: &[ExcitementPattern]) -> String {
    patterns
        .iter()
        .fold(body.to_string(), |text, pattern| pattern.strip(&text))
}

/// Number of characters removed by stripping the default excitement patterns.
pub fn excitement_score(body: &str) -> u64 {
    score_with(body, EXCITEMENT_PATTERNS)
}

/// Number of characters removed by stripping `patterns`.
pub fn score_with(body: &str, patterns: &[ExcitementPattern]) -> u64 {
    let before = body.chars().count();
    let after = strip_patterns(body, patterns).chars().count();
    // Stripping only ever removes characters.
    before.saturating_sub(after) as u64
}
