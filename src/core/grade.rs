use crate::core::canonical::fold_width;
use regex::Regex;
use std::sync::LazyLock;

// 抵免、免修、採計、通過；「不通過」「未通過」不算
static EXPLICIT_PASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"抵免|免修|採計|(^|[^不未])通過|^PASS(ED)?$|^P$|^TRANSFER(RED)?$|^EXEMPT(ED|ION)?$")
        .expect("valid regex")
});
static EXPLICIT_FAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[FEX]$|^W|不及格|不通過|未通過|停修|^FAIL(ED)?$|^NP$|^NOPASS$|^DIDNOTPASS$")
        .expect("valid regex")
});
static LETTER_PASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ABCD][+-]?$").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradeOutcome {
    Passed,
    Failed,
    /// 無法辨識的成績，保守視為未通過
    Unrecognized,
}

impl GradeOutcome {
    pub fn is_pass(self) -> bool {
        self == GradeOutcome::Passed
    }
}

pub fn assess_grade(token: &str) -> GradeOutcome {
    let normalized: String = fold_width(token)
        .to_uppercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    if normalized.is_empty() {
        return GradeOutcome::Failed;
    }
    if EXPLICIT_PASS.is_match(&normalized) {
        return GradeOutcome::Passed;
    }
    if EXPLICIT_FAIL.is_match(&normalized) {
        return GradeOutcome::Failed;
    }
    if LETTER_PASS.is_match(&normalized) {
        return GradeOutcome::Passed;
    }
    GradeOutcome::Unrecognized
}

/// Whether a grade or remark token counts as passed.
pub fn classify_grade(token: &str) -> bool {
    let outcome = assess_grade(token);
    if outcome == GradeOutcome::Unrecognized {
        tracing::trace!(token, "unrecognized grade token treated as not passed");
    }
    outcome.is_pass()
}
