//! Course-name canonicalization.
//!
//! Course names arrive in many shapes: full-width or half-width characters,
//! `（一）` or `(I)` numbering, a leading `28126-` course code, an English
//! gloss in brackets. [`canonicalize`] folds all of these into one key so the
//! same course compares equal wherever it came from.

use regex::{Captures, Regex};
use std::sync::LazyLock;

static INNER_BRACKET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([^()]*)\)").expect("valid regex"));
static ROMAN_BRACKET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\(\s*(iv|v|i{1,3})\s*\)").expect("valid regex"));
static MARKED_BRACKET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\([^()]*#(\d+)[^()]*\)").expect("valid regex"));
static CODE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*[0-9A-Za-z]+\s*-\s*").expect("valid regex"));
static MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#\d+").expect("valid regex"));

/// 第 8 步移除的標點（空白另外處理）
const NOISE: &[char] = &['(', ')', '.', ',', ';', ':', '。', '、', '，', '．', '；', '：'];

/// Folds full-width ASCII variants (U+FF01..U+FF5E) and the ideographic space
/// to their half-width forms.
pub fn fold_width(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            '\u{3000}' => ' ',
            '\u{FF01}'..='\u{FF5E}' => char::from_u32(c as u32 - 0xFEE0).unwrap_or(c),
            _ => c,
        })
        .collect()
}

/// Maps a raw course name to its canonical key. Total and idempotent.
pub fn canonicalize(name: &str) -> String {
    let mut key = canonical_pass(name);
    // 去掉代碼前綴後可能又露出新的前綴，重跑到不動為止；之後每輪只會變短
    loop {
        let next = canonical_pass(&key);
        if next == key {
            return key;
        }
        key = next;
    }
}

fn canonical_pass(name: &str) -> String {
    let s = normalize_brackets(&fold_width(name));

    let s = INNER_BRACKET.replace_all(&s, |caps: &Captures| {
        format!("({})", ordinals_to_roman(&caps[1]))
    });
    let s = ROMAN_BRACKET.replace_all(&s, |caps: &Captures| {
        format!("#{}", roman_value(&caps[1]))
    });
    let s = MARKED_BRACKET.replace_all(&s, "#$1");
    let s = strip_annotations(&s);
    let s = CODE_PREFIX.replace(&s, "");

    let s: String = s
        .chars()
        .filter(|c| !c.is_whitespace() && !NOISE.contains(c))
        .collect();

    collapse_repeated_markers(&s).to_lowercase()
}

fn normalize_brackets(input: &str) -> String {
    input
        .chars()
        .map(|c| match c {
            '（' | '[' | '［' | '【' | '〔' => '(',
            '）' | ']' | '］' | '】' | '〕' => ')',
            _ => c,
        })
        .collect()
}

fn ordinals_to_roman(inner: &str) -> String {
    let mut out = String::with_capacity(inner.len());
    for c in inner.chars() {
        match c {
            '一' => out.push('I'),
            '二' => out.push_str("II"),
            '三' => out.push_str("III"),
            '四' => out.push_str("IV"),
            '五' => out.push('V'),
            other => out.push(other),
        }
    }
    out
}

fn roman_value(numeral: &str) -> u8 {
    match numeral.to_ascii_uppercase().as_str() {
        "I" => 1,
        "II" => 2,
        "III" => 3,
        "IV" => 4,
        _ => 5,
    }
}

/// 由內而外移除所有括號註記（通常是英文翻譯）
fn strip_annotations(input: &str) -> String {
    let mut s = input.to_string();
    while INNER_BRACKET.is_match(&s) {
        s = INNER_BRACKET.replace_all(&s, "").into_owned();
    }
    s
}

/// "#1#1" -> "#1"; different adjacent markers are kept.
fn collapse_repeated_markers(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last = 0;
    let mut previous: Option<(usize, &str)> = None;

    for m in MARKER.find_iter(input) {
        out.push_str(&input[last..m.start()]);
        let repeated = matches!(previous, Some((end, marker)) if end == m.start() && marker == m.as_str());
        if !repeated {
            out.push_str(m.as_str());
        }
        previous = Some((m.end(), m.as_str()));
        last = m.end();
    }
    out.push_str(&input[last..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_width() {
        assert_eq!(fold_width("ＡＢＣ１２３（）　－"), "ABC123() -");
        assert_eq!(fold_width("專題討論"), "專題討論");
    }

    #[test]
    fn test_code_prefix_and_gloss_are_dropped() {
        assert_eq!(
            canonicalize("28126-專題討論（一） (Seminar (I))"),
            canonicalize("專題討論(I)")
        );
        assert_eq!(canonicalize("專題討論(I)"), "專題討論#1");
    }

    #[test]
    fn test_ordinals_and_roman_numerals() {
        assert_eq!(canonicalize("英文（二）"), "英文#2");
        assert_eq!(canonicalize("英文(II)"), "英文#2");
        assert_eq!(canonicalize("英文(iii)"), "英文#3");
        assert_eq!(canonicalize("英文（四）"), "英文#4");
        assert_eq!(canonicalize("英文【五】"), "英文#5");
    }

    #[test]
    fn test_marker_with_other_text_collapses() {
        assert_eq!(canonicalize("書報討論(一)(Seminar #1 in CS)"), "書報討論#1");
    }

    #[test]
    fn test_different_markers_are_kept() {
        assert_eq!(collapse_repeated_markers("a#1#2"), "a#1#2");
        assert_eq!(collapse_repeated_markers("a#1#1#1b"), "a#1b");
        assert_eq!(collapse_repeated_markers("#1x#1"), "#1x#1");
    }

    #[test]
    fn test_annotations_and_punctuation_removed() {
        assert_eq!(canonicalize("演算法 (Algorithms)"), "演算法");
        assert_eq!(canonicalize("Machine Learning: Theory."), "machinelearningtheory");
        assert_eq!(canonicalize("資料庫[Database(System)]"), "資料庫");
    }

    #[test]
    fn test_width_and_case_insensitive() {
        assert_eq!(canonicalize("ＣＳ１０１－Ｄａｔａ　Ｓｔｒｕｃｔｕｒｅｓ"), "datastructures");
        assert_eq!(canonicalize("CS101-Data Structures"), "datastructures");
    }

    #[test]
    fn test_total_on_degenerate_input() {
        assert_eq!(canonicalize(""), "");
        assert_eq!(canonicalize("   "), "");
        assert_eq!(canonicalize("()"), "");
        assert_eq!(canonicalize("((("), "");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "28126-專題討論（一） (Seminar (I))",
            "AB-CD-EF 計算理論",
            "A.B-x",
            " 12345 - 大一英文(二) Freshman English (II)",
            "體育（三）",
            "統計學(Statistics)(一)(一)",
            "(unbalanced",
            "Ⅰ型糖尿病",
            "",
        ];
        for sample in samples {
            let once = canonicalize(sample);
            assert_eq!(canonicalize(&once), once, "not idempotent for {:?}", sample);
        }
    }
}
