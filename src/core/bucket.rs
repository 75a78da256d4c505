//! Equivalence buckets for courses that satisfy the same requirement slot
//! under different names.
//!
//! Rules are evaluated in declaration order and the first match wins, so more
//! specific rules (split language levels) must come before broader ones.

use crate::core::canonical::canonicalize;
use regex::Regex;
use std::sync::LazyLock;

/// (pattern, tag). Patterns are matched against the canonical key of the name.
const RULE_TABLE: &[(&str, &str)] = &[
    // 大一英文分上下學期兩個層級
    (
        r"^(大一)?(英文|英語)(#1|一)$|^(freshman)?english(#1|i)$",
        "大一英文#1",
    ),
    (
        r"^(大一)?(英文|英語)(#2|二)$|^(freshman)?english(#2|ii)$",
        "大一英文#2",
    ),
    (
        r"^(大二英文|進階英文|高階英文)(#\d)?$|^(sophomore|advanced)english(#\d)?$",
        "大二英文",
    ),
    (
        r"^(大一)?(國文|中文|大學國文|中國語文|閱讀與寫作)(#\d)?$|^(freshman|college|university)?chinese(#\d)?$",
        "中文",
    ),
    // 0 學分但必修的類別，不看實際課名
    (
        r"^(大[一二三四])?體育|^physicaleducation|^pe(#\d)?$",
        "體育",
    ),
    (
        r"全民國防|國防教育|^軍訓|defenseeducation|nationaldefense|^militarytraining",
        "全民國防教育",
    ),
    (r"勞作教育|^labor(education|service)", "勞作教育"),
    // 多門擇一即可抵同一個必修名額
    (
        r"^(計算機概論|計算機導論|資訊科學導論|程式設計導論)(#\d)?$|^introductionto(computerscience|computers|computing)(#\d)?$",
        "計算機概論",
    ),
    (
        r"^(統計學|應用統計|基礎統計學?|生物統計學?)(#\d)?$|^(applied|basic|bio)?statistics(#\d)?$",
        "統計學",
    ),
    (
        r"^(研究方法|研究方法論|資訊研究方法)(#\d)?$|^research(methods|methodology)(#\d)?$",
        "研究方法",
    ),
];

struct BucketRule {
    pattern: Regex,
    tag: &'static str,
}

static RULES: LazyLock<Vec<BucketRule>> = LazyLock::new(|| {
    RULE_TABLE
        .iter()
        .map(|&(pattern, tag)| BucketRule {
            pattern: Regex::new(pattern).expect("valid bucket pattern"),
            tag,
        })
        .collect()
});

/// Returns the bucket tag for a course name, or `None` when no rule applies.
/// Raw and canonical names give the same answer.
pub fn bucketize(name: &str) -> Option<String> {
    let key = canonicalize(name);
    if key.is_empty() {
        return None;
    }

    RULES
        .iter()
        .find(|rule| rule.pattern.is_match(&key))
        .map(|rule| rule.tag.to_string())
}

/// The key a course is matched under: its bucket tag if one applies,
/// otherwise its canonical key.
pub fn requirement_key(name: &str) -> String {
    let canonical = canonicalize(name);
    bucketize(&canonical).unwrap_or(canonical)
}
