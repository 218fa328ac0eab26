//! Structural validators for generator output
//!
//! One total, side-effect-free predicate per task. No coercion: a wrong type
//! at any checked field rejects the whole candidate. Extra fields are
//! tolerated. Length minimums are strict `>` on Unicode character counts.

use std::collections::BTreeSet;

use serde_json::Value;

/// `true` when `v[key]` is a string longer than `min` characters.
fn str_longer(v: &Value, key: &str, min: usize) -> bool {
    v.get(key)
        .and_then(Value::as_str)
        .is_some_and(|s| s.chars().count() > min)
}

fn array<'a>(v: &'a Value, key: &str) -> Option<&'a Vec<Value>> {
    v.get(key).and_then(Value::as_array)
}

fn all_strings(items: &[Value]) -> bool {
    items.iter().all(Value::is_string)
}

/// artists: 4–5 entries, each with name>2, visual_connection>50, suggestion>20.
pub(crate) fn artist_match(v: &Value) -> bool {
    let Some(artists) = array(v, "artists") else {
        return false;
    };
    (4..=5).contains(&artists.len())
        && artists.iter().all(|a| {
            str_longer(a, "name", 2)
                && str_longer(a, "visual_connection", 50)
                && str_longer(a, "suggestion", 20)
        })
}

/// opening>50, closing>20, exactly 5 ideas with title>3, description>30,
/// practical_note>20.
pub(crate) fn series_ideas(v: &Value) -> bool {
    let Some(ideas) = array(v, "ideas") else {
        return false;
    };
    str_longer(v, "opening", 50)
        && str_longer(v, "closing", 20)
        && ideas.len() == 5
        && ideas.iter().all(|idea| {
            str_longer(idea, "title", 3)
                && str_longer(idea, "description", 30)
                && str_longer(idea, "practical_note", 20)
        })
}

/// opening>50, closing>15, 3–5 suggestions each a string longer than 30.
pub(crate) fn critique(v: &Value) -> bool {
    let Some(suggestions) = array(v, "suggestions") else {
        return false;
    };
    str_longer(v, "opening", 50)
        && str_longer(v, "closing", 15)
        && (3..=5).contains(&suggestions.len())
        && suggestions
            .iter()
            .all(|s| s.as_str().is_some_and(|s| s.chars().count() > 30))
}

/// Exactly 5 paths whose `level` values cover {1,2,3,4,5} exactly once each;
/// per-path brief_read>20; top-level closing_line>5.
pub(crate) fn abstraction_paths(v: &Value) -> bool {
    let Some(paths) = array(v, "paths") else {
        return false;
    };
    if paths.len() != 5 || !str_longer(v, "closing_line", 5) {
        return false;
    }
    let mut levels = BTreeSet::new();
    for path in paths {
        if !str_longer(path, "brief_read", 20) {
            return false;
        }
        let Some(level) = path.get("level").and_then(Value::as_u64) else {
            return false;
        };
        if !(1..=5).contains(&level) || !levels.insert(level) {
            return false;
        }
    }
    // 5 distinct in-range values over 5 entries is exactly the covering set.
    levels.len() == 5
}

/// Exactly 12 titles (all strings), exactly 3 top_rationales (objects with
/// string title and rationale), 5–7 tags (all strings).
pub(crate) fn title_generation(v: &Value) -> bool {
    let (Some(titles), Some(rationales), Some(tags)) = (
        array(v, "titles"),
        array(v, "top_rationales"),
        array(v, "tags"),
    ) else {
        return false;
    };
    titles.len() == 12
        && all_strings(titles)
        && rationales.len() == 3
        && rationales.iter().all(|r| {
            r.get("title").is_some_and(Value::is_string)
                && r.get("rationale").is_some_and(Value::is_string)
        })
        && (5..=7).contains(&tags.len())
        && all_strings(tags)
}

/// statement>20, bio>20, tips an array of strings.
pub(crate) fn statement_bio(v: &Value) -> bool {
    let Some(tips) = array(v, "tips") else {
        return false;
    };
    str_longer(v, "statement", 20) && str_longer(v, "bio", 20) && all_strings(tips)
}
