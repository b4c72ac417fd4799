//! Compensation amounts normalized to a single base: annual currency units.
//!
//! Shorthand units are expanded with `1 LPA = 100,000` and `1 crore = 10,000,000`.
//! Bare numbers are taken verbatim.

use serde_json::Value;

use super::domain::parse_leading_decimal;

pub const LAKH: f64 = 100_000.0;
pub const CRORE: f64 = 10_000_000.0;

const CURRENCY_MARKERS: &[&str] = &["₹", "$", "inr", "rs.", "rs", "usd"];
const SALARY_LABELS: &[&str] = &["salary", "ctc", "package"];

/// Parse a money string such as `"6 LPA"`, `"₹5,00,000"` or `"1.2 Cr"`.
///
/// For a range like `"6-8 LPA"` the upper bound is taken, scaled by the unit that
/// follows it.
pub fn parse_amount(text: &str) -> Option<f64> {
    let mut rest = text.trim().to_lowercase();

    loop {
        let stripped = CURRENCY_MARKERS
            .iter()
            .find_map(|marker| rest.strip_prefix(marker).map(str::trim_start));
        match stripped {
            Some(next) => rest = next.to_string(),
            None => break,
        }
    }

    let (mut amount, after_number) = leading_number(&rest)?;
    let (mut unit, after_unit) = unit_word(after_number);

    if let Some((upper, after_upper)) = range_upper_bound(after_unit) {
        let (upper_unit, _) = unit_word(after_upper);
        amount = upper;
        if !upper_unit.is_empty() {
            unit = upper_unit;
        }
    }

    let scaled = amount * unit_multiplier(unit);
    scaled.is_finite().then_some(scaled)
}

/// Leading number of `text` and the remainder after it. Commas count as digit grouping
/// only when they form valid groups (`5,00,000`, `1,200,000`); otherwise the number ends
/// at the first comma.
fn leading_number(text: &str) -> Option<(f64, &str)> {
    let end = text
        .char_indices()
        .find(|(_, ch)| !(ch.is_ascii_digit() || matches!(ch, ',' | '.' | '_')))
        .map(|(index, _)| index)
        .unwrap_or(text.len());
    let token = &text[..end];

    let (digits, consumed) = if token.contains(',') && !is_digit_grouping(token) {
        let first = token.split(',').next().unwrap_or_default();
        (first.to_string(), first.len())
    } else {
        (token.replace(',', ""), token.len())
    };

    let digits: String = digits.chars().filter(|ch| *ch != '_').collect();
    let amount = parse_leading_decimal(&digits)?;
    Some((amount, &text[consumed..]))
}

fn is_digit_grouping(token: &str) -> bool {
    let groups: Vec<&str> = token.split(',').collect();
    let Some((last, leading)) = groups.split_last() else {
        return false;
    };
    let Some((first, middle)) = leading.split_first() else {
        return false;
    };
    let last_integer = last.split_once('.').map_or(*last, |(integer, _)| integer);
    let all_digits = |group: &str| group.chars().all(|ch| ch.is_ascii_digit());

    (1..=3).contains(&first.len())
        && all_digits(*first)
        && middle
            .iter()
            .all(|group| matches!(group.len(), 2 | 3) && all_digits(*group))
        && last_integer.len() == 3
        && all_digits(last_integer)
}

/// Alphabetic word at the start of `text` (after spaces) and what follows it. The range
/// word `to` is not a unit.
fn unit_word(text: &str) -> (&str, &str) {
    let trimmed = text.trim_start();
    let end = trimmed
        .char_indices()
        .find(|(_, ch)| !ch.is_ascii_alphabetic())
        .map(|(index, _)| index)
        .unwrap_or(trimmed.len());
    let word = &trimmed[..end];
    if word == "to" {
        ("", text)
    } else {
        (word, &trimmed[end..])
    }
}

fn range_upper_bound(text: &str) -> Option<(f64, &str)> {
    let trimmed = text.trim_start();
    let tail = trimmed
        .strip_prefix('-')
        .or_else(|| trimmed.strip_prefix('–'))
        .or_else(|| {
            trimmed
                .strip_prefix("to")
                .filter(|tail| !tail.starts_with(|ch: char| ch.is_ascii_alphabetic()))
        })?;
    leading_number(tail.trim_start())
}

fn unit_multiplier(unit: &str) -> f64 {
    match unit {
        "lpa" | "lakh" | "lakhs" | "lac" | "lacs" | "l" => LAKH,
        "cr" | "crore" | "crores" => CRORE,
        "k" => 1_000.0,
        _ => 1.0,
    }
}

/// Amount held in a JSON value, either a number or a money string.
pub fn amount_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64().filter(|amount| amount.is_finite()),
        Value::String(text) => parse_amount(text),
        _ => None,
    }
}

/// Salary offered by a job description.
///
/// A JSON description is read through its `salary` then `package` fields. Free text is
/// scanned for the first `salary`, `ctc` or `package` label followed by an amount.
pub fn job_salary(description: &str) -> Option<f64> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(trimmed) {
        return ["salary", "package"]
            .iter()
            .filter_map(|key| map.get(*key))
            .find_map(amount_from_value);
    }

    scan_labelled_amount(trimmed)
}

fn scan_labelled_amount(text: &str) -> Option<f64> {
    let lowered = text.to_lowercase();

    let mut hits: Vec<(usize, &str)> = SALARY_LABELS
        .iter()
        .flat_map(|label| {
            lowered
                .match_indices(label)
                .map(move |(index, _)| (index, *label))
        })
        .collect();
    hits.sort_by_key(|(index, _)| *index);

    hits.into_iter().find_map(|(index, label)| {
        let after = lowered[index + label.len()..]
            .trim_start_matches(|ch: char| ch.is_whitespace() || matches!(ch, ':' | '-' | '='));
        let segment = after
            .split(|ch: char| matches!(ch, ';' | '\n' | '|' | ')'))
            .next()
            .unwrap_or_default();
        parse_amount(segment)
    })
}
