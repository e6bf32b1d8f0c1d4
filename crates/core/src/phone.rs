//! Phone number cleaning, validation and extraction.
//!
//! Numbers are plain digit strings. There is no numbering-plan validation:
//! [`is_valid_phone_number`] is a heuristic filter tuned for Chinese mobile,
//! landline and 400/800 service numbers, with a loose catch-all for
//! international-looking runs.
//!
//! Two validation policies exist:
//!
//! - [`is_valid_phone_number`] (10-15 digits plus shape rules) guards the
//!   shared pool, fed by uploads and OCR.
//! - [`is_valid_list_entry`] (any 7-15 digits) guards a salesperson's
//!   personal list, fed by typed input.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Shortest number accepted into the shared pool.
pub const POOL_MIN_DIGITS: usize = 10;
/// Shortest number accepted into a personal list.
pub const LIST_MIN_DIGITS: usize = 7;
/// Longest number accepted anywhere.
pub const MAX_DIGITS: usize = 15;

/// Pattern classes tried in order by [`extract_phone_numbers`], each paired
/// with whether it allows separators between digit groups.
///
/// The catch-all 10-15 digit class is handled separately by
/// [`bounded_digit_runs`] because it needs ASCII word boundaries.
static POOL_PATTERNS: LazyLock<[(Regex, bool); 5]> = LazyLock::new(|| {
    [
        // 11-digit mobile
        (Regex::new(r"1[3-9][0-9]{9}").expect("Invalid regex"), false),
        // mobile with separators, e.g. 138-1234-5678
        (
            Regex::new(r"1[3-9][0-9][\s\-]?[0-9]{4}[\s\-]?[0-9]{4}").expect("Invalid regex"),
            true,
        ),
        // landline with area code, e.g. 021-12345678
        (Regex::new(r"0[0-9]{2,3}[\s\-]?[0-9]{7,8}").expect("Invalid regex"), true),
        // 400/800 service numbers
        (
            Regex::new(r"[48]00[\s\-]?[0-9]{3}[\s\-]?[0-9]{4}").expect("Invalid regex"),
            true,
        ),
        // +86-prefixed mobile
        (Regex::new(r"\+86[\s\-]?1[3-9][0-9]{9}").expect("Invalid regex"), false),
    ]
});

static DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("Invalid regex"));

static MOBILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"1[3-9][0-9]{9}").expect("Invalid regex"));

/// Errors for a single personal-list entry.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneEntryError {
    /// Nothing was entered.
    #[error("please enter a phone number")]
    Empty,
    /// The cleaned digits are not 7-15 long.
    #[error("'{0}' is not a valid phone number (7-15 digits)")]
    Invalid(String),
}

/// Strip every non-digit character.
///
/// ```
/// use phone_dialer_core::phone::clean_phone_number;
///
/// assert_eq!(clean_phone_number("+86 138-1234-5678"), "8613812345678");
/// ```
#[must_use]
pub fn clean_phone_number(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Heuristic pool validation for an already-cleaned digit string.
///
/// - Length must be 10-15.
/// - 11 digits starting with `1`: second digit must be 3-9 (mobile).
/// - Starting with `0` and 10-12 digits: landline.
/// - Starting with `400`/`800` and exactly 10 digits: service number.
/// - Anything else: must contain more than 2 distinct digits.
///
/// ```
/// use phone_dialer_core::phone::is_valid_phone_number;
///
/// assert!(is_valid_phone_number("13812345678"));
/// assert!(is_valid_phone_number("02112345678"));
/// assert!(is_valid_phone_number("4001234567"));
/// assert!(!is_valid_phone_number("1111111111"));
/// assert!(!is_valid_phone_number("123"));
/// ```
#[must_use]
pub fn is_valid_phone_number(phone: &str) -> bool {
    let len = phone.len();
    if !(POOL_MIN_DIGITS..=MAX_DIGITS).contains(&len) || !phone.bytes().all(|b| b.is_ascii_digit())
    {
        return false;
    }

    let bytes = phone.as_bytes();

    if len == 11 && bytes.first() == Some(&b'1') {
        return bytes.get(1).is_some_and(|d| (b'3'..=b'9').contains(d));
    }

    if bytes.first() == Some(&b'0') && len <= 12 {
        return true;
    }

    if (phone.starts_with("400") || phone.starts_with("800")) && len == 10 {
        return true;
    }

    let distinct: HashSet<u8> = bytes.iter().copied().collect();
    distinct.len() > 2
}

/// Personal-list validation: 7-15 ASCII digits, nothing else.
#[must_use]
pub fn is_valid_list_entry(phone: &str) -> bool {
    (LIST_MIN_DIGITS..=MAX_DIGITS).contains(&phone.len())
        && phone.bytes().all(|b| b.is_ascii_digit())
}

/// Clean and validate one typed entry for a personal list.
///
/// # Errors
///
/// Returns [`PhoneEntryError::Empty`] for blank input and
/// [`PhoneEntryError::Invalid`] when the cleaned digits fail
/// [`is_valid_list_entry`].
pub fn parse_list_entry(raw: &str) -> Result<String, PhoneEntryError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(PhoneEntryError::Empty);
    }
    let cleaned = clean_phone_number(raw);
    if is_valid_list_entry(&cleaned) {
        Ok(cleaned)
    } else {
        Err(PhoneEntryError::Invalid(raw.to_owned()))
    }
}

/// Extract pool-valid numbers from arbitrary text.
///
/// Every pattern class is applied in order, then each line is scanned for
/// raw digit runs to pick up anything the stricter patterns missed. Matches
/// are cleaned to digits and kept only if [`is_valid_phone_number`] accepts
/// them. Numbers already in `existing`, or already found earlier in this
/// batch, are silently skipped.
///
/// A match from a separator-tolerant class is dropped when it starts or ends
/// inside a longer digit run, so a space or line break never joins the tail
/// of one number to the head of the next. The unseparated mobile and `+86`
/// classes always fire, so `8613812345678` also yields `13812345678`.
///
/// The returned numbers are new, in discovery order.
#[must_use]
pub fn extract_phone_numbers(text: &str, existing: &[String]) -> Vec<String> {
    let existing: HashSet<&str> = existing.iter().map(String::as_str).collect();
    let mut batch: HashSet<String> = HashSet::new();
    let mut found: Vec<String> = Vec::new();

    let pattern_matches = POOL_PATTERNS
        .iter()
        .flat_map(|(pattern, separated)| {
            pattern
                .find_iter(text)
                .filter(move |m| !(*separated && touches_digit(text, m.start(), m.end())))
        })
        .map(|m| clean_phone_number(m.as_str()))
        .chain(bounded_digit_runs(text).map(str::to_owned));

    let line_runs = text
        .split(['\n', '\r'])
        .flat_map(|line| DIGIT_RUN.find_iter(line).map(|m| m.as_str().to_owned()));

    for candidate in pattern_matches.chain(line_runs) {
        if is_valid_phone_number(&candidate)
            && !existing.contains(candidate.as_str())
            && batch.insert(candidate.clone())
        {
            found.push(candidate);
        }
    }

    found
}

/// Extract 11-digit mobile numbers only, deduplicated in discovery order.
///
/// This is the narrow pass used for camera and image captures on a personal
/// list, where OCR noise makes the broad pool patterns too permissive.
#[must_use]
pub fn extract_mobile_numbers(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    MOBILE
        .find_iter(text)
        .map(|m| m.as_str().to_owned())
        .filter(|phone| is_valid_list_entry(phone))
        .filter(|phone| seen.insert(phone.clone()))
        .collect()
}

/// Whether the byte range `start..end` of `text` has an ASCII digit right
/// before or right after it.
fn touches_digit(text: &str, start: usize, end: usize) -> bool {
    let before = text.get(..start).and_then(|s| s.chars().next_back());
    let after = text.get(end..).and_then(|s| s.chars().next());
    before.is_some_and(|c| c.is_ascii_digit()) || after.is_some_and(|c| c.is_ascii_digit())
}

/// Maximal digit runs of 10-15 digits that are not glued to an ASCII letter
/// or underscore on either side.
fn bounded_digit_runs(text: &str) -> impl Iterator<Item = &str> {
    DIGIT_RUN.find_iter(text).filter_map(move |m| {
        let before = text.get(..m.start()).and_then(|s| s.chars().next_back());
        let after = text.get(m.end()..).and_then(|s| s.chars().next());
        let glued = |c: Option<char>| c.is_some_and(|c| c.is_ascii_alphanumeric() || c == '_');
        ((POOL_MIN_DIGITS..=MAX_DIGITS).contains(&m.len()) && !glued(before) && !glued(after))
            .then(|| m.as_str())
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn test_validation_examples() {
        assert!(is_valid_phone_number("13812345678"));
        assert!(!is_valid_phone_number("1111111111"));
        assert!(is_valid_phone_number("02112345678"));
        assert!(is_valid_phone_number("4001234567"));
        assert!(!is_valid_phone_number("123"));
    }

    #[test]
    fn test_validation_mobile_second_digit() {
        assert!(!is_valid_phone_number("12812345678"));
        assert!(!is_valid_phone_number("10812345678"));
        assert!(is_valid_phone_number("19912345678"));
    }

    #[test]
    fn test_validation_length_bounds() {
        assert!(!is_valid_phone_number("123456789"));
        assert!(is_valid_phone_number("1234567890"));
        assert!(is_valid_phone_number("123456789012345"));
        assert!(!is_valid_phone_number("1234567890123456"));
    }

    #[test]
    fn test_validation_landline_and_service() {
        assert!(is_valid_phone_number("0101234567"));
        assert!(is_valid_phone_number("075512345678"));
        // 0-prefixed but 13 digits falls through to the distinct-digit rule
        assert!(is_valid_phone_number("0755123456789"));
        assert!(!is_valid_phone_number("0000000000000"));
        assert!(is_valid_phone_number("8001234567"));
    }

    #[test]
    fn test_validation_distinct_digits() {
        assert!(!is_valid_phone_number("1212121212"));
        assert!(is_valid_phone_number("1231231231"));
    }

    #[test]
    fn test_validation_rejects_non_digits() {
        assert!(!is_valid_phone_number("138-1234-567"));
    }

    #[test]
    fn test_clean() {
        assert_eq!(clean_phone_number("(021) 1234-5678"), "02112345678");
        assert_eq!(clean_phone_number("abc"), "");
    }

    #[test]
    fn test_extract_mixed_text() {
        let text = "张三 13812345678\n李四 021-87654321\n客服 400-123-4567\n";
        let found = extract_phone_numbers(text, &[]);
        assert_eq!(found, strings(&["13812345678", "02187654321", "4001234567"]));
    }

    #[test]
    fn test_extract_separated_mobile() {
        let found = extract_phone_numbers("call 138 1234 5678 today", &[]);
        assert_eq!(found, strings(&["13812345678"]));
    }

    #[test]
    fn test_extract_plus86_mobile() {
        let found = extract_phone_numbers("+86 13912345678", &[]);
        assert!(found.contains(&"13912345678".to_owned()));
        assert!(found.contains(&"8613912345678".to_owned()));
    }

    #[test]
    fn test_extract_mobile_inside_country_code_run() {
        let found = extract_phone_numbers("+8613912345678", &[]);
        assert_eq!(found, strings(&["13912345678", "8613912345678"]));

        let found = extract_phone_numbers("Tel:8613812345678", &[]);
        assert!(found.contains(&"13812345678".to_owned()));
        assert!(found.contains(&"8613812345678".to_owned()));
    }

    #[test]
    fn test_extract_skips_existing_and_batch_duplicates() {
        let existing = strings(&["13812345678"]);
        let text = "13812345678 13912345678 13912345678";
        let found = extract_phone_numbers(text, &existing);
        assert_eq!(found, strings(&["13912345678"]));
    }

    #[test]
    fn test_extract_one_per_line_list() {
        let text = "13800000000\n13800000001\n13800000002 13800000003";
        let found = extract_phone_numbers(text, &[]);
        assert_eq!(
            found,
            strings(&["13800000000", "13800000001", "13800000002", "13800000003"])
        );
    }

    #[test]
    fn test_extract_nothing() {
        assert!(extract_phone_numbers("no numbers here, 12345", &[]).is_empty());
        assert!(extract_phone_numbers("1111111111", &[]).is_empty());
    }

    #[test]
    fn test_extract_fallback_catches_glued_runs() {
        // "ID" glues the run, so only the line fallback sees it.
        let found = extract_phone_numbers("ID2345678901", &[]);
        assert_eq!(found, strings(&["2345678901"]));
    }

    #[test]
    fn test_extract_reextraction_of_clean_form() {
        for n in ["13812345678", "02112345678", "4001234567", "447911123456"] {
            assert!(is_valid_phone_number(n));
            let found = extract_phone_numbers(&clean_phone_number(n), &[]);
            assert!(found.contains(&n.to_owned()), "{n} not re-extracted");
        }
    }

    #[test]
    fn test_bounded_digit_runs() {
        let runs: Vec<&str> = bounded_digit_runs("a1234567890 1234567890 x_9876543210").collect();
        assert_eq!(runs, ["1234567890"]);
    }

    #[test]
    fn test_parse_list_entry() {
        assert_eq!(parse_list_entry(" 555-1234 ").unwrap(), "5551234");
        assert_eq!(parse_list_entry("  "), Err(PhoneEntryError::Empty));
        assert!(matches!(
            parse_list_entry("12345"),
            Err(PhoneEntryError::Invalid(_))
        ));
        assert!(parse_list_entry("1234567890123456").is_err());
    }

    #[test]
    fn test_extract_mobile_numbers() {
        let text = "联系人信息\n张三 13812345678\n李四 15987654321\n张三 13812345678\n021-12345678";
        assert_eq!(
            extract_mobile_numbers(text),
            strings(&["13812345678", "15987654321"])
        );
    }
}
