//! 18-digit resident identity number validation.
//!
//! Three checks run in order and the first failure wins:
//!
//! 1. format: region prefix, optional century, year, month, day, sequence
//!    and a check character (`0-9` or `X`);
//! 2. region: the first two digits name a known province-level region;
//! 3. checksum: ISO 7064 MOD 11-2 over the first 17 digits.

use crate::error::{IdCardError, Violation};
use crate::evaluator::Evaluator;
use regex::Regex;
use std::sync::OnceLock;

/// Kind name the validator is registered under.
pub const KIND: &str = "idCard";

static FORMAT_REGEX: OnceLock<Regex> = OnceLock::new();

fn format_regex() -> &'static Regex {
    FORMAT_REGEX.get_or_init(|| {
        Regex::new(
            r"(?i)^[0-9]{6}(18|19|20)?[0-9]{2}(0[1-9]|1[012])(0[1-9]|[12][0-9]|3[01])[0-9]{3}([0-9]|X)$",
        )
        .unwrap()
    })
}

const WEIGHTS: [u32; 17] = [7, 9, 10, 5, 8, 4, 2, 1, 6, 3, 7, 9, 10, 5, 8, 4, 2];
const PARITY: [u8; 11] = *b"10X98765432";

const REGIONS: &[(&str, &str)] = &[
    ("11", "北京"),
    ("12", "天津"),
    ("13", "河北"),
    ("14", "山西"),
    ("15", "内蒙古"),
    ("21", "辽宁"),
    ("22", "吉林"),
    ("23", "黑龙江"),
    ("31", "上海"),
    ("32", "江苏"),
    ("33", "浙江"),
    ("34", "安徽"),
    ("35", "福建"),
    ("36", "江西"),
    ("37", "山东"),
    ("41", "河南"),
    ("42", "湖北"),
    ("43", "湖南"),
    ("44", "广东"),
    ("45", "广西"),
    ("46", "海南"),
    ("50", "重庆"),
    ("51", "四川"),
    ("52", "贵州"),
    ("53", "云南"),
    ("54", "西藏"),
    ("61", "陕西"),
    ("62", "甘肃"),
    ("63", "青海"),
    ("64", "宁夏"),
    ("65", "新疆"),
    ("71", "台湾"),
    ("81", "香港"),
    ("82", "澳门"),
    ("91", "国外"),
];

/// Name of the region for a two-digit code, if the code is valid.
pub fn region_name(code: &str) -> Option<&'static str> {
    REGIONS
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, name)| *name)
}

/// The expected check character for the first 17 digits of `digits`.
///
/// Returns `None` if fewer than 17 ASCII digits are supplied.
pub fn check_char(digits: &str) -> Option<char> {
    let bytes = digits.as_bytes();
    if bytes.len() < 17 || !bytes[..17].iter().all(u8::is_ascii_digit) {
        return None;
    }
    let sum: u32 = bytes[..17]
        .iter()
        .zip(WEIGHTS)
        .map(|(b, w)| u32::from(b - b'0') * w)
        .sum();
    Some(char::from(PARITY[(sum % 11) as usize]))
}

/// Validate a resident identity number.
///
/// Lowercase `x` is accepted as the check character. A 16-character input
/// can satisfy the format pattern (no century marker) but never the
/// checksum, since it has no 18th character.
pub fn validate_id_card(raw: &str) -> Result<(), IdCardError> {
    let id = raw.to_ascii_uppercase();
    if id.is_empty() || !format_regex().is_match(&id) {
        return Err(IdCardError::Format);
    }
    if region_name(&id[..2]).is_none() {
        return Err(IdCardError::Region);
    }
    match (check_char(&id), id.as_bytes().get(17)) {
        (Some(expected), Some(&actual)) if expected == char::from(actual) => Ok(()),
        _ => Err(IdCardError::Checksum),
    }
}

/// Register the `idCard` kind. Non-string values fail the format check.
pub fn register(evaluator: &mut Evaluator) {
    evaluator.register(KIND, |check| {
        let outcome = match check.value.as_str() {
            Some(raw) => validate_id_card(raw),
            None => Err(IdCardError::Format),
        };
        Ok(outcome.err().map(|e| Violation::Message(e.to_string())))
    });
}
