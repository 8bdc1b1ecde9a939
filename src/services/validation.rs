use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate, NaiveTime};
use regex::Regex;
use serde::Serialize;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

pub const AGE_RANGES: &[&str] = &["under-18", "18-24", "25-34", "35-44", "45+"];

const MIN_NAME_LEN: usize = 3;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FieldError {
    #[error("This field is required.")]
    Required,
    #[error("Must be at least {min} characters.")]
    TooShort { min: usize },
    #[error("Invalid email address.")]
    InvalidEmail,
    #[error("Phone number must have 10 to 15 digits.")]
    InvalidPhone,
    #[error("Unknown age range.")]
    InvalidAgeRange,
    #[error("Unknown option.")]
    UnknownOption,
    #[error("Invalid date, expected YYYY-MM-DD.")]
    InvalidDate,
    #[error("Visit day cannot be in the past.")]
    DateInPast,
    #[error("Invalid time, expected HH:MM.")]
    InvalidHour,
    #[error("End hour must be after start hour.")]
    EndNotAfterStart,
    #[error("Invalid card number.")]
    InvalidCardNumber,
    #[error("Invalid expiry date.")]
    InvalidExpiry,
    #[error("Card has expired.")]
    CardExpired,
    #[error("Invalid CVV.")]
    InvalidCvv,
}

/// Per-field failures collected across a form, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the failure, if any. The first failure per field wins.
    pub fn check(&mut self, field: &str, result: Result<(), FieldError>) {
        if let Err(e) = result {
            self.0.entry(field.to_string()).or_insert_with(|| e.to_string());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

fn digits_of(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}

pub fn validate_name(name: &str) -> Result<(), FieldError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(FieldError::Required);
    }
    if name.chars().count() < MIN_NAME_LEN {
        return Err(FieldError::TooShort { min: MIN_NAME_LEN });
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), FieldError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(FieldError::Required);
    }
    if !EMAIL_RE.is_match(email) {
        return Err(FieldError::InvalidEmail);
    }
    Ok(())
}

pub fn validate_phone(phone: &str) -> Result<(), FieldError> {
    if phone.trim().is_empty() {
        return Err(FieldError::Required);
    }
    let digits = digits_of(phone);
    if !(10..=15).contains(&digits.len()) {
        return Err(FieldError::InvalidPhone);
    }
    Ok(())
}

pub fn validate_age_range(age_range: Option<&str>) -> Result<(), FieldError> {
    match age_range.map(str::trim) {
        None | Some("") => Ok(()),
        Some(range) if AGE_RANGES.contains(&range) => Ok(()),
        Some(_) => Err(FieldError::InvalidAgeRange),
    }
}

pub fn validate_visit_date(
    visit_date: &str,
    today: NaiveDate,
    allow_past: bool,
) -> Result<(), FieldError> {
    let visit_date = visit_date.trim();
    if visit_date.is_empty() {
        return Err(FieldError::Required);
    }
    let date =
        NaiveDate::parse_from_str(visit_date, "%Y-%m-%d").map_err(|_| FieldError::InvalidDate)?;
    if !allow_past && date < today {
        return Err(FieldError::DateInPast);
    }
    Ok(())
}

/// Hours must be zero-padded `HH:MM`, which makes string order match time
/// order.
pub fn validate_hour(hour: &str) -> Result<(), FieldError> {
    if hour.is_empty() {
        return Err(FieldError::Required);
    }
    if hour.len() != 5 || NaiveTime::parse_from_str(hour, "%H:%M").is_err() {
        return Err(FieldError::InvalidHour);
    }
    Ok(())
}

pub fn validate_end_after_start(start_hour: &str, end_hour: &str) -> Result<(), FieldError> {
    validate_hour(end_hour)?;
    if validate_hour(start_hour).is_ok() && end_hour <= start_hour {
        return Err(FieldError::EndNotAfterStart);
    }
    Ok(())
}

/// Length check only: 12 to 20 digits once spaces and dashes are removed.
pub fn validate_card_number(card_number: &str) -> Result<(), FieldError> {
    if card_number.trim().is_empty() {
        return Err(FieldError::Required);
    }
    let stripped: String = card_number
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();
    if !stripped.chars().all(|c| c.is_ascii_digit()) || !(12..=20).contains(&stripped.len()) {
        return Err(FieldError::InvalidCardNumber);
    }
    Ok(())
}

/// Length check plus the Luhn checksum.
pub fn validate_card_number_luhn(card_number: &str) -> Result<(), FieldError> {
    validate_card_number(card_number)?;
    if !luhn_valid(&digits_of(card_number)) {
        return Err(FieldError::InvalidCardNumber);
    }
    Ok(())
}

pub fn luhn_valid(digits: &str) -> bool {
    let mut sum = 0;
    for (i, c) in digits.chars().rev().enumerate() {
        let Some(mut d) = c.to_digit(10) else {
            return false;
        };
        if i % 2 == 1 {
            d *= 2;
            if d > 9 {
                d -= 9;
            }
        }
        sum += d;
    }
    !digits.is_empty() && sum % 10 == 0
}

/// `MM/YY`; the card stays valid through the last day of that month.
pub fn validate_expiry(expiry: &str, today: NaiveDate) -> Result<(), FieldError> {
    let expiry = expiry.trim();
    if expiry.is_empty() {
        return Err(FieldError::Required);
    }
    let (month, year) = expiry.split_once('/').ok_or(FieldError::InvalidExpiry)?;
    let two_digits = |part: &str| part.len() == 2 && part.chars().all(|c| c.is_ascii_digit());
    if !two_digits(month) || !two_digits(year) {
        return Err(FieldError::InvalidExpiry);
    }
    let month: u32 = month.parse().map_err(|_| FieldError::InvalidExpiry)?;
    let year: i32 = year.parse().map_err(|_| FieldError::InvalidExpiry)?;
    if !(1..=12).contains(&month) {
        return Err(FieldError::InvalidExpiry);
    }
    if (2000 + year, month) < (today.year(), today.month()) {
        return Err(FieldError::CardExpired);
    }
    Ok(())
}

pub fn validate_cvv(cvv: &str) -> Result<(), FieldError> {
    let cvv = cvv.trim();
    if cvv.is_empty() {
        return Err(FieldError::Required);
    }
    if !(3..=4).contains(&cvv.len()) || !cvv.chars().all(|c| c.is_ascii_digit()) {
        return Err(FieldError::InvalidCvv);
    }
    Ok(())
}

/// Normalizes raw expiry keystrokes into `MM/YY` as the user types:
/// `"1"` stays, `"12"` becomes `"12/"`, `"1230"` becomes `"12/30"`.
pub fn format_expiry_input(raw: &str) -> String {
    let digits: String = digits_of(raw).chars().take(4).collect();
    match digits.len() {
        0 | 1 => digits,
        2 => format!("{digits}/"),
        _ => format!("{}/{}", &digits[..2], &digits[2..]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("  "), Err(FieldError::Required));
        assert_eq!(validate_name("Al"), Err(FieldError::TooShort { min: 3 }));
        assert!(validate_name("Ada").is_ok());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("a@b.co").is_ok());
        assert_eq!(validate_email("not-an-email"), Err(FieldError::InvalidEmail));
        assert_eq!(validate_email("a@b"), Err(FieldError::InvalidEmail));
        assert_eq!(validate_email("a b@c.com"), Err(FieldError::InvalidEmail));
        assert_eq!(validate_email(""), Err(FieldError::Required));
    }

    #[test]
    fn test_validate_phone() {
        assert_eq!(validate_phone("12345"), Err(FieldError::InvalidPhone));
        assert!(validate_phone("08012345678").is_ok());
        assert!(validate_phone("+234 801-234-5678").is_ok());
        assert_eq!(validate_phone("1234567890123456"), Err(FieldError::InvalidPhone));
    }

    #[test]
    fn test_validate_age_range() {
        assert!(validate_age_range(None).is_ok());
        assert!(validate_age_range(Some("")).is_ok());
        assert!(validate_age_range(Some("25-34")).is_ok());
        assert_eq!(validate_age_range(Some("100")), Err(FieldError::InvalidAgeRange));
    }

    #[test]
    fn test_validate_visit_date() {
        let today = date("2026-03-10");
        assert!(validate_visit_date("2026-03-10", today, false).is_ok());
        assert!(validate_visit_date("2026-04-01", today, false).is_ok());
        assert_eq!(
            validate_visit_date("2026-03-09", today, false),
            Err(FieldError::DateInPast)
        );
        assert!(validate_visit_date("2026-03-09", today, true).is_ok());
        assert_eq!(
            validate_visit_date("10/03/2026", today, false),
            Err(FieldError::InvalidDate)
        );
        assert_eq!(validate_visit_date("", today, false), Err(FieldError::Required));
    }

    #[test]
    fn test_validate_hours() {
        assert!(validate_end_after_start("09:00", "17:00").is_ok());
        assert_eq!(
            validate_end_after_start("17:00", "09:00"),
            Err(FieldError::EndNotAfterStart)
        );
        assert_eq!(
            validate_end_after_start("09:00", "09:00"),
            Err(FieldError::EndNotAfterStart)
        );
        assert_eq!(validate_hour("9:00"), Err(FieldError::InvalidHour));
        assert_eq!(validate_hour("24:00"), Err(FieldError::InvalidHour));
        assert_eq!(validate_end_after_start("09:00", ""), Err(FieldError::Required));
    }

    #[test]
    fn test_validate_card_number() {
        assert!(validate_card_number("4111111111111111").is_ok());
        assert!(validate_card_number("4111 1111 1111 1111").is_ok());
        assert!(validate_card_number("4111-1111-1111-1112").is_ok());
        assert_eq!(validate_card_number("41111111111"), Err(FieldError::InvalidCardNumber));
        assert_eq!(validate_card_number("4111abcd11111111"), Err(FieldError::InvalidCardNumber));
    }

    #[test]
    fn test_validate_card_number_luhn() {
        assert!(validate_card_number_luhn("4111111111111111").is_ok());
        assert_eq!(
            validate_card_number_luhn("4111111111111112"),
            Err(FieldError::InvalidCardNumber)
        );
        assert!(luhn_valid("79927398713"));
        assert!(!luhn_valid(""));
    }

    #[test]
    fn test_validate_expiry() {
        let today = date("2026-03-10");
        assert!(validate_expiry("03/26", today).is_ok());
        assert!(validate_expiry("01/30", today).is_ok());
        assert_eq!(validate_expiry("02/26", today), Err(FieldError::CardExpired));
        assert_eq!(validate_expiry("13/30", today), Err(FieldError::InvalidExpiry));
        assert_eq!(validate_expiry("1230", today), Err(FieldError::InvalidExpiry));
        assert_eq!(validate_expiry("1/30", today), Err(FieldError::InvalidExpiry));
        assert_eq!(validate_expiry("+1/30", today), Err(FieldError::InvalidExpiry));
        assert_eq!(validate_expiry("-1/30", today), Err(FieldError::InvalidExpiry));
        assert_eq!(validate_expiry("01/+3", today), Err(FieldError::InvalidExpiry));
    }

    #[test]
    fn test_validate_cvv() {
        assert!(validate_cvv("123").is_ok());
        assert!(validate_cvv("1234").is_ok());
        assert_eq!(validate_cvv("12"), Err(FieldError::InvalidCvv));
        assert_eq!(validate_cvv("12a"), Err(FieldError::InvalidCvv));
    }

    #[test]
    fn test_format_expiry_input() {
        assert_eq!(format_expiry_input("1"), "1");
        assert_eq!(format_expiry_input("12"), "12/");
        assert_eq!(format_expiry_input("123"), "12/3");
        assert_eq!(format_expiry_input("12/30"), "12/30");
        assert_eq!(format_expiry_input("123045"), "12/30");
    }

    #[test]
    fn test_field_errors_keep_first_failure() {
        let mut errors = FieldErrors::new();
        errors.check("email", Err(FieldError::Required));
        errors.check("email", Err(FieldError::InvalidEmail));
        errors.check("phone", Ok(()));

        assert_eq!(errors.get("email"), Some("This field is required."));
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["email"]);
        assert!(errors.into_result().is_err());
    }
}
