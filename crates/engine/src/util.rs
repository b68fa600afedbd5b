//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent invariants.

use uuid::Uuid;

use crate::{EngineError, Money, ResultEngine};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidId(format!("invalid {label} id")))
}

/// Trim a required free-text field, rejecting blank input.
pub(crate) fn normalize_required_text(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation(format!("{label} must not be empty")));
    }
    Ok(trimmed.to_string())
}

/// Trim an optional free-text field; blank input becomes `None`.
pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Largest amount or limit accepted on input: 100 billion in cents. Keeps
/// every per-user sum far inside `i64`.
pub(crate) const MAX_AMOUNT: Money = Money::new(100_000_000_000_00);

/// Reject negative amounts and amounts above [`MAX_AMOUNT`].
pub(crate) fn ensure_amount(amount: Money, label: &str) -> ResultEngine<()> {
    if amount.is_negative() {
        return Err(EngineError::Validation(format!("{label} must be >= 0")));
    }
    if amount > MAX_AMOUNT {
        return Err(EngineError::Validation(format!(
            "{label} must be <= {MAX_AMOUNT}"
        )));
    }
    Ok(())
}

/// Build a lower-cased `LIKE` pattern matching `needle` as a literal
/// substring. `\` is the escape character.
pub(crate) fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.to_lowercase().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_is_trimmed() {
        assert_eq!(normalize_required_text("  Food ", "category").unwrap(), "Food");
        assert_eq!(
            normalize_required_text("   ", "category"),
            Err(EngineError::Validation(
                "category must not be empty".to_string()
            ))
        );
    }

    #[test]
    fn optional_text_drops_blank() {
        assert_eq!(normalize_optional_text(Some("  ")), None);
        assert_eq!(normalize_optional_text(None), None);
        assert_eq!(
            normalize_optional_text(Some(" lunch ")),
            Some("lunch".to_string())
        );
    }

    #[test]
    fn amount_must_be_within_range() {
        assert!(ensure_amount(Money::ZERO, "amount").is_ok());
        assert!(ensure_amount(MAX_AMOUNT, "amount").is_ok());
        assert_eq!(
            ensure_amount(Money::new(-1), "amount"),
            Err(EngineError::Validation("amount must be >= 0".to_string()))
        );
        assert_eq!(
            ensure_amount(Money::new(MAX_AMOUNT.cents() + 1), "limit"),
            Err(EngineError::Validation(
                "limit must be <= 100000000000.00".to_string()
            ))
        );
    }

    #[test]
    fn contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("Salary"), "%salary%");
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(contains_pattern("a\\b"), "%a\\\\b%");
    }
}
