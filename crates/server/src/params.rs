//! Conversions between wire values and engine values.

use api_types::{Amount, AmountInput};
use chrono::{DateTime, Utc};
use engine::{EngineError, Money, YearMonth, parse_occurred_at};
use uuid::Uuid;

use crate::ServerError;

pub fn amount(money: Money) -> Amount {
    Amount(money.cents())
}

pub fn parse_amount(input: &AmountInput) -> Result<Money, ServerError> {
    Ok(input.to_string().parse::<Money>()?)
}

pub fn parse_date(raw: &str) -> Result<DateTime<Utc>, ServerError> {
    Ok(parse_occurred_at(raw)?)
}

pub fn parse_month(raw: &str) -> Result<YearMonth, ServerError> {
    Ok(raw.parse::<YearMonth>()?)
}

/// Parses an entity id. An id that is not a UUID cannot name one of the
/// caller's entities, so it is reported as `not_found`.
pub fn parse_id(raw: &str, not_found: &str) -> Result<Uuid, ServerError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| ServerError::Engine(EngineError::KeyNotFound(not_found.to_string())))
}

/// Treats blank query values as absent.
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_accept_numbers_and_strings() {
        assert_eq!(
            parse_amount(&AmountInput::Number(12.5)).unwrap(),
            Money::new(12_50)
        );
        assert_eq!(
            parse_amount(&AmountInput::Text("500".to_string())).unwrap(),
            Money::new(500_00)
        );
        assert!(parse_amount(&AmountInput::Number(1.234)).is_err());
        assert!(parse_amount(&AmountInput::Text("abc".to_string())).is_err());
    }

    #[test]
    fn malformed_id_is_not_found() {
        let err = parse_id("nope", "Budget not found").unwrap_err();
        assert!(matches!(
            err,
            ServerError::Engine(EngineError::KeyNotFound(msg)) if msg == "Budget not found"
        ));
    }

    #[test]
    fn blank_values_are_absent() {
        assert_eq!(non_blank(Some("  ")), None);
        assert_eq!(non_blank(Some(" income ")), Some("income"));
        assert_eq!(non_blank(None), None);
    }
}
