//! Field validators for the five form parameters.
//!
//! Each validator takes the raw widget value and returns the typed value or
//! a `FieldError` whose `Display` text is the message shown under the field.
//! Numeric fields have all whitespace removed before parsing, so `"5 000"`
//! reads as `5000`.

use std::ops::RangeInclusive;

use thiserror::Error;

use crate::text_utils::strip_whitespace;

pub const KILOMETERS_RANGE: RangeInclusive<i64> = 5000..=30000;
pub const MIN_YEAR: i64 = 1960;
pub const PASSENGER_RANGE: RangeInclusive<i64> = 1..=4;

/// The form parameters, in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Energy,
    Kilometers,
    CarType,
    Year,
    PassengerCount,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Energy,
        Field::Kilometers,
        Field::CarType,
        Field::Year,
        Field::PassengerCount,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Field::Energy => "energy",
            Field::Kilometers => "kilometers",
            Field::CarType => "car_type",
            Field::Year => "year",
            Field::PassengerCount => "passenger_count",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("Veuillez choisir une option.")]
    NotSelected,

    #[error("Ce champ est obligatoire.")]
    Empty,

    #[error("Veuillez entrer un nombre entier.")]
    NotANumber,

    #[error("La valeur doit être comprise entre {min} et {max}.")]
    OutOfRange { min: i64, max: i64 },

    #[error("La valeur doit être supérieure ou égale à {min}.")]
    TooSmall { min: i64 },
}

/// A dropdown value: present means the user picked one of the options.
pub fn validate_choice(value: Option<&str>) -> Result<String, FieldError> {
    match value {
        None => Err(FieldError::NotSelected),
        Some(v) if v.trim().is_empty() => Err(FieldError::Empty),
        Some(v) => Ok(v.to_string()),
    }
}

/// Whitespace-insensitive integer parse shared by the numeric fields.
pub fn parse_integer(value: Option<&str>) -> Result<i64, FieldError> {
    let digits = strip_whitespace(value.unwrap_or_default());
    if digits.is_empty() {
        return Err(FieldError::Empty);
    }
    digits.parse::<i64>().map_err(|_| FieldError::NotANumber)
}

fn in_range(n: i64, range: &RangeInclusive<i64>) -> Result<i64, FieldError> {
    if range.contains(&n) {
        Ok(n)
    } else {
        Err(FieldError::OutOfRange {
            min: *range.start(),
            max: *range.end(),
        })
    }
}

pub fn validate_kilometers(value: Option<&str>) -> Result<u32, FieldError> {
    let n = in_range(parse_integer(value)?, &KILOMETERS_RANGE)?;
    u32::try_from(n).map_err(|_| FieldError::NotANumber)
}

pub fn validate_year(value: Option<&str>) -> Result<i32, FieldError> {
    let n = parse_integer(value)?;
    if n < MIN_YEAR {
        return Err(FieldError::TooSmall { min: MIN_YEAR });
    }
    i32::try_from(n).map_err(|_| FieldError::NotANumber)
}

pub fn validate_passenger_count(value: Option<&str>) -> Result<u8, FieldError> {
    let n = in_range(parse_integer(value)?, &PASSENGER_RANGE)?;
    u8::try_from(n).map_err(|_| FieldError::NotANumber)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kilometers_boundaries() {
        assert_eq!(validate_kilometers(Some("5000")), Ok(5000));
        assert_eq!(validate_kilometers(Some("30000")), Ok(30000));
        assert_eq!(
            validate_kilometers(Some("4999")),
            Err(FieldError::OutOfRange {
                min: 5000,
                max: 30000
            })
        );
        assert!(validate_kilometers(Some("30001")).is_err());
        assert_eq!(validate_kilometers(Some("5 000")), Ok(5000));
    }

    #[test]
    fn test_numeric_fields_reject_empty_and_garbage() {
        assert_eq!(validate_kilometers(Some("")), Err(FieldError::Empty));
        assert_eq!(validate_kilometers(Some("   ")), Err(FieldError::Empty));
        assert_eq!(validate_kilometers(None), Err(FieldError::Empty));
        assert_eq!(validate_kilometers(Some("12k")), Err(FieldError::NotANumber));
        assert_eq!(validate_year(Some("20.15")), Err(FieldError::NotANumber));
        assert_eq!(
            validate_passenger_count(Some("deux")),
            Err(FieldError::NotANumber)
        );
    }

    #[test]
    fn test_year_lower_bound_only() {
        assert_eq!(validate_year(Some("1960")), Ok(1960));
        assert_eq!(
            validate_year(Some("1959")),
            Err(FieldError::TooSmall { min: 1960 })
        );
        assert_eq!(validate_year(Some("2 024")), Ok(2024));
        assert_eq!(validate_year(Some("99999999999")), Err(FieldError::NotANumber));
    }

    #[test]
    fn test_passenger_count_range() {
        assert_eq!(validate_passenger_count(Some("1")), Ok(1));
        assert_eq!(validate_passenger_count(Some("4")), Ok(4));
        assert!(validate_passenger_count(Some("0")).is_err());
        assert!(validate_passenger_count(Some("5")).is_err());
        assert!(validate_passenger_count(Some("-1")).is_err());
    }

    #[test]
    fn test_choice_requires_selection() {
        assert_eq!(validate_choice(None), Err(FieldError::NotSelected));
        assert_eq!(validate_choice(Some("")), Err(FieldError::Empty));
        assert_eq!(validate_choice(Some("Diesel")), Ok("Diesel".to_string()));
    }

    #[test]
    fn test_messages_are_user_facing() {
        assert_eq!(FieldError::Empty.to_string(), "Ce champ est obligatoire.");
        assert_eq!(
            FieldError::OutOfRange { min: 1, max: 4 }.to_string(),
            "La valeur doit être comprise entre 1 et 4."
        );
    }

    #[test]
    fn test_field_order_and_keys() {
        let keys: Vec<_> = Field::ALL.iter().map(|f| f.key()).collect();
        assert_eq!(
            keys,
            vec!["energy", "kilometers", "car_type", "year", "passenger_count"]
        );
    }
}
