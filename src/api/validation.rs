use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::ApiError;

pub fn validate_username(username: &str) -> Result<&str, ApiError> {
    let trimmed = username.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Username is required"));
    }
    if trimmed.len() > 255 {
        return Err(ApiError::validation(
            "Username must be 255 characters or less",
        ));
    }
    Ok(trimmed)
}

pub fn validate_email(email: &str) -> Result<&str, ApiError> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Email is required"));
    }
    if trimmed.len() > 255 {
        return Err(ApiError::validation("Email must be 255 characters or less"));
    }

    let mut parts = trimmed.splitn(2, '@');
    let local = parts.next().unwrap_or_default();
    let domain = parts.next().unwrap_or_default();
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(ApiError::validation("Email address is not valid"));
    }

    Ok(trimmed)
}

pub fn validate_password(password: &str) -> Result<&str, ApiError> {
    if password.len() < 6 {
        return Err(ApiError::validation(
            "Password must be at least 6 characters",
        ));
    }
    Ok(password)
}

pub fn validate_passwords_match(password: &str, confirmation: &str) -> Result<(), ApiError> {
    if password == confirmation {
        Ok(())
    } else {
        Err(ApiError::validation("Passwords do not match"))
    }
}

pub fn validate_equipment_name(name: &str) -> Result<&str, ApiError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Equipment name is required"));
    }
    if trimmed.len() > 255 {
        return Err(ApiError::validation(
            "Equipment name must be 255 characters or less",
        ));
    }
    Ok(trimmed)
}

pub fn validate_description(description: Option<&str>) -> Result<Option<String>, ApiError> {
    match description {
        None => Ok(None),
        Some(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            if trimmed.len() > 1000 {
                return Err(ApiError::validation(
                    "Description must be 1000 characters or less",
                ));
            }
            Ok(Some(trimmed.to_string()))
        }
    }
}

/// Purchase price arrives as a string and must parse to a non-negative
/// decimal.
pub fn validate_price(price: &str) -> Result<Decimal, ApiError> {
    let parsed: Decimal = price
        .trim()
        .parse()
        .map_err(|_| ApiError::validation("Purchase price must be a number"))?;

    if parsed.is_sign_negative() {
        return Err(ApiError::validation("Purchase price cannot be negative"));
    }

    Ok(parsed)
}

/// Reservation dates use ISO calendar-date format (YYYY-MM-DD)
pub fn validate_reservation_date(date: &str) -> Result<NaiveDate, ApiError> {
    date.trim()
        .parse()
        .map_err(|_| ApiError::validation("Reservation date is not a valid date"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username() {
        assert!(validate_username("alice").is_ok());
        assert_eq!(validate_username("  alice  ").unwrap(), "alice");
        assert!(validate_username("").is_err());
        assert!(validate_username("   ").is_err());
        assert!(validate_username(&"a".repeat(256)).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("alice@example.com").is_ok());
        assert!(validate_email("a.b+c@sub.example.co").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("alice@").is_err());
        assert!(validate_email("alice@nodot").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("secret").is_ok());
        assert!(validate_password("12345").is_err());
        assert!(validate_passwords_match("abc123", "abc123").is_ok());
        assert!(validate_passwords_match("abc123", "abc124").is_err());
    }

    #[test]
    fn test_validate_price() {
        assert_eq!(validate_price("0").unwrap(), Decimal::ZERO);
        assert!(validate_price("198.00").is_ok());
        assert!(validate_price(" 42 ").is_ok());
        assert!(validate_price("-0.01").is_err());
        assert!(validate_price("free").is_err());
        assert!(validate_price("").is_err());
    }

    #[test]
    fn test_validate_reservation_date() {
        assert!(validate_reservation_date("2025-06-01").is_ok());
        assert!(validate_reservation_date(" 2025-06-01 ").is_ok());
        assert!(validate_reservation_date("2025-02-30").is_err());
        assert!(validate_reservation_date("06/01/2025").is_err());
        assert!(validate_reservation_date("").is_err());
    }

    #[test]
    fn test_validate_description() {
        assert_eq!(validate_description(None).unwrap(), None);
        assert_eq!(validate_description(Some("  ")).unwrap(), None);
        assert_eq!(
            validate_description(Some(" a bench supply ")).unwrap().as_deref(),
            Some("a bench supply")
        );
        assert!(validate_description(Some(&"x".repeat(1001))).is_err());
    }
}
