//! # Validation Module
//!
//! Input parsing and validation for the billing and purchase forms.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend                                                     │
//! │  └── Immediate feedback (disabled buttons, inline hints)               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Cart commit (Rust)                                           │
//! │  └── THIS MODULE: names, paid amount, unit costs                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Ledger Store                                                 │
//! │  └── Only ever sees fully built, invariant-holding records             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use std::iter::Peekable;
use std::str::Chars;

use crate::error::ValidationError;
use crate::money::Money;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted customer / supplier / product name.
pub const MAX_NAME_LENGTH: usize = 200;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a counterparty name (customer or supplier).
///
/// ## Rules
/// - Surrounding whitespace is ignored
/// - Must not be blank
/// - At most [`MAX_NAME_LENGTH`] characters
///
/// ## Returns
/// The trimmed name, ready to be stored on the record.
///
/// ```rust
/// use shopkeep_core::validation::validate_counterparty_name;
///
/// assert_eq!(validate_counterparty_name("customer name", "  City Mart ").unwrap(), "City Mart");
/// assert!(validate_counterparty_name("customer name", "   ").is_err());
/// ```
pub fn validate_counterparty_name(field: &str, name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(name.to_string())
}

/// Validates a product name for catalog entries.
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    validate_counterparty_name("product name", name).map(|_| ())
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (matches everything)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Amount Parsing
// =============================================================================

/// Parses a free-form amount typed into a form field.
///
/// Reads the input the way a browser's `parseFloat` does:
/// - surrounding whitespace is ignored
/// - the longest leading decimal number is used (`"12.5kg"` is 12.50)
/// - an exponent is applied when `e`/`E` is followed by digits
///   (`"1.5e2"` is 150.00, `"2e"` is 2.00)
/// - blank or non-numeric input is zero
///
/// The value is rounded half-up to the cent. Negative values are returned
/// as-is so the caller can reject them.
///
/// ## Errors
/// Only when the number does not fit in the money range.
///
/// ```rust
/// use shopkeep_core::validation::parse_amount_input;
///
/// assert_eq!(parse_amount_input("2000").unwrap().cents(), 200_000);
/// assert_eq!(parse_amount_input(" 5545.41 ").unwrap().cents(), 554_541);
/// assert_eq!(parse_amount_input("1e3").unwrap().cents(), 100_000);
/// assert_eq!(parse_amount_input("").unwrap().cents(), 0);
/// assert_eq!(parse_amount_input("abc").unwrap().cents(), 0);
/// assert_eq!(parse_amount_input("-10").unwrap().cents(), -1000);
/// ```
pub fn parse_amount_input(input: &str) -> ValidationResult<Money> {
    let mut chars = input.trim().chars().peekable();

    let negative = match chars.peek() {
        Some('-') => {
            chars.next();
            true
        }
        Some('+') => {
            chars.next();
            false
        }
        _ => false,
    };

    let mut digits: Vec<u8> = Vec::new();
    let mut whole_len: i64 = 0;
    while let Some(digit) = next_digit(&mut chars) {
        digits.push(digit);
        whole_len += 1;
    }
    if chars.peek() == Some(&'.') {
        chars.next();
        while let Some(digit) = next_digit(&mut chars) {
            digits.push(digit);
        }
    }

    if digits.iter().all(|&d| d == 0) {
        return Ok(Money::zero());
    }

    // Digits before this index make up the whole number of cents; the
    // digit at it decides rounding.
    let boundary = whole_len
        .saturating_add(read_exponent(chars))
        .saturating_add(2);
    let digit_at = |idx: i64| {
        usize::try_from(idx)
            .ok()
            .and_then(|i| digits.get(i))
            .map_or(0, |&d| i64::from(d))
    };

    let out_of_range = || ValidationError::OutOfRange {
        field: "amount".to_string(),
    };

    let mut cents: i64 = 0;
    for idx in 0..boundary.max(0) {
        cents = cents
            .checked_mul(10)
            .and_then(|c| c.checked_add(digit_at(idx)))
            .ok_or_else(out_of_range)?;
    }
    if digit_at(boundary) >= 5 {
        cents = cents.checked_add(1).ok_or_else(out_of_range)?;
    }

    Ok(Money::from_cents(if negative { -cents } else { cents }))
}

fn next_digit(chars: &mut Peekable<Chars<'_>>) -> Option<u8> {
    let digit = chars.peek()?.to_digit(10)?;
    chars.next();
    u8::try_from(digit).ok()
}

/// Exponent after the mantissa, or 0 when there is none. `e` without
/// digits after it is not an exponent.
fn read_exponent(mut rest: Peekable<Chars<'_>>) -> i64 {
    if !matches!(rest.next(), Some('e' | 'E')) {
        return 0;
    }

    let negative = match rest.peek() {
        Some('-') => {
            rest.next();
            true
        }
        Some('+') => {
            rest.next();
            false
        }
        _ => false,
    };

    let mut exponent: Option<i64> = None;
    while let Some(digit) = next_digit(&mut rest) {
        exponent = Some(
            exponent
                .unwrap_or(0)
                .saturating_mul(10)
                .saturating_add(i64::from(digit)),
        );
    }

    match exponent {
        Some(e) if negative => -e,
        Some(e) => e,
        None => 0,
    }
}

/// Largest quantity a single cart line may hold.
pub const MAX_LINE_QUANTITY: i64 = 1_000_000;

/// Validates a cart line quantity.
///
/// Zero and negatives are not errors here: the cart treats them as
/// removal.
pub fn validate_quantity(quantity: i64) -> ValidationResult<i64> {
    if quantity > MAX_LINE_QUANTITY {
        return Err(ValidationError::TooLarge {
            field: "quantity".to_string(),
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(quantity)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a paid amount entered at commit time.
///
/// ## Rules
/// - Zero is allowed (nothing paid yet, record is pending)
/// - Overpayment is allowed (remaining goes negative)
/// - Negative is rejected
pub fn validate_paid_amount(amount: Money) -> ValidationResult<Money> {
    if amount.is_negative() {
        return Err(ValidationError::Negative {
            field: "paid amount".to_string(),
        });
    }

    Ok(amount)
}

/// Validates a per-unit cost entered for a purchase line.
///
/// ## Rules
/// - Must be strictly positive
pub fn validate_unit_cost(cost: Money) -> ValidationResult<Money> {
    if !cost.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "cost price".to_string(),
        });
    }

    Ok(cost)
}

// =============================================================================
// Date Validators
// =============================================================================

/// Parses an ISO calendar date (`YYYY-MM-DD`).
pub fn parse_iso_date(field: &str, value: &str) -> ValidationResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e| {
        ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: e.to_string(),
        }
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
