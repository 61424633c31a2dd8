use once_cell::sync::Lazy;
use regex::Regex;

use super::parser::RowError;

static CANONICAL_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("canonical date regex"));

static DAY_MONTH_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{1,2})/([0-9]{1,2})/([0-9]{4})$").expect("day/month/year regex")
});

/// Normalizes a statement date into `YYYY-MM-DD`.
///
/// Dates already in canonical form pass through without a calendar check,
/// `D/M/YYYY` and `DD/MM/YYYY` are reordered and zero padded.
pub fn normalize_date(raw: &str) -> Result<String, RowError> {
    let raw = raw.trim();

    if raw.is_empty() {
        return Err(RowError::InvalidDate);
    }

    if CANONICAL_DATE.is_match(raw) {
        return Ok(raw.to_owned());
    }

    let captures = DAY_MONTH_YEAR
        .captures(raw)
        .ok_or(RowError::InvalidDate)?;

    let day = &captures[1];
    let month = &captures[2];
    let year = &captures[3];

    return Ok(format!("{year}-{month:0>2}-{day:0>2}"));
}

/// Normalizes a statement amount into a signed value with two decimals.
///
/// When both `,` and `.` appear the rightmost one is the decimal separator and
/// the other is dropped as a thousands separator. A lone `,` is a decimal
/// separator. Only an exact zero is rejected, rounding happens after that check.
pub fn normalize_amount(raw: &str) -> Result<f64, RowError> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();

    if compact.is_empty() {
        return Err(RowError::InvalidAmount);
    }

    let canonical = match (compact.rfind(','), compact.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => compact.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => compact.replace(',', ""),
        (Some(_), None) => compact.replace(',', "."),
        _ => compact,
    };

    let value = canonical
        .parse::<f64>()
        .map_err(|_| RowError::InvalidAmount)?;

    if !value.is_finite() {
        return Err(RowError::InvalidAmount);
    }

    if value == 0.0 {
        return Err(RowError::ZeroAmount);
    }

    return Ok(round_amount(value));
}

/// Rounds to cents, half away from zero. Every stored amount goes through this.
pub fn round_amount(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn canonical_date_passes_through() {
        assert_eq!(normalize_date("2024-03-05"), Ok("2024-03-05".to_owned()));
    }

    #[test]
    fn canonical_date_is_not_calendar_checked() {
        assert_eq!(normalize_date("2024-02-30"), Ok("2024-02-30".to_owned()));
    }

    #[test]
    fn day_month_year_is_reordered_and_padded() {
        assert_eq!(normalize_date("5/3/2024"), Ok("2024-03-05".to_owned()));
        assert_eq!(normalize_date("31/12/2023"), Ok("2023-12-31".to_owned()));
        assert_eq!(normalize_date("05/03/2024"), Ok("2024-03-05".to_owned()));
    }

    #[test]
    fn unknown_date_formats_fail() {
        assert_eq!(normalize_date(""), Err(RowError::InvalidDate));
        assert_eq!(normalize_date("garbage"), Err(RowError::InvalidDate));
        assert_eq!(normalize_date("2024/03/05"), Err(RowError::InvalidDate));
        assert_eq!(normalize_date("5-3-2024"), Err(RowError::InvalidDate));
        assert_eq!(normalize_date("5/3/24"), Err(RowError::InvalidDate));
        assert_eq!(normalize_date("123/3/2024"), Err(RowError::InvalidDate));
    }

    #[test]
    fn normalized_date_is_a_fixed_point() {
        let once = normalize_date("7/1/2025").expect("date");
        assert_eq!(normalize_date(&once), Ok(once.clone()));
    }

    #[test]
    fn european_thousands_and_decimal() {
        assert_eq!(normalize_amount("1.234,56"), Ok(1234.56));
    }

    #[test]
    fn english_thousands_and_decimal() {
        assert_eq!(normalize_amount("1,234.56"), Ok(1234.56));
    }

    #[test]
    fn lone_comma_is_decimal_separator() {
        assert_eq!(normalize_amount("50,00"), Ok(50.0));
        assert_eq!(normalize_amount("-45,50"), Ok(-45.5));
    }

    #[test]
    fn plain_numbers_and_whitespace() {
        assert_eq!(normalize_amount("1234.56"), Ok(1234.56));
        assert_eq!(normalize_amount(" 1 234,5 "), Ok(1234.5));
        assert_eq!(normalize_amount("-12"), Ok(-12.0));
    }

    #[test]
    fn rounds_to_cents() {
        assert_eq!(normalize_amount("10,006"), Ok(10.01));
        assert_eq!(normalize_amount("-2.3449"), Ok(-2.34));
    }

    #[test]
    fn zero_is_rejected_separately() {
        assert_eq!(normalize_amount("0"), Err(RowError::ZeroAmount));
        assert_eq!(normalize_amount("0,00"), Err(RowError::ZeroAmount));
        assert_eq!(normalize_amount("-0"), Err(RowError::ZeroAmount));
    }

    #[test]
    fn tiny_amounts_round_down_instead_of_failing() {
        assert_eq!(normalize_amount("0,004"), Ok(0.0));

        let negative = normalize_amount("-0.001").expect("amount");
        assert_eq!(negative, 0.0);
        assert!(negative.is_sign_negative());
    }

    #[test]
    fn unparseable_amounts_fail() {
        assert_eq!(normalize_amount(""), Err(RowError::InvalidAmount));
        assert_eq!(normalize_amount("   "), Err(RowError::InvalidAmount));
        assert_eq!(normalize_amount("abc"), Err(RowError::InvalidAmount));
        assert_eq!(normalize_amount("1,234,56"), Err(RowError::InvalidAmount));
        assert_eq!(normalize_amount("inf"), Err(RowError::InvalidAmount));
        assert_eq!(normalize_amount("NaN"), Err(RowError::InvalidAmount));
    }

    #[test]
    fn normalized_amount_is_a_fixed_point() {
        let once = normalize_amount("1.234,56").expect("amount");
        assert_eq!(normalize_amount(&once.to_string()), Ok(once));
        assert_eq!(round_amount(once), once);
    }
}
