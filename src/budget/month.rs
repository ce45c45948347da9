use time::Month;

use crate::Error;

/// Parse a `YYYY-MM` month such as `2025-03`.
///
/// # Errors
/// Returns [Error::ValidationError] if the text is not a valid month.
pub fn parse_month(text: &str) -> Result<(i32, Month), Error> {
    let invalid = || Error::ValidationError(format!("\"{text}\" is not a month in the form YYYY-MM"));

    let (year, month) = text.trim().split_once('-').ok_or_else(invalid)?;
    if year.len() != 4 || month.len() != 2 {
        return Err(invalid());
    }

    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u8 = month.parse().map_err(|_| invalid())?;
    let month = Month::try_from(month).map_err(|_| invalid())?;

    Ok((year, month))
}
