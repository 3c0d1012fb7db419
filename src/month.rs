//! The calendar month used to filter transactions by their sale date.

use std::{fmt::Display, str::FromStr};

use crate::Error;

/// A calendar month, independent of year.
///
/// Months are written as two-digit strings, "01" for January through "12" for
/// December, both in request paths and in the SQL month filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SaleMonth(u8);

impl SaleMonth {
    /// Create a month from its number, 1 for January through 12 for December.
    ///
    /// # Errors
    /// Returns [Error::InvalidMonth] if `month` is not between 1 and 12.
    pub fn new(month: u8) -> Result<Self, Error> {
        if (1..=12).contains(&month) {
            Ok(Self(month))
        } else {
            Err(Error::InvalidMonth(month.to_string()))
        }
    }

    /// The month number, 1 for January through 12 for December.
    pub fn number(self) -> u8 {
        self.0
    }

    /// The two-digit form of the month as produced by SQLite's `strftime('%m', ...)`.
    pub fn as_query_value(self) -> String {
        format!("{:02}", self.0)
    }
}

impl FromStr for SaleMonth {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let is_two_digits = text.len() == 2 && text.bytes().all(|byte| byte.is_ascii_digit());

        if !is_two_digits {
            return Err(Error::InvalidMonth(text.to_owned()));
        }

        text.parse::<u8>()
            .ok()
            .and_then(|month| Self::new(month).ok())
            .ok_or_else(|| Error::InvalidMonth(text.to_owned()))
    }
}

impl Display for SaleMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use crate::Error;

    use super::SaleMonth;

    #[test]
    fn parses_every_two_digit_month() {
        for number in 1..=12u8 {
            let text = format!("{number:02}");

            let month: SaleMonth = text.parse().expect("month should parse");

            assert_eq!(month.number(), number);
            assert_eq!(month.as_query_value(), text);
        }
    }

    #[test]
    fn rejects_out_of_range_months() {
        for text in ["00", "13", "99"] {
            assert_eq!(
                text.parse::<SaleMonth>(),
                Err(Error::InvalidMonth(text.to_owned()))
            );
        }
    }

    #[test]
    fn rejects_malformed_months() {
        for text in ["3", "003", "", "ab", "+3", " 3", "03 "] {
            assert_eq!(
                text.parse::<SaleMonth>(),
                Err(Error::InvalidMonth(text.to_owned())),
                "want {text:?} to be rejected"
            );
        }
    }
}
