use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use tagsweep_core::{AppError, AppResult};

/// Date pattern used when none is configured.
pub const DEFAULT_DATE_FORMAT: &str = "dd/MM/yyyy";

/// Validated custom date pattern (`dd/MM/yyyy`, `yyyy-MM-dd HH:mm`, ...).
///
/// Patterns use the invariant-culture custom format tokens: `d`, `dd`,
/// `ddd`, `dddd`, `M`, `MM`, `MMM`, `MMMM`, `yy`, `yyyy`, `H`, `HH`, `h`,
/// `hh`, `m`, `mm`, `s`, `ss` and `tt`. Text in single or double quotes
/// and characters escaped with `\` are literals, as is any non-letter.
///
/// Parsing is exact: the value must render back to the same text with
/// this pattern, so padding, trailing characters and whitespace are all
/// significant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormat {
    pattern: String,
    strftime: String,
    has_time: bool,
}

#[derive(Debug, Default)]
struct PatternFields {
    day: bool,
    month: bool,
    year: bool,
    hour_24: bool,
    hour_12: bool,
    meridiem: bool,
    minute: bool,
    second: bool,
}

impl DateFormat {
    /// Compiles a custom date pattern.
    pub fn new(pattern: impl Into<String>) -> AppResult<Self> {
        let pattern = pattern.into();
        if pattern.trim().is_empty() {
            return Err(AppError::Validation(
                "date format must not be empty".to_owned(),
            ));
        }

        let mut strftime = String::with_capacity(pattern.len() * 2);
        let mut fields = PatternFields::default();
        let chars: Vec<char> = pattern.chars().collect();
        let mut index = 0;

        while index < chars.len() {
            let current = chars[index];
            match current {
                '\'' | '"' => {
                    let closing = chars[index + 1..]
                        .iter()
                        .position(|candidate| *candidate == current)
                        .ok_or_else(|| {
                            AppError::Validation(format!(
                                "date format '{pattern}' has an unterminated quoted literal"
                            ))
                        })?;
                    for literal in &chars[index + 1..index + 1 + closing] {
                        push_literal(&mut strftime, *literal);
                    }
                    index += closing + 2;
                }
                '\\' => {
                    let escaped = chars.get(index + 1).ok_or_else(|| {
                        AppError::Validation(format!(
                            "date format '{pattern}' ends with a dangling escape"
                        ))
                    })?;
                    push_literal(&mut strftime, *escaped);
                    index += 2;
                }
                letter if letter.is_ascii_alphabetic() => {
                    let run = chars[index..]
                        .iter()
                        .take_while(|candidate| **candidate == letter)
                        .count();
                    let specifier = token_specifier(letter, run, &mut fields).ok_or_else(|| {
                        AppError::Validation(format!(
                            "date format '{pattern}' uses unsupported token '{}'",
                            letter.to_string().repeat(run)
                        ))
                    })?;
                    strftime.push_str(specifier);
                    index += run;
                }
                other => {
                    push_literal(&mut strftime, other);
                    index += 1;
                }
            }
        }

        if !(fields.day && fields.month && fields.year) {
            return Err(AppError::Validation(format!(
                "date format '{pattern}' must contain day, month and year tokens"
            )));
        }

        if fields.hour_12 && !fields.meridiem {
            return Err(AppError::Validation(format!(
                "date format '{pattern}' uses a 12-hour token without 'tt'"
            )));
        }

        let has_time = fields.hour_24 || fields.hour_12;
        if !has_time && (fields.minute || fields.second || fields.meridiem) {
            return Err(AppError::Validation(format!(
                "date format '{pattern}' has time tokens without an hour token"
            )));
        }

        if has_time && !fields.minute {
            return Err(AppError::Validation(format!(
                "date format '{pattern}' has an hour token without a minute token"
            )));
        }

        Ok(Self {
            pattern,
            strftime,
            has_time,
        })
    }

    /// Returns the original pattern text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }

    /// Parses `value` strictly against this pattern, as a UTC timestamp.
    ///
    /// Date-only patterns resolve to midnight UTC.
    pub fn parse(&self, value: &str) -> AppResult<DateTime<Utc>> {
        let parsed = if self.has_time {
            NaiveDateTime::parse_from_str(value, &self.strftime)
        } else {
            NaiveDate::parse_from_str(value, &self.strftime)
                .map(|date| date.and_time(NaiveTime::MIN))
        }
        .map_err(|error| {
            AppError::Validation(format!(
                "'{value}' does not match date format '{}': {error}",
                self.pattern
            ))
        })?
        .and_utc();

        if self.format(parsed) != value {
            return Err(AppError::Validation(format!(
                "'{value}' does not match date format '{}' exactly",
                self.pattern
            )));
        }

        Ok(parsed)
    }

    /// Renders `value` with this pattern.
    #[must_use]
    pub fn format(&self, value: DateTime<Utc>) -> String {
        value.format(&self.strftime).to_string()
    }
}

impl Default for DateFormat {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_DATE_FORMAT.to_owned(),
            strftime: "%d/%m/%Y".to_owned(),
            has_time: false,
        }
    }
}

impl FromStr for DateFormat {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::new(value)
    }
}

impl Display for DateFormat {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.pattern.as_str())
    }
}

fn push_literal(strftime: &mut String, literal: char) {
    if literal == '%' {
        strftime.push_str("%%");
    } else {
        strftime.push(literal);
    }
}

fn token_specifier(letter: char, run: usize, fields: &mut PatternFields) -> Option<&'static str> {
    let (specifier, field) = match (letter, run) {
        ('d', 1) => ("%-d", &mut fields.day),
        ('d', 2) => ("%d", &mut fields.day),
        // Weekday names are validated against the date but do not identify it.
        ('d', 3) => return Some("%a"),
        ('d', 4) => return Some("%A"),
        ('M', 1) => ("%-m", &mut fields.month),
        ('M', 2) => ("%m", &mut fields.month),
        ('M', 3) => ("%b", &mut fields.month),
        ('M', 4) => ("%B", &mut fields.month),
        ('y', 2) => ("%y", &mut fields.year),
        ('y', 4) => ("%Y", &mut fields.year),
        ('H', 1) => ("%-H", &mut fields.hour_24),
        ('H', 2) => ("%H", &mut fields.hour_24),
        ('h', 1) => ("%-I", &mut fields.hour_12),
        ('h', 2) => ("%I", &mut fields.hour_12),
        ('m', 1) => ("%-M", &mut fields.minute),
        ('m', 2) => ("%M", &mut fields.minute),
        ('s', 1) => ("%-S", &mut fields.second),
        ('s', 2) => ("%S", &mut fields.second),
        ('t', 2) => ("%p", &mut fields.meridiem),
        _ => return None,
    };

    *field = true;
    Some(specifier)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;

    use super::DateFormat;

    fn format(pattern: &str) -> DateFormat {
        DateFormat::new(pattern).unwrap_or_else(|_| unreachable!())
    }

    #[test]
    fn default_format_is_day_month_year() {
        let parsed = DateFormat::default()
            .parse("01/02/2099")
            .unwrap_or_else(|_| unreachable!());

        assert_eq!(
            parsed,
            Utc.with_ymd_and_hms(2099, 2, 1, 0, 0, 0)
                .single()
                .unwrap_or_else(|| unreachable!())
        );
        assert_eq!(DateFormat::default(), format("dd/MM/yyyy"));
    }

    #[test]
    fn parse_rejects_free_form_values() {
        let format = DateFormat::default();

        for value in [
            "not-a-date",
            "1/02/2099",
            "01/02/2099 ",
            " 01/02/2099",
            "01/02/2099x",
            "31/02/2099",
            "2099-02-01",
            "01/02/99",
            "",
        ] {
            assert!(format.parse(value).is_err(), "'{value}' should be rejected");
        }
    }

    #[test]
    fn single_letter_tokens_accept_unpadded_values() {
        let format = format("d/M/yyyy");

        assert!(format.parse("1/2/2099").is_ok());
        assert!(format.parse("01/02/2099").is_err());
    }

    #[test]
    fn time_tokens_are_parsed() {
        let parsed = format("yyyy-MM-dd HH:mm")
            .parse("2099-01-31 17:45")
            .unwrap_or_else(|_| unreachable!());

        assert_eq!(
            parsed,
            Utc.with_ymd_and_hms(2099, 1, 31, 17, 45, 0)
                .single()
                .unwrap_or_else(|| unreachable!())
        );
    }

    #[test]
    fn quoted_and_escaped_literals_are_kept() {
        let format = format("'day' dd \\o\\f MM, yyyy %");

        assert!(format.parse("day 03 of 04, 2099 %").is_ok());
    }

    #[test]
    fn invalid_patterns_are_rejected() {
        for pattern in [
            "",
            "dd/MM",
            "dd/MM/yyy",
            "dd/MM/yyyy hh:mm",
            "dd/MM/yyyy mm",
            "dd/MM/yyyy 'open",
            "dd/MM/yyyy \\",
            "dd/MM/yyyy zz",
            "yyyy-MM-dd HH",
            "yyyy-MM-dd HH:ss",
            "dd/MM/yyyy h tt",
        ] {
            assert!(
                DateFormat::new(pattern).is_err(),
                "'{pattern}' should be rejected"
            );
        }
    }

    proptest! {
        #[test]
        fn formatted_dates_parse_back_to_the_same_instant(
            year in 1970_i32..2200,
            month in 1_u32..=12,
            day in 1_u32..=28,
            hour in 0_u32..24,
            minute in 0_u32..60,
        ) {
            for (pattern, with_time) in [
                ("dd/MM/yyyy", false),
                ("d-M-yyyy", false),
                ("dd MMM yyyy", false),
                ("yyyy-MM-dd HH:mm", true),
                ("dd/MM/yyyy hh:mm tt", true),
            ] {
                let format = format(pattern);
                let instant = if with_time {
                    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
                } else {
                    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
                }
                .single()
                .unwrap_or_else(|| unreachable!());

                let rendered = format.format(instant);
                let reparsed = format.parse(&rendered);
                prop_assert!(reparsed.is_ok(), "{} failed for {}", pattern, rendered);
                prop_assert_eq!(reparsed.unwrap_or_else(|_| unreachable!()), instant);
            }
        }
    }
}
