//! Date recognition for text content
//!
//! Recognizes a date (with optional time of day) at the start of a string.
//! Formats are tried in a fixed order and the first full match wins:
//!
//! | Order | Format | Example |
//! |---|---|---|
//! | 1 | `DD.MM.YYYY` | `05.03.2024 14:30` |
//! | 2 | `YYYY-MM-DD` | `2024-03-05T14:30:00` |
//! | 3 | `DD/MM/YYYY` | `05/03/2024` |
//! | 4 | `DD Month YYYY` | `5 March 2024`, `5 марта 2024 г.` |
//! | 5 | `Month DD, YYYY` | `March 5, 2024` |
//!
//! Month names are matched case-insensitively in English and Russian, full
//! or abbreviated, including Russian genitive forms.

/// A calendar date with time of day
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct DateTime {
    pub year: i32,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl DateTime {
    /// Build a validated date at midnight
    pub fn from_ymd(year: i32, month: u8, day: u8) -> Option<Self> {
        if !(1..=12).contains(&month) || day == 0 || day > days_in_month(year, month) {
            return None;
        }
        Some(DateTime {
            year,
            month,
            day,
            ..Default::default()
        })
    }

    /// Attach a validated time of day
    pub fn with_hms(self, hour: u8, minute: u8, second: u8) -> Option<Self> {
        if hour > 23 || minute > 59 || second > 59 {
            return None;
        }
        Some(DateTime {
            hour,
            minute,
            second,
            ..self
        })
    }
}

/// Number of days in a month, honouring Gregorian leap years
pub fn days_in_month(year: i32, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if (year % 4 == 0 && year % 100 != 0) || year % 400 == 0 => 29,
        2 => 28,
        _ => 0,
    }
}

/// Month names: (prefix that must match, minimum prefix length, month)
const MONTH_NAMES: &[(&str, usize, u8)] = &[
    ("january", 3, 1),
    ("february", 3, 2),
    ("march", 3, 3),
    ("april", 3, 4),
    ("may", 3, 5),
    ("june", 3, 6),
    ("july", 3, 7),
    ("august", 3, 8),
    ("september", 3, 9),
    ("october", 3, 10),
    ("november", 3, 11),
    ("december", 3, 12),
    ("январь", 3, 1),
    ("января", 3, 1),
    ("февраль", 3, 2),
    ("февраля", 3, 2),
    ("марта", 3, 3),
    ("март", 3, 3),
    ("апреля", 3, 4),
    ("апрель", 3, 4),
    ("мая", 3, 5),
    ("май", 3, 5),
    ("июня", 3, 6),
    ("июнь", 3, 6),
    ("июля", 3, 7),
    ("июль", 3, 7),
    ("августа", 3, 8),
    ("август", 3, 8),
    ("сентября", 3, 9),
    ("сентябрь", 3, 9),
    ("октября", 3, 10),
    ("октябрь", 3, 10),
    ("ноября", 3, 11),
    ("ноябрь", 3, 11),
    ("декабря", 3, 12),
    ("декабрь", 3, 12),
];

/// Recognize a date at the start of `text` (after leading whitespace).
///
/// Returns the date and the number of bytes consumed, including the
/// skipped whitespace.
pub fn parse_date_prefix(text: &str) -> Option<(DateTime, usize)> {
    let skipped = text.len() - text.trim_start().len();
    let input = &text[skipped..];

    const FORMATS: &[fn(&mut Cursor<'_>) -> Option<DateTime>] = &[
        dotted_dmy,
        iso_ymd,
        slashed_dmy,
        day_month_name_year,
        month_name_day_year,
    ];

    FORMATS.iter().find_map(|format| {
        let mut cursor = Cursor::new(input);
        let date = format(&mut cursor)?;
        let date = time_suffix(&mut cursor, date)?;
        Some((date, skipped + cursor.pos))
    })
}

/// `DD.MM.YYYY`
fn dotted_dmy(c: &mut Cursor<'_>) -> Option<DateTime> {
    let day = c.number(1, 2)?;
    c.literal(".")?;
    let month = c.number(1, 2)?;
    c.literal(".")?;
    let year = c.number(4, 4)?;
    DateTime::from_ymd(year as i32, month as u8, day as u8)
}

/// `YYYY-MM-DD`
fn iso_ymd(c: &mut Cursor<'_>) -> Option<DateTime> {
    let year = c.number(4, 4)?;
    c.literal("-")?;
    let month = c.number(1, 2)?;
    c.literal("-")?;
    let day = c.number(1, 2)?;
    DateTime::from_ymd(year as i32, month as u8, day as u8)
}

/// `DD/MM/YYYY`
fn slashed_dmy(c: &mut Cursor<'_>) -> Option<DateTime> {
    let day = c.number(1, 2)?;
    c.literal("/")?;
    let month = c.number(1, 2)?;
    c.literal("/")?;
    let year = c.number(4, 4)?;
    DateTime::from_ymd(year as i32, month as u8, day as u8)
}

/// `DD Month YYYY`, with an optional Russian year marker `г.`
fn day_month_name_year(c: &mut Cursor<'_>) -> Option<DateTime> {
    let day = c.number(1, 2)?;
    c.spaces(1)?;
    let month = c.month_name()?;
    let _ = c.literal(".");
    c.spaces(1)?;
    let year = c.number(4, 4)?;
    let date = DateTime::from_ymd(year as i32, month, day as u8)?;
    let mark = c.pos;
    if c.spaces(0).and_then(|_| c.literal("г")).is_some() {
        let _ = c.literal(".");
    } else {
        c.pos = mark;
    }
    Some(date)
}

/// `Month DD, YYYY`
fn month_name_day_year(c: &mut Cursor<'_>) -> Option<DateTime> {
    let month = c.month_name()?;
    let _ = c.literal(".");
    c.spaces(1)?;
    let day = c.number(1, 2)?;
    c.literal(",")?;
    c.spaces(0)?;
    let year = c.number(4, 4)?;
    DateTime::from_ymd(year as i32, month, day as u8)
}

/// Optional ` HH:MM[:SS]` or `THH:MM[:SS]` suffix. An absent or malformed
/// time leaves the date at midnight and the cursor untouched; an
/// out-of-range time rejects the whole match.
fn time_suffix(c: &mut Cursor<'_>, date: DateTime) -> Option<DateTime> {
    let mark = c.pos;
    let separated = c.literal("T").is_some() || c.spaces(1).is_some();
    if !separated {
        return Some(date);
    }
    let Some((hour, minute)) = c
        .number(1, 2)
        .and_then(|h| c.literal(":").and_then(|_| c.number(2, 2)).map(|m| (h, m)))
    else {
        c.pos = mark;
        return Some(date);
    };
    let before_seconds = c.pos;
    let second = match c.literal(":").and_then(|_| c.number(2, 2)) {
        Some(s) => s,
        None => {
            c.pos = before_seconds;
            0
        }
    };
    date.with_hms(hour as u8, minute as u8, second as u8)
}

/// Minimal position-tracking reader over the candidate text
struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Cursor { input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    /// Read between `min` and `max` ASCII digits; fails when followed by
    /// another digit so "123.4.2020" is not read as day 12
    fn number(&mut self, min: usize, max: usize) -> Option<u32> {
        let digits = self
            .rest()
            .bytes()
            .take_while(u8::is_ascii_digit)
            .count();
        if digits < min || digits > max {
            return None;
        }
        let value = self.rest()[..digits].parse().ok()?;
        self.pos += digits;
        Some(value)
    }

    fn literal(&mut self, lit: &str) -> Option<()> {
        if self.rest().starts_with(lit) {
            self.pos += lit.len();
            Some(())
        } else {
            None
        }
    }

    /// Skip at least `min` spaces (including non-breaking spaces)
    fn spaces(&mut self, min: usize) -> Option<()> {
        let mut count = 0;
        for c in self.rest().chars() {
            if c == ' ' || c == '\t' || c == '\u{00A0}' {
                self.pos += c.len_utf8();
                count += 1;
            } else {
                break;
            }
        }
        (count >= min).then_some(())
    }

    /// Read a month name or abbreviation (longest matching word)
    fn month_name(&mut self) -> Option<u8> {
        let word_len: usize = self
            .rest()
            .chars()
            .take_while(|c| c.is_alphabetic())
            .map(char::len_utf8)
            .sum();
        let word = self.rest()[..word_len].to_lowercase();
        let chars = word.chars().count();

        let month = MONTH_NAMES.iter().find_map(|&(name, min, month)| {
            (chars >= min && name.starts_with(word.as_str())).then_some(month)
        })?;
        self.pos += word_len;
        Some(month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn ymd(year: i32, month: u8, day: u8) -> DateTime {
        DateTime::from_ymd(year, month, day).unwrap()
    }

    #[rstest]
    #[case("05.03.2024", ymd(2024, 3, 5), 10)]
    #[case("2024-03-05", ymd(2024, 3, 5), 10)]
    #[case("5/3/2024 rest", ymd(2024, 3, 5), 8)]
    #[case("  29.02.2024", ymd(2024, 2, 29), 12)]
    #[case("5 March 2024", ymd(2024, 3, 5), 12)]
    #[case("17 Sep 2021.", ymd(2021, 9, 17), 11)]
    #[case("3 марта 2020 г. далее", ymd(2020, 3, 3), "3 марта 2020 г.".len())]
    #[case("March 5, 2024", ymd(2024, 3, 5), 13)]
    fn test_formats(#[case] text: &str, #[case] expected: DateTime, #[case] consumed: usize) {
        assert_eq!(parse_date_prefix(text), Some((expected, consumed)));
    }

    #[rstest]
    #[case("05.03.2024 14:30", 14, 30, 0, 16)]
    #[case("2024-03-05T08:15:45", 8, 15, 45, 19)]
    fn test_time_suffix(
        #[case] text: &str,
        #[case] hour: u8,
        #[case] minute: u8,
        #[case] second: u8,
        #[case] consumed: usize,
    ) {
        let (date, used) = parse_date_prefix(text).unwrap();
        assert_eq!((date.hour, date.minute, date.second), (hour, minute, second));
        assert_eq!(used, consumed);
    }

    #[test]
    fn test_trailing_word_is_not_time() {
        let (date, used) = parse_date_prefix("05.03.2024 at noon").unwrap();
        assert_eq!(date, ymd(2024, 3, 5));
        assert_eq!(used, 10);
    }

    #[rstest]
    #[case("")]
    #[case("no date here")]
    #[case("31.02.2024")]
    #[case("29.02.2023")]
    #[case("2024-13-01")]
    #[case("123.04.2024")]
    #[case("05.03.2024 25:00")]
    fn test_rejected(#[case] text: &str) {
        assert_eq!(parse_date_prefix(text), None);
    }
}
