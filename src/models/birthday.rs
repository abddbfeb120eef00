use chrono::NaiveDate;

/// Strips the leading year component from an ISO date string.
///
/// `"1990-01-01"` becomes `"01-01"`. Strings without a `-` yield an empty key.
pub fn month_day_key(date: &str) -> String {
    date.split('-').skip(1).collect::<Vec<_>>().join("-")
}

/// The month-day string the "Today's Birthdays" shortcut feeds into search.
pub fn today_query(today: NaiveDate) -> String {
    today.format("%m-%d").to_string()
}

/// Parses a stored birthday, if it holds a real calendar date.
pub fn parse_birthday(birthday: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(birthday, "%Y-%m-%d").ok()
}
