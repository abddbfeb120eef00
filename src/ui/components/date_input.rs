use chrono::{Datelike, NaiveDate};
use crossterm::event::KeyCode;

use crate::models::parse_birthday;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DatePart {
    Year,
    Month,
    Day,
}

// Date typed in one segment at a time. Starts out blank for new clients.
pub struct DateInputState {
    pub date: Option<NaiveDate>,
    pub editing: bool,
    pub date_part: DatePart,
    pub current_date_input: String,
    anchor: NaiveDate,
}

impl DateInputState {
    /// `anchor` is the date the segments start from when the field is blank
    pub fn new(date: Option<NaiveDate>, anchor: NaiveDate) -> Self {
        Self {
            date,
            editing: false,
            date_part: DatePart::Year,
            current_date_input: String::new(),
            anchor,
        }
    }

    pub fn from_birthday(birthday: &str, anchor: NaiveDate) -> Self {
        Self::new(parse_birthday(birthday), anchor)
    }

    /// The stored form of the date, empty when nothing has been entered
    pub fn value(&self) -> String {
        self.date
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
        if self.editing {
            self.date_part = DatePart::Year;
            self.current_date_input.clear();
        }
    }

    pub fn next_date_part(&mut self) {
        self.date_part = match self.date_part {
            DatePart::Year => DatePart::Month,
            DatePart::Month => DatePart::Day,
            DatePart::Day => DatePart::Year,
        };
        self.current_date_input.clear();
    }

    pub fn previous_date_part(&mut self) {
        self.date_part = match self.date_part {
            DatePart::Year => DatePart::Day,
            DatePart::Month => DatePart::Year,
            DatePart::Day => DatePart::Month,
        };
        self.current_date_input.clear();
    }

    pub fn handle_input(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }

        match key {
            KeyCode::Char(c) if c.is_ascii_digit() => self.push_digit(c),
            KeyCode::Backspace => {
                self.current_date_input.pop();
            }
            KeyCode::Delete => {
                self.date = None;
                self.current_date_input.clear();
            }
            KeyCode::Right => self.next_date_part(),
            KeyCode::Left => self.previous_date_part(),
            _ => {}
        }
    }

    fn push_digit(&mut self, c: char) {
        let base = self.date.unwrap_or(self.anchor);
        let (year, month, day) = (base.year(), base.month(), base.day());
        self.current_date_input.push(c);

        let width = match self.date_part {
            DatePart::Year => 4,
            DatePart::Month | DatePart::Day => 2,
        };
        if self.current_date_input.len() < width {
            return;
        }

        let candidate = match self.date_part {
            DatePart::Year => self
                .current_date_input
                .parse::<i32>()
                .ok()
                .filter(|y| (1900..=2100).contains(y))
                .and_then(|y| NaiveDate::from_ymd_opt(y, month, day.min(days_in_month(y, month)))),
            DatePart::Month => self
                .current_date_input
                .parse::<u32>()
                .ok()
                .filter(|m| (1..=12).contains(m))
                .and_then(|m| NaiveDate::from_ymd_opt(year, m, day.min(days_in_month(year, m)))),
            DatePart::Day => self
                .current_date_input
                .parse::<u32>()
                .ok()
                .filter(|d| (1..=days_in_month(year, month)).contains(d))
                .and_then(|d| NaiveDate::from_ymd_opt(year, month, d)),
        };

        if let Some(date) = candidate {
            self.date = Some(date);
            self.next_date_part();
        }
        self.current_date_input.clear();
    }

    pub fn get_display_string(&self) -> String {
        let Some(date) = self.date else {
            return if self.editing {
                format!("[{}]", self.placeholder())
            } else {
                String::new()
            };
        };

        let date_str = date.format("%Y-%m-%d").to_string();
        if !self.editing {
            return date_str;
        }

        let (year, month, day) = (&date_str[0..4], &date_str[5..7], &date_str[8..10]);
        let current_input = format!("[{}]", self.placeholder());

        match self.date_part {
            DatePart::Year => format!("{}{}-{}-{}", year, current_input, month, day),
            DatePart::Month => format!("{}-{}{}-{}", year, month, current_input, day),
            DatePart::Day => format!("{}-{}-{}{}", year, month, day, current_input),
        }
    }

    fn placeholder(&self) -> String {
        if !self.current_date_input.is_empty() {
            return self.current_date_input.clone();
        }
        match self.date_part {
            DatePart::Year => "YYYY".to_string(),
            DatePart::Month => "MM".to_string(),
            DatePart::Day => "DD".to_string(),
        }
    }
}

// Number of days in a month, leap years included
fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0) {
                29
            } else {
                28
            }
        }
        _ => 30,
    }
}
