mod birthday;
mod client;

pub use birthday::{month_day_key, parse_birthday, today_query};
pub use client::{ClientDraft, ClientId, ClientRecord};
