#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use scholarhub_lib::models::{ContentItem, UserState};

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

pub fn due_in_days(days: i64) -> DateTime<Utc> {
    fixed_now() + Duration::days(days)
}

pub fn user_with_field(field: &str) -> UserState {
    let mut state = UserState::default();
    state.filters.fields = vec![field.to_string()];
    state
}

pub fn plain_items(count: usize) -> Vec<ContentItem> {
    (0..count)
        .map(|i| ContentItem::new().with_id(format!("item-{i}")))
        .collect()
}
