use time::{Date, Month, OffsetDateTime};

/// Calendar month arithmetic, the day is clamped to the length of the target month
/// (`Jan 31 + 1 month = Feb 28/29`).
pub fn add_months(start: OffsetDateTime, months: u32) -> Option<OffsetDateTime> {
    let month_index = start.month() as i64 - 1 + i64::from(months);
    let year = i32::try_from(i64::from(start.year()) + month_index / 12).ok()?;
    let month = Month::try_from(u8::try_from(month_index % 12 + 1).ok()?).ok()?;

    let day = start.day().min(time::util::days_in_year_month(year, month));
    let date = Date::from_calendar_date(year, month, day).ok()?;

    Some(start.replace_date(date))
}

/// `(now, now + months)`, the end optionally capped by the validity of the signing issuer
pub fn validity_period(
    now: OffsetDateTime,
    months: u32,
    cap: Option<OffsetDateTime>,
) -> Option<(OffsetDateTime, OffsetDateTime)> {
    let not_after = add_months(now, months)?;
    let not_after = cap.map_or(not_after, |cap| not_after.min(cap));

    (now < not_after).then_some((now, not_after))
}
