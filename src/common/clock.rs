use time::OffsetDateTime;

/// Current UTC time truncated to microseconds, the finest precision every
/// supported dialect stores without rounding.
pub fn now_utc() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    now.replace_nanosecond(now.nanosecond() / 1_000 * 1_000)
        .unwrap_or(now)
}
