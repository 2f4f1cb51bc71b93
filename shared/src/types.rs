pub type Tick = u32;

/// Number of ticks elapsed from `since` up to `now`.
///
/// Uses wrapping arithmetic, so a `since` that lies in the future of `now`
/// reads as an enormous distance rather than a negative one. Callers that
/// compare the result against a window size therefore treat such ticks as
/// expired.
///
/// ```
/// # use sightline_shared::ticks_since;
/// assert_eq!(ticks_since(10, 12), 2);
/// assert_eq!(ticks_since(12, 12), 0);
/// assert_eq!(ticks_since(13, 12), u32::MAX);
/// ```
pub fn ticks_since(since: Tick, now: Tick) -> u32 {
    now.wrapping_sub(since)
}

const HALF_RANGE: u32 = u32::MAX / 2 + 1;

/// Returns whether tick `a` comes after tick `b`, accounting for wraparound.
/// Ticks more than half the range apart are read the other way round.
/// tick_greater_than(2, 1) will return true
/// tick_greater_than(1, 2) will return false
/// tick_greater_than(1, 1) will return false
/// tick_greater_than(0, u32::MAX) will return true
pub fn tick_greater_than(a: Tick, b: Tick) -> bool {
    ((a > b) && (a - b <= HALF_RANGE)) || ((a < b) && (b - a > HALF_RANGE))
}
