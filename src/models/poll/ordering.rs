//! Display order for the poll list.
//!
//! Titles are numbered by convention ("1. Best Staff", "2. Volume Icon"), and
//! polls are shown in that order rather than in payload (creation) order.

use super::types::Poll;

/// Rank given to titles that carry no `<N>.` prefix.
pub const UNNUMBERED_RANK: u64 = 999;

/// Leading `<digits>.` of a title, ignoring leading whitespace.
pub fn title_rank(title: &str) -> u64 {
    let trimmed = title.trim_start();
    let digits_len = trimmed
        .bytes()
        .take_while(|b| b.is_ascii_digit())
        .count();

    if digits_len == 0 || trimmed.as_bytes().get(digits_len) != Some(&b'.') {
        return UNNUMBERED_RANK;
    }

    trimmed[..digits_len].parse().unwrap_or(UNNUMBERED_RANK)
}

/// Sort polls by title rank. The sort is stable, so equal ranks keep the
/// relative order of the source payload.
pub fn sort_polls(polls: &mut [Poll]) {
    polls.sort_by_key(|p| title_rank(&p.title));
}
