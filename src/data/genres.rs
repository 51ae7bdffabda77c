//! Genre list parsing.
//!
//! The `genres` column stores a serialized list such as `['pop', 'dance pop']`.
//! Grammar accepted here:
//!
//! ```text
//! list  := ws '['* items ']'* ws
//! items := item (',' item)*
//! item  := ws quote* text quote* ws      quote := '\'' | '"'
//! ```
//!
//! Parsing is total: anything that does not fit degrades to fewer tokens,
//! never to an error. Empty items are dropped, so `[]`, a blank cell and a
//! missing cell all produce zero tokens.

use super::model::{value_counts, Track, TrackTable};

const QUOTES: [char; 2] = ['\'', '"'];
const BRACKETS: [char; 2] = ['[', ']'];

/// Borrowing token iterator over one serialized genre list.
pub fn tokens(raw: &str) -> impl Iterator<Item = &str> + '_ {
    let body = raw.trim().trim_matches(BRACKETS).trim();
    body.split(',')
        .map(|piece| piece.trim().trim_matches(QUOTES).trim())
        .filter(|piece| !piece.is_empty())
}

/// Parse a possibly-missing serialized list into owned tokens.
pub fn parse(raw: Option<&str>) -> Vec<String> {
    raw.map(|r| tokens(r).map(str::to_string).collect())
        .unwrap_or_default()
}

/// Genre tokens of one track.
pub fn track_genres(track: &Track) -> impl Iterator<Item = &str> + '_ {
    tokens(track.genres.as_deref().unwrap_or_default())
}

/// First genre token of a track, if any.
pub fn primary_genre(track: &Track) -> Option<&str> {
    track_genres(track).next()
}

/// One row per (genre token, track) pair. Tracks without tokens vanish.
pub fn explode(table: &TrackTable) -> Vec<(&str, &Track)> {
    table
        .iter()
        .flat_map(|track| track_genres(track).map(move |genre| (genre, track)))
        .collect()
}

/// Token frequencies, most frequent first; ties keep first appearance.
pub fn genre_frequencies<'a>(tokens: impl IntoIterator<Item = &'a str>) -> Vec<(String, usize)> {
    value_counts(tokens)
        .into_iter()
        .map(|(genre, n)| (genre.to_string(), n))
        .collect()
}

/// The `n` most frequent genres among exploded rows.
pub fn top_genres<'a>(exploded: &[(&'a str, &Track)], n: usize) -> Vec<&'a str> {
    value_counts(exploded.iter().map(|(genre, _)| *genre))
        .into_iter()
        .take(n)
        .map(|(genre, _)| genre)
        .collect()
}
