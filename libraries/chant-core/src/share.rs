//! Shareable song links
//!
//! Links carry the song id in the `song` query parameter (or in the fragment
//! for fragment-style deployments) and an optional start offset in seconds in
//! `t`, e.g. `https://chants.example.com/?song=42&t=73.5`.

use std::time::Duration;

use url::Url;

use crate::error::Result;
use crate::types::TrackId;

const SONG_PARAM: &str = "song";
const TIMESTAMP_PARAM: &str = "t";

/// Song reference extracted from a share link
#[derive(Debug, Clone, PartialEq)]
pub struct SongLink {
    /// Linked track
    pub song_id: TrackId,
    /// Position to start from, if the link carried one
    pub timestamp: Option<Duration>,
}

/// Build a share link for `song_id` on top of `base`
///
/// When `base` already uses a fragment and has no `song` query parameter the
/// id goes into the fragment, otherwise into the query. A zero timestamp is
/// left out.
pub fn song_link(base: &str, song_id: &TrackId, timestamp: Option<Duration>) -> Result<String> {
    let mut url = Url::parse(base)?;

    let has_song_param = url.query_pairs().any(|(name, _)| name == SONG_PARAM);
    let fragment_style = url.fragment().is_some_and(|f| !f.is_empty()) && !has_song_param;

    if fragment_style {
        url.set_fragment(Some(song_id.as_str()));
    } else {
        set_query_param(&mut url, SONG_PARAM, song_id.as_str());
    }

    if let Some(timestamp) = timestamp.filter(|t| !t.is_zero()) {
        set_query_param(&mut url, TIMESTAMP_PARAM, &timestamp.as_secs_f64().to_string());
    }

    Ok(url.to_string())
}

/// Extract the song reference from a share link
///
/// Returns `Ok(None)` for a well-formed URL that does not reference a song.
/// Unparseable or negative timestamps are dropped rather than rejected.
pub fn parse_song_link(link: &str) -> Result<Option<SongLink>> {
    let url = Url::parse(link)?;

    let mut song_id = None;
    let mut timestamp = None;
    for (name, value) in url.query_pairs() {
        match name.as_ref() {
            SONG_PARAM if !value.is_empty() => song_id = Some(value.into_owned()),
            TIMESTAMP_PARAM => timestamp = parse_timestamp(&value),
            _ => {}
        }
    }

    let song_id = song_id.or_else(|| {
        url.fragment()
            .filter(|fragment| !fragment.is_empty())
            .map(str::to_string)
    });

    Ok(song_id.map(|id| SongLink {
        song_id: TrackId::new(id),
        timestamp,
    }))
}

fn parse_timestamp(value: &str) -> Option<Duration> {
    let seconds: f64 = value.parse().ok()?;
    if seconds.is_finite() && seconds >= 0.0 {
        Some(Duration::from_secs_f64(seconds))
    } else {
        tracing::debug!(value, "ignoring invalid share link timestamp");
        None
    }
}

fn set_query_param(url: &mut Url, name: &str, value: &str) {
    let retained: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != name)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut pairs = url.query_pairs_mut();
    pairs.clear();
    for (key, value) in &retained {
        pairs.append_pair(key, value);
    }
    pairs.append_pair(name, value);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_style_link_with_timestamp() {
        let link = song_link(
            "https://chants.example.com/",
            &TrackId::new("42"),
            Some(Duration::from_secs(73)),
        )
        .unwrap();

        assert_eq!(link, "https://chants.example.com/?song=42&t=73");
    }

    #[test]
    fn zero_timestamp_is_omitted() {
        let link = song_link("https://chants.example.com/", &TrackId::new("42"), Some(Duration::ZERO))
            .unwrap();
        assert_eq!(link, "https://chants.example.com/?song=42");
    }

    #[test]
    fn replaces_existing_song_param() {
        let link = song_link(
            "https://chants.example.com/?song=1&view=list",
            &TrackId::new("2"),
            None,
        )
        .unwrap();

        assert_eq!(link, "https://chants.example.com/?view=list&song=2");
    }

    #[test]
    fn fragment_style_link() {
        let link = song_link(
            "https://chants.example.com/#old",
            &TrackId::new("9"),
            Some(Duration::from_millis(1500)),
        )
        .unwrap();

        assert_eq!(link, "https://chants.example.com/?t=1.5#9");
    }

    #[test]
    fn parses_query_link() {
        let parsed = parse_song_link("https://chants.example.com/?song=42&t=73.5")
            .unwrap()
            .unwrap();

        assert_eq!(parsed.song_id, TrackId::new("42"));
        assert_eq!(parsed.timestamp, Some(Duration::from_secs_f64(73.5)));
    }

    #[test]
    fn parses_fragment_link() {
        let parsed = parse_song_link("https://chants.example.com/#42").unwrap().unwrap();
        assert_eq!(parsed.song_id, TrackId::new("42"));
        assert_eq!(parsed.timestamp, None);
    }

    #[test]
    fn ignores_bad_timestamps() {
        let parsed = parse_song_link("https://chants.example.com/?song=1&t=abc")
            .unwrap()
            .unwrap();
        assert_eq!(parsed.timestamp, None);

        let parsed = parse_song_link("https://chants.example.com/?song=1&t=-3")
            .unwrap()
            .unwrap();
        assert_eq!(parsed.timestamp, None);
    }

    #[test]
    fn link_without_song() {
        assert_eq!(parse_song_link("https://chants.example.com/about").unwrap(), None);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_song_link("not a url").is_err());
    }

    #[test]
    fn round_trips_through_link() {
        let id = TrackId::new("abc");
        let link = song_link("https://chants.example.com/", &id, Some(Duration::from_secs(5)))
            .unwrap();
        let parsed = parse_song_link(&link).unwrap().unwrap();

        assert_eq!(parsed.song_id, id);
        assert_eq!(parsed.timestamp, Some(Duration::from_secs(5)));
    }
}
