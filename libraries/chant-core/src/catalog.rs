//! Catalog helpers over the ordered track list returned by the API

use crate::types::{Track, TrackId};

/// Case-insensitive substring search over title, artist, album and composer
///
/// An empty (or whitespace) query matches everything. Catalog order is kept.
pub fn search<'a, T>(tracks: &'a [T], query: &str) -> Vec<&'a T>
where
    T: AsRef<Track>,
{
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return tracks.iter().collect();
    }

    tracks
        .iter()
        .filter(|track| matches(track.as_ref(), &needle))
        .collect()
}

fn matches(track: &Track, needle: &str) -> bool {
    let contains = |field: &str| field.to_lowercase().contains(needle);

    contains(&track.title)
        || contains(&track.artist)
        || track.album.as_deref().is_some_and(contains)
        || track.composer.as_deref().is_some_and(contains)
}

/// Index of the track following `current`, wrapping to the start
///
/// Returns `None` when the list is empty or `current` is not in it.
pub fn next_index<T>(tracks: &[T], current: &TrackId) -> Option<usize>
where
    T: AsRef<Track>,
{
    let position = position_of(tracks, current)?;
    Some((position + 1) % tracks.len())
}

/// Index of the track preceding `current`, wrapping to the end
pub fn previous_index<T>(tracks: &[T], current: &TrackId) -> Option<usize>
where
    T: AsRef<Track>,
{
    let position = position_of(tracks, current)?;
    Some((position + tracks.len() - 1) % tracks.len())
}

/// Find a track by id
pub fn find<'a, T>(tracks: &'a [T], id: &TrackId) -> Option<&'a T>
where
    T: AsRef<Track>,
{
    tracks.iter().find(|track| &track.as_ref().id == id)
}

fn position_of<T>(tracks: &[T], id: &TrackId) -> Option<usize>
where
    T: AsRef<Track>,
{
    tracks.iter().position(|track| &track.as_ref().id == id)
}

impl AsRef<Track> for Track {
    fn as_ref(&self) -> &Track {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn catalog() -> Vec<Track> {
        vec![
            Track::new("1", "Kyrie Eleison", "Schola Gregoriana", "s3://c/1.mp3")
                .with_album("Missa de Angelis"),
            Track::new("2", "Gloria", "Schola Gregoriana", "s3://c/2.mp3")
                .with_composer("Anonymous"),
            Track::new("3", "Ave Maria", "Monks of Solesmes", "s3://c/3.mp3"),
        ]
    }

    #[test]
    fn empty_query_matches_all() {
        let tracks = catalog();
        assert_eq!(search(&tracks, "").len(), 3);
        assert_eq!(search(&tracks, "   ").len(), 3);
    }

    #[test]
    fn search_is_case_insensitive_over_fields() {
        let tracks = catalog();

        let by_title: Vec<&str> = search(&tracks, "kyrie")
            .into_iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(by_title, vec!["1"]);

        let by_artist = search(&tracks, "SCHOLA");
        assert_eq!(by_artist.len(), 2);

        let by_album = search(&tracks, "angelis");
        assert_eq!(by_album.len(), 1);

        let by_composer = search(&tracks, "anonymous");
        assert_eq!(by_composer[0].id.as_str(), "2");

        assert!(search(&tracks, "requiem").is_empty());
    }

    #[test]
    fn next_and_previous_wrap_around() {
        let tracks: Vec<Arc<Track>> = catalog().into_iter().map(Arc::new).collect();

        assert_eq!(next_index(&tracks, &TrackId::new("1")), Some(1));
        assert_eq!(next_index(&tracks, &TrackId::new("3")), Some(0));
        assert_eq!(previous_index(&tracks, &TrackId::new("1")), Some(2));
        assert_eq!(previous_index(&tracks, &TrackId::new("2")), Some(0));
    }

    #[test]
    fn unknown_track_has_no_neighbours() {
        let tracks = catalog();
        assert_eq!(next_index(&tracks, &TrackId::new("99")), None);
        assert_eq!(previous_index::<Track>(&[], &TrackId::new("1")), None);
    }

    #[test]
    fn find_by_id() {
        let tracks = catalog();
        assert_eq!(find(&tracks, &TrackId::new("3")).unwrap().title, "Ave Maria");
        assert!(find(&tracks, &TrackId::new("4")).is_none());
    }
}
