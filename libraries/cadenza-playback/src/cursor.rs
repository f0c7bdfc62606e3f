//! Playlist cursor
//!
//! Index selection over an immutable playlist. Advance and rewind wrap
//! modulo the playlist length.

use crate::error::{PlaybackError, Result};
use crate::types::{Playlist, Track};

#[derive(Debug, Clone)]
pub struct PlaylistCursor {
    playlist: Playlist,
    index: usize,
}

impl PlaylistCursor {
    /// Cursor positioned on the first track
    pub fn new(playlist: Playlist) -> Self {
        Self { playlist, index: 0 }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.playlist.len()
    }

    pub fn is_empty(&self) -> bool {
        self.playlist.is_empty()
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    /// Track under the cursor
    pub fn current(&self) -> &Track {
        // Playlist is non-empty and index stays in range
        &self.playlist.tracks()[self.index]
    }

    /// Move to the next track, wrapping to the first
    pub fn advance(&mut self) -> &Track {
        self.index = (self.index + 1) % self.playlist.len();
        self.current()
    }

    /// Move to the previous track, wrapping to the last
    pub fn rewind(&mut self) -> &Track {
        let len = self.playlist.len();
        self.index = (self.index + len - 1) % len;
        self.current()
    }

    /// Jump to an explicit index
    pub fn select(&mut self, index: usize) -> Result<&Track> {
        if index >= self.playlist.len() {
            return Err(PlaybackError::IndexOutOfBounds(index));
        }
        self.index = index;
        Ok(self.current())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor(n: usize) -> PlaylistCursor {
        let tracks = (0..n)
            .map(|i| {
                Track::new(
                    format!("t{i}"),
                    format!("Track {i}"),
                    "Artist",
                    "",
                    format!("/{i}.mp3"),
                )
            })
            .collect();
        PlaylistCursor::new(Playlist::new(tracks).unwrap())
    }

    #[test]
    fn advance_wraps_from_last_to_first() {
        let mut c = cursor(3);
        c.select(2).unwrap();
        assert_eq!(c.advance().id, "t0");
        assert_eq!(c.index(), 0);
    }

    #[test]
    fn rewind_wraps_from_first_to_last() {
        let mut c = cursor(3);
        assert_eq!(c.rewind().id, "t2");
        assert_eq!(c.index(), 2);
    }

    #[test]
    fn advancing_len_times_returns_to_start() {
        let mut c = cursor(5);
        c.select(3).unwrap();
        for _ in 0..c.len() {
            c.advance();
        }
        assert_eq!(c.index(), 3);
    }

    #[test]
    fn single_track_playlist_stays_put() {
        let mut c = cursor(1);
        c.advance();
        assert_eq!(c.index(), 0);
        c.rewind();
        assert_eq!(c.index(), 0);
    }

    #[test]
    fn select_out_of_range_keeps_position() {
        let mut c = cursor(3);
        c.select(1).unwrap();
        assert!(matches!(c.select(3), Err(PlaybackError::IndexOutOfBounds(3))));
        assert_eq!(c.index(), 1);
    }
}
