use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Track;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    Off,
    All,
    One,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("Queue index {index} out of range (len {len})")]
    OutOfRange { index: usize, len: usize },
}

/// What `advance` decided. The caller drives the playback engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Repeat-one: seek to 0 and resume the track at the cursor.
    RepeatCurrent,
    /// Move to this index and load it.
    Next(usize),
    /// Repeat-all wrapped back to the first entry.
    Wrapped,
    /// No next track; cursor unchanged. Caller may invoke autoplay.
    Exhausted,
}

/// Result of removing an entry, so the caller knows whether the
/// currently playing slot was affected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removal {
    pub track: Track,
    /// True when the removed entry was the one at the cursor. The cursor
    /// now points at the entry that slid into its slot (clamped to the
    /// last index), or is cleared if the queue emptied.
    pub displaced_active: bool,
}

/// Ordered list of tracks awaiting playback, with a cursor marking the
/// active one. Pure state machine: no I/O, no timers.
pub struct PlayQueue {
    tracks: Vec<Track>,
    cursor: Option<usize>,
    pub shuffle: bool,
    pub repeat: RepeatMode,
}

impl Default for PlayQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl PlayQueue {
    pub fn new() -> Self {
        Self {
            tracks: Vec::new(),
            cursor: None,
            shuffle: false,
            repeat: RepeatMode::Off,
        }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn current(&self) -> Option<&Track> {
        self.cursor.and_then(|i| self.tracks.get(i))
    }

    /// Append; cursor unchanged.
    pub fn add(&mut self, track: Track) {
        self.tracks.push(track);
    }

    pub fn add_all(&mut self, tracks: impl IntoIterator<Item = Track>) {
        self.tracks.extend(tracks);
    }

    /// Append and move the cursor to the new last index.
    pub fn add_and_jump(&mut self, track: Track) -> usize {
        self.tracks.push(track);
        let index = self.tracks.len() - 1;
        self.cursor = Some(index);
        index
    }

    /// Remove one entry. Removing before the cursor decrements it so the
    /// same logical track stays active. Removing the active entry keeps
    /// the cursor on the same slot (clamped), per the documented policy.
    pub fn remove(&mut self, index: usize) -> Result<Removal, QueueError> {
        if index >= self.tracks.len() {
            return Err(QueueError::OutOfRange {
                index,
                len: self.tracks.len(),
            });
        }

        let track = self.tracks.remove(index);
        let mut displaced_active = false;

        if let Some(cursor) = self.cursor {
            if index < cursor {
                self.cursor = Some(cursor - 1);
            } else if index == cursor {
                displaced_active = true;
                self.cursor = if self.tracks.is_empty() {
                    None
                } else {
                    Some(cursor.min(self.tracks.len() - 1))
                };
            }
        }

        Ok(Removal {
            track,
            displaced_active,
        })
    }

    /// Move one entry from `from` to `to`, keeping the cursor on the same
    /// logical track.
    pub fn reorder(&mut self, from: usize, to: usize) -> Result<(), QueueError> {
        let len = self.tracks.len();
        if from >= len {
            return Err(QueueError::OutOfRange { index: from, len });
        }
        if to >= len {
            return Err(QueueError::OutOfRange { index: to, len });
        }
        if from == to {
            return Ok(());
        }

        let moved = self.tracks.remove(from);
        self.tracks.insert(to, moved);

        if let Some(cursor) = self.cursor {
            if from == cursor {
                self.cursor = Some(to);
            } else if from < cursor && cursor <= to {
                self.cursor = Some(cursor - 1);
            } else if to <= cursor && cursor < from {
                self.cursor = Some(cursor + 1);
            }
        }

        Ok(())
    }

    /// Empty the queue. Does not stop ad-hoc playback; that is the
    /// controller's call.
    pub fn clear(&mut self) {
        self.tracks.clear();
        self.cursor = None;
    }

    /// Compute the next position. Only `Next`/`Wrapped` move the cursor;
    /// `Exhausted` leaves it untouched so the caller can fall back to
    /// autoplay without losing its place.
    pub fn advance(&mut self) -> Advance {
        if self.tracks.is_empty() {
            return Advance::Exhausted;
        }

        if self.repeat == RepeatMode::One {
            return Advance::RepeatCurrent;
        }

        if self.shuffle {
            if self.tracks.len() == 1 {
                self.cursor = Some(0);
                return Advance::Next(0);
            }
            let candidates: Vec<usize> = (0..self.tracks.len())
                .filter(|&i| Some(i) != self.cursor)
                .collect();
            let next = candidates
                .choose(&mut rand::rng())
                .copied()
                .unwrap_or(0);
            self.cursor = Some(next);
            return Advance::Next(next);
        }

        let next = match self.cursor {
            Some(i) => i + 1,
            None => 0,
        };

        if next >= self.tracks.len() {
            if self.repeat == RepeatMode::All {
                self.cursor = Some(0);
                return Advance::Wrapped;
            }
            return Advance::Exhausted;
        }

        self.cursor = Some(next);
        Advance::Next(next)
    }

    /// Move the cursor back one entry, wrapping under repeat-all and
    /// clamping to 0 otherwise. The "restart instead when more than 3
    /// seconds in" rule lives in the controller, which owns playback time.
    pub fn retreat(&mut self) -> Option<usize> {
        if self.tracks.is_empty() {
            return None;
        }

        let prev = match self.cursor {
            Some(0) | None => {
                if self.repeat == RepeatMode::All {
                    self.tracks.len() - 1
                } else {
                    0
                }
            }
            Some(i) => i - 1,
        };

        self.cursor = Some(prev);
        Some(prev)
    }

    pub fn jump_to(&mut self, index: usize) -> Result<&Track, QueueError> {
        if index >= self.tracks.len() {
            return Err(QueueError::OutOfRange {
                index,
                len: self.tracks.len(),
            });
        }
        self.cursor = Some(index);
        Ok(&self.tracks[index])
    }

    pub fn toggle_shuffle(&mut self) {
        self.shuffle = !self.shuffle;
    }

    /// off -> all -> one -> off
    pub fn cycle_repeat(&mut self) {
        self.repeat = match self.repeat {
            RepeatMode::Off => RepeatMode::All,
            RepeatMode::All => RepeatMode::One,
            RepeatMode::One => RepeatMode::Off,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ProviderId;

    fn track(id: &str) -> Track {
        Track {
            id: format!("yt:{}", id),
            video_id: id.to_string(),
            title: format!("Title {}", id),
            artist: "Artist".to_string(),
            thumbnail: String::new(),
            duration: 180,
            source: ProviderId::Youtube,
        }
    }

    fn queue_of(ids: &[&str]) -> PlayQueue {
        let mut q = PlayQueue::new();
        q.add_all(ids.iter().map(|id| track(id)));
        q
    }

    fn assert_cursor_valid(q: &PlayQueue) {
        match q.cursor() {
            None => {}
            Some(i) => assert!(i < q.len(), "cursor {} out of range (len {})", i, q.len()),
        }
    }

    #[test]
    fn add_does_not_move_cursor() {
        let mut q = queue_of(&["a", "b"]);
        q.jump_to(1).unwrap();
        q.add(track("c"));
        assert_eq!(q.cursor(), Some(1));
        assert_cursor_valid(&q);
    }

    #[test]
    fn add_and_jump_moves_cursor_to_last() {
        let mut q = queue_of(&["a"]);
        q.jump_to(0).unwrap();
        let index = q.add_and_jump(track("b"));
        assert_eq!(index, 1);
        assert_eq!(q.current().unwrap().video_id, "b");
    }

    #[test]
    fn remove_out_of_range_is_an_error() {
        let mut q = queue_of(&["a"]);
        assert_eq!(
            q.remove(5),
            Err(QueueError::OutOfRange { index: 5, len: 1 })
        );
    }

    #[test]
    fn remove_before_cursor_decrements() {
        let mut q = queue_of(&["a", "b", "c"]);
        q.jump_to(2).unwrap();
        let removal = q.remove(0).unwrap();
        assert!(!removal.displaced_active);
        assert_eq!(q.cursor(), Some(1));
        assert_eq!(q.current().unwrap().video_id, "c");
    }

    #[test]
    fn remove_after_cursor_leaves_it_alone() {
        let mut q = queue_of(&["a", "b", "c"]);
        q.jump_to(0).unwrap();
        q.remove(2).unwrap();
        assert_eq!(q.cursor(), Some(0));
        assert_eq!(q.current().unwrap().video_id, "a");
    }

    #[test]
    fn remove_active_keeps_slot() {
        let mut q = queue_of(&["a", "b", "c"]);
        q.jump_to(1).unwrap();
        let removal = q.remove(1).unwrap();
        assert!(removal.displaced_active);
        assert_eq!(q.cursor(), Some(1));
        assert_eq!(q.current().unwrap().video_id, "c");
    }

    #[test]
    fn remove_active_last_clamps() {
        let mut q = queue_of(&["a", "b"]);
        q.jump_to(1).unwrap();
        let removal = q.remove(1).unwrap();
        assert!(removal.displaced_active);
        assert_eq!(q.cursor(), Some(0));
    }

    #[test]
    fn remove_last_entry_clears_cursor() {
        let mut q = queue_of(&["a"]);
        q.jump_to(0).unwrap();
        let removal = q.remove(0).unwrap();
        assert!(removal.displaced_active);
        assert_eq!(q.cursor(), None);
        assert!(q.is_empty());
    }

    #[test]
    fn reorder_moves_cursor_with_track() {
        let mut q = queue_of(&["a", "b", "c", "d"]);
        q.jump_to(1).unwrap();
        q.reorder(1, 3).unwrap();
        assert_eq!(q.cursor(), Some(3));
        assert_eq!(q.current().unwrap().video_id, "b");
    }

    #[test]
    fn reorder_across_cursor_shifts_it() {
        let mut q = queue_of(&["a", "b", "c", "d"]);
        q.jump_to(2).unwrap();

        // from < cursor <= to: decrement
        q.reorder(0, 2).unwrap();
        assert_eq!(q.cursor(), Some(1));
        assert_eq!(q.current().unwrap().video_id, "c");

        // to <= cursor < from: increment
        q.reorder(3, 0).unwrap();
        assert_eq!(q.cursor(), Some(2));
        assert_eq!(q.current().unwrap().video_id, "c");
    }

    #[test]
    fn advance_walks_forward() {
        let mut q = queue_of(&["a", "b", "c"]);
        q.jump_to(0).unwrap();
        assert_eq!(q.advance(), Advance::Next(1));
        assert_eq!(q.advance(), Advance::Next(2));
    }

    #[test]
    fn advance_at_end_without_repeat_is_exhausted() {
        let mut q = queue_of(&["a", "b", "c"]);
        q.jump_to(2).unwrap();
        assert_eq!(q.advance(), Advance::Exhausted);
        // cursor unchanged: exhausted never moves it
        assert_eq!(q.cursor(), Some(2));
    }

    #[test]
    fn advance_wraps_under_repeat_all() {
        let mut q = queue_of(&["a", "b"]);
        q.repeat = RepeatMode::All;
        q.jump_to(1).unwrap();
        assert_eq!(q.advance(), Advance::Wrapped);
        assert_eq!(q.cursor(), Some(0));
    }

    #[test]
    fn advance_repeat_one_stays_put() {
        let mut q = queue_of(&["a"]);
        q.repeat = RepeatMode::One;
        q.jump_to(0).unwrap();
        assert_eq!(q.advance(), Advance::RepeatCurrent);
        assert_eq!(q.cursor(), Some(0));
    }

    #[test]
    fn shuffle_never_reselects_current() {
        let mut q = queue_of(&["a", "b", "c", "d"]);
        q.shuffle = true;
        q.jump_to(1).unwrap();
        for _ in 0..50 {
            let before = q.cursor().unwrap();
            match q.advance() {
                Advance::Next(next) => assert_ne!(next, before),
                other => panic!("unexpected advance outcome {:?}", other),
            }
        }
    }

    #[test]
    fn shuffle_single_entry_repeats_it() {
        let mut q = queue_of(&["a"]);
        q.shuffle = true;
        q.jump_to(0).unwrap();
        assert_eq!(q.advance(), Advance::Next(0));
    }

    #[test]
    fn retreat_clamps_at_start() {
        let mut q = queue_of(&["a", "b"]);
        q.jump_to(0).unwrap();
        assert_eq!(q.retreat(), Some(0));
    }

    #[test]
    fn retreat_wraps_under_repeat_all() {
        let mut q = queue_of(&["a", "b", "c"]);
        q.repeat = RepeatMode::All;
        q.jump_to(0).unwrap();
        assert_eq!(q.retreat(), Some(2));
    }

    #[test]
    fn retreat_moves_back_one() {
        let mut q = queue_of(&["a", "b", "c"]);
        q.jump_to(2).unwrap();
        assert_eq!(q.retreat(), Some(1));
    }

    #[test]
    fn clear_resets_cursor() {
        let mut q = queue_of(&["a", "b"]);
        q.jump_to(1).unwrap();
        q.clear();
        assert_eq!(q.cursor(), None);
        assert!(q.is_empty());
        assert_cursor_valid(&q);
    }

    #[test]
    fn cycle_repeat_order() {
        let mut q = PlayQueue::new();
        assert_eq!(q.repeat, RepeatMode::Off);
        q.cycle_repeat();
        assert_eq!(q.repeat, RepeatMode::All);
        q.cycle_repeat();
        assert_eq!(q.repeat, RepeatMode::One);
        q.cycle_repeat();
        assert_eq!(q.repeat, RepeatMode::Off);
    }
}
