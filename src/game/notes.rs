//! Live note storage. Notes sit in a dense vector in spawn order; resolution
//! only marks a note, and a single order-preserving compaction pass moves
//! every resolved note out afterwards.

use log::debug;

use super::judgment::Tier;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NoteId(pub u64);

#[derive(Clone, Debug, PartialEq)]
pub struct Note {
    pub id: NoteId,
    /// Simulation tick on which the note was admitted.
    pub spawn_tick: u64,
    /// Distance travelled since spawn.
    pub position_y: f64,
    pub target_y: f64,
    /// Distance per reference frame, fixed at spawn time.
    pub speed: f64,
    /// `None` while unresolved.
    pub judgment: Option<Tier>,
}

impl Note {
    pub fn is_resolved(&self) -> bool {
        self.judgment.is_some()
    }

    /// Distance to the judgment line; never negative.
    pub fn distance(&self) -> f64 {
        (self.position_y - self.target_y).abs()
    }
}

#[derive(Clone, Debug, Default)]
pub struct NoteRegistry {
    notes: Vec<Note>,
    next_id: u64,
    target_y: f64,
}

impl NoteRegistry {
    pub fn new(target_y: f64) -> Self {
        Self {
            notes: Vec::new(),
            next_id: 0,
            target_y,
        }
    }

    /// Admit a new note at the top of the lane.
    pub fn spawn(&mut self, tick: u64, speed: f64) -> NoteId {
        let id = NoteId(self.next_id);
        self.next_id += 1;
        self.notes.push(Note {
            id,
            spawn_tick: tick,
            position_y: 0.0,
            target_y: self.target_y,
            speed,
            judgment: None,
        });
        debug!("spawned note {} at tick {tick} (speed {speed:.2})", id.0);
        id
    }

    /// Move every live note by `speed * delta_ms / frame_ms`. Notes that reach
    /// the judgment line are resolved as `Miss` and returned, oldest first.
    pub fn advance(&mut self, delta_ms: f64, frame_ms: f64) -> Vec<Note> {
        let frames = delta_ms.max(0.0) / frame_ms;
        for note in self.notes.iter_mut().filter(|n| !n.is_resolved()) {
            note.position_y += note.speed * frames;
            if note.position_y >= note.target_y {
                note.judgment = Some(Tier::Miss);
            }
        }
        self.compact()
    }

    /// Resolve one live note with `tier` and remove it.
    pub fn resolve(&mut self, id: NoteId, tier: Tier) -> Option<Note> {
        let note = self.notes.iter_mut().find(|n| n.id == id && !n.is_resolved())?;
        note.judgment = Some(tier);
        self.compact().pop()
    }

    fn compact(&mut self) -> Vec<Note> {
        if !self.notes.iter().any(Note::is_resolved) {
            return Vec::new();
        }
        let (resolved, live): (Vec<Note>, Vec<Note>) =
            std::mem::take(&mut self.notes).into_iter().partition(Note::is_resolved);
        self.notes = live;
        resolved
    }

    pub fn clear(&mut self) {
        self.notes.clear();
        self.next_id = 0;
    }

    /// Live notes in spawn order.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_starts_at_top_unresolved() {
        let mut reg = NoteRegistry::new(500.0);
        let id = reg.spawn(7, 3.0);
        let note = &reg.notes()[0];
        assert_eq!(note.id, id);
        assert_eq!(note.spawn_tick, 7);
        assert_eq!(note.position_y, 0.0);
        assert_eq!(note.target_y, 500.0);
        assert!(!note.is_resolved());
    }

    #[test]
    fn advance_scales_with_frame_time() {
        let mut reg = NoteRegistry::new(500.0);
        reg.spawn(0, 3.0);
        reg.advance(16.0, 16.0);
        assert_eq!(reg.notes()[0].position_y, 3.0);
        reg.advance(32.0, 16.0);
        assert_eq!(reg.notes()[0].position_y, 9.0);
    }

    #[test]
    fn overdue_notes_become_misses_and_leave() {
        let mut reg = NoteRegistry::new(100.0);
        let slow = reg.spawn(0, 10.0);
        let fast = reg.spawn(0, 50.0);
        let expired = reg.advance(32.0, 16.0);
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].id, fast);
        assert_eq!(expired[0].judgment, Some(Tier::Miss));
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.notes()[0].id, slow);
    }

    #[test]
    fn expired_notes_keep_spawn_order() {
        let mut reg = NoteRegistry::new(10.0);
        let a = reg.spawn(0, 20.0);
        let b = reg.spawn(1, 20.0);
        let ids: Vec<_> = reg.advance(16.0, 16.0).into_iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![a, b]);
        assert!(reg.is_empty());
    }

    #[test]
    fn resolve_removes_only_that_note() {
        let mut reg = NoteRegistry::new(500.0);
        let a = reg.spawn(0, 3.0);
        let b = reg.spawn(1, 3.0);
        let c = reg.spawn(2, 3.0);
        let resolved = reg.resolve(b, Tier::Good).unwrap();
        assert_eq!(resolved.judgment, Some(Tier::Good));
        let live: Vec<_> = reg.notes().iter().map(|n| n.id).collect();
        assert_eq!(live, vec![a, c]);
        assert!(reg.resolve(b, Tier::Good).is_none());
    }
}
