pub(crate) mod node;

use std::fmt;
use std::io::{BufRead, Write};
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::codec::LineCodec;
use crate::error::Result;
use node::Node;

/// Default maximum height of the skip list. LevelDB uses 12.
pub const DEFAULT_MAX_LEVEL: usize = 12;

/// Outcome of [`SkipList::insert`].
///
/// A duplicate key is a non-fatal outcome, not an error, and the stored
/// value is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The key was absent and the entry was spliced in.
    Inserted,
    /// The key was already present; nothing changed.
    AlreadyExists,
}

/// Outcome of [`SkipList::remove`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The key was found, unlinked from every level, and dropped.
    Deleted,
    /// The key was absent; nothing changed.
    NotFound,
}

/// Counters reported by [`SkipList::load`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadStats {
    /// Records inserted into the list.
    pub inserted: usize,
    /// Valid records dropped because the key was already present.
    pub duplicates: usize,
    /// Lines skipped: empty, missing the delimiter, empty key or value,
    /// or unparseable.
    pub skipped: usize,
}

/// Arena slot. Unlinked nodes leave a vacancy that later inserts reuse,
/// so indices held in forward arrays stay stable.
enum Slot<K, V> {
    Occupied(Node<K, V>),
    Vacant,
}

/// A probabilistic ordered map.
///
/// Every entry lives in the sorted linked list at level 0. Each entry
/// also appears in a random prefix of the higher levels, so a search can
/// skip over long runs of the base list:
///
/// ```text
/// Level 3:  HEAD ──────────────────────────────► 50 ──────────► NIL
/// Level 2:  HEAD ──────────► 20 ────────────────► 50 ──────────► NIL
/// Level 1:  HEAD ──► 10 ──► 20 ────► 35 ────────► 50 ──► 60 ──► NIL
/// Level 0:  HEAD ──► 10 ──► 20 ──► 25 ──► 35 ──► 50 ──► 60 ──► 70 ► NIL
/// ```
///
/// Average case: O(log n) insert, lookup and remove. Worst case O(n),
/// astronomically unlikely with random level assignment.
///
/// Nodes are stored in an arena and addressed by index; the head sentinel
/// is a bare forward array and never holds a key. The structure itself is
/// not synchronized — [`crate::Store`] provides the locked wrapper.
pub struct SkipList<K, V> {
    slots: Vec<Slot<K, V>>,
    free: Vec<usize>,
    /// Sentinel forward array, one entry per level `0..=max_level`.
    head: Vec<Option<usize>>,
    max_level: usize,
    /// Highest level currently holding at least one node.
    level: usize,
    len: usize,
    rng: StdRng,
}

impl<K, V> SkipList<K, V> {
    /// Create an empty list with levels `0..=max_level`.
    pub fn new(max_level: usize) -> Self {
        Self::with_rng(max_level, StdRng::from_entropy())
    }

    /// Create an empty list with a deterministic leveling RNG.
    /// Shapes become reproducible; useful in tests.
    pub fn with_seed(max_level: usize, seed: u64) -> Self {
        Self::with_rng(max_level, StdRng::seed_from_u64(seed))
    }

    fn with_rng(max_level: usize, rng: StdRng) -> Self {
        SkipList {
            slots: Vec::new(),
            free: Vec::new(),
            head: vec![None; max_level + 1],
            max_level,
            level: 0,
            len: 0,
            rng,
        }
    }

    /// Number of entries in the list.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Upper bound on levels, fixed at construction.
    pub fn max_level(&self) -> usize {
        self.max_level
    }

    /// Highest level currently holding at least one node.
    pub fn level(&self) -> usize {
        self.level
    }

    /// Iterate over all entries in key order (a level-0 walk).
    /// Restartable: each call walks from the head again.
    pub fn iter(&self) -> Iter<'_, K, V> {
        self.level_entries(0)
    }

    /// Iterate over the entries linked at one level, in key order.
    /// Levels above [`SkipList::level`] are empty.
    pub fn level_entries(&self, level: usize) -> Iter<'_, K, V> {
        Iter {
            list: self,
            next: self.head.get(level).copied().flatten(),
            level,
        }
    }

    /// Enumerate every active level with its entries, from level 0
    /// upward. Finite and restartable.
    pub fn levels(&self) -> Levels<'_, K, V> {
        Levels { list: self, level: 0 }
    }

    fn node(&self, idx: usize) -> &Node<K, V> {
        match &self.slots[idx] {
            Slot::Occupied(node) => node,
            Slot::Vacant => unreachable!("skip list link points at a vacant slot"),
        }
    }

    fn node_mut(&mut self, idx: usize) -> &mut Node<K, V> {
        match &mut self.slots[idx] {
            Slot::Occupied(node) => node,
            Slot::Vacant => unreachable!("skip list link points at a vacant slot"),
        }
    }

    /// Successor of `pred` at `level`; `None` as a predecessor means the
    /// head sentinel.
    fn next_at(&self, pred: Option<usize>, level: usize) -> Option<usize> {
        match pred {
            Some(idx) => self.node(idx).forward[level],
            None => self.head[level],
        }
    }

    /// Point `pred`'s forward reference at `level` to `target`.
    fn link_at(&mut self, pred: Option<usize>, level: usize, target: Option<usize>) {
        match pred {
            Some(idx) => self.node_mut(idx).forward[level] = target,
            None => self.head[level] = target,
        }
    }

    fn alloc(&mut self, node: Node<K, V>) -> usize {
        match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Slot::Occupied(node);
                idx
            }
            None => {
                self.slots.push(Slot::Occupied(node));
                self.slots.len() - 1
            }
        }
    }

    fn release(&mut self, idx: usize) {
        self.slots[idx] = Slot::Vacant;
        self.free.push(idx);
    }

    /// Draw a level for a new node: start at 1, keep climbing while a
    /// fair coin flip succeeds, cap at `max_level`. Geometric with
    /// expected height ~2 — this, not a fixed fan-out, is what gives the
    /// expected O(log n) bound.
    fn random_level(&mut self) -> usize {
        let mut level = 1;
        while self.rng.gen_bool(0.5) {
            level += 1;
        }
        level.min(self.max_level)
    }
}

impl<K: Ord, V> SkipList<K, V> {
    /// The shared search primitive: from the highest active level down,
    /// advance while the successor's key is `< key`, recording the final
    /// predecessor per level. `preds[i] == None` means the head sentinel.
    /// Afterwards `next_at(preds[0], 0)` is the first node with key
    /// `>= key`, if any.
    fn find_preds(&self, key: &K) -> Vec<Option<usize>> {
        let mut preds = vec![None; self.max_level + 1];
        let mut current: Option<usize> = None;
        for level in (0..=self.level).rev() {
            while let Some(next) = self.next_at(current, level) {
                if *self.node(next).key() < *key {
                    current = Some(next);
                } else {
                    break;
                }
            }
            preds[level] = current;
        }
        preds
    }

    /// Arena index of the node holding `key`, if present.
    fn find(&self, key: &K) -> Option<usize> {
        let mut current: Option<usize> = None;
        for level in (0..=self.level).rev() {
            while let Some(next) = self.next_at(current, level) {
                if *self.node(next).key() < *key {
                    current = Some(next);
                } else {
                    break;
                }
            }
        }
        let candidate = self.next_at(current, 0)?;
        if *self.node(candidate).key() == *key {
            Some(candidate)
        } else {
            None
        }
    }

    /// Insert an entry.
    ///
    /// If the key is already present the existing value is preserved and
    /// [`InsertOutcome::AlreadyExists`] is returned — duplicate inserts
    /// never overwrite.
    pub fn insert(&mut self, key: K, value: V) -> InsertOutcome {
        let preds = self.find_preds(&key);

        if let Some(candidate) = self.next_at(preds[0], 0) {
            if *self.node(candidate).key() == key {
                return InsertOutcome::AlreadyExists;
            }
        }

        let new_level = self.random_level();
        if new_level > self.level {
            // preds above the old active level already name the head.
            self.level = new_level;
        }

        let idx = self.alloc(Node::new(key, value, new_level));
        for level in 0..=new_level {
            let next = self.next_at(preds[level], level);
            self.node_mut(idx).forward[level] = next;
            self.link_at(preds[level], level, Some(idx));
        }

        self.len += 1;
        InsertOutcome::Inserted
    }

    /// Look up a key.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.find(key).map(|idx| self.node(idx).value())
    }

    /// Look up a key, allowing the caller to mutate the value in place.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let idx = self.find(key)?;
        Some(self.node_mut(idx).value_mut())
    }

    /// Whether the key is present.
    pub fn contains_key(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    /// Remove an entry: unlink it from every level it participates in,
    /// shrink the active level while the top of the head is empty, and
    /// drop the node.
    pub fn remove(&mut self, key: &K) -> DeleteOutcome {
        let preds = self.find_preds(key);
        let target = match self.next_at(preds[0], 0) {
            Some(idx) if *self.node(idx).key() == *key => idx,
            _ => return DeleteOutcome::NotFound,
        };

        for level in 0..=self.level {
            // Above the node's own height the predecessor links past it.
            if self.next_at(preds[level], level) != Some(target) {
                break;
            }
            let after = self.node(target).forward[level];
            self.link_at(preds[level], level, after);
        }

        while self.level > 0 && self.head[self.level].is_none() {
            self.level -= 1;
        }

        self.release(target);
        self.len -= 1;
        DeleteOutcome::Deleted
    }

    /// Write every entry to `sink` through the line codec, one record
    /// per line in key order, then flush.
    ///
    /// Does not lock anything; synchronization is the wrapper's job.
    pub fn dump<W: Write>(&self, sink: &mut W, codec: &LineCodec) -> Result<()>
    where
        K: fmt::Display,
        V: fmt::Display,
    {
        for (key, value) in self.iter() {
            writeln!(sink, "{}", codec.encode(key, value))?;
        }
        sink.flush()?;
        Ok(())
    }

    /// Read records from `source` and insert each one.
    ///
    /// A line is skipped if it is empty, has no delimiter, has an empty
    /// key or value, or fails to parse. Valid records go through
    /// [`SkipList::insert`], so on duplicate keys the first occurrence
    /// wins. Skips are counted, never fatal; only I/O errors surface.
    pub fn load<R: BufRead>(&mut self, source: R, codec: &LineCodec) -> Result<LoadStats>
    where
        K: FromStr,
        V: FromStr,
    {
        let mut stats = LoadStats::default();
        for line in source.lines() {
            let line = line?;
            let Some((raw_key, raw_value)) = codec.split(&line) else {
                stats.skipped += 1;
                continue;
            };
            if raw_key.is_empty() || raw_value.is_empty() {
                stats.skipped += 1;
                continue;
            }
            let (Ok(key), Ok(value)) = (raw_key.parse::<K>(), raw_value.parse::<V>()) else {
                stats.skipped += 1;
                continue;
            };
            match self.insert(key, value) {
                InsertOutcome::Inserted => stats.inserted += 1,
                InsertOutcome::AlreadyExists => stats.duplicates += 1,
            }
        }
        Ok(stats)
    }
}

/// Lazy walk of one level's entries in key order.
pub struct Iter<'a, K, V> {
    list: &'a SkipList<K, V>,
    next: Option<usize>,
    level: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.next?;
        let node = self.list.node(idx);
        self.next = node.forward[self.level];
        Some((node.key(), node.value()))
    }
}

/// Enumerates `(level, entries)` pairs from level 0 up to the current
/// active level.
pub struct Levels<'a, K, V> {
    list: &'a SkipList<K, V>,
    level: usize,
}

impl<'a, K, V> Iterator for Levels<'a, K, V> {
    type Item = (usize, Iter<'a, K, V>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.level > self.list.level {
            return None;
        }
        let level = self.level;
        self.level += 1;
        Some((level, self.list.level_entries(level)))
    }
}

/// Renders one `Level i: key:value;...` line per active level, base
/// level first.
impl<K: fmt::Display, V: fmt::Display> fmt::Display for SkipList<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (level, entries) in self.levels() {
            write!(f, "Level {level}: ")?;
            for (key, value) in entries {
                write!(f, "{key}:{value};")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_level_stays_within_bounds() {
        let mut list: SkipList<u32, u32> = SkipList::with_seed(6, 7);
        for _ in 0..1000 {
            let level = list.random_level();
            assert!((1..=6).contains(&level));
        }
    }

    #[test]
    fn random_level_capped_at_zero_max() {
        let mut list: SkipList<u32, u32> = SkipList::with_seed(0, 7);
        for _ in 0..100 {
            assert_eq!(list.random_level(), 0);
        }
    }

    #[test]
    fn freed_slots_are_reused() {
        let mut list = SkipList::with_seed(4, 11);
        for i in 0..10u32 {
            list.insert(i, i);
        }
        let arena_size = list.slots.len();
        for i in 0..10u32 {
            assert_eq!(list.remove(&i), DeleteOutcome::Deleted);
        }
        for i in 10..20u32 {
            list.insert(i, i);
        }
        // Removals left vacancies; the second wave fills them.
        assert_eq!(list.slots.len(), arena_size);
    }

    #[test]
    fn level_shrinks_back_to_zero_when_emptied() {
        let mut list = SkipList::with_seed(8, 3);
        for i in 0..100u32 {
            list.insert(i, i);
        }
        assert!(list.level() >= 1);
        for i in 0..100u32 {
            list.remove(&i);
        }
        assert!(list.is_empty());
        assert_eq!(list.level(), 0);
    }
}
