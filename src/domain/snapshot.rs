//! Keyed section/item snapshots and diffing.
//!
//! A [`Snapshot`] is the full ordered description of sections and item
//! identifiers applied to the feed in one pass. [`diff`] computes the
//! insert/delete/move operations separating two snapshots; applying a diff
//! builds the target in full and swaps it in, so observers never see a
//! half-updated state. The engine knows nothing about rendering.

use std::collections::HashSet;
use std::hash::Hash;

/// One section of a snapshot: a key plus its ordered item identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotSection<S, I> {
    pub id: S,
    pub items: Vec<I>,
}

/// Ordered sections of ordered item identifiers, keyed for diffing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot<S, I> {
    sections: Vec<SnapshotSection<S, I>>,
}

impl<S, I> Default for Snapshot<S, I> {
    fn default() -> Self {
        Self {
            sections: Vec::new(),
        }
    }
}

impl<S, I> Snapshot<S, I>
where
    S: Clone + Eq + Hash,
    I: Clone + Eq + Hash,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an empty section. Section keys must be unique within a
    /// snapshot; a duplicate key is ignored.
    pub fn append_section(&mut self, id: S) {
        if self.contains_section(&id) {
            return;
        }
        self.sections.push(SnapshotSection {
            id,
            items: Vec::new(),
        });
    }

    /// Appends items to an existing section. Unknown sections are ignored.
    pub fn append_items(&mut self, section: &S, items: impl IntoIterator<Item = I>) {
        if let Some(existing) = self.sections.iter_mut().find(|s| &s.id == section) {
            existing.items.extend(items);
        }
    }

    /// Removes a section and its items. Returns whether it was present.
    pub fn delete_section(&mut self, id: &S) -> bool {
        let before = self.sections.len();
        self.sections.retain(|s| &s.id != id);
        self.sections.len() != before
    }

    pub fn contains_section(&self, id: &S) -> bool {
        self.sections.iter().any(|s| &s.id == id)
    }

    pub fn sections(&self) -> &[SnapshotSection<S, I>] {
        &self.sections
    }

    pub fn section_ids(&self) -> impl Iterator<Item = &S> {
        self.sections.iter().map(|s| &s.id)
    }

    pub fn items(&self, section: &S) -> Option<&[I]> {
        self.sections
            .iter()
            .find(|s| &s.id == section)
            .map(|s| s.items.as_slice())
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn item_count(&self) -> usize {
        self.sections.iter().map(|s| s.items.len()).sum()
    }

    /// Replays a diff onto a copy of this snapshot and returns the result.
    /// The receiver is untouched; callers swap in the returned snapshot in
    /// one move, which keeps the update atomic from an observer's view.
    pub fn applying(&self, ops: &[DiffOp<S, I>]) -> Snapshot<S, I> {
        let mut next = self.clone();
        for op in ops {
            match op {
                DiffOp::DeleteSection { index, .. } => {
                    next.sections.remove(*index);
                }
                DiffOp::InsertSection { index, id, items } => {
                    next.sections.insert(
                        *index,
                        SnapshotSection {
                            id: id.clone(),
                            items: items.clone(),
                        },
                    );
                }
                DiffOp::MoveSection { from, to, .. } => {
                    let section = next.sections.remove(*from);
                    next.sections.insert(*to, section);
                }
                DiffOp::DeleteItem { section, index, .. } => {
                    next.sections[*section].items.remove(*index);
                }
                DiffOp::InsertItem { section, index, id } => {
                    next.sections[*section].items.insert(*index, id.clone());
                }
                DiffOp::MoveItem { section, from, to, .. } => {
                    let items = &mut next.sections[*section].items;
                    let item = items.remove(*from);
                    items.insert(*to, item);
                }
            }
        }
        next
    }
}

/// A single structural change between two snapshots.
///
/// Indices are valid at the moment the operation is replayed in order:
/// deletes refer to pre-delete positions (emitted highest-first), inserts
/// and moves to positions in the emerging target order. Item operations
/// use section indices of the target snapshot and are emitted after all
/// section operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffOp<S, I> {
    DeleteSection {
        index: usize,
        id: S,
    },
    InsertSection {
        index: usize,
        id: S,
        items: Vec<I>,
    },
    MoveSection {
        from: usize,
        to: usize,
        id: S,
    },
    DeleteItem {
        section: usize,
        index: usize,
        id: I,
    },
    InsertItem {
        section: usize,
        index: usize,
        id: I,
    },
    MoveItem {
        section: usize,
        from: usize,
        to: usize,
        id: I,
    },
}

/// Computes the operations that turn `old` into `new`.
///
/// Sections are matched by key, items by identifier. Unchanged regions
/// produce no operations.
pub fn diff<S, I>(old: &Snapshot<S, I>, new: &Snapshot<S, I>) -> Vec<DiffOp<S, I>>
where
    S: Clone + Eq + Hash,
    I: Clone + Eq + Hash,
{
    let mut ops = Vec::new();

    let new_ids: HashSet<&S> = new.sections.iter().map(|s| &s.id).collect();
    let old_ids: HashSet<&S> = old.sections.iter().map(|s| &s.id).collect();

    // Section deletions, highest index first so earlier indices stay valid.
    let mut working: Vec<S> = old.sections.iter().map(|s| s.id.clone()).collect();
    for index in (0..working.len()).rev() {
        if !new_ids.contains(&working[index]) {
            let id = working.remove(index);
            ops.push(DiffOp::DeleteSection { index, id });
        }
    }

    // Insertions and moves toward the target order.
    for (target, section) in new.sections.iter().enumerate() {
        match working.iter().position(|id| id == &section.id) {
            None => {
                working.insert(target, section.id.clone());
                ops.push(DiffOp::InsertSection {
                    index: target,
                    id: section.id.clone(),
                    items: section.items.clone(),
                });
            }
            Some(current) if current != target => {
                let id = working.remove(current);
                working.insert(target, id.clone());
                ops.push(DiffOp::MoveSection {
                    from: current,
                    to: target,
                    id,
                });
            }
            Some(_) => {}
        }
    }

    // Item pass for sections present on both sides. Inserted sections carry
    // their items in the InsertSection payload; deleted sections take
    // theirs with them.
    for (target, section) in new.sections.iter().enumerate() {
        if !old_ids.contains(&section.id) {
            continue;
        }
        let empty: &[I] = &[];
        let old_items = old.items(&section.id).unwrap_or(empty);
        diff_items(target, old_items, &section.items, &mut ops);
    }

    ops
}

fn diff_items<S, I>(section: usize, old: &[I], new: &[I], ops: &mut Vec<DiffOp<S, I>>)
where
    S: Clone + Eq + Hash,
    I: Clone + Eq + Hash,
{
    let new_ids: HashSet<&I> = new.iter().collect();

    let mut working: Vec<I> = old.to_vec();
    for index in (0..working.len()).rev() {
        if !new_ids.contains(&working[index]) {
            let id = working.remove(index);
            ops.push(DiffOp::DeleteItem { section, index, id });
        }
    }

    for (target, item) in new.iter().enumerate() {
        match working.iter().position(|i| i == item) {
            None => {
                working.insert(target, item.clone());
                ops.push(DiffOp::InsertItem {
                    section,
                    index: target,
                    id: item.clone(),
                });
            }
            Some(current) if current != target => {
                let id = working.remove(current);
                working.insert(target, id.clone());
                ops.push(DiffOp::MoveItem {
                    section,
                    from: current,
                    to: target,
                    id,
                });
            }
            Some(_) => {}
        }
    }
}
