// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation store with undo/redo history.
//!
//! The store owns the ordered annotation list, hands out identities and
//! display numbers, and records one whole-list snapshot per user action.

use super::annotation::{Annotation, AnnotationDraft, AnnotationId, AnnotationPatch};

/// Annotation list captured for undo/redo. The number counter is not part
/// of it, so stepping through history never hands out a number twice.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    annotations: Vec<Annotation>,
}

/// History system for undo/redo functionality.
#[derive(Debug)]
struct History {
    /// Undo stack (past states)
    undo_stack: Vec<Snapshot>,
    /// Redo stack (future states after undo)
    redo_stack: Vec<Snapshot>,
    /// Maximum history size
    max_size: usize,
}

impl History {
    fn new(max_size: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_size: max_size.max(1),
        }
    }

    /// Save current state before making a change
    fn push(&mut self, snapshot: Snapshot) {
        self.undo_stack.push(snapshot);
        if self.undo_stack.len() > self.max_size {
            self.undo_stack.remove(0);
        }
        // Clear redo stack when new action is performed
        self.redo_stack.clear();
    }

    fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let previous = self.undo_stack.pop()?;
        self.redo_stack.push(current);
        Some(previous)
    }

    fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push(current);
        Some(next)
    }

    fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

/// Ordered collection of annotations.
#[derive(Debug)]
pub struct AnnotationStore {
    annotations: Vec<Annotation>,
    next_number: u32,
    next_id: AnnotationId,
    history: History,
}

impl Default for AnnotationStore {
    fn default() -> Self {
        Self::new(100)
    }
}

impl AnnotationStore {
    /// Create an empty store keeping at most `history_limit` undo steps.
    pub fn new(history_limit: usize) -> Self {
        Self {
            annotations: Vec::new(),
            next_number: 1,
            next_id: 1,
            history: History::new(history_limit),
        }
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn get(&self, id: AnnotationId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id == id)
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Copy of the annotation list for persistence.
    pub fn current_state(&self) -> Vec<Annotation> {
        self.annotations.clone()
    }

    /// Replace the contents with persisted annotations and drop history.
    pub fn load(&mut self, annotations: Vec<Annotation>) {
        self.next_number = max_number(&annotations) + 1;
        self.next_id = annotations.iter().map(|a| a.id).max().unwrap_or(0) + 1;
        self.annotations = annotations;
        self.history.clear();
        log::info!("Loaded {} annotations", self.annotations.len());
    }

    /// Append a new annotation, assigning its id and display number.
    pub fn add(&mut self, draft: AnnotationDraft) -> AnnotationId {
        let before = self.checkpoint();
        self.history.push(before);

        let id = self.next_id;
        self.next_id += 1;
        let number = self.next_number;
        self.next_number += 1;

        self.annotations.push(Annotation {
            id,
            kind: draft.kind,
            number,
            position: draft.position,
            size: draft.size,
            points: draft.points,
            color: draft.color,
            text: draft.text,
            label_position: None,
        });
        log::info!("Added annotation #{}, total: {}", number, self.annotations.len());
        id
    }

    /// Merge `patch` into the matching record. Returns false if `id` is
    /// unknown or the patch sets nothing.
    pub fn update(&mut self, id: AnnotationId, patch: &AnnotationPatch) -> bool {
        if patch.is_empty() {
            return false;
        }
        let Some(index) = self.index_of(id) else {
            return false;
        };
        let before = self.checkpoint();
        self.history.push(before);
        self.annotations[index].apply(patch);
        true
    }

    /// Remove the record without renumbering the rest.
    pub fn delete(&mut self, id: AnnotationId) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        let before = self.checkpoint();
        self.history.push(before);
        let removed = self.annotations.remove(index);
        log::info!(
            "Deleted annotation #{}, total: {}",
            removed.number,
            self.annotations.len()
        );
        true
    }

    /// Remove everything and restart numbering at 1.
    pub fn clear(&mut self) {
        let before = self.checkpoint();
        self.history.push(before);
        self.annotations.clear();
        self.next_number = 1;
        log::info!("Cleared all annotations");
    }

    pub fn undo(&mut self) -> bool {
        let current = self.checkpoint();
        match self.history.undo(current) {
            Some(previous) => {
                self.restore(previous);
                log::info!("Undo");
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        let current = self.checkpoint();
        match self.history.redo(current) {
            Some(next) => {
                self.restore(next);
                log::info!("Redo");
                true
            }
            None => false,
        }
    }

    /// Capture the current state, e.g. at the start of a drag.
    pub fn checkpoint(&self) -> Snapshot {
        Snapshot {
            annotations: self.annotations.clone(),
        }
    }

    /// Apply `patch` without recording history. Used while a gesture is in progress.
    pub fn update_live(&mut self, id: AnnotationId, patch: &AnnotationPatch) -> bool {
        match self.index_of(id) {
            Some(index) => {
                self.annotations[index].apply(patch);
                true
            }
            None => false,
        }
    }

    /// Finish a gesture started at `before`, recording one undo step if anything changed.
    pub fn commit(&mut self, before: Snapshot) -> bool {
        if before.annotations == self.annotations {
            return false;
        }
        self.history.push(before);
        true
    }

    fn restore(&mut self, snapshot: Snapshot) {
        let floor = max_number(&snapshot.annotations) + 1;
        self.annotations = snapshot.annotations;
        self.next_number = self.next_number.max(floor);
    }

    fn index_of(&self, id: AnnotationId) -> Option<usize> {
        self.annotations.iter().position(|a| a.id == id)
    }
}

fn max_number(annotations: &[Annotation]) -> u32 {
    annotations.iter().map(|a| a.number).max().unwrap_or(0)
}
