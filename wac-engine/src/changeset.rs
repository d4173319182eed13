//! Pending operation queues with undo semantics
//!
//! Edits between hydration and commit are queued here rather than sent
//! to the store one by one. A queued removal matching a still-pending
//! addition for the same `(user, mode)` cancels both, in either order
//! of arrival, so a round trip of edits yields an empty patch.

use crate::mode::AccessMode;
use crate::triple::Triple;
use std::collections::BTreeSet;

/// A queued mode insertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAdd {
    /// Agent the mode is granted to
    pub user: String,
    /// Authorization node the mode triple targets
    pub subject: String,
    /// The granted mode
    pub mode: AccessMode,
    /// True when the subject does not exist remotely yet: commit must
    /// synthesize the full node triple set, not one mode triple
    pub new_node: bool,
}

/// A queued mode removal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRemove {
    /// Agent the mode is taken from
    pub user: String,
    /// Authorization node the mode triple targets
    pub subject: String,
    /// The removed mode
    pub mode: AccessMode,
    /// True when this removal empties the node: the whole subject is
    /// wiped after the main patch instead of deleting one triple
    pub zombie: bool,
}

/// A node allocated by a split, created in full at commit time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeCreation {
    /// URI of the new private node
    pub subject: String,
    /// The agent isolated onto it
    pub user: String,
    /// Modes carried over from the shared node
    pub modes: BTreeSet<AccessMode>,
}

/// Queues of pending operations against one ACL document
#[derive(Debug, Default)]
pub struct ChangeSet {
    adds: Vec<PendingAdd>,
    removes: Vec<PendingRemove>,
    creations: Vec<NodeCreation>,
    membership_deletes: Vec<Triple>,
}

impl ChangeSet {
    /// Create an empty change set
    pub fn new() -> Self {
        Self::default()
    }

    /// Queued mode insertions
    pub fn adds(&self) -> &[PendingAdd] {
        &self.adds
    }

    /// Queued mode removals
    pub fn removes(&self) -> &[PendingRemove] {
        &self.removes
    }

    /// Nodes pending creation from splits
    pub fn creations(&self) -> &[NodeCreation] {
        &self.creations
    }

    /// Raw node-membership deletes queued by splits
    pub fn membership_deletes(&self) -> &[Triple] {
        &self.membership_deletes
    }

    /// True if nothing is queued
    pub fn is_empty(&self) -> bool {
        self.adds.is_empty()
            && self.removes.is_empty()
            && self.creations.is_empty()
            && self.membership_deletes.is_empty()
    }

    /// Drop everything queued
    pub fn clear(&mut self) {
        self.adds.clear();
        self.removes.clear();
        self.creations.clear();
        self.membership_deletes.clear();
    }

    pub(crate) fn push_add(&mut self, add: PendingAdd) {
        self.adds.push(add);
    }

    pub(crate) fn push_remove(&mut self, remove: PendingRemove) {
        self.removes.push(remove);
    }

    pub(crate) fn push_creation(&mut self, creation: NodeCreation) {
        self.creations.push(creation);
    }

    pub(crate) fn push_membership_delete(&mut self, triple: Triple) {
        self.membership_deletes.push(triple);
    }

    /// Cancel the pending addition matching `(user, mode)`, if any
    pub(crate) fn cancel_add(&mut self, user: &str, mode: AccessMode) -> Option<PendingAdd> {
        let idx = self
            .adds
            .iter()
            .position(|a| a.user == user && a.mode == mode)?;
        Some(self.adds.remove(idx))
    }

    /// Cancel the pending removal matching `(user, mode)`, if any
    pub(crate) fn cancel_remove(&mut self, user: &str, mode: AccessMode) -> Option<PendingRemove> {
        let idx = self
            .removes
            .iter()
            .position(|r| r.user == user && r.mode == mode)?;
        Some(self.removes.remove(idx))
    }

    /// True if any pending addition still targets `subject`
    pub(crate) fn has_add_for(&self, subject: &str) -> bool {
        self.adds.iter().any(|a| a.subject == subject)
    }

    /// Make the oldest pending addition for `subject` carry the node
    /// boilerplate (used when the addition that carried it is cancelled)
    pub(crate) fn promote_add(&mut self, subject: &str) {
        if let Some(a) = self.adds.iter_mut().find(|a| a.subject == subject) {
            a.new_node = true;
        }
    }

    /// True if a pending creation for `subject` carries `mode`
    pub(crate) fn creation_contains(&self, subject: &str, mode: AccessMode) -> bool {
        self.creations
            .iter()
            .any(|c| c.subject == subject && c.modes.contains(&mode))
    }

    /// Remove `mode` from the pending creation for `subject`; returns
    /// false if no such creation carries the mode
    pub(crate) fn remove_creation_mode(&mut self, subject: &str, mode: AccessMode) -> bool {
        match self.creations.iter_mut().find(|c| c.subject == subject) {
            Some(c) => c.modes.remove(&mode),
            None => false,
        }
    }

    /// True if the pending creation for `subject` has no modes left
    pub(crate) fn creation_is_empty(&self, subject: &str) -> bool {
        self.creations
            .iter()
            .find(|c| c.subject == subject)
            .is_some_and(|c| c.modes.is_empty())
    }

    /// Drop the pending creation for `subject` entirely
    pub(crate) fn remove_creation(&mut self, subject: &str) {
        self.creations.retain(|c| c.subject != subject);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(user: &str, subject: &str, mode: AccessMode, new_node: bool) -> PendingAdd {
        PendingAdd {
            user: user.to_string(),
            subject: subject.to_string(),
            mode,
            new_node,
        }
    }

    #[test]
    fn test_cancel_add_removes_match_only() {
        let mut changes = ChangeSet::new();
        changes.push_add(add("alice", "n1", AccessMode::Read, true));
        changes.push_add(add("alice", "n1", AccessMode::Write, false));

        let cancelled = changes.cancel_add("alice", AccessMode::Read).unwrap();
        assert!(cancelled.new_node);
        assert_eq!(changes.adds().len(), 1);
        assert!(changes.cancel_add("alice", AccessMode::Read).is_none());
    }

    #[test]
    fn test_promote_add_after_new_node_cancel() {
        let mut changes = ChangeSet::new();
        changes.push_add(add("alice", "n1", AccessMode::Read, true));
        changes.push_add(add("alice", "n1", AccessMode::Write, false));

        changes.cancel_add("alice", AccessMode::Read);
        assert!(changes.has_add_for("n1"));
        changes.promote_add("n1");
        assert!(changes.adds()[0].new_node);
    }

    #[test]
    fn test_cancel_remove() {
        let mut changes = ChangeSet::new();
        changes.push_remove(PendingRemove {
            user: "alice".to_string(),
            subject: "n1".to_string(),
            mode: AccessMode::Read,
            zombie: true,
        });

        let cancelled = changes.cancel_remove("alice", AccessMode::Read).unwrap();
        assert!(cancelled.zombie);
        assert!(changes.is_empty());
    }

    #[test]
    fn test_creation_mode_trimming() {
        let mut changes = ChangeSet::new();
        changes.push_creation(NodeCreation {
            subject: "n2".to_string(),
            user: "alice".to_string(),
            modes: BTreeSet::from([AccessMode::Read]),
        });

        assert!(changes.creation_contains("n2", AccessMode::Read));
        assert!(changes.remove_creation_mode("n2", AccessMode::Read));
        assert!(changes.creation_is_empty("n2"));

        changes.remove_creation("n2");
        assert!(!changes.creation_contains("n2", AccessMode::Read));
    }

    #[test]
    fn test_clear_empties_every_queue() {
        let mut changes = ChangeSet::new();
        changes.push_add(add("alice", "n1", AccessMode::Read, false));
        changes.push_membership_delete(Triple::new("n0", "p", "alice"));
        assert!(!changes.is_empty());

        changes.clear();
        assert!(changes.is_empty());
    }
}
