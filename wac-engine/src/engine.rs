//! The ACL engine: hydration, grant mutation with node splitting, and
//! atomic commit
//!
//! One engine instance manages the ACL document of exactly one remote
//! resource. Mutating operations take `&mut self`, so exclusive access
//! is enforced at the type level; the engine holds no locks of its own.
//!
//! Authorization nodes are only valid to share while every co-tenant
//! holds the identical mode set. Any edit that would break that first
//! isolates the edited agent onto a private node (a *split*), leaving
//! every other tenant's effective permissions untouched. A node whose
//! last mode is removed becomes a *zombie* and is wiped in full after
//! the main patch.

use crate::changeset::{ChangeSet, NodeCreation, PendingAdd, PendingRemove};
use crate::error::{AclError, Result};
use crate::mode::AccessMode;
use crate::model::{Grant, PolicyModel, WILDCARD};
use crate::store::TripleStore;
use crate::triple::{Triple, TripleSet};
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info};
use wac_vocab::{acl, foaf, rdf};

/// Length of the random fragment for brand-new authorization nodes
const NODE_FRAGMENT_LEN: usize = 8;
/// Length of the random suffix appended when splitting a shared node
const SPLIT_SUFFIX_LEN: usize = 4;

/// Policy engine for one remote ACL resource
pub struct AclEngine<S> {
    store: Arc<S>,
    resource_uri: String,
    acl_uri: Option<String>,
    model: PolicyModel,
    changes: ChangeSet,
}

impl<S: TripleStore> AclEngine<S> {
    /// Create an engine for `resource_uri`.
    ///
    /// The engine answers no-permission for everything until
    /// [`initialize`](Self::initialize) hydrates it.
    pub fn new(store: Arc<S>, resource_uri: impl Into<String>) -> Self {
        Self {
            store,
            resource_uri: resource_uri.into(),
            acl_uri: None,
            model: PolicyModel::new(),
            changes: ChangeSet::new(),
        }
    }

    /// The resource this engine manages permissions for
    pub fn resource_uri(&self) -> &str {
        &self.resource_uri
    }

    /// The resolved ACL document URI, once initialized
    pub fn acl_uri(&self) -> Option<&str> {
        self.acl_uri.as_deref()
    }

    /// The hydrated policy model
    pub fn model(&self) -> &PolicyModel {
        &self.model
    }

    /// The pending operation queues
    pub fn changes(&self) -> &ChangeSet {
        &self.changes
    }

    /// Resolve the ACL URI, fetch the document, and hydrate the model.
    ///
    /// On failure the engine is left unhydrated and every read query
    /// reports no permissions (fail closed). No in-memory state changes
    /// until the fetch has completed, so abandoning the future mid-flight
    /// leaves the engine untouched.
    pub async fn initialize(&mut self) -> Result<()> {
        let acl_uri = self.store.resolve_acl_uri(&self.resource_uri).await?;
        let triples = self.store.fetch_triples(&acl_uri).await?;
        let model = PolicyModel::hydrate(&triples);
        debug!(
            acl_uri = %acl_uri,
            triples = triples.len(),
            grants = model.grants().len(),
            "hydrated ACL model"
        );
        self.acl_uri = Some(acl_uri);
        self.model = model;
        self.changes.clear();
        Ok(())
    }

    /// Whether `user` effectively holds the mode named `mode`.
    ///
    /// Unknown mode names answer `false`, never an error. The wildcard
    /// grant overlays.
    pub fn is_allowed(&self, user: &str, mode: &str) -> bool {
        match AccessMode::parse(mode) {
            Some(mode) => self.model.is_allowed(user, mode),
            None => false,
        }
    }

    /// Deduplicated modes held by `user`; unless `strict`, wildcard
    /// modes are unioned in
    pub fn allowed_permissions(&self, user: &str, strict: bool) -> Vec<AccessMode> {
        self.model.permissions_for(user, strict).into_iter().collect()
    }

    /// Exact holders of the mode named `mode` (no wildcard expansion);
    /// unknown mode names answer an empty list
    pub fn all_allowed_users(&self, mode: &str) -> Vec<String> {
        match AccessMode::parse(mode) {
            Some(mode) => self
                .model
                .users_with_mode(mode)
                .into_iter()
                .map(String::from)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Grant `mode` to `user`.
    ///
    /// A still-pending removal of the same grant is cancelled instead of
    /// queuing a new operation. Granting a mode the user already holds
    /// fails with [`AclError::Validation`]. If the user's node is shared,
    /// the user is first split onto a private node so co-tenants keep
    /// their exact permissions.
    pub fn allow(&mut self, user: &str, mode: AccessMode) -> Result<()> {
        // Undo: disallow followed by allow of the same grant cancels out,
        // restoring the grant against the node the removal targeted.
        if let Some(removed) = self.changes.cancel_remove(user, mode) {
            self.model.restore_mode(user, &removed.subject, mode);
            return Ok(());
        }

        if self.model.holds(user, mode) {
            return Err(AclError::validation(format!(
                "{user} already holds {mode} on {}",
                self.resource_uri
            )));
        }
        let acl_uri = self.require_acl_uri()?.to_string();

        loop {
            let source = match self.model.grant_for(user) {
                Some(grant) => grant.source.clone(),
                None => {
                    // No grant at all: a brand-new node with only this mode.
                    let subject = format!("{acl_uri}#{}", random_fragment(NODE_FRAGMENT_LEN));
                    self.model.push(Grant {
                        user: user.to_string(),
                        source: subject.clone(),
                        modes: BTreeSet::from([mode]),
                    });
                    self.changes.push_add(PendingAdd {
                        user: user.to_string(),
                        subject,
                        mode,
                        new_node: true,
                    });
                    return Ok(());
                }
            };

            if self.model.agents_on(&source).len() > 1 {
                // Splitting never adds the mode itself; loop back so the
                // grant re-resolves to the private-node case.
                self.split(user, &source);
                continue;
            }

            self.model.insert_mode(user, &source, mode);
            self.changes.push_add(PendingAdd {
                user: user.to_string(),
                subject: source,
                mode,
                new_node: false,
            });
            return Ok(());
        }
    }

    /// Take `mode` from `user`.
    ///
    /// Absence of the grant is a no-op, not an error. A still-pending
    /// addition of the same grant is cancelled instead of queuing a new
    /// operation. A shared node is split first so co-tenants are
    /// untouched; a private node emptied of its last mode becomes a
    /// zombie and is deleted in full at commit.
    pub fn remove_allow(&mut self, user: &str, mode: AccessMode) {
        // Undo: allow followed by disallow of the same grant cancels out.
        if let Some(add) = self.changes.cancel_add(user, mode) {
            self.model.drop_mode(user, &add.subject, mode);
            if self.changes.has_add_for(&add.subject) {
                if add.new_node {
                    // Another pending addition now carries the node boilerplate.
                    self.changes.promote_add(&add.subject);
                }
            } else if self
                .model
                .grant_modes(user, &add.subject)
                .is_some_and(|m| m.is_empty())
            {
                // Nothing else pending and no modes left: the node exists
                // only in memory (a fresh node, or a split creation already
                // trimmed empty). Drop it so commit never emits boilerplate
                // for a node granting nothing.
                self.changes.remove_creation(&add.subject);
                self.model.remove_grant(user, &add.subject);
            }
            return;
        }

        let source = match self.model.grant_holding(user, mode) {
            Some(grant) => grant.source.clone(),
            None => return,
        };
        let source = if self.model.agents_on(&source).len() > 1 {
            self.split(user, &source)
        } else {
            source
        };

        if self.changes.creation_contains(&source, mode) {
            // The node is itself pending creation: trim the creation
            // instead of queuing a delete against a node that does not
            // exist remotely yet.
            self.changes.remove_creation_mode(&source, mode);
            self.model.drop_mode(user, &source, mode);
            if self.changes.creation_is_empty(&source) && !self.changes.has_add_for(&source) {
                self.changes.remove_creation(&source);
                self.model.remove_grant(user, &source);
            }
            return;
        }

        self.model.drop_mode(user, &source, mode);
        let zombie = self
            .model
            .grant_modes(user, &source)
            .map_or(true, |m| m.is_empty());
        if zombie {
            debug!(user, subject = %source, "authorization node emptied, marking zombie");
            self.model.remove_grant(user, &source);
        }
        self.changes.push_remove(PendingRemove {
            user: user.to_string(),
            subject: source,
            mode,
            zombie,
        });
    }

    /// Apply every pending operation as one atomic remote patch.
    ///
    /// A commit with empty queues is a no-op and issues no patch. On
    /// patch failure the queues and model are left exactly as before the
    /// call, so a retry re-issues the same patch. On success, each
    /// zombie node is wiped with a separate full-subject deletion and
    /// the queues are cleared. Zombie wipes run after the main patch so
    /// a node with unrelated pending edits is never deleted
    /// mid-transaction.
    pub async fn commit(&mut self) -> Result<()> {
        if self.changes.is_empty() {
            return Ok(());
        }
        let acl_uri = self.require_acl_uri()?.to_string();

        let mut inserts = TripleSet::new();
        let mut deletes = TripleSet::new();
        let mut zombies: Vec<&str> = Vec::new();

        for creation in self.changes.creations() {
            for triple in self.node_triples(&creation.subject, &creation.user, &creation.modes) {
                inserts.insert(triple);
            }
        }
        for add in self.changes.adds() {
            if add.new_node {
                let modes = BTreeSet::from([add.mode]);
                for triple in self.node_triples(&add.subject, &add.user, &modes) {
                    inserts.insert(triple);
                }
            } else {
                inserts.insert(Triple::new(&add.subject, acl::MODE, add.mode.iri()));
            }
        }
        for triple in self.changes.membership_deletes() {
            deletes.insert(triple.clone());
        }
        for remove in self.changes.removes() {
            if remove.zombie {
                zombies.push(&remove.subject);
            } else {
                deletes.insert(Triple::new(&remove.subject, acl::MODE, remove.mode.iri()));
            }
        }

        info!(
            acl_uri = %acl_uri,
            inserts = inserts.len(),
            deletes = deletes.len(),
            zombies = zombies.len(),
            "committing ACL patch"
        );
        if !deletes.is_empty() || !inserts.is_empty() {
            self.store
                .patch(&acl_uri, deletes.as_slice(), inserts.as_slice())
                .await?;
        }

        for subject in zombies {
            debug!(subject, "wiping zombie authorization node");
            self.store.delete_subject(&acl_uri, subject).await?;
        }
        self.changes.clear();
        Ok(())
    }

    /// Isolate `user` onto a fresh private node carrying their current
    /// modes, queuing the membership delete on the shared node. Returns
    /// the new node URI.
    fn split(&mut self, user: &str, source: &str) -> String {
        let modes = self
            .model
            .grant_modes(user, source)
            .cloned()
            .unwrap_or_default();
        let new_subject = format!("{source}{}", random_fragment(SPLIT_SUFFIX_LEN));
        debug!(user, from = source, to = %new_subject, "splitting shared authorization node");

        let membership = if user == WILDCARD {
            Triple::new(source, acl::AGENT_CLASS, foaf::AGENT)
        } else {
            Triple::new(source, acl::AGENT, user)
        };
        self.changes.push_membership_delete(membership);
        self.changes.push_creation(NodeCreation {
            subject: new_subject.clone(),
            user: user.to_string(),
            modes,
        });
        self.model.set_source(user, source, &new_subject);
        new_subject
    }

    /// Full triple set for an authorization node granting `modes` to
    /// `user` on this engine's resource
    fn node_triples(&self, subject: &str, user: &str, modes: &BTreeSet<AccessMode>) -> Vec<Triple> {
        let mut triples = vec![
            Triple::new(subject, rdf::TYPE, acl::AUTHORIZATION),
            Triple::new(subject, acl::ACCESS_TO, &self.resource_uri),
            if user == WILDCARD {
                Triple::new(subject, acl::AGENT_CLASS, foaf::AGENT)
            } else {
                Triple::new(subject, acl::AGENT, user)
            },
        ];
        triples.extend(
            modes
                .iter()
                .map(|mode| Triple::new(subject, acl::MODE, mode.iri())),
        );
        triples
    }

    fn require_acl_uri(&self) -> Result<&str> {
        self.acl_uri
            .as_deref()
            .ok_or_else(|| AclError::validation("engine not initialized; call initialize() first"))
    }
}

impl<S> std::fmt::Debug for AclEngine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AclEngine")
            .field("resource_uri", &self.resource_uri)
            .field("acl_uri", &self.acl_uri)
            .field("grants", &self.model.grants().len())
            .finish_non_exhaustive()
    }
}

fn random_fragment(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryTripleStore;

    const RESOURCE: &str = "https://box.example/docs/report";

    #[tokio::test]
    async fn test_allow_before_initialize_fails() {
        let store = Arc::new(MemoryTripleStore::new());
        let mut engine = AclEngine::new(store, RESOURCE);
        let err = engine
            .allow("https://alice.example/card#me", AccessMode::Read)
            .unwrap_err();
        assert!(matches!(err, AclError::Validation(_)));
    }

    #[tokio::test]
    async fn test_allow_without_grant_queues_new_node() {
        let store = Arc::new(MemoryTripleStore::new());
        store.insert_document(format!("{RESOURCE}.acl"), Vec::new());
        let mut engine = AclEngine::new(store, RESOURCE);
        engine.initialize().await.unwrap();

        engine
            .allow("https://alice.example/card#me", AccessMode::Write)
            .unwrap();
        let adds = engine.changes().adds();
        assert_eq!(adds.len(), 1);
        assert!(adds[0].new_node);
        assert!(adds[0].subject.starts_with(&format!("{RESOURCE}.acl#")));
    }

    #[tokio::test]
    async fn test_unknown_mode_names_fail_closed() {
        let store = Arc::new(MemoryTripleStore::new());
        let engine = AclEngine::new(store, RESOURCE);
        assert!(!engine.is_allowed("anyone", "append"));
        assert!(engine.all_allowed_users("append").is_empty());
    }
}
