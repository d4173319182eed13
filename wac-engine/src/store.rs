//! Transport traits for reading and patching remote triple documents
//!
//! This module defines the transport seam the engine consumes. Callers
//! provide an implementation backed by their Linked-Data store; the
//! engine never speaks HTTP itself.
//!
//! ## Trait
//!
//! - `TripleStore`: fetch a document's triples, resolve a resource's ACL
//!   URI, apply one atomic patch, and wipe a subject
//!
//! ## Implementations
//!
//! `MemoryTripleStore` is a simple in-memory implementation for unit and
//! integration tests, with an injectable write-failure switch and a patch
//! counter for asserting commit behavior.

use crate::error::{AclError, Result};
use crate::triple::Triple;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

/// Transport capability consumed by the engine
///
/// All operations are asynchronous and cancellation-safe: dropping an
/// in-flight future must leave the remote document unchanged or changed
/// atomically, never half-applied.
#[async_trait]
pub trait TripleStore: Debug + Send + Sync {
    /// Fetch every triple of the document at `uri`.
    ///
    /// Returns `AclError::NotFound` if the document does not exist.
    async fn fetch_triples(&self, uri: &str) -> Result<Vec<Triple>>;

    /// Resolve the URI of the ACL document governing `resource_uri`.
    async fn resolve_acl_uri(&self, resource_uri: &str) -> Result<String>;

    /// Apply one atomic patch to the document at `uri`: remove every
    /// triple in `deletes`, then add every triple in `inserts`.
    ///
    /// The patch must be all-or-nothing from the caller's view.
    async fn patch(&self, uri: &str, deletes: &[Triple], inserts: &[Triple]) -> Result<()>;

    /// Delete every triple of the document at `uri` whose subject is
    /// `subject`.
    ///
    /// Idempotent: a subject with no triples left is not an error.
    async fn delete_subject(&self, uri: &str, subject: &str) -> Result<()>;
}

/// A simple in-memory triple store for testing
///
/// Documents are held in a HashMap with interior mutability (via
/// `Arc<RwLock<...>>`), so clones share state. Triples behave as a set:
/// inserting a triple twice keeps one copy, matching RDF graph semantics.
#[derive(Debug, Clone, Default)]
pub struct MemoryTripleStore {
    docs: Arc<RwLock<HashMap<String, Vec<Triple>>>>,
    fail_writes: Arc<AtomicBool>,
    patch_count: Arc<AtomicUsize>,
}

impl MemoryTripleStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) the document at `uri`
    pub fn insert_document(&self, uri: impl Into<String>, triples: Vec<Triple>) {
        self.docs
            .write()
            .expect("RwLock poisoned")
            .insert(uri.into(), triples);
    }

    /// Snapshot the triples of the document at `uri` (empty if absent)
    pub fn document(&self, uri: &str) -> Vec<Triple> {
        self.docs
            .read()
            .expect("RwLock poisoned")
            .get(uri)
            .cloned()
            .unwrap_or_default()
    }

    /// Toggle simulated transport failure for all mutating calls
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of patches applied so far
    pub fn patch_count(&self) -> usize {
        self.patch_count.load(Ordering::SeqCst)
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(AclError::network("simulated transport failure"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl TripleStore for MemoryTripleStore {
    async fn fetch_triples(&self, uri: &str) -> Result<Vec<Triple>> {
        self.docs
            .read()
            .expect("RwLock poisoned")
            .get(uri)
            .cloned()
            .ok_or_else(|| AclError::not_found(uri))
    }

    async fn resolve_acl_uri(&self, resource_uri: &str) -> Result<String> {
        Ok(format!("{resource_uri}.acl"))
    }

    async fn patch(&self, uri: &str, deletes: &[Triple], inserts: &[Triple]) -> Result<()> {
        self.check_writable()?;
        let mut docs = self.docs.write().expect("RwLock poisoned");
        let doc = docs.entry(uri.to_string()).or_default();
        doc.retain(|t| !deletes.contains(t));
        for triple in inserts {
            if !doc.contains(triple) {
                doc.push(triple.clone());
            }
        }
        self.patch_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete_subject(&self, uri: &str, subject: &str) -> Result<()> {
        self.check_writable()?;
        let mut docs = self.docs.write().expect("RwLock poisoned");
        if let Some(doc) = docs.get_mut(uri) {
            doc.retain(|t| t.subject != subject);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_fetch_not_found() {
        let store = MemoryTripleStore::new();
        let result = store.fetch_triples("https://box.example/missing.acl").await;
        assert!(matches!(result, Err(AclError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_memory_store_patch_set_semantics() {
        let store = MemoryTripleStore::new();
        let uri = "https://box.example/doc.acl";
        let a = Triple::new("s", "p", "a");
        let b = Triple::new("s", "p", "b");
        store.insert_document(uri, vec![a.clone()]);

        // Deleting `a`, inserting `b` twice keeps a single copy of `b`.
        store
            .patch(uri, &[a.clone()], &[b.clone(), b.clone()])
            .await
            .unwrap();
        assert_eq!(store.document(uri), vec![b]);
        assert_eq!(store.patch_count(), 1);
    }

    #[tokio::test]
    async fn test_memory_store_delete_subject() {
        let store = MemoryTripleStore::new();
        let uri = "https://box.example/doc.acl";
        store.insert_document(
            uri,
            vec![Triple::new("s1", "p", "o"), Triple::new("s2", "p", "o")],
        );

        store.delete_subject(uri, "s1").await.unwrap();
        assert_eq!(store.document(uri), vec![Triple::new("s2", "p", "o")]);

        // Idempotent: wiping again (or a missing doc) succeeds.
        store.delete_subject(uri, "s1").await.unwrap();
        store.delete_subject("missing", "s1").await.unwrap();
    }

    #[tokio::test]
    async fn test_memory_store_fail_switch() {
        let store = MemoryTripleStore::new();
        store.set_fail_writes(true);
        let err = store.patch("u", &[], &[]).await.unwrap_err();
        assert!(matches!(err, AclError::Network(_)));
        assert_eq!(store.patch_count(), 0);

        store.set_fail_writes(false);
        store.patch("u", &[], &[]).await.unwrap();
        assert_eq!(store.patch_count(), 1);
    }
}
