//! Web Access Control policy engine
//!
//! This crate reconciles an in-memory grant model (who may read, write,
//! or control a resource) against the canonical ACL triple document on a
//! remote Linked-Data store, producing minimal insert/delete operations
//! applied as one atomic patch.
//!
//! # Core Types
//!
//! - [`AclEngine`]: one instance per remote ACL resource; hydration,
//!   grant mutation, and commit
//! - [`PolicyModel`]: in-memory grants derived from fetched triples;
//!   answers permission queries
//! - [`ChangeSet`]: queues of pending operations with undo semantics
//! - [`TripleStore`]: the transport seam callers implement;
//!   [`MemoryTripleStore`] is the in-memory test implementation
//!
//! # Semantics
//!
//! - Authorization nodes may be shared by several agents only while all
//!   of them hold the identical mode set. An edit that would break that
//!   first *splits* the edited agent onto a private node, leaving
//!   co-tenants untouched.
//! - A node emptied of its last mode is a *zombie* and is deleted in
//!   full, after the main patch.
//! - [`AclEngine::commit`] applies everything pending as one atomic
//!   patch: on failure no partial state is observable and a retry
//!   re-issues the same patch; with nothing pending it issues no patch
//!   at all.
//! - Queries fail closed: an unhydrated engine and unknown mode names
//!   both answer "no permission" rather than raising.
//!
//! # Usage
//!
//! Implement [`TripleStore`] over your Linked-Data transport, construct
//! an [`AclEngine`] for the resource, `initialize()` it, then issue any
//! number of `allow`/`remove_allow` calls before a single `commit()`.
//! The engine holds no locks; callers must serialize mutating access per
//! resource, which `&mut self` enforces at the type level.

mod changeset;
mod engine;
mod error;
mod mode;
mod model;
mod store;
mod triple;

pub use changeset::{ChangeSet, NodeCreation, PendingAdd, PendingRemove};
pub use engine::AclEngine;
pub use error::{AclError, Result};
pub use mode::AccessMode;
pub use model::{Grant, PolicyModel, WILDCARD};
pub use store::{MemoryTripleStore, TripleStore};
pub use triple::{Triple, TripleSet};
