//! In-memory policy model hydrated from ACL triples
//!
//! The model is a flat list of grants, one per `(agent, authorization
//! node)` membership, built from a single fetch of the ACL document.
//! It reflects server state only as of the hydration instant; queries
//! never touch the network.

use crate::mode::AccessMode;
use crate::triple::Triple;
use std::collections::{BTreeSet, HashSet};
use wac_vocab::{acl, foaf};

/// The wildcard agent, standing for public access
pub const WILDCARD: &str = "*";

/// One agent's membership on one authorization node
///
/// Invariant: every grant sharing a `source` node carries the identical
/// mode set. Divergence is resolved by splitting the node before the
/// diverging edit is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    /// Agent IRI, or [`WILDCARD`] for the public grant
    pub user: String,
    /// URI of the authorization node this grant belongs to
    pub source: String,
    /// Modes held through this node
    pub modes: BTreeSet<AccessMode>,
}

/// In-memory model of one ACL document
#[derive(Debug, Default)]
pub struct PolicyModel {
    grants: Vec<Grant>,
}

impl PolicyModel {
    /// Create an empty model (all queries report no permissions)
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the model from fetched triples.
    ///
    /// `agentClass = foaf:Agent` triples create the wildcard grant,
    /// `agent` triples create specific grants, and each grant then
    /// collects every mode triple whose subject is its source node.
    /// Mode objects outside the WAC vocabulary are ignored.
    pub fn hydrate(triples: &[Triple]) -> Self {
        let mut grants: Vec<Grant> = Vec::new();

        for t in triples {
            if t.predicate == acl::AGENT_CLASS && t.object == foaf::AGENT {
                grants.push(Grant {
                    user: WILDCARD.to_string(),
                    source: t.subject.clone(),
                    modes: BTreeSet::new(),
                });
            }
        }
        for t in triples {
            if t.predicate == acl::AGENT {
                grants.push(Grant {
                    user: t.object.clone(),
                    source: t.subject.clone(),
                    modes: BTreeSet::new(),
                });
            }
        }
        for grant in &mut grants {
            for t in triples {
                if t.predicate == acl::MODE && t.subject == grant.source {
                    if let Some(mode) = AccessMode::from_iri(&t.object) {
                        grant.modes.insert(mode);
                    }
                }
            }
        }

        Self { grants }
    }

    /// All grants in hydration/creation order
    pub fn grants(&self) -> &[Grant] {
        &self.grants
    }

    /// The first grant held by `user`, if any
    pub fn grant_for(&self, user: &str) -> Option<&Grant> {
        self.grants.iter().find(|g| g.user == user)
    }

    /// The first grant of `user` carrying `mode`, if any
    pub fn grant_holding(&self, user: &str, mode: AccessMode) -> Option<&Grant> {
        self.grants
            .iter()
            .find(|g| g.user == user && g.modes.contains(&mode))
    }

    /// True if any grant of `user` carries `mode` (no wildcard overlay)
    pub fn holds(&self, user: &str, mode: AccessMode) -> bool {
        self.grant_holding(user, mode).is_some()
    }

    /// The mode set of the grant `(user, source)`, if that grant exists
    pub fn grant_modes(&self, user: &str, source: &str) -> Option<&BTreeSet<AccessMode>> {
        self.grants
            .iter()
            .find(|g| g.user == user && g.source == source)
            .map(|g| &g.modes)
    }

    /// Distinct agents holding grants on the node `source`
    pub fn agents_on(&self, source: &str) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.grants
            .iter()
            .filter(|g| g.source == source)
            .filter(|g| seen.insert(g.user.as_str()))
            .map(|g| g.user.as_str())
            .collect()
    }

    /// Deduplicated modes held by `user`.
    ///
    /// Unless `strict`, wildcard modes are unioned in, since they apply
    /// to every agent. The wildcard user itself never overlays.
    pub fn permissions_for(&self, user: &str, strict: bool) -> BTreeSet<AccessMode> {
        let mut modes: BTreeSet<AccessMode> = self
            .grants
            .iter()
            .filter(|g| g.user == user)
            .flat_map(|g| g.modes.iter().copied())
            .collect();
        if !strict && user != WILDCARD {
            modes.extend(self.permissions_for(WILDCARD, true));
        }
        modes
    }

    /// True if `user` effectively holds `mode` (wildcard overlay applies)
    pub fn is_allowed(&self, user: &str, mode: AccessMode) -> bool {
        self.permissions_for(user, false).contains(&mode)
    }

    /// Distinct exact holders of `mode`, in grant order.
    ///
    /// The wildcard grant is excluded by contract; callers wanting the
    /// effective answer for one agent use [`is_allowed`](Self::is_allowed).
    pub fn users_with_mode(&self, mode: AccessMode) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.grants
            .iter()
            .filter(|g| g.user != WILDCARD && g.modes.contains(&mode))
            .filter(|g| seen.insert(g.user.as_str()))
            .map(|g| g.user.as_str())
            .collect()
    }

    // ------------------------------------------------------------------
    // Mutators (engine-internal; grants are addressed by (user, source))
    // ------------------------------------------------------------------

    pub(crate) fn push(&mut self, grant: Grant) {
        self.grants.push(grant);
    }

    pub(crate) fn insert_mode(&mut self, user: &str, source: &str, mode: AccessMode) {
        if let Some(g) = self
            .grants
            .iter_mut()
            .find(|g| g.user == user && g.source == source)
        {
            g.modes.insert(mode);
        }
    }

    pub(crate) fn drop_mode(&mut self, user: &str, source: &str, mode: AccessMode) {
        if let Some(g) = self
            .grants
            .iter_mut()
            .find(|g| g.user == user && g.source == source)
        {
            g.modes.remove(&mode);
        }
    }

    /// Put `mode` back for `user` on `source`, recreating the grant if
    /// its removal already dropped it (the zombie case).
    pub(crate) fn restore_mode(&mut self, user: &str, source: &str, mode: AccessMode) {
        if let Some(g) = self
            .grants
            .iter_mut()
            .find(|g| g.user == user && g.source == source)
        {
            g.modes.insert(mode);
        } else {
            self.grants.push(Grant {
                user: user.to_string(),
                source: source.to_string(),
                modes: BTreeSet::from([mode]),
            });
        }
    }

    /// Re-point the grant `(user, old_source)` at a freshly split node
    pub(crate) fn set_source(&mut self, user: &str, old_source: &str, new_source: &str) {
        if let Some(g) = self
            .grants
            .iter_mut()
            .find(|g| g.user == user && g.source == old_source)
        {
            g.source = new_source.to_string();
        }
    }

    pub(crate) fn remove_grant(&mut self, user: &str, source: &str) {
        self.grants
            .retain(|g| !(g.user == user && g.source == source));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wac_vocab::rdf;

    const RESOURCE: &str = "https://box.example/docs/report";
    const ACL: &str = "https://box.example/docs/report.acl";

    fn node_triples(frag: &str, agents: &[&str], modes: &[&str]) -> Vec<Triple> {
        let subject = format!("{ACL}#{frag}");
        let mut triples = vec![
            Triple::new(&subject, rdf::TYPE, acl::AUTHORIZATION),
            Triple::new(&subject, acl::ACCESS_TO, RESOURCE),
        ];
        for agent in agents {
            if *agent == WILDCARD {
                triples.push(Triple::new(&subject, acl::AGENT_CLASS, foaf::AGENT));
            } else {
                triples.push(Triple::new(&subject, acl::AGENT, *agent));
            }
        }
        for mode in modes {
            triples.push(Triple::new(&subject, acl::MODE, *mode));
        }
        triples
    }

    fn sample_model() -> PolicyModel {
        let mut triples = node_triples("a", &["https://alice.example/card#me"], &[acl::READ]);
        triples.extend(node_triples("b", &[WILDCARD], &[acl::WRITE]));
        PolicyModel::hydrate(&triples)
    }

    #[test]
    fn test_hydrate_collects_grants_and_modes() {
        let model = sample_model();
        assert_eq!(model.grants().len(), 2);

        let alice = model.grant_for("https://alice.example/card#me").unwrap();
        assert_eq!(alice.modes, BTreeSet::from([AccessMode::Read]));

        let public = model.grant_for(WILDCARD).unwrap();
        assert_eq!(public.modes, BTreeSet::from([AccessMode::Write]));
    }

    #[test]
    fn test_hydrate_ignores_foreign_mode_iris() {
        let mut triples = node_triples("a", &["https://alice.example/card#me"], &[acl::READ]);
        triples.push(Triple::new(
            format!("{ACL}#a"),
            acl::MODE,
            "http://example.org/Append",
        ));
        let model = PolicyModel::hydrate(&triples);
        let alice = model.grant_for("https://alice.example/card#me").unwrap();
        assert_eq!(alice.modes, BTreeSet::from([AccessMode::Read]));
    }

    #[test]
    fn test_wildcard_overlay() {
        let model = sample_model();
        let user = "https://alice.example/card#me";
        assert_eq!(
            model.permissions_for(user, false),
            BTreeSet::from([AccessMode::Read, AccessMode::Write])
        );
        assert_eq!(
            model.permissions_for(user, true),
            BTreeSet::from([AccessMode::Read])
        );
        // The wildcard user never overlays onto itself.
        assert_eq!(
            model.permissions_for(WILDCARD, false),
            BTreeSet::from([AccessMode::Write])
        );
    }

    #[test]
    fn test_users_with_mode_excludes_wildcard() {
        let model = sample_model();
        assert_eq!(
            model.users_with_mode(AccessMode::Read),
            vec!["https://alice.example/card#me"]
        );
        // The public grant holds Write, but is excluded by contract.
        assert!(model.users_with_mode(AccessMode::Write).is_empty());
    }

    #[test]
    fn test_agents_on_shared_node() {
        let triples = node_triples(
            "shared",
            &["https://alice.example/card#me", "https://bob.example/card#me"],
            &[acl::READ],
        );
        let model = PolicyModel::hydrate(&triples);
        let agents = model.agents_on(&format!("{ACL}#shared"));
        assert_eq!(agents.len(), 2);
    }

    #[test]
    fn test_empty_model_fails_closed() {
        let model = PolicyModel::new();
        assert!(!model.is_allowed("anyone", AccessMode::Read));
        assert!(model.permissions_for("anyone", false).is_empty());
        assert!(model.users_with_mode(AccessMode::Read).is_empty());
    }
}
