//! RDF Vocabulary Constants for Web Access Control
//!
//! This crate provides a centralized location for the vocabulary IRIs used
//! by ACL documents on Linked-Data stores.
//!
//! # Organization
//!
//! Constants are organized by vocabulary:
//! - `rdf` - RDF vocabulary (http://www.w3.org/1999/02/22-rdf-syntax-ns#)
//! - `acl` - WAC vocabulary (http://www.w3.org/ns/auth/acl#)
//! - `foaf` - FOAF vocabulary (http://xmlns.com/foaf/0.1/)

/// RDF vocabulary constants
pub mod rdf {
    /// rdf:type IRI
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
}

/// Web Access Control vocabulary constants
///
/// # Example
/// ```
/// use wac_vocab::acl;
///
/// assert!(acl::AUTHORIZATION.starts_with(acl::NS));
/// ```
pub mod acl {
    /// WAC namespace IRI
    pub const NS: &str = "http://www.w3.org/ns/auth/acl#";

    /// acl:Authorization IRI (the type of every authorization node)
    pub const AUTHORIZATION: &str = "http://www.w3.org/ns/auth/acl#Authorization";

    /// acl:accessTo IRI (the target resource of an authorization)
    pub const ACCESS_TO: &str = "http://www.w3.org/ns/auth/acl#accessTo";

    /// acl:agent IRI (a specific agent the authorization applies to)
    pub const AGENT: &str = "http://www.w3.org/ns/auth/acl#agent";

    /// acl:agentClass IRI (a class of agents the authorization applies to)
    pub const AGENT_CLASS: &str = "http://www.w3.org/ns/auth/acl#agentClass";

    /// acl:mode IRI (a permission mode granted by the authorization)
    pub const MODE: &str = "http://www.w3.org/ns/auth/acl#mode";

    /// acl:Read mode IRI
    pub const READ: &str = "http://www.w3.org/ns/auth/acl#Read";

    /// acl:Write mode IRI
    pub const WRITE: &str = "http://www.w3.org/ns/auth/acl#Write";

    /// acl:Control mode IRI
    pub const CONTROL: &str = "http://www.w3.org/ns/auth/acl#Control";
}

/// FOAF vocabulary constants
pub mod foaf {
    /// FOAF namespace IRI
    pub const NS: &str = "http://xmlns.com/foaf/0.1/";

    /// foaf:Agent IRI
    ///
    /// `acl:agentClass foaf:Agent` denotes the public (wildcard) grant.
    pub const AGENT: &str = "http://xmlns.com/foaf/0.1/Agent";
}
