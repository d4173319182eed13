//! Permission modes
//!
//! The WAC vocabulary fixes three permission modes: Read, Write, and
//! Control. Modes cross the public API as short lowercase names
//! (`"read"`, `"write"`, `"control"`) on the query side, where unknown
//! names must answer "not allowed" rather than fail, and as typed
//! [`AccessMode`] values on the mutation side.

use std::fmt;
use wac_vocab::acl;

/// A WAC permission mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AccessMode {
    /// Permission to read the resource
    Read,
    /// Permission to write the resource
    Write,
    /// Permission to edit the resource's ACL
    Control,
}

impl AccessMode {
    /// Parse a short mode name (`"read"`, `"write"`, `"control"`).
    ///
    /// Unknown names yield `None`, never an error.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "read" => Some(AccessMode::Read),
            "write" => Some(AccessMode::Write),
            "control" => Some(AccessMode::Control),
            _ => None,
        }
    }

    /// Resolve a mode from its full IRI.
    ///
    /// Non-mode IRIs yield `None`.
    pub fn from_iri(iri: &str) -> Option<Self> {
        match iri {
            acl::READ => Some(AccessMode::Read),
            acl::WRITE => Some(AccessMode::Write),
            acl::CONTROL => Some(AccessMode::Control),
            _ => None,
        }
    }

    /// The full IRI of this mode
    pub fn iri(self) -> &'static str {
        match self {
            AccessMode::Read => acl::READ,
            AccessMode::Write => acl::WRITE,
            AccessMode::Control => acl::CONTROL,
        }
    }

    /// The short name of this mode
    pub fn name(self) -> &'static str {
        match self {
            AccessMode::Read => "read",
            AccessMode::Write => "write",
            AccessMode::Control => "control",
        }
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_names() {
        assert_eq!(AccessMode::parse("read"), Some(AccessMode::Read));
        assert_eq!(AccessMode::parse("write"), Some(AccessMode::Write));
        assert_eq!(AccessMode::parse("control"), Some(AccessMode::Control));
    }

    #[test]
    fn test_parse_unknown_name() {
        assert_eq!(AccessMode::parse("append"), None);
        assert_eq!(AccessMode::parse("Read"), None);
        assert_eq!(AccessMode::parse(""), None);
    }

    #[test]
    fn test_iri_round_trip() {
        for mode in [AccessMode::Read, AccessMode::Write, AccessMode::Control] {
            assert_eq!(AccessMode::from_iri(mode.iri()), Some(mode));
            assert_eq!(AccessMode::parse(mode.name()), Some(mode));
        }
        assert_eq!(AccessMode::from_iri("http://example.org/NotAMode"), None);
    }
}
