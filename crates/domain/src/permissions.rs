use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::DomainError;

/// Actions a caller can be granted by the sandboxing host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    Admin,
    Post,
    PostUnmoderated,
    PostModerated,
    PostSignIn,
}

impl Permission {
    pub const ALL: [Permission; 5] = [
        Permission::Admin,
        Permission::Post,
        Permission::PostUnmoderated,
        Permission::PostModerated,
        Permission::PostSignIn,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Admin => "admin",
            Permission::Post => "post",
            Permission::PostUnmoderated => "post-unmoderated",
            Permission::PostModerated => "post-moderated",
            Permission::PostSignIn => "post-sign-in",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| DomainError::UnknownPermission(s.to_string()))
    }
}

/// What a caller is allowed to do.
///
/// `Unrestricted` is what callers get when nothing enforces permissions;
/// `Granted` is an exact-match allow-list with no implied hierarchy, so
/// holding `admin` says nothing about `post`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capabilities {
    Unrestricted,
    Granted(HashSet<Permission>),
}

impl Capabilities {
    /// Parses a comma-separated claim list. Names are matched verbatim;
    /// unknown names and empty entries are ignored.
    pub fn from_claims(header: &str) -> Self {
        let granted = header
            .split(',')
            .filter_map(|name| name.parse::<Permission>().ok())
            .collect();
        Capabilities::Granted(granted)
    }

    pub fn none() -> Self {
        Capabilities::Granted(HashSet::new())
    }

    pub fn allows(&self, permission: Permission) -> bool {
        match self {
            Capabilities::Unrestricted => true,
            Capabilities::Granted(set) => set.contains(&permission),
        }
    }

    pub fn allows_any(&self, permissions: &[Permission]) -> bool {
        permissions.iter().any(|p| self.allows(*p))
    }

    /// Moderation state forced by an explicit posting claim, if any.
    /// `post-moderated` wins when both variants are present.
    pub fn forced_moderation(&self) -> Option<bool> {
        match self {
            Capabilities::Unrestricted => None,
            Capabilities::Granted(set) => {
                if set.contains(&Permission::PostModerated) {
                    Some(true)
                } else if set.contains(&Permission::PostUnmoderated) {
                    Some(false)
                } else {
                    None
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claims_are_exact_matches() {
        let caps = Capabilities::from_claims("post");
        assert!(caps.allows(Permission::Post));
        assert!(!caps.allows(Permission::Admin));

        let caps = Capabilities::from_claims("admin");
        assert!(caps.allows(Permission::Admin));
        assert!(!caps.allows(Permission::Post));

        // no trimming, no case folding
        let caps = Capabilities::from_claims(" admin,POST");
        assert!(!caps.allows(Permission::Admin));
        assert!(!caps.allows(Permission::Post));
    }

    #[test]
    fn empty_header_denies_everything() {
        let caps = Capabilities::from_claims("");
        for p in Permission::ALL {
            assert!(!caps.allows(p), "{p} should be denied");
        }
        assert_eq!(caps, Capabilities::none());
    }

    #[test]
    fn unrestricted_allows_everything_but_forces_nothing() {
        let caps = Capabilities::Unrestricted;
        for p in Permission::ALL {
            assert!(caps.allows(p));
        }
        assert_eq!(caps.forced_moderation(), None);
    }

    #[test]
    fn posting_variants_force_moderation() {
        assert_eq!(
            Capabilities::from_claims("post,post-unmoderated").forced_moderation(),
            Some(false)
        );
        assert_eq!(
            Capabilities::from_claims("post-moderated").forced_moderation(),
            Some(true)
        );
        assert_eq!(
            Capabilities::from_claims("post-moderated,post-unmoderated").forced_moderation(),
            Some(true)
        );
        assert_eq!(Capabilities::from_claims("post").forced_moderation(), None);
    }

    #[test]
    fn permission_names_round_trip() {
        for p in Permission::ALL {
            assert_eq!(p.as_str().parse::<Permission>(), Ok(p));
        }
        assert!("root".parse::<Permission>().is_err());
    }
}
