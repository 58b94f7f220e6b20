// SPDX-License-Identifier: Apache-2.0
// Copyright 2025-2026 Atrium Team
use serde::{Deserialize, Serialize};

/// Dashboard roles, ordered from least to most privileged.
///
/// The ladder is strict: member < associate < admin. A role satisfies a
/// requirement when its rank is greater than or equal to the required rank,
/// so every role satisfies itself and admin satisfies everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Baseline tier for every signed-up user
    Member,
    /// Staff tier (sprint boards, member management views)
    Associate,
    /// Full administrative access
    Admin,
}

impl Role {
    /// All roles, in ascending privilege order.
    pub const ALL: [Role; 3] = [Role::Member, Role::Associate, Role::Admin];

    /// Parse a role string (case-insensitive).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "member" => Some(Role::Member),
            "associate" => Some(Role::Associate),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    /// Get the role name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Member => "member",
            Role::Associate => "associate",
            Role::Admin => "admin",
        }
    }

    /// Numeric privilege rank. Higher rank implies every permission of
    /// all lower ranks. The mapping is total and strictly increasing.
    pub const fn rank(self) -> u8 {
        match self {
            Role::Member => 1,
            Role::Associate => 2,
            Role::Admin => 3,
        }
    }

    /// Check whether this role meets a required minimum role.
    ///
    /// Reflexive and transitive along the rank ladder.
    pub fn satisfies(self, required: Role) -> bool {
        self.rank() >= required.rank()
    }

    /// Check if this role is the top-ranked admin role.
    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Check if this role is associate or higher.
    ///
    /// Equivalent to `satisfies(Role::Associate)`.
    pub fn is_associate_or_higher(self) -> bool {
        self.satisfies(Role::Associate)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!(Role::from_str("member"), Some(Role::Member));
        assert_eq!(Role::from_str("associate"), Some(Role::Associate));
        assert_eq!(Role::from_str("admin"), Some(Role::Admin));
        assert_eq!(Role::from_str("ADMIN"), Some(Role::Admin));
        assert_eq!(Role::from_str("owner"), None);
        assert_eq!(Role::from_str(""), None);
    }

    #[test]
    fn test_rank_is_strictly_increasing() {
        assert!(Role::Member.rank() < Role::Associate.rank());
        assert!(Role::Associate.rank() < Role::Admin.rank());
    }

    #[test]
    fn test_satisfies_is_reflexive() {
        for role in Role::ALL {
            assert!(role.satisfies(role), "{role} must satisfy itself");
        }
    }

    #[test]
    fn test_satisfies_ladder() {
        // Member requirement is met by every role
        assert!(Role::Member.satisfies(Role::Member));
        assert!(Role::Associate.satisfies(Role::Member));
        assert!(Role::Admin.satisfies(Role::Member));

        // Associate requirement excludes member
        assert!(!Role::Member.satisfies(Role::Associate));
        assert!(Role::Associate.satisfies(Role::Associate));
        assert!(Role::Admin.satisfies(Role::Associate));

        // Admin requirement excludes everything below
        assert!(!Role::Member.satisfies(Role::Admin));
        assert!(!Role::Associate.satisfies(Role::Admin));
        assert!(Role::Admin.satisfies(Role::Admin));
    }

    #[test]
    fn test_satisfies_is_transitive() {
        for low in Role::ALL {
            for mid in Role::ALL {
                for high in Role::ALL {
                    if high.satisfies(mid) && mid.satisfies(low) {
                        assert!(high.satisfies(low));
                    }
                }
            }
        }
    }

    #[test]
    fn test_is_admin() {
        assert!(Role::Admin.is_admin());
        assert!(!Role::Associate.is_admin());
        assert!(!Role::Member.is_admin());
    }

    #[test]
    fn test_is_associate_or_higher() {
        assert!(Role::Admin.is_associate_or_higher());
        assert!(Role::Associate.is_associate_or_higher());
        assert!(!Role::Member.is_associate_or_higher());
    }

    #[test]
    fn test_display_roundtrip() {
        for role in Role::ALL {
            assert_eq!(Role::from_str(&role.to_string()), Some(role));
        }
    }

    #[test]
    fn test_serde_lowercase() {
        let yaml = serde_yaml::to_string(&Role::Associate).unwrap();
        assert_eq!(yaml.trim(), "associate");
        let role: Role = serde_yaml::from_str("admin").unwrap();
        assert_eq!(role, Role::Admin);
    }
}
