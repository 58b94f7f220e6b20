use serde::Deserialize;

use atrium_access::role::Role;

use super::client::SessionError;

/// Raw user record as returned by the backend's auth endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct UserRecord {
    /// User ID
    pub id: String,

    /// Email address
    #[serde(default)]
    pub email: Option<String>,

    /// Custom metadata attached at sign-up
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

/// User-editable metadata block of a backend user record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserMetadata {
    #[serde(default)]
    pub username: Option<String>,

    /// Assigned dashboard role name
    #[serde(default)]
    pub role: Option<String>,
}

/// An authenticated dashboard user.
///
/// This is injected into request extensions by the session middleware.
/// The evaluator only ever reads the `role` field; nothing here is
/// mutated after construction.
#[derive(Debug, Clone)]
pub struct SessionUser {
    /// User ID (from the backend record)
    pub id: String,

    /// Email address
    pub email: Option<String>,

    /// Display name
    pub username: Option<String>,

    /// Resolved dashboard role
    pub role: Role,

    /// Raw token (for revocation on sign-out)
    pub raw_token: String,
}

impl SessionUser {
    /// Build a session user from a backend record.
    ///
    /// Records without an assigned role default to member, the tier every
    /// sign-up starts in. A role string outside the closed set is an
    /// error: it means the backend and the gateway disagree about the
    /// role catalog, which must not be mapped silently onto a tier.
    pub fn from_record(record: UserRecord, raw_token: String) -> Result<Self, SessionError> {
        let role = match record.user_metadata.role.as_deref() {
            None => Role::Member,
            Some(name) => {
                Role::from_str(name).ok_or_else(|| SessionError::UnknownRole(name.to_string()))?
            }
        };

        Ok(Self {
            id: record.id,
            email: record.email,
            username: record.user_metadata.username,
            role,
            raw_token,
        })
    }

    /// Check if the user holds the admin role.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Check if the user's role meets a required minimum.
    pub fn satisfies(&self, required: Role) -> bool {
        self.role.satisfies(required)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(role: Option<&str>) -> UserRecord {
        UserRecord {
            id: "user-123".to_string(),
            email: Some("dana@atrium.dev".to_string()),
            user_metadata: UserMetadata {
                username: Some("dana".to_string()),
                role: role.map(|s| s.to_string()),
            },
        }
    }

    #[test]
    fn test_from_record_with_role() {
        let user = SessionUser::from_record(record(Some("associate")), "tok".into()).unwrap();
        assert_eq!(user.id, "user-123");
        assert_eq!(user.role, Role::Associate);
        assert_eq!(user.username.as_deref(), Some("dana"));
        assert_eq!(user.raw_token, "tok");
    }

    #[test]
    fn test_from_record_defaults_to_member() {
        let user = SessionUser::from_record(record(None), "tok".into()).unwrap();
        assert_eq!(user.role, Role::Member);
    }

    #[test]
    fn test_from_record_rejects_unknown_role() {
        let result = SessionUser::from_record(record(Some("superuser")), "tok".into());
        assert!(matches!(result, Err(SessionError::UnknownRole(name)) if name == "superuser"));
    }

    #[test]
    fn test_record_deserialization() {
        let json = r#"{
            "id": "user-9",
            "email": "lee@atrium.dev",
            "user_metadata": {"username": "lee", "role": "admin"}
        }"#;
        let record: UserRecord = serde_json::from_str(json).unwrap();
        let user = SessionUser::from_record(record, "tok".into()).unwrap();
        assert!(user.is_admin());
    }

    #[test]
    fn test_record_deserialization_without_metadata() {
        let json = r#"{"id": "user-10"}"#;
        let record: UserRecord = serde_json::from_str(json).unwrap();
        let user = SessionUser::from_record(record, "tok".into()).unwrap();
        assert_eq!(user.role, Role::Member);
        assert!(user.email.is_none());
    }

    #[test]
    fn test_satisfies_delegates_to_role() {
        let user = SessionUser::from_record(record(Some("admin")), "tok".into()).unwrap();
        assert!(user.satisfies(Role::Member));
        assert!(user.satisfies(Role::Admin));
    }
}
