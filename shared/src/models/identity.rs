//! Identity Model

use serde::{Deserialize, Serialize};

use super::role::Role;

/// Registered identity (one per identity-provider subject)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Opaque subject id from the identity provider (usually the email)
    pub subject_id: String,
    pub display_name: String,
    pub role: Role,
    #[serde(default)]
    pub is_blocked: bool,
    #[serde(default)]
    pub is_premium: bool,
    /// Registration time (Unix millis)
    pub created_at: i64,
}

impl Identity {
    /// New citizen identity, as created on first login
    pub fn citizen(
        subject_id: impl Into<String>,
        display_name: impl Into<String>,
        created_at: i64,
    ) -> Self {
        Self {
            subject_id: subject_id.into(),
            display_name: display_name.into(),
            role: Role::Citizen,
            is_blocked: false,
            is_premium: false,
            created_at,
        }
    }
}

/// Block / unblock payload
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BlockUpdate {
    pub blocked: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_citizen_defaults() {
        let identity = Identity::citizen("ana@example.com", "Ana", 1);
        assert_eq!(identity.role, Role::Citizen);
        assert!(!identity.is_blocked);
        assert!(!identity.is_premium);
    }

    #[test]
    fn test_camel_case_wire_format() {
        let identity = Identity::citizen("ana@example.com", "Ana", 1);
        let json = serde_json::to_value(&identity).unwrap();
        assert_eq!(json["subjectId"], "ana@example.com");
        assert_eq!(json["displayName"], "Ana");
        assert_eq!(json["isBlocked"], false);
        assert_eq!(json["role"], "citizen");
    }

    #[test]
    fn test_missing_flags_default_to_false() {
        let json = r#"{"subjectId":"a","displayName":"A","role":"staff","createdAt":5}"#;
        let identity: Identity = serde_json::from_str(json).unwrap();
        assert_eq!(identity.role, Role::Staff);
        assert!(!identity.is_blocked);
        assert!(!identity.is_premium);
    }
}
