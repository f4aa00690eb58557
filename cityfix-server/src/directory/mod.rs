//! Role directory
//!
//! Maps an identity-provider subject to its dashboard role. An identity is
//! created as a citizen on first login; only admins change roles afterwards.

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Identity, Role};
use shared::util::now_millis;

use redb::WriteTransaction;

use crate::storage::Storage;

#[derive(Debug, Clone)]
pub struct RoleDirectory {
    storage: Storage,
}

impl RoleDirectory {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Register on first login; returns the existing identity otherwise
    ///
    /// The stored display name and role are never overwritten here.
    pub fn register(&self, subject_id: &str, display_name: &str) -> AppResult<(Identity, bool)> {
        if subject_id.trim().is_empty() {
            return Err(AppError::validation("subject id must not be empty"));
        }
        let identity = Identity::citizen(subject_id, display_name, now_millis());
        let (identity, created) = self.storage.insert_identity_if_absent(identity)?;
        if created {
            tracing::info!(subject_id = %identity.subject_id, "Identity registered");
        }
        Ok((identity, created))
    }

    pub fn find(&self, subject_id: &str) -> AppResult<Option<Identity>> {
        Ok(self.storage.get_identity(subject_id)?)
    }

    pub fn get(&self, subject_id: &str) -> AppResult<Identity> {
        self.find(subject_id)?.ok_or_else(|| identity_not_found(subject_id))
    }

    /// Current role of a subject
    pub fn resolve(&self, subject_id: &str) -> AppResult<Role> {
        Ok(self.get(subject_id)?.role)
    }

    /// Identities sorted by registration time
    pub fn list(&self) -> AppResult<Vec<Identity>> {
        let mut identities = self.storage.list_identities()?;
        identities.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.subject_id.cmp(&b.subject_id))
        });
        Ok(identities)
    }

    /// Change a role (admin operation)
    ///
    /// Admins cannot demote themselves; otherwise a directory could end up
    /// with no admin at all.
    pub fn set_role(&self, actor_id: &str, subject_id: &str, role: Role) -> AppResult<Identity> {
        if actor_id == subject_id && role != Role::Admin {
            return Err(AppError::forbidden("Admins cannot change their own role"));
        }
        let (identity, previous) = self
            .storage
            .update_identity(subject_id, |identity| -> AppResult<Role> {
                let previous = identity.role;
                identity.role = role;
                Ok(previous)
            })?
            .ok_or_else(|| identity_not_found(subject_id))?;

        crate::security_log!(
            "INFO",
            "role_changed",
            actor = actor_id,
            subject = subject_id,
            from = previous.as_str(),
            to = role.as_str()
        );
        Ok(identity)
    }

    /// Make sure each configured subject exists and is an unblocked admin
    ///
    /// Runs at startup. Unknown subjects are created with their subject id
    /// as display name; returns the subjects that were created or changed.
    pub fn seed_admins(&self, subject_ids: &[String]) -> AppResult<Vec<String>> {
        let mut changed = Vec::new();
        for subject_id in subject_ids {
            let seeded = self.storage.write(|txn| -> AppResult<bool> {
                let identity = match Storage::read_identity(txn, subject_id)? {
                    Some(identity) if identity.role == Role::Admin && !identity.is_blocked => {
                        return Ok(false);
                    }
                    Some(mut identity) => {
                        identity.role = Role::Admin;
                        identity.is_blocked = false;
                        identity
                    }
                    None => {
                        let mut identity = Identity::citizen(subject_id, subject_id, now_millis());
                        identity.role = Role::Admin;
                        identity
                    }
                };
                Storage::write_identity(txn, &identity)?;
                Ok(true)
            })?;

            if seeded {
                crate::security_log!("INFO", "admin_seeded", subject = subject_id.as_str());
                changed.push(subject_id.clone());
            }
        }
        Ok(changed)
    }

    /// Block or unblock (admin operation)
    pub fn set_blocked(&self, actor_id: &str, subject_id: &str, blocked: bool) -> AppResult<Identity> {
        if actor_id == subject_id {
            return Err(AppError::forbidden("Admins cannot block themselves"));
        }
        let (identity, ()) = self
            .storage
            .update_identity(subject_id, |identity| -> AppResult<()> {
                identity.is_blocked = blocked;
                Ok(())
            })?
            .ok_or_else(|| identity_not_found(subject_id))?;

        crate::security_log!(
            "INFO",
            "block_changed",
            actor = actor_id,
            subject = subject_id,
            blocked = blocked
        );
        Ok(identity)
    }

    /// Grant premium inside the payment transaction
    ///
    /// Returns `false` when the identity already was premium.
    pub fn mark_premium(txn: &WriteTransaction, subject_id: &str) -> AppResult<bool> {
        let mut identity =
            Storage::read_identity(txn, subject_id)?.ok_or_else(|| identity_not_found(subject_id))?;
        if identity.is_premium {
            return Ok(false);
        }
        identity.is_premium = true;
        Storage::write_identity(txn, &identity)?;
        tracing::info!(subject_id = %subject_id, "Premium granted");
        Ok(true)
    }
}

fn identity_not_found(subject_id: &str) -> AppError {
    AppError::new(ErrorCode::IdentityNotFound).with_detail("subjectId", subject_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> RoleDirectory {
        RoleDirectory::new(Storage::open_in_memory().unwrap())
    }

    #[test]
    fn test_register_defaults_to_citizen() {
        let dir = directory();
        let (identity, created) = dir.register("ana@example.com", "Ana").unwrap();
        assert!(created);
        assert_eq!(identity.role, Role::Citizen);
        assert_eq!(dir.resolve("ana@example.com").unwrap(), Role::Citizen);
    }

    #[test]
    fn test_register_twice_keeps_role() {
        let dir = directory();
        dir.register("root", "Root").unwrap();
        dir.register("ben", "Ben").unwrap();
        dir.set_role("root", "ben", Role::Staff).unwrap();

        let (identity, created) = dir.register("ben", "Benjamin").unwrap();
        assert!(!created);
        assert_eq!(identity.role, Role::Staff);
        assert_eq!(identity.display_name, "Ben");
    }

    #[test]
    fn test_register_rejects_blank_subject() {
        let err = directory().register("  ", "Nobody").unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[test]
    fn test_resolve_unknown() {
        let err = directory().resolve("ghost").unwrap_err();
        assert_eq!(err.code, ErrorCode::IdentityNotFound);
    }

    #[test]
    fn test_role_change_is_visible_immediately() {
        let dir = directory();
        dir.register("root", "Root").unwrap();
        dir.register("ben", "Ben").unwrap();

        dir.set_role("root", "ben", Role::Admin).unwrap();
        assert_eq!(dir.resolve("ben").unwrap(), Role::Admin);
        dir.set_role("root", "ben", Role::Citizen).unwrap();
        assert_eq!(dir.resolve("ben").unwrap(), Role::Citizen);
    }

    #[test]
    fn test_admin_cannot_demote_self() {
        let dir = directory();
        dir.register("root", "Root").unwrap();
        let err = dir.set_role("root", "root", Role::Staff).unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);
    }

    #[test]
    fn test_set_role_unknown_subject() {
        let err = directory()
            .set_role("root", "ghost", Role::Staff)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::IdentityNotFound);
    }

    #[test]
    fn test_block_and_unblock() {
        let dir = directory();
        dir.register("ben", "Ben").unwrap();
        assert!(dir.set_blocked("root", "ben", true).unwrap().is_blocked);
        assert!(dir.get("ben").unwrap().is_blocked);
        assert!(!dir.set_blocked("root", "ben", false).unwrap().is_blocked);
        assert!(dir.set_blocked("ben", "ben", true).is_err());
    }

    #[test]
    fn test_mark_premium_once() {
        let storage = Storage::open_in_memory().unwrap();
        let dir = RoleDirectory::new(storage.clone());
        dir.register("ana", "Ana").unwrap();

        let granted = storage
            .write(|txn| RoleDirectory::mark_premium(txn, "ana"))
            .unwrap();
        assert!(granted);
        let again = storage
            .write(|txn| RoleDirectory::mark_premium(txn, "ana"))
            .unwrap();
        assert!(!again);
        assert!(dir.get("ana").unwrap().is_premium);

        let missing = storage.write(|txn| RoleDirectory::mark_premium(txn, "ghost"));
        assert_eq!(missing.unwrap_err().code, ErrorCode::IdentityNotFound);
    }

    #[test]
    fn test_seed_admins_creates_and_promotes() {
        let dir = directory();
        dir.register("ben", "Ben").unwrap();
        dir.set_blocked("root", "ben", true).unwrap();

        let seeded = dir
            .seed_admins(&["first@city.gov".to_string(), "ben".to_string()])
            .unwrap();
        assert_eq!(seeded, vec!["first@city.gov".to_string(), "ben".to_string()]);
        assert_eq!(dir.resolve("first@city.gov").unwrap(), Role::Admin);

        let ben = dir.get("ben").unwrap();
        assert_eq!(ben.role, Role::Admin);
        assert!(!ben.is_blocked);
        assert_eq!(ben.display_name, "Ben");

        // Restarting with the same list changes nothing
        let again = dir.seed_admins(&["first@city.gov".to_string()]).unwrap();
        assert!(again.is_empty());

        // Registration keeps the seeded role
        let (identity, created) = dir.register("first@city.gov", "First").unwrap();
        assert!(!created);
        assert_eq!(identity.role, Role::Admin);
    }

    #[test]
    fn test_list_in_registration_order() {
        let dir = directory();
        dir.register("a", "A").unwrap();
        dir.register("b", "B").unwrap();
        let subjects: Vec<_> = dir.list().unwrap().into_iter().map(|i| i.subject_id).collect();
        assert_eq!(subjects.len(), 2);
        assert!(subjects.contains(&"a".to_string()));
    }
}
