//!
//! # Identity Resolver
//!
//! Resolves a local user account from credentials or from a federated
//! profile. This is where the two credential sources converge: local
//! password accounts are created by [`IdentityService::register_local`] and
//! checked by [`IdentityService::authenticate_local`]; Google-asserted
//! profiles are linked (creating an account on first sign-in) by
//! [`IdentityService::resolve_federated`].

use crate::auth::PasswordHasher;
use crate::error::{AppError, ErrorKind};
use crate::federation::ProviderProfile;
use crate::models::{NewUser, User};
use crate::store::UserStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct IdentityService {
    users: Arc<dyn UserStore>,
    hasher: PasswordHasher,
}

impl IdentityService {
    pub fn new(users: Arc<dyn UserStore>, hasher: PasswordHasher) -> Self {
        Self { users, hasher }
    }

    /// Creates a local account.
    ///
    /// Fails `AlreadyRegistered` if an account with that email exists. The
    /// password is hashed before the single `create` call, so an aborted
    /// request can never leave behind a local account without a password.
    pub async fn register_local(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AppError> {
        if self.users.find_by_email(email).await?.is_some() {
            return Err(AppError::new(ErrorKind::AlreadyRegistered));
        }

        let password_hash = self.hasher.hash(password)?;
        let user = self
            .users
            .create(NewUser {
                username: username.to_string(),
                email: Some(email.to_string()),
                password_hash: Some(password_hash),
                google_id: None,
            })
            .await?;

        log::info!("User created {} {}", user.username, email);
        Ok(user)
    }

    /// Authenticates a local account by email and password.
    ///
    /// Every failure path reports `InvalidCredentials`: unknown email, an
    /// account with no stored password (Google-only), or a non-matching
    /// password. Callers cannot tell which it was, so login responses do not
    /// reveal whether an email is registered.
    pub async fn authenticate_local(&self, email: &str, password: &str) -> Result<User, AppError> {
        let record = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(AppError::new(ErrorKind::InvalidCredentials))?;

        let stored_hash = record
            .password_hash
            .clone()
            .ok_or(AppError::new(ErrorKind::InvalidCredentials))?;

        if !self.hasher.verify(password, &stored_hash)? {
            return Err(AppError::new(ErrorKind::InvalidCredentials));
        }

        Ok(record.into_user())
    }

    /// Resolves a provider-asserted profile to a local account, creating one
    /// on first sign-in.
    ///
    /// Idempotent: the same profile always resolves to the same account. New
    /// accounts take the provider's display name as username and its email
    /// claim verbatim; no password is set.
    pub async fn resolve_federated(&self, profile: &ProviderProfile) -> Result<User, AppError> {
        if let Some(user) = self.users.find_by_google_id(&profile.provider_id).await? {
            return Ok(user);
        }

        let user = self
            .users
            .create(NewUser {
                username: profile.display_name.clone(),
                email: profile.email.clone(),
                password_hash: None,
                google_id: Some(profile.provider_id.clone()),
            })
            .await?;

        log::info!("User created from Google profile {}", user.username);
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryUserStore;

    // Low bcrypt cost keeps these tests fast; the work factor itself is
    // covered in auth::password.
    fn service() -> IdentityService {
        IdentityService::new(Arc::new(MemoryUserStore::new()), PasswordHasher::new(4))
    }

    fn google_profile(id: &str) -> ProviderProfile {
        ProviderProfile {
            provider_id: id.to_string(),
            display_name: "Google User".to_string(),
            email: Some("g@x.com".to_string()),
        }
    }

    #[actix_rt::test]
    async fn test_second_registration_same_email_fails() {
        let identity = service();
        identity
            .register_local("alice", "a@x.com", "secret123")
            .await
            .unwrap();

        let err = identity
            .register_local("alice2", "a@x.com", "other_password")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AlreadyRegistered);
    }

    #[actix_rt::test]
    async fn test_register_then_authenticate() {
        let identity = service();
        let registered = identity
            .register_local("alice", "a@x.com", "secret123")
            .await
            .unwrap();

        let authenticated = identity
            .authenticate_local("a@x.com", "secret123")
            .await
            .unwrap();
        assert_eq!(authenticated.id, registered.id);
    }

    #[actix_rt::test]
    async fn test_failure_kind_hides_account_existence() {
        let identity = service();
        identity
            .register_local("alice", "a@x.com", "secret123")
            .await
            .unwrap();

        let wrong_password = identity
            .authenticate_local("a@x.com", "not_the_password")
            .await
            .unwrap_err();
        let unknown_email = identity
            .authenticate_local("ghost@x.com", "secret123")
            .await
            .unwrap_err();

        assert_eq!(wrong_password.kind(), ErrorKind::InvalidCredentials);
        assert_eq!(unknown_email.kind(), ErrorKind::InvalidCredentials);
    }

    #[actix_rt::test]
    async fn test_google_only_account_cannot_password_login() {
        let identity = service();
        let user = identity
            .resolve_federated(&google_profile("gid-1"))
            .await
            .unwrap();
        assert!(user.google_id.is_some());

        let err = identity
            .authenticate_local("g@x.com", "any_password")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidCredentials);
    }

    #[actix_rt::test]
    async fn test_resolve_federated_is_idempotent() {
        let identity = service();
        let first = identity
            .resolve_federated(&google_profile("gid-42"))
            .await
            .unwrap();
        let second = identity
            .resolve_federated(&google_profile("gid-42"))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
    }
}
