//! Platform biometric credential gateway
//!
//! Thin capability interface over the platform credential authenticator.
//! Every failure path here is non-fatal: a gateway error or a rejected
//! prompt returns control to password entry.

use async_trait::async_trait;
use tracing::warn;

use warden_core::{SecuritySettings, UserId};

use crate::error::Result;

/// Opaque identifier of a registered platform credential
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialId(pub String);

impl CredentialId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

/// Capability surface of the platform credential authenticator
#[async_trait]
pub trait BiometricGateway: Send + Sync {
    /// Whether the platform supports biometric credentials at all
    fn is_supported(&self) -> bool;

    /// Credentials registered for the user
    async fn list_credentials(&self, user: &UserId) -> Result<Vec<CredentialId>>;

    /// Run the platform prompt; suspends pending a user gesture
    ///
    /// `Ok(false)` and `Err(_)` both mean the unlock falls back to
    /// credential entry.
    async fn authenticate(&self) -> Result<bool>;
}

/// Gateway for platforms without biometric hardware; never available
pub struct NullBiometricGateway;

#[async_trait]
impl BiometricGateway for NullBiometricGateway {
    fn is_supported(&self) -> bool {
        false
    }

    async fn list_credentials(&self, _user: &UserId) -> Result<Vec<CredentialId>> {
        Ok(Vec::new())
    }

    async fn authenticate(&self) -> Result<bool> {
        Ok(false)
    }
}

/// Whether the biometric unlock path should be offered
///
/// Requires platform support, the user opt-in flag, and at least one
/// registered credential. A credential-list failure counts as unavailable.
pub async fn is_available(
    gateway: &dyn BiometricGateway,
    settings: &SecuritySettings,
    user: &UserId,
) -> bool {
    if !gateway.is_supported() || !settings.biometric_unlock_enabled {
        return false;
    }
    match gateway.list_credentials(user).await {
        Ok(credentials) => !credentials.is_empty(),
        Err(e) => {
            warn!("Biometric credential listing failed: {}", e);
            false
        }
    }
}
