//! Authenticated-session collaborator contract

use async_trait::async_trait;

use warden_core::UserId;

use crate::error::Result;

/// Host-provided authenticated session
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Currently signed-in user, if any
    fn current_user(&self) -> Option<UserId>;

    /// Invalidate the remote session (sign out)
    async fn invalidate(&self) -> Result<()>;
}

/// Why the flow is exiting to the signed-out entry point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignOutReason {
    /// User chose to sign out from the lock screen
    UserSignOut,
    /// Local data was destroyed after repeated failed attempts
    DataWiped,
}

impl SignOutReason {
    /// Reason code carried on the signed-out redirect
    pub fn as_str(&self) -> &'static str {
        match self {
            SignOutReason::UserSignOut => "signed_out",
            SignOutReason::DataWiped => "data_wiped",
        }
    }
}

/// Navigation instruction handed back to the host UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignOutRedirect {
    pub reason: SignOutReason,
}

impl SignOutRedirect {
    pub fn new(reason: SignOutReason) -> Self {
        Self { reason }
    }
}
