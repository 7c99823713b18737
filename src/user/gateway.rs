//! Remote authentication collaborator.

use async_trait::async_trait;

/// Error returned by a remote sign-out.
#[derive(Debug, thiserror::Error)]
#[error("remote sign-out failed: {0}")]
pub struct GatewayError(pub String);

/// Remote side of a session, called best-effort on logout.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Revoke the remote session.
    async fn sign_out(&self) -> Result<(), GatewayError>;

    /// Drop any authorization header attached to outbound calls.
    fn clear_authorization(&self);
}

/// Gateway for a learner with no remote backend.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopGateway;

#[async_trait]
impl AuthGateway for NoopGateway {
    async fn sign_out(&self) -> Result<(), GatewayError> {
        Ok(())
    }

    fn clear_authorization(&self) {}
}

/// Where navigation goes after logout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutRedirect {
    InstructorLogin,
    AdminLogin,
    Login,
}

impl LogoutRedirect {
    /// Pick the login page of the area the learner was browsing.
    pub fn from_origin(path: &str) -> Self {
        if path.starts_with("/instructor") {
            Self::InstructorLogin
        } else if path.starts_with("/admin") {
            Self::AdminLogin
        } else {
            Self::Login
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Self::InstructorLogin => "/instructor/login",
            Self::AdminLogin => "/admin/login",
            Self::Login => "/login",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_from_origin() {
        assert_eq!(
            LogoutRedirect::from_origin("/instructor/courses/3"),
            LogoutRedirect::InstructorLogin
        );
        assert_eq!(LogoutRedirect::from_origin("/admin"), LogoutRedirect::AdminLogin);
        assert_eq!(LogoutRedirect::from_origin("/courses/3"), LogoutRedirect::Login);
        assert_eq!(LogoutRedirect::from_origin(""), LogoutRedirect::Login);
        assert_eq!(LogoutRedirect::AdminLogin.path(), "/admin/login");
    }
}
