use crate::error::{AuthError, AuthResult};
use crate::token::Claims;

/// Gate an operation behind a single required permission.
///
/// Membership is an exact, case-sensitive string match against the token's
/// grant set; there is no hierarchy and no wildcard expansion. The check is
/// deterministic and side-effect-free. Failure means the caller is
/// authenticated but not entitled, which is a 403 rather than a 401.
pub fn require_permission(claims: &Claims, required_permission: &str) -> AuthResult<()> {
    if claims
        .permissions
        .iter()
        .any(|granted| granted == required_permission)
    {
        Ok(())
    } else {
        Err(AuthError::InsufficientScope(
            required_permission.to_string(),
        ))
    }
}
