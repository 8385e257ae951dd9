use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::error::ServiceError;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Writer,
    Approver,
    Manager,
}

/// Authenticated caller of an engine operation
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Session {
    pub user_id: String,
    pub roles: Vec<Role>,
}

impl Session {
    pub fn new(user_id: impl Into<String>, roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            user_id: user_id.into(),
            roles: roles.into_iter().collect(),
        }
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

/// Passes if the session holds at least one of `allowed`
pub(crate) fn permission_check(session: &Session, allowed: &[Role]) -> Result<(), ServiceError> {
    if allowed.iter().any(|role| session.has_role(*role)) {
        return Ok(());
    }

    tracing::trace!(
        "permission check failed for user `{}`: one of {allowed:?} required, has {:?}",
        session.user_id,
        session.roles
    );
    Err(ServiceError::Forbidden(allowed.to_vec()))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_permission_check() {
        let session = Session::new("alice", [Role::Writer]);

        assert!(permission_check(&session, &[Role::Writer, Role::Manager]).is_ok());
        assert!(matches!(
            permission_check(&session, &[Role::Approver]),
            Err(ServiceError::Forbidden(roles)) if roles == vec![Role::Approver]
        ));
        assert!(matches!(
            permission_check(&Session::new("nobody", []), &[Role::Manager]),
            Err(ServiceError::Forbidden(_))
        ));
    }
}
