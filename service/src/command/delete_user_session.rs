//! [`Command`] for revoking a [`RefreshToken`].

use common::operations::{By, Delete};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::session::RefreshToken;
use crate::{
    domain::user::session,
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for revoking a [`RefreshToken`], so the [`Session`] cannot be
/// renewed anymore.
///
/// Returns whether any [`RefreshToken`] has been revoked.
///
/// [`Session`]: session::Session
#[derive(Clone, Debug)]
pub struct DeleteUserSession {
    /// [`RefreshToken`] to revoke.
    pub refresh_token: session::RefreshToken,
}

impl<Db> Command<DeleteUserSession> for Service<Db>
where
    Db: Database<
        Delete<By<Option<session::Refresh>, session::RefreshDigest>>,
        Ok = Option<session::Refresh>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = bool;
    type Err = ExecutionError;

    async fn execute(
        &self,
        cmd: DeleteUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        let DeleteUserSession { refresh_token } = cmd;

        self.database()
            .execute(Delete(By::new(refresh_token.digest())))
            .await
            .map(|r| r.is_some())
            .map_err(tracerr::wrap!())
    }
}

/// Error of [`DeleteUserSession`] [`Command`] execution.
pub type ExecutionError = Traced<database::Error>;

#[cfg(test)]
mod spec {
    use crate::{
        command::{CreateUserSession, RefreshUserSession},
        domain::user::Role,
        testing, Command as _,
    };

    use super::DeleteUserSession;

    #[tokio::test]
    async fn revoked_token_cannot_be_refreshed() {
        let svc = testing::service();
        let user = testing::user(&svc, Role::Passenger);
        let out = svc
            .execute(CreateUserSession::ByUserId(user.id))
            .await
            .unwrap();

        let revoked = svc
            .execute(DeleteUserSession {
                refresh_token: out.refresh_token.clone(),
            })
            .await
            .unwrap();
        let again = svc
            .execute(DeleteUserSession {
                refresh_token: out.refresh_token.clone(),
            })
            .await
            .unwrap();

        assert!(revoked);
        assert!(!again);
        assert!(svc
            .execute(RefreshUserSession {
                refresh_token: out.refresh_token,
            })
            .await
            .is_err());
    }
}
