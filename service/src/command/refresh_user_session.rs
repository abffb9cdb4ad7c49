//! [`Command`] for renewing a [`Session`] with a [`RefreshToken`].

use common::operations::{By, Delete, Insert, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::{session::RefreshToken, Session};
use crate::{
    domain::{user, user::session, User},
    infra::{database, Database},
    Service,
};

use super::{create_user_session, Command, CreateUserSession};

/// [`Command`] for renewing a [`Session`] with a [`RefreshToken`].
///
/// The presented [`RefreshToken`] is consumed, so it can be used only once.
#[derive(Clone, Debug, From)]
pub struct RefreshUserSession {
    /// [`RefreshToken`] to be exchanged.
    pub refresh_token: session::RefreshToken,
}

impl<Db> Command<RefreshUserSession> for Service<Db>
where
    Db: Database<
            Delete<By<Option<session::Refresh>, session::RefreshDigest>>,
            Ok = Option<session::Refresh>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<User>, user::Email>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Insert<session::Refresh>, Err = Traced<database::Error>>,
{
    type Ok = create_user_session::Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: RefreshUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RefreshUserSession { refresh_token } = cmd;

        // Deletion is atomic, so concurrent exchanges of the same token cannot
        // both succeed.
        let refresh = self
            .database()
            .execute(Delete(By::new(refresh_token.digest())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::InvalidRefreshToken)
            .map_err(tracerr::wrap!())?;
        if refresh.is_expired_at(session::RefreshExpirationDateTime::now()) {
            return Err(tracerr::new!(E::InvalidRefreshToken));
        }

        self.execute(CreateUserSession::ByUserId(refresh.user_id))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`RefreshUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Failed to issue a new [`Session`].
    #[display("Failed to issue a new `Session`: {_0}")]
    Issue(create_user_session::ExecutionError),

    /// [`RefreshToken`] is unknown, already used or expired.
    #[display("Invalid refresh token")]
    InvalidRefreshToken,
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use crate::{
        command::CreateUserSession,
        domain::user::{session, Role},
        testing, Command as _,
    };

    use super::{ExecutionError, RefreshUserSession};

    #[tokio::test]
    async fn rotates_refresh_token() {
        let svc = testing::service();
        let user = testing::user(&svc, Role::Passenger);
        let first = svc
            .execute(CreateUserSession::ByUserId(user.id))
            .await
            .unwrap();

        let second = svc
            .execute(RefreshUserSession {
                refresh_token: first.refresh_token.clone(),
            })
            .await
            .unwrap();

        assert_eq!(second.user.id, user.id);
        assert_ne!(second.refresh_token, first.refresh_token);
        svc.database().inspect(|s| {
            assert!(!s.refreshes.contains_key(&first.refresh_token.digest()));
            assert!(s.refreshes.contains_key(&second.refresh_token.digest()));
        });
    }

    #[tokio::test]
    async fn refresh_token_is_single_use() {
        let svc = testing::service();
        let user = testing::user(&svc, Role::Passenger);
        let out = svc
            .execute(CreateUserSession::ByUserId(user.id))
            .await
            .unwrap();

        let (a, b) = tokio::join!(
            svc.execute(RefreshUserSession {
                refresh_token: out.refresh_token.clone(),
            }),
            svc.execute(RefreshUserSession {
                refresh_token: out.refresh_token.clone(),
            }),
        );

        assert_eq!(usize::from(a.is_ok()) + usize::from(b.is_ok()), 1);
        let err = a.err().or(b.err()).unwrap();
        assert!(
            matches!(err.as_ref(), ExecutionError::InvalidRefreshToken),
            "{err}",
        );
    }

    #[tokio::test]
    async fn rejects_expired_refresh_token() {
        let svc = testing::service();
        let user = testing::user(&svc, Role::Passenger);
        let out = svc
            .execute(CreateUserSession::ByUserId(user.id))
            .await
            .unwrap();
        svc.database().modify(|s| {
            if let Some(r) = s.refreshes.get_mut(&out.refresh_token.digest()) {
                r.expires_at = session::RefreshExpirationDateTime::now()
                    - Duration::from_secs(1);
            }
        });

        let err = svc
            .execute(RefreshUserSession {
                refresh_token: out.refresh_token,
            })
            .await
            .unwrap_err();

        assert!(
            matches!(err.as_ref(), ExecutionError::InvalidRefreshToken),
            "{err}",
        );
    }
}
