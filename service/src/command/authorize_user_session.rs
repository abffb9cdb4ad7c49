//! [`Command`] for authorizing a [`User`].

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use jsonwebtoken::Validation;
use tracerr::Traced;

use crate::{
    domain::{
        user::{self, session, Session},
        User,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for authorizing a [`User`].
#[derive(Clone, Debug, From)]
pub struct AuthorizeUserSession {
    /// [`Session`] token to authorize.
    pub token: session::Token,
}

/// Output of [`AuthorizeUserSession`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// Authorized [`Session`].
    pub session: Session,

    /// Active [`User`] the [`Session`] belongs to.
    pub user: User,
}

impl<Db> Command<AuthorizeUserSession> for Service<Db>
where
    Db: Database<
        Select<By<Option<User>, user::Id>>,
        Ok = Option<User>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: AuthorizeUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AuthorizeUserSession { token } = cmd;

        let session = jsonwebtoken::decode::<Session>(
            token.as_ref(),
            &self.config.jwt_decoding_key,
            &Validation::default(),
        )
        .map_err(tracerr::from_and_wrap!(=> E))?
        .claims;

        // Deleted `User`s are not selected, so their tokens stop working at
        // once.
        let user = self
            .database()
            .execute(Select(By::new(session.user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| E::UserNotExists(session.user_id))
            .map_err(tracerr::wrap!())?;

        Ok(Output { session, user })
    }
}

/// Error of [`AuthorizeUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`jsonwebtoken`] decoding error.
    #[display("Failed to decode a JSON Web Token: {_0}")]
    JsonWebTokenDecodeError(jsonwebtoken::errors::Error),

    /// [`User`] the [`Session`] belongs to does not exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use common::DateTime;

    use crate::{
        command::CreateUserSession,
        domain::user::{session, Role},
        testing, Command as _,
    };

    use super::{AuthorizeUserSession, ExecutionError};

    #[tokio::test]
    async fn rejects_token_of_deleted_user() {
        let svc = testing::service();
        let user = testing::user(&svc, Role::Operator);
        let out = svc
            .execute(CreateUserSession::ByUserId(user.id))
            .await
            .unwrap();
        svc.database().modify(|s| {
            if let Some(u) = s.users.get_mut(&user.id) {
                u.deleted_at = Some(DateTime::now().coerce());
            }
        });

        let err = svc
            .execute(AuthorizeUserSession { token: out.token })
            .await
            .unwrap_err();

        assert!(
            matches!(
                err.as_ref(),
                ExecutionError::UserNotExists(id) if *id == user.id,
            ),
            "{err}",
        );
    }

    #[tokio::test]
    async fn rejects_malformed_token() {
        let svc = testing::service();

        let err = svc
            .execute(AuthorizeUserSession {
                token: "not.a.jwt".parse::<session::Token>().unwrap(),
            })
            .await
            .unwrap_err();

        assert!(
            matches!(err.as_ref(), ExecutionError::JsonWebTokenDecodeError(_)),
            "{err}",
        );
    }
}
