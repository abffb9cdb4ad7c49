//! [`Command`] for creating a [`Session`].

use common::operations::{By, Insert, Select};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret, SecretBox};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::{
    session::{RefreshToken, Token},
    Email, Password,
};
use crate::{
    domain::{
        user::{self, session, Session},
        User,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a [`Session`].
#[derive(Clone, Debug, From)]
pub enum CreateUserSession {
    /// Create a new [`Session`] by [`User`] credentials.
    ByCredentials {
        /// [`Email`] of a [`User`].
        email: user::Email,

        /// [`Password`] of a [`User`].
        password: SecretBox<user::Password>,
    },

    /// Create a new [`Session`] by [`User`] ID.
    ByUserId(user::Id),
}

/// Output of [`CreateUserSession`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// [`Token`] of the created [`Session`].
    pub token: session::Token,

    /// [`RefreshToken`] renewing the created [`Session`].
    pub refresh_token: session::RefreshToken,

    /// [`User`] whose [`Session`] has been created.
    pub user: User,

    /// [`DateTime`] when the [`Session`] expires.
    ///
    /// [`DateTime`]: common::DateTime
    pub expires_at: session::ExpirationDateTime,

    /// [`DateTime`] when the [`RefreshToken`] expires.
    ///
    /// [`DateTime`]: common::DateTime
    pub refresh_expires_at: session::RefreshExpirationDateTime,
}

impl<Db> Command<CreateUserSession> for Service<Db>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<User>, user::Email>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Insert<session::Refresh>, Err = Traced<database::Error>>,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        use CreateUserSession as Cmd;
        use ExecutionError as E;

        let user = match cmd {
            Cmd::ByCredentials { email, password } => {
                let user = self
                    .database()
                    .execute(Select(By::new(email)))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?
                    .ok_or_else(|| E::WrongCredentials)
                    .map_err(tracerr::wrap!())?;

                if !user.password_hash.verify(password.expose_secret()) {
                    return Err(tracerr::new!(E::WrongCredentials));
                }

                user
            }
            Cmd::ByUserId(user_id) => self
                .database()
                .execute(Select(By::new(user_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or_else(|| E::UserNotExists(user_id))
                .map_err(tracerr::wrap!())?,
        };

        let expires_at =
            session::ExpirationDateTime::now() + self.config.access_token_ttl;
        let token = jsonwebtoken::encode::<Session>(
            &jsonwebtoken::Header::default(),
            &Session {
                user_id: user.id,
                expires_at,
            },
            &self.config.jwt_encoding_key,
        )
        .map_err(tracerr::from_and_wrap!(=> E))?;

        // SAFETY: `jsonwebtoken::encode` always returns a valid
        //         `session::Token`.
        #[expect(unsafe_code, reason = "invariants are preserved")]
        let token = unsafe { session::Token::new_unchecked(token) };

        let refresh_token = session::RefreshToken::generate();
        let refresh_expires_at = session::RefreshExpirationDateTime::now()
            + self.config.refresh_token_ttl;
        self.database()
            .execute(Insert(session::Refresh {
                digest: refresh_token.digest(),
                user_id: user.id,
                expires_at: refresh_expires_at,
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(Output {
            token,
            refresh_token,
            user,
            expires_at,
            refresh_expires_at,
        })
    }
}

/// Error of [`CreateUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`jsonwebtoken`] encoding error.
    #[display("Failed to encode a JSON Web Token: {_0}")]
    JsonWebTokenEncodeError(jsonwebtoken::errors::Error),

    /// [`User`] with the provided ID does not exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),

    /// [`CreateUserSession::ByCredentials`] contains wrong credentials.
    #[display("Wrong `User` credentials")]
    WrongCredentials,
}

#[cfg(test)]
mod spec {
    use secrecy::SecretBox;

    use crate::{
        command::AuthorizeUserSession,
        domain::user::{self, Role},
        testing, Command as _,
    };

    use super::{CreateUserSession, ExecutionError};

    #[tokio::test]
    async fn issues_tokens_for_valid_credentials() {
        let svc = testing::service();
        let user = testing::user(&svc, Role::Passenger);

        let out = svc
            .execute(CreateUserSession::ByCredentials {
                email: user.email.clone(),
                password: SecretBox::new(Box::new(
                    user::Password::new("qwerty123").unwrap(),
                )),
            })
            .await
            .unwrap();

        assert_eq!(out.user.id, user.id);
        assert!(out.refresh_expires_at > out.expires_at.coerce());
        svc.database().inspect(|s| {
            let stored = s.refreshes.get(&out.refresh_token.digest()).unwrap();
            assert_eq!(stored.user_id, user.id);
        });

        let session = svc
            .execute(AuthorizeUserSession { token: out.token })
            .await
            .unwrap();
        assert_eq!(session.session.user_id, user.id);
    }

    #[tokio::test]
    async fn rejects_wrong_password() {
        let svc = testing::service();
        let user = testing::user(&svc, Role::Passenger);

        let err = svc
            .execute(CreateUserSession::ByCredentials {
                email: user.email,
                password: SecretBox::new(Box::new(
                    user::Password::new("qwerty124").unwrap(),
                )),
            })
            .await
            .unwrap_err();

        assert!(
            matches!(err.as_ref(), ExecutionError::WrongCredentials),
            "{err}",
        );
    }
}
