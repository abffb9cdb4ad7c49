//! [`Command`] for creating a new [`User`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret, SecretBox};
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::user::{Address, Email, Name, Password, Phone, Role};
use crate::{
    domain::{user, User},
    infra::{
        database::{self, constraint},
        Database,
    },
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`User`].
#[derive(Clone, Debug)]
pub struct CreateUser {
    /// [`Name`] of a new [`User`].
    pub name: user::Name,

    /// [`Email`] of a new [`User`].
    pub email: user::Email,

    /// [`Password`] of a new [`User`].
    pub password: SecretBox<user::Password>,

    /// [`Phone`] of a new [`User`].
    pub phone: Option<user::Phone>,

    /// [`Address`] of a new [`User`].
    pub address: Option<user::Address>,

    /// [`Role`] of a new [`User`].
    pub role: user::Role,
}

impl<Db> Command<CreateUser> for Service<Db>
where
    Db: Database<
            Select<By<Option<User>, user::Email>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<User>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateUser) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateUser {
            name,
            email,
            password,
            phone,
            address,
            role,
        } = cmd;

        let u = self
            .database()
            .execute(Select(By::new(email.clone())))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if u.is_some() {
            return Err(tracerr::new!(E::EmailOccupied(email)));
        }

        let user = User {
            id: user::Id::new(),
            name,
            email,
            password_hash: user::PasswordHash::new(password.expose_secret()),
            phone,
            address,
            role,
            created_at: DateTime::now().coerce(),
            deleted_at: None,
        };

        let occupied = |e: Traced<database::Error>| {
            if e.as_ref().is_unique_violation(Some(constraint::USER_EMAIL)) {
                tracerr::new!(E::EmailOccupied(user.email.clone()))
            } else {
                tracerr::map_from(e)
            }
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(user.clone()))
            .await
            .map_err(occupied)
            .map(drop)?;
        tx.execute(Commit).await.map_err(occupied).map(drop)?;

        log::info!("`User(id: {})` registered as `{}`", user.id, user.role);

        Ok(user)
    }
}

/// Error of [`CreateUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`user::Email`] is already occupied by an active [`User`].
    #[display("`{_0}` email is occupied")]
    EmailOccupied(#[error(not(source))] user::Email),
}

#[cfg(test)]
mod spec {
    use secrecy::SecretBox;

    use crate::{
        domain::user::{self, Role},
        testing, Command as _,
    };

    use super::{CreateUser, ExecutionError};

    fn cmd(email: &str) -> CreateUser {
        CreateUser {
            name: user::Name::new("John Doe").unwrap(),
            email: user::Email::new(email).unwrap(),
            password: SecretBox::new(Box::new(
                user::Password::new("secret-pass").unwrap(),
            )),
            phone: None,
            address: None,
            role: Role::Passenger,
        }
    }

    #[tokio::test]
    async fn stores_salted_password_hash() {
        let svc = testing::service();

        let user = svc.execute(cmd("john@example.com")).await.unwrap();

        let stored = svc
            .database()
            .inspect(|s| s.users.get(&user.id).cloned())
            .unwrap();
        assert_eq!(stored.role, Role::Passenger);
        assert!(stored
            .password_hash
            .verify(&user::Password::new("secret-pass").unwrap()));
        assert!(!stored.password_hash.to_string().contains("secret-pass"));
    }

    #[tokio::test]
    async fn rejects_occupied_email() {
        let svc = testing::service();
        drop(svc.execute(cmd("john@example.com")).await.unwrap());

        let err = svc.execute(cmd("john@example.com")).await.unwrap_err();

        assert!(
            matches!(err.as_ref(), ExecutionError::EmailOccupied(_)),
            "{err}",
        );
    }

    #[tokio::test]
    async fn reuses_email_of_deleted_user() {
        let svc = testing::service();
        let old = svc.execute(cmd("john@example.com")).await.unwrap();
        svc.database().modify(|s| {
            if let Some(u) = s.users.get_mut(&old.id) {
                u.deleted_at = Some(common::DateTime::now().coerce());
            }
        });

        let new = svc.execute(cmd("john@example.com")).await.unwrap();

        assert_ne!(new.id, old.id);
    }
}
