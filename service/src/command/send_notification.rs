//! [`Command`] for sending a [`Notification`] to a [`User`].

use common::{
    operations::{By, Insert, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{notification, user, Notification, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for sending a [`Notification`] to a [`User`].
///
/// Delivery itself is not performed: the [`Notification`] is only stored in
/// the [`User`]'s inbox.
#[derive(Clone, Debug)]
pub struct SendNotification {
    /// ID of the [`User`] to notify.
    pub user_id: user::Id,

    /// Text of the [`Notification`].
    pub message: notification::Message,

    /// Delivery channel of the [`Notification`].
    pub kind: notification::Kind,
}

impl<Db> Command<SendNotification> for Service<Db>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Insert<Notification>, Err = Traced<database::Error>>,
{
    type Ok = Notification;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: SendNotification,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let SendNotification {
            user_id,
            message,
            kind,
        } = cmd;

        let user = self
            .database()
            .execute(Select(By::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(user_id))
            .map_err(tracerr::wrap!())?;

        let notification = Notification {
            id: notification::Id::new(),
            user_id: user.id,
            message,
            kind,
            created_at: DateTime::now().coerce(),
        };
        self.database()
            .execute(Insert(notification.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::debug!(
            "`Notification(id: {})` sent to `User(id: {})` via `{kind}`",
            notification.id,
            user.id,
        );

        Ok(notification)
    }
}

/// Error of [`SendNotification`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`User`] with the provided ID does not exist.
    #[display("`User(id: {_0})` does not exist")]
    UserNotExists(#[error(not(source))] user::Id),
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::{
            notification::{Kind, Message},
            user::{self, Role},
        },
        query, testing, Command as _, Query as _,
    };

    use super::{ExecutionError, SendNotification};

    #[tokio::test]
    async fn stores_notification_in_inbox() {
        let svc = testing::service();
        let user = testing::user(&svc, Role::Passenger);

        for text in ["first", "second"] {
            drop(
                svc.execute(SendNotification {
                    user_id: user.id,
                    message: Message::new(text).unwrap(),
                    kind: Kind::Email,
                })
                .await
                .unwrap(),
            );
        }

        let inbox = svc
            .execute(query::notifications::ByUser::by(user.id))
            .await
            .unwrap();
        assert_eq!(
            inbox.iter().map(|n| n.message.to_string()).collect::<Vec<_>>(),
            ["second", "first"],
        );
    }

    #[tokio::test]
    async fn requires_existing_user() {
        let svc = testing::service();

        let err = svc
            .execute(SendNotification {
                user_id: user::Id::new(),
                message: Message::new("hello").unwrap(),
                kind: Kind::Sms,
            })
            .await
            .unwrap_err();

        assert!(
            matches!(err.as_ref(), ExecutionError::UserNotExists(_)),
            "{err}",
        );
    }
}
