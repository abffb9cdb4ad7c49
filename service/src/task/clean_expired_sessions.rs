//! [`CleanExpiredSessions`] [`Task`].

use std::{convert::Infallible, error::Error, time};

use common::operations::{By, Delete, Perform, Start};
use tokio::time::interval;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::user::session,
    infra::{database, Database},
    Service,
};

use super::Task;

/// Configuration for [`CleanExpiredSessions`] [`Task`].
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Interval between expired [`session::Refresh`]es cleaning.
    pub interval: time::Duration,
}

/// [`Task`] for cleaning expired [`session::Refresh`]es.
#[derive(Clone, Copy, Debug)]
pub struct CleanExpiredSessions<S> {
    /// [`Config`] of this [`Task`].
    config: Config,

    /// [`Service`] instance.
    service: S,
}

impl<Db> Task<Start<By<CleanExpiredSessions<Self>, Config>>> for Service<Db>
where
    CleanExpiredSessions<Service<Db>>:
        Task<Perform<()>, Ok = u64, Err: Error> + Send + Sync + 'static,
    Self: Clone,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Start(by): Start<By<CleanExpiredSessions<Self>, Config>>,
    ) -> Result<Self::Ok, Self::Err> {
        let config = by.into_inner();
        let task = CleanExpiredSessions {
            config,
            service: self.clone(),
        };

        let mut interval = interval(task.config.interval);
        loop {
            let _ = interval.tick().await;
            match task.execute(Perform(())).await {
                Ok(0) => {}
                Ok(n) => log::debug!("removed {n} expired refresh tokens"),
                Err(e) => {
                    log::error!("`task::CleanExpiredSessions` failed: {e}");
                }
            }
        }
    }
}

impl<Db> Task<Perform<()>> for CleanExpiredSessions<Service<Db>>
where
    Db: Database<
        Delete<By<session::Refresh, session::RefreshExpirationDateTime>>,
        Ok = u64,
        Err = Traced<database::Error>,
    >,
{
    type Ok = u64;
    type Err = ExecutionError;

    async fn execute(&self, _: Perform<()>) -> Result<Self::Ok, Self::Err> {
        self.service
            .database()
            .execute(Delete(By::new(session::RefreshExpirationDateTime::now())))
            .await
            .map_err(tracerr::map_from_and_wrap!())
    }
}

/// Error of [`CleanExpiredSessions`] execution.
pub type ExecutionError = Traced<database::Error>;

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::operations::Perform;

    use crate::{
        domain::user::{self, session},
        testing, Task as _,
    };

    use super::{CleanExpiredSessions, Config};

    #[tokio::test]
    async fn removes_only_expired_refresh_tokens() {
        let svc = testing::service();
        let user = testing::user(&svc, user::Role::Passenger);

        let now = session::RefreshExpirationDateTime::now();
        let expired = session::RefreshToken::generate().digest();
        let alive = session::RefreshToken::generate().digest();
        svc.database().modify(|s| {
            for (digest, expires_at) in [
                (expired.clone(), now - Duration::from_secs(1)),
                (alive.clone(), now + Duration::from_secs(60)),
            ] {
                _ = s.refreshes.insert(
                    digest.clone(),
                    session::Refresh {
                        digest,
                        user_id: user.id,
                        expires_at,
                    },
                );
            }
        });

        let task = CleanExpiredSessions {
            config: Config {
                interval: Duration::from_secs(1),
            },
            service: svc.clone(),
        };
        let removed = task.execute(Perform(())).await.unwrap();

        assert_eq!(removed, 1);
        svc.database().inspect(|s| {
            assert!(!s.refreshes.contains_key(&expired));
            assert!(s.refreshes.contains_key(&alive));
        });
    }
}
