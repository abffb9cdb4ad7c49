//! Background environment for running [`Task`]s.

use std::{
    error::Error,
    future::{Future, IntoFuture},
    iter,
};

use derive_more::Display;
use futures::{
    future::{self, LocalBoxFuture},
    FutureExt as _, TryFutureExt as _,
};
use tokio::task;

#[cfg(doc)]
use crate::Task;

/// Background environment for running [`Task`]s.
///
/// Completes once all the spawned [`Task`]s complete, or as soon as any of
/// them fails.
#[derive(Debug, Default)]
pub struct Background {
    /// Local set of the spawned [`Task`]s.
    set: task::LocalSet,

    /// Handles of the spawned [`Task`]s.
    handles: Vec<task::JoinHandle<Result<(), TaskError>>>,
}

/// Failure of a [`Task`] running in a [`Background`].
#[derive(Debug, Display)]
#[display("`{name}` failed: {source}")]
pub struct TaskError {
    /// Name of the failed [`Task`].
    pub name: &'static str,

    /// Error the [`Task`] failed with.
    pub source: Box<dyn Error>,
}

impl Error for TaskError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&*self.source)
    }
}

impl Background {
    /// Spawns a new named [`Task`] inside this [`Background`] environment.
    pub fn spawn<F, E>(&mut self, name: &'static str, future: F)
    where
        F: Future<Output = Result<(), E>> + 'static,
        E: Error + 'static,
    {
        tracing::debug!("spawning `{name}` background task");
        self.handles
            .push(self.set.spawn_local(future.map_err(move |e| TaskError {
                name,
                source: Box::new(e),
            })));
    }
}

impl IntoFuture for Background {
    type Output = Result<(), TaskError>;
    type IntoFuture = LocalBoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        let Self { set, handles } = self;
        future::try_join_all(iter::once(set.map(Ok).boxed_local()).chain(
            handles.into_iter().map(|h| {
                h.map(|r| {
                    r.unwrap_or_else(|e| {
                        Err(TaskError {
                            name: "<unknown>",
                            source: Box::new(e),
                        })
                    })
                })
                .boxed_local()
            }),
        ))
        .map_ok(drop)
        .boxed_local()
    }
}

#[cfg(test)]
mod spec {
    use std::{cell::Cell, fmt, rc::Rc};

    use super::Background;

    #[derive(Debug)]
    struct Boom;

    impl fmt::Display for Boom {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "boom")
        }
    }

    impl std::error::Error for Boom {}

    #[tokio::test]
    async fn runs_all_tasks_to_completion() {
        let runs = Rc::new(Cell::new(0));
        let mut bg = Background::default();
        for _ in 0..3 {
            let runs = Rc::clone(&runs);
            bg.spawn("counter", async move {
                runs.set(runs.get() + 1);
                Ok::<_, Boom>(())
            });
        }

        bg.await.unwrap();

        assert_eq!(runs.get(), 3);
    }

    #[tokio::test]
    async fn reports_failed_task_by_name() {
        let mut bg = Background::default();
        bg.spawn("ok", async { Ok::<_, Boom>(()) });
        bg.spawn("faulty", async { Err(Boom) });

        let err = bg.await.unwrap_err();

        assert_eq!(err.name, "faulty");
        assert_eq!(err.to_string(), "`faulty` failed: boom");
    }
}
