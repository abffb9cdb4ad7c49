//! GraphQL [`Subscription`]s definitions.

use std::time::Duration;

use futures::{
    future,
    stream::{self, BoxStream},
    StreamExt as _,
};
use juniper::graphql_subscription;
use service::{domain, query, Query as _};

use crate::{api, AsError, Context, Error, Service};

/// Interval between the checks of the seats availability.
const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Root of all GraphQL subscription.
#[derive(Clone, Copy, Debug)]
pub struct Subscription;

#[graphql_subscription(context = Context)]
impl Subscription {
    /// Subscription to the numbers of the seats available for booking on the
    /// `Schedule` with the specified ID.
    ///
    /// Emits the current numbers at once, and then every time they change.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `SCHEDULE_NOT_EXISTS` - the `Schedule` with the specified ID does
    ///                           not exist.
    pub async fn available_seats(
        &self,
        schedule_id: api::schedule::Id,
        ctx: &Context,
    ) -> Result<
        BoxStream<'static, Result<Vec<api::seat::Number>, Error>>,
        Error,
    > {
        let service = ctx.service().clone();
        let schedule_id = schedule_id.into();

        let current = available(&service, schedule_id)
            .await
            .map_err(ctx.error())?;
        let changes = stream::unfold(
            Some((service, current.clone())),
            move |state| async move {
                let (service, last) = state?;
                loop {
                    tokio::time::sleep(POLL_INTERVAL).await;
                    match available(&service, schedule_id).await {
                        Ok(seats) if seats == last => {}
                        Ok(seats) => {
                            let out = Ok(into_api(seats.clone()));
                            break Some((out, Some((service, seats))));
                        }
                        Err(e) => break Some((Err(e), None)),
                    }
                }
            },
        );

        Ok(stream::once(future::ok(into_api(current)))
            .chain(changes)
            .boxed())
    }
}

/// Fetches the numbers of the available seats of the provided [`Schedule`].
///
/// [`Schedule`]: domain::Schedule
async fn available(
    service: &Service,
    schedule_id: domain::schedule::Id,
) -> Result<Vec<domain::seat::Number>, Error> {
    service
        .execute(query::seats::Available { schedule_id })
        .await
        .map_err(AsError::into_error)
}

/// Converts the provided seat numbers into their GraphQL representation.
fn into_api(numbers: Vec<domain::seat::Number>) -> Vec<api::seat::Number> {
    numbers.into_iter().map(Into::into).collect()
}
