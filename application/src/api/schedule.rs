//! [`Schedule`]-related definitions.

use common::{Date, DateTime, Money};
use derive_more::{AsRef, Display, From, Into};
use futures::{future, TryFutureExt as _};
use juniper::{graphql_object, GraphQLScalar};
use service::{domain, query, Query as _};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{
    api::{self, scalar},
    AsError, Context, Error,
};

/// A trip of a `Bus` along a `Route` on some `Date`.
#[derive(Clone, Debug)]
pub struct Schedule {
    /// ID of this [`Schedule`].
    id: Id,

    /// Underlying [`domain::Schedule`].
    schedule: OnceCell<domain::Schedule>,
}

impl From<domain::Schedule> for Schedule {
    fn from(schedule: domain::Schedule) -> Self {
        Self {
            id: schedule.id.into(),
            schedule: OnceCell::new_with(Some(schedule)),
        }
    }
}

impl Schedule {
    /// Creates a new [`Schedule`] with the provided ID.
    ///
    /// # Safety
    ///
    /// Caller must ensure that [`Schedule`] with the provided ID exists,
    /// otherwise accessing this [`Schedule`] will result with an error.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            schedule: OnceCell::new(),
        }
    }

    /// Returns the [`domain::Schedule`] representing this [`Schedule`].
    async fn schedule(
        &self,
        ctx: &Context,
    ) -> Result<&domain::Schedule, Error> {
        let id = self.id.into();
        self.schedule
            .get_or_try_init(|| {
                ctx.service()
                    .execute(query::schedule::ById::by(id))
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
                    .and_then(|s| {
                        future::ready(s.ok_or_else(|| {
                            api::query::ScheduleError::NotExists.into()
                        }))
                    })
            })
            .await
    }
}

/// A trip of a `Bus` along a `Route` on some `Date`.
///
/// Seats belong to the `Bus`, so all the `Schedule`s of the same `Bus` share
/// them.
#[graphql_object(context = Context)]
impl Schedule {
    /// Unique identifier of this `Schedule`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Schedule.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.id
    }

    /// `Bus` serving this `Schedule`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Schedule.bus",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn bus(&self, ctx: &Context) -> Result<api::Bus, Error> {
        let bus_id = self.schedule(ctx).await?.bus_id;
        #[expect(unsafe_code, reason = "`Schedule` references existing `Bus`")]
        let bus = unsafe { api::Bus::new_unchecked(bus_id) };
        Ok(bus)
    }

    /// `Route` this `Schedule` follows.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `ROUTE_NOT_EXISTS` - the `Route` of this `Schedule` is gone.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Schedule.route",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn route(&self, ctx: &Context) -> Result<Route, Error> {
        let route_id = self.schedule(ctx).await?.route_id;
        ctx.service()
            .execute(query::route::ById::by(route_id))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| api::query::RouteError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// `DateTime` of departure.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Schedule.departureAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn departure_at(
        &self,
        ctx: &Context,
    ) -> Result<DateTime, Error> {
        Ok(self.schedule(ctx).await?.departure_at.coerce())
    }

    /// `DateTime` of arrival.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Schedule.arrivalAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn arrival_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.schedule(ctx).await?.arrival_at.coerce())
    }

    /// Fare of a single seat.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Schedule.fare",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn fare(&self, ctx: &Context) -> Result<Money, Error> {
        Ok(self.schedule(ctx).await?.fare)
    }

    /// `Date` this `Schedule` runs on.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Schedule.date",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn date(&self, ctx: &Context) -> Result<Date, Error> {
        Ok(self.schedule(ctx).await?.date)
    }

    /// Numbers of the seats still available for booking, in ascending order.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Schedule.availableSeats",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn available_seats(
        &self,
        ctx: &Context,
    ) -> Result<Vec<api::seat::Number>, Error> {
        ctx.service()
            .execute(query::seats::Available {
                schedule_id: self.id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|n| n.into_iter().map(Into::into).collect())
    }
}

/// Unique identifier of a `Schedule`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::schedule::Id)]
#[into(domain::schedule::Id)]
#[graphql(name = "ScheduleId", transparent)]
pub struct Id(Uuid);

/// A route between two places.
#[derive(Clone, Debug, From)]
pub struct Route(domain::Route);

/// A route between two places.
#[graphql_object(context = Context)]
impl Route {
    /// Unique identifier of this `Route`.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.0.id.into()
    }

    /// Place this `Route` starts at.
    #[must_use]
    pub fn origin(&self) -> Place {
        self.0.origin.clone().into()
    }

    /// Place this `Route` ends at.
    #[must_use]
    pub fn destination(&self) -> Place {
        self.0.destination.clone().into()
    }
}

/// Origin or destination of a `Route`, compared case-sensitively.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "RoutePlace",
    with = scalar::Via::<domain::route::Place>,
)]
pub struct Place(domain::route::Place);
