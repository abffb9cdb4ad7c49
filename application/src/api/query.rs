//! GraphQL [`Query`]s definitions.

use common::Date;
use juniper::graphql_object;
use service::{query, read, Query as _};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL queries.
#[derive(Clone, Copy, Debug)]
pub struct Query;

impl Query {
    /// Name of the [`tracing::Span`] for the queries.
    pub(crate) const SPAN_NAME: &'static str = "GraphQL query";
}

#[graphql_object(context = Context)]
impl Query {
    /// Returns the currently authenticated `User`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the current session is not authenticated.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "myUser",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn my_user(ctx: &Context) -> Result<api::User, Error> {
        let my_id = ctx.current_session().await?.user_id;
        ctx.service()
            .execute(query::user::ById::by(my_id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| UserError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Searches the `Schedule`s running between the provided places on the
    /// provided `Date`, ordered by their departure.
    ///
    /// Places are matched exactly, case-sensitively.
    #[tracing::instrument(
        skip_all,
        fields(
            date = %date,
            destination = %destination,
            gql.name = "searchBus",
            origin = %origin,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn search_bus(
        origin: api::schedule::Place,
        destination: api::schedule::Place,
        date: Date,
        ctx: &Context,
    ) -> Result<Vec<api::Schedule>, Error> {
        ctx.service()
            .execute(query::schedules::Search::by(read::schedule::Search {
                origin: origin.into(),
                destination: destination.into(),
                date,
            }))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|s| s.into_iter().map(Into::into).collect())
    }

    /// Returns the `Schedule` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `SCHEDULE_NOT_EXISTS` - the `Schedule` with the specified ID does
    ///                           not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "schedule",
            id = %id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn schedule(
        id: api::schedule::Id,
        ctx: &Context,
    ) -> Result<api::Schedule, Error> {
        ctx.service()
            .execute(query::schedule::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| ScheduleError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns numbers of the seats available for booking on the `Schedule`
    /// with the specified ID, in ascending order.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `SCHEDULE_NOT_EXISTS` - the `Schedule` with the specified ID does
    ///                           not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "availableSeats",
            otel.name = Self::SPAN_NAME,
            schedule.id = %schedule_id,
        ),
    )]
    pub async fn available_seats(
        schedule_id: api::schedule::Id,
        ctx: &Context,
    ) -> Result<Vec<api::seat::Number>, Error> {
        ctx.service()
            .execute(query::seats::Available {
                schedule_id: schedule_id.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|n| n.into_iter().map(Into::into).collect())
    }

    /// Returns all the `Booking`s of the authenticated `User`, newest first.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the current session is not authenticated.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "myBookings",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn my_bookings(
        ctx: &Context,
    ) -> Result<Vec<api::Booking>, Error> {
        let my_id = ctx.current_session().await?.user_id;
        ctx.service()
            .execute(query::bookings::ByUser::by(my_id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|b| b.into_iter().map(Into::into).collect())
    }

    /// Returns the `Payment` recorded for the `Booking` with the specified
    /// ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the current session is not authenticated;
    /// - `BOOKING_NOT_EXISTS` - the `Booking` with the specified ID does not
    ///                          exist;
    /// - `NOT_BOOKING_OWNER` - the `Booking` belongs to another `User`;
    /// - `PAYMENT_NOT_EXISTS` - no `Payment` is recorded for the `Booking`.
    #[tracing::instrument(
        skip_all,
        fields(
            booking.id = %booking_id,
            gql.name = "paymentStatus",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn payment_status(
        booking_id: api::booking::Id,
        ctx: &Context,
    ) -> Result<api::Payment, Error> {
        let session = ctx.current_session().await?;
        let booking = ctx
            .service()
            .execute(query::booking::ById::by(booking_id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| BookingError::NotExists.into())
            .map_err(ctx.error())?;
        if !session.acts_for(booking.user_id) {
            return Err(api::PrivilegeError::BookingOwner.into())
                .map_err(ctx.error());
        }

        ctx.service()
            .execute(query::payment::ByBooking {
                booking_id: booking.id,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns all the `Notification`s sent to the authenticated `User`,
    /// newest first.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the current session is not authenticated.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "myNotifications",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn my_notifications(
        ctx: &Context,
    ) -> Result<Vec<api::Notification>, Error> {
        let my_id = ctx.current_session().await?.user_id;
        ctx.service()
            .execute(query::notifications::ByUser::by(my_id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|n| n.into_iter().map(Into::into).collect())
    }
}

impl AsError for query::seats::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::ScheduleNotExists(_) => {
                Some(ScheduleError::NotExists.into())
            }
        }
    }
}

impl AsError for query::payment::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "PAYMENT_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "No `Payment` is recorded for the `Booking`"]
                PaymentNotExists,
            }
        }

        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::PaymentNotExists(_) => Error::PaymentNotExists.into(),
        })
    }
}

define_error! {
    enum BookingError {
        #[code = "BOOKING_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Booking` with the specified ID does not exist"]
        NotExists,
    }
}

define_error! {
    enum BusError {
        #[code = "BUS_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Bus` with the specified ID does not exist"]
        NotExists,
    }
}

define_error! {
    enum RouteError {
        #[code = "ROUTE_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Route` with the specified ID does not exist"]
        NotExists,
    }
}

define_error! {
    enum ScheduleError {
        #[code = "SCHEDULE_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Schedule` with the specified ID does not exist"]
        NotExists,
    }
}

define_error! {
    enum UserError {
        #[code = "USER_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`User` with the specified ID does not exist"]
        NotExists,
    }
}
