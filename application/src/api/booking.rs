//! [`Booking`]-related definitions.

use common::{DateTime, Money};
use derive_more::{Display, From, Into};
use juniper::{graphql_object, GraphQLEnum, GraphQLScalar};
use service::{domain, query, read, Query as _};
use uuid::Uuid;

use crate::{api, AsError, Context, Error};

/// A reservation of seats on a `Schedule`.
#[derive(Clone, Debug, From)]
pub struct Booking(read::booking::Details);

/// A reservation of seats on a `Schedule`.
#[graphql_object(context = Context)]
impl Booking {
    /// Unique identifier of this `Booking`.
    #[must_use]
    pub fn id(&self) -> Id {
        self.0.booking.id.into()
    }

    /// `User` owning this `Booking`.
    #[must_use]
    pub fn user(&self) -> api::User {
        #[expect(unsafe_code, reason = "`Booking` references existing `User`")]
        unsafe {
            api::User::new_unchecked(self.0.booking.user_id)
        }
    }

    /// Booked `Schedule`.
    #[must_use]
    pub fn schedule(&self) -> api::Schedule {
        #[expect(
            unsafe_code,
            reason = "`Booking` references existing `Schedule`"
        )]
        unsafe {
            api::Schedule::new_unchecked(self.0.booking.schedule_id)
        }
    }

    /// Fare of all the booked seats together.
    #[must_use]
    pub fn total_fare(&self) -> Money {
        self.0.booking.total_fare
    }

    /// Current status of this `Booking`.
    #[must_use]
    pub fn status(&self) -> Status {
        self.0.booking.status.into()
    }

    /// Numbers of the seats bound to this `Booking`, in ascending order.
    ///
    /// Empty once this `Booking` is cancelled.
    #[must_use]
    pub fn seats(&self) -> Vec<api::seat::Number> {
        self.0.seats.iter().cloned().map(Into::into).collect()
    }

    /// `DateTime` when this `Booking` was made.
    #[must_use]
    pub fn created_at(&self) -> DateTime {
        self.0.booking.created_at.coerce()
    }

    /// `Payment` recorded for this `Booking`, if any.
    #[tracing::instrument(
        skip_all,
        fields(
            booking.id = %self.0.booking.id,
            gql.name = "Booking.payment",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn payment(
        &self,
        ctx: &Context,
    ) -> Result<Option<api::Payment>, Error> {
        use query::payment::ExecutionError as E;

        match ctx
            .service()
            .execute(query::payment::ByBooking {
                booking_id: self.0.booking.id,
            })
            .await
        {
            Ok(p) => Ok(Some(p.into())),
            Err(e) if matches!(e.as_ref(), E::PaymentNotExists(_)) => Ok(None),
            Err(e) => Err(e.into_error()).map_err(ctx.error()),
        }
    }
}

/// Unique identifier of a `Booking`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::booking::Id)]
#[into(domain::booking::Id)]
#[graphql(name = "BookingId", transparent)]
pub struct Id(Uuid);

/// Status of a `Booking`.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "BookingStatus")]
pub enum Status {
    /// `Booking` holds its seats.
    Confirmed,

    /// `Booking` released its seats.
    Cancelled,
}

impl From<domain::booking::Status> for Status {
    fn from(status: domain::booking::Status) -> Self {
        use domain::booking::Status as S;
        match status {
            S::Confirmed => Self::Confirmed,
            S::Cancelled => Self::Cancelled,
        }
    }
}
