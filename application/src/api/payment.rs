//! [`Payment`]-related definitions.

use common::{DateTime, Money};
use derive_more::From;
use juniper::{graphql_object, GraphQLEnum};
use service::domain;
use uuid::Uuid;

use crate::{api, Context};

/// A payment recorded for a `Booking`.
#[derive(Clone, Debug, From)]
pub struct Payment(domain::Payment);

/// A payment recorded for a `Booking`.
///
/// Recording a `Payment` never changes any seat.
#[graphql_object(context = Context)]
impl Payment {
    /// Unique identifier of this `Payment`.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.0.id.into()
    }

    /// ID of the paid `Booking`.
    #[must_use]
    pub fn booking_id(&self) -> api::booking::Id {
        self.0.booking_id.into()
    }

    /// Paid amount, as reported by the payer.
    #[must_use]
    pub fn amount(&self) -> Money {
        self.0.amount
    }

    /// Status of this `Payment`.
    #[must_use]
    pub fn status(&self) -> Status {
        self.0.status.into()
    }

    /// `DateTime` when this `Payment` was recorded.
    #[must_use]
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }
}

/// Status of a `Payment`.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "PaymentStatus")]
pub enum Status {
    /// Money has been received.
    Successful,

    /// Money has not been received.
    Failed,
}

impl From<domain::payment::Status> for Status {
    fn from(status: domain::payment::Status) -> Self {
        use domain::payment::Status as S;
        match status {
            S::Successful => Self::Successful,
            S::Failed => Self::Failed,
        }
    }
}

impl From<Status> for domain::payment::Status {
    fn from(status: Status) -> Self {
        match status {
            Status::Successful => Self::Successful,
            Status::Failed => Self::Failed,
        }
    }
}
