//! [`Query`] collection related to a single [`Payment`].

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::Booking;
use crate::{
    domain::{booking, Payment},
    infra::{database, Database},
    Service,
};

use super::Query;

/// Queries the [`Payment`] recorded for a [`Booking`].
#[derive(Clone, Copy, Debug)]
pub struct ByBooking {
    /// ID of the paid [`Booking`].
    pub booking_id: booking::Id,
}

impl<Db> Query<ByBooking> for Service<Db>
where
    Db: Database<
        Select<By<Option<Payment>, booking::Id>>,
        Ok = Option<Payment>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Payment;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, query: ByBooking) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ByBooking { booking_id } = query;

        self.database()
            .execute(Select(By::new(booking_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PaymentNotExists(booking_id))
            .map_err(tracerr::wrap!())
    }
}

/// Error of [`ByBooking`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// No [`Payment`] is recorded for the [`Booking`].
    #[display("No `Payment` recorded for `Booking(id: {_0})`")]
    PaymentNotExists(#[error(not(source))] booking::Id),
}

#[cfg(test)]
mod spec {
    use crate::{
        command::{BookTicket, InitiatePayment},
        domain::{payment, user::Role},
        testing, Command as _, Query as _,
    };

    use super::{ByBooking, ExecutionError};

    #[tokio::test]
    async fn reports_recorded_status() {
        let svc = testing::service();
        let user = testing::user(&svc, Role::Passenger);
        let bus = testing::bus(&svc, &["A1"]);
        let schedule = testing::schedule(&svc, &bus, "500");
        let out = svc
            .execute(BookTicket {
                user_id: user.id,
                schedule_id: schedule.id,
                seats: testing::numbers(&["A1"]),
            })
            .await
            .unwrap();
        let query = ByBooking {
            booking_id: out.booking.id,
        };

        let err = svc.execute(query).await.unwrap_err();
        assert!(
            matches!(err.as_ref(), ExecutionError::PaymentNotExists(_)),
            "{err}",
        );

        drop(
            svc.execute(InitiatePayment {
                booking_id: out.booking.id,
                amount: out.booking.total_fare,
                status: payment::Status::Failed,
            })
            .await
            .unwrap(),
        );
        let payment = svc.execute(query).await.unwrap();
        assert_eq!(payment.status, payment::Status::Failed);
    }
}
