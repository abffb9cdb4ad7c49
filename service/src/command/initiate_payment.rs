//! [`Command`] for recording a [`Payment`] of a [`Booking`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    DateTime, Money,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{booking, payment, Booking, Payment},
    infra::{
        database::{self, constraint},
        Database,
    },
    Service,
};

use super::Command;

/// [`Command`] for recording a [`Payment`] of a [`Booking`].
///
/// At most one [`Payment`] is recorded per [`Booking`], whatever its
/// [`payment::Status`] is.
#[derive(Clone, Copy, Debug)]
pub struct InitiatePayment {
    /// ID of the paid [`Booking`].
    pub booking_id: booking::Id,

    /// Paid amount.
    pub amount: Money,

    /// Outcome of the [`Payment`].
    pub status: payment::Status,
}

impl<Db> Command<InitiatePayment> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Booking>, booking::Id>>,
            Ok = Option<Booking>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<Insert<Payment>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Payment;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: InitiatePayment,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let InitiatePayment {
            booking_id,
            amount,
            status,
        } = cmd;

        let booking = self
            .database()
            .execute(Select(By::<Option<Booking>, _>::new(booking_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::BookingNotExists(booking_id))
            .map_err(tracerr::wrap!())?;

        let payment = Payment {
            id: payment::Id::new(),
            booking_id: booking.id,
            amount,
            status,
            created_at: DateTime::now().coerce(),
        };

        let paid = |e: Traced<database::Error>| {
            if e.as_ref().is_unique_violation(Some(constraint::PAYMENT_BOOKING))
            {
                tracerr::new!(E::AlreadyPaid(booking_id))
            } else {
                tracerr::map_from(e)
            }
        };
        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(payment.clone()))
            .await
            .map_err(paid)
            .map(drop)?;
        tx.execute(Commit).await.map_err(paid).map(drop)?;

        log::info!(
            "`Payment(id: {})` of {amount} recorded for `Booking(id: {})` as \
             `{status}`",
            payment.id,
            booking.id,
        );

        Ok(payment)
    }
}

/// Error of [`InitiatePayment`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Booking`] already has a [`Payment`].
    #[display("`Booking(id: {_0})` is already paid")]
    AlreadyPaid(#[error(not(source))] booking::Id),

    /// [`Booking`] with the provided ID does not exist.
    #[display("`Booking(id: {_0})` does not exist")]
    BookingNotExists(#[error(not(source))] booking::Id),
}

#[cfg(test)]
mod spec {
    use crate::{
        command::BookTicket,
        domain::{booking, payment, user::Role},
        testing, Command as _,
    };

    use super::{ExecutionError, InitiatePayment};

    #[tokio::test]
    async fn records_single_payment_per_booking() {
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
        let pay = InitiatePayment {
            booking_id: out.booking.id,
            amount: out.booking.total_fare,
            status: payment::Status::Successful,
        };

        let payment = svc.execute(pay).await.unwrap();
        let err = svc
            .execute(InitiatePayment {
                status: payment::Status::Failed,
                ..pay
            })
            .await
            .unwrap_err();

        assert_eq!(payment.amount, out.booking.total_fare);
        assert!(
            matches!(
                err.as_ref(),
                ExecutionError::AlreadyPaid(id) if *id == out.booking.id,
            ),
            "{err}",
        );
        svc.database().inspect(|s| {
            assert_eq!(s.payments.len(), 1);
            assert_eq!(
                s.payments[&out.booking.id].status,
                payment::Status::Successful,
            );
        });
    }

    #[tokio::test]
    async fn requires_existing_booking() {
        let svc = testing::service();
        let bus = testing::bus(&svc, &["A1"]);
        let schedule = testing::schedule(&svc, &bus, "500");

        let err = svc
            .execute(InitiatePayment {
                booking_id: booking::Id::new(),
                amount: schedule.fare,
                status: payment::Status::Successful,
            })
            .await
            .unwrap_err();

        assert!(
            matches!(err.as_ref(), ExecutionError::BookingNotExists(_)),
            "{err}",
        );
    }
}
