//! [`Command`] for holding [`Seat`]s of a [`Schedule`] without a [`Booking`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::{Booking, Bus};
use crate::{
    domain::{bus, schedule, seat, Schedule, Seat},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for holding [`Seat`]s of a [`Schedule`]'s [`Bus`] without any
/// [`Booking`].
///
/// Either all the [`Seat`]s are held, or none of them.
#[derive(Clone, Debug)]
pub struct ReserveSeats {
    /// ID of the [`Schedule`] whose [`Bus`] [`Seat`]s are held.
    pub schedule_id: schedule::Id,

    /// [`seat::Number`]s of the [`Seat`]s to hold.
    pub numbers: Vec<seat::Number>,
}

impl<Db> Command<ReserveSeats> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Schedule>, schedule::Id>>,
            Ok = Option<Schedule>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<
            Lock<By<Vec<Seat>, (bus::Id, seat::Selection)>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Seat>, bus::Id>>,
            Ok = Vec<Seat>,
            Err = Traced<database::Error>,
        > + Database<Update<Vec<Seat>>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = seat::Numbers;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: ReserveSeats) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ReserveSeats {
            schedule_id,
            numbers,
        } = cmd;

        let selection = seat::Selection::new(numbers)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let schedule = self
            .database()
            .execute(Select(By::<Option<Schedule>, _>::new(schedule_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ScheduleNotExists(schedule_id))
            .map_err(tracerr::wrap!())?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Lock(By::new((schedule.bus_id, selection.clone()))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let seats = tx
            .execute(Select(By::<Vec<Seat>, _>::new(schedule.bus_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let mut batch = seat::Batch::pick(seats, &selection)
            .map_err(E::SeatsNotExist)
            .map_err(tracerr::wrap!())?;
        batch
            .hold()
            .map_err(E::SeatsUnavailable)
            .map_err(tracerr::wrap!())?;
        let numbers = batch.numbers();

        tx.execute(Update(batch.into_inner()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::info!(
            "seats {numbers} of `Bus(id: {})` held",
            schedule.bus_id,
        );

        Ok(numbers)
    }
}

/// Error of [`ReserveSeats`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Requested [`seat::Number`]s are malformed.
    #[display("Invalid seat numbers: {_0}")]
    #[from]
    InvalidSelection(#[error(not(source))] seat::SelectionError),

    /// [`Schedule`] with the provided ID does not exist.
    #[display("`Schedule(id: {_0})` does not exist")]
    ScheduleNotExists(#[error(not(source))] schedule::Id),

    /// Some of the [`Seat`]s don't exist in the [`Bus`].
    #[display("Seats do not exist: {_0}")]
    SeatsNotExist(#[error(not(source))] seat::Numbers),

    /// Some of the [`Seat`]s are not available.
    #[display("Seats are not available: {_0}")]
    SeatsUnavailable(#[error(not(source))] seat::Numbers),
}

#[cfg(test)]
mod spec {
    use crate::{
        command::BookTicket,
        domain::{seat, user::Role},
        testing, Command as _,
    };

    use super::{ExecutionError, ReserveSeats};

    #[tokio::test]
    async fn holds_seats_without_booking() {
        let svc = testing::service();
        let bus = testing::bus(&svc, &["A1", "A2", "A3"]);
        let schedule = testing::schedule(&svc, &bus, "500");

        let held = svc
            .execute(ReserveSeats {
                schedule_id: schedule.id,
                numbers: testing::numbers(&["A3", "A1"]),
            })
            .await
            .unwrap();

        assert_eq!(held.as_slice(), testing::numbers(&["A1", "A3"]));
        svc.database().inspect(|s| {
            assert_eq!(s.available_seats(bus.id), testing::numbers(&["A2"]));
            assert!(s.bookings.is_empty());
            assert_eq!(
                s.seats
                    .values()
                    .filter(|s| s.occupancy == seat::Occupancy::Held)
                    .count(),
                2,
            );
        });
    }

    #[tokio::test]
    async fn holds_nothing_if_any_seat_is_taken() {
        let svc = testing::service();
        let user = testing::user(&svc, Role::Passenger);
        let bus = testing::bus(&svc, &["A1", "A2"]);
        let schedule = testing::schedule(&svc, &bus, "500");
        drop(
            svc.execute(BookTicket {
                user_id: user.id,
                schedule_id: schedule.id,
                seats: testing::numbers(&["A2"]),
            })
            .await
            .unwrap(),
        );

        let err = svc
            .execute(ReserveSeats {
                schedule_id: schedule.id,
                numbers: testing::numbers(&["A1", "A2"]),
            })
            .await
            .unwrap_err();

        assert!(
            matches!(
                err.as_ref(),
                ExecutionError::SeatsUnavailable(n)
                    if n.as_slice() == testing::numbers(&["A2"]),
            ),
            "{err}",
        );
        svc.database().inspect(|s| {
            assert_eq!(s.available_seats(bus.id), testing::numbers(&["A1"]));
        });
    }

    #[tokio::test]
    async fn rejects_unknown_seats() {
        let svc = testing::service();
        let bus = testing::bus(&svc, &["A1"]);
        let schedule = testing::schedule(&svc, &bus, "500");

        let err = svc
            .execute(ReserveSeats {
                schedule_id: schedule.id,
                numbers: testing::numbers(&["A1", "X1"]),
            })
            .await
            .unwrap_err();

        assert!(
            matches!(err.as_ref(), ExecutionError::SeatsNotExist(_)),
            "{err}",
        );
        svc.database().inspect(|s| {
            assert_eq!(s.available_seats(bus.id), testing::numbers(&["A1"]));
        });
    }
}
