//! [`Command`] for releasing held [`Seat`]s of a [`Schedule`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::{
    command::ReserveSeats,
    domain::{seat::Occupancy, Booking, Bus},
};
use crate::{
    domain::{bus, schedule, seat, Schedule, Seat},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for making [`Seat`]s held by [`ReserveSeats`] available again.
///
/// [`Seat`]s bound to a [`Booking`] are never released by this [`Command`].
/// Either all the [`Seat`]s are released, or none of them.
#[derive(Clone, Debug)]
pub struct ReleaseSeats {
    /// ID of the [`Schedule`] whose [`Bus`] [`Seat`]s are released.
    pub schedule_id: schedule::Id,

    /// [`seat::Number`]s of the [`Seat`]s to release.
    pub numbers: Vec<seat::Number>,
}

impl<Db> Command<ReleaseSeats> for Service<Db>
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

    async fn execute(&self, cmd: ReleaseSeats) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ReleaseSeats {
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
            .release()
            .map_err(E::SeatsNotHeld)
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
            "seats {numbers} of `Bus(id: {})` released",
            schedule.bus_id,
        );

        Ok(numbers)
    }
}

/// Error of [`ReleaseSeats`] [`Command`] execution.
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

    /// Some of the [`Seat`]s are not [`Occupancy::Held`], being either
    /// available or booked.
    #[display("Seats are not held: {_0}")]
    SeatsNotHeld(#[error(not(source))] seat::Numbers),

    /// Some of the [`Seat`]s don't exist in the [`Bus`].
    #[display("Seats do not exist: {_0}")]
    SeatsNotExist(#[error(not(source))] seat::Numbers),
}

#[cfg(test)]
mod spec {
    use crate::{
        command::{BookTicket, ReserveSeats},
        domain::user::Role,
        testing, Command as _,
    };

    use super::{ExecutionError, ReleaseSeats};

    #[tokio::test]
    async fn releases_held_seats() {
        let svc = testing::service();
        let bus = testing::bus(&svc, &["A1", "A2"]);
        let schedule = testing::schedule(&svc, &bus, "500");
        drop(
            svc.execute(ReserveSeats {
                schedule_id: schedule.id,
                numbers: testing::numbers(&["A1", "A2"]),
            })
            .await
            .unwrap(),
        );

        let released = svc
            .execute(ReleaseSeats {
                schedule_id: schedule.id,
                numbers: testing::numbers(&["A2"]),
            })
            .await
            .unwrap();

        assert_eq!(released.as_slice(), testing::numbers(&["A2"]));
        svc.database().inspect(|s| {
            assert_eq!(s.available_seats(bus.id), testing::numbers(&["A2"]));
        });
    }

    #[tokio::test]
    async fn releases_nothing_if_any_seat_is_available() {
        let svc = testing::service();
        let bus = testing::bus(&svc, &["A1", "A2"]);
        let schedule = testing::schedule(&svc, &bus, "500");
        drop(
            svc.execute(ReserveSeats {
                schedule_id: schedule.id,
                numbers: testing::numbers(&["A1"]),
            })
            .await
            .unwrap(),
        );

        let err = svc
            .execute(ReleaseSeats {
                schedule_id: schedule.id,
                numbers: testing::numbers(&["A1", "A2"]),
            })
            .await
            .unwrap_err();

        assert!(
            matches!(
                err.as_ref(),
                ExecutionError::SeatsNotHeld(n)
                    if n.as_slice() == testing::numbers(&["A2"]),
            ),
            "{err}",
        );
        svc.database().inspect(|s| {
            assert_eq!(s.available_seats(bus.id), testing::numbers(&["A2"]));
        });
    }

    #[tokio::test]
    async fn never_releases_booked_seats() {
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

        let err = svc
            .execute(ReleaseSeats {
                schedule_id: schedule.id,
                numbers: testing::numbers(&["A1"]),
            })
            .await
            .unwrap_err();

        assert!(
            matches!(err.as_ref(), ExecutionError::SeatsNotHeld(_)),
            "{err}",
        );
        svc.database().inspect(|s| {
            assert!(s
                .seats
                .values()
                .all(|s| s.occupancy.booking_id() == Some(out.booking.id)));
        });
    }
}
