//! [`Command`] for adding new [`Seat`]s to a [`Bus`].

use common::operations::{
    By, Commit, Insert, Lock, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{bus, seat, Bus, Seat},
    infra::{
        database::{self, constraint},
        Database,
    },
    Service,
};

use super::Command;

/// [`Command`] for adding new [`Seat`]s to a [`Bus`].
///
/// Either all the [`Seat`]s are added, or none of them.
#[derive(Clone, Debug)]
pub struct AddSeats {
    /// ID of the [`Bus`] to add the [`Seat`]s to.
    pub bus_id: bus::Id,

    /// [`seat::Number`]s of the new [`Seat`]s.
    pub numbers: Vec<seat::Number>,
}

impl<Db> Command<AddSeats> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Bus>, bus::Id>>,
            Ok = Option<Bus>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<
            Lock<By<Bus, bus::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Seat>, bus::Id>>,
            Ok = Vec<Seat>,
            Err = Traced<database::Error>,
        > + Database<Insert<Vec<Seat>>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Vec<Seat>;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: AddSeats) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AddSeats { bus_id, numbers } = cmd;

        let selection = seat::Selection::new(numbers)
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let bus = self
            .database()
            .execute(Select(By::<Option<Bus>, _>::new(bus_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::BusNotExists(bus_id))
            .map_err(tracerr::wrap!())?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent additions to the same `Bus`.
        tx.execute(Lock(By::<Bus, _>::new(bus.id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let existing = tx
            .execute(Select(By::<Vec<Seat>, _>::new(bus.id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        let present = existing
            .iter()
            .filter(|s| selection.contains(&s.number))
            .map(|s| s.number.clone())
            .collect::<Vec<_>>();
        if !present.is_empty() {
            return Err(tracerr::new!(E::SeatsExist(present.into())));
        }

        let seats = selection
            .numbers()
            .iter()
            .map(|n| Seat::new(bus.id, n.clone()))
            .collect::<Vec<_>>();
        let numbers = seat::Batch::from(seats.clone()).numbers();

        let exist = |e: Traced<database::Error>| {
            if e.as_ref().is_unique_violation(Some(constraint::SEAT_NUMBER)) {
                tracerr::new!(E::SeatsExist(numbers.clone()))
            } else {
                tracerr::map_from(e)
            }
        };
        tx.execute(Insert(seats.clone()))
            .await
            .map_err(exist)
            .map(drop)?;
        tx.execute(Commit).await.map_err(exist).map(drop)?;

        log::info!("seats {numbers} added to `Bus(id: {})`", bus.id);

        Ok(seats)
    }
}

/// Error of [`AddSeats`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Bus`] with the provided ID does not exist.
    #[display("`Bus(id: {_0})` does not exist")]
    BusNotExists(#[error(not(source))] bus::Id),

    /// Requested [`seat::Number`]s are malformed.
    #[display("Invalid seat numbers: {_0}")]
    #[from]
    InvalidSelection(#[error(not(source))] seat::SelectionError),

    /// Some of the [`Seat`]s already exist in the [`Bus`].
    #[display("Seats already exist: {_0}")]
    SeatsExist(#[error(not(source))] seat::Numbers),
}

#[cfg(test)]
mod spec {
    use crate::{domain::bus, testing, Command as _};

    use super::{AddSeats, ExecutionError};

    #[tokio::test]
    async fn adds_vacant_seats() {
        let svc = testing::service();
        let bus = testing::bus(&svc, &["A1"]);

        let seats = svc
            .execute(AddSeats {
                bus_id: bus.id,
                numbers: testing::numbers(&["B2", "B1"]),
            })
            .await
            .unwrap();

        assert_eq!(seats.len(), 2);
        assert!(seats.iter().all(|s| s.is_available() && s.bus_id == bus.id));
        svc.database().inspect(|s| {
            assert_eq!(
                s.available_seats(bus.id),
                testing::numbers(&["A1", "B1", "B2"]),
            );
        });
    }

    #[tokio::test]
    async fn adds_nothing_if_any_seat_exists() {
        let svc = testing::service();
        let bus = testing::bus(&svc, &["A1"]);

        let err = svc
            .execute(AddSeats {
                bus_id: bus.id,
                numbers: testing::numbers(&["A2", "A1"]),
            })
            .await
            .unwrap_err();

        assert!(
            matches!(
                err.as_ref(),
                ExecutionError::SeatsExist(n)
                    if n.as_slice() == testing::numbers(&["A1"]),
            ),
            "{err}",
        );
        assert_eq!(svc.database().inspect(|s| s.seats.len()), 1);
    }

    #[tokio::test]
    async fn adds_seats_beyond_declared_total() {
        let svc = testing::service();
        let bus = testing::bus(&svc, &["A1", "A2", "A3"]);
        svc.database().modify(|s| {
            if let Some(b) = s.buses.get_mut(&bus.id) {
                b.total_seats = bus::Capacity::new(3).unwrap();
            }
        });

        let seats = svc
            .execute(AddSeats {
                bus_id: bus.id,
                numbers: testing::numbers(&["B1", "B2", "B3", "B4"]),
            })
            .await
            .unwrap();

        assert_eq!(seats.len(), 4);
        svc.database().inspect(|s| {
            assert_eq!(s.available_seats(bus.id).len(), 7);
        });
    }

    #[tokio::test]
    async fn concurrent_additions_add_seat_once() {
        let svc = testing::service();
        let bus = testing::bus(&svc, &[]);

        let (a, b) = tokio::join!(
            svc.execute(AddSeats {
                bus_id: bus.id,
                numbers: testing::numbers(&["A1"]),
            }),
            svc.execute(AddSeats {
                bus_id: bus.id,
                numbers: testing::numbers(&["A1"]),
            }),
        );

        assert_eq!(usize::from(a.is_ok()) + usize::from(b.is_ok()), 1);
        assert_eq!(svc.database().inspect(|s| s.seats.len()), 1);
    }

    #[tokio::test]
    async fn requires_existing_bus() {
        let svc = testing::service();

        let err = svc
            .execute(AddSeats {
                bus_id: bus::Id::new(),
                numbers: testing::numbers(&["A1"]),
            })
            .await
            .unwrap_err();

        assert!(
            matches!(err.as_ref(), ExecutionError::BusNotExists(_)),
            "{err}",
        );
    }
}
