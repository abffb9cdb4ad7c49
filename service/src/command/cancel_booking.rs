//! [`Command`] for cancelling a [`Booking`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{booking, bus, seat, Booking, Seat},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for cancelling a [`Booking`] and making its [`Seat`]s available
/// again.
///
/// Returns `false` if the [`Booking`] doesn't exist. Cancelling an already
/// cancelled [`Booking`] succeeds without any changes.
#[derive(Clone, Copy, Debug)]
pub struct CancelBooking {
    /// ID of the [`Booking`] to cancel.
    pub booking_id: booking::Id,
}

impl<Db> Command<CancelBooking> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Booking>, booking::Id>>,
            Ok = Option<Booking>,
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<
            Lock<By<Booking, booking::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<Vec<Seat>, (bus::Id, seat::Selection)>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Booking>, booking::Id>>,
            Ok = Option<Booking>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Seat>, booking::Id>>,
            Ok = Vec<Seat>,
            Err = Traced<database::Error>,
        > + Database<Update<Booking>, Err = Traced<database::Error>>
        + Database<Update<Vec<Seat>>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = bool;
    type Err = ExecutionError;

    async fn execute(
        &self,
        cmd: CancelBooking,
    ) -> Result<Self::Ok, Self::Err> {
        let CancelBooking { booking_id } = cmd;

        let exists = self
            .database()
            .execute(Select(By::<Option<Booking>, _>::new(booking_id)))
            .await
            .map_err(tracerr::wrap!())?
            .is_some();
        if !exists {
            return Ok(false);
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::wrap!())?;

        // Avoid concurrent cancellations of the same `Booking`.
        tx.execute(Lock(By::<Booking, _>::new(booking_id)))
            .await
            .map_err(tracerr::wrap!())
            .map(drop)?;

        let Some(mut booking) = tx
            .execute(Select(By::<Option<Booking>, _>::new(booking_id)))
            .await
            .map_err(tracerr::wrap!())?
        else {
            return Ok(false);
        };
        booking.cancel();

        let mut seats = seat::Batch::from(
            tx.execute(Select(By::<Vec<Seat>, _>::new(booking_id)))
                .await
                .map_err(tracerr::wrap!())?,
        );
        // Freed `Seat`s are locked in the same order as `BookTicket` locks
        // them, so the two never deadlock.
        if let Some(selection) = seats.selection() {
            tx.execute(Lock(By::<Vec<Seat>, _>::new(selection)))
                .await
                .map_err(tracerr::wrap!())
                .map(drop)?;
        }
        seats.free();
        let numbers = seats.numbers();

        tx.execute(Update(booking))
            .await
            .map_err(tracerr::wrap!())
            .map(drop)?;
        tx.execute(Update(seats.into_inner()))
            .await
            .map_err(tracerr::wrap!())
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::wrap!())
            .map(drop)?;

        log::info!(
            "`Booking(id: {booking_id})` cancelled, freed seats: {numbers}",
        );

        Ok(true)
    }
}

/// Error of [`CancelBooking`] [`Command`] execution.
pub type ExecutionError = Traced<database::Error>;

#[cfg(test)]
mod spec {
    use crate::{
        command::BookTicket,
        domain::{booking, user::Role},
        testing, Command as _,
    };

    use std::time::Duration;

    use super::CancelBooking;

    #[tokio::test]
    async fn frees_booked_seats() {
        let svc = testing::service();
        let user = testing::user(&svc, Role::Passenger);
        let bus = testing::bus(&svc, &["A1", "A2", "A3"]);
        let schedule = testing::schedule(&svc, &bus, "500");
        let out = svc
            .execute(BookTicket {
                user_id: user.id,
                schedule_id: schedule.id,
                seats: testing::numbers(&["A1", "A2"]),
            })
            .await
            .unwrap();

        let cancelled = svc
            .execute(CancelBooking {
                booking_id: out.booking.id,
            })
            .await
            .unwrap();

        assert!(cancelled);
        svc.database().inspect(|s| {
            assert_eq!(
                s.bookings[&out.booking.id].status,
                booking::Status::Cancelled,
            );
            assert_eq!(
                s.available_seats(bus.id),
                testing::numbers(&["A1", "A2", "A3"]),
            );
            assert!(s
                .seats
                .values()
                .all(|s| s.occupancy.booking_id().is_none()));
        });
    }

    #[tokio::test]
    async fn cancellation_is_idempotent() {
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
        let cancel = CancelBooking {
            booking_id: out.booking.id,
        };

        assert!(svc.execute(cancel).await.unwrap());
        assert!(svc.execute(cancel).await.unwrap());

        svc.database().inspect(|s| {
            assert_eq!(
                s.bookings[&out.booking.id].status,
                booking::Status::Cancelled,
            );
            assert_eq!(s.available_seats(bus.id), testing::numbers(&["A1"]));
        });
    }

    #[tokio::test]
    async fn unknown_booking_is_not_cancelled() {
        let svc = testing::service();
        let user = testing::user(&svc, Role::Passenger);
        let bus = testing::bus(&svc, &["A1"]);
        let schedule = testing::schedule(&svc, &bus, "500");
        drop(
            svc.execute(BookTicket {
                user_id: user.id,
                schedule_id: schedule.id,
                seats: testing::numbers(&["A1"]),
            })
            .await
            .unwrap(),
        );

        let cancelled = svc
            .execute(CancelBooking {
                booking_id: booking::Id::new(),
            })
            .await
            .unwrap();

        assert!(!cancelled);
        svc.database().inspect(|s| {
            assert!(s.available_seats(bus.id).is_empty());
            assert!(s
                .bookings
                .values()
                .all(|b| b.status == booking::Status::Confirmed));
        });
    }

    #[tokio::test]
    async fn cancelled_seats_can_be_booked_again() {
        let svc = testing::service();
        let alice = testing::user(&svc, Role::Passenger);
        let bob = testing::user(&svc, Role::Passenger);
        let bus = testing::bus(&svc, &["A1"]);
        let schedule = testing::schedule(&svc, &bus, "500");
        let first = svc
            .execute(BookTicket {
                user_id: alice.id,
                schedule_id: schedule.id,
                seats: testing::numbers(&["A1"]),
            })
            .await
            .unwrap();

        let (cancelled, second) = tokio::join!(
            svc.execute(CancelBooking {
                booking_id: first.booking.id,
            }),
            svc.execute(BookTicket {
                user_id: bob.id,
                schedule_id: schedule.id,
                seats: testing::numbers(&["A1"]),
            }),
        );

        assert!(cancelled.unwrap());
        svc.database().inspect(|s| match &second {
            Ok(out) => assert_eq!(
                s.seats.values().next().unwrap().occupancy.booking_id(),
                Some(out.booking.id),
            ),
            Err(_) => assert_eq!(
                s.available_seats(bus.id),
                testing::numbers(&["A1"]),
            ),
        });
    }

    #[tokio::test]
    async fn cancellation_and_booking_of_same_seats_both_complete() {
        let svc = testing::service();
        let alice = testing::user(&svc, Role::Passenger);
        let bob = testing::user(&svc, Role::Passenger);
        let bus = testing::bus(&svc, &["A1", "A2", "A3"]);
        let schedule = testing::schedule(&svc, &bus, "500");
        let first = svc
            .execute(BookTicket {
                user_id: alice.id,
                schedule_id: schedule.id,
                seats: testing::numbers(&["A3", "A2", "A1"]),
            })
            .await
            .unwrap();

        let (cancelled, second) = tokio::time::timeout(
            Duration::from_secs(5),
            async {
                tokio::join!(
                    svc.execute(CancelBooking {
                        booking_id: first.booking.id,
                    }),
                    svc.execute(BookTicket {
                        user_id: bob.id,
                        schedule_id: schedule.id,
                        seats: testing::numbers(&["A3", "A1"]),
                    }),
                )
            },
        )
        .await
        .expect("cancellation and booking deadlocked");

        assert!(cancelled.unwrap());
        svc.database().inspect(|s| {
            assert_eq!(
                s.bookings[&first.booking.id].status,
                booking::Status::Cancelled,
            );
            match &second {
                Ok(_) => assert_eq!(
                    s.available_seats(bus.id),
                    testing::numbers(&["A2"]),
                ),
                Err(_) => assert_eq!(
                    s.available_seats(bus.id),
                    testing::numbers(&["A1", "A2", "A3"]),
                ),
            }
        });
    }
}
