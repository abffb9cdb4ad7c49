//! [`Query`] collection related to multiple [`Booking`]s.

use common::operations::By;

#[cfg(doc)]
use crate::{domain::Booking, Query};
use crate::{domain::user, read::booking::Details};

use super::DatabaseQuery;

/// Queries all the [`Booking`]s of a [`user::Id`], newest first, along with
/// their seats.
pub type ByUser = DatabaseQuery<By<Vec<Details>, user::Id>>;

#[cfg(test)]
mod spec {
    use crate::{
        command::{BookTicket, CancelBooking},
        domain::{booking, user::Role},
        testing, Command as _, Query as _,
    };

    use super::ByUser;

    #[tokio::test]
    async fn lists_own_bookings_with_seats() {
        let svc = testing::service();
        let alice = testing::user(&svc, Role::Passenger);
        let bob = testing::user(&svc, Role::Passenger);
        let bus = testing::bus(&svc, &["A1", "A2", "A3"]);
        let schedule = testing::schedule(&svc, &bus, "500");
        let first = svc
            .execute(BookTicket {
                user_id: alice.id,
                schedule_id: schedule.id,
                seats: testing::numbers(&["A1", "A2"]),
            })
            .await
            .unwrap();
        drop(
            svc.execute(BookTicket {
                user_id: bob.id,
                schedule_id: schedule.id,
                seats: testing::numbers(&["A3"]),
            })
            .await
            .unwrap(),
        );
        assert!(svc
            .execute(CancelBooking {
                booking_id: first.booking.id,
            })
            .await
            .unwrap());

        let bookings = svc.execute(ByUser::by(alice.id)).await.unwrap();

        assert_eq!(bookings.len(), 1);
        assert_eq!(bookings[0].booking.id, first.booking.id);
        assert_eq!(bookings[0].booking.status, booking::Status::Cancelled);
        assert!(bookings[0].seats.is_empty());
    }
}
