//! [`Query`] collection related to multiple [`Seat`]s.

use common::operations::{By, Select};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::Bus;
use crate::{
    domain::{bus, schedule, seat, Schedule, Seat},
    infra::{database, Database},
    Service,
};

use super::Query;

/// Queries [`seat::Number`]s of the available [`Seat`]s of a [`Schedule`]'s
/// [`Bus`], in ascending order.
#[derive(Clone, Copy, Debug)]
pub struct Available {
    /// ID of the [`Schedule`].
    pub schedule_id: schedule::Id,
}

impl<Db> Query<Available> for Service<Db>
where
    Db: Database<
            Select<By<Option<Schedule>, schedule::Id>>,
            Ok = Option<Schedule>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<Seat>, bus::Id>>,
            Ok = Vec<Seat>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Vec<seat::Number>;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, query: Available) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let Available { schedule_id } = query;

        let schedule = self
            .database()
            .execute(Select(By::<Option<Schedule>, _>::new(schedule_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::ScheduleNotExists(schedule_id))
            .map_err(tracerr::wrap!())?;

        Ok(self
            .database()
            .execute(Select(By::<Vec<Seat>, _>::new(schedule.bus_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .into_iter()
            .filter(Seat::is_available)
            .map(|s| s.number)
            .collect())
    }
}

/// Error of [`Available`] [`Query`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Schedule`] with the provided ID does not exist.
    #[display("`Schedule(id: {_0})` does not exist")]
    ScheduleNotExists(#[error(not(source))] schedule::Id),
}

#[cfg(test)]
mod spec {
    use crate::{
        command::{BookTicket, CancelBooking},
        domain::{schedule, user::Role},
        testing, Command as _, Query as _,
    };

    use super::{Available, ExecutionError};

    #[tokio::test]
    async fn follows_bookings_and_cancellations() {
        let svc = testing::service();
        let user = testing::user(&svc, Role::Passenger);
        let bus = testing::bus(&svc, &["A2", "A1", "A3"]);
        let schedule = testing::schedule(&svc, &bus, "500");
        let available = Available {
            schedule_id: schedule.id,
        };

        assert_eq!(
            svc.execute(available).await.unwrap(),
            testing::numbers(&["A1", "A2", "A3"]),
        );

        let out = svc
            .execute(BookTicket {
                user_id: user.id,
                schedule_id: schedule.id,
                seats: testing::numbers(&["A1", "A3"]),
            })
            .await
            .unwrap();
        assert_eq!(
            svc.execute(available).await.unwrap(),
            testing::numbers(&["A2"]),
        );

        assert!(svc
            .execute(CancelBooking {
                booking_id: out.booking.id,
            })
            .await
            .unwrap());
        assert_eq!(
            svc.execute(available).await.unwrap(),
            testing::numbers(&["A1", "A2", "A3"]),
        );
    }

    #[tokio::test]
    async fn requires_existing_schedule() {
        let svc = testing::service();

        let err = svc
            .execute(Available {
                schedule_id: schedule::Id::new(),
            })
            .await
            .unwrap_err();

        assert!(
            matches!(err.as_ref(), ExecutionError::ScheduleNotExists(_)),
            "{err}",
        );
    }
}
