//! [`Query`] collection related to multiple [`Schedule`]s.

use common::operations::By;

use crate::{domain::Schedule, read::schedule::Search as Criteria};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries all the [`Schedule`]s matching the [`Criteria`], ordered by their
/// departure.
pub type Search = DatabaseQuery<By<Vec<Schedule>, Criteria>>;

#[cfg(test)]
mod spec {
    use common::Date;

    use crate::{domain::route, read, testing, Query as _};

    use super::Search;

    #[tokio::test]
    async fn finds_schedules_by_route_and_date() {
        let svc = testing::service();
        let bus = testing::bus(&svc, &["A1"]);
        let schedule = testing::schedule(&svc, &bus, "500");

        let search = |origin: &str, destination: &str, date: Date| {
            Search::by(read::schedule::Search {
                origin: route::Place::new(origin).unwrap(),
                destination: route::Place::new(destination).unwrap(),
                date,
            })
        };

        let found = svc
            .execute(search("Bengaluru", "Mysuru", schedule.date))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, schedule.id);

        let reversed = svc
            .execute(search("Mysuru", "Bengaluru", schedule.date))
            .await
            .unwrap();
        assert!(reversed.is_empty());

        let other_day = Date::from_calendar(schedule.date.year() - 1, 1, 1)
            .unwrap();
        let none = svc
            .execute(search("Bengaluru", "Mysuru", other_day))
            .await
            .unwrap();
        assert!(none.is_empty());
    }
}
