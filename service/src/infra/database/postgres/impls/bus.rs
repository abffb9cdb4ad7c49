//! [`Bus`], [`Route`] and [`Schedule`]-related [`Database`] implementations.

use common::{
    operations::{By, Lock, Select},
    Money,
};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{bus, route, schedule, Bus, Route, Schedule},
    infra::{
        database::{self, postgres, postgres::Connection, Postgres},
        Database,
    },
    read,
};

impl<C> Database<Select<By<Option<Bus>, bus::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Bus>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Bus>, bus::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        const SQL: &str = "\
            SELECT id, number, name, total_seats, created_at \
            FROM buses \
            WHERE id = $1::UUID";
        let Some(row) = self
            .query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
        else {
            return Ok(None);
        };

        let total_seats = u16::try_from(row.get::<_, i16>("total_seats"))
            .ok()
            .and_then(bus::Capacity::new)
            .ok_or_else(|| postgres::Error::CorruptedRow("buses"))
            .map_err(tracerr::from_and_wrap!(=> database::Error))?;
        Ok(Some(Bus {
            id: row.get("id"),
            number: row.get("number"),
            name: row.get("name"),
            total_seats,
            created_at: row.get("created_at"),
        }))
    }
}

impl<C> Database<Lock<By<Bus, bus::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Bus, bus::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM buses \
            WHERE id = $1::UUID \
            FOR UPDATE";
        self.query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Select<By<Option<Route>, route::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Route>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Route>, route::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        const SQL: &str = "\
            SELECT id, origin, destination \
            FROM routes \
            WHERE id = $1::UUID";
        Ok(self
            .query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| Route {
                id: row.get("id"),
                origin: row.get("origin"),
                destination: row.get("destination"),
            }))
    }
}

/// Maps a `schedules` row onto a [`Schedule`].
fn schedule_from_row(row: &Row) -> Schedule {
    Schedule {
        id: row.get("id"),
        bus_id: row.get("bus_id"),
        route_id: row.get("route_id"),
        departure_at: row.get("departure_at"),
        arrival_at: row.get("arrival_at"),
        fare: Money {
            amount: row.get("fare"),
            currency: row.get("fare_currency"),
        },
        date: row.get("date"),
    }
}

impl<C> Database<Select<By<Option<Schedule>, schedule::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Schedule>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Schedule>, schedule::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        const SQL: &str = "\
            SELECT id, bus_id, route_id, departure_at, arrival_at, \
                   fare, fare_currency, date \
            FROM schedules \
            WHERE id = $1::UUID";
        Ok(self
            .query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(schedule_from_row))
    }
}

impl<C> Database<Select<By<Vec<Schedule>, read::schedule::Search>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Schedule>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Schedule>, read::schedule::Search>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::schedule::Search {
            origin,
            destination,
            date,
        } = by.into_inner();

        const SQL: &str = "\
            SELECT s.id, s.bus_id, s.route_id, s.departure_at, s.arrival_at, \
                   s.fare, s.fare_currency, s.date \
            FROM schedules AS s \
            INNER JOIN routes AS r ON r.id = s.route_id \
            WHERE r.origin = $1::VARCHAR \
                  AND r.destination = $2::VARCHAR \
                  AND s.date = $3::DATE \
            ORDER BY s.departure_at ASC, s.id ASC";
        Ok(self
            .query(SQL, &[&origin, &destination, &date])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(schedule_from_row)
            .collect())
    }
}
