//! [`Seat`]-related [`Database`] implementations.

use common::operations::{By, Insert, Lock, Select, Update};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{booking, bus, seat, Seat},
    infra::{
        database::{self, postgres, postgres::Connection, Postgres},
        Database,
    },
};

/// Maps `seats` rows onto [`Seat`]s.
fn from_rows(rows: &[Row]) -> Result<Vec<Seat>, Traced<database::Error>> {
    rows.iter()
        .map(|row| {
            let occupancy = seat::Occupancy::from_parts(
                row.get("is_available"),
                row.get("booking_id"),
            )
            .ok_or_else(|| postgres::Error::CorruptedRow("seats"))
            .map_err(tracerr::from_and_wrap!(=> database::Error))?;
            Ok(Seat {
                id: row.get("id"),
                bus_id: row.get("bus_id"),
                number: row.get("number"),
                occupancy,
            })
        })
        .collect()
}

impl<C> Database<Select<By<Vec<Seat>, bus::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Seat>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Seat>, bus::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let bus_id = by.into_inner();

        const SQL: &str = "\
            SELECT id, bus_id, number, is_available, booking_id \
            FROM seats \
            WHERE bus_id = $1::UUID \
            ORDER BY number ASC";
        let rows = self
            .query(SQL, &[&bus_id])
            .await
            .map_err(tracerr::wrap!())?;
        from_rows(&rows).map_err(tracerr::wrap!())
    }
}

impl<C> Database<Select<By<Vec<Seat>, booking::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Seat>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Seat>, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let booking_id = by.into_inner();

        const SQL: &str = "\
            SELECT id, bus_id, number, is_available, booking_id \
            FROM seats \
            WHERE booking_id = $1::UUID \
            ORDER BY number ASC";
        let rows = self
            .query(SQL, &[&booking_id])
            .await
            .map_err(tracerr::wrap!())?;
        from_rows(&rows).map_err(tracerr::wrap!())
    }
}

impl<C> Database<Lock<By<Vec<Seat>, (bus::Id, seat::Selection)>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Vec<Seat>, (bus::Id, seat::Selection)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (bus_id, selection) = by.into_inner();
        let numbers = selection.numbers();

        // Rows are locked in `number` order, so that concurrent transactions
        // locking overlapping seats never deadlock.
        const SQL: &str = "\
            SELECT id \
            FROM seats \
            WHERE bus_id = $1::UUID \
                  AND number = ANY($2::VARCHAR[]) \
            ORDER BY number ASC \
            FOR UPDATE";
        self.query(SQL, &[&bus_id, &numbers])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Insert<Vec<Seat>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(seats): Insert<Vec<Seat>>,
    ) -> Result<Self::Ok, Self::Err> {
        if seats.is_empty() {
            return Ok(());
        }
        let (ids, bus_ids, numbers, is_available, booking_ids) =
            columns(&seats);

        const SQL: &str = "\
            INSERT INTO seats (\
                id, bus_id, number, is_available, booking_id\
            ) \
            SELECT * FROM unnest(\
                $1::UUID[], $2::UUID[], $3::VARCHAR[], $4::BOOL[], \
                $5::UUID[]\
            )";
        self.exec(
            SQL,
            &[&ids, &bus_ids, &numbers, &is_available, &booking_ids],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Update<Vec<Seat>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(seats): Update<Vec<Seat>>,
    ) -> Result<Self::Ok, Self::Err> {
        if seats.is_empty() {
            return Ok(());
        }
        let (ids, _, _, is_available, booking_ids) = columns(&seats);

        const SQL: &str = "\
            UPDATE seats AS s \
            SET is_available = u.is_available, \
                booking_id = u.booking_id \
            FROM unnest($1::UUID[], $2::BOOL[], $3::UUID[]) \
                 AS u(id, is_available, booking_id) \
            WHERE s.id = u.id";
        self.exec(SQL, &[&ids, &is_available, &booking_ids])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

/// Column-wise representation of [`Seat`]s for `unnest()`.
type Columns<'s> = (
    Vec<seat::Id>,
    Vec<bus::Id>,
    Vec<&'s seat::Number>,
    Vec<bool>,
    Vec<Option<booking::Id>>,
);

/// Splits the provided [`Seat`]s into [`Columns`].
fn columns(seats: &[Seat]) -> Columns<'_> {
    let mut cols: Columns<'_> = (
        Vec::with_capacity(seats.len()),
        Vec::with_capacity(seats.len()),
        Vec::with_capacity(seats.len()),
        Vec::with_capacity(seats.len()),
        Vec::with_capacity(seats.len()),
    );
    for s in seats {
        cols.0.push(s.id);
        cols.1.push(s.bus_id);
        cols.2.push(&s.number);
        cols.3.push(s.is_available());
        cols.4.push(s.occupancy.booking_id());
    }
    cols
}
