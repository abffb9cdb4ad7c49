//! [`Booking`]-related [`Database`] implementations.

use common::{
    operations::{By, Insert, Lock, Select, Update},
    Money,
};
use tokio_postgres::Row;
use tracerr::Traced;

use crate::{
    domain::{booking, seat, user, Booking},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
    read,
};

/// Maps a `bookings` row onto a [`Booking`].
fn from_row(row: &Row) -> Booking {
    Booking {
        id: row.get("id"),
        user_id: row.get("user_id"),
        schedule_id: row.get("schedule_id"),
        total_fare: Money {
            amount: row.get("total_fare"),
            currency: row.get("total_fare_currency"),
        },
        status: row.get("status"),
        created_at: row.get("created_at"),
    }
}

impl<C> Database<Select<By<Option<Booking>, booking::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Booking>, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        const SQL: &str = "\
            SELECT id, user_id, schedule_id, \
                   total_fare, total_fare_currency, \
                   status, created_at \
            FROM bookings \
            WHERE id = $1::UUID";
        Ok(self
            .query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())?
            .as_ref()
            .map(from_row))
    }
}

impl<C> Database<Select<By<Vec<read::booking::Details>, user::Id>>>
    for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<read::booking::Details>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<read::booking::Details>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let user_id = by.into_inner();

        const SQL: &str = "\
            SELECT b.id, b.user_id, b.schedule_id, \
                   b.total_fare, b.total_fare_currency, \
                   b.status, b.created_at, \
                   COALESCE(\
                       array_agg(s.number ORDER BY s.number) \
                           FILTER (WHERE s.number IS NOT NULL), \
                       '{}'\
                   ) AS seats \
            FROM bookings AS b \
            LEFT JOIN seats AS s ON s.booking_id = b.id \
            WHERE b.user_id = $1::UUID \
            GROUP BY b.id \
            ORDER BY b.created_at DESC, b.id ASC";
        Ok(self
            .query(SQL, &[&user_id])
            .await
            .map_err(tracerr::wrap!())?
            .iter()
            .map(|row| read::booking::Details {
                booking: from_row(row),
                seats: row.get::<_, Vec<seat::Number>>("seats"),
            })
            .collect())
    }
}

impl<C> Database<Lock<By<Booking, booking::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Booking, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();

        const SQL: &str = "\
            SELECT id \
            FROM bookings \
            WHERE id = $1::UUID \
            FOR UPDATE";
        self.query_opt(SQL, &[&id])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Insert<Booking>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(booking): Insert<Booking>,
    ) -> Result<Self::Ok, Self::Err> {
        let Booking {
            id,
            user_id,
            schedule_id,
            total_fare,
            status,
            created_at,
        } = booking;

        const SQL: &str = "\
            INSERT INTO bookings (\
                id, user_id, schedule_id, \
                total_fare, total_fare_currency, \
                status, created_at\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, $3::UUID, \
                $4::NUMERIC, $5::INT2, \
                $6::INT2, $7::TIMESTAMPTZ\
            )";
        self.exec(
            SQL,
            &[
                &id,
                &user_id,
                &schedule_id,
                &total_fare.amount,
                &total_fare.currency,
                &status,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Update<Booking>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(booking): Update<Booking>,
    ) -> Result<Self::Ok, Self::Err> {
        // Only the status of a `Booking` ever changes.
        const SQL: &str = "\
            UPDATE bookings \
            SET status = $2::INT2 \
            WHERE id = $1::UUID";
        self.exec(SQL, &[&booking.id, &booking.status])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}
