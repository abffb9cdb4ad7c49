//! [`Payment`] and [`Notification`]-related [`Database`] implementations.

use common::{
    operations::{By, Insert, Select},
    Money,
};
use tracerr::Traced;

use crate::{
    domain::{booking, user, Notification, Payment},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C> Database<Select<By<Option<Payment>, booking::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<Payment>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Payment>, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let booking_id = by.into_inner();

        const SQL: &str = "\
            SELECT id, booking_id, amount, amount_currency, \
                   status, created_at \
            FROM payments \
            WHERE booking_id = $1::UUID";
        Ok(self
            .query_opt(SQL, &[&booking_id])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| Payment {
                id: row.get("id"),
                booking_id: row.get("booking_id"),
                amount: Money {
                    amount: row.get("amount"),
                    currency: row.get("amount_currency"),
                },
                status: row.get("status"),
                created_at: row.get("created_at"),
            }))
    }
}

impl<C> Database<Insert<Payment>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(payment): Insert<Payment>,
    ) -> Result<Self::Ok, Self::Err> {
        let Payment {
            id,
            booking_id,
            amount,
            status,
            created_at,
        } = payment;

        const SQL: &str = "\
            INSERT INTO payments (\
                id, booking_id, amount, amount_currency, status, created_at\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, $3::NUMERIC, $4::INT2, \
                $5::INT2, $6::TIMESTAMPTZ\
            )";
        self.exec(
            SQL,
            &[
                &id,
                &booking_id,
                &amount.amount,
                &amount.currency,
                &status,
                &created_at,
            ],
        )
        .await
        .map_err(tracerr::wrap!())
        .map(drop)
    }
}

impl<C> Database<Insert<Notification>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(notification): Insert<Notification>,
    ) -> Result<Self::Ok, Self::Err> {
        let Notification {
            id,
            user_id,
            message,
            kind,
            created_at,
        } = notification;

        const SQL: &str = "\
            INSERT INTO notifications (\
                id, user_id, message, kind, created_at\
            ) \
            VALUES (\
                $1::UUID, $2::UUID, $3::VARCHAR, $4::INT2, $5::TIMESTAMPTZ\
            )";
        self.exec(SQL, &[&id, &user_id, &message, &kind, &created_at])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C> Database<Select<By<Vec<Notification>, user::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = Vec<Notification>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Notification>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let user_id = by.into_inner();

        const SQL: &str = "\
            SELECT id, user_id, message, kind, created_at \
            FROM notifications \
            WHERE user_id = $1::UUID \
            ORDER BY created_at DESC, id ASC";
        Ok(self
            .query(SQL, &[&user_id])
            .await
            .map_err(tracerr::wrap!())?
            .into_iter()
            .map(|row| Notification {
                id: row.get("id"),
                user_id: row.get("user_id"),
                message: row.get("message"),
                kind: row.get("kind"),
                created_at: row.get("created_at"),
            })
            .collect())
    }
}
