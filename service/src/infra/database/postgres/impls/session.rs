//! [`session::Refresh`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert};
use tracerr::Traced;

use crate::{
    domain::user::{self, session},
    infra::{
        database::{self, postgres::Connection, Postgres},
        Database,
    },
};

impl<C> Database<Insert<session::Refresh>> for Postgres<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(refresh): Insert<session::Refresh>,
    ) -> Result<Self::Ok, Self::Err> {
        let session::Refresh {
            digest,
            user_id,
            expires_at,
        } = refresh;

        const SQL: &str = "\
            INSERT INTO refresh_tokens (digest, user_id, expires_at) \
            VALUES ($1::VARCHAR, $2::UUID, $3::TIMESTAMPTZ)";
        self.exec(SQL, &[&digest, &user_id, &expires_at])
            .await
            .map_err(tracerr::wrap!())
            .map(drop)
    }
}

impl<C>
    Database<
        Delete<By<Option<session::Refresh>, session::RefreshDigest>>,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = Option<session::Refresh>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<
            By<Option<session::Refresh>, session::RefreshDigest>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let digest = by.into_inner();

        // Single statement, so a token is consumed at most once.
        const SQL: &str = "\
            DELETE FROM refresh_tokens \
            WHERE digest = $1::VARCHAR \
            RETURNING digest, user_id, expires_at";
        Ok(self
            .query_opt(SQL, &[&digest])
            .await
            .map_err(tracerr::wrap!())?
            .map(|row| session::Refresh {
                digest: row.get("digest"),
                user_id: row.get("user_id"),
                expires_at: row.get("expires_at"),
            }))
    }
}

impl<C>
    Database<
        Delete<By<session::Refresh, session::RefreshExpirationDateTime>>,
    > for Postgres<C>
where
    C: Connection,
{
    type Ok = u64;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<
            By<session::Refresh, session::RefreshExpirationDateTime>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let now = by.into_inner();

        const SQL: &str = "\
            DELETE FROM refresh_tokens \
            WHERE expires_at <= $1::TIMESTAMPTZ";
        self.exec(SQL, &[&now]).await.map_err(tracerr::wrap!())
    }
}

impl<C> Database<Delete<By<session::Refresh, user::Id>>> for Postgres<C>
where
    C: Connection,
{
    type Ok = u64;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<session::Refresh, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let user_id = by.into_inner();

        const SQL: &str = "\
            DELETE FROM refresh_tokens \
            WHERE user_id = $1::UUID";
        self.exec(SQL, &[&user_id]).await.map_err(tracerr::wrap!())
    }
}
