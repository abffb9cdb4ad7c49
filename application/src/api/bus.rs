//! [`Bus`]-related definitions.

use common::DateTime;
use derive_more::{AsRef, Display, From, Into};
use futures::{future, TryFutureExt as _};
use juniper::{graphql_object, GraphQLScalar};
use service::{domain, query, Query as _};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{
    api::{self, scalar},
    AsError, Context, Error,
};

/// A bus serving schedules.
#[derive(Clone, Debug)]
pub struct Bus {
    /// ID of this [`Bus`].
    id: Id,

    /// Underlying [`domain::Bus`].
    bus: OnceCell<domain::Bus>,
}

impl From<domain::Bus> for Bus {
    fn from(bus: domain::Bus) -> Self {
        Self {
            id: bus.id.into(),
            bus: OnceCell::new_with(Some(bus)),
        }
    }
}

impl Bus {
    /// Creates a new [`Bus`] with the provided ID.
    ///
    /// # Safety
    ///
    /// Caller must ensure that [`Bus`] with the provided ID exists,
    /// otherwise accessing this [`Bus`] will result with an error.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            bus: OnceCell::new(),
        }
    }

    /// Returns the [`domain::Bus`] representing this [`Bus`].
    async fn bus(&self, ctx: &Context) -> Result<&domain::Bus, Error> {
        let id = self.id.into();
        self.bus
            .get_or_try_init(|| {
                ctx.service()
                    .execute(query::bus::ById::by(id))
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
                    .and_then(|b| {
                        future::ready(b.ok_or_else(|| {
                            api::query::BusError::NotExists.into()
                        }))
                    })
            })
            .await
    }
}

/// A bus serving schedules.
#[graphql_object(context = Context)]
impl Bus {
    /// Unique identifier of this `Bus`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Bus.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Registration number of this `Bus`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Bus.number",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn number(&self, ctx: &Context) -> Result<Number, Error> {
        Ok(self.bus(ctx).await?.number.clone().into())
    }

    /// Human-readable name of this `Bus`, if any.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Bus.name",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn name(&self, ctx: &Context) -> Result<Option<String>, Error> {
        Ok(self.bus(ctx).await?.name.as_ref().map(ToString::to_string))
    }

    /// Maximum number of seats this `Bus` may carry.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Bus.totalSeats",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn total_seats(&self, ctx: &Context) -> Result<i32, Error> {
        Ok(u16::from(self.bus(ctx).await?.total_seats).into())
    }

    /// `DateTime` when this `Bus` was registered.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Bus.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn created_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.bus(ctx).await?.created_at.coerce())
    }
}

/// Unique identifier of a `Bus`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::bus::Id)]
#[into(domain::bus::Id)]
#[graphql(name = "BusId", transparent)]
pub struct Id(Uuid);

/// Registration number of a `Bus`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "BusNumber",
    with = scalar::Via::<domain::bus::Number>,
)]
pub struct Number(domain::bus::Number);
