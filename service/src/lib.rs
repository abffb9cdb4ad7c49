//! Service contains the business logic of the application.
//!
//! List of available Cargo features:
#![doc = document_features::document_features!()]
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod domain;
pub mod infra;
pub mod query;
pub mod read;
pub mod task;

use std::{error::Error, time::Duration};

use common::operations::{By, Start};
use derive_more::Debug;

#[cfg(doc)]
use infra::Database;

pub use self::{command::Command, query::Query, task::Task};

/// [`Service`] configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// [JWT] encoding key.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[debug(skip)]
    pub jwt_encoding_key: jsonwebtoken::EncodingKey,

    /// [JWT] decoding key.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[debug(skip)]
    pub jwt_decoding_key: jsonwebtoken::DecodingKey,

    /// Lifetime of an issued access token.
    pub access_token_ttl: Duration,

    /// Lifetime of an issued refresh token.
    pub refresh_token_ttl: Duration,

    /// [`task::CleanExpiredSessions`] configuration.
    pub clean_expired_sessions: task::clean_expired_sessions::Config,
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<Db> {
    /// Configuration of this [`Service`].
    config: Config,

    /// [`Database`] of this [`Service`].
    database: Db,
}

impl<Db> Service<Db> {
    /// Creates a new [`Service`] with the provided parameters.
    pub fn new(config: Config, database: Db) -> (Self, task::Background)
    where
        Self: Task<
                Start<
                    By<
                        task::CleanExpiredSessions<Self>,
                        task::clean_expired_sessions::Config,
                    >,
                >,
                Ok = (),
                Err: Error,
            > + Clone
            + 'static,
    {
        let this = Service { config, database };

        let mut bg = task::Background::default();
        let svc = this.clone();
        bg.spawn("CleanExpiredSessions", async move {
            svc.execute(Start(By::new(svc.config().clean_expired_sessions)))
                .await
        });

        (this, bg)
    }

    /// Returns [`Config`] of this [`Service`].
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns [`Database`] of this [`Service`].
    #[must_use]
    pub fn database(&self) -> &Db {
        &self.database
    }
}

#[cfg(test)]
mod testing {
    //! Fixtures shared by the tests of this crate.

    use std::time::Duration;

    use common::{Date, DateTime, Money};
    use rust_decimal::Decimal;

    use crate::{
        domain::{
            bus, route, schedule, seat, user, Bus, Route, Schedule, Seat, User,
        },
        infra::Memory,
        task, Config, Service,
    };

    /// Secret the [`Service`] signs its tokens with.
    const SECRET: &[u8] = b"secret";

    /// Creates a new [`Service`] over an empty [`Memory`] database.
    pub(crate) fn service() -> Service<Memory> {
        Service {
            config: Config {
                jwt_encoding_key: jsonwebtoken::EncodingKey::from_secret(
                    SECRET,
                ),
                jwt_decoding_key: jsonwebtoken::DecodingKey::from_secret(
                    SECRET,
                ),
                access_token_ttl: Duration::from_secs(15 * 60),
                refresh_token_ttl: Duration::from_secs(24 * 60 * 60),
                clean_expired_sessions: task::clean_expired_sessions::Config {
                    interval: Duration::from_secs(60),
                },
            },
            database: Memory::new(),
        }
    }

    /// Stores a new active [`User`] with the provided [`user::Role`].
    pub(crate) fn user(svc: &Service<Memory>, role: user::Role) -> User {
        let password = user::Password::new("qwerty123").unwrap();
        let user = User {
            id: user::Id::new(),
            name: user::Name::new("Jane Doe").unwrap(),
            email: user::Email::new(format!("{}@example.com", user::Id::new()))
                .unwrap(),
            password_hash: user::PasswordHash::new(&password),
            phone: None,
            address: None,
            role,
            created_at: DateTime::now().coerce(),
            deleted_at: None,
        };
        _ = svc
            .database()
            .modify(|s| s.users.insert(user.id, user.clone()));
        user
    }

    /// Stores a new [`Bus`] with the provided vacant [`Seat`]s.
    pub(crate) fn bus(svc: &Service<Memory>, seats: &[&str]) -> Bus {
        let bus = Bus {
            id: bus::Id::new(),
            number: bus::Number::new("KA-01-1234").unwrap(),
            name: None,
            total_seats: bus::Capacity::new(40).unwrap(),
            created_at: DateTime::now().coerce(),
        };
        svc.database().modify(|s| {
            _ = s.buses.insert(bus.id, bus.clone());
            for n in seats {
                let seat = Seat::new(bus.id, seat::Number::new(*n).unwrap());
                _ = s.seats.insert(seat.id, seat);
            }
        });
        bus
    }

    /// Stores a new [`Schedule`] of the provided [`Bus`] with the provided
    /// `fare` in rupees.
    pub(crate) fn schedule(
        svc: &Service<Memory>,
        bus: &Bus,
        fare: &str,
    ) -> Schedule {
        let route = Route {
            id: route::Id::new(),
            origin: route::Place::new("Bengaluru").unwrap(),
            destination: route::Place::new("Mysuru").unwrap(),
        };
        let departure_at = DateTime::now();
        let schedule = Schedule {
            id: schedule::Id::new(),
            bus_id: bus.id,
            route_id: route.id,
            departure_at: departure_at.coerce(),
            arrival_at: (departure_at + Duration::from_secs(3 * 60 * 60))
                .coerce(),
            fare: Money {
                amount: fare.parse::<Decimal>().unwrap(),
                currency: common::money::Currency::Inr,
            },
            date: Date::from(departure_at),
        };
        svc.database().modify(|s| {
            _ = s.routes.insert(route.id, route);
            _ = s.schedules.insert(schedule.id, schedule.clone());
        });
        schedule
    }

    /// Parses the provided [`seat::Number`]s.
    pub(crate) fn numbers(numbers: &[&str]) -> Vec<seat::Number> {
        numbers.iter().map(|n| seat::Number::new(*n).unwrap()).collect()
    }
}
