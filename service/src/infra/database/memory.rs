//! In-memory [`Database`] implementation.
//!
//! Mimics the transactional behavior the domain relies on:
//! - writes of a transaction are checked against unique constraints, then
//!   buffered and applied atomically on [`Commit`];
//! - [`Lock`]ed and updated rows stay locked until the transaction is
//!   committed or dropped;
//! - reads see the latest committed state plus the own pending writes.
//!
//! Every operation yields to the scheduler first, so concurrently polled
//! operations interleave.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use common::operations::{
    By, Commit, Delete, Insert, Lock, Select, Transact, Update,
};
use derive_more::{Display, Error as StdError};
use tokio::{sync, task};
use tracerr::Traced;

use crate::{
    domain::{
        booking, bus, route, schedule, seat, user, user::session, Booking, Bus,
        Notification, Payment, Route, Schedule, Seat, User,
    },
    infra::{
        database::{self, constraint},
        Database,
    },
    read,
};

/// In-memory [`Database`].
///
/// Clones share the same data. A [`Transact`]ed clone additionally owns an
/// open transaction.
#[derive(Clone, Debug, Default)]
pub struct Memory {
    /// Shared data and row locks.
    store: Arc<Store>,

    /// Open transaction, if any.
    tx: Option<Arc<Tx>>,
}

/// Committed data of a [`Memory`] database.
#[derive(Clone, Debug, Default)]
pub struct State {
    /// Stored [`User`]s, including deleted ones.
    pub users: HashMap<user::Id, User>,

    /// Issued [`session::Refresh`]es.
    pub refreshes: HashMap<session::RefreshDigest, session::Refresh>,

    /// Stored [`Bus`]es.
    pub buses: HashMap<bus::Id, Bus>,

    /// Stored [`Route`]s.
    pub routes: HashMap<route::Id, Route>,

    /// Stored [`Schedule`]s.
    pub schedules: HashMap<schedule::Id, Schedule>,

    /// Stored [`Seat`]s.
    pub seats: HashMap<seat::Id, Seat>,

    /// Stored [`Booking`]s.
    pub bookings: HashMap<booking::Id, Booking>,

    /// Stored [`Payment`]s.
    pub payments: HashMap<booking::Id, Payment>,

    /// Stored [`Notification`]s, in insertion order.
    pub notifications: Vec<Notification>,
}

impl State {
    /// Returns the available [`seat::Number`]s of the provided [`Bus`], in
    /// ascending order.
    #[must_use]
    pub fn available_seats(&self, bus_id: bus::Id) -> Vec<seat::Number> {
        let mut numbers = self
            .seats
            .values()
            .filter(|s| s.bus_id == bus_id && s.is_available())
            .map(|s| s.number.clone())
            .collect::<Vec<_>>();
        numbers.sort();
        numbers
    }
}

/// [`Memory`] database error.
#[derive(Clone, Copy, Debug, Display, StdError)]
pub enum Error {
    /// Unique constraint is violated.
    #[display("Unique constraint `{_0}` is violated")]
    UniqueViolation(#[error(not(source))] &'static str),
}

impl Error {
    /// Checks if the error is a unique violation of the specified constraint.
    #[must_use]
    pub fn is_unique_violation(&self, constraint: Option<&str>) -> bool {
        match self {
            Self::UniqueViolation(c) => constraint.map_or(true, |n| n == *c),
        }
    }
}

impl Memory {
    /// Creates a new empty [`Memory`] database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Modifies the committed [`State`] directly, bypassing any locks.
    pub fn modify<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        f(&mut guard(&self.store.state))
    }

    /// Inspects the committed [`State`].
    pub fn inspect<R>(&self, f: impl FnOnce(&State) -> R) -> R {
        f(&guard(&self.store.state))
    }

    /// Reads the [`State`] visible to this [`Memory`] client.
    fn read<R>(&self, f: impl FnOnce(&State) -> R) -> R {
        let committed = guard(&self.store.state);
        let Some(tx) = &self.tx else {
            return f(&committed);
        };
        let pending = guard(&tx.pending);
        if pending.is_empty() {
            return f(&committed);
        }
        let mut view = committed.clone();
        drop(committed);
        for w in pending.iter() {
            // Conflicts are reported on commit.
            _ = w.clone().apply(&mut view);
        }
        f(&view)
    }

    /// Locks the rows identified by the provided [`Key`]s until the end of the
    /// transaction.
    ///
    /// Does nothing outside a transaction.
    async fn lock(&self, keys: impl IntoIterator<Item = Key>) {
        let Some(tx) = &self.tx else {
            return;
        };
        for key in keys {
            if guard(&tx.held).contains_key(&key) {
                continue;
            }
            let row = self.row(&key);
            let locked = row.lock_owned().await;
            _ = guard(&tx.held).insert(key, locked);
        }
    }

    /// Returns the lock of the row identified by the provided [`Key`].
    fn row(&self, key: &Key) -> Arc<sync::Mutex<()>> {
        Arc::clone(guard(&self.store.locks).entry(key.clone()).or_default())
    }

    /// Performs the provided [`Write`].
    ///
    /// Inside a transaction it is buffered until [`Commit`], otherwise it is
    /// applied right away.
    async fn write(&self, w: Write) -> Result<(), Traced<database::Error>> {
        let keys = w.keys();
        if let Some(tx) = &self.tx {
            self.lock(keys).await;
            // Constraints are checked right away, and once more on commit.
            self.read(|view| w.clone().apply(&mut view.clone()))
                .map_err(tracerr::from_and_wrap!(=> database::Error))?;
            guard(&tx.pending).push(w);
            return Ok(());
        }

        // Wait for transactions holding the rows, like an `UPDATE` does.
        let mut held = Vec::with_capacity(keys.len());
        for key in &keys {
            held.push(self.row(key).lock_owned().await);
        }
        let res = w.apply(&mut guard(&self.store.state));
        drop(held);
        res.map_err(tracerr::from_and_wrap!(=> database::Error))
    }
}

/// Locks the provided [`Mutex`] ignoring its poisoning.
fn guard<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Data shared by all the [`Memory`] clones.
#[derive(Debug, Default)]
struct Store {
    /// Committed [`State`].
    state: Mutex<State>,

    /// Row locks.
    locks: Mutex<HashMap<Key, Arc<sync::Mutex<()>>>>,
}

/// Open transaction of a [`Memory`] client.
#[derive(Debug, Default)]
struct Tx {
    /// Buffered [`Write`]s.
    pending: Mutex<Vec<Write>>,

    /// Row locks held until the end of this transaction.
    held: Mutex<HashMap<Key, sync::OwnedMutexGuard<()>>>,
}

/// Identifier of a lockable row.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
enum Key {
    /// `users` row.
    User(user::Id),

    /// `buses` row.
    Bus(bus::Id),

    /// `seats` row.
    Seat(bus::Id, seat::Number),

    /// `bookings` row.
    Booking(booking::Id),

    /// `refresh_tokens` row.
    Refresh(session::RefreshDigest),
}

/// Single write operation.
#[derive(Clone, Debug)]
enum Write {
    /// Insertion of a [`User`].
    InsertUser(User),

    /// Update of an existing [`User`].
    UpdateUser(User),

    /// Insertion of a [`session::Refresh`].
    InsertRefresh(session::Refresh),

    /// Removal of a [`session::Refresh`].
    DeleteRefresh(session::RefreshDigest),

    /// Removal of all the [`session::Refresh`]es expired at the moment.
    DeleteExpiredRefreshes(session::RefreshExpirationDateTime),

    /// Removal of all the [`session::Refresh`]es issued to a [`User`].
    DeleteUserRefreshes(user::Id),

    /// Insertion of new [`Seat`]s.
    InsertSeats(Vec<Seat>),

    /// Update of existing [`Seat`]s.
    UpdateSeats(Vec<Seat>),

    /// Insertion or update of a [`Booking`].
    UpsertBooking(Booking),

    /// Insertion of a [`Payment`].
    InsertPayment(Payment),

    /// Insertion of a [`Notification`].
    InsertNotification(Notification),
}

impl Write {
    /// Returns [`Key`]s of the existing rows this [`Write`] modifies.
    fn keys(&self) -> Vec<Key> {
        match self {
            Self::UpdateSeats(seats) => seats
                .iter()
                .map(|s| Key::Seat(s.bus_id, s.number.clone()))
                .collect(),
            Self::UpsertBooking(b) => vec![Key::Booking(b.id)],
            Self::UpdateUser(u) => vec![Key::User(u.id)],
            Self::DeleteRefresh(d) => vec![Key::Refresh(d.clone())],
            Self::InsertUser(_)
            | Self::InsertRefresh(_)
            | Self::DeleteExpiredRefreshes(_)
            | Self::DeleteUserRefreshes(_)
            | Self::InsertSeats(_)
            | Self::InsertPayment(_)
            | Self::InsertNotification(_) => vec![],
        }
    }

    /// Applies this [`Write`] to the provided [`State`].
    fn apply(self, state: &mut State) -> Result<(), Error> {
        match self {
            Self::InsertUser(u) => {
                if u.is_active()
                    && state.users.values().any(|e| {
                        e.id != u.id && e.is_active() && e.email == u.email
                    })
                {
                    return Err(Error::UniqueViolation(constraint::USER_EMAIL));
                }
                _ = state.users.insert(u.id, u);
            }
            Self::UpdateUser(u) => {
                if let Some(e) = state.users.get_mut(&u.id) {
                    *e = u;
                }
            }
            Self::InsertRefresh(r) => {
                if state.refreshes.contains_key(&r.digest) {
                    return Err(Error::UniqueViolation("refresh_tokens_pkey"));
                }
                _ = state.refreshes.insert(r.digest.clone(), r);
            }
            Self::DeleteRefresh(d) => {
                _ = state.refreshes.remove(&d);
            }
            Self::DeleteExpiredRefreshes(now) => {
                state.refreshes.retain(|_, r| !r.is_expired_at(now));
            }
            Self::DeleteUserRefreshes(id) => {
                state.refreshes.retain(|_, r| r.user_id != id);
            }
            Self::InsertSeats(seats) => {
                for s in seats {
                    if state
                        .seats
                        .values()
                        .any(|e| e.bus_id == s.bus_id && e.number == s.number)
                    {
                        return Err(Error::UniqueViolation(
                            constraint::SEAT_NUMBER,
                        ));
                    }
                    _ = state.seats.insert(s.id, s);
                }
            }
            Self::UpdateSeats(seats) => {
                for s in seats {
                    if let Some(e) = state.seats.get_mut(&s.id) {
                        e.occupancy = s.occupancy;
                    }
                }
            }
            Self::UpsertBooking(b) => {
                _ = state.bookings.insert(b.id, b);
            }
            Self::InsertPayment(p) => {
                if state.payments.contains_key(&p.booking_id) {
                    return Err(Error::UniqueViolation(
                        constraint::PAYMENT_BOOKING,
                    ));
                }
                _ = state.payments.insert(p.booking_id, p);
            }
            Self::InsertNotification(n) => state.notifications.push(n),
        }
        Ok(())
    }
}

impl Database<Transact> for Memory {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        task::yield_now().await;
        Ok(Self {
            store: Arc::clone(&self.store),
            tx: Some(self.tx.clone().unwrap_or_default()),
        })
    }
}

impl Database<Commit> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        task::yield_now().await;
        let Some(tx) = &self.tx else {
            return Ok(());
        };

        let pending = std::mem::take(&mut *guard(&tx.pending));
        let res = {
            let mut state = guard(&self.store.state);
            let mut next = state.clone();
            pending
                .into_iter()
                .try_for_each(|w| w.apply(&mut next))
                .map(|()| *state = next)
        };
        guard(&tx.held).clear();
        res.map_err(tracerr::from_and_wrap!(=> database::Error))
    }
}

impl Database<Select<By<Option<User>, user::Id>>> for Memory {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        task::yield_now().await;
        let id = by.into_inner();
        Ok(self.read(|s| s.users.get(&id).filter(|u| u.is_active()).cloned()))
    }
}

impl Database<Select<By<Option<User>, user::Email>>> for Memory {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Email>>,
    ) -> Result<Self::Ok, Self::Err> {
        task::yield_now().await;
        let email = by.into_inner();
        Ok(self.read(|s| {
            s.users
                .values()
                .find(|u| u.is_active() && u.email == email)
                .cloned()
        }))
    }
}

impl Database<Insert<User>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        task::yield_now().await;
        self.write(Write::InsertUser(user))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl Database<Lock<By<User, user::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<User, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        task::yield_now().await;
        self.lock([Key::User(by.into_inner())]).await;
        Ok(())
    }
}

impl Database<Update<User>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(user): Update<User>,
    ) -> Result<Self::Ok, Self::Err> {
        task::yield_now().await;
        self.write(Write::UpdateUser(user))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl Database<Insert<session::Refresh>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(refresh): Insert<session::Refresh>,
    ) -> Result<Self::Ok, Self::Err> {
        task::yield_now().await;
        self.write(Write::InsertRefresh(refresh))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl Database<Delete<By<Option<session::Refresh>, session::RefreshDigest>>>
    for Memory
{
    type Ok = Option<session::Refresh>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<
            By<Option<session::Refresh>, session::RefreshDigest>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        task::yield_now().await;
        let digest = by.into_inner();

        if self.tx.is_none() {
            return Ok(guard(&self.store.state).refreshes.remove(&digest));
        }
        self.lock([Key::Refresh(digest.clone())]).await;
        let found = self.read(|s| s.refreshes.get(&digest).cloned());
        self.write(Write::DeleteRefresh(digest))
            .await
            .map_err(tracerr::wrap!())?;
        Ok(found)
    }
}

impl Database<Delete<By<session::Refresh, session::RefreshExpirationDateTime>>>
    for Memory
{
    type Ok = u64;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<
            By<session::Refresh, session::RefreshExpirationDateTime>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        task::yield_now().await;
        let now = by.into_inner();

        let expired = self.read(|s| {
            s.refreshes.values().filter(|r| r.is_expired_at(now)).count()
        });
        self.write(Write::DeleteExpiredRefreshes(now))
            .await
            .map_err(tracerr::wrap!())?;
        Ok(u64::try_from(expired).unwrap_or(u64::MAX))
    }
}

impl Database<Delete<By<session::Refresh, user::Id>>> for Memory {
    type Ok = u64;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<session::Refresh, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        task::yield_now().await;
        let user_id = by.into_inner();

        let revoked = self.read(|s| {
            s.refreshes.values().filter(|r| r.user_id == user_id).count()
        });
        self.write(Write::DeleteUserRefreshes(user_id))
            .await
            .map_err(tracerr::wrap!())?;
        Ok(u64::try_from(revoked).unwrap_or(u64::MAX))
    }
}

impl Database<Select<By<Option<Bus>, bus::Id>>> for Memory {
    type Ok = Option<Bus>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Bus>, bus::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        task::yield_now().await;
        let id = by.into_inner();
        Ok(self.read(|s| s.buses.get(&id).cloned()))
    }
}

impl Database<Lock<By<Bus, bus::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Bus, bus::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        task::yield_now().await;
        self.lock([Key::Bus(by.into_inner())]).await;
        Ok(())
    }
}

impl Database<Select<By<Option<Route>, route::Id>>> for Memory {
    type Ok = Option<Route>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Route>, route::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        task::yield_now().await;
        let id = by.into_inner();
        Ok(self.read(|s| s.routes.get(&id).cloned()))
    }
}

impl Database<Select<By<Option<Schedule>, schedule::Id>>> for Memory {
    type Ok = Option<Schedule>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Schedule>, schedule::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        task::yield_now().await;
        let id = by.into_inner();
        Ok(self.read(|s| s.schedules.get(&id).cloned()))
    }
}

impl Database<Select<By<Vec<Schedule>, read::schedule::Search>>> for Memory {
    type Ok = Vec<Schedule>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Schedule>, read::schedule::Search>>,
    ) -> Result<Self::Ok, Self::Err> {
        task::yield_now().await;
        let search = by.into_inner();
        Ok(self.read(|s| {
            let mut found = s
                .schedules
                .values()
                .filter(|sch| {
                    sch.date == search.date
                        && s.routes.get(&sch.route_id).is_some_and(|r| {
                            r.origin == search.origin
                                && r.destination == search.destination
                        })
                })
                .cloned()
                .collect::<Vec<_>>();
            found.sort_by_key(|sch| sch.departure_at);
            found
        }))
    }
}

impl Database<Select<By<Vec<Seat>, bus::Id>>> for Memory {
    type Ok = Vec<Seat>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Seat>, bus::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        task::yield_now().await;
        let bus_id = by.into_inner();
        Ok(self.read(|s| {
            sorted(s.seats.values().filter(|seat| seat.bus_id == bus_id))
        }))
    }
}

impl Database<Select<By<Vec<Seat>, booking::Id>>> for Memory {
    type Ok = Vec<Seat>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Seat>, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        task::yield_now().await;
        let booking_id = by.into_inner();
        Ok(self.read(|s| {
            sorted(s.seats.values().filter(|seat| {
                seat.occupancy.booking_id() == Some(booking_id)
            }))
        }))
    }
}

/// Collects the provided [`Seat`]s in ascending [`seat::Number`] order.
fn sorted<'s>(seats: impl Iterator<Item = &'s Seat>) -> Vec<Seat> {
    let mut seats = seats.cloned().collect::<Vec<_>>();
    seats.sort_by(|a, b| a.number.cmp(&b.number));
    seats
}

impl Database<Lock<By<Vec<Seat>, (bus::Id, seat::Selection)>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Vec<Seat>, (bus::Id, seat::Selection)>>,
    ) -> Result<Self::Ok, Self::Err> {
        task::yield_now().await;
        let (bus_id, selection) = by.into_inner();
        self.lock(
            selection
                .numbers()
                .iter()
                .map(|n| Key::Seat(bus_id, n.clone())),
        )
        .await;
        Ok(())
    }
}

impl Database<Insert<Vec<Seat>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(seats): Insert<Vec<Seat>>,
    ) -> Result<Self::Ok, Self::Err> {
        task::yield_now().await;
        self.write(Write::InsertSeats(seats))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl Database<Update<Vec<Seat>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(seats): Update<Vec<Seat>>,
    ) -> Result<Self::Ok, Self::Err> {
        task::yield_now().await;
        self.write(Write::UpdateSeats(seats))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl Database<Select<By<Option<Booking>, booking::Id>>> for Memory {
    type Ok = Option<Booking>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Booking>, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        task::yield_now().await;
        let id = by.into_inner();
        Ok(self.read(|s| s.bookings.get(&id).cloned()))
    }
}

impl Database<Select<By<Vec<read::booking::Details>, user::Id>>> for Memory {
    type Ok = Vec<read::booking::Details>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<read::booking::Details>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        task::yield_now().await;
        let user_id = by.into_inner();
        Ok(self.read(|s| {
            let mut bookings = s
                .bookings
                .values()
                .filter(|b| b.user_id == user_id)
                .cloned()
                .collect::<Vec<_>>();
            bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            bookings
                .into_iter()
                .map(|booking| {
                    let seats = sorted(s.seats.values().filter(|seat| {
                        seat.occupancy.booking_id() == Some(booking.id)
                    }))
                    .into_iter()
                    .map(|seat| seat.number)
                    .collect();
                    read::booking::Details { booking, seats }
                })
                .collect()
        }))
    }
}

impl Database<Lock<By<Booking, booking::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Lock(by): Lock<By<Booking, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        task::yield_now().await;
        self.lock([Key::Booking(by.into_inner())]).await;
        Ok(())
    }
}

impl Database<Insert<Booking>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(booking): Insert<Booking>,
    ) -> Result<Self::Ok, Self::Err> {
        task::yield_now().await;
        self.write(Write::UpsertBooking(booking))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl Database<Update<Booking>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(booking): Update<Booking>,
    ) -> Result<Self::Ok, Self::Err> {
        task::yield_now().await;
        self.write(Write::UpsertBooking(booking))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl Database<Select<By<Option<Payment>, booking::Id>>> for Memory {
    type Ok = Option<Payment>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Payment>, booking::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        task::yield_now().await;
        let booking_id = by.into_inner();
        Ok(self.read(|s| s.payments.get(&booking_id).cloned()))
    }
}

impl Database<Insert<Payment>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(payment): Insert<Payment>,
    ) -> Result<Self::Ok, Self::Err> {
        task::yield_now().await;
        self.write(Write::InsertPayment(payment))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl Database<Insert<Notification>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(notification): Insert<Notification>,
    ) -> Result<Self::Ok, Self::Err> {
        task::yield_now().await;
        self.write(Write::InsertNotification(notification))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl Database<Select<By<Vec<Notification>, user::Id>>> for Memory {
    type Ok = Vec<Notification>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Notification>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        task::yield_now().await;
        let user_id = by.into_inner();
        Ok(self.read(|s| {
            let mut found = s
                .notifications
                .iter()
                .rev()
                .filter(|n| n.user_id == user_id)
                .cloned()
                .collect::<Vec<_>>();
            found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            found
        }))
    }
}
