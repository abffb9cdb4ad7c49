//! GraphQL [`Mutation`]s definitions.

use common::Money;
use juniper::graphql_object;
use service::{command, domain, query, read, Command as _, Query as _};

use crate::{api, context::AuthError, define_error, AsError, Context, Error};

/// Root of all GraphQL mutations.
#[derive(Clone, Copy, Debug)]
pub struct Mutation;

impl Mutation {
    /// Name of the [`tracing::Span`] for the mutations.
    const SPAN_NAME: &'static str = "GraphQL mutation";
}

#[graphql_object(context = Context)]
impl Mutation {
    /// Registers a new passenger `User` and authenticates as them.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `EMAIL_OCCUPIED` - provided `UserEmail` is occupied by another
    ///                      active `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            address = ?address,
            email = %email,
            gql.name = "createUser",
            name = %name,
            otel.name = Self::SPAN_NAME,
            phone = ?phone,
        ),
    )]
    pub async fn create_user(
        name: api::user::Name,
        email: api::user::Email,
        password: api::user::Password,
        phone: Option<api::user::Phone>,
        address: Option<api::user::Address>,
        ctx: &Context,
    ) -> Result<api::user::session::CreateResult, Error> {
        let user = ctx
            .service()
            .execute(command::CreateUser {
                name: name.into(),
                email: email.into(),
                password: secrecy::SecretBox::init_with(move || {
                    password.into()
                }),
                phone: phone.map(Into::into),
                address: address.map(Into::into),
                role: domain::user::Role::Passenger,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;
        let output = ctx
            .service()
            .execute(command::CreateUserSession::ByUserId(user.id))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        ctx.set_current_session(api::user::session::CreateResult::session(
            &output,
        ))
        .await;

        Ok(output.into())
    }

    /// Registers a new `User` with the provided `UserRole`.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the current session is not authenticated;
    /// - `NOT_ADMIN` - the current `User` is not an admin;
    /// - `EMAIL_OCCUPIED` - provided `UserEmail` is occupied by another
    ///                      active `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            address = ?address,
            email = %email,
            gql.name = "createStaffUser",
            name = %name,
            otel.name = Self::SPAN_NAME,
            phone = ?phone,
            role = ?role,
        ),
    )]
    pub async fn create_staff_user(
        name: api::user::Name,
        email: api::user::Email,
        password: api::user::Password,
        phone: Option<api::user::Phone>,
        address: Option<api::user::Address>,
        role: api::user::Role,
        ctx: &Context,
    ) -> Result<api::User, Error> {
        let session = ctx.current_session().await?;
        if session.role != domain::user::Role::Admin {
            return Err(api::PrivilegeError::Admin.into())
                .map_err(ctx.error());
        }

        ctx.service()
            .execute(command::CreateUser {
                name: name.into(),
                email: email.into(),
                password: secrecy::SecretBox::init_with(move || {
                    password.into()
                }),
                phone: phone.map(Into::into),
                address: address.map(Into::into),
                role: role.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Creates a new `User` session with the provided credentials.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `WRONG_CREDENTIALS` - provided credentials do not match any active
    ///                         `User`.
    #[tracing::instrument(
        skip_all,
        fields(
            email = %email,
            gql.name = "createUserSession",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn create_user_session(
        email: api::user::Email,
        password: api::user::Password,
        ctx: &Context,
    ) -> Result<api::user::session::CreateResult, Error> {
        let output = ctx
            .service()
            .execute(command::CreateUserSession::ByCredentials {
                email: email.into(),
                password: secrecy::SecretBox::init_with(move || {
                    password.into()
                }),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        ctx.set_current_session(api::user::session::CreateResult::session(
            &output,
        ))
        .await;

        Ok(output.into())
    }

    /// Exchanges the provided `UserRefreshToken` for a new `User` session.
    ///
    /// The provided `UserRefreshToken` can't be used again.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INVALID_REFRESH_TOKEN` - provided `UserRefreshToken` is unknown,
    ///                             already used or expired.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "refreshUserSession",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn refresh_user_session(
        refresh_token: api::user::session::RefreshToken,
        ctx: &Context,
    ) -> Result<api::user::session::CreateResult, Error> {
        let output = ctx
            .service()
            .execute(command::RefreshUserSession {
                refresh_token: refresh_token.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        ctx.set_current_session(api::user::session::CreateResult::session(
            &output,
        ))
        .await;

        Ok(output.into())
    }

    /// Revokes the provided `UserRefreshToken`.
    ///
    /// Returns `false` if the token has been already revoked or used.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deleteUserSession",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn delete_user_session(
        refresh_token: api::user::session::RefreshToken,
        ctx: &Context,
    ) -> Result<bool, Error> {
        ctx.service()
            .execute(command::DeleteUserSession {
                refresh_token: refresh_token.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
    }

    /// Deletes the `User` with the specified ID, or the authenticated `User`
    /// if no ID is provided.
    ///
    /// All the `UserRefreshToken`s of the deleted `User` are revoked, and its
    /// `UserEmail` may be registered again.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the current session is not authenticated;
    /// - `NOT_ADMIN` - another `User` is specified, and the current `User` is
    ///                 not an admin;
    /// - `USER_NOT_EXISTS` - the `User` with the specified ID does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "deleteUser",
            otel.name = Self::SPAN_NAME,
            user.id = ?id,
        ),
    )]
    pub async fn delete_user(
        id: Option<api::user::Id>,
        ctx: &Context,
    ) -> Result<api::User, Error> {
        let session = ctx.current_session().await?;
        let user_id = id.unwrap_or(session.user_id).into();
        if !session.acts_for(user_id) {
            return Err(api::PrivilegeError::Admin.into())
                .map_err(ctx.error());
        }

        ctx.service()
            .execute(command::DeleteUser { user_id })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Books the provided seats of the `Schedule` for the authenticated
    /// `User`.
    ///
    /// Either all the seats are booked, or none of them.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the current session is not authenticated;
    /// - `INVALID_SEAT_SELECTION` - no seats or duplicated seats requested;
    /// - `SCHEDULE_NOT_EXISTS` - the `Schedule` with the specified ID does
    ///                           not exist;
    /// - `UNKNOWN_SEATS` - some of the seats don't exist in the `Bus`;
    /// - `NO_SEATS_AVAILABLE` - the `Bus` has no available seats at all;
    /// - `SEATS_UNAVAILABLE` - some of the seats are already taken;
    /// - `FARE_OVERFLOW` - the total fare is too large.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "bookTicket",
            otel.name = Self::SPAN_NAME,
            schedule.id = %schedule_id,
            seats = ?seats,
        ),
    )]
    pub async fn book_ticket(
        schedule_id: api::schedule::Id,
        seats: Vec<api::seat::Number>,
        ctx: &Context,
    ) -> Result<api::Booking, Error> {
        let my_id = ctx.current_session().await?.user_id;

        let details = ctx
            .service()
            .execute(command::BookTicket {
                user_id: my_id.into(),
                schedule_id: schedule_id.into(),
                seats: api::seat::numbers(seats),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        notify_booked(ctx, &details).await;

        Ok(details.into())
    }

    /// Cancels the `Booking` with the specified ID, freeing its seats.
    ///
    /// Returns `false` if the `Booking` doesn't exist. Cancelling an already
    /// cancelled `Booking` succeeds without changes.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the current session is not authenticated;
    /// - `NOT_BOOKING_OWNER` - the `Booking` belongs to another `User`, and
    ///                         the current `User` is not an admin.
    #[tracing::instrument(
        skip_all,
        fields(
            booking.id = %booking_id,
            gql.name = "cancelBooking",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn cancel_booking(
        booking_id: api::booking::Id,
        ctx: &Context,
    ) -> Result<bool, Error> {
        let session = ctx.current_session().await?;

        let Some(booking) = ctx
            .service()
            .execute(query::booking::ById::by(booking_id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
        else {
            return Ok(false);
        };
        if !session.acts_for(booking.user_id) {
            return Err(api::PrivilegeError::BookingOwner.into())
                .map_err(ctx.error());
        }

        ctx.service()
            .execute(command::CancelBooking {
                booking_id: booking.id,
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
    }

    /// Adds new seats to the `Bus`.
    ///
    /// Either all the seats are added, or none of them.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the current session is not authenticated;
    /// - `NOT_STAFF` - the current `User` is not an operator or an admin;
    /// - `INVALID_SEAT_SELECTION` - no seats or duplicated seats provided;
    /// - `BUS_NOT_EXISTS` - the `Bus` with the specified ID does not exist;
    /// - `SEATS_EXIST` - some of the seats already exist in the `Bus`.
    #[tracing::instrument(
        skip_all,
        fields(
            bus.id = %bus_id,
            gql.name = "addSeats",
            otel.name = Self::SPAN_NAME,
            seats = ?seats,
        ),
    )]
    pub async fn add_seats(
        bus_id: api::bus::Id,
        seats: Vec<api::seat::Number>,
        ctx: &Context,
    ) -> Result<Vec<api::Seat>, Error> {
        _ = ctx.staff_session().await?;

        ctx.service()
            .execute(command::AddSeats {
                bus_id: bus_id.into(),
                numbers: api::seat::numbers(seats),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|s| s.into_iter().map(Into::into).collect())
    }

    /// Holds the available seats of the `Schedule`'s `Bus` without any
    /// `Booking`.
    ///
    /// Either all the seats are held, or none of them.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the current session is not authenticated;
    /// - `NOT_STAFF` - the current `User` is not an operator or an admin;
    /// - `INVALID_SEAT_SELECTION` - no seats or duplicated seats provided;
    /// - `SCHEDULE_NOT_EXISTS` - the `Schedule` with the specified ID does
    ///                           not exist;
    /// - `SEATS_NOT_EXIST` - some of the seats don't exist in the `Bus`;
    /// - `SEATS_UNAVAILABLE` - some of the seats are already taken.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "reserveSeats",
            otel.name = Self::SPAN_NAME,
            schedule.id = %schedule_id,
            seats = ?seats,
        ),
    )]
    pub async fn reserve_seats(
        schedule_id: api::schedule::Id,
        seats: Vec<api::seat::Number>,
        ctx: &Context,
    ) -> Result<Vec<api::seat::Number>, Error> {
        _ = ctx.staff_session().await?;

        ctx.service()
            .execute(command::ReserveSeats {
                schedule_id: schedule_id.into(),
                numbers: api::seat::numbers(seats),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|n| {
                Vec::from(n).into_iter().map(Into::into).collect()
            })
    }

    /// Releases the held seats of the `Schedule`'s `Bus`.
    ///
    /// Booked seats are never released this way: cancel their `Booking`
    /// instead.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the current session is not authenticated;
    /// - `NOT_STAFF` - the current `User` is not an operator or an admin;
    /// - `INVALID_SEAT_SELECTION` - no seats or duplicated seats provided;
    /// - `SCHEDULE_NOT_EXISTS` - the `Schedule` with the specified ID does
    ///                           not exist;
    /// - `SEATS_NOT_EXIST` - some of the seats don't exist in the `Bus`;
    /// - `SEATS_NOT_HELD` - some of the seats are available or booked.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "releaseSeats",
            otel.name = Self::SPAN_NAME,
            schedule.id = %schedule_id,
            seats = ?seats,
        ),
    )]
    pub async fn release_seats(
        schedule_id: api::schedule::Id,
        seats: Vec<api::seat::Number>,
        ctx: &Context,
    ) -> Result<Vec<api::seat::Number>, Error> {
        _ = ctx.staff_session().await?;

        ctx.service()
            .execute(command::ReleaseSeats {
                schedule_id: schedule_id.into(),
                numbers: api::seat::numbers(seats),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|n| {
                Vec::from(n).into_iter().map(Into::into).collect()
            })
    }

    /// Records a `Payment` for the `Booking` with the specified ID.
    ///
    /// The `amount` is recorded as reported and is not checked against the
    /// `Booking` fare.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the current session is not authenticated;
    /// - `BOOKING_NOT_EXISTS` - the `Booking` with the specified ID does not
    ///                          exist;
    /// - `NOT_BOOKING_OWNER` - the `Booking` belongs to another `User`, and
    ///                         the current `User` is not an admin;
    /// - `ALREADY_PAID` - the `Booking` already has a `Payment`.
    #[tracing::instrument(
        skip_all,
        fields(
            amount = %amount,
            booking.id = %booking_id,
            gql.name = "initiatePayment",
            otel.name = Self::SPAN_NAME,
            status = ?status,
        ),
    )]
    pub async fn initiate_payment(
        booking_id: api::booking::Id,
        amount: Money,
        status: api::payment::Status,
        ctx: &Context,
    ) -> Result<api::Payment, Error> {
        let session = ctx.current_session().await?;

        let booking = ctx
            .service()
            .execute(query::booking::ById::by(booking_id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| api::query::BookingError::NotExists.into())
            .map_err(ctx.error())?;
        if !session.acts_for(booking.user_id) {
            return Err(api::PrivilegeError::BookingOwner.into())
                .map_err(ctx.error());
        }

        ctx.service()
            .execute(command::InitiatePayment {
                booking_id: booking.id,
                amount,
                status: status.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Sends a `Notification` to the `User` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AUTHORIZATION_REQUIRED` - the current session is not authenticated;
    /// - `NOT_STAFF` - the current `User` is not an operator or an admin;
    /// - `USER_NOT_EXISTS` - the `User` with the specified ID does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "sendNotification",
            kind = ?kind,
            otel.name = Self::SPAN_NAME,
            user.id = %user_id,
        ),
    )]
    pub async fn send_notification(
        user_id: api::user::Id,
        message: api::notification::Message,
        kind: api::notification::Kind,
        ctx: &Context,
    ) -> Result<api::Notification, Error> {
        _ = ctx.staff_session().await?;

        ctx.service()
            .execute(command::SendNotification {
                user_id: user_id.into(),
                message: message.into(),
                kind: kind.into(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }
}

/// Notifies the owner of the freshly made [`Booking`] about its confirmation.
///
/// Failures are logged only, as the [`Booking`] stays confirmed anyway.
///
/// [`Booking`]: domain::Booking
async fn notify_booked(ctx: &Context, details: &read::booking::Details) {
    let booking = &details.booking;
    let text = format!(
        "Booking confirmed: {} seat(s), total fare {}",
        details.seats.len(),
        booking.total_fare,
    );
    let Some(message) = domain::notification::Message::new(text) else {
        tracing::warn!(
            "failed to compose confirmation of `Booking(id: {})`",
            booking.id,
        );
        return;
    };

    if let Err(e) = ctx
        .service()
        .execute(command::SendNotification {
            user_id: booking.user_id,
            message,
            kind: domain::notification::Kind::Email,
        })
        .await
    {
        tracing::warn!(
            "failed to notify `User(id: {})` about `Booking(id: {})`: {e}",
            booking.user_id,
            booking.id,
        );
    }
}

define_error! {
    enum SeatError {
        #[code = "INVALID_SEAT_SELECTION"]
        #[status = BAD_REQUEST]
        #[message = "Seat selection is invalid"]
        InvalidSelection,

        #[code = "UNKNOWN_SEATS"]
        #[status = BAD_REQUEST]
        #[message = "Seats do not exist in the `Bus`"]
        Unknown,

        #[code = "SEATS_NOT_EXIST"]
        #[status = NOT_FOUND]
        #[message = "Seats do not exist in the `Bus`"]
        NotExist,

        #[code = "SEATS_UNAVAILABLE"]
        #[status = CONFLICT]
        #[message = "Seats are not available"]
        Unavailable,

        #[code = "SEATS_NOT_HELD"]
        #[status = CONFLICT]
        #[message = "Seats are not held"]
        NotHeld,

        #[code = "SEATS_EXIST"]
        #[status = CONFLICT]
        #[message = "Seats already exist in the `Bus`"]
        Exist,
    }
}

impl AsError for command::create_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "EMAIL_OCCUPIED"]
                #[status = CONFLICT]
                #[message = "`UserEmail` is occupied by another `User`"]
                EmailOccupied,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::EmailOccupied(_) => Some(Error::EmailOccupied.into()),
        }
    }
}

impl AsError for command::create_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "WRONG_CREDENTIALS"]
                #[status = UNAUTHORIZED]
                #[message = "Provided credentials do not match any `User`"]
                WrongCredentials,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::JsonWebTokenEncodeError(_) => None,
            Self::UserNotExists(_) | Self::WrongCredentials => {
                Some(Error::WrongCredentials.into())
            }
        }
    }
}

impl AsError for command::refresh_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "INVALID_REFRESH_TOKEN"]
                #[status = UNAUTHORIZED]
                #[message = "`UserRefreshToken` is unknown, used or expired"]
                InvalidRefreshToken,
            }
        }

        match self {
            Self::Db(e) => e.try_as_error(),
            Self::Issue(e) => e.try_as_error(),
            Self::InvalidRefreshToken => {
                Some(Error::InvalidRefreshToken.into())
            }
        }
    }
}

impl AsError for command::delete_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::UserNotExists(_) => {
                Some(api::query::UserError::NotExists.into())
            }
        }
    }
}

impl AsError for command::book_ticket::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "FARE_OVERFLOW"]
                #[status = BAD_REQUEST]
                #[message = "Total fare of the `Booking` is too large"]
                FareOverflow,

                #[code = "NO_SEATS_AVAILABLE"]
                #[status = CONFLICT]
                #[message = "`Bus` has no available seats"]
                NoSeatsAvailable,
            }
        }

        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::FareOverflow => Error::FareOverflow.into(),
            Self::InvalidSelection(e) => {
                crate::Error::from(SeatError::InvalidSelection).with_details(e)
            }
            Self::NoSeatsAvailable(_) => Error::NoSeatsAvailable.into(),
            Self::ScheduleNotExists(_) => {
                api::query::ScheduleError::NotExists.into()
            }
            Self::SeatsUnavailable(n) => {
                crate::Error::from(SeatError::Unavailable).with_details(n)
            }
            Self::UnknownSeats(n) => {
                crate::Error::from(SeatError::Unknown).with_details(n)
            }
            Self::UserNotExists(_) => AuthError::AuthorizationRequired.into(),
        })
    }
}

impl AsError for command::add_seats::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::BusNotExists(_) => api::query::BusError::NotExists.into(),
            Self::InvalidSelection(e) => {
                crate::Error::from(SeatError::InvalidSelection).with_details(e)
            }
            Self::SeatsExist(n) => {
                crate::Error::from(SeatError::Exist).with_details(n)
            }
        })
    }
}

impl AsError for command::reserve_seats::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::InvalidSelection(e) => {
                Error::from(SeatError::InvalidSelection).with_details(e)
            }
            Self::ScheduleNotExists(_) => {
                api::query::ScheduleError::NotExists.into()
            }
            Self::SeatsNotExist(n) => {
                Error::from(SeatError::NotExist).with_details(n)
            }
            Self::SeatsUnavailable(n) => {
                Error::from(SeatError::Unavailable).with_details(n)
            }
        })
    }
}

impl AsError for command::release_seats::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::InvalidSelection(e) => {
                Error::from(SeatError::InvalidSelection).with_details(e)
            }
            Self::ScheduleNotExists(_) => {
                api::query::ScheduleError::NotExists.into()
            }
            Self::SeatsNotExist(n) => {
                Error::from(SeatError::NotExist).with_details(n)
            }
            Self::SeatsNotHeld(n) => {
                Error::from(SeatError::NotHeld).with_details(n)
            }
        })
    }
}

impl AsError for command::initiate_payment::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "ALREADY_PAID"]
                #[status = CONFLICT]
                #[message = "`Booking` already has a `Payment`"]
                AlreadyPaid,
            }
        }

        Some(match self {
            Self::Db(e) => return e.try_as_error(),
            Self::AlreadyPaid(_) => Error::AlreadyPaid.into(),
            Self::BookingNotExists(_) => {
                api::query::BookingError::NotExists.into()
            }
        })
    }
}

impl AsError for command::send_notification::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::UserNotExists(_) => {
                Some(api::query::UserError::NotExists.into())
            }
        }
    }
}

#[cfg(test)]
mod spec {
    use service::{command, domain::seat};

    use crate::AsError as _;

    fn numbers(numbers: &[&str]) -> seat::Numbers {
        numbers
            .iter()
            .map(|n| seat::Number::new(*n).unwrap())
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn taken_seats_are_conflict() {
        let err = command::book_ticket::ExecutionError::SeatsUnavailable(
            numbers(&["A1", "A2"]),
        )
        .try_as_error()
        .unwrap();

        assert_eq!(err.code, "SEATS_UNAVAILABLE");
        assert_eq!(err.status_code, http::StatusCode::CONFLICT);
        assert!(err.message.ends_with("A1, A2"), "{}", err.message);
    }

    #[test]
    fn unknown_seats_are_validation() {
        let err = command::book_ticket::ExecutionError::UnknownSeats(numbers(
            &["Z9"],
        ))
        .try_as_error()
        .unwrap();

        assert_eq!(err.code, "UNKNOWN_SEATS");
        assert_eq!(err.status_code, http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn empty_selection_is_validation() {
        let err = command::reserve_seats::ExecutionError::InvalidSelection(
            seat::SelectionError::Empty,
        )
        .try_as_error()
        .unwrap();

        assert_eq!(err.code, "INVALID_SEAT_SELECTION");
        assert_eq!(err.status_code, http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn missing_schedule_is_not_found() {
        let err = command::release_seats::ExecutionError::ScheduleNotExists(
            service::domain::schedule::Id::new(),
        )
        .try_as_error()
        .unwrap();

        assert_eq!(err.code, "SCHEDULE_NOT_EXISTS");
        assert_eq!(err.status_code, http::StatusCode::NOT_FOUND);
    }

    #[test]
    fn second_payment_is_conflict() {
        let err = command::initiate_payment::ExecutionError::AlreadyPaid(
            service::domain::booking::Id::new(),
        )
        .try_as_error()
        .unwrap();

        assert_eq!(err.code, "ALREADY_PAID");
        assert_eq!(err.status_code, http::StatusCode::CONFLICT);
    }

    #[test]
    fn deleting_missing_user_is_not_found() {
        let err = command::delete_user::ExecutionError::UserNotExists(
            service::domain::user::Id::new(),
        )
        .try_as_error()
        .unwrap();

        assert_eq!(err.code, "USER_NOT_EXISTS");
        assert_eq!(err.status_code, http::StatusCode::NOT_FOUND);
    }

    #[test]
    fn reused_refresh_token_is_unauthorized() {
        use command::refresh_user_session::ExecutionError as E;

        let err = E::InvalidRefreshToken.try_as_error().unwrap();

        assert_eq!(err.code, "INVALID_REFRESH_TOKEN");
        assert_eq!(err.status_code, http::StatusCode::UNAUTHORIZED);
    }
}
