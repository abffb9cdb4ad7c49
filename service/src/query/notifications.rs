//! [`Query`] collection related to multiple [`Notification`]s.

use common::operations::By;

use crate::domain::{user, Notification};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries all the [`Notification`]s of a [`user::Id`], newest first.
pub type ByUser = DatabaseQuery<By<Vec<Notification>, user::Id>>;
