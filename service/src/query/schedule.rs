//! [`Query`] collection related to a single [`Schedule`].

use common::operations::By;

use crate::domain::{schedule, Schedule};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`Schedule`] by its [`schedule::Id`].
pub type ById = DatabaseQuery<By<Option<Schedule>, schedule::Id>>;
