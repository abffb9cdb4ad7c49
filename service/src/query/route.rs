//! [`Query`] collection related to a single [`Route`].

use common::operations::By;

use crate::domain::{route, Route};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`Route`] by its [`route::Id`].
pub type ById = DatabaseQuery<By<Option<Route>, route::Id>>;
