//! [`Query`] collection related to a single [`Bus`].

use common::operations::By;

use crate::domain::{bus, Bus};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries a [`Bus`] by its [`bus::Id`].
pub type ById = DatabaseQuery<By<Option<Bus>, bus::Id>>;
