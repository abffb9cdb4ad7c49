//! Abstract operations executed by [`Handler`]s.
//!
//! Storage backends implement [`Handler`] for the combinations of these
//! operations and domain types they support, so the business logic depends
//! only on the operations it actually performs.

use std::marker::PhantomData;

use crate::Handler;

/// Inserts a new value, failing on a unique key clash.
#[derive(Clone, Copy, Debug)]
pub struct Insert<T>(pub T);

/// Overwrites an existing value.
#[derive(Clone, Copy, Debug)]
pub struct Update<T>(pub T);

/// Removes values.
#[derive(Clone, Copy, Debug)]
pub struct Delete<T>(pub T);

/// Reads values.
#[derive(Clone, Copy, Debug)]
pub struct Select<T>(pub T);

/// Reads values and locks them until the end of the current transaction.
///
/// Concurrent transactions locking the same values are serialized, so values
/// must be locked in a deterministic order to avoid deadlocks.
#[derive(Clone, Copy, Debug)]
pub struct Lock<T>(pub T);

/// Launches a long-running background job.
#[derive(Clone, Copy, Debug)]
pub struct Start<T>(pub T);

/// Performs a single iteration of a background job.
#[derive(Clone, Copy, Debug)]
pub struct Perform<T>(pub T);

/// Begins a transaction.
#[derive(Clone, Copy, Debug)]
pub struct Transact;

/// Handle of a transaction begun with [`Transact`].
pub type Transacted<T> = <T as Handler<Transact>>::Ok;

/// Applies all the changes of a [`Transacted`] handle atomically.
///
/// Dropping the handle without committing discards the changes.
#[derive(Clone, Copy, Debug)]
pub struct Commit;

/// Selector of `W` values by a `B` key.
#[derive(Clone, Copy, Debug)]
pub struct By<W, B> {
    /// Type of the selected values.
    _what: PhantomData<W>,

    /// Key to select by.
    by: B,
}

impl<W, B> By<W, B> {
    /// Creates a new [`By`] selector with the provided key.
    #[must_use]
    pub fn new(by: B) -> Self {
        Self {
            _what: PhantomData,
            by,
        }
    }

    /// Returns the key of this [`By`] selector.
    #[must_use]
    pub fn into_inner(self) -> B {
        self.by
    }
}

#[cfg(test)]
mod spec {
    use super::By;

    #[test]
    fn keeps_selection_key() {
        let by = By::<Vec<u16>, _>::new("AB-100");

        assert_eq!(by.into_inner(), "AB-100");
    }
}
