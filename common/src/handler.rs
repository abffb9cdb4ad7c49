//! [`Handler`] abstraction.

use std::future::Future;

/// Asynchronous executor of `Args`.
///
/// Commands, queries, storage operations and background tasks are all
/// [`Handler`]s of their own argument types.
pub trait Handler<Args = ()> {
    /// Type of a successful execution result.
    type Ok;

    /// Type of an execution error.
    type Err;

    /// Executes this [`Handler`] with the provided `args`.
    fn execute(
        &self,
        args: Args,
    ) -> impl Future<Output = Result<Self::Ok, Self::Err>>;
}
