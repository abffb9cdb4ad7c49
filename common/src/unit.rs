//! Marker types.

/// Marker type describing an entity creation.
#[derive(Clone, Copy, Debug)]
pub struct Creation;

/// Marker type describing an entity deletion.
#[derive(Clone, Copy, Debug)]
pub struct Deletion;

/// Marker type describing an entity expiration.
#[derive(Clone, Copy, Debug)]
pub struct Expiration;

/// Marker type describing a trip departure.
#[derive(Clone, Copy, Debug)]
pub struct Departure;

/// Marker type describing a trip arrival.
#[derive(Clone, Copy, Debug)]
pub struct Arrival;
