//! Transport collaborator: endpoint addressing and TCP dialing.

pub mod connection;

pub use connection::{DEFAULT_PORT, Endpoint, dial};
