pub mod connection;

pub use connection::SessionPhase;
