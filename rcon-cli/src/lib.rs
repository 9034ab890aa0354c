//! # rcon-cli: remote console client
//!
//! Connects to a game server's RCON port, authenticates, and runs
//! commands given on the command line or read from stdin, printing each
//! response.
//!
//! ## Modes
//!
//! - **One-shot**: `rcon-cli status "bot_add_ct"` runs the listed commands.
//! - **Piped**: with no commands, one command per stdin line until EOF.
//! - **Bootstrap**: `--gen-config` prints a default config file.

pub mod config;
pub mod console;
