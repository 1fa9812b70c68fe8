//! Projects cluster membership into the environment file read by the local
//! OVN daemons.
//!
//! The file names the first registered central member (used to bootstrap the
//! clustered databases), the Northbound and Southbound connection strings and
//! the node's own address.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::redundant_pub_crate)]

mod ca;
mod connection;
mod document;
mod error;
mod projector;

pub use ca::{CaSource, PkiCaSource, Protocol};
pub use connection::{ConnectionStringBuilder, bracketed};
pub use document::EnvironmentDocument;
pub use error::{Error, Result};
pub use projector::{EnvironmentProjector, EnvironmentProjectorOptions, NB_PORT, SB_PORT};
