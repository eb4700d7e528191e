#![deny(warnings)]
#![deny(rust_2018_idioms)]

//! Client for the Kystdatahuset web service: login, windowed AIS position queries and ship
//! lookups.

mod client;
mod endpoint;
mod envelope;
mod error;
mod models;
mod positions;

pub use client::*;
pub use endpoint::Endpoint;
pub use error::{Error, Result, RowError, WindowError};
pub use models::decode_position_row;
pub use positions::*;
