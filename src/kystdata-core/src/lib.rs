#![deny(warnings)]
#![deny(rust_2018_idioms)]

//! Domain types and host capability ports shared by the Kystdatahuset client and
//! the applications embedding it.

mod domain;
#[allow(hidden_glob_reexports)]
mod error;
mod ports;

pub use domain::*;
pub use error::*;
pub use error::error as core_error;
pub use ports::*;
