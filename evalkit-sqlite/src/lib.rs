mod cbox;
mod connection;
mod driver;
mod error;
mod extract;
mod prepared;
mod sql_writer;
mod transaction;

pub(crate) use cbox::*;
pub use connection::*;
pub use driver::*;
pub(crate) use error::*;
pub use prepared::*;
pub use sql_writer::*;
pub use transaction::*;
