mod aggregate;
mod args;
mod as_value;
mod column;
mod connection;
mod decode_type;
mod delegate;
mod driver;
mod entity;
mod error;
mod executor;
mod expression;
mod filter;
mod passive;
mod prepared;
mod query;
mod raw;
mod table_ref;
mod transaction;
mod unique;
mod update;
mod util;
mod value;
mod writer;

pub use ::anyhow::Context as ErrorContext;
pub use aggregate::*;
pub use args::*;
pub use as_value::*;
pub use column::*;
pub use connection::*;
pub use decode_type::*;
pub use delegate::*;
pub use driver::*;
pub use entity::*;
pub use error::*;
pub use executor::*;
pub use expression::*;
pub use filter::*;
pub use passive::*;
pub use prepared::*;
pub use query::*;
pub use raw::*;
pub use table_ref::*;
pub use transaction::*;
pub use unique::*;
pub use update::*;
pub use util::*;
pub use value::*;
pub use writer::*;
pub mod stream {
    pub use ::futures::stream::*;
}
pub use ::futures::future;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
