pub mod capture;
pub mod dates;
pub mod dedupe;
pub mod error;
pub mod extract;
pub mod filter;
pub mod http;
pub mod merge;
pub mod notify;
pub mod pattern;
pub mod pipeline;
pub mod similarity;
pub mod store;
pub mod types;

pub use error::*;
pub use types::*;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
