//! Caller identity. There are no sessions or tokens: the caller states who
//! they are in a request header and the services authorise against it.

pub mod extractors;

pub use extractors::SharerId;
