//! Inbound adapters: entry points through which the outside world drives
//! the domain.

pub mod http;
