// Library root for the `scarletshift` crate: a schedule assembly engine for
// a university course catalog. Re-exports the main modules and the
// `run_server` convenience entry point.

pub mod algorithm;
pub mod api_json;
pub mod catalog;
pub mod config;
pub mod errors;
pub mod models;
pub mod normalize;
pub mod server;
pub mod session;

pub use server::run_server;
