//! HTTP API for the pension verification service.
//!
//! Three endpoints drive the verification lifecycle: the live multipart
//! submission, the offline-sync JSON submission, and the beneficiary data
//! query. Account resolution is explicit — handlers resolve the bearer token
//! through the injected [`SessionResolver`] and pass an `AccountId` into the
//! core, which never reads ambient session state.

pub mod error;
pub mod handlers;
pub mod server;
pub mod session;
pub mod state;

pub use error::RpcError;
pub use server::{router, RpcServer};
pub use session::{SessionResolver, TokenTable};
pub use state::AppState;
