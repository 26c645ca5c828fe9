//! Groot Gateway API
//!
//! HTTP surface over the transaction coordinator and query executor.
//!
//! ## Endpoints
//!
//! ### Write (submit-and-wait; body is the committed transaction id)
//! - GET /add_cont/:groot - Record a technology contract (9 @-separated args)
//! - GET /add_client/:client - Register a client (4 args)
//! - GET /change_term/:term - Change contract terms (3 args)
//! - GET /add_content/:content - Attach content (4 args)
//!
//! ### Read (body is the raw chaincode payload)
//! - GET /get_cert_verify/:cert - Verify a certificate
//! - GET /get_tech/:id - Fetch one technology record
//! - GET /get_all_tech - List technology records
//! - GET /query_tech - Rich query over technology records
//!
//! ### Operational
//! - GET /health - Liveness and version

pub mod dto;
pub mod error;
pub mod routes;
pub mod server;
pub mod state;

pub use dto::*;
pub use error::*;
pub use routes::*;
pub use server::*;
pub use state::*;
