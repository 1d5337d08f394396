//! Data models exchanged with the database and HTTP callers.
//!
//! Entities serialize with PascalCase field names; the envelope uses
//! lowercase names.

mod entities;
mod request;
mod response;

pub use entities::{Asset, Player, PlayerAssetReport};
pub use request::{parse_body, CreateAssetRequest, RegisterPlayerRequest, RequestBody};
pub use response::ApiResponse;
