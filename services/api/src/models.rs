//! API models for request and response payloads
//!
//! Jobs and bids are documents: a few typed fields the server relies on, plus
//! whatever descriptive fields the client sends, kept as-is.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub mod bid;
pub mod job;
pub mod outcome;

pub use bid::{Bid, BidStatusUpdate, Bidder, NewBid};
pub use job::{Buyer, Job, JobPatch, NewJob};
pub use outcome::{DeleteResult, InsertResult, UpdateResult};

/// Free-form document fields
pub type Document = Map<String, Value>;

/// Key under which a document's identifier is serialized
pub const ID_FIELD: &str = "_id";

/// Request for issuing a session credential
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
}

/// Response for cookie operations
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}
