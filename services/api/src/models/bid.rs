//! Bid models

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Document, ID_FIELD};
use common::error::{DatabaseError, DatabaseResult};

/// Status given to bids that do not specify one
pub const DEFAULT_BID_STATUS: &str = "pending";

fn default_status() -> String {
    DEFAULT_BID_STATUS.to_string()
}

/// Bidder details
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bidder {
    #[serde(default)]
    pub email: String,
    #[serde(flatten)]
    pub profile: Document,
}

/// Bid placed on a job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bid {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub job_id: Uuid,
    #[serde(default)]
    pub bidder: Bidder,
    /// Copy of the job owner's email
    #[serde(default)]
    pub buyer_email: String,
    #[serde(default = "default_status")]
    pub status: String,
    /// Price, deadline, comment
    #[serde(flatten)]
    pub details: Document,
}

impl Bid {
    /// Create a bid from a placement request
    pub fn from_new(id: Uuid, new_bid: NewBid) -> Self {
        let mut details = new_bid.details;
        details.remove(ID_FIELD);

        Bid {
            id,
            job_id: new_bid.job_id,
            bidder: new_bid.bidder,
            buyer_email: new_bid.buyer_email,
            status: new_bid
                .status
                .filter(|s| !s.is_empty())
                .unwrap_or_else(default_status),
            details,
        }
    }

    /// Email of the bidder
    pub fn bidder_email(&self) -> &str {
        &self.bidder.email
    }

    /// Rebuild a bid from its stored document
    pub fn from_document(id: Uuid, mut doc: Document) -> DatabaseResult<Self> {
        doc.insert(ID_FIELD.to_string(), serde_json::json!(id));
        Ok(serde_json::from_value(serde_json::Value::Object(doc))?)
    }

    /// Stored form of the bid: every field except the identifier
    pub fn to_document(&self) -> DatabaseResult<Document> {
        match serde_json::to_value(self)? {
            serde_json::Value::Object(mut doc) => {
                doc.remove(ID_FIELD);
                Ok(doc)
            }
            _ => Err(DatabaseError::Schema(
                "bid did not serialize to an object".to_string(),
            )),
        }
    }
}

/// Request for placing a bid
#[derive(Debug, Clone, Deserialize)]
pub struct NewBid {
    pub job_id: Uuid,
    #[serde(default)]
    pub bidder: Bidder,
    #[serde(default)]
    pub buyer_email: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(flatten)]
    pub details: Document,
}

/// Request for changing a bid's status
#[derive(Debug, Clone, Deserialize)]
pub struct BidStatusUpdate {
    #[serde(default)]
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_bid_defaults_to_pending() {
        let job_id = Uuid::new_v4();
        let new_bid: NewBid = serde_json::from_value(json!({
            "job_id": job_id,
            "bidder": { "email": "a@x.com", "name": "A" },
            "buyer_email": "owner@x.com",
            "price": 150,
            "comment": "I can do this"
        }))
        .unwrap();

        let bid = Bid::from_new(Uuid::new_v4(), new_bid);
        assert_eq!(bid.job_id, job_id);
        assert_eq!(bid.bidder_email(), "a@x.com");
        assert_eq!(bid.status, DEFAULT_BID_STATUS);
        assert_eq!(bid.details["price"], 150);
        assert_eq!(bid.bidder.profile["name"], "A");
    }

    #[test]
    fn test_explicit_status_is_kept() {
        let new_bid: NewBid = serde_json::from_value(json!({
            "job_id": Uuid::new_v4(),
            "bidder": { "email": "a@x.com" },
            "status": "In Progress"
        }))
        .unwrap();

        assert_eq!(Bid::from_new(Uuid::new_v4(), new_bid).status, "In Progress");
    }

    #[test]
    fn test_malformed_job_id_is_rejected() {
        let result = serde_json::from_value::<NewBid>(json!({
            "job_id": "J1",
            "bidder": { "email": "a@x.com" }
        }));

        assert!(result.is_err());
    }

    #[test]
    fn test_document_conversion_preserves_fields() {
        let new_bid: NewBid = serde_json::from_value(json!({
            "job_id": Uuid::new_v4(),
            "bidder": { "email": "a@x.com" },
            "deadline": "2025-02-01"
        }))
        .unwrap();
        let bid = Bid::from_new(Uuid::new_v4(), new_bid);

        let doc = bid.to_document().unwrap();
        assert!(!doc.contains_key("_id"));
        assert_eq!(doc["bidder"]["email"], "a@x.com");
        assert_eq!(Bid::from_document(bid.id, doc).unwrap(), bid);
    }
}
