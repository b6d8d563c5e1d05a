//! Job models

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Document, ID_FIELD};
use common::error::{DatabaseError, DatabaseResult};

/// Field holding the number of bids placed on a job
pub const BID_COUNT_FIELD: &str = "bid_count";

/// Job owner details
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Buyer {
    #[serde(default)]
    pub buyer_email: String,
    /// Name, photo and any other profile fields
    #[serde(flatten)]
    pub profile: Document,
}

/// Job posting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(default)]
    pub buyer: Buyer,
    #[serde(default)]
    pub bid_count: i64,
    /// Title, category, deadline, price range, description
    #[serde(flatten)]
    pub details: Document,
}

impl Job {
    /// Create a job from a posting request; the bid counter starts at zero
    pub fn from_new(id: Uuid, new_job: NewJob) -> Self {
        let mut details = new_job.details;
        strip_reserved(&mut details);

        Job {
            id,
            buyer: new_job.buyer,
            bid_count: 0,
            details,
        }
    }

    /// Email of the job owner
    pub fn owner_email(&self) -> &str {
        &self.buyer.buyer_email
    }

    /// Rebuild a job from its stored document
    pub fn from_document(id: Uuid, mut doc: Document) -> DatabaseResult<Self> {
        doc.insert(ID_FIELD.to_string(), serde_json::json!(id));
        Ok(serde_json::from_value(serde_json::Value::Object(doc))?)
    }

    /// Stored form of the job: every field except the identifier
    pub fn to_document(&self) -> DatabaseResult<Document> {
        match serde_json::to_value(self)? {
            serde_json::Value::Object(mut doc) => {
                doc.remove(ID_FIELD);
                Ok(doc)
            }
            _ => Err(DatabaseError::Schema(
                "job did not serialize to an object".to_string(),
            )),
        }
    }
}

/// Request for posting a job
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewJob {
    #[serde(default)]
    pub buyer: Buyer,
    #[serde(flatten)]
    pub details: Document,
}

/// Fields to set on a job; unknown fields are taken as-is
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobPatch {
    #[serde(default)]
    pub buyer: Option<Buyer>,
    #[serde(flatten)]
    pub details: Document,
}

impl JobPatch {
    /// Top-level fields to merge into the stored document. The identifier
    /// and the bid counter cannot be overwritten.
    pub fn into_document(self) -> DatabaseResult<Document> {
        let mut doc = self.details;
        strip_reserved(&mut doc);
        if let Some(buyer) = self.buyer {
            doc.insert("buyer".to_string(), serde_json::to_value(buyer)?);
        }
        Ok(doc)
    }
}

/// Replace each top-level field of `doc` present in `patch`. Returns whether
/// anything changed.
pub fn merge_fields(doc: &mut Document, patch: Document) -> bool {
    let mut modified = false;
    for (key, value) in patch {
        if doc.get(&key) != Some(&value) {
            doc.insert(key, value);
            modified = true;
        }
    }
    modified
}

fn strip_reserved(doc: &mut Document) {
    doc.remove(ID_FIELD);
    doc.remove(BID_COUNT_FIELD);
}
