use serde::{Deserialize, Serialize};

/// A top-level destination for work items (a project in the tracker).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Bucket {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub sub_buckets: Vec<SubBucket>,
}

/// A named subdivision of a bucket (a section in the tracker).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SubBucket {
    pub id: String,
    pub name: String,
    pub bucket_id: String,
}

impl Bucket {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            sub_buckets: Vec::new(),
        }
    }

    pub fn with_sub_bucket(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        let sub = SubBucket {
            id: id.into(),
            name: name.into(),
            bucket_id: self.id.clone(),
        };
        self.sub_buckets.push(sub);
        self
    }
}

/// Destination chosen by the router. An empty `bucket_id` means no destination.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct RouteResult {
    pub bucket_id: String,
    pub sub_bucket_id: Option<String>,
}

impl RouteResult {
    pub fn unrouted() -> Self {
        Self::default()
    }

    pub fn is_routed(&self) -> bool {
        !self.bucket_id.is_empty()
    }
}
