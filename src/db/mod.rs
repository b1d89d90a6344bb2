mod memory;
mod mongo;

use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Document};

use crate::error::Result;
use crate::models::{LessonFilter, NewOrder, UpdateOutcome};

pub use memory::MemoryStore;
pub use mongo::Database;

pub(crate) const LESSONS: &str = "lessons";
pub(crate) const ORDERS: &str = "orders";

/// The document operations the API performs. Each call is a single store
/// round trip.
#[async_trait]
pub trait Store: Send + Sync {
    async fn list_lessons(&self) -> Result<Vec<Document>>;

    /// Applies `fields` as a `$set` to the one lesson matched by `filter`.
    async fn update_lesson(&self, filter: &LessonFilter, fields: Document)
        -> Result<UpdateOutcome>;

    async fn insert_order(&self, order: NewOrder) -> Result<ObjectId>;

    async fn list_orders(&self) -> Result<Vec<Document>>;
}
