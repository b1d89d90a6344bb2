use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    Client, Collection,
};

use super::{Store, LESSONS, ORDERS};
use crate::error::Result;
use crate::models::{LessonFilter, NewOrder, UpdateOutcome};

/// MongoDB-backed store. The client is created once and shared by every
/// request; the driver pools connections internally.
#[derive(Clone)]
pub struct Database {
    db: mongodb::Database,
}

impl Database {
    /// Connects and pings the server so an unreachable deployment fails here
    /// rather than on the first request.
    pub async fn connect(uri: &str, database: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri).await?;
        let db = client.database(database);
        db.run_command(doc! { "ping": 1 }).await?;
        Ok(Self { db })
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.db.collection(name)
    }

    async fn find_all(&self, name: &str) -> Result<Vec<Document>> {
        let cursor = self.collection(name).find(doc! {}).await?;
        let docs: Vec<Document> = cursor.try_collect().await?;
        Ok(docs)
    }
}

#[async_trait]
impl Store for Database {
    async fn list_lessons(&self) -> Result<Vec<Document>> {
        self.find_all(LESSONS).await
    }

    async fn update_lesson(
        &self,
        filter: &LessonFilter,
        fields: Document,
    ) -> Result<UpdateOutcome> {
        let result = self
            .collection(LESSONS)
            .update_one(filter.to_document(), doc! { "$set": fields })
            .await?;

        Ok(UpdateOutcome {
            matched: result.matched_count,
            modified: result.modified_count,
        })
    }

    async fn insert_order(&self, order: NewOrder) -> Result<ObjectId> {
        let id = ObjectId::new();
        self.collection(ORDERS)
            .insert_one(order.into_document_with_id(id))
            .await?;
        Ok(id)
    }

    async fn list_orders(&self) -> Result<Vec<Document>> {
        self.find_all(ORDERS).await
    }
}
