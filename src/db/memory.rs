use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Bson, Document};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::Store;
use crate::error::Result;
use crate::models::{LessonFilter, NewOrder, UpdateOutcome};

#[derive(Default)]
struct Collections {
    lessons: Vec<Document>,
    orders: Vec<Document>,
}

/// In-process store with the same matching and modified-count rules as the
/// MongoDB one. Nothing is persisted.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lessons(lessons: Vec<Document>) -> Self {
        Self {
            inner: Mutex::new(Collections {
                lessons,
                orders: Vec::new(),
            }),
        }
    }

    pub fn lessons(&self) -> Vec<Document> {
        self.lock().lessons.clone()
    }

    pub fn orders(&self) -> Vec<Document> {
        self.lock().orders.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Collections> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn matches(filter: &LessonFilter, doc: &Document) -> bool {
    match filter {
        LessonFilter::ObjectId(oid) => doc.get_object_id("_id").ok() == Some(*oid),
        LessonFilter::Numeric(id) => match doc.get("id") {
            Some(Bson::Int32(v)) => i64::from(*v) == *id,
            Some(Bson::Int64(v)) => v == id,
            Some(Bson::Double(v)) => *v == *id as f64,
            _ => false,
        },
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_lessons(&self) -> Result<Vec<Document>> {
        Ok(self.lessons())
    }

    async fn update_lesson(
        &self,
        filter: &LessonFilter,
        fields: Document,
    ) -> Result<UpdateOutcome> {
        let mut inner = self.lock();
        let Some(lesson) = inner.lessons.iter_mut().find(|doc| matches(filter, doc)) else {
            return Ok(UpdateOutcome::default());
        };

        let mut changed = false;
        for (key, value) in fields {
            if key == "_id" {
                continue;
            }
            if lesson.get(&key) != Some(&value) {
                lesson.insert(key, value);
                changed = true;
            }
        }

        Ok(UpdateOutcome {
            matched: 1,
            modified: u64::from(changed),
        })
    }

    async fn insert_order(&self, order: NewOrder) -> Result<ObjectId> {
        let id = ObjectId::new();
        self.lock().orders.push(order.into_document_with_id(id));
        Ok(id)
    }

    async fn list_orders(&self) -> Result<Vec<Document>> {
        Ok(self.orders())
    }
}
