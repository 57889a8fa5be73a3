//! Document store
//!
//! Characters are kept as schemaless documents grouped into one table per
//! variant. Resolvers only read through [`DocumentStore::get`] and
//! [`DocumentStore::find_unique`]; `insert` and `patch` exist for seeding.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::debug;

use crate::id::DocumentId;
use crate::model::Variant;
use crate::{Error, Result};

/// System field carrying a document's id
pub const ID_FIELD: &str = "_id";

/// Store handle shared by the server and every request
pub type SharedStore = Arc<dyn DocumentStore>;

/// A stored record and its store-assigned id
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    id: DocumentId,
    fields: Map<String, Value>,
}

impl Document {
    pub fn new(id: DocumentId, mut fields: Map<String, Value>) -> Self {
        fields.remove(ID_FIELD);
        Self { id, fields }
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Full JSON form, user fields plus `_id`
    pub fn to_value(&self) -> Value {
        let mut object = self.fields.clone();
        object.insert(ID_FIELD.to_string(), Value::String(self.id.encode()));
        Value::Object(object)
    }
}

/// Read/write access to id-addressed documents
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document by id, `None` if absent
    async fn get(&self, id: &DocumentId) -> Result<Option<Document>>;

    /// Fetch the single document in `table` whose `field` equals `value`
    ///
    /// More than one match is an error, not an arbitrary pick.
    async fn find_unique(
        &self,
        table: Variant,
        field: &str,
        value: &Value,
    ) -> Result<Option<Document>>;

    /// Insert a new document and return its id
    async fn insert(&self, table: Variant, fields: Map<String, Value>) -> Result<DocumentId>;

    /// Shallow-merge `fields` into an existing document
    async fn patch(&self, id: &DocumentId, fields: Map<String, Value>) -> Result<()>;
}

/// In-process [`DocumentStore`]
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RwLock<HashMap<DocumentId, Document>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, id: &DocumentId) -> Result<Option<Document>> {
        debug!(%id, "get document");
        Ok(self.documents.read().await.get(id).cloned())
    }

    async fn find_unique(
        &self,
        table: Variant,
        field: &str,
        value: &Value,
    ) -> Result<Option<Document>> {
        debug!(%table, field, %value, "find unique document");
        let documents = self.documents.read().await;
        let mut matches = documents
            .values()
            .filter(|doc| doc.id.table() == table && doc.get(field) == Some(value));

        let first = matches.next().cloned();
        if matches.next().is_some() {
            return Err(Error::NotUnique {
                table,
                field: field.to_string(),
                value: value.clone(),
            });
        }
        Ok(first)
    }

    async fn insert(&self, table: Variant, fields: Map<String, Value>) -> Result<DocumentId> {
        let id = DocumentId::new(table);
        self.documents
            .write()
            .await
            .insert(id, Document::new(id, fields));
        debug!(%id, "inserted document");
        Ok(id)
    }

    async fn patch(&self, id: &DocumentId, fields: Map<String, Value>) -> Result<()> {
        let mut documents = self.documents.write().await;
        let document = documents
            .get_mut(id)
            .ok_or(Error::DocumentNotFound(*id))?;

        for (key, value) in fields {
            if key != ID_FIELD {
                document.fields.insert(key, value);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[tokio::test]
    async fn test_insert_then_get() {
        let store = MemoryStore::new();
        let id = store
            .insert(Variant::Droid, fields(json!({ "name": "R2-D2" })))
            .await
            .unwrap();

        let doc = store.get(&id).await.unwrap().unwrap();
        assert_eq!(doc.id(), id);
        assert_eq!(doc.get("name"), Some(&json!("R2-D2")));
        assert_eq!(doc.to_value()["_id"], json!(id.encode()));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let store = MemoryStore::new();
        assert!(store.is_empty().await);
        let missing = DocumentId::new(Variant::Human);
        assert!(store.get(&missing).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_unique_is_scoped_to_table() {
        let store = MemoryStore::new();
        store
            .insert(Variant::Human, fields(json!({ "name": "Luke Skywalker" })))
            .await
            .unwrap();

        let name = json!("Luke Skywalker");
        assert!(store
            .find_unique(Variant::Human, "name", &name)
            .await
            .unwrap()
            .is_some());
        assert!(store
            .find_unique(Variant::Droid, "name", &name)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_find_unique_rejects_duplicates() {
        let store = MemoryStore::new();
        for _ in 0..2 {
            store
                .insert(Variant::Droid, fields(json!({ "name": "R2-D2" })))
                .await
                .unwrap();
        }

        let result = store
            .find_unique(Variant::Droid, "name", &json!("R2-D2"))
            .await;
        assert!(matches!(result, Err(Error::NotUnique { .. })));
    }

    #[test]
    fn test_patch_merges_and_keeps_id() {
        tokio_test::block_on(async {
            let store = MemoryStore::new();
            let id = store
                .insert(Variant::Human, fields(json!({ "name": "Han Solo", "friends": [] })))
                .await
                .unwrap();

            let other = DocumentId::new(Variant::Human);
            store
                .patch(&id, fields(json!({ "friends": [other], "_id": "bogus" })))
                .await
                .unwrap();

            let doc = store.get(&id).await.unwrap().unwrap();
            assert_eq!(doc.get("name"), Some(&json!("Han Solo")));
            assert_eq!(doc.get("friends"), Some(&json!([other.encode()])));
            assert_eq!(doc.id(), id);
        });
    }

    #[tokio::test]
    async fn test_patch_unknown_document() {
        let store = MemoryStore::new();
        let missing = DocumentId::new(Variant::Droid);
        let result = store.patch(&missing, Map::new()).await;
        assert!(matches!(result, Err(Error::DocumentNotFound(id)) if id == missing));
    }
}
