//! Storage entity traits and types

use std::fmt::Debug;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

/// Plain attribute bag as persisted in a collection: field name to JSON value
pub type AttributeBag = Map<String, Value>;

/// Trait for types that can be stored in an ordered collection
pub trait StorageEntity: Clone + Debug + Send + Sync + Serialize + DeserializeOwned {
    /// Returns the value of a named field, used for linear lookups
    fn field(&self, name: &str) -> Option<Value>;
}

impl StorageEntity for AttributeBag {
    fn field(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
    struct TestEntity {
        id: i64,
        name: String,
    }

    impl StorageEntity for TestEntity {
        fn field(&self, name: &str) -> Option<Value> {
            match name {
                "id" => Some(json!(self.id)),
                "name" => Some(json!(self.name)),
                _ => None,
            }
        }
    }

    #[test]
    fn test_attribute_bag_field() {
        let bag = json!({"id": 5, "name": "Ana"});
        let bag = bag.as_object().cloned().unwrap();

        assert_eq!(bag.field("id"), Some(json!(5)));
        assert_eq!(bag.field("missing"), None);
    }

    #[test]
    fn test_custom_entity_field() {
        let entity = TestEntity {
            id: 1,
            name: "Test".to_string(),
        };
        assert_eq!(entity.field("name"), Some(json!("Test")));
        assert_eq!(entity.field("email"), None);
    }
}
