use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Body of `GET /hello`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloResponse {
    pub message: String,
}

/// An item as stored in the `items` table and returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for `POST /items`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateItemRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Request body for `PUT /items/:id`.
///
/// Fields left as `None` are not sent and keep their stored value.
/// `description` has three states on the wire:
///
/// - key absent: `None`, leave unchanged
/// - `"description": null`: `Some(None)`, clear it
/// - `"description": "..."`: `Some(Some(..))`, set it (the empty string included)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateItemRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
}

impl UpdateItemRequest {
    /// True when the request would not touch any field.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}

// Only called when the key is present, so an explicit `null` becomes `Some(None)`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Query string of `GET /items`. Missing values fall back to the server defaults.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ListItemsQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
}

/// Body of `GET /items`. `limit` and `offset` echo the values actually applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListItemsResponse {
    pub items: Vec<Item>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

impl ListItemsResponse {
    /// Whether rows exist past the returned window.
    pub fn has_more(&self) -> bool {
        self.offset + (self.items.len() as i64) < self.total
    }
}

/// Body of `DELETE /items/:id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteItemResponse {
    pub message: String,
    pub item: Item,
}

/// Error body returned with every 4xx/5xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_request_distinguishes_absent_null_and_empty() {
        let absent: UpdateItemRequest = serde_json::from_str(r#"{"name":"x"}"#).unwrap();
        assert_eq!(absent.description, None);

        let null: UpdateItemRequest = serde_json::from_str(r#"{"description":null}"#).unwrap();
        assert_eq!(null.description, Some(None));

        let empty: UpdateItemRequest = serde_json::from_str(r#"{"description":""}"#).unwrap();
        assert_eq!(empty.description, Some(Some(String::new())));
    }

    #[test]
    fn update_request_serializes_only_present_fields() {
        let req = UpdateItemRequest {
            name: None,
            description: Some(None),
        };
        assert_eq!(
            serde_json::to_string(&req).unwrap(),
            r#"{"description":null}"#
        );

        let req = UpdateItemRequest {
            name: Some("renamed".to_string()),
            description: None,
        };
        assert_eq!(serde_json::to_string(&req).unwrap(), r#"{"name":"renamed"}"#);
    }

    #[test]
    fn empty_update_request() {
        let req: UpdateItemRequest = serde_json::from_str("{}").unwrap();
        assert!(req.is_empty());
        assert!(!UpdateItemRequest {
            description: Some(None),
            ..Default::default()
        }
        .is_empty());
    }

    #[test]
    fn create_request_requires_name() {
        assert!(serde_json::from_str::<CreateItemRequest>(r#"{"description":"d"}"#).is_err());
        let req: CreateItemRequest = serde_json::from_str(r#"{"name":"Widget"}"#).unwrap();
        assert_eq!(req.description, None);
    }

    #[test]
    fn item_serializes_missing_description_as_null() {
        let now = Utc::now();
        let item = Item {
            id: Uuid::new_v4(),
            name: "test item".to_string(),
            description: None,
            created_at: now,
            updated_at: now,
        };
        let value = serde_json::to_value(&item).unwrap();
        assert!(value["description"].is_null());
        let parsed: Item = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, item);
    }

    #[test]
    fn list_response_has_more() {
        let page = ListItemsResponse {
            items: Vec::new(),
            total: 15,
            limit: 5,
            offset: 15,
        };
        assert!(!page.has_more());

        let now = Utc::now();
        let item = Item {
            id: Uuid::new_v4(),
            name: "a".to_string(),
            description: None,
            created_at: now,
            updated_at: now,
        };
        let page = ListItemsResponse {
            items: vec![item],
            total: 15,
            limit: 1,
            offset: 0,
        };
        assert!(page.has_more());
    }
}
