//! Pretty renderings for `--format pretty`.

use chrono::{DateTime, Utc};
use shared::{Item, ListItemsResponse};

use crate::client::ApiResponse;

fn timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn item_details(item: &Item) -> String {
    let description = item
        .description
        .as_ref()
        .map(|d| format!("   Description: {d}\n"))
        .unwrap_or_default();
    format!(
        "   ID: {}\n   Name: {}\n{description}   Created: {}\n   Updated: {}",
        item.id,
        item.name,
        timestamp(&item.created_at),
        timestamp(&item.updated_at),
    )
}

pub fn item_list(page: &ListItemsResponse) -> String {
    if page.items.is_empty() {
        return format!(
            "No items found (total: {}, offset: {})",
            page.total, page.offset
        );
    }

    let first = page.offset + 1;
    let last = page.offset + page.items.len() as i64;
    let details: Vec<String> = page.items.iter().map(item_details).collect();
    let mut out = format!(
        "📋 Showing items {first}-{last} of {}\n\n{}",
        page.total,
        details.join("\n\n")
    );
    if page.has_more() {
        out.push_str(&format!(
            "\n\n💡 More items available: --offset {last} --limit {}",
            page.limit
        ));
    }
    out
}

/// One-line summary of a failed call, with the server's message when present.
pub fn failure(action: &str, response: &ApiResponse) -> String {
    match response.error_message() {
        Some(message) => format!(
            "❌ Failed to {action} (status: {}): {message}",
            response.status
        ),
        None => format!("❌ Failed to {action} (status: {})", response.status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use reqwest::StatusCode;
    use uuid::Uuid;

    fn item(name: &str, description: Option<&str>) -> Item {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        Item {
            id: Uuid::nil(),
            name: name.to_string(),
            description: description.map(str::to_string),
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn details_skip_missing_description() {
        let text = item_details(&item("Widget", None));
        assert!(text.contains("   Name: Widget"));
        assert!(text.contains("   Created: 2024-03-09 14:05:07"));
        assert!(!text.contains("Description"));

        let text = item_details(&item("Widget", Some("")));
        assert!(text.contains("   Name: Widget\n   Description: \n   Created: "));
        assert!(text.ends_with("   Updated: 2024-03-09 14:05:07"));
    }

    #[test]
    fn list_shows_window_and_next_page() {
        let page = ListItemsResponse {
            items: vec![item("a", None), item("b", None)],
            total: 5,
            limit: 2,
            offset: 0,
        };
        let text = item_list(&page);
        assert!(text.starts_with("📋 Showing items 1-2 of 5\n\n   ID: "));
        assert!(text.ends_with("💡 More items available: --offset 2 --limit 2"));
    }

    #[test]
    fn empty_list() {
        let page = ListItemsResponse {
            items: Vec::new(),
            total: 3,
            limit: 10,
            offset: 30,
        };
        assert_eq!(item_list(&page), "No items found (total: 3, offset: 30)");
    }

    #[test]
    fn failure_includes_server_message() {
        let response = ApiResponse {
            status: StatusCode::NOT_FOUND,
            body: r#"{"error":"Item not found"}"#.to_string(),
        };
        assert_eq!(
            failure("get item", &response),
            "❌ Failed to get item (status: 404 Not Found): Item not found"
        );
    }
}
