use clap::{Args, Subcommand};
use shared::{
    CreateItemRequest, DeleteItemResponse, Item, ListItemsQuery, ListItemsResponse,
    UpdateItemRequest,
};
use uuid::Uuid;

use super::render;
use crate::client::ApiClient;
use crate::config::CliConfig;
use crate::output;

#[derive(Subcommand, Debug)]
pub enum ItemsCommand {
    /// Create a new item
    Create {
        /// Item name
        #[arg(long)]
        name: String,

        /// Item description
        #[arg(long)]
        description: Option<String>,
    },

    /// List items, newest first
    List {
        /// Page size (server default 10, max 100)
        #[arg(long, allow_negative_numbers = true)]
        limit: Option<i64>,

        /// Number of items to skip
        #[arg(long, allow_negative_numbers = true)]
        offset: Option<i64>,
    },

    /// Show a single item
    Get {
        /// Item ID
        id: Uuid,
    },

    /// Change an item's name and/or description
    Update(UpdateArgs),

    /// Delete an item permanently
    Delete {
        /// Item ID
        id: Uuid,
    },
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Item ID
    pub id: Uuid,

    /// New name
    #[arg(long)]
    pub name: Option<String>,

    /// New description (may be empty)
    #[arg(long, conflicts_with = "clear_description")]
    pub description: Option<String>,

    /// Remove the description
    #[arg(long)]
    pub clear_description: bool,
}

impl UpdateArgs {
    fn to_request(&self) -> UpdateItemRequest {
        let description = if self.clear_description {
            Some(None)
        } else {
            self.description.clone().map(Some)
        };
        UpdateItemRequest {
            name: self.name.clone(),
            description,
        }
    }
}

pub async fn run(cmd: ItemsCommand, client: &ApiClient, config: &CliConfig) -> anyhow::Result<()> {
    match cmd {
        ItemsCommand::Create { name, description } => {
            let response = client
                .create_item(&CreateItemRequest { name, description })
                .await?;
            render(config, &response, "create item", |item: Item| {
                format!(
                    "✅ Item created successfully!\n{}",
                    output::item_details(&item)
                )
            })
        }
        ItemsCommand::List { limit, offset } => {
            let response = client.list_items(&ListItemsQuery { limit, offset }).await?;
            render(config, &response, "list items", |page: ListItemsResponse| {
                output::item_list(&page)
            })
        }
        ItemsCommand::Get { id } => {
            let response = client.get_item(id).await?;
            render(config, &response, "get item", |item: Item| {
                output::item_details(&item)
            })
        }
        ItemsCommand::Update(args) => {
            let request = args.to_request();
            if request.is_empty() {
                anyhow::bail!(
                    "nothing to update: pass --name, --description or --clear-description"
                );
            }
            let response = client.update_item(args.id, &request).await?;
            render(config, &response, "update item", |item: Item| {
                format!(
                    "✅ Item updated successfully!\n{}",
                    output::item_details(&item)
                )
            })
        }
        ItemsCommand::Delete { id } => {
            let response = client.delete_item(id).await?;
            render(config, &response, "delete item", |deleted: DeleteItemResponse| {
                format!(
                    "🗑️  {}\n{}",
                    deleted.message,
                    output::item_details(&deleted.item)
                )
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(name: Option<&str>, description: Option<&str>, clear: bool) -> UpdateArgs {
        UpdateArgs {
            id: Uuid::nil(),
            name: name.map(str::to_string),
            description: description.map(str::to_string),
            clear_description: clear,
        }
    }

    #[test]
    fn update_request_reflects_flags() {
        assert!(args(None, None, false).to_request().is_empty());

        let req = args(Some("X"), None, false).to_request();
        assert_eq!(req.name.as_deref(), Some("X"));
        assert_eq!(req.description, None);

        let req = args(None, Some(""), false).to_request();
        assert_eq!(req.description, Some(Some(String::new())));

        let req = args(None, None, true).to_request();
        assert_eq!(req.description, Some(None));
    }
}
