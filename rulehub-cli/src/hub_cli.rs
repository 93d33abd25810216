//! Hub subcommands

use anyhow::{anyhow, Context, Result};
use clap::Subcommand;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

use rulehub_core::catalog::{Item, ItemType};
use rulehub_core::{Hub, HubConfig};

#[derive(Subcommand, Debug)]
pub enum HubCommand {
    /// Download the latest index, then report the local state
    Update,

    /// Show item counts and warnings
    Stats,

    /// List items and their local status
    List {
        /// Only show items of this type
        #[clap(long = "type")]
        item_type: Option<ItemType>,

        /// Only show installed items
        #[clap(long)]
        installed: bool,
    },

    /// Show everything known about one item, as JSON
    Inspect {
        /// Item type (e.g. "parsers" or "parser")
        item_type: ItemType,

        /// Item name (e.g. "acme/sshd-logs")
        name: String,
    },
}

impl HubCommand {
    pub fn execute(self, config: HubConfig) -> Result<()> {
        match self {
            HubCommand::Update => update_command(config),
            HubCommand::Stats => stats_command(config),
            HubCommand::List {
                item_type,
                installed,
            } => list_command(config, item_type, installed),
            HubCommand::Inspect { item_type, name } => inspect_command(config, item_type, &name),
        }
    }
}

fn open_hub(config: HubConfig) -> Result<Hub> {
    Hub::new(config.local, config.remote, false).context("Failed to open the hub")
}

fn print_warnings(hub: &Hub) {
    for warning in hub.warnings() {
        eprintln!("warning: {warning}");
    }
}

fn update_command(config: HubConfig) -> Result<()> {
    let hub = Hub::new(config.local, config.remote, true)
        .context("Failed to update the hub index")?;

    println!(
        "Hub index refreshed ({})",
        hub.local_config().index_file.display()
    );

    for line in hub.item_stats() {
        println!("{line}");
    }
    print_warnings(&hub);

    Ok(())
}

fn stats_command(config: HubConfig) -> Result<()> {
    let hub = open_hub(config)?;

    for line in hub.item_stats() {
        println!("{line}");
    }
    print_warnings(&hub);

    Ok(())
}

#[derive(Tabled)]
struct ItemRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    item_type: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Local")]
    local_version: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl From<&Item> for ItemRow {
    fn from(item: &Item) -> Self {
        Self {
            name: item.name.clone(),
            item_type: item.item_type.singular().to_string(),
            version: item.version.clone(),
            local_version: item.state.local_version.clone().unwrap_or_default(),
            status: item_status(item).to_string(),
        }
    }
}

/// One-word summary of an item's local state
fn item_status(item: &Item) -> &'static str {
    let state = &item.state;

    if item.is_local() {
        "local"
    } else if state.tainted && state.installed {
        "tainted"
    } else if state.installed && state.up_to_date {
        "up-to-date"
    } else if state.installed {
        "update available"
    } else if state.downloaded {
        "downloaded"
    } else {
        "available"
    }
}

fn list_command(config: HubConfig, item_type: Option<ItemType>, installed: bool) -> Result<()> {
    let hub = open_hub(config)?;

    let types: Vec<ItemType> = match item_type {
        Some(item_type) => vec![item_type],
        None => ItemType::ALL.to_vec(),
    };

    let rows: Vec<ItemRow> = types
        .into_iter()
        .filter_map(|t| hub.get_item_map(t))
        .flat_map(|map| map.values())
        .filter(|item| !installed || item.state.installed)
        .map(ItemRow::from)
        .collect();

    if rows.is_empty() {
        println!("No items found");
        return Ok(());
    }

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()))
        .to_string();
    println!("{table}");

    Ok(())
}

fn inspect_command(config: HubConfig, item_type: ItemType, name: &str) -> Result<()> {
    let hub = open_hub(config)?;

    let item = hub
        .get_item(item_type, name)
        .ok_or_else(|| anyhow!("{} '{}' not found in the hub", item_type.singular(), name))?;

    println!("{}", serde_json::to_string_pretty(item)?);

    Ok(())
}
