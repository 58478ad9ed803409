use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::collections::HashMap;

use crate::domain::{DomainError, Filter, SortOrder};

#[derive(Parser)]
#[command(name = "pne-admin")]
#[command(about = "Admin console for the PNE pizza restaurant dashboard")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Use seeded in-memory data instead of the API
    #[arg(long, global = true)]
    pub offline: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResourceKind {
    Locations,
    Contacts,
    Feedback,
    Inquiries,
    Users,
    Events,
    Gallery,
    Notifications,
    TeamMembers,
    Milestones,
}

impl ResourceKind {
    /// Dashboard route guarding this collection.
    pub fn route(&self) -> &'static str {
        match self {
            ResourceKind::Locations => "/locations",
            ResourceKind::Contacts => "/contacts",
            ResourceKind::Feedback => "/feedback",
            ResourceKind::Inquiries => "/acquisitions",
            ResourceKind::Users => "/users",
            ResourceKind::Events => "/events",
            ResourceKind::Gallery => "/gallery",
            ResourceKind::Notifications => "/notifications",
            ResourceKind::TeamMembers => "/about",
            ResourceKind::Milestones => "/about",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and store the session token
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,
    },

    /// Sign out and forget the session token
    Logout,

    /// Show the signed-in operator
    Whoami,

    /// List a collection
    List {
        resource: ResourceKind,

        /// Free-text search
        #[arg(short, long)]
        search: Option<String>,

        #[arg(long)]
        status: Option<String>,

        /// Additional filters (key=value pairs)
        #[arg(short, long)]
        filter: Vec<String>,

        #[arg(long)]
        sort_by: Option<String>,

        /// Sort descending
        #[arg(long)]
        desc: bool,

        #[arg(long)]
        page: Option<u32>,

        #[arg(long)]
        per_page: Option<u32>,
    },

    /// Show one record
    Get { resource: ResourceKind, id: String },

    /// Delete one record
    Delete { resource: ResourceKind, id: String },

    /// Write a collection to a CSV or TSV file
    Export {
        resource: ResourceKind,

        #[arg(short = 'F', long, default_value = "csv")]
        format: String,
    },

    /// Load every collection and print the headline numbers
    Stats,

    /// Print the site settings document
    Settings,
}

pub fn parse_filters(filters: Vec<String>) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for filter in filters {
        if let Some((key, value)) = filter.split_once('=') {
            map.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    map
}

/// Arguments of the `list` command, before they become a [`Filter`].
#[derive(Debug, Default)]
pub struct ListArgs {
    pub search: Option<String>,
    pub status: Option<String>,
    pub filter: Vec<String>,
    pub sort_by: Option<String>,
    pub desc: bool,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

pub fn build_filter(args: ListArgs) -> Result<Filter, DomainError> {
    let mut filter = Filter::new();
    filter.search = args.search;
    filter.status = args.status;

    for (key, value) in parse_filters(args.filter) {
        match key.as_str() {
            "priority" => filter.priority = Some(value),
            "category" => filter.category = Some(value),
            "type" => filter.kind = Some(value),
            "state" => filter.state = Some(value),
            "role" => filter.role = Some(value),
            "tag" => filter.tags.push(value),
            "active" => filter.is_active = Some(parse_bool(&key, &value)?),
            "rating" => {
                filter.rating = Some(value.parse().map_err(|_| {
                    DomainError::validation(format!("rating must be a number: {}", value))
                })?)
            }
            "from" => filter.start_date = Some(parse_date(&key, &value)?),
            "to" => filter.end_date = Some(parse_date(&key, &value)?),
            other => {
                return Err(DomainError::validation(format!("unknown filter: {}", other)));
            }
        }
    }

    if let Some(key) = args.sort_by {
        let order = if args.desc { SortOrder::Desc } else { SortOrder::Asc };
        filter = filter.sort(key, order);
    }
    filter.page = args.page;
    filter.per_page = args.per_page;
    Ok(filter)
}

fn parse_bool(key: &str, value: &str) -> Result<bool, DomainError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(DomainError::validation(format!("{} must be true or false", key))),
    }
}

fn parse_date(key: &str, value: &str) -> Result<NaiveDate, DomainError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| DomainError::validation(format!("{} must be YYYY-MM-DD: {}", key, value)))
}

/// Renders rows as left-aligned columns.
pub fn format_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let line = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let mut out = vec![line(headers.to_vec()), line(rule.iter().map(String::as_str).collect())];
    for row in rows {
        out.push(line(row.iter().map(String::as_str).collect()));
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter() {
        let filter = build_filter(ListArgs {
            search: Some("pine".into()),
            filter: vec!["state=WA".into(), "active=true".into(), "from=2024-01-01".into()],
            sort_by: Some("name".into()),
            desc: true,
            ..Default::default()
        })
        .unwrap();

        assert_eq!(filter.search.as_deref(), Some("pine"));
        assert_eq!(filter.state.as_deref(), Some("WA"));
        assert_eq!(filter.is_active, Some(true));
        assert_eq!(filter.start_date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(filter.sort_order, Some(SortOrder::Desc));
    }

    #[test]
    fn test_unknown_filter_is_rejected() {
        let err = build_filter(ListArgs {
            filter: vec!["colour=red".into()],
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn test_cli_parses_list() {
        let cli = Cli::try_parse_from([
            "pne-admin", "--offline", "list", "team-members", "--sort-by", "name", "-f", "role=Chef",
        ])
        .unwrap();
        assert!(cli.offline);
        match cli.command {
            Commands::List {
                resource, filter, ..
            } => {
                assert_eq!(resource, ResourceKind::TeamMembers);
                assert_eq!(filter, vec!["role=Chef".to_string()]);
            }
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn test_format_table() {
        let table = format_table(
            &["Name", "City"],
            &[vec!["Downtown".into(), "Seattle".into()]],
        );
        assert_eq!(table, "Name      City\n--------  -------\nDowntown  Seattle");
    }
}
