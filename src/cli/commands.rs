use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "servicehub")]
#[command(about = "Inspect, install and query content service plugins")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List registered services from both origins
    List,

    /// Show a service's manifest and declared features
    Show {
        /// Service id
        id: String,
    },

    /// Validate a manifest document without installing it
    Validate {
        /// Path to manifest JSON
        path: String,
    },

    /// Install a service manifest (replaces an existing install with the same id)
    Install {
        /// Path to manifest JSON
        path: String,
    },

    /// Uninstall a previously installed service
    Uninstall {
        /// Service id
        id: String,
    },

    /// Fetch the fresh post list of a service
    Fetch {
        /// Service id
        id: String,

        /// Service config entry, as key=value (repeatable)
        #[arg(short, long = "config", value_name = "KEY=VALUE")]
        configs: Vec<String>,

        /// Continue from a page token printed by a previous fetch
        #[arg(long)]
        page: Option<String>,

        /// Follow page tokens for up to this many pages
        #[arg(long, default_value_t = 1)]
        pages: usize,

        /// Print the posts as JSON
        #[arg(long)]
        json: bool,
    },

    /// Fetch a user profile from a service
    User {
        /// Service id
        id: String,

        /// User id on that service
        user_id: String,

        /// Service config entry, as key=value (repeatable)
        #[arg(short, long = "config", value_name = "KEY=VALUE")]
        configs: Vec<String>,

        /// Print the user as JSON
        #[arg(long)]
        json: bool,
    },
}
