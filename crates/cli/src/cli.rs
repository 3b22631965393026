use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "elecmate-reports")]
#[command(about = "List and bulk-manage inspection reports", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// User the commands run as. Without it every command is unauthenticated.
    #[arg(long, env = "ELECMATE_USER_ID", global = true)]
    pub user: Option<String>,

    /// Print settled action notices as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the report list
    List {
        /// Case-insensitive match on id, client name or address
        #[arg(short, long, default_value = "")]
        search: String,

        /// draft, in-progress, completed or all
        #[arg(long, default_value = "all")]
        status: String,

        /// eicr, eic, minor-works or all
        #[arg(long = "type", default_value = "all")]
        report_type: String,

        /// date-desc, date-asc, id-asc, id-desc, client-asc, client-desc, status-order
        #[arg(long, default_value = "date-desc")]
        sort: String,

        /// Number of pages to load
        #[arg(long, default_value = "1")]
        pages: u32,
    },

    /// Soft-delete reports
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Generate PDFs for reports
    Export {
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Move reports to a new status
    Status {
        /// draft, in-progress or completed
        status: String,

        #[arg(required = true)]
        ids: Vec<String>,
    },
}
