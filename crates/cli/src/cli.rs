use clap::{Args, Parser, Subcommand};

use timekeeper_core::TriggerType;
use timekeeper_engine::OutcomeFilter;

/// Bulk suspend, resume, delete and trigger for scheduled templates,
/// timers and their instances.
#[derive(Parser, Debug)]
#[command(name = "timekeeper", about = "Bulk state changes for scheduled templates and timers")]
pub struct CliArgs {
    /// Configuration profile (reads `{PROFILE}_API_BASE_URL` etc. first)
    #[arg(long, env = "TIMEKEEPER_PROFILE")]
    pub profile: Option<String>,

    /// Backend origin, e.g. http://localhost:8080 (overrides API_BASE_URL)
    #[arg(long)]
    pub api_url: Option<String>,

    /// Request timeout in seconds (overrides API_TIMEOUT_SECONDS)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Also post every status message to this webhook
    #[arg(long)]
    pub webhook: Option<String>,

    /// Send status messages to the log instead of the console
    #[arg(long, short = 'q')]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Templates; suspend/resume cascade to their instances
    Templates {
        #[command(subcommand)]
        action: ParentCommand,
    },
    /// Timers
    Timers {
        #[command(subcommand)]
        action: ParentCommand,
    },
    /// Instances, one page at a time
    Instances {
        #[command(subcommand)]
        action: InstanceCommand,
    },
    /// Execution history
    Executions(ExecutionArgs),
    /// Region and country catalogs
    Geo {
        #[command(subcommand)]
        action: GeoCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum ParentCommand {
    List,
    Suspend(SelectArgs),
    Resume(SelectArgs),
    Delete {
        #[command(flatten)]
        select: SelectArgs,
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Fire now (timers only)
    Trigger(SelectArgs),
}

#[derive(Args, Debug)]
pub struct SelectArgs {
    /// Ids to act on
    #[arg(required_unless_present = "all")]
    pub ids: Vec<String>,

    /// Act on every listed record
    #[arg(long, conflicts_with = "ids")]
    pub all: bool,
}

#[derive(Subcommand, Debug)]
pub enum InstanceCommand {
    List(PageArgs),
    Suspend(InstanceSelect),
    Resume(InstanceSelect),
    Trigger(InstanceSelect),
    Reset(InstanceSelect),
}

#[derive(Args, Debug)]
pub struct PageArgs {
    /// Zero-based page number
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub page: i64,

    /// Page size: 25, 50, 100 or 200 (overrides INSTANCE_PAGE_SIZE)
    #[arg(long)]
    pub size: Option<u32>,
}

#[derive(Args, Debug)]
pub struct InstanceSelect {
    /// Instance ids; must be on the selected page
    #[arg(required = true)]
    pub ids: Vec<String>,

    #[command(flatten)]
    pub page: PageArgs,
}

#[derive(Args, Debug)]
pub struct ExecutionArgs {
    /// Only executions of this instance
    #[arg(long)]
    pub instance: Option<String>,

    /// SUCCESS, FAILED, SKIPPED or NONE (no outcome yet)
    #[arg(long)]
    pub outcome: Option<OutcomeFilter>,

    /// SCHEDULED or MANUAL
    #[arg(long)]
    pub trigger_type: Option<TriggerType>,
}

#[derive(Subcommand, Debug)]
pub enum GeoCommand {
    Regions,
    Countries {
        /// Restrict to one region code
        #[arg(long)]
        region: Option<String>,
    },
}
