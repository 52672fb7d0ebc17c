//! Clap derive structures for the `coredns-operator` CLI.
//!
//! Defines the command tree, global flags, and shared value enums. Kept
//! free of workspace crates so `build.rs` can include it for man pages.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// coredns-operator -- drive the CoreDNS reconciler from the command line
#[derive(Debug, Parser)]
#[command(
    name = "coredns-operator",
    version,
    about = "Reconcile a CoreDNS workload from lifecycle events",
    long_about = "Renders the CoreDNS Corefile from operator configuration, manages the\n\
        supervised coredns service and publishes dns-provider relation data.\n\n\
        Workload and unit state are kept in a local state directory so each\n\
        event can be dispatched, inspected and replayed.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Path to the config file (defaults to the platform config dir)
    #[arg(long, env = "COREDNS_OPERATOR_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding workload and unit state
    #[arg(long, env = "COREDNS_OPERATOR_STATE_DIR", global = true)]
    pub state_dir: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "COREDNS_OPERATOR_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Deliver a lifecycle event to the reconciler
    #[command(alias = "d")]
    Dispatch(DispatchArgs),

    /// Print the Corefile rendered from the current config
    Render(RenderArgs),

    /// Show unit status, leadership and service state
    #[command(alias = "st")]
    Status,

    /// Show the workload's combined service plan
    Plan,

    /// Manage simulated relations and their bindings
    #[command(alias = "rel")]
    Relation(RelationArgs),

    /// Show or set leadership of this unit
    Leader(LeaderArgs),

    /// Inspect or control the supervised service
    #[command(alias = "svc")]
    Service(ServiceArgs),

    /// Simulate the workload supervisor connecting or disconnecting
    Workload(WorkloadArgs),

    /// Manage operator configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DISPATCH
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum EventArg {
    /// Unit installed
    Install,
    /// Workload container ready
    CorednsPebbleReady,
    /// Operator configuration changed
    ConfigChanged,
    /// This unit became leader
    LeaderElected,
    /// A dns-provider relation changed (requires --relation)
    DnsProviderRelationChanged,
}

#[derive(Debug, Args)]
pub struct DispatchArgs {
    /// Event to deliver
    pub event: EventArg,

    /// Relation id for relation events (e.g. 0 or dns-provider:0)
    #[arg(long, short = 'r')]
    pub relation: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  RENDER
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Fail if extra_servers has unbalanced braces
    #[arg(long)]
    pub check: bool,

    /// Show the Corefile currently in the workload instead
    #[arg(long, conflicts_with = "check")]
    pub deployed: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  RELATIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct RelationArgs {
    #[command(subcommand)]
    pub command: RelationCommand,
}

#[derive(Debug, Subcommand)]
pub enum RelationCommand {
    /// List relations
    #[command(alias = "ls")]
    List,

    /// Relate a remote application to an endpoint
    Add {
        /// Remote application name
        remote_app: String,

        /// Endpoint on this side
        #[arg(long, default_value = "dns-provider")]
        endpoint: String,

        /// Remote unit names (defaults to <remote_app>/0)
        #[arg(long = "unit")]
        units: Vec<String>,
    },

    /// Remove a relation
    #[command(alias = "rm")]
    Remove {
        /// Relation id
        id: String,
    },

    /// Show a relation's data buckets
    Show {
        /// Relation id
        id: String,
    },

    /// Assign the ingress address of a relation's binding
    Bind {
        /// Relation id
        id: String,

        /// Ingress address of this unit on the binding
        address: IpAddr,
    },

    /// Clear the ingress address of a relation's binding
    Unbind {
        /// Relation id
        id: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  LEADER / SERVICE / WORKLOAD
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LeaderArgs {
    /// New leadership state; omit to show the current one
    #[arg(action = clap::ArgAction::Set)]
    pub leader: Option<bool>,
}

#[derive(Debug, Args)]
pub struct ServiceArgs {
    #[command(subcommand)]
    pub command: ServiceCommand,
}

#[derive(Debug, Subcommand)]
pub enum ServiceCommand {
    /// Show the state of a service
    Show {
        #[arg(default_value = "coredns")]
        name: String,
    },

    /// Start a service (all enabled services when no name is given)
    Start { name: Option<String> },

    /// Stop a service
    Stop {
        #[arg(default_value = "coredns")]
        name: String,
    },
}

#[derive(Debug, Args)]
pub struct WorkloadArgs {
    #[command(subcommand)]
    pub command: WorkloadCommand,
}

#[derive(Debug, Subcommand)]
pub enum WorkloadCommand {
    /// Make the supervisor reachable again
    Connect,
    /// Make the supervisor unreachable
    Disconnect,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display current resolved configuration
    Show,

    /// Set a configuration value
    Set {
        /// Config key (forward, extra_servers, state_dir)
        key: String,

        /// Value to set
        #[arg(required_unless_present = "from_file", conflicts_with = "from_file")]
        value: Option<String>,

        /// Read the value from a file (useful for multi-line extra_servers)
        #[arg(long)]
        from_file: Option<PathBuf>,
    },

    /// Print the config file path
    Path,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
