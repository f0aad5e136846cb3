//! Clap derive structures for the `ocp` CLI.
//!
//! Defines the command tree, global flags, and shared argument groups.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use ocp_core::HostKind;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// ocp -- declarative virtual host management for the OCP portal
#[derive(Debug, Parser)]
#[command(
    name = "ocp",
    version,
    about = "Reconcile OCP virtual hosts against declared state",
    long_about = "Creates, converges and removes virtual hosts through the OCP\n\
        GraphQL API, keeping the last synchronized state in a local JSON file.",
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
    /// Portal profile to use
    #[arg(long, short = 'p', env = "OCP_PROFILE", global = true)]
    pub profile: Option<String>,

    /// GraphQL endpoint URL (overrides profile)
    #[arg(long, short = 'e', env = "OCP_ENDPOINT", global = true)]
    pub endpoint: Option<String>,

    /// API token (overrides profile; OCP_TOKEN is read when neither is set)
    #[arg(long, global = true, hide = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(long, short = 'o', env = "OCP_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Skip TLS certificate verification
    #[arg(long, short = 'k', global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "OCP_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Identifier only (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Apply, refresh, destroy or import a virtual host
    #[command(alias = "vh")]
    Host(HostArgs),

    /// Resolve a portal object name to its id
    #[command(alias = "lu")]
    Lookup(LookupArgs),
}

// ── Host ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct HostArgs {
    #[command(subcommand)]
    pub command: HostCommand,
}

#[derive(Debug, Subcommand)]
pub enum HostCommand {
    /// Converge the host toward the declared state, creating or replacing it when needed
    Apply(ApplyArgs),

    /// Read the host back and update the state file
    Refresh(TargetArgs),

    /// Delete the host and remove the state file
    Destroy(TargetArgs),

    /// Adopt an existing host by id into a new state file
    Import(ImportArgs),
}

/// Which host variant and where its state lives.
#[derive(Debug, Args)]
pub struct TargetArgs {
    /// Host variant: standard, immutable or shadow
    #[arg(long, default_value = "standard")]
    pub kind: HostKind,

    /// State file (JSON)
    #[arg(long, short = 's')]
    pub state: PathBuf,
}

#[derive(Debug, Args)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Declared state (TOML)
    #[arg(long, short = 'f')]
    pub file: PathBuf,
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Remote id of the host to adopt
    #[arg(long)]
    pub id: String,
}

// ── Lookup ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LookupArgs {
    #[command(subcommand)]
    pub command: LookupCommand,
}

#[derive(Debug, Subcommand)]
pub enum LookupCommand {
    /// Customer by name
    Customer { name: String },

    /// Project by name within a customer
    Project {
        name: String,
        #[arg(long)]
        customer: String,
    },

    /// Domain by name within a customer
    Domain {
        name: String,
        #[arg(long)]
        customer: String,
    },

    /// Network by name within a customer
    Network {
        name: String,
        #[arg(long)]
        customer: String,
    },

    /// Storage tier by name
    Tier {
        name: String,
        /// Solution type (default OCP)
        #[arg(long)]
        solution_type: Option<String>,
    },

    /// Template by name within a customer and region
    Template {
        name: String,
        #[arg(long)]
        customer: String,
        #[arg(long)]
        region: String,
        #[arg(long)]
        solution_type: Option<String>,
    },

    /// vCenter by name within a customer
    Vcenter {
        name: String,
        #[arg(long)]
        customer: String,
    },

    /// Data protection policy by note within a project
    #[command(name = "data-protection-policy", alias = "dpp")]
    DataProtectionPolicy {
        note: String,
        #[arg(long)]
        customer: String,
        #[arg(long)]
        project: String,
        #[arg(long)]
        solution_type: Option<String>,
    },
}

impl LookupCommand {
    /// Object kind named in output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Customer { .. } => "customer",
            Self::Project { .. } => "project",
            Self::Domain { .. } => "domain",
            Self::Network { .. } => "network",
            Self::Tier { .. } => "tier",
            Self::Template { .. } => "template",
            Self::Vcenter { .. } => "vcenter",
            Self::DataProtectionPolicy { .. } => "data_protection_policy",
        }
    }
}
