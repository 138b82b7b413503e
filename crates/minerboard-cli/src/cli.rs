//! CLI argument definitions for the minerboard dashboard.

use clap::{Parser, Subcommand};

/// Command-line interface for inspecting and managing a mining rig.
///
/// Configuration flags (`--miner-address`, `--miner-port`, ...) must come
/// before the subcommand; they are routed to the configuration loader.
#[derive(Parser, Debug)]
#[command(name = "minerboard", disable_help_subcommand = true)]
pub(crate) struct Cli {
    /// Pretty-prints the response instead of the compact envelope.
    #[arg(long, global = true)]
    pub(crate) debug: bool,
    /// The dashboard request to perform.
    #[command(subcommand)]
    pub(crate) command: CliCommand,
}

/// Dashboard requests.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub(crate) enum CliCommand {
    /// Prints device and pool statistics.
    Stats,
    /// Prints the miner and API versions.
    Version,
    /// Lists or manages mining pools.
    Pools {
        /// The pool action to perform.
        #[command(subcommand)]
        action: PoolAction,
    },
}

/// Pool management actions. Every action except `list` saves the miner
/// configuration afterwards.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub(crate) enum PoolAction {
    /// Lists configured pools.
    List,
    /// Adds a pool.
    Add {
        /// Pool URL, for example `stratum+tcp://pool.example:3333`.
        url: String,
        /// Worker user name.
        user: String,
        /// Worker password.
        pass: String,
    },
    /// Removes a pool.
    Remove {
        /// Pool id as reported by `pools list`.
        id: u32,
    },
    /// Gives a pool the highest priority.
    Top {
        /// Pool id as reported by `pools list`.
        id: u32,
    },
    /// Enables a pool.
    Enable {
        /// Pool id as reported by `pools list`.
        id: u32,
    },
    /// Disables a pool.
    Disable {
        /// Pool id as reported by `pools list`.
        id: u32,
    },
}
