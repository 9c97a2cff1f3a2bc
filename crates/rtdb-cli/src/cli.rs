use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "rtdb",
    about = "Read and write a hierarchical JSON store from the shell",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// TOML file with client settings.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Database URL; overrides the config file.
    #[arg(long, global = true, env = "RTDB_URL")]
    pub url: Option<String>,

    /// Bearer token sent with every request.
    #[arg(long, global = true, env = "RTDB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Abort a command that takes longer than this.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the value at a path
    Get(GetArgs),
    /// Overwrite the value at a path
    Set(SetArgs),
    /// Write several children of a path at once
    Update(UpdateArgs),
    /// Append a value under a generated key
    Push(PushArgs),
    /// Remove the value at a path
    Delete(PathArgs),
    /// Atomically add to a numeric counter
    Incr(IncrArgs),
    /// Delete an app instance ID and its data
    DeleteIid(DeleteIidArgs),
}

#[derive(Args)]
pub struct PathArgs {
    pub path: String,
}

#[derive(Args)]
pub struct GetArgs {
    pub path: String,
    /// Also print the value's ETag.
    #[arg(long)]
    pub etag: bool,
    /// Only print the value if it no longer matches this ETag.
    #[arg(long)]
    pub if_changed: Option<String>,
}

#[derive(Args)]
pub struct SetArgs {
    pub path: String,
    /// JSON value.
    pub value: String,
    /// Only write if the value still matches this ETag.
    #[arg(long)]
    pub if_match: Option<String>,
}

#[derive(Args)]
pub struct UpdateArgs {
    pub path: String,
    /// JSON object mapping relative child paths to values.
    pub values: String,
}

#[derive(Args)]
pub struct PushArgs {
    pub path: String,
    /// JSON value; an empty string is stored when omitted.
    pub value: Option<String>,
}

#[derive(Args)]
pub struct IncrArgs {
    pub path: String,
    #[arg(long, default_value = "1", allow_negative_numbers = true)]
    pub by: i64,
}

#[derive(Args)]
pub struct DeleteIidArgs {
    pub iid: String,
    #[arg(long)]
    pub project: String,
    #[arg(long)]
    pub endpoint: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_incr_with_negative_step() {
        let cli = Cli::try_parse_from(["rtdb", "incr", "counters/hits", "--by", "-3"]).unwrap();
        match cli.command {
            Command::Incr(args) => {
                assert_eq!(args.path, "counters/hits");
                assert_eq!(args.by, -3);
            }
            _ => panic!("expected incr"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["rtdb", "get", "users", "--etag", "--timeout-ms", "250"])
            .unwrap();
        assert_eq!(cli.timeout_ms, Some(250));
        assert!(matches!(cli.command, Command::Get(GetArgs { etag: true, .. })));
    }
}
