use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(about = "Update center client: browse the plugins published by the update center")]
struct Args {
    #[clap(subcommand)]
    pub command: Command,
    #[clap(flatten)]
    pub global_args: GlobalArgs,
}

#[derive(Clone, Debug, Default, clap::Args)]
pub struct GlobalArgs {
    /// Path to the configuration file
    #[clap(long, global = true, value_name = "FILE")]
    pub config: Option<String>,
    /// Update center URL. Overrides the configuration file
    #[clap(long, global = true)]
    pub url: Option<String>,
    /// Verbose mode. Logs to stderr at info level
    #[clap(long, short, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    #[clap(about = "Summary of the update center contents")]
    Show(RefreshCommand),
    #[clap(about = "List plugins and their last release")]
    Plugins(PluginsCommand),
    #[clap(about = "Proxy configuration used to reach the update center")]
    Proxies,
    #[clap(about = "Download and report when the update center was last refreshed")]
    Status(RefreshCommand),
}

#[derive(Parser)]
struct RefreshCommand {
    /// Download the update center even if the cached copy is fresh
    #[clap(long, short)]
    pub refresh: bool,
}

#[derive(Parser)]
struct PluginsCommand {
    /// Download the update center even if the cached copy is fresh
    #[clap(long, short)]
    pub refresh: bool,
    /// Output as JSON
    #[clap(long)]
    pub json: bool,
    /// Only releases compatible with this platform version
    #[clap(long, value_name = "VERSION")]
    pub sonar_version: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CliOptions {
    Show { refresh: bool },
    Plugins(PluginsOptions),
    Proxies,
    Status { refresh: bool },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PluginsOptions {
    pub refresh: bool,
    pub json: bool,
    pub sonar_version: Option<String>,
}

impl From<PluginsCommand> for PluginsOptions {
    fn from(command: PluginsCommand) -> Self {
        PluginsOptions {
            refresh: command.refresh,
            json: command.json,
            sonar_version: command.sonar_version,
        }
    }
}

pub struct OptionArgs {
    pub cli_options: CliOptions,
    pub cli_args: GlobalArgs,
}

impl From<Args> for OptionArgs {
    fn from(args: Args) -> Self {
        let cli_options = match args.command {
            Command::Show(sub_matches) => CliOptions::Show {
                refresh: sub_matches.refresh,
            },
            Command::Plugins(sub_matches) => CliOptions::Plugins(sub_matches.into()),
            Command::Proxies => CliOptions::Proxies,
            Command::Status(sub_matches) => CliOptions::Status {
                refresh: sub_matches.refresh,
            },
        };
        OptionArgs {
            cli_options,
            cli_args: args.global_args,
        }
    }
}

pub fn parse_cli() -> OptionArgs {
    Args::parse().into()
}
