//! Command-line surface.
//!
//! Chain flags are generated from the chain catalog, so the command is built at runtime.
//! Parsing yields the supplied options as `(name, value)` pairs in command-line order,
//! which is the form the [`crate::resolver`] consumes. Unregistered `--name[=value]`
//! options are set aside rather than rejected.
use std::ffi::OsString;

use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};

use metier_common::chain::Catalog;

/// Show usage.
pub const HELP: &str = "help";
/// Enable every supported chain.
pub const ALL: &str = "all";
/// Data directory.
pub const HOME: &str = "data_dir";
/// First of the two sync server ports.
pub const SYNC_SERVER: &str = "sync_server";
/// Address where sync clients reach the server.
pub const PUBLIC_ADDR: &str = "public_addr";
/// Block persistence level.
pub const BLOCK_STORAGE: &str = "block_storage";
/// Log level.
pub const LOG: &str = "log";

/// Options that take their value from the next argument when no `=` is given.
const VALUED: &[&str] = &[HOME, SYNC_SERVER, PUBLIC_ADDR, BLOCK_STORAGE, LOG];

/// The parsed command line.
#[derive(Debug, Clone)]
pub struct Options {
    /// Supplied options, in command-line order. Flags have an empty value.
    pub pairs: Vec<(String, String)>,
    /// Log level.
    pub log: log::Level,
    /// Names of unregistered options, which were skipped.
    pub ignored: Vec<String>,
}

impl Options {
    /// Parse the process arguments.
    pub fn from_env(catalog: &Catalog) -> Result<Self, clap::Error> {
        Self::parse(catalog, std::env::args_os())
    }

    /// Parse the given arguments. The first argument is the binary name.
    pub fn parse<I, T>(catalog: &Catalog, args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let cmd = command(catalog);
        let (args, ignored) = split(&cmd, args.into_iter().map(Into::into));
        let matches = cmd.try_get_matches_from(args)?;
        let log = matches
            .get_one::<log::Level>(LOG)
            .copied()
            .unwrap_or(log::Level::Info);

        Ok(Self {
            pairs: pairs(&matches),
            log,
            ignored,
        })
    }
}

/// Usage text.
pub fn usage(catalog: &Catalog) -> String {
    command(catalog).render_help().to_string()
}

/// Build the command, with one flag per chain in the catalog.
pub fn command(catalog: &Catalog) -> Command {
    let mut cmd = Command::new("metier-server")
        .about("Multi-chain blockchain sync server")
        .disable_help_flag(true)
        .args_override_self(true)
        .arg(
            Arg::new(HELP)
                .long(HELP)
                .action(ArgAction::SetTrue)
                .help("Display this message"),
        )
        .arg(
            Arg::new(HOME)
                .long(HOME)
                .allow_hyphen_values(true)
                .value_name("PATH")
                .num_args(1)
                .action(ArgAction::Append)
                .help("Path to data directory"),
        )
        .arg(
            Arg::new(SYNC_SERVER)
                .long(SYNC_SERVER)
                .allow_hyphen_values(true)
                .value_name("PORT")
                .num_args(1)
                .action(ArgAction::Append)
                .help("Starting TCP port to use for sync server. Two ports will be allocated."),
        )
        .arg(
            Arg::new(PUBLIC_ADDR)
                .long(PUBLIC_ADDR)
                .allow_hyphen_values(true)
                .value_name("ADDR")
                .num_args(1)
                .action(ArgAction::Append)
                .help(
                    "IP address or domain name where clients can connect to reach the sync \
                     server. Mandatory if --sync_server is specified.",
                ),
        )
        .arg(
            Arg::new(BLOCK_STORAGE)
                .long(BLOCK_STORAGE)
                .allow_hyphen_values(true)
                .value_name("LEVEL")
                .num_args(1)
                .action(ArgAction::Append)
                .help(
                    "Block persistence level.\n    0: do not save any blocks\n    1: save \
                     blocks downloaded by the wallet\n    2: download and save all blocks",
                ),
        )
        .arg(
            Arg::new(LOG)
                .long(LOG)
                .value_name("LEVEL")
                .allow_hyphen_values(true)
                .value_parser(|s: &str| s.parse::<log::Level>().map_err(|e| e.to_string()))
                .default_value("info")
                .help("Log level"),
        )
        .arg(
            Arg::new(ALL)
                .long(ALL)
                .action(ArgAction::SetTrue)
                .help(
                    "Enable all supported blockchains. Seed nodes may still be set by passing \
                     the option for the appropriate chain.",
                ),
        );

    for chain in catalog.chains() {
        let ticker = chain.ticker().to_lowercase();

        cmd = cmd.arg(
            Arg::new(ticker.clone())
                .long(ticker)
                .value_name("SEED")
                .num_args(0..=1)
                .require_equals(true)
                .default_missing_value("")
                .action(ArgAction::Append)
                .help(format!(
                    "Enable {} blockchain.\nOptionally specify ip address of seed node or \
                     \"off\" to disable",
                    chain
                )),
        );
    }
    cmd
}

/// Separate unregistered `--name[=value]` options from the arguments handed to the
/// command. Anything else, including stray values, is left for the command to reject.
fn split(
    cmd: &Command,
    args: impl IntoIterator<Item = OsString>,
) -> (Vec<OsString>, Vec<String>) {
    let mut kept = Vec::new();
    let mut ignored = Vec::new();
    let mut value_next = false;

    for (i, arg) in args.into_iter().enumerate() {
        if i == 0 || value_next {
            value_next = false;
            kept.push(arg);
            continue;
        }
        let option = arg
            .to_str()
            .and_then(|a| a.strip_prefix("--"))
            .filter(|a| !a.is_empty())
            .map(|a| match a.split_once('=') {
                Some((name, _)) => (name.to_owned(), true),
                None => (a.to_owned(), false),
            });

        match option {
            Some((name, inline)) => {
                if cmd.get_arguments().any(|a| a.get_long() == Some(name.as_str())) {
                    value_next = !inline && VALUED.contains(&name.as_str());
                    kept.push(arg);
                } else {
                    ignored.push(name);
                }
            }
            None => kept.push(arg),
        }
    }
    (kept, ignored)
}

/// Collect the options given on the command line, ordered by position.
fn pairs(matches: &ArgMatches) -> Vec<(String, String)> {
    let mut found = Vec::new();

    for id in matches.ids() {
        let name = id.as_str();

        if name == LOG || matches.value_source(name) != Some(ValueSource::CommandLine) {
            continue;
        }
        match name {
            // Repeated flags only keep their last position. Neither flag depends on how many
            // times it was given.
            HELP | ALL => {
                if let Some(ix) = matches.index_of(name) {
                    found.push((ix, name.to_owned(), String::new()));
                }
            }
            _ => {
                let (Some(indices), Some(values)) =
                    (matches.indices_of(name), matches.get_many::<String>(name))
                else {
                    continue;
                };
                for (ix, value) in indices.zip(values) {
                    found.push((ix, name.to_owned(), value.clone()));
                }
            }
        }
    }
    found.sort_by_key(|(ix, _, _)| *ix);
    found
        .into_iter()
        .map(|(_, name, value)| (name, value))
        .collect()
}
