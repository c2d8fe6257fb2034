use std::path::PathBuf;

use argh::FromArgs;

#[derive(Debug, Clone, FromArgs)]
#[argh(description = "Lumen explorer indexer")]
pub struct Args {
    #[argh(option, short = 'c', description = "path to TOML configuration")]
    pub config_file: PathBuf,

    #[argh(
        option,
        description = "network preset overriding the config (mainnet, testnet, devnet)"
    )]
    pub network: Option<String>,

    #[argh(
        option,
        description = "logging verbosity (trace, debug, info, warn, error); default info"
    )]
    pub verbosity: Option<String>,

    #[argh(option, description = "log output format (text, json); default text")]
    pub log_format: Option<String>,

    #[argh(option, description = "write logs to this file instead of stdout")]
    pub log_file: Option<PathBuf>,

    #[argh(option, description = "enable ANSI colour in log output; default true")]
    pub log_color: Option<bool>,

    #[argh(switch, short = 'V', description = "print version and exit")]
    pub version: bool,
}
