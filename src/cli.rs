use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "ki",
    version,
    about = "An interactive terminal controller for local KIND clusters."
)]
pub struct CliArgs {
    /// Path or name of the kind binary
    #[arg(long)]
    pub kind_bin: Option<String>,

    /// Path or name of the kubectl binary
    #[arg(long)]
    pub kubectl_bin: Option<String>,

    /// Seconds before a status message is cleared
    #[arg(long)]
    pub status_clear_secs: Option<u64>,

    /// Do not list clusters on startup
    #[arg(long)]
    pub no_initial_refresh: bool,

    /// tracing filter (for example: info,debug,trace)
    #[arg(long, default_value = "info")]
    pub log_filter: String,

    /// Append logs to this file instead of discarding them
    #[arg(long)]
    pub log_file: Option<std::path::PathBuf>,
}
