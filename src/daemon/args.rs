use std::path::PathBuf;

use clap::Parser;
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(name = "screentime-daemon", version, about = "Records foreground application usage")]
pub struct DaemonArgs {
    /// Run in the current process instead of detaching.
    #[arg(long)]
    pub force: bool,
    #[arg(long)]
    pub dir: Option<PathBuf>,
    /// This option is for debugging purposes only.
    #[arg(long = "log-console")]
    pub log_console: bool,
    #[arg(long = "log-filter")]
    pub log: Option<LevelFilter>,
    /// How often, in seconds, the usage log is written to disk.
    #[arg(
        long = "save-interval",
        default_value_t = 60,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub save_interval: u64,
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::DaemonArgs;

    #[test]
    fn test_defaults() {
        let args = DaemonArgs::parse_from(["screentime-daemon"]);
        assert!(!args.force);
        assert_eq!(args.save_interval, 60);
        assert!(args.dir.is_none());
    }

    #[test]
    fn test_rejects_zero_save_interval() {
        assert!(DaemonArgs::try_parse_from(["screentime-daemon", "--save-interval", "0"]).is_err());
    }
}
