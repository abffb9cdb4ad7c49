//! [`Args`] definitions.

use clap::Parser;

/// Server of the bus ticketing system.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the configuration file.
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,

    /// Apply the database migrations and exit without serving requests.
    #[arg(long)]
    pub migrate_only: bool,
}

impl Args {
    /// Parses command line arguments.
    ///
    /// # Errors
    ///
    /// Errors if failed to parse command line arguments.
    pub fn parse() -> Result<Self, clap::Error> {
        <Self as Parser>::try_parse()
    }
}

#[cfg(test)]
mod spec {
    use clap::Parser as _;

    use super::Args;

    #[test]
    fn defaults_to_local_config() {
        let args = Args::try_parse_from(["application"]).unwrap();

        assert_eq!(args.config, "config.toml");
        assert!(!args.migrate_only);
    }

    #[test]
    fn parses_flags() {
        let args = Args::try_parse_from([
            "application",
            "-c",
            "prod.toml",
            "--migrate-only",
        ])
        .unwrap();

        assert_eq!(args.config, "prod.toml");
        assert!(args.migrate_only);
    }
}
