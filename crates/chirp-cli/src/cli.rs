use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "chirp",
    about = "Chirp: a tiny directory of users and their posts",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server
    Serve(ServeArgs),
    /// Print the effective configuration as TOML
    CheckConfig(ConfigArgs),
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to listen on (overrides the config file)
    #[arg(short, long)]
    pub bind: Option<SocketAddr>,

    /// Persist users and posts in this SQLite file
    #[arg(long, conflicts_with = "memory")]
    pub db: Option<PathBuf>,

    /// Keep everything in memory
    #[arg(long)]
    pub memory: bool,
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_serve_with_db() {
        let cli = Cli::parse_from(["chirp", "serve", "--db", "users.db", "-b", "0.0.0.0:8080"]);
        let Command::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.config.db, Some(PathBuf::from("users.db")));
        assert_eq!(args.config.bind.unwrap().port(), 8080);
        assert!(!cli.verbose);
    }

    #[test]
    fn db_and_memory_conflict() {
        let parsed = Cli::try_parse_from(["chirp", "serve", "--db", "x.db", "--memory"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn verbose_is_global() {
        let cli = Cli::parse_from(["chirp", "check-config", "-v"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::CheckConfig(_)));
    }
}
