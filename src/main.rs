mod cli;

use std::process::ExitCode;

use clap::Parser;
use exn::ResultExt;
use toucan_client::Config;
use toucan_client::error::ErrorKind;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref());

    let level = config.as_ref().map(|config| config.log.level.as_str()).unwrap_or("info");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    match config.or_raise(|| ErrorKind::Config).and_then(|config| cli::run(cli, config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("toucan: {err:?}");
            ExitCode::FAILURE
        },
    }
}
