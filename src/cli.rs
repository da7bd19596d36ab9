use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use exn::{OptionExt, ResultExt};
use toucan_client::error::{ErrorKind, Result};
use toucan_client::{Config, SmallAppRequester, ToucanClient, upload};

#[derive(Debug, Parser)]
#[command(name = "toucan", version, about = "Talk to Toucan Toco small apps")]
pub struct Cli {
    /// Config file (TOML, YAML or JSON). Defaults to the user config directory.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Instance to talk to. Defaults to the first configured one.
    #[arg(long, global = true)]
    pub instance: Option<String>,
    /// Overrides the configured stage.
    #[arg(long, global = true)]
    pub stage: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Send one request and print the status and body.
    Request {
        /// get, post, put or delete.
        verb: String,
        /// Resource path relative to the instance, e.g. `config/etl`.
        path: String,
    },
    /// Load every table of the instance and list them.
    Extract {
        /// Delete the cache directory first, so the tables are downloaded again.
        #[arg(long)]
        purge: bool,
    },
    /// Upload a local file.
    Upload { kind: UploadKind, file: PathBuf },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum UploadKind {
    FrontConfig,
    EtlConfig,
    PreprocessValidation,
    Augment,
    Permissions,
    NotificationsHandler,
    DataSource,
    Template,
}

pub fn run(cli: Cli, mut config: Config) -> Result<()> {
    if let Some(stage) = cli.stage {
        config.stage = Some(stage);
    }
    let name = cli
        .instance
        .or_else(|| config.instances.first().cloned())
        .ok_or_raise(|| ErrorKind::UnknownInstance(String::new()))?;
    if !config.instances.contains(&name) {
        config.instances.push(name.clone());
    }
    let mut client = ToucanClient::from_config(&config)?;
    let requester = client.instance(&name)?;

    match cli.command {
        Command::Request { verb, path } => {
            let response = requester.path(&path).segment(verb).call()?;
            println!("{}", response.status);
            println!("{}", String::from_utf8_lossy(&response.content));
        },
        Command::Extract { purge } => {
            if purge {
                requester.purge_cache()?;
            }
            for (table_name, table) in requester.dfs()? {
                println!("{table_name}\t{} rows\t{}", table.num_rows(), table.column_names().join(","));
            }
        },
        Command::Upload { kind, file } => {
            let response = upload_file(requester, kind, &file)?;
            println!("{}", response.status);
            response.error_for_status().or_raise(|| ErrorKind::Dispatch)?;
        },
    }
    Ok(())
}

fn upload_file(
    requester: &SmallAppRequester,
    kind: UploadKind,
    file: &std::path::Path,
) -> Result<toucan_client::Response> {
    match kind {
        UploadKind::FrontConfig => upload::upload_front_config(requester, file),
        UploadKind::EtlConfig => upload::upload_etl_config(requester, file),
        UploadKind::PreprocessValidation => upload::upload_preprocess_validation(requester, file),
        UploadKind::Augment => upload::upload_augment_py(requester, file),
        UploadKind::Permissions => upload::upload_permissions_py(requester, file),
        UploadKind::NotificationsHandler => upload::upload_notifications_handler(requester, file),
        UploadKind::DataSource => upload::upload_data_source(requester, file),
        UploadKind::Template => upload::upload_template(requester, file),
    }
}
