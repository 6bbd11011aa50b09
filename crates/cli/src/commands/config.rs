// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use std::process::ExitCode;

use camino::Utf8PathBuf;
use cadok_config::{ConfigurationSection, RootConfig};
use clap::Parser;
use figment::Figment;
use rand::SeedableRng;
use tokio::io::AsyncWriteExt;
use tracing::{info, info_span};

#[derive(Parser, Debug)]
pub(super) struct Options {
    #[command(subcommand)]
    subcommand: Subcommand,
}

#[derive(Parser, Debug)]
enum Subcommand {
    /// Dump the current config as YAML
    Dump {
        /// Where to write the configuration. Defaults to the standard output
        #[clap(short, long)]
        output: Option<Utf8PathBuf>,
    },

    /// Check a config file
    Check,

    /// Generate a new config file, with a fresh session secret
    Generate {
        /// Where to write the configuration. Defaults to the standard output
        #[clap(short, long)]
        output: Option<Utf8PathBuf>,
    },
}

async fn write_out(output: Option<Utf8PathBuf>, config: &RootConfig) -> anyhow::Result<()> {
    let config = serde_yaml::to_string(config)?;

    if let Some(output) = output {
        info!("Writing configuration to {output:?}");
        let mut file = tokio::fs::File::create(output).await?;
        file.write_all(config.as_bytes()).await?;
    } else {
        info!("Writing configuration to standard output");
        tokio::io::stdout().write_all(config.as_bytes()).await?;
    }

    Ok(())
}

impl Options {
    pub async fn run(self, figment: &Figment) -> anyhow::Result<ExitCode> {
        use Subcommand as SC;
        match self.subcommand {
            SC::Dump { output } => {
                let _span = info_span!("cli.config.dump").entered();

                let config = RootConfig::extract(figment).map_err(anyhow::Error::from_boxed)?;
                write_out(output, &config).await?;
            }

            SC::Check => {
                let _span = info_span!("cli.config.check").entered();

                let _config = RootConfig::extract(figment).map_err(anyhow::Error::from_boxed)?;
                info!("Configuration file looks good");
            }

            SC::Generate { output } => {
                let _span = info_span!("cli.config.generate").entered();

                let mut rng = rand_chacha::ChaChaRng::from_entropy();
                let config = RootConfig::generate(&mut rng);
                write_out(output, &config).await?;
            }
        }

        Ok(ExitCode::SUCCESS)
    }
}
