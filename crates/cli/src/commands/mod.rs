// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};

mod config;
mod debug;
mod server;

#[derive(Parser, Debug)]
enum Subcommand {
    /// Configuration-related commands
    Config(self::config::Options),

    /// Runs the web server
    Server(self::server::Options),

    /// Debug utilities
    #[clap(hide = true)]
    Debug(self::debug::Options),
}

#[derive(Parser, Debug)]
#[command(version = crate::VERSION)]
pub struct Options {
    /// Path to the configuration file
    #[arg(short, long, global = true, action = clap::ArgAction::Append)]
    config: Vec<Utf8PathBuf>,

    #[command(subcommand)]
    subcommand: Option<Subcommand>,
}

impl Options {
    pub async fn run(self, figment: &Figment) -> anyhow::Result<ExitCode> {
        use Subcommand as S;
        match self.subcommand {
            Some(S::Config(c)) => Box::pin(c.run(figment)).await,
            Some(S::Server(c)) => Box::pin(c.run(figment)).await,
            Some(S::Debug(c)) => Box::pin(c.run(figment)).await,
            None => Box::pin(self::server::Options::default().run(figment)).await,
        }
    }

    /// Get a [`Figment`] instance with the configuration loaded
    pub fn figment(&self) -> Figment {
        let configs = if self.config.is_empty() {
            // Read the CADOK_CONFIG environment variable
            std::env::var("CADOK_CONFIG")
                // Default to "config.yaml"
                .unwrap_or_else(|_| "config.yaml".to_owned())
                // Split the file list on `:`
                .split(':')
                .map(Utf8PathBuf::from)
                .collect()
        } else {
            self.config.clone()
        };
        // Later files take precedence, and the environment overrides them all
        configs
            .into_iter()
            .fold(Figment::new(), |f, path| f.admerge(Yaml::file(path)))
            .merge(Env::prefixed("CADOK_").split("__"))
    }
}
