// Copyright 2025 CADOK Portal Team.
//
// SPDX-License-Identifier: AGPL-3.0-only
// Please see LICENSE in the repository root for full details.

use figment::Figment;
use serde::de::{DeserializeOwned, Error as _};

/// Error returned when loading or validating a section
pub type ConfigError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A part of the configuration, which can be loaded and checked on its own.
pub trait ConfigurationSection: Sized + DeserializeOwned {
    /// Where this section lives in the configuration file. `None` means the
    /// section is the whole file.
    const PATH: Option<&'static str> = None;

    /// Validate the configuration section
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid
    fn validate(&self, _figment: &Figment) -> Result<(), ConfigError> {
        Ok(())
    }

    /// Extract and validate the section.
    ///
    /// # Errors
    ///
    /// Returns an error if the section is missing, or if it is invalid
    fn extract(figment: &Figment) -> Result<Self, ConfigError> {
        let this: Self = match Self::PATH {
            Some(path) => figment.extract_inner(path)?,
            None => figment.extract()?,
        };

        this.validate(figment)?;
        Ok(this)
    }
}

/// Loading of sections which have sensible defaults
pub trait ConfigurationSectionExt: ConfigurationSection + Default {
    /// Like [`ConfigurationSection::extract`], but a missing section yields
    /// its default value.
    ///
    /// # Errors
    ///
    /// Returns an error if the section is present but invalid.
    fn extract_or_default(figment: &Figment) -> Result<Self, ConfigError> {
        match Self::PATH {
            Some(path) if !figment.contains(path) => Ok(Self::default()),
            _ => Self::extract(figment),
        }
    }
}

impl<T: ConfigurationSection + Default> ConfigurationSectionExt for T {}

/// Build a validation error pointing at the given key of a section
pub(crate) fn invalid(section: &str, key: &str, message: impl std::fmt::Display) -> ConfigError {
    figment::Error::custom(message)
        .with_path(&format!("{section}.{key}"))
        .into()
}
