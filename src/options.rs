//! Numeric option dictionaries.
//!
//! Front ends pass solver settings as a flat `name -> f64` map. Each config
//! type reads the keys it knows through an [`OptionReader`]; whatever is
//! left over afterwards is reported as [`ConfigError::UnknownOption`].

use std::collections::{BTreeMap, BTreeSet};

use crate::error::ConfigError;

/// Flat option dictionary. Booleans are encoded as `0.0` / non-zero.
pub type Options = BTreeMap<String, f64>;

/// Typed reader over an [`Options`] map that tracks consumed keys.
#[derive(Debug)]
pub struct OptionReader<'o> {
    options: &'o Options,
    consumed: BTreeSet<&'static str>,
}

impl<'o> OptionReader<'o> {
    pub fn new(options: &'o Options) -> Self {
        Self {
            options,
            consumed: BTreeSet::new(),
        }
    }

    /// Reads a finite real value.
    pub fn real(&mut self, key: &'static str) -> Result<Option<f64>, ConfigError> {
        self.consumed.insert(key);
        match self.options.get(key) {
            None => Ok(None),
            Some(&v) if v.is_finite() => Ok(Some(v)),
            Some(&v) => Err(invalid(key, format!("must be finite, got {v}"))),
        }
    }

    /// Reads a non-negative integer.
    pub fn count(&mut self, key: &'static str) -> Result<Option<usize>, ConfigError> {
        match self.real(key)? {
            None => Ok(None),
            Some(v) if v >= 0.0 && v.fract() == 0.0 => Ok(Some(v as usize)),
            Some(v) => Err(invalid(key, format!("must be a non-negative integer, got {v}"))),
        }
    }

    /// Reads a seed.
    pub fn seed(&mut self, key: &'static str) -> Result<Option<u64>, ConfigError> {
        Ok(self.count(key)?.map(|v| v as u64))
    }

    /// Reads a flag; any non-zero value is `true`.
    pub fn flag(&mut self, key: &'static str) -> Result<Option<bool>, ConfigError> {
        Ok(self.real(key)?.map(|v| v != 0.0))
    }

    /// Fails on the first key no reader asked for.
    pub fn finish(self, scope: &'static str) -> Result<(), ConfigError> {
        match self
            .options
            .keys()
            .find(|k| !self.consumed.contains(k.as_str()))
        {
            Some(key) => Err(ConfigError::UnknownOption {
                key: key.clone(),
                scope,
            }),
            None => Ok(()),
        }
    }
}

fn invalid(name: &'static str, reason: String) -> ConfigError {
    ConfigError::InvalidParameter { name, reason }
}
