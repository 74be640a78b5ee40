#[macro_use]
extern crate tracing;

use std::ffi::OsStr;
use std::fs;
use std::path::Path;

use miette::{Context as _, IntoDiagnostic as _};

#[macro_use]
mod macros;

pub mod recognition;
pub mod utils;

pub use crate::recognition::{Buffering, FitMethod, Recognition};
pub use crate::utils::FloatOrInt;
use crate::recognition::{BufferingPart, RecognitionPart};
use crate::utils::MergeWith;

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Config {
    pub recognition: Recognition,
    pub buffering: Buffering,
}

#[derive(knuffel::Decode, Debug, Default, Clone, Copy, PartialEq)]
pub struct ConfigPart {
    #[knuffel(child)]
    pub recognition: Option<RecognitionPart>,
    #[knuffel(child)]
    pub buffering: Option<BufferingPart>,
}

impl Config {
    pub fn load(path: &Path) -> miette::Result<Self> {
        let contents = fs::read_to_string(path)
            .into_diagnostic()
            .with_context(|| format!("error reading {path:?}"))?;

        let config = Self::parse(
            path.file_name()
                .and_then(OsStr::to_str)
                .unwrap_or("config.kdl"),
            &contents,
        )
        .context("error parsing")?;
        debug!("loaded config from {path:?}");
        Ok(config)
    }

    pub fn parse(filename: &str, text: &str) -> Result<Self, knuffel::Error> {
        let _span = tracy_client::span!("Config::parse");
        let part: ConfigPart = knuffel::parse(filename, text)?;
        Ok(Self::from_part(&part))
    }
}

impl MergeWith<ConfigPart> for Config {
    fn merge_with(&mut self, part: &ConfigPart) {
        merge!((self, part), recognition, buffering);
    }
}
