//! Library side of the `fpp` command: configuration, input discovery and
//! output writing, kept out of `main.rs` so they can be tested directly.

use anyhow::{Context, Result};
use fpp_translate::{translate, TranslateConfig, Translation};

pub mod config;
pub mod input;
pub mod output;

pub use config::{OutputConfig, ProjectConfig};

/// Load every dump named by `inputs` and translate them together.
pub fn translate_inputs(inputs: &[String], config: &TranslateConfig) -> Result<Translation> {
    let asts = input::load_all(inputs)?;
    translate(&asts, config).context("translation failed")
}
