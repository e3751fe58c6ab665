//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;
use tracing::warn;

use sparkbars::{Preset, VisualType};

#[derive(Parser, Debug)]
#[command(name = "sparkbars")]
#[command(about = "Terminal audio visualizer with spark-throwing bars", long_about = None)]
pub struct Args {
    /// TOML config file; missing sections use defaults
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Layout: bottom, top, middle, circle, circle-inner, circle-middle
    #[arg(long, value_name = "TYPE")]
    pub visual: Option<String>,

    /// Preset applied at startup: default, black-hole, space, light-show, fire, rain
    #[arg(long, value_name = "NAME")]
    pub preset: Option<String>,

    /// Log file, overrides the config's `log.file`
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

impl Args {
    pub fn visual_type(&self) -> Option<VisualType> {
        let name = self.visual.as_deref()?;
        let visual_type = VisualType::from_name(name);
        if visual_type.is_none() {
            warn!(name, "unknown visual type, keeping configured one");
        }
        visual_type
    }

    pub fn preset(&self) -> Option<Preset> {
        let name = self.preset.as_deref()?;
        let preset = Preset::from_name(name);
        if preset.is_none() {
            warn!(name, "unknown preset, ignoring");
        }
        preset
    }
}
