use clap::Parser;
use std::path::PathBuf;

use crate::config::{ConfigError, LayoutConfig};
use crate::library::LibraryFilter;

/// Command line interface of skinny-ear
#[derive(Parser, Debug)]
#[command(name = "skinny-ear")]
#[command(about = "Removes duplicate libraries from enterprise archives with a skinny or communal WAR layout")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct SkinnyEarCli {
    /// Packed .ear file or exploded ear directory
    pub ear: Option<PathBuf>,

    /// YAML configuration file; flags override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Module that receives the shared libraries (default: the ear itself)
    #[arg(long, value_name = "MODULE")]
    pub communal_war: Option<String>,

    /// Library name prefix that is never moved (repeatable)
    #[arg(long = "pin", value_name = "PREFIX")]
    pub pinned: Vec<String>,

    /// Library name prefix that always goes to the ear library folder (repeatable)
    #[arg(long = "ear-lib", value_name = "PREFIX")]
    pub ear_libraries: Vec<String>,

    /// Unpacked copy of the ear to keep in step
    #[arg(long)]
    pub mirror: Option<PathBuf>,

    /// Prepend the shared libraries to every module's manifest Class-Path
    #[arg(long)]
    pub manifest_classpath: bool,

    /// Do not generate the WebLogic classloader-structure
    #[arg(long)]
    pub no_classloader_structure: bool,

    /// Leave AspectJ libraries out of the forced ear libraries
    #[arg(long)]
    pub no_force_aspectj: bool,

    /// Treat precondition failures as warnings and skip unwritable manifests
    #[arg(long)]
    pub lenient: bool,

    /// Show what would change without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Output format for the run report
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Enable verbose output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbosity: u8,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbosity")]
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl SkinnyEarCli {
    pub fn log_level(&self) -> tracing::Level {
        match (self.quiet, self.verbosity) {
            (true, _) => tracing::Level::WARN,
            (false, 0) => tracing::Level::INFO,
            (false, 1) => tracing::Level::DEBUG,
            (false, _) => tracing::Level::TRACE,
        }
    }

    /// Configuration file values with every given flag applied on top
    pub fn layout_config(&self) -> Result<LayoutConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => LayoutConfig::load(path)?,
            None => LayoutConfig::default(),
        };
        self.apply(&mut config);
        config.validate()?;
        Ok(config)
    }

    fn apply(&self, config: &mut LayoutConfig) {
        if let Some(ear) = &self.ear {
            config.ear = Some(ear.clone());
        }
        if let Some(mirror) = &self.mirror {
            config.mirror = Some(mirror.clone());
        }
        if let Some(module) = &self.communal_war {
            config.communal_module = Some(module.clone());
        }
        config
            .pinned_libraries
            .extend(self.pinned.iter().map(LibraryFilter::prefix));
        config
            .ear_libraries
            .extend(self.ear_libraries.iter().map(LibraryFilter::prefix));
        if self.manifest_classpath {
            config.add_to_manifest_classpath = true;
        }
        if self.no_classloader_structure {
            config.generate_classloader_structure = false;
        }
        if self.no_force_aspectj {
            config.force_aspectj_to_ear = false;
        }
        if self.lenient {
            config.strict = false;
        }
        if self.dry_run {
            config.dry_run = true;
        }
    }
}
