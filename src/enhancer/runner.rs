//! Drives one layout run from precondition checks through the final archive sync

use std::path::Path;
use tracing::{debug, error, info, warn};

use super::chain::EnhancerChain;
use super::report::LayoutReport;
use super::EnhanceContext;
use crate::config::{ConfigError, LayoutConfig};
use crate::error::{LayoutError, Result};
use crate::module::{EarModule, ScanOptions};
use crate::vfs::{self, ArchiveVfs};

/// How a run ended when it did not fail
#[derive(Debug)]
pub enum RunStatus {
    Completed(LayoutReport),
    /// A warning-class failure was tolerated because `strict` is off
    Skipped { reason: String },
}

pub struct EarLayoutEnhancer {
    config: LayoutConfig,
    chain: EnhancerChain,
}

impl EarLayoutEnhancer {
    pub fn new(config: LayoutConfig) -> Self {
        let chain = EnhancerChain::from_config(&config);
        Self { config, chain }
    }

    pub fn with_chain(config: LayoutConfig, chain: EnhancerChain) -> Self {
        Self { config, chain }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Runs the chain and applies the strict policy to warning-class failures
    pub fn run(&self) -> Result<RunStatus> {
        match self.execute() {
            Ok(report) => Ok(RunStatus::Completed(report)),
            Err(err) if err.is_warning() && !self.config.strict => {
                warn!("{err}");
                Ok(RunStatus::Skipped {
                    reason: err.to_string(),
                })
            }
            Err(err) => Err(err),
        }
    }

    /// Checks preconditions, runs every step, and always syncs or releases the archives
    pub fn execute(&self) -> Result<LayoutReport> {
        let ear = self.config.ear.as_deref().ok_or_else(|| {
            LayoutError::Config(ConfigError::Invalid("no ear path configured".to_string()))
        })?;
        self.check_target(ear)?;

        let mut archives = ArchiveVfs::new()?;
        let result = self.enhance(&mut archives, ear);

        let synced = if self.config.dry_run {
            archives.release();
            Ok(0)
        } else {
            archives.sync()
        };

        match (result, synced) {
            (Ok(mut report), Ok(repacked)) => {
                report.repacked = repacked;
                info!("Layout of {} complete", ear.display());
                Ok(report)
            }
            (Ok(_), Err(source)) => Err(LayoutError::SyncFailed { source }),
            (Err(err), Ok(_)) => Err(err),
            (Err(err), Err(sync_err)) => {
                error!("Archive filesystem failed to sync cleanly: {sync_err}");
                Err(err)
            }
        }
    }

    fn check_target(&self, ear: &Path) -> Result<()> {
        if !ear.exists() {
            return Err(LayoutError::EarNotFound {
                path: ear.display().to_string(),
            });
        }
        let mirror = self.config.mirror.as_deref().filter(|mirror| mirror.exists());
        for path in std::iter::once(ear).chain(mirror) {
            if !vfs::can_read(path) || !vfs::can_write(path) {
                return Err(LayoutError::Permissions {
                    path: path.display().to_string(),
                });
            }
        }
        Ok(())
    }

    fn enhance(&self, archives: &mut ArchiveVfs, ear: &Path) -> Result<LayoutReport> {
        let scanned = EarModule::scan(
            archives,
            &ScanOptions {
                ear,
                mirror: self.config.mirror.as_deref(),
                library_dirs: &self.config.library_dirs,
            },
        )?;
        debug!(
            "Scanned {} with {} modules",
            scanned.name(),
            scanned.modules().len()
        );

        let mut report = LayoutReport::new(&scanned, self.config.dry_run);
        let mut ctx = EnhanceContext::new(Some(&scanned), &mut report, self.config.dry_run);
        let outcome = self.chain.enhance(&mut ctx)?;
        report.layout = Some(outcome);
        Ok(report)
    }
}
