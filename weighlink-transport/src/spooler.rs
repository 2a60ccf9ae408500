//! OS print-spooler transport
//!
//! There is no persistent connection: every `send` hands the payload to an
//! external helper as `<helper> <printer name> <file>`. The helper is
//! located once, when the strategy is created.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, trace, warn};
use weighlink_types::{ConnectionConfig, TransportKind};

use crate::{error::*, ConnectionState, ConnectionStrategy};

/// File name of the raw-print helper
#[cfg(windows)]
pub const HELPER_NAME: &str = "RawPrint.exe";

/// File name of the raw-print helper
#[cfg(not(windows))]
pub const HELPER_NAME: &str = "rawprint";

/// Locations searched for the helper, in order:
/// the working directory's resource folder, the packaged resources next to
/// the executable, then the folder above the executable.
pub fn helper_candidates() -> Vec<PathBuf> {
    let relative = Path::new("resources").join("printer").join(HELPER_NAME);
    let mut candidates = Vec::with_capacity(3);

    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd.join(&relative));
    }

    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        candidates.push(exe_dir.join(&relative));
        candidates.push(exe_dir.join("..").join(&relative));
    }

    candidates
}

/// First existing helper among [`helper_candidates`]
pub fn locate_helper(candidates: &[PathBuf]) -> Option<PathBuf> {
    let found = candidates.iter().find(|p| p.is_file()).cloned();

    match &found {
        Some(path) => info!("Spooler using helper {}", path.display()),
        None => warn!("{} not found in {:?}", HELPER_NAME, candidates),
    }

    found
}

/// Spooler strategy
pub struct SpoolerStrategy {
    helper: Option<PathBuf>,
    searched: Vec<PathBuf>,
    driver_name: Option<String>,
    state: ConnectionState,
}

impl SpoolerStrategy {
    /// Create new spooler strategy, searching the default helper locations
    pub fn new() -> Self {
        let searched = helper_candidates();
        Self {
            helper: locate_helper(&searched),
            searched,
            driver_name: None,
            state: ConnectionState::Disconnected,
        }
    }

    /// Use an explicit helper executable
    pub fn with_helper(helper: impl Into<PathBuf>) -> Self {
        let helper = helper.into();
        Self {
            searched: vec![helper.clone()],
            helper: Some(helper),
            driver_name: None,
            state: ConnectionState::Disconnected,
        }
    }

    pub fn helper(&self) -> Option<&Path> {
        self.helper.as_deref()
    }

    async fn invoke_helper(helper: &Path, printer: &str, file: &Path) -> Result<()> {
        debug!("Spawning {} {:?} {:?}", helper.display(), printer, file);

        let output = Command::new(helper)
            .arg(printer)
            .arg(file)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| Error::HelperSpawn {
                path: helper.to_path_buf(),
                source,
            })?;

        if output.status.success() {
            return Ok(());
        }

        Err(Error::HelperFailed {
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

impl Default for SpoolerStrategy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConnectionStrategy for SpoolerStrategy {
    async fn connect(&mut self, config: &ConnectionConfig) -> Result<()> {
        // Nothing to open; validate on every call
        self.driver_name = None;
        self.state = ConnectionState::Disconnected;

        let driver_name = config.require_driver_name()?;

        if self.helper.is_none() {
            return Err(Error::HelperNotFound {
                searched: self.searched.clone(),
            });
        }

        self.driver_name = Some(driver_name.to_string());
        self.state = ConnectionState::Connected;
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        self.driver_name = None;
        self.state = ConnectionState::Disconnected;
        Ok(())
    }

    async fn send(&mut self, data: &[u8]) -> Result<()> {
        let (Some(helper), Some(printer)) = (self.helper.as_deref(), self.driver_name.as_deref())
        else {
            return Err(Error::NotConnected);
        };
        if self.state != ConnectionState::Connected {
            return Err(Error::NotConnected);
        }

        let mut file = tempfile::Builder::new()
            .prefix("weighlink_")
            .suffix(".bin")
            .tempfile()?;
        file.write_all(data)?;
        file.flush()?;

        // Close our handle so the helper can open the file; the path still
        // deletes itself when dropped
        let path = file.into_temp_path();
        trace!("Wrote {} bytes to {}", data.len(), path.display());

        let result = Self::invoke_helper(helper, printer, &path).await;

        if let Err(e) = path.close() {
            warn!("Failed to clean up temp print file: {}", e);
        }

        result
    }

    fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected && self.driver_name.is_some()
    }

    fn state(&self) -> ConnectionState {
        self.state
    }

    fn kind(&self) -> TransportKind {
        TransportKind::Spooler
    }

    fn target(&self) -> String {
        self.driver_name
            .clone()
            .unwrap_or_else(|| "<unconfigured>".to_string())
    }
}
