use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use tracing::{debug, info};
use wavetap_core::{CaptureConfig, SessionSummary, constants::DEFAULT_OUTPUT_DIR};
use wavetap_serial::{SampleSink, TransportError};

use crate::error::{StorageError, StorageResult};
use crate::format::write_capture;

/// Default file name prefix for captures.
pub const DEFAULT_FILE_PREFIX: &str = "acoustic_data";

/// Capture writer configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureWriterConfig {
    /// Directory receiving the capture files
    pub output_dir: PathBuf,

    /// File name prefix; files are named `<prefix>_<YYYYmmdd_HHMMSS>.txt`
    pub file_prefix: String,

    /// Whether to create the output directory if it doesn't exist
    pub create_if_missing: bool,
}

impl Default for CaptureWriterConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            create_if_missing: true,
        }
    }
}

impl CaptureWriterConfig {
    /// Create a new configuration writing into `output_dir`
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            ..Default::default()
        }
    }

    /// Set the file name prefix
    pub fn file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.file_prefix = prefix.into();
        self
    }

    /// Set whether to create the output directory if it doesn't exist
    pub fn create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }
}

impl From<&CaptureConfig> for CaptureWriterConfig {
    fn from(config: &CaptureConfig) -> Self {
        Self::new(config.output_dir.clone())
    }
}

/// Writes flushed sessions to timestamped capture files.
///
/// Each non-empty session becomes one file. Two sessions flushed within the
/// same second get distinct names: the second file is suffixed `_1`, the
/// next `_2`, and so on. Files are opened with `create_new`, so an existing
/// capture is never overwritten.
///
/// # Example
///
/// ```no_run
/// use wavetap_core::SessionSummary;
/// use wavetap_storage::{CaptureWriter, CaptureWriterConfig};
///
/// # fn example() -> wavetap_storage::StorageResult<()> {
/// let mut writer = CaptureWriter::new(CaptureWriterConfig::new("acoustic_data"))?;
/// let session = SessionSummary { samples: vec![1, 2, 3], frames: 1 };
///
/// if let Some(path) = writer.save(&session)? {
///     println!("saved {}", path.display());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct CaptureWriter {
    config: CaptureWriterConfig,
    files_written: u64,
}

impl CaptureWriter {
    /// Create a writer, preparing the output directory.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidDirectory` if the output path exists but
    /// is not a directory, or an I/O error if it is missing and may not be
    /// created.
    pub fn new(config: CaptureWriterConfig) -> StorageResult<Self> {
        let dir = &config.output_dir;

        if !dir.exists() && config.create_if_missing {
            fs::create_dir_all(dir)?;
            debug!("Created output directory {}", dir.display());
        }

        if !fs::metadata(dir)?.is_dir() {
            return Err(StorageError::InvalidDirectory(dir.clone()));
        }

        Ok(Self {
            config,
            files_written: 0,
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.config.output_dir
    }

    /// Number of capture files written by this writer.
    pub fn files_written(&self) -> u64 {
        self.files_written
    }

    /// Save a session stamped with the current local time.
    ///
    /// Returns the path written, or `None` for an empty session.
    pub fn save(&mut self, session: &SessionSummary) -> StorageResult<Option<PathBuf>> {
        self.save_at(session, Local::now().naive_local())
    }

    /// Save a session with an explicit timestamp.
    pub fn save_at(
        &mut self,
        session: &SessionSummary,
        timestamp: NaiveDateTime,
    ) -> StorageResult<Option<PathBuf>> {
        if session.is_empty() {
            debug!("Skipping empty session");
            return Ok(None);
        }

        let (path, file) = self.create_unique(&timestamp)?;
        let mut out = BufWriter::new(file);
        write_capture(&mut out, session, &timestamp)?;
        out.flush()?;

        self.files_written += 1;
        info!(
            "Saved {} samples from {} packets to {}",
            session.sample_count(),
            session.frames,
            path.display()
        );
        Ok(Some(path))
    }

    fn create_unique(&self, timestamp: &NaiveDateTime) -> StorageResult<(PathBuf, File)> {
        let stem = format!(
            "{}_{}",
            self.config.file_prefix,
            timestamp.format("%Y%m%d_%H%M%S")
        );

        let mut attempt = 0u32;
        loop {
            let name = if attempt == 0 {
                format!("{stem}.txt")
            } else {
                format!("{stem}_{attempt}.txt")
            };
            let path = self.config.output_dir.join(name);

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl SampleSink for CaptureWriter {
    fn on_session_flush(&mut self, session: &SessionSummary) -> Result<(), TransportError> {
        self.save(session)?;
        Ok(())
    }
}
