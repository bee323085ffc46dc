//! Durable passenger log.
//!
//! A `;`-delimited text file: a header line with the passenger attribute
//! names, then one line per passenger in registration order.
//!
//! ```text
//! name;surname
//! Elon;Musk
//! Yuri;Gagarin
//! ```
//!
//! The file is written in two ways: a row is appended whenever a passenger
//! registers, and an export rewrites the whole file from a registry snapshot.
//!
//! All writes go through one writer task that owns the [`PassengerLog`]:
//!
//! ```text
//! add_passenger ──► LogWriter::append ──┐
//!                                       ├──► channel ──► LogWriterTask (blocking pool)
//! export work ───► LogWriter::export ───┘                    │
//!        ▲                                                   ▼
//!        └──────────────── oneshot reply ─────────── PassengerLog::export
//! ```
//!
//! Commands are applied in the order they were queued. Callers queue while
//! holding the registry lock, so rows land in registration order and an
//! export is never overwritten by, nor overwrites, a registration queued
//! after it.

use flight_control_core::Passenger;
use flight_control_runtime::HealthCheck;
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

/// Column delimiter
pub const DELIMITER: &str = ";";

/// Errors writing the passenger log.
#[derive(Error, Debug)]
pub enum LogError {
    /// The file or its directory could not be written
    #[error("Failed to write passenger log {path}: {source}")]
    Io {
        /// File being written
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The writer task is gone and the command was not applied
    #[error("Passenger log writer has stopped")]
    WriterStopped,
}

/// Location of a finished export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportArtifact {
    /// Path of the written file
    pub path: PathBuf,
}

// ============================================================================
// File
// ============================================================================

/// The passenger log file.
///
/// Writes take `&mut self`; the file has exactly one writer.
#[derive(Debug)]
pub struct PassengerLog {
    path: PathBuf,
}

impl PassengerLog {
    /// Create a log writing to `path`. Nothing is touched until the first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the log file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Truncate the file and write the header.
    ///
    /// Creates the parent directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Io`] if the directory or file cannot be written.
    pub fn initialize(&mut self) -> Result<(), LogError> {
        self.rewrite(&[])
    }

    /// Append one passenger row.
    ///
    /// Writes the header first if the file does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Io`] if the file cannot be opened or written.
    pub fn append(&mut self, passenger: &Passenger) -> Result<(), LogError> {
        let needs_header = !self.path.exists();
        if needs_header {
            self.create_parent()?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;

        let mut line = String::new();
        if needs_header {
            line.push_str(&header());
        }
        line.push_str(&row(passenger));
        file.write_all(line.as_bytes()).map_err(|e| self.io_error(e))
    }

    /// Rewrite the whole file from `passengers`, in the given order.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Io`] if the directory or file cannot be written.
    pub fn export(&mut self, passengers: &[Passenger]) -> Result<ExportArtifact, LogError> {
        self.rewrite(passengers)?;

        tracing::info!(path = %self.path.display(), rows = passengers.len(), "Passenger log exported");
        Ok(ExportArtifact {
            path: self.path.clone(),
        })
    }

    fn rewrite(&self, passengers: &[Passenger]) -> Result<(), LogError> {
        self.create_parent()?;

        let file = File::create(&self.path).map_err(|e| self.io_error(e))?;
        let mut writer = BufWriter::new(file);

        writer
            .write_all(header().as_bytes())
            .map_err(|e| self.io_error(e))?;
        for passenger in passengers {
            writer
                .write_all(row(passenger).as_bytes())
                .map_err(|e| self.io_error(e))?;
        }
        writer.flush().map_err(|e| self.io_error(e))
    }

    fn create_parent(&self) -> Result<(), LogError> {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => {
                fs::create_dir_all(dir).map_err(|e| self.io_error(e))
            },
            _ => Ok(()),
        }
    }

    fn io_error(&self, source: io::Error) -> LogError {
        LogError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

fn header() -> String {
    let mut line = Passenger::FIELDS.join(DELIMITER);
    line.push('\n');
    line
}

fn row(passenger: &Passenger) -> String {
    let mut line = passenger.values().join(DELIMITER);
    line.push('\n');
    line
}

// ============================================================================
// Writer task
// ============================================================================

enum Command {
    Initialize(oneshot::Sender<Result<(), LogError>>),
    Flush(oneshot::Sender<()>),
    Append(Passenger),
    Export {
        passengers: Vec<Passenger>,
        reply: oneshot::Sender<Result<ExportArtifact, LogError>>,
    },
}

/// Handle for queueing writes to the passenger log.
///
/// Cheap to clone. Queueing never blocks and never touches the file system.
#[derive(Debug, Clone)]
pub struct LogWriter {
    path: PathBuf,
    commands: mpsc::UnboundedSender<Command>,
}

/// The task that owns the log file and applies queued commands in order.
///
/// Stops once every [`LogWriter`] clone has been dropped and the queue is drained.
#[derive(Debug)]
pub struct LogWriterTask {
    log: PassengerLog,
    commands: mpsc::UnboundedReceiver<Command>,
}

/// An export that has been queued but not yet written.
#[derive(Debug)]
#[must_use = "the export result is only available by awaiting `finish`"]
pub struct PendingExport {
    reply: oneshot::Receiver<Result<ExportArtifact, LogError>>,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialize(_) => f.write_str("Initialize"),
            Self::Flush(_) => f.write_str("Flush"),
            Self::Append(passenger) => f.debug_tuple("Append").field(passenger).finish(),
            Self::Export { passengers, .. } => f
                .debug_struct("Export")
                .field("rows", &passengers.len())
                .finish_non_exhaustive(),
        }
    }
}

impl LogWriter {
    /// Create a writer handle and the task that serves it, without starting the task.
    #[must_use]
    pub fn channel(log: PassengerLog) -> (Self, LogWriterTask) {
        let (commands, receiver) = mpsc::unbounded_channel();
        let writer = Self {
            path: log.path.clone(),
            commands,
        };
        (
            writer,
            LogWriterTask {
                log,
                commands: receiver,
            },
        )
    }

    /// Start the writer task on Tokio's blocking pool.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    #[must_use]
    pub fn spawn(log: PassengerLog) -> Self {
        let (writer, task) = Self::channel(log);
        tokio::task::spawn_blocking(move || task.run());
        writer
    }

    /// Path of the log file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Truncate the file and write the header, waiting for the result.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Io`] if the file cannot be written, or
    /// [`LogError::WriterStopped`] if the writer task is gone.
    pub async fn initialize(&self) -> Result<(), LogError> {
        let (reply, receiver) = oneshot::channel();
        self.commands
            .send(Command::Initialize(reply))
            .map_err(|_| LogError::WriterStopped)?;
        receiver.await.map_err(|_| LogError::WriterStopped)?
    }

    /// Wait until every command queued before this call has been applied.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::WriterStopped`] if the writer task is gone.
    pub async fn flush(&self) -> Result<(), LogError> {
        let (reply, receiver) = oneshot::channel();
        self.commands
            .send(Command::Flush(reply))
            .map_err(|_| LogError::WriterStopped)?;
        receiver.await.map_err(|_| LogError::WriterStopped)
    }

    /// Queue one passenger row.
    ///
    /// Failures are logged and counted in `passenger_log_write_failures_total`;
    /// they never reach the caller.
    pub fn append(&self, passenger: Passenger) {
        if self.commands.send(Command::Append(passenger)).is_err() {
            record_append_failure(&LogError::WriterStopped);
        }
    }

    /// Queue a full rewrite from `passengers`.
    ///
    /// The rewrite is ordered against every command queued before and after
    /// this call. Await [`PendingExport::finish`] for the artifact.
    pub fn export(&self, passengers: Vec<Passenger>) -> PendingExport {
        let (reply, receiver) = oneshot::channel();
        // A failed send drops the reply sender, so `finish` reports WriterStopped
        let _ = self.commands.send(Command::Export { passengers, reply });
        PendingExport { reply: receiver }
    }

    /// Whether the writer is running and the log directory exists.
    #[must_use]
    pub fn health(&self) -> HealthCheck {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let check = if self.commands.is_closed() {
            HealthCheck::unhealthy("passenger_log", "log writer has stopped")
        } else if dir.as_os_str().is_empty() || dir.is_dir() {
            HealthCheck::healthy("passenger_log")
        } else {
            HealthCheck::unhealthy(
                "passenger_log",
                format!("log directory {} does not exist", dir.display()),
            )
        };
        check.with_metadata("path", self.path.display().to_string())
    }
}

impl PendingExport {
    /// Wait until the rewrite has been applied.
    ///
    /// # Errors
    ///
    /// Returns [`LogError::Io`] if the file cannot be written, or
    /// [`LogError::WriterStopped`] if the writer task is gone.
    pub async fn finish(self) -> Result<ExportArtifact, LogError> {
        self.reply.await.map_err(|_| LogError::WriterStopped)?
    }
}

impl LogWriterTask {
    /// Apply commands until every writer handle is dropped.
    ///
    /// Blocks the calling thread; run it on the blocking pool or a dedicated thread.
    ///
    /// # Panics
    ///
    /// Panics if called from within an async context.
    pub fn run(mut self) {
        while let Some(command) = self.commands.blocking_recv() {
            match command {
                Command::Initialize(reply) => {
                    let result = self.log.initialize();
                    if result.is_ok() {
                        tracing::info!(path = %self.log.path().display(), "Passenger log initialized");
                    }
                    let _ = reply.send(result);
                },
                Command::Flush(reply) => {
                    let _ = reply.send(());
                },
                Command::Append(passenger) => {
                    if let Err(error) = self.log.append(&passenger) {
                        record_append_failure(&error);
                    }
                },
                Command::Export { passengers, reply } => {
                    let _ = reply.send(self.log.export(&passengers));
                },
            }
        }
        tracing::debug!("Passenger log writer stopped");
    }
}

fn record_append_failure(error: &LogError) {
    metrics::counter!("passenger_log_write_failures_total").increment(1);
    tracing::warn!(%error, "Failed to append passenger to log");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log_in(dir: &tempfile::TempDir) -> PassengerLog {
        PassengerLog::new(dir.path().join("log").join("passengers.csv"))
    }

    #[test]
    fn test_initialize_writes_header() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = log_in(&dir);

        log.initialize().unwrap();
        assert_eq!(fs::read_to_string(log.path()).unwrap(), "name;surname\n");
    }

    #[test]
    fn test_append_adds_rows_after_header() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = log_in(&dir);
        log.initialize().unwrap();

        log.append(&Passenger::new("Water", "Rock")).unwrap();
        log.append(&Passenger::new("Sally", "Ride")).unwrap();

        assert_eq!(
            fs::read_to_string(log.path()).unwrap(),
            "name;surname\nWater;Rock\nSally;Ride\n"
        );
    }

    #[test]
    fn test_append_without_initialize_creates_header() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = log_in(&dir);

        log.append(&Passenger::new("Yuri", "Gagarin")).unwrap();
        assert_eq!(
            fs::read_to_string(log.path()).unwrap(),
            "name;surname\nYuri;Gagarin\n"
        );
    }

    #[test]
    fn test_export_rewrites_instead_of_appending() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = log_in(&dir);
        log.initialize().unwrap();
        log.append(&Passenger::new("Stale", "Row")).unwrap();

        let passengers = vec![Passenger::new("Elon", "Musk"), Passenger::new("Yuri", "Gagarin")];
        let artifact = log.export(&passengers).unwrap();
        let artifact_again = log.export(&passengers).unwrap();

        assert_eq!(artifact, artifact_again);
        assert_eq!(artifact.path, log.path());
        assert_eq!(
            fs::read_to_string(&artifact.path).unwrap(),
            "name;surname\nElon;Musk\nYuri;Gagarin\n"
        );
    }

    #[test]
    fn test_export_into_unwritable_location_fails() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the log directory should be
        let blocker = dir.path().join("log");
        fs::write(&blocker, "not a directory").unwrap();

        let mut log = PassengerLog::new(blocker.join("passengers.csv"));
        let err = log.export(&[]).unwrap_err();
        assert!(matches!(err, LogError::Io { .. }));
    }

    #[tokio::test]
    async fn test_writer_applies_commands_in_queue_order() {
        let dir = tempfile::tempdir().unwrap();
        let (writer, task) = LogWriter::channel(log_in(&dir));

        // Queued before the task runs: nothing is written yet
        writer.append(Passenger::new("Stale", "Row"));
        let pending = writer.export(vec![Passenger::new("Elon", "Musk")]);
        writer.append(Passenger::new("Late", "Comer"));
        assert!(!writer.path().exists());

        tokio::task::spawn_blocking(move || task.run());
        let artifact = pending.finish().await.unwrap();
        writer.flush().await.unwrap();

        // The rewrite replaced the earlier row; the later append survived it
        assert_eq!(artifact.path, writer.path());
        assert_eq!(
            fs::read_to_string(writer.path()).unwrap(),
            "name;surname\nElon;Musk\nLate;Comer\n"
        );
    }

    #[tokio::test]
    async fn test_writer_health_and_stop() {
        let dir = tempfile::tempdir().unwrap();
        let (writer, task) = LogWriter::channel(log_in(&dir));

        // Directory does not exist yet
        assert!(writer.health().status.is_unhealthy());

        tokio::task::spawn_blocking(move || task.run());
        writer.initialize().await.unwrap();
        assert!(writer.health().status.is_healthy());
    }

    #[tokio::test]
    async fn test_stopped_writer_reports_errors() {
        let dir = tempfile::tempdir().unwrap();
        let (writer, task) = LogWriter::channel(log_in(&dir));
        drop(task);

        assert!(matches!(
            writer.initialize().await,
            Err(LogError::WriterStopped)
        ));
        assert!(matches!(
            writer.export(Vec::new()).finish().await,
            Err(LogError::WriterStopped)
        ));
        assert!(matches!(writer.flush().await, Err(LogError::WriterStopped)));
        assert!(writer.health().status.is_unhealthy());
    }
}
