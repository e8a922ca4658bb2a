//! Identity providers
//!
//! A provider answers one question: given an identity key, return one line
//! of text or fail. Two implementations are shipped:
//!
//! - [`DmidecodeProvider`] runs `dmidecode -s <keyword>` once per key
//! - [`SysfsProvider`] reads the kernel's `/sys/class/dmi/id` attributes
//!
//! Both cap the answer at [`MAX_ANSWER_LEN`] bytes and always consume the
//! remainder of the source before releasing it.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, ExitStatus, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::constants::limits::MAX_ANSWER_LEN;
use crate::constants::{paths, provider, timing};
use crate::error::{DmiError, Result};
use crate::identity::IdentityKey;

/// Source of raw identity answers
#[cfg_attr(test, mockall::automock)]
pub trait IdentityProvider {
    /// Query a single key. The answer may still carry its line terminator.
    fn query(&self, key: IdentityKey) -> Result<String>;
}

// ============================================================================
// Answer reading
// ============================================================================

/// Read at most `cap` bytes up to and including the first newline, then
/// drain whatever the source still has to say.
///
/// Bytes that are not valid UTF-8 are replaced with U+FFFD, so a Latin-1
/// answer such as `Caf\xe9` is kept as `"Caf\u{FFFD}"`. A multibyte
/// character cut by the cap is replaced the same way.
pub fn read_answer<R: Read>(source: R, cap: usize) -> io::Result<String> {
    let mut reader = BufReader::new(source);
    let mut answer = Vec::new();
    (&mut reader).take(cap as u64).read_until(b'\n', &mut answer)?;
    drain(&mut reader)?;
    Ok(String::from_utf8_lossy(&answer).into_owned())
}

/// Consume a source to EOF, discarding the bytes.
///
/// A writer blocked on a full pipe never exits, so waiting on it before
/// this returns would hang forever.
fn drain<R: Read>(reader: &mut R) -> io::Result<u64> {
    io::copy(reader, &mut io::sink())
}

// ============================================================================
// dmidecode
// ============================================================================

/// Queries identity strings through the dmidecode command
///
/// `command` is a command line split on whitespace: the first word is the
/// program and any further words are passed before `-s <keyword>`, so
/// `sudo dmidecode` works. No shell is involved.
#[derive(Debug, Clone)]
pub struct DmidecodeProvider {
    command: String,
    timeout: Duration,
    max_answer_len: usize,
}

impl Default for DmidecodeProvider {
    fn default() -> Self {
        Self::new(provider::DMIDECODE_COMMAND)
    }
}

impl DmidecodeProvider {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            timeout: timing::DEFAULT_PROVIDER_TIMEOUT,
            max_answer_len: MAX_ANSWER_LEN,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_answer_len(mut self, max_answer_len: usize) -> Self {
        self.max_answer_len = max_answer_len;
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl IdentityProvider for DmidecodeProvider {
    fn query(&self, key: IdentityKey) -> Result<String> {
        let channel = ProviderChannel::open(&self.command, key, self.timeout)?;
        channel.read_and_close(self.max_answer_len)
    }
}

/// One running dmidecode query.
///
/// Owns the child process. `read_and_close` is the normal exit: it reads the
/// answer, drains stdout to EOF and only then reaps the child. Any other exit
/// path (error, timeout, panic) goes through `Drop`, which kills and reaps.
/// A single deadline, taken at spawn, bounds both the read and the reap.
struct ProviderChannel {
    child: Option<Child>,
    key: IdentityKey,
    timeout: Duration,
    deadline: Instant,
}

impl ProviderChannel {
    fn open(command: &str, key: IdentityKey, timeout: Duration) -> Result<Self> {
        let mut words = command.split_whitespace();
        let program = words.next().ok_or_else(|| DmiError::ProviderSpawn {
            command: command.to_string(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "empty command"),
        })?;

        let child = Command::new(program)
            .args(words)
            .arg(provider::DMIDECODE_STRING_FLAG)
            .arg(key.provider_name())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| DmiError::ProviderSpawn {
                command: command.to_string(),
                source,
            })?;

        Ok(Self {
            child: Some(child),
            key,
            timeout,
            deadline: Instant::now() + timeout,
        })
    }

    fn read_and_close(mut self, cap: usize) -> Result<String> {
        let key = self.key;
        let stdout = self
            .child
            .as_mut()
            .and_then(|c| c.stdout.take())
            .ok_or_else(|| {
                DmiError::provider_read(
                    key.provider_name(),
                    io::Error::new(io::ErrorKind::BrokenPipe, "stdout not captured"),
                )
            })?;

        let answer = self.read_with_timeout(stdout, cap)?;
        let status = self.close()?;
        if !status.success() {
            return Err(DmiError::ProviderStatus {
                key: key.provider_name().to_string(),
                status,
            });
        }
        Ok(answer)
    }

    fn timed_out(&self) -> DmiError {
        DmiError::ProviderTimeout {
            key: self.key.provider_name().to_string(),
            timeout: self.timeout,
        }
    }

    /// The reader runs on its own thread so a silent provider cannot stall
    /// us past the deadline. On timeout the thread is abandoned; it finishes
    /// as soon as the killed child's pipe reaches EOF.
    fn read_with_timeout(&self, stdout: ChildStdout, cap: usize) -> Result<String> {
        let key = self.key.provider_name();
        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name(format!("dmi-read-{}", self.key.short_id()))
            .spawn(move || {
                let _ = tx.send(read_answer(stdout, cap));
            })
            .map_err(|e| DmiError::provider_read(key, e))?;

        let remaining = self.deadline.saturating_duration_since(Instant::now());
        match rx.recv_timeout(remaining) {
            Ok(result) => result.map_err(|e| DmiError::provider_read(key, e)),
            Err(mpsc::RecvTimeoutError::Timeout) => Err(self.timed_out()),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(DmiError::provider_read(
                key,
                io::Error::new(io::ErrorKind::Other, "reader thread exited without an answer"),
            )),
        }
    }

    /// Reap the child. Only called once stdout has been drained to EOF.
    ///
    /// A child can close stdout and keep running, so the exit is polled
    /// against the deadline. On expiry the child stays in `self.child` and
    /// `Drop` kills it.
    fn close(&mut self) -> Result<ExitStatus> {
        let key = self.key.provider_name();
        let child = self.child.as_mut().ok_or_else(|| {
            DmiError::provider_read(
                key,
                io::Error::new(io::ErrorKind::Other, "provider already closed"),
            )
        })?;

        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {}
                Err(e) => return Err(DmiError::provider_read(key, e)),
            }
            let now = Instant::now();
            if now >= self.deadline {
                debug!("{} closed stdout but did not exit in time", key);
                return Err(self.timed_out());
            }
            thread::sleep(timing::PROVIDER_POLL_INTERVAL.min(self.deadline - now));
        };

        self.child = None;
        Ok(status)
    }
}

impl Drop for ProviderChannel {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill() {
                warn!("Failed to kill dmidecode for {}: {}", self.key, e);
            }
            let _ = child.wait();
        }
    }
}

// ============================================================================
// sysfs
// ============================================================================

/// Reads identity strings from the kernel's DMI sysfs attributes
#[derive(Debug, Clone)]
pub struct SysfsProvider {
    root: PathBuf,
    max_answer_len: usize,
}

impl Default for SysfsProvider {
    fn default() -> Self {
        Self::new(paths::DMI_SYSFS_ROOT)
    }
}

impl SysfsProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_answer_len: MAX_ANSWER_LEN,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl IdentityProvider for SysfsProvider {
    fn query(&self, key: IdentityKey) -> Result<String> {
        let path = self.root.join(key.sysfs_attribute());
        let file = File::open(&path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => DmiError::AttributeNotFound(path.clone()),
            _ => DmiError::FileRead {
                path: path.clone(),
                source,
            },
        })?;
        debug!("Reading {} from {}", key, path.display());
        read_answer(file, self.max_answer_len).map_err(|source| DmiError::FileRead { path, source })
    }
}
