//! Output Reconciliation
//!
//! Appends freshly generated candidates to an existing wordlist without
//! repeating lines it already holds. When the wordlist already had content,
//! the candidates it lacked are also written to a sibling `<stem>_new.txt`.

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::ReconcileError;

/// Output file name used when none is given.
pub fn default_output_path(identity: Option<&str>) -> PathBuf {
    match identity.map(str::trim).filter(|s| !s.is_empty()) {
        Some(identity) => PathBuf::from(format!(
            "wordlist_{}.txt",
            identity.to_lowercase().replace(' ', "_")
        )),
        None => PathBuf::from("wordforge_wordlist.txt"),
    }
}

/// `<dir>/<stem>_new.txt` next to `path`.
pub fn new_only_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{}_new.txt", stem))
}

/// Outcome of recording one candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Already in the wordlist, nothing written
    Known,
    /// Appended to the wordlist (and the new-only file, if any)
    New,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub processed: usize,
    pub new: usize,
    pub known: usize,
    /// New-only artifact, when one was written
    pub new_file: Option<PathBuf>,
}

/// Incremental writer that partitions candidates into known and new.
pub struct OutputReconciler {
    path: PathBuf,
    known: HashSet<String>,
    main: BufWriter<File>,
    new_only: Option<(PathBuf, BufWriter<File>)>,
    processed: usize,
    new: usize,
}

impl OutputReconciler {
    /// Load the existing wordlist at `path` (if any) and open it for
    /// appending.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ReconcileError> {
        let path = path.as_ref().to_path_buf();
        let existing = load_existing(&path)?;
        if existing.has_content() {
            tracing::info!(path = %path.display(), existing = existing.lines.len(), "Loaded existing wordlist");
        }
        if existing.undecodable > 0 {
            tracing::warn!(
                path = %path.display(),
                lines = existing.undecodable,
                "Existing wordlist has lines that are not UTF-8, they can never match a candidate"
            );
        }

        let new_only = if !existing.has_content() {
            None
        } else {
            let new_path = new_only_path(&path);
            let file = File::create(&new_path).map_err(|source| ReconcileError::Io {
                path: new_path.clone(),
                source,
            })?;
            tracing::info!(path = %new_path.display(), "New candidates will also be written here");
            Some((new_path, BufWriter::new(file)))
        };

        let main = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| ReconcileError::Io {
                path: path.clone(),
                source,
            })?;

        let mut main = BufWriter::new(main);
        if needs_line_break(&path) {
            writeln!(main).map_err(|source| ReconcileError::Io {
                path: path.clone(),
                source,
            })?;
        }

        Ok(Self {
            path,
            known: existing.lines,
            main,
            new_only,
            processed: 0,
            new: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lines already present before (or added during) this run.
    pub fn known_len(&self) -> usize {
        self.known.len()
    }

    /// Record one candidate, writing it out when it is new.
    pub fn record(&mut self, candidate: &str) -> Result<Disposition, ReconcileError> {
        self.processed += 1;
        if self.known.contains(candidate) {
            return Ok(Disposition::Known);
        }

        writeln!(self.main, "{}", candidate).map_err(|source| ReconcileError::Io {
            path: self.path.clone(),
            source,
        })?;
        if let Some((path, writer)) = &mut self.new_only {
            writeln!(writer, "{}", candidate).map_err(|source| ReconcileError::Io {
                path: path.clone(),
                source,
            })?;
        }

        self.known.insert(candidate.to_string());
        self.new += 1;
        Ok(Disposition::New)
    }

    /// Flush both outputs and summarize.
    pub fn finish(mut self) -> Result<ReconcileSummary, ReconcileError> {
        self.main.flush().map_err(|source| ReconcileError::Io {
            path: self.path.clone(),
            source,
        })?;

        let new_file = match self.new_only.take() {
            Some((path, mut writer)) => {
                writer.flush().map_err(|source| ReconcileError::Io {
                    path: path.clone(),
                    source,
                })?;
                Some(path)
            }
            None => None,
        };

        Ok(ReconcileSummary {
            processed: self.processed,
            new: self.new,
            known: self.processed - self.new,
            new_file,
        })
    }
}

/// True when `path` has content that does not end in a newline.
fn needs_line_break(path: &Path) -> bool {
    let last_byte = || -> std::io::Result<Option<u8>> {
        let mut file = File::open(path)?;
        if file.metadata()?.len() == 0 {
            return Ok(None);
        }
        file.seek(SeekFrom::End(-1))?;
        let mut byte = [0u8; 1];
        file.read_exact(&mut byte)?;
        Ok(Some(byte[0]))
    };
    matches!(last_byte(), Ok(Some(b)) if b != b'\n')
}

/// Lines of an existing wordlist
#[derive(Debug, Default)]
struct ExistingList {
    lines: HashSet<String>,
    /// Lines skipped because they are not valid UTF-8
    undecodable: usize,
}

impl ExistingList {
    fn has_content(&self) -> bool {
        !self.lines.is_empty() || self.undecodable > 0
    }
}

/// Read `path` line by line as bytes; wordlists in other encodings are common.
fn load_existing(path: &Path) -> Result<ExistingList, ReconcileError> {
    let io_err = |source: std::io::Error| ReconcileError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(ExistingList::default()),
        Err(source) => return Err(io_err(source)),
    };

    let mut existing = ExistingList::default();
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).map_err(io_err)? == 0 {
            break;
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }
        match std::str::from_utf8(&buf) {
            Ok(line) => {
                existing.lines.insert(line.to_string());
            }
            Err(_) => existing.undecodable += 1,
        }
    }
    Ok(existing)
}
