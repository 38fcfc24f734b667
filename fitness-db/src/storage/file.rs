//! Collection file I/O.
//!
//! Each collection lives in its own file inside the data directory. A file
//! body (the payload) is a `u64` record count followed by that many records.
//! With `FileFormat::Checksummed` the payload is framed as:
//!
//! ```text
//! [magic: 8 bytes "FITNESDB"][version: u32][payload][crc32(payload): u32]
//! ```
//!
//! Files are always rewritten whole.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::config::FileFormat;
use crate::storage::btree::BTree;
use crate::storage::codec::{CodecError, Reader, Record, write_records, write_u64};

pub const EXERCISES_FILE: &str = "exercises.dat";
pub const USERS_FILE: &str = "users.dat";
pub const WORKOUTS_FILE: &str = "workouts.dat";
pub const QUESTS_FILE: &str = "quests.dat";
pub const EMAIL_INDEX_FILE: &str = "email_index.dat";
pub const GRAPH_FILE: &str = "graph.dat";
pub const PRIORITY_QUEUE_FILE: &str = "priority_queue.dat";

/// Every data file, in the order they are written.
pub const DATA_FILES: [&str; 7] = [
    EXERCISES_FILE,
    USERS_FILE,
    WORKOUTS_FILE,
    QUESTS_FILE,
    EMAIL_INDEX_FILE,
    GRAPH_FILE,
    PRIORITY_QUEUE_FILE,
];

/// Magic number opening a checksummed file.
pub const MAGIC: [u8; 8] = *b"FITNESDB";

/// Current checksummed format version.
pub const FORMAT_VERSION: u32 = 1;

/// Magic + version.
const FRAME_HEADER_SIZE: usize = 12;

/// Trailing CRC-32.
const FRAME_TRAILER_SIZE: usize = 4;

/// Tree files announcing more records than this load as empty.
pub const MAX_TREE_RECORDS: u64 = 1_000_000;

/// Auxiliary files announcing this many records or more load as empty.
pub const MAX_LIST_RECORDS: u64 = 100_000;

/// Create the data directory (and parents) if needed.
pub fn ensure_directory(path: &Path) -> Result<(), FileError> {
    fs::create_dir_all(path).map_err(FileError::Io)
}

/// Write a collection payload to `path`, replacing the previous contents.
///
/// With `atomic` set the bytes go to `<path>.tmp` first, are synced, and the
/// temp file is renamed over the target. Otherwise the target is truncated
/// and rewritten in place.
pub fn write_collection(
    path: &Path,
    payload: &[u8],
    format: FileFormat,
    atomic: bool,
) -> Result<(), FileError> {
    let bytes = frame(payload, format);

    if atomic {
        let tmp_path = temp_path(path);
        let mut file = File::create(&tmp_path).map_err(FileError::Io)?;
        file.write_all(&bytes).map_err(FileError::Io)?;
        file.sync_all().map_err(FileError::Io)?;
        fs::rename(&tmp_path, path).map_err(FileError::Io)?;
    } else {
        let mut file = File::create(path).map_err(FileError::Io)?;
        file.write_all(&bytes).map_err(FileError::Io)?;
    }

    Ok(())
}

/// Read a collection payload from `path`.
///
/// Returns `Ok(None)` if the file does not exist, and
/// `FileError::FormatMismatch` if the file was written in the other format.
/// A legacy payload never starts with `MAGIC`: read as a record count it
/// would be far above `MAX_TREE_RECORDS`.
pub fn read_collection(path: &Path, format: FileFormat) -> Result<Option<Vec<u8>>, FileError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(FileError::Io(e)),
    };

    match format {
        FileFormat::Legacy => {
            if bytes.starts_with(&MAGIC) {
                return Err(FileError::FormatMismatch { configured: format });
            }
            Ok(Some(bytes))
        }
        FileFormat::Checksummed => {
            // A prefix of the magic (or nothing) is a torn frame, not another format
            if !bytes.starts_with(&MAGIC) && !MAGIC.starts_with(&bytes) {
                return Err(FileError::FormatMismatch { configured: format });
            }
            unframe(&bytes).map(|payload| Some(payload.to_vec()))
        }
    }
}

/// Delete a file, ignoring a missing one.
///
/// Returns whether a file was removed.
pub fn remove_if_exists(path: &Path) -> Result<bool, FileError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(FileError::Io(e)),
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn frame(payload: &[u8], format: FileFormat) -> Vec<u8> {
    match format {
        FileFormat::Legacy => payload.to_vec(),
        FileFormat::Checksummed => {
            let mut bytes =
                Vec::with_capacity(FRAME_HEADER_SIZE + payload.len() + FRAME_TRAILER_SIZE);
            bytes.extend_from_slice(&MAGIC);
            bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
            bytes.extend_from_slice(payload);
            bytes.extend_from_slice(&crc32fast::hash(payload).to_le_bytes());
            bytes
        }
    }
}

/// Strip the frame from `bytes`. The magic has already been checked.
fn unframe(bytes: &[u8]) -> Result<&[u8], FileError> {
    if bytes.len() < FRAME_HEADER_SIZE + FRAME_TRAILER_SIZE {
        return Err(FileError::TooShort(bytes.len()));
    }

    let version = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
    if version != FORMAT_VERSION {
        return Err(FileError::UnsupportedVersion(version));
    }

    let trailer_at = bytes.len() - FRAME_TRAILER_SIZE;
    let payload = &bytes[FRAME_HEADER_SIZE..trailer_at];
    let stored = u32::from_le_bytes([
        bytes[trailer_at],
        bytes[trailer_at + 1],
        bytes[trailer_at + 2],
        bytes[trailer_at + 3],
    ]);
    let computed = crc32fast::hash(payload);
    if stored != computed {
        return Err(FileError::ChecksumMismatch { stored, computed });
    }

    Ok(payload)
}

/// Encode a tree as `<count>` followed by `<key><record>` pairs in key order.
#[must_use]
pub fn encode_tree<V: Record>(tree: &BTree<String, V>) -> Vec<u8> {
    let mut buf = Vec::new();
    write_u64(&mut buf, tree.len() as u64);
    for (key, value) in tree.iter() {
        key.encode(&mut buf);
        value.encode(&mut buf);
    }
    buf
}

/// Encode a list as `<count>` followed by its records.
#[must_use]
pub fn encode_list<T: Record>(items: &[T]) -> Vec<u8> {
    let mut buf = Vec::new();
    write_records(&mut buf, items);
    buf
}

/// What came out of decoding one collection payload.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Record count announced by the header.
    pub announced: u64,
    /// Records actually decoded.
    pub loaded: usize,
    /// Why decoding stopped early, if it did.
    pub error: Option<CodecError>,
    /// The announced count was implausible and the payload was ignored.
    pub rejected: bool,
}

impl LoadReport {
    /// Check if everything the header announced was loaded.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.error.is_none() && !self.rejected
    }
}

/// Replay a tree payload into `tree` through ordinary inserts.
///
/// Decoding stops at the first malformed record; the records before it are
/// kept.
pub fn decode_tree<V: Record>(payload: &[u8], tree: &mut BTree<String, V>) -> LoadReport {
    let mut reader = Reader::new(payload);
    let mut report = LoadReport::default();

    match reader.read_u64() {
        Ok(count) => report.announced = count,
        Err(e) => {
            report.error = Some(e);
            return report;
        }
    }
    if report.announced > MAX_TREE_RECORDS {
        report.rejected = true;
        return report;
    }

    for _ in 0..report.announced {
        let record = String::decode(&mut reader)
            .and_then(|key| V::decode(&mut reader).map(|value| (key, value)));
        match record {
            Ok((key, value)) => {
                tree.insert(key, value);
                report.loaded += 1;
            }
            Err(e) => {
                report.error = Some(e);
                break;
            }
        }
    }

    report
}

/// Decode a list payload.
///
/// Decoding stops at the first malformed record; the records before it are
/// kept.
pub fn decode_list<T: Record>(payload: &[u8]) -> (Vec<T>, LoadReport) {
    let mut reader = Reader::new(payload);
    let mut report = LoadReport::default();
    let mut items = Vec::new();

    match reader.read_u64() {
        Ok(count) => report.announced = count,
        Err(e) => {
            report.error = Some(e);
            return (items, report);
        }
    }
    if report.announced >= MAX_LIST_RECORDS {
        report.rejected = true;
        return (items, report);
    }

    for _ in 0..report.announced {
        match T::decode(&mut reader) {
            Ok(item) => items.push(item),
            Err(e) => {
                report.error = Some(e);
                break;
            }
        }
    }
    report.loaded = items.len();

    (items, report)
}

/// Errors that can occur during file operations.
#[derive(Debug)]
pub enum FileError {
    /// I/O error.
    Io(std::io::Error),
    /// File too short to hold a checksummed frame.
    TooShort(usize),
    /// The file was written in the other format.
    FormatMismatch { configured: FileFormat },
    /// Unsupported format version.
    UnsupportedVersion(u32),
    /// Payload does not match its checksum.
    ChecksumMismatch { stored: u32, computed: u32 },
}

impl FileError {
    /// Check if the error means the file contents are damaged, as opposed to
    /// unreadable or written by a different configuration.
    #[must_use]
    pub const fn is_corruption(&self) -> bool {
        matches!(self, Self::TooShort(_) | Self::ChecksumMismatch { .. })
    }
}

impl std::fmt::Display for FileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::TooShort(len) => write!(f, "file too short for a checksummed frame: {len} bytes"),
            Self::FormatMismatch { configured } => {
                write!(f, "file is not in the configured {configured} format")
            }
            Self::UnsupportedVersion(v) => write!(f, "unsupported format version: {v}"),
            Self::ChecksumMismatch { stored, computed } => write!(
                f,
                "checksum mismatch: stored {stored:#010x}, computed {computed:#010x}"
            ),
        }
    }
}

impl std::error::Error for FileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::TooShort(_)
            | Self::FormatMismatch { .. }
            | Self::UnsupportedVersion(_)
            | Self::ChecksumMismatch { .. } => None,
        }
    }
}

impl From<std::io::Error> for FileError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
