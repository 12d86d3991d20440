//! Map file reception: locate the map inside an inbound file, infer its
//! destination name and copy it into the map directory chunk by chunk.
//!
//! Everything here is blocking file I/O. The receive engine runs it on the
//! blocking thread pool, one operation per task.

use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use zip::ZipArchive;

use crate::models::receive::{CopyOutcome, ReceiveRequest};
use crate::models::settings::ConflictPolicy;

pub const MAP_EXTENSION: &str = ".map";
/// Copy chunk size: 64 KiB.
pub const COPY_BUFFER_SIZE: usize = 64 << 10;
/// OpenAndroMaps archives name their entries `<region>_oam.osm.map`.
const OAM_INFIX: &str = "_oam.osm.";
/// Suffix of the hidden file a map is copied to before it is moved in place.
const PART_EXTENSION: &str = ".part";

/// Destination file name and the label shown to the user (name without `.map`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapFileName {
    pub file_name: String,
    pub label: String,
}

impl MapFileName {
    fn from_file_name(file_name: String) -> Self {
        let label = file_name
            .strip_suffix(MAP_EXTENSION)
            .unwrap_or(&file_name)
            .to_string();
        Self { file_name, label }
    }
}

/// A map entry found inside a zip archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZipMapEntry {
    /// Entry name as stored in the archive.
    pub entry_name: String,
    /// Entry name with the OpenAndroMaps infix removed.
    pub file_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyEnd {
    Completed(u64),
    Cancelled(u64),
}

impl CopyEnd {
    pub fn bytes(self) -> u64 {
        match self {
            CopyEnd::Completed(n) | CopyEnd::Cancelled(n) => n,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiveResult {
    pub outcome: CopyOutcome,
    pub name: MapFileName,
    /// Written map file. Only set on success.
    pub destination: Option<PathBuf>,
    pub bytes_copied: u64,
}

impl ReceiveResult {
    fn new(
        outcome: CopyOutcome,
        name: MapFileName,
        destination: Option<PathBuf>,
        bytes_copied: u64,
    ) -> Self {
        Self {
            outcome,
            name,
            destination,
            bytes_copied,
        }
    }
}

/// Last path segment of a `/`-separated path.
fn filename_from_path(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// `map_<local timestamp>.map`, used when no name can be derived.
pub fn generated_map_name() -> String {
    format!(
        "map_{}{}",
        chrono::Local::now().format("%Y-%m-%d_%H-%M-%S"),
        MAP_EXTENSION
    )
}

/// Infer the destination file name.
///
/// Prefers a non-blank `preset`, then the source path. Only the last path
/// segment is kept and `.map` is appended unless already present. Falls back
/// to a generated name when neither yields a usable UTF-8 segment.
pub fn guess_filename(preset: Option<&str>, source: &Path) -> MapFileName {
    let candidate = match preset {
        Some(p) if !p.trim().is_empty() => p,
        // a path that is not valid UTF-8 would yield replacement characters
        _ => source.to_str().unwrap_or_default(),
    };
    let base = filename_from_path(candidate);
    let file_name = if base.trim().is_empty() {
        generated_map_name()
    } else if base.ends_with(MAP_EXTENSION) {
        base.to_string()
    } else {
        format!("{}{}", base, MAP_EXTENSION)
    };
    MapFileName::from_file_name(file_name)
}

/// `germany_oam.osm.map` -> `germany.map`.
pub fn strip_oam_infix(name: &str) -> String {
    match name.find(OAM_INFIX) {
        // keep the '.' that follows the infix
        Some(pos) => format!("{}{}", &name[..pos], &name[pos + OAM_INFIX.len() - 1..]),
        None => name.to_string(),
    }
}

/// Open `source` as a zip archive and return its first `.map` entry.
///
/// Sources that are not zip archives (or cannot be read) yield `None`.
pub fn find_map_entry(source: &Path) -> Option<ZipMapEntry> {
    let file = File::open(source).ok()?;
    let mut archive = ZipArchive::new(BufReader::new(file)).ok()?;
    for i in 0..archive.len() {
        let entry = match archive.by_index(i) {
            Ok(entry) => entry,
            Err(_) => continue,
        };
        if entry.is_dir() || !entry.name().ends_with(MAP_EXTENSION) {
            continue;
        }
        return Some(ZipMapEntry {
            entry_name: entry.name().to_string(),
            file_name: strip_oam_infix(entry.name()),
        });
    }
    None
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Final location of a received map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub path: PathBuf,
    pub name: MapFileName,
    /// An empty placeholder was created at `path` to claim the name.
    pub reserved: bool,
}

impl Destination {
    /// Hidden sibling of the destination the copy is written to.
    fn part_path(&self) -> PathBuf {
        let unique = uuid::Uuid::new_v4().simple().to_string();
        let part = format!(".{}.{}{}", self.name.file_name, unique, PART_EXTENSION);
        self.path.with_file_name(part)
    }

    /// Drop the placeholder of an unsuccessful receive.
    fn release(&self) {
        if self.reserved {
            remove_partial(&self.path);
        }
    }
}

/// Claim the destination inside `dir`.
///
/// Under [`ConflictPolicy::Overwrite`] an existing file is replaced only once
/// the copy succeeded, and never when it is the source itself. Otherwise the
/// first free name of `<label>.map`, `<label> (1).map`, ... is claimed with
/// an exclusive create, so concurrent receives never share a destination.
pub fn reserve_destination(
    dir: &Path,
    name: &MapFileName,
    policy: ConflictPolicy,
    source: &Path,
) -> std::io::Result<Destination> {
    let candidate = dir.join(&name.file_name);
    if policy == ConflictPolicy::Overwrite && !same_file(&candidate, source) {
        return Ok(Destination {
            path: candidate,
            name: name.clone(),
            reserved: false,
        });
    }
    let mut n: u32 = 0;
    loop {
        let renamed = if n == 0 {
            name.clone()
        } else {
            MapFileName::from_file_name(format!("{} ({}){}", name.label, n, MAP_EXTENSION))
        };
        let path = dir.join(&renamed.file_name);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => {
                return Ok(Destination {
                    path,
                    name: renamed,
                    reserved: true,
                })
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => n += 1,
            Err(e) => return Err(e),
        }
    }
}

/// Copy `reader` to `writer` in [`COPY_BUFFER_SIZE`] chunks.
///
/// `on_progress` receives the cumulative byte count after every chunk; an
/// empty input reports a single `0`. The cancel flag is checked before each
/// chunk.
pub fn copy_with_progress<R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
    cancel_flag: &AtomicBool,
    mut on_progress: impl FnMut(u64),
) -> std::io::Result<CopyEnd> {
    let mut buffer = vec![0u8; COPY_BUFFER_SIZE];
    let mut bytes_copied: u64 = 0;
    loop {
        if cancel_flag.load(Ordering::Relaxed) {
            return Ok(CopyEnd::Cancelled(bytes_copied));
        }
        let length = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        writer.write_all(&buffer[..length])?;
        bytes_copied += length as u64;
        on_progress(bytes_copied);
    }
    writer.flush()?;
    if bytes_copied == 0 {
        on_progress(0);
    }
    Ok(CopyEnd::Completed(bytes_copied))
}

/// Copy into the new file `destination`. Returns `Ok(None)` when the zip
/// entry has disappeared since probing.
fn copy_to_destination(
    source: File,
    zip_entry: Option<&ZipMapEntry>,
    destination: &Path,
    cancel_flag: &AtomicBool,
    on_progress: impl FnMut(u64),
) -> crate::error::Result<Option<CopyEnd>> {
    let part = OpenOptions::new().write(true).create_new(true).open(destination)?;
    let mut writer = BufWriter::new(part);
    let end = match zip_entry {
        Some(entry) => {
            let mut archive = ZipArchive::new(BufReader::new(source))?;
            let mut reader = match archive.by_name(&entry.entry_name) {
                Ok(reader) => reader,
                Err(zip::result::ZipError::FileNotFound) => return Ok(None),
                Err(e) => return Err(e.into()),
            };
            copy_with_progress(&mut reader, &mut writer, cancel_flag, on_progress)?
        }
        None => copy_with_progress(
            &mut BufReader::new(source),
            &mut writer,
            cancel_flag,
            on_progress,
        )?,
    };
    Ok(Some(end))
}

fn remove_partial(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        if e.kind() != ErrorKind::NotFound {
            log::warn!(
                "Removing partial map file '{}' failed: {}",
                path.to_string_lossy(),
                e
            );
        }
    }
}

/// Receive one map file into `map_dir`.
///
/// The copy goes to a hidden part file that is moved into place on success,
/// after which the source is deleted (failures are logged and ignored). On
/// cancellation or I/O failure only the part file and the name placeholder
/// are removed; a map already installed under the same name is kept, as is
/// the source.
pub fn receive_map_file(
    request: &ReceiveRequest,
    map_dir: &Path,
    policy: ConflictPolicy,
    cancel_flag: &AtomicBool,
    on_progress: impl FnMut(u64),
) -> ReceiveResult {
    let zip_entry = find_map_entry(&request.source);
    receive_entry(request, zip_entry, map_dir, policy, cancel_flag, on_progress)
}

/// Receive `request` with the zip entry already located.
fn receive_entry(
    request: &ReceiveRequest,
    zip_entry: Option<ZipMapEntry>,
    map_dir: &Path,
    policy: ConflictPolicy,
    cancel_flag: &AtomicBool,
    on_progress: impl FnMut(u64),
) -> ReceiveResult {
    let guessed = match &zip_entry {
        Some(entry) => guess_filename(Some(&entry.file_name), &request.source),
        None => guess_filename(request.file_name.as_deref(), &request.source),
    };
    log::debug!("start receiving map file: {}", guessed.file_name);

    let source = match File::open(&request.source) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return ReceiveResult::new(CopyOutcome::SourceNotFound, guessed, None, 0);
        }
        Err(e) => {
            log::error!("IO error on opening map file source: {}", e);
            return ReceiveResult::new(CopyOutcome::IoError, guessed, None, 0);
        }
    };

    let destination = match reserve_destination(map_dir, &guessed, policy, &request.source) {
        Ok(destination) => destination,
        Err(e) => {
            log::error!(
                "IO error on creating map file in '{}': {}",
                map_dir.to_string_lossy(),
                e
            );
            return ReceiveResult::new(CopyOutcome::IoError, guessed, None, 0);
        }
    };
    let part = destination.part_path();

    let copied = copy_to_destination(
        source,
        zip_entry.as_ref(),
        &part,
        cancel_flag,
        on_progress,
    );
    let name = destination.name.clone();
    match copied {
        Ok(Some(CopyEnd::Completed(bytes))) if !cancel_flag.load(Ordering::Relaxed) => {
            if let Err(e) = std::fs::rename(&part, &destination.path) {
                log::error!("IO error on moving map file into place: {}", e);
                remove_partial(&part);
                destination.release();
                return ReceiveResult::new(CopyOutcome::IoError, name, None, 0);
            }
            if let Err(e) = std::fs::remove_file(&request.source) {
                log::warn!(
                    "Deleting source '{}' failed, will be ignored: {}",
                    request.source.to_string_lossy(),
                    e
                );
            }
            ReceiveResult::new(CopyOutcome::Success, name, Some(destination.path), bytes)
        }
        Ok(Some(end)) => {
            remove_partial(&part);
            destination.release();
            ReceiveResult::new(CopyOutcome::Cancelled, name, None, end.bytes())
        }
        Ok(None) => {
            log::error!("Map entry vanished from archive: {:?}", zip_entry);
            remove_partial(&part);
            destination.release();
            ReceiveResult::new(CopyOutcome::Unknown, name, None, 0)
        }
        Err(e) => {
            log::error!("IO error on receiving map file: {}", e);
            remove_partial(&part);
            destination.release();
            ReceiveResult::new(CopyOutcome::IoError, name, None, 0)
        }
    }
}
