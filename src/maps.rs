use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;
use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::io::Read;
use std::num::NonZeroU32;
use std::ops::Range;
use std::path::Component;
use std::path::PathBuf;

use crate::Addr;
use crate::Error;
use crate::ErrorExt as _;
use crate::IntoError as _;
use crate::Result;


/// An enumeration identifying a process.
#[derive(Clone, Copy, Debug)]
pub enum Pid {
    /// The current process.
    Slf,
    /// The process identified by the provided ID.
    Pid(NonZeroU32),
}

impl Display for Pid {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Slf => write!(f, "self"),
            Self::Pid(pid) => write!(f, "{pid}"),
        }
    }
}

impl From<u32> for Pid {
    fn from(pid: u32) -> Self {
        NonZeroU32::new(pid).map(Pid::Pid).unwrap_or(Pid::Slf)
    }
}


/// The suffix the kernel appends to paths of files that got removed
/// while still being mapped.
const DELETED_SUFFIX: &str = " (deleted)";


#[derive(Debug)]
pub(crate) struct MapsEntry {
    /// The virtual address range covered by this entry.
    pub range: Range<Addr>,
    pub mode: u8,
    pub offset: u64,
    pub path: PathBuf,
}


/// Parse a line of a proc maps file.
fn parse_maps_line<'line>(line: &'line str) -> Result<MapsEntry> {
    let full_line = line;

    let split_once = |line: &'line str, component| -> Result<(&'line str, &'line str)> {
        line.split_once(|c: char| c.is_ascii_whitespace())
            .ok_or_invalid_data(|| {
                format!("failed to find {component} in proc maps line: {line}\n{full_line}")
            })
    };

    // Lines have the following format:
    // address           perms offset  dev   inode      pathname
    // 08048000-08049000 r-xp 00000000 03:00 8312       /opt/test
    // 0804a000-0806b000 rw-p 00000000 00:00 0          [heap]
    // a7cb1000-a7cb2000 ---p 00000000 00:00 0
    // a7ed5000-a8008000 r-xp 00000000 03:00 4222       /lib/libc.so.6
    let (address_str, line) = split_once(line, "address range")?;
    let (loaded_str, end_str) = address_str.split_once('-').ok_or_invalid_data(|| {
        format!("encountered malformed address range in proc maps line: {full_line}")
    })?;
    let loaded_address = Addr::from_str_radix(loaded_str, 16).map_err(|err| {
        Error::with_invalid_data(format!(
            "encountered malformed start address in proc maps line: {full_line}: {err}"
        ))
    })?;
    let end_address = Addr::from_str_radix(end_str, 16).map_err(|err| {
        Error::with_invalid_data(format!(
            "encountered malformed end address in proc maps line: {full_line}: {err}"
        ))
    })?;

    let (mode_str, line) = split_once(line, "permissions component")?;
    let mode = mode_str
        .chars()
        .fold(0, |mode, c| (mode << 1) | u8::from(c != '-'));

    let (offset_str, line) = split_once(line, "offset component")?;
    let offset = u64::from_str_radix(offset_str, 16).map_err(|err| {
        Error::with_invalid_data(format!(
            "encountered malformed offset component in proc maps line: {full_line}: {err}"
        ))
    })?;

    let (_dev, line) = split_once(line, "device component")?;
    // Note that by design, a path may not be present and so we may not be able
    // to successfully split.
    let path_str = split_once(line, "inode component")
        .map(|(_inode, line)| line.trim())
        .unwrap_or("");
    // Captured maps may well have been recorded on another system, so we
    // keep the path the file was mapped from for identification purposes.
    let path = PathBuf::from(path_str.strip_suffix(DELETED_SUFFIX).unwrap_or(path_str));

    let entry = MapsEntry {
        range: (loaded_address..end_address),
        mode,
        offset,
        path,
    };
    Ok(entry)
}


#[derive(Debug)]
struct MapsEntryIter<R> {
    reader: R,
    line: String,
}

impl<R> Iterator for MapsEntryIter<R>
where
    R: BufRead,
{
    type Item = Result<MapsEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let () = self.line.clear();
            match self.reader.read_line(&mut self.line) {
                Err(err) => return Some(Err(Error::from(err))),
                Ok(0) => break None,
                Ok(_) => {
                    let line_str = self.line.trim();
                    // There shouldn't be any empty lines, but we'd just ignore them. We
                    // need to trim anyway.
                    if !line_str.is_empty() {
                        let result = parse_maps_line(line_str);
                        break Some(result)
                    }
                }
            }
        }
    }
}


/// Parse a proc maps file from the provided reader.
pub(crate) fn parse_file<R>(reader: R) -> impl Iterator<Item = Result<MapsEntry>>
where
    R: Read,
{
    MapsEntryIter {
        reader: BufReader::new(reader),
        line: String::new(),
    }
}

/// Parse the maps file for the process with the given PID.
pub(crate) fn parse(pid: Pid) -> Result<impl Iterator<Item = Result<MapsEntry>>> {
    let path = format!("/proc/{pid}/maps");
    let file = File::open(&path).with_context(|| format!("failed to open `{path}`"))?;
    let iter = parse_file(file);
    Ok(iter)
}

/// A helper function checking whether a `MapsEntry` may contain code
/// belonging to a module. If that is not the case, it can be ignored
/// for the purpose of address resolution.
pub(crate) fn is_module_code(entry: &MapsEntry) -> bool {
    // Only entries with actual paths are of relevance.
    if entry.path.as_path().components().next() != Some(Component::RootDir) {
        return false
    }

    // Only entries that are executable and readable (r-x-) are of relevance.
    (entry.mode & 0b1010) == 0b1010
}
