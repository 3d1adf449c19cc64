//! In-process [`Library`] holding datasets in memory.
//!
//! Reports failures with the same status codes libnetcdf uses, so datasets
//! and scoped helpers behave against it as they do against the C library.
//! Tests use its fault injection and call counters to observe exactly which
//! primitives ran.

use std::collections::{HashMap, HashSet};
use std::ffi::{CStr, OsStr};
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::warn;

use crate::error::NcError;
use crate::library::{Library, RawId, Status};
use crate::mode::{CreateFlags, Format, OpenFlags};
use crate::options::LibraryOptions;
use crate::status::{
    self, NC_EBADDIM, NC_EBADID, NC_EEXIST, NC_ENFILE, NC_ENOTATT, NC_ENOTNC, NC_ENOTVAR,
    NC_EPERM, NC_GLOBAL,
};

/// Largest file index that keeps an ncid positive.
const MAX_EXT: i32 = 0x7fff;

/// Primitives of [`Library`], for fault injection and call counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Open,
    Create,
    Close,
    Sync,
    InqNdims,
    InqNvars,
    InqNatts,
    InqFormat,
    InqUnlimdim,
    InqDimlen,
    InqDimname,
    InqVarname,
    InqAttlen,
}

/// Contents of one in-memory dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemDataset {
    pub format: Format,
    /// `(name, length)`; the index is the dimension id.
    pub dimensions: Vec<(String, usize)>,
    /// Index into `dimensions` of the record dimension.
    pub unlimited: Option<usize>,
    /// Variable names; the index is the variable id.
    pub variables: Vec<String>,
    /// Global attributes as `(name, number of values)`.
    pub attributes: Vec<(String, usize)>,
}

#[derive(Debug, Clone)]
enum Entry {
    Dataset(MemDataset),
    /// Something at the path that is not a dataset.
    Foreign,
}

#[derive(Debug)]
struct OpenEntry {
    path: PathBuf,
    writable: bool,
}

#[derive(Debug)]
struct MemState {
    files: HashMap<PathBuf, Entry>,
    read_only: HashSet<PathBuf>,
    open: HashMap<i32, OpenEntry>,
    next_ext: i32,
    max_open: Option<usize>,
    faults: HashMap<Primitive, i32>,
    calls: HashMap<Primitive, usize>,
}

impl MemState {
    /// Count the call and consume a pending fault for it.
    fn enter(&mut self, primitive: Primitive) -> Result<(), Status> {
        *self.calls.entry(primitive).or_insert(0) += 1;
        match self.faults.remove(&primitive) {
            Some(code) => Err(Status::new(code)),
            None => Ok(()),
        }
    }

    fn entry(&self, id: RawId) -> Result<&OpenEntry, Status> {
        self.open.get(&id.get()).ok_or(Status::new(NC_EBADID))
    }

    fn dataset(&self, id: RawId) -> Result<&MemDataset, Status> {
        let entry = self.entry(id)?;
        match self.files.get(&entry.path) {
            Some(Entry::Dataset(ds)) => Ok(ds),
            // Removed or replaced behind an open id.
            _ => Err(Status::new(NC_EBADID)),
        }
    }

    fn bind(&mut self, path: PathBuf, writable: bool) -> Result<RawId, Status> {
        if self.max_open.is_some_and(|max| self.open.len() >= max) {
            return Err(Status::new(NC_ENFILE));
        }
        // libnetcdf keeps the file index in the upper 16 bits of an ncid, so
        // indexes wrap and must skip any still in use.
        for _ in 0..MAX_EXT {
            let ext = self.next_ext;
            self.next_ext = if ext >= MAX_EXT { 1 } else { ext + 1 };
            let id = ext << 16;
            if !self.open.contains_key(&id) {
                self.open.insert(id, OpenEntry { path, writable });
                return Ok(RawId::new(id));
            }
        }
        Err(Status::new(NC_ENFILE))
    }
}

/// In-memory netCDF library.
#[derive(Debug)]
pub struct MemLibrary {
    state: Mutex<MemState>,
}

impl Default for MemLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl MemLibrary {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemState {
                files: HashMap::new(),
                read_only: HashSet::new(),
                open: HashMap::new(),
                next_ext: 1,
                max_open: None,
                faults: HashMap::new(),
                calls: HashMap::new(),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, MemState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Place a dataset at `path`, replacing whatever was there.
    pub fn seed(&self, path: impl AsRef<Path>, dataset: MemDataset) {
        self.state()
            .files
            .insert(path.as_ref().to_path_buf(), Entry::Dataset(dataset));
    }

    /// Place a file at `path` that is not a netCDF dataset.
    pub fn seed_foreign(&self, path: impl AsRef<Path>) {
        self.state()
            .files
            .insert(path.as_ref().to_path_buf(), Entry::Foreign);
    }

    /// Forbid (or allow again) writing to `path`.
    pub fn set_read_only(&self, path: impl AsRef<Path>, read_only: bool) {
        let path = path.as_ref().to_path_buf();
        let mut state = self.state();
        if read_only {
            state.read_only.insert(path);
        } else {
            state.read_only.remove(&path);
        }
    }

    /// Limit the number of simultaneously open ids.
    pub fn set_max_open(&self, max: Option<usize>) {
        self.state().max_open = max;
    }

    /// Make the next call of `primitive` fail with `code`.
    ///
    /// A failing close still releases its id, as `nc_close` does.
    pub fn fail_next(&self, primitive: Primitive, code: i32) {
        self.state().faults.insert(primitive, code);
    }

    /// Number of times `primitive` has been called.
    pub fn calls(&self, primitive: Primitive) -> usize {
        self.state().calls.get(&primitive).copied().unwrap_or(0)
    }

    /// Calls across all primitives. Status descriptions are not counted.
    pub fn total_calls(&self) -> usize {
        self.state().calls.values().sum()
    }

    /// Number of ids currently open.
    pub fn open_handles(&self) -> usize {
        self.state().open.len()
    }

    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        self.state().files.contains_key(path.as_ref())
    }

    /// Snapshot of the dataset at `path`.
    pub fn dataset(&self, path: impl AsRef<Path>) -> Option<MemDataset> {
        match self.state().files.get(path.as_ref()) {
            Some(Entry::Dataset(ds)) => Some(ds.clone()),
            _ => None,
        }
    }
}

fn to_path(path: &CStr) -> PathBuf {
    PathBuf::from(OsStr::from_bytes(path.to_bytes()))
}

fn to_count(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

impl Library for MemLibrary {
    fn name(&self) -> &str {
        "MEM"
    }

    fn configure(&mut self, options: &LibraryOptions) -> Result<(), NcError> {
        for (key, value) in options.for_prefix("mem") {
            match key {
                "max_open" => {
                    let max = value.as_usize()?;
                    self.set_max_open((max > 0).then_some(max));
                }
                unknown => {
                    warn!("unknown MEM option: mem.{unknown}");
                }
            }
        }
        Ok(())
    }

    fn open(&self, path: &CStr, flags: OpenFlags) -> Result<RawId, Status> {
        let mut state = self.state();
        state.enter(Primitive::Open)?;

        let path = to_path(path);
        let writable = flags.contains(OpenFlags::WRITE);
        match state.files.get(&path) {
            None => return Err(Status::new(libc::ENOENT)),
            Some(Entry::Foreign) => return Err(Status::new(NC_ENOTNC)),
            Some(Entry::Dataset(_)) => {}
        }
        if writable && state.read_only.contains(&path) {
            return Err(Status::new(libc::EACCES));
        }
        state.bind(path, writable)
    }

    fn create(&self, path: &CStr, flags: CreateFlags) -> Result<RawId, Status> {
        let mut state = self.state();
        state.enter(Primitive::Create)?;

        let path = to_path(path);
        if flags.contains(CreateFlags::NOCLOBBER) && state.files.contains_key(&path) {
            return Err(Status::new(NC_EEXIST));
        }
        if state.read_only.contains(&path) {
            return Err(Status::new(libc::EACCES));
        }

        let id = state.bind(path.clone(), true)?;
        let dataset = MemDataset {
            format: Format::from_flags(flags),
            ..MemDataset::default()
        };
        state.files.insert(path, Entry::Dataset(dataset));
        Ok(id)
    }

    fn close(&self, id: RawId) -> Result<(), Status> {
        let mut state = self.state();
        *state.calls.entry(Primitive::Close).or_insert(0) += 1;
        if state.open.remove(&id.get()).is_none() {
            return Err(Status::new(NC_EBADID));
        }
        match state.faults.remove(&Primitive::Close) {
            Some(code) => Err(Status::new(code)),
            None => Ok(()),
        }
    }

    fn sync(&self, id: RawId) -> Result<(), Status> {
        let mut state = self.state();
        state.enter(Primitive::Sync)?;
        if state.entry(id)?.writable {
            Ok(())
        } else {
            Err(Status::new(NC_EPERM))
        }
    }

    fn inq_ndims(&self, id: RawId) -> Result<i32, Status> {
        let mut state = self.state();
        state.enter(Primitive::InqNdims)?;
        Ok(to_count(state.dataset(id)?.dimensions.len()))
    }

    fn inq_nvars(&self, id: RawId) -> Result<i32, Status> {
        let mut state = self.state();
        state.enter(Primitive::InqNvars)?;
        Ok(to_count(state.dataset(id)?.variables.len()))
    }

    fn inq_natts(&self, id: RawId) -> Result<i32, Status> {
        let mut state = self.state();
        state.enter(Primitive::InqNatts)?;
        Ok(to_count(state.dataset(id)?.attributes.len()))
    }

    fn inq_format(&self, id: RawId) -> Result<i32, Status> {
        let mut state = self.state();
        state.enter(Primitive::InqFormat)?;
        Ok(state.dataset(id)?.format.code())
    }

    fn inq_unlimdim(&self, id: RawId) -> Result<i32, Status> {
        let mut state = self.state();
        state.enter(Primitive::InqUnlimdim)?;
        Ok(state.dataset(id)?.unlimited.map_or(-1, to_count))
    }

    fn inq_dimlen(&self, id: RawId, dimid: i32) -> Result<usize, Status> {
        let mut state = self.state();
        state.enter(Primitive::InqDimlen)?;
        let dims = &state.dataset(id)?.dimensions;
        let (_, len) = usize::try_from(dimid)
            .ok()
            .and_then(|i| dims.get(i))
            .ok_or(Status::new(NC_EBADDIM))?;
        Ok(*len)
    }

    fn inq_dimname(&self, id: RawId, dimid: i32) -> Result<String, Status> {
        let mut state = self.state();
        state.enter(Primitive::InqDimname)?;
        let dims = &state.dataset(id)?.dimensions;
        let (name, _) = usize::try_from(dimid)
            .ok()
            .and_then(|i| dims.get(i))
            .ok_or(Status::new(NC_EBADDIM))?;
        Ok(name.clone())
    }

    fn inq_varname(&self, id: RawId, varid: i32) -> Result<String, Status> {
        let mut state = self.state();
        state.enter(Primitive::InqVarname)?;
        let vars = &state.dataset(id)?.variables;
        usize::try_from(varid)
            .ok()
            .and_then(|i| vars.get(i))
            .cloned()
            .ok_or(Status::new(NC_ENOTVAR))
    }

    fn inq_attlen(&self, id: RawId, varid: i32, name: &CStr) -> Result<usize, Status> {
        let mut state = self.state();
        state.enter(Primitive::InqAttlen)?;
        let dataset = state.dataset(id)?;
        // Only global attributes are modelled.
        if varid != NC_GLOBAL {
            return Err(Status::new(NC_ENOTVAR));
        }
        let name = name.to_string_lossy();
        dataset
            .attributes
            .iter()
            .find(|(att, _)| *att == name)
            .map(|(_, len)| *len)
            .ok_or(Status::new(NC_ENOTATT))
    }

    fn describe_status(&self, code: i32) -> String {
        status::describe(code)
    }
}
