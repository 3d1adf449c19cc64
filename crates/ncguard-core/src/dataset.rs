use std::cell::Cell;
use std::ffi::CString;
use std::fmt;
use std::marker::PhantomData;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ErrorContext, NcError, classify};
use crate::library::{Library, RawId, Status};
use crate::mode::{AccessMode, CreationMode, Format};
use crate::status::{NC_EINVAL, NC_GLOBAL};

/// An open netCDF dataset.
///
/// Owns one library id from a successful open or create until [`close`] or
/// drop. Every inquiry on a closed dataset fails with [`NcError::NotOpen`]
/// without calling into the library.
///
/// `Dataset` is never `Sync`: the library may not be entered concurrently for
/// one id, so sharing a dataset between threads needs an outside lock.
///
/// [`close`]: Dataset::close
pub struct Dataset<'lib, L: Library + ?Sized> {
    lib: &'lib L,
    id: RawId,
    path: PathBuf,
    open: bool,
    _not_sync: PhantomData<Cell<()>>,
}

impl<'lib, L: Library + ?Sized> Dataset<'lib, L> {
    /// Open an existing dataset read-only.
    pub fn open_for_reading(lib: &'lib L, path: impl AsRef<Path>) -> Result<Self, NcError> {
        Self::open(lib, path, AccessMode::Read)
    }

    /// Open an existing dataset for reading and writing.
    pub fn open_for_writing(lib: &'lib L, path: impl AsRef<Path>) -> Result<Self, NcError> {
        Self::open(lib, path, AccessMode::Write)
    }

    /// Open an existing dataset with an explicit access mode.
    pub fn open(lib: &'lib L, path: impl AsRef<Path>, mode: AccessMode) -> Result<Self, NcError> {
        let path = path.as_ref();
        let cpath = path_to_cstring(lib, path)?;

        let id = lib
            .open(&cpath, mode.flags())
            .map_err(|status| status_error(lib, status, ErrorContext::Path(path)))?;

        debug!(library = lib.name(), path = %path.display(), ?mode, "opened dataset");
        Ok(Self::bind(lib, id, path))
    }

    /// Create a classic-format dataset.
    pub fn create(lib: &'lib L, path: impl AsRef<Path>, mode: CreationMode) -> Result<Self, NcError> {
        Self::create_with_format(lib, path, mode, Format::Classic)
    }

    /// Create a dataset in the given on-disk format.
    pub fn create_with_format(
        lib: &'lib L,
        path: impl AsRef<Path>,
        mode: CreationMode,
        format: Format,
    ) -> Result<Self, NcError> {
        let path = path.as_ref();
        let cpath = path_to_cstring(lib, path)?;

        let id = lib
            .create(&cpath, mode.flags() | format.flags())
            .map_err(|status| status_error(lib, status, ErrorContext::Path(path)))?;

        debug!(library = lib.name(), path = %path.display(), ?mode, %format, "created dataset");
        Ok(Self::bind(lib, id, path))
    }

    fn bind(lib: &'lib L, id: RawId, path: &Path) -> Self {
        Self {
            lib,
            id,
            path: path.to_path_buf(),
            open: true,
            _not_sync: PhantomData,
        }
    }

    /// Release the dataset.
    ///
    /// Closing a closed dataset succeeds without touching the library. If the
    /// library reports a failure the dataset still counts as closed, so the
    /// release is never attempted twice.
    pub fn close(&mut self) -> Result<(), NcError> {
        if !self.open {
            return Ok(());
        }
        self.open = false;

        self.lib
            .close(self.id)
            .map_err(|status| self.error(status, ErrorContext::Path(&self.path)))?;

        debug!(library = self.lib.name(), path = %self.path.display(), "closed dataset");
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Path the dataset was opened or created at.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dimension_count(&self) -> Result<usize, NcError> {
        let id = self.ensure_open()?;
        let n = self.lib.inq_ndims(id).map_err(|s| self.path_error(s))?;
        self.count(n)
    }

    pub fn variable_count(&self) -> Result<usize, NcError> {
        let id = self.ensure_open()?;
        let n = self.lib.inq_nvars(id).map_err(|s| self.path_error(s))?;
        self.count(n)
    }

    /// Number of global attributes.
    pub fn attribute_count(&self) -> Result<usize, NcError> {
        let id = self.ensure_open()?;
        let n = self.lib.inq_natts(id).map_err(|s| self.path_error(s))?;
        self.count(n)
    }

    /// Dimension, variable and global attribute counts, in that order.
    pub fn counts(&self) -> Result<(usize, usize, usize), NcError> {
        Ok((
            self.dimension_count()?,
            self.variable_count()?,
            self.attribute_count()?,
        ))
    }

    pub fn format(&self) -> Result<Format, NcError> {
        let id = self.ensure_open()?;
        let code = self.lib.inq_format(id).map_err(|s| self.path_error(s))?;
        Format::from_code(code).ok_or_else(|| NcError::Generic {
            code: NC_EINVAL,
            message: format!("unrecognised format code {code}"),
        })
    }

    /// Id of the unlimited (record) dimension, if the dataset has one.
    pub fn unlimited_dimension(&self) -> Result<Option<i32>, NcError> {
        let id = self.ensure_open()?;
        let dimid = self.lib.inq_unlimdim(id).map_err(|s| self.path_error(s))?;
        Ok((dimid >= 0).then_some(dimid))
    }

    pub fn dimension_len(&self, dimid: i32) -> Result<usize, NcError> {
        let id = self.ensure_open()?;
        self.lib
            .inq_dimlen(id, dimid)
            .map_err(|s| self.error(s, ErrorContext::Dimension(dimid)))
    }

    pub fn dimension_name(&self, dimid: i32) -> Result<String, NcError> {
        let id = self.ensure_open()?;
        self.lib
            .inq_dimname(id, dimid)
            .map_err(|s| self.error(s, ErrorContext::Dimension(dimid)))
    }

    pub fn variable_name(&self, varid: i32) -> Result<String, NcError> {
        let id = self.ensure_open()?;
        self.lib
            .inq_varname(id, varid)
            .map_err(|s| self.error(s, ErrorContext::Variable(varid)))
    }

    /// Number of values held by the global attribute `name`.
    pub fn attribute_len(&self, name: &str) -> Result<usize, NcError> {
        let id = self.ensure_open()?;
        // A name with a NUL can't exist in the file.
        let Ok(cname) = CString::new(name) else {
            return Err(NcError::InvalidAttribute(name.to_string()));
        };
        self.lib
            .inq_attlen(id, NC_GLOBAL, &cname)
            .map_err(|s| self.error(s, ErrorContext::Attribute(name)))
    }

    /// Flush pending changes to storage.
    pub fn sync(&self) -> Result<(), NcError> {
        let id = self.ensure_open()?;
        self.lib.sync(id).map_err(|s| self.path_error(s))
    }

    fn ensure_open(&self) -> Result<RawId, NcError> {
        if self.open {
            Ok(self.id)
        } else {
            Err(NcError::NotOpen)
        }
    }

    fn count(&self, n: i32) -> Result<usize, NcError> {
        usize::try_from(n).map_err(|_| NcError::Generic {
            code: NC_EINVAL,
            message: format!("{} reported a negative count ({n})", self.lib.name()),
        })
    }

    fn path_error(&self, status: Status) -> NcError {
        self.error(status, ErrorContext::Path(&self.path))
    }

    fn error(&self, status: Status, context: ErrorContext<'_>) -> NcError {
        status_error(self.lib, status, context)
    }
}

impl<L: Library + ?Sized> Drop for Dataset<'_, L> {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            debug!(path = %self.path.display(), error = %e, "discarding error from implicit close");
        }
    }
}

impl<L: Library + ?Sized> fmt::Debug for Dataset<'_, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dataset")
            .field("library", &self.lib.name())
            .field("path", &self.path)
            .field("open", &self.open)
            .finish()
    }
}

fn status_error<L: Library + ?Sized>(lib: &L, status: Status, context: ErrorContext<'_>) -> NcError {
    let code = status.code();
    let message = lib.describe_status(code);
    classify(code, &message, context).unwrap_or(NcError::Generic { code, message })
}

fn path_to_cstring<L: Library + ?Sized>(lib: &L, path: &Path) -> Result<CString, NcError> {
    CString::new(path.as_os_str().as_bytes()).map_err(|_| NcError::Generic {
        code: NC_EINVAL,
        message: format!(
            "{}: path contains a NUL byte: {}",
            lib.describe_status(NC_EINVAL),
            path.display()
        ),
    })
}
