use std::ffi::CStr;

use crate::error::NcError;
use crate::mode::{CreateFlags, OpenFlags};
use crate::options::LibraryOptions;
use crate::status::{NC_ENOTBUILT, NC_NOERR};

/// Dataset id issued by a [`Library`].
///
/// Only library implementations see this; [`crate::Dataset`] never hands it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawId(i32);

impl RawId {
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    pub const fn get(self) -> i32 {
        self.0
    }
}

/// Non-success status code returned by a library primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Status(i32);

impl Status {
    pub const fn new(code: i32) -> Self {
        Self(code)
    }

    pub const fn code(self) -> i32 {
        self.0
    }

    /// Convert a C-style return code: `NC_NOERR` is success, anything else an error.
    pub fn check(code: i32) -> Result<(), Status> {
        if code == NC_NOERR {
            Ok(())
        } else {
            Err(Status(code))
        }
    }
}

/// Primitive operations of a netCDF-style library.
///
/// Calls are synchronous and blocking. Implementations need not be safe for
/// concurrent use of the same id; [`crate::Dataset`] serializes access by
/// ownership.
pub trait Library {
    /// Library name (e.g., "NETCDF")
    fn name(&self) -> &str;

    /// Apply options under this library's prefix.
    fn configure(&mut self, options: &LibraryOptions) -> Result<(), NcError> {
        let _ = options;
        Ok(())
    }

    /// Open an existing dataset.
    fn open(&self, path: &CStr, flags: OpenFlags) -> Result<RawId, Status>;

    /// Create a new dataset.
    fn create(&self, path: &CStr, flags: CreateFlags) -> Result<RawId, Status>;

    /// Release an id. The id is invalid afterwards whatever the outcome.
    fn close(&self, id: RawId) -> Result<(), Status>;

    /// Number of dimensions.
    fn inq_ndims(&self, id: RawId) -> Result<i32, Status>;

    /// Number of variables.
    fn inq_nvars(&self, id: RawId) -> Result<i32, Status>;

    /// Number of global attributes.
    fn inq_natts(&self, id: RawId) -> Result<i32, Status>;

    /// Diagnostic text for a status code.
    fn describe_status(&self, code: i32) -> String;

    /// Flush buffered changes to storage.
    fn sync(&self, id: RawId) -> Result<(), Status> {
        let _ = id;
        Err(Status(NC_ENOTBUILT))
    }

    /// Format code as reported by `nc_inq_format`.
    fn inq_format(&self, id: RawId) -> Result<i32, Status> {
        let _ = id;
        Err(Status(NC_ENOTBUILT))
    }

    /// Id of the unlimited dimension, -1 if there is none.
    fn inq_unlimdim(&self, id: RawId) -> Result<i32, Status> {
        let _ = id;
        Err(Status(NC_ENOTBUILT))
    }

    /// Current length of a dimension.
    fn inq_dimlen(&self, id: RawId, dimid: i32) -> Result<usize, Status> {
        let _ = (id, dimid);
        Err(Status(NC_ENOTBUILT))
    }

    /// Name of a dimension.
    fn inq_dimname(&self, id: RawId, dimid: i32) -> Result<String, Status> {
        let _ = (id, dimid);
        Err(Status(NC_ENOTBUILT))
    }

    /// Name of a variable.
    fn inq_varname(&self, id: RawId, varid: i32) -> Result<String, Status> {
        let _ = (id, varid);
        Err(Status(NC_ENOTBUILT))
    }

    /// Number of values in an attribute of `varid` (`NC_GLOBAL` for global ones).
    fn inq_attlen(&self, id: RawId, varid: i32, name: &CStr) -> Result<usize, Status> {
        let _ = (id, varid, name);
        Err(Status(NC_ENOTBUILT))
    }
}
