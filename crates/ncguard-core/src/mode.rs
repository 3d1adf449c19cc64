use std::fmt;

use bitflags::bitflags;

/// Intent for opening a dataset that already exists.
///
/// Deliberately unrelated to [`CreationMode`]: there is no conversion between
/// the two, so an open call can never be handed creation semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessMode {
    /// Read-only access (`NC_NOWRITE`).
    Read,
    /// Read/write access (`NC_WRITE`).
    Write,
}

impl AccessMode {
    pub(crate) fn flags(self) -> OpenFlags {
        match self {
            AccessMode::Read => OpenFlags::empty(),
            AccessMode::Write => OpenFlags::WRITE,
        }
    }
}

/// Intent for creating a new dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CreationMode {
    /// Replace whatever is at the path (`NC_CLOBBER`).
    #[default]
    Overwrite,
    /// Fail if the path already exists (`NC_NOCLOBBER`).
    Exclusive,
}

impl CreationMode {
    pub(crate) fn flags(self) -> CreateFlags {
        match self {
            CreationMode::Overwrite => CreateFlags::empty(),
            CreationMode::Exclusive => CreateFlags::NOCLOBBER,
        }
    }
}

/// On-disk variant of a netCDF dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Format {
    /// Classic format (CDF-1).
    #[default]
    Classic,
    /// 64-bit offset format (CDF-2).
    Offset64,
    /// 64-bit data format (CDF-5).
    Cdf5,
    /// HDF5-based netCDF-4.
    Netcdf4,
    /// netCDF-4 restricted to the classic data model.
    Netcdf4Classic,
}

impl Format {
    /// Code reported by `nc_inq_format`.
    pub const fn code(self) -> i32 {
        match self {
            Format::Classic => 1,
            Format::Offset64 => 2,
            Format::Netcdf4 => 3,
            Format::Netcdf4Classic => 4,
            Format::Cdf5 => 5,
        }
    }

    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(Format::Classic),
            2 => Some(Format::Offset64),
            3 => Some(Format::Netcdf4),
            4 => Some(Format::Netcdf4Classic),
            5 => Some(Format::Cdf5),
            _ => None,
        }
    }

    /// Creation flags selecting this format.
    pub fn flags(self) -> CreateFlags {
        match self {
            Format::Classic => CreateFlags::empty(),
            Format::Offset64 => CreateFlags::OFFSET64,
            Format::Cdf5 => CreateFlags::DATA64,
            Format::Netcdf4 => CreateFlags::NETCDF4,
            Format::Netcdf4Classic => CreateFlags::NETCDF4 | CreateFlags::CLASSIC_MODEL,
        }
    }

    /// Inverse of [`Format::flags`]. Unknown bit combinations fall back to classic.
    pub fn from_flags(flags: CreateFlags) -> Self {
        if flags.contains(CreateFlags::NETCDF4) {
            if flags.contains(CreateFlags::CLASSIC_MODEL) {
                Format::Netcdf4Classic
            } else {
                Format::Netcdf4
            }
        } else if flags.contains(CreateFlags::DATA64) {
            Format::Cdf5
        } else if flags.contains(CreateFlags::OFFSET64) {
            Format::Offset64
        } else {
            Format::Classic
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::Classic => "classic",
            Format::Offset64 => "64-bit offset",
            Format::Cdf5 => "cdf5",
            Format::Netcdf4 => "netCDF-4",
            Format::Netcdf4Classic => "netCDF-4 classic model",
        };
        f.write_str(name)
    }
}

bitflags! {
    /// Mode bits passed to `nc_open`, matching `netcdf.h`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OpenFlags: i32 {
        /// Read/write
        const WRITE = 0x0001;
    }
}

bitflags! {
    /// Mode bits passed to `nc_create`, matching `netcdf.h`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CreateFlags: i32 {
        /// Don't destroy an existing file
        const NOCLOBBER     = 0x0004;
        /// CDF-5 format
        const DATA64        = 0x0020;
        /// Enforce the classic data model on netCDF-4
        const CLASSIC_MODEL = 0x0100;
        /// CDF-2 format
        const OFFSET64      = 0x0200;
        /// HDF5-based netCDF-4
        const NETCDF4       = 0x1000;
    }
}
