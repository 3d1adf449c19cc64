//! Status codes of the netCDF C library (`netcdf.h`).
//!
//! Negative values are netCDF's own errors. Positive values are `errno`
//! values the library passes through from failed system calls.

use std::io;

pub const NC_NOERR: i32 = 0;
pub const NC_EBADID: i32 = -33;
pub const NC_ENFILE: i32 = -34;
pub const NC_EEXIST: i32 = -35;
pub const NC_EINVAL: i32 = -36;
pub const NC_EPERM: i32 = -37;
pub const NC_ENOTINDEFINE: i32 = -38;
pub const NC_EINDEFINE: i32 = -39;
pub const NC_ENOTATT: i32 = -43;
pub const NC_EBADDIM: i32 = -46;
pub const NC_ENOTVAR: i32 = -49;
pub const NC_EGLOBAL: i32 = -50;
pub const NC_ENOTNC: i32 = -51;
pub const NC_EBADNAME: i32 = -59;
pub const NC_ENOTFOUND: i32 = -90;
pub const NC_EHDFERR: i32 = -101;
pub const NC_ENOTBUILT: i32 = -128;

/// Variable id addressing global attributes.
pub const NC_GLOBAL: i32 = -1;

/// Longest object name the library accepts, excluding the terminator.
pub const NC_MAX_NAME: usize = 256;

/// Diagnostic text for `code`, worded as `nc_strerror` words it.
///
/// Used by in-process libraries that have no C `nc_strerror` to call.
pub fn describe(code: i32) -> String {
    let text = match code {
        NC_NOERR => "No error",
        NC_EBADID => "NetCDF: Not a valid ID",
        NC_ENFILE => "NetCDF: Too many files open",
        NC_EEXIST => "NetCDF: File exists && NC_NOCLOBBER",
        NC_EINVAL => "NetCDF: Invalid argument",
        NC_EPERM => "NetCDF: Write to read only",
        NC_ENOTINDEFINE => "NetCDF: Operation not allowed in data mode",
        NC_EINDEFINE => "NetCDF: Operation not allowed in define mode",
        NC_ENOTATT => "NetCDF: Attribute not found",
        NC_EBADDIM => "NetCDF: Invalid dimension ID or name",
        NC_ENOTVAR => "NetCDF: Variable not found",
        NC_EGLOBAL => "NetCDF: Action prohibited on NC_GLOBAL varid",
        NC_ENOTNC => "NetCDF: Unknown file format",
        NC_EBADNAME => "NetCDF: Name contains illegal characters",
        NC_ENOTFOUND => "NetCDF: Object not found",
        NC_EHDFERR => "NetCDF: HDF error",
        NC_ENOTBUILT => {
            "NetCDF: Attempt to use feature that was not turned on when netCDF was built."
        }
        errno if errno > 0 => return os_message(errno),
        _ => "Unknown Error",
    };
    text.to_string()
}

/// `strerror` text without the "(os error N)" suffix std appends.
fn os_message(errno: i32) -> String {
    let full = io::Error::from_raw_os_error(errno).to_string();
    match full.rfind(" (os error") {
        Some(pos) => full[..pos].to_string(),
        None => full,
    }
}
