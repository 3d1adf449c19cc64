//! Stand-ins for the libnetcdf entry points when the library was not found
//! at build time. Every call fails with `NC_ENOTBUILT`.

#![allow(clippy::missing_safety_doc)]

use std::os::raw::{c_char, c_float, c_int};

use ncguard_core::status::{NC_EINVAL, NC_ENOTBUILT, NC_NOERR};

pub unsafe fn nc_open(_path: *const c_char, _mode: c_int, _ncidp: *mut c_int) -> c_int {
    NC_ENOTBUILT
}

pub unsafe fn nc_create(_path: *const c_char, _cmode: c_int, _ncidp: *mut c_int) -> c_int {
    NC_ENOTBUILT
}

pub unsafe fn nc_close(_ncid: c_int) -> c_int {
    NC_ENOTBUILT
}

pub unsafe fn nc_sync(_ncid: c_int) -> c_int {
    NC_ENOTBUILT
}

pub unsafe fn nc_inq_ndims(_ncid: c_int, _ndimsp: *mut c_int) -> c_int {
    NC_ENOTBUILT
}

pub unsafe fn nc_inq_nvars(_ncid: c_int, _nvarsp: *mut c_int) -> c_int {
    NC_ENOTBUILT
}

pub unsafe fn nc_inq_natts(_ncid: c_int, _nattsp: *mut c_int) -> c_int {
    NC_ENOTBUILT
}

pub unsafe fn nc_inq_format(_ncid: c_int, _formatp: *mut c_int) -> c_int {
    NC_ENOTBUILT
}

pub unsafe fn nc_inq_unlimdim(_ncid: c_int, _unlimdimidp: *mut c_int) -> c_int {
    NC_ENOTBUILT
}

pub unsafe fn nc_inq_dimlen(_ncid: c_int, _dimid: c_int, _lenp: *mut libc::size_t) -> c_int {
    NC_ENOTBUILT
}

pub unsafe fn nc_inq_dimname(_ncid: c_int, _dimid: c_int, _name: *mut c_char) -> c_int {
    NC_ENOTBUILT
}

pub unsafe fn nc_inq_varname(_ncid: c_int, _varid: c_int, _name: *mut c_char) -> c_int {
    NC_ENOTBUILT
}

pub unsafe fn nc_inq_attlen(
    _ncid: c_int,
    _varid: c_int,
    _name: *const c_char,
    _lenp: *mut libc::size_t,
) -> c_int {
    NC_ENOTBUILT
}

pub unsafe fn nc_strerror(ncerr: c_int) -> *const c_char {
    match ncerr {
        NC_NOERR => c"No error".as_ptr(),
        NC_EINVAL => c"NetCDF: Invalid argument".as_ptr(),
        NC_ENOTBUILT => {
            c"NetCDF: Attempt to use feature that was not turned on when netCDF was built."
                .as_ptr()
        }
        _ => c"Unknown Error".as_ptr(),
    }
}

pub unsafe fn nc_inq_libvers() -> *const c_char {
    c"unavailable".as_ptr()
}

pub unsafe fn nc_get_chunk_cache(
    _sizep: *mut libc::size_t,
    _nelemsp: *mut libc::size_t,
    _preemptionp: *mut c_float,
) -> c_int {
    NC_ENOTBUILT
}

pub unsafe fn nc_set_chunk_cache(
    _size: libc::size_t,
    _nelems: libc::size_t,
    _preemption: c_float,
) -> c_int {
    NC_ENOTBUILT
}
