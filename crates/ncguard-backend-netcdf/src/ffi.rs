use std::os::raw::{c_char, c_float, c_int};

unsafe extern "C" {
    pub fn nc_open(path: *const c_char, mode: c_int, ncidp: *mut c_int) -> c_int;
    pub fn nc_create(path: *const c_char, cmode: c_int, ncidp: *mut c_int) -> c_int;
    pub fn nc_close(ncid: c_int) -> c_int;
    pub fn nc_sync(ncid: c_int) -> c_int;

    pub fn nc_inq_ndims(ncid: c_int, ndimsp: *mut c_int) -> c_int;
    pub fn nc_inq_nvars(ncid: c_int, nvarsp: *mut c_int) -> c_int;
    pub fn nc_inq_natts(ncid: c_int, nattsp: *mut c_int) -> c_int;
    pub fn nc_inq_format(ncid: c_int, formatp: *mut c_int) -> c_int;
    pub fn nc_inq_unlimdim(ncid: c_int, unlimdimidp: *mut c_int) -> c_int;

    pub fn nc_inq_dimlen(ncid: c_int, dimid: c_int, lenp: *mut libc::size_t) -> c_int;
    pub fn nc_inq_dimname(ncid: c_int, dimid: c_int, name: *mut c_char) -> c_int;
    pub fn nc_inq_varname(ncid: c_int, varid: c_int, name: *mut c_char) -> c_int;
    pub fn nc_inq_attlen(
        ncid: c_int,
        varid: c_int,
        name: *const c_char,
        lenp: *mut libc::size_t,
    ) -> c_int;

    pub fn nc_strerror(ncerr: c_int) -> *const c_char;
    pub fn nc_inq_libvers() -> *const c_char;

    pub fn nc_get_chunk_cache(
        sizep: *mut libc::size_t,
        nelemsp: *mut libc::size_t,
        preemptionp: *mut c_float,
    ) -> c_int;
    pub fn nc_set_chunk_cache(
        size: libc::size_t,
        nelems: libc::size_t,
        preemption: c_float,
    ) -> c_int;
}
