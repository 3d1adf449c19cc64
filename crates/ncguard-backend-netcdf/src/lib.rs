//! [`Library`] implementation backed by the netCDF C library.
//!
//! `build.rs` links `libnetcdf` when it can find it (`NETCDF_LIB_DIR`, or
//! `nc-config --libdir`). Without it the crate still builds and every
//! primitive fails with `NC_ENOTBUILT`; [`NetcdfLibrary::is_linked`] tells the
//! two apart.

#[cfg(netcdf_linked)]
mod ffi;
#[cfg(not(netcdf_linked))]
#[path = "ffi_unlinked.rs"]
mod ffi;

use std::ffi::CStr;
use std::marker::PhantomData;
use std::os::raw::{c_char, c_float, c_int};

use ncguard_core::status::{NC_EINVAL, NC_MAX_NAME, NC_NOERR};
use ncguard_core::{
    CreateFlags, ErrorContext, Library, LibraryOptions, NcError, OpenFlags, RawId, Status,
    classify,
};
use tracing::{trace, warn};

use ffi::*;

/// Settings of the library-wide HDF5 chunk cache.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChunkCache {
    /// Bytes
    pub size: usize,
    /// Number of chunk slots
    pub nelems: usize,
    /// 0.0 to 1.0
    pub preemption: f32,
}

/// The netCDF C library.
///
/// libnetcdf keeps process-global state and is not thread-safe, so this type
/// is neither `Send` nor `Sync`; use it from the thread that created it.
pub struct NetcdfLibrary {
    _not_thread_safe: PhantomData<*const ()>,
}

impl Default for NetcdfLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl NetcdfLibrary {
    pub fn new() -> Self {
        Self {
            _not_thread_safe: PhantomData,
        }
    }

    /// Whether libnetcdf was found and linked at build time.
    pub const fn is_linked() -> bool {
        cfg!(netcdf_linked)
    }

    /// Version string reported by `nc_inq_libvers`.
    pub fn version(&self) -> String {
        let ptr = unsafe { nc_inq_libvers() };
        if ptr.is_null() {
            return String::new();
        }
        unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
    }

    /// Current chunk cache settings.
    pub fn chunk_cache(&self) -> Result<ChunkCache, NcError> {
        let mut size: libc::size_t = 0;
        let mut nelems: libc::size_t = 0;
        let mut preemption: c_float = 0.0;
        let rc = unsafe { nc_get_chunk_cache(&mut size, &mut nelems, &mut preemption) };
        check("nc_get_chunk_cache", rc).map_err(|s| self.global_error(s))?;
        Ok(ChunkCache {
            size,
            nelems,
            preemption,
        })
    }

    pub fn set_chunk_cache(&self, cache: ChunkCache) -> Result<(), NcError> {
        let rc = unsafe { nc_set_chunk_cache(cache.size, cache.nelems, cache.preemption) };
        check("nc_set_chunk_cache", rc).map_err(|s| self.global_error(s))
    }

    /// Classify a failure of a call that is not tied to a dataset.
    fn global_error(&self, status: Status) -> NcError {
        let code = status.code();
        let message = self.describe_status(code);
        classify(code, &message, ErrorContext::None).unwrap_or(NcError::Generic { code, message })
    }
}

fn check(call: &'static str, rc: c_int) -> Result<(), Status> {
    if rc != NC_NOERR {
        trace!(call, rc, "netCDF call failed");
    }
    Status::check(rc)
}

/// Decode a NUL-terminated name written by the library into `buf`.
fn name_from_buffer(buf: &[c_char]) -> String {
    let bytes: Vec<u8> = buf
        .iter()
        .take_while(|&&c| c != 0)
        .map(|&c| c as u8)
        .collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Apply `netcdf.chunk_cache_*` options on top of `current`.
///
/// Returns `None` when no chunk cache option was given.
fn apply_cache_options(
    current: ChunkCache,
    options: &LibraryOptions,
) -> Result<Option<ChunkCache>, NcError> {
    let mut cache = current;
    let mut changed = false;

    for (key, value) in options.for_prefix("netcdf") {
        match key {
            "chunk_cache_size" => {
                cache.size = value.as_usize()?;
                changed = true;
            }
            "chunk_cache_nelems" => {
                cache.nelems = value.as_usize()?;
                changed = true;
            }
            "chunk_cache_preemption" => {
                let preemption = value.as_f32()?;
                if !(0.0..=1.0).contains(&preemption) {
                    return Err(NcError::Generic {
                        code: NC_EINVAL,
                        message: format!("chunk cache preemption {preemption} outside 0..=1"),
                    });
                }
                cache.preemption = preemption;
                changed = true;
            }
            unknown => {
                warn!("unknown NETCDF option: netcdf.{unknown}");
            }
        }
    }

    Ok(changed.then_some(cache))
}

impl Library for NetcdfLibrary {
    fn name(&self) -> &str {
        "NETCDF"
    }

    fn configure(&mut self, options: &LibraryOptions) -> Result<(), NcError> {
        if !options.has_prefix("netcdf") {
            return Ok(());
        }
        let current = self.chunk_cache()?;
        if let Some(cache) = apply_cache_options(current, options)? {
            self.set_chunk_cache(cache)?;
        }
        Ok(())
    }

    fn open(&self, path: &CStr, flags: OpenFlags) -> Result<RawId, Status> {
        let mut ncid: c_int = -1;
        let rc = unsafe { nc_open(path.as_ptr(), flags.bits(), &mut ncid) };
        check("nc_open", rc)?;
        trace!(ncid, "nc_open");
        Ok(RawId::new(ncid))
    }

    fn create(&self, path: &CStr, flags: CreateFlags) -> Result<RawId, Status> {
        let mut ncid: c_int = -1;
        let rc = unsafe { nc_create(path.as_ptr(), flags.bits(), &mut ncid) };
        check("nc_create", rc)?;
        trace!(ncid, "nc_create");
        Ok(RawId::new(ncid))
    }

    fn close(&self, id: RawId) -> Result<(), Status> {
        let rc = unsafe { nc_close(id.get()) };
        check("nc_close", rc)
    }

    fn sync(&self, id: RawId) -> Result<(), Status> {
        let rc = unsafe { nc_sync(id.get()) };
        check("nc_sync", rc)
    }

    fn inq_ndims(&self, id: RawId) -> Result<i32, Status> {
        let mut n: c_int = 0;
        let rc = unsafe { nc_inq_ndims(id.get(), &mut n) };
        check("nc_inq_ndims", rc)?;
        Ok(n)
    }

    fn inq_nvars(&self, id: RawId) -> Result<i32, Status> {
        let mut n: c_int = 0;
        let rc = unsafe { nc_inq_nvars(id.get(), &mut n) };
        check("nc_inq_nvars", rc)?;
        Ok(n)
    }

    fn inq_natts(&self, id: RawId) -> Result<i32, Status> {
        let mut n: c_int = 0;
        let rc = unsafe { nc_inq_natts(id.get(), &mut n) };
        check("nc_inq_natts", rc)?;
        Ok(n)
    }

    fn inq_format(&self, id: RawId) -> Result<i32, Status> {
        let mut format: c_int = 0;
        let rc = unsafe { nc_inq_format(id.get(), &mut format) };
        check("nc_inq_format", rc)?;
        Ok(format)
    }

    fn inq_unlimdim(&self, id: RawId) -> Result<i32, Status> {
        let mut dimid: c_int = -1;
        let rc = unsafe { nc_inq_unlimdim(id.get(), &mut dimid) };
        check("nc_inq_unlimdim", rc)?;
        Ok(dimid)
    }

    fn inq_dimlen(&self, id: RawId, dimid: i32) -> Result<usize, Status> {
        let mut len: libc::size_t = 0;
        let rc = unsafe { nc_inq_dimlen(id.get(), dimid, &mut len) };
        check("nc_inq_dimlen", rc)?;
        Ok(len)
    }

    fn inq_dimname(&self, id: RawId, dimid: i32) -> Result<String, Status> {
        let mut buf = [0 as c_char; NC_MAX_NAME + 1];
        let rc = unsafe { nc_inq_dimname(id.get(), dimid, buf.as_mut_ptr()) };
        check("nc_inq_dimname", rc)?;
        Ok(name_from_buffer(&buf))
    }

    fn inq_varname(&self, id: RawId, varid: i32) -> Result<String, Status> {
        let mut buf = [0 as c_char; NC_MAX_NAME + 1];
        let rc = unsafe { nc_inq_varname(id.get(), varid, buf.as_mut_ptr()) };
        check("nc_inq_varname", rc)?;
        Ok(name_from_buffer(&buf))
    }

    fn inq_attlen(&self, id: RawId, varid: i32, name: &CStr) -> Result<usize, Status> {
        let mut len: libc::size_t = 0;
        let rc = unsafe { nc_inq_attlen(id.get(), varid, name.as_ptr(), &mut len) };
        check("nc_inq_attlen", rc)?;
        Ok(len)
    }

    fn describe_status(&self, code: i32) -> String {
        let ptr = unsafe { nc_strerror(code) };
        if ptr.is_null() {
            return format!("Unknown Error ({code})");
        }
        unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ncguard_core::status::NC_ENOTBUILT;
    use ncguard_core::{Dataset, OptionValue};

    const DEFAULT_CACHE: ChunkCache = ChunkCache {
        size: 16 * 1024 * 1024,
        nelems: 4133,
        preemption: 0.75,
    };

    #[test]
    fn test_name_from_buffer() {
        let mut buf = [0 as c_char; NC_MAX_NAME + 1];
        for (slot, byte) in buf.iter_mut().zip(b"time") {
            *slot = *byte as c_char;
        }
        assert_eq!(name_from_buffer(&buf), "time");
        assert_eq!(name_from_buffer(&[0; 4]), "");
    }

    #[test]
    fn test_cache_options() {
        let mut opts = LibraryOptions::new();
        opts.insert("netcdf.chunk_cache_size", OptionValue::Str("1048576".into()));
        opts.insert("netcdf.chunk_cache_preemption", OptionValue::Str("0.5".into()));
        opts.insert("mem.max_open", OptionValue::Str("3".into()));

        let cache = apply_cache_options(DEFAULT_CACHE, &opts).unwrap().unwrap();
        assert_eq!(cache.size, 1_048_576);
        assert_eq!(cache.nelems, 4133);
        assert_eq!(cache.preemption, 0.5);
    }

    #[test]
    fn test_cache_options_untouched() {
        let mut opts = LibraryOptions::new();
        opts.insert("netcdf.verbose", OptionValue::Flag);
        assert_eq!(apply_cache_options(DEFAULT_CACHE, &opts).unwrap(), None);
    }

    #[test]
    fn test_cache_option_without_value() {
        let mut opts = LibraryOptions::new();
        opts.insert("netcdf.chunk_cache_size", OptionValue::Flag);
        let err = apply_cache_options(DEFAULT_CACHE, &opts).unwrap_err();
        assert!(matches!(err, NcError::Generic { code: NC_EINVAL, .. }));
    }

    #[test]
    fn test_cache_preemption_range() {
        let mut opts = LibraryOptions::new();
        opts.insert("netcdf.chunk_cache_preemption", OptionValue::Str("1.5".into()));
        let err = apply_cache_options(DEFAULT_CACHE, &opts).unwrap_err();
        assert!(matches!(err, NcError::Generic { code: NC_EINVAL, .. }));
    }

    #[test]
    fn test_missing_file() {
        let lib = NetcdfLibrary::new();
        let path = "/nonexistent-ncguard-dir/missing.nc";
        let err = Dataset::open_for_reading(&lib, path).unwrap_err();
        if NetcdfLibrary::is_linked() {
            assert_eq!(err, NcError::NotFound(path.into()));
        } else {
            assert!(matches!(err, NcError::Generic { code: NC_ENOTBUILT, .. }));
        }
    }

    #[test]
    fn test_describe_status() {
        let lib = NetcdfLibrary::new();
        assert_eq!(lib.describe_status(NC_NOERR), "No error");
        assert!(lib.describe_status(NC_EINVAL).contains("Invalid argument"));
    }
}
