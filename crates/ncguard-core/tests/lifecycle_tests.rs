//! Lifecycle properties of `Dataset` and the scoped helpers, checked
//! against the in-memory library.

use std::path::PathBuf;

use ncguard_core::status::{NC_EHDFERR, NC_ENOTBUILT};
use ncguard_core::{
    AccessMode, CreationMode, Dataset, Format, Library, MemDataset, MemLibrary, NcError,
    Primitive, with_created, with_reading, with_writing,
};
use proptest::prelude::*;

fn arb_path() -> impl Strategy<Value = String> {
    "(/[a-zA-Z0-9_.-]{1,12}){1,4}\\.nc"
}

proptest! {
    #[test]
    fn prop_create_close_reopen_is_empty(path in arb_path()) {
        let lib = MemLibrary::new();

        let mut created = Dataset::create(&lib, &path, CreationMode::Overwrite).unwrap();
        created.close().unwrap();

        let reopened = Dataset::open_for_reading(&lib, &path).unwrap();
        prop_assert_eq!(reopened.dimension_count().unwrap(), 0);
        prop_assert_eq!(reopened.variable_count().unwrap(), 0);
        prop_assert_eq!(reopened.attribute_count().unwrap(), 0);
    }

    #[test]
    fn prop_exclusive_create_twice_fails(path in arb_path()) {
        let lib = MemLibrary::new();
        let first = Dataset::create(&lib, &path, CreationMode::Exclusive);
        prop_assert!(first.is_ok());

        let second = Dataset::create(&lib, &path, CreationMode::Exclusive);
        prop_assert_eq!(second.unwrap_err(), NcError::AlreadyExists(PathBuf::from(&path)));
    }

    #[test]
    fn prop_scoped_counts_on_fresh_dataset(path in arb_path()) {
        let lib = MemLibrary::new();
        let counts = with_created(&lib, &path, CreationMode::Exclusive, |ds| ds.counts());
        prop_assert_eq!(counts, Ok((0, 0, 0)));
        prop_assert_eq!(lib.open_handles(), 0);
    }
}

#[test]
fn test_open_missing_is_not_found() {
    let lib = MemLibrary::new();
    for mode in [AccessMode::Read, AccessMode::Write] {
        let err = Dataset::open(&lib, "/nowhere/missing.nc", mode).unwrap_err();
        assert_eq!(err, NcError::NotFound(PathBuf::from("/nowhere/missing.nc")));
    }
}

#[test]
fn test_open_foreign_file_is_invalid_format() {
    let lib = MemLibrary::new();
    lib.seed_foreign("/data/readme.txt");
    let err = Dataset::open_for_reading(&lib, "/data/readme.txt").unwrap_err();
    assert_eq!(err, NcError::InvalidFormat(PathBuf::from("/data/readme.txt")));
}

#[test]
fn test_write_to_read_only_is_permission_denied() {
    let lib = MemLibrary::new();
    lib.seed("/data/archive.nc", MemDataset::default());
    lib.set_read_only("/data/archive.nc", true);

    let expected = NcError::PermissionDenied(PathBuf::from("/data/archive.nc"));
    assert_eq!(
        Dataset::open_for_writing(&lib, "/data/archive.nc").unwrap_err(),
        expected
    );
    assert_eq!(
        Dataset::create(&lib, "/data/archive.nc", CreationMode::Overwrite).unwrap_err(),
        expected
    );
    assert!(Dataset::open_for_reading(&lib, "/data/archive.nc").is_ok());
}

#[test]
fn test_inquiry_after_close_is_not_open() {
    let lib = MemLibrary::new();
    let mut ds = Dataset::create(&lib, "/tmp/closed.nc", CreationMode::Overwrite).unwrap();
    ds.close().unwrap();

    let before = lib.calls(Primitive::InqNdims) + lib.calls(Primitive::InqNvars);
    assert_eq!(ds.dimension_count(), Err(NcError::NotOpen));
    assert_eq!(ds.variable_count(), Err(NcError::NotOpen));
    assert_eq!(
        lib.calls(Primitive::InqNdims) + lib.calls(Primitive::InqNvars),
        before
    );
}

#[test]
fn test_second_close_succeeds_after_failed_close() {
    let lib = MemLibrary::new();
    let mut ds = Dataset::create(&lib, "/tmp/a.nc", CreationMode::Overwrite).unwrap();
    lib.fail_next(Primitive::Close, NC_EHDFERR);

    assert!(ds.close().is_err());
    assert_eq!(ds.close(), Ok(()));
    assert_eq!(lib.calls(Primitive::Close), 1);
}

#[test]
fn test_scoped_body_error_takes_precedence() {
    let lib = MemLibrary::new();
    lib.seed("/tmp/a.nc", MemDataset::default());

    let result: Result<(), NcError> = with_reading(&lib, "/tmp/a.nc", |ds| {
        lib.fail_next(Primitive::Close, NC_EHDFERR);
        ds.dimension_len(3).map(|_| ())
    });
    assert_eq!(result, Err(NcError::InvalidDimension(3)));
    assert_eq!(lib.open_handles(), 0);
}

#[test]
fn test_scoped_close_error_is_reported() {
    let lib = MemLibrary::new();
    lib.seed("/tmp/a.nc", MemDataset::default());

    let result = with_writing(&lib, "/tmp/a.nc", |ds| {
        lib.fail_next(Primitive::Close, NC_EHDFERR);
        ds.counts()
    });
    assert_eq!(
        result,
        Err(NcError::Generic {
            code: NC_EHDFERR,
            message: "NetCDF: HDF error".into()
        })
    );
}

#[test]
fn test_independent_handles_on_one_path() {
    let lib = MemLibrary::new();
    lib.seed(
        "/data/shared.nc",
        MemDataset {
            format: Format::Netcdf4Classic,
            variables: vec!["t".into()],
            ..MemDataset::default()
        },
    );

    let mut a = Dataset::open_for_reading(&lib, "/data/shared.nc").unwrap();
    let b = Dataset::open_for_reading(&lib, "/data/shared.nc").unwrap();
    a.close().unwrap();

    assert_eq!(a.variable_count(), Err(NcError::NotOpen));
    assert_eq!(b.variable_count(), Ok(1));
    assert_eq!(b.format(), Ok(Format::Netcdf4Classic));
}

#[test]
fn test_long_lived_dataset_survives_id_reuse() {
    let lib = MemLibrary::new();
    let first = Dataset::create(&lib, "/tmp/first.nc", CreationMode::Overwrite).unwrap();
    for _ in 0..70_000 {
        Dataset::create(&lib, "/tmp/churn.nc", CreationMode::Overwrite)
            .unwrap()
            .close()
            .unwrap();
    }

    let mut second = Dataset::create(&lib, "/tmp/second.nc", CreationMode::Overwrite).unwrap();
    assert_eq!(lib.open_handles(), 2);
    second.close().unwrap();

    assert!(first.is_open());
    assert_eq!(first.variable_count(), Ok(0));
    assert_eq!(lib.open_handles(), 1);
}

#[test]
fn test_datasets_move_across_threads() {
    let lib = MemLibrary::new();
    let ds = Dataset::create(&lib, "/tmp/threads.nc", CreationMode::Overwrite).unwrap();

    let count = std::thread::scope(|s| s.spawn(move || ds.variable_count()).join().unwrap());
    assert_eq!(count, Ok(0));
    assert_eq!(lib.open_handles(), 0);
}

#[test]
fn test_unsupported_primitive_is_generic() {
    struct Minimal(MemLibrary);

    impl Library for Minimal {
        fn name(&self) -> &str {
            "MINIMAL"
        }
        fn open(
            &self,
            path: &std::ffi::CStr,
            flags: ncguard_core::OpenFlags,
        ) -> Result<ncguard_core::RawId, ncguard_core::Status> {
            self.0.open(path, flags)
        }
        fn create(
            &self,
            path: &std::ffi::CStr,
            flags: ncguard_core::CreateFlags,
        ) -> Result<ncguard_core::RawId, ncguard_core::Status> {
            self.0.create(path, flags)
        }
        fn close(&self, id: ncguard_core::RawId) -> Result<(), ncguard_core::Status> {
            self.0.close(id)
        }
        fn inq_ndims(&self, id: ncguard_core::RawId) -> Result<i32, ncguard_core::Status> {
            self.0.inq_ndims(id)
        }
        fn inq_nvars(&self, id: ncguard_core::RawId) -> Result<i32, ncguard_core::Status> {
            self.0.inq_nvars(id)
        }
        fn inq_natts(&self, id: ncguard_core::RawId) -> Result<i32, ncguard_core::Status> {
            self.0.inq_natts(id)
        }
        fn describe_status(&self, code: i32) -> String {
            self.0.describe_status(code)
        }
    }

    let lib = Minimal(MemLibrary::new());
    let ds = Dataset::create(&lib, "/tmp/min.nc", CreationMode::Overwrite).unwrap();
    assert_eq!(ds.counts(), Ok((0, 0, 0)));
    assert!(matches!(
        ds.format(),
        Err(NcError::Generic { code: NC_ENOTBUILT, .. })
    ));
}
