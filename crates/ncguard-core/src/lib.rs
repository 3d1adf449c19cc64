//! Safe handles over a netCDF-style C library.
//!
//! A [`Library`] exposes the raw primitives (open, create, close, inquire)
//! in terms of integer ids and status codes. [`Dataset`] owns one id, keeps
//! track of whether it is still open, and turns every failing status into an
//! [`NcError`]. The `with_*` helpers acquire a dataset for the duration of a
//! closure and always close it afterwards.

pub mod dataset;
pub mod error;
pub mod library;
pub mod memory;
pub mod mode;
pub mod options;
pub mod scope;
pub mod status;

// Re-export primary types for convenience
pub use dataset::Dataset;
pub use error::{ErrorContext, NcError, classify};
pub use library::{Library, RawId, Status};
pub use memory::{MemDataset, MemLibrary, Primitive};
pub use mode::{AccessMode, CreateFlags, CreationMode, Format, OpenFlags};
pub use options::{LibraryOptions, OptionValue, extract_library_options};
pub use scope::{with_created, with_reading, with_writing};
