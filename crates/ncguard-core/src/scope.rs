//! Scoped access: acquire a dataset, run a closure on it, always close it.
//!
//! The body's error takes precedence. If the body fails and closing fails
//! too, the close error is dropped. If only closing fails, the close error
//! is returned and the body's value is discarded.

use std::path::Path;

use tracing::debug;

use crate::dataset::Dataset;
use crate::error::NcError;
use crate::library::Library;
use crate::mode::CreationMode;

/// Open `path` read-only and run `body` on it.
///
/// ```
/// use ncguard_core::{CreationMode, Dataset, MemLibrary, NcError, with_reading};
///
/// let lib = MemLibrary::new();
/// Dataset::create(&lib, "/tmp/empty.nc", CreationMode::Exclusive)?.close()?;
///
/// let counts = with_reading(&lib, "/tmp/empty.nc", |ds| ds.counts())?;
/// assert_eq!(counts, (0, 0, 0));
/// # Ok::<(), NcError>(())
/// ```
pub fn with_reading<'lib, L, T, E, F>(lib: &'lib L, path: impl AsRef<Path>, body: F) -> Result<T, E>
where
    L: Library + ?Sized,
    E: From<NcError>,
    F: FnOnce(&mut Dataset<'lib, L>) -> Result<T, E>,
{
    let dataset = Dataset::open_for_reading(lib, path)?;
    run(dataset, body)
}

/// Open `path` for writing and run `body` on it.
pub fn with_writing<'lib, L, T, E, F>(lib: &'lib L, path: impl AsRef<Path>, body: F) -> Result<T, E>
where
    L: Library + ?Sized,
    E: From<NcError>,
    F: FnOnce(&mut Dataset<'lib, L>) -> Result<T, E>,
{
    let dataset = Dataset::open_for_writing(lib, path)?;
    run(dataset, body)
}

/// Create a dataset at `path` and run `body` on it.
pub fn with_created<'lib, L, T, E, F>(
    lib: &'lib L,
    path: impl AsRef<Path>,
    mode: CreationMode,
    body: F,
) -> Result<T, E>
where
    L: Library + ?Sized,
    E: From<NcError>,
    F: FnOnce(&mut Dataset<'lib, L>) -> Result<T, E>,
{
    let dataset = Dataset::create(lib, path, mode)?;
    run(dataset, body)
}

fn run<'lib, L, T, E, F>(mut dataset: Dataset<'lib, L>, body: F) -> Result<T, E>
where
    L: Library + ?Sized,
    E: From<NcError>,
    F: FnOnce(&mut Dataset<'lib, L>) -> Result<T, E>,
{
    let outcome = body(&mut dataset);
    let closed = dataset.close();

    match (outcome, closed) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(close_err)) => Err(close_err.into()),
        (Err(body_err), Ok(())) => Err(body_err),
        (Err(body_err), Err(close_err)) => {
            debug!(
                path = %dataset.path().display(),
                error = %close_err,
                "close failed after body error; keeping body error"
            );
            Err(body_err)
        }
    }
}
