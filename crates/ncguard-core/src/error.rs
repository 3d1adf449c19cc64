use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::status::{
    NC_EBADDIM, NC_EEXIST, NC_ENOTATT, NC_ENOTFOUND, NC_ENOTNC, NC_ENOTVAR, NC_EPERM,
    NC_NOERR,
};

/// Closed set of failures a dataset operation can report.
///
/// Every failed library call is classified into exactly one variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NcError {
    /// No dataset at the given path
    #[error("not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Exclusive creation over an existing path
    #[error("already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    /// The caller may not access the path in the requested way
    #[error("permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),

    /// The path exists but is not a dataset the library understands
    #[error("invalid format: {}", .0.display())]
    InvalidFormat(PathBuf),

    /// Unknown dimension id
    #[error("invalid dimension id {0}")]
    InvalidDimension(i32),

    /// Unknown variable id
    #[error("invalid variable id {0}")]
    InvalidVariable(i32),

    /// Unknown attribute name
    #[error("invalid attribute {0:?}")]
    InvalidAttribute(String),

    /// Operation on a handle that was already closed; never produced by a
    /// library status
    #[error("dataset is not open")]
    NotOpen,

    /// Anything outside the categories above, with the library's own code and text
    #[error("netCDF error {code}: {message}")]
    Generic { code: i32, message: String },
}

/// What a failing call was operating on. Selects which error kinds apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorContext<'a> {
    None,
    Path(&'a Path),
    Dimension(i32),
    Variable(i32),
    Attribute(&'a str),
}

/// Map a library status and its diagnostic text to an error.
///
/// Returns `None` for success. Known codes are looked up first; the
/// diagnostic text is only searched for codes the lookup does not cover.
pub fn classify(code: i32, diagnostic: &str, context: ErrorContext<'_>) -> Option<NcError> {
    if code == NC_NOERR {
        return None;
    }

    let error = from_code(code, context)
        .or_else(|| from_diagnostic(diagnostic, context))
        .unwrap_or_else(|| NcError::Generic {
            code,
            message: diagnostic.to_string(),
        });
    Some(error)
}

fn from_code(code: i32, context: ErrorContext<'_>) -> Option<NcError> {
    use ErrorContext as Ctx;

    match (code, context) {
        (libc::ENOENT | NC_ENOTFOUND, Ctx::Path(path)) => Some(NcError::NotFound(path.into())),
        (libc::EEXIST | NC_EEXIST, Ctx::Path(path)) => Some(NcError::AlreadyExists(path.into())),
        (libc::EACCES | libc::EPERM | NC_EPERM, Ctx::Path(path)) => {
            Some(NcError::PermissionDenied(path.into()))
        }
        (NC_ENOTNC, Ctx::Path(path)) => Some(NcError::InvalidFormat(path.into())),
        (NC_EBADDIM, Ctx::Dimension(id)) => Some(NcError::InvalidDimension(id)),
        (NC_ENOTVAR, Ctx::Variable(id)) => Some(NcError::InvalidVariable(id)),
        (NC_ENOTATT, Ctx::Attribute(name)) => Some(NcError::InvalidAttribute(name.to_string())),
        _ => None,
    }
}

// Order matters: "not found" wins over "exists", which wins over "permission".
fn from_diagnostic(diagnostic: &str, context: ErrorContext<'_>) -> Option<NcError> {
    let ErrorContext::Path(path) = context else {
        return None;
    };

    let text = diagnostic.to_lowercase();
    if text.contains("no such file") || text.contains("not found") {
        Some(NcError::NotFound(path.into()))
    } else if text.contains("exists") {
        Some(NcError::AlreadyExists(path.into()))
    } else if text.contains("permission") || text.contains("denied") {
        Some(NcError::PermissionDenied(path.into()))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::{self, NC_EBADID, NC_EHDFERR, NC_ENFILE};

    fn path() -> &'static Path {
        Path::new("/data/in.nc")
    }

    #[test]
    fn test_success_is_not_an_error() {
        assert_eq!(classify(NC_NOERR, "No error", ErrorContext::Path(path())), None);
        assert_eq!(classify(NC_NOERR, "file not found", ErrorContext::None), None);
    }

    #[test]
    fn test_known_codes_with_path() {
        let ctx = ErrorContext::Path(path());
        let cases = [
            (libc::ENOENT, NcError::NotFound(path().into())),
            (NC_EEXIST, NcError::AlreadyExists(path().into())),
            (libc::EACCES, NcError::PermissionDenied(path().into())),
            (NC_EPERM, NcError::PermissionDenied(path().into())),
            (NC_ENOTNC, NcError::InvalidFormat(path().into())),
        ];
        for (code, expected) in cases {
            assert_eq!(classify(code, &status::describe(code), ctx), Some(expected));
        }
    }

    #[test]
    fn test_object_contexts() {
        let dim = classify(NC_EBADDIM, "x", ErrorContext::Dimension(7));
        assert_eq!(dim, Some(NcError::InvalidDimension(7)));
        let var = classify(NC_ENOTVAR, "x", ErrorContext::Variable(3));
        assert_eq!(var, Some(NcError::InvalidVariable(3)));
        let att = classify(NC_ENOTATT, "x", ErrorContext::Attribute("units"));
        assert_eq!(att, Some(NcError::InvalidAttribute("units".into())));
    }

    #[test]
    fn test_code_without_matching_context_is_generic() {
        let err = classify(libc::ENOENT, "No such file or directory", ErrorContext::None);
        assert_eq!(
            err,
            Some(NcError::Generic {
                code: libc::ENOENT,
                message: "No such file or directory".into()
            })
        );

        let err = classify(NC_EBADDIM, "NetCDF: Invalid dimension ID or name", ErrorContext::Variable(1));
        assert!(matches!(err, Some(NcError::Generic { code: NC_EBADDIM, .. })));
    }

    #[test]
    fn test_stale_id_is_generic() {
        // A bad id reported by the library is not the handle's own closed state.
        for ctx in [ErrorContext::None, ErrorContext::Path(path()), ErrorContext::Dimension(0)] {
            assert_eq!(
                classify(NC_EBADID, &status::describe(NC_EBADID), ctx),
                Some(NcError::Generic {
                    code: NC_EBADID,
                    message: "NetCDF: Not a valid ID".into()
                })
            );
        }
    }

    #[test]
    fn test_diagnostic_fallback_priority() {
        let ctx = ErrorContext::Path(path());
        // Unmapped code: only the text decides.
        let err = classify(-999, "Resource NOT FOUND, permission denied", ctx);
        assert_eq!(err, Some(NcError::NotFound(path().into())));

        let err = classify(-999, "target exists; permission denied", ctx);
        assert_eq!(err, Some(NcError::AlreadyExists(path().into())));

        let err = classify(-999, "Access Denied", ctx);
        assert_eq!(err, Some(NcError::PermissionDenied(path().into())));
    }

    #[test]
    fn test_table_wins_over_diagnostic() {
        // The text would say NotFound, but the code is a known format error.
        let err = classify(NC_ENOTNC, "header not found", ErrorContext::Path(path()));
        assert_eq!(err, Some(NcError::InvalidFormat(path().into())));
    }

    #[test]
    fn test_unmatched_falls_back_to_generic() {
        let ctx = ErrorContext::Path(path());
        assert_eq!(
            classify(NC_EHDFERR, "NetCDF: HDF error", ctx),
            Some(NcError::Generic {
                code: NC_EHDFERR,
                message: "NetCDF: HDF error".into()
            })
        );
        assert!(matches!(
            classify(NC_ENFILE, &status::describe(NC_ENFILE), ctx),
            Some(NcError::Generic { code: NC_ENFILE, .. })
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(NcError::NotFound(path().into()).to_string(), "not found: /data/in.nc");
        assert_eq!(NcError::InvalidAttribute("units".into()).to_string(), "invalid attribute \"units\"");
        assert_eq!(
            NcError::Generic { code: -101, message: "NetCDF: HDF error".into() }.to_string(),
            "netCDF error -101: NetCDF: HDF error"
        );
    }
}
