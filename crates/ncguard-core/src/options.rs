use std::collections::BTreeMap;

use crate::error::NcError;
use crate::status::NC_EINVAL;

/// Value of a library option.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    /// Given without a value (e.g., `--mem.max_open`).
    Flag,
    /// Given with a value (e.g., `--netcdf.chunk_cache_size=33554432`).
    Str(String),
}

impl OptionValue {
    /// Parse as a non-negative count.
    pub fn as_usize(&self) -> Result<usize, NcError> {
        let s = self.value()?;
        s.trim().parse().map_err(|_| invalid("count", s))
    }

    pub fn as_f32(&self) -> Result<f32, NcError> {
        let s = self.value()?;
        s.trim().parse().map_err(|_| invalid("number", s))
    }

    fn value(&self) -> Result<&str, NcError> {
        match self {
            OptionValue::Str(s) => Ok(s),
            OptionValue::Flag => Err(NcError::Generic {
                code: NC_EINVAL,
                message: "option requires a value (--prefix.key=value)".into(),
            }),
        }
    }
}

fn invalid(kind: &str, value: &str) -> NcError {
    NcError::Generic {
        code: NC_EINVAL,
        message: format!("invalid {kind} option value {value:?}"),
    }
}

/// Library options keyed `"prefix.key"`, where the prefix names the library
/// (`netcdf`, `mem`).
#[derive(Debug, Clone, Default)]
pub struct LibraryOptions {
    opts: BTreeMap<String, OptionValue>,
}

impl LibraryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: OptionValue) {
        self.opts.insert(key.into(), value);
    }

    /// Options under `prefix`, with the prefix stripped.
    ///
    /// `for_prefix("mem")` yields `("max_open", ..)` for `"mem.max_open"`.
    pub fn for_prefix<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a OptionValue)> + 'a {
        let prefix_dot = format!("{prefix}.");
        self.opts
            .iter()
            .filter_map(move |(k, v)| k.strip_prefix(&prefix_dot).map(|key| (key, v)))
    }

    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.for_prefix(prefix).next().is_some()
    }
}

/// Whether `arg` has the shape `--word.word[.word...][=value]`.
fn is_library_option(arg: &str) -> bool {
    let Some(body) = arg.strip_prefix("--") else {
        return false;
    };
    let name = body.split_once('=').map_or(body, |(name, _)| name);
    let mut segments = name.split('.');
    let valid = |s: &str| {
        !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-')
    };
    let first_ok = segments.next().is_some_and(valid);
    let mut rest = segments.peekable();
    first_ok && rest.peek().is_some() && rest.all(valid)
}

/// Split library options out of raw command-line arguments.
///
/// Returns the remaining arguments (for clap) and the extracted options.
/// Accepted forms are `--prefix.key=value` and a bare `--prefix.key` flag.
/// A following argument is never taken as the value, so positional paths
/// stay with clap.
pub fn extract_library_options(args: Vec<String>) -> (Vec<String>, LibraryOptions) {
    let mut remaining = Vec::with_capacity(args.len());
    let mut opts = LibraryOptions::new();

    for arg in args {
        if !is_library_option(&arg) {
            remaining.push(arg);
            continue;
        }

        let body = &arg[2..];
        if let Some((name, value)) = body.split_once('=') {
            opts.insert(name, OptionValue::Str(value.to_string()));
        } else {
            opts.insert(body, OptionValue::Flag);
        }
    }

    (remaining, opts)
}
