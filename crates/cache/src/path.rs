//! Archive entry name validation.

use std::path::{Component, Path};

use crate::error::{ErrorKind, Result};

/// Validates that an archive entry name is a single plain file name.
///
/// Entries are written directly under the cache root, so anything that
/// would nest (`a/b`), climb (`../b`), or start from a root is rejected with
/// [`InvalidEntryName`](ErrorKind::InvalidEntryName). Null bytes are rejected
/// too. A leading `./` component is ignored.
///
/// Hidden names (leading `.`) are rejected as well: the cache directory
/// reserves them for in-flight temporary files, which are skipped when the
/// directory is read back.
///
/// ```
/// use toucan_cache::validate_entry_name;
/// assert_eq!(validate_entry_name("df").unwrap(), "df");
/// assert_eq!(validate_entry_name("./df2").unwrap(), "df2");
/// assert!(validate_entry_name("../df").is_err());
/// assert!(validate_entry_name("nested/df").is_err());
/// assert!(validate_entry_name(".df").is_err());
/// ```
pub fn validate_entry_name(name: &str) -> Result<&str> {
    let invalid = || ErrorKind::InvalidEntryName(name.to_string());
    let mut file_name = None;
    for component in Path::new(name).components() {
        match component {
            Component::CurDir => {},
            Component::Normal(s) if file_name.is_none() => {
                let bytes = s.as_encoded_bytes();
                if bytes.contains(&0) || bytes.starts_with(b".") {
                    exn::bail!(invalid());
                }
                file_name = s.to_str();
            },
            _ => exn::bail!(invalid()),
        }
    }
    match file_name {
        Some(file_name) if !file_name.is_empty() => Ok(file_name),
        _ => exn::bail!(invalid()),
    }
}
