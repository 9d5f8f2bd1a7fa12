//! Snapshot key derivation

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize, Serializer};

/// How files are identified across the two trees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyMode {
    /// Key by file name only. Same-named files in different subdirectories
    /// collapse into one key.
    #[default]
    BaseName,
    /// Key by the `/`-separated path relative to the scanned root.
    RelativePath,
}

impl KeyMode {
    /// Derive the key for a file given its path relative to the scan root.
    ///
    /// Returns `None` for paths without a file name component.
    pub fn key_for(self, relative: &Path) -> Option<String> {
        match self {
            Self::BaseName => relative
                .file_name()
                .map(|name| name.to_string_lossy().into_owned()),
            Self::RelativePath => {
                let slashed = to_slash(relative);
                (!slashed.is_empty()).then_some(slashed)
            }
        }
    }
}

impl std::fmt::Display for KeyMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BaseName => f.write_str("base-name"),
            Self::RelativePath => f.write_str("relative-path"),
        }
    }
}

/// Render a relative path with forward slashes, dropping `.` components.
pub fn to_slash(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Serialize a relative path in its [`to_slash`] form.
///
/// Names that are not valid UTF-8 are rendered lossily; the path value itself
/// is untouched.
pub fn serialize_slash<S: Serializer>(relative: &Path, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&to_slash(relative))
}

/// [`serialize_slash`] for optional paths.
pub fn serialize_slash_opt<S: Serializer>(
    relative: &Option<PathBuf>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match relative {
        Some(path) => serializer.serialize_some(&to_slash(path)),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(KeyMode::BaseName, "a.txt", "a.txt")]
    #[case(KeyMode::BaseName, "nested/deep/a.txt", "a.txt")]
    #[case(KeyMode::RelativePath, "a.txt", "a.txt")]
    #[case(KeyMode::RelativePath, "nested/deep/a.txt", "nested/deep/a.txt")]
    #[case(KeyMode::RelativePath, "./nested/a.txt", "nested/a.txt")]
    fn key_for_modes(#[case] mode: KeyMode, #[case] input: &str, #[case] expected: &str) {
        assert_eq!(mode.key_for(Path::new(input)).as_deref(), Some(expected));
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_names_are_keyed_and_shown_lossily() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let relative = Path::new("docs").join(OsStr::from_bytes(b"caf\xe9.txt"));
        assert_eq!(KeyMode::BaseName.key_for(&relative).as_deref(), Some("caf\u{fffd}.txt"));
        assert_eq!(to_slash(&relative), "docs/caf\u{fffd}.txt");
    }

    #[test]
    fn key_mode_parses_from_kebab_case() {
        let mode: KeyMode = serde_json::from_str("\"relative-path\"").unwrap();
        assert_eq!(mode, KeyMode::RelativePath);
        assert_eq!(mode.to_string(), "relative-path");
    }
}
