/// Deciding which files may be moved.
///
/// A file is eligible when it is a regular file whose content type is known
/// and whose primary type is not `application`. The `application` exclusion
/// keeps executables and archives, including this program itself, in place.
///
/// # Examples
///
/// ```
/// use datesort::classifier::primary_type;
///
/// assert_eq!(primary_type("image/png"), "image");
/// assert_eq!(primary_type("Application/ZIP"), "application");
/// ```
use std::fs;
use std::path::Path;

/// The outcome of classifying one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eligibility {
    /// The file may be moved.
    Eligible { mime: String },
    /// Not a regular file (or its metadata is unreadable).
    NotRegularFile,
    /// The primary content type is `application`.
    Application { mime: String },
    /// No content type could be determined.
    UnknownType,
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Eligibility::Eligible { .. })
    }
}

/// Decides whether a file may be relocated.
pub trait FileClassifier: Send + Sync {
    fn classify(&self, path: &Path) -> Eligibility;
}

/// Classifies files by sniffing their content, falling back to the extension.
///
/// Content detection (`infer`) wins over the extension (`mime_guess`), so a
/// zip archive renamed to `.txt` is still treated as an archive.
#[derive(Debug, Default, Clone, Copy)]
pub struct ContentClassifier;

impl ContentClassifier {
    /// Returns the MIME type of `path`, if one can be determined.
    pub fn probe_content_type(path: &Path) -> Option<String> {
        match infer::get_from_path(path) {
            Ok(Some(kind)) => return Some(kind.mime_type().to_string()),
            Ok(None) => {}
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Cannot sniff content");
            }
        }

        mime_guess::from_path(path)
            .first()
            .map(|mime| mime.essence_str().to_string())
    }
}

impl FileClassifier for ContentClassifier {
    fn classify(&self, path: &Path) -> Eligibility {
        match fs::metadata(path) {
            Ok(meta) if meta.is_file() => {}
            _ => return Eligibility::NotRegularFile,
        }

        let Some(mime) = Self::probe_content_type(path) else {
            return Eligibility::UnknownType;
        };

        if primary_type(&mime) == "application" {
            Eligibility::Application { mime }
        } else {
            Eligibility::Eligible { mime }
        }
    }
}

/// Returns the lowercased primary type of a MIME string (`image` for `image/png`).
pub fn primary_type(mime: &str) -> String {
    mime.split('/').next().unwrap_or_default().trim().to_lowercase()
}
