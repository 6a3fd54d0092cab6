use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use unic_langid::LanguageIdentifier;
use xlfsync::formats::{FormatType, LOCALIZABLE_STRINGS_SUFFIX};

/// Directories that never contain sources worth converting.
const SKIPPED_DIRECTORIES: [&str; 2] = ["bin", "TestAssets"];
/// XAML files are only rule pages when they live in a directory of this name.
const RULES_DIRECTORY: &str = "Rules";

/// Finds every artifact under `root`, in the order they are converted.
///
/// Within a directory, `.resx` files come first, then `.vsct`, C# string
/// classes and XAML rules; a directory is finished before its
/// subdirectories. Localized copies (`Strings.de.resx`) and the contents of
/// `xlf_directory` are left out.
pub fn discover(
    root: &Path,
    languages: &[String],
    xlf_directory: &str,
) -> Result<Vec<PathBuf>, ignore::Error> {
    let xlf_directory = xlf_directory.to_string();
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            if !is_dir || entry.depth() == 0 {
                return true;
            }
            let name = entry.file_name().to_string_lossy();
            !SKIPPED_DIRECTORIES.contains(&name.as_ref()) && name != xlf_directory.as_str()
        })
        .build();

    let mut artifacts = Vec::new();
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let path = entry.path();
        if classify(path, languages).is_some() {
            artifacts.push(path.to_path_buf());
        }
    }

    artifacts.sort_by(|a, b| {
        a.parent()
            .cmp(&b.parent())
            .then_with(|| rank(a, languages).cmp(&rank(b, languages)))
            .then_with(|| a.cmp(b))
    });
    Ok(artifacts)
}

/// The format `path` is converted with, or `None` when it is not an artifact.
pub fn classify(path: &Path, languages: &[String]) -> Option<FormatType> {
    let format = FormatType::from_path(path)?;
    let file_name = path.file_name()?.to_str()?;
    match format {
        FormatType::Resx | FormatType::Vsct => is_neutral(file_name, languages).then_some(format),
        FormatType::CSharp => file_name
            .ends_with(LOCALIZABLE_STRINGS_SUFFIX)
            .then_some(format),
        FormatType::Xaml => {
            let parent = path.parent()?.file_name()?;
            (parent == RULES_DIRECTORY).then_some(format)
        }
    }
}

fn rank(path: &Path, languages: &[String]) -> u8 {
    match classify(path, languages) {
        Some(FormatType::Resx) => 0,
        Some(FormatType::Vsct) => 1,
        Some(FormatType::CSharp) => 2,
        Some(FormatType::Xaml) => 3,
        None => 4,
    }
}

/// A file is neutral unless its second extension names a language, either
/// one of the configured targets or any two-letter language tag.
pub fn is_neutral(file_name: &str, languages: &[String]) -> bool {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);
    let Some(candidate) = Path::new(stem).extension().and_then(|e| e.to_str()) else {
        return true;
    };
    if languages.iter().any(|l| l.eq_ignore_ascii_case(candidate)) {
        return false;
    }
    !candidate
        .parse::<LanguageIdentifier>()
        .is_ok_and(|id| id.language.as_str().len() == 2)
}
