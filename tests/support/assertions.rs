//! Filesystem and archive assertions

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use walkdir::WalkDir;
use zip::ZipArchive;

/// Sorted `.jar` file names directly inside `dir`
pub fn library_names(dir: &Path) -> Vec<String> {
    if !dir.is_dir() {
        return Vec::new();
    }
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "jar"))
        .map(|path| path.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

pub fn assert_libraries(dir: &Path, expected: &[&str]) {
    let actual = library_names(dir);
    assert_eq!(
        actual, expected,
        "Libraries in {} do not match",
        dir.display()
    );
}

pub fn assert_no_library(dir: &Path, library: &str) {
    assert!(
        !dir.join(library).exists(),
        "{} should not contain {library}",
        dir.display()
    );
}

/// Sorted entry names of a zip archive
pub fn zip_entries(archive: &Path) -> Vec<String> {
    let mut zip = ZipArchive::new(File::open(archive).unwrap()).unwrap();
    let mut names: Vec<String> = (0..zip.len())
        .map(|i| zip.by_index(i).unwrap().name().to_string())
        .collect();
    names.sort();
    names
}

pub fn read_zip_entry(archive: &Path, name: &str) -> Option<Vec<u8>> {
    let mut zip = ZipArchive::new(File::open(archive).unwrap()).unwrap();
    let mut entry = zip.by_name(name).ok()?;
    let mut content = Vec::new();
    entry.read_to_end(&mut content).unwrap();
    Some(content)
}

/// Entries of a zip nested one level inside another zip
pub fn nested_zip_entries(archive: &Path, inner: &str, scratch: &Path) -> Vec<String> {
    let bytes = read_zip_entry(archive, inner).unwrap();
    let path = scratch.join(inner.replace('/', "_"));
    std::fs::write(&path, bytes).unwrap();
    zip_entries(&path)
}

/// Every regular file below `dir` keyed by its relative path
pub fn snapshot(dir: &Path) -> BTreeMap<String, Vec<u8>> {
    WalkDir::new(dir)
        .into_iter()
        .map(|entry| entry.unwrap())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            let relative = entry
                .path()
                .strip_prefix(dir)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/");
            (relative, std::fs::read(entry.path()).unwrap())
        })
        .collect()
}

pub fn count_occurrences(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}
