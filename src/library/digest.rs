//! Content digests for spotting duplicate libraries that are not identical

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// SHA-256 of a file as lowercase hex
pub fn sha256_file(path: &Path) -> std::io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0; 8192];
    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

/// True when the files do not all share the same content
pub fn differ<'a>(paths: impl IntoIterator<Item = &'a Path>) -> std::io::Result<bool> {
    let mut first: Option<String> = None;
    for path in paths {
        let digest = sha256_file(path)?;
        match &first {
            Some(expected) if *expected != digest => return Ok(true),
            Some(_) => {}
            None => first = Some(digest),
        }
    }
    Ok(false)
}
