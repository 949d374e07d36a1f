//! SHA-256 checksum files for finished images.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

/// Two spaces between hash and name, as `sha256sum -c` expects.
const SEPARATOR: &str = "  ";

/// Hash a file, streaming it from disk.
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher).with_context(|| format!("read {}", path.display()))?;
    Ok(format!("{:x}", hasher.finalize()))
}

/// Write `<image>.sha256` next to the image and return its path.
pub fn write_checksum(image: &Path) -> Result<PathBuf> {
    let hash = sha256_file(image)?;
    let filename = image
        .file_name()
        .context("image path has no file name")?
        .to_string_lossy();

    let mut checksum_path = image.as_os_str().to_owned();
    checksum_path.push(".sha256");
    let checksum_path = PathBuf::from(checksum_path);

    fs::write(&checksum_path, format!("{}{}{}\n", hash, SEPARATOR, filename))
        .with_context(|| format!("write {}", checksum_path.display()))?;

    println!("  SHA256: {}...{}", &hash[..8], &hash[hash.len() - 8..]);
    println!("  Wrote: {}", checksum_path.display());
    Ok(checksum_path)
}
