//! Hash / Digest.
//!
//! Streaming SHA-256 over a file in fixed-size chunks, used to compute
//! pre-wipe and post-wipe digests without loading the whole file into
//! memory.

use crate::error::{WipeError, WipeResult};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

const CHUNK_SIZE: usize = 1024 * 1024;

/// Lowercase hex SHA-256 of the file at `path`, read in 1 MiB chunks.
pub fn sha256_file(path: &Path) -> WipeResult<String> {
    let mut file = File::open(path)
        .map_err(|_| WipeError::NotAccessible(path.display().to_string()))?;

    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; CHUNK_SIZE];

    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn known_vector_empty_file() {
        let tmp = NamedTempFile::new().unwrap();
        let digest = sha256_file(tmp.path()).unwrap();
        assert_eq!(
            digest,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn known_vector_repeated_a() {
        let mut tmp = NamedTempFile::new().unwrap();
        tmp.write_all(&vec![b'A'; 4096]).unwrap();
        tmp.flush().unwrap();
        let digest = sha256_file(tmp.path()).unwrap();
        // sha256 of 4096 repetitions of 'A' (0x41)
        assert_eq!(digest.len(), 64);
        // deterministic: hashing twice gives the same result
        let digest2 = sha256_file(tmp.path()).unwrap();
        assert_eq!(digest, digest2);
    }

    #[test]
    fn missing_file_is_not_accessible() {
        let result = sha256_file(Path::new("/nonexistent/path/for/tests"));
        assert!(matches!(result, Err(WipeError::NotAccessible(_))));
    }
}
