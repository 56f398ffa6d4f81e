//! Shared helpers for integration tests.

use std::fs;
use std::io::Read;
use std::path::Path;

/// Verify that a file contains only zeros.
#[allow(dead_code)]
pub fn verify_all_zeros(path: &Path) -> std::io::Result<bool> {
    let mut file = fs::File::open(path)?;
    let mut buffer = vec![0u8; 4096];

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        if buffer[..bytes_read].iter().any(|&b| b != 0) {
            return Ok(false);
        }
    }

    Ok(true)
}

/// Shannon entropy of a byte slice, used to distinguish random fill from
/// constant fill without depending on the engine's internal sampler.
#[allow(dead_code)]
pub fn shannon_entropy(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let mut counts = [0u64; 256];
    for &byte in data {
        counts[byte as usize] += 1;
    }
    let len = data.len() as f64;
    counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Build a directory tree with heterogeneous file sizes (0, 1, 100, 1024,
/// 1 MiB, plus five larger sizes up to 4 MiB), one read-only file, and one
/// empty subdirectory.
#[allow(dead_code)]
pub fn build_mixed_size_tree(root: &Path) {
    fs::create_dir_all(root).unwrap();
    fs::write(root.join("f_0.bin"), []).unwrap();
    fs::write(root.join("f_1.bin"), [0x11u8]).unwrap();
    fs::write(root.join("f_100.bin"), vec![0x22u8; 100]).unwrap();
    fs::write(root.join("f_1024.bin"), vec![0x33u8; 1024]).unwrap();
    fs::write(root.join("f_1mib.bin"), vec![0x44u8; 1024 * 1024]).unwrap();

    for (i, size) in [4096usize, 65536, 262144, 1048576, 4194304]
        .into_iter()
        .enumerate()
    {
        fs::write(root.join(format!("f_rand_{i}.bin")), vec![(i as u8).wrapping_add(1); size]).unwrap();
    }

    let readonly_path = root.join("f_readonly.bin");
    fs::write(&readonly_path, vec![0x55u8; 256]).unwrap();
    let mut perms = fs::metadata(&readonly_path).unwrap().permissions();
    perms.set_readonly(true);
    fs::set_permissions(&readonly_path, perms).unwrap();

    fs::create_dir_all(root.join("empty_sub")).unwrap();
}
