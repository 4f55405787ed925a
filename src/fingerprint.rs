use crate::hashing::{combine, hash_bytes, hash_str};
use crate::options::Options;
use path_slash::PathBufExt;
use std::path::Path;

/// Computes the fingerprint over the output prefix, sorted input roots,
/// sorted flag tokens, and the recursive content of every PNG under each
/// input root. Any change to any of these changes the fingerprint.
pub fn compute(options: &Options, flag_tokens: &[&str]) -> std::io::Result<u64> {
    let output_prefix = options.output_dir.join(&options.output_name);
    let mut h = combine(0, hash_str(&normalize(&output_prefix)));

    let mut input_strs: Vec<String> = options.inputs.iter().map(|p| normalize(p)).collect();
    input_strs.sort();
    h = combine(h, hash_str(&input_strs.concat()));

    let mut tokens: Vec<&str> = flag_tokens.to_vec();
    tokens.sort();
    for token in tokens {
        h = combine(h, hash_str(token));
    }

    for input in &options.inputs {
        let meta = match std::fs::metadata(input) {
            Ok(meta) => meta,
            Err(err) => {
                log::error!("cannot open input {}: {}", input.display(), err);
                continue;
            }
        };
        if meta.is_dir() {
            h = hash_dir(input, h)?;
        } else {
            h = hash_file_unconditional(input, h)?;
        }
    }

    Ok(h)
}

fn normalize(path: &Path) -> String {
    path.to_path_buf().to_slash().unwrap_or_else(|| path.display().to_string())
}

fn hash_dir(dir: &Path, mut h: u64) -> std::io::Result<u64> {
    let read_dir = match std::fs::read_dir(dir) {
        Ok(read_dir) => read_dir,
        Err(err) => {
            log::error!("cannot open input {}: {}", dir.display(), err);
            return Ok(h);
        }
    };
    let mut entries: Vec<_> = read_dir.collect::<std::io::Result<_>>()?;
    entries.sort_by_key(|e| e.path());
    for entry in entries {
        let path = entry.path();
        if entry.metadata()?.is_dir() {
            h = hash_dir(&path, h)?;
        } else {
            h = hash_file_png_only(&path, h)?;
        }
    }
    Ok(h)
}

/// Used while walking a directory: non-PNG files are skipped.
fn hash_file_png_only(path: &Path, h: u64) -> std::io::Result<u64> {
    if path.extension().and_then(|s| s.to_str()) != Some("png") {
        return Ok(h);
    }
    hash_file_unconditional(path, h)
}

/// Used for a direct single-file input: hashed unconditionally, no extension filter.
fn hash_file_unconditional(path: &Path, h: u64) -> std::io::Result<u64> {
    let bytes = std::fs::read(path)?;
    Ok(combine(h, hash_bytes(&bytes)))
}

/// Compares `fingerprint` against the sidecar at `<output>.hash`. On a hit
/// (and `force` unset), short-circuits the caller.
pub fn is_unchanged(options: &Options, fingerprint: u64) -> bool {
    if options.force {
        return false;
    }
    let path = options.sidecar_path("hash");
    match std::fs::read_to_string(&path) {
        Ok(contents) => contents.trim() == fingerprint.to_string(),
        Err(_) => false,
    }
}

pub fn save(options: &Options, fingerprint: u64) -> std::io::Result<()> {
    std::fs::write(options.sidecar_path("hash"), fingerprint.to_string())
}

/// Deletes all artifacts a previous run may have left behind, so a failed
/// or reconfigured run never mixes stale pages with fresh ones.
pub fn clean_stale_outputs(options: &Options) -> std::io::Result<()> {
    for ext in ["hash", "bin", "xml", "json"] {
        let path = options.sidecar_path(ext);
        if path.exists() {
            std::fs::remove_file(&path)?;
        }
    }
    for i in 0..16 {
        for ext in ["json", "png"] {
            let path = options
                .output_dir
                .join(format!("{}{}", options.output_name, i))
                .with_extension(ext);
            if path.exists() {
                std::fs::remove_file(&path)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn options_for(dir: &Path) -> Options {
        Options {
            output_dir: dir.to_path_buf(),
            output_name: "atlas".into(),
            inputs: vec![dir.to_path_buf()],
            size: 4096,
            padding: 1,
            xml: false,
            binary: false,
            json: false,
            premultiply: false,
            trim: false,
            force: false,
            unique: false,
            rotate: false,
        }
    }

    #[test]
    fn same_inputs_yield_same_fingerprint() {
        let dir = tempfile::tempdir().unwrap();
        let options = options_for(dir.path());
        let a = compute(&options, &["--trim"]).unwrap();
        let b = compute(&options, &["--trim"]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_flags_yield_different_fingerprint() {
        let dir = tempfile::tempdir().unwrap();
        let options = options_for(dir.path());
        let a = compute(&options, &["--trim"]).unwrap();
        let b = compute(&options, &["--rotate"]).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn new_file_changes_fingerprint() {
        let dir = tempfile::tempdir().unwrap();
        let options = options_for(dir.path());
        let before = compute(&options, &[]).unwrap();
        std::fs::write(dir.path().join("a.png"), b"not really a png, just bytes").unwrap();
        let after = compute(&options, &[]).unwrap();
        assert_ne!(before, after);
    }

    #[test]
    fn cache_hit_after_save() {
        let dir = tempfile::tempdir().unwrap();
        let options = options_for(dir.path());
        let fp = compute(&options, &[]).unwrap();
        assert!(!is_unchanged(&options, fp));
        save(&options, fp).unwrap();
        assert!(is_unchanged(&options, fp));
    }

    #[test]
    fn forced_run_is_never_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let mut options = options_for(dir.path());
        let fp = compute(&options, &[]).unwrap();
        save(&options, fp).unwrap();
        options.force = true;
        assert!(!is_unchanged(&options, fp));
    }

    #[test]
    fn stale_cleanup_removes_known_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let options = options_for(dir.path());
        let _: PathBuf = options.sidecar_path("xml");
        std::fs::write(options.sidecar_path("xml"), "x").unwrap();
        std::fs::write(options.sidecar_path("hash"), "1").unwrap();
        clean_stale_outputs(&options).unwrap();
        assert!(!options.sidecar_path("xml").exists());
        assert!(!options.sidecar_path("hash").exists());
    }
}
