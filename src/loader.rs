use crate::bitmap::Bitmap;
use crate::error::Result;
use crate::options::Options;
use std::path::Path;

/// Use the extensions the `image` crate recognizes to decide whether a path
/// is worth decoding; anything else is logged and skipped.
pub fn is_image_file<P: AsRef<Path>>(path: P) -> bool {
    let ext = path
        .as_ref()
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase())
        .unwrap_or_default();
    matches!(
        ext.as_str(),
        "ico" | "jpg" | "jpeg" | "png" | "pbm" | "pgm" | "ppm" | "pam" | "bmp" | "tif" | "tiff"
    )
}

/// Loads every PNG under `roots` (files are taken as-is, directories walked
/// recursively) into `Bitmap`s. Each bitmap is named by its path relative to
/// the root it was discovered under, extension stripped, '/' as separator.
pub fn load_all(roots: &[std::path::PathBuf], options: &Options) -> Result<Vec<Bitmap>> {
    let mut bitmaps = vec![];
    for root in roots {
        let meta = match std::fs::metadata(root) {
            Ok(meta) => meta,
            Err(err) => {
                log::error!("cannot open input {}: {}", root.display(), err);
                continue;
            }
        };
        if meta.is_dir() {
            load_dir(root, "", &mut bitmaps, options)?;
        } else {
            load_one(root, "", &mut bitmaps, options)?;
        }
    }
    Ok(bitmaps)
}

fn load_dir(dir: &Path, prefix: &str, bitmaps: &mut Vec<Bitmap>, options: &Options) -> Result<()> {
    log::debug!("reading directory {}", dir.display());
    let read_dir = match std::fs::read_dir(dir) {
        Ok(read_dir) => read_dir,
        Err(err) => {
            log::error!("cannot open input {}: {}", dir.display(), err);
            return Ok(());
        }
    };
    let mut entries: Vec<_> = read_dir.collect::<std::io::Result<_>>()?;
    entries.sort_by_key(|e| e.path());
    for entry in entries {
        let meta = entry.metadata()?;
        if meta.is_dir() {
            let name = entry.file_name().to_string_lossy().into_owned();
            let child_prefix = format!("{}{}/", prefix, name);
            load_dir(&entry.path(), &child_prefix, bitmaps, options)?;
        } else {
            load_one(&entry.path(), prefix, bitmaps, options)?;
        }
    }
    Ok(())
}

fn load_one(path: &Path, prefix: &str, bitmaps: &mut Vec<Bitmap>, options: &Options) -> Result<()> {
    let ext = path.extension().and_then(|s| s.to_str());
    if ext != Some("png") {
        if is_image_file(path) {
            log::debug!("skipping non-png raster file {}", path.display());
        }
        return Ok(());
    }

    log::trace!("loading {}", path.display());
    let image = image::open(path)?.to_rgba8();
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .expect("png path always has a UTF-8 stem");
    let name = format!("{}{}", prefix, stem);

    bitmaps.push(Bitmap::new(image, name, options.premultiply, options.trim));
    Ok(())
}
