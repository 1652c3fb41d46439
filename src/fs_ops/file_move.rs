//! File move implementation.
//! Attempts a plain rename; on cross-filesystem or other rename errors, copies
//! into a temp sibling of the destination, renames it into place, and only then
//! removes the source.

use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::errors::ReorgError;

use super::helpers::io_error_with_help;
use super::metadata::preserve_times;
use super::util::{is_cross_device, unique_temp_path};

/// Move the regular file `src` to `dest`. The caller has already checked that
/// `dest` is free and that its parent exists.
pub(super) fn move_file(src: &Path, dest: &Path) -> Result<(), ReorgError> {
    match fs::rename(src, dest) {
        Ok(()) => {
            debug!(src = %src.display(), dest = %dest.display(), "Renamed file");
            return Ok(());
        }
        Err(e) => {
            let hint = if is_cross_device(&e) {
                "cross-filesystem; will copy instead"
            } else {
                "falling back to copy"
            };
            warn!(error = %e, hint, "Rename failed, using copy+remove");
        }
    }

    copy_file_into_place(src, dest)?;

    if let Err(e) = fs::remove_file(src) {
        // Leave the tree as it was: the source stays, the copy goes.
        let _ = fs::remove_file(dest);
        return Err(io_error_with_help("remove original file", src)(e));
    }
    Ok(())
}

/// Copy `src` to a temp file next to `dest`, carry over its timestamps, then
/// rename the temp file to `dest`. The temp file is removed on any failure.
pub(super) fn copy_file_into_place(src: &Path, dest: &Path) -> Result<(), ReorgError> {
    let dest_dir = dest.parent().unwrap_or_else(|| Path::new("."));
    let src_meta = fs::metadata(src).map_err(io_error_with_help("stat source file", src))?;
    let tmp = unique_temp_path(dest_dir);

    if let Err(e) = fs::copy(src, &tmp) {
        let _ = fs::remove_file(&tmp);
        return Err(io_error_with_help("copy to temporary file", &tmp)(e));
    }
    preserve_times(&tmp, &src_meta);

    if let Err(e) = fs::rename(&tmp, dest) {
        let _ = fs::remove_file(&tmp);
        return Err(io_error_with_help("rename temporary file into place", dest)(e));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use filetime::{set_file_mtime, FileTime};
    use tempfile::tempdir;

    #[test]
    fn copy_into_place_keeps_mtime_and_leaves_no_temp() {
        let td = tempdir().unwrap();
        let src = td.path().join("a.txt");
        fs::write(&src, "alpha").unwrap();
        let old = FileTime::from_unix_time(1_500_000_000, 0);
        set_file_mtime(&src, old).unwrap();

        let dest_dir = td.path().join("out");
        fs::create_dir(&dest_dir).unwrap();
        let dest = dest_dir.join("a.txt");
        copy_file_into_place(&src, &dest).unwrap();

        assert_eq!(fs::read_to_string(&dest).unwrap(), "alpha");
        let mt = FileTime::from_last_modification_time(&fs::metadata(&dest).unwrap());
        assert_eq!(mt, old);
        assert!(src.exists(), "copy must not touch the source");
        for entry in fs::read_dir(&dest_dir).unwrap() {
            let name = entry.unwrap().file_name();
            assert!(!name.to_string_lossy().ends_with(".tmp"), "temp left behind");
        }
    }

    #[test]
    fn move_file_renames() {
        let td = tempdir().unwrap();
        let src = td.path().join("b.txt");
        let dest = td.path().join("c.txt");
        fs::write(&src, "beta").unwrap();
        move_file(&src, &dest).unwrap();
        assert!(!src.exists());
        assert_eq!(fs::read_to_string(&dest).unwrap(), "beta");
    }
}
