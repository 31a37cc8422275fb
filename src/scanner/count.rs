use crate::utils::file::is_path_excluded;
use glob::Pattern;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeCount {
    pub files: usize,
    pub directories: usize,
    pub excluded: usize,
}

/// Count what a scan of `path` will visit, for sizing the progress bar.
pub fn count<P: AsRef<Path>>(
    path: P,
    max_depth: usize,
    exclude_patterns: &[Pattern],
) -> std::io::Result<TreeCount> {
    let path = path.as_ref();

    if is_path_excluded(path, exclude_patterns) {
        return Ok(TreeCount {
            excluded: 1,
            ..TreeCount::default()
        });
    }
    if fs::metadata(path)?.is_file() {
        return Ok(TreeCount {
            files: 1,
            ..TreeCount::default()
        });
    }

    let mut total = TreeCount {
        directories: 1,
        ..TreeCount::default()
    };

    for entry in fs::read_dir(path)? {
        let entry_path = entry?.path();

        if is_path_excluded(&entry_path, exclude_patterns) {
            total.excluded += 1;
            continue;
        }

        let Ok(metadata) = fs::metadata(&entry_path) else {
            continue;
        };
        if metadata.is_file() {
            total.files += 1;
        } else if metadata.is_dir() {
            if max_depth > 0 {
                let sub = count(&entry_path, max_depth - 1, exclude_patterns)?;
                total.files += sub.files;
                total.directories += sub.directories;
                total.excluded += sub.excluded;
            } else {
                total.directories += 1;
            }
        }
    }

    Ok(total)
}
