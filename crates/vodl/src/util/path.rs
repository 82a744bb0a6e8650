use std::{
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
};

/// Location of the `index`-th segment of a job: `{cwd}/{prefix}_{index}.ts`.
pub fn segment_path<P>(cwd: P, prefix: &str, index: usize) -> PathBuf
where
    P: AsRef<Path>,
{
    cwd.as_ref().join(format!("{prefix}_{index}.ts"))
}

/// Segment file prefix for an output file, which is its file stem.
pub fn segment_prefix<P>(output_name: P) -> String
where
    P: AsRef<Path>,
{
    output_name
        .as_ref()
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "segment".to_string())
}

pub trait VodlPathExt {
    /// Add suffix to file name without changing extension.
    ///
    /// Note this function does not handle multiple suffixes.
    /// For example, `test.tar.gz` with `_suffix` will be `test.tar_suffix.gz`.
    fn add_suffix<T: AsRef<OsStr>>(&mut self, suffix: T);
}

impl VodlPathExt for PathBuf {
    fn add_suffix<T: AsRef<OsStr>>(&mut self, suffix: T) {
        let mut filename = OsString::new();

        // {file_stem}_{suffix}.{ext}
        if let Some(file_stem) = self.file_stem() {
            filename.push(file_stem);
        }
        filename.push("_");
        filename.push(suffix);

        if let Some(ext) = self.extension() {
            filename.push(".");
            filename.push(ext);
        }

        self.set_file_name(filename);
    }
}
