use derive_new::new;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Eq, PartialEq, new)]
pub struct FileSpec {
    pub path: PathBuf,
    pub content: String,
}

pub fn write_file(file_spec: FileSpec) {
    std::fs::write(&file_spec.path, file_spec.content).expect("Failed to write file");
}

pub fn read_file(dir: &Path, file_name: &str) -> String {
    std::fs::read_to_string(dir.join(file_name)).expect("Failed to read file")
}

/// Snapshot of every plain file at the top level of `dir`, sorted by name
pub fn snapshot(dir: &Path) -> Vec<(String, Vec<u8>)> {
    let mut files = std::fs::read_dir(dir)
        .expect("Failed to list directory")
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .map(|entry| {
            let content = std::fs::read(entry.path()).expect("Failed to read file");
            (entry.file_name().to_string_lossy().to_string(), content)
        })
        .collect::<Vec<_>>();
    files.sort();

    files
}
