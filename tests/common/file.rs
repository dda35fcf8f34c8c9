use crate::common::SCRIPTS_DIR;
use derive_new::new;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Eq, PartialEq, new)]
pub struct FileSpec {
    pub path: PathBuf,
    pub content: String,
}

pub fn write_file(file_spec: FileSpec) {
    // make sure the parent directory exists
    if let Some(parent) = file_spec.path.parent() {
        std::fs::create_dir_all(parent)
            .unwrap_or_else(|e| panic!("Failed to create directory {:?}: {}", parent, e));
    }

    std::fs::write(&file_spec.path, &file_spec.content)
        .unwrap_or_else(|e| panic!("Failed to write file {:?}: {}", file_spec.path, e));
}

/// Drop a changescript named `<id>.sql` into the repository's script directory
pub fn write_changescript(dir: &Path, id: &str, statement: &str) {
    write_file(FileSpec::new(
        dir.join(SCRIPTS_DIR).join(format!("{id}.sql")),
        statement.to_string(),
    ));
}
