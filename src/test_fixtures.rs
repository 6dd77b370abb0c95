//! Fixtures shared by unit tests: fake Maya installs, preference trees and
//! distribution bundles built inside temp directories.

use std::fs;
use std::path::{Path, PathBuf};

/// Write a file, creating parent directories.
pub fn write_file(path: &Path, content: &str) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    fs::write(path, content).expect("Failed to write fixture file");
    path.to_path_buf()
}

/// A runnable stand-in for the Maya executable.
pub fn fake_executable(path: &Path) -> PathBuf {
    write_file(path, "#!/bin/sh\nexit 0\n");

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(path, perms).unwrap();
    }

    path.to_path_buf()
}

/// A distribution root named `tool_name` with all three resource groups.
pub fn distribution(parent: &Path, tool_name: &str) -> PathBuf {
    let root = parent.join(tool_name);
    write_file(
        &root.join("shelves").join("add_to_shelf.mel"),
        "global proc add_to_shelf(string $shelf, string $label, string $cmd, string $icon) {}\n",
    );
    write_file(
        &root.join("scripts").join("__init__.py"),
        "version = \"2.1.0\"\n",
    );
    write_file(&root.join("scripts").join("main.py"), "def run():\n    pass\n");
    write_file(
        &root.join("scripts").join("core").join("scaler.py"),
        "SCALE = 1.0\n",
    );
    write_file(&root.join("icons").join("tool.png"), "png");
    write_file(&root.join("icons").join("README.txt"), "not an image");
    root
}

/// Snapshot of every file below `root` as (relative path, content).
pub fn tree_snapshot(root: &Path) -> Vec<(PathBuf, Vec<u8>)> {
    let mut files: Vec<_> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let relative = e.path().strip_prefix(root).unwrap().to_path_buf();
            let content = fs::read(e.path()).unwrap();
            (relative, content)
        })
        .collect();
    files.sort();
    files
}
