use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Output};
use tempfile::TempDir;

// Not every test binary uses every helper.
#[allow(dead_code)]
pub struct TestContext {
    pub _temp_dir: TempDir,
    pub prefs_dir: PathBuf,
    pub install_root: PathBuf,
    pub modules_dir: PathBuf,
    pub config_path: PathBuf,
    pub search_path: PathBuf,
    pub bin_path: PathBuf,
}

#[allow(dead_code)]
impl TestContext {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let prefs_dir = temp_dir.path().join("maya");
        let install_root = temp_dir.path().join("autodesk");
        let modules_dir = temp_dir.path().join("modules");
        let config_path = temp_dir.path().join("config.json");
        let search_path = temp_dir.path().join("path");

        fs::create_dir_all(&prefs_dir).expect("Failed to create prefs dir");
        fs::create_dir_all(&install_root).expect("Failed to create install root");
        fs::create_dir_all(&search_path).expect("Failed to create search path dir");

        let bin_path = PathBuf::from(env!("CARGO_BIN_EXE_maya-deployer"));

        Self {
            _temp_dir: temp_dir,
            prefs_dir,
            install_root,
            modules_dir,
            config_path,
            search_path,
            bin_path,
        }
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = Command::new(&self.bin_path);
        cmd.env("MAYA_APP_DIR", &self.prefs_dir);
        cmd.env("MAYA_DEPLOYER_INSTALL_ROOT", &self.install_root);
        cmd.env("MAYA_MODULE_DIR", &self.modules_dir);
        cmd.env("MAYA_DEPLOYER_CONFIG", &self.config_path);
        // Keep a real Maya on the developer's PATH out of the picture
        cmd.env("PATH", &self.search_path);
        cmd.env_remove("MAYA_DEPLOYER_SHELF_TAB");
        cmd.env_remove("MAYA_DEPLOYER_NO_PAUSE");
        cmd.env_remove("MAYA_DEPLOYER_NO_LAUNCH");
        cmd.env_remove("RUST_LOG");
        cmd.arg("--no-pause");
        cmd
    }

    pub fn run<I, S>(&self, args: I) -> RunOutput
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.cmd()
            .args(args)
            .output()
            .expect("Failed to run maya-deployer")
            .into()
    }

    /// Run against the distribution `root` with extra `flags`.
    pub fn deploy(&self, root: &Path, flags: &[&str]) -> RunOutput {
        let mut args: Vec<&OsStr> = flags.iter().map(OsStr::new).collect();
        args.push(root.as_os_str());
        self.run(args)
    }

    pub fn temp_path(&self) -> &Path {
        self._temp_dir.path()
    }

    /// Create `<prefs>/<token>` as if Maya had been started once.
    pub fn add_preference_dir(&self, token: &str) -> PathBuf {
        let dir = self.prefs_dir.join(token);
        fs::create_dir_all(&dir).expect("Failed to create version folder");
        dir
    }

    /// Install a fake Maya executable at `<install root>/<relative>`.
    pub fn add_executable(&self, relative: &Path) -> PathBuf {
        let path = self.install_root.join(relative);
        write_file(&path, "#!/bin/sh\nexit 0\n");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&path).unwrap().permissions();
            perms.set_mode(0o755);
            fs::set_permissions(&path, perms).unwrap();
        }

        path
    }

    /// A distribution folder named `tool_name` below `parent` inside the temp dir.
    pub fn distribution(&self, parent: &str, tool_name: &str) -> PathBuf {
        let root = self.temp_path().join(parent).join(tool_name);
        write_file(
            &root.join("shelves").join("add_to_shelf.mel"),
            "global proc add_to_shelf(string $shelf, string $label, string $cmd, string $icon) {}\n",
        );
        write_file(&root.join("scripts").join("__init__.py"), "version = '2.1.0'\n");
        write_file(&root.join("scripts").join("main.py"), "def run():\n    pass\n");
        write_file(&root.join("icons").join("tool.png"), "png");
        root
    }
}

/// Executable location inside a `Maya<token>` install folder.
#[allow(dead_code)]
pub fn executable_rel_path() -> PathBuf {
    if cfg!(target_os = "windows") {
        Path::new("bin").join("maya.exe")
    } else if cfg!(target_os = "macos") {
        Path::new("Maya.app").join("Contents").join("MacOS").join("Maya")
    } else {
        Path::new("bin").join("maya")
    }
}

#[allow(dead_code)]
pub fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    fs::write(path, content).expect("Failed to write file");
}

/// Captured run of the binary with chained assertions.
pub struct RunOutput {
    pub stdout: String,
    pub stderr: String,
    pub status: ExitStatus,
}

impl From<Output> for RunOutput {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            status: output.status,
        }
    }
}

#[allow(dead_code)]
impl RunOutput {
    pub fn ok(&self) -> &Self {
        assert!(
            self.status.success(),
            "exit {:?}\nstdout: {}\nstderr: {}",
            self.status.code(),
            self.stdout,
            self.stderr
        );
        self
    }

    pub fn failed(&self) -> &Self {
        assert!(
            !self.status.success(),
            "expected a failing exit\nstdout: {}\nstderr: {}",
            self.stdout,
            self.stderr
        );
        self
    }

    pub fn stdout_has(&self, text: &str) -> &Self {
        expect_text("stdout", &self.stdout, text, true);
        self
    }

    pub fn stdout_lacks(&self, text: &str) -> &Self {
        expect_text("stdout", &self.stdout, text, false);
        self
    }

    pub fn stderr_has(&self, text: &str) -> &Self {
        expect_text("stderr", &self.stderr, text, true);
        self
    }

    pub fn stderr_lacks(&self, text: &str) -> &Self {
        expect_text("stderr", &self.stderr, text, false);
        self
    }
}

fn expect_text(stream: &str, haystack: &str, needle: &str, present: bool) {
    assert_eq!(
        haystack.contains(needle),
        present,
        "{} {} '{}'\n{}: {}",
        stream,
        if present { "is missing" } else { "unexpectedly has" },
        needle,
        stream,
        haystack
    );
}
