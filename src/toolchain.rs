use std::ffi::OsString;
use std::fs;
use std::io::Result;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// The fixed compiler configuration used to judge buildability. Success is
/// observed only through `artifact` appearing in the build directory; the
/// compiler's exit status and diagnostics are discarded.
#[derive(Debug, Clone)]
pub struct Toolchain {
    pub program: String,
    pub args: Vec<String>,
    pub source_extension: String,
    pub artifact: String,
    pub timeout: Duration,
}

impl Toolchain {
    /// `g++ -std=c++17 -w` over every `.cpp` directly in the directory,
    /// producing `a.out`.
    pub fn cpp17() -> Self {
        Toolchain {
            program: String::from("g++"),
            args: vec![String::from("-std=c++17"), String::from("-w")],
            source_extension: String::from("cpp"),
            artifact: String::from("a.out"),
            timeout: Duration::from_secs(30),
        }
    }

    /// Invokes the compiler over every matching source directly in `dir`,
    /// diagnostics discarded. A build still running at the timeout is killed;
    /// either way the caller judges the outcome by artifact presence alone.
    pub fn build(&self, dir: &Path) -> Result<()> {
        let sources = self.list_sources(dir)?;
        if sources.is_empty() {
            return Ok(());
        }

        let mut child = Command::new(&self.program)
            .current_dir(dir)
            .args(&self.args)
            .args(&sources)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        let deadline = Instant::now() + self.timeout;
        loop {
            if child.try_wait()?.is_some() {
                break;
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                child.wait()?;
                break;
            }
            thread::sleep(POLL_INTERVAL);
        }
        Ok(())
    }

    pub fn artifact_built(&self, dir: &Path) -> bool {
        dir.join(&self.artifact).is_file()
    }

    fn list_sources(&self, dir: &Path) -> Result<Vec<OsString>> {
        let mut sources = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_file()
                && path
                    .extension()
                    .map_or(false, |ext| ext == self.source_extension.as_str())
            {
                sources.push(entry.file_name());
            }
        }
        sources.sort();
        Ok(sources)
    }
}
