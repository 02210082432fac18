//! X11 focus probe built on the `xdotool` command-line tool.
//!
//! Each query runs three short-lived `xdotool` invocations
//! (`getactivewindow`, `getwindowpid`, `getwindowname`), each bounded by the
//! probe timeout. The process name is read from `/proc/<pid>/comm`.

use super::{app_identifier, FocusProbe, DEFAULT_PROBE_TIMEOUT};
use crate::error::ProbeError;
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::OnceLock;
use std::thread;
use std::time::{Duration, Instant};

const XDOTOOL: &str = "xdotool";
const POLL_STEP: Duration = Duration::from_millis(10);

static XDOTOOL_AVAILABLE: OnceLock<bool> = OnceLock::new();

/// Check if xdotool is installed and available in PATH
pub fn xdotool_available() -> bool {
    *XDOTOOL_AVAILABLE.get_or_init(|| {
        Command::new(XDOTOOL)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    })
}

#[derive(Debug, Clone)]
pub struct XdotoolProbe {
    timeout: Duration,
    proc_root: PathBuf,
}

impl Default for XdotoolProbe {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_TIMEOUT)
    }
}

impl XdotoolProbe {
    /// Probe whose individual `xdotool` calls give up after `timeout`
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            proc_root: PathBuf::from("/proc"),
        }
    }

    fn xdotool(&self, args: &[&str]) -> Result<String, ProbeError> {
        let mut command = Command::new(XDOTOOL);
        command.args(args);
        run_with_timeout(&mut command, self.timeout)
    }

    /// Lower-cased executable name of `pid`
    fn process_name(&self, pid: u32) -> Result<String, ProbeError> {
        let comm = self.proc_root.join(pid.to_string()).join("comm");
        let name = fs::read_to_string(&comm).map_err(|source| ProbeError::Io {
            command: format!("read {}", comm.display()),
            source,
        })?;
        Ok(name.trim().to_lowercase())
    }
}

impl FocusProbe for XdotoolProbe {
    fn active_application(&self) -> Result<String, ProbeError> {
        let window_id = self.xdotool(&["getactivewindow"])?;
        if window_id.is_empty() || window_id == "0" {
            return Err(ProbeError::NoActiveWindow);
        }

        let pid = self.xdotool(&["getwindowpid", &window_id])?;
        let process_name = match parse_pid(&pid)? {
            Some(pid) => self.process_name(pid)?,
            None => super::UNKNOWN_APP.to_string(),
        };

        let window_name = self.xdotool(&["getwindowname", &window_id])?;
        Ok(app_identifier(&window_name, &process_name))
    }
}

/// Parse `getwindowpid` output; `0` or empty means the window has no pid.
fn parse_pid(output: &str) -> Result<Option<u32>, ProbeError> {
    if output.is_empty() || output == "0" {
        return Ok(None);
    }
    output
        .parse::<u32>()
        .map(Some)
        .map_err(|_| ProbeError::InvalidOutput {
            command: "xdotool getwindowpid".to_string(),
            output: output.to_string(),
        })
}

/// Run `command`, returning its trimmed stdout or failing after `timeout`.
///
/// A child that outlives the timeout is killed and reaped.
fn run_with_timeout(command: &mut Command, timeout: Duration) -> Result<String, ProbeError> {
    let display = format!("{command:?}");
    let io_err = |source: std::io::Error| ProbeError::Io {
        command: display.clone(),
        source,
    };

    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(io_err)?;

    let deadline = Instant::now() + timeout;
    loop {
        if child.try_wait().map_err(io_err)?.is_some() {
            break;
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Err(ProbeError::Timeout {
                command: display,
                timeout,
            });
        }
        thread::sleep(POLL_STEP);
    }

    let output = child.wait_with_output().map_err(io_err)?;
    if !output.status.success() {
        return Err(ProbeError::CommandFailed {
            command: display,
            status: output.status.to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
