use std::ffi::OsString;
use std::io;
use std::path::Path;
use std::process::Command;

use tracing::{debug, warn};

/// Opens the saved image in the desktop's default viewer and waits for the
/// launcher to return. Does nothing when there is no display to show it on.
pub fn show(path: &Path) -> io::Result<()> {
    if headless(|name| std::env::var_os(name)) {
        warn!(
            "no display available, not opening {} (saved image is unaffected)",
            path.display()
        );
        return Ok(());
    }

    let mut command = viewer_command(path);
    debug!("running {:?}", command);

    let status = command.spawn()?.wait()?;
    if !status.success() {
        return Err(io::Error::other(format!("viewer exited with {}", status)));
    }
    Ok(())
}

fn headless(var: impl Fn(&str) -> Option<OsString>) -> bool {
    if cfg!(any(target_os = "windows", target_os = "macos")) {
        return false;
    }
    let set = |name: &str| var(name).map_or(false, |v| !v.is_empty());
    !set("DISPLAY") && !set("WAYLAND_DISPLAY")
}

fn viewer_command(path: &Path) -> Command {
    if cfg!(target_os = "windows") {
        let mut command = Command::new("cmd");
        command.args(["/C", "start", "/WAIT", ""]).arg(path);
        command
    } else if cfg!(target_os = "macos") {
        let mut command = Command::new("open");
        command.arg("-W").arg(path);
        command
    } else {
        // xdg-open usually returns once the viewer has the file
        let mut command = Command::new("xdg-open");
        command.arg(path);
        command
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<OsString> + 'a {
        move |name: &str| {
            vars.iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| OsString::from(*v))
        }
    }

    #[test]
    #[cfg(all(unix, not(target_os = "macos")))]
    fn detects_headless() {
        assert!(headless(env(&[])));
        assert!(headless(env(&[("DISPLAY", "")])));
        assert!(!headless(env(&[("DISPLAY", ":0")])));
        assert!(!headless(env(&[("WAYLAND_DISPLAY", "wayland-0")])));
    }

    #[test]
    fn viewer_gets_image_path() {
        let command = viewer_command(Path::new("benchmark_results.png"));
        let args: Vec<_> = command.get_args().collect();
        assert_eq!(args.last().copied(), Some(Path::new("benchmark_results.png").as_os_str()));
    }
}
