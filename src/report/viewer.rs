use anyhow::{Context, Result};
use std::path::Path;
use std::process::{Command, Stdio};

/// Hands the rendered page to the desktop's default viewer without waiting on it.
pub fn open(path: &Path) -> Result<()> {
    let mut cmd = opener_command(path);
    cmd.stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    cmd.spawn()
        .with_context(|| format!("failed to launch a viewer for {}", path.display()))?;
    Ok(())
}

fn opener_command(path: &Path) -> Command {
    if cfg!(target_os = "macos") {
        let mut cmd = Command::new("open");
        cmd.arg(path);
        cmd
    } else if cfg!(target_os = "windows") {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", "start", ""]).arg(path);
        cmd
    } else {
        let mut cmd = Command::new("xdg-open");
        cmd.arg(path);
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opener_targets_the_page() {
        let cmd = opener_command(Path::new("/tmp/plot.html"));
        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(args.last().copied(), Some(Path::new("/tmp/plot.html").as_os_str()));
    }
}
