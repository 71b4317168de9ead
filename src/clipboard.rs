use anyhow::Result;
use arboard::Clipboard;
#[cfg(target_os = "linux")]
use arboard::SetExtLinux;

pub const DAEMON_FLAG: &str = "__clipboard_daemon";

/// On Linux the clipboard belongs to the process that set it, so a
/// short-lived process would lose the selection on exit. The daemon
/// child reads the text from stdin, claims the clipboard and parks.
#[cfg(target_os = "linux")]
fn run_daemon_mode() -> Result<()> {
    let text = std::io::read_to_string(std::io::stdin())?;

    let mut clipboard = Clipboard::new()?;
    match clipboard.set().wait().text(text) {
        Ok(_waiter) => {
            std::thread::park(); // keep the process alive so the selection stays valid
            unreachable!("clipboard daemon should park indefinitely");
        }
        Err(e) => Err(anyhow::Error::from(e)),
    }
}

/// Checks for the daemon flag in argv. Returns Ok(true) if daemon mode
/// ran (caller should exit), Ok(false) otherwise.
pub fn check_and_run_daemon_if_requested() -> Result<bool> {
    if std::env::args().any(|a| a == DAEMON_FLAG) {
        #[cfg(target_os = "linux")]
        {
            run_daemon_mode()?;
            return Ok(true);
        }
        #[cfg(not(target_os = "linux"))]
        {
            log::warn!("{DAEMON_FLAG} flag used on a non-Linux system; ignoring");
            std::process::exit(0);
        }
    }
    Ok(false)
}

/// Replace the clipboard contents with `text`. One atomic set, no retry.
pub fn copy_text_to_clipboard(text: String) -> Result<()> {
    #[cfg(not(target_os = "linux"))]
    {
        let mut clipboard = Clipboard::new()?;
        clipboard.set_text(text)?;
    }

    #[cfg(target_os = "linux")]
    {
        use std::io::Write;
        use std::process::{Command, Stdio};

        let mut child = Command::new(std::env::current_exe()?)
            .arg(DAEMON_FLAG)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .current_dir("/")
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes())?;
            stdin.flush()?;
        } else {
            return Err(anyhow::anyhow!("failed to get stdin for clipboard daemon"));
        }
    }
    Ok(())
}
