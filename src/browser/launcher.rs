use crate::config::schema::BrowserConfig;
use std::path::Path;
use std::process::{Command, Stdio};

/// Build the Chrome launch command for an automation session.
pub fn build_command(config: &BrowserConfig, cdp_port: u16, user_data_dir: &Path) -> Command {
    let mut cmd = Command::new(&config.chrome_path);

    // Throwaway profile so no cookies leak between runs
    cmd.arg(format!("--user-data-dir={}", user_data_dir.display()));

    cmd.arg(format!("--remote-debugging-port={}", cdp_port));

    if config.headless {
        cmd.arg("--headless=new");
        cmd.arg("--disable-gpu");
    }

    cmd.arg("--no-first-run");
    cmd.arg("--no-default-browser-check");
    cmd.arg("--disable-background-networking");
    cmd.arg("--disable-sync");

    for arg in &config.extra_args {
        cmd.arg(arg);
    }

    cmd.arg("about:blank");

    // Chrome is chatty on stderr; keep our own output clean
    cmd.stdout(Stdio::null());
    cmd.stderr(Stdio::null());

    cmd
}
