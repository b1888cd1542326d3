//! Optional host capability: opening the panel in a separate window.
//!
//! A terminal has no window manager API, so the capability is an external
//! command from the config (for example `alacritty -e stickit`). Without one
//! the pin-window toggle stays purely cosmetic.

use std::io;
use std::process::{Child, Command, Stdio};

pub trait WindowHost {
    fn open_popup(&mut self) -> io::Result<()>;
}

#[derive(Debug)]
pub struct CommandWindowHost {
    program: String,
    args: Vec<String>,
    children: Vec<Child>,
}

impl CommandWindowHost {
    /// `None` for an empty command line.
    pub fn from_command_line(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace().map(|p| shellexpand::tilde(p).to_string());
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
            children: Vec::new(),
        })
    }

    /// Waits on windows that have already exited. Returns how many are still open.
    fn reap(&mut self) -> usize {
        self.children.retain_mut(|child| match child.try_wait() {
            Ok(Some(status)) => {
                log::debug!("window exited with {}", status);
                false
            }
            Ok(None) => true,
            Err(e) => {
                log::warn!("could not poll window process: {}", e);
                false
            }
        });
        self.children.len()
    }
}

impl Drop for CommandWindowHost {
    fn drop(&mut self) {
        self.reap();
    }
}

impl WindowHost for CommandWindowHost {
    fn open_popup(&mut self) -> io::Result<()> {
        self.reap();
        log::info!("opening window with {}", self.program);
        let child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        self.children.push(child);
        Ok(())
    }
}
