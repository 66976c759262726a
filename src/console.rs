//! Stdin control console
//!
//! Each line is split with shell quoting rules and parsed as a subcommand,
//! then forwarded to the render loop.

use std::io::BufRead;
use std::thread::{self, JoinHandle};

use clap::{Parser, Subcommand};
use tokio::sync::mpsc;

/// Requests the render loop drains once per frame.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayCommand {
    /// Show the gauges
    Show,
    /// Hide the gauges
    Hide,
    /// Flip gauge visibility
    Toggle,
    /// Re-read the game window position now
    Resync,
    /// Close the overlay
    #[command(alias = "exit")]
    Quit,
}

#[derive(Parser, Debug)]
#[command(name = "truckmon", about = "overlay console", disable_version_flag = true)]
struct ConsoleLine {
    #[command(subcommand)]
    command: OverlayCommand,
}

/// Parse one console line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<OverlayCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let mut args = shlex::split(line).ok_or("error: Invalid quoting")?;
    args.insert(0, "truckmon".to_string());
    let parsed = ConsoleLine::try_parse_from(args).map_err(|e| e.to_string())?;
    Ok(Some(parsed.command))
}

/// Read commands from stdin until EOF, `quit`, or the loop going away.
pub fn spawn(commands: mpsc::Sender<OverlayCommand>) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("console".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                match parse_command(&line) {
                    Ok(Some(command)) => {
                        if commands.blocking_send(command).is_err() {
                            break;
                        }
                        if command == OverlayCommand::Quit {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(err) => eprintln!("{err}"),
                }
            }
            tracing::debug!("Console reader stopped");
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_each_command() {
        assert_eq!(parse_command("show"), Ok(Some(OverlayCommand::Show)));
        assert_eq!(parse_command("hide"), Ok(Some(OverlayCommand::Hide)));
        assert_eq!(parse_command("  toggle  "), Ok(Some(OverlayCommand::Toggle)));
        assert_eq!(parse_command("resync"), Ok(Some(OverlayCommand::Resync)));
        assert_eq!(parse_command("quit"), Ok(Some(OverlayCommand::Quit)));
        assert_eq!(parse_command("exit"), Ok(Some(OverlayCommand::Quit)));
    }

    #[test]
    fn blank_line_is_ignored() {
        assert_eq!(parse_command(""), Ok(None));
        assert_eq!(parse_command("   \t"), Ok(None));
    }

    #[test]
    fn unknown_command_is_an_error() {
        assert!(parse_command("dance").is_err());
        assert!(parse_command("show extra").is_err());
    }

    #[test]
    fn unbalanced_quotes_rejected() {
        assert_eq!(
            parse_command("show \"oops"),
            Err("error: Invalid quoting".to_string())
        );
    }

    #[tokio::test]
    async fn commands_reach_the_loop_channel() {
        let (tx, mut rx) = mpsc::channel(4);
        let sender = std::thread::spawn(move || {
            for line in ["hide", "resync"] {
                if let Ok(Some(cmd)) = parse_command(line) {
                    tx.blocking_send(cmd).unwrap();
                }
            }
        });
        assert_eq!(rx.recv().await, Some(OverlayCommand::Hide));
        assert_eq!(rx.recv().await, Some(OverlayCommand::Resync));
        sender.join().unwrap();
    }
}
