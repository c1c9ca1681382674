//! Keyboard Input
//!
//! | Key              | Command                   |
//! |------------------|---------------------------|
//! | `k`              | switch to kid mode        |
//! | `c`              | switch to cyber mode      |
//! | `l`              | lock                      |
//! | `h`              | say hello                 |
//! | `q`, `Esc`, `^C` | shut down                 |

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use tokio::task::JoinHandle;

use robot_core::{OperationalMode, RobotCommand, RobotHandle};

/// What `h` makes the robot say
pub const HELLO_TEXT: &str = "Hello! I am Kali!";

/// Command for a key press, if the key is bound
#[must_use]
pub fn command_for_key(key: KeyEvent) -> Option<RobotCommand> {
    // Only handle Press events (not Release or Repeat)
    if key.kind != KeyEventKind::Press {
        return None;
    }

    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(RobotCommand::Shutdown)
        }
        KeyCode::Char('k') => Some(RobotCommand::SetMode(OperationalMode::Kid)),
        KeyCode::Char('c') => Some(RobotCommand::SetMode(OperationalMode::Cyber)),
        KeyCode::Char('l') => Some(RobotCommand::SetMode(OperationalMode::Locked)),
        KeyCode::Char('h') => Some(RobotCommand::Speak {
            text: HELLO_TEXT.to_string(),
            voice: None,
        }),
        KeyCode::Char('q') | KeyCode::Esc => Some(RobotCommand::Shutdown),
        _ => None,
    }
}

/// Forward terminal key presses to the driver until it stops
pub fn spawn_input_task(handle: RobotHandle) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut events = EventStream::new();

        while let Some(event) = events.next().await {
            let key = match event {
                Ok(Event::Key(key)) => key,
                Ok(_) => continue,
                Err(e) => {
                    tracing::warn!(error = %e, "Terminal input failed");
                    break;
                }
            };

            let Some(command) = command_for_key(key) else {
                continue;
            };
            tracing::debug!(?command, "Key command");
            if handle.command(command).await.is_err() || !handle.is_running() {
                break;
            }
        }
    })
}
