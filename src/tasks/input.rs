//! Reference host input adapter.
//!
//! Reads line commands from stdin and feeds the controller, standing in for
//! the pointer and keyboard wiring of a real host shell:
//!
//! ```text
//! move | press              pointer motion / pointer button
//! left right up down space escape    key names (DOM names work too)
//! key <NAME>                any other key
//! speed <MULTIPLIER>        auto-play speed
//! reverse                   flip auto-play direction
//! loop                      toggle item loop
//! scene next | scene prev   collection jumps
//! quit                      shut down (EOF does the same)
//! ```
//!
//! The reader lives on a plain thread: a blocking terminal read parked on
//! the runtime's blocking pool would stall shutdown until the user pressed
//! enter, while a detached thread dies with the process.

use std::io::BufRead;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::events::InputEvent;

/// Spawns the stdin reader. It cancels `cancel` when input ends, `quit` is
/// typed, or the controller goes away.
pub fn spawn(events: mpsc::Sender<InputEvent>, cancel: CancellationToken) {
    std::thread::spawn(move || read_loop(&events, &cancel));
}

fn read_loop(events: &mpsc::Sender<InputEvent>, cancel: &CancellationToken) {
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        if cancel.is_cancelled() {
            return;
        }
        let Ok(line) = line else { break };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.eq_ignore_ascii_case("quit") {
            break;
        }
        match parse_line(trimmed) {
            Some(event) => {
                if events.blocking_send(event).is_err() {
                    break;
                }
            }
            None => warn!(line = %trimmed, "unrecognized command"),
        }
    }
    info!("input closed, shutting down");
    cancel.cancel();
}

fn parse_line(line: &str) -> Option<InputEvent> {
    let mut parts = line.split_whitespace();
    let head = parts.next()?.to_ascii_lowercase();
    let event = match head.as_str() {
        "move" | "m" => InputEvent::PointerMoved,
        "press" | "click" => InputEvent::PointerPressed,
        "left" | "right" | "up" | "down" | "space" | "escape" => InputEvent::Key(head),
        "key" => InputEvent::Key(parts.next()?.to_string()),
        "speed" => {
            let value: f32 = parts.next()?.parse().ok()?;
            if !value.is_finite() {
                return None;
            }
            InputEvent::SetSpeed(value)
        }
        "reverse" => InputEvent::ToggleDirection,
        "loop" => InputEvent::ToggleLoop,
        "scene" => match parts.next()?.to_ascii_lowercase().as_str() {
            "next" | "+" => InputEvent::AdvanceCollection,
            "prev" | "-" => InputEvent::RetreatCollection,
            _ => return None,
        },
        _ => return None,
    };
    Some(event)
}
