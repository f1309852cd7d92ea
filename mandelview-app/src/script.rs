//! Text scripts of input events for the headless driver.
//!
//! One event per line; blank lines and `#` comments are skipped.
//!
//! ```text
//! key i            # zoom in
//! key P            # previous palette (upper case is modified)
//! key t shift      # fewer workers
//! escape
//! press 100 80
//! drag 300 200
//! release 300 200 shift
//! ```

use crate::error::{AppError, Result};
use crate::input::InputEvent;

/// Parse a whole script.
pub fn parse(source: &str) -> Result<Vec<InputEvent>> {
    let mut events = Vec::new();
    for (index, line) in source.lines().enumerate() {
        if let Some(event) = parse_line(line, index + 1)? {
            events.push(event);
        }
    }
    Ok(events)
}

fn parse_line(line: &str, number: usize) -> Result<Option<InputEvent>> {
    let line = line.split('#').next().unwrap_or_default().trim();
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();
    let err = |message: String| AppError::Script {
        line: number,
        message,
    };

    let event = match verb {
        "escape" => {
            expect_args(&args, 0, 0, verb).map_err(err)?;
            InputEvent::Escape
        }
        "key" => {
            expect_args(&args, 1, 2, verb).map_err(err)?;
            let mut chars = args[0].chars();
            let ch = match (chars.next(), chars.next()) {
                (Some(ch), None) => ch,
                _ => return Err(err(format!("expected a single character, got `{}`", args[0]))),
            };
            InputEvent::Key {
                ch,
                modified: modifier(&args[1..]).map_err(err)?,
            }
        }
        "press" => {
            expect_args(&args, 2, 2, verb).map_err(err)?;
            let (x, y) = point(&args).map_err(err)?;
            InputEvent::PointerPressed { x, y }
        }
        "drag" | "release" => {
            expect_args(&args, 2, 3, verb).map_err(err)?;
            let (x, y) = point(&args).map_err(err)?;
            let modified = modifier(&args[2..]).map_err(err)?;
            if verb == "drag" {
                InputEvent::PointerDragged { x, y, modified }
            } else {
                InputEvent::PointerReleased { x, y, modified }
            }
        }
        other => return Err(err(format!("unknown event `{other}`"))),
    };
    Ok(Some(event))
}

fn expect_args(
    args: &[&str],
    min: usize,
    max: usize,
    verb: &str,
) -> std::result::Result<(), String> {
    if (min..=max).contains(&args.len()) {
        Ok(())
    } else if min == max {
        Err(format!("`{verb}` takes {min} argument(s), got {}", args.len()))
    } else {
        Err(format!(
            "`{verb}` takes {min} to {max} arguments, got {}",
            args.len()
        ))
    }
}

fn point(args: &[&str]) -> std::result::Result<(i32, i32), String> {
    let coord = |s: &str| {
        s.parse::<i32>()
            .map_err(|_| format!("expected an integer coordinate, got `{s}`"))
    };
    Ok((coord(args[0])?, coord(args[1])?))
}

fn modifier(rest: &[&str]) -> std::result::Result<bool, String> {
    match rest {
        [] => Ok(false),
        ["shift"] => Ok(true),
        [other] => Err(format!("unknown modifier `{other}`")),
        _ => Err("too many arguments".to_string()),
    }
}
