//! Line-oriented pad script read by `panel drive`.
//!
//! ```text
//! power 150
//! press upleft touch
//! release touch
//! menu
//! ```

use client_core::pad::{Direction, InputSource, PadEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveInput {
    Pad(PadEvent),
    Power(u32),
}

/// Blank lines and `#` comments parse to `None`.
pub fn parse_line(line: &str) -> Result<Option<DriveInput>, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut words = line.split_whitespace();
    let verb = words.next().unwrap_or_default().to_ascii_lowercase();
    let input = match verb.as_str() {
        "press" => {
            let direction = words
                .next()
                .ok_or_else(|| "press needs a direction".to_string())?
                .parse::<Direction>()?;
            let source = parse_source(words.next())?;
            DriveInput::Pad(PadEvent::PressStart { direction, source })
        }
        "release" => DriveInput::Pad(PadEvent::Release {
            source: parse_source(words.next())?,
        }),
        "menu" => DriveInput::Pad(PadEvent::ContextMenu),
        "power" => {
            let raw = words
                .next()
                .ok_or_else(|| "power needs a value".to_string())?;
            let power = raw
                .parse::<u32>()
                .map_err(|err| format!("invalid power `{raw}`: {err}"))?;
            DriveInput::Power(power)
        }
        other => return Err(format!("unknown pad command `{other}`")),
    };

    if let Some(extra) = words.next() {
        return Err(format!("unexpected argument `{extra}`"));
    }
    Ok(Some(input))
}

fn parse_source(word: Option<&str>) -> Result<InputSource, String> {
    match word.map(str::to_ascii_lowercase).as_deref() {
        None | Some("mouse") => Ok(InputSource::Mouse),
        Some("touch") => Ok(InputSource::Touch),
        Some(other) => Err(format!("unknown input source `{other}`")),
    }
}

#[cfg(test)]
#[path = "tests/drive_tests.rs"]
mod tests;
