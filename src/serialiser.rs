use crate::error::{StageError, StageResult};
use crate::subtitle::{SubtitleInterval, SubtitleTrack};

use std::io::Write;
use std::time::Duration;

/// Writes the track as bilingual SRT: original line, then the translation.
pub fn serialise<W: Write>(track: &SubtitleTrack, mut dst: W) -> StageResult<()> {
    for (index, interval) in track.intervals().iter().enumerate() {
        if index > 0 {
            writeln!(dst)?;
        }
        write_sub(&mut dst, interval)?;
    }
    dst.flush()?;
    Ok(())
}

pub fn serialise_json<W: Write>(track: &SubtitleTrack, mut dst: W) -> StageResult<()> {
    serde_json::to_writer_pretty(&mut dst, track)?;
    writeln!(dst)?;
    dst.flush()?;
    Ok(())
}

/// Each text field becomes exactly one SRT line, so the first line read back
/// is always the original.
fn write_sub<W: Write>(buf: &mut W, sub: &SubtitleInterval) -> StageResult<()> {
    let [original, translated] = sub.lines().map(single_line);
    if original.is_empty() && !translated.is_empty() {
        return Err(StageError::serde(format!(
            "subtitle {} has a translation but no original text, which SRT cannot hold",
            sub.id
        )));
    }

    writeln!(buf, "{}", sub.id)?;
    write_ts(buf, seconds_to_duration(sub.start_time))?;
    write!(buf, " --> ")?;
    write_ts(buf, seconds_to_duration(sub.end_time))?;
    writeln!(buf)?;
    for line in [original, translated].iter().filter(|l| !l.is_empty()) {
        writeln!(buf, "{}", line)?;
    }
    Ok(())
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Negative and non-finite times collapse to zero.
fn seconds_to_duration(seconds: f64) -> Duration {
    if seconds.is_finite() && seconds > 0.0 {
        Duration::from_millis((seconds * 1000.0).round() as u64)
    } else {
        Duration::ZERO
    }
}

fn write_ts<W: Write>(buf: &mut W, timestamp: Duration) -> StageResult<()> {
    let total_secs = timestamp.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    let millis = timestamp.as_millis() % 1000;
    write!(
        buf,
        "{:02}:{:02}:{:02},{:03}",
        hours, minutes, seconds, millis
    )?;
    Ok(())
}
