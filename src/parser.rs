use crate::error::StageError;
use crate::srt::Cue;

use std::time::Duration;

use nom::bytes::complete::{tag, take_while, take_while1, take_while_m_n};
use nom::character::complete::{digit1, line_ending, multispace0, multispace1, one_of, space1};
use nom::combinator::{map_res, opt};
use nom::error::{convert_error, ErrorKind, VerboseError};
use nom::multi::many_till;
use nom::sequence::terminated;
use nom::{branch::alt, error_position, Err, IResult};
use tracing::debug;

/// Parses SRT text into cues, keeping the order in which they are written.
///
/// Cue order matters downstream: when two cues overlap, the one written first
/// takes precedence, so nothing is sorted here.
pub fn parse(input: &str) -> Result<Vec<Cue>, StageError> {
    match srt_file(input) {
        Ok((_, cues)) => {
            debug!(count = cues.len(), "parsed SRT cues");
            Ok(cues)
        }
        Err(Err::Error(err)) | Err(Err::Failure(err)) => {
            Err(StageError::parse(convert_error(input, err)))
        }
        Err(Err::Incomplete(_)) => Err(StageError::parse(
            "Incomplete data received by non-streaming parser.",
        )),
    }
}

fn optional_bom(input: &str) -> IResult<&str, Option<&str>, VerboseError<&str>> {
    opt(tag("\u{FEFF}"))(input)
}

fn srt_file(input: &str) -> IResult<&str, Vec<Cue>, VerboseError<&str>> {
    let (input, _) = optional_bom(input)?;
    let (input, cues) = all_cues(input)?;
    let (input, _) = end_of_file(input)?;
    Ok((input, cues))
}

fn all_cues(input: &str) -> IResult<&str, Vec<Cue>, VerboseError<&str>> {
    let mut parsed = Vec::new();
    let mut input = input;
    loop {
        match cue(input) {
            Ok((rem_input, cue)) => {
                parsed.push(cue);
                let (rem_input, _) = multispace0(rem_input)?;
                input = rem_input;
            }
            Err(err) => {
                if input.is_empty() {
                    return Ok((input, parsed));
                } else {
                    return Err(err);
                }
            }
        }
    }
}

fn cue(input: &str) -> IResult<&str, Cue, VerboseError<&str>> {
    let (input, _) = multispace0(input)?;
    let (input, sequence_number) = terminated(seq_num, multispace1)(input)?;
    let (input, (show_at, hide_at)) = terminated(show_hide, alt((line_ending, end_of_file)))(input)?;
    let (input, text) = cue_text(input)?;

    Ok((
        input,
        Cue {
            sequence_number: Some(sequence_number),
            show_at,
            hide_at,
            text,
        },
    ))
}

fn end_of_file(input: &str) -> IResult<&str, &str, VerboseError<&str>> {
    if input.is_empty() {
        Ok((input, input))
    } else {
        Err(Err::Error(error_position!(input, ErrorKind::Eof)))
    }
}

fn cue_text(input: &str) -> IResult<&str, Vec<String>, VerboseError<&str>> {
    let line = terminated(
        take_while1(|c: char| c != '\n' && c != '\r'),
        alt((line_ending, end_of_file)),
    );

    let (input, (lines, _)) = many_till(line, alt((line_ending, end_of_file)))(input)?;

    Ok((input, lines.into_iter().map(String::from).collect()))
}

fn show_hide(input: &str) -> IResult<&str, (Duration, Duration), VerboseError<&str>> {
    let (input, show_at) = timestamp(input)?;
    let (input, _) = space1(input)?;
    let (input, _) = tag("-->")(input)?;
    let (input, _) = space1(input)?;
    let (input, hide_at) = timestamp(input)?;
    // Position hints such as `X1:40 X2:600` may follow the end timestamp.
    let (input, _) = take_while(|c: char| c != '\n' && c != '\r')(input)?;

    Ok((input, (show_at, hide_at)))
}

fn timestamp(input: &str) -> IResult<&str, Duration, VerboseError<&str>> {
    const MILLIS_MIN: usize = 0;
    const MILLIS_MAX: usize = 3;
    let take_millis = || {
        map_res(
            take_while_m_n(MILLIS_MIN, MILLIS_MAX, |c: char| c.is_ascii_digit()),
            |s: &str| {
                // `,2` means 200 ms: right-pad to three digits.
                format!("{:0<3}", s).parse::<u64>()
            },
        )
    };

    const HMS_MIN: usize = 0;
    const HMS_MAX: usize = 2;
    let take_hms = || {
        map_res(
            take_while_m_n(HMS_MIN, HMS_MAX, |c: char| c.is_ascii_digit()),
            |s: &str| {
                // `1:13:45` means 01:13:45: left-pad instead.
                format!("{:0>2}", s).parse::<u64>()
            },
        )
    };

    let (input, hours) = take_hms()(input)?;
    let (input, _) = tag(":")(input)?;
    let (input, minutes) = take_hms()(input)?;
    let (input, _) = tag(":")(input)?;
    let (input, seconds) = take_hms()(input)?;
    // WebVTT-style `.` shows up in hand-authored files.
    let (input, _) = one_of(",.")(input)?;
    let (input, millis) = take_millis()(input)?;

    Ok((
        input,
        Duration::from_millis(
            millis + seconds * 1000 + minutes * 60 * 1000 + hours * 60 * 60 * 1000,
        ),
    ))
}

fn seq_num(input: &str) -> IResult<&str, usize, VerboseError<&str>> {
    map_res(digit1, |s: &str| s.parse())(input)
}
