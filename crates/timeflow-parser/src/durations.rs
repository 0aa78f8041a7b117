//! Reader for duration files and the duration grammar.
//!
//! A duration file maps activity names to their typical duration:
//!
//! ```text
//! # activity | duration
//! Submit  | 00:10:00
//! Approve | 2 days 01:30:00
//! Archive | 1h30m
//! ```
//!
//! Only lines containing `|` are significant; everything else is skipped,
//! which allows comments and blank lines.
//!
//! # Duration grammar
//!
//! Three forms are accepted:
//!
//! - `D days HH:MM:SS[.fff]` (also `1 day ...`), the canonical form
//! - `HH:MM:SS[.fff]` where hours may exceed 23
//! - unit sequences such as `1d2h30m`, `3h 15m`, `1.5h`, `45s` or `250ms`
//!
//! Bare numbers without a unit and negative values are rejected.

use log::{debug, warn};
use winnow::{
    Parser as _,
    ascii::{digit1, space0, space1},
    combinator::{alt, opt, preceded, repeat},
    error::{ContextError, ErrMode},
    stream::AsChar,
    token::take_while,
};

use timeflow_core::duration::{ActivityDuration, DurationTable};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    lines::source_lines,
    span::Span,
};

const SEPARATOR: char = '|';

const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SECOND: u128 = 1_000 * NANOS_PER_MILLI;
const NANOS_PER_MINUTE: u128 = 60 * NANOS_PER_SECOND;
const NANOS_PER_HOUR: u128 = 60 * NANOS_PER_MINUTE;
const NANOS_PER_DAY: u128 = 24 * NANOS_PER_HOUR;

/// Longest fraction accepted after a decimal point.
const MAX_FRACTION_DIGITS: usize = 18;

type IResult<O> = Result<O, ErrMode<ContextError>>;

/// Parses a duration file into a [`DurationTable`].
///
/// When a name appears more than once, the last entry wins.
///
/// # Errors
///
/// Returns a [`ParseError`] with one diagnostic per malformed significant
/// line: [`ErrorCode::E200`] when the name or duration is empty and
/// [`ErrorCode::E201`] when the duration cannot be parsed.
pub fn parse_durations(src: &str) -> Result<DurationTable, ParseError> {
    let mut table = DurationTable::new();
    let mut collector = DiagnosticCollector::new();

    for line in source_lines(src) {
        let Some((name_part, duration_part)) = line.text.split_once(SEPARATOR) else {
            continue;
        };
        let name = name_part.trim();
        let text = duration_part.trim();
        let text_start = name_part.len() + 1 + (duration_part.len() - duration_part.trim_start().len());

        if name.is_empty() || text.is_empty() {
            let missing = if name.is_empty() { "activity name" } else { "duration" };
            collector.emit(
                Diagnostic::error(format!("missing {missing}"))
                    .with_code(ErrorCode::E200)
                    .with_label(Span::new(0..line.text.len()), format!("no {missing} here"))
                    .with_help("write `<activity> | <duration>`")
                    .offset_labels(line.offset)
                    .with_message_prefix(&line.prefix()),
            );
            continue;
        }

        match parse_duration(text) {
            Ok(duration) => {
                if let Some(previous) = table.insert(name, duration) {
                    warn!(
                        line = line.number,
                        name,
                        previous:% = previous,
                        duration:% = duration;
                        "Duplicate duration, keeping the last value"
                    );
                }
            }
            Err(diag) => collector.emit(
                diag.offset_labels(line.offset + text_start)
                    .with_message_prefix(&line.prefix()),
            ),
        }
    }
    collector.finish()?;

    debug!(entries = table.len(); "Durations parsed");
    Ok(table)
}

/// Parses a single duration string.
///
/// Surrounding whitespace is ignored. Label spans in the returned
/// diagnostic are relative to `text`.
///
/// # Example
///
/// ```
/// use timeflow_parser::parse_duration;
///
/// let ten_minutes = parse_duration("00:10:00").unwrap();
/// assert_eq!(parse_duration("10m").unwrap(), ten_minutes);
/// assert_eq!(ten_minutes.to_string(), "0 days 00:10:00");
///
/// assert!(parse_duration("ten minutes").is_err());
/// ```
pub fn parse_duration(text: &str) -> Result<ActivityDuration, Diagnostic> {
    let trimmed = text.trim();
    let leading = text.len() - text.trim_start().len();
    let span = Span::new(leading..leading + trimmed.len());

    let forms: [fn(&mut &str) -> IResult<Vec<Component>>; 3] =
        [days_and_clock, clock, unit_sequence];
    let components = forms
        .iter()
        .find_map(|form| {
            let mut input = trimmed;
            match form(&mut input) {
                Ok(components) if input.is_empty() => Some(components),
                _ => None,
            }
        })
        .ok_or_else(|| {
            Diagnostic::error(format!("invalid duration `{trimmed}`"))
                .with_code(ErrorCode::E201)
                .with_label(span, "not a recognized duration")
                .with_help("use `HH:MM:SS`, `2 days 01:00:00` or units like `1h30m`")
        })?;

    components
        .iter()
        .try_fold(0u128, |total, component| total.checked_add(component.nanos()?))
        .and_then(ActivityDuration::try_from_total_nanos)
        .ok_or_else(|| {
            Diagnostic::error(format!("duration `{trimmed}` is too large"))
                .with_code(ErrorCode::E201)
                .with_label(span, "out of range")
        })
}

/// A decimal fraction such as the `25` in `1.25h`.
#[derive(Debug, Clone, Copy)]
struct Fraction {
    numerator: u128,
    digits: u32,
}

/// One `<number><unit>` term of a duration.
#[derive(Debug, Clone, Copy)]
struct Component {
    whole: u128,
    fraction: Option<Fraction>,
    unit: u128,
}

impl Component {
    fn whole(whole: u128, unit: u128) -> Self {
        Self {
            whole,
            fraction: None,
            unit,
        }
    }

    /// Total nanoseconds, truncating sub-nanosecond fractions.
    fn nanos(&self) -> Option<u128> {
        let whole = self.whole.checked_mul(self.unit)?;
        let fraction = match self.fraction {
            Some(Fraction { numerator, digits }) => {
                numerator.checked_mul(self.unit)? / 10u128.pow(digits)
            }
            None => 0,
        };
        whole.checked_add(fraction)
    }
}

fn number(input: &mut &str) -> IResult<u128> {
    digit1.try_map(str::parse::<u128>).parse_next(input)
}

fn fraction(input: &mut &str) -> IResult<Fraction> {
    preceded(
        '.',
        take_while(1..=MAX_FRACTION_DIGITS, AsChar::is_dec_digit),
    )
    .try_map(|digits: &str| {
        digits.parse::<u128>().map(|numerator| Fraction {
            numerator,
            digits: digits.len() as u32,
        })
    })
    .parse_next(input)
}

/// Two-digit minutes or seconds field, below 60.
fn sexagesimal(input: &mut &str) -> IResult<u128> {
    take_while(2, AsChar::is_dec_digit)
        .try_map(str::parse::<u128>)
        .verify(|value: &u128| *value < 60)
        .parse_next(input)
}

/// `HH:MM:SS[.fff]`
fn clock(input: &mut &str) -> IResult<Vec<Component>> {
    let hours = number.parse_next(input)?;
    let minutes = preceded(':', sexagesimal).parse_next(input)?;
    let seconds = preceded(':', sexagesimal).parse_next(input)?;
    let fraction = opt(fraction).parse_next(input)?;

    Ok(vec![
        Component::whole(hours, NANOS_PER_HOUR),
        Component::whole(minutes, NANOS_PER_MINUTE),
        Component {
            whole: seconds,
            fraction,
            unit: NANOS_PER_SECOND,
        },
    ])
}

/// `D days HH:MM:SS[.fff]`, also `Ddays HH:MM:SS` and `D day, HH:MM:SS`.
fn days_and_clock(input: &mut &str) -> IResult<Vec<Component>> {
    let days = number.parse_next(input)?;
    (space0, alt(("days", "day")), opt(','), space1)
        .void()
        .parse_next(input)?;
    let mut components = clock.parse_next(input)?;
    components.insert(0, Component::whole(days, NANOS_PER_DAY));
    Ok(components)
}

fn unit(input: &mut &str) -> IResult<u128> {
    alt((
        alt(("milliseconds", "millisecond", "millis", "msecs", "msec", "ms")).value(NANOS_PER_MILLI),
        alt(("seconds", "second", "secs", "sec", "s")).value(NANOS_PER_SECOND),
        alt(("minutes", "minute", "mins", "min", "m")).value(NANOS_PER_MINUTE),
        alt(("hours", "hour", "hrs", "hr", "h")).value(NANOS_PER_HOUR),
        alt(("days", "day", "d")).value(NANOS_PER_DAY),
    ))
    .parse_next(input)
}

/// `1.5h`, ` 30 min`
fn unit_component(input: &mut &str) -> IResult<Component> {
    space0.parse_next(input)?;
    let whole = number.parse_next(input)?;
    let fraction = opt(fraction).parse_next(input)?;
    space0.parse_next(input)?;
    let unit = unit.parse_next(input)?;
    Ok(Component {
        whole,
        fraction,
        unit,
    })
}

/// `1d2h30m`, `3h 15m`
fn unit_sequence(input: &mut &str) -> IResult<Vec<Component>> {
    repeat(1.., unit_component).parse_next(input)
}
