//! Flight recorder (IGC) loader.
//!
//! Header (`H`), extension (`I`) and fix (`B`) records are decoded with the
//! `igc` crate. This module adds the `.gz` wrapper, speed extensions, UTC
//! midnight rollover and the strict time ordering the scorer expects.
//! Everything else in the file is ignored.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use chrono::NaiveDate;
use flate2::read::GzDecoder;
use ::igc::records::{BRecord, Extendable, HRecord, IRecord};
use serde::Serialize;

use crate::error::ScoreResult;
use crate::types::{Fix, Position, TraceHeader};

const SECONDS_PER_DAY: f64 = 86_400.0;
const KMH_TO_MS: f64 = 1.0 / 3.6;
/// Byte offset of the extension string within a B record
const B_RECORD_FIXED_LEN: usize = 35;

/// Parsed recorder file
#[derive(Clone, Debug, Default, Serialize)]
pub struct IgcFile {
    pub header: TraceHeader,
    pub fixes: Vec<Fix>,
    /// B records that could not be decoded
    pub skipped_records: usize,
    /// Fixes dropped because their time did not increase
    pub dropped_fixes: usize,
}

/// Byte columns of one B-record extension (0-based start in the record, length)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Column {
    start: usize,
    len: usize,
}

impl Column {
    fn slice<'a>(&self, extension_string: &'a str) -> Option<&'a str> {
        let offset = self.start.checked_sub(B_RECORD_FIXED_LEN)?;
        extension_string.get(offset..offset + self.len)
    }
}

/// Load an IGC file, transparently decompressing `.gz`
pub fn load_igc(path: &Path) -> ScoreResult<IgcFile> {
    let file = File::open(path)?;
    if path.extension().map(|e| e == "gz").unwrap_or(false) {
        parse_igc_gz(file)
    } else {
        parse_igc(BufReader::new(file))
    }
}

pub fn parse_igc<R: BufRead>(reader: R) -> ScoreResult<IgcFile> {
    let mut igc = IgcFile::default();
    let mut extensions: HashMap<String, Column> = HashMap::new();
    let mut day_offset = 0.0;
    let mut last_clock: Option<f64> = None;

    for (line_no, line) in reader.split(b'\n').enumerate() {
        let raw = line?;
        // Recorders are not always strict about encoding in free-text headers
        let text = String::from_utf8_lossy(&raw);
        let line = text.trim_end_matches(['\r', '\n']);

        match line.as_bytes().first() {
            Some(b'H') => parse_header(line, &mut igc.header),
            Some(b'I') => match parse_extensions(line) {
                Some(columns) => extensions = columns,
                None => log::warn!("ignoring malformed I record on line {}", line_no + 1),
            },
            Some(b'B') => {
                let Some(mut fix) = parse_fix(line, &extensions) else {
                    log::warn!("skipping malformed B record on line {}", line_no + 1);
                    igc.skipped_records += 1;
                    continue;
                };

                // Clock going back by more than half a day is a UTC midnight rollover
                if let Some(previous) = last_clock {
                    if fix.time < previous - SECONDS_PER_DAY / 2.0 {
                        day_offset += SECONDS_PER_DAY;
                    }
                }
                last_clock = Some(fix.time);
                fix.time += day_offset;

                if let Some(last) = igc.fixes.last() {
                    if fix.time <= last.time {
                        log::warn!(
                            "dropping out-of-order fix on line {} ({:.0}s after {:.0}s)",
                            line_no + 1,
                            fix.time,
                            last.time
                        );
                        igc.dropped_fixes += 1;
                        continue;
                    }
                }
                igc.fixes.push(fix);
            }
            _ => {}
        }
    }

    log::info!(
        "loaded {} fixes ({} malformed, {} out of order)",
        igc.fixes.len(),
        igc.skipped_records,
        igc.dropped_fixes
    );
    Ok(igc)
}

/// Read an IGC document already held in memory
pub fn parse_igc_str(content: &str) -> ScoreResult<IgcFile> {
    parse_igc(content.as_bytes())
}

/// Read a gzip-compressed IGC stream
pub fn parse_igc_gz<R: Read>(reader: R) -> ScoreResult<IgcFile> {
    parse_igc(BufReader::new(GzDecoder::new(reader)))
}

fn parse_header(line: &str, header: &mut TraceHeader) {
    // Free-text values may carry non-ASCII names; the record layout is ASCII
    let ascii: String = line
        .chars()
        .map(|c| if c.is_ascii() { c } else { '?' })
        .collect();
    let Ok(record) = HRecord::parse(&ascii) else {
        log::debug!("ignoring unparsable header: {}", ascii);
        return;
    };

    let value = record.data.trim();
    let non_empty = || Some(value).filter(|v| !v.is_empty()).map(str::to_string);

    match &*record.mnemonic {
        // HFDTEDATE:ddmmyy[,nn] or the older HFDTEddmmyy
        "DTE" => {
            header.date = parse_date(value).or_else(|| ascii.get(5..).and_then(parse_date));
        }
        "GTY" => header.glider_type = non_empty(),
        "GID" => header.glider_id = non_empty(),
        "PLT" => header.pilot = non_empty(),
        _ => {}
    }
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    let digits: String = text.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.len() < 6 {
        return None;
    }
    let day: u32 = digits[0..2].parse().ok()?;
    let month: u32 = digits[2..4].parse().ok()?;
    let year: i32 = digits[4..6].parse().ok()?;
    NaiveDate::from_ymd_opt(2000 + year, month, day)
}

/// Extension columns declared by an `I` record, keyed by mnemonic
fn parse_extensions(line: &str) -> Option<HashMap<String, Column>> {
    if !line.is_ascii() {
        return None;
    }
    let record = IRecord::parse(line).ok()?;
    let columns = record
        .0
        .extensions
        .iter()
        .filter_map(|ext| {
            let start = usize::from(ext.start_byte);
            let end = usize::from(ext.end_byte);
            (start >= 1 && end >= start).then(|| {
                (
                    ext.mnemonic.to_string(),
                    Column {
                        start: start - 1,
                        len: end - start + 1,
                    },
                )
            })
        })
        .collect();
    Some(columns)
}

fn parse_fix(line: &str, extensions: &HashMap<String, Column>) -> Option<Fix> {
    if !line.is_ascii() {
        return None;
    }
    let record = BRecord::parse(line).ok()?;

    let clock = &record.timestamp;
    let time = f64::from(clock.hours) * 3600.0 + f64::from(clock.minutes) * 60.0 + f64::from(clock.seconds);
    let latitude: f64 = record.pos.lat.into();
    let longitude: f64 = record.pos.lon.into();
    let altitude = if record.pressure_alt != 0 {
        f64::from(record.pressure_alt)
    } else {
        f64::from(record.gps_alt)
    };

    let mut fix = Fix::new(time, Position::new(latitude, longitude), altitude);
    fix.true_airspeed = extension_speed(record.extension_string(), extensions.get("TAS"));
    fix.ground_speed = extension_speed(record.extension_string(), extensions.get("GSP"));
    Some(fix)
}

/// Speed extension in m/s; 3-digit fields are km/h, wider ones hundredths of km/h
fn extension_speed(extension_string: &str, column: Option<&Column>) -> Option<f64> {
    let column = column?;
    let raw: f64 = column.slice(extension_string)?.trim().parse().ok()?;
    let kmh = if column.len > 3 { raw / 100.0 } else { raw };
    Some(kmh * KMH_TO_MS)
}
