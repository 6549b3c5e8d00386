//! Reading regions from delimited text.
//!
//! One region per line: `name, latitude, longitude, radius?`. Fields are
//! trimmed and quotes carry no meaning. Coordinates use `.` as decimal point
//! regardless of locale. A missing or unparsable radius falls back to
//! [`DEFAULT_RADIUS_METERS`](crate::region::DEFAULT_RADIUS_METERS).
//! A bad line never aborts the read; it is reported as
//! [`RecordOutcome::Skipped`] and logged.

use std::fs::File;
use std::io;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::errors::GeofenceResult;
use crate::region::Region;

/// Default field delimiter.
pub const DEFAULT_DELIMITER: u8 = b',';

/// Result of parsing a single record.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome {
    Parsed(Region),
    Skipped { line: u64, reason: String },
}

/// Regions read from one source, plus the number of records that were skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedSource {
    pub regions: Vec<Region>,
    pub skipped: usize,
}

/// Parses one already split record.
///
/// `line` is only used for the skip reason.
pub fn parse_record(record: &StringRecord, line: u64) -> RecordOutcome {
    if record.len() < 3 {
        return RecordOutcome::Skipped {
            line,
            reason: format!("expected at least 3 fields, found {}", record.len()),
        };
    }

    let name = record[0].trim();
    let lat = match parse_coordinate(&record[1], "latitude") {
        Ok(lat) => lat,
        Err(reason) => return RecordOutcome::Skipped { line, reason },
    };
    let lng = match parse_coordinate(&record[2], "longitude") {
        Ok(lng) => lng,
        Err(reason) => return RecordOutcome::Skipped { line, reason },
    };
    let radius = record
        .get(3)
        .and_then(|field| field.trim().parse::<i32>().ok());

    RecordOutcome::Parsed(match radius {
        Some(radius) => Region::new(name, lat, lng, radius),
        None => Region::with_default_radius(name, lat, lng),
    })
}

fn parse_coordinate(field: &str, what: &str) -> Result<f64, String> {
    let field = field.trim();
    match field.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        Ok(value) => Err(format!("{} is not finite: {}", what, value)),
        Err(e) => Err(format!("invalid {} '{}': {}", what, field, e)),
    }
}

/// Parses a single line using `delimiter`.
pub fn parse_line(line: &str, delimiter: u8) -> RecordOutcome {
    let mut reader = reader_builder(delimiter).from_reader(line.as_bytes());
    let mut record = StringRecord::new();
    match reader.read_record(&mut record) {
        Ok(true) => parse_record(&record, 1),
        Ok(false) => RecordOutcome::Skipped {
            line: 1,
            reason: "empty line".to_string(),
        },
        Err(e) => RecordOutcome::Skipped {
            line: 1,
            reason: e.to_string(),
        },
    }
}

/// Reads every record from `reader`, skipping and logging bad ones.
///
/// `source` names the input in log lines.
pub fn read_regions<R: io::Read>(reader: R, delimiter: u8, source: &str) -> ParsedSource {
    let mut reader = reader_builder(delimiter).from_reader(reader);
    let mut parsed = ParsedSource::default();

    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or_default();
                log::warn!("Skipping line {} of {}: {}", line, source, e);
                parsed.skipped += 1;
                if e.is_io_error() {
                    break;
                }
                continue;
            }
        };

        let line = record.position().map(|p| p.line()).unwrap_or_default();
        match parse_record(&record, line) {
            RecordOutcome::Parsed(region) => parsed.regions.push(region),
            RecordOutcome::Skipped { line, reason } => {
                log::warn!("Skipping line {} of {}: {}", line, source, reason);
                parsed.skipped += 1;
            }
        }
    }

    parsed
}

/// Opens `path` and reads its regions.
pub fn read_region_file(path: &Path, delimiter: u8) -> GeofenceResult<ParsedSource> {
    let file = File::open(path)?;
    Ok(read_regions(file, delimiter, &path.display().to_string()))
}

fn reader_builder(delimiter: u8) -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    builder
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(Trim::All)
        .delimiter(delimiter);
    builder
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(outcome: RecordOutcome) -> Region {
        match outcome {
            RecordOutcome::Parsed(region) => region,
            RecordOutcome::Skipped { reason, .. } => panic!("unexpected skip: {}", reason),
        }
    }

    #[test]
    fn test_parse_full_record() {
        let region = parsed(parse_line("Home, 48.0, 11.0, 100", DEFAULT_DELIMITER));
        assert_eq!(region, Region::new("Home", 48.0, 11.0, 100));
    }

    #[test]
    fn test_missing_radius_defaults_to_50() {
        let region = parsed(parse_line("Store,48.1,11.2", DEFAULT_DELIMITER));
        assert_eq!(region.radius_meters(), 50);
        assert_eq!(region.name(), "Store");
    }

    #[test]
    fn test_unparsable_radius_defaults_to_50() {
        let region = parsed(parse_line("Store,48.1,11.2,wide", DEFAULT_DELIMITER));
        assert_eq!(region.radius_meters(), 50);

        let region = parsed(parse_line("Store,48.1,11.2,", DEFAULT_DELIMITER));
        assert_eq!(region.radius_meters(), 50);
    }

    #[test]
    fn test_name_and_numbers_are_trimmed() {
        let region = parsed(parse_line("  Supercharger Munich \t, 48.25 ,  11.65,  30 ", DEFAULT_DELIMITER));
        assert_eq!(region.name(), "Supercharger Munich");
        assert_eq!(region.lat(), 48.25);
        assert_eq!(region.lng(), 11.65);
        assert_eq!(region.radius_meters(), 30);
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let region = parsed(parse_line("Work,48.1,11.5,200,+home", DEFAULT_DELIMITER));
        assert_eq!(region.radius_meters(), 200);
    }

    #[test]
    fn test_too_few_fields_is_skipped() {
        let outcome = parse_line("Broken,48.1", DEFAULT_DELIMITER);
        assert!(matches!(outcome, RecordOutcome::Skipped { .. }));
    }

    #[test]
    fn test_bad_coordinate_is_skipped() {
        let outcome = parse_line("Broken,48,1,11.2", DEFAULT_DELIMITER);
        // A comma used as decimal separator shifts the fields instead of failing.
        assert!(matches!(outcome, RecordOutcome::Parsed(_)));

        let outcome = parse_line("Broken,north,11.2", DEFAULT_DELIMITER);
        match outcome {
            RecordOutcome::Skipped { reason, .. } => assert!(reason.contains("latitude")),
            other => panic!("expected skip, got {:?}", other),
        }

        let outcome = parse_line("Broken,48.1,east", DEFAULT_DELIMITER);
        match outcome {
            RecordOutcome::Skipped { reason, .. } => assert!(reason.contains("longitude")),
            other => panic!("expected skip, got {:?}", other),
        }
    }

    #[test]
    fn test_non_finite_coordinate_is_skipped() {
        assert!(matches!(
            parse_line("Nowhere,NaN,11.2", DEFAULT_DELIMITER),
            RecordOutcome::Skipped { .. }
        ));
        assert!(matches!(
            parse_line("Nowhere,48.1,inf", DEFAULT_DELIMITER),
            RecordOutcome::Skipped { .. }
        ));
    }

    #[test]
    fn test_custom_delimiter() {
        let region = parsed(parse_line("Home;48.0;11.0;75", b';'));
        assert_eq!(region, Region::new("Home", 48.0, 11.0, 75));
    }

    #[test]
    fn test_read_regions_skips_malformed_lines() {
        let input = "Home,48.0,11.0,100\n\
                     garbage line\n\
                     Work,48.1,11.5,200\n\
                     \n\
                     Store,48.1,11.2\n\
                     Bad,x,y\n";
        let parsed = read_regions(input.as_bytes(), DEFAULT_DELIMITER, "test");
        assert_eq!(parsed.regions.len(), 3);
        assert_eq!(parsed.skipped, 2);
        let names: Vec<_> = parsed.regions.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["Home", "Work", "Store"]);
    }

    #[test]
    fn test_unbalanced_quote_only_skips_its_line() {
        let input = "\"Broken line\n\
                     Home,48.0,11.0,100\n\
                     Work,48.1,11.5,200\n\
                     Store,48.2,11.2\n";
        let parsed = read_regions(input.as_bytes(), DEFAULT_DELIMITER, "test");
        assert_eq!(parsed.skipped, 1);
        let names: Vec<_> = parsed.regions.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["Home", "Work", "Store"]);
    }

    #[test]
    fn test_quotes_do_not_group_fields() {
        // the comma inside the quotes still splits the name
        let outcome = parse_line("\"Home, sweet\",48.0,11.0,100", DEFAULT_DELIMITER);
        match outcome {
            RecordOutcome::Skipped { reason, .. } => assert!(reason.contains("latitude")),
            other => panic!("expected skip, got {:?}", other),
        }

        let region = parsed(parse_line("\"Home\",48.0,11.0,100", DEFAULT_DELIMITER));
        assert_eq!(region.name(), "\"Home\"");
    }

    #[test]
    fn test_read_regions_empty_input() {
        let parsed = read_regions("".as_bytes(), DEFAULT_DELIMITER, "empty");
        assert!(parsed.regions.is_empty());
        assert_eq!(parsed.skipped, 0);
    }

    #[test]
    fn test_read_region_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("geofence.csv");
        std::fs::write(&path, "Home,48.0,11.0,100\nWork,48.1,11.5\n").unwrap();

        let parsed = read_region_file(&path, DEFAULT_DELIMITER).unwrap();
        assert_eq!(parsed.regions.len(), 2);
        assert_eq!(parsed.regions[1].radius_meters(), 50);
    }

    #[test]
    fn test_read_region_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_region_file(&dir.path().join("nope.csv"), DEFAULT_DELIMITER);
        assert!(result.is_err());
    }
}
