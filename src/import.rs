use crate::errors::ScanError;
use crate::model::{fold_into_hosts, CameraType, Host, SourceRecord};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

/// Read a provider export file: one JSON record per line. Blank lines are
/// skipped; a malformed line is reported and skipped, never fatal.
pub fn read_records(path: &Path) -> Result<Vec<SourceRecord>, ScanError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut records = Vec::new();

    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match serde_json::from_str::<SourceRecord>(line) {
            Ok(record) => records.push(record),
            Err(err) => eprintln!(
                "Warning: skipping line {} of {}: {}",
                number + 1,
                path.display(),
                err
            ),
        }
    }

    Ok(records)
}

/// Import hosts from an export file, folding records that share an IP
/// into a single host
pub fn import_hosts(path: &Path, camera_type: &Arc<CameraType>) -> Result<Vec<Host>, ScanError> {
    Ok(fold_into_hosts(read_records(path)?, camera_type))
}
