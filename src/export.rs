use std::io::Write;
use std::path::Path;

use chrono::Utc;
use csv::WriterBuilder;

use crate::parser::GAME_RESULT_PREFIX;
use crate::santa::{Assignment, SantaError};

/// Column order of the generated result file. Matches the shape the prior
/// results parser expects, so this round's download is next round's upload.
const RESULT_HEADER: [&str; 4] = [
    "Employee_Name",
    "Employee_EmailID",
    "Secret_Child_Name",
    "Secret_Child_EmailID",
];

/// Builds the download name for a result generated now, e.g.
/// `Secret-Santa-Game-Result-20261207-141503217.csv`.
pub fn result_filename() -> String {
    format!(
        "{}-{}.csv",
        GAME_RESULT_PREFIX,
        Utc::now().format("%Y%m%d-%H%M%S%3f")
    )
}

/// Writes assignments as CSV to any writer.
pub fn write_assignments<W: Write>(assignments: &[Assignment], writer: W) -> Result<(), SantaError> {
    let mut wtr = WriterBuilder::new().from_writer(writer);
    wtr.write_record(RESULT_HEADER)?;
    for assignment in assignments {
        wtr.write_record(&[
            &assignment.giver_name,
            &assignment.giver_email,
            &assignment.receiver_name,
            &assignment.receiver_email,
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Renders the result fully in memory before touching the filesystem, so a
/// failed render leaves no partial file behind.
pub fn export_assignments(assignments: &[Assignment], path: &Path) -> Result<(), SantaError> {
    let mut buf = Vec::new();
    write_assignments(assignments, &mut buf)?;
    std::fs::write(path, buf)?;
    Ok(())
}
