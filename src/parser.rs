use csv::Reader;
use std::io::Read;
use std::path::Path;

use crate::santa::{Employee, PriorAssignment, SantaError};

/// Filename prefix identifying the roster upload.
pub const EMPLOYEE_LIST_PREFIX: &str = "Employee-List";
/// Filename prefix identifying the previous round's result upload, and the
/// base name of the files this service generates.
pub const GAME_RESULT_PREFIX: &str = "Secret-Santa-Game-Result";

fn find_column(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
}

/// Loads the employee roster from a CSV file.
///
/// Expected columns: `Employee_Name`, `Employee_EmailID`. Fully blank rows
/// (trailing newlines in hand-edited exports) are skipped; rows with one
/// blank field are kept so the engine can report them as roster problems.
pub fn load_employees<P: AsRef<Path>>(csv_path: P) -> Result<Vec<Employee>, SantaError> {
    read_employees(Reader::from_path(csv_path)?)
}

/// Parses the employee roster from any CSV source.
pub fn read_employees<R: Read>(mut reader: Reader<R>) -> Result<Vec<Employee>, SantaError> {
    let headers = reader.headers()?.clone();
    let name_col = find_column(&headers, "Employee_Name").ok_or_else(|| {
        SantaError::InvalidRoster {
            reason: "missing Employee_Name column".to_string(),
        }
    })?;
    let email_col = find_column(&headers, "Employee_EmailID").ok_or_else(|| {
        SantaError::InvalidRoster {
            reason: "missing Employee_EmailID column".to_string(),
        }
    })?;

    let mut employees = Vec::new();
    for result in reader.records() {
        let record = result?;
        let name = record.get(name_col).unwrap_or("").trim().to_string();
        let email = record.get(email_col).unwrap_or("").trim().to_string();
        if name.is_empty() && email.is_empty() {
            continue;
        }
        employees.push(Employee { name, email });
    }

    Ok(employees)
}

/// Loads the previous round's results from a CSV file.
///
/// Expected columns: `Employee_Name`, `Employee_EmailID`,
/// `Secret_Child_Name`, `Secret_Child_EmailID`. This is the same shape the
/// service exports, so last year's download feeds straight back in.
pub fn load_prior_assignments<P: AsRef<Path>>(
    csv_path: P,
) -> Result<Vec<PriorAssignment>, SantaError> {
    read_prior_assignments(Reader::from_path(csv_path)?)
}

/// Parses prior-round results from any CSV source.
pub fn read_prior_assignments<R: Read>(
    mut reader: Reader<R>,
) -> Result<Vec<PriorAssignment>, SantaError> {
    let headers = reader.headers()?.clone();
    let missing = |column: &str| SantaError::InvalidPriorPairs {
        reason: format!("missing {} column", column),
    };
    let giver_name_col =
        find_column(&headers, "Employee_Name").ok_or_else(|| missing("Employee_Name"))?;
    let giver_email_col =
        find_column(&headers, "Employee_EmailID").ok_or_else(|| missing("Employee_EmailID"))?;
    let receiver_name_col =
        find_column(&headers, "Secret_Child_Name").ok_or_else(|| missing("Secret_Child_Name"))?;
    let receiver_email_col = find_column(&headers, "Secret_Child_EmailID")
        .ok_or_else(|| missing("Secret_Child_EmailID"))?;

    let mut assignments = Vec::new();
    for result in reader.records() {
        let record = result?;
        let giver_name = record.get(giver_name_col).unwrap_or("").trim().to_string();
        let giver_email = record.get(giver_email_col).unwrap_or("").trim().to_string();
        let receiver_name = record
            .get(receiver_name_col)
            .unwrap_or("")
            .trim()
            .to_string();
        let receiver_email = record
            .get(receiver_email_col)
            .unwrap_or("")
            .trim()
            .to_string();
        if giver_name.is_empty() && receiver_name.is_empty() {
            continue;
        }
        assignments.push(PriorAssignment {
            giver_name,
            giver_email,
            receiver_name,
            receiver_email,
        });
    }

    Ok(assignments)
}
