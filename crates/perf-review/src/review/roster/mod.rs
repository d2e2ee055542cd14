//! Employee roster import from HR CSV exports.

mod parser;

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use super::domain::{Employee, EmployeeId, Goal};

#[derive(Debug)]
pub enum RosterImportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for RosterImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RosterImportError::Io(err) => write!(f, "failed to read roster export: {}", err),
            RosterImportError::Csv(err) => write!(f, "invalid roster CSV data: {}", err),
        }
    }
}

impl std::error::Error for RosterImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RosterImportError::Io(err) => Some(err),
            RosterImportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for RosterImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for RosterImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

pub struct RosterImporter;

impl RosterImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Employee>, RosterImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<Employee>, RosterImportError> {
        Ok(parser::parse_employees(reader)?)
    }
}

/// Attach goal lists (keyed by employee id) to roster records.
///
/// Ids without a roster entry are returned so callers can report them.
pub fn attach_goals(
    employees: &mut [Employee],
    mut goals: HashMap<EmployeeId, Vec<Goal>>,
) -> Vec<EmployeeId> {
    for employee in employees.iter_mut() {
        if let Some(list) = goals.remove(&employee.id) {
            employee.goals = list;
        }
    }
    let mut orphans: Vec<EmployeeId> = goals.into_keys().collect();
    orphans.sort();
    orphans
}
