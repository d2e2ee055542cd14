use serde::{Deserialize, Deserializer};
use std::io::Read;

use super::super::domain::{Employee, EmployeeId, EmployeeStatus};

pub(crate) fn parse_employees<R: Read>(reader: R) -> Result<Vec<Employee>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let mut employees = Vec::new();

    for record in csv_reader.deserialize::<RosterRow>() {
        let row = record?;
        if row.id.is_empty() {
            continue;
        }
        employees.push(row.into_employee());
    }

    Ok(employees)
}

#[derive(Debug, Deserialize)]
struct RosterRow {
    #[serde(rename = "Employee ID", alias = "ID")]
    id: String,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Company", default)]
    company: String,
    #[serde(rename = "Level", default)]
    level: String,
    #[serde(rename = "Job Title", alias = "Title", default)]
    job_title: String,
    #[serde(rename = "Division", default)]
    division: String,
    #[serde(rename = "Manager", default, deserialize_with = "empty_string_as_none")]
    manager: Option<String>,
    #[serde(rename = "Status", default, deserialize_with = "empty_string_as_none")]
    status: Option<String>,
}

impl RosterRow {
    fn into_employee(self) -> Employee {
        Employee {
            id: EmployeeId(self.id),
            name: self.name,
            company: self.company,
            level: self.level,
            job_title: self.job_title,
            division: self.division,
            manager_ref: self.manager,
            manager_id: None,
            status: self
                .status
                .as_deref()
                .map(EmployeeStatus::parse)
                .unwrap_or_default(),
            goals: Vec::new(),
        }
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
