//! Reporting forest built once from roster manager references.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::domain::{Employee, EmployeeId};

/// Problem found while resolving manager references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum HierarchyIssue {
    DuplicateId {
        employee: EmployeeId,
    },
    UnknownManager {
        employee: EmployeeId,
        manager: EmployeeId,
    },
    Unresolved {
        employee: EmployeeId,
        reference: String,
    },
    Ambiguous {
        employee: EmployeeId,
        reference: String,
        candidates: Vec<EmployeeId>,
    },
    SelfReference {
        employee: EmployeeId,
    },
    /// Edges are kept; aggregation over these members fails with a cycle error.
    Cycle {
        members: Vec<EmployeeId>,
    },
}

/// Employees indexed by id with their resolved direct reports.
#[derive(Debug, Clone, Default)]
pub struct OrgChart {
    order: Vec<EmployeeId>,
    employees: HashMap<EmployeeId, Employee>,
    reports: BTreeMap<EmployeeId, Vec<EmployeeId>>,
}

impl OrgChart {
    /// Resolve every employee's manager once and index the result.
    ///
    /// An explicit `manager_id` wins over the free-text `manager_ref`. The
    /// reference is matched against ids, then names, then by containment of
    /// an id or name inside the reference text.
    pub fn build(employees: Vec<Employee>) -> (Self, Vec<HierarchyIssue>) {
        let mut issues = Vec::new();
        let mut order = Vec::with_capacity(employees.len());
        let mut index: HashMap<EmployeeId, Employee> = HashMap::with_capacity(employees.len());

        for employee in employees {
            if index.contains_key(&employee.id) {
                issues.push(HierarchyIssue::DuplicateId {
                    employee: employee.id.clone(),
                });
                continue;
            }
            order.push(employee.id.clone());
            index.insert(employee.id.clone(), employee);
        }

        let resolved: Vec<(EmployeeId, Option<EmployeeId>)> = order
            .iter()
            .filter_map(|id| index.get(id))
            .map(|employee| {
                let manager = resolve_manager(employee, &order, &index, &mut issues);
                (employee.id.clone(), manager)
            })
            .collect();

        let mut reports: BTreeMap<EmployeeId, Vec<EmployeeId>> = BTreeMap::new();
        for (id, manager) in resolved {
            if let Some(manager) = &manager {
                reports.entry(manager.clone()).or_default().push(id.clone());
            }
            if let Some(employee) = index.get_mut(&id) {
                employee.manager_id = manager;
            }
        }

        let chart = Self {
            order,
            employees: index,
            reports,
        };

        for members in chart.find_cycles() {
            warn!(?members, "reporting cycle in roster");
            issues.push(HierarchyIssue::Cycle { members });
        }

        (chart, issues)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn employee(&self, id: &EmployeeId) -> Option<&Employee> {
        self.employees.get(id)
    }

    /// Employees in roster order.
    pub fn employees(&self) -> impl Iterator<Item = &Employee> + '_ {
        self.order.iter().filter_map(|id| self.employees.get(id))
    }

    pub fn direct_report_ids(&self, id: &EmployeeId) -> &[EmployeeId] {
        self.reports.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn direct_reports(&self, id: &EmployeeId) -> impl Iterator<Item = &Employee> + '_ {
        self.direct_report_ids(id)
            .iter()
            .filter_map(|report| self.employees.get(report))
    }

    /// Employees with at least one direct report, in roster order.
    pub fn managers(&self) -> impl Iterator<Item = &Employee> + '_ {
        self.employees()
            .filter(|employee| !self.direct_report_ids(&employee.id).is_empty())
    }

    /// Employees without a resolved manager.
    pub fn roots(&self) -> impl Iterator<Item = &Employee> + '_ {
        self.employees().filter(|employee| employee.manager_id.is_none())
    }

    fn find_cycles(&self) -> Vec<Vec<EmployeeId>> {
        let mut settled: HashSet<&EmployeeId> = HashSet::new();
        let mut cycles = Vec::new();

        for start in &self.order {
            let mut path: Vec<&EmployeeId> = Vec::new();
            let mut current = Some(start);

            while let Some(id) = current {
                if settled.contains(id) {
                    break;
                }
                if let Some(position) = path.iter().position(|seen| *seen == id) {
                    cycles.push(path[position..].iter().map(|id| (*id).clone()).collect());
                    break;
                }
                path.push(id);
                current = self
                    .employees
                    .get(id)
                    .and_then(|employee| employee.manager_id.as_ref());
            }

            settled.extend(path);
        }

        cycles
    }
}

fn resolve_manager(
    employee: &Employee,
    order: &[EmployeeId],
    index: &HashMap<EmployeeId, Employee>,
    issues: &mut Vec<HierarchyIssue>,
) -> Option<EmployeeId> {
    if let Some(manager) = &employee.manager_id {
        if *manager == employee.id {
            issues.push(HierarchyIssue::SelfReference {
                employee: employee.id.clone(),
            });
            return None;
        }
        if !index.contains_key(manager) {
            issues.push(HierarchyIssue::UnknownManager {
                employee: employee.id.clone(),
                manager: manager.clone(),
            });
            return None;
        }
        return Some(manager.clone());
    }

    let reference = employee.manager_ref.as_deref()?.trim();
    if reference.is_empty() {
        return None;
    }

    match match_reference(reference, order, index) {
        Matches::One(manager) if manager == employee.id => {
            issues.push(HierarchyIssue::SelfReference {
                employee: employee.id.clone(),
            });
            None
        }
        Matches::One(manager) => Some(manager),
        Matches::Many(candidates) => {
            issues.push(HierarchyIssue::Ambiguous {
                employee: employee.id.clone(),
                reference: reference.to_string(),
                candidates,
            });
            None
        }
        Matches::None => {
            issues.push(HierarchyIssue::Unresolved {
                employee: employee.id.clone(),
                reference: reference.to_string(),
            });
            None
        }
    }
}

enum Matches {
    None,
    One(EmployeeId),
    Many(Vec<EmployeeId>),
}

impl Matches {
    fn from_candidates(mut candidates: Vec<EmployeeId>) -> Self {
        match candidates.len() {
            0 => Matches::None,
            1 => Matches::One(candidates.remove(0)),
            _ => Matches::Many(candidates),
        }
    }
}

fn match_reference(
    reference: &str,
    order: &[EmployeeId],
    index: &HashMap<EmployeeId, Employee>,
) -> Matches {
    let candidates: Vec<&Employee> = order.iter().filter_map(|id| index.get(id)).collect();

    if let Some(exact) = candidates.iter().find(|candidate| candidate.id.as_str() == reference) {
        return Matches::One(exact.id.clone());
    }

    let by_name: Vec<EmployeeId> = candidates
        .iter()
        .filter(|candidate| {
            !candidate.name.trim().is_empty()
                && candidate.name.trim().eq_ignore_ascii_case(reference)
        })
        .map(|candidate| candidate.id.clone())
        .collect();
    if !by_name.is_empty() {
        return Matches::from_candidates(by_name);
    }

    // Containment: the longest matched id or name wins, so "Jo Park (E12)"
    // prefers E12 over E1.
    let reference = reference.to_lowercase();
    let mut best_len = 0;
    let mut best: Vec<EmployeeId> = Vec::new();
    for candidate in candidates {
        let matched = [candidate.id.as_str(), candidate.name.as_str()]
            .into_iter()
            .map(|token| token.trim().to_lowercase())
            .filter(|token| !token.is_empty() && reference.contains(token.as_str()))
            .map(|token| token.len())
            .max();

        match matched {
            Some(len) if len > best_len => {
                best_len = len;
                best = vec![candidate.id.clone()];
            }
            Some(len) if len == best_len => best.push(candidate.id.clone()),
            _ => {}
        }
    }

    Matches::from_candidates(best)
}
