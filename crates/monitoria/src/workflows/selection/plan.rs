use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::workflows::applications::domain::{
    Application, ApplicationId, ApplicationStatus, SlotKind,
};
use crate::workflows::applications::repository::PlannedTransition;

/// One row of a selection list: which candidacy gets which concrete slot.
///
/// The slot type statically excludes the ANY preference, so a selection can
/// never be ambiguous about what it grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionEntry {
    pub application_id: ApplicationId,
    pub slot: SlotKind,
}

/// Ceilings the chosen slots are checked against.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SlotQuotas {
    pub scholarships: u32,
    pub volunteers: u32,
}

/// Everything a finalization writes, precomputed before any store call.
#[derive(Debug)]
pub(crate) struct SelectionPlan {
    pub transitions: Vec<PlannedTransition>,
    pub selected: Vec<(Application, SlotKind)>,
    pub rejected: Vec<Application>,
}

/// Reasons a selection list cannot be turned into a plan.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SelectionViolation {
    #[error("application {id} is not part of this project", id = .application_id.0)]
    UnknownApplication { application_id: ApplicationId },
    #[error("application {id} appears more than once", id = .application_id.0)]
    DuplicateEntry { application_id: ApplicationId },
    #[error("application {id} is {status}, only submitted candidacies can be chosen", id = .application_id.0)]
    EntryNotPending {
        application_id: ApplicationId,
        status: ApplicationStatus,
    },
    #[error("{chosen} scholarship slots chosen, only {ceiling} allocated")]
    ScholarshipQuota { chosen: u32, ceiling: u32 },
    #[error("{chosen} volunteer slots chosen, only {ceiling} requested")]
    VolunteerQuota { chosen: u32, ceiling: u32 },
}

/// A round is decided once applications exist and none is still pending.
pub(crate) fn is_finalized(applications: &[Application]) -> bool {
    !applications.is_empty()
        && applications
            .iter()
            .all(|application| !application.status.is_pending())
}

/// Validate a selection list against a project's applications and quotas,
/// producing the full transition set: chosen candidacies become offers, every
/// other non-terminal candidacy is rejected, terminal ones stay untouched.
pub(crate) fn build_plan(
    applications: &[Application],
    selections: &[SelectionEntry],
    quotas: SlotQuotas,
) -> Result<SelectionPlan, SelectionViolation> {
    let mut chosen: BTreeMap<ApplicationId, SlotKind> = BTreeMap::new();
    for entry in selections {
        if chosen.insert(entry.application_id, entry.slot).is_some() {
            return Err(SelectionViolation::DuplicateEntry {
                application_id: entry.application_id,
            });
        }
    }

    let known: BTreeMap<ApplicationId, &Application> = applications
        .iter()
        .map(|application| (application.id, application))
        .collect();
    for (id, _) in &chosen {
        match known.get(id) {
            None => {
                return Err(SelectionViolation::UnknownApplication {
                    application_id: *id,
                })
            }
            Some(application) if !application.status.is_pending() => {
                return Err(SelectionViolation::EntryNotPending {
                    application_id: *id,
                    status: application.status,
                });
            }
            Some(_) => {}
        }
    }

    let scholarships = chosen
        .values()
        .filter(|slot| **slot == SlotKind::Scholarship)
        .count() as u32;
    let volunteers = chosen
        .values()
        .filter(|slot| **slot == SlotKind::Volunteer)
        .count() as u32;
    if scholarships > quotas.scholarships {
        return Err(SelectionViolation::ScholarshipQuota {
            chosen: scholarships,
            ceiling: quotas.scholarships,
        });
    }
    if volunteers > quotas.volunteers {
        return Err(SelectionViolation::VolunteerQuota {
            chosen: volunteers,
            ceiling: quotas.volunteers,
        });
    }

    let mut transitions = Vec::new();
    let mut selected = Vec::new();
    let mut rejected = Vec::new();
    for application in applications {
        if let Some(slot) = chosen.get(&application.id) {
            transitions.push(PlannedTransition {
                application_id: application.id,
                from: application.status,
                to: slot.selected_status(),
            });
            selected.push((application.clone(), *slot));
        } else if !application.status.is_terminal() {
            transitions.push(PlannedTransition {
                application_id: application.id,
                from: application.status,
                to: ApplicationStatus::RejectedByProfessor,
            });
            rejected.push(application.clone());
        }
    }

    Ok(SelectionPlan {
        transitions,
        selected,
        rejected,
    })
}

/// Build a selection list from graded candidacies: grades at or above the
/// threshold, best first (ties broken by the older application), scholarship
/// slots filled before volunteer slots.
pub(crate) fn rank_candidates(
    applications: &[Application],
    threshold: f64,
    quotas: SlotQuotas,
) -> Vec<SelectionEntry> {
    let mut candidates: Vec<&Application> = applications
        .iter()
        .filter(|application| application.status.is_pending())
        .filter(|application| {
            application
                .final_score
                .map(|score| score >= threshold)
                .unwrap_or(false)
        })
        .collect();
    candidates.sort_by(|a, b| {
        b.final_score
            .partial_cmp(&a.final_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.id.cmp(&b.id))
    });

    let mut entries = Vec::new();
    let mut taken: BTreeSet<ApplicationId> = BTreeSet::new();

    let mut open = quotas.scholarships;
    for candidate in &candidates {
        if open == 0 {
            break;
        }
        if candidate.desired_slot.allows(SlotKind::Scholarship) {
            entries.push(SelectionEntry {
                application_id: candidate.id,
                slot: SlotKind::Scholarship,
            });
            taken.insert(candidate.id);
            open -= 1;
        }
    }

    let mut open = quotas.volunteers;
    for candidate in &candidates {
        if open == 0 {
            break;
        }
        if taken.contains(&candidate.id) {
            continue;
        }
        if candidate.desired_slot.allows(SlotKind::Volunteer) {
            entries.push(SelectionEntry {
                application_id: candidate.id,
                slot: SlotKind::Volunteer,
            });
            open -= 1;
        }
    }

    entries
}

/// Aggregate view of one project's selection round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SelectionStatus {
    pub total: u32,
    pub pending: u32,
    pub evaluated: u32,
    pub selected_scholarship: u32,
    pub selected_volunteer: u32,
    pub rejected: u32,
    pub accepted: u32,
    pub declined: u32,
    pub is_finalized: bool,
}

/// Count applications into the status buckets; a graded candidacy that is
/// still awaiting the round counts as evaluated rather than pending.
pub(crate) fn status_of(applications: &[Application]) -> SelectionStatus {
    let mut status = SelectionStatus {
        total: applications.len() as u32,
        ..SelectionStatus::default()
    };
    for application in applications {
        match application.status {
            ApplicationStatus::Submitted if application.final_score.is_some() => {
                status.evaluated += 1;
            }
            ApplicationStatus::Submitted => status.pending += 1,
            ApplicationStatus::SelectedScholarship => status.selected_scholarship += 1,
            ApplicationStatus::SelectedVolunteer => status.selected_volunteer += 1,
            ApplicationStatus::RejectedByProfessor => status.rejected += 1,
            ApplicationStatus::AcceptedScholarship | ApplicationStatus::AcceptedVolunteer => {
                status.accepted += 1;
            }
            ApplicationStatus::RejectedByStudent => status.declined += 1,
        }
    }
    status.is_finalized = is_finalized(applications);
    status
}
