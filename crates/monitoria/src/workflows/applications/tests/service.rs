use super::common::*;
use crate::workflows::access::AccessError;
use crate::workflows::applications::domain::{
    Application, ApplicationStatus, ScoreBreakdown, SlotPreference,
};
use crate::workflows::applications::repository::ApplicationRepository;
use crate::workflows::applications::service::ApplicationError;
use crate::workflows::domain::{AcademicTerm, Actor, Term};
use crate::workflows::periods::domain::{Period, PeriodId};
use crate::workflows::periods::repository::PeriodRepository;
use crate::workflows::projects::domain::{ProjectId, ProjectStatus};
use crate::workflows::projects::repository::ProjectRepository;

#[test]
fn submit_files_the_candidacy() {
    let (service, _, _, applications) = seeded_service();

    let application = service
        .submit_application(
            ProjectId(1),
            Actor::student(4),
            SlotPreference::Any,
            mid_window(),
            fixed_now(),
        )
        .expect("application accepted");

    assert_eq!(application.status, ApplicationStatus::Submitted);
    assert_eq!(application.period_id, PeriodId(70));
    assert_eq!(application.year, 2025);
    assert_eq!(application.term, Term::First);
    assert_eq!(application.final_score, None);
    let stored = applications
        .fetch(application.id)
        .expect("fetch succeeds")
        .expect("row exists");
    assert_eq!(stored, application);
}

#[test]
fn submit_requires_a_student() {
    let (service, _, _, _) = seeded_service();

    for actor in [Actor::professor(9), Actor::admin(1)] {
        match service.submit_application(
            ProjectId(1),
            actor,
            SlotPreference::Any,
            mid_window(),
            fixed_now(),
        ) {
            Err(ApplicationError::Access(AccessError::Forbidden { required })) => {
                assert_eq!(required, "student");
            }
            other => panic!("expected forbidden, got {other:?}"),
        }
    }
}

#[test]
fn submit_rejects_unknown_projects() {
    let (service, _, _, _) = seeded_service();

    match service.submit_application(
        ProjectId(99),
        Actor::student(4),
        SlotPreference::Any,
        mid_window(),
        fixed_now(),
    ) {
        Err(ApplicationError::ProjectNotFound) => {}
        other => panic!("expected missing project, got {other:?}"),
    }
}

#[test]
fn submit_rejects_unapproved_projects() {
    let (service, _, projects, _) = seeded_service();
    let mut draft = approved_project(2, 9);
    draft.status = ProjectStatus::Draft;
    projects.insert(draft).expect("project stored");

    match service.submit_application(
        ProjectId(2),
        Actor::student(4),
        SlotPreference::Any,
        mid_window(),
        fixed_now(),
    ) {
        Err(ApplicationError::ProjectNotApproved { status }) => {
            assert_eq!(status, ProjectStatus::Draft);
        }
        other => panic!("expected unapproved rejection, got {other:?}"),
    }
}

#[test]
fn submit_outside_any_window_is_closed() {
    let (service, _, _, _) = seeded_service();

    match service.submit_application(
        ProjectId(1),
        Actor::student(4),
        SlotPreference::Any,
        day(2025, 3, 25),
        fixed_now(),
    ) {
        Err(ApplicationError::PeriodClosed { term }) => {
            assert_eq!(term, AcademicTerm::new(2025, Term::First));
        }
        other => panic!("expected closed period, got {other:?}"),
    }
}

#[test]
fn submit_rejects_a_second_candidacy() {
    let (service, _, _, applications) = seeded_service();
    submitted(&service, 4, SlotPreference::Any);

    match service.submit_application(
        ProjectId(1),
        Actor::student(4),
        SlotPreference::Scholarship,
        mid_window(),
        fixed_now(),
    ) {
        Err(ApplicationError::Duplicate) => {}
        other => panic!("expected duplicate rejection, got {other:?}"),
    }

    // another student is unaffected
    submitted(&service, 5, SlotPreference::Any);
    assert_eq!(
        applications
            .list_for_project(ProjectId(1))
            .expect("list succeeds")
            .len(),
        2
    );
}

#[test]
fn scholarship_preference_needs_an_allocation() {
    let (service, _, projects, _) = seeded_service();
    let mut unfunded = approved_project(2, 9);
    unfunded.allocated_scholarships = None;
    projects.insert(unfunded).expect("project stored");

    match service.submit_application(
        ProjectId(2),
        Actor::student(4),
        SlotPreference::Scholarship,
        mid_window(),
        fixed_now(),
    ) {
        Err(ApplicationError::SlotUnavailable { desired }) => {
            assert_eq!(desired, SlotPreference::Scholarship);
        }
        other => panic!("expected unavailable slot, got {other:?}"),
    }

    // the volunteer slot is still open, through either preference
    service
        .submit_application(
            ProjectId(2),
            Actor::student(4),
            SlotPreference::Volunteer,
            mid_window(),
            fixed_now(),
        )
        .expect("volunteer slot open");
    service
        .submit_application(
            ProjectId(2),
            Actor::student(5),
            SlotPreference::Any,
            mid_window(),
            fixed_now(),
        )
        .expect("any preference open");
}

#[test]
fn fully_closed_projects_reject_every_preference() {
    let (service, _, projects, _) = seeded_service();
    let mut closed = approved_project(2, 9);
    closed.allocated_scholarships = Some(0);
    closed.requested_volunteers = 0;
    projects.insert(closed).expect("project stored");

    match service.submit_application(
        ProjectId(2),
        Actor::student(4),
        SlotPreference::Any,
        mid_window(),
        fixed_now(),
    ) {
        Err(ApplicationError::SlotUnavailable { desired }) => {
            assert_eq!(desired, SlotPreference::Any);
        }
        other => panic!("expected unavailable slot, got {other:?}"),
    }
}

#[test]
fn earliest_window_wins_when_two_are_open() {
    let (service, periods, _, _) = seeded_service();
    periods
        .insert(Period {
            id: PeriodId(71),
            year: 2025,
            term: Term::First,
            start_date: day(2025, 3, 8),
            end_date: day(2025, 3, 25),
            total_scholarships: None,
        })
        .expect("window stored");

    let application = submitted(&service, 4, SlotPreference::Any);

    assert_eq!(application.period_id, PeriodId(71));
}

#[test]
fn evaluation_stores_the_grade() {
    let (service, _, _, _) = seeded_service();
    let application = submitted(&service, 4, SlotPreference::Any);

    let updated = service
        .record_evaluation(
            application.id,
            Actor::professor(9),
            8.5,
            Some("solid interview".to_string()),
            fixed_now(),
        )
        .expect("evaluation recorded");

    assert_eq!(updated.final_score, Some(8.5));
    assert_eq!(updated.status, ApplicationStatus::Submitted);
    assert_eq!(
        updated.professor_feedback.as_deref(),
        Some("solid interview")
    );
}

#[test]
fn evaluation_requires_the_owner() {
    let (service, _, _, _) = seeded_service();
    let application = submitted(&service, 4, SlotPreference::Any);

    match service.record_evaluation(application.id, Actor::professor(8), 8.0, None, fixed_now()) {
        Err(ApplicationError::Access(AccessError::NotOwner)) => {}
        other => panic!("expected not-owner, got {other:?}"),
    }
    match service.record_evaluation(application.id, Actor::admin(1), 8.0, None, fixed_now()) {
        Err(ApplicationError::Access(AccessError::Forbidden { .. })) => {}
        other => panic!("expected forbidden, got {other:?}"),
    }
}

#[test]
fn evaluation_validates_the_scale() {
    let (service, _, _, _) = seeded_service();
    let application = submitted(&service, 4, SlotPreference::Any);

    for grade in [10.5, -0.1] {
        match service.record_evaluation(application.id, Actor::professor(9), grade, None, fixed_now())
        {
            Err(ApplicationError::GradeOutOfScale { value }) => assert_eq!(value, grade),
            other => panic!("expected out-of-scale grade, got {other:?}"),
        }
    }
    match service.record_evaluation(
        application.id,
        Actor::professor(9),
        f64::NAN,
        None,
        fixed_now(),
    ) {
        Err(ApplicationError::GradeOutOfScale { value }) => assert!(value.is_nan()),
        other => panic!("expected out-of-scale grade, got {other:?}"),
    }
}

#[test]
fn evaluation_only_while_submitted() {
    let (service, _, _, applications) = seeded_service();
    let application = submitted(&service, 4, SlotPreference::Any);
    applications
        .update(Application {
            status: ApplicationStatus::SelectedScholarship,
            ..application.clone()
        })
        .expect("status seeded");

    match service.record_evaluation(application.id, Actor::professor(9), 8.0, None, fixed_now()) {
        Err(ApplicationError::InvalidState { status }) => {
            assert_eq!(status, ApplicationStatus::SelectedScholarship);
        }
        other => panic!("expected invalid state, got {other:?}"),
    }
}

#[test]
fn component_marks_collapse_to_the_weighted_grade() {
    let (service, _, _, _) = seeded_service();
    let application = submitted(&service, 4, SlotPreference::Any);

    let updated = service
        .record_component_evaluation(
            application.id,
            Actor::professor(9),
            ScoreBreakdown {
                discipline_grade: 8.0,
                selection_grade: 7.0,
                academic_index: 9.0,
            },
            None,
            fixed_now(),
        )
        .expect("evaluation recorded");

    assert_eq!(updated.final_score, Some(7.9));
    let scores = updated.scores.expect("components stored");
    assert_eq!(scores.discipline_grade, 8.0);
    assert_eq!(scores.selection_grade, 7.0);
    assert_eq!(scores.academic_index, 9.0);
}

#[test]
fn component_marks_validate_each_component() {
    let (service, _, _, _) = seeded_service();
    let application = submitted(&service, 4, SlotPreference::Any);

    match service.record_component_evaluation(
        application.id,
        Actor::professor(9),
        ScoreBreakdown {
            discipline_grade: 8.0,
            selection_grade: 7.0,
            academic_index: 11.0,
        },
        None,
        fixed_now(),
    ) {
        Err(ApplicationError::GradeOutOfScale { value }) => assert_eq!(value, 11.0),
        other => panic!("expected out-of-scale grade, got {other:?}"),
    }
}

#[test]
fn weighted_grade_rounds_to_two_decimals() {
    let (service, _, _, _) = seeded_service();
    let application = submitted(&service, 4, SlotPreference::Any);

    let updated = service
        .record_component_evaluation(
            application.id,
            Actor::professor(9),
            ScoreBreakdown {
                discipline_grade: 7.77,
                selection_grade: 8.33,
                academic_index: 9.11,
            },
            None,
            fixed_now(),
        )
        .expect("evaluation recorded");

    assert_eq!(updated.final_score, Some(8.21));
}

#[test]
fn acceptance_lands_in_the_matching_state() {
    let (service, _, _, applications) = seeded_service();
    let application = submitted(&service, 4, SlotPreference::Any);
    applications
        .update(Application {
            status: ApplicationStatus::SelectedVolunteer,
            ..application.clone()
        })
        .expect("status seeded");

    let updated = service
        .respond_to_offer(application.id, Actor::student(4), true, fixed_now())
        .expect("acceptance recorded");

    assert_eq!(updated.status, ApplicationStatus::AcceptedVolunteer);
}

#[test]
fn decline_lands_in_rejected_by_student() {
    let (service, _, _, applications) = seeded_service();
    let application = submitted(&service, 4, SlotPreference::Scholarship);
    applications
        .update(Application {
            status: ApplicationStatus::SelectedScholarship,
            ..application.clone()
        })
        .expect("status seeded");

    let updated = service
        .respond_to_offer(application.id, Actor::student(4), false, fixed_now())
        .expect("decline recorded");

    assert_eq!(updated.status, ApplicationStatus::RejectedByStudent);
}

#[test]
fn response_requires_the_applicant() {
    let (service, _, _, applications) = seeded_service();
    let application = submitted(&service, 4, SlotPreference::Any);
    applications
        .update(Application {
            status: ApplicationStatus::SelectedScholarship,
            ..application.clone()
        })
        .expect("status seeded");

    match service.respond_to_offer(application.id, Actor::student(5), true, fixed_now()) {
        Err(ApplicationError::Access(AccessError::NotOwner)) => {}
        other => panic!("expected not-owner, got {other:?}"),
    }
    match service.respond_to_offer(application.id, Actor::professor(9), true, fixed_now()) {
        Err(ApplicationError::Access(AccessError::Forbidden { .. })) => {}
        other => panic!("expected forbidden, got {other:?}"),
    }
}

#[test]
fn response_needs_an_open_offer() {
    let (service, _, _, _) = seeded_service();
    let application = submitted(&service, 4, SlotPreference::Any);

    match service.respond_to_offer(application.id, Actor::student(4), true, fixed_now()) {
        Err(ApplicationError::InvalidState { status }) => {
            assert_eq!(status, ApplicationStatus::Submitted);
        }
        other => panic!("expected invalid state, got {other:?}"),
    }
}

#[test]
fn second_scholarship_in_a_term_is_refused() {
    let (service, _, projects, applications) = seeded_service();
    let held = submitted(&service, 4, SlotPreference::Scholarship);
    applications
        .update(Application {
            status: ApplicationStatus::AcceptedScholarship,
            ..held
        })
        .expect("status seeded");

    projects
        .insert(approved_project(2, 9))
        .expect("project stored");
    let offered = service
        .submit_application(
            ProjectId(2),
            Actor::student(4),
            SlotPreference::Scholarship,
            mid_window(),
            fixed_now(),
        )
        .expect("application accepted");
    applications
        .update(Application {
            status: ApplicationStatus::SelectedScholarship,
            ..offered.clone()
        })
        .expect("status seeded");

    match service.respond_to_offer(offered.id, Actor::student(4), true, fixed_now()) {
        Err(ApplicationError::ScholarshipHeld { term }) => {
            assert_eq!(term, AcademicTerm::new(2025, Term::First));
        }
        other => panic!("expected scholarship conflict, got {other:?}"),
    }

    // declining the second offer is still allowed
    let declined = service
        .respond_to_offer(offered.id, Actor::student(4), false, fixed_now())
        .expect("decline recorded");
    assert_eq!(declined.status, ApplicationStatus::RejectedByStudent);
}

#[test]
fn held_scholarship_does_not_block_volunteer_offers() {
    let (service, _, projects, applications) = seeded_service();
    let held = submitted(&service, 4, SlotPreference::Scholarship);
    applications
        .update(Application {
            status: ApplicationStatus::AcceptedScholarship,
            ..held
        })
        .expect("status seeded");

    projects
        .insert(approved_project(2, 9))
        .expect("project stored");
    let offered = service
        .submit_application(
            ProjectId(2),
            Actor::student(4),
            SlotPreference::Volunteer,
            mid_window(),
            fixed_now(),
        )
        .expect("application accepted");
    applications
        .update(Application {
            status: ApplicationStatus::SelectedVolunteer,
            ..offered.clone()
        })
        .expect("status seeded");

    let accepted = service
        .respond_to_offer(offered.id, Actor::student(4), true, fixed_now())
        .expect("volunteer acceptance recorded");
    assert_eq!(accepted.status, ApplicationStatus::AcceptedVolunteer);
}
