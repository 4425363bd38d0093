use crate::infra::Engine;
use chrono::{Datelike, Local, NaiveDate, Utc};
use clap::Args;
use monitoria::error::AppError;
use monitoria::workflows::allocation::AllocationPolicy;
use monitoria::workflows::applications::{
    Application, ApplicationStatus, ScoreBreakdown, SlotPreference,
};
use monitoria::workflows::domain::{Actor, DepartmentId, Term, UserId};
use monitoria::workflows::memory::RecordingNotifier;
use monitoria::workflows::periods::PeriodDraft;
use monitoria::workflows::projects::ProjectDraft;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Enrollment window start (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) window_start: Option<NaiveDate>,
    /// Enrollment window end (YYYY-MM-DD). Defaults to ten days after the start.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) window_end: Option<NaiveDate>,
    /// Cutoff grade for the ranked selection pass.
    #[arg(long, default_value_t = 7.0)]
    pub(crate) threshold: f64,
    /// Stop after the round is decided, skipping the offer responses.
    #[arg(long)]
    pub(crate) skip_responses: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        window_start,
        window_end,
        threshold,
        skip_responses,
    } = args;

    let window_start = window_start.unwrap_or_else(|| Local::now().date_naive());
    let window_end = window_end.unwrap_or_else(|| window_start + chrono::Duration::days(10));
    let year = window_start.year();
    let term = if window_start.month() <= 6 {
        Term::First
    } else {
        Term::Second
    };
    let now = Utc::now();

    println!("Monitoria selection walkthrough");
    println!("Window: {window_start} -> {window_end} ({year}/{term})");

    let notifier = Arc::new(RecordingNotifier::default());
    let engine = Engine::in_memory(notifier.clone(), AllocationPolicy::default());
    let admin = Actor::admin(1);
    let professor = Actor::professor(9);
    engine.directory.register(UserId(9), "ana.prof@uni.edu");

    let Some(window) = halt(
        "enrollment window",
        engine.enrollment.create_period(
            PeriodDraft {
                year,
                term,
                start_date: window_start,
                end_date: window_end,
                total_scholarships: Some(10),
            },
            admin,
        ),
    ) else {
        return Ok(());
    };
    println!(
        "\n[1] Enrollment window {} open, pool of {} scholarships",
        window.id.0,
        window.total_scholarships.unwrap_or(0)
    );

    println!("\n[2] Proposal lifecycle");
    let Some(draft) = halt(
        "draft",
        engine.proposals.create_project(
            ProjectDraft {
                title: "Calculus I monitoring".to_string(),
                department_id: DepartmentId(3),
                year,
                term,
                requested_scholarships: 2,
                requested_volunteers: 1,
            },
            professor,
            now,
        ),
    ) else {
        return Ok(());
    };
    println!(
        "- draft {} opened by professor {}",
        draft.id.0, draft.professor_id.0
    );

    if halt("submission", engine.proposals.submit(draft.id, professor, now)).is_none() {
        return Ok(());
    }
    let Some(signed) = halt(
        "signature",
        engine
            .proposals
            .sign(draft.id, professor, "assinatura digital".to_string(), now),
    ) else {
        return Ok(());
    };
    println!("- submitted and signed, status {}", signed.status.label());

    let Some(approved) = halt(
        "approval",
        engine.proposals.approve(draft.id, admin, None, None, now),
    ) else {
        return Ok(());
    };
    println!(
        "- approved with {} scholarship slots and {} volunteer slots",
        approved.allocated_scholarships.unwrap_or(0),
        approved.requested_volunteers
    );

    let Some(expanded) = halt(
        "volunteer adjustment",
        engine
            .allocations
            .adjust_volunteers(approved.id, professor, 2, now),
    ) else {
        return Ok(());
    };
    println!(
        "- volunteer request raised to {}",
        expanded.requested_volunteers
    );

    println!("\n[3] Candidacies");
    let mut applications = Vec::new();
    for (student, slot) in [
        (101, SlotPreference::Scholarship),
        (102, SlotPreference::Any),
        (103, SlotPreference::Any),
    ] {
        engine
            .directory
            .register(UserId(student), &format!("student{student}@uni.edu"));
        let Some(application) = halt(
            "candidacy",
            engine.candidacies.submit_application(
                approved.id,
                Actor::student(student),
                slot,
                window_start,
                now,
            ),
        ) else {
            return Ok(());
        };
        println!("- student {} asked for {}", student, slot.label());
        applications.push(application);
    }

    println!("\n[4] Evaluation");
    let Some(first) = halt(
        "grade",
        engine.candidacies.record_evaluation(
            applications[0].id,
            professor,
            9.3,
            Some("solid proofs".to_string()),
            now,
        ),
    ) else {
        return Ok(());
    };
    print_grade(&first);
    let Some(second) = halt(
        "grade",
        engine.candidacies.record_component_evaluation(
            applications[1].id,
            professor,
            ScoreBreakdown {
                discipline_grade: 8.0,
                selection_grade: 7.0,
                academic_index: 9.0,
            },
            None,
            now,
        ),
    ) else {
        return Ok(());
    };
    print_grade(&second);
    let Some(third) = halt(
        "grade",
        engine
            .candidacies
            .record_evaluation(applications[2].id, professor, 6.2, None, now),
    ) else {
        return Ok(());
    };
    print_grade(&third);

    println!("\n[5] Ranked selection (cutoff {threshold})");
    let Some(result) = halt(
        "finalization",
        engine.selection.finalize_by_ranking(
            approved.id,
            professor,
            threshold,
            Some("Obrigado por participar".to_string()),
            now,
        ),
    ) else {
        return Ok(());
    };
    println!(
        "- {} selected, {} rejected out of {}",
        result.selected, result.rejected, result.total
    );
    let report = engine.selection.dispatch(&result.notifications);
    println!("- {} notices delivered, {} failed", report.sent, report.failed);
    for event in notifier.events() {
        println!("  -> {} ({})", event.recipient_email, event.kind.label());
    }

    if skip_responses {
        return Ok(());
    }

    println!("\n[6] Offer responses");
    let mut accepted_one = false;
    for application in &applications {
        let Some(current) = halt("lookup", engine.candidacies.get(application.id)) else {
            return Ok(());
        };
        if !matches!(
            current.status,
            ApplicationStatus::SelectedScholarship | ApplicationStatus::SelectedVolunteer
        ) {
            continue;
        }
        let accept = !accepted_one;
        let Some(answered) = halt(
            "response",
            engine.candidacies.respond_to_offer(
                current.id,
                Actor::student(current.student_id.0),
                accept,
                now,
            ),
        ) else {
            return Ok(());
        };
        accepted_one = accepted_one || accept;
        println!(
            "- student {} -> {}",
            answered.student_id.0,
            answered.status.label()
        );
    }

    println!("\n[7] Round summary");
    let Some(status) = halt("status", engine.selection.get_selection_status(approved.id)) else {
        return Ok(());
    };
    println!(
        "- total {} | offers out {} | accepted {} | declined {} | rejected {}",
        status.total,
        status.selected_scholarship + status.selected_volunteer,
        status.accepted,
        status.declined,
        status.rejected
    );
    println!("- finalized: {}", status.is_finalized);

    Ok(())
}

fn halt<T, E: std::fmt::Display>(step: &str, result: Result<T, E>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(error) => {
            println!("  {step} failed: {error}");
            None
        }
    }
}

fn print_grade(application: &Application) {
    match application.final_score {
        Some(score) => println!("- application {} graded {:.2}", application.id.0, score),
        None => println!("- application {} not graded yet", application.id.0),
    }
}
