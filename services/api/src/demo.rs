use crate::infra::{build_seeded_service, SeededService};
use clap::Args;
use placement_core::error::AppError;
use placement_core::workflows::placement::applications::{
    Actor, ApplicationPatch, ApplicationStatus, ApplicationView, CompanyId, NewApplication, Role,
};
use placement_core::workflows::placement::stats::PlacementStats;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Print the resolved application payloads as JSON at the end
    #[arg(long)]
    pub(crate) show_payloads: bool,
}

fn student(id: &str) -> Actor {
    Actor {
        id: id.to_string(),
        role: Role::Student,
    }
}

fn officer() -> Actor {
    Actor {
        id: "officer-1".to_string(),
        role: Role::PlacementOfficer,
    }
}

fn apply(company: &str) -> NewApplication {
    NewApplication {
        company_id: CompanyId(company.to_string()),
        resume_url: Some(format!(
            "https://files.campus.edu/resumes/{}.pdf",
            company.trim_start_matches("c-")
        )),
        cover_letter: None,
    }
}

fn describe(view: &ApplicationView) -> String {
    let student = view
        .student
        .as_ref()
        .map(|s| s.name.as_str())
        .unwrap_or("<unknown student>");
    let company = view
        .company
        .as_ref()
        .map(|c| c.name.as_str())
        .unwrap_or("<unknown company>");
    format!("{} -> {} [{}]", student, company, view.status)
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    println!("Campus placement drive demo");
    let service = build_seeded_service();

    println!("\nIntake");
    let trident = match service.create(&student("s-ananya"), apply("c-trident")) {
        Ok(view) => {
            println!("- {}", describe(&view));
            view
        }
        Err(err) => {
            println!("- Application rejected: {err}");
            return Ok(());
        }
    };
    let nimbus = match service.create(&student("s-ananya"), apply("c-nimbus")) {
        Ok(view) => {
            println!("- {}", describe(&view));
            view
        }
        Err(err) => {
            println!("- Application rejected: {err}");
            return Ok(());
        }
    };

    // GPA gate: Karthik (6.8) does not meet Nimbus' 8.0 requirement.
    match service.create(&student("s-karthik"), apply("c-nimbus")) {
        Ok(view) => println!("- {}", describe(&view)),
        Err(err) => println!("- Karthik's Nimbus application refused: {err}"),
    }

    println!("\nReview");
    match service.update(
        &trident.id,
        &officer(),
        ApplicationPatch {
            status: Some(ApplicationStatus::UnderReview),
            remarks: Some("cleared aptitude round".to_string()),
            ..ApplicationPatch::default()
        },
    ) {
        Ok(report) => println!("- {}", describe(&report.application)),
        Err(err) => println!("- Review step failed: {err}"),
    }

    println!("\nDecision");
    match service.update(
        &trident.id,
        &officer(),
        ApplicationPatch::status(ApplicationStatus::Approved),
    ) {
        Ok(report) => {
            println!("- {}", describe(&report.application));
            println!(
                "- Exclusivity cascade rejected {} sibling application(s)",
                report.rejected_siblings
            );
        }
        Err(err) => println!("- Approval failed: {err}"),
    }

    println!("\nLocks");
    match service.create(&student("s-ananya"), apply("c-corvus")) {
        Ok(view) => println!("- Unexpected: {}", describe(&view)),
        Err(err) => println!("- Ananya can no longer apply: {err}"),
    }
    match service.update(
        &trident.id,
        &officer(),
        ApplicationPatch::status(ApplicationStatus::Rejected),
    ) {
        Ok(report) => println!("- Unexpected: {}", describe(&report.application)),
        Err(err) => println!("- Placement cannot be downgraded: {err}"),
    }
    match service.create(&student("s-rahul"), apply("c-trident")) {
        Ok(view) => println!("- {}", describe(&view)),
        Err(err) => println!("- Rahul's application refused: {err}"),
    }
    match service.create(&student("s-rahul"), apply("c-trident")) {
        Ok(view) => println!("- Unexpected: {}", describe(&view)),
        Err(err) => println!("- Rahul's second attempt refused: {err}"),
    }

    print_dashboard(&service);

    if args.show_payloads {
        println!("\nResolved payloads");
        for view in [&trident, &nimbus] {
            match service.get(&view.id, &officer()) {
                Ok(resolved) => match serde_json::to_string_pretty(&resolved) {
                    Ok(json) => println!("{json}"),
                    Err(err) => println!("- Payload unavailable: {err}"),
                },
                Err(err) => println!("- Payload unavailable: {err}"),
            }
        }
    }

    Ok(())
}

pub(crate) fn run_stats() -> Result<(), AppError> {
    let service = build_seeded_service();

    if let Ok(view) = service.create(&student("s-ananya"), apply("c-trident")) {
        let _ = service.create(&student("s-ananya"), apply("c-nimbus"));
        if let Err(err) = service.update(
            &view.id,
            &officer(),
            ApplicationPatch::status(ApplicationStatus::Approved),
        ) {
            println!("warning: scripted approval failed: {err}");
        }
    }

    print_dashboard(&service);
    Ok(())
}

fn print_dashboard(service: &SeededService) {
    println!("\nOfficer dashboard");
    match service.stats(&officer()) {
        Ok(PlacementStats::Officer(stats)) => {
            println!(
                "- Companies: {} total, {} accepting applications",
                stats.total_companies, stats.active_companies
            );
            println!(
                "- Students: {} total, {} placed ({}% placement rate)",
                stats.total_students, stats.placed_students, stats.placement_rate
            );
            println!(
                "- Applications: {} total | {} pending | {} approved",
                stats.total_applications, stats.pending_applications, stats.approved_applications
            );
        }
        Ok(PlacementStats::Student(_)) => {
            println!("- Unexpected student-scoped stats for an officer actor");
        }
        Err(err) => println!("- Stats unavailable: {err}"),
    }
}
