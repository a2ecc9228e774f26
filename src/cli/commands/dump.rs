use serde_json::{json, Value};

use crate::cli::utils::truncate;
use crate::cli::OutputFormat;
use crate::database::models::{Certificate, Project};
use crate::database::ContentStore;

pub async fn handle(store: &dyn ContentStore, output_format: OutputFormat) -> anyhow::Result<()> {
    let projects = store.list_projects().await?;
    let certificates = store.list_certificates().await?;

    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&dump_value(&projects, &certificates))?);
        }
        OutputFormat::Text => {
            println!("Projects ({}):", projects.len());
            println!("{:<10} {:<30} {:<30} {}", "ID", "TITLE", "TECH", "CREATED");
            println!("{}", "-".repeat(90));
            for p in &projects {
                println!(
                    "{:<10} {:<30} {:<30} {}",
                    truncate(&p.id.to_string(), 10),
                    truncate(&p.title, 30),
                    truncate(&p.tech_stack.join(", "), 30),
                    p.created_at.format("%Y-%m-%d %H:%M")
                );
            }

            println!();
            println!("Certificates ({}):", certificates.len());
            println!("{:<10} {:<30} {:<20} {:<12} {}", "ID", "TITLE", "ISSUER", "STATUS", "PROGRESS");
            println!("{}", "-".repeat(90));
            for c in &certificates {
                println!(
                    "{:<10} {:<30} {:<20} {:<12} {}%",
                    truncate(&c.id.to_string(), 10),
                    truncate(&c.title, 30),
                    truncate(c.issuer.as_deref().unwrap_or("-"), 20),
                    c.status,
                    c.progress_percent
                );
            }
        }
    }

    Ok(())
}

fn dump_value(projects: &[Project], certificates: &[Certificate]) -> Value {
    json!({
        "projects": projects,
        "certificates": certificates,
    })
}
