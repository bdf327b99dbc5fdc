mod display;
mod export;
mod parser;
mod santa;
mod web;

use std::path::{Path, PathBuf};

use display::print_assignments;
use export::{export_assignments, result_filename};
use parser::{load_employees, load_prior_assignments};
use santa::{assign, ForbiddenPairs};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    // Check if we should run in web mode
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && args[1] == "web" {
        let port = args
            .get(2)
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(8080);
        let upload_dir = PathBuf::from(
            std::env::var("SANTA_UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()),
        );
        let output_dir = PathBuf::from(
            std::env::var("SANTA_OUTPUT_DIR").unwrap_or_else(|_| "output".to_string()),
        );

        println!("Starting web server on port {}...", port);
        println!("Access the site at http://localhost:{}", port);

        web::start_server(port, upload_dir, output_dir).await?;
        return Ok(());
    }

    // CLI mode
    let Some(employee_path) = args.get(1) else {
        eprintln!("Usage: secret-santa <employee-list.csv> [prior-results.csv]");
        eprintln!("       secret-santa web [port]");
        std::process::exit(2);
    };

    println!("Loading employee list from {}...", employee_path);
    let roster = load_employees(employee_path)?;
    println!("Loaded {} employees", roster.len());

    let forbidden = match args.get(2) {
        Some(prior_path) => {
            println!("Loading prior results from {}...", prior_path);
            let prior = load_prior_assignments(prior_path)?;
            let forbidden = ForbiddenPairs::from_prior(&prior);
            println!(
                "Loaded {} prior assignments ({} forbidden pairings)",
                prior.len(),
                forbidden.len()
            );
            forbidden
        }
        None => ForbiddenPairs::new(),
    };

    let assignments = assign(&roster, &forbidden)?;
    print_assignments(&assignments);

    let filename = result_filename();
    export_assignments(&assignments, Path::new(&filename))?;
    println!("\nResults saved to {}", filename);

    Ok(())
}
