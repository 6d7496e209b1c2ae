use std::io::Write;
use std::path::Path;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use agri_app::models::render_dashboard;
use agri_app::{
    AppServices, ChatModel, DashboardModel, DiseaseDetectorModel, SoilAnalysis, SoilScannerModel,
    WorkflowError,
};
use agri_core::{AppError, Config};
use agri_services::InlineImage;

const USAGE: &str = "\
AgriGenius - farming assistant

Usage: agrigenius <command> [args]

Commands:
  dashboard [--watch]   Weather, location, satellite and last scan
  scan-soil <image>     Recommend crops for a soil photo
  guide <crop>          Planting guide for a crop
  diagnose <image>      Diagnose a plant leaf photo and save it to history
  history               List past diagnoses
  chat                  Chat with the farming assistant
  search <query>        Search the web for farming information";

#[tokio::main]
async fn main() -> Result<()> {
    agri_core::init()?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first().map(String::as_str) else {
        println!("{}", USAGE);
        return Ok(());
    };
    if matches!(command, "help" | "-h" | "--help") {
        println!("{}", USAGE);
        return Ok(());
    }

    let (config, _validation) = Config::load_validated()?;
    tracing::info!("Config loaded from {}", config.config_dir.display());
    let services = AppServices::from_config(config)?;

    let rest = &args[1..];
    let outcome = match command {
        "dashboard" => dashboard(&services, rest.iter().any(|a| a == "--watch")).await,
        "scan-soil" => scan_soil(&services, required(rest, "image path")?).await,
        "guide" => guide(&services, &rest.join(" ")).await,
        "diagnose" => diagnose(&services, required(rest, "image path")?).await,
        "history" => {
            history(&services);
            Ok(())
        }
        "chat" => chat(&services).await,
        "search" => search(&services, &rest.join(" ")).await,
        other => {
            eprintln!("Unknown command: {}\n\n{}", other, USAGE);
            Ok(())
        }
    };

    if let Err(e) = outcome {
        tracing::error!("{}", e);
        eprintln!("{}", AppError::from(e).user_message());
    }

    services.shutdown();
    Ok(())
}

fn required<'a>(args: &'a [String], what: &str) -> Result<&'a str> {
    args.first()
        .map(String::as_str)
        .ok_or_else(|| anyhow::anyhow!("Missing {}\n\n{}", what, USAGE))
}

fn load_image(path: &str) -> Result<InlineImage, WorkflowError> {
    InlineImage::from_path(Path::new(path)).map_err(WorkflowError::Image)
}

async fn dashboard(services: &AppServices, watch: bool) -> Result<(), WorkflowError> {
    let mut dashboard = DashboardModel::start(services);

    if dashboard.wait_for_view().await.is_some() {
        dashboard.refresh_satellite().await;
    }
    println!("{}", render_dashboard(&dashboard.state(), dashboard.satellite_state()));

    if watch {
        let mut satellite_tick = tokio::time::interval(services.satellite_refresh_interval());
        satellite_tick.tick().await;

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => break,
                state = dashboard.next_state() => {
                    let Some(state) = state else { break };
                    println!("{}", render_dashboard(&state, dashboard.satellite_state()));
                }
                _ = satellite_tick.tick() => {
                    if dashboard.refresh_satellite().await.is_some() {
                        println!("{}", render_dashboard(&dashboard.state(), dashboard.satellite_state()));
                    }
                }
            }
        }
    }

    dashboard.shutdown().await;
    Ok(())
}

async fn scan_soil(services: &AppServices, path: &str) -> Result<(), WorkflowError> {
    let image = load_image(path)?;
    let mut model = SoilScannerModel::new(services.gemini().clone(), services.images());

    match model.analyze(&image).await? {
        SoilAnalysis::NotSoil => {
            println!("That doesn't look like soil. Try a clear photo of the ground.");
        }
        SoilAnalysis::Crops(cards) => {
            println!("Recommended crops:");
            for card in &cards {
                let image = card.image.current();
                println!("  {:<16} {}", card.name, image.url().unwrap_or(""));
            }
            println!("\nRun `agrigenius guide <crop>` for a planting guide.");
        }
    }
    Ok(())
}

async fn guide(services: &AppServices, crop: &str) -> Result<(), WorkflowError> {
    let crop = crop.trim();
    if crop.is_empty() {
        eprintln!("Missing crop name\n\n{}", USAGE);
        return Ok(());
    }
    let model = SoilScannerModel::new(services.gemini().clone(), services.images());
    println!("{}", model.try_planting_guide(crop).await?);
    Ok(())
}

async fn diagnose(services: &AppServices, path: &str) -> Result<(), WorkflowError> {
    let image = load_image(path)?;
    let mut model = DiseaseDetectorModel::new(services.gemini().clone(), services.history().clone());

    let scan = model.analyze(&image).await?;
    println!("{}", scan.record.analysis_text);
    if !scan.saved {
        eprintln!("\n(The diagnosis could not be saved to history.)");
    }
    Ok(())
}

fn history(services: &AppServices) {
    let records = services.history().list();
    if records.is_empty() {
        println!("No scans yet.");
        return;
    }
    for record in records.iter().rev() {
        let summary = record.analysis_text.lines().next().unwrap_or("");
        println!("{}  {}", record.timestamp, summary);
    }
}

async fn chat(services: &AppServices) -> Result<(), WorkflowError> {
    let mut chat = ChatModel::new(services.gemini());
    for message in chat.messages() {
        println!("AgriGenius: {}", message.text);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        let _ = std::io::stdout().flush();

        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!("Failed to read input: {}", e);
                break;
            }
        };
        if matches!(line.trim(), "exit" | "quit") {
            break;
        }

        print!("AgriGenius: ");
        let sent = chat
            .send(&line, |_, chunk| {
                print!("{}", chunk);
                let _ = std::io::stdout().flush();
            })
            .await;
        println!();

        if let Err(e) = sent {
            tracing::warn!("{}", e);
            println!("{}", e.user_message());
        }
    }
    Ok(())
}

async fn search(services: &AppServices, query: &str) -> Result<(), WorkflowError> {
    let results = services.search().try_search(query, 5).await?;
    if results.is_empty() {
        println!("No results found.");
    }
    for result in results {
        println!("{}\n  {}\n  {}\n", result.title, result.link, result.snippet);
    }
    Ok(())
}
