use anyhow::Context;
use clap::Parser;
use greenme::domain::model::FootprintBreakdown;
use greenme::utils::error::ErrorSeverity;
use greenme::utils::{logger, validation::Validate};
use greenme::{build_engine, CliArgs, GreenMeConfig, GreenMeError};

const CHART_WIDTH: usize = 40;

fn render_bar_chart(breakdown: &FootprintBreakdown) -> String {
    let max = breakdown
        .categories()
        .iter()
        .map(|(_, v)| *v)
        .fold(0.0_f64, f64::max);

    breakdown
        .categories()
        .iter()
        .map(|(label, value)| {
            let width = if max > 0.0 {
                ((value / max) * CHART_WIDTH as f64).round() as usize
            } else {
                0
            };
            format!("{:<8} {:<w$} {:.2} kg CO2", label, "█".repeat(width), value, w = CHART_WIDTH)
        })
        .chain(std::iter::once(format!(
            "{:<8} {:<w$} {:.2} kg CO2",
            "Total",
            "",
            breakdown.total_kg(),
            w = CHART_WIDTH
        )))
        .collect::<Vec<_>>()
        .join("\n")
}

fn export_breakdown(path: &str, breakdown: &FootprintBreakdown) -> anyhow::Result<()> {
    let csv = breakdown.to_csv().unwrap_or_else(|e| fail(e));
    std::fs::write(path, csv)
        .with_context(|| format!("failed to write breakdown CSV to {}", path))?;
    tracing::info!("📁 Breakdown saved to: {}", path);
    Ok(())
}

fn exit_code(e: &GreenMeError) -> i32 {
    match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

fn fail(e: GreenMeError) -> ! {
    tracing::error!(
        "❌ GreenMe failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
    std::process::exit(exit_code(&e));
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    let config = match GreenMeConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    match config.log_format() {
        "json" => logger::init_json_logger(args.verbose, config.log_level()),
        _ => logger::init_cli_logger(args.verbose, config.log_level()),
    }
    tracing::info!("🌍 Starting GreenMe with config {}", args.config);

    if let Err(e) = config.validate() {
        fail(e);
    }

    let profile = args.profile();
    let engine = build_engine(&config, args.template).unwrap_or_else(|e| fail(e));

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - no service will be called");
        let preview = engine.preview(&profile).unwrap_or_else(|e| fail(e));
        println!("Carbon Footprint Breakdown (static estimate)");
        println!("{}", render_bar_chart(&preview.breakdown));
        if let Some(path) = &args.export_csv {
            export_breakdown(path, &preview.breakdown)?;
        }
        println!("\nPrompt:\n{}", preview.prompt);
        return Ok(());
    }

    let submission = engine
        .run(&profile, args.country.as_deref())
        .await
        .unwrap_or_else(|e| fail(e));

    for notice in &submission.notices {
        eprintln!("⚠️  {}", notice);
    }

    println!("Carbon Footprint Breakdown ({} estimate)", submission.energy.source);
    println!("{}", render_bar_chart(&submission.breakdown));

    if let Some(path) = &args.export_csv {
        export_breakdown(path, &submission.breakdown)?;
    }

    match &submission.report {
        Some(report) => {
            println!("\nEco-Friendly Tips");
            println!("{}", report);
        }
        None => println!("\nNo tips could be generated this time."),
    }

    Ok(())
}
