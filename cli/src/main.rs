//! EcoLedger command line — drives verification runs and ledger queries
//! against the backend services.

use anyhow::Context;
use clap::Parser;
use ecoledger_clients::ledger::TransferRequest;
use ecoledger_clients::{check_all, ServiceClient, ServiceEndpoints, ServiceKind};
use ecoledger_pipeline::{HttpServices, Orchestrator, PipelineError, RunEvent};
use ecoledger_types::{EvidenceFile, IotPayload, Score, VerificationInput};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "ecoledger", about = "EcoLedger verification pipeline client")]
struct Cli {
    /// Path to a TOML file with service endpoint settings. File settings are
    /// the base; environment variables override them.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run the full verification pipeline for a project.
    Verify(VerifyArgs),
    /// Check every service's health endpoint.
    Health,
    /// List carbon credits available for purchase.
    Credits,
    /// Show ledger chain statistics.
    Stats,
    /// Fetch a stored verification report.
    Report {
        /// Report id assigned at submission.
        report_id: String,
    },
    /// Transfer issued credits from an NGO to a company.
    Transfer(TransferArgs),
}

#[derive(clap::Args)]
struct VerifyArgs {
    #[arg(long, env = "ECOLEDGER_NGO_ID")]
    ngo_id: String,

    #[arg(long, env = "ECOLEDGER_PROJECT_ID")]
    project_id: String,

    #[arg(long, default_value = "")]
    project_name: String,

    /// Trees the NGO claims to have planted.
    #[arg(long)]
    claimed_trees: u32,

    /// Manual audit confidence, 0.0 to 1.0.
    #[arg(long)]
    audit_check: f64,

    /// Tree-count evidence image (drone or satellite).
    #[arg(long)]
    tree_image: PathBuf,

    /// Dedicated NDVI image; the tree image is reused when omitted.
    #[arg(long)]
    ndvi_image: Option<PathBuf>,

    /// Whether the NDVI image carries NIR bands.
    #[arg(long)]
    multispectral: bool,

    /// Sensor readings as a JSON document.
    #[arg(long, conflicts_with = "iot_csv")]
    iot_json: Option<PathBuf>,

    /// Sensor readings as a CSV upload.
    #[arg(long)]
    iot_csv: Option<PathBuf>,

    /// Price per credit (USD) used on issuance.
    #[arg(long, default_value_t = 25.0, env = "ECOLEDGER_PRICE_PER_CREDIT")]
    price_per_credit: f64,
}

#[derive(clap::Args)]
struct TransferArgs {
    #[arg(long)]
    credit_id: String,

    #[arg(long)]
    from_ngo: String,

    #[arg(long)]
    to_company: String,

    /// Partial amount; the whole credit is transferred when omitted.
    #[arg(long)]
    amount: Option<f64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    ecoledger_utils::init_tracing();

    let cli = Cli::parse();
    let endpoints = resolve_endpoints(cli.config.as_deref())?;
    let client = ServiceClient::new(endpoints)?;

    match cli.command {
        Command::Verify(args) => verify(client, args).await,
        Command::Health => health(client).await,
        Command::Credits => credits(client).await,
        Command::Stats => stats(client).await,
        Command::Report { report_id } => report(client, &report_id).await,
        Command::Transfer(args) => transfer(client, args).await,
    }
}

/// File settings (when given) as the base, environment overrides on top.
fn resolve_endpoints(config: Option<&Path>) -> anyhow::Result<ServiceEndpoints> {
    let mut endpoints = match config {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            let parsed: ServiceEndpoints = toml::from_str(&contents)
                .with_context(|| format!("failed to parse config file {}", path.display()))?;
            tracing::info!(config = %path.display(), "loaded endpoint config");
            parsed
        }
        None => ServiceEndpoints::default(),
    };
    for kind in ServiceKind::ALL {
        if let Ok(url) = std::env::var(kind.env_var()) {
            if !url.trim().is_empty() {
                endpoints.set(kind, url);
            }
        }
    }
    Ok(endpoints)
}

fn load_evidence(path: &Path) -> anyhow::Result<EvidenceFile> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read evidence file {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    Ok(EvidenceFile::new(name, bytes))
}

async fn verify(client: ServiceClient, args: VerifyArgs) -> anyhow::Result<()> {
    let iot_data = match (&args.iot_json, &args.iot_csv) {
        (Some(path), _) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read IoT JSON {}", path.display()))?;
            let value: serde_json::Value = serde_json::from_str(&contents)
                .with_context(|| format!("invalid JSON in {}", path.display()))?;
            Some(IotPayload::Json(value))
        }
        (None, Some(path)) => Some(IotPayload::Csv(load_evidence(path)?)),
        (None, None) => None,
    };

    let input = VerificationInput {
        ngo_id: args.ngo_id,
        project_id: args.project_id,
        project_name: args.project_name,
        claimed_trees: args.claimed_trees,
        audit_check: Score::new(args.audit_check)?,
        tree_image: load_evidence(&args.tree_image)?,
        ndvi_image: args.ndvi_image.as_deref().map(load_evidence).transpose()?,
        multispectral: args.multispectral,
        iot_data,
        price_per_credit: args.price_per_credit,
    };

    let mut orchestrator = Orchestrator::new(HttpServices::new(client));
    let outcome = orchestrator.run(&input).await;
    print_events(orchestrator.drain_events());

    match outcome {
        Ok(report) => {
            println!();
            println!("Verification complete for {}", report.project_id);
            println!("  trees detected:   {} (claimed {})", report.tree.tree_count, report.claimed_trees);
            println!("  NDVI score:       {}", report.ndvi.ndvi_score);
            println!("  IoT score:        {}", report.iot.iot_score);
            println!("  CO2 absorbed:     {:.1} kg/year", report.co2.co2_absorbed_kg);
            println!("  final score:      {}", report.outcome.final_score);
            println!("  carbon credits:   {:.4}", report.outcome.carbon_credits);
            println!("  report id:        {}", report.submission.report_id);
            println!("  block:            #{}", report.submission.block_number);
            match &report.issuance {
                Some(receipt) => {
                    println!("  credits issued:   {} ({:.4})", receipt.credit_id, receipt.amount)
                }
                None => println!("  credits issued:   none"),
            }
            Ok(())
        }
        Err(PipelineError::Input(e)) => anyhow::bail!("invalid input: {e}"),
        Err(err @ PipelineError::Stage { .. }) => {
            if let PipelineError::Stage { completed, .. } = &err {
                println!(
                    "verification aborted after {} completed stage(s)",
                    completed.completed_stages()
                );
            }
            Err(err.into())
        }
    }
}

fn print_events(events: Vec<RunEvent>) {
    for event in events {
        match event {
            RunEvent::StageStarted { stage } => println!("-> {stage}"),
            RunEvent::TreesDetected { count } => println!("   detected {count} trees"),
            RunEvent::NdviScored { score, fallback_image } => {
                if fallback_image {
                    println!("   NDVI {score} (tree image reused)");
                } else {
                    println!("   NDVI {score}");
                }
            }
            RunEvent::IotScored { score, synthetic } => {
                if synthetic {
                    println!("   IoT {score} (synthetic readings)");
                } else {
                    println!("   IoT {score}");
                }
            }
            RunEvent::Co2Estimated { kg } => println!("   CO2 {kg:.1} kg/year"),
            RunEvent::FinalScored { score, carbon_credits, credits_eligible } => {
                println!("   final {score}, credits {carbon_credits:.4}, eligible: {credits_eligible}");
            }
            RunEvent::ReportSubmitted { report_id, block_number } => {
                println!("   anchored as {report_id} in block #{block_number}");
            }
            RunEvent::CreditsIssued { credit_id, amount } => {
                println!("   issued {credit_id} ({amount:.4} credits)");
            }
            RunEvent::IssuanceSkipped { reason } => println!("   issuance skipped: {reason}"),
        }
    }
}

async fn health(client: ServiceClient) -> anyhow::Result<()> {
    let results = check_all(client.endpoints()).await;
    let mut unhealthy = 0;
    for result in &results {
        if result.healthy {
            println!("{:<16} ok", result.service.to_string());
        } else {
            unhealthy += 1;
            let detail = result.detail.as_deref().unwrap_or("unknown failure");
            println!("{:<16} UNHEALTHY: {detail}", result.service.to_string());
        }
    }
    if unhealthy > 0 {
        anyhow::bail!("{unhealthy} of {} services unhealthy", results.len());
    }
    Ok(())
}

async fn credits(client: ServiceClient) -> anyhow::Result<()> {
    let listing = client.available_credits().await?;
    if listing.available_credits.is_empty() {
        println!("no credits available");
        return Ok(());
    }
    for credit in &listing.available_credits {
        let price = credit
            .price_per_credit
            .map(|p| format!("{p:.2} USD/credit"))
            .unwrap_or_else(|| "unpriced".to_string());
        println!(
            "{}  {:.4} credits  {}  (ngo {}, report {})",
            credit.credit_id, credit.amount, price, credit.ngo_id, credit.report_id
        );
    }
    println!("total available: {:.4}", listing.total_credits);
    Ok(())
}

async fn stats(client: ServiceClient) -> anyhow::Result<()> {
    let stats = client.ledger_stats().await?;
    println!("blocks:               {}", stats.blocks);
    println!("transactions:         {}", stats.transactions);
    println!("verification reports: {}", stats.verification_reports);
    println!(
        "available credits:    {} ({:.4})",
        stats.available_credits.count, stats.available_credits.total_amount
    );
    println!(
        "transferred credits:  {} ({:.4})",
        stats.transferred_credits.count, stats.transferred_credits.total_amount
    );
    Ok(())
}

async fn report(client: ServiceClient, report_id: &str) -> anyhow::Result<()> {
    let stored = client.query_report(report_id).await?;
    println!("report:     {}", stored.report_id);
    println!("ngo:        {}", stored.ngo_id);
    println!("project:    {}", stored.project_id);
    if let Some(block) = stored.block_number {
        println!("block:      #{block}");
    }
    if !stored.status.is_empty() {
        println!("status:     {}", stored.status);
    }
    println!("{}", serde_json::to_string_pretty(&stored.verification_data)?);
    Ok(())
}

async fn transfer(client: ServiceClient, args: TransferArgs) -> anyhow::Result<()> {
    let receipt = client
        .transfer_credits(&TransferRequest {
            credit_id: args.credit_id,
            from_ngo: args.from_ngo,
            to_company: args.to_company,
            amount: args.amount,
        })
        .await?;
    println!(
        "transferred {:.4} credits of {} to {} (tx {}, block #{})",
        receipt.amount, receipt.credit_id, receipt.to_company, receipt.transaction_id, receipt.block_number
    );
    Ok(())
}
