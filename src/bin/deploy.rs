use clap::Parser;
use port_orchestrator::config::toml_config::{DeployPlan, DeployTarget};
use port_orchestrator::core::inventory::builtin_inventory;
use port_orchestrator::utils::{logger, validation::Validate};
use port_orchestrator::{
    BlueGreen, HealthSupervisor, HttpHealthProbe, PortAllocator, RolloutOutcome,
};

#[derive(Parser)]
#[command(name = "deploy")]
#[command(about = "Blue-green deployment runner driven by health checks")]
struct Args {
    /// Path to TOML deployment plan
    #[arg(short, long, default_value = "deploy-plan.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override staging attempts for every target
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Dry run - show what would be deployed without executing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose);

    tracing::info!("🚀 Starting blue-green deployment runner");
    tracing::info!("📁 Loading deployment plan from: {}", args.config);

    // 載入部署計畫
    let plan = match DeployPlan::from_file(&args.config) {
        Ok(plan) => plan,
        Err(e) => {
            eprintln!("❌ Failed to load plan file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 驗證計畫
    if let Err(e) = plan.validate() {
        tracing::error!("❌ Plan validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Deployment plan loaded and validated successfully");

    display_plan_summary(&plan, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual deployment will occur");
        perform_dry_run(&plan);
        return Ok(());
    }

    // 清冊埠設為靜態持有，但部署目標的現役埠改登記為執行期配置，
    // cutover 之後才能釋放
    let mut inventory = builtin_inventory();
    let target_services: Vec<&str> = plan.targets.iter().map(|t| t.service.as_str()).collect();
    for svc in inventory.iter_mut() {
        svc.ports.retain(|p| !target_services.contains(&p.service.as_str()));
    }

    let mut allocator = PortAllocator::from_inventory(&inventory);
    for target in &plan.targets {
        if let Err(e) = allocator.reserve(target.component, target.current_port, &target.service) {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    }

    let settings = plan.probe_settings();
    let probe = HttpHealthProbe::new(settings.timeout);
    let mut supervisor = HealthSupervisor::new(probe, settings);

    let mut rolled_back = 0;
    for target in &plan.targets {
        let mut bg = BlueGreen::new(&target.service, target.component, target.current_port);
        let max_attempts = args
            .max_attempts
            .or(target.max_attempts)
            .unwrap_or(5);

        let outcome = supervisor
            .roll_service(
                &mut bg,
                &mut allocator,
                |port| target.health_url(port),
                max_attempts,
            )
            .await;

        match outcome {
            Ok(RolloutOutcome::CutOver { port }) => {
                println!("✅ {}: now serving on port {}", target.service, port);
            }
            Ok(RolloutOutcome::RolledBack { port }) => {
                rolled_back += 1;
                println!(
                    "↩️ {}: staged slot on port {} never became healthy, kept port {}",
                    target.service, port, target.current_port
                );
            }
            Err(e) => {
                tracing::error!(
                    "❌ Deployment of '{}' failed: {} (Category: {:?}, Severity: {:?})",
                    target.service,
                    e,
                    e.category(),
                    e.severity()
                );
                eprintln!("❌ {}", e.user_friendly_message());
                eprintln!("💡 建議: {}", e.recovery_suggestion());
                std::process::exit(1);
            }
        }
    }

    if rolled_back > 0 {
        println!(
            "\n⚠️ {} of {} deployments rolled back",
            rolled_back,
            plan.targets.len()
        );
        std::process::exit(2);
    }

    println!("\n✅ All {} deployments cut over successfully", plan.targets.len());
    Ok(())
}

fn display_plan_summary(plan: &DeployPlan, args: &Args) {
    let settings = plan.probe_settings();

    println!("📋 Deployment Plan Summary:");
    println!("  Plan: {}", plan.plan.name);
    println!("  Targets: {}", plan.targets.len());
    println!(
        "  Probe: every {:?}, timeout {:?}, {} retries",
        settings.interval, settings.timeout, settings.retries
    );

    if let Some(max_attempts) = args.max_attempts {
        println!("  🔧 Max attempts overridden to: {}", max_attempts);
    }

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(plan: &DeployPlan) {
    println!("🔍 Dry Run Analysis:");
    println!();

    for target in &plan.targets {
        print_target_analysis(target);
    }

    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");
}

fn print_target_analysis(target: &DeployTarget) {
    let (start, end) = target.component.port_range();

    println!("🚀 {}:", target.service);
    println!("  Component: {} ({}-{})", target.component, start, end);
    println!("  Current port: {}", target.current_port);
    if let Some(image) = &target.image {
        println!("  Image: {}", image);
    }
    println!(
        "  Staged health check: {}",
        target.health_url(target.current_port)
    );
    println!("  Max staging attempts: {}", target.max_attempts.unwrap_or(5));
    println!();
}
