use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use servicehub::builtin;
use servicehub::cli::{Cli, Commands};
use servicehub::config::Config;
use servicehub::domain::ServiceManifest;
use servicehub::features::{FeatureKind, FetchResult, PageKey};
use servicehub::net::ReqwestClient;
use servicehub::registry::{RegistryBuilder, ServiceRegistry};
use servicehub::service::ServiceConfig;
use servicehub::services::{FetchService, InstallOutcome, InstallService, PostView, UserView};
use servicehub::storage::sqlite::{SqliteInstalledServiceRepository, SqliteStorage};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::from_env().context("failed to load configuration")?;
    init_logging(&config);

    // Initialize storage
    let storage = SqliteStorage::new(&config.db_path)
        .with_context(|| format!("failed to open database {}", config.db_path))?;
    let installs = InstallService::new(SqliteInstalledServiceRepository::new(storage));

    match cli.command {
        Commands::List => cmd_list(&load_registry(&config, &installs)?),
        Commands::Show { id } => cmd_show(&load_registry(&config, &installs)?, &id),
        Commands::Validate { path } => cmd_validate(&path),
        Commands::Install { path } => cmd_install(&installs, &config, &path),
        Commands::Uninstall { id } => cmd_uninstall(&installs, &id),
        Commands::Fetch {
            id,
            configs,
            page,
            pages,
            json,
        } => cmd_fetch(
            &load_registry(&config, &installs)?,
            &id,
            &configs,
            page.as_deref(),
            pages,
            json,
        ),
        Commands::User {
            id,
            user_id,
            configs,
            json,
        } => cmd_user(&load_registry(&config, &installs)?, &id, &user_id, &configs, json),
    }
}

fn init_logging(config: &Config) {
    let filter = EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_registry(
    config: &Config,
    installs: &InstallService<SqliteInstalledServiceRepository>,
) -> Result<ServiceRegistry> {
    let records = installs.list().context("failed to read installed services")?;
    let http = Arc::new(ReqwestClient::new(config.http_timeout));

    let (registry, report) = RegistryBuilder::new(http)
        .policy(config.merge_policy)
        .builtins(&builtin::loader())
        .installed(records)
        .build();

    tracing::debug!(
        problems = report.problems.len(),
        shadowed = report.shadowed.len(),
        unbound = report.unbound.len(),
        "registry ready"
    );

    Ok(registry)
}

fn feature_list(registry: &ServiceRegistry, id: &str) -> String {
    match registry.get(id) {
        Some(service) => {
            let kinds: Vec<&str> = service
                .features()
                .kinds()
                .iter()
                .map(FeatureKind::as_str)
                .collect();
            if kinds.is_empty() {
                "no features".to_string()
            } else {
                kinds.join(", ")
            }
        }
        None => "unbound".to_string(),
    }
}

fn cmd_list(registry: &ServiceRegistry) -> Result<()> {
    let manifests = registry.manifests();

    if manifests.is_empty() {
        println!("No services registered.");
        return Ok(());
    }

    println!("Registered services:\n");
    for manifest in manifests {
        println!("  {} [{}]", manifest.name, manifest.provenance());
        println!("    ID: {}", manifest.id);
        println!("    Features: {}", feature_list(registry, &manifest.id));
        println!();
    }

    if !registry.shadowed().is_empty() {
        println!("Shadowed:");
        for manifest in registry.shadowed() {
            println!("  {} [{}]", manifest.id, manifest.provenance());
        }
    }

    Ok(())
}

fn cmd_show(registry: &ServiceRegistry, id: &str) -> Result<()> {
    let manifest = registry
        .manifest(id)
        .with_context(|| format!("no service with id '{}'", id))?;

    println!("{}", serde_json::to_string_pretty(manifest)?);
    println!();
    println!("Origin: {}", manifest.provenance());
    println!("Features: {}", feature_list(registry, id));

    Ok(())
}

fn cmd_validate(path: &str) -> Result<()> {
    let manifest = ServiceManifest::from_file(path)?;
    println!("Manifest OK: {} ({})", manifest.id, manifest.name);
    Ok(())
}

fn cmd_install(
    installs: &InstallService<SqliteInstalledServiceRepository>,
    config: &Config,
    path: &str,
) -> Result<()> {
    let (manifest, outcome) = installs.install(path)?;

    match outcome {
        InstallOutcome::Installed => println!("Installed: {} ({})", manifest.id, manifest.name),
        InstallOutcome::Replaced => println!("Reinstalled: {} ({})", manifest.id, manifest.name),
    }

    let shadows_builtin = builtin::loader()
        .load_all()
        .iter()
        .any(|m| m.id == manifest.id);
    if shadows_builtin {
        println!(
            "  Note: a built-in service has the same id; it stays in use until code is bound \
             to this manifest (merge policy '{}' applies then).",
            config.merge_policy
        );
    }

    Ok(())
}

fn cmd_uninstall(
    installs: &InstallService<SqliteInstalledServiceRepository>,
    id: &str,
) -> Result<()> {
    installs.uninstall(id)?;
    println!("Uninstalled: {}", id);
    Ok(())
}

fn cmd_fetch(
    registry: &ServiceRegistry,
    id: &str,
    configs: &[String],
    page: Option<&str>,
    pages: usize,
    json: bool,
) -> Result<()> {
    let configs = ServiceConfig::from_pairs(configs)?;
    let start = page.map(PageKey::from_token).transpose()?;

    if pages == 0 {
        bail!("--pages must be at least 1");
    }

    let fetch = FetchService::new(registry);
    let page = match fetch.collect_pages(id, configs, start, pages)? {
        FetchResult::Success(page) => page,
        FetchResult::Failure(e) => bail!("{} failed: {}", id, e),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&page)?);
        return Ok(());
    }

    let manifest = registry
        .manifest(id)
        .with_context(|| format!("no service with id '{}'", id))?;

    if page.is_empty() {
        println!("No posts.");
    }

    let next_key = page.next_key.clone();
    for post in page {
        let view = PostView::new(post, manifest);
        println!("  {}", view.display_title);
        println!("    URL: {}", view.post.url);
        if let Some(published) = view.post.published_at {
            println!("    Published: {}", published.format("%Y-%m-%d %H:%M"));
        }
        println!();
    }

    if let Some(key) = next_key {
        println!("Next page: {}", key.to_token());
    }

    Ok(())
}

fn cmd_user(
    registry: &ServiceRegistry,
    id: &str,
    user_id: &str,
    configs: &[String],
    json: bool,
) -> Result<()> {
    let configs = ServiceConfig::from_pairs(configs)?;
    let fetch = FetchService::new(registry);

    let user = match fetch.fetch_user(id, configs, user_id)? {
        FetchResult::Success(user) => user,
        FetchResult::Failure(e) => bail!("{} failed: {}", id, e),
    };

    let manifest = registry
        .manifest(id)
        .with_context(|| format!("no service with id '{}'", id))?;
    let view = UserView::new(user, manifest);

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    println!("{} [{}]", view.user.name, view.branding.service_name);
    println!("  ID: {}", view.user.id);
    if let Some(url) = &view.user.url {
        println!("  URL: {}", url);
    }
    if let Some(description) = &view.plain_description {
        println!("  {}", description);
    }
    if let Some(followers) = view.user.follower_count {
        println!("  Followers: {}", followers);
    }

    Ok(())
}
