use crate::browser::session::PageSession;
use crate::cli::config::AppConfig;
use crate::fill::runner::{CancelToken, Engine, FillOptions, FillReport, RunStatus};
use crate::fill::validate::DefaultPolicy;
use crate::gateway::gateway::{HttpGateway, ModelGateway};
use crate::gateway::heuristic::HeuristicGateway;
use crate::page::adapter::{PageAdapter, SnapshotPage};
use crate::page::collector::collect;
use crate::page::descriptor::describe;
use crate::page::field_model::FieldDescriptor;
use crate::trace::logger::TraceLogger;

// ============================================================================
// scan subcommand
// ============================================================================

pub fn cmd_scan(
    url: Option<&str>,
    snapshot: Option<&str>,
    json: bool,
    verbose: u8,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut page = build_page(url, snapshot)?;

    if verbose > 0 {
        eprintln!("Extracting fields...");
    }

    let nodes = page.snapshot()?;
    let fields = collect(&nodes);
    let descriptors: Vec<FieldDescriptor> = fields
        .iter()
        .enumerate()
        .map(|(i, f)| describe(f, i))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&descriptors)?);
        return Ok(());
    }

    if descriptors.is_empty() {
        println!("No fillable fields found.");
        return Ok(());
    }

    println!("Found {} fields:", descriptors.len());
    for d in &descriptors {
        let label = if d.label.is_empty() { "(unlabeled)" } else { &d.label };
        println!(
            "  [{:>2}] {}  {:?}  name='{}'  label='{}'  form={}#{}",
            d.index, d.key, d.kind, d.name, label, d.form_index, d.order_within_form
        );
    }

    Ok(())
}

// ============================================================================
// fill subcommand
// ============================================================================

/// Run the fill pipeline and return whether anything was filled.
pub fn cmd_fill(
    url: Option<&str>,
    snapshot: Option<&str>,
    context_path: &str,
    backend: &str,
    batch_size: Option<usize>,
    dry_run: bool,
    trace_path: Option<&str>,
    verbose: u8,
    config: &AppConfig,
    endpoint: &str,
    model: &str,
) -> Result<bool, Box<dyn std::error::Error>> {
    let context = std::fs::read_to_string(context_path)?;
    let mut page = build_page(url, snapshot)?;
    let gateway = build_gateway(backend, endpoint, model, config);
    let policy = DefaultPolicy::with_overrides(&config.defaults);

    let options = FillOptions {
        batch_size: batch_size.unwrap_or(config.fill.batch_size),
        context_limit: config.fill.context_limit,
        dry_run,
    };

    let tracer = match trace_path {
        Some(path) => TraceLogger::new(path),
        None => TraceLogger::disabled(),
    };
    let engine = Engine::new();
    let cancel = CancelToken::new();

    if verbose > 0 {
        eprintln!(
            "Filling from '{}' via {} backend (batch size {})...",
            context_path, backend, options.batch_size
        );
    }

    let report = match engine.run(
        page.as_mut(),
        gateway.as_ref(),
        &policy,
        &options,
        &cancel,
        &tracer,
        &context,
    ) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("{}", e);
            return Ok(false);
        }
    };

    print_report(&report, dry_run);
    Ok(report.status == RunStatus::Completed)
}

fn print_report(report: &FillReport, dry_run: bool) {
    match report.status {
        RunStatus::NothingToFill => {
            println!("No fillable fields found.");
            return;
        }
        RunStatus::Cancelled => {
            println!("Fill run cancelled.");
            return;
        }
        RunStatus::Completed => {}
    }

    if report.auth_warning {
        eprintln!("Warning: the model provider rejected credentials on at least one call.");
    }

    let action = if dry_run { "Suggested" } else { "Filled" };
    println!(
        "{} {} of {} fields ({} batches sent, {} failed):",
        action,
        report.fields.len(),
        report.descriptors.len(),
        report.batches_sent,
        report.batches_failed
    );

    for field in &report.fields {
        let descriptor = &report.descriptors[field.index];
        let label = if descriptor.label.is_empty() {
            descriptor.name.as_str()
        } else {
            descriptor.label.as_str()
        };
        println!(
            "  [{:>2}] {} = '{}'  (confidence {:.2}{})",
            field.index,
            label,
            field.value,
            field.confidence,
            if field.reason.is_empty() { String::new() } else { format!(", {}", field.reason) }
        );
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Open the page: a live bridge session when a URL is given, a recorded
/// snapshot otherwise.
fn build_page(
    url: Option<&str>,
    snapshot: Option<&str>,
) -> Result<Box<dyn PageAdapter>, Box<dyn std::error::Error>> {
    match (url, snapshot) {
        (Some(url), _) => {
            let mut session = PageSession::launch()?;
            session.navigate(url)?;
            Ok(Box::new(session))
        }
        (None, Some(path)) => Ok(Box::new(SnapshotPage::from_file(path)?)),
        (None, None) => Err("either --url or --snapshot is required".into()),
    }
}

/// Build the appropriate suggestion backend based on name.
fn build_gateway(name: &str, endpoint: &str, model: &str, config: &AppConfig) -> Box<dyn ModelGateway> {
    match name {
        "heuristic" => Box::new(HeuristicGateway),
        _ => {
            let api_key = std::env::var(&config.gateway.api_key_env).ok();
            Box::new(HttpGateway::new(endpoint, model, api_key))
        }
    }
}
