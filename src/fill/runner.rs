use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::fill::error::FillError;
use crate::fill::resolver::ResolutionTable;
use crate::fill::validate::{DefaultPolicy, clamp_confidence, validate_value};
use crate::gateway::gateway::{ModelGateway, PROMPT_TIMEOUT, SessionOptions};
use crate::gateway::parser::{RawSuggestion, parse_suggestions};
use crate::gateway::prompt::build_fill_prompt;
use crate::page::adapter::PageAdapter;
use crate::page::collector::collect;
use crate::page::descriptor::describe;
use crate::page::field_model::{FieldDescriptor, FieldKind};
use crate::trace::logger::TraceLogger;
use crate::trace::trace::TraceEvent;

pub const DEFAULT_BATCH_SIZE: usize = 24;
pub const DEFAULT_CONTEXT_LIMIT: usize = 6000;
const BACKFILL_CONFIDENCE: f64 = 0.3;

#[derive(Debug, Clone)]
pub struct FillOptions {
    /// Fields per model round-trip; bounds prompt size.
    pub batch_size: usize,
    /// Maximum characters of user context sent per prompt.
    pub context_limit: usize,
    /// Resolve and report, but write nothing to the page.
    pub dry_run: bool,
}

impl Default for FillOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            context_limit: DEFAULT_CONTEXT_LIMIT,
            dry_run: false,
        }
    }
}

/// Shared cancellation flag. Checked before each batch and before each
/// awaited gateway call; setting it is idempotent and safe from any point
/// in the run.
#[derive(Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A field with an accepted suggestion.
#[derive(Debug, Clone)]
pub struct IdentifiedField {
    pub index: usize,
    pub key: String,
    pub value: String,
    pub confidence: f64,
    /// User-togglable; toggling off clears the control.
    pub included: bool,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Completed,
    /// Zero fillable fields on the page. Terminal, not an error.
    NothingToFill,
    /// User-initiated stop. Distinguished from failure: no error surfaced.
    Cancelled,
}

#[derive(Debug)]
pub struct FillReport {
    pub status: RunStatus,
    pub fields: Vec<IdentifiedField>,
    pub descriptors: Vec<FieldDescriptor>,
    pub batches_sent: usize,
    pub batches_failed: usize,
    pub auth_warning: bool,
}

impl FillReport {
    fn empty(status: RunStatus) -> Self {
        Self {
            status,
            fields: Vec::new(),
            descriptors: Vec::new(),
            batches_sent: 0,
            batches_failed: 0,
            auth_warning: false,
        }
    }
}

// ============================================================================
// Engine — one run at a time
// ============================================================================

/// Serializes fill runs: a run requested while one is active is rejected
/// outright rather than queued.
#[derive(Default)]
pub struct Engine {
    running: AtomicBool,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run(
        &self,
        page: &mut dyn PageAdapter,
        gateway: &dyn ModelGateway,
        policy: &DefaultPolicy,
        options: &FillOptions,
        cancel: &CancelToken,
        tracer: &TraceLogger,
        context: &str,
    ) -> Result<FillReport, FillError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(FillError::RunInProgress);
        }
        let result = run_fill(page, gateway, policy, options, cancel, tracer, context);
        self.running.store(false, Ordering::SeqCst);
        result
    }
}

// ============================================================================
// The pipeline
// ============================================================================

/// One complete fill pass: snapshot → collect → describe → batched model
/// round-trips → resolve/validate → backfill → apply.
///
/// Failures are recovered at the narrowest scope: a bad suggestion is
/// dropped, a failed batch yields nothing and the next batch proceeds.
/// Only an all-batches-empty run errors out.
pub fn run_fill(
    page: &mut dyn PageAdapter,
    gateway: &dyn ModelGateway,
    policy: &DefaultPolicy,
    options: &FillOptions,
    cancel: &CancelToken,
    tracer: &TraceLogger,
    context: &str,
) -> Result<FillReport, FillError> {
    let nodes = page.snapshot()?;
    let fields = collect(&nodes);
    if fields.is_empty() {
        tracer.log(&TraceEvent::now("run_empty"));
        return Ok(FillReport::empty(RunStatus::NothingToFill));
    }

    let descriptors: Vec<FieldDescriptor> = fields
        .iter()
        .enumerate()
        .map(|(i, f)| describe(f, i))
        .collect();
    let table = ResolutionTable::build(&descriptors);

    tracer.log(&TraceEvent::now("run_started").with_detail(descriptors.len()));

    let mut report = FillReport::empty(RunStatus::Completed);

    let session = match gateway.create_session(&SessionOptions::default()) {
        Ok(id) => Some(id),
        Err(e) => {
            report.auth_warning |= e.is_auth();
            tracer.log(&TraceEvent::now("session_failed").with_detail(&e));
            None
        }
    };

    // File inputs never go to the model and are never fillable.
    let sendable: Vec<&FieldDescriptor> = descriptors
        .iter()
        .filter(|d| d.kind != FieldKind::File)
        .collect();

    let mut claimed: HashSet<usize> = HashSet::new();
    let mut cancelled = false;

    for (batch_no, batch) in sendable.chunks(options.batch_size.max(1)).enumerate() {
        if cancel.is_cancelled() {
            cancelled = true;
            break;
        }

        let Some(session_id) = session.as_deref() else {
            report.batches_failed += 1;
            continue;
        };

        let prompt = build_fill_prompt(batch, context, options.context_limit)?;

        // Last check before the expensive round-trip.
        if cancel.is_cancelled() {
            cancelled = true;
            break;
        }

        tracer.log(&TraceEvent::now("batch_sent").with_batch(batch_no).with_detail(batch.len()));
        report.batches_sent += 1;

        let reply = match gateway.prompt(session_id, &prompt, PROMPT_TIMEOUT) {
            Ok(text) => text,
            Err(e) => {
                report.auth_warning |= e.is_auth();
                report.batches_failed += 1;
                tracer.log(&TraceEvent::now("batch_failed").with_batch(batch_no).with_detail(&e));
                continue;
            }
        };

        for raw in parse_suggestions(&reply) {
            accept_suggestion(
                &raw,
                &descriptors,
                &table,
                policy,
                &mut claimed,
                &mut report.fields,
                tracer,
            );
        }
    }

    if !cancelled {
        backfill_defaults(&descriptors, policy, &mut claimed, &mut report.fields, tracer);
    }

    // Teardown is best-effort; a failed destroy never escalates.
    if let Some(session_id) = session.as_deref() {
        if let Err(e) = gateway.destroy(session_id) {
            tracer.log(&TraceEvent::now("session_teardown_failed").with_detail(&e));
        }
    }

    if cancelled {
        tracer.log(&TraceEvent::now("run_cancelled"));
        report.status = RunStatus::Cancelled;
        report.fields.clear();
        return Ok(report);
    }

    if report.fields.is_empty() {
        tracer.log(&TraceEvent::now("run_failed").with_detail("no suggestions accepted"));
        return Err(FillError::NoUsableOutput { auth_failed: report.auth_warning });
    }

    if !options.dry_run {
        for field in report.fields.iter().filter(|f| f.included) {
            page.fill(&descriptors[field.index].target(), &field.value)?;
        }
    }

    tracer.log(&TraceEvent::now("run_completed").with_detail(report.fields.len()));
    report.descriptors = descriptors;
    Ok(report)
}

/// Resolve, validate, and claim one raw suggestion.
fn accept_suggestion(
    raw: &RawSuggestion,
    descriptors: &[FieldDescriptor],
    table: &ResolutionTable,
    policy: &DefaultPolicy,
    claimed: &mut HashSet<usize>,
    accepted: &mut Vec<IdentifiedField>,
    tracer: &TraceLogger,
) {
    let Some(index) = table.resolve(raw) else {
        tracer.log(&TraceEvent::now("suggestion_dropped").with_detail("unresolved"));
        return;
    };

    // File inputs are never fillable, even when a suggestion names one.
    if descriptors[index].kind == FieldKind::File {
        tracer.log(
            &TraceEvent::now("suggestion_dropped")
                .with_field(index, &descriptors[index].key)
                .with_detail("file fields are not fillable"),
        );
        return;
    }

    // At most one accepted suggestion per field.
    if claimed.contains(&index) {
        tracer.log(
            &TraceEvent::now("suggestion_dropped")
                .with_field(index, &descriptors[index].key)
                .with_detail("field already claimed"),
        );
        return;
    }

    let Some(value) = raw.value.as_deref() else {
        tracer.log(
            &TraceEvent::now("suggestion_dropped")
                .with_field(index, &descriptors[index].key)
                .with_detail("no value"),
        );
        return;
    };

    let Some(validated) = validate_value(&descriptors[index], value, policy) else {
        tracer.log(
            &TraceEvent::now("suggestion_dropped")
                .with_field(index, &descriptors[index].key)
                .with_detail("value failed validation"),
        );
        return;
    };

    let confidence = clamp_confidence(raw.confidence);
    tracer.log(
        &TraceEvent::now("suggestion_accepted")
            .with_field(index, &descriptors[index].key)
            .with_value(&validated)
            .with_confidence(confidence),
    );

    claimed.insert(index);
    accepted.push(IdentifiedField {
        index,
        key: descriptors[index].key.clone(),
        value: validated,
        confidence,
        included: true,
        reason: raw.reason.clone().unwrap_or_default(),
    });
}

/// Synthesize low-confidence defaults for known-required roles the model
/// said nothing about.
fn backfill_defaults(
    descriptors: &[FieldDescriptor],
    policy: &DefaultPolicy,
    claimed: &mut HashSet<usize>,
    accepted: &mut Vec<IdentifiedField>,
    tracer: &TraceLogger,
) {
    for descriptor in descriptors {
        if claimed.contains(&descriptor.index) || descriptor.kind == FieldKind::File {
            continue;
        }
        let Some(rule) = policy.rule_for(descriptor) else {
            continue;
        };
        let Some(value) = policy.default_value(rule, descriptor) else {
            continue;
        };

        tracer.log(
            &TraceEvent::now("default_backfilled")
                .with_field(descriptor.index, &descriptor.key)
                .with_value(&value),
        );
        claimed.insert(descriptor.index);
        accepted.push(IdentifiedField {
            index: descriptor.index,
            key: descriptor.key.clone(),
            value,
            confidence: BACKFILL_CONFIDENCE,
            included: true,
            reason: format!("default for {}", rule.role),
        });
    }
}

// ============================================================================
// Post-run toggling
// ============================================================================

/// Toggle one accepted field on or off, mirroring the change to the page:
/// off clears the control, on re-fills it.
pub fn set_included(
    report: &mut FillReport,
    index: usize,
    included: bool,
    page: &mut dyn PageAdapter,
) -> Result<(), FillError> {
    let Some(field) = report.fields.iter_mut().find(|f| f.index == index) else {
        return Ok(());
    };
    if field.included == included {
        return Ok(());
    }
    field.included = included;
    let value = field.value.clone();

    let target = report.descriptors[index].target();
    if included {
        page.fill(&target, &value)
    } else {
        page.clear(&target)
    }
}

/// Clear every filled control and discard the run's accepted state.
pub fn clear_all(report: &mut FillReport, page: &mut dyn PageAdapter) -> Result<(), FillError> {
    for field in report.fields.iter().filter(|f| f.included) {
        page.clear(&report.descriptors[field.index].target())?;
    }
    report.fields.clear();
    Ok(())
}
