// crates/taskdef-cli/src/main.rs
// ============================================================================
// Module: Task Definition CLI Entry Point
// Description: Command dispatcher for task definition validation and lifecycle.
// Purpose: Provide a safe, localized CLI over the config, engine, and registries.
// Dependencies: clap, taskdef-config, taskdef-core, taskdef-store-sqlite, serde.
// ============================================================================

//! ## Overview
//! The `taskdef` CLI validates `taskdef.toml`, plans and applies the declared
//! task definitions against the configured registry, destroys them, and
//! describes registered revisions. The `check` commands run the attribute
//! validators on their own. All user-facing strings are routed through the
//! i18n catalog. Inputs are untrusted and are read with hard size limits.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::fs::OpenOptions;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::ArgGroup;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use serde::Serialize;
use taskdef_cli::i18n::Locale;
use taskdef_cli::i18n::set_locale;
use taskdef_cli::t;
use taskdef_config::AuditConfig;
use taskdef_config::RegistryConfig;
use taskdef_config::RegistryType;
use taskdef_config::TaskdefConfig;
use taskdef_core::AuditSink;
use taskdef_core::ChangePolicy;
use taskdef_core::FamilyName;
use taskdef_core::FieldError;
use taskdef_core::InMemoryTaskDefinitionRegistry;
use taskdef_core::JsonlAuditSink;
use taskdef_core::LifecycleEngine;
use taskdef_core::LifecycleError;
use taskdef_core::NoopAuditSink;
use taskdef_core::Plan;
use taskdef_core::PlanAction;
use taskdef_core::RegisteredTaskDefinition;
use taskdef_core::ResourceName;
use taskdef_core::TaskDefinitionRecord;
use taskdef_core::TaskDefinitionRef;
use taskdef_core::TaskDefinitionRegistry;
use taskdef_core::TaskDefinitionSpec;
use taskdef_core::parse_container_definitions;
use taskdef_core::validate_network_mode;
use taskdef_core::validate_task_network_mode;
use taskdef_core::validation::normalized_container_definitions;
use taskdef_store_sqlite::MAX_SPEC_BYTES;
use taskdef_store_sqlite::SqliteTaskDefinitionRegistry;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum container definitions document size read from disk.
const MAX_CONTAINER_DEFINITIONS_BYTES: usize = MAX_SPEC_BYTES;
/// Environment variable selecting the output language.
const LANG_ENV: &str = "TASKDEF_LANG";
/// Field name reported for standalone container definition checks.
const CONTAINER_DEFINITIONS_FIELD: &str = "container_definitions";
/// Field name reported for standalone network mode checks.
const NETWORK_MODE_FIELD: &str = "network_mode";

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "taskdef", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Preferred output language (overrides `TASKDEF_LANG`).
    #[arg(long, value_enum, value_name = "LANG", global = true)]
    lang: Option<LangArg>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate the config file and every declared task definition.
    Validate(ConfigArgs),
    /// Show the changes apply would make.
    Plan(ResourceCommand),
    /// Register revisions until the registry matches the config.
    Apply(ResourceCommand),
    /// Deregister the active revision of each declared task definition.
    Destroy(ResourceCommand),
    /// Describe a registered revision by family, `family:revision`, or ARN.
    Describe(DescribeCommand),
    /// Run a single attribute validator.
    Check {
        /// Selected check subcommand.
        #[command(subcommand)]
        command: CheckCommand,
    },
}

/// Config file location.
#[derive(Args, Debug, Clone)]
struct ConfigArgs {
    /// Optional config file path (defaults to taskdef.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Arguments shared by `plan`, `apply`, and `destroy`.
#[derive(Args, Debug)]
struct ResourceCommand {
    /// Config location.
    #[command(flatten)]
    config: ConfigArgs,
    /// Limit the command to one `task_definition` by name.
    #[arg(long, value_name = "NAME")]
    name: Option<String>,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

/// Arguments for `describe`.
#[derive(Args, Debug)]
struct DescribeCommand {
    /// Config location.
    #[command(flatten)]
    config: ConfigArgs,
    /// Family, `family:revision`, or task definition ARN.
    #[arg(value_name = "REFERENCE")]
    reference: String,
    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,
}

/// Attribute validator subcommands.
#[derive(Subcommand, Debug)]
enum CheckCommand {
    /// Validate a network mode value.
    NetworkMode(NetworkModeCheckCommand),
    /// Validate a container definitions JSON document.
    ContainerDefinitions(ContainerDefinitionsCheckCommand),
}

/// Arguments for `check network-mode`.
#[derive(Args, Debug)]
struct NetworkModeCheckCommand {
    /// Value to validate.
    #[arg(value_name = "VALUE")]
    value: String,
    /// Use the container-level set (`bridge`, `host`, `none`); rejects `awsvpc`.
    #[arg(long, action = ArgAction::SetTrue)]
    container: bool,
}

/// Arguments for `check container-definitions`.
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("input").required(true).args(["file", "json"])))]
struct ContainerDefinitionsCheckCommand {
    /// Path to a JSON file holding the container definitions array.
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,
    /// Inline container definitions JSON.
    #[arg(long, value_name = "JSON")]
    json: Option<String>,
    /// Print the normalized document instead of a summary.
    #[arg(long, action = ArgAction::SetTrue)]
    normalize: bool,
}

/// Output formats for structured CLI commands.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Canonical JSON output.
    Json,
    /// Human-readable text output.
    Text,
}

/// Supported CLI language selections.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum LangArg {
    /// English.
    En,
    /// Catalan.
    Ca,
}

impl From<LangArg> for Locale {
    fn from(value: LangArg) -> Self {
        match value {
            LangArg::En => Self::En,
            LangArg::Ca => Self::Ca,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for localized error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a localized message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

/// Bounded read failures.
#[derive(Debug)]
enum ReadLimitError {
    /// Underlying I/O failure.
    Io(std::io::Error),
    /// File exceeds the allowed size.
    TooLarge {
        /// Observed size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let env_lang = std::env::var(LANG_ENV).ok();
    let locale = resolve_locale(cli.lang, env_lang.as_deref())?;
    set_locale(locale);
    if locale != Locale::En {
        write_stderr_line(&t!("i18n.disclaimer.machine_translated"))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    }

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Validate(command) => command_validate(&command),
        Commands::Plan(command) => command_plan(&command),
        Commands::Apply(command) => command_converge(&command, Mode::Apply),
        Commands::Destroy(command) => command_converge(&command, Mode::Destroy),
        Commands::Describe(command) => command_describe(&command),
        Commands::Check {
            command,
        } => command_check(command),
    }
}

/// Emits the top-level help message for the CLI.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

// ============================================================================
// SECTION: Validate Command
// ============================================================================

/// Executes `validate`.
fn command_validate(command: &ConfigArgs) -> CliResult<ExitCode> {
    let config = match TaskdefConfig::load(command.config.as_deref()) {
        Ok(config) => config,
        Err(err) if !err.field_errors().is_empty() => {
            report_field_errors(err.field_errors())?;
            return Ok(ExitCode::FAILURE);
        }
        Err(err) => return Err(CliError::new(t!("config.load_failed", error = err))),
    };
    write_stdout_line(&t!("config.validate.ok", count = config.task_definitions.len()))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Lifecycle Commands
// ============================================================================

/// Engine over the configured registry and audit sink.
type Engine = LifecycleEngine<Box<dyn TaskDefinitionRegistry>, Box<dyn AuditSink>>;

/// Direction of a converge run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Register the declared specs.
    Apply,
    /// Deregister the declared families.
    Destroy,
}

/// Output for `plan`.
#[derive(Serialize)]
struct PlanOutput {
    /// One plan per selected resource.
    plans: Vec<ResourcePlan>,
}

/// Plan for one declared resource.
#[derive(Serialize)]
struct ResourcePlan {
    /// Resource name from the config.
    name: ResourceName,
    /// Computed plan.
    plan: Plan,
}

/// Output for `apply` and `destroy`.
#[derive(Serialize)]
struct ConvergeOutput {
    /// One result per resource processed.
    results: Vec<ConvergeResult>,
}

/// Result of applying one resource's plan.
#[derive(Serialize)]
struct ConvergeResult {
    /// Resource name from the config.
    name: ResourceName,
    /// Family the plan applied to.
    family: FamilyName,
    /// Action performed.
    action: PlanAction,
    /// Active revision after the action, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    current: Option<RegisteredTaskDefinition>,
}

/// Executes `plan`.
fn command_plan(command: &ResourceCommand) -> CliResult<ExitCode> {
    let config = load_config(&command.config)?;
    let specs = selected_specs(&config, command.name.as_deref())?;
    let engine = open_engine(&config)?;
    let mut plans = Vec::with_capacity(specs.len());
    for (name, spec) in specs {
        let plan = engine
            .refresh(&spec.family)
            .and_then(|current| engine.plan(&spec, &current))
            .map_err(|err| CliError::new(t!("plan.failed", name = name, error = err)))?;
        plans.push(ResourcePlan {
            name,
            plan,
        });
    }
    let output = PlanOutput {
        plans,
    };
    let text = render_plan_text(&output);
    emit_output(&output, command.format, &text)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `apply` or `destroy`.
///
/// Resources are processed in declaration order; the first failure stops the
/// run after reporting the resources already converged.
fn command_converge(command: &ResourceCommand, mode: Mode) -> CliResult<ExitCode> {
    let config = load_config(&command.config)?;
    let specs = selected_specs(&config, command.name.as_deref())?;
    let engine = open_engine(&config)?;
    let mut results = Vec::with_capacity(specs.len());
    let mut failure = None;
    for (name, spec) in specs {
        match converge(&engine, &spec, mode) {
            Ok((action, current)) => results.push(ConvergeResult {
                name,
                family: spec.family,
                action,
                current,
            }),
            Err(err) => {
                let message = match mode {
                    Mode::Apply => t!("apply.failed", name = name, error = err),
                    Mode::Destroy => t!("destroy.failed", name = name, error = err),
                };
                failure = Some(CliError::new(message));
                break;
            }
        }
    }
    let output = ConvergeOutput {
        results,
    };
    let text = render_converge_text(&output);
    emit_output(&output, command.format, &text)?;
    failure.map_or(Ok(ExitCode::SUCCESS), Err)
}

/// Refreshes, plans, and applies one spec.
fn converge(
    engine: &Engine,
    spec: &TaskDefinitionSpec,
    mode: Mode,
) -> Result<(PlanAction, Option<RegisteredTaskDefinition>), LifecycleError> {
    let current = engine.refresh(&spec.family)?;
    let plan = match mode {
        Mode::Apply => engine.plan(spec, &current)?,
        Mode::Destroy => engine.plan_destroy(&spec.family, &current)?,
    };
    let next = engine.apply(&plan, &current)?;
    Ok((plan.action, next.record().map(TaskDefinitionRecord::registered)))
}

// ============================================================================
// SECTION: Describe Command
// ============================================================================

/// Executes `describe`.
fn command_describe(command: &DescribeCommand) -> CliResult<ExitCode> {
    let reference = TaskDefinitionRef::parse(&command.reference)
        .map_err(|err| CliError::new(t!("describe.invalid_reference", error = err)))?;
    let config = load_config(&command.config)?;
    let registry = open_registry(&config.registry)?;
    let record = registry
        .describe(&reference)
        .map_err(|err| CliError::new(t!("describe.failed", error = err)))?;
    let text = render_record_text(&record);
    emit_output(&record, command.format, &text)?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Check Commands
// ============================================================================

/// Dispatches check subcommands.
fn command_check(command: CheckCommand) -> CliResult<ExitCode> {
    match command {
        CheckCommand::NetworkMode(command) => command_check_network_mode(&command),
        CheckCommand::ContainerDefinitions(command) => command_check_container_definitions(&command),
    }
}

/// Executes `check network-mode`.
fn command_check_network_mode(command: &NetworkModeCheckCommand) -> CliResult<ExitCode> {
    let errors = if command.container {
        validate_network_mode(&command.value, NETWORK_MODE_FIELD)
    } else {
        validate_task_network_mode(&command.value, NETWORK_MODE_FIELD)
    };
    if !errors.is_empty() {
        report_field_errors(&errors)?;
        return Ok(ExitCode::FAILURE);
    }
    write_stdout_line(&t!("check.network_mode.ok", value = command.value))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `check container-definitions`.
fn command_check_container_definitions(
    command: &ContainerDefinitionsCheckCommand,
) -> CliResult<ExitCode> {
    let text = match (&command.file, &command.json) {
        (Some(path), _) => read_container_definitions(path)?,
        (None, Some(json)) => json.clone(),
        (None, None) => String::new(),
    };
    let definitions = match parse_container_definitions(&text, CONTAINER_DEFINITIONS_FIELD) {
        Ok(definitions) => definitions,
        Err(errors) => {
            report_field_errors(&errors)?;
            return Ok(ExitCode::FAILURE);
        }
    };
    let line = if command.normalize {
        normalized_container_definitions(&definitions)
            .map_err(|err| CliError::new(t!("output.serialize_failed", error = err)))?
    } else {
        t!("check.container_definitions.ok", count = definitions.len())
    };
    write_stdout_line(&line).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Reads a container definitions file as UTF-8 text.
fn read_container_definitions(path: &Path) -> CliResult<String> {
    let kind = t!("input.kind.container_definitions");
    let bytes = read_bytes_with_limit(path, MAX_CONTAINER_DEFINITIONS_BYTES).map_err(|err| {
        let message = match err {
            ReadLimitError::Io(error) => {
                t!("input.read_failed", kind = kind, path = path.display(), error = error)
            }
            ReadLimitError::TooLarge {
                size,
                limit,
            } => t!(
                "input.read_too_large",
                kind = kind,
                path = path.display(),
                size = size,
                limit = limit
            ),
        };
        CliError::new(message)
    })?;
    String::from_utf8(bytes).map_err(|err| {
        CliError::new(t!("input.read_failed", kind = kind, path = path.display(), error = err))
    })
}

// ============================================================================
// SECTION: Wiring
// ============================================================================

/// Loads and validates the config file.
fn load_config(args: &ConfigArgs) -> CliResult<TaskdefConfig> {
    TaskdefConfig::load(args.config.as_deref())
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))
}

/// Returns the declared specs, optionally narrowed to one resource name.
fn selected_specs(
    config: &TaskdefConfig,
    name: Option<&str>,
) -> CliResult<Vec<(ResourceName, TaskDefinitionSpec)>> {
    let specs =
        config.specs().map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    let Some(name) = name else {
        return Ok(specs);
    };
    let selected: Vec<_> =
        specs.into_iter().filter(|(resource, _)| resource.as_str() == name).collect();
    if selected.is_empty() {
        return Err(CliError::new(t!("config.resource.not_found", name = name)));
    }
    Ok(selected)
}

/// Builds the lifecycle engine for `config`.
fn open_engine(config: &TaskdefConfig) -> CliResult<Engine> {
    let registry = open_registry(&config.registry)?;
    let audit = open_audit_sink(&config.audit)?;
    Ok(LifecycleEngine::new(registry, audit))
}

/// Opens the configured registry backend.
fn open_registry(config: &RegistryConfig) -> CliResult<Box<dyn TaskDefinitionRegistry>> {
    match config.registry_type {
        RegistryType::Memory => Ok(Box::new(InMemoryTaskDefinitionRegistry::with_identity(
            config.region.clone(),
            config.account_id.clone(),
        ))),
        RegistryType::Sqlite => {
            let sqlite = config
                .sqlite_config()
                .map_err(|err| CliError::new(t!("registry.open_failed", error = err)))?;
            let registry = SqliteTaskDefinitionRegistry::open(sqlite)
                .map_err(|err| CliError::new(t!("registry.open_failed", error = err)))?;
            Ok(Box::new(registry))
        }
    }
}

/// Opens the configured audit sink: a JSONL file, stderr, or nothing.
fn open_audit_sink(config: &AuditConfig) -> CliResult<Box<dyn AuditSink>> {
    if !config.enabled {
        return Ok(Box::new(NoopAuditSink));
    }
    let Some(path) = config.path.as_deref() else {
        return Ok(Box::new(JsonlAuditSink::new(std::io::stderr())));
    };
    let file = OpenOptions::new().create(true).append(true).open(path).map_err(|err| {
        CliError::new(t!("audit.open_failed", path = path.display(), error = err))
    })?;
    Ok(Box::new(JsonlAuditSink::new(file)))
}

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Renders plans as text.
fn render_plan_text(output: &PlanOutput) -> String {
    let mut lines = Vec::new();
    for entry in &output.plans {
        let plan = &entry.plan;
        lines.push(t!(
            "plan.summary",
            name = entry.name,
            family = plan.family,
            action = plan.action
        ));
        if let Some(prior) = &plan.prior {
            lines.push(t!("plan.current", arn = prior.arn));
        }
        for change in &plan.changes {
            lines.push(t!(
                "plan.change",
                attribute = change.attribute,
                policy = policy_label(change.policy)
            ));
        }
    }
    join_lines(&lines)
}

/// Renders converge results as text.
fn render_converge_text(output: &ConvergeOutput) -> String {
    let lines: Vec<String> = output
        .results
        .iter()
        .map(|result| match &result.current {
            Some(current) => t!(
                "apply.result.active",
                name = result.name,
                family = result.family,
                action = result.action,
                arn = current.arn
            ),
            None => t!(
                "apply.result.absent",
                name = result.name,
                family = result.family,
                action = result.action
            ),
        })
        .collect();
    join_lines(&lines)
}

/// Renders a described revision as text.
fn render_record_text(record: &TaskDefinitionRecord) -> String {
    let containers: Vec<&str> =
        record.spec.container_definitions.iter().map(|container| container.name.as_str()).collect();
    let compatibilities: Vec<&str> =
        record.compatibilities.iter().map(|launch_type| launch_type.as_str()).collect();
    let lines = [
        t!("describe.text.arn", arn = record.arn),
        t!("describe.text.status", status = record.status),
        t!("describe.text.network_mode", network_mode = record.spec.network_mode),
        t!("describe.text.containers", containers = containers.join(", ")),
        t!("describe.text.compatibilities", compatibilities = compatibilities.join(", ")),
        t!("describe.text.spec_hash", digest = record.spec_hash),
    ];
    join_lines(&lines)
}

/// Returns the localized label of a change policy.
fn policy_label(policy: ChangePolicy) -> String {
    match policy {
        ChangePolicy::MutableInPlace => t!("plan.policy.in_place"),
        ChangePolicy::ForcesReplace => t!("plan.policy.replace"),
    }
}

/// Joins lines with a trailing newline.
fn join_lines(lines: &[String]) -> String {
    let mut text = String::new();
    for line in lines {
        text.push_str(line);
        text.push('\n');
    }
    text
}

// ============================================================================
// SECTION: Input Helpers
// ============================================================================

/// Resolves the CLI locale from flags or environment.
fn resolve_locale(lang: Option<LangArg>, env_lang: Option<&str>) -> CliResult<Locale> {
    if let Some(lang) = lang {
        return Ok(lang.into());
    }
    if let Some(value) = env_lang {
        return Locale::parse(value).ok_or_else(|| {
            CliError::new(t!("i18n.lang.invalid_env", env = LANG_ENV, value = value))
        });
    }
    Ok(Locale::En)
}

/// Reads a file from disk while enforcing a hard size limit.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path).map_err(ReadLimitError::Io)?;
    let metadata = file.metadata().map_err(ReadLimitError::Io)?;
    let size = metadata.len();
    let limit = u64::try_from(max_bytes).map_err(|_| ReadLimitError::TooLarge {
        size,
        limit: max_bytes,
    })?;
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }

    let mut limited = file.take(limit.saturating_add(1));
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        let actual = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
        return Err(ReadLimitError::TooLarge {
            size: actual,
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes `value` as canonical JSON or `text`, per `format`.
fn emit_output<T: Serialize>(value: &T, format: OutputFormat, text: &str) -> CliResult<()> {
    let bytes = match format {
        OutputFormat::Json => {
            let mut bytes = canonical_output_bytes(value)?;
            bytes.push(b'\n');
            bytes
        }
        OutputFormat::Text => text.as_bytes().to_vec(),
    };
    write_stdout_bytes(&bytes).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Computes canonical JSON bytes for output rendering.
fn canonical_output_bytes<T: Serialize>(value: &T) -> CliResult<Vec<u8>> {
    serde_jcs::to_vec(value)
        .map_err(|err| CliError::new(t!("output.serialize_failed", error = err)))
}

/// Writes field errors to stderr under a localized header.
fn report_field_errors(errors: &[FieldError]) -> CliResult<()> {
    write_stderr_line(&t!("check.failed", count = errors.len()))
        .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    for error in errors {
        write_stderr_line(&t!("check.error_line", error = error))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    }
    Ok(())
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes raw bytes to stdout without adding a newline.
fn write_stdout_bytes(bytes: &[u8]) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(bytes)
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats a localized output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
