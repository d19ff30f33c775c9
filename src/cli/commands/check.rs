//! roster check - Verify that the registry and the team descriptors agree
//!
//! Loads both inputs once, runs every enabled check, renders the report in
//! the selected format and fails when the run is inconsistent.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use clap::Args;
use console::style;
use serde::Serialize;

use crate::app::AppContext;
use crate::check::{
    CheckEngine, CheckReport, CheckResult, CheckStatus, ReportSummary, Severity, Verdict, Violation,
};
use crate::cli::output::{HumanLayout, emit_human, emit_json, escape_xml};
use crate::config::OutputFormat;
use crate::error::{Result, RosterError};
use crate::team::{InputPaths, RegistryBackend, RegistryParserKind, Snapshot};

#[derive(Args, Debug, Default, Clone)]
pub struct CheckArgs {
    /// Registry document (overrides `[paths] registry`)
    #[arg(long, value_name = "PATH")]
    pub registry: Option<PathBuf>,

    /// Descriptor directory (overrides `[paths] descriptors`)
    #[arg(long, value_name = "DIR")]
    pub descriptors: Option<PathBuf>,

    /// Descriptor file extension
    #[arg(long, value_name = "EXT")]
    pub extension: Option<String>,

    /// Treat warnings as errors and fail degraded runs
    #[arg(long)]
    pub strict: bool,

    /// Skip specific checks (comma-separated IDs)
    #[arg(long, value_delimiter = ',', value_name = "IDS")]
    pub skip: Vec<String>,

    /// Only run specific checks (comma-separated IDs)
    #[arg(long, value_delimiter = ',', value_name = "IDS")]
    pub only: Option<Vec<String>>,

    /// Baseline team ids that must be in the registry (comma-separated)
    #[arg(long, value_delimiter = ',', value_name = "IDS")]
    pub baseline: Option<Vec<String>>,

    /// Structured-data parser for the registry
    #[arg(long, value_enum)]
    pub registry_parser: Option<RegistryParserKind>,
}

/// A finished run together with the inputs it looked at.
#[derive(Debug)]
pub struct CheckRun {
    pub paths: InputPaths,
    /// Config file in effect, if any
    pub config_path: Option<PathBuf>,
    pub parser: &'static str,
    pub report: CheckReport,
}

pub fn run(ctx: &AppContext, args: &CheckArgs) -> Result<()> {
    let run = execute(ctx, args)?;

    match ctx.output_format {
        OutputFormat::Human => emit_human(human_report(&run, &ctx.root)),
        OutputFormat::Json => emit_json(&JsonReport::new(&run, &ctx.root))?,
        OutputFormat::Junit => println!("{}", junit_report(&run.report)),
    }

    let report = &run.report;
    match report.verdict() {
        Verdict::Inconsistent if report.error_count() == 0 => Err(RosterError::ValidationFailed(
            "degraded run fails in strict mode".to_string(),
        )),
        Verdict::Inconsistent => Err(RosterError::ValidationFailed(format!(
            "{} error(s) found by {} check(s)",
            report.error_count(),
            report.summary().failed
        ))),
        Verdict::Consistent | Verdict::Degraded => Ok(()),
    }
}

/// Load the inputs and run every check, without rendering anything.
pub fn execute(ctx: &AppContext, args: &CheckArgs) -> Result<CheckRun> {
    let paths = resolve_paths(ctx, args)?;

    let mut config = ctx.config.check_config();
    if args.strict {
        config.strict = true;
    }
    config.disabled_checks.extend(args.skip.iter().cloned());
    if let Some(only) = &args.only {
        config.only_checks = Some(only.iter().cloned().collect());
    }
    if let Some(baseline) = &args.baseline {
        config.required_teams = baseline
            .iter()
            .map(|id| id.trim())
            .filter(|id| !id.is_empty())
            .map(ToString::to_string)
            .collect();
    }

    let engine = CheckEngine::with_builtin_checks(config);
    validate_check_ids(&engine)?;

    let backend = RegistryBackend::detect(args.registry_parser.unwrap_or(ctx.config.registry.parser));
    let snapshot = Snapshot::load(&paths, &backend);
    let mut report = engine.run(&snapshot);
    relativize(&mut report, &ctx.root);

    Ok(CheckRun {
        paths,
        config_path: ctx.config_path.clone(),
        parser: backend.name(),
        report,
    })
}

fn resolve_paths(ctx: &AppContext, args: &CheckArgs) -> Result<InputPaths> {
    let mut paths = ctx.input_paths();
    if args.registry.is_some() || args.descriptors.is_some() {
        let cwd = std::env::current_dir()?;
        if let Some(registry) = &args.registry {
            paths.registry = cwd.join(registry);
        }
        if let Some(descriptors) = &args.descriptors {
            paths.descriptors = cwd.join(descriptors);
        }
    }
    if let Some(extension) = &args.extension {
        let trimmed = extension.trim().trim_start_matches('.');
        if trimmed.is_empty() || trimmed.contains(['/', '\\']) {
            return Err(RosterError::Config(format!(
                "invalid descriptor extension '{extension}'"
            )));
        }
        paths.extension = trimmed.to_string();
    }
    Ok(paths)
}

/// Reject check ids in the configuration that no registered check has.
fn validate_check_ids(engine: &CheckEngine) -> Result<()> {
    let known: Vec<&str> = engine.checks().iter().map(|check| check.id()).collect();
    let config = engine.config();
    let referenced = config
        .disabled_checks
        .iter()
        .chain(config.only_checks.iter().flatten())
        .chain(config.severity_overrides.keys());
    for id in referenced {
        if !known.contains(&id.as_str()) {
            return Err(RosterError::Config(format!(
                "unknown check '{id}' (run `roster checks` to list them)"
            )));
        }
    }
    Ok(())
}

/// Show violation paths relative to the project root.
fn relativize(report: &mut CheckReport, root: &Path) {
    for result in &mut report.results {
        for violation in &mut result.violations {
            if let Some(relative) = violation
                .file
                .as_deref()
                .and_then(|file| file.strip_prefix(root).ok())
                .map(Path::to_path_buf)
            {
                violation.file = Some(relative);
            }
        }
    }
}

fn display_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}

pub fn human_report(run: &CheckRun, root: &Path) -> HumanLayout {
    let report = &run.report;
    let mut layout = HumanLayout::new();

    for result in &report.results {
        let label = match result.status {
            CheckStatus::Pass => style(result.status.label()).green(),
            CheckStatus::Warn => style(result.status.label()).yellow(),
            CheckStatus::Fail => style(result.status.label()).red().bold(),
            CheckStatus::Skipped => style(result.status.label()).dim(),
        };
        let mut line = format!("{label} {:<30} {}", result.id, result.title);
        if let Some(reason) = &result.skip {
            line.push_str(&format!(" ({reason})"));
        }
        layout.push_line(line);

        for violation in &result.violations {
            push_violation(&mut layout, violation);
        }
    }

    let summary = report.summary();
    let verdict = match report.verdict() {
        Verdict::Consistent => style(Verdict::Consistent.as_str()).green().bold(),
        Verdict::Degraded => style(Verdict::Degraded.as_str()).yellow().bold(),
        Verdict::Inconsistent => style(Verdict::Inconsistent.as_str()).red().bold(),
    };

    layout.blank();
    layout.section("Summary");
    layout.kv("Registry", &display_path(&run.paths.registry, root));
    layout.kv("Descriptors", &display_path(&run.paths.descriptors, root));
    layout.kv("Parser", run.parser);
    layout.kv(
        "Config",
        &run
            .config_path
            .as_deref()
            .map_or_else(|| "defaults".to_string(), |path| display_path(path, root)),
    );
    layout.kv(
        "Checks",
        &format!(
            "{} ({} passed, {} warned, {} failed, {} skipped)",
            summary.checks, summary.passed, summary.warned, summary.failed, summary.skipped
        ),
    );
    layout.kv("Errors", &summary.errors.to_string());
    layout.kv("Warnings", &summary.warnings.to_string());
    layout.kv("Verdict", &verdict.to_string());
    layout
}

fn push_violation(layout: &mut HumanLayout, violation: &Violation) {
    let severity = match violation.severity {
        Severity::Error => style("error").red().bold(),
        Severity::Warning => style("warning").yellow(),
        Severity::Info => style("info").blue(),
    };
    let location = violation.location().unwrap_or_default();
    layout.push_line(format!(
        "     {severity} {} {} {}",
        style(violation.kind).dim(),
        violation.message,
        style(location).dim()
    ));
    if let Some(suggestion) = &violation.suggestion {
        layout.push_line(format!("       {} {suggestion}", style("hint:").cyan()));
    }
}

#[derive(Serialize)]
pub struct JsonReport<'a> {
    pub generated_at: DateTime<Utc>,
    pub version: &'static str,
    pub verdict: Verdict,
    pub consistent: bool,
    pub degraded: bool,
    pub strict: bool,
    pub inputs: JsonInputs<'a>,
    pub checks: &'a [CheckResult],
    pub violations: Vec<&'a Violation>,
    pub summary: ReportSummary,
}

#[derive(Serialize)]
pub struct JsonInputs<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<String>,
    pub registry: String,
    pub descriptors: String,
    pub extension: &'a str,
    pub parser: &'static str,
}

impl<'a> JsonReport<'a> {
    #[must_use]
    pub fn new(run: &'a CheckRun, root: &Path) -> Self {
        let report = &run.report;
        Self {
            generated_at: Utc::now(),
            version: env!("CARGO_PKG_VERSION"),
            verdict: report.verdict(),
            consistent: report.passed(),
            degraded: report.degraded(),
            strict: report.strict,
            inputs: JsonInputs {
                config: run.config_path.as_deref().map(|path| display_path(path, root)),
                registry: display_path(&run.paths.registry, root),
                descriptors: display_path(&run.paths.descriptors, root),
                extension: &run.paths.extension,
                parser: run.parser,
            },
            checks: &report.results,
            violations: report.violations().collect(),
            summary: report.summary(),
        }
    }
}

/// One testsuite, one testcase per check.
#[must_use]
pub fn junit_report(report: &CheckReport) -> String {
    let summary = report.summary();
    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str(&format!(
        "<testsuites name=\"roster\" tests=\"{}\" failures=\"{}\" skipped=\"{}\">\n",
        summary.checks, summary.failed, summary.skipped
    ));
    xml.push_str(&format!(
        "  <testsuite name=\"roster\" tests=\"{}\" failures=\"{}\" skipped=\"{}\">\n",
        summary.checks, summary.failed, summary.skipped
    ));

    for result in &report.results {
        xml.push_str(&format!(
            "    <testcase name=\"{}\" classname=\"roster.{}\">\n",
            escape_xml(&result.id),
            result.kind
        ));
        if let Some(reason) = &result.skip {
            xml.push_str(&format!(
                "      <skipped message=\"{}\"/>\n",
                escape_xml(&reason.to_string())
            ));
        }
        let mut output = Vec::new();
        for violation in &result.violations {
            if violation.severity == Severity::Error {
                xml.push_str(&format!(
                    "      <failure message=\"{}\" type=\"{}\">{}</failure>\n",
                    escape_xml(&violation.message),
                    violation.kind,
                    escape_xml(&violation.to_string())
                ));
            } else {
                output.push(escape_xml(&violation.to_string()));
            }
        }
        if !output.is_empty() {
            xml.push_str(&format!(
                "      <system-out>{}</system-out>\n",
                output.join("\n")
            ));
        }
        xml.push_str("    </testcase>\n");
    }

    xml.push_str("  </testsuite>\n");
    xml.push_str("</testsuites>");
    xml
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::test_utils::fixtures::TeamFixture;

    fn context(fixture: &TeamFixture) -> AppContext {
        AppContext::with_config(fixture.root().to_path_buf(), Config::default())
    }

    fn plain(layout: HumanLayout) -> String {
        console::strip_ansi_codes(&layout.build()).to_string()
    }

    #[test]
    fn test_consistent_project() {
        let fixture = TeamFixture::consistent(&["ios", "android", "firebase", "academy"]);
        let ctx = context(&fixture);
        let run = execute(&ctx, &CheckArgs::default()).unwrap();
        assert_eq!(run.report.verdict(), Verdict::Consistent);
        assert_eq!(run.report.violations().count(), 0);
        assert!(super::run(&ctx, &CheckArgs::default()).is_ok());
    }

    #[test]
    fn test_inconsistent_project_fails_with_validation_error() {
        let fixture = TeamFixture::consistent(&["ios"]);
        fixture.write_registry_ids(&["ios", "ghost"]);
        let ctx = context(&fixture);
        let args = CheckArgs {
            baseline: Some(vec!["ios".to_string()]),
            ..CheckArgs::default()
        };

        let run = execute(&ctx, &args).unwrap();
        let violations: Vec<_> = run.report.violations().collect();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].check_id, "registry-descriptor-coverage");
        assert_eq!(violations[0].file.as_deref(), Some(Path::new("teams/registry.json")));

        let err = super::run(&ctx, &args).unwrap_err();
        assert!(matches!(err, RosterError::ValidationFailed(_)));
    }

    #[test]
    fn test_args_override_config() {
        let fixture = TeamFixture::consistent(&["ios"]);
        let ctx = context(&fixture);
        let args = CheckArgs {
            skip: vec!["baseline-teams".to_string()],
            registry_parser: Some(RegistryParserKind::None),
            strict: true,
            ..CheckArgs::default()
        };
        let run = execute(&ctx, &args).unwrap();
        assert_eq!(run.parser, "none");
        assert!(run.report.degraded());
        assert_eq!(run.report.verdict(), Verdict::Inconsistent);

        let err = super::run(&ctx, &args).unwrap_err();
        assert!(err.to_string().contains("strict"));
    }

    #[test]
    fn test_unknown_check_ids_are_rejected() {
        let fixture = TeamFixture::consistent(&["ios"]);
        let ctx = context(&fixture);
        let args = CheckArgs {
            only: Some(vec!["registry-exists".into(), "no-such-check".into()]),
            ..CheckArgs::default()
        };
        let err = execute(&ctx, &args).unwrap_err();
        assert!(err.to_string().contains("no-such-check"));
    }

    #[test]
    fn test_extension_override() {
        let fixture = TeamFixture::new();
        fixture.write_registry_ids(&["ios"]);
        fixture.write_descriptor_file(
            "ios.team",
            &crate::test_utils::fixtures::descriptor_source("ios", "iOS", "Apps", &["lead"]),
        );
        let ctx = context(&fixture);
        let args = CheckArgs {
            extension: Some(".team".to_string()),
            baseline: Some(vec![]),
            ..CheckArgs::default()
        };
        let run = execute(&ctx, &args).unwrap();
        assert_eq!(run.paths.extension, "team");
        assert_eq!(run.report.verdict(), Verdict::Consistent);
    }

    #[test]
    fn test_extension_flag_rejects_paths() {
        let fixture = TeamFixture::consistent(&["ios"]);
        let ctx = context(&fixture);
        for extension in ["../conf", "conf/x", "c\\onf", " . "] {
            let args = CheckArgs {
                extension: Some(extension.to_string()),
                ..CheckArgs::default()
            };
            let err = execute(&ctx, &args).unwrap_err();
            assert!(matches!(err, RosterError::Config(_)), "{extension}");
        }
    }

    #[test]
    fn test_config_path_is_reported() {
        let fixture = TeamFixture::consistent(&["ios", "android", "firebase", "academy"]);
        let mut ctx = context(&fixture);
        let run = execute(&ctx, &CheckArgs::default()).unwrap();
        assert!(plain(human_report(&run, &ctx.root)).contains("defaults"));
        let value = serde_json::to_value(JsonReport::new(&run, &ctx.root)).unwrap();
        assert!(value["inputs"].get("config").is_none());

        ctx.config_path = Some(fixture.write_config(""));
        let run = execute(&ctx, &CheckArgs::default()).unwrap();
        let value = serde_json::to_value(JsonReport::new(&run, &ctx.root)).unwrap();
        assert_eq!(value["inputs"]["config"], "roster.toml");
    }

    #[test]
    fn test_human_report() {
        let fixture = TeamFixture::consistent(&["ios"]);
        fixture.write_descriptor("web", "", "Web apps", &["lead"]);
        let ctx = context(&fixture);
        let args = CheckArgs {
            baseline: Some(vec![]),
            ..CheckArgs::default()
        };
        let run = execute(&ctx, &args).unwrap();
        let text = plain(human_report(&run, &ctx.root));

        assert!(text.contains("PASS registry-exists"));
        assert!(text.contains("FAIL descriptor-required-fields"));
        assert!(text.contains("SchemaError web.conf has no TEAM_NAME"));
        assert!(text.contains("teams/web.conf:3"));
        assert!(text.contains("Verdict"));
        assert!(text.contains("INCONSISTENT"));
    }

    #[test]
    fn test_json_report_shape() {
        let fixture = TeamFixture::consistent(&["ios", "android", "firebase", "academy"]);
        let ctx = context(&fixture);
        let run = execute(&ctx, &CheckArgs::default()).unwrap();
        let value = serde_json::to_value(JsonReport::new(&run, &ctx.root)).unwrap();

        assert_eq!(value["verdict"], "CONSISTENT");
        assert_eq!(value["consistent"], true);
        assert_eq!(value["degraded"], false);
        assert_eq!(value["inputs"]["registry"], "teams/registry.json");
        assert_eq!(value["checks"].as_array().unwrap().len(), 16);
        assert_eq!(value["checks"][0]["status"], "pass");
        assert!(value["violations"].as_array().unwrap().is_empty());
        assert_eq!(value["summary"]["passed"], 16);
    }

    #[test]
    fn test_junit_report() {
        let fixture = TeamFixture::consistent(&["ios"]);
        fixture.write_registry_ids(&["ios", "ghost"]);
        let ctx = context(&fixture);
        let args = CheckArgs {
            baseline: Some(vec!["ios".to_string()]),
            skip: vec!["team-id-format".to_string()],
            ..CheckArgs::default()
        };
        let run = execute(&ctx, &args).unwrap();
        let xml = junit_report(&run.report);

        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("tests=\"16\" failures=\"1\" skipped=\"1\""));
        assert!(xml.contains("<testcase name=\"registry-descriptor-coverage\" classname=\"roster.ReferentialError\">"));
        assert!(xml.contains("<failure message=\"registry team &apos;ghost&apos; has no descriptor file ghost.conf\""));
        assert!(xml.contains("<skipped message=\"disabled by configuration\"/>"));
    }
}
