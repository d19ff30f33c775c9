//! roster checks - List the available consistency checks

use clap::Args;
use console::style;
use serde::Serialize;

use crate::app::AppContext;
use crate::check::{CheckEngine, CheckInfo};
use crate::cli::output::{HumanLayout, emit_human, emit_json};
use crate::config::OutputFormat;
use crate::error::{Result, RosterError};

#[derive(Args, Debug, Default)]
pub struct ChecksArgs {
    /// Show the full description of one check
    #[arg(long, value_name = "ID")]
    pub explain: Option<String>,
}

#[derive(Serialize)]
struct ChecksOutput {
    count: usize,
    checks: Vec<CheckInfo>,
}

pub fn run(ctx: &AppContext, args: &ChecksArgs) -> Result<()> {
    let engine = CheckEngine::with_builtin_checks(ctx.config.check_config());
    let checks = engine.list_checks();

    if let Some(id) = &args.explain {
        let info = find(&checks, id)?;
        return match ctx.output_format {
            OutputFormat::Json => emit_json(info),
            OutputFormat::Human | OutputFormat::Junit => {
                emit_human(explain_layout(info));
                Ok(())
            }
        };
    }

    match ctx.output_format {
        OutputFormat::Json => emit_json(&ChecksOutput {
            count: checks.len(),
            checks,
        }),
        OutputFormat::Human | OutputFormat::Junit => {
            emit_human(list_layout(&checks));
            Ok(())
        }
    }
}

fn find<'a>(checks: &'a [CheckInfo], id: &str) -> Result<&'a CheckInfo> {
    checks
        .iter()
        .find(|info| info.id == id)
        .ok_or_else(|| RosterError::NotFound(format!("check '{id}'")))
}

fn list_layout(checks: &[CheckInfo]) -> HumanLayout {
    let mut layout = HumanLayout::new();
    layout.title("Consistency checks");
    for info in checks {
        let id = if info.enabled {
            style(format!("{:<30}", info.id)).cyan()
        } else {
            style(format!("{:<30}", info.id)).dim()
        };
        let mut line = format!("{id} {:<8} {}", info.default_severity, info.title);
        if !info.enabled {
            line.push_str(" (disabled)");
        }
        layout.push_line(line);
    }
    layout.blank();
    layout.push_line(format!(
        "{} checks. Run `roster checks --explain <ID>` for details.",
        checks.len()
    ));
    layout
}

fn explain_layout(info: &CheckInfo) -> HumanLayout {
    let mut layout = HumanLayout::new();
    layout.title(&info.id);
    layout.kv("Title", &info.title);
    layout.kv("Kind", &info.kind.to_string());
    layout.kv("Severity", &info.default_severity.to_string());
    layout.kv("Enabled", if info.enabled { "yes" } else { "no" });
    layout.blank();
    layout.push_line(info.description.clone());
    layout
}
