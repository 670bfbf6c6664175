//! Implementation of the `devhost check` command.

use crate::cli::{CheckArgs, GlobalArgs};
use crate::config::ConfigModel;
use crate::context::ProjectContext;
use crate::error::{DevhostError, Result};
use crate::probe::SystemProbe;
use crate::validate::{ValidationError, validate};
use serde_json::json;

/// Execute the `devhost check` command.
///
/// Exits non-zero when the config has problems. With `--json` the report is
/// printed to stdout either way.
pub fn cmd_check(global: &GlobalArgs, args: CheckArgs) -> Result<()> {
    let ctx = ProjectContext::resolve(global.root.as_deref(), global.config.as_deref())?;
    let model = ConfigModel::load(&ctx.config_path)?;
    let errors = validate(&model, &SystemProbe, &ctx.root);

    if args.json {
        let mut report = json!({
            "config": ctx.config_path,
            "valid": errors.is_empty(),
            "errors": errors,
        });
        if args.dump {
            report["model"] = json!(model);
        }
        let text = serde_json::to_string_pretty(&report)
            .map_err(|e| DevhostError::UserError(format!("failed to serialize report: {}", e)))?;
        println!("{}", text);
    } else {
        if args.dump {
            print!("{}", model.to_source());
            println!();
        }
        print_summary(&ctx, &errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(DevhostError::Validation(errors))
    }
}

fn print_summary(ctx: &ProjectContext, errors: &[ValidationError]) {
    if errors.is_empty() {
        println!("{} is valid.", ctx.config_path.display());
    } else {
        println!(
            "{}: {} problem(s) found.",
            ctx.config_path.display(),
            errors.len()
        );
    }
}
