use anyhow::Context;
use colored::*;

use crate::commands::PlanArgs;
use crate::terminal::{colors, print};
use deployr_common::config::Config;
use deployr_common::success;
use deployr_core::plan::build_plan;

const KEY_WIDTH: usize = 11;

pub fn plan(args: PlanArgs, cfg: &Config) -> anyhow::Result<()> {
    let request = args.to_request();
    let plan = build_plan(&request).context("cannot build deployment plan")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    print::header("deployment plan", cfg.quiet);
    print::aligned_line("Target OS", request.os.as_str(), KEY_WIDTH);
    print::aligned_line("Method", plan.method.as_str(), KEY_WIDTH);
    print::aligned_line("Package", plan.package_type.as_str(), KEY_WIDTH);
    print::aligned_line("Destination", plan.destination_path.as_str(), KEY_WIDTH);

    print::header("commands", cfg.quiet);
    for (idx, command) in plan.commands().iter().enumerate() {
        print::tree_head(idx + 1, &command.color(colors::COMMAND).to_string());
    }

    success!("Plan has {} command(s)", plan.commands().len());
    Ok(())
}
