use crate::terminal::print;
use deployr_common::config::Config;
use deployr_common::error::ErrorCode;

pub fn explain(code: ErrorCode, cfg: &Config) {
    print::header(code.as_str(), cfg.quiet);
    for (idx, step) in code.remediation_steps().iter().enumerate() {
        print::print_status(format!("{}) {step}", idx + 1));
    }
}
