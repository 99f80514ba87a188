use deployr_common::os::TargetOs;

use super::request::PackageType;
use super::step::{Step, token};

/// Wraps `value` in double quotes, escaping what the shell would expand.
pub(crate) fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if matches!(c, '\\' | '"' | '$' | '`') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

pub(crate) fn render(step: &Step, os: TargetOs) -> String {
    match step {
        Step::FailFast => "set -e".to_string(),
        Step::CreateDirectory { path } => format!("mkdir -p {}", quote(path)),
        // Measures the nearest existing ancestor. No numeric reading fails the check.
        Step::CheckDiskSpace { path, min_free_mb } => format!(
            "d={}; while [ ! -d \"$d\" ]; do d=$(dirname \"$d\"); done; avail=$(df -Pm \"$d\" | awk 'NR==2 {{print $4}}'); if ! [ \"$avail\" -ge {} ] 2>/dev/null; then echo \"{}\"; exit 1; fi",
            quote(path),
            min_free_mb,
            token::INSUFFICIENT_DISK
        ),
        Step::CheckArch { expected } => format!(
            "arch=$(uname -m | tr '[:upper:]' '[:lower:]'); if [ \"$arch\" = \"x86_64\" ]; then arch=amd64; fi; if [ \"$arch\" != {} ]; then echo \"{}\"; exit 1; fi",
            quote(expected),
            token::ARCH_MISMATCH
        ),
        Step::Download { url, path, proxy } => {
            let env = proxy
                .as_deref()
                .map(|p| format!("HTTPS_PROXY={0} HTTP_PROXY={0} ", quote(p)))
                .unwrap_or_default();
            format!("{env}curl -fsSL {} -o {}", quote(url), quote(path))
        }
        Step::MarkRunnable { path } => format!("chmod +x {}", quote(path)),
        Step::VerifyChecksum { path, sha256 } => {
            let tool = match os {
                TargetOs::MacOs => "shasum -a 256 -c -",
                _ => "sha256sum -c -",
            };
            format!("echo {} | {tool}", quote(&format!("{sha256}  {path}")))
        }
        Step::Install { package, path } => match package {
            PackageType::Deb => format!("sudo dpkg -i {}", quote(path)),
            PackageType::Rpm => format!("sudo rpm -Uvh {}", quote(path)),
            PackageType::Pkg => format!("sudo installer -pkg {} -target /", quote(path)),
            other => format!(
                "echo \"{}: {other}\"; exit 1",
                token::UNSUPPORTED_PACKAGE
            ),
        },
        Step::Run { path, args } => run_line(path, args),
        Step::Reboot => "sudo reboot".to_string(),
        Step::RemoveFile { path } => format!("rm -f {}", quote(path)),
        Step::RemoveDirectory { path } => format!("rmdir {} 2>/dev/null || true", quote(path)),
    }
}

/// The payload followed by each argument, all individually quoted.
pub(crate) fn run_line(path: &str, args: &[String]) -> String {
    std::iter::once(path)
        .chain(args.iter().map(String::as_str))
        .map(quote)
        .collect::<Vec<_>>()
        .join(" ")
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_escapes_expansions() {
        assert_eq!(quote("/tmp/a b"), "\"/tmp/a b\"");
        assert_eq!(quote("$(rm -rf /)"), "\"\\$(rm -rf /)\"");
        assert_eq!(quote("a\"b`c\\"), "\"a\\\"b\\`c\\\\\"");
    }

    #[test]
    fn checksum_tool_follows_os() {
        let step = Step::VerifyChecksum {
            path: "/tmp/x/a".into(),
            sha256: "ab".into(),
        };
        assert_eq!(
            render(&step, TargetOs::Linux),
            "echo \"ab  /tmp/x/a\" | sha256sum -c -"
        );
        assert_eq!(
            render(&step, TargetOs::MacOs),
            "echo \"ab  /tmp/x/a\" | shasum -a 256 -c -"
        );
    }

    #[test]
    fn download_sets_proxy_only_when_given() {
        let mut step = Step::Download {
            url: "https://x/a".into(),
            path: "/tmp/a".into(),
            proxy: None,
        };
        assert_eq!(
            render(&step, TargetOs::Linux),
            "curl -fsSL \"https://x/a\" -o \"/tmp/a\""
        );

        if let Step::Download { proxy, .. } = &mut step {
            *proxy = Some("http://proxy:3128".into());
        }
        assert_eq!(
            render(&step, TargetOs::Linux),
            "HTTPS_PROXY=\"http://proxy:3128\" HTTP_PROXY=\"http://proxy:3128\" curl -fsSL \"https://x/a\" -o \"/tmp/a\""
        );
    }

    #[cfg(unix)]
    fn run_sh(script: &str) -> std::process::Output {
        std::process::Command::new("sh")
            .arg("-c")
            .arg(script)
            .output()
            .unwrap()
    }

    #[cfg(unix)]
    #[test]
    fn disk_check_measures_an_existing_ancestor() {
        let step = Step::CheckDiskSpace {
            path: "/tmp/deployr-missing/a/b".into(),
            min_free_mb: 999_999_999,
        };
        let out = run_sh(&render(&step, TargetOs::Linux));
        assert!(!out.status.success());
        assert!(String::from_utf8_lossy(&out.stdout).contains(token::INSUFFICIENT_DISK));

        let step = Step::CheckDiskSpace {
            path: "/tmp/deployr-missing/a/b".into(),
            min_free_mb: 0,
        };
        assert!(run_sh(&render(&step, TargetOs::Linux)).status.success());
    }

    #[cfg(unix)]
    #[test]
    fn disk_check_fails_closed_without_a_reading() {
        let step = Step::CheckDiskSpace {
            path: "/tmp".into(),
            min_free_mb: 1,
        };
        let script = format!("set -e; df() {{ :; }}; {}", render(&step, TargetOs::Linux));
        let out = run_sh(&script);
        assert!(!out.status.success());
        assert!(String::from_utf8_lossy(&out.stdout).contains(token::INSUFFICIENT_DISK));
    }

    #[test]
    fn run_line_quotes_every_argument() {
        let args = vec!["--token".to_string(), "a b".to_string()];
        assert_eq!(run_line("/tmp/agent", &args), "\"/tmp/agent\" \"--token\" \"a b\"");
    }
}
