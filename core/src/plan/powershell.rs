use super::request::PackageType;
use super::step::{Step, token};

/// Wraps `value` in single quotes, doubling any embedded quote.
pub(crate) fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn wrap(script: &str) -> String {
    format!(
        "powershell -NoProfile -Command \"{}\"",
        script.replace('"', "\\\"")
    )
}

/// Drive letter of an absolute Windows path, `C` otherwise.
fn drive_of(path: &str) -> char {
    let mut chars = path.chars();
    match (chars.next(), chars.next()) {
        (Some(letter), Some(':')) if letter.is_ascii_alphabetic() => letter.to_ascii_uppercase(),
        _ => 'C',
    }
}

pub(crate) fn render(step: &Step) -> String {
    match step {
        Step::FailFast => wrap("$ErrorActionPreference = 'Stop'"),
        Step::CreateDirectory { path } => wrap(&format!(
            "New-Item -ItemType Directory -Force -Path {} | Out-Null",
            quote(path)
        )),
        Step::CheckDiskSpace { path, min_free_mb } => wrap(&format!(
            "$free = (Get-PSDrive -Name '{}').Free / 1MB; if ($free -lt {}) {{ throw '{}' }}",
            drive_of(path),
            min_free_mb,
            token::INSUFFICIENT_DISK
        )),
        Step::CheckArch { expected } => wrap(&format!(
            "$arch = $env:PROCESSOR_ARCHITECTURE.ToLower(); if ($arch -eq 'x86_64') {{ $arch = 'amd64' }}; if ($arch -ne {}) {{ throw '{}' }}",
            quote(expected),
            token::ARCH_MISMATCH
        )),
        Step::Download { url, path, proxy } => {
            let env = proxy
                .as_deref()
                .map(|p| format!("$env:HTTPS_PROXY = {0}; $env:HTTP_PROXY = {0}; ", quote(p)))
                .unwrap_or_default();
            wrap(&format!(
                "{env}Invoke-WebRequest -Uri {} -OutFile {}",
                quote(url),
                quote(path)
            ))
        }
        Step::MarkRunnable { path } => wrap(&format!("Unblock-File -Path {}", quote(path))),
        Step::VerifyChecksum { path, sha256 } => wrap(&format!(
            "$hash = (Get-FileHash -Algorithm SHA256 -Path {}).Hash.ToLower(); if ($hash -ne {}) {{ throw '{}' }}",
            quote(path),
            quote(sha256),
            token::CHECKSUM_MISMATCH
        )),
        Step::Install { package, path } => match package {
            PackageType::Msi => wrap(&format!(
                "Start-Process msiexec -ArgumentList '/i',{},'/qn','/norestart' -Wait",
                quote(path)
            )),
            PackageType::Exe => wrap(&format!(
                "Start-Process -FilePath {} -ArgumentList '/quiet','/norestart' -Wait",
                quote(path)
            )),
            other => wrap(&format!("throw '{}: {other}'", token::UNSUPPORTED_PACKAGE)),
        },
        Step::Run { path, args } => wrap(
            &std::iter::once(format!("& {}", quote(path)))
                .chain(args.iter().map(|arg| quote(arg)))
                .collect::<Vec<_>>()
                .join(" "),
        ),
        Step::Reboot => wrap("Restart-Computer -Force"),
        Step::RemoveFile { path } => wrap(&format!("Remove-Item -Path {} -Force", quote(path))),
        Step::RemoveDirectory { path } => wrap(&format!(
            "Remove-Item -Path {} -Force -ErrorAction SilentlyContinue",
            quote(path)
        )),
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
