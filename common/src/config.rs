use std::time::Duration;

/// Ports probed by default: SSH, WinRM over HTTP and WinRM over HTTPS.
pub const DEFAULT_PROBE_PORTS: [u16; 3] = [22, 5985, 5986];

pub const DEFAULT_MAX_CONCURRENCY: usize = 10;
pub const DEFAULT_RATE_PER_SECOND: u32 = 50;
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Output settings for the terminal front end.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub no_banner: bool,
    /// 0 prints everything, 1 drops headers, 2 prints only summaries.
    pub quiet: u8,
}

/// Knobs for one scan call.
///
/// Zero values mean "use the default"; call [`ScannerConfig::normalized`]
/// before using the numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerConfig {
    pub max_concurrency: usize,
    pub rate_per_second: u32,
    pub timeout: Duration,
    pub ports: Vec<u16>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            rate_per_second: DEFAULT_RATE_PER_SECOND,
            timeout: DEFAULT_PROBE_TIMEOUT,
            ports: DEFAULT_PROBE_PORTS.to_vec(),
        }
    }
}

impl ScannerConfig {
    /// Maps an aggressiveness level (clamped to 1..=5) onto pool size and rate.
    pub fn from_aggressiveness(level: u8) -> Self {
        const BASE_CONCURRENCY: usize = 4;
        const BASE_RATE: u32 = 20;
        const BASE_TIMEOUT: Duration = Duration::from_secs(4);

        let level = level.clamp(1, 5);
        Self {
            max_concurrency: BASE_CONCURRENCY * usize::from(level),
            rate_per_second: BASE_RATE * u32::from(level),
            timeout: BASE_TIMEOUT,
            ports: DEFAULT_PROBE_PORTS.to_vec(),
        }
    }

    pub fn with_ports(mut self, ports: Vec<u16>) -> Self {
        self.ports = ports;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replaces every non-positive value with its default.
    pub fn normalized(mut self) -> Self {
        if self.max_concurrency == 0 {
            self.max_concurrency = DEFAULT_MAX_CONCURRENCY;
        }
        if self.rate_per_second == 0 {
            self.rate_per_second = DEFAULT_RATE_PER_SECOND;
        }
        if self.timeout.is_zero() {
            self.timeout = DEFAULT_PROBE_TIMEOUT;
        }
        if self.ports.is_empty() {
            self.ports = DEFAULT_PROBE_PORTS.to_vec();
        }
        self
    }

    /// Interval between two admissions at the configured rate.
    pub fn admission_interval(&self) -> Duration {
        Duration::from_secs(1) / self.rate_per_second.max(1)
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
