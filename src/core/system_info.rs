// src/core/system_info.rs

use crate::constants::LABEL_NA;
use crate::core::cache::SingleFlightCache;
use rayon::prelude::*;
use std::convert::Infallible;
use std::fmt;
use std::fs;
use std::io::Read;
use std::process::{Command, Stdio};
use std::str::FromStr;
use std::time::{Duration, Instant};

const MEMINFO_PATH: &str = "/proc/meminfo";
const CPUINFO_PATH: &str = "/proc/cpuinfo";
const OSRELEASE_PATH: &str = "/proc/sys/kernel/osrelease";
const KIB_PER_GIB: f64 = 1_048_576.0;
const LSPCI_TIMEOUT: Duration = Duration::from_secs(5);
const POLL_INTERVAL: Duration = Duration::from_millis(50);
const GPU_CLASSES: [&str; 2] = ["VGA compatible controller", "3D controller"];

/// A machine fact that does not change while the process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemFact {
    /// Installed RAM, e.g. `31.3 GB`.
    MemoryTotal,
    /// The CPU model name.
    CpuModel,
    /// The first display controller reported by `lspci`.
    GpuModel,
    /// The running kernel release.
    KernelVersion,
}

impl SystemFact {
    /// Every known fact, in display order.
    pub const ALL: [Self; 4] = [
        Self::MemoryTotal,
        Self::CpuModel,
        Self::GpuModel,
        Self::KernelVersion,
    ];

    /// The string key used by callers and the CLI.
    pub fn key(self) -> &'static str {
        match self {
            Self::MemoryTotal => "memory_total",
            Self::CpuModel => "cpu_model",
            Self::GpuModel => "gpu_model",
            Self::KernelVersion => "kernel_version",
        }
    }
}

impl fmt::Display for SystemFact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SystemFact {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|fact| fact.key() == s)
            .ok_or_else(|| format!("unknown system fact '{s}'"))
    }
}

/// Source of system facts. Implementations return [`LABEL_NA`] rather than
/// failing.
pub trait FactProbe: Send + Sync {
    /// Reads `fact` from the machine.
    fn probe(&self, fact: SystemFact) -> String;
}

/// Reads facts from procfs and `lspci`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcProbe;

impl FactProbe for ProcProbe {
    fn probe(&self, fact: SystemFact) -> String {
        let value = match fact {
            SystemFact::MemoryTotal => read_proc(MEMINFO_PATH).and_then(|s| parse_meminfo(&s)),
            SystemFact::CpuModel => read_proc(CPUINFO_PATH).and_then(|s| parse_cpuinfo(&s)),
            SystemFact::GpuModel => probe_gpu(),
            SystemFact::KernelVersion => read_proc(OSRELEASE_PATH)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        };
        value.unwrap_or_else(|| {
            log::debug!("System fact '{fact}' is not available");
            LABEL_NA.to_string()
        })
    }
}

/// Process-lifetime cache of system facts. Concurrent requests for the same
/// fact share a single probe.
pub struct SystemInfo {
    cache: SingleFlightCache<String, String>,
    probe: Box<dyn FactProbe>,
}

impl fmt::Debug for SystemInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemInfo")
            .field("cached", &self.cache.len())
            .finish_non_exhaustive()
    }
}

impl Default for SystemInfo {
    fn default() -> Self {
        Self::new(ProcProbe)
    }
}

impl SystemInfo {
    /// Creates an empty cache backed by `probe`.
    pub fn new(probe: impl FactProbe + 'static) -> Self {
        Self {
            cache: SingleFlightCache::new(),
            probe: Box::new(probe),
        }
    }

    /// Returns the value for `key` (`memory_total`, `cpu_model`, `gpu_model`,
    /// `kernel_version`), or [`LABEL_NA`] for an unknown key or unavailable fact.
    pub fn get(&self, key: &str) -> String {
        let result = self.cache.get_or_compute(&key.to_string(), || {
            Ok::<_, Infallible>(match key.parse::<SystemFact>() {
                Ok(fact) => self.probe.probe(fact),
                Err(e) => {
                    log::warn!("{e}");
                    LABEL_NA.to_string()
                }
            })
        });
        match result {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Probes every known fact concurrently and returns them in
    /// [`SystemFact::ALL`] order.
    pub fn snapshot(&self) -> Vec<(SystemFact, String)> {
        SystemFact::ALL
            .par_iter()
            .map(|fact| (*fact, self.get(fact.key())))
            .collect()
    }
}

fn read_proc(path: &str) -> Option<String> {
    fs::read_to_string(path)
        .map_err(|e| log::debug!("Could not read '{path}': {e}"))
        .ok()
}

/// Extracts `MemTotal` from `/proc/meminfo` content as `"<GiB> GB"` with one
/// decimal.
pub fn parse_meminfo(content: &str) -> Option<String> {
    let line = content.lines().find(|l| l.starts_with("MemTotal:"))?;
    let kib: u64 = line.split_whitespace().nth(1)?.parse().ok()?;
    Some(format!("{:.1} GB", kib as f64 / KIB_PER_GIB))
}

/// Extracts the first `model name` from `/proc/cpuinfo` content, without the
/// clock-speed suffix.
pub fn parse_cpuinfo(content: &str) -> Option<String> {
    let line = content
        .lines()
        .find(|l| l.trim().to_lowercase().starts_with("model name"))?;
    let (_, value) = line.split_once(':').unwrap_or((line, ""));
    let model = value.trim().split(" @").next().unwrap_or_default();
    Some(model.to_string())
}

/// Parses `lspci -mm` output. Split on `"`, field 5 is the device name and
/// field 7 the subsystem vendor; both are reported.
pub fn parse_lspci_machine(output: &str) -> Option<String> {
    output
        .lines()
        .filter(|line| GPU_CLASSES.iter().any(|class| line.contains(&format!("\"{class}\""))))
        .find_map(|line| {
            let parts: Vec<&str> = line.split('"').collect();
            match (parts.get(5), parts.get(7)) {
                (Some(device), Some(subsystem)) => {
                    Some(format!("{device} {subsystem}").trim().to_string())
                }
                _ => None,
            }
        })
}

/// Parses plain `lspci` output: everything after the second `:` of the
/// first GPU line.
pub fn parse_lspci_human(output: &str) -> Option<String> {
    output
        .lines()
        .filter(|line| GPU_CLASSES.iter().any(|class| line.contains(class)))
        .find_map(|line| line.splitn(3, ':').nth(2).map(|s| s.trim().to_string()))
}

fn probe_gpu() -> Option<String> {
    run_with_timeout("lspci", &["-mm"], LSPCI_TIMEOUT)
        .and_then(|out| parse_lspci_machine(&out))
        .or_else(|| {
            run_with_timeout("lspci", &[], LSPCI_TIMEOUT).and_then(|out| parse_lspci_human(&out))
        })
}

/// Runs a short-lived command and captures stdout, killing it after
/// `timeout`. Returns `None` if it cannot start, times out, or exits non-zero.
fn run_with_timeout(program: &str, args: &[&str], timeout: Duration) -> Option<String> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| log::debug!("Could not run '{program}': {e}"))
        .ok()?;

    // Drain stdout on a separate thread so a chatty child never blocks on a full pipe.
    let mut stdout = child.stdout.take()?;
    let reader = std::thread::spawn(move || {
        let mut buf = String::new();
        stdout.read_to_string(&mut buf).map(|_| buf)
    });

    let started = Instant::now();
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if started.elapsed() >= timeout => {
                log::warn!("'{program}' timed out after {timeout:?}, killing it");
                if let Err(e) = child.kill() {
                    log::warn!("Failed to kill '{}' (PID {}): {}", program, child.id(), e);
                }
                child.wait().ok();
                return None;
            }
            Ok(None) => std::thread::sleep(POLL_INTERVAL),
            Err(e) => {
                log::debug!("Error waiting for '{program}': {e}");
                return None;
            }
        }
    };

    let output = reader.join().ok()?.ok()?;
    status.success().then_some(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier};
    use std::thread;

    struct CountingProbe {
        calls: Arc<AtomicUsize>,
        delay: Duration,
    }

    impl FactProbe for CountingProbe {
        fn probe(&self, fact: SystemFact) -> String {
            self.calls.fetch_add(1, Ordering::SeqCst);
            thread::sleep(self.delay);
            format!("probed {fact}")
        }
    }

    fn counting(delay: Duration) -> (Arc<AtomicUsize>, SystemInfo) {
        let calls = Arc::new(AtomicUsize::new(0));
        let info = SystemInfo::new(CountingProbe {
            calls: Arc::clone(&calls),
            delay,
        });
        (calls, info)
    }

    #[test]
    fn test_cold_cache_concurrent_callers_probe_once() {
        let (calls, info) = counting(Duration::from_millis(100));
        let info = Arc::new(info);
        let barrier = Arc::new(Barrier::new(2));

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let info = Arc::clone(&info);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    info.get("cpu_model")
                })
            })
            .collect();
        let results: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(results, vec!["probed cpu_model", "probed cpu_model"]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let started = Instant::now();
        assert_eq!(info.get("cpu_model"), "probed cpu_model");
        assert!(started.elapsed() < Duration::from_millis(100));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unknown_key_returns_sentinel_without_probing() {
        let (calls, info) = counting(Duration::ZERO);
        assert_eq!(info.get("battery_level"), LABEL_NA);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_snapshot_probes_each_fact_once() {
        let (calls, info) = counting(Duration::from_millis(10));
        let first = info.snapshot();
        let second = info.snapshot();

        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
        assert_eq!(first[0], (SystemFact::MemoryTotal, "probed memory_total".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_fact_keys_round_trip() {
        for fact in SystemFact::ALL {
            assert_eq!(fact.key().parse::<SystemFact>(), Ok(fact));
        }
        assert!("uptime".parse::<SystemFact>().is_err());
    }

    #[test]
    fn test_parse_meminfo() {
        let content = "MemTotal:       16303740 kB\nMemFree:         1234 kB\n";
        assert_eq!(parse_meminfo(content).as_deref(), Some("15.5 GB"));
        assert_eq!(parse_meminfo("MemTotal: 8388608 kB").as_deref(), Some("8.0 GB"));
        assert_eq!(parse_meminfo("MemFree: 1 kB"), None);
        assert_eq!(parse_meminfo("MemTotal: lots kB"), None);
    }

    #[test]
    fn test_parse_cpuinfo() {
        let content = "processor\t: 0\nmodel name\t: Intel(R) Core(TM) i7-8550U CPU @ 1.80GHz\n";
        assert_eq!(
            parse_cpuinfo(content).as_deref(),
            Some("Intel(R) Core(TM) i7-8550U CPU")
        );
        assert_eq!(
            parse_cpuinfo("Model Name : AMD Ryzen 7 5800X 8-Core Processor").as_deref(),
            Some("AMD Ryzen 7 5800X 8-Core Processor")
        );
        assert_eq!(parse_cpuinfo("processor : 0"), None);
    }

    #[test]
    fn test_parse_lspci_machine() {
        let output = concat!(
            "00:00.0 \"Host bridge\" \"Intel Corporation\" \"Xeon E3-1200\" -r08 \"\" \"\"\n",
            "01:00.0 \"VGA compatible controller\" \"NVIDIA Corporation\" \"GA104 [GeForce RTX 3070]\" -ra1 \"Micro-Star International Co., Ltd. [MSI]\" \"Device 3904\"\n",
        );
        assert_eq!(
            parse_lspci_machine(output).as_deref(),
            Some("GA104 [GeForce RTX 3070] Micro-Star International Co., Ltd. [MSI]")
        );
        let no_subsystem = "00:02.0 \"VGA compatible controller\" \"Intel\" \"UHD 620\" -r07 \"\" \"\"";
        assert_eq!(parse_lspci_machine(no_subsystem).as_deref(), Some("UHD 620"));
        assert_eq!(parse_lspci_machine("00:02.0 \"3D controller\" \"x\""), None);
    }

    #[test]
    fn test_parse_lspci_human() {
        let output = "00:02.0 VGA compatible controller: Intel Corporation UHD Graphics 620 (rev 07)\n";
        assert_eq!(
            parse_lspci_human(output).as_deref(),
            Some("Intel Corporation UHD Graphics 620 (rev 07)")
        );
        assert_eq!(parse_lspci_human("00:1f.3 Audio device: Intel"), None);
    }

    #[test]
    fn test_run_with_timeout_missing_binary() {
        assert_eq!(
            run_with_timeout("definitely-not-a-real-binary-dusky", &[], LSPCI_TIMEOUT),
            None
        );
    }
}
