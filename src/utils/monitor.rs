#[cfg(feature = "cli")]
use std::sync::Mutex;
#[cfg(feature = "cli")]
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

/// Snapshot taken when a pipeline phase finishes.
#[cfg(feature = "cli")]
#[derive(Debug, Clone)]
pub struct PhaseStats {
    pub phase: String,
    pub records: usize,
    pub cpu_usage: f32,
    pub memory_mb: u64,
    pub phase_time: Duration,
}

#[cfg(feature = "cli")]
impl PhaseStats {
    pub fn records_per_second(&self) -> f64 {
        let secs = self.phase_time.as_secs_f64();
        if secs > 0.0 {
            self.records as f64 / secs
        } else {
            0.0
        }
    }
}

#[cfg(feature = "cli")]
struct MonitorState {
    system: System,
    last_mark: Instant,
    peak_memory_mb: u64,
    phases: Vec<PhaseStats>,
}

/// Process CPU/memory per ETL phase. The distance matrix is the memory hog,
/// so the peak is what matters for large CSVs.
#[cfg(feature = "cli")]
pub struct SystemMonitor {
    state: Mutex<MonitorState>,
    pid: Option<Pid>,
    started: Instant,
    enabled: bool,
}

#[cfg(feature = "cli")]
impl SystemMonitor {
    pub fn new(enabled: bool) -> Self {
        let pid = if enabled {
            sysinfo::get_current_pid()
                .map_err(|e| tracing::warn!("System monitoring unavailable: {}", e))
                .ok()
        } else {
            None
        };

        let now = Instant::now();
        Self {
            state: Mutex::new(MonitorState {
                system: System::new(),
                last_mark: now,
                peak_memory_mb: 0,
                phases: Vec::new(),
            }),
            pid,
            started: now,
            enabled,
        }
    }

    /// Samples the process and logs one line for `phase`.
    pub fn record_phase(&self, phase: &str, records: usize) -> Option<PhaseStats> {
        let pid = self.pid?;
        let mut state = self.state.lock().ok()?;

        state.system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::nothing().with_cpu().with_memory(),
        );
        let (cpu_usage, memory_mb) = state
            .system
            .process(pid)
            .map(|p| (p.cpu_usage(), p.memory() / 1024 / 1024))?;

        state.peak_memory_mb = state.peak_memory_mb.max(memory_mb);
        let stats = PhaseStats {
            phase: phase.to_string(),
            records,
            cpu_usage,
            memory_mb,
            phase_time: state.last_mark.elapsed(),
        };
        state.last_mark = Instant::now();

        tracing::info!(
            "📊 {} - {} records in {:?} ({:.0}/s), CPU: {:.1}%, Memory: {}MB, Peak: {}MB",
            stats.phase,
            stats.records,
            stats.phase_time,
            stats.records_per_second(),
            stats.cpu_usage,
            stats.memory_mb,
            state.peak_memory_mb
        );
        state.phases.push(stats.clone());
        Some(stats)
    }

    pub fn log_summary(&self) {
        let Ok(state) = self.state.lock() else {
            return;
        };
        if state.phases.is_empty() {
            return;
        }

        let slowest = state
            .phases
            .iter()
            .max_by_key(|s| s.phase_time)
            .map(|s| s.phase.as_str())
            .unwrap_or("-");
        tracing::info!(
            "📊 Final Stats - Total Time: {:?}, Peak Memory: {}MB, Slowest phase: {}",
            self.started.elapsed(),
            state.peak_memory_mb,
            slowest
        );
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(feature = "cli")]
impl Default for SystemMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

// 非 CLI 環境的空實現
#[cfg(not(feature = "cli"))]
#[derive(Default)]
pub struct SystemMonitor;

#[cfg(not(feature = "cli"))]
impl SystemMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self
    }

    pub fn record_phase(&self, _phase: &str, _records: usize) {}

    pub fn log_summary(&self) {}

    pub fn is_enabled(&self) -> bool {
        false
    }
}
