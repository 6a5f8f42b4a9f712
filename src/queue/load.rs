//! System load sampling for the adaptive quota policy.

use std::sync::OnceLock;

use parking_lot::Mutex;
use sysinfo::System;

static SYSTEM: OnceLock<Mutex<System>> = OnceLock::new();

fn system() -> &'static Mutex<System> {
    SYSTEM.get_or_init(|| Mutex::new(System::new()))
}

/// Current load rate in `[0, 1]`: the average of normalized global CPU usage
/// and used/total memory.
pub fn load_rate() -> f64 {
    let mut sys = system().lock();
    sys.refresh_cpu_usage();
    sys.refresh_memory();

    let cpu = (sys.global_cpu_usage() as f64 / 100.0).clamp(0.0, 1.0);
    let total = sys.total_memory();
    let memory = if total == 0 {
        0.0
    } else {
        (sys.used_memory() as f64 / total as f64).clamp(0.0, 1.0)
    };

    ((cpu + memory) / 2.0).clamp(0.0, 1.0)
}
