//! OS scheduling hints: CPU affinity and SCHED_FIFO priority
//!
//! Both hints are best effort. A failure is returned as a [`SchedError`],
//! logged as a warning and collected in the [`SchedulingReport`]; the
//! benchmark keeps running on the default scheduler.

use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum SchedError {
    #[error("failed to pin process to CPU {cpu}: {source}")]
    Affinity {
        cpu: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to set SCHED_FIFO priority {priority}: {source}")]
    Priority {
        priority: i32,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} is not supported on this platform")]
    Unsupported(&'static str),
}

/// Outcome of [`apply`]
#[derive(Debug, Default)]
pub struct SchedulingReport {
    pub affinity_applied: bool,
    pub priority_applied: bool,
    pub warnings: Vec<SchedError>,
}

impl SchedulingReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Pin the process to `cpu` and, unless `priority` is 0, switch it to SCHED_FIFO
pub fn apply(cpu: usize, priority: i32) -> SchedulingReport {
    let mut report = SchedulingReport::default();

    match set_affinity(cpu) {
        Ok(()) => {
            info!("Pinned to CPU {}", cpu);
            report.affinity_applied = true;
        }
        Err(e) => {
            warn!("{}", e);
            report.warnings.push(e);
        }
    }

    if priority == 0 {
        debug!("Priority 0, keeping the default scheduler");
        return report;
    }

    match set_fifo_priority(priority) {
        Ok(()) => {
            info!("Running with SCHED_FIFO priority {}", priority);
            report.priority_applied = true;
        }
        Err(e) => {
            warn!("{}", e);
            #[cfg(target_os = "linux")]
            {
                if !nix::unistd::Uid::effective().is_root() {
                    warn!("Real-time priority usually requires root or CAP_SYS_NICE");
                }
            }
            report.warnings.push(e);
        }
    }

    report
}

#[cfg(target_os = "linux")]
pub fn set_affinity(cpu: usize) -> Result<(), SchedError> {
    use nix::sched::{sched_setaffinity, CpuSet};
    use nix::unistd::Pid;

    let to_sched_error = |errno: nix::Error| SchedError::Affinity {
        cpu,
        source: std::io::Error::from(errno),
    };

    let mut set = CpuSet::new();
    set.set(cpu).map_err(to_sched_error)?;
    sched_setaffinity(Pid::from_raw(0), &set).map_err(to_sched_error)
}

#[cfg(not(target_os = "linux"))]
pub fn set_affinity(_cpu: usize) -> Result<(), SchedError> {
    Err(SchedError::Unsupported("CPU affinity"))
}

#[cfg(target_os = "linux")]
pub fn set_fifo_priority(priority: i32) -> Result<(), SchedError> {
    // SAFETY: sched_param is plain data; zeroing covers the extra fields some
    // libcs define.
    let mut param: libc::sched_param = unsafe { std::mem::zeroed() };
    param.sched_priority = priority;

    // SAFETY: pid 0 is the calling process and `param` outlives the call.
    let rc = unsafe { libc::sched_setscheduler(0, libc::SCHED_FIFO, &param) };
    if rc != 0 {
        return Err(SchedError::Priority {
            priority,
            source: std::io::Error::last_os_error(),
        });
    }
    Ok(())
}

#[cfg(not(target_os = "linux"))]
pub fn set_fifo_priority(_priority: i32) -> Result<(), SchedError> {
    Err(SchedError::Unsupported("SCHED_FIFO"))
}
