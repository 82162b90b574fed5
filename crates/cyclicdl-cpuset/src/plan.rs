//! Resolution of the user's affinity selection into a CPU plan.

use cyclicdl_errors::CpuSetError;

use crate::interval::CpuIntervalSet;
use crate::parse::parse;

/// What the user asked for on the command line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AffinitySelection {
    /// No affinity option given
    #[default]
    Unset,
    /// Affinity option given without a CPU list
    All,
    /// Explicit cpu-list expression
    Cpus(String),
}

/// Where the deadline workers will run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CpuPlan {
    /// Workers run anywhere; no isolation is set up.
    All {
        /// Number of CPUs in the system
        cpu_count: usize,
    },
    /// Workers are confined to `selected`; every other task is moved to
    /// `others`.
    Isolated {
        /// CPUs reserved for the deadline workers
        selected: CpuIntervalSet,
        /// The complement of `selected` over `[0, cpu_count)`
        others: CpuIntervalSet,
        /// Number of CPUs in `selected`
        selected_cpus: usize,
    },
}

impl CpuPlan {
    /// Resolve a selection against the system's CPU count.
    ///
    /// A selection that is empty or covers every CPU degrades to
    /// [`CpuPlan::All`].
    ///
    /// # Errors
    ///
    /// Propagates parse and range errors, and returns
    /// [`CpuSetError::TooManyCpus`] if the selection exceeds `cpu_count`.
    pub fn resolve(selection: &AffinitySelection, cpu_count: usize) -> Result<Self, CpuSetError> {
        let expr = match selection {
            AffinitySelection::Unset | AffinitySelection::All => {
                return Ok(CpuPlan::All { cpu_count });
            }
            AffinitySelection::Cpus(expr) => expr,
        };

        let selected = parse(expr, cpu_count)?;
        let selected_cpus = selected.total_cpus(cpu_count)?;
        if selected_cpus > cpu_count {
            return Err(CpuSetError::TooManyCpus {
                requested: selected_cpus,
                cpu_count,
            });
        }

        if selected.is_empty() || selected_cpus == cpu_count {
            tracing::info!(cpu_count, "Using all CPUs");
            return Ok(CpuPlan::All { cpu_count });
        }

        let others = selected.complement(cpu_count);
        Ok(CpuPlan::Isolated {
            selected,
            others,
            selected_cpus,
        })
    }

    /// Number of CPUs available to the workers.
    #[must_use]
    pub fn available_cpus(&self) -> usize {
        match self {
            CpuPlan::All { cpu_count } => *cpu_count,
            CpuPlan::Isolated { selected_cpus, .. } => *selected_cpus,
        }
    }

    /// True if CPU isolation must be set up for this plan.
    #[must_use]
    pub fn is_isolated(&self) -> bool {
        matches!(self, CpuPlan::Isolated { .. })
    }
}
