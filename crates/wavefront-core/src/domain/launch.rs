use super::{WavefrontError, WavefrontResult};
use std::fmt::{Display, Formatter};

/// Rank/size environment variables exported by common MPI launchers and SLURM.
const LAUNCHER_VARIABLES: [(&str, Option<&str>); 5] = [
    ("OMPI_COMM_WORLD_RANK", Some("OMPI_COMM_WORLD_SIZE")),
    ("PMI_RANK", Some("PMI_SIZE")),
    ("PMIX_RANK", None),
    ("MV2_COMM_WORLD_RANK", Some("MV2_COMM_WORLD_SIZE")),
    ("SLURM_PROCID", Some("SLURM_NTASKS")),
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LaunchError {
    #[error("launcher variable {variable} has non-numeric value '{raw}'")]
    NonNumeric { variable: &'static str, raw: String },
    #[error("process rank {rank} is outside a launch of size {size}")]
    RankOutOfRange { rank: usize, size: usize },
}

impl From<LaunchError> for WavefrontError {
    fn from(error: LaunchError) -> Self {
        WavefrontError::input_validation("INPUT.LAUNCH_RANK", error.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessRole {
    Coordinator,
    Worker,
}

impl ProcessRole {
    pub const fn is_coordinator(self) -> bool {
        matches!(self, Self::Coordinator)
    }
}

impl Display for ProcessRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Coordinator => f.write_str("coordinator"),
            Self::Worker => f.write_str("worker"),
        }
    }
}

/// Position of this process within a (possibly multi-process) launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchContext {
    rank: usize,
    size: usize,
}

impl Default for LaunchContext {
    fn default() -> Self {
        Self::single_process()
    }
}

impl LaunchContext {
    pub const fn single_process() -> Self {
        Self { rank: 0, size: 1 }
    }

    pub fn new(rank: usize, size: usize) -> WavefrontResult<Self> {
        if size == 0 || rank >= size {
            return Err(LaunchError::RankOutOfRange { rank, size }.into());
        }
        Ok(Self { rank, size })
    }

    pub fn from_env() -> WavefrontResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves rank and size from the first launcher variable set that is present.
    pub fn from_lookup<F>(lookup: F) -> WavefrontResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        for (rank_var, size_var) in LAUNCHER_VARIABLES {
            let Some(raw_rank) = lookup(rank_var) else {
                continue;
            };
            let rank = parse_launch_number(rank_var, &raw_rank)?;
            let size = match size_var.and_then(|name| lookup(name).map(|raw| (name, raw))) {
                Some((name, raw)) => parse_launch_number(name, &raw)?,
                None => rank + 1,
            };
            return Self::new(rank, size);
        }
        Ok(Self::single_process())
    }

    pub const fn rank(&self) -> usize {
        self.rank
    }

    pub const fn size(&self) -> usize {
        self.size
    }

    pub const fn role(&self) -> ProcessRole {
        if self.rank == 0 {
            ProcessRole::Coordinator
        } else {
            ProcessRole::Worker
        }
    }

    pub const fn is_distributed(&self) -> bool {
        self.size > 1
    }

    /// Number of macro-electrons this rank handles when `total` is split evenly.
    pub const fn macro_electron_share(&self, total: usize) -> usize {
        let base = total / self.size;
        let remainder = total % self.size;
        if self.rank < remainder { base + 1 } else { base }
    }
}

fn parse_launch_number(variable: &'static str, raw: &str) -> Result<usize, LaunchError> {
    raw.trim()
        .parse::<usize>()
        .map_err(|_| LaunchError::NonNumeric {
            variable,
            raw: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::{LaunchContext, ProcessRole};
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn missing_launcher_variables_mean_single_coordinator() {
        let context = LaunchContext::from_lookup(lookup_from(&[])).expect("context");
        assert_eq!(context, LaunchContext::single_process());
        assert_eq!(context.role(), ProcessRole::Coordinator);
        assert!(!context.is_distributed());
    }

    #[test]
    fn open_mpi_variables_resolve_worker_role() {
        let context = LaunchContext::from_lookup(lookup_from(&[
            ("OMPI_COMM_WORLD_RANK", "3"),
            ("OMPI_COMM_WORLD_SIZE", "5"),
        ]))
        .expect("context");
        assert_eq!(context.rank(), 3);
        assert_eq!(context.size(), 5);
        assert_eq!(context.role(), ProcessRole::Worker);
        assert_eq!(context.role().to_string(), "worker");
    }

    #[test]
    fn invalid_launcher_values_are_rejected() {
        let error = LaunchContext::from_lookup(lookup_from(&[("PMI_RANK", "zero")]))
            .expect_err("non-numeric rank");
        assert_eq!(error.placeholder(), "INPUT.LAUNCH_RANK");

        let error = LaunchContext::from_lookup(lookup_from(&[
            ("SLURM_PROCID", "4"),
            ("SLURM_NTASKS", "4"),
        ]))
        .expect_err("rank outside size");
        assert!(error.message().contains("outside"));
    }

    #[test]
    fn macro_electron_budget_is_split_without_loss() {
        let total = 50_000 + 3;
        let shares: Vec<usize> = (0..4)
            .map(|rank| {
                LaunchContext::new(rank, 4)
                    .expect("context")
                    .macro_electron_share(total)
            })
            .collect();
        assert_eq!(shares, vec![12_501, 12_501, 12_501, 12_500]);
        assert_eq!(shares.iter().sum::<usize>(), total);
    }
}
