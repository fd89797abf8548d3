/// Parameters of the randomized search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Random picks allowed in a single attempt before it is abandoned.
    pub max_steps: usize,
    /// Independent attempts per worker before giving up.
    pub attempts: usize,
    /// Optional deterministic base seed. Each worker derives its own seed from it; a worker's
    /// attempts share that worker's random stream.
    pub seed: Option<u64>,
    /// Number of workers racing independent attempts; the first success wins.
    pub workers: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_steps: 1000,
            attempts: 100,
            seed: None,
            workers: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let cfg = GeneratorConfig::default();
        assert!(cfg.max_steps > 0);
        assert!(cfg.attempts > 0);
        assert!(cfg.workers > 0);
        assert_eq!(cfg.seed, None);
    }
}
