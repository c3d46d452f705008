// crates/commerce-kernel/src/infrastructure/retry.rs

use rand::Rng;
use std::time::Duration;

/// Stratégie de replanification des messages en échec : backoff exponentiel
/// plafonné, plus un jitter additif pour désynchroniser les workers face à
/// des échecs corrélés ("Thundering Herd").
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    base: Duration,
    cap: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_secs(1),
            cap: Duration::from_secs(5 * 60),
        }
    }
}

impl RetryPolicy {
    pub fn new(base: Duration, cap: Duration) -> Self {
        Self { base, cap }
    }

    /// Délai avant la prochaine disponibilité : min(base * 2^attempts, cap),
    /// plus un tirage uniforme dans [0, 1s).
    pub fn backoff(&self, attempts: u32) -> Duration {
        // Calcul de l'exponentiel : 2^attempts * base, saturé au plafond
        let factor = 1u64.checked_shl(attempts).unwrap_or(u64::MAX);
        let exp_ms = (self.base.as_millis() as u64)
            .saturating_mul(factor)
            .min(self.cap.as_millis() as u64);

        let jitter_ms = rand::rng().random_range(0..1000);

        Duration::from_millis(exp_ms + jitter_ms)
    }
}
