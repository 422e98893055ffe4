//! Alert cooldown — Redis-backed per-owner cooldown timers.
//!
//! The interval scan and the event path may both flag the same owner at
//! nearly the same moment; the engine deliberately performs no
//! deduplication, so duplicate liquidation alerts are suppressed here.
//! Suppression affects notification noise only, never the computed
//! amounts or the settlement layer's own at-most-once check.
//!
//! Uses Redis `SET NX EX` for atomic check-and-set with automatic TTL
//! expiry.

use redis::AsyncCommands;
use redis::aio::ConnectionManager;

/// Redis-backed per-owner alert cooldown.
#[derive(Debug, Clone, Copy)]
pub struct AlertCooldown {
    cooldown_secs: u64,
}

impl AlertCooldown {
    pub fn new(cooldown_secs: u64) -> Self {
        Self { cooldown_secs }
    }

    /// Check if an owner is in cooldown, and if not, start the cooldown.
    ///
    /// Returns `true` if the owner is NOT in cooldown (alert should
    /// proceed), `false` if it IS (alert should be suppressed).
    pub async fn check_and_set(
        &self,
        redis: &mut ConnectionManager,
        owner: &str,
    ) -> anyhow::Result<bool> {
        let key = Self::key_for(owner);

        // SET key "1" NX EX cooldown_secs
        // Some("OK") → key was set (not in cooldown); None → already exists
        let result: Option<String> = redis::cmd("SET")
            .arg(&key)
            .arg("1")
            .arg("NX")
            .arg("EX")
            .arg(self.cooldown_secs)
            .query_async(redis)
            .await?;

        let allowed = result.is_some();

        if !allowed {
            tracing::debug!(
                owner,
                cooldown_secs = self.cooldown_secs,
                "Alert suppressed — owner in cooldown"
            );
        }

        Ok(allowed)
    }

    /// Clear the cooldown for an owner (e.g., after a confirmed settlement).
    pub async fn clear(&self, redis: &mut ConnectionManager, owner: &str) -> anyhow::Result<()> {
        redis.del::<_, ()>(&Self::key_for(owner)).await?;
        Ok(())
    }

    fn key_for(owner: &str) -> String {
        format!("risk:alert:cooldown:{owner}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_namespaced_per_owner() {
        assert_eq!(
            AlertCooldown::key_for("owner_a"),
            "risk:alert:cooldown:owner_a"
        );
        assert_ne!(
            AlertCooldown::key_for("owner_a"),
            AlertCooldown::key_for("owner_b")
        );
    }
}
