use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::PaymentGateway;

/// Stand-in for the Wave mobile-money checkout. Every checkout it opens is
/// later confirmed; unknown references are not.
pub struct WaveSimulator {
    checkout_delay: Duration,
    confirm_delay: Duration,
    issued: Mutex<HashMap<String, String>>,
}

impl WaveSimulator {
    pub fn new(checkout_delay: Duration, confirm_delay: Duration) -> Self {
        Self {
            checkout_delay,
            confirm_delay,
            issued: Mutex::new(HashMap::new()),
        }
    }
}

fn new_reference() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("WAVE-{}", id[..9].to_uppercase())
}

#[async_trait]
impl PaymentGateway for WaveSimulator {
    async fn create_checkout(&self, amount: i64, request_id: &str) -> anyhow::Result<String> {
        tokio::time::sleep(self.checkout_delay).await;

        let reference = new_reference();
        self.issued
            .lock()
            .map_err(|_| anyhow::anyhow!("wave simulator state poisoned"))?
            .insert(reference.clone(), request_id.to_string());

        tracing::debug!(reference = %reference, amount, request_id = %request_id, "simulated wave checkout");
        Ok(reference)
    }

    async fn confirm(&self, reference: &str) -> anyhow::Result<bool> {
        tokio::time::sleep(self.confirm_delay).await;

        let known = self
            .issued
            .lock()
            .map_err(|_| anyhow::anyhow!("wave simulator state poisoned"))?
            .contains_key(reference);
        Ok(known)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simulator() -> WaveSimulator {
        WaveSimulator::new(Duration::ZERO, Duration::ZERO)
    }

    #[test]
    fn test_reference_format() {
        let reference = new_reference();
        assert!(reference.starts_with("WAVE-"));
        assert_eq!(reference.len(), 14);
        assert!(reference[5..]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[tokio::test]
    async fn test_confirm_issued_reference() {
        let wave = simulator();
        let reference = wave.create_checkout(15000, "r1").await.unwrap();
        assert!(wave.confirm(&reference).await.unwrap());
        // Confirming again is harmless
        assert!(wave.confirm(&reference).await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_reference_not_confirmed() {
        let wave = simulator();
        assert!(!wave.confirm("WAVE-UNKNOWN00").await.unwrap());
    }
}
