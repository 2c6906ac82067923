use rand::Rng;
use std::time::Duration;

/// 兩次搜尋請求之間的隨機等待區間（秒）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RequestInterval {
    min_secs: f64,
    max_secs: f64,
}

impl RequestInterval {
    /// 上下界顛倒時自動交換，負值視為 0
    pub fn new(min_secs: f64, max_secs: f64) -> Self {
        let (a, b) = (min_secs.max(0.0), max_secs.max(0.0));
        if a <= b {
            Self { min_secs: a, max_secs: b }
        } else {
            Self { min_secs: b, max_secs: a }
        }
    }

    pub fn none() -> Self {
        Self::new(0.0, 0.0)
    }

    pub fn sample(&self) -> Duration {
        if self.max_secs <= 0.0 {
            return Duration::ZERO;
        }
        let secs = rand::thread_rng().gen_range(self.min_secs..=self.max_secs);
        Duration::from_secs_f64(secs)
    }

    pub async fn wait(&self) {
        let delay = self.sample();
        if delay.is_zero() {
            return;
        }
        tracing::debug!("⏳ Waiting {:.2}s before next request", delay.as_secs_f64());
        tokio::time::sleep(delay).await;
    }
}

impl Default for RequestInterval {
    fn default() -> Self {
        Self::new(1.0, 3.0)
    }
}
