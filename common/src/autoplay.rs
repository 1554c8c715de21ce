//! 自動回転（一定間隔でフレームを進める）

pub const DEFAULT_AUTOPLAY_INTERVAL_MS: u64 = 300;

#[derive(Debug, Clone)]
pub struct Autoplay {
    interval_ms: u64,
    running_since: Option<u64>,
}

impl Default for Autoplay {
    fn default() -> Self {
        Self::new(DEFAULT_AUTOPLAY_INTERVAL_MS)
    }
}

impl Autoplay {
    pub fn new(interval_ms: u64) -> Self {
        Self { interval_ms: interval_ms.max(1), running_since: None }
    }

    pub fn start(&mut self, now_ms: u64) {
        if self.running_since.is_none() {
            self.running_since = Some(now_ms);
        }
    }

    pub fn stop(&mut self) {
        self.running_since = None;
    }

    pub fn is_running(&self) -> bool {
        self.running_since.is_some()
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// 前回から経過した間隔の数を返し、基準時刻を進める
    pub fn due_steps(&mut self, now_ms: u64) -> u64 {
        let Some(since) = self.running_since else {
            return 0;
        };
        let steps = now_ms.saturating_sub(since) / self.interval_ms;
        if steps > 0 {
            self.running_since = Some(since + steps * self.interval_ms);
        }
        steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_running_no_steps() {
        let mut autoplay = Autoplay::default();
        assert_eq!(autoplay.due_steps(10_000), 0);
    }

    #[test]
    fn test_steps_accumulate_remainder() {
        let mut autoplay = Autoplay::default();
        autoplay.start(1_000);
        assert_eq!(autoplay.due_steps(1_299), 0);
        assert_eq!(autoplay.due_steps(1_300), 1);
        assert_eq!(autoplay.due_steps(1_950), 2);
        assert_eq!(autoplay.due_steps(2_000), 0);
        autoplay.stop();
        assert!(!autoplay.is_running());
    }

    #[test]
    fn test_start_twice_keeps_origin() {
        let mut autoplay = Autoplay::default();
        autoplay.start(0);
        autoplay.start(250);
        assert_eq!(autoplay.due_steps(300), 1);
    }
}
