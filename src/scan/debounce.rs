//! 识别防抖
//!
//! 逐帧识别二维码会时有时无。每次识别成功都会把保持窗口从当前时刻重新计时，
//! 窗口内没有新的识别才回到未识别状态。过期时间只由最后一次识别决定，
//! 旧的计时不会作用到新的状态上。

use std::time::{Duration, Instant};

/// 识别状态保持时长
pub const DETECTION_HOLD: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone)]
pub struct DetectionDebounce {
    window: Duration,
    last_hit: Option<Instant>,
}

impl Default for DetectionDebounce {
    fn default() -> Self {
        Self::new(DETECTION_HOLD)
    }
}

impl DetectionDebounce {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_hit: None,
        }
    }

    /// 记录一次识别，返回这次是否从未识别变为识别（上升沿）
    pub fn hit(&mut self, now: Instant) -> bool {
        let was_active = self.is_active(now);
        self.last_hit = Some(now);
        !was_active
    }

    pub fn is_active(&self, now: Instant) -> bool {
        self.last_hit
            .map(|at| now.saturating_duration_since(at) < self.window)
            .unwrap_or(false)
    }

    pub fn expires_at(&self) -> Option<Instant> {
        self.last_hit.map(|at| at + self.window)
    }

    pub fn clear(&mut self) {
        self.last_hit = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn test_holds_for_window() {
        let t0 = Instant::now();
        let mut debounce = DetectionDebounce::default();

        assert!(!debounce.is_active(t0));
        assert!(debounce.hit(t0));
        assert!(debounce.is_active(t0 + ms(1999)));
        assert!(!debounce.is_active(t0 + ms(2000)));
    }

    #[test]
    fn test_new_hit_resets_window() {
        let t0 = Instant::now();
        let mut debounce = DetectionDebounce::default();

        debounce.hit(t0);
        assert!(!debounce.hit(t0 + ms(1500)));
        assert!(debounce.is_active(t0 + ms(3000)));
        assert!(!debounce.is_active(t0 + ms(3500)));
        assert_eq!(debounce.expires_at(), Some(t0 + ms(3500)));
    }

    #[test]
    fn test_hit_after_expiry_is_rising_edge() {
        let t0 = Instant::now();
        let mut debounce = DetectionDebounce::default();

        debounce.hit(t0);
        assert!(debounce.hit(t0 + ms(2500)));
        debounce.clear();
        assert!(!debounce.is_active(t0 + ms(2600)));
    }
}
