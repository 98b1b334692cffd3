use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// 相机就绪后打开闪光灯前的等待，避免硬件闪烁
pub const TORCH_STARTUP_DELAY: Duration = Duration::from_millis(800);

#[derive(Debug)]
struct TorchState {
    camera_ready: bool,
    delay_elapsed: bool,
    /// 用户开关，默认打开
    preference: bool,
}

impl Default for TorchState {
    fn default() -> Self {
        Self {
            camera_ready: false,
            delay_elapsed: false,
            preference: true,
        }
    }
}

/// 闪光灯：相机就绪、等待结束且用户开关打开时才亮
#[derive(Debug, Default)]
pub struct Torch {
    state: Mutex<TorchState>,
}

impl Torch {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, TorchState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 相机就绪回调：先标记就绪，等待结束后才允许点亮
    pub async fn on_camera_ready(&self) {
        {
            let mut state = self.state();
            state.camera_ready = true;
            state.delay_elapsed = false;
        }

        tokio::time::sleep(TORCH_STARTUP_DELAY).await;

        self.state().delay_elapsed = true;
    }

    /// 用户切换闪光灯，返回切换后的开关状态
    pub fn toggle_flash(&self) -> bool {
        let mut state = self.state();
        state.preference = !state.preference;
        state.preference
    }

    pub fn is_camera_ready(&self) -> bool {
        self.state().camera_ready
    }

    pub fn is_lit(&self) -> bool {
        let state = self.state();
        state.camera_ready && state.delay_elapsed && state.preference
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_pending, assert_ready, task};

    #[tokio::test(start_paused = true)]
    async fn test_torch_waits_for_ready_and_delay() {
        let torch = Torch::new();
        assert!(!torch.is_lit());

        let mut ready = task::spawn(torch.on_camera_ready());
        assert_pending!(ready.poll());
        assert!(torch.is_camera_ready());
        assert!(!torch.is_lit());

        tokio::time::advance(TORCH_STARTUP_DELAY).await;
        assert_ready!(ready.poll());
        drop(ready);
        assert!(torch.is_lit());

        assert!(!torch.toggle_flash());
        assert!(!torch.is_lit());
    }

    #[tokio::test(start_paused = true)]
    async fn test_switching_on_before_ready_still_waits() {
        let torch = Torch::new();
        assert!(!torch.toggle_flash());
        assert!(torch.toggle_flash());
        assert!(!torch.is_lit());

        let mut ready = task::spawn(torch.on_camera_ready());
        assert_pending!(ready.poll());
        assert!(!torch.is_lit());

        tokio::time::advance(TORCH_STARTUP_DELAY - Duration::from_millis(1)).await;
        assert_pending!(ready.poll());
        assert!(!torch.is_lit());

        tokio::time::advance(Duration::from_millis(1)).await;
        assert_ready!(ready.poll());
        drop(ready);
        assert!(torch.is_lit());
    }

    #[tokio::test(start_paused = true)]
    async fn test_switching_off_during_delay_is_kept() {
        let torch = Torch::new();

        let mut ready = task::spawn(torch.on_camera_ready());
        assert_pending!(ready.poll());
        assert!(!torch.toggle_flash());

        tokio::time::advance(TORCH_STARTUP_DELAY).await;
        assert_ready!(ready.poll());
        drop(ready);
        assert!(!torch.is_lit());

        assert!(torch.toggle_flash());
        assert!(torch.is_lit());
    }
}
