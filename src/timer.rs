/// Stateful cooldown gate over the monotonic millisecond clock.
///
/// `ready` answers "has at least `cooldown_ms` elapsed since the last
/// time this fired?", re-arming itself when it says yes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Timer {
    last: u64,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ready(&mut self, now_ms: u64, cooldown_ms: u64) -> bool {
        if now_ms.saturating_sub(self.last) >= cooldown_ms {
            self.last = now_ms;
            true
        } else {
            false
        }
    }
}
