//! Failure injection for mocked schedule sources
#![cfg(any(test, feature = "mock_source"))]

use std::error::Error;

/// How a [`MockSource`](crate::mock_source::MockSource) answers during a test.
///
/// Each call kind holds `(successes, failures)`: the first `successes` calls go through, the next
/// `failures` calls fail, and every later call goes through again.
#[derive(Default, Clone, Debug)]
pub struct MockBehaviour {
    /// While set, no call fails and the counters are left untouched
    pub is_suspended: bool,

    pub get_schedule_behaviour: (u32, u32),
    pub patch_task_status_behaviour: (u32, u32),
}

impl MockBehaviour {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next `n_fails` calls of each kind fail
    pub fn fail_now(n_fails: u32) -> Self {
        Self {
            is_suspended: false,
            get_schedule_behaviour: (0, n_fails),
            patch_task_status_behaviour: (0, n_fails),
        }
    }

    pub fn suspend(&mut self) {
        self.is_suspended = true;
    }

    pub fn resume(&mut self) {
        self.is_suspended = false;
    }

    pub fn can_get_schedule(&mut self) -> Result<(), Box<dyn Error>> {
        if self.is_suspended { return Ok(()) }
        consume(&mut self.get_schedule_behaviour, "get_schedule")
    }

    pub fn can_patch_task_status(&mut self) -> Result<(), Box<dyn Error>> {
        if self.is_suspended { return Ok(()) }
        consume(&mut self.patch_task_status_behaviour, "patch_task_status")
    }
}

fn consume(counters: &mut (u32, u32), call: &str) -> Result<(), Box<dyn Error>> {
    let (successes, failures) = counters;
    if *successes > 0 {
        *successes -= 1;
        log::debug!("Mock behaviour: {} goes through ({} more before failing)", call, successes);
        return Ok(());
    }
    if *failures > 0 {
        *failures -= 1;
        log::debug!("Mock behaviour: {} fails ({} failures left)", call, failures);
        return Err(format!("Mocked failure of {}", call).into());
    }
    Ok(())
}
