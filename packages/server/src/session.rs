//! Per-session one-time notice state.
//!
//! Report generation costs warehouse credits, so the UI shows a cost
//! notice the first time a session generates a report. The original
//! implementation kept this in an ambient per-session global; here it is
//! an explicit state object owned by the application and keyed by the
//! client's session id.

use std::collections::HashMap;
use std::sync::Mutex;

use uuid::Uuid;

/// The one-time cost notice shown on a session's first report call.
pub const COST_TIP: &str =
    "리포트 생성을 반복 호출하면 데이터 웨어하우스 비용이 발생할 수 있습니다.";

/// Mutable per-session state.
#[derive(Debug, Default)]
struct SessionState {
    shown_cost_tip: bool,
}

/// All known sessions, keyed by the client-held session id.
#[derive(Debug, Default)]
pub struct Sessions {
    inner: Mutex<HashMap<Uuid, SessionState>>,
}

impl Sessions {
    /// Returns the cost tip on a session's first call, `None` afterwards.
    ///
    /// # Panics
    ///
    /// Panics if the session mutex is poisoned.
    pub fn cost_tip(&self, session: Uuid) -> Option<&'static str> {
        let mut sessions = self.inner.lock().expect("session mutex poisoned");
        let state = sessions.entry(session).or_default();
        if state.shown_cost_tip {
            None
        } else {
            state.shown_cost_tip = true;
            Some(COST_TIP)
        }
    }
}
