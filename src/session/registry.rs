//! 会话注册表
//!
//! 演示宿主使用：cookie 中的会话 ID → `MemorySession`，
//! Moka 缓存负责空闲过期与容量淘汰。

use std::time::Duration;

use moka::sync::Cache;
use tracing::trace;
use uuid::Uuid;

use super::MemorySession;
use crate::config::SessionConfig;

pub struct SessionRegistry {
    sessions: Cache<String, MemorySession>,
}

impl SessionRegistry {
    pub fn new(config: &SessionConfig) -> Self {
        let sessions = Cache::builder()
            .time_to_idle(Duration::from_secs(config.idle_timeout_secs))
            .max_capacity(config.max_sessions)
            .build();

        Self { sessions }
    }

    /// 生成新的会话 ID（UUID v4）
    pub fn new_session_id() -> String {
        Uuid::new_v4().to_string()
    }

    pub fn load(&self, id: &str) -> Option<MemorySession> {
        let session = self.sessions.get(id);
        trace!("Session {} lookup: hit={}", id, session.is_some());
        session
    }

    pub fn store(&self, id: &str, session: MemorySession) {
        self.sessions.insert(id.to_string(), session);
    }

    /// 当前会话数（近似值）
    pub fn session_count(&self) -> u64 {
        self.sessions.run_pending_tasks();
        self.sessions.entry_count()
    }
}
