// ==========================================
// 发货包装系统 - 用户提示通道
// ==========================================
// 职责: 接收编排过程中面向用户的提示（警告 / 一般信息）
// 说明: 软失败（配置缺失、未装箱剩余）只产生提示，不产生错误
// ==========================================

use crate::domain::types::NoticeLevel;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// 一条用户提示
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackagingNotice {
    pub level: NoticeLevel,
    pub text: String,
}

pub trait PackagingMessenger: Send + Sync {
    fn add_warning(&self, text: &str);

    fn add_message(&self, text: &str);
}

/// 空操作提示通道（只写日志）
#[derive(Debug, Clone, Default)]
pub struct NoOpMessenger;

impl PackagingMessenger for NoOpMessenger {
    fn add_warning(&self, text: &str) {
        tracing::debug!("NoOpMessenger: 跳过警告提示 - {}", text);
    }

    fn add_message(&self, text: &str) {
        tracing::debug!("NoOpMessenger: 跳过一般提示 - {}", text);
    }
}

/// 内存提示通道（收集提示供调用方读取）
#[derive(Debug, Clone, Default)]
pub struct InMemoryMessenger {
    notices: Arc<Mutex<Vec<PackagingNotice>>>,
}

impl InMemoryMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, level: NoticeLevel, text: &str) {
        // 锁中毒时仍保留已收集的提示
        let mut notices = match self.notices.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        notices.push(PackagingNotice {
            level,
            text: text.to_string(),
        });
    }

    /// 已收集的全部提示（按产生顺序）
    pub fn notices(&self) -> Vec<PackagingNotice> {
        match self.notices.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn warnings(&self) -> Vec<String> {
        self.notices()
            .into_iter()
            .filter(|n| n.level == NoticeLevel::Warning)
            .map(|n| n.text)
            .collect()
    }

    /// 取出并清空
    pub fn drain(&self) -> Vec<PackagingNotice> {
        match self.notices.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl PackagingMessenger for InMemoryMessenger {
    fn add_warning(&self, text: &str) {
        self.push(NoticeLevel::Warning, text);
    }

    fn add_message(&self, text: &str) {
        self.push(NoticeLevel::Status, text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_messenger_collects_in_order() {
        let messenger = InMemoryMessenger::new();
        messenger.add_message("a");
        messenger.add_warning("b");

        assert_eq!(messenger.warnings(), vec!["b"]);
        let drained = messenger.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].level, NoticeLevel::Status);
        assert!(messenger.notices().is_empty());
    }
}
