//! Task identifiers.
//!
//! # ULID ベースの ID
//! TaskId は ULID (Universally Unique Lexicographically Sortable Identifier) を使います。
//! - **時刻でソート可能**: timestamp が先頭にあるため、投入順とほぼ一致する
//! - **調整不要**: キューごとに独立して生成できる
//!
//! 投入順の厳密な情報は ULID ではなく `QueuedTask::seq` が持ちます。

use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

/// Identifier of a submitted task, assigned at submission time.
///
/// Display は `task-<ULID>` 形式。
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Ulid);

impl TaskId {
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self(ulid)
    }

    pub fn as_ulid(&self) -> Ulid {
        self.0
    }

    /// Milliseconds since the Unix epoch encoded in the ULID.
    pub fn timestamp_ms(&self) -> u64 {
        self.0.timestamp_ms()
    }
}

impl From<Ulid> for TaskId {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task-{}", self.0)
    }
}
