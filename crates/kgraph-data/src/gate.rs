//! 요청 세대 관리.
//!
//! 새 요청이 시작되면 이전 요청의 결과는 폐기됩니다. 늦게 끝난 이전 로드가
//! 최신 결과를 덮어쓰지 않도록 각 로드는 발급 시점의 티켓을 들고 다닙니다.

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

/// 로드 요청 티켓 (발급 순서대로 증가).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LoadTicket(u64);

/// 최신 요청만 결과를 반영하도록 하는 게이트.
#[derive(Debug, Default)]
pub struct RequestGate {
    latest: AtomicU64,
}

impl RequestGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// 새 티켓을 발급합니다. 이전에 발급된 티켓은 모두 만료됩니다.
    pub fn issue(&self) -> LoadTicket {
        LoadTicket(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// 티켓이 아직 최신인지 확인합니다.
    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        self.latest.load(Ordering::Acquire) == ticket.0
    }

    /// 최신 티켓의 결과만 통과시킵니다.
    pub fn accept<T>(&self, ticket: LoadTicket, value: T) -> Option<T> {
        if self.is_current(ticket) {
            Some(value)
        } else {
            debug!(generation = ticket.0, "이전 요청 결과 폐기");
            None
        }
    }
}
