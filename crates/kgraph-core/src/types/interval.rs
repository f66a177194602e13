//! 데이터 소스가 직접 제공하는 네이티브 캔들 간격 정의.
//!
//! 네이티브 집합에 없는 간격은 가장 큰 약수 간격으로 받아온 뒤 리샘플링합니다.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Kraken OHLC 엔드포인트가 제공하는 간격 (분).
pub const CANONICAL_NATIVE_INTERVALS: [u32; 9] = [1, 5, 15, 30, 60, 240, 1440, 10080, 21600];

/// 네이티브 간격 집합 (오름차순, 중복 없음).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u32>", into = "Vec<u32>")]
pub struct NativeIntervals(Vec<u32>);

impl Default for NativeIntervals {
    fn default() -> Self {
        Self(CANONICAL_NATIVE_INTERVALS.to_vec())
    }
}

impl NativeIntervals {
    /// 주어진 간격들로 집합을 생성합니다. 0 또는 빈 목록은 거부됩니다.
    pub fn new(mut intervals: Vec<u32>) -> CoreResult<Self> {
        if intervals.is_empty() {
            return Err(CoreError::InvalidInput(
                "네이티브 간격 목록이 비어 있습니다".to_string(),
            ));
        }
        if intervals.contains(&0) {
            return Err(CoreError::InvalidInput(
                "네이티브 간격은 0보다 커야 합니다".to_string(),
            ));
        }
        intervals.sort_unstable();
        intervals.dedup();
        Ok(Self(intervals))
    }

    /// 간격 목록 (오름차순).
    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    /// 네이티브 간격인지 확인합니다.
    pub fn contains(&self, minutes: u32) -> bool {
        self.0.binary_search(&minutes).is_ok()
    }

    /// `minutes`를 나누어떨어지게 하는 가장 큰 네이티브 간격.
    ///
    /// `minutes`가 0이거나 약수가 없으면 `None`.
    pub fn find_largest_divisor(&self, minutes: u32) -> Option<u32> {
        if minutes == 0 {
            return None;
        }
        self.0.iter().rev().copied().find(|native| minutes % native == 0)
    }

    /// 요청 간격에 대한 조회 계획을 세웁니다.
    pub fn plan(&self, requested: u32) -> Option<IntervalPlan> {
        let native = self.find_largest_divisor(requested)?;
        if native == requested {
            Some(IntervalPlan::Direct { native })
        } else {
            Some(IntervalPlan::Resample {
                native,
                factor: requested / native,
            })
        }
    }
}

impl TryFrom<Vec<u32>> for NativeIntervals {
    type Error = CoreError;

    fn try_from(value: Vec<u32>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NativeIntervals> for Vec<u32> {
    fn from(intervals: NativeIntervals) -> Self {
        intervals.0
    }
}

/// 기본 네이티브 집합에서 가장 큰 약수 간격을 찾습니다.
pub fn find_largest_divisor(minutes: u32) -> Option<u32> {
    NativeIntervals::default().find_largest_divisor(minutes)
}

/// 요청 간격을 얻기 위한 조회 방식.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalPlan {
    /// 데이터 소스에서 그대로 조회
    Direct { native: u32 },
    /// `native` 간격으로 조회 후 `factor`개씩 묶어 리샘플링
    Resample { native: u32, factor: u32 },
}

impl IntervalPlan {
    /// 실제 조회에 사용할 네이티브 간격.
    pub fn fetch_interval(&self) -> u32 {
        match self {
            IntervalPlan::Direct { native } | IntervalPlan::Resample { native, .. } => *native,
        }
    }
}
