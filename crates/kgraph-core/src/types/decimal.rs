//! 정밀한 금융 계산을 위한 Decimal 유틸리티.

use rust_decimal::Decimal;

use crate::error::{CoreError, CoreResult};

/// 금융 정밀도를 위한 가격 타입.
pub type Price = Decimal;

/// 거래량/보유 수량을 위한 타입.
pub type Quantity = Decimal;

/// 문자열에서 Decimal을 파싱합니다.
///
/// 거래소는 가격과 거래량을 문자열로 전달합니다. 지수 표기(`1e-5`)도 허용합니다.
pub fn parse_decimal(raw: &str) -> CoreResult<Decimal> {
    let trimmed = raw.trim();
    trimmed
        .parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| CoreError::InvalidInput(format!("숫자가 아님: {:?}", raw)))
}

/// 오버플로를 검사하는 합계.
///
/// `Decimal`의 `+`는 범위를 넘으면 패닉하므로 외부 데이터 합산에는 이 함수를 사용합니다.
pub fn checked_sum<'a>(values: impl IntoIterator<Item = &'a Decimal>) -> CoreResult<Decimal> {
    values.into_iter().try_fold(Decimal::ZERO, |sum, v| {
        sum.checked_add(*v)
            .ok_or_else(|| CoreError::Overflow(format!("{} + {}", sum, v)))
    })
}

/// Decimal 값들의 산술 평균. 비어 있으면 `None`.
pub fn mean<'a>(values: impl IntoIterator<Item = &'a Decimal>) -> CoreResult<Option<Decimal>> {
    let values: Vec<&Decimal> = values.into_iter().collect();
    if values.is_empty() {
        return Ok(None);
    }
    let sum = checked_sum(values.iter().copied())?;
    Ok(Some(sum / Decimal::from(values.len())))
}
