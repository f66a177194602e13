//! 이동평균 → 스토캐스틱 → 수익 시뮬레이션 파이프라인 테스트

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use kgraph_analytics::{stochastic_warmup, IndicatorEngine, WindowPolicy, DEFAULT_LOT_SIZE};
use kgraph_core::{Candle, Pair, Series, SignalKind};

/// (고가, 저가, 종가) 목록으로 1시간 간격 시계열 생성
fn series_from(bars: &[(Decimal, Decimal, Decimal)]) -> Series {
    let candles = bars
        .iter()
        .enumerate()
        .map(|(i, &(high, low, close))| {
            let ts = Utc.timestamp_opt(1_700_000_000 + i as i64 * 3600, 0).unwrap();
            Candle::new(ts, close, high, low, close, dec!(1)).unwrap()
        })
        .collect();
    Series::new(Pair::default(), 60, candles).unwrap()
}

/// 6개 행 동안 저가에서 마감하며 하락한 뒤 약하게 반등하는 시계열
fn dip_then_bounce() -> Series {
    let mut bars: Vec<_> = (0..6)
        .map(|i| {
            let i = Decimal::from(i);
            (dec!(20) - i, dec!(18) - i, dec!(18) - i)
        })
        .collect();
    bars.push((dec!(15), dec!(12), dec!(12.5)));
    bars.push((dec!(15), dec!(12.5), dec!(14)));
    series_from(&bars)
}

#[test]
fn test_short_series_uses_short_window() {
    let engine = IndicatorEngine::new();
    let series = series_from(&[
        (dec!(11), dec!(9), dec!(10)),
        (dec!(12), dec!(10), dec!(11)),
        (dec!(13), dec!(11), dec!(12)),
        (dec!(12), dec!(8), dec!(9)),
        (dec!(14), dec!(9), dec!(13)),
    ]);

    let with_ma = engine.moving_averages(&series).unwrap();
    assert_eq!(with_ma.ma_window(), Some(3));
    assert!(with_ma.rows()[2].sma.is_some());

    let overlay = engine.stochastic_series(&with_ma).unwrap();
    assert_eq!(overlay.settings().window, 3);
    assert_eq!(overlay.len(), 5 - stochastic_warmup(3));
    // 이동평균은 그대로 전달됨
    assert_eq!(overlay.rows()[0].sma, with_ma.rows()[2].sma);
}

#[test]
fn test_flat_window_leaves_k_undefined_without_signal() {
    let engine = IndicatorEngine::new();
    let series = series_from(&[
        (dec!(10), dec!(10), dec!(10)),
        (dec!(10), dec!(10), dec!(10)),
        (dec!(10), dec!(10), dec!(10)),
        (dec!(12), dec!(9), dec!(11)),
        (dec!(13), dec!(10), dec!(12)),
    ]);

    let overlay = engine.stochastic_series(&series).unwrap();
    let first = &overlay.rows()[0];

    assert_eq!(first.period_low, Some(dec!(10)));
    assert_eq!(first.period_high, Some(dec!(10)));
    assert!(first.k.is_none());
    assert!(first.d.is_none());
    assert!(!first.buy_signal && !first.sell_signal);
    assert!(overlay.rows()[1].k.is_some());
}

#[test]
fn test_buy_signal_drives_profit_curve() {
    let engine = IndicatorEngine::new();
    let series = dip_then_bounce();

    let overlay = engine.stochastic_series(&series).unwrap();
    let signals = overlay.signals();
    assert_eq!(signals.len(), 1);
    assert_eq!(signals[0].kind, SignalKind::Buy);
    assert_eq!(signals[0].price, dec!(12.5));

    let profit = engine.simulate_profit(&overlay).unwrap().unwrap();
    assert_eq!(profit.start(), Some(signals[0].timestamp));
    assert_eq!(profit.len(), 2);
    assert_eq!(profit.rows()[0].cumulative_profit, Decimal::ZERO);
    // 14 × 100 - 12.5 × 100
    assert_eq!(profit.final_profit(), Some(dec!(150)));
}

#[test]
fn test_no_buy_signal_yields_no_profit_series() {
    let engine = IndicatorEngine::new();
    let flat = series_from(&vec![(dec!(5), dec!(5), dec!(5)); 10]);

    let overlay = engine.stochastic_series(&flat).unwrap();
    assert!(overlay.signals().is_empty());
    assert!(engine.simulate_profit(&overlay).unwrap().is_none());
}

#[test]
fn test_empty_series() {
    let engine = IndicatorEngine::new();
    let empty = Series::new(Pair::default(), 60, vec![]).unwrap();

    assert!(engine.moving_averages(&empty).unwrap().is_empty());
    let overlay = engine.stochastic_series(&empty).unwrap();
    assert!(overlay.is_empty());
    assert!(engine.simulate_profit(&overlay).unwrap().is_none());
}

fn bars_strategy() -> impl Strategy<Value = Vec<(Decimal, Decimal, Decimal)>> {
    prop::collection::vec((1i64..1_000, 0i64..50, 0u8..=100), 0..90).prop_map(|raw| {
        raw.into_iter()
            .map(|(low, spread, frac)| {
                let low = Decimal::from(low);
                let spread = Decimal::from(spread);
                let close = low + spread * Decimal::from(frac) / dec!(100);
                (low + spread, low, close)
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_stochastic_values_are_bounded(bars in bars_strategy()) {
        let engine = IndicatorEngine::new();
        let series = series_from(&bars);
        let overlay = engine.stochastic_series(&series).unwrap();

        let window = WindowPolicy::default().select(series.len());
        prop_assert_eq!(overlay.settings().window, window);
        prop_assert_eq!(overlay.len(), series.len().saturating_sub(stochastic_warmup(window)));

        for row in overlay.rows() {
            for value in [row.k, row.d].into_iter().flatten() {
                prop_assert!(value >= Decimal::ZERO && value <= dec!(100));
            }
            prop_assert!(!(row.buy_signal && row.sell_signal));
            prop_assert!(row.period_low.is_some() && row.period_high.is_some());
        }
    }

    #[test]
    fn prop_stochastic_is_idempotent(bars in bars_strategy()) {
        let engine = IndicatorEngine::new();
        let series = engine.moving_averages(&series_from(&bars)).unwrap();

        let first = engine.stochastic_series(&series).unwrap();
        let second = engine.stochastic_series(&series).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_profit_position_never_negative(bars in bars_strategy()) {
        let engine = IndicatorEngine::new();
        let overlay = engine.stochastic_series(&series_from(&bars)).unwrap();

        match engine.simulate_profit(&overlay).unwrap() {
            None => prop_assert!(overlay.first_buy_index().is_none()),
            Some(profit) => {
                prop_assert_eq!(profit.rows()[0].executed, Some(SignalKind::Buy));
                for row in profit.rows() {
                    prop_assert!(row.position_size >= Decimal::ZERO);
                    prop_assert_eq!(row.position_size % DEFAULT_LOT_SIZE, Decimal::ZERO);
                }
            }
        }
    }
}
