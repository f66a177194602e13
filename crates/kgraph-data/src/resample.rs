//! 네이티브 간격 시계열을 더 긴 간격으로 재집계합니다.
//!
//! 버킷은 epoch 기준으로 정렬된 `interval`분 구간이며, 버킷 타임스탬프는 구간 시작 시각입니다.
//!
//! | 컬럼     | 집계      |
//! |----------|-----------|
//! | open     | 첫 값     |
//! | high     | 최댓값    |
//! | low      | 최솟값    |
//! | close    | 마지막 값 |
//! | volume   | 합계      |
//! | sma, ema | 평균      |
//!
//! 이동평균은 재계산하지 않고 버킷 내 정의된 값의 평균을 사용합니다.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use kgraph_core::{checked_sum, mean, Candle, CoreError, CoreResult, Series, SeriesRow};

/// `series`를 `interval`분 간격으로 재집계한 새 시계열을 반환합니다.
///
/// `interval`은 시계열 간격의 배수여야 합니다. 같은 간격이면 그대로 복제합니다.
/// 네이티브 행이 없는 구간은 행을 만들지 않습니다.
pub fn resample(series: &Series, interval: u32) -> CoreResult<Series> {
    let native = series.interval_minutes();
    if interval == 0 || interval % native != 0 {
        return Err(CoreError::InvalidInput(format!(
            "{}분 시계열을 {}분으로 재집계할 수 없습니다",
            native, interval
        )));
    }
    if interval == native {
        return Ok(series.clone());
    }

    let bucket_secs = i64::from(interval) * 60;
    let mut rows: Vec<SeriesRow> = Vec::new();
    let mut bucket: Vec<&SeriesRow> = Vec::new();
    let mut current_start: Option<i64> = None;

    for row in series.rows() {
        let start = bucket_start(row.candle.timestamp, bucket_secs);
        if current_start.is_some_and(|s| s != start) {
            rows.extend(aggregate(&bucket, current_start)?);
            bucket.clear();
        }
        current_start = Some(start);
        bucket.push(row);
    }
    rows.extend(aggregate(&bucket, current_start)?);

    Series::from_rows(series.pair().clone(), interval, series.ma_window(), rows)
}

fn bucket_start(timestamp: DateTime<Utc>, bucket_secs: i64) -> i64 {
    timestamp.timestamp().div_euclid(bucket_secs) * bucket_secs
}

fn aggregate(bucket: &[&SeriesRow], start: Option<i64>) -> CoreResult<Option<SeriesRow>> {
    let (Some(first), Some(last), Some(start)) = (bucket.first(), bucket.last(), start) else {
        return Ok(None);
    };
    let timestamp = DateTime::from_timestamp(start, 0)
        .ok_or_else(|| CoreError::InvalidInput(format!("잘못된 버킷 시각: {}", start)))?;

    let high = bucket.iter().map(|r| r.candle.high).max().unwrap_or(first.candle.high);
    let low = bucket.iter().map(|r| r.candle.low).min().unwrap_or(first.candle.low);
    let volumes: Vec<Decimal> = bucket.iter().map(|r| r.candle.volume).collect();
    let volume = checked_sum(&volumes)?;

    let sma: Vec<Decimal> = bucket.iter().filter_map(|r| r.sma).collect();
    let ema: Vec<Decimal> = bucket.iter().filter_map(|r| r.ema).collect();

    Ok(Some(SeriesRow {
        candle: Candle {
            timestamp,
            open: first.candle.open,
            high,
            low,
            close: last.candle.close,
            volume,
        },
        sma: mean(&sma)?,
        ema: mean(&ema)?,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use kgraph_core::Pair;
    use rust_decimal_macros::dec;

    fn hourly(bars: &[(i64, Decimal, Decimal, Decimal, Decimal, Decimal)]) -> Series {
        let candles = bars
            .iter()
            .map(|&(hour, open, high, low, close, volume)| {
                let ts = Utc.timestamp_opt(hour * 3600, 0).unwrap();
                Candle::new(ts, open, high, low, close, volume).unwrap()
            })
            .collect();
        Series::new(Pair::default(), 60, candles).unwrap()
    }

    #[test]
    fn test_resample_two_hour_buckets() {
        let series = hourly(&[
            (0, dec!(10), dec!(12), dec!(9), dec!(11), dec!(1)),
            (1, dec!(11), dec!(15), dec!(10), dec!(14), dec!(2)),
            (2, dec!(14), dec!(14), dec!(8), dec!(9), dec!(3)),
            (3, dec!(9), dec!(10), dec!(7), dec!(8), dec!(4)),
        ]);

        let resampled = resample(&series, 120).unwrap();

        assert_eq!(resampled.interval_minutes(), 120);
        assert_eq!(resampled.len(), 2);

        let first = resampled.rows()[0].candle;
        assert_eq!(first.timestamp, Utc.timestamp_opt(0, 0).unwrap());
        assert_eq!(first.open, dec!(10));
        assert_eq!(first.high, dec!(15));
        assert_eq!(first.low, dec!(9));
        assert_eq!(first.close, dec!(14));
        assert_eq!(first.volume, dec!(3));

        let second = resampled.rows()[1].candle;
        assert_eq!(second.timestamp, Utc.timestamp_opt(7200, 0).unwrap());
        assert_eq!(second.low, dec!(7));
        assert_eq!(second.volume, dec!(7));
    }

    #[test]
    fn test_resample_averages_moving_averages() {
        let series = hourly(&[
            (0, dec!(10), dec!(10), dec!(10), dec!(10), dec!(1)),
            (1, dec!(12), dec!(12), dec!(12), dec!(12), dec!(1)),
        ]);
        let series = series
            .with_moving_averages(3, vec![None, Some(dec!(11))], vec![Some(dec!(10)), Some(dec!(12))])
            .unwrap();

        let resampled = resample(&series, 120).unwrap();
        let row = &resampled.rows()[0];

        assert_eq!(row.sma, Some(dec!(11)));
        assert_eq!(row.ema, Some(dec!(11)));
        assert_eq!(resampled.ma_window(), Some(3));
    }

    #[test]
    fn test_empty_bins_produce_no_rows() {
        let series = hourly(&[
            (0, dec!(10), dec!(10), dec!(10), dec!(10), dec!(1)),
            (5, dec!(12), dec!(12), dec!(12), dec!(12), dec!(1)),
        ]);

        let resampled = resample(&series, 120).unwrap();
        assert_eq!(resampled.len(), 2);
        assert_eq!(
            resampled.rows()[1].candle.timestamp,
            Utc.timestamp_opt(4 * 3600, 0).unwrap()
        );
    }

    #[test]
    fn test_same_interval_is_identity() {
        let series = hourly(&[(0, dec!(10), dec!(11), dec!(9), dec!(10), dec!(1))]);
        assert_eq!(resample(&series, 60).unwrap(), series);
    }

    #[test]
    fn test_rejects_non_multiple() {
        let series = hourly(&[(0, dec!(10), dec!(11), dec!(9), dec!(10), dec!(1))]);
        assert!(resample(&series, 90).is_err());
        assert!(resample(&series, 0).is_err());
    }

    #[test]
    fn test_empty_series() {
        let series = Series::new(Pair::default(), 60, vec![]).unwrap();
        assert!(resample(&series, 240).unwrap().is_empty());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;
        use std::collections::BTreeMap;

        /// (low, 폭, open 위치 %, close 위치 %, volume)
        fn bar() -> impl Strategy<Value = (u32, u32, u32, u32, u32)> {
            (1u32..1000, 0u32..100, 0u32..=100, 0u32..=100, 0u32..1000)
        }

        fn candle(hour: i64, (low, spread, o, c, volume): (u32, u32, u32, u32, u32)) -> Candle {
            let base = Decimal::from(low);
            Candle::new(
                Utc.timestamp_opt(hour * 3600, 0).unwrap(),
                base + Decimal::from(spread * o / 100),
                base + Decimal::from(spread),
                base,
                base + Decimal::from(spread * c / 100),
                Decimal::from(volume),
            )
            .unwrap()
        }

        proptest! {
            #[test]
            fn buckets_match_consecutive_native_groups(
                bars in prop::collection::btree_map(0i64..96, bar(), 1..48),
                factor in prop::sample::select(vec![2u32, 4]),
            ) {
                let candles: Vec<Candle> = bars.iter().map(|(&h, &b)| candle(h, b)).collect();
                let series = Series::new(Pair::default(), 60, candles.clone()).unwrap();
                let resampled = resample(&series, 60 * factor).unwrap();

                let bucket_secs = 3600 * i64::from(factor);
                let mut groups: BTreeMap<i64, Vec<&Candle>> = BTreeMap::new();
                for c in &candles {
                    groups.entry(c.timestamp.timestamp() / bucket_secs).or_default().push(c);
                }

                prop_assert_eq!(resampled.len(), groups.len());
                prop_assert_eq!(resampled.interval_minutes(), 60 * factor);

                let native_volume: Decimal = candles.iter().map(|c| c.volume).sum();
                let resampled_volume: Decimal =
                    resampled.rows().iter().map(|r| r.candle.volume).sum();
                prop_assert_eq!(native_volume, resampled_volume);

                for (row, (bucket, group)) in resampled.rows().iter().zip(&groups) {
                    let c = row.candle;
                    prop_assert_eq!(c.timestamp.timestamp(), bucket * bucket_secs);
                    prop_assert_eq!(c.open, group[0].open);
                    prop_assert_eq!(c.close, group[group.len() - 1].close);
                    prop_assert_eq!(Some(c.high), group.iter().map(|g| g.high).max());
                    prop_assert_eq!(Some(c.low), group.iter().map(|g| g.low).min());
                }
            }

            #[test]
            fn native_interval_is_identity(
                bars in prop::collection::btree_map(0i64..96, bar(), 0..48),
            ) {
                let candles: Vec<Candle> = bars.iter().map(|(&h, &b)| candle(h, b)).collect();
                let series = Series::new(Pair::default(), 60, candles).unwrap();
                prop_assert_eq!(resample(&series, 60).unwrap(), series);
            }
        }
    }
}
