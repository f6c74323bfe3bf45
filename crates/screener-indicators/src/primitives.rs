//! 롤링 윈도우 기본 연산.
//!
//! 모든 지표 계산기가 공유하는 수치 연산입니다. 입력과 같은 길이의 벡터를
//! 반환하며, 정의되지 않은 구간은 `f64::NAN`으로 채웁니다. NaN은 정규화
//! 단계에서 0.0으로 바뀝니다.
//!
//! 윈도우 연산과 평활 연산은 입력 앞쪽의 NaN 구간을 건너뜁니다. 첫 번째 정의된 값의
//! 인덱스를 `s`라 하면 첫 결과는 `s + n - 1`에 나옵니다. 덕분에
//! `ema(macd, 9)`나 `sma(cci, 6)`처럼 지표를 연쇄해도 워밍업이 자연스럽게
//! 누적됩니다.

/// 첫 번째 정의된(NaN이 아닌) 값의 인덱스.
pub fn first_valid(x: &[f64]) -> Option<usize> {
    x.iter().position(|v| !v.is_nan())
}

/// 윈도우 연산 공통 처리.
///
/// 윈도우 안에 NaN이 있으면 결과도 NaN입니다.
fn rolling<F>(x: &[f64], n: usize, f: F) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64,
{
    let mut out = vec![f64::NAN; x.len()];
    if n == 0 {
        return out;
    }
    let Some(start) = first_valid(x) else {
        return out;
    };

    for i in (start + n - 1)..x.len() {
        let window = &x[i + 1 - n..=i];
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }
        out[i] = f(window);
    }
    out
}

fn mean(window: &[f64]) -> f64 {
    window.iter().sum::<f64>() / window.len() as f64
}

/// 단순 이동평균.
pub fn sma(x: &[f64], n: usize) -> Vec<f64> {
    rolling(x, n, mean)
}

/// 이동 합계.
pub fn rolling_sum(x: &[f64], n: usize) -> Vec<f64> {
    rolling(x, n, |w| w.iter().sum())
}

/// 이동 최솟값.
pub fn rolling_min(x: &[f64], n: usize) -> Vec<f64> {
    rolling(x, n, |w| w.iter().copied().fold(f64::INFINITY, f64::min))
}

/// 이동 최댓값.
pub fn rolling_max(x: &[f64], n: usize) -> Vec<f64> {
    rolling(x, n, |w| w.iter().copied().fold(f64::NEG_INFINITY, f64::max))
}

/// 이동 모표준편차.
pub fn stddev(x: &[f64], n: usize) -> Vec<f64> {
    rolling(x, n, |w| {
        let m = mean(w);
        (w.iter().map(|v| (v - m).powi(2)).sum::<f64>() / w.len() as f64).sqrt()
    })
}

/// 이동 평균절대편차 (CCI용).
pub fn mean_abs_deviation(x: &[f64], n: usize) -> Vec<f64> {
    rolling(x, n, |w| {
        let m = mean(w);
        w.iter().map(|v| (v - m).abs()).sum::<f64>() / w.len() as f64
    })
}

/// 지수 이동평균.
///
/// 평활 계수 `α = 2 / (n + 1)`. 첫 정의값부터 가중치 `(1 - α)^k`를 정규화해
/// 누적하며 (초기값 편향 보정), 값은 `n`번째 정의값부터 내보냅니다.
pub fn ema(x: &[f64], n: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; x.len()];
    if n == 0 {
        return out;
    }
    let Some(start) = first_valid(x) else {
        return out;
    };

    let decay = 1.0 - 2.0 / (n as f64 + 1.0);
    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for i in start..x.len() {
        numerator = x[i] + decay * numerator;
        denominator = 1.0 + decay * denominator;
        if i + 1 >= start + n {
            out[i] = numerator / denominator;
        }
    }
    out
}

/// Wilder 평활 (RSI, ATR, ADX).
///
/// 첫 값은 `n`개 단순 평균, 이후 `(prev * (n - 1) + x) / n`.
pub fn wilder_smooth(x: &[f64], n: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; x.len()];
    if n == 0 {
        return out;
    }
    let Some(start) = first_valid(x) else {
        return out;
    };
    let seed_index = start + n - 1;
    if seed_index >= x.len() {
        return out;
    }

    let period = n as f64;
    let mut prev = mean(&x[start..=seed_index]);
    out[seed_index] = prev;
    for i in seed_index + 1..x.len() {
        prev = (prev * (period - 1.0) + x[i]) / period;
        out[i] = prev;
    }
    out
}

/// `x[i] - x[i - k]`.
pub fn diff(x: &[f64], k: usize) -> Vec<f64> {
    (0..x.len())
        .map(|i| if i >= k { x[i] - x[i - k] } else { f64::NAN })
        .collect()
}

/// `x[i - k]` (앞쪽은 NaN).
pub fn shift(x: &[f64], k: usize) -> Vec<f64> {
    (0..x.len())
        .map(|i| if i >= k { x[i - k] } else { f64::NAN })
        .collect()
}

/// 누적 합계.
pub fn cumsum(x: &[f64]) -> Vec<f64> {
    let mut acc = 0.0;
    x.iter()
        .map(|v| {
            acc += v;
            acc
        })
        .collect()
}

/// 4봉 대칭 가중 (1-2-2-1) / 6.
pub fn swma4(x: &[f64]) -> Vec<f64> {
    (0..x.len())
        .map(|i| {
            if i < 3 {
                f64::NAN
            } else {
                (x[i] + 2.0 * x[i - 1] + 2.0 * x[i - 2] + x[i - 3]) / 6.0
            }
        })
        .collect()
}

/// 0으로 나누면 0.0을 반환하는 나눗셈. 어느 한쪽이 NaN이면 NaN.
pub fn safe_div(num: f64, den: f64) -> f64 {
    if num.is_nan() || den.is_nan() {
        f64::NAN
    } else if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

/// 원소별 `safe_div`.
pub fn ratio(num: &[f64], den: &[f64]) -> Vec<f64> {
    zip_with(num, den, safe_div)
}

/// 원소별 `100 * num / den`.
pub fn percent_ratio(num: &[f64], den: &[f64]) -> Vec<f64> {
    zip_with(num, den, |a, b| 100.0 * safe_div(a, b))
}

/// 두 벡터의 원소별 연산.
pub fn zip_with<F>(a: &[f64], b: &[f64], f: F) -> Vec<f64>
where
    F: Fn(f64, f64) -> f64,
{
    a.iter().zip(b).map(|(&x, &y)| f(x, y)).collect()
}

/// 원소별 `a - b`.
pub fn sub(a: &[f64], b: &[f64]) -> Vec<f64> {
    zip_with(a, b, |x, y| x - y)
}

/// 원소별 `max(x, 0)`. NaN은 유지합니다.
pub fn positive(x: &[f64]) -> Vec<f64> {
    x.iter()
        .map(|&v| if v.is_nan() { v } else { v.max(0.0) })
        .collect()
}

/// 원소별 조건 플래그 (참이면 1.0). NaN은 유지합니다.
pub fn flag<F>(x: &[f64], pred: F) -> Vec<f64>
where
    F: Fn(f64) -> bool,
{
    x.iter()
        .map(|&v| {
            if v.is_nan() {
                v
            } else if pred(v) {
                1.0
            } else {
                0.0
            }
        })
        .collect()
}
