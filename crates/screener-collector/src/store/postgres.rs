//! PostgreSQL 저장소.
//!
//! 자산 유형마다 일봉 이력 테이블(`{class}_hist_daily`), 지표 테이블
//! (`{class}_indicator_daily`), 신호 테이블(`{class}_indicator_signal`)을
//! 사용합니다. 지표 컬럼 이름에 `-`가 포함되어 있어 모든 지표 컬럼은
//! 따옴표로 감쌉니다.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use screener_core::{AssetClass, OhlcvPoint, OhlcvSeries};
use screener_indicators::{IndicatorSeries, IndicatorValues, ScreeningHit, UpdatePlan};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, QueryBuilder};
use tracing::{debug, info};

use crate::config::CollectorConfig;
use crate::modules::checkpoint::{CheckpointInfo, CheckpointStatus};
use crate::ports::{
    CheckpointStore, HistoryLoader, IndicatorSink, UniverseProvider, WatermarkStore,
};
use crate::Result;

/// 한 번의 INSERT에 담는 최대 행 수.
///
/// 행당 바인드 수가 80개 안팎이므로 PostgreSQL 바인드 한도(65535) 안에 들어옵니다.
const UPSERT_CHUNK_ROWS: usize = 500;

type HistoryRecord = (
    NaiveDate,
    Option<f64>,
    Option<f64>,
    Option<f64>,
    Option<f64>,
    Option<f64>,
    Option<f64>,
);

/// PostgreSQL 기반 저장소.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// 설정으로 연결 풀을 생성합니다.
    pub async fn connect(config: &CollectorConfig) -> Result<Self> {
        info!("데이터베이스 연결 중...");

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.connection_timeout())
            .connect(&config.database_url)
            .await?;

        info!("데이터베이스 연결 성공");
        Ok(Self { pool })
    }

    /// 기존 연결 풀로 생성합니다.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 내부 연결 풀.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// 연결 풀 종료.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// 지표/신호/체크포인트 테이블을 생성합니다 (이미 있으면 유지).
    pub async fn ensure_schema(&self, asset_classes: &[AssetClass]) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sync_checkpoint (
                workflow_name TEXT PRIMARY KEY,
                last_code TEXT,
                last_processed_at TIMESTAMPTZ,
                total_processed INTEGER NOT NULL DEFAULT 0,
                status TEXT NOT NULL DEFAULT 'idle',
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        for asset_class in asset_classes {
            sqlx::query(&indicator_table_ddl(*asset_class))
                .execute(&self.pool)
                .await?;
            sqlx::query(&format!(
                "CREATE INDEX IF NOT EXISTS {table}_code_date_idx ON {table} (code, date)",
                table = asset_class.indicator_table()
            ))
            .execute(&self.pool)
            .await?;
            sqlx::query(&signal_table_ddl(*asset_class))
                .execute(&self.pool)
                .await?;

            info!(asset_class = %asset_class, "지표 테이블 준비 완료");
        }
        Ok(())
    }
}

fn indicator_table_ddl(asset_class: AssetClass) -> String {
    let columns = IndicatorValues::COLUMNS
        .iter()
        .map(|c| format!("    \"{}\" DOUBLE PRECISION", c))
        .collect::<Vec<_>>()
        .join(",\n");

    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n    date DATE NOT NULL,\n    code TEXT NOT NULL,\n    close DOUBLE PRECISION,\n{},\n    PRIMARY KEY (date, code)\n)",
        asset_class.indicator_table(),
        columns
    )
}

fn signal_table_ddl(asset_class: AssetClass) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n    date DATE NOT NULL,\n    code TEXT NOT NULL,\n    signal TEXT NOT NULL,\n    close DOUBLE PRECISION,\n    PRIMARY KEY (date, code)\n)",
        asset_class.signal_table()
    )
}

/// 따옴표로 감싼 지표 컬럼 목록.
fn quoted_columns() -> Vec<String> {
    IndicatorValues::COLUMNS
        .iter()
        .map(|c| format!("\"{}\"", c))
        .collect()
}

#[async_trait]
impl HistoryLoader for PgStore {
    async fn load(&self, asset_class: AssetClass, plan: &UpdatePlan) -> Result<OhlcvSeries> {
        // 최근 행부터 읽어 행 수 제한을 적용한 뒤 오름차순으로 뒤집습니다.
        let sql = format!(
            r#"
            SELECT DISTINCT ON (date)
                date,
                open::float8, high::float8, low::float8, close::float8,
                volume::float8, amount::float8
            FROM {}
            WHERE code = $1
              AND ($2::date IS NULL OR date >= $2)
              AND date <= $3
            ORDER BY date DESC
            LIMIT $4
            "#,
            asset_class.history_table()
        );

        let records: Vec<HistoryRecord> = sqlx::query_as(&sql)
            .bind(&plan.code)
            .bind(plan.range.start)
            .bind(plan.range.end)
            .bind(plan.row_limit.map(|n| n as i64))
            .fetch_all(&self.pool)
            .await?;

        let points = records
            .into_iter()
            .rev()
            .map(|(date, open, high, low, close, volume, amount)| OhlcvPoint {
                date,
                code: plan.code.clone(),
                open,
                high,
                low,
                close,
                volume,
                amount,
            })
            .collect::<Vec<_>>();

        debug!(code = %plan.code, rows = points.len(), "일봉 로드 완료");
        Ok(OhlcvSeries::new(plan.code.clone(), points))
    }
}

#[async_trait]
impl WatermarkStore for PgStore {
    async fn watermark(&self, asset_class: AssetClass, code: &str) -> Result<Option<NaiveDate>> {
        let sql = format!(
            "SELECT MAX(date) FROM {} WHERE code = $1",
            asset_class.indicator_table()
        );
        let watermark: Option<NaiveDate> = sqlx::query_scalar(&sql)
            .bind(code)
            .fetch_one(&self.pool)
            .await?;
        Ok(watermark)
    }
}

#[async_trait]
impl IndicatorSink for PgStore {
    async fn upsert(&self, asset_class: AssetClass, series: &IndicatorSeries) -> Result<usize> {
        if series.is_empty() {
            return Ok(0);
        }

        let columns = quoted_columns();
        let insert = format!(
            "INSERT INTO {} (date, code, close, {}) ",
            asset_class.indicator_table(),
            columns.join(", ")
        );
        let conflict = format!(
            " ON CONFLICT (date, code) DO UPDATE SET close = EXCLUDED.close, {}",
            columns
                .iter()
                .map(|c| format!("{c} = EXCLUDED.{c}"))
                .collect::<Vec<_>>()
                .join(", ")
        );

        let mut written = 0;
        for chunk in series.rows.chunks(UPSERT_CHUNK_ROWS) {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(&insert);
            builder.push_values(chunk, |mut b, row| {
                b.push_bind(row.date)
                    .push_bind(row.code.clone())
                    .push_bind(row.close);
                for value in row.values.to_vec() {
                    b.push_bind(value);
                }
            });
            builder.push(&conflict);

            let result = builder.build().execute(&self.pool).await?;
            written += result.rows_affected() as usize;
        }

        debug!(code = %series.code, rows = written, "지표 저장 완료");
        Ok(written)
    }

    async fn upsert_signals(
        &self,
        asset_class: AssetClass,
        hits: &[ScreeningHit],
    ) -> Result<usize> {
        if hits.is_empty() {
            return Ok(0);
        }

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "INSERT INTO {} (date, code, signal, close) ",
            asset_class.signal_table()
        ));
        builder.push_values(hits, |mut b, hit| {
            b.push_bind(hit.date)
                .push_bind(hit.code.clone())
                .push_bind(hit.signal.as_str())
                .push_bind(hit.close);
        });
        builder.push(
            " ON CONFLICT (date, code) DO UPDATE SET signal = EXCLUDED.signal, close = EXCLUDED.close",
        );

        let result = builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected() as usize)
    }
}

#[async_trait]
impl UniverseProvider for PgStore {
    async fn codes(&self, asset_class: AssetClass) -> Result<Vec<String>> {
        let sql = format!(
            "SELECT DISTINCT code FROM {} ORDER BY code",
            asset_class.history_table()
        );
        let codes: Vec<String> = sqlx::query_scalar(&sql).fetch_all(&self.pool).await?;
        Ok(codes)
    }
}

#[async_trait]
impl CheckpointStore for PgStore {
    async fn save_checkpoint(
        &self,
        workflow: &str,
        last_code: &str,
        total_processed: i32,
        status: CheckpointStatus,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO sync_checkpoint (workflow_name, last_code, last_processed_at, total_processed, status, updated_at)
            VALUES ($1, $2, NOW(), $3, $4, NOW())
            ON CONFLICT (workflow_name)
            DO UPDATE SET
                last_code = EXCLUDED.last_code,
                last_processed_at = NOW(),
                total_processed = EXCLUDED.total_processed,
                status = EXCLUDED.status,
                updated_at = NOW()
            "#,
        )
        .bind(workflow)
        .bind(last_code)
        .bind(total_processed)
        .bind(status.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn load_checkpoint(&self, workflow: &str) -> Result<Option<String>> {
        let result: Option<(Option<String>,)> = sqlx::query_as(
            r#"
            SELECT last_code
            FROM sync_checkpoint
            WHERE workflow_name = $1 AND status = 'interrupted'
            "#,
        )
        .bind(workflow)
        .fetch_optional(&self.pool)
        .await?;

        Ok(result
            .and_then(|(code,)| code)
            .filter(|code| !code.is_empty()))
    }

    async fn mark_interrupted(&self, workflow: &str) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE sync_checkpoint
            SET status = 'interrupted', updated_at = NOW()
            WHERE workflow_name = $1 AND status = 'running'
            "#,
        )
        .bind(workflow)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn clear_checkpoint(&self, workflow: &str) -> Result<()> {
        sqlx::query("DELETE FROM sync_checkpoint WHERE workflow_name = $1")
            .bind(workflow)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_checkpoints(&self) -> Result<Vec<CheckpointInfo>> {
        let rows: Vec<(String, Option<String>, Option<DateTime<Utc>>, i32, String)> =
            sqlx::query_as(
                r#"
                SELECT workflow_name, last_code, last_processed_at, total_processed, status
                FROM sync_checkpoint
                ORDER BY workflow_name
                "#,
            )
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(
                |(workflow_name, last_code, last_processed_at, total_processed, status)|
                 -> Result<CheckpointInfo> {
                    Ok(CheckpointInfo {
                        workflow_name,
                        last_code,
                        last_processed_at,
                        total_processed,
                        status: status.parse()?,
                    })
                },
            )
            .collect()
    }
}
