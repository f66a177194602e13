//! 거래 가능 페어 목록.
//!
//! 처음 사용할 때 한 번 조회해 캐시하고, `refresh`로 명시적으로 갱신합니다.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use kgraph_core::Pair;
use kgraph_exchange::OhlcSource;

use crate::error::{LoadError, LoadResult};

/// 지연 로딩되는 페어 목록 캐시.
pub struct PairCatalog {
    source: Arc<dyn OhlcSource>,
    pairs: RwLock<Option<Arc<Vec<String>>>>,
}

impl PairCatalog {
    pub fn new(source: Arc<dyn OhlcSource>) -> Self {
        Self {
            source,
            pairs: RwLock::new(None),
        }
    }

    /// 페어 목록을 반환합니다. 캐시가 비어 있으면 조회합니다.
    ///
    /// 동시에 처음 호출되어도 데이터 소스 조회는 한 번만 일어납니다.
    pub async fn pairs(&self) -> LoadResult<Arc<Vec<String>>> {
        if let Some(pairs) = self.pairs.read().await.as_ref() {
            return Ok(Arc::clone(pairs));
        }

        let mut guard = self.pairs.write().await;
        if let Some(pairs) = guard.as_ref() {
            return Ok(Arc::clone(pairs));
        }

        let pairs = self.fetch().await?;
        *guard = Some(Arc::clone(&pairs));
        Ok(pairs)
    }

    /// 캐시를 무시하고 다시 조회합니다. 실패하면 기존 캐시를 유지합니다.
    pub async fn refresh(&self) -> LoadResult<Arc<Vec<String>>> {
        let pairs = self.fetch().await?;
        *self.pairs.write().await = Some(Arc::clone(&pairs));
        Ok(pairs)
    }

    /// 페어가 목록에 있는지 확인합니다.
    pub async fn contains(&self, pair: &Pair) -> LoadResult<bool> {
        let pairs = self.pairs().await?;
        Ok(pairs.iter().any(|p| p == pair.as_str()))
    }

    async fn fetch(&self) -> LoadResult<Arc<Vec<String>>> {
        match self.source.asset_pairs().await {
            Ok(pairs) => {
                info!(source = self.source.name(), count = pairs.len(), "페어 목록 조회");
                Ok(Arc::new(pairs))
            }
            Err(e) => {
                warn!(source = self.source.name(), error = %e, "페어 목록 조회 실패");
                Err(LoadError::CatalogUnavailable(e.to_string()))
            }
        }
    }
}
