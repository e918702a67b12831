//! End-to-end behaviour of the resolver and enrichment entry points,
//! driven through the public API with scripted providers.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use propgeo::config::FeatureConfig;
use propgeo::geocode::{
    AccessToken, AddressResolver, GeocodeProvider, ResponseCache, RetryPolicy, TokenIssuer,
    TokenManager,
};
use propgeo::{AmenityCatalog, AmenityRecord, Coordinate, GeocodeError, GeocodeSource};

fn init_logging() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}

const CITY_HALL: Coordinate = Coordinate {
    latitude: 37.5663,
    longitude: 126.9779,
};
const GANGNAM: Coordinate = Coordinate {
    latitude: 37.497175,
    longitude: 127.027926,
};

/// Provider backed by a fixed address table.
struct TableProvider {
    source: GeocodeSource,
    table: HashMap<String, Coordinate>,
    calls: AtomicUsize,
}

impl TableProvider {
    fn new(source: GeocodeSource, entries: &[(&str, Coordinate)]) -> Arc<Self> {
        Arc::new(Self {
            source,
            table: entries
                .iter()
                .map(|(address, coordinate)| (address.to_string(), *coordinate))
                .collect(),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GeocodeProvider for TableProvider {
    fn name(&self) -> &'static str {
        "table"
    }

    fn source(&self) -> GeocodeSource {
        self.source
    }

    async fn resolve(&self, address: &str) -> Result<Coordinate, GeocodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.table
            .get(address)
            .copied()
            .ok_or(GeocodeError::NoMatch)
    }
}

/// Issuer that counts how many tokens it has minted.
struct CountingIssuer {
    issued: AtomicUsize,
}

#[async_trait]
impl TokenIssuer for CountingIssuer {
    async fn issue(&self) -> Result<(String, DateTime<Utc>), GeocodeError> {
        let n = self.issued.fetch_add(1, Ordering::SeqCst);
        Ok((format!("token-{n}"), Utc::now() + chrono::Duration::hours(1)))
    }
}

/// Provider that rejects every token below a generation threshold, the way
/// a real service rejects a token that expired server-side.
struct TokenGatedProvider {
    tokens: Arc<TokenManager>,
    min_accepted_generation: u64,
    rejected_generation: AtomicU64,
}

#[async_trait]
impl GeocodeProvider for TokenGatedProvider {
    fn name(&self) -> &'static str {
        "token-gated"
    }

    fn source(&self) -> GeocodeSource {
        GeocodeSource::Sgis
    }

    async fn resolve(&self, _address: &str) -> Result<Coordinate, GeocodeError> {
        let token: AccessToken = self.tokens.valid_token().await?;
        if token.generation < self.min_accepted_generation {
            // Remember the generation that was rejected, never the ones
            // that worked, so refresh deduplication stays exact.
            self.rejected_generation
                .store(token.generation, Ordering::SeqCst);
            return Err(GeocodeError::Auth("token expired".to_string()));
        }
        Ok(CITY_HALL)
    }

    async fn refresh_credentials(&self) -> Result<(), GeocodeError> {
        self.tokens
            .force_refresh(self.rejected_generation.load(Ordering::SeqCst))
            .await
            .map(|_| ())
    }
}

fn resolver(providers: Vec<Arc<dyn GeocodeProvider>>) -> AddressResolver {
    AddressResolver::new(
        providers,
        Arc::new(ResponseCache::new(Duration::from_secs(60))),
        RetryPolicy::default(),
        4,
    )
    .unwrap()
}

#[tokio::test]
async fn failing_primary_falls_through_to_secondary_tag() {
    init_logging();

    let primary: Arc<dyn GeocodeProvider> = Arc::new(TokenGatedProvider {
        tokens: Arc::new(TokenManager::new(
            Arc::new(CountingIssuer {
                issued: AtomicUsize::new(0),
            }),
            chrono::Duration::seconds(60),
        )),
        // Unreachable threshold: the primary never accepts any token.
        min_accepted_generation: u64::MAX,
        rejected_generation: AtomicU64::new(0),
    });
    let secondary = TableProvider::new(GeocodeSource::Kakao, &[("123 Example Ave", CITY_HALL)]);

    let resolver = resolver(vec![primary, secondary.clone()]);
    let resolved = resolver.resolve("123 Example Ave").await.unwrap().unwrap();

    assert_eq!(resolved.source, GeocodeSource::Kakao);
    assert_eq!(secondary.calls(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_auth_failures_share_one_refresh() {
    init_logging();

    let issuer = Arc::new(CountingIssuer {
        issued: AtomicUsize::new(0),
    });
    let tokens = Arc::new(TokenManager::new(
        issuer.clone(),
        chrono::Duration::seconds(60),
    ));
    let provider: Arc<dyn GeocodeProvider> = Arc::new(TokenGatedProvider {
        tokens,
        // Generation 1 (the initial token) is "already expired server-side";
        // the refreshed generation 2 works.
        min_accepted_generation: 2,
        rejected_generation: AtomicU64::new(0),
    });

    let resolver = Arc::new(resolver(vec![provider]));

    // Distinct addresses so the cache cannot hide the concurrency.
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let resolver = Arc::clone(&resolver);
            tokio::spawn(async move { resolver.resolve(&format!("addr-{i}")).await.unwrap() })
        })
        .collect();

    for handle in handles {
        let resolved = handle.await.unwrap().expect("should resolve after refresh");
        assert_eq!(resolved.source, GeocodeSource::Sgis);
    }

    // One initial issue plus exactly one shared refresh.
    assert_eq!(issuer.issued.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn batch_then_enrich_shares_vectors_per_building() {
    init_logging();

    let provider = TableProvider::new(
        GeocodeSource::Sgis,
        &[("세종대로 110", CITY_HALL), ("테헤란로 152", GANGNAM)],
    );
    // Serial pool: each duplicate address must find its predecessor's cache
    // entry, making the network-call count exact.
    let resolver = AddressResolver::new(
        vec![provider.clone()],
        Arc::new(ResponseCache::new(Duration::from_secs(60))),
        RetryPolicy::default(),
        1,
    )
    .unwrap();

    // 100 transactions across two buildings, plus one dead address.
    let mut addresses = Vec::new();
    for i in 0..100 {
        addresses.push(
            if i % 2 == 0 {
                "세종대로 110"
            } else {
                "테헤란로 152"
            }
            .to_string(),
        );
    }
    addresses.push("없는 주소 123".to_string());

    let resolved = resolver.resolve_batch(&addresses).await;
    assert_eq!(resolved.len(), 101);
    assert!(resolved[100].is_none());
    // The cache collapses repeats: two real lookups plus the dead address.
    assert_eq!(provider.calls(), 3);

    let coords: Vec<Option<Coordinate>> = resolved
        .iter()
        .map(|r| r.as_ref().map(|r| r.coordinate))
        .collect();

    let catalogs = vec![AmenityCatalog::new(
        "transit",
        vec![AmenityRecord {
            latitude: 37.554648, // Seoul Station, ~1.3 km from city hall
            longitude: 126.972559,
            quality: 1.0,
            name: Some("서울역".to_string()),
        }],
    )];
    let features = propgeo::enrich_records(&coords, &catalogs, &FeatureConfig::default()).unwrap();

    // Every even record shares one vector, every odd record the other.
    let even = features[0].as_ref().unwrap();
    let odd = features[1].as_ref().unwrap();
    assert!(!Arc::ptr_eq(even, odd));
    for i in (2..100).step_by(2) {
        assert!(Arc::ptr_eq(even, features[i].as_ref().unwrap()));
        assert!(Arc::ptr_eq(odd, features[i + 1].as_ref().unwrap()));
    }
    assert!(features[100].is_none());

    // City hall is within the 2 km band of Seoul Station; Gangnam is not.
    assert_eq!(even.categories[0].counts, [0, 0, 1]);
    assert_eq!(odd.categories[0].counts, [0, 0, 0]);
    assert!(even.categories[0].nearest_distance_m.unwrap() < 2_000.0);
    assert!(odd.categories[0].nearest_distance_m.unwrap() > 2_000.0);
}
