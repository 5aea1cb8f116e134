//! Test harnesses for integration testing.
//!
//! `TestHarness` wires the in-memory store, mock collaborators and a manual
//! clock into a fresh `ServerDeps` per test. `PostgresHarness` runs against a
//! shared testcontainers Postgres; containers and migrations are initialized
//! once on first use, then reused.

use anyhow::{Context, Result};
use axum::Router;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use test_context::AsyncTestContext;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;
use tokio::task::JoinHandle;
use walks_core::common::Actor;
use walks_core::domains::walks::PostgresWalkStore;
use walks_core::kernel::{spawn_notification_dispatcher, BaseClock, ServerDeps, TestDependencies};
use walks_core::server::build_app;

fn init_tracing() {
    // Run tests with: RUST_LOG=debug cargo test -- --nocapture
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// In-memory test harness.
///
/// # Example using test-context
///
/// ```ignore
/// use test_context::test_context;
///
/// #[test_context(TestHarness)]
/// #[tokio::test]
/// async fn my_test(ctx: &TestHarness) {
///     let owner = ctx.owner();
///     // ... test code
/// }
/// ```
pub struct TestHarness {
    /// Mock collaborators, clock and store, for arranging and asserting.
    pub mocks: TestDependencies,
    /// What activities and the router see.
    pub deps: ServerDeps,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new()
    }

    async fn teardown(self) {}
}

impl TestHarness {
    pub fn new() -> Self {
        init_tracing();
        let mocks = TestDependencies::new();
        let deps = mocks.clone().into_server_deps();
        Self { mocks, deps }
    }

    /// Router over the same dependencies.
    pub fn app(&self) -> Router {
        build_app(self.deps.clone(), &[])
    }

    /// Bearer token for the given caller.
    pub fn token(&self, actor: &Actor) -> String {
        TestDependencies::jwt_service()
            .create_token(actor.member_id, actor.role)
            .expect("Failed to create test token")
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.mocks.clock.now()
    }

    pub fn advance(&self, by: Duration) {
        self.mocks.clock.advance(by);
    }

    /// Starts forwarding published events to the mock notifier.
    pub fn spawn_dispatcher(&self) -> JoinHandle<()> {
        spawn_notification_dispatcher(&self.deps.events, self.mocks.notifier.clone())
    }

    /// Wait for the notification dispatcher to drain.
    pub async fn settle(&self) {
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
    }
}

/// Shared test infrastructure that persists across all Postgres tests.
struct SharedTestInfra {
    db_url: String,
    // Keep the container alive for the entire test run
    _postgres: ContainerAsync<Postgres>,
}

/// Global shared infrastructure - initialized once, reused by all tests.
static SHARED_INFRA: OnceCell<SharedTestInfra> = OnceCell::const_new();

impl SharedTestInfra {
    async fn init() -> Result<Self> {
        init_tracing();

        let postgres = Postgres::default()
            .with_tag("16")
            .with_cmd(["-c", "max_connections=200"])
            .start()
            .await
            .context("Failed to start Postgres container")?;

        let pg_host = postgres.get_host().await?;
        let pg_port = postgres.get_host_port_ipv4(5432).await?;
        let db_url = format!(
            "postgresql://postgres:postgres@{}:{}/postgres",
            pg_host, pg_port
        );

        // Run migrations once on the shared database
        let pool = PgPool::connect(&db_url)
            .await
            .context("Failed to connect to Postgres for migrations")?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run migrations")?;

        Ok(Self {
            db_url,
            _postgres: postgres,
        })
    }

    async fn get() -> &'static Self {
        SHARED_INFRA
            .get_or_init(|| async {
                Self::init()
                    .await
                    .expect("Failed to initialize shared test infrastructure")
            })
            .await
    }
}

/// Harness backed by a real Postgres store. Needs Docker.
pub struct PostgresHarness {
    pub db_pool: PgPool,
    pub mocks: TestDependencies,
    pub deps: ServerDeps,
}

impl AsyncTestContext for PostgresHarness {
    async fn setup() -> Self {
        Self::new()
            .await
            .expect("Failed to create Postgres test harness")
    }

    async fn teardown(self) {
        // Database pool is automatically dropped
    }
}

impl PostgresHarness {
    pub async fn new() -> Result<Self> {
        let infra = SharedTestInfra::get().await;

        // Create a fresh pool for this test
        let db_pool = PgPool::connect(&infra.db_url)
            .await
            .context("Failed to connect to test database")?;

        let mocks = TestDependencies::new();
        let mut deps = mocks.clone().into_server_deps();
        deps.store = std::sync::Arc::new(PostgresWalkStore::new(db_pool.clone()));

        Ok(Self {
            db_pool,
            mocks,
            deps,
        })
    }
}

/// Access shared by both harnesses so fixtures work against either store.
pub trait HasDeps {
    fn deps(&self) -> &ServerDeps;
    fn mocks(&self) -> &TestDependencies;
}

impl HasDeps for TestHarness {
    fn deps(&self) -> &ServerDeps {
        &self.deps
    }

    fn mocks(&self) -> &TestDependencies {
        &self.mocks
    }
}

impl HasDeps for PostgresHarness {
    fn deps(&self) -> &ServerDeps {
        &self.deps
    }

    fn mocks(&self) -> &TestDependencies {
        &self.mocks
    }
}
