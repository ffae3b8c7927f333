use std::error::Error;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use courier_config::DatabaseConfig;
use courier_database::{
    initialize_database, AnyConnection, AnyPool, DatabaseConnection, TransactionCoordinator,
    TransactionError, UnitError,
};
use tempfile::TempDir;

type TestResult<T = ()> = Result<T, Box<dyn Error>>;

struct TestContext {
    _temp_dir: TempDir,
    connection: DatabaseConnection,
    coordinator: TransactionCoordinator,
}

impl TestContext {
    async fn new() -> TestResult<Self> {
        let temp_dir = TempDir::new()?;
        let db_path = temp_dir.path().join("unit_of_work.db");
        let config = DatabaseConfig {
            url: format!("sqlite://{}", db_path.display()),
            max_connections: 2,
            ..DatabaseConfig::default()
        };

        let connection = initialize_database(&config).await?;
        let coordinator = TransactionCoordinator::new(&connection);

        Ok(Self {
            _temp_dir: temp_dir,
            connection,
            coordinator,
        })
    }

    async fn chat_count(&self) -> TestResult<i64> {
        let pool: &AnyPool = self.connection.pool();
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM chats")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }
}

async fn insert_chat(
    unit: &mut courier_database::UnitOfWork,
    title: &str,
) -> Result<i64, sqlx::Error> {
    let conn: &mut AnyConnection = unit.connection();
    sqlx::query_scalar("INSERT INTO chats (title) VALUES ($1) RETURNING id")
        .bind(title)
        .fetch_one(conn)
        .await
}

#[tokio::test]
async fn successful_work_is_committed() -> TestResult {
    let ctx = TestContext::new().await?;

    let id = ctx
        .coordinator
        .run_unit("create", |mut unit| async move {
            let outcome = insert_chat(&mut unit, "general").await;
            (unit, outcome)
        })
        .await?;

    assert!(id > 0);
    assert_eq!(ctx.chat_count().await?, 1);
    Ok(())
}

#[tokio::test]
async fn failing_work_rolls_back_earlier_statements() -> TestResult {
    let ctx = TestContext::new().await?;

    let result: Result<(), UnitError<sqlx::Error>> = ctx
        .coordinator
        .run_unit("create", |mut unit| async move {
            let outcome = async {
                insert_chat(&mut unit, "first").await?;
                sqlx::query("INSERT INTO missing_table (id) VALUES (1)")
                    .execute(unit.connection())
                    .await?;
                Ok::<(), sqlx::Error>(())
            }
            .await;
            (unit, outcome)
        })
        .await;

    match result {
        Err(UnitError::Work { op, rollback, .. }) => {
            assert_eq!(op, "create");
            assert!(rollback.is_none());
        }
        other => panic!("expected work error, got {other:?}"),
    }
    assert_eq!(ctx.chat_count().await?, 0);
    Ok(())
}

#[tokio::test]
async fn dropped_unit_leaves_no_rows() -> TestResult {
    let ctx = TestContext::new().await?;

    let timed_out = tokio::time::timeout(
        Duration::from_millis(50),
        ctx.coordinator.run_unit("create", |mut unit| async move {
            let outcome = insert_chat(&mut unit, "abandoned").await;
            tokio::time::sleep(Duration::from_secs(5)).await;
            (unit, outcome)
        }),
    )
    .await;

    assert!(timed_out.is_err());
    assert_eq!(ctx.chat_count().await?, 0);
    Ok(())
}

#[tokio::test]
async fn work_never_runs_when_unit_cannot_begin() -> TestResult {
    let ctx = TestContext::new().await?;
    ctx.connection.pool().close().await;

    let ran = AtomicBool::new(false);
    let ran_flag = &ran;
    let result: Result<(), UnitError<sqlx::Error>> = ctx
        .coordinator
        .run_unit("delete", |unit| async move {
            ran_flag.store(true, Ordering::SeqCst);
            (unit, Ok(()))
        })
        .await;

    assert!(matches!(
        result,
        Err(UnitError::Transaction {
            op: "delete",
            source: TransactionError::Begin(_)
        })
    ));
    assert!(!ran.load(Ordering::SeqCst));
    Ok(())
}
