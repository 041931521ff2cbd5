//! Runner semantics: setup ordering, failure isolation, artifacts.

use std::sync::Arc;

use parking_lot::Mutex;
use testbed_harness::artifacts::CaseArtifact;
use testbed_harness::prelude::*;
use testbed_memchain::{MemoryChain, MemoryChainBuilder};

fn chain(identities: usize) -> Arc<MemoryChain> {
    Arc::new(
        MemoryChainBuilder::new()
            .with_identity_count(identities)
            .with_default_balance(1_000)
            .with_seed(0xBEEF)
            .build(),
    )
}

#[tokio::test]
async fn setup_completes_before_cases_run_in_declaration_order() {
    let events: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

    let first_events = events.clone();
    let second_events = events.clone();
    let suite = Suite::new("ordering")
        .case("first", move |cx| {
            let events = first_events.clone();
            async move {
                // Setup already ran: signers provisioned, registry empty.
                assert!(!cx.accounts().is_empty());
                assert!(cx.contracts().is_empty());
                events.lock().push("first");
                Ok(())
            }
        })
        .case("second", move |cx| {
            let events = second_events.clone();
            async move {
                // Sibling wrote into the shared registry before us.
                cx.contracts().insert("marker", 1u8);
                events.lock().push("second");
                Ok(())
            }
        });

    let report = Runner::new(chain(3)).register(suite).run().await.unwrap();
    assert!(report.passed());
    assert_eq!(*events.lock(), vec!["first", "second"]);
}

#[tokio::test]
async fn failing_case_does_not_abort_siblings() {
    let suite = Suite::new("partial failure")
        .case("passes", |_cx| async { Ok(()) })
        .case("fails", |_cx| async {
            anyhow::bail!("balance mismatch")
        })
        .case("still runs", |_cx| async { Ok(()) });

    let report = Runner::new(chain(2)).register(suite).run().await.unwrap();

    assert!(!report.passed());
    assert_eq!(report.total_cases(), 3);
    assert!(report.suites[0].cases[0].passed());
    assert!(!report.suites[0].cases[1].passed());
    assert!(report.suites[0].cases[2].passed());

    let failures = report.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, "partial failure");
    assert_eq!(failures[0].1, "fails");
    assert!(failures[0].2.contains("balance mismatch"));
}

#[tokio::test]
async fn empty_identity_pool_aborts_the_run() {
    let suite: Suite<MemoryChain> =
        Suite::new("never runs").case("unreachable", |_cx| async { Ok(()) });

    let err = Runner::new(chain(0)).register(suite).run().await.unwrap_err();
    assert!(matches!(err, EnvironmentError::NoIdentities));
}

#[tokio::test]
async fn failure_artifact_is_written_with_seed() {
    let dir = tempfile::tempdir().unwrap();

    let suite: Suite<MemoryChain> = Suite::new("token unit tests")
        .case("mints to account", |_cx| async {
            anyhow::bail!("supply cap exceeded")
        });

    let report = Runner::new(chain(2))
        .register(suite)
        .with_artifact_dir(dir.path())
        .with_seed(0xBEEF)
        .run()
        .await
        .unwrap();
    assert!(!report.passed());

    let mut entries: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(entries.len(), 1);

    let raw = std::fs::read(entries.pop().unwrap()).unwrap();
    let artifact: CaseArtifact = serde_json::from_slice(&raw).unwrap();
    assert_eq!(artifact.suite, "token unit tests");
    assert_eq!(artifact.case, "mints to account");
    assert!(artifact.failure.contains("supply cap exceeded"));
    assert_eq!(artifact.seed, Some(0xBEEF));
}

#[tokio::test]
async fn runner_shares_one_fixture_cache_across_suites() {
    async fn count_me(env: Arc<MemoryChain>) -> anyhow::Result<u64> {
        // Each run deploys a contract, so the deployment counter tells us
        // how many times the factory actually executed.
        let deployer = env.identity_pool()[0].clone();
        let handle = env.deploy_contract(&deployer);
        env.storage_write(handle, "tag", 1)?;
        Ok(1)
    }

    let env = chain(2);
    let suite_a: Suite<MemoryChain> = Suite::new("a").case("loads", |cx| async move {
        cx.load_fixture(count_me).await?;
        Ok(())
    });
    let suite_b: Suite<MemoryChain> = Suite::new("b").case("loads again", |cx| async move {
        cx.load_fixture(count_me).await?;
        Ok(())
    });

    let runner = Runner::new(env).register(suite_a).register(suite_b);
    let report = runner.run().await.unwrap();

    assert!(report.passed(), "failures: {:?}", report.failures());
    assert_eq!(runner.fixtures().len(), 1, "both suites hit one cache entry");
}
