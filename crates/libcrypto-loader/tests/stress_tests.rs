//! Concurrency tests for the load protocol.

use std::thread;

use libcrypto_loader::CANARY_SYMBOL;
use libcrypto_loader::prelude::*;
use libcrypto_loader_test_helpers::prelude::*;

const LIBCRYPTO: &str = "/opt/accp/lib/libcrypto.so";

#[test]
fn test_concurrent_calls_after_load_are_no_ops() {
    let linker = FakeLinker::new().with_image(LIBCRYPTO, &[CANARY_SYMBOL]);
    let config = LoaderConfig::default();
    let latch = LoadLatch::new();
    let orchestrator = LoadOrchestrator::new(&linker, &config).with_latch(&latch);

    let mut host = RecordingHost::new();
    assert_eq!(orchestrator.load(&mut host, Some(LIBCRYPTO)), LoadOutcome::Loaded);

    let outcomes: Vec<LoadOutcome> = thread::scope(|scope| {
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let orchestrator = &orchestrator;
                scope.spawn(move || {
                    let mut host = RecordingHost::new();
                    let outcome = orchestrator.load(&mut host, Some(LIBCRYPTO));
                    (outcome, host.pending().is_none())
                })
            })
            .collect();

        handles
            .into_iter()
            .filter_map(|handle| handle.join().ok())
            .map(|(outcome, clean)| {
                assert!(clean, "no exception expected");
                outcome
            })
            .collect()
    });

    assert_eq!(outcomes.len(), 16);
    assert!(outcomes.iter().all(|o| *o == LoadOutcome::AlreadyPresent));
    assert_eq!(linker.open_calls(), 1);
    assert!(latch.is_loaded());
}

#[cfg(unix)]
#[test]
fn test_concurrent_probes_do_not_cross_diagnostics() -> TestResult {
    let present = CanarySymbol::new("malloc")?;
    let absent = CanarySymbol::new("libcrypto_loader_stress_absent")?;

    thread::scope(|scope| {
        for i in 0..8 {
            let present = &present;
            let absent = &absent;
            scope.spawn(move || {
                let probe = SymbolProbe::new(SystemLinker::new());
                for _ in 0..200 {
                    if i % 2 == 0 {
                        assert!(probe.probe(present).is_resolved());
                    } else {
                        let result = probe.probe(absent);
                        assert!(
                            result
                                .diagnostic()
                                .is_some_and(|d| d.contains("libcrypto_loader_stress_absent"))
                        );
                    }
                }
            });
        }
    });
    Ok(())
}
