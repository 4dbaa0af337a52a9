//! First-reachable-wins probing over a fixed set of mirror nodes.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread;

use reqwest::blocking::Client;

use crate::fetch::operations::check_reachable;
use crate::fetch::types::{MirrorCandidate, Reachability};

/// Check candidates `0..total` concurrently and return the index of the
/// first one to answer with a success status, by completion order.
///
/// Each check runs on its own thread, so the worker ceiling equals `total`.
/// Once a winner is known the remaining checks are not awaited; checks that
/// have not started their request yet see the shared flag and skip it.
/// The per-check budget is whatever timeout `client` was built with.
pub fn find_reachable_mirror<F>(client: &Client, total: usize, build_url: F) -> Option<usize>
where
    F: Fn(usize) -> String,
{
    let found = Arc::new(AtomicBool::new(false));
    let (tx, rx) = mpsc::channel::<MirrorCandidate>();

    for index in 0..total {
        let mut candidate = MirrorCandidate::new(index, build_url(index));
        let client = client.clone();
        let found = Arc::clone(&found);
        let tx = tx.clone();

        let spawned = thread::Builder::new()
            .name(format!("mirror-probe-{}", index))
            .spawn(move || {
                if !found.load(Ordering::Acquire) {
                    candidate.reachable = if check_reachable(&client, &candidate.url) {
                        Reachability::Reachable
                    } else {
                        Reachability::Unreachable
                    };
                }
                // Receiver is gone once a winner was picked
                let _ = tx.send(candidate);
            });

        if let Err(e) = spawned {
            tracing::warn!("could not start probe for mirror {}: {}", index, e);
        }
    }
    drop(tx);

    for candidate in rx {
        tracing::debug!(
            "mirror {} finished: {:?}",
            candidate.index,
            candidate.reachable
        );
        if candidate.reachable == Reachability::Reachable {
            found.store(true, Ordering::Release);
            return Some(candidate.index);
        }
    }

    None
}
