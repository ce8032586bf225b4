// src/checker/batch.rs
// =============================================================================
// The batch scheduler: runs every probe, a fixed-size batch at a time.
//
// How it works:
// 1. Launch the transport's session once (e.g. the shared browser client)
// 2. Split the URLs into consecutive batches (10 by default)
// 3. For each batch, start all probes at once and wait for every one of them
// 4. Only then move on to the next batch
// 5. Close the session once, after the last batch
//
// Results are collected in the order probes finish, not input order. The
// printer sorts them anyway.
//
// Rust concepts:
// - chunks(): Splits a slice into batches without copying
// - FuturesUnordered: Polls many futures at once, yields as they complete
// - Generics: The progress writer can be stdout or a Vec<u8> in tests
// =============================================================================

use anyhow::{Context, Result};
use futures::stream::{FuturesUnordered, StreamExt};
use std::io::Write;
use tracing::{debug, info, info_span, Instrument};

use super::fetch::{Session, Transport};
use super::probe::{ProbeResult, Prober};
use crate::report::Progress;

pub const DEFAULT_BATCH_SIZE: usize = 10;

pub struct BatchScheduler {
    batch_size: usize,
    prober: Prober,
}

impl BatchScheduler {
    pub fn new(batch_size: usize, prober: Prober) -> Self {
        Self {
            // A batch of zero would never make progress
            batch_size: batch_size.max(1),
            prober,
        }
    }

    pub fn batch_count(&self, urls: usize) -> usize {
        urls.div_ceil(self.batch_size)
    }

    /// Probes every URL and returns the results in completion order.
    ///
    /// Only a failure to launch the session is an error. Individual probe
    /// failures show up as status 0.
    pub async fn run_all<W: Write + Send>(
        &self,
        transport: &dyn Transport,
        urls: Vec<String>,
        progress: &Progress<W>,
    ) -> Result<Vec<ProbeResult>> {
        if urls.is_empty() {
            return Ok(Vec::new());
        }

        let session = transport
            .launch()
            .await
            .with_context(|| format!("failed to launch {} session", transport.name()))?;

        let results = self.run_batches(&*session, &urls, progress).await;

        // Close on every path out of the batches
        session.close().await;
        progress.finish();
        debug!(checked = progress.completed(), "all batches settled");

        Ok(results)
    }

    async fn run_batches<W: Write + Send>(
        &self,
        session: &dyn Session,
        urls: &[String],
        progress: &Progress<W>,
    ) -> Vec<ProbeResult> {
        let batches = self.batch_count(urls.len());
        let mut results = Vec::with_capacity(urls.len());

        for (number, batch) in urls.chunks(self.batch_size).enumerate() {
            let number = number + 1;
            progress.batch_started(number, batches);

            let span = info_span!("batch", number, size = batch.len());
            let finished = self
                .run_batch(session, batch, progress)
                .instrument(span)
                .await;
            info!(number, batches, probed = finished.len(), "batch settled");

            results.extend(finished);
        }

        results
    }

    async fn run_batch<W: Write + Send>(
        &self,
        session: &dyn Session,
        batch: &[String],
        progress: &Progress<W>,
    ) -> Vec<ProbeResult> {
        let mut in_flight: FuturesUnordered<_> = batch
            .iter()
            .enumerate()
            .map(|(slot, url)| self.prober.probe(session, url.clone(), slot))
            .collect();

        let mut finished = Vec::with_capacity(batch.len());
        while let Some(result) = in_flight.next().await {
            debug!(url = %result.url, status = result.status, "link checked");
            progress.tick();
            finished.push(result);
        }
        finished
    }
}
