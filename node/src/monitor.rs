//! Periodic sync status reporting.
//!
//! The monitor only reads engine statistics. Reports are rendered on their own thread and
//! never overlap: a firing that comes in while a report is still being produced is skipped.
use std::fmt;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time;

use crossbeam_channel as chan;

use metier_common::chain::Chain;
use metier_common::engine::{Engine, Stats};

/// Time between two status reports.
pub const INTERVAL: time::Duration = time::Duration::from_secs(6);
/// Width of the numeric columns.
pub const COLUMN_WIDTH: usize = 10;

/// Layout of the status table.
#[derive(Debug, Clone)]
pub struct Table {
    chains: Vec<Chain>,
    name_width: usize,
}

impl Table {
    /// Create a table for the given chains. Rows are sorted by chain name, and the name
    /// column fits every supported chain.
    pub fn new(chains: impl IntoIterator<Item = Chain>) -> Self {
        let mut chains = chains.into_iter().collect::<Vec<_>>();
        chains.sort_by_key(|c| c.as_str());
        chains.dedup();

        let name_width = Chain::all().map(|c| c.as_str().len()).max().unwrap_or_default() + 2;

        Self { chains, name_width }
    }

    /// Chains in row order.
    pub fn chains(&self) -> &[Chain] {
        &self.chains
    }

    /// Width of a rendered line.
    pub fn width(&self) -> usize {
        self.name_width + COLUMN_WIDTH * 5
    }

    /// Table contents for the given statistics.
    pub fn report<'a>(&'a self, stats: &'a Stats) -> Report<'a> {
        Report { table: self, stats }
    }
}

/// A rendered status table.
pub struct Report<'a> {
    table: &'a Table,
    stats: &'a Stats,
}

impl<'a> fmt::Display for Report<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.table.name_width;
        let w = COLUMN_WIDTH;

        writeln!(
            f,
            "{:>n$}{:>w$}{:>w$}{:>w$}{:>w$}{:>w$}",
            " ", "peer ", "block ", "block", "cfilter", "sync "
        )?;
        writeln!(
            f,
            "{:>n$}{:>w$}{:>w$}{:>w$}{:>w$}{:>w$}",
            " ", "count", "headers", "chain", "chain ", "server"
        )?;

        for chain in self.table.chains.iter() {
            let status = self.stats.get(*chain);

            writeln!(
                f,
                "{:>n$}{:>w$}{:>w$}{:>w$}{:>w$}{:>w$}",
                chain.as_str(),
                status.peers,
                status.headers,
                status.blocks,
                status.filters,
                status.sync
            )?;
        }
        Ok(())
    }
}

/// Renders status reports from engine statistics.
pub struct Monitor<E> {
    engine: E,
    table: Table,
    busy: AtomicBool,
}

impl<E: Engine> Monitor<E> {
    /// Create a monitor for the given chains.
    pub fn new(engine: E, chains: impl IntoIterator<Item = Chain>) -> Self {
        Self {
            engine,
            table: Table::new(chains),
            busy: AtomicBool::new(false),
        }
    }

    /// The table layout.
    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Produce one report and hand it to `output`. Returns `false` without doing anything
    /// if another report is in progress.
    pub fn tick(&self, output: impl FnOnce(String)) -> bool {
        let Some(_busy) = Busy::acquire(&self.busy) else {
            log::debug!("Status report still in progress, skipping");
            return false;
        };
        let stats = self.engine.stats();
        let report = self.table.report(&stats).to_string();

        output(report);

        true
    }
}

/// Held while a report is in progress.
struct Busy<'a>(&'a AtomicBool);

impl<'a> Busy<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl<'a> Drop for Busy<'a> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Fires a monitor at a fixed interval on a background thread.
pub struct Scheduler {
    shutdown: chan::Sender<()>,
    thread: thread::JoinHandle<()>,
}

impl Scheduler {
    /// Start reporting. Each report is passed to `output`.
    ///
    /// The ticker holds at most one pending tick, so ticks that come due while a report is
    /// being written are dropped rather than queued up.
    pub fn spawn<E, O>(
        monitor: Arc<Monitor<E>>,
        interval: time::Duration,
        mut output: O,
    ) -> io::Result<Self>
    where
        E: Engine + 'static,
        O: FnMut(String) + Send + 'static,
    {
        let (shutdown, stop) = chan::bounded::<()>(1);
        let thread = thread::Builder::new()
            .name(String::from("monitor"))
            .spawn(move || {
                let ticker = chan::tick(interval);

                loop {
                    chan::select! {
                        recv(ticker) -> _ => {
                            monitor.tick(&mut output);
                        }
                        recv(stop) -> _ => break,
                    }
                }
                log::debug!("Monitor stopped");
            })?;

        Ok(Self { shutdown, thread })
    }

    /// Stop reporting and wait for the reporting thread to exit.
    pub fn shutdown(self) -> thread::Result<()> {
        self.shutdown.send(()).ok();
        self.thread.join()
    }
}
