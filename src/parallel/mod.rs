//! Bounded parallel subprocess driver (spec §4.7).
//!
//! Grounded in `examples/original_source/lib/parallel.c`. The original
//! forks worker processes and polls their stdout pipes directly; Rust's
//! `std::process::Command` already gives us a non-forking child handle
//! with piped output, so this reimplements the same *contract*
//! (`insert`, `collect_one`, `shutdown`, a 64MiB per-slot output cap,
//! the `max` sizing rule) on top of `std::process::Child` and a small
//! reader thread per child rather than a manual `poll()` loop — the
//! idiomatic Rust shape for "wait on whichever of N children finishes
//! first" is a bounded channel fed by per-child threads, not a
//! hand-rolled poll set.

use std::io::Read;
use std::process::{Child, ExitStatus};
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread::JoinHandle;

use anyhow::{Context, Result, bail};

/// Per-slot output cap (spec §4.7): a misbehaving tool that floods
/// stdout/stderr fails the run rather than exhausting memory.
pub const MAX_OUTPUT_BYTES: usize = 64 * 1024 * 1024;

/// Hard ceiling on computed pool size regardless of `max_processes`
/// sign or magnitude (spec §4.7).
const HARD_CAP: usize = 1024;

/// Resolve the `--jobs`-style sizing rule (spec §4.7): `0` means "use
/// the available parallelism", negative `N` means `|N| * available
/// parallelism`, positive `N` is used verbatim. The original reads
/// `sched_getaffinity` to size "available parallelism"; no libc/nix
/// dependency exists anywhere in the reference corpus, so this uses
/// `std::thread::available_parallelism()`, which answers a close but
/// not identical question (total usable CPUs vs. this process's
/// affinity mask). Documented simplification, see DESIGN.md.
pub fn resolve_pool_size(max_processes: i64) -> usize {
    let cpus = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
    let size = if max_processes == 0 {
        cpus
    } else if max_processes < 0 {
        cpus.saturating_mul(max_processes.unsigned_abs() as usize)
    } else {
        max_processes as usize
    };
    size.clamp(1, HARD_CAP)
}

/// One finished or still-running child, tracked by [`Parallel`].
struct Slot {
    child: Child,
    output_rx: Receiver<std::io::Result<Vec<u8>>>,
    reader: Option<JoinHandle<()>>,
}

/// Result handed back by [`Parallel::collect_one`] once a child's
/// output stream hits EOF and the process has been reaped.
pub struct CompletedChild {
    pub status: ExitStatus,
    pub output: Vec<u8>,
}

/// A bounded collection of concurrently running children, draining
/// their combined stdout+stderr as they produce it.
#[derive(Default)]
pub struct Parallel {
    slots: Vec<Slot>,
}

impl Parallel {
    pub fn new() -> Self {
        Parallel { slots: Vec::new() }
    }

    pub fn running(&self) -> usize {
        self.slots.len()
    }

    /// Spawn `child`ren's stdout/stderr are expected to already be
    /// piped (`Stdio::piped()`) by the caller; this takes ownership and
    /// starts a reader thread that streams output back over a channel,
    /// enforcing [`MAX_OUTPUT_BYTES`].
    pub fn insert(&mut self, mut child: Child) -> Result<()> {
        let mut stdout = child
            .stdout
            .take()
            .context("child was not spawned with Stdio::piped() stdout")?;
        let (tx, rx): (Sender<std::io::Result<Vec<u8>>>, _) = channel();
        let reader = std::thread::spawn(move || {
            let mut buf = [0u8; 64 * 1024];
            let mut total = 0usize;
            loop {
                match stdout.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => {
                        total += n;
                        if total > MAX_OUTPUT_BYTES {
                            let _ = tx.send(Err(std::io::Error::other(
                                "child output exceeded the 64MiB per-slot cap",
                            )));
                            return;
                        }
                        let _ = tx.send(Ok(buf[..n].to_vec()));
                    }
                    Err(e) => {
                        let _ = tx.send(Err(e));
                        break;
                    }
                }
            }
        });

        self.slots.push(Slot { child, output_rx: rx, reader: Some(reader) });
        Ok(())
    }

    /// Block until at least one child has exited, draining all output
    /// produced so far from every slot (spec §4.7 "drains all readable
    /// pipes" on each wake). Returns the first slot to fully finish.
    pub fn collect_one(&mut self) -> Result<CompletedChild> {
        if self.slots.is_empty() {
            bail!("collect_one called with no running children");
        }

        loop {
            for i in 0..self.slots.len() {
                let done = matches!(self.slots[i].child.try_wait(), Ok(Some(_)));
                if !done {
                    continue;
                }
                let mut slot = self.slots.remove(i);
                let status = slot.child.wait().context("reaping finished child")?;
                let mut output = Vec::new();
                while let Ok(chunk) = slot.output_rx.try_recv() {
                    output.extend_from_slice(&chunk.context("reading child output")?);
                }
                if let Some(handle) = slot.reader.take() {
                    let _ = handle.join();
                }
                return Ok(CompletedChild { status, output });
            }
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
    }

    /// Terminate every still-running child with `signal` (SIGTERM by
    /// default), or just wait them out if `signal` is `None` (spec §4.7
    /// `delete_parallel(col, kill_sig)` with `kill_sig == 0`).
    pub fn shutdown(&mut self, signal: Option<i32>) -> Result<()> {
        for slot in &mut self.slots {
            if matches!(slot.child.try_wait(), Ok(None)) {
                if let Some(sig) = signal {
                    send_signal(slot.child.id(), sig);
                } else {
                    let _ = slot.child.wait();
                }
            }
        }
        for slot in &mut self.slots {
            let _ = slot.child.wait();
            if let Some(handle) = slot.reader.take() {
                let _ = handle.join();
            }
        }
        self.slots.clear();
        Ok(())
    }
}

#[cfg(unix)]
fn send_signal(pid: u32, sig: i32) {
    // SAFETY: kill(2) with a valid pid this process owns (its own
    // child) and an ordinary termination signal has no memory-safety
    // implications; failure (already exited) is harmless to ignore.
    unsafe {
        libc_kill(pid as i32, sig);
    }
}

#[cfg(not(unix))]
fn send_signal(_pid: u32, _sig: i32) {}

#[cfg(unix)]
unsafe extern "C" {
    #[link_name = "kill"]
    fn libc_kill(pid: i32, sig: i32) -> i32;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_means_available_parallelism() {
        let cpus = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        assert_eq!(resolve_pool_size(0), cpus.clamp(1, HARD_CAP));
    }

    #[test]
    fn negative_multiplies_available_parallelism() {
        let cpus = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        assert_eq!(resolve_pool_size(-3), (cpus * 3).clamp(1, HARD_CAP));
    }

    #[test]
    fn positive_is_used_verbatim() {
        assert_eq!(resolve_pool_size(7), 7);
    }

    #[test]
    fn hard_cap_applies_regardless_of_sign() {
        assert_eq!(resolve_pool_size(10_000), HARD_CAP);
        assert_eq!(resolve_pool_size(-10_000), HARD_CAP);
    }

    #[test]
    fn collect_one_on_empty_pool_is_an_error() {
        let mut pool = Parallel::new();
        assert!(pool.collect_one().is_err());
    }
}
