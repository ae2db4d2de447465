//! The live stream: a background generation thread feeding a bounded
//! ring that the consumer drains at its own pace.
//!
//! The generation thread owns the ring producer and the voice. Transition
//! state is shared behind a mutex so parameter updates and status queries
//! see whole parameter sets. Reads never wait on generation: whatever is
//! queued is returned and the remainder is filled with silence.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use cz_ir::MusicParameters;
use parking_lot::Mutex;
use ringbuf::traits::{Consumer, Observer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};
use tracing::{debug, info, warn};

use crate::config::LiveConfig;
use crate::error::{LiveError, Result};
use crate::transition::Transition;
use crate::voice::LiveVoice;

struct Shared {
    transition: Mutex<Transition>,
    stop: AtomicBool,
    running: AtomicBool,
}

struct Worker {
    thread: JoinHandle<()>,
    exited: Receiver<()>,
}

/// Handle to a live stream. Dropping it stops the generation thread.
pub struct LiveStream {
    config: LiveConfig,
    shared: Arc<Shared>,
    consumer: HeapCons<f32>,
    /// Present until `start` hands it to the generation thread.
    pending: Option<(HeapProd<f32>, LiveVoice)>,
    worker: Option<Worker>,
    /// Samples handed out by reads, silence included.
    delivered: u64,
}

impl LiveStream {
    /// Build a stream for `params`. Nothing is generated until [`start`].
    ///
    /// [`start`]: LiveStream::start
    pub fn new(params: MusicParameters, config: LiveConfig) -> Result<Self> {
        config.validate()?;
        params.validate()?;
        let seed = config.seed.unwrap_or_else(rand::random);
        let voice = LiveVoice::new(&params, seed, config.sample_rate);
        let (producer, consumer) = HeapRb::<f32>::new(config.capacity()).split();
        debug!(seed, watermark = config.watermark(), "live stream created");

        Ok(Self {
            config,
            shared: Arc::new(Shared {
                transition: Mutex::new(Transition::new(params)),
                stop: AtomicBool::new(false),
                running: AtomicBool::new(false),
            }),
            consumer,
            pending: Some((producer, voice)),
            worker: None,
            delivered: 0,
        })
    }

    /// Spawn the generation thread. A stream can be started once.
    pub fn start(&mut self) -> Result<()> {
        let (producer, voice) = self.pending.take().ok_or(LiveError::AlreadyStarted)?;
        let (exit_tx, exited) = bounded(1);
        let shared = self.shared.clone();
        let config = self.config;

        shared.running.store(true, Ordering::Release);
        let spawned = std::thread::Builder::new()
            .name("cz-live-gen".into())
            .spawn(move || generation_loop(shared, producer, voice, config, exit_tx));
        let thread = match spawned {
            Ok(thread) => thread,
            Err(e) => {
                self.shared.running.store(false, Ordering::Release);
                return Err(LiveError::Spawn(e));
            }
        };

        self.worker = Some(Worker { thread, exited });
        info!(sample_rate = self.config.sample_rate, "live stream started");
        Ok(())
    }

    /// Signal the generation thread to exit and wait up to the configured
    /// timeout. The thread is released either way.
    pub fn stop(&mut self) -> Result<()> {
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };
        self.shared.stop.store(true, Ordering::Release);

        match worker.exited.recv_timeout(self.config.stop_timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                let _ = worker.thread.join();
                info!(delivered = self.delivered, "live stream stopped");
                Ok(())
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!(timeout = ?self.config.stop_timeout, "generation thread did not stop in time");
                Err(LiveError::StopTimeout(self.config.stop_timeout))
            }
        }
    }

    /// Move toward `target` over `transition_seconds`, replacing any
    /// transition in flight.
    pub fn update_parameters(&self, target: MusicParameters, transition_seconds: f64) -> Result<()> {
        target.validate()?;
        debug!(tempo = target.tempo, mood = ?target.mood, transition_seconds, "live update");
        self.shared.transition.lock().update(target, transition_seconds);
        Ok(())
    }

    /// Fill `out` with the oldest queued samples, padding with silence.
    /// Returns how many samples came from the queue. Never blocks and
    /// never allocates.
    pub fn read_into(&mut self, out: &mut [f32]) -> usize {
        let n = self.consumer.pop_slice(out);
        out[n..].fill(0.0);
        self.delivered += out.len() as u64;
        n
    }

    /// Read exactly `count` samples.
    pub fn read(&mut self, count: usize) -> Vec<f32> {
        let mut out = vec![0.0; count];
        self.read_into(&mut out);
        out
    }

    /// Samples currently queued.
    pub fn buffered(&self) -> usize {
        self.consumer.occupied_len()
    }

    /// Seconds of audio handed out by reads so far, silence included.
    pub fn current_time_seconds(&self) -> f64 {
        self.delivered as f64 / self.config.sample_rate as f64
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    pub fn effective_parameters(&self) -> MusicParameters {
        self.shared.transition.lock().effective()
    }

    pub fn current_parameters(&self) -> MusicParameters {
        self.shared.transition.lock().current().clone()
    }

    pub fn is_transitioning(&self) -> bool {
        self.shared.transition.lock().is_transitioning()
    }

    /// Seconds of progress into the running transition.
    pub fn transition_progress(&self) -> f64 {
        self.shared.transition.lock().progress()
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }
}

impl Drop for LiveStream {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

fn generation_loop(
    shared: Arc<Shared>,
    mut producer: HeapProd<f32>,
    mut voice: LiveVoice,
    config: LiveConfig,
    exit_tx: Sender<()>,
) {
    let watermark = config.watermark();
    let mut note: Vec<f32> = Vec::new();
    let mut cursor = 0;

    while !shared.stop.load(Ordering::Acquire) {
        let effective = {
            let mut transition = shared.transition.lock();
            if transition.advance(config.tick_seconds) {
                let committed = transition.current();
                info!(tempo = committed.tempo, mood = ?committed.mood, "live parameters committed");
                voice.retune(committed);
            }
            transition.effective()
        };

        let mut busy = false;
        if cursor == note.len() && producer.occupied_len() < watermark {
            voice.render_next(&effective, &mut note);
            cursor = 0;
            busy = true;
        }
        if cursor < note.len() {
            let pushed = producer.push_slice(&note[cursor..]);
            cursor += pushed;
            busy |= pushed > 0;
        }
        if !busy {
            std::thread::sleep(config.idle_sleep);
        }
    }

    shared.running.store(false, Ordering::Release);
    let _ = exit_tx.send(());
}
