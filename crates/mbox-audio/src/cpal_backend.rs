//! Default-device output through cpal.
//!
//! Samples go through a lock-free ring: the session thread pushes with
//! [`CpalOutput::write_spin`], the device callback pops. A full ring blocks
//! the producer, which is what keeps the simulated 1 ms tick in step with
//! the sound card clock.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::traits::{AudioError, AudioOutput};

/// Ring capacity in milliseconds of audio. Short, so a button press is heard
/// promptly.
const RING_MS: usize = 50;

pub struct CpalOutput {
    device: Device,
    config: StreamConfig,
    stream: Option<Stream>,
    producer: HeapProd<i16>,
    consumer: Option<HeapCons<i16>>,
    running: Arc<AtomicBool>,
}

impl CpalOutput {
    /// Pick the default output device; the stream is not built yet.
    pub fn new() -> Result<Self, AudioError> {
        let device = cpal::default_host()
            .default_output_device()
            .ok_or(AudioError::NoDevice)?;
        let config: StreamConfig = device.default_output_config()?.into();

        let capacity = (config.sample_rate.0 as usize * RING_MS / 1000).max(64);
        let (producer, consumer) = HeapRb::<i16>::new(capacity).split();
        log::debug!(
            "audio: {} Hz, {} channels, {} sample ring",
            config.sample_rate.0,
            config.channels,
            capacity
        );

        Ok(Self {
            device,
            config,
            stream: None,
            producer,
            consumer: Some(consumer),
            running: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Open the default device with a built, running stream.
    pub fn open() -> Result<Self, AudioError> {
        let mut output = Self::new()?;
        output.build_stream()?;
        output.start()?;
        Ok(output)
    }

    /// Build the device stream around the ring's consumer half.
    pub fn build_stream(&mut self) -> Result<(), AudioError> {
        let Some(mut consumer) = self.consumer.take() else {
            return Err(AudioError::StreamCreate("stream already built".into()));
        };
        let running = self.running.clone();
        let channels = self.config.channels.max(1) as usize;

        let stream = self.device.build_output_stream(
            &self.config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                if !running.load(Ordering::Relaxed) {
                    data.fill(0.0);
                    return;
                }
                // mono buzzers: the same sample on every device channel
                for frame in data.chunks_mut(channels) {
                    let value = consumer.try_pop().map_or(0.0, |s| s as f32 / 32768.0);
                    frame.fill(value);
                }
            },
            |err| log::warn!("audio stream error: {}", err),
            None,
        )?;

        self.stream = Some(stream);
        Ok(())
    }

    /// Push one sample, spinning until the ring has room.
    pub fn write_spin(&mut self, sample: i16) {
        while self.producer.try_push(sample).is_err() {
            std::hint::spin_loop();
        }
    }
}

impl AudioOutput for CpalOutput {
    fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    fn write(&mut self, samples: &[i16]) -> Result<(), AudioError> {
        // without a stream nothing drains the ring and write_spin never returns
        if self.stream.is_none() || !self.running.load(Ordering::Relaxed) {
            return Err(AudioError::Playback("stream is not running".into()));
        }
        for &sample in samples {
            self.write_spin(sample);
        }
        Ok(())
    }

    fn start(&mut self) -> Result<(), AudioError> {
        if let Some(stream) = &self.stream {
            stream.play()?;
        }
        self.running.store(true, Ordering::Relaxed);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), AudioError> {
        self.running.store(false, Ordering::Relaxed);
        if let Some(stream) = &self.stream {
            stream.pause()?;
        }
        Ok(())
    }
}
