//! Decode pipeline: the single source → generator → output chain.
//!
//! [`DecodePipeline`] is the seam the controller drives; [`Pipeline`] is the
//! reference implementation that dispatches on [`EntryKind`] to the WAV or
//! MP3 generator and writes PCM into an [`AudioOutput`].

use library::EntryKind;
use platform::storage::File;
use platform::{AudioOutput, Gain};

use crate::decoder::{DecodeError, Generator, PCM_BLOCK};
use crate::mp3_decoder::Mp3Generator;
use crate::wav::WavGenerator;

/// Exclusive decode/output resource owned by the playback controller.
///
/// `F` is the storage file handle type. `start` takes ownership of the handle
/// and `stop` closes it, so at most one source is ever open.
pub trait DecodePipeline<F: File> {
    /// Error returned when a generator refuses the stream
    type Error: core::fmt::Debug;

    /// Start decoding `source` with the generator for `kind`.
    ///
    /// Stops any previous stream first. On failure `source` is dropped
    /// (closed) and the pipeline is left stopped.
    async fn start(&mut self, source: F, kind: EntryKind) -> Result<(), Self::Error>;

    /// `true` while a stream is being decoded
    fn is_running(&self) -> bool;

    /// Decode and output one unit of work. `false` means end of stream or a
    /// fault; the pipeline is stopped in that case.
    async fn advance(&mut self) -> bool;

    /// Stop decoding and close the source. Idempotent.
    fn stop(&mut self);

    /// Apply `gain` to the output, effective immediately
    fn set_gain(&mut self, gain: Gain);
}

/// Capability-tagged generator chosen per entry.
enum KindGenerator {
    Wav(WavGenerator),
    Mp3(Mp3Generator),
}

impl KindGenerator {
    fn for_kind(kind: EntryKind) -> Self {
        match kind {
            EntryKind::Wav => Self::Wav(WavGenerator::new()),
            EntryKind::Mp3 => Self::Mp3(Mp3Generator::new()),
        }
    }
}

impl Generator for KindGenerator {
    async fn begin<F: File>(&mut self, source: &mut F) -> Result<platform::AudioConfig, DecodeError> {
        match self {
            Self::Wav(g) => g.begin(source).await,
            Self::Mp3(g) => g.begin(source).await,
        }
    }

    async fn advance<F: File>(&mut self, source: &mut F, out: &mut [i16]) -> Result<usize, DecodeError> {
        match self {
            Self::Wav(g) => g.advance(source, out).await,
            Self::Mp3(g) => g.advance(source, out).await,
        }
    }

    fn is_running(&self) -> bool {
        match self {
            Self::Wav(g) => g.is_running(),
            Self::Mp3(g) => g.is_running(),
        }
    }

    fn stop(&mut self) {
        match self {
            Self::Wav(g) => g.stop(),
            Self::Mp3(g) => g.stop(),
        }
    }
}

/// Reference pipeline writing decoded PCM to an [`AudioOutput`].
pub struct Pipeline<F, O> {
    output: O,
    source: Option<F>,
    generator: Option<KindGenerator>,
    pcm: [i16; PCM_BLOCK],
    gain: Gain,
}

impl<F: File, O: AudioOutput> Pipeline<F, O> {
    /// Idle pipeline in front of `output`.
    pub fn new(output: O) -> Self {
        Self {
            output,
            source: None,
            generator: None,
            pcm: [0; PCM_BLOCK],
            gain: Gain::default(),
        }
    }

    /// The audio sink
    pub fn output(&self) -> &O {
        &self.output
    }

    /// Gain last applied
    pub fn gain(&self) -> Gain {
        self.gain
    }
}

impl<F: File, O: AudioOutput> DecodePipeline<F> for Pipeline<F, O> {
    type Error = DecodeError;

    async fn start(&mut self, mut source: F, kind: EntryKind) -> Result<(), Self::Error> {
        self.stop();
        let mut generator = KindGenerator::for_kind(kind);
        let config = generator.begin(&mut source).await?;
        self.output.configure(config);
        self.output.set_gain(self.gain);
        self.source = Some(source);
        self.generator = Some(generator);
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.generator.as_ref().is_some_and(Generator::is_running)
    }

    async fn advance(&mut self) -> bool {
        let (Some(generator), Some(source)) = (self.generator.as_mut(), self.source.as_mut()) else {
            return false;
        };
        let produced = match generator.advance(source, &mut self.pcm).await {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!("pipeline: decode error: {}", e);
                0
            }
        };
        if produced == 0 {
            self.stop();
            return false;
        }
        let block = self.pcm.get(..produced).unwrap_or(&[]);
        if let Err(e) = self.output.write_samples(block).await {
            tracing::warn!("pipeline: output error: {:?}", e);
            self.stop();
            return false;
        }
        true
    }

    fn stop(&mut self) {
        if let Some(generator) = self.generator.as_mut() {
            generator.stop();
        }
        self.generator = None;
        // Dropping the handle closes the file.
        self.source = None;
    }

    fn set_gain(&mut self, gain: Gain) {
        self.gain = gain;
        self.output.set_gain(gain);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::wav::wav_bytes;
    use platform::mocks::{MockAudio, MockFile, MockStorage};
    use platform::{OpenMode, Storage};

    async fn open(storage: &mut MockStorage, path: &str) -> MockFile {
        storage.open_file(path, OpenMode::Read).await.unwrap()
    }

    #[tokio::test]
    async fn test_wav_plays_to_completion() {
        let mut storage = MockStorage::new();
        storage.add_file("/a.wav", &wav_bytes(44_100, 2, &[100; 5000]));
        let mut pipeline: Pipeline<MockFile, MockAudio> = Pipeline::new(MockAudio::new());

        let file = open(&mut storage, "/a.wav").await;
        pipeline.start(file, EntryKind::Wav).await.unwrap();
        assert!(pipeline.is_running());
        assert_eq!(pipeline.output().config.unwrap().channels, 2);

        let mut units = 0;
        while pipeline.advance().await {
            units += 1;
        }
        assert!(units > 1);
        assert!(!pipeline.is_running());
        assert_eq!(pipeline.output().samples_written, 5000);
    }

    #[tokio::test]
    async fn test_wrong_kind_fails_to_start() {
        let mut storage = MockStorage::new();
        storage.add_file("/fake.mp3", &wav_bytes(44_100, 2, &[0; 4]));
        let mut pipeline: Pipeline<MockFile, MockAudio> = Pipeline::new(MockAudio::new());
        let file = open(&mut storage, "/fake.mp3").await;
        assert_eq!(pipeline.start(file, EntryKind::Mp3).await, Err(DecodeError::InvalidData));
        assert!(!pipeline.is_running());
        assert!(!pipeline.advance().await);
    }

    #[tokio::test]
    async fn test_gain_reaches_output() {
        let mut pipeline: Pipeline<MockFile, MockAudio> = Pipeline::new(MockAudio::new());
        pipeline.set_gain(Gain::new(0.4));
        assert_eq!(pipeline.output().gain, Some(Gain::new(0.4)));
        assert_eq!(pipeline.gain(), Gain::new(0.4));
    }

    #[tokio::test]
    async fn test_gain_scales_written_samples() {
        let mut storage = MockStorage::new();
        storage.add_file("/a.wav", &wav_bytes(8_000, 1, &[1000; 64]));
        let mut pipeline: Pipeline<MockFile, MockAudio> = Pipeline::new(MockAudio::new());
        pipeline.set_gain(Gain::new(0.5));
        pipeline.start(open(&mut storage, "/a.wav").await, EntryKind::Wav).await.unwrap();
        while pipeline.advance().await {}
        assert_eq!(pipeline.output().samples_written, 64);
        assert_eq!(pipeline.output().peak, 500);
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let mut storage = MockStorage::new();
        storage.add_file("/a.wav", &wav_bytes(8_000, 1, &[1; 10]));
        let mut pipeline: Pipeline<MockFile, MockAudio> = Pipeline::new(MockAudio::new());
        pipeline.start(open(&mut storage, "/a.wav").await, EntryKind::Wav).await.unwrap();
        pipeline.stop();
        pipeline.stop();
        assert!(!pipeline.is_running());
    }
}
