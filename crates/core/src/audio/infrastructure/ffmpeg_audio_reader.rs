use std::path::Path;

use ffmpeg_next::software::resampling;
use ffmpeg_next::util::frame::audio::Audio;

use crate::audio::domain::audio_reader::AudioReader;
use crate::audio::domain::audio_segment::AudioSegment;

/// Decodes any audio file ffmpeg understands (WAV, FLAC, MP3, ...) into a
/// mono segment at the requested sample rate.
///
/// Multi-channel input is downmixed by the resampler rather than reduced to
/// its first channel.
pub struct FfmpegAudioReader;

impl AudioReader for FfmpegAudioReader {
    fn read_audio(
        &self,
        path: &Path,
        target_sample_rate: u32,
    ) -> Result<Option<AudioSegment>, Box<dyn std::error::Error>> {
        if target_sample_rate == 0 {
            return Err("Target sample rate must be positive".into());
        }
        ffmpeg_next::init()?;

        let mut ictx = ffmpeg_next::format::input(path)?;
        let (stream_index, parameters) = match ictx.streams().best(ffmpeg_next::media::Type::Audio)
        {
            Some(stream) => (stream.index(), stream.parameters()),
            None => return Ok(None),
        };

        let mut decoder = ffmpeg_next::codec::context::Context::from_parameters(parameters)?
            .decoder()
            .audio()?;
        let source_rate = decoder.rate();

        let mut resampler = resampling::Context::get(
            decoder.format(),
            decoder.channel_layout(),
            source_rate,
            ffmpeg_next::format::Sample::F32(ffmpeg_next::format::sample::Type::Planar),
            ffmpeg_next::ChannelLayout::MONO,
            target_sample_rate,
        )?;

        let mut samples: Vec<f32> = Vec::new();
        for (stream, packet) in ictx.packets() {
            if stream.index() == stream_index {
                decoder.send_packet(&packet)?;
                drain_decoder(&mut decoder, &mut resampler, &mut samples)?;
            }
        }

        decoder.send_eof()?;
        drain_decoder(&mut decoder, &mut resampler, &mut samples)?;

        // The resampler may still hold a partial block.
        let mut tail = Audio::empty();
        if let Ok(Some(delay)) = resampler.flush(&mut tail) {
            if delay.output > 0 {
                append_mono_samples(&tail, &mut samples);
            }
        }

        let segment = AudioSegment::new(samples, target_sample_rate, 1);
        log::debug!(
            "Decoded {} ({source_rate} Hz) to {:.2}s at {target_sample_rate} Hz",
            path.display(),
            segment.duration()
        );
        Ok(Some(segment))
    }
}

fn drain_decoder(
    decoder: &mut ffmpeg_next::codec::decoder::Audio,
    resampler: &mut resampling::Context,
    out: &mut Vec<f32>,
) -> Result<(), ffmpeg_next::Error> {
    let mut decoded = Audio::empty();
    let mut resampled = Audio::empty();
    while decoder.receive_frame(&mut decoded).is_ok() {
        resampler.run(&decoded, &mut resampled)?;
        append_mono_samples(&resampled, out);
    }
    Ok(())
}

/// Appends the samples of a planar mono f32 frame.
fn append_mono_samples(frame: &Audio, out: &mut Vec<f32>) {
    let count = frame.samples();
    if count == 0 {
        return;
    }
    let data = frame.data(0);
    let floats = unsafe { std::slice::from_raw_parts(data.as_ptr() as *const f32, count) };
    out.extend_from_slice(floats);
}
