//! Audio generation: voice-cloned TTS per line and ffmpeg mixing.

mod mixer;
mod pipeline;
mod tts;

pub use mixer::{concat_list, concat_to_mp3, generate_silence, write_concat_list};
pub use pipeline::{mix_clips, resolve_speaker_wavs, speakable_lines, AudioPipeline, Clip, SpeakableLine};
pub use tts::{CoquiTts, SpeechSynthesizer};
