use std::path::Path;

use anyhow::Result;
use midly::{
    num::{u15, u24, u28, u4, u7},
    Format, Header, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
};

use crate::render::{EventKind, RenderedEvent};

/// Ticks per quarter note in MIDI output.
const TICKS_PER_QUARTER: u16 = 480;

/// Playback tempo for the rendered score.
const TEMPO_BPM: u32 = 120;

/// Write rendered voices as a Standard MIDI File (Format 1, one track per
/// voice plus a tempo track).
pub fn write_voices(voices: &[Vec<RenderedEvent>], path: &Path) -> Result<()> {
    let smf = voices_to_smf(voices);
    let mut buf = Vec::new();
    smf.write(&mut buf).map_err(anyhow::Error::msg)?;
    std::fs::write(path, &buf)?;
    Ok(())
}

fn voices_to_smf(voices: &[Vec<RenderedEvent>]) -> Smf<'static> {
    let mut smf = Smf::new(Header::new(
        Format::Parallel,
        Timing::Metrical(u15::new(TICKS_PER_QUARTER)),
    ));

    let mut tempo_track: Track<'static> = Vec::new();
    tempo_track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(midly::MetaMessage::Tempo(u24::new(
            60_000_000 / TEMPO_BPM,
        ))),
    });
    tempo_track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(midly::MetaMessage::EndOfTrack),
    });
    smf.tracks.push(tempo_track);

    const VOICE_NAMES: [&str; 3] = ["Voice 1", "Voice 2", "Voice 3"];

    for (vi, voice) in voices.iter().enumerate() {
        let channel = u4::new((vi % 16) as u8);
        let mut track: Track<'static> = Vec::new();

        if let Some(name) = VOICE_NAMES.get(vi) {
            track.push(TrackEvent {
                delta: u28::new(0),
                kind: TrackEventKind::Meta(midly::MetaMessage::TrackName(name.as_bytes())),
            });
        }

        let mut current_tick: u32 = 0;
        let mut last_event_tick: u32 = 0;

        for event in voice {
            let ticks = (event.quarter_len * TICKS_PER_QUARTER as f64).round() as u32;
            if let EventKind::Note { pitch, velocity } = event.kind {
                let key = u7::new(pitch.clamp(0, 127) as u8);
                track.push(TrackEvent {
                    delta: u28::new(current_tick - last_event_tick),
                    kind: TrackEventKind::Midi {
                        channel,
                        message: MidiMessage::NoteOn {
                            key,
                            vel: u7::new(velocity.min(127)),
                        },
                    },
                });
                track.push(TrackEvent {
                    delta: u28::new(ticks),
                    kind: TrackEventKind::Midi {
                        channel,
                        message: MidiMessage::NoteOff {
                            key,
                            vel: u7::new(0),
                        },
                    },
                });
                last_event_tick = current_tick + ticks;
            }
            current_tick += ticks;
        }

        track.push(TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(midly::MetaMessage::EndOfTrack),
        });
        smf.tracks.push(track);
    }

    smf
}
