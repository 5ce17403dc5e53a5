//! Turn a `CueSpec` into a finite render graph.

use crate::{
    cue::spec::{CueSpec, CueTexture, EnvelopeShape},
    graph::{
        envelope::EnvNode, extensions::NodeExt, filter::FilterNode, node::GraphNode,
        oscillator::OscNode,
    },
};

fn envelope(shape: &EnvelopeShape) -> EnvNode {
    EnvNode::cue(shape.attack, shape.release, shape.peak, shape.floor)
}

/// Build the voice for a cue. The voice is silent until `note_on`, and
/// reports inactive once every envelope in it has finished.
pub fn build_voice(spec: &CueSpec) -> Box<dyn GraphNode> {
    let filter = FilterNode::lowpass(spec.cutoff_hz).with_q(spec.q);

    match spec.texture {
        CueTexture::Wind { noise } => {
            let tone = OscNode::new(spec.waveform)
                .sweep(spec.start_hz, spec.end_hz, spec.duration)
                .through(filter)
                .amplify(envelope(&spec.envelope));

            // Breath noise bypasses the filter
            let breath = OscNode::noise()
                .with_length(noise.length)
                .gain(noise.level)
                .amplify(envelope(&noise.envelope));

            Box::new(tone.mix(breath))
        }
        CueTexture::Chime {
            ratio,
            partial_gain,
        } => {
            let fundamental = OscNode::new(spec.waveform).with_frequency(spec.start_hz);
            let partial = OscNode::new(spec.waveform)
                .with_frequency(spec.start_hz * ratio)
                .gain(partial_gain);

            Box::new(
                fundamental
                    .mix(partial)
                    .through(filter)
                    .amplify(envelope(&spec.envelope)),
            )
        }
    }
}
