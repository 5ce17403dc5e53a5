use crate::graph::{
    amplify::Amplify, gain::Gain, mix::Mix, node::GraphNode, through::Through,
};

pub trait NodeExt: GraphNode + Sized {
    fn amplify<M>(self, modulator: M) -> Amplify<Self, M> {
        Amplify::new(self, modulator)
    }

    fn through<F: GraphNode>(self, filter: F) -> Through<Self, F> {
        Through::new(self, filter)
    }

    fn mix<M: GraphNode>(self, source: M) -> Mix<Self, M> {
        Mix::new(self, source)
    }

    fn gain(self, gain: f32) -> Gain<Self> {
        Gain::new(self, gain)
    }
}

impl<T: GraphNode> NodeExt for T {}
