use crate::timespan::TimeSpan;

/// Query input: the span of cycle time being asked about.
#[derive(Debug, Clone, Copy)]
pub struct State {
    pub span: TimeSpan,
}

impl State {
    pub fn new(span: TimeSpan) -> Self {
        State { span }
    }

    pub fn set_span(&self, span: TimeSpan) -> State {
        State { span }
    }
}
