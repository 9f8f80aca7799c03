use std::cell::RefCell;
use std::rc::Rc;

/// Consumer of interleaved stereo `i16` frames.
///
/// The mixer hands over one full buffer at a time and polls
/// `queued_bytes` to pace itself against playback.
pub trait AudioSink {
    fn queue(&mut self, samples: &[i16]);

    /// Bytes accepted but not yet played.
    fn queued_bytes(&self) -> usize;
}

/// Discards everything; never applies backpressure.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl AudioSink for NullSink {
    fn queue(&mut self, _samples: &[i16]) {}

    fn queued_bytes(&self) -> usize {
        0
    }
}

/// Collects every queued sample in memory.
///
/// Clones share the same storage, so one handle can be given to the
/// machine and another kept to inspect the output.
#[derive(Clone, Debug, Default)]
pub struct VecSink {
    samples: Rc<RefCell<Vec<i16>>>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn samples(&self) -> Vec<i16> {
        self.samples.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.samples.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AudioSink for VecSink {
    fn queue(&mut self, samples: &[i16]) {
        self.samples.borrow_mut().extend_from_slice(samples);
    }

    fn queued_bytes(&self) -> usize {
        0
    }
}
