//! Frame input record shared between the input collaborator and the simulation.
//!
//! Each scalar lives in its own atomic and every access is `Relaxed`. A reader
//! can observe fields from different writes (pointer from one event, pressed
//! flag from the next); only the latest value of each field matters, so this
//! is acceptable. A single field can never be torn.

use std::sync::atomic::{AtomicU32, Ordering::Relaxed};

use glam::Vec2;

/// Plain copy of the frame input taken at the start of a frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameInput {
    /// Elapsed time of the current frame in seconds
    pub dt: f32,
    pub pointer: Vec2,
    pub pointer_pressed: bool,
    pub width: f32,
    pub height: f32,
}

impl FrameInput {
    pub fn surface(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

#[derive(Debug, Default)]
struct AtomicF32(AtomicU32);

impl AtomicF32 {
    fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Relaxed))
    }

    fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Relaxed);
    }
}

/// Six-field frame input record, written in place and read without locking.
#[derive(Debug, Default)]
pub struct SharedFrameInput {
    dt: AtomicF32,
    pointer_x: AtomicF32,
    pointer_y: AtomicF32,
    pointer_pressed: AtomicF32,
    width: AtomicF32,
    height: AtomicF32,
}

impl SharedFrameInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(
        &self,
        dt: f32,
        pointer_x: f32,
        pointer_y: f32,
        pointer_pressed: bool,
        width: f32,
        height: f32,
    ) {
        self.set_dt(dt);
        self.set_pointer(pointer_x, pointer_y);
        self.set_pressed(pointer_pressed);
        self.set_surface(width, height);
    }

    pub fn set_dt(&self, dt: f32) {
        self.dt.store(dt);
    }

    pub fn set_pointer(&self, x: f32, y: f32) {
        self.pointer_x.store(x);
        self.pointer_y.store(y);
    }

    pub fn set_pressed(&self, pressed: bool) {
        self.pointer_pressed.store(if pressed { 1.0 } else { 0.0 });
    }

    pub fn set_surface(&self, width: f32, height: f32) {
        self.width.store(width);
        self.height.store(height);
    }

    /// Read all six fields. Fields may come from different writes.
    pub fn snapshot(&self) -> FrameInput {
        FrameInput {
            dt: self.dt.load(),
            pointer: Vec2::new(self.pointer_x.load(), self.pointer_y.load()),
            pointer_pressed: self.pointer_pressed.load() != 0.0,
            width: self.width.load(),
            height: self.height.load(),
        }
    }
}
