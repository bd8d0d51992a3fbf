//! Cosmetic 2D overlay effects: blood splatter and timed glitches.

pub mod blood_splatter;
pub mod clock;
pub mod scheduler;
pub mod surface;
