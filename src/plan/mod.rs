//! Render output planning.

pub mod chapter;
pub mod outputs;

pub use chapter::next_chapter_number;
pub use outputs::{
    plan_outputs, ChapterId, Orientation, OrientationPlan, RenderPlan, RenderRoots,
};
