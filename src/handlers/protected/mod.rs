// handlers/protected/mod.rs - Protected handlers (OAuth token required)
//
// Everything under /api/v1/classes. The gateway middleware has already
// validated the caller's token by the time these run.

pub mod classes;
pub mod exams;
pub mod utils;

pub use classes::create as class_create;
pub use classes::delete as class_delete;
pub use classes::get as class_get;
pub use classes::list as class_list;
pub use classes::patch as class_patch;
pub use classes::put as class_put;

pub use exams::create as exam_create;
pub use exams::delete as exam_delete;
pub use exams::get as exam_get;
pub use exams::list as exam_list;
pub use exams::patch as exam_patch;
pub use exams::put as exam_put;
