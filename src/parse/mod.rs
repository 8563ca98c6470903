pub mod ics;
pub mod plan_json;
pub mod plan_text;
pub mod time;

pub use ics::serialize_ics;
pub use plan_json::{parse_plan_json, serialize_plan_json};
pub use plan_text::{parse_plan_text, serialize_plan_text};
pub use time::{end_time, minutes_to_time, time_to_minutes};
