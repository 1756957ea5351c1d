mod admin;
mod dashboard;
mod feedback;
mod topics;
mod view;

use serde::Deserialize;

pub use admin::{health, reset};
pub use dashboard::{dashboard, topic_qr};
pub use feedback::{export_csv, list_feedback, submit_feedback};
pub use topics::{add_topic, list_topics};
pub use view::{index, load_stylesheet, stylesheet};

/// `?topic=` query. A missing topic deserializes as empty and is rejected by
/// topic validation with the usual message.
#[derive(Debug, Default, Deserialize)]
pub struct TopicParams {
    #[serde(default)]
    pub topic: String,
}
