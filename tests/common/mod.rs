#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use ruleflow::{FactLookup, Value};

pub const ADVANCED_EXAMPLE: &str = r#"
// Media pipeline
notification_service: "Twilio"

if file size > 10 and uploaded to S3 == true then process image using ImageMagick
    then store metadata using PostgreSQL
    then send notification using notification_service
else then store original file
    then log file size

/* Order tracking */
when order status to "shipped" then send tracking email using SendGrid
    then update inventory count
    then trigger analytics event
"#;

pub fn facts(entries: &[(&str, Value)]) -> Arc<dyn FactLookup> {
    Arc::new(
        entries
            .iter()
            .map(|(attribute, value)| (attribute.to_string(), value.clone()))
            .collect::<HashMap<_, _>>(),
    )
}

pub fn upload_facts(size: i64) -> Arc<dyn FactLookup> {
    facts(&[
        ("file size", Value::Integer(size)),
        ("uploaded to S3", Value::Boolean(true)),
    ])
}
