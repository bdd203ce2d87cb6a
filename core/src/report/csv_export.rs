use crate::error::CoreResult;
use crate::trigger::Violation;

/// Renders violations in evaluation order as CSV with LF line endings.
pub fn render_violations_csv(image_id: &str, violations: &[Violation]) -> CoreResult<String> {
    let mut wtr = csv::WriterBuilder::new().from_writer(vec![]);
    wtr.write_record(["gate", "trigger", "image_id", "message"])?;
    for v in violations {
        wtr.write_record([
            v.gate.as_str(),
            v.trigger.as_str(),
            image_id,
            v.message.as_str(),
        ])?;
    }
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).replace("\r\n", "\n"))
}
