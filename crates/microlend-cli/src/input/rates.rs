use serde_json::Value;
use tracing::debug;

use microlend_core::RateSchedule;

use super::file;

/// Rate schedule from `--rates <file>` (YAML or JSON) or `--preset <name>`.
/// Falls back to the standard schedule.
pub fn load_rates(
    path: Option<&str>,
    preset: Option<&str>,
) -> Result<RateSchedule, Box<dyn std::error::Error>> {
    let schedule = match (path, preset) {
        (Some(_), Some(_)) => return Err("--rates and --preset cannot be combined".into()),
        (Some(path), None) => {
            let (canonical, contents) = file::read_text(path)?;
            let is_yaml = canonical
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));
            let schedule: RateSchedule = if is_yaml {
                serde_yaml::from_str(&contents)
                    .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?
            } else {
                serde_json::from_str(&contents)
                    .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?
            };
            debug!(path = %canonical.display(), "loaded rate schedule");
            schedule
        }
        (None, Some(name)) => RateSchedule::preset(name)?,
        (None, None) => RateSchedule::standard(),
    };

    schedule.validate()?;
    Ok(schedule)
}

/// Insert `rates` into a JSON request unless the request carries its own.
pub fn apply_default_rates(
    mut request: Value,
    rates: &RateSchedule,
) -> Result<Value, Box<dyn std::error::Error>> {
    if let Value::Object(ref mut map) = request {
        if !map.contains_key("rates") {
            map.insert("rates".into(), serde_json::to_value(rates)?);
        }
    }
    Ok(request)
}
