use serde_json::Value;

/// Print the full computation envelope (raw figures, display figures,
/// warnings and metadata) as indented JSON.
pub fn print_envelope(envelope: &Value) {
    match serde_json::to_string_pretty(envelope) {
        Ok(text) => println!("{text}"),
        Err(e) => eprintln!("could not render result as JSON: {e}"),
    }
}
