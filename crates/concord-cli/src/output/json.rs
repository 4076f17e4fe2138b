use concord_core::error::ConcordError;
use serde::Serialize;

pub fn print<T: Serialize + ?Sized>(value: &T) -> Result<(), ConcordError> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}
