use rxcheck_core::error::RxError;
use rxcheck_core::evaluate::CheckResult;

pub fn print(result: &CheckResult) -> Result<(), RxError> {
    let json = serde_json::to_string_pretty(result)?;
    println!("{json}");
    Ok(())
}
