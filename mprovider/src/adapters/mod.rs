#[cfg(feature = "provider-bedrock")]
pub mod bedrock;
