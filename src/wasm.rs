//! WebAssembly bindings
//!
//! Exposes conversion and preview to JavaScript. Errors are returned to the
//! caller as plain strings.

use wasm_bindgen::prelude::*;

use crate::{FileFormat, PipelineBuilder, UploadedFile};

/// Convert an uploaded file (as bytes) to the target format
///
/// # Arguments
/// * `name` - Original file name including its extension
/// * `bytes` - File content as a Uint8Array from JavaScript
/// * `target` - Target extension: "csv", "xlsx", "docx", "pptx" or "pdf"
///
/// # Returns
/// * Success: converted file content
/// * Error: error message string
#[wasm_bindgen]
pub fn convert_file(name: &str, bytes: &[u8], target: &str) -> Result<Vec<u8>, String> {
    let target = FileFormat::from_extension(target)
        .ok_or_else(|| format!("Unsupported target format: {}", target))?;

    let pipeline = PipelineBuilder::new()
        .build()
        .map_err(|e| format!("Failed to create pipeline: {}", e))?;

    let processed = pipeline
        .process(&UploadedFile::new(name, bytes))
        .map_err(|e| format!("Extraction error: {}", e))?;

    let converted = pipeline
        .convert(&processed.conversion_request(target))
        .map_err(|e| format!("Conversion error: {}", e))?;

    Ok(converted.bytes)
}

/// Name of the converted file for the given original name and target
#[wasm_bindgen]
pub fn output_file_name(name: &str, target: &str) -> Result<String, String> {
    let target = FileFormat::from_extension(target)
        .ok_or_else(|| format!("Unsupported target format: {}", target))?;
    Ok(target.output_file_name(name))
}

/// Render a preview of an uploaded file
#[wasm_bindgen]
pub fn preview_file(name: &str, bytes: &[u8]) -> Result<String, String> {
    let pipeline = PipelineBuilder::new()
        .build()
        .map_err(|e| format!("Failed to create pipeline: {}", e))?;

    let processed = pipeline
        .process(&UploadedFile::new(name, bytes))
        .map_err(|e| format!("Extraction error: {}", e))?;

    Ok(pipeline.preview(&processed).render())
}

/// Get version information
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
