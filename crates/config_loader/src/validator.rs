//! 配置校验模块
//!
//! 校验规则：
//! - delay_depth >= 1
//! - interpolation_step 为有限正数
//! - min_limb_length 为有限非负数
//! - frequency_hz > 0, timing_jitter ∈ [0, 1)
//! - 录制时长 > 0, 通道容量 >= 1
//! - sink 名称非空且唯一, 必填参数齐全

use std::collections::HashSet;

use contracts::{CaptureBlueprint, ContractError};

/// 校验 CaptureBlueprint 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(blueprint: &CaptureBlueprint) -> Result<(), ContractError> {
    validate_processing(blueprint)?;
    validate_capture(blueprint)?;
    validate_source(blueprint)?;
    validate_sinks(blueprint)?;
    Ok(())
}

fn positive(field: &str, value: f64) -> Result<(), ContractError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ContractError::config_validation(
            field,
            format!("must be a finite number > 0, got {value}"),
        ))
    }
}

fn non_negative(field: &str, value: f64) -> Result<(), ContractError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ContractError::config_validation(
            field,
            format!("must be a finite number >= 0, got {value}"),
        ))
    }
}

/// 校验处理参数
fn validate_processing(blueprint: &CaptureBlueprint) -> Result<(), ContractError> {
    let processing = &blueprint.processing;
    if processing.delay_depth == 0 {
        return Err(ContractError::config_validation(
            "processing.delay_depth",
            "delay_depth must be >= 1",
        ));
    }
    positive("processing.interpolation_step", processing.interpolation_step)?;
    non_negative("processing.min_limb_length", processing.min_limb_length)?;
    Ok(())
}

/// 校验采集流程
fn validate_capture(blueprint: &CaptureBlueprint) -> Result<(), ContractError> {
    let capture = &blueprint.capture;
    non_negative("capture.lead_in_s", capture.lead_in_s)?;
    positive("capture.record_s", capture.record_s)?;
    if capture.channel_capacity == 0 {
        return Err(ContractError::config_validation(
            "capture.channel_capacity",
            "channel_capacity must be >= 1",
        ));
    }
    Ok(())
}

/// 校验数据源
fn validate_source(blueprint: &CaptureBlueprint) -> Result<(), ContractError> {
    let source = &blueprint.source;
    positive("source.frequency_hz", source.frequency_hz)?;
    non_negative("source.timing_jitter", source.timing_jitter)?;
    if source.timing_jitter >= 1.0 {
        return Err(ContractError::config_validation(
            "source.timing_jitter",
            format!("timing_jitter must be < 1, got {}", source.timing_jitter),
        ));
    }
    non_negative("source.sway_amplitude", source.sway_amplitude)?;
    non_negative("source.position_noise", source.position_noise)?;
    Ok(())
}

/// 校验 sink 配置
fn validate_sinks(blueprint: &CaptureBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, sink) in blueprint.sinks.iter().enumerate() {
        if sink.name.is_empty() {
            return Err(ContractError::config_validation(
                format!("sinks[{idx}].name"),
                "sink name cannot be empty",
            ));
        }
        if !seen.insert(sink.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("sinks[name={}]", sink.name),
                "duplicate sink name",
            ));
        }
        for param in sink.sink_type.required_params() {
            let present = sink.params.get(*param).is_some_and(|v| !v.is_empty());
            if !present {
                return Err(ContractError::config_validation(
                    format!("sinks[{}].params.{param}", sink.name),
                    format!("{:?} sink requires '{param}'", sink.sink_type),
                ));
            }
        }
    }
    Ok(())
}
