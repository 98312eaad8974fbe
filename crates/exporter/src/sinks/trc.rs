//! TrcSink - exports one stage of the processed subject as TRC

use std::collections::HashMap;

use contracts::{ContractError, MotionArchive, MotionSink, MotionStage, Subject};
use skeleton::BodyModel;
use tracing::{instrument, warn};

use super::{ensure_parent, PathTemplate};
use crate::error::{self, ExportError};
use crate::trc::TrcWriter;

pub struct TrcSink {
    name: String,
    path: PathTemplate,
    stage: MotionStage,
    writer: TrcWriter,
}

impl TrcSink {
    pub fn new(
        name: impl Into<String>,
        path: PathTemplate,
        stage: MotionStage,
        writer: TrcWriter,
    ) -> Self {
        Self {
            name: name.into(),
            path,
            stage,
            writer,
        }
    }

    /// Params: `path`, optional `stage` (default `adjusted`), optional `rate`
    /// (default `default_rate`).
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
        model: &BodyModel,
        default_rate: f64,
    ) -> error::Result<Self> {
        let name = name.into();
        let path = PathTemplate::from_params(&name, params)?;
        let stage = match params.get("stage").map(String::as_str) {
            None => MotionStage::Adjusted,
            Some(value) => parse_stage(value)
                .ok_or_else(|| ExportError::sink_creation(&name, format!("unknown stage '{value}'")))?,
        };
        let rate = match params.get("rate") {
            None => default_rate,
            Some(value) => value
                .parse::<f64>()
                .ok()
                .filter(|r| r.is_finite() && *r > 0.0)
                .ok_or_else(|| ExportError::sink_creation(&name, format!("invalid rate '{value}'")))?,
        };
        Ok(Self::new(name, path, stage, TrcWriter::new(model, rate)))
    }

    pub fn stage(&self) -> MotionStage {
        self.stage
    }
}

fn parse_stage(value: &str) -> Option<MotionStage> {
    MotionStage::ALL
        .into_iter()
        .find(|stage| stage.as_str().eq_ignore_ascii_case(value))
}

impl MotionSink for TrcSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(name = "trc_sink_write", skip(self, archive), fields(sink = %self.name, subject = %subject, stage = %self.stage))]
    fn write(&mut self, subject: Subject, archive: &MotionArchive) -> Result<(), ContractError> {
        let frames = archive.subject(subject).stage(self.stage);
        if frames.is_empty() {
            warn!("nothing to export");
        }
        let path = self.path.resolve(subject);
        ensure_parent(&path)?;
        self.writer
            .write_file(&path, frames)
            .map_err(|e| e.into_sink_error(&self.name))
    }

    fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }
}
