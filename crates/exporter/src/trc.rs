//! TRC marker trajectory export.
//!
//! Tab separated text: five header lines, a blank line, then one row per frame
//! with every marker's X/Y/Z in millimetres. Joints become markers in id
//! order; `HipsMid` (hip midpoint) is appended when the model knows both hips.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use contracts::{Frame, JointId};
use nalgebra::Vector3;
use skeleton::BodyModel;
use tracing::{info, instrument};

use crate::error::Result;

const MM_PER_M: f64 = 1000.0;

#[derive(Debug, Clone)]
enum Marker {
    Joint(JointId),
    Midpoint(JointId, JointId),
}

impl Marker {
    fn position(&self, frame: &Frame) -> Vector3<f64> {
        match self {
            Self::Joint(id) => frame.position(*id),
            Self::Midpoint(a, b) => (frame.position(*a) + frame.position(*b)) / 2.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TrcWriter {
    rate: f64,
    markers: Vec<(String, Marker)>,
}

impl TrcWriter {
    /// Writer for `model`'s joints at `rate` frames per second.
    pub fn new(model: &BodyModel, rate: f64) -> Self {
        let hierarchy = model.hierarchy();
        let mut markers: Vec<(String, Marker)> = hierarchy
            .ids()
            .map(|id| (hierarchy.name_of(id).to_string(), Marker::Joint(id)))
            .collect();
        if let Some((left, right)) = model.landmarks().hips() {
            markers.push(("HipsMid".to_string(), Marker::Midpoint(left, right)));
        }
        Self { rate, markers }
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn marker_names(&self) -> impl Iterator<Item = &str> {
        self.markers.iter().map(|(name, _)| name.as_str())
    }

    /// `file_name` only appears in the header's first line.
    pub fn write<W: Write>(&self, out: &mut W, file_name: &str, frames: &[Frame]) -> Result<()> {
        let rate = format_number(self.rate);
        let count = frames.len();

        writeln!(out, "PathFileType\t4\t(X / Y / Z)\t{file_name}")?;
        writeln!(
            out,
            "DataRate\tCameraRate\tNumFrames\tNumMarkers\tUnits\tOrigDataRate\tOrigDataStartFrame\tOrigNumFrames"
        )?;
        writeln!(
            out,
            "{rate}\t{rate}\t{count}\t{}\tmm\t{rate}\t1\t{count}",
            self.markers.len()
        )?;

        write!(out, "Frame#\tTime")?;
        for (name, _) in &self.markers {
            write!(out, "\t{name}\t\t")?;
        }
        writeln!(out)?;

        write!(out, "\t")?;
        for n in 1..=self.markers.len() {
            write!(out, "\tX{n}\tY{n}\tZ{n}")?;
        }
        writeln!(out)?;
        writeln!(out)?;

        for (index, frame) in frames.iter().enumerate() {
            write!(out, "{index}\t{:.6}", frame.timestamp)?;
            for (_, marker) in &self.markers {
                let p = marker.position(frame) * MM_PER_M;
                write!(out, "\t{:.3}\t{:.3}\t{:.3}", p.x, p.y, p.z)?;
            }
            writeln!(out)?;
        }
        Ok(())
    }

    #[instrument(name = "trc_export", skip(self, frames), fields(path = %path.as_ref().display(), frames = frames.len()))]
    pub fn write_file(&self, path: impl AsRef<Path>, frames: &[Frame]) -> Result<()> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut out = BufWriter::new(File::create(path)?);
        self.write(&mut out, &file_name, frames)?;
        out.flush()?;
        info!(markers = self.markers.len(), "trc written");
        Ok(())
    }
}

/// Integral rates print without a fraction (`30`, not `30.0`).
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
