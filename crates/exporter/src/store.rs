//! Binary motion store.
//!
//! bincode 1.x default encoding (fixed-width integers, little endian). A
//! sequence is its `u64` frame count followed by the frames; an archive file
//! is eight sequences, subjects in [`Subject::ALL`] order and stages in
//! [`MotionStage::ALL`] order within each subject.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use contracts::{MotionArchive, MotionSequence, MotionStage, Subject};
use tracing::{debug, info, instrument};

use crate::error::{ExportError, Result};

/// Append one sequence to `writer`.
pub fn write_sequence<W: Write>(writer: &mut W, sequence: &MotionSequence) -> Result<()> {
    bincode::serialize_into(writer, sequence)?;
    Ok(())
}

/// Read the next sequence from `reader`.
pub fn read_sequence<R: Read>(reader: &mut R) -> Result<MotionSequence> {
    Ok(bincode::deserialize_from(reader)?)
}

/// Archive file reader/writer bound to a joint count.
#[derive(Debug, Clone, Copy)]
pub struct MotionStore {
    joint_count: usize,
}

impl MotionStore {
    pub fn new(joint_count: usize) -> Self {
        Self { joint_count }
    }

    pub fn joint_count(&self) -> usize {
        self.joint_count
    }

    pub fn write_archive<W: Write>(&self, writer: &mut W, archive: &MotionArchive) -> Result<()> {
        for subject in Subject::ALL {
            let motions = archive.subject(subject);
            for stage in MotionStage::ALL {
                write_sequence(writer, motions.stage(stage))?;
            }
        }
        Ok(())
    }

    /// # Errors
    /// Fails on truncated input or a frame whose joint count differs from the store's.
    pub fn read_archive<R: Read>(&self, reader: &mut R) -> Result<MotionArchive> {
        let mut archive = MotionArchive::default();
        for subject in Subject::ALL {
            for stage in MotionStage::ALL {
                let sequence = read_sequence(reader)?;
                self.check(subject, stage, &sequence)?;
                debug!(%subject, %stage, frames = sequence.len(), "sequence loaded");
                *archive.subject_mut(subject).stage_mut(stage) = sequence;
            }
        }
        Ok(archive)
    }

    #[instrument(name = "motion_store_save", skip(self, archive), fields(path = %path.as_ref().display()))]
    pub fn save(&self, path: impl AsRef<Path>, archive: &MotionArchive) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        self.write_archive(&mut writer, archive)?;
        writer.flush()?;
        info!(
            athlete = archive.athlete.raw.len(),
            trainer = archive.trainer.raw.len(),
            "archive saved"
        );
        Ok(())
    }

    #[instrument(name = "motion_store_load", skip(self), fields(path = %path.as_ref().display()))]
    pub fn load(&self, path: impl AsRef<Path>) -> Result<MotionArchive> {
        let mut reader = BufReader::new(File::open(path.as_ref())?);
        let archive = self.read_archive(&mut reader)?;
        info!(longest_raw = archive.longest_raw_len(), "archive loaded");
        Ok(archive)
    }

    fn check(&self, subject: Subject, stage: MotionStage, sequence: &MotionSequence) -> Result<()> {
        match sequence.iter().find(|f| f.joints.len() != self.joint_count) {
            Some(frame) => Err(ExportError::JointCount {
                subject,
                stage,
                serial: frame.serial,
                expected: self.joint_count,
                actual: frame.joints.len(),
            }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Frame, JointSample, TrackingState};
    use nalgebra::{UnitQuaternion, Vector3};
    use std::io::Cursor;
    use tempfile::tempdir;

    fn sequence(len: usize, joints: usize) -> MotionSequence {
        (0..len)
            .map(|i| {
                let t = i as f64 / 30.0 - 0.1;
                let samples = (0..joints)
                    .map(|j| {
                        JointSample::new(
                            Vector3::new(t, j as f64 * 0.1, 2.0 + t * t),
                            UnitQuaternion::from_euler_angles(0.1 * t, 0.2 * j as f64, -0.3),
                            if j % 3 == 0 {
                                TrackingState::Inferred
                            } else {
                                TrackingState::Tracked
                            },
                        )
                    })
                    .collect();
                Frame::new(i as i32 - 3, t, samples)
            })
            .collect()
    }

    #[test]
    fn test_sequence_layout() {
        let seq = sequence(2, 1);
        let mut bytes = Vec::new();
        write_sequence(&mut bytes, &seq).unwrap();

        // count + 2 × (serial + timestamp + joint count + 3 + 4 doubles + state)
        assert_eq!(bytes.len(), 8 + 2 * (4 + 8 + 8 + 7 * 8 + 4));
        assert_eq!(&bytes[..8], &2u64.to_le_bytes());
        assert_eq!(&bytes[8..12], &(-3i32).to_le_bytes());
        // tracking state of the single joint: Inferred = 1
        assert_eq!(&bytes[8 + 76..8 + 80], &1u32.to_le_bytes());
    }

    #[test]
    fn test_sequence_round_trip_is_exact() {
        let seq = sequence(5, 4);
        let mut bytes = Vec::new();
        write_sequence(&mut bytes, &seq).unwrap();
        write_sequence(&mut bytes, &MotionSequence::new()).unwrap();

        let mut cursor = Cursor::new(bytes);
        assert_eq!(read_sequence(&mut cursor).unwrap(), seq);
        assert!(read_sequence(&mut cursor).unwrap().is_empty());
        assert!(read_sequence(&mut cursor).is_err());
    }

    #[test]
    fn test_archive_save_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sequences.bin");

        let mut archive = MotionArchive::default();
        archive.athlete.raw = sequence(6, 3);
        archive.athlete.adjusted = sequence(4, 3);
        archive.trainer.filtered = sequence(2, 3);

        let store = MotionStore::new(3);
        store.save(&path, &archive).unwrap();
        let loaded = store.load(&path).unwrap();
        assert_eq!(loaded, archive);
        assert!(loaded.trainer.raw.is_empty());
    }

    #[test]
    fn test_load_rejects_wrong_joint_count() {
        let mut archive = MotionArchive::default();
        archive.trainer.interpolated = sequence(2, 3);
        let mut bytes = Vec::new();
        MotionStore::new(3).write_archive(&mut bytes, &archive).unwrap();

        let err = MotionStore::new(25)
            .read_archive(&mut Cursor::new(bytes))
            .unwrap_err();
        assert!(matches!(
            err,
            ExportError::JointCount {
                subject: Subject::Trainer,
                stage: MotionStage::Interpolated,
                expected: 25,
                actual: 3,
                ..
            }
        ));
    }

    #[test]
    fn test_truncated_file_fails() {
        let mut archive = MotionArchive::default();
        archive.athlete.raw = sequence(3, 2);
        let mut bytes = Vec::new();
        MotionStore::new(2).write_archive(&mut bytes, &archive).unwrap();
        bytes.truncate(bytes.len() / 2);

        assert!(matches!(
            MotionStore::new(2).read_archive(&mut Cursor::new(bytes)),
            Err(ExportError::Encoding(_))
        ));
    }
}
