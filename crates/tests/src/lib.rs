//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - 录制 → 处理 → 存储 → 重新加载 → TRC 的端到端测试
//! - 模拟数据源的异步采集测试

#[cfg(test)]
mod contract_tests {
    use contracts::{ConfigVersion, MotionStage, Subject};

    #[test]
    fn test_contracts_compile() {
        let _ = ConfigVersion::V1;
    }

    #[test]
    fn test_store_order_is_frozen() {
        assert_eq!(Subject::ALL, [Subject::Athlete, Subject::Trainer]);
        assert_eq!(
            MotionStage::ALL,
            [
                MotionStage::Raw,
                MotionStage::Interpolated,
                MotionStage::Filtered,
                MotionStage::Adjusted
            ]
        );
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{
        Frame, JointId, JointSample, MotionStage, ProcessingConfig, Subject,
    };
    use exporter::{Dispatcher, MotionStore, TrcWriter};
    use ingestion::{
        MockPoseConfig, MockPoseSource, PoseGenerator, PoseStream, Recorder, RecorderState,
        StreamConfig,
    };
    use motion_engine::{calculate_limb_lengths, CaptureSession, MotionPipeline};
    use nalgebra::Vector3;
    use skeleton::{
        kinect_rest_pose, BodyModel, FrontRule, JointHierarchy, JointNode, Landmarks, Limb,
        LimbTable,
    };

    /// R → A → B chain with limbs R->A and A->B
    fn rab_model() -> BodyModel {
        let hierarchy = JointHierarchy::new(vec![
            JointNode::root("R"),
            JointNode::new("A", Some(JointId::new(0)), None),
            JointNode::new("B", Some(JointId::new(1)), None),
        ])
        .unwrap();
        let limbs = LimbTable::new(
            vec![Limb::new(0u16, 1u16), Limb::new(1u16, 2u16)],
            &hierarchy,
        )
        .unwrap();
        BodyModel::new(
            "rab",
            hierarchy,
            limbs,
            vec![FrontRule::Generic; 3],
            Landmarks::default(),
        )
        .unwrap()
    }

    /// A->B stretches a little in every frame
    fn rab_joints(index: usize) -> Vec<JointSample> {
        let stretch = 1.0 + 0.05 * (index % 3) as f64;
        vec![
            JointSample::tracked(Vector3::new(0.0, 0.0, 0.0)),
            JointSample::tracked(Vector3::new(0.0, 1.0, 0.0)),
            JointSample::tracked(Vector3::new(0.0, 1.0 + stretch, 0.0)),
        ]
    }

    fn rab_config() -> ProcessingConfig {
        ProcessingConfig {
            delay_depth: 2,
            interpolation_step: 1.0,
            ..ProcessingConfig::default()
        }
    }

    /// One idle frame, toggle, five frames 1 s apart, toggle, D trailing
    /// frames, then the frame that finalizes.
    fn record_rab_take(recorder: &mut Recorder) -> contracts::MotionSequence {
        let depth = recorder.delay_depth();
        let mut index = 0;
        let mut feed = |recorder: &mut Recorder| {
            let out = recorder
                .add_frame(rab_joints(index), index as f64)
                .unwrap();
            index += 1;
            out
        };

        assert!(feed(recorder).finalized.is_none());
        recorder.toggle();
        for _ in 0..5 {
            assert!(feed(recorder).finalized.is_none());
        }
        recorder.toggle();
        for _ in 0..depth {
            assert!(feed(recorder).finalized.is_none());
        }
        let out = feed(recorder);
        assert_eq!(out.state, RecorderState::Idle);
        out.finalized.unwrap()
    }

    #[test]
    fn test_rab_recorder_scenario() {
        let config = rab_config();
        let mut recorder = Recorder::new(3, &config).unwrap();
        let raw = record_rab_take(&mut recorder);

        let depth = config.delay_depth;
        assert_eq!(raw.len(), depth + 5 + depth);
        let serials: Vec<i32> = raw.iter().map(|f| f.serial).collect();
        assert_eq!(serials, vec![-2, -1, 0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(raw[depth].timestamp, 0.0);
        assert!(raw[..depth].iter().all(|f| f.serial < 0 && f.timestamp < 0.0));
        assert!(raw.is_strictly_increasing());
        // One idle frame for a depth of two
        assert_eq!(recorder.stats().pre_roll_padded, 1);
    }

    #[test]
    fn test_rab_take_through_pipeline() {
        let model = Arc::new(rab_model());
        let config = rab_config();
        let mut recorder = Recorder::new(model.joint_count(), &config).unwrap();
        let raw = record_rab_take(&mut recorder);

        let processed = MotionPipeline::new(model.clone(), config)
            .process(Subject::Athlete, raw)
            .unwrap();
        let motions = &processed.motions;

        // 9 uniformly spaced raw frames: every stage ends up with the 5 recorded ones
        for stage in MotionStage::ALL {
            assert_eq!(motions.stage(stage).len(), 5, "{stage}");
        }
        let serials: Vec<i32> = motions.raw.iter().map(|f| f.serial).collect();
        assert_eq!(serials, vec![0, 1, 2, 3, 4]);

        let desired = processed.limbs_before.desired_lengths();
        for frame in motions.adjusted.iter() {
            let d = (frame.position(JointId::new(2)) - frame.position(JointId::new(1))).norm();
            assert!((d - desired[1]).abs() < 1e-9);
        }
        let after = calculate_limb_lengths(&motions.adjusted, model.limbs());
        assert!(after.gap_average < 1e-9);
    }

    #[test]
    fn test_e2e_capture_store_reload_trc() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().display();
        let toml = format!(
            r#"
[processing]
delay_depth = 4

[capture]
lead_in_s = 0.5
record_s = 1.5

[[sinks]]
name = "store"
sink_type = "store"
params = {{ path = "{root}/session.bin" }}

[[sinks]]
name = "trc"
sink_type = "trc"
params = {{ path = "{root}/{{subject}}.trc" }}

[[sinks]]
name = "sequences"
sink_type = "sequence_log"
params = {{ path = "{root}/sequences.txt" }}
"#
        );
        let blueprint = ConfigLoader::load_from_str(&toml, ConfigFormat::Toml).unwrap();
        let model = Arc::new(BodyModel::kinect_v2().unwrap());
        let mut dispatcher =
            Dispatcher::from_configs(&blueprint.sinks, &model, &blueprint.processing).unwrap();

        let mut session = CaptureSession::new(model.clone(), blueprint.processing.clone()).unwrap();
        let mut generator =
            PoseGenerator::new(MockPoseConfig::from(&blueprint.source), kinect_rest_pose());
        let capture = &blueprint.capture;

        let completed = loop {
            let sample = generator.next_sample();
            match session.recorder().state() {
                RecorderState::Idle if sample.timestamp >= capture.lead_in_s => {
                    session.start_recording(Subject::Athlete);
                }
                RecorderState::Recording
                    if sample.timestamp >= capture.lead_in_s + capture.record_s =>
                {
                    session.stop_recording();
                }
                _ => {}
            }
            if let Some(subject) = session.add_frame(sample).unwrap().completed {
                break subject;
            }
        };
        assert_eq!(completed, Subject::Athlete);

        let report = dispatcher.dispatch(completed, session.archive());
        assert!(report.is_success(), "failed sinks: {:?}", report.failed);
        assert_eq!(report.written, 3);
        dispatcher.flush().unwrap();

        // Store round trip is exact
        let reloaded = MotionStore::new(model.joint_count())
            .load(dir.path().join("session.bin"))
            .unwrap();
        assert_eq!(&reloaded, session.archive());
        assert!(reloaded.trainer.is_empty());

        // TRC of the adjusted stage: header, blank line, one row per frame
        let adjusted = &reloaded.athlete.adjusted;
        assert!(!adjusted.is_empty());
        let trc = std::fs::read_to_string(dir.path().join("athlete.trc")).unwrap();
        let lines: Vec<&str> = trc.lines().collect();
        assert_eq!(lines.len(), 6 + adjusted.len());
        assert!(lines[2].contains(&format!("\t{}\t26\tmm\t", adjusted.len())));

        let sequences = std::fs::read_to_string(dir.path().join("sequences.txt")).unwrap();
        assert!(sequences.starts_with("# generated "));
        assert!(sequences.contains("Adjusted"));

        // Rewriting the reloaded stage gives the same body as the sink wrote
        let mut rewritten = Vec::new();
        TrcWriter::new(&model, blueprint.processing.frame_rate())
            .write(&mut rewritten, "athlete.trc", adjusted)
            .unwrap();
        assert_eq!(String::from_utf8(rewritten).unwrap(), trc);
    }

    #[test]
    fn test_stage_lengths_follow_delay_depth() {
        let model = Arc::new(BodyModel::kinect_v2().unwrap());
        let depth = 3;
        let config = ProcessingConfig::with_delay_depth(depth);
        let mut recorder = Recorder::new(model.joint_count(), &config).unwrap();
        let mut generator = PoseGenerator::new(
            MockPoseConfig {
                timing_jitter: 0.0,
                ..MockPoseConfig::default()
            },
            kinect_rest_pose(),
        );

        let mut feed = |recorder: &mut Recorder| {
            let sample = generator.next_sample();
            recorder.add_frame(sample.joints, sample.timestamp).unwrap()
        };
        for _ in 0..depth {
            feed(&mut recorder);
        }
        recorder.toggle();
        for _ in 0..40 {
            feed(&mut recorder);
        }
        recorder.toggle();
        for _ in 0..depth {
            feed(&mut recorder);
        }
        let raw = feed(&mut recorder).finalized.unwrap();
        assert_eq!(raw.len(), 40 + 2 * depth);

        let processed = MotionPipeline::new(model, config)
            .process(Subject::Trainer, raw)
            .unwrap();
        // 40 recorded frames on the 30 Hz grid survive every stage
        for stage in MotionStage::ALL {
            assert_eq!(processed.motions.stage(stage).len(), 40, "{stage}");
        }
        assert!(processed.offsets.is_some());
        assert_eq!(processed.meta.subject, Subject::Trainer);
    }

    /// MockPoseSource → PoseStream → CaptureSession on the tokio runtime
    #[tokio::test]
    async fn test_e2e_live_mock_source() {
        let model = Arc::new(BodyModel::kinect_v2().unwrap());
        let config = ProcessingConfig::with_delay_depth(3);
        let source = MockPoseSource::new(
            "mock",
            MockPoseConfig {
                frequency_hz: 200.0,
                ..MockPoseConfig::default()
            },
            kinect_rest_pose(),
        );
        let mut stream = PoseStream::new(Box::new(source), StreamConfig::new(64));
        let rx = stream.take_receiver().unwrap();
        stream.start().unwrap();

        let mut session = CaptureSession::new(model, config).unwrap();
        let handle = tokio::spawn(async move {
            let mut consumed = 0usize;
            while let Ok(sample) = rx.recv().await {
                consumed += 1;
                match consumed {
                    10 => {
                        session.start_recording(Subject::Trainer);
                    }
                    60 => {
                        session.stop_recording();
                    }
                    _ => {}
                }
                if session.add_frame(sample).unwrap().completed.is_some() {
                    break;
                }
            }
            session
        });

        let session = tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("capture timed out")
            .unwrap();
        stream.stop();

        let trainer = session.archive().subject(Subject::Trainer);
        assert_eq!(trainer.raw.len(), 50);
        assert_eq!(trainer.raw[0].serial, 0);
        assert!(session.archive().athlete.is_empty());
        assert!(session.latest().is_some());
    }

    #[test]
    fn test_frame_lookup_for_playback() {
        let frames: contracts::MotionSequence =
            (0..11).map(|i| Frame::new(i, i as f64 * 0.1, vec![])).collect();
        assert_eq!(frames.frame_at_progress(50.0).map(|f| f.serial), Some(5));
    }
}
