//! End-to-end pipeline runs against the scripted service double.

use ecoledger_pipeline::{
    NullServices, Orchestrator, PipelineError, PipelineStage, RecordedCall, RunEvent,
};
use ecoledger_types::{EvidenceFile, IotPayload, Score, VerificationInput};

fn base_input() -> VerificationInput {
    VerificationInput {
        ngo_id: "ngo-001".into(),
        project_id: "proj-001".into(),
        project_name: "Sundarbans restoration".into(),
        claimed_trees: 50,
        audit_check: Score::clamped(0.85),
        tree_image: EvidenceFile::new("drone.jpg", vec![0xff, 0xd8, 0x01]),
        ndvi_image: None,
        multispectral: false,
        iot_data: None,
        price_per_credit: 25.0,
    }
}

#[tokio::test]
async fn successful_run_calls_every_stage_once() {
    let mut orch = Orchestrator::new(NullServices::healthy());
    let report = orch.run(&base_input()).await.unwrap();

    assert_eq!(report.tree.tree_count, 45);
    assert!(report.credits_issued());

    let calls = orch.services().calls();
    let detect = calls
        .iter()
        .filter(|c| matches!(c, RecordedCall::DetectTrees { .. }))
        .count();
    let ndvi = calls
        .iter()
        .filter(|c| matches!(c, RecordedCall::AnalyzeNdvi { .. }))
        .count();
    let iot = calls
        .iter()
        .filter(|c| matches!(c, RecordedCall::ScoreIot { .. }))
        .count();
    let co2 = calls
        .iter()
        .filter(|c| matches!(c, RecordedCall::EstimateCo2 { .. }))
        .count();
    let score = calls
        .iter()
        .filter(|c| matches!(c, RecordedCall::FinalScore { .. }))
        .count();
    let submit = calls
        .iter()
        .filter(|c| matches!(c, RecordedCall::SubmitReport { .. }))
        .count();
    assert_eq!(
        (detect, ndvi, iot, co2, score, submit),
        (1, 1, 1, 1, 1, 1)
    );
}

#[tokio::test]
async fn co2_request_carries_exact_detected_count() {
    let mut orch = Orchestrator::new(NullServices::healthy().with_tree_count(37));
    orch.run(&base_input()).await.unwrap();

    let calls = orch.services().calls();
    let co2_count = calls.iter().find_map(|c| match c {
        RecordedCall::EstimateCo2 { tree_count } => Some(*tree_count),
        _ => None,
    });
    assert_eq!(co2_count, Some(37));
}

#[tokio::test]
async fn tree_detection_failure_stops_everything() {
    let mut orch =
        Orchestrator::new(NullServices::healthy().failing_at(PipelineStage::TreeDetection));
    let err = orch.run(&base_input()).await.unwrap_err();

    assert_eq!(err.stage(), Some(PipelineStage::TreeDetection));
    match &err {
        PipelineError::Stage { completed, .. } => {
            assert_eq!(completed.completed_stages(), 0);
        }
        other => panic!("unexpected error: {other}"),
    }

    // Only the failed detection call was made.
    let calls = orch.services().calls();
    assert_eq!(calls.len(), 1);
    assert!(matches!(calls[0], RecordedCall::DetectTrees { .. }));
}

#[tokio::test]
async fn midway_failure_surfaces_partial_results() {
    let mut orch = Orchestrator::new(NullServices::healthy().failing_at(PipelineStage::Co2));
    let err = orch.run(&base_input()).await.unwrap_err();

    assert_eq!(err.stage(), Some(PipelineStage::Co2));
    match err {
        PipelineError::Stage { completed, .. } => {
            assert!(completed.tree.is_some());
            assert!(completed.ndvi.is_some());
            assert!(completed.iot.is_some());
            assert!(completed.co2.is_none());
            assert!(completed.submission.is_none());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn missing_ndvi_image_falls_back_to_tree_image() {
    let mut orch = Orchestrator::new(NullServices::healthy());
    let report = orch.run(&base_input()).await.unwrap();
    assert!(report.ndvi_from_tree_image);

    let calls = orch.services().calls();
    let ndvi_image = calls.iter().find_map(|c| match c {
        RecordedCall::AnalyzeNdvi { image_name, .. } => Some(image_name.clone()),
        _ => None,
    });
    assert_eq!(ndvi_image.as_deref(), Some("drone.jpg"));
}

#[tokio::test]
async fn dedicated_ndvi_image_is_used_when_supplied() {
    let mut input = base_input();
    input.ndvi_image = Some(EvidenceFile::new("satellite.tif", vec![0x49, 0x49]));
    input.multispectral = true;

    let mut orch = Orchestrator::new(NullServices::healthy());
    let report = orch.run(&input).await.unwrap();
    assert!(!report.ndvi_from_tree_image);

    let calls = orch.services().calls();
    let ndvi = calls.iter().find_map(|c| match c {
        RecordedCall::AnalyzeNdvi {
            image_name,
            multispectral,
        } => Some((image_name.clone(), *multispectral)),
        _ => None,
    });
    assert_eq!(ndvi, Some(("satellite.tif".to_string(), true)));
}

#[tokio::test]
async fn missing_iot_data_scores_synthetic_readings() {
    let mut orch = Orchestrator::new(NullServices::healthy());
    let report = orch.run(&base_input()).await.unwrap();
    assert!(report.iot_synthetic);

    let calls = orch.services().calls();
    let fetched = calls.iter().find_map(|c| match c {
        RecordedCall::SyntheticIot { readings, days } => Some((*readings, *days)),
        _ => None,
    });
    assert_eq!(fetched, Some((100, 30)));

    // The generated readings were wrapped and fed to the scoring call.
    let scored = calls.iter().find_map(|c| match c {
        RecordedCall::ScoreIot { payload } => Some(payload.clone()),
        _ => None,
    });
    match scored {
        Some(IotPayload::Json(value)) => {
            assert_eq!(value["readings"].as_array().unwrap().len(), 100);
        }
        other => panic!("expected JSON readings payload, got {other:?}"),
    }
}

#[tokio::test]
async fn supplied_iot_data_skips_synthetic_fetch() {
    let mut input = base_input();
    input.iot_data = Some(IotPayload::Json(serde_json::json!({
        "readings": [{"timestamp": "2025-01-01T00:00:00", "soil_moisture": 70.0,
                      "temperature": 27.0, "salinity": 22.0, "ph": 7.2,
                      "dissolved_oxygen": 5.8}]
    })));

    let mut orch = Orchestrator::new(NullServices::healthy());
    let report = orch.run(&input).await.unwrap();
    assert!(!report.iot_synthetic);

    let calls = orch.services().calls();
    assert!(!calls
        .iter()
        .any(|c| matches!(c, RecordedCall::SyntheticIot { .. })));
}

#[tokio::test]
async fn ineligible_outcome_skips_issuance() {
    // Low detection against a high claim sinks both the tree threshold and
    // the weighted final score.
    let mut orch = Orchestrator::new(
        NullServices::healthy()
            .with_tree_count(10)
            .with_ndvi_score(0.3)
            .with_iot_score(0.2),
    );
    let report = orch.run(&base_input()).await.unwrap();

    assert!(!report.credits_issued());
    assert!(!report.outcome.verification_status.credits_eligible);
    let calls = orch.services().calls();
    assert!(!calls
        .iter()
        .any(|c| matches!(c, RecordedCall::IssueCredits { .. })));

    let skipped = orch
        .drain_events()
        .into_iter()
        .any(|e| matches!(e, RunEvent::IssuanceSkipped { .. }));
    assert!(skipped);
}

#[tokio::test]
async fn issuance_uses_configured_price() {
    let mut input = base_input();
    input.price_per_credit = 31.5;

    let mut orch = Orchestrator::new(NullServices::healthy());
    let report = orch.run(&input).await.unwrap();
    assert!(report.credits_issued());

    let calls = orch.services().calls();
    let issued = calls.iter().find_map(|c| match c {
        RecordedCall::IssueCredits { request } => Some(request.clone()),
        _ => None,
    });
    let issued = issued.unwrap();
    assert_eq!(issued.price_per_credit, 31.5);
    assert_eq!(issued.report_id, report.submission.report_id);
    assert!((issued.amount - report.outcome.carbon_credits).abs() < f64::EPSILON);
}

#[tokio::test]
async fn worked_example_scores_0_7992() {
    // claimed 50, detected 45, NDVI 0.742, IoT 0.658, audit 0.85
    let mut orch = Orchestrator::new(NullServices::healthy());
    let report = orch.run(&base_input()).await.unwrap();

    assert!((report.outcome.final_score.value() - 0.7992).abs() < 1e-9);
    assert!(report.outcome.verification_status.credits_eligible);
    assert!((report.co2.co2_absorbed_kg - 553.5).abs() < 1e-9);
}

#[tokio::test]
async fn events_arrive_in_stage_order() {
    let mut orch = Orchestrator::new(NullServices::healthy());
    orch.run(&base_input()).await.unwrap();

    let stages: Vec<PipelineStage> = orch
        .drain_events()
        .into_iter()
        .filter_map(|e| match e {
            RunEvent::StageStarted { stage } => Some(stage),
            _ => None,
        })
        .collect();
    assert_eq!(
        stages,
        vec![
            PipelineStage::TreeDetection,
            PipelineStage::Ndvi,
            PipelineStage::Iot,
            PipelineStage::Co2,
            PipelineStage::FinalScore,
            PipelineStage::LedgerSubmit,
            PipelineStage::CreditIssuance,
        ]
    );
}
