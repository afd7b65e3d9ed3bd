//! Control-object policies exercised through a mock camera.

mod common;

use common::camera_with;
use detector_caps::prelude::*;

#[test]
fn binning_is_refused_while_acquiring() {
    let camera = camera_with(&[CapabilityKind::Bin]);
    let bin = resolve::<dyn BinCtrl>(camera.interface()).unwrap();

    camera.start_acquisition();
    assert!(camera.is_acquiring());
    assert!(matches!(
        bin.set_bin(Bin::new(2, 2).unwrap()),
        Err(CapsError::BusyState(_))
    ));
    assert_eq!(bin.bin(), Bin::ONE);

    camera.stop_acquisition();
    bin.set_bin(Bin::new(2, 2).unwrap()).unwrap();
    assert_eq!(bin.bin(), Bin::new(2, 2).unwrap());
}

#[test]
fn roi_is_clipped_to_sensor_bounds() {
    let camera = camera_with(&[CapabilityKind::DetInfo, CapabilityKind::Roi]);
    let hw = camera.interface();
    let sensor = resolve::<dyn DetInfoCtrl>(hw).unwrap().max_image_size();
    let roi = resolve::<dyn RoiCtrl>(hw).unwrap();

    let applied = roi.set_roi(Roi::new(1900, 1000, 512, 512)).unwrap();
    assert_eq!(applied, Roi::new(1900, 1000, 148, 512));
    assert!(sensor.contains(&applied));
    assert_eq!(roi.roi(), applied);

    assert!(matches!(
        roi.set_roi(Roi::new(4096, 4096, 16, 16)),
        Err(CapsError::InvalidRegion { .. })
    ));
    assert_eq!(roi.roi(), applied);
}

#[test]
fn roi_changes_are_allowed_during_acquisition() {
    let camera = camera_with(&[CapabilityKind::Roi]);
    let roi = resolve::<dyn RoiCtrl>(camera.interface()).unwrap();
    camera.start_acquisition();
    assert_eq!(
        roi.set_roi(Roi::new(0, 0, 100, 100)).unwrap(),
        Roi::new(0, 0, 100, 100)
    );
}

#[test]
fn sync_exposure_out_of_range() {
    let camera = camera_with(&[CapabilityKind::Sync]);
    let sync = resolve::<dyn SyncCtrl>(camera.interface()).unwrap();
    let ranges = sync.valid_ranges();

    sync.set_exposure_time(ranges.max_exposure).unwrap();
    assert!(matches!(
        sync.set_exposure_time(ranges.max_exposure * 2.0),
        Err(CapsError::OutOfRange { .. })
    ));
    assert!(matches!(
        sync.set_exposure_time(-1.0),
        Err(CapsError::OutOfRange { .. })
    ));
    assert_eq!(sync.exposure_time(), ranges.max_exposure);
}

#[test]
fn sync_trigger_mode_is_busy_guarded() {
    let camera = camera_with(&[CapabilityKind::Sync]);
    let sync = resolve::<dyn SyncCtrl>(camera.interface()).unwrap();
    assert_eq!(sync.trigger_mode(), TrigMode::Internal);

    sync.set_trigger_mode(TrigMode::ExternalSingle).unwrap();
    camera.start_acquisition();
    assert!(matches!(
        sync.set_trigger_mode(TrigMode::Internal),
        Err(CapsError::BusyState(_))
    ));
    assert_eq!(sync.trigger_mode(), TrigMode::ExternalSingle);
    sync.set_latency_time(0.5).unwrap();
}

#[test]
fn buffer_sized_from_binned_frame() {
    let camera = camera_with(&[
        CapabilityKind::DetInfo,
        CapabilityKind::Bin,
        CapabilityKind::Buffer,
    ]);
    let hw = camera.interface();
    let bin = resolve::<dyn BinCtrl>(hw).unwrap();
    bin.set_bin(Bin::new(2, 2).unwrap()).unwrap();

    let frame = resolve::<dyn DetInfoCtrl>(hw)
        .unwrap()
        .max_image_size()
        .binned(bin.bin())
        .unwrap();
    let buffer = resolve::<dyn BufferCtrl>(hw).unwrap();
    let max = buffer.max_nb_buffers(&frame).unwrap();
    assert_eq!(max, (512 * 1024 * 1024) / (1024 * 1024 * 2));

    let alloc = buffer.allocate(frame, max).unwrap();
    assert_eq!(alloc.frame_dim, frame);
    assert!(buffer.allocate(frame, max + 1).is_err());
    assert_eq!(buffer.allocation(), Some(alloc));
}

#[test]
fn flip_has_no_preconditions() {
    let camera = camera_with(&[CapabilityKind::Flip]);
    let flip = resolve::<dyn FlipCtrl>(camera.interface()).unwrap();
    camera.start_acquisition();
    flip.set_flip(Flip::new(true, false)).unwrap();
    assert_eq!(flip.flip(), Flip::new(true, false));
}

#[test]
fn describe_summarizes_each_capability() {
    let camera = camera_with(&CapabilityKind::KNOWN);
    for (kind, handle) in resolve_all(camera.interface()) {
        let summary = handle.unwrap().describe();
        assert!(!summary.is_empty(), "{kind}");
    }
    let det = resolve_kind(camera.interface(), CapabilityKind::DetInfo).unwrap();
    assert_eq!(det.describe(), "Simulator SimCam 2048 max 2048x2048 Mono16");
}

#[test]
fn setup_can_extend_mock_camera() {
    let mut camera = camera_with(&[CapabilityKind::DetInfo]);
    camera
        .interface_mut()
        .register::<dyn FlipCtrl>(common::TaggedFlip::new(5));
    assert_eq!(
        camera.interface().list_capabilities(),
        vec![CapabilityKind::DetInfo, CapabilityKind::Flip]
    );
}

#[test]
fn latency_out_of_range_while_acquiring() {
    let camera = camera_with(&[CapabilityKind::Sync]);
    let sync = resolve::<dyn SyncCtrl>(camera.interface()).unwrap();
    let ranges = sync.valid_ranges();

    camera.start_acquisition();
    sync.set_latency_time(ranges.max_latency).unwrap();
    assert!(matches!(
        sync.set_latency_time(ranges.max_latency + 1.0),
        Err(CapsError::OutOfRange {
            parameter: "latency_time",
            ..
        })
    ));
    assert_eq!(sync.latency_time(), ranges.max_latency);
}

#[test]
fn frame_larger_than_budget_allows_no_buffers() {
    let mut config = CameraConfig {
        capabilities: vec![CapabilityKind::DetInfo, CapabilityKind::Buffer],
        ..CameraConfig::default()
    };
    config.buffer.max_memory_mb = 1;
    let camera = MockCamera::new(&config).unwrap();
    let hw = camera.interface();

    let frame = resolve::<dyn DetInfoCtrl>(hw).unwrap().max_image_size();
    let buffer = resolve::<dyn BufferCtrl>(hw).unwrap();
    assert_eq!(buffer.max_nb_buffers(&frame).unwrap(), 0);
    assert!(matches!(
        buffer.allocate(frame, 1),
        Err(CapsError::OutOfRange {
            parameter: "nb_buffers",
            ..
        })
    ));
    assert_eq!(buffer.allocation(), None);
}

#[test]
fn oversized_sensor_frame_is_too_large() {
    let mut config = CameraConfig {
        capabilities: vec![CapabilityKind::DetInfo, CapabilityKind::Buffer],
        ..CameraConfig::default()
    };
    config.sensor.width = 65536;
    config.sensor.height = 65536;
    config.sensor.pixel_type = PixelType::Rgba32;
    let camera = MockCamera::new(&config).unwrap();
    let hw = camera.interface();

    let frame = resolve::<dyn DetInfoCtrl>(hw).unwrap().max_image_size();
    assert!(matches!(
        frame.mem_size(),
        Err(CapsError::FrameTooLarge { .. })
    ));
    let buffer = resolve::<dyn BufferCtrl>(hw).unwrap();
    assert!(matches!(
        buffer.allocate(frame, 1),
        Err(CapsError::FrameTooLarge { .. })
    ));
}

#[test]
fn decoded_binning_keeps_factors_positive() {
    assert!(serde_json::from_str::<Bin>(r#"{"x":0,"y":1}"#).is_err());

    let camera = camera_with(&[CapabilityKind::DetInfo, CapabilityKind::Bin]);
    let hw = camera.interface();
    let bin = resolve::<dyn BinCtrl>(hw).unwrap();
    let decoded: Bin = serde_json::from_str(r#"{"x":2,"y":1}"#).unwrap();
    bin.set_bin(decoded).unwrap();

    let frame = resolve::<dyn DetInfoCtrl>(hw)
        .unwrap()
        .max_image_size()
        .binned(bin.bin())
        .unwrap();
    assert_eq!((frame.width(), frame.height()), (1024, 2048));
}

#[test]
fn inconsistent_exposure_limits_fail_camera_construction() {
    let mut config = CameraConfig::default();
    config.sync.min_exposure_s = 2.0;
    config.sync.max_exposure_s = 1.0;
    assert!(matches!(
        MockCamera::new(&config),
        Err(CapsError::OutOfRange {
            parameter: "exposure_time",
            ..
        })
    ));
}
