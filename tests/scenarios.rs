//! End-to-end scenarios through the public API.

use danger_matrix::{
    check_crossings, AnalysisError, Backend, DerivativeRateReducer, DistributionSampler, Frame,
    FrameSequence, HistogramBinner, ThresholdCrossingReducer,
};
use ndarray::{array, Array2, Array3};

fn sequence(frames: Vec<Array2<f64>>, frame_rate: f64) -> FrameSequence {
    let frames = frames
        .into_iter()
        .enumerate()
        .map(|(i, grid)| Frame::new(grid, i as u64))
        .collect();
    FrameSequence::from_frames(frames, frame_rate).unwrap()
}

#[test]
fn scenario_a_first_crossing_times() {
    let seq = sequence(
        vec![
            array![[0.0, 0.0], [0.0, 0.0]],
            array![[5.0, 0.0], [0.0, 5.0]],
            array![[5.0, 5.0], [5.0, 5.0]],
        ],
        1.0,
    );

    for backend in [Backend::Portable, Backend::Parallel] {
        let danger = ThresholdCrossingReducer::with_backend(5.0, backend)
            .reduce(&seq)
            .unwrap();
        assert_eq!(danger.times(), &array![[1.0, 2.0], [2.0, 1.0]]);
        assert!(check_crossings(&danger).is_ok());
    }
}

#[test]
fn scenario_b_nothing_crosses() {
    let seq = FrameSequence::new(Array3::from_elem((4, 3, 5), 4.9), 30.0).unwrap();
    let danger = ThresholdCrossingReducer::new(5.0).reduce(&seq).unwrap();

    assert_eq!(danger.shape(), (3, 5));
    assert!(danger.is_uniformly_unset());
    assert_eq!(check_crossings(&danger), Err(AnalysisError::AllZeroResult));
}

#[test]
fn scenario_c_single_frame_derivative() {
    let seq = sequence(vec![array![[1.0, 2.0], [3.0, 4.0]]], 25.0);
    let result = DerivativeRateReducer::default().reduce(&seq);

    assert_eq!(
        result.unwrap_err(),
        AnalysisError::InsufficientFrames {
            required: 2,
            actual: 1
        }
    );
}

#[test]
fn scenario_d_all_zero_histogram() {
    let zeros = Array2::<f64>::zeros((3, 3));
    assert!(matches!(
        HistogramBinner::new(10).bin(&zeros),
        Err(AnalysisError::DegenerateHistogram(_))
    ));
}

#[test]
fn shape_law_holds_for_every_output() {
    let seq = FrameSequence::new(
        Array3::from_shape_fn((6, 4, 7), |(t, r, c)| (t * (r + c)) as f64),
        10.0,
    )
    .unwrap();

    let danger = ThresholdCrossingReducer::new(6.0).reduce(&seq).unwrap();
    let rates = DerivativeRateReducer::default().reduce(&seq).unwrap();
    assert_eq!(danger.shape(), (4, 7));
    assert_eq!(rates.shape(), (4, 7));

    let pair = DistributionSampler::new(6.0).sample(&seq, &danger).unwrap();
    assert_eq!(pair.typical.len(), 6);
    assert_eq!(pair.extreme.len(), 6);
}

#[test]
fn crossing_at_first_frame_is_not_the_sentinel() {
    let seq = sequence(vec![array![[8.0, 0.0]], array![[8.0, 0.0]]], 5.0);
    let danger = ThresholdCrossingReducer::new(8.0).reduce(&seq).unwrap();

    assert_eq!(danger.value_at(0, 0), Some(0.0));
    assert_eq!(danger.value_at(0, 1), None);
}

#[test]
fn empty_and_malformed_inputs() {
    let empty = FrameSequence::from_frames(Vec::new(), 1.0).unwrap();
    assert_eq!(
        ThresholdCrossingReducer::new(1.0).reduce(&empty).unwrap_err(),
        AnalysisError::EmptyInput
    );

    let flat = ndarray::ArrayD::<f64>::zeros(ndarray::IxDyn(&[3, 9]));
    assert!(matches!(
        FrameSequence::from_dyn(flat, 1.0),
        Err(AnalysisError::InvalidShape(_))
    ));
}
