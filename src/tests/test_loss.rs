use ndarray::array;

use crate::loss::Huber;

#[test]
fn test_quadratic_inside_delta() {
    let huber = Huber::new(1.0);
    let loss = huber.value(array![0.5].view());
    assert!((loss - 0.125).abs() < 1e-6);
}

#[test]
fn test_linear_outside_delta() {
    let huber = Huber::new(1.0);
    // delta * |x| - 0.5 * delta^2 = 2.0 - 0.5
    let loss = huber.value(array![2.0].view());
    assert!((loss - 1.5).abs() < 1e-6);
}

#[test]
fn test_mean_reduction() {
    let huber = Huber::new(1.0);
    let loss = huber.value(array![0.5, 2.0].view());
    assert!((loss - (0.125 + 1.5) / 2.0).abs() < 1e-6);
}

#[test]
fn test_gradient_clamped_to_delta() {
    let huber = Huber::new(1.0);
    let grad = huber.gradient(array![0.5, 3.0, -4.0].view());
    assert!((grad[0] - 0.5 / 3.0).abs() < 1e-6);
    assert!((grad[1] - 1.0 / 3.0).abs() < 1e-6);
    assert!((grad[2] + 1.0 / 3.0).abs() < 1e-6);
}

#[test]
fn test_empty_residuals() {
    let huber = Huber::default();
    let empty = ndarray::Array1::<f32>::zeros(0);
    assert_eq!(huber.value(empty.view()), 0.0);
}
