use ndarray::Array2;
use titanic_classifiers::config::{HyperParams, Kernel, ModelType};
use titanic_classifiers::models::{build_model, ClassifierModel, Estimator};
use titanic_classifiers::ModelError;

fn tiny_dataset() -> (Array2<f64>, Vec<u8>) {
    let x = Array2::from_shape_vec(
        (8, 2),
        vec![
            1.0, 0.0, // survived
            0.0, 1.0, // did not
            1.0, 0.1, // survived
            0.0, 0.9, // did not
            1.1, 0.0, // survived
            0.0, 1.2, // did not
            0.9, 0.2, // survived
            0.1, 1.1, // did not
        ],
    )
    .expect("failed to create feature matrix");
    let y = vec![1, 0, 1, 0, 1, 0, 1, 0];
    (x, y)
}

#[test]
fn test_factory_builds_and_predicts_random_forest() {
    let (x, y) = tiny_dataset();
    let params = HyperParams::RandomForest {
        n_estimators: 10,
        max_depth: Some(3),
    };
    let mut model = build_model(&params, 42);
    assert_eq!(model.model_type(), ModelType::RandomForest);
    model.fit(&x, &y).unwrap();

    let probs = model.predict_proba(&x).unwrap();
    assert_eq!(probs.len(), x.nrows());
    assert_eq!(model.predict(&x).unwrap(), y);
    assert_eq!(model.feature_importances().unwrap().len(), 2);
}

#[test]
fn test_factory_builds_and_predicts_svc() {
    let (x, y) = tiny_dataset();
    let params = HyperParams::Svc {
        c: 1.0,
        kernel: Kernel::Linear,
    };
    let mut model = build_model(&params, 42);
    assert!(matches!(model, Estimator::Svc(_)));
    model.fit(&x, &y).unwrap();

    assert_eq!(model.predict(&x).unwrap(), y);
    assert!(model
        .predict_proba(&x)
        .unwrap()
        .iter()
        .all(|p| (0.0..=1.0).contains(p)));
    assert!(matches!(
        model.feature_importances(),
        Err(ModelError::Unsupported(_))
    ));
}

#[test]
fn test_estimator_roundtrips_through_bincode() {
    let (x, y) = tiny_dataset();
    let mut model = build_model(
        &HyperParams::Svc {
            c: 10.0,
            kernel: Kernel::Rbf,
        },
        7,
    );
    model.fit(&x, &y).unwrap();

    let bytes = bincode::serialize(&model).unwrap();
    let restored: Estimator = bincode::deserialize(&bytes).unwrap();
    assert_eq!(
        model.predict_proba(&x).unwrap(),
        restored.predict_proba(&x).unwrap()
    );
}
