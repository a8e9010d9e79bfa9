use std::fs;

use ndarray::Array2;
use titanic_classifiers::config::{Kernel, RandomForestGrid, SearchConfig, SvcGrid};
use titanic_classifiers::data_handling::{features_to_matrix, PassengerFeatures, FEATURE_NAMES};
use titanic_classifiers::{MetricError, ModelError, ModelType, TitanicModel};

/// Deterministic passengers whose survival follows sex and class.
fn synthetic(n: usize, offset: usize) -> (Array2<f64>, Vec<u8>) {
    let mut records = Vec::with_capacity(n);
    let mut labels = Vec::with_capacity(n);
    for k in 0..n {
        let i = k + offset;
        let class = 1 + i % 3;
        let female = (i / 3) % 2 == 0;
        let age = 2.0 + ((i * 7) % 60) as f64;
        let port = (i / 6) % 3;
        let fare = [80.0, 25.0, 8.0][class - 1] + (i % 5) as f64;
        records.push(PassengerFeatures {
            Age: age,
            SibSp: (i % 4) as i64,
            Parch: (i % 3) as i64,
            Fare: fare,
            C: port == 0,
            Q: port == 1,
            S: port == 2,
            female,
            male: !female,
            Class_1: class == 1,
            Class_2: class == 2,
            Class_3: class == 3,
        });
        let survived = (female && class < 3) || (class == 1 && age < 20.0);
        labels.push(u8::from(survived));
    }
    (features_to_matrix(&records), labels)
}

fn small_search() -> SearchConfig {
    SearchConfig {
        cv_folds: 3,
        random_state: 42,
        random_forest: RandomForestGrid {
            n_estimators: vec![10],
            max_depth: vec![Some(4), None],
        },
        svc: SvcGrid {
            c: vec![1.0],
            kernel: vec![Kernel::Linear, Kernel::Rbf],
        },
    }
}

#[test]
fn random_forest_train_evaluate_save_load() {
    let (x, y) = synthetic(90, 0);
    let (x_test, y_test) = synthetic(30, 500);

    let mut model = TitanicModel::new(ModelType::RandomForest).with_search_config(small_search());
    let summary = model.train(&x, &y).unwrap();
    assert!(model.is_trained());
    assert_eq!(summary.candidates.len(), 2);
    assert_eq!(model.best_params(), Some(&summary.best_params));

    let pred = model.predict(&x_test).unwrap();
    assert_eq!(pred.len(), x_test.nrows());
    assert!(pred.iter().all(|&p| p == 0 || p == 1));

    let metrics = model.evaluate(&x_test, &y_test).unwrap();
    for v in metrics.values() {
        assert!((0.0..=1.0).contains(&v), "metric out of range: {}", v);
    }
    assert!(metrics.accuracy > 0.7);

    let importance = model.feature_importance().unwrap();
    let names: Vec<&str> = importance.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, FEATURE_NAMES.to_vec());
    let total: f64 = importance.iter().map(|(_, w)| w).sum();
    assert!((total - 1.0).abs() < 1e-9);

    let dir = tempfile::tempdir().unwrap();
    let prefix = dir.path().join("models").join("titanic");
    let paths = model.save(&prefix).unwrap();
    assert!(paths.estimator.ends_with("titanic_rf.bin"));
    assert!(paths.scaler.ends_with("titanic_scaler_rf.bin"));

    let restored = TitanicModel::from_artifacts(ModelType::RandomForest, &prefix).unwrap();
    assert_eq!(restored.predict(&x_test).unwrap(), pred);
    assert_eq!(
        restored.predict_proba(&x_test).unwrap(),
        model.predict_proba(&x_test).unwrap()
    );
}

#[test]
fn svc_train_evaluate_save_load() {
    let (x, y) = synthetic(90, 0);
    let (x_test, y_test) = synthetic(30, 500);

    let mut model = TitanicModel::from_tag("svc")
        .unwrap()
        .with_search_config(small_search());
    model.train(&x, &y).unwrap();

    let metrics = model.evaluate(&x_test, &y_test).unwrap();
    for v in metrics.values() {
        assert!((0.0..=1.0).contains(&v));
    }
    assert!(matches!(
        model.feature_importance(),
        Err(ModelError::Unsupported(_))
    ));

    let dir = tempfile::tempdir().unwrap();
    let prefix = dir.path().join("titanic");
    model.save(&prefix).unwrap();

    let mut restored = TitanicModel::new(ModelType::Svc);
    restored.load(&prefix).unwrap();
    assert_eq!(
        restored.predict(&x_test).unwrap(),
        model.predict(&x_test).unwrap()
    );
}

#[test]
fn load_without_save_is_artifact_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let prefix = dir.path().join("nothing_here");
    let err = TitanicModel::from_artifacts(ModelType::RandomForest, &prefix).unwrap_err();
    match err {
        ModelError::ArtifactNotFound(path) => assert!(path.ends_with("nothing_here_rf.bin")),
        other => panic!("expected ArtifactNotFound, got {:?}", other),
    }
}

#[test]
fn load_rejects_other_family() {
    let (x, y) = synthetic(60, 0);
    let mut svc = TitanicModel::new(ModelType::Svc).with_search_config(small_search());
    svc.train(&x, &y).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let prefix = dir.path().join("titanic");
    let paths = svc.save(&prefix).unwrap();

    let rf_paths = TitanicModel::new(ModelType::RandomForest).artifact_paths(&prefix);
    fs::copy(&paths.estimator, &rf_paths.estimator).unwrap();
    fs::copy(&paths.scaler, &rf_paths.scaler).unwrap();

    assert!(matches!(
        TitanicModel::from_artifacts(ModelType::RandomForest, &prefix),
        Err(ModelError::InvalidInput(_))
    ));
}

#[test]
fn evaluate_does_not_refit_scaler() {
    let (x, y) = synthetic(60, 0);
    let (x_a, _) = synthetic(20, 300);
    let mut model = TitanicModel::new(ModelType::RandomForest).with_search_config(small_search());
    model.train(&x, &y).unwrap();

    let before = model.predict_proba(&x_a).unwrap();
    // evaluating on data with very different Age/Fare must not move the scaler
    let mut shifted = x.clone();
    shifted.column_mut(0).mapv_inplace(|v| v + 500.0);
    shifted.column_mut(3).mapv_inplace(|v| v * 40.0);
    model.evaluate(&shifted, &y).unwrap();
    assert_eq!(model.predict_proba(&x_a).unwrap(), before);
}

#[test]
fn evaluate_single_class_fails_on_roc_auc() {
    let (x, y) = synthetic(60, 0);
    let mut model = TitanicModel::new(ModelType::RandomForest).with_search_config(small_search());
    model.train(&x, &y).unwrap();

    let labels = vec![1u8; x.nrows()];
    assert!(matches!(
        model.evaluate(&x, &labels),
        Err(ModelError::Metric(MetricError::SingleClass))
    ));
}

#[test]
fn evaluate_rejects_labels_outside_zero_one() {
    let (x, y) = synthetic(60, 0);
    let mut model = TitanicModel::new(ModelType::RandomForest).with_search_config(small_search());
    model.train(&x, &y).unwrap();

    let mut labels = y.clone();
    labels[3] = 2;
    assert!(matches!(
        model.evaluate(&x, &labels),
        Err(ModelError::InvalidInput(_))
    ));
    assert!(matches!(
        model.evaluate(&x, &y[..10]),
        Err(ModelError::LengthMismatch { rows: 60, labels: 10 })
    ));
}

#[test]
fn train_rejects_bad_input() {
    let mut model = TitanicModel::new(ModelType::RandomForest).with_search_config(small_search());
    let x = Array2::zeros((4, 3));
    assert!(matches!(
        model.train(&x, &[0, 1, 0, 1]),
        Err(ModelError::ShapeMismatch { expected: 12, actual: 3 })
    ));
    let (x, _) = synthetic(10, 0);
    assert!(matches!(
        model.train(&x, &[0, 1]),
        Err(ModelError::LengthMismatch { rows: 10, labels: 2 })
    ));
    assert!(!model.is_trained());
}
