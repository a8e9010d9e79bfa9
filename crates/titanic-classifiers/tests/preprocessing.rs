//! Integration tests for CSV loading, feature preparation and the scaler.

use std::io::Write;

use approx::assert_abs_diff_eq;
use titanic_classifiers::data_handling::{preprocess, train_test_split, CONTINUOUS_FEATURES, N_FEATURES};
use titanic_classifiers::io::titanic_csv::read_titanic_csv;
use titanic_classifiers::preprocessing::Scaler;
use titanic_classifiers::DataError;

const SAMPLE: &str = "\
PassengerId,Survived,Pclass,Name,Sex,Age,SibSp,Parch,Ticket,Fare,Cabin,Embarked
1,0,3,\"Braund, Mr. Owen Harris\",male,22,1,0,A/5 21171,7.25,,S
2,1,1,\"Cumings, Mrs. John Bradley\",female,38,1,0,PC 17599,71.2833,C85,C
3,1,3,\"Heikkinen, Miss. Laina\",female,26,0,0,STON/O2. 3101282,7.925,,S
4,1,1,\"Futrelle, Mrs. Jacques Heath\",female,35,1,0,113803,53.1,C123,S
5,0,3,\"Allen, Mr. William Henry\",male,35,0,0,373450,8.05,,S
6,0,3,\"Moran, Mr. James\",male,,0,0,330877,8.4583,,Q
7,0,1,\"McCarthy, Mr. Timothy J\",male,54,0,0,17463,51.8625,E46,S
8,0,3,\"Palsson, Master. Gosta Leonard\",male,2,3,1,349909,21.075,,S
9,1,3,\"Johnson, Mrs. Oscar W\",female,27,0,2,347742,11.1333,,S
10,1,2,\"Nasser, Mrs. Nicholas\",female,14,1,0,237736,30.0708,,
";

fn sample_file() -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    file.write_all(SAMPLE.as_bytes()).unwrap();
    file
}

#[test]
fn csv_to_feature_matrix() {
    let file = sample_file();
    let raw = read_titanic_csv(file.path()).unwrap();
    assert_eq!(raw.len(), 10);

    let prepared = preprocess(&raw).unwrap();
    assert_eq!(prepared.x.dim(), (10, N_FEATURES));
    assert_eq!(prepared.passenger_ids, (1..=10).collect::<Vec<i64>>());
    assert_eq!(prepared.y.as_deref(), Some(&[0, 1, 1, 1, 0, 0, 0, 0, 1, 1][..]));

    // median of the nine known ages
    assert_abs_diff_eq!(prepared.age_median, 27.0);
    assert_abs_diff_eq!(prepared.x[[5, 0]], 27.0);

    // passenger 6 embarked at Q, passenger 10 defaults to S
    assert_eq!(prepared.x.row(5).to_vec()[4..7], [0.0, 1.0, 0.0]);
    assert_eq!(prepared.x.row(9).to_vec()[4..7], [0.0, 0.0, 1.0]);

    // every indicator group has exactly one flag set
    for row in prepared.x.rows() {
        assert_eq!(row[4] + row[5] + row[6], 1.0);
        assert_eq!(row[7] + row[8], 1.0);
        assert_eq!(row[9] + row[10] + row[11], 1.0);
    }
}

#[test]
fn scaler_fitted_on_train_split_only() {
    let file = sample_file();
    let prepared = preprocess(&read_titanic_csv(file.path()).unwrap()).unwrap();
    let y = prepared.y.unwrap();
    let split = train_test_split(&prepared.x, &y, 0.2, 23).unwrap();
    assert_eq!(split.x_test.nrows(), 2);
    assert_eq!(split.y_train.len(), 8);

    let scaler = Scaler::fit_continuous(&split.x_train).unwrap();
    assert_eq!(scaler.columns, CONTINUOUS_FEATURES.to_vec());
    let scaled = scaler.transform(&split.x_train).unwrap();
    for &c in &CONTINUOUS_FEATURES {
        let col = scaled.column(c);
        assert_abs_diff_eq!(col.sum() / col.len() as f64, 0.0, epsilon = 1e-9);
    }
    // indicator columns untouched
    assert_eq!(scaled.column(7), split.x_train.column(7));
}

#[test]
fn unknown_sex_is_rejected() {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(file, "PassengerId,Survived,Pclass,Sex,Age,SibSp,Parch,Fare,Embarked").unwrap();
    writeln!(file, "1,0,3,unknown,22,0,0,7.25,S").unwrap();
    let raw = read_titanic_csv(file.path()).unwrap();
    assert!(matches!(
        preprocess(&raw),
        Err(DataError::UnknownCategory { column: "Sex", .. })
    ));
}
