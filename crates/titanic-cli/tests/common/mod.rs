#![allow(dead_code)]

use std::fmt::Write as _;
use std::path::Path;

use titanic_classifiers::config::{Kernel, RandomForestGrid, SearchConfig, SvcGrid};

/// Write `n` deterministic passengers whose survival follows sex and class.
/// Every fifth row has no Age and every seventh no Embarked.
pub fn write_passenger_csv(path: &Path, n: usize) {
    let mut out = String::from(
        "PassengerId,Survived,Pclass,Name,Sex,Age,SibSp,Parch,Ticket,Fare,Cabin,Embarked\n",
    );
    for i in 0..n {
        let class = 1 + i % 3;
        let female = (i / 3) % 2 == 0;
        let age = 2 + (i * 7) % 60;
        let survived = (female && class < 3) || (class == 1 && age < 20);
        let fare = [80.0, 25.0, 8.0][class - 1] + (i % 5) as f64;
        let port = ["C", "Q", "S"][(i / 6) % 3];
        writeln!(
            out,
            "{},{},{},\"Passenger, Mr. {}\",{},{},{},{},T{},{:.2},,{}",
            i + 1,
            u8::from(survived),
            class,
            i,
            if female { "female" } else { "male" },
            if i % 5 == 4 { String::new() } else { age.to_string() },
            i % 4,
            i % 3,
            i,
            fare,
            if i % 7 == 6 { "" } else { port },
        )
        .unwrap();
    }
    std::fs::write(path, out).unwrap();
}

pub fn tiny_search() -> SearchConfig {
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
